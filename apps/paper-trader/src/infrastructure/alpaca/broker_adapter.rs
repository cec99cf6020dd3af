//! Alpaca broker adapter implementing `BrokerPort`.

use async_trait::async_trait;

use crate::application::ports::BrokerPort;
use crate::domain::{Account, CancelOutcome, OrderRequest, OrderResult, OrderStatusFilter, Position};
use crate::error::ExternalApiError;

use super::api_types::{
    AlpacaAccountResponse, AlpacaCancelStatus, AlpacaOrderRequest, AlpacaOrderResponse,
    AlpacaPositionResponse,
};
use super::config::{AlpacaConfig, AlpacaEnvironment};
use super::error::AlpacaError;
use super::http_client::AlpacaHttpClient;

/// Alpaca Markets broker adapter.
#[derive(Debug, Clone)]
pub struct AlpacaBrokerAdapter {
    client: AlpacaHttpClient,
    environment: AlpacaEnvironment,
}

impl AlpacaBrokerAdapter {
    /// Create a new Alpaca broker adapter.
    pub fn new(config: &AlpacaConfig) -> Result<Self, AlpacaError> {
        let client = AlpacaHttpClient::new(config)?;
        Ok(Self::with_client(client, config.environment))
    }

    /// Build on an existing HTTP client, sharing its connection pool.
    #[must_use]
    pub const fn with_client(client: AlpacaHttpClient, environment: AlpacaEnvironment) -> Self {
        Self {
            client,
            environment,
        }
    }

    /// Check if we're in live trading mode.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.environment.is_live()
    }
}

#[async_trait]
impl BrokerPort for AlpacaBrokerAdapter {
    async fn submit_order(&self, request: &OrderRequest) -> Result<OrderResult, ExternalApiError> {
        if self.is_live() {
            tracing::warn!(
                client_order_id = ?request.client_order_id,
                symbol = %request.symbol,
                "Submitting LIVE order - this will execute real trades"
            );
        }

        let alpaca_request = AlpacaOrderRequest::from(request);

        tracing::debug!(
            symbol = %alpaca_request.symbol,
            side = %alpaca_request.side,
            order_type = %alpaca_request.order_type,
            qty = ?alpaca_request.qty,
            "Submitting order to Alpaca"
        );

        let response: AlpacaOrderResponse = self.client.post("/v2/orders", &alpaca_request).await?;

        tracing::debug!(
            broker_order_id = %response.id,
            status = %response.status,
            "Alpaca accepted order"
        );

        Ok(response.to_order_result()?)
    }

    async fn get_order(&self, order_id: &str) -> Result<OrderResult, ExternalApiError> {
        let response: AlpacaOrderResponse = self
            .client
            .get(&format!("/v2/orders/{order_id}"), &[])
            .await?;

        Ok(response.to_order_result()?)
    }

    async fn list_orders(
        &self,
        filter: OrderStatusFilter,
        limit: u32,
    ) -> Result<Vec<OrderResult>, ExternalApiError> {
        let responses: Vec<AlpacaOrderResponse> = self
            .client
            .get(
                "/v2/orders",
                &[
                    ("status", filter.as_str().to_string()),
                    ("limit", limit.to_string()),
                    ("direction", "desc".to_string()),
                ],
            )
            .await?;

        responses
            .iter()
            .map(|r| r.to_order_result().map_err(ExternalApiError::from))
            .collect()
    }

    async fn cancel_order(&self, order_id: &str) -> Result<(), ExternalApiError> {
        let _: Option<serde_json::Value> = self
            .client
            .delete(&format!("/v2/orders/{order_id}"))
            .await?;
        Ok(())
    }

    async fn cancel_all_orders(&self) -> Result<Vec<CancelOutcome>, ExternalApiError> {
        let entries: Option<Vec<AlpacaCancelStatus>> = self.client.delete("/v2/orders").await?;

        Ok(entries
            .unwrap_or_default()
            .into_iter()
            .map(CancelOutcome::from)
            .collect())
    }

    async fn get_account(&self) -> Result<Account, ExternalApiError> {
        let account: AlpacaAccountResponse = self.client.get("/v2/account", &[]).await?;
        Ok(account.into())
    }

    async fn list_positions(&self) -> Result<Vec<Position>, ExternalApiError> {
        let positions: Vec<AlpacaPositionResponse> = self.client.get("/v2/positions", &[]).await?;
        Ok(positions.into_iter().map(Position::from).collect())
    }
}
