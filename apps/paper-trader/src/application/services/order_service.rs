//! Order facade.
//!
//! Validation happens here, before the broker is touched, so a malformed
//! request never costs a network round trip.

use std::sync::Arc;

use uuid::Uuid;

use crate::application::ports::BrokerPort;
use crate::domain::{CancelOutcome, OrderRequest, OrderResult, OrderStatusFilter};
use crate::error::{TradingError, ValidationError};

/// Default page size when listing orders.
pub const DEFAULT_ORDER_LIST_LIMIT: u32 = 50;

/// Submits, reads and cancels orders.
///
/// There is no local idempotency: submitting the same request twice places
/// two orders.
#[derive(Clone)]
pub struct OrderService {
    broker: Arc<dyn BrokerPort>,
}

impl OrderService {
    /// Create the facade.
    pub fn new(broker: Arc<dyn BrokerPort>) -> Self {
        Self { broker }
    }

    /// Validate and submit an order.
    pub async fn submit_order(&self, mut request: OrderRequest) -> Result<OrderResult, TradingError> {
        request.validate()?;

        let client_order_id = request
            .client_order_id
            .get_or_insert_with(|| Uuid::new_v4().to_string())
            .clone();

        tracing::info!(
            client_order_id = %client_order_id,
            symbol = %request.symbol,
            side = %request.side,
            order_type = %request.order_type,
            qty = ?request.quantity,
            notional = ?request.notional,
            limit_price = ?request.limit_price,
            stop_price = ?request.stop_price,
            "Submitting order"
        );

        let result = self.broker.submit_order(&request).await?;

        tracing::info!(
            client_order_id = %client_order_id,
            order_id = %result.id,
            status = %result.status,
            "Order accepted by broker"
        );

        Ok(result)
    }

    /// Read one order by broker ID.
    pub async fn get_order(&self, order_id: &str) -> Result<OrderResult, TradingError> {
        let order_id = require_order_id(order_id)?;
        Ok(self.broker.get_order(order_id).await?)
    }

    /// List orders matching `filter`.
    pub async fn list_orders(
        &self,
        filter: OrderStatusFilter,
        limit: u32,
    ) -> Result<Vec<OrderResult>, TradingError> {
        if limit == 0 {
            return Err(ValidationError::NonPositiveLimit.into());
        }
        Ok(self.broker.list_orders(filter, limit).await?)
    }

    /// Cancel one order.
    pub async fn cancel_order(&self, order_id: &str) -> Result<(), TradingError> {
        let order_id = require_order_id(order_id)?;
        tracing::info!(order_id = %order_id, "Canceling order");
        Ok(self.broker.cancel_order(order_id).await?)
    }

    /// Cancel every open order.
    pub async fn cancel_all_orders(&self) -> Result<Vec<CancelOutcome>, TradingError> {
        let outcomes = self.broker.cancel_all_orders().await?;
        tracing::info!(count = outcomes.len(), "Cancel-all submitted");
        Ok(outcomes)
    }
}

impl std::fmt::Debug for OrderService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderService").finish_non_exhaustive()
    }
}

/// Broker order ids are UUIDs. Anything outside `[A-Za-z0-9-]` would
/// change the request path, so it is rejected here.
fn require_order_id(order_id: &str) -> Result<&str, ValidationError> {
    let trimmed = order_id.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField("order id"));
    }
    if !trimmed.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ValidationError::InvalidValue {
            field: "order id",
            value: trimmed.to_string(),
        });
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Account, OrderSide, OrderStatus, OrderType, Position, Symbol,
    };
    use crate::error::ExternalApiError;
    use async_trait::async_trait;
    use mockall::mock;
    use rust_decimal_macros::dec;

    mock! {
        Broker {}

        #[async_trait]
        impl BrokerPort for Broker {
            async fn submit_order(&self, request: &OrderRequest) -> Result<OrderResult, ExternalApiError>;
            async fn get_order(&self, order_id: &str) -> Result<OrderResult, ExternalApiError>;
            async fn list_orders(&self, filter: OrderStatusFilter, limit: u32) -> Result<Vec<OrderResult>, ExternalApiError>;
            async fn cancel_order(&self, order_id: &str) -> Result<(), ExternalApiError>;
            async fn cancel_all_orders(&self) -> Result<Vec<CancelOutcome>, ExternalApiError>;
            async fn get_account(&self) -> Result<Account, ExternalApiError>;
            async fn list_positions(&self) -> Result<Vec<Position>, ExternalApiError>;
        }
    }

    fn filled(request: &OrderRequest) -> OrderResult {
        OrderResult {
            id: "order-1".to_string(),
            client_order_id: request.client_order_id.clone().unwrap_or_default(),
            symbol: request.symbol.to_string(),
            side: request.side,
            order_type: request.order_type,
            status: OrderStatus::Filled,
            raw_status: "filled".to_string(),
            qty: request.quantity,
            filled_qty: request.quantity.unwrap_or_default(),
            filled_avg_price: Some(dec!(187.5)),
            limit_price: request.limit_price,
            stop_price: request.stop_price,
            submitted_at: None,
        }
    }

    fn aapl() -> Symbol {
        Symbol::parse("AAPL").unwrap()
    }

    #[tokio::test]
    async fn market_order_returns_filled_result() {
        let mut broker = MockBroker::new();
        broker
            .expect_submit_order()
            .times(1)
            .withf(|req| req.order_type == OrderType::Market && req.client_order_id.is_some())
            .returning(|req| Ok(filled(req)));

        let service = OrderService::new(Arc::new(broker));
        let result = service
            .submit_order(OrderRequest::market(aapl(), OrderSide::Buy, dec!(10)))
            .await
            .unwrap();

        assert_eq!(result.status, OrderStatus::Filled);
        assert_eq!(result.filled_qty, dec!(10));
    }

    #[tokio::test]
    async fn missing_price_fails_before_network() {
        let mut broker = MockBroker::new();
        broker.expect_submit_order().times(0);
        let service = OrderService::new(Arc::new(broker));

        for order_type in [OrderType::Limit, OrderType::Stop, OrderType::StopLimit] {
            let mut request = OrderRequest::market(aapl(), OrderSide::Buy, dec!(1));
            request.order_type = order_type;

            let err = service.submit_order(request).await.unwrap_err();
            assert!(matches!(err, TradingError::Validation(_)), "{order_type}");
        }
    }

    #[tokio::test]
    async fn caller_client_order_id_is_kept() {
        let mut broker = MockBroker::new();
        broker
            .expect_submit_order()
            .withf(|req| req.client_order_id.as_deref() == Some("mine"))
            .returning(|req| Ok(filled(req)));

        let service = OrderService::new(Arc::new(broker));
        let result = service
            .submit_order(
                OrderRequest::market(aapl(), OrderSide::Sell, dec!(2)).with_client_order_id("mine"),
            )
            .await
            .unwrap();
        assert_eq!(result.client_order_id, "mine");
    }

    #[tokio::test]
    async fn broker_rejection_is_external_error() {
        let mut broker = MockBroker::new();
        broker.expect_submit_order().returning(|_| {
            Err(ExternalApiError::Rejected {
                provider: "alpaca",
                reason: "insufficient buying power".to_string(),
            })
        });

        let service = OrderService::new(Arc::new(broker));
        let err = service
            .submit_order(OrderRequest::market(aapl(), OrderSide::Buy, dec!(1_000_000)))
            .await
            .unwrap_err();
        assert!(matches!(err, TradingError::ExternalApi(ExternalApiError::Rejected { .. })));
    }

    #[tokio::test]
    async fn blank_order_id_rejected_locally() {
        let mut broker = MockBroker::new();
        broker.expect_cancel_order().times(0);
        let service = OrderService::new(Arc::new(broker));

        let err = service.cancel_order("  ").await.unwrap_err();
        assert!(matches!(
            err,
            TradingError::Validation(ValidationError::MissingField("order id"))
        ));
    }

    #[tokio::test]
    async fn order_id_cannot_escape_the_orders_path() {
        let mut broker = MockBroker::new();
        broker.expect_cancel_order().times(0);
        broker.expect_get_order().times(0);
        let service = OrderService::new(Arc::new(broker));

        for id in ["../account", "abc/def", "abc?x=1", "abc def", "%2e%2e"] {
            let err = service.cancel_order(id).await.unwrap_err();
            assert!(
                matches!(
                    err,
                    TradingError::Validation(ValidationError::InvalidValue { field: "order id", .. })
                ),
                "{id}"
            );
            assert!(service.get_order(id).await.is_err(), "{id}");
        }
    }

    #[tokio::test]
    async fn uuid_order_id_reaches_the_broker() {
        let mut broker = MockBroker::new();
        broker
            .expect_cancel_order()
            .withf(|id| id == "61e69015-8549-4bfd-b9c3-01e75843f47d")
            .times(1)
            .returning(|_| Ok(()));
        let service = OrderService::new(Arc::new(broker));

        service
            .cancel_order(" 61e69015-8549-4bfd-b9c3-01e75843f47d ")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn cancel_all_passes_through() {
        let mut broker = MockBroker::new();
        broker.expect_cancel_all_orders().times(1).returning(|| {
            Ok(vec![CancelOutcome {
                order_id: "a".to_string(),
                status: 200,
            }])
        });

        let service = OrderService::new(Arc::new(broker));
        let outcomes = service.cancel_all_orders().await.unwrap();
        assert_eq!(outcomes.len(), 1);
    }

    #[tokio::test]
    async fn zero_list_limit_rejected() {
        let mut broker = MockBroker::new();
        broker.expect_list_orders().times(0);
        let service = OrderService::new(Arc::new(broker));

        let err = service
            .list_orders(OrderStatusFilter::Open, 0)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TradingError::Validation(ValidationError::NonPositiveLimit)
        ));
    }
}
