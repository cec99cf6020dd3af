//! Broker Port (Driven Port)
//!
//! Interface for order routing and account reads against a brokerage.

use async_trait::async_trait;

use crate::domain::{
    Account, CancelOutcome, OrderRequest, OrderResult, OrderStatusFilter, Position,
};
use crate::error::ExternalApiError;

/// Brokerage operations.
///
/// Implementations hold no state between calls beyond credentials.
#[async_trait]
pub trait BrokerPort: Send + Sync {
    /// Submit an already validated order.
    async fn submit_order(&self, request: &OrderRequest) -> Result<OrderResult, ExternalApiError>;

    /// Read one order.
    async fn get_order(&self, order_id: &str) -> Result<OrderResult, ExternalApiError>;

    /// List orders, newest first.
    async fn list_orders(
        &self,
        filter: OrderStatusFilter,
        limit: u32,
    ) -> Result<Vec<OrderResult>, ExternalApiError>;

    /// Cancel one order.
    async fn cancel_order(&self, order_id: &str) -> Result<(), ExternalApiError>;

    /// Cancel every open order.
    async fn cancel_all_orders(&self) -> Result<Vec<CancelOutcome>, ExternalApiError>;

    /// Fetch the account snapshot.
    async fn get_account(&self) -> Result<Account, ExternalApiError>;

    /// List open positions.
    async fn list_positions(&self) -> Result<Vec<Position>, ExternalApiError>;
}
