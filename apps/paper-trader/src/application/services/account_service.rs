//! Account facade.

use std::sync::Arc;

use crate::application::ports::BrokerPort;
use crate::domain::{Account, Position};
use crate::error::TradingError;

/// Reads account state. Every call goes to the broker; nothing is cached.
#[derive(Clone)]
pub struct AccountService {
    broker: Arc<dyn BrokerPort>,
}

impl AccountService {
    /// Create the facade.
    pub fn new(broker: Arc<dyn BrokerPort>) -> Self {
        Self { broker }
    }

    /// Fetch a fresh account snapshot.
    pub async fn get_account(&self) -> Result<Account, TradingError> {
        let account = self.broker.get_account().await?;
        tracing::debug!(
            account_number = %account.account_number,
            status = %account.status,
            "Account fetched"
        );
        Ok(account)
    }

    /// List open positions.
    pub async fn list_positions(&self) -> Result<Vec<Position>, TradingError> {
        Ok(self.broker.list_positions().await?)
    }
}

impl std::fmt::Debug for AccountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountService").finish_non_exhaustive()
    }
}
