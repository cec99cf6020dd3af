//! Account and position snapshots.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Read-only account snapshot, fetched fresh on every query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Broker account number.
    pub account_number: String,
    /// Account status (e.g. "ACTIVE").
    pub status: String,
    /// Account currency.
    pub currency: String,
    /// Cash balance.
    pub cash: Decimal,
    /// Buying power.
    pub buying_power: Decimal,
    /// Total equity.
    pub equity: Decimal,
    /// Portfolio value.
    pub portfolio_value: Decimal,
    /// Day trades in the rolling window.
    pub daytrade_count: Option<i64>,
    /// Pattern day trader flag.
    pub pattern_day_trader: bool,
}

/// An open position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Symbol.
    pub symbol: String,
    /// Signed quantity.
    pub qty: Decimal,
    /// "long" or "short".
    pub side: String,
    /// Average entry price.
    pub avg_entry_price: Decimal,
    /// Market value.
    pub market_value: Decimal,
    /// Last price.
    pub current_price: Decimal,
    /// Unrealized profit and loss.
    pub unrealized_pl: Decimal,
}
