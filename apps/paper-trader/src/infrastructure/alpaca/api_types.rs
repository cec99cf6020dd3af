//! Alpaca API request and response types.
//!
//! These types map directly to Alpaca's REST API format. Money and
//! quantity fields arrive as strings on the trading API and as numbers on
//! the data API; `Decimal` accepts both.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{
    Account, Bar, CancelOutcome, OrderRequest, OrderResult, OrderSide, OrderStatus, OrderType,
    Position,
};

use super::error::AlpacaError;

// ============================================================================
// Order Types
// ============================================================================

/// Order request for Alpaca API.
#[derive(Debug, Clone, Serialize)]
pub struct AlpacaOrderRequest {
    /// Stock symbol.
    pub symbol: String,
    /// Quantity (shares).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qty: Option<String>,
    /// Dollar amount, exclusive with `qty`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notional: Option<String>,
    /// Order side.
    pub side: String,
    /// Order type.
    #[serde(rename = "type")]
    pub order_type: String,
    /// Time in force.
    pub time_in_force: String,
    /// Limit price (for limit orders).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_price: Option<String>,
    /// Stop price (for stop orders).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_price: Option<String>,
    /// Client order ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_order_id: Option<String>,
    /// Extended hours trading.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extended_hours: Option<bool>,
}

impl From<&OrderRequest> for AlpacaOrderRequest {
    fn from(request: &OrderRequest) -> Self {
        Self {
            symbol: request.symbol.to_string(),
            qty: request.quantity.map(|q| q.normalize().to_string()),
            notional: request.notional.map(|n| n.normalize().to_string()),
            side: request.side.to_string(),
            order_type: order_type_wire(request.order_type).to_string(),
            time_in_force: request.time_in_force.to_string().to_lowercase(),
            limit_price: request.limit_price.map(|p| p.to_string()),
            stop_price: request.stop_price.map(|p| p.to_string()),
            client_order_id: request.client_order_id.clone(),
            extended_hours: request.extended_hours.then_some(true),
        }
    }
}

const fn order_type_wire(order_type: OrderType) -> &'static str {
    match order_type {
        OrderType::Market => "market",
        OrderType::Limit => "limit",
        OrderType::Stop => "stop",
        OrderType::StopLimit => "stop_limit",
    }
}

/// Order response from Alpaca API.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaOrderResponse {
    /// Broker order ID.
    pub id: String,
    /// Client order ID.
    pub client_order_id: String,
    /// Symbol.
    pub symbol: String,
    /// Quantity; null for notional orders.
    #[serde(default)]
    pub qty: Option<Decimal>,
    /// Filled quantity.
    pub filled_qty: Decimal,
    /// Average fill price.
    #[serde(default)]
    pub filled_avg_price: Option<Decimal>,
    /// Order status.
    pub status: String,
    /// Order side.
    pub side: String,
    /// Order type.
    #[serde(rename = "type")]
    pub order_type: String,
    /// Limit price.
    #[serde(default)]
    pub limit_price: Option<Decimal>,
    /// Stop price.
    #[serde(default)]
    pub stop_price: Option<Decimal>,
    /// Submitted timestamp.
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl AlpacaOrderResponse {
    /// Convert to the normalized `OrderResult`.
    pub fn to_order_result(&self) -> Result<OrderResult, AlpacaError> {
        let side: OrderSide = self
            .side
            .parse()
            .map_err(|e| AlpacaError::JsonParse(format!("order {}: {e}", self.id)))?;

        Ok(OrderResult {
            id: self.id.clone(),
            client_order_id: self.client_order_id.clone(),
            symbol: self.symbol.clone(),
            side,
            order_type: parse_order_type(&self.order_type),
            status: fold_order_status(&self.status),
            raw_status: self.status.clone(),
            qty: self.qty,
            filled_qty: self.filled_qty,
            filled_avg_price: self.filled_avg_price,
            limit_price: self.limit_price,
            stop_price: self.stop_price,
            submitted_at: self.submitted_at,
        })
    }
}

/// One entry of the multi-status cancel-all response.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaCancelStatus {
    /// Order ID.
    pub id: String,
    /// HTTP status of this cancellation.
    pub status: u16,
}

impl From<AlpacaCancelStatus> for CancelOutcome {
    fn from(entry: AlpacaCancelStatus) -> Self {
        Self {
            order_id: entry.id,
            status: entry.status,
        }
    }
}

// ============================================================================
// Account Types
// ============================================================================

/// Account response from Alpaca API.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaAccountResponse {
    /// Account number.
    pub account_number: String,
    /// Account status.
    pub status: String,
    /// Currency.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Cash balance.
    pub cash: Decimal,
    /// Buying power.
    pub buying_power: Decimal,
    /// Account equity.
    pub equity: Decimal,
    /// Portfolio value.
    #[serde(default)]
    pub portfolio_value: Option<Decimal>,
    /// Day trade count.
    #[serde(default)]
    pub daytrade_count: Option<i64>,
    /// Pattern day trader flag.
    #[serde(default)]
    pub pattern_day_trader: Option<bool>,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl From<AlpacaAccountResponse> for Account {
    fn from(response: AlpacaAccountResponse) -> Self {
        Self {
            account_number: response.account_number,
            status: response.status,
            currency: response.currency,
            cash: response.cash,
            buying_power: response.buying_power,
            portfolio_value: response.portfolio_value.unwrap_or(response.equity),
            equity: response.equity,
            daytrade_count: response.daytrade_count,
            pattern_day_trader: response.pattern_day_trader.unwrap_or(false),
        }
    }
}

// ============================================================================
// Position Types
// ============================================================================

/// Position response from Alpaca API.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaPositionResponse {
    /// Symbol.
    pub symbol: String,
    /// Quantity.
    pub qty: Decimal,
    /// Side (long/short).
    pub side: String,
    /// Average entry price.
    pub avg_entry_price: Decimal,
    /// Market value.
    pub market_value: Decimal,
    /// Current price.
    pub current_price: Decimal,
    /// Unrealized P&L.
    pub unrealized_pl: Decimal,
}

impl From<AlpacaPositionResponse> for Position {
    fn from(response: AlpacaPositionResponse) -> Self {
        Self {
            symbol: response.symbol,
            qty: response.qty,
            side: response.side,
            avg_entry_price: response.avg_entry_price,
            market_value: response.market_value,
            current_price: response.current_price,
            unrealized_pl: response.unrealized_pl,
        }
    }
}

// ============================================================================
// Market Data Types
// ============================================================================

/// One bar as the data API sends it.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaBar {
    /// Interval start.
    pub t: DateTime<Utc>,
    /// Open.
    pub o: Decimal,
    /// High.
    pub h: Decimal,
    /// Low.
    pub l: Decimal,
    /// Close.
    pub c: Decimal,
    /// Volume.
    pub v: Decimal,
}

impl From<AlpacaBar> for Bar {
    fn from(bar: AlpacaBar) -> Self {
        Self {
            timestamp: bar.t,
            open: bar.o,
            high: bar.h,
            low: bar.l,
            close: bar.c,
            volume: bar.v,
        }
    }
}

/// `GET /v2/stocks/{symbol}/bars` response.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaStockBarsResponse {
    /// Bars, `null` when the window is empty.
    #[serde(default)]
    pub bars: Option<Vec<AlpacaBar>>,
}

/// `GET /v1beta3/crypto/us/bars` response, keyed by pair.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaCryptoBarsResponse {
    /// Bars per symbol.
    #[serde(default)]
    pub bars: HashMap<String, Vec<AlpacaBar>>,
}

// ============================================================================
// Error Types
// ============================================================================

/// Error response from Alpaca API.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaErrorResponse {
    /// Error code, numeric on most endpoints.
    #[serde(default)]
    pub code: Option<AlpacaErrorCode>,
    /// Error message.
    pub message: String,
}

/// Alpaca error code, sent as a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AlpacaErrorCode {
    /// Numeric code such as `40310000`.
    Number(i64),
    /// Textual code.
    Text(String),
}

impl fmt::Display for AlpacaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Fold Alpaca's order statuses into the five normalized ones.
pub fn fold_order_status(status: &str) -> OrderStatus {
    match status.to_lowercase().as_str() {
        "partially_filled" => OrderStatus::PartiallyFilled,
        "filled" => OrderStatus::Filled,
        "canceled" | "pending_cancel" | "expired" | "done_for_day" | "replaced" => {
            OrderStatus::Canceled
        }
        "rejected" => OrderStatus::Rejected,
        // new, accepted, pending_new, held, stopped, suspended, calculated,
        // pending_replace, accepted_for_bidding and unknown -> New
        _ => OrderStatus::New,
    }
}

fn parse_order_type(order_type: &str) -> OrderType {
    match order_type {
        "limit" => OrderType::Limit,
        "stop" | "trailing_stop" => OrderType::Stop,
        "stop_limit" => OrderType::StopLimit,
        _ => OrderType::Market,
    }
}
