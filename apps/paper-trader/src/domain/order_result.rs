//! Normalized view of an order as the broker reports it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{OrderSide, OrderType};
use crate::error::ValidationError;

/// Order status as exposed to callers.
///
/// Vendor statuses are folded into these five; the raw string is kept on
/// [`OrderResult::raw_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Working at the broker, nothing filled yet.
    New,
    /// Some quantity filled.
    PartiallyFilled,
    /// Completely filled.
    Filled,
    /// No longer working without a full fill (canceled, expired).
    Canceled,
    /// Refused by the broker.
    Rejected,
}

impl OrderStatus {
    /// Returns true if the order can no longer change.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Filled | Self::Canceled | Self::Rejected)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::New => "new",
            Self::PartiallyFilled => "partially_filled",
            Self::Filled => "filled",
            Self::Canceled => "canceled",
            Self::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// Result of submitting or reading an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderResult {
    /// Broker-assigned order ID.
    pub id: String,
    /// Client order ID echoed back.
    pub client_order_id: String,
    /// Symbol.
    pub symbol: String,
    /// Side.
    pub side: OrderSide,
    /// Order type.
    pub order_type: OrderType,
    /// Normalized status.
    pub status: OrderStatus,
    /// Status string exactly as the broker sent it.
    pub raw_status: String,
    /// Ordered quantity, absent for notional orders placed elsewhere.
    pub qty: Option<Decimal>,
    /// Filled quantity.
    pub filled_qty: Decimal,
    /// Average fill price.
    pub filled_avg_price: Option<Decimal>,
    /// Limit price.
    pub limit_price: Option<Decimal>,
    /// Stop price.
    pub stop_price: Option<Decimal>,
    /// Submission time.
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Outcome of one cancellation inside a cancel-all request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelOutcome {
    /// Order ID.
    pub order_id: String,
    /// HTTP status the broker reported for this order.
    pub status: u16,
}

impl CancelOutcome {
    /// Whether the broker accepted the cancellation.
    #[must_use]
    pub const fn accepted(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Which orders to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatusFilter {
    /// Working orders.
    #[default]
    Open,
    /// Filled, canceled, expired, rejected.
    Closed,
    /// Everything.
    All,
}

impl OrderStatusFilter {
    /// Query-string value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::All => "all",
        }
    }
}

impl FromStr for OrderStatusFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "all" => Ok(Self::All),
            other => Err(ValidationError::InvalidValue {
                field: "order status filter",
                value: other.to_string(),
            }),
        }
    }
}
