//! Market data and HTTP transport settings.

use serde::{Deserialize, Serialize};

use crate::domain::Timeframe;

/// Market data section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketDataSettings {
    /// Timeframes tried in order when the requested one returns no bars.
    /// Empty disables fallback.
    pub fallback_order: Vec<Timeframe>,
}

impl Default for MarketDataSettings {
    fn default() -> Self {
        Self {
            fallback_order: vec![Timeframe::OneDay, Timeframe::OneHour, Timeframe::OneMinute],
        }
    }
}

/// HTTP section shared by the vendor clients.
///
/// Requests are never retried, so only the timeout is tunable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}
