//! Market Data Port (Driven Port)
//!
//! Interface for historical bars.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Bar, DateRange, Symbol, Timeframe};
use crate::error::ExternalApiError;

/// Request for the most recent bars of one symbol inside a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarsRequest {
    /// Stock ticker or crypto pair.
    pub symbol: Symbol,
    /// Bar interval.
    pub timeframe: Timeframe,
    /// Maximum number of bars.
    pub limit: u32,
    /// Window start.
    pub start: DateTime<Utc>,
    /// Window end; open means "now".
    pub end: Option<DateTime<Utc>>,
}

impl BarsRequest {
    /// Request the latest `limit` bars ending now.
    #[must_use]
    pub fn latest(symbol: Symbol, timeframe: Timeframe, limit: u32) -> Self {
        Self::within(symbol, timeframe, limit, DateRange::default())
    }

    /// Request the latest `limit` bars inside `range`.
    ///
    /// An open start is derived from the end (or now) and the timeframe.
    #[must_use]
    pub fn within(symbol: Symbol, timeframe: Timeframe, limit: u32, range: DateRange) -> Self {
        let start = range.start().unwrap_or_else(|| {
            timeframe.window_start(range.end().unwrap_or_else(Utc::now), limit)
        });
        Self {
            symbol,
            timeframe,
            limit,
            start,
            end: range.end(),
        }
    }
}

/// Historical bar source.
#[async_trait]
pub trait MarketDataPort: Send + Sync {
    /// Fetch bars in any order; callers sort. An unknown symbol may yield
    /// either an empty list or an error, depending on the vendor.
    async fn get_bars(&self, request: &BarsRequest) -> Result<Vec<Bar>, ExternalApiError>;
}
