//! OHLCV bars and the supported timeframes.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Symbol;
use crate::error::ValidationError;

/// Bar interval. The set is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    /// One minute.
    #[serde(rename = "1Min")]
    OneMinute,
    /// Five minutes.
    #[serde(rename = "5Min")]
    FiveMinutes,
    /// Fifteen minutes.
    #[serde(rename = "15Min")]
    FifteenMinutes,
    /// Thirty minutes.
    #[serde(rename = "30Min")]
    ThirtyMinutes,
    /// One hour.
    #[serde(rename = "1Hour")]
    OneHour,
    /// One day.
    #[serde(rename = "1Day")]
    OneDay,
    /// One week.
    #[serde(rename = "1Week")]
    OneWeek,
    /// One month.
    #[serde(rename = "1Month")]
    OneMonth,
}

impl Timeframe {
    /// Every supported timeframe, shortest first.
    pub const ALL: [Self; 8] = [
        Self::OneMinute,
        Self::FiveMinutes,
        Self::FifteenMinutes,
        Self::ThirtyMinutes,
        Self::OneHour,
        Self::OneDay,
        Self::OneWeek,
        Self::OneMonth,
    ];

    /// Wire name, identical to the Alpaca query value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OneMinute => "1Min",
            Self::FiveMinutes => "5Min",
            Self::FifteenMinutes => "15Min",
            Self::ThirtyMinutes => "30Min",
            Self::OneHour => "1Hour",
            Self::OneDay => "1Day",
            Self::OneWeek => "1Week",
            Self::OneMonth => "1Month",
        }
    }

    /// Nominal length of one bar. Months count as 31 days.
    #[must_use]
    pub fn span(&self) -> Duration {
        match self {
            Self::OneMinute => Duration::minutes(1),
            Self::FiveMinutes => Duration::minutes(5),
            Self::FifteenMinutes => Duration::minutes(15),
            Self::ThirtyMinutes => Duration::minutes(30),
            Self::OneHour => Duration::hours(1),
            Self::OneDay => Duration::days(1),
            Self::OneWeek => Duration::weeks(1),
            Self::OneMonth => Duration::days(31),
        }
    }

    /// How far back to ask for `limit` bars.
    ///
    /// Doubled plus four days so weekends, holidays and overnight gaps still
    /// leave `limit` bars inside the window.
    #[must_use]
    pub fn lookback(&self, limit: u32) -> Duration {
        let bars = i32::try_from(limit.saturating_mul(2)).unwrap_or(i32::MAX);
        self.span()
            .checked_mul(bars)
            .and_then(|d| d.checked_add(&Duration::days(4)))
            .unwrap_or(Duration::MAX)
    }

    /// Start of a window ending at `end` that should hold `limit` bars.
    ///
    /// Saturates at the earliest representable time instead of overflowing.
    #[must_use]
    pub fn window_start(&self, end: DateTime<Utc>, limit: u32) -> DateTime<Utc> {
        end.checked_sub_signed(self.lookback(limit))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|tf| tf.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ValidationError::UnsupportedTimeframe(s.to_string()))
    }
}

/// Optional explicit time window for historical bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRange {
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Build a range; either bound may be open.
    ///
    /// Fails when both bounds are set and `start` is after `end`.
    pub fn new(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Self, ValidationError> {
        if let (Some(s), Some(e)) = (start, end)
            && s > e
        {
            return Err(ValidationError::InvalidDateRange {
                start: s.to_rfc3339(),
                end: e.to_rfc3339(),
            });
        }
        Ok(Self { start, end })
    }

    /// Whole calendar days in UTC: `start` from midnight, `end` through 23:59:59.
    pub fn from_dates(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Self, ValidationError> {
        let start = start
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc());
        let end = end
            .and_then(|d| d.and_hms_opt(23, 59, 59))
            .map(|dt| dt.and_utc());
        Self::new(start, end)
    }

    /// Range start, if bounded.
    #[must_use]
    pub const fn start(&self) -> Option<DateTime<Utc>> {
        self.start
    }

    /// Range end, if bounded.
    #[must_use]
    pub const fn end(&self) -> Option<DateTime<Utc>> {
        self.end
    }

    /// True when neither bound is set.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// One OHLCV record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    /// Interval start.
    pub timestamp: DateTime<Utc>,
    /// Open.
    pub open: Decimal,
    /// High.
    pub high: Decimal,
    /// Low.
    pub low: Decimal,
    /// Close.
    pub close: Decimal,
    /// Volume (fractional for crypto).
    pub volume: Decimal,
}

/// Bars for one symbol, ascending by timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarSeries {
    /// Symbol.
    pub symbol: Symbol,
    /// Timeframe that produced the bars (may differ from the request after fallback).
    pub timeframe: Timeframe,
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Build a series, sorting bars ascending by timestamp.
    #[must_use]
    pub fn new(symbol: Symbol, timeframe: Timeframe, mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|bar| bar.timestamp);
        Self {
            symbol,
            timeframe,
            bars,
        }
    }

    /// Bars, oldest first.
    #[must_use]
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Most recent bar.
    #[must_use]
    pub fn latest(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Number of bars.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// True when there are no bars.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Consume the series.
    #[must_use]
    pub fn into_bars(self) -> Vec<Bar> {
        self.bars
    }
}
