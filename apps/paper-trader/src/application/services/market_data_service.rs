//! Market data facade with timeframe fallback.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::application::ports::{BarsRequest, MarketDataPort};
use crate::domain::{BarSeries, DateRange, Symbol, Timeframe};
use crate::error::{TradingError, ValidationError};

/// Most bars the data API returns for one request.
pub const MAX_BAR_LIMIT: u32 = 10_000;

/// Latest known price for a symbol, taken from the newest bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Symbol.
    pub symbol: Symbol,
    /// Close of the newest bar.
    pub price: Decimal,
    /// Close minus open of that bar.
    pub change: Decimal,
    /// Volume of that bar.
    pub volume: Decimal,
    /// Timestamp of that bar.
    pub timestamp: DateTime<Utc>,
    /// Timeframe the bar came from.
    pub timeframe: Timeframe,
}

/// Fetches historical bars.
///
/// When the requested timeframe yields nothing, the timeframes in
/// `fallback_order` are tried in sequence (skipping the requested one).
/// Vendor errors are returned immediately; only empty results fall back.
#[derive(Clone)]
pub struct MarketDataService {
    market_data: Arc<dyn MarketDataPort>,
    fallback_order: Vec<Timeframe>,
}

impl MarketDataService {
    /// Create the facade. An empty `fallback_order` disables fallback.
    pub fn new(market_data: Arc<dyn MarketDataPort>, fallback_order: Vec<Timeframe>) -> Self {
        Self {
            market_data,
            fallback_order,
        }
    }

    /// Configured fallback order.
    #[must_use]
    pub fn fallback_order(&self) -> &[Timeframe] {
        &self.fallback_order
    }

    /// Fetch the latest `limit` bars, parsing symbol and timeframe strings.
    pub async fn get_bars(
        &self,
        symbol: &str,
        timeframe: &str,
        limit: u32,
    ) -> Result<BarSeries, TradingError> {
        let timeframe: Timeframe = timeframe.parse()?;
        let symbol = Symbol::parse(symbol)?;
        self.get_bars_for(symbol, timeframe, limit).await
    }

    /// Fetch the latest `limit` bars for an already parsed request.
    pub async fn get_bars_for(
        &self,
        symbol: Symbol,
        timeframe: Timeframe,
        limit: u32,
    ) -> Result<BarSeries, TradingError> {
        self.get_bars_within(symbol, timeframe, limit, DateRange::default())
            .await
    }

    /// Fetch up to `limit` bars inside `range`, newest kept.
    pub async fn get_bars_within(
        &self,
        symbol: Symbol,
        timeframe: Timeframe,
        limit: u32,
        range: DateRange,
    ) -> Result<BarSeries, TradingError> {
        if limit == 0 {
            return Err(ValidationError::NonPositiveLimit.into());
        }
        if limit > MAX_BAR_LIMIT {
            return Err(ValidationError::LimitTooLarge {
                max: MAX_BAR_LIMIT,
                requested: limit,
            }
            .into());
        }

        for candidate in self.candidates(timeframe) {
            let request = BarsRequest::within(symbol.clone(), candidate, limit, range);
            let bars = self.market_data.get_bars(&request).await?;

            if bars.is_empty() {
                tracing::debug!(
                    symbol = %symbol,
                    timeframe = %candidate,
                    "No bars returned, trying next timeframe"
                );
                continue;
            }

            if candidate != timeframe {
                tracing::info!(
                    symbol = %symbol,
                    requested = %timeframe,
                    used = %candidate,
                    "Fell back to a different timeframe"
                );
            }

            let mut bars = bars;
            bars.sort_by_key(|bar| bar.timestamp);
            let excess = bars.len().saturating_sub(limit as usize);
            bars.drain(..excess);
            return Ok(BarSeries::new(symbol, candidate, bars));
        }

        Ok(BarSeries::new(symbol, timeframe, Vec::new()))
    }

    /// Close of the newest bar, trying the fallback order from its first entry.
    ///
    /// Returns `None` when no timeframe has data.
    pub async fn latest_price(&self, symbol: &str) -> Result<Option<PriceQuote>, TradingError> {
        let symbol = Symbol::parse(symbol)?;
        let first = self
            .fallback_order
            .first()
            .copied()
            .unwrap_or(Timeframe::OneDay);

        let series = self.get_bars_for(symbol, first, 1).await?;
        Ok(series.latest().map(|bar| PriceQuote {
            symbol: series.symbol.clone(),
            price: bar.close,
            change: bar.close - bar.open,
            volume: bar.volume,
            timestamp: bar.timestamp,
            timeframe: series.timeframe,
        }))
    }

    fn candidates(&self, requested: Timeframe) -> Vec<Timeframe> {
        std::iter::once(requested)
            .chain(
                self.fallback_order
                    .iter()
                    .copied()
                    .filter(move |tf| *tf != requested),
            )
            .collect()
    }
}

impl std::fmt::Debug for MarketDataService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketDataService")
            .field("fallback_order", &self.fallback_order)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Bar;
    use crate::error::ExternalApiError;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves canned bars per timeframe and records what was asked for.
    #[derive(Default)]
    struct CannedBars {
        by_timeframe: HashMap<Timeframe, Vec<Bar>>,
        requested: Mutex<Vec<Timeframe>>,
    }

    #[async_trait]
    impl MarketDataPort for CannedBars {
        async fn get_bars(&self, request: &BarsRequest) -> Result<Vec<Bar>, ExternalApiError> {
            self.requested.lock().unwrap().push(request.timeframe);
            Ok(self
                .by_timeframe
                .get(&request.timeframe)
                .cloned()
                .unwrap_or_default())
        }
    }

    fn bars(count: i64, close: Decimal) -> Vec<Bar> {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 14, 0, 0).unwrap();
        (0..count)
            .rev()
            .map(|i| Bar {
                timestamp: base + Duration::hours(i),
                open: close,
                high: close,
                low: close,
                close: close + Decimal::from(i),
                volume: dec!(10),
            })
            .collect()
    }

    fn service(port: CannedBars, fallback: Vec<Timeframe>) -> (MarketDataService, Arc<CannedBars>) {
        let port = Arc::new(port);
        let dyn_port: Arc<dyn MarketDataPort> = port.clone();
        (MarketDataService::new(dyn_port, fallback), port)
    }

    #[tokio::test]
    async fn bars_come_back_ascending() {
        let mut port = CannedBars::default();
        port.by_timeframe.insert(Timeframe::OneDay, bars(5, dec!(100)));
        let (service, _) = service(port, vec![]);

        let series = service.get_bars("aapl", "1Day", 5).await.unwrap();
        assert_eq!(series.len(), 5);
        assert!(
            series
                .bars()
                .windows(2)
                .all(|w| w[0].timestamp < w[1].timestamp)
        );
        assert_eq!(series.symbol.as_str(), "AAPL");
    }

    #[tokio::test]
    async fn unsupported_timeframe_is_validation_error() {
        let (service, port) = service(CannedBars::default(), vec![]);
        let err = service.get_bars("AAPL", "2Hour", 5).await.unwrap_err();
        assert!(matches!(
            err,
            TradingError::Validation(ValidationError::UnsupportedTimeframe(_))
        ));
        assert!(port.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn zero_limit_is_validation_error() {
        let (service, _) = service(CannedBars::default(), vec![]);
        let err = service.get_bars("AAPL", "1Day", 0).await.unwrap_err();
        assert!(matches!(
            err,
            TradingError::Validation(ValidationError::NonPositiveLimit)
        ));
    }

    #[tokio::test]
    async fn oversized_limit_is_validation_error() {
        let (service, port) = service(CannedBars::default(), vec![]);

        let err = service.get_bars("AAPL", "1Month", 2_000_000).await.unwrap_err();
        assert!(matches!(
            err,
            TradingError::Validation(ValidationError::LimitTooLarge {
                max: MAX_BAR_LIMIT,
                requested: 2_000_000
            })
        ));
        assert!(port.requested.lock().unwrap().is_empty());

        let series = service
            .get_bars("AAPL", "1Month", MAX_BAR_LIMIT)
            .await
            .unwrap();
        assert!(series.is_empty());
    }

    #[tokio::test]
    async fn date_range_reaches_the_port() {
        struct Recording(Mutex<Vec<BarsRequest>>);

        #[async_trait]
        impl MarketDataPort for Recording {
            async fn get_bars(&self, request: &BarsRequest) -> Result<Vec<Bar>, ExternalApiError> {
                self.0.lock().unwrap().push(request.clone());
                Ok(Vec::new())
            }
        }

        let port = Arc::new(Recording(Mutex::new(Vec::new())));
        let service = MarketDataService::new(port.clone(), vec![]);
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();

        service
            .get_bars_within(
                Symbol::parse("AAPL").unwrap(),
                Timeframe::OneDay,
                20,
                DateRange::new(Some(start), Some(end)).unwrap(),
            )
            .await
            .unwrap();

        let requests = port.0.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].start, start);
        assert_eq!(requests[0].end, Some(end));
    }

    #[tokio::test]
    async fn empty_result_falls_back_in_order() {
        let mut port = CannedBars::default();
        port.by_timeframe.insert(Timeframe::OneMinute, bars(3, dec!(50)));
        let (service, port) = service(
            port,
            vec![Timeframe::OneDay, Timeframe::OneHour, Timeframe::OneMinute],
        );

        let series = service.get_bars("AAPL", "1Day", 3).await.unwrap();
        assert_eq!(series.timeframe, Timeframe::OneMinute);
        assert_eq!(series.len(), 3);
        assert_eq!(
            *port.requested.lock().unwrap(),
            vec![Timeframe::OneDay, Timeframe::OneHour, Timeframe::OneMinute]
        );
    }

    #[tokio::test]
    async fn no_fallback_when_disabled() {
        let mut port = CannedBars::default();
        port.by_timeframe.insert(Timeframe::OneHour, bars(3, dec!(50)));
        let (service, port) = service(port, vec![]);

        let series = service.get_bars("AAPL", "1Day", 3).await.unwrap();
        assert!(series.is_empty());
        assert_eq!(series.timeframe, Timeframe::OneDay);
        assert_eq!(*port.requested.lock().unwrap(), vec![Timeframe::OneDay]);
    }

    #[tokio::test]
    async fn extra_bars_trimmed_to_newest() {
        let mut port = CannedBars::default();
        port.by_timeframe.insert(Timeframe::OneHour, bars(6, dec!(10)));
        let (service, _) = service(port, vec![]);

        let series = service.get_bars("AAPL", "1Hour", 2).await.unwrap();
        assert_eq!(series.len(), 2);
        // newest bar has the largest offset, close = 10 + 5
        assert_eq!(series.latest().unwrap().close, dec!(15));
    }

    #[tokio::test]
    async fn latest_price_uses_newest_close() {
        let mut port = CannedBars::default();
        port.by_timeframe.insert(Timeframe::OneHour, bars(1, dec!(412.3)));
        let (service, _) = service(port, vec![Timeframe::OneDay, Timeframe::OneHour]);

        let quote = service.latest_price("msft").await.unwrap().unwrap();
        assert_eq!(quote.symbol.as_str(), "MSFT");
        assert_eq!(quote.price, dec!(412.3));
        assert_eq!(quote.change, Decimal::ZERO);
        assert_eq!(quote.volume, dec!(10));
        assert_eq!(quote.timeframe, Timeframe::OneHour);
    }

    #[tokio::test]
    async fn latest_price_none_without_data() {
        let (service, _) = service(CannedBars::default(), vec![Timeframe::OneDay]);
        assert!(service.latest_price("ZZZZ").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn vendor_error_is_not_swallowed_by_fallback() {
        struct Failing;

        #[async_trait]
        impl MarketDataPort for Failing {
            async fn get_bars(&self, _: &BarsRequest) -> Result<Vec<Bar>, ExternalApiError> {
                Err(ExternalApiError::RateLimited {
                    provider: "alpaca",
                    retry_after_secs: 30,
                })
            }
        }

        let service = MarketDataService::new(Arc::new(Failing), vec![Timeframe::OneHour]);
        let err = service.get_bars("AAPL", "1Day", 5).await.unwrap_err();
        assert!(matches!(
            err,
            TradingError::ExternalApi(ExternalApiError::RateLimited { .. })
        ));
    }
}
