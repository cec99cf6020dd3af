//! Alpaca historical bars adapter implementing `MarketDataPort`.
//!
//! Stocks use `/v2/stocks/{symbol}/bars`; crypto pairs (`BASE/QUOTE`) use
//! `/v1beta3/crypto/us/bars`. Both are asked for the newest bars first
//! (`sort=desc`) so `limit` keeps the most recent ones.

use async_trait::async_trait;
use chrono::SecondsFormat;

use crate::application::ports::{BarsRequest, MarketDataPort};
use crate::domain::Bar;
use crate::error::ExternalApiError;

use super::api_types::{AlpacaCryptoBarsResponse, AlpacaStockBarsResponse};
use super::config::{AlpacaConfig, DataFeed};
use super::error::AlpacaError;
use super::http_client::AlpacaHttpClient;

/// Alpaca market data adapter.
#[derive(Debug, Clone)]
pub struct AlpacaMarketDataAdapter {
    client: AlpacaHttpClient,
    feed: DataFeed,
}

impl AlpacaMarketDataAdapter {
    /// Create a new market data adapter.
    pub fn new(config: &AlpacaConfig) -> Result<Self, AlpacaError> {
        let client = AlpacaHttpClient::new(config)?;
        Ok(Self::with_client(client, config.data_feed))
    }

    /// Build on an existing HTTP client, sharing its connection pool.
    #[must_use]
    pub const fn with_client(client: AlpacaHttpClient, feed: DataFeed) -> Self {
        Self { client, feed }
    }

    fn base_query(request: &BarsRequest) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("timeframe", request.timeframe.as_str().to_string()),
            ("limit", request.limit.to_string()),
            (
                "start",
                request.start.to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
        ];
        if let Some(end) = request.end {
            query.push(("end", end.to_rfc3339_opts(SecondsFormat::Secs, true)));
        }
        query.push(("sort", "desc".to_string()));
        query
    }

    async fn stock_bars(&self, request: &BarsRequest) -> Result<Vec<Bar>, AlpacaError> {
        let mut query = Self::base_query(request);
        query.push(("feed", self.feed.as_str().to_string()));

        let response: AlpacaStockBarsResponse = self
            .client
            .data_get(&format!("/v2/stocks/{}/bars", request.symbol), &query)
            .await?;

        Ok(response
            .bars
            .unwrap_or_default()
            .into_iter()
            .map(Bar::from)
            .collect())
    }

    async fn crypto_bars(&self, request: &BarsRequest) -> Result<Vec<Bar>, AlpacaError> {
        let mut query = Self::base_query(request);
        query.push(("symbols", request.symbol.to_string()));

        let mut response: AlpacaCryptoBarsResponse = self
            .client
            .data_get("/v1beta3/crypto/us/bars", &query)
            .await?;

        Ok(response
            .bars
            .remove(request.symbol.as_str())
            .unwrap_or_default()
            .into_iter()
            .map(Bar::from)
            .collect())
    }
}

#[async_trait]
impl MarketDataPort for AlpacaMarketDataAdapter {
    async fn get_bars(&self, request: &BarsRequest) -> Result<Vec<Bar>, ExternalApiError> {
        let bars = if request.symbol.is_crypto() {
            self.crypto_bars(request).await?
        } else {
            self.stock_bars(request).await?
        };

        tracing::debug!(
            symbol = %request.symbol,
            timeframe = %request.timeframe,
            count = bars.len(),
            "Fetched bars"
        );
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Symbol, Timeframe};
    use chrono::{TimeZone, Utc};

    #[test]
    fn query_asks_for_newest_first() {
        let request = BarsRequest {
            symbol: Symbol::parse("AAPL").unwrap(),
            timeframe: Timeframe::OneHour,
            limit: 5,
            start: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            end: None,
        };
        let query = AlpacaMarketDataAdapter::base_query(&request);
        assert_eq!(
            query,
            vec![
                ("timeframe", "1Hour".to_string()),
                ("limit", "5".to_string()),
                ("start", "2024-03-01T00:00:00Z".to_string()),
                ("sort", "desc".to_string()),
            ]
        );
    }

    #[test]
    fn query_carries_end_when_bounded() {
        let request = BarsRequest {
            symbol: Symbol::parse("BTC/USD").unwrap(),
            timeframe: Timeframe::OneDay,
            limit: 30,
            start: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            end: Some(Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap()),
        };
        let query = AlpacaMarketDataAdapter::base_query(&request);
        assert!(query.contains(&("end", "2024-01-31T00:00:00Z".to_string())));
        assert_eq!(query.last(), Some(&("sort", "desc".to_string())));
    }
}
