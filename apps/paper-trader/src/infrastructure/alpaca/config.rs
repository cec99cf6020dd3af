//! Alpaca adapter configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment for Alpaca API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlpacaEnvironment {
    /// Paper trading (simulated).
    #[default]
    Paper,
    /// Live trading (real money).
    Live,
}

impl AlpacaEnvironment {
    /// Default trading API base URL.
    #[must_use]
    pub const fn trading_base_url(&self) -> &'static str {
        match self {
            Self::Paper => "https://paper-api.alpaca.markets",
            Self::Live => "https://api.alpaca.markets",
        }
    }

    /// Check if this is live trading.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        matches!(self, Self::Live)
    }
}

impl fmt::Display for AlpacaEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Paper => write!(f, "PAPER"),
            Self::Live => write!(f, "LIVE"),
        }
    }
}

/// Default market data API base URL (same host for paper and live).
pub const DEFAULT_DATA_BASE_URL: &str = "https://data.alpaca.markets";

/// Stock data feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataFeed {
    /// IEX only, available on free plans.
    #[default]
    Iex,
    /// All US exchanges, requires a paid plan.
    Sip,
}

impl DataFeed {
    /// Query-string value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Iex => "iex",
            Self::Sip => "sip",
        }
    }
}

impl FromStr for DataFeed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "iex" => Ok(Self::Iex),
            "sip" => Ok(Self::Sip),
            other => Err(format!("unknown data feed '{other}' (expected iex or sip)")),
        }
    }
}

/// Configuration for the Alpaca adapters.
#[derive(Clone)]
pub struct AlpacaConfig {
    /// API key.
    pub api_key: String,
    /// API secret.
    pub api_secret: String,
    /// Trading environment.
    pub environment: AlpacaEnvironment,
    /// Trading API base URL override.
    pub trading_base_url: Option<String>,
    /// Market data API base URL override.
    pub data_base_url: Option<String>,
    /// Stock data feed.
    pub data_feed: DataFeed,
    /// HTTP request timeout.
    pub timeout: Duration,
}

impl AlpacaConfig {
    /// Create a new configuration.
    #[must_use]
    pub fn new(api_key: String, api_secret: String, environment: AlpacaEnvironment) -> Self {
        Self {
            api_key,
            api_secret,
            environment,
            trading_base_url: None,
            data_base_url: None,
            data_feed: DataFeed::default(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Set the HTTP timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Point both APIs at explicit base URLs (test servers, proxies).
    #[must_use]
    pub fn with_base_urls(mut self, trading: impl Into<String>, data: impl Into<String>) -> Self {
        self.trading_base_url = Some(trading.into());
        self.data_base_url = Some(data.into());
        self
    }

    /// Set the stock data feed.
    #[must_use]
    pub const fn with_data_feed(mut self, feed: DataFeed) -> Self {
        self.data_feed = feed;
        self
    }

    /// Trading API base URL, without a trailing slash.
    #[must_use]
    pub fn trading_base_url(&self) -> &str {
        self.trading_base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.trading_base_url())
            .trim_end_matches('/')
    }

    /// Data API base URL, without a trailing slash.
    #[must_use]
    pub fn data_base_url(&self) -> &str {
        self.data_base_url
            .as_deref()
            .unwrap_or(DEFAULT_DATA_BASE_URL)
            .trim_end_matches('/')
    }

    /// Whether both credentials are present.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.api_secret.trim().is_empty()
    }
}

impl fmt::Debug for AlpacaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlpacaConfig")
            .field("api_key", &mask(&self.api_key))
            .field("api_secret", &"***")
            .field("environment", &self.environment)
            .field("trading_base_url", &self.trading_base_url())
            .field("data_base_url", &self.data_base_url())
            .field("data_feed", &self.data_feed)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn mask(key: &str) -> String {
    let visible: String = key.chars().take(4).collect();
    format!("{visible}***")
}
