//! Alpaca Markets adapters
//!
//! Implementations of `BrokerPort` and `MarketDataPort` over Alpaca's REST
//! APIs with:
//! - Status-code mapping onto the shared error taxonomy
//! - Single-attempt requests; rate limits surface with their Retry-After
//! - Paper/live environment selection with base-URL overrides

mod api_types;
mod broker_adapter;
mod config;
mod error;
mod http_client;
mod market_data_adapter;

pub use api_types::fold_order_status;
pub use broker_adapter::AlpacaBrokerAdapter;
pub use config::{AlpacaConfig, AlpacaEnvironment, DEFAULT_DATA_BASE_URL, DataFeed};
pub use error::AlpacaError;
pub use http_client::AlpacaHttpClient;
pub use market_data_adapter::AlpacaMarketDataAdapter;
