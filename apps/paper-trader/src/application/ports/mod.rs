//! Driven ports: interfaces the facades use to reach vendors.

mod broker_port;
mod language_model_port;
mod market_data_port;

pub use broker_port::BrokerPort;
pub use language_model_port::{CompletionRequest, LanguageModelPort};
pub use market_data_port::{BarsRequest, MarketDataPort};
