//! Dependency Injection Container
//!
//! Builds the facades from loaded settings. The broker and market data
//! adapters share one Alpaca HTTP client; the instruction interpreter is
//! only wired when an Anthropic key is configured.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::application::ports::{BrokerPort, LanguageModelPort, MarketDataPort};
use crate::application::services::{
    AccountService, InstructionInterpreter, MarketDataService, OrderService,
};
use crate::config::Settings;

use super::alpaca::{
    AlpacaBrokerAdapter, AlpacaConfig, AlpacaError, AlpacaHttpClient, AlpacaMarketDataAdapter,
};
use super::anthropic::{AnthropicClient, AnthropicConfig, AnthropicError};

/// Wiring errors.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// `ALPACA_API_KEY` or `ALPACA_SECRET_KEY` is missing.
    #[error("Alpaca credentials are not configured (set ALPACA_API_KEY and ALPACA_SECRET_KEY)")]
    MissingAlpacaCredentials,

    /// Alpaca client could not be built.
    #[error("Alpaca client setup failed: {0}")]
    Alpaca(#[from] AlpacaError),

    /// Anthropic client could not be built.
    #[error("Anthropic client setup failed: {0}")]
    Anthropic(#[from] AnthropicError),
}

/// Wired facades.
#[derive(Debug, Clone)]
pub struct Container {
    orders: OrderService,
    accounts: AccountService,
    market_data: MarketDataService,
    interpreter: Option<InstructionInterpreter>,
}

impl Container {
    /// Wire facades over arbitrary port implementations.
    pub fn new(
        broker: Arc<dyn BrokerPort>,
        market_data: Arc<dyn MarketDataPort>,
        model: Option<Arc<dyn LanguageModelPort>>,
        settings: &Settings,
    ) -> Self {
        let orders = OrderService::new(Arc::clone(&broker));
        let accounts = AccountService::new(broker);
        let market_data =
            MarketDataService::new(market_data, settings.market_data.fallback_order.clone());
        let interpreter = model.map(|model| {
            InstructionInterpreter::new(
                model,
                orders.clone(),
                accounts.clone(),
                market_data.clone(),
            )
        });

        Self {
            orders,
            accounts,
            market_data,
            interpreter,
        }
    }

    /// Wire the Alpaca and Anthropic adapters from settings.
    ///
    /// # Errors
    ///
    /// - `MissingAlpacaCredentials` if either Alpaca credential is empty
    /// - `Alpaca` / `Anthropic` if an HTTP client cannot be built
    pub fn from_settings(settings: &Settings) -> Result<Self, ContainerError> {
        if !settings.alpaca.has_credentials() {
            return Err(ContainerError::MissingAlpacaCredentials);
        }

        let alpaca = alpaca_config(settings);
        let client = AlpacaHttpClient::new(&alpaca)?;
        let broker: Arc<dyn BrokerPort> = Arc::new(AlpacaBrokerAdapter::with_client(
            client.clone(),
            alpaca.environment,
        ));
        let market_data: Arc<dyn MarketDataPort> = Arc::new(
            AlpacaMarketDataAdapter::with_client(client, alpaca.data_feed),
        );

        let model = match anthropic_config(settings) {
            Some(config) => {
                let client = AnthropicClient::new(config)?;
                tracing::debug!(model = client.model(), "Assistant enabled");
                Some(Arc::new(client) as Arc<dyn LanguageModelPort>)
            }
            None => {
                tracing::debug!("ANTHROPIC_API_KEY not set, assistant disabled");
                None
            }
        };

        tracing::info!(
            environment = %alpaca.environment,
            trading_url = alpaca.trading_base_url(),
            "Alpaca facades ready"
        );

        Ok(Self::new(broker, market_data, model, settings))
    }

    /// Order facade.
    #[must_use]
    pub const fn orders(&self) -> &OrderService {
        &self.orders
    }

    /// Account facade.
    #[must_use]
    pub const fn accounts(&self) -> &AccountService {
        &self.accounts
    }

    /// Market data facade.
    #[must_use]
    pub const fn market_data(&self) -> &MarketDataService {
        &self.market_data
    }

    /// Instruction interpreter, if an assistant is configured.
    #[must_use]
    pub const fn interpreter(&self) -> Option<&InstructionInterpreter> {
        self.interpreter.as_ref()
    }
}

/// Alpaca adapter configuration derived from settings.
#[must_use]
pub fn alpaca_config(settings: &Settings) -> AlpacaConfig {
    let alpaca = &settings.alpaca;
    let mut config = AlpacaConfig::new(
        alpaca.api_key.clone(),
        alpaca.secret_key.clone(),
        alpaca.environment,
    )
    .with_timeout(Duration::from_secs(settings.http.timeout_secs))
    .with_data_feed(alpaca.data_feed);
    config.trading_base_url.clone_from(&alpaca.base_url);
    config.data_base_url.clone_from(&alpaca.data_url);
    config
}

/// Anthropic client configuration, or `None` when no key is set.
#[must_use]
pub fn anthropic_config(settings: &Settings) -> Option<AnthropicConfig> {
    let anthropic = &settings.anthropic;
    if !anthropic.is_enabled() {
        return None;
    }

    let mut config = AnthropicConfig::new(anthropic.api_key.clone());
    config.model.clone_from(&anthropic.model);
    config.max_tokens = anthropic.max_tokens;
    config.temperature = anthropic.temperature;
    Some(config)
}
