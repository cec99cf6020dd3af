//! Alpaca credentials and endpoints.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::infrastructure::alpaca::{AlpacaEnvironment, DataFeed};

#[allow(clippy::expect_used)]
static API_KEY_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9]{12,}$").expect("valid key regex"));

#[allow(clippy::expect_used)]
static SECRET_KEY_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{32,}$").expect("valid secret regex"));

/// Alpaca section.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlpacaSettings {
    /// API key.
    pub api_key: String,
    /// API secret.
    pub secret_key: String,
    /// Paper or live.
    pub environment: AlpacaEnvironment,
    /// Trading API base URL override.
    pub base_url: Option<String>,
    /// Market data API base URL override.
    pub data_url: Option<String>,
    /// Stock data feed.
    pub data_feed: DataFeed,
}

impl AlpacaSettings {
    /// Whether both credentials are present.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.secret_key.trim().is_empty()
    }

    /// Reject keys that cannot be Alpaca keys before any network call.
    ///
    /// Key IDs are 12+ uppercase alphanumerics, secrets 32+ alphanumerics.
    /// The error never echoes the value.
    pub fn check_key_format(&self) -> Result<(), ValidationError> {
        let api_key = self.api_key.trim();
        let secret_key = self.secret_key.trim();
        if api_key.is_empty() {
            return Err(ValidationError::MissingField("api_key"));
        }
        if secret_key.is_empty() {
            return Err(ValidationError::MissingField("secret_key"));
        }
        if !API_KEY_FORMAT.is_match(api_key) {
            return Err(ValidationError::MalformedCredential("API key"));
        }
        if !SECRET_KEY_FORMAT.is_match(secret_key) {
            return Err(ValidationError::MalformedCredential("API secret"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for AlpacaSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlpacaSettings")
            .field("api_key", &(!self.api_key.is_empty()).then_some("***"))
            .field("secret_key", &(!self.secret_key.is_empty()).then_some("***"))
            .field("environment", &self.environment)
            .field("base_url", &self.base_url)
            .field("data_url", &self.data_url)
            .field("data_feed", &self.data_feed)
            .finish()
    }
}
