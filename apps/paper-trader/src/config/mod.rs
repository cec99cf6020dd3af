//! Configuration loading.
//!
//! Settings come from an optional YAML file (with `${VAR}` and
//! `${VAR:-default}` interpolation) and are then overridden by environment
//! variables. `.env` is loaded by `main` before this runs.
//!
//! # Usage
//!
//! ```rust,ignore
//! use paper_trader::config::load_settings;
//!
//! // Environment only, or the file named by PAPER_TRADER_CONFIG
//! let settings = load_settings(None)?;
//!
//! // Explicit file, still overridden by the environment
//! let settings = load_settings(Some(Path::new("paper-trader.yaml")))?;
//! ```

mod alpaca;
mod assistant;
mod market_data;

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use alpaca::AlpacaSettings;
pub use assistant::AnthropicSettings;
pub use market_data::{HttpSettings, MarketDataSettings};

/// Environment variable naming the YAML file.
pub const CONFIG_PATH_VAR: &str = "PAPER_TRADER_CONFIG";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Alpaca credentials and endpoints.
    #[serde(default)]
    pub alpaca: AlpacaSettings,
    /// Language-model settings.
    #[serde(default)]
    pub anthropic: AnthropicSettings,
    /// Market data behavior.
    #[serde(default)]
    pub market_data: MarketDataSettings,
    /// HTTP transport.
    #[serde(default)]
    pub http: HttpSettings,
}

// ============================================
// Configuration Loading
// ============================================

/// Load settings from YAML (if any) and the process environment.
///
/// The file is `path` when given, otherwise the one named by
/// `PAPER_TRADER_CONFIG`; with neither, defaults are used.
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let env_path = std::env::var(CONFIG_PATH_VAR)
        .ok()
        .filter(|p| !p.trim().is_empty());
    let path = path.map(Path::to_path_buf).or_else(|| env_path.map(Into::into));

    let base = match path {
        Some(path) => {
            let contents =
                std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
                    path: path.display().to_string(),
                    source: e,
                })?;
            parse_settings(&interpolate_env_vars(&contents))?
        }
        None => Settings::default(),
    };

    let settings = apply_env_overrides(base, |name| std::env::var(name).ok());
    validate_settings(&settings)?;
    Ok(settings)
}

/// Load settings from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_settings_from_string(yaml: &str) -> Result<Settings, ConfigError> {
    let settings = parse_settings(&interpolate_env_vars(yaml))?;
    validate_settings(&settings)?;
    Ok(settings)
}

fn parse_settings(yaml: &str) -> Result<Settings, ConfigError> {
    if yaml.trim().is_empty() {
        return Ok(Settings::default());
    }
    Ok(serde_yaml_bw::from_str(yaml)?)
}

/// Overlay environment variables on top of file settings.
///
/// Unset or empty variables leave the file value in place. An unparseable
/// `ALPACA_DATA_FEED` is logged and ignored.
pub fn apply_env_overrides<F>(mut settings: Settings, lookup: F) -> Settings
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(v) = get("ALPACA_API_KEY") {
        settings.alpaca.api_key = v;
    }
    if let Some(v) = get("ALPACA_SECRET_KEY") {
        settings.alpaca.secret_key = v;
    }
    if let Some(v) = get("ALPACA_BASE_URL") {
        settings.alpaca.base_url = Some(v);
    }
    if let Some(v) = get("ALPACA_DATA_URL") {
        settings.alpaca.data_url = Some(v);
    }
    if let Some(v) = get("ALPACA_DATA_FEED") {
        match v.parse() {
            Ok(feed) => settings.alpaca.data_feed = feed,
            Err(error) => tracing::warn!(%error, "Ignoring ALPACA_DATA_FEED"),
        }
    }
    if let Some(v) = get("ANTHROPIC_API_KEY") {
        settings.anthropic.api_key = v;
    }
    if let Some(v) = get("ANTHROPIC_MODEL") {
        settings.anthropic.model = v;
    }

    settings
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
pub fn interpolate_env_vars(input: &str) -> String {
    interpolate_with(input, |name| std::env::var(name).ok())
}

#[allow(clippy::expect_used)] // Regex is compile-time constant; expect() is safe here
fn interpolate_with<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map_or("", |m| m.as_str());
        match lookup(&cap[1]) {
            Some(v) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

/// Validate configuration values.
fn validate_settings(settings: &Settings) -> Result<(), ConfigError> {
    if settings.http.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "http.timeout_secs must be positive".to_string(),
        ));
    }

    if !(0.0..=1.0).contains(&settings.anthropic.temperature) {
        return Err(ConfigError::ValidationError(
            "anthropic.temperature must be between 0.0 and 1.0".to_string(),
        ));
    }
    if settings.anthropic.max_tokens == 0 {
        return Err(ConfigError::ValidationError(
            "anthropic.max_tokens must be positive".to_string(),
        ));
    }

    Ok(())
}
