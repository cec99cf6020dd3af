//! Anthropic Messages API client implementing `LanguageModelPort`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::ports::{CompletionRequest, LanguageModelPort};
use crate::error::ExternalApiError;

const PROVIDER: &str = "anthropic";
const API_VERSION: &str = "2023-06-01";

/// Default API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
/// Default model.
pub const DEFAULT_MODEL: &str = "claude-3-7-sonnet-20250219";

/// Configuration for the Anthropic client.
#[derive(Clone)]
pub struct AnthropicConfig {
    /// API key.
    pub api_key: String,
    /// Model name.
    pub model: String,
    /// Base URL, without the `/v1/messages` path.
    pub base_url: String,
    /// Maximum tokens in the reply.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
    /// HTTP request timeout.
    pub timeout: Duration,
}

impl AnthropicConfig {
    /// Configuration with the default model and sampling settings.
    #[must_use]
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_tokens: 4000,
            temperature: 0.1,
            timeout: Duration::from_secs(60),
        }
    }
}

impl std::fmt::Debug for AnthropicConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicConfig")
            .field("api_key", &"***")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Errors from the Anthropic client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnthropicError {
    /// API key missing.
    #[error("ANTHROPIC_API_KEY is not set")]
    MissingApiKey,

    /// Network error.
    #[error("Network error: {0}")]
    Network(String),

    /// Response body could not be decoded.
    #[error("JSON parsing error: {0}")]
    JsonParse(String),

    /// Key refused.
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// Rate limited or overloaded.
    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Suggested retry delay in seconds.
        retry_after_secs: u64,
    },

    /// Any other API error.
    #[error("API error: {kind} - {message}")]
    Api {
        /// Anthropic error type, e.g. `invalid_request_error`.
        kind: String,
        /// Error message.
        message: String,
    },

    /// Reply had no text block.
    #[error("Reply contained no text")]
    EmptyReply,
}

impl From<AnthropicError> for ExternalApiError {
    fn from(err: AnthropicError) -> Self {
        match err {
            AnthropicError::Network(message) | AnthropicError::JsonParse(message) => {
                Self::Connection {
                    provider: PROVIDER,
                    message,
                }
            }
            AnthropicError::MissingApiKey | AnthropicError::AuthenticationFailed => {
                Self::AuthenticationFailed { provider: PROVIDER }
            }
            AnthropicError::RateLimited { retry_after_secs } => Self::RateLimited {
                provider: PROVIDER,
                retry_after_secs,
            },
            AnthropicError::Api { kind, message } => Self::Api {
                provider: PROVIDER,
                code: kind,
                message,
            },
            AnthropicError::EmptyReply => Self::Api {
                provider: PROVIDER,
                code: "empty_reply".to_string(),
                message: "Reply contained no text".to_string(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    #[serde(skip_serializing_if = "str::is_empty")]
    system: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

/// Anthropic Messages API client.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicClient {
    /// Create a new client.
    pub fn new(config: AnthropicConfig) -> Result<Self, AnthropicError> {
        if config.api_key.trim().is_empty() {
            return Err(AnthropicError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AnthropicError::Network(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Model in use.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    async fn send(&self, request: &CompletionRequest) -> Result<String, AnthropicError> {
        let body = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            system: &request.system,
            messages: [Message {
                role: "user",
                content: &request.prompt,
            }],
        };

        let url = format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'));
        tracing::debug!(model = %self.config.model, "Calling Anthropic Messages API");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| AnthropicError::Network(e.to_string()))?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        let text = response
            .text()
            .await
            .map_err(|e| AnthropicError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(map_error(status, retry_after, &text));
        }

        let parsed: MessagesResponse =
            serde_json::from_str(&text).map_err(|e| AnthropicError::JsonParse(e.to_string()))?;

        let reply: Vec<String> = parsed
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect();

        if reply.is_empty() {
            return Err(AnthropicError::EmptyReply);
        }
        Ok(reply.join("\n"))
    }
}

fn map_error(status: StatusCode, retry_after: Option<u64>, body: &str) -> AnthropicError {
    let (kind, message) = serde_json::from_str::<ErrorEnvelope>(body).map_or_else(
        |_| (status.as_u16().to_string(), body.to_string()),
        |env| (env.error.kind, env.error.message),
    );

    match status.as_u16() {
        401 | 403 => AnthropicError::AuthenticationFailed,
        429 | 529 => AnthropicError::RateLimited {
            retry_after_secs: retry_after.unwrap_or(30),
        },
        _ => AnthropicError::Api { kind, message },
    }
}

#[async_trait]
impl LanguageModelPort for AnthropicClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ExternalApiError> {
        Ok(self.send(request).await?)
    }
}
