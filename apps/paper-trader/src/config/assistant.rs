//! Language-model settings for the instruction interpreter.

use serde::{Deserialize, Serialize};

use crate::infrastructure::anthropic::DEFAULT_MODEL;

/// Anthropic section. An empty key disables the assistant.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnthropicSettings {
    /// API key.
    pub api_key: String,
    /// Model name.
    pub model: String,
    /// Maximum tokens in the reply.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
}

impl Default for AnthropicSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 4000,
            temperature: 0.1,
        }
    }
}

impl AnthropicSettings {
    /// Whether the assistant can be built.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

impl std::fmt::Debug for AnthropicSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicSettings")
            .field("api_key", &(!self.api_key.is_empty()).then_some("***"))
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}
