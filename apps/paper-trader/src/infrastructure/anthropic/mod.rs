//! Anthropic language-model adapter.

mod client;

pub use client::{AnthropicClient, AnthropicConfig, AnthropicError, DEFAULT_BASE_URL, DEFAULT_MODEL};
