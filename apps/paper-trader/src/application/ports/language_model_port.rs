//! Language Model Port (Driven Port)
//!
//! Single-turn text completion used by the instruction interpreter.

use async_trait::async_trait;

use crate::error::ExternalApiError;

/// One completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// System prompt.
    pub system: String,
    /// User message.
    pub prompt: String,
}

/// Text-in, text-out language model.
#[async_trait]
pub trait LanguageModelPort: Send + Sync {
    /// Return the model's text reply.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ExternalApiError>;
}
