//! LlmProvider trait definition.

use std::future::Future;

use wabot_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for chat-completion backends (OpenAI-compatible endpoints, etc.).
///
/// Implementations live in wabot-infra (e.g., `OpenAiCompatibleProvider`).
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "openai").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
