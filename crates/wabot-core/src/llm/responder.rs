//! AI responder: one prompt in, one reply out, never an error.
//!
//! Wraps an [`LlmProvider`] with the fixed system instruction and model, and
//! converts every provider failure into the configured fallback reply. Callers
//! can treat [`AiResponder::respond`] as total.

use tracing::{Instrument, debug, info_span, warn};

use wabot_types::config::AiConfig;
use wabot_types::llm::{CompletionRequest, Message};

use super::provider::LlmProvider;

/// Fixed request parameters for the responder.
#[derive(Debug, Clone)]
pub struct ResponderSettings {
    pub model: String,
    pub system_prompt: String,
    pub fallback_reply: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
}

impl From<&AiConfig> for ResponderSettings {
    fn from(config: &AiConfig) -> Self {
        Self {
            model: config.model.clone(),
            system_prompt: config.system_prompt.clone(),
            fallback_reply: config.fallback_reply.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

/// Produces free-text replies for private chats.
pub struct AiResponder<P> {
    provider: P,
    settings: ResponderSettings,
}

impl<P: LlmProvider> AiResponder<P> {
    pub fn new(provider: P, settings: ResponderSettings) -> Self {
        Self { provider, settings }
    }

    /// Build the single-turn request for a prompt.
    pub fn build_request(&self, prompt: &str) -> CompletionRequest {
        CompletionRequest {
            model: self.settings.model.clone(),
            messages: vec![Message::user(prompt)],
            system: Some(self.settings.system_prompt.clone()),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        }
    }

    /// Ask the provider for a reply to `prompt`.
    ///
    /// Returns the completion text verbatim, or the fallback reply on any
    /// transport, status or decoding failure and on an empty completion.
    pub async fn respond(&self, prompt: &str) -> String {
        let request = self.build_request(prompt);

        let span = info_span!(
            "gen_ai.complete",
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = %request.model,
            gen_ai.request.max_tokens = ?request.max_tokens,
            gen_ai.request.temperature = ?request.temperature,
        );

        match self.provider.complete(&request).instrument(span).await {
            Ok(response) if !response.content.trim().is_empty() => {
                debug!(
                    response_id = %response.id,
                    input_tokens = response.usage.input_tokens,
                    output_tokens = response.usage.output_tokens,
                    "AI reply generated"
                );
                response.content
            }
            Ok(response) => {
                warn!(response_id = %response.id, "AI returned an empty reply, using fallback");
                self.settings.fallback_reply.clone()
            }
            Err(err) => {
                warn!(provider = self.provider.name(), error = %err, "AI request failed, using fallback");
                self.settings.fallback_reply.clone()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
