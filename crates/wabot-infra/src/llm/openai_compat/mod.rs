//! OpenAI-compatible LLM provider implementation.
//!
//! A single [`OpenAiCompatibleProvider`] serves OpenAI, Groq, Mistral,
//! Gemini's compatibility endpoint, OpenRouter, or a local server: anything
//! that answers `POST {base_url}/chat/completions`.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is only exposed
//! when building the `Authorization` header.

pub mod config;
pub mod types;

use secrecy::{ExposeSecret, SecretString};

use wabot_core::llm::LlmProvider;
use wabot_types::llm::{CompletionRequest, CompletionResponse, LlmError, MessageRole, Usage};

use self::config::OpenAiCompatConfig;
use self::types::{ChatMessage, ChatRequest, ChatResponse};

/// Provider for any OpenAI-compatible chat completions API.
///
/// # API Key Security
///
/// Does NOT derive Debug. The key is a [`SecretString`] and never appears in
/// Debug output, Display output, or tracing logs.
pub struct OpenAiCompatibleProvider {
    client: reqwest::Client,
    api_key: SecretString,
    provider_name: String,
    base_url: String,
    model: String,
}

impl OpenAiCompatibleProvider {
    /// Create a provider from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Provider`] if the HTTP client cannot be built.
    pub fn new(config: OpenAiCompatConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Provider {
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_key: config.api_key,
            provider_name: config.provider_name,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model,
        })
    }

    /// The default model for this provider.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Convert a generic [`CompletionRequest`] into the wire request.
    ///
    /// The system instruction, when present, becomes the first message.
    fn to_chat_request(&self, request: &CompletionRequest) -> ChatRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);

        if let Some(ref system) = request.system {
            messages.push(ChatMessage {
                role: MessageRole::System.to_string(),
                content: system.clone(),
            });
        }

        messages.extend(request.messages.iter().map(|m| ChatMessage {
            role: m.role.to_string(),
            content: m.content.clone(),
        }));

        let model = if request.model.is_empty() {
            self.model.clone()
        } else {
            request.model.clone()
        };

        ChatRequest {
            model,
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }
}

impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = self.to_chat_request(request);

        let response = self
            .client
            .post(self.url())
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after_ms = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(|secs| secs * 1_000);
            let error_body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => LlmError::AuthenticationFailed,
                429 => LlmError::RateLimited { retry_after_ms },
                _ => LlmError::Provider {
                    message: format!("HTTP {status}: {error_body}"),
                },
            });
        }

        let chat_resp: ChatResponse = response.json().await.map_err(|e| {
            LlmError::Deserialization(format!("failed to parse response: {e}"))
        })?;

        let content = chat_resp
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(LlmError::EmptyCompletion)?;

        let usage = chat_resp.usage.unwrap_or_default();

        Ok(CompletionResponse {
            id: chat_resp.id,
            content,
            model: if chat_resp.model.is_empty() {
                body.model
            } else {
                chat_resp.model
            },
            usage: Usage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
            },
        })
    }
}
