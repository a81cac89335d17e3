//! Connection settings for an OpenAI-compatible endpoint.

use std::time::Duration;

use secrecy::SecretString;

use wabot_types::config::AiConfig;

/// Configuration for an [`super::OpenAiCompatibleProvider`].
///
/// Does not derive Debug: it carries the bearer credential.
pub struct OpenAiCompatConfig {
    /// Human-readable provider name used in logs and spans.
    pub provider_name: String,
    /// Base URL, e.g. `https://api.openai.com/v1`. `/chat/completions` is appended.
    pub base_url: String,
    pub api_key: SecretString,
    /// Model used when a request leaves `model` empty.
    pub model: String,
    pub timeout: Duration,
}

impl OpenAiCompatConfig {
    /// Build from the `[ai]` config section and a resolved credential.
    pub fn from_ai_config(ai: &AiConfig, api_key: SecretString) -> Self {
        Self {
            provider_name: provider_name_for(&ai.base_url).to_string(),
            base_url: ai.base_url.clone(),
            api_key,
            model: ai.model.clone(),
            timeout: Duration::from_secs(ai.timeout_secs),
        }
    }
}

/// Guess a short provider label from well-known hosts.
fn provider_name_for(base_url: &str) -> &'static str {
    if base_url.contains("api.openai.com") {
        "openai"
    } else if base_url.contains("api.groq.com") {
        "groq"
    } else if base_url.contains("api.mistral.ai") {
        "mistral"
    } else if base_url.contains("generativelanguage.googleapis.com") {
        "gemini"
    } else if base_url.contains("openrouter.ai") {
        "openrouter"
    } else {
        "openai_compatible"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_default_ai_config() {
        let config = OpenAiCompatConfig::from_ai_config(
            &AiConfig::default(),
            SecretString::from("sk-test"),
        );
        assert_eq!(config.provider_name, "openai");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_provider_name_for_known_and_unknown_hosts() {
        assert_eq!(provider_name_for("https://api.groq.com/openai/v1"), "groq");
        assert_eq!(provider_name_for("http://localhost:11434/v1"), "openai_compatible");
    }
}
