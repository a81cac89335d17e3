//! Bot configuration types.
//!
//! `BotConfig` represents the optional `config.toml` controlling keyword sets,
//! moderation, command triggers, canned replies, the AI endpoint and the
//! session bridge. Every field has a default, so an empty file (or no file at
//! all) yields a working bot.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the bot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub reactions: ReactionConfig,
    pub moderation: ModerationConfig,
    pub commands: CommandConfig,
    pub private: PrivateConfig,
    pub welcome: WelcomeConfig,
    pub ai: AiConfig,
    pub bridge: BridgeConfig,
}

/// Keyword sets for the reaction pass. Matching is substring, case-insensitive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionConfig {
    /// Keywords that earn a 👍. Checked first.
    pub positive: Vec<String>,
    /// Keywords that earn a ❤️ when no positive keyword matched.
    pub gratitude: Vec<String>,
}

impl Default for ReactionConfig {
    fn default() -> Self {
        Self {
            positive: strings(&["good", "great", "nice", "awesome", "cool", "perfect", "👍"]),
            gratitude: strings(&["thank", "thx", "love", "❤"]),
        }
    }
}

/// Anti-spam policy for groups.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModerationConfig {
    /// Substrings that mark a message as spam (raw link prefixes).
    pub spam_markers: Vec<String>,
    /// Public reply sent before removing the sender.
    pub warning_text: String,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            spam_markers: strings(&["http://", "https://", "www.", "chat.whatsapp.com/"]),
            warning_text: "🚫 Links are not allowed in this group. The sender has been removed."
                .to_string(),
        }
    }
}

/// Group command triggers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandConfig {
    /// Literal that mentions every participant. Compared case-insensitively.
    pub broadcast_trigger: String,
    /// Diagnostic trigger, compared exactly. Empty disables it.
    pub ping_trigger: String,
    pub ping_reply: String,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            broadcast_trigger: "!everyone".to_string(),
            ping_trigger: "!ping".to_string(),
            ping_reply: "pong".to_string(),
        }
    }
}

/// Private-chat behavior when no AI credential is configured.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivateConfig {
    pub canned_greeting: String,
    /// Artificial typing delay before the canned reply, in milliseconds.
    pub reply_delay_ms: u64,
}

impl Default for PrivateConfig {
    fn default() -> Self {
        Self {
            canned_greeting: "Hey there! 👋 Karan here.\n\nThanks for reaching out! I'm currently \
                offline/busy, but I've received your message and will get back to you really \
                soon! 🚀"
                .to_string(),
            reply_delay_ms: 2_000,
        }
    }
}

/// Welcome message for new group members.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WelcomeConfig {
    /// `{mention}` is replaced by `@<local id>`, `{group}` by the group name.
    pub template: String,
}

impl Default for WelcomeConfig {
    fn default() -> Self {
        Self {
            template: "Welcome to {group}, {mention}! 👋".to_string(),
        }
    }
}

/// OpenAI-compatible chat completion endpoint used for private replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Base URL; `/chat/completions` is appended.
    pub base_url: String,
    pub model: String,
    pub system_prompt: String,
    /// Reply used whenever the endpoint fails.
    pub fallback_reply: String,
    /// Environment variable holding the bearer credential.
    pub api_key_env: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            system_prompt: "You are replying to WhatsApp messages on behalf of Karan. Answer \
                casually and concisely, like a friend texting back. If anyone asks who you are \
                or who they are talking to, tell them to ask Karan."
                .to_string(),
            fallback_reply: "Hey! Karan here 👋 I can't reply properly right now, but I'll get \
                back to you soon!"
                .to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            max_tokens: Some(300),
            temperature: None,
            timeout_secs: 60,
        }
    }
}

/// Subprocess hosting the WhatsApp Web session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Program to launch. Must be given here or on the command line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    pub args: Vec<String>,
    /// Per-request timeout for bridge calls, in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            command: None,
            args: Vec::new(),
            request_timeout_ms: 30_000,
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bot_config_default_values() {
        let config = BotConfig::default();
        assert_eq!(config.commands.broadcast_trigger, "!everyone");
        assert_eq!(config.commands.ping_reply, "pong");
        assert_eq!(config.private.reply_delay_ms, 2_000);
        assert_eq!(config.ai.api_key_env, "OPENAI_API_KEY");
        assert!(config.bridge.command.is_none());
        assert!(config.moderation.spam_markers.contains(&"http://".to_string()));
    }

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config: BotConfig = toml::from_str("").unwrap();
        assert_eq!(config.ai.model, "gpt-4o-mini");
        assert!(!config.reactions.positive.is_empty());
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let toml_str = r#"
[reactions]
positive = ["yay"]

[ai]
model = "llama-3.1-8b-instant"
base_url = "https://api.groq.com/openai/v1"

[bridge]
command = "node"
args = ["bridge.js"]
"#;
        let config: BotConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.reactions.positive, vec!["yay".to_string()]);
        // Sibling field inside the same section keeps its default
        assert!(config.reactions.gratitude.contains(&"thank".to_string()));
        assert_eq!(config.ai.model, "llama-3.1-8b-instant");
        assert_eq!(config.ai.timeout_secs, 60);
        assert_eq!(config.bridge.command.as_deref(), Some("node"));
        assert_eq!(config.bridge.request_timeout_ms, 30_000);
        assert_eq!(config.commands.ping_trigger, "!ping");
    }

    #[test]
    fn test_default_keywords_do_not_overlap_link_sample() {
        let config = BotConfig::default();
        let body = "check this out http://evil.link";
        assert!(!config.reactions.positive.iter().any(|k| body.contains(k.as_str())));
        assert!(!config.reactions.gratitude.iter().any(|k| body.contains(k.as_str())));
    }
}
