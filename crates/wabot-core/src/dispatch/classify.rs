//! Pure message classification.
//!
//! Given a message and its chat snapshot, decide which reaction (if any) to
//! attach and which route the message takes. Nothing here performs I/O, so
//! the same inputs always classify the same way.

use wabot_types::chat::{Chat, InboundMessage};
use wabot_types::config::BotConfig;
use wabot_types::reaction::Reaction;

/// Normalized matching rules derived from [`BotConfig`].
///
/// Keywords, spam markers and the broadcast trigger are lower-cased once up
/// front. Empty entries are dropped since an empty substring matches every
/// body.
#[derive(Debug, Clone)]
pub struct ClassifierRules {
    positive: Vec<String>,
    gratitude: Vec<String>,
    spam_markers: Vec<String>,
    broadcast_trigger: String,
    ping_trigger: String,
}

impl ClassifierRules {
    pub fn from_config(config: &BotConfig) -> Self {
        Self {
            positive: normalize(&config.reactions.positive),
            gratitude: normalize(&config.reactions.gratitude),
            spam_markers: normalize(&config.moderation.spam_markers),
            broadcast_trigger: config.commands.broadcast_trigger.to_lowercase(),
            ping_trigger: config.commands.ping_trigger.clone(),
        }
    }

    /// Reaction for a body: 👍 wins over ❤️ when both keyword sets match.
    pub fn pick_reaction(&self, body: &str) -> Option<Reaction> {
        let lower = body.to_lowercase();
        if contains_any(&lower, &self.positive) {
            Some(Reaction::ThumbsUp)
        } else if contains_any(&lower, &self.gratitude) {
            Some(Reaction::Heart)
        } else {
            None
        }
    }

    /// First configured spam marker found in the body, case-insensitively.
    pub fn find_spam_marker(&self, body: &str) -> Option<&str> {
        let lower = body.to_lowercase();
        self.spam_markers
            .iter()
            .find(|marker| lower.contains(marker.as_str()))
            .map(String::as_str)
    }

    /// Whether the body is exactly the broadcast trigger, ignoring case.
    pub fn is_broadcast(&self, body: &str) -> bool {
        !self.broadcast_trigger.is_empty() && body.to_lowercase() == self.broadcast_trigger
    }

    /// Whether the body is exactly the ping trigger.
    pub fn is_ping(&self, body: &str) -> bool {
        !self.ping_trigger.is_empty() && body == self.ping_trigger
    }
}

fn normalize(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|item| item.to_lowercase())
        .filter(|item| !item.is_empty())
        .collect()
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle.as_str()))
}

/// What to do with a group message. Checked in declaration order; the first
/// match wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupRoute {
    /// Body contains a spam marker. Enforcement depends on admin rights.
    Spam { marker: String },
    /// Body is the broadcast trigger.
    Broadcast,
    /// Body is the ping trigger.
    Ping,
    /// Nothing to do beyond the reaction pass.
    Passthrough,
}

/// Where a message is routed after the reaction pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Private,
    Group(GroupRoute),
}

/// The planned handling for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub reaction: Option<Reaction>,
    pub route: Route,
}

/// Classify a message against its chat snapshot.
pub fn classify(message: &InboundMessage, chat: &Chat, rules: &ClassifierRules) -> Classification {
    let body = message.body.as_str();
    let reaction = rules.pick_reaction(body);

    let route = if !chat.is_group {
        Route::Private
    } else if let Some(marker) = rules.find_spam_marker(body) {
        Route::Group(GroupRoute::Spam {
            marker: marker.to_string(),
        })
    } else if rules.is_broadcast(body) {
        Route::Group(GroupRoute::Broadcast)
    } else if rules.is_ping(body) {
        Route::Group(GroupRoute::Ping)
    } else {
        Route::Group(GroupRoute::Passthrough)
    };

    Classification { reaction, route }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
