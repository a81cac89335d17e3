//! Emoji reactions the bot attaches to messages.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A reaction chosen by the keyword pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reaction {
    /// 👍 for positive keywords.
    ThumbsUp,
    /// ❤️ for gratitude/love keywords.
    Heart,
}

impl Reaction {
    /// The emoji sent to the provider.
    pub fn emoji(self) -> &'static str {
        match self {
            Reaction::ThumbsUp => "👍",
            Reaction::Heart => "❤️",
        }
    }
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.emoji())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reaction_emoji() {
        assert_eq!(Reaction::ThumbsUp.emoji(), "👍");
        assert_eq!(Reaction::Heart.emoji(), "❤️");
        assert_eq!(Reaction::Heart.to_string(), "❤️");
    }
}
