//! Chat, contact and message records as delivered by the session provider.
//!
//! These are read-only snapshots. Nothing here carries behavior that talks to
//! the network; outbound actions live on the `SessionProvider` trait in
//! `wabot-core`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A WhatsApp contact identifier (JID), e.g. `15551234567@c.us`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(String);

impl ContactId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The user part of the JID (text before `@`), used in mention text.
    ///
    /// Returns the whole identifier when it has no server part.
    pub fn local_part(&self) -> &str {
        self.0.split_once('@').map_or(self.0.as_str(), |(local, _)| local)
    }

    /// Mention token as it appears in message text: `@<local_part>`.
    pub fn mention(&self) -> String {
        format!("@{}", self.local_part())
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A chat identifier (JID). Groups use the `@g.us` server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(String);

impl ChatId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An inbound message, consumed once by the dispatcher and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Provider-assigned message id, used to target replies and reactions.
    pub id: String,
    /// The chat this message arrived in.
    pub chat_id: ChatId,
    /// Origin of the message. For groups this is the group JID.
    pub from: ContactId,
    /// Actual sender inside a group. Absent for private chats.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<ContactId>,
    /// Text body. Media messages arrive with an empty body.
    #[serde(default)]
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl InboundMessage {
    /// The contact responsible for this message: `author` when present,
    /// otherwise `from`.
    pub fn sender(&self) -> &ContactId {
        self.author.as_ref().unwrap_or(&self.from)
    }
}

/// A member of a group chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ContactId,
    #[serde(default)]
    pub is_admin: bool,
}

/// Chat metadata, re-read from the provider for every message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: ChatId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub is_group: bool,
    /// Participants in provider enumeration order. Empty for private chats.
    #[serde(default)]
    pub participants: Vec<Participant>,
}

/// A resolved contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// The bot's own membership record in a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Membership {
    pub is_admin: bool,
}

/// Notification that a contact joined a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupJoin {
    pub chat_id: ChatId,
    pub contact_id: ContactId,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
