//! JSON Lines wire protocol spoken with the session bridge.
//!
//! Every line the bot writes is a [`BridgeRequest`]; every line the bridge
//! writes is a [`BridgeFrame`]: either the response to one request
//! (correlated by `id`) or an unsolicited session event.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use wabot_types::chat::{ChatId, ContactId};
use wabot_types::event::SessionEvent;

/// A request line: `{"id":"<uuid>","op":"<op>", ...fields}`.
#[derive(Debug, Clone, Serialize)]
pub struct BridgeRequest {
    pub id: Uuid,
    #[serde(flatten)]
    pub command: BridgeCommand,
}

impl BridgeRequest {
    /// Wrap `command` with a fresh time-ordered id.
    pub fn new(command: BridgeCommand) -> Self {
        Self {
            id: Uuid::now_v7(),
            command,
        }
    }

    /// Serialize as a single newline-terminated line.
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

/// Operations the bridge performs on the bot's behalf.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum BridgeCommand {
    /// Quote-reply to a message.
    Reply {
        chat_id: ChatId,
        message_id: String,
        text: String,
    },
    React {
        chat_id: ChatId,
        message_id: String,
        emoji: String,
    },
    SendMessage {
        chat_id: ChatId,
        text: String,
        mentions: Vec<ContactId>,
    },
    SetTyping {
        chat_id: ChatId,
    },
    RemoveParticipants {
        chat_id: ChatId,
        participants: Vec<ContactId>,
    },
    GetChat {
        chat_id: ChatId,
    },
    GetContact {
        contact_id: ContactId,
    },
    GetOwnMembership {
        chat_id: ChatId,
    },
}

impl BridgeCommand {
    /// The `op` name, for logs.
    pub fn op(&self) -> &'static str {
        match self {
            BridgeCommand::Reply { .. } => "reply",
            BridgeCommand::React { .. } => "react",
            BridgeCommand::SendMessage { .. } => "send_message",
            BridgeCommand::SetTyping { .. } => "set_typing",
            BridgeCommand::RemoveParticipants { .. } => "remove_participants",
            BridgeCommand::GetChat { .. } => "get_chat",
            BridgeCommand::GetContact { .. } => "get_contact",
            BridgeCommand::GetOwnMembership { .. } => "get_own_membership",
        }
    }
}

/// A line written by the bridge.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BridgeFrame {
    /// Outcome of the request with the same `id`. `error` wins over `result`.
    Response {
        id: Uuid,
        #[serde(default)]
        result: Option<Value>,
        #[serde(default)]
        error: Option<String>,
    },
    Event {
        event: SessionEvent,
    },
}

impl BridgeFrame {
    pub fn parse(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}
