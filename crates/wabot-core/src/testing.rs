//! Test doubles shared by the dispatcher and runner tests.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Mutex;

use wabot_types::chat::{
    Chat, ChatId, Contact, ContactId, InboundMessage, Membership, Participant,
};
use wabot_types::error::SessionError;
use wabot_types::reaction::Reaction;

use crate::session::SessionProvider;

pub const GROUP_ID: &str = "120363000000@g.us";
pub const PEER_ID: &str = "15550000001@c.us";

/// An outbound action requested from the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Reply { message_id: String, text: String },
    React { message_id: String, reaction: Reaction },
    Send { chat_id: ChatId, text: String, mentions: Vec<ContactId> },
    Typing { chat_id: ChatId },
    Remove { chat_id: ChatId, participants: Vec<ContactId> },
}

/// In-memory `SessionProvider` that records every action it is asked to do.
#[derive(Default)]
pub struct RecordingSession {
    chats: HashMap<ChatId, Chat>,
    admin_in: HashSet<ChatId>,
    failing: HashSet<&'static str>,
    actions: Mutex<Vec<Action>>,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chat(mut self, chat: Chat) -> Self {
        self.chats.insert(chat.id.clone(), chat);
        self
    }

    pub fn admin_in(mut self, chat_id: &str) -> Self {
        self.admin_in.insert(ChatId::new(chat_id));
        self
    }

    /// Make the named operation (e.g. "get_chat", "react") fail.
    pub fn failing(mut self, op: &'static str) -> Self {
        self.failing.insert(op);
        self
    }

    pub fn actions(&self) -> Vec<Action> {
        self.actions.lock().unwrap().clone()
    }

    fn check(&self, op: &'static str) -> Result<(), SessionError> {
        if self.failing.contains(op) {
            Err(SessionError::Remote(format!("{op} failed")))
        } else {
            Ok(())
        }
    }

    fn record(&self, op: &'static str, action: Action) -> Result<(), SessionError> {
        self.check(op)?;
        self.actions.lock().unwrap().push(action);
        Ok(())
    }
}

impl SessionProvider for RecordingSession {
    fn reply(
        &self,
        message: &InboundMessage,
        text: &str,
    ) -> impl Future<Output = Result<(), SessionError>> + Send {
        let result = self.record(
            "reply",
            Action::Reply {
                message_id: message.id.clone(),
                text: text.to_string(),
            },
        );
        async move { result }
    }

    fn react(
        &self,
        message: &InboundMessage,
        reaction: Reaction,
    ) -> impl Future<Output = Result<(), SessionError>> + Send {
        let result = self.record(
            "react",
            Action::React {
                message_id: message.id.clone(),
                reaction,
            },
        );
        async move { result }
    }

    fn send_message(
        &self,
        chat_id: &ChatId,
        text: &str,
        mentions: &[Contact],
    ) -> impl Future<Output = Result<(), SessionError>> + Send {
        let result = self.record(
            "send_message",
            Action::Send {
                chat_id: chat_id.clone(),
                text: text.to_string(),
                mentions: mentions.iter().map(|c| c.id.clone()).collect(),
            },
        );
        async move { result }
    }

    fn set_typing(&self, chat_id: &ChatId) -> impl Future<Output = Result<(), SessionError>> + Send {
        let result = self.record(
            "set_typing",
            Action::Typing {
                chat_id: chat_id.clone(),
            },
        );
        async move { result }
    }

    fn remove_participants(
        &self,
        chat_id: &ChatId,
        participants: &[ContactId],
    ) -> impl Future<Output = Result<(), SessionError>> + Send {
        let result = self.record(
            "remove_participants",
            Action::Remove {
                chat_id: chat_id.clone(),
                participants: participants.to_vec(),
            },
        );
        async move { result }
    }

    fn get_chat(&self, chat_id: &ChatId) -> impl Future<Output = Result<Chat, SessionError>> + Send {
        let result = self.check("get_chat").and_then(|()| {
            self.chats
                .get(chat_id)
                .cloned()
                .ok_or_else(|| SessionError::Remote(format!("unknown chat {chat_id}")))
        });
        async move { result }
    }

    fn get_contact(
        &self,
        contact_id: &ContactId,
    ) -> impl Future<Output = Result<Contact, SessionError>> + Send {
        let result = self.check("get_contact").map(|()| Contact {
            id: contact_id.clone(),
            display_name: None,
        });
        async move { result }
    }

    fn get_own_membership(
        &self,
        chat_id: &ChatId,
    ) -> impl Future<Output = Result<Membership, SessionError>> + Send {
        let result = self.check("get_own_membership").map(|()| Membership {
            is_admin: self.admin_in.contains(chat_id),
        });
        async move { result }
    }
}

pub fn group_chat(participants: &[&str]) -> Chat {
    Chat {
        id: ChatId::new(GROUP_ID),
        name: Some("Weekend Plans".to_string()),
        is_group: true,
        participants: participants
            .iter()
            .map(|id| Participant {
                id: ContactId::new(*id),
                is_admin: false,
            })
            .collect(),
    }
}

pub fn private_chat() -> Chat {
    Chat {
        id: ChatId::new(PEER_ID),
        name: None,
        is_group: false,
        participants: Vec::new(),
    }
}

/// A private-chat message from `PEER_ID`.
pub fn message(body: &str) -> InboundMessage {
    InboundMessage {
        id: "msg-1".to_string(),
        chat_id: ChatId::new(PEER_ID),
        from: ContactId::new(PEER_ID),
        author: None,
        body: body.to_string(),
        timestamp: None,
    }
}

/// A group message in `GROUP_ID`, optionally with an author.
pub fn group_message(body: &str, author: Option<&str>) -> InboundMessage {
    InboundMessage {
        id: "msg-g".to_string(),
        chat_id: ChatId::new(GROUP_ID),
        from: ContactId::new(GROUP_ID),
        author: author.map(ContactId::new),
        body: body.to_string(),
        timestamp: None,
    }
}
