//! SessionProvider trait definition.
//!
//! The dispatcher talks to the messaging session exclusively through this
//! trait. Chat, contact and message values are plain records; every action
//! goes through a method here and every method may fail.

use std::future::Future;

use wabot_types::chat::{Chat, ChatId, Contact, ContactId, InboundMessage, Membership};
use wabot_types::error::SessionError;
use wabot_types::reaction::Reaction;

/// Outbound actions and metadata lookups on an authenticated session.
///
/// Uses native async fn in traits (RPITIT). Implementations live in
/// wabot-infra (e.g., `BridgeSession`). Calls are never retried by callers.
pub trait SessionProvider: Send + Sync {
    /// Reply to a message in its chat, quoting it.
    fn reply(
        &self,
        message: &InboundMessage,
        text: &str,
    ) -> impl Future<Output = Result<(), SessionError>> + Send;

    /// Attach an emoji reaction to a message.
    fn react(
        &self,
        message: &InboundMessage,
        reaction: Reaction,
    ) -> impl Future<Output = Result<(), SessionError>> + Send;

    /// Send a new message to a chat with a structured mention list.
    fn send_message(
        &self,
        chat_id: &ChatId,
        text: &str,
        mentions: &[Contact],
    ) -> impl Future<Output = Result<(), SessionError>> + Send;

    /// Show the "composing" presence in a chat.
    fn set_typing(&self, chat_id: &ChatId) -> impl Future<Output = Result<(), SessionError>> + Send;

    /// Remove participants from a group.
    fn remove_participants(
        &self,
        chat_id: &ChatId,
        participants: &[ContactId],
    ) -> impl Future<Output = Result<(), SessionError>> + Send;

    /// Fetch current chat metadata.
    fn get_chat(&self, chat_id: &ChatId) -> impl Future<Output = Result<Chat, SessionError>> + Send;

    /// Resolve a contact by id.
    fn get_contact(
        &self,
        contact_id: &ContactId,
    ) -> impl Future<Output = Result<Contact, SessionError>> + Send;

    /// The bot's own membership record in a group.
    fn get_own_membership(
        &self,
        chat_id: &ChatId,
    ) -> impl Future<Output = Result<Membership, SessionError>> + Send;
}
