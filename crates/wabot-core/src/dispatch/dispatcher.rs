//! Message dispatcher: classify one event and perform its actions.
//!
//! Every session call is fallible and none is retried. The first failure
//! aborts the remaining steps for that message and is returned to the caller
//! (the event runner), which logs it.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::try_join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use wabot_types::chat::{Chat, GroupJoin, InboundMessage};
use wabot_types::config::BotConfig;
use wabot_types::error::SessionError;

use crate::llm::{AiResponder, LlmProvider};
use crate::session::SessionProvider;

use super::classify::{ClassifierRules, GroupRoute, Route, classify};
use super::mention::{mention_all, welcome_text};

/// How private chats are answered. Chosen once at startup.
pub enum PrivateReplyMode<P> {
    /// Reply with the AI responder's output.
    Ai(AiResponder<P>),
    /// Reply with a fixed greeting after an artificial delay.
    Canned { greeting: String, delay: Duration },
}

impl<P> PrivateReplyMode<P> {
    /// Canned mode using the greeting and delay from config.
    pub fn canned(config: &BotConfig) -> Self {
        PrivateReplyMode::Canned {
            greeting: config.private.canned_greeting.clone(),
            delay: Duration::from_millis(config.private.reply_delay_ms),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PrivateReplyMode::Ai(_) => "ai",
            PrivateReplyMode::Canned { .. } => "canned",
        }
    }
}

/// Fixed texts the dispatcher sends.
#[derive(Debug, Clone)]
struct Replies {
    spam_warning: String,
    ping: String,
    welcome_template: String,
}

/// Maps inbound events to outbound session actions.
///
/// Holds no per-message state, so one instance is shared (behind an `Arc`)
/// by every concurrently running handler.
pub struct Dispatcher<S, P> {
    session: Arc<S>,
    rules: ClassifierRules,
    replies: Replies,
    private: PrivateReplyMode<P>,
    shutdown: CancellationToken,
}

impl<S, P> Dispatcher<S, P>
where
    S: SessionProvider,
    P: LlmProvider,
{
    pub fn new(
        session: Arc<S>,
        config: &BotConfig,
        private: PrivateReplyMode<P>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            session,
            rules: ClassifierRules::from_config(config),
            replies: Replies {
                spam_warning: config.moderation.warning_text.clone(),
                ping: config.commands.ping_reply.clone(),
                welcome_template: config.welcome.template.clone(),
            },
            private,
            shutdown,
        }
    }

    /// Handle one inbound message.
    pub async fn handle_message(&self, message: &InboundMessage) -> Result<(), SessionError> {
        info!(from = %message.from, chat = %message.chat_id, body = %message.body, "Message received");

        let chat = self.session.get_chat(&message.chat_id).await?;
        let plan = classify(message, &chat, &self.rules);
        debug!(?plan, "Message classified");

        if let Some(reaction) = plan.reaction {
            self.session.react(message, reaction).await?;
        }

        match plan.route {
            Route::Private => self.reply_private(message, &chat).await,
            Route::Group(GroupRoute::Spam { marker }) => {
                self.enforce_spam(message, &chat, &marker).await
            }
            Route::Group(GroupRoute::Broadcast) => self.broadcast(&chat).await,
            Route::Group(GroupRoute::Ping) => self.session.reply(message, &self.replies.ping).await,
            Route::Group(GroupRoute::Passthrough) => Ok(()),
        }
    }

    /// Welcome a contact that joined a group.
    pub async fn handle_group_join(&self, join: &GroupJoin) -> Result<(), SessionError> {
        let chat = self.session.get_chat(&join.chat_id).await?;
        let contact = self.session.get_contact(&join.contact_id).await?;

        let text = welcome_text(&self.replies.welcome_template, &contact.id, chat.name.as_deref());
        self.session
            .send_message(&chat.id, &text, std::slice::from_ref(&contact))
            .await?;

        info!(chat = %chat.id, member = %contact.id, "Welcomed new group member");
        Ok(())
    }

    async fn reply_private(&self, message: &InboundMessage, chat: &Chat) -> Result<(), SessionError> {
        self.session.set_typing(&chat.id).await?;

        let body = match &self.private {
            PrivateReplyMode::Ai(responder) => responder.respond(&message.body).await,
            PrivateReplyMode::Canned { greeting, delay } => {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        debug!(chat = %chat.id, "Shutdown during reply delay, reply dropped");
                        return Ok(());
                    }
                    _ = tokio::time::sleep(*delay) => greeting.clone(),
                }
            }
        };

        self.session.reply(message, &body).await?;
        info!(chat = %chat.id, mode = self.private.label(), "Private reply sent");
        Ok(())
    }

    async fn enforce_spam(
        &self,
        message: &InboundMessage,
        chat: &Chat,
        marker: &str,
    ) -> Result<(), SessionError> {
        let offender = message.sender();
        let membership = self.session.get_own_membership(&chat.id).await?;

        if !membership.is_admin {
            warn!(
                chat = %chat.id,
                sender = %offender,
                marker,
                "Spam detected but bot is not a group admin, skipping enforcement"
            );
            return Ok(());
        }

        self.session.reply(message, &self.replies.spam_warning).await?;
        self.session
            .remove_participants(&chat.id, std::slice::from_ref(offender))
            .await?;

        info!(chat = %chat.id, sender = %offender, marker, "Removed spam sender from group");
        Ok(())
    }

    async fn broadcast(&self, chat: &Chat) -> Result<(), SessionError> {
        if chat.participants.is_empty() {
            debug!(chat = %chat.id, "Broadcast requested in a group with no participants");
            return Ok(());
        }

        let contacts = try_join_all(
            chat.participants
                .iter()
                .map(|participant| self.session.get_contact(&participant.id)),
        )
        .await?;

        let text = mention_all(&contacts);
        self.session.send_message(&chat.id, &text, &contacts).await?;

        info!(chat = %chat.id, mentioned = contacts.len(), "Broadcast mention sent");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
