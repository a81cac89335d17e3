//! Shared domain types for wabot.
//!
//! Plain data records exchanged between the session adapter, the dispatcher
//! and the AI responder: chats, messages, contacts, session events, reactions,
//! LLM request shapes, configuration and error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod event;
pub mod llm;
pub mod reaction;
