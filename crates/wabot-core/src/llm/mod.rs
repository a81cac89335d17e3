//! LLM provider abstractions for wabot.
//!
//! - `LlmProvider`: RPITIT trait for concrete completion backends
//! - `AiResponder`: total wrapper that turns any provider failure into a
//!   fallback reply

pub mod provider;
pub mod responder;

pub use provider::LlmProvider;
pub use responder::{AiResponder, ResponderSettings};
