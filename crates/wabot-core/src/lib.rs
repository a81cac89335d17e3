//! Message classification, response dispatch and provider traits for wabot.
//!
//! This crate defines the "ports" the infrastructure layer implements
//! (`SessionProvider`, `LlmProvider`, `PairingSurface`) and the logic that
//! runs on top of them. It depends only on `wabot-types` -- never on
//! `wabot-infra` or any network crate.

pub mod dispatch;
pub mod llm;
pub mod runtime;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;
