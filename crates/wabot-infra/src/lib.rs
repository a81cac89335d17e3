//! Infrastructure layer for wabot.
//!
//! Contains implementations of the ports defined in `wabot-core`: the
//! JSON Lines session bridge, the OpenAI-compatible completion client, the
//! QR pairing surface, plus config file loading and credential lookup.

pub mod bridge;
pub mod config;
pub mod llm;
pub mod pairing;
pub mod secret;
