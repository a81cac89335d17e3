//! Credential lookup.
//!
//! - `env` -- reads the AI bearer credential from an environment variable

pub mod env;

pub use env::resolve_api_key;
