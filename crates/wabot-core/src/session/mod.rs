//! Session provider port.
//!
//! - `provider` -- `SessionProvider` capability trait for outbound actions and
//!   metadata lookups against the messaging session

pub mod provider;

pub use provider::SessionProvider;
