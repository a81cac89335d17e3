//! Session provider backed by a bridge subprocess.
//!
//! - `protocol` -- JSON Lines request and frame types
//! - `client` -- `BridgeSession`, the `SessionProvider` implementation

pub mod client;
pub mod protocol;

pub use client::BridgeSession;
