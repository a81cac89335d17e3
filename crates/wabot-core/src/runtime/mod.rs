//! Session event loop.
//!
//! - `pairing` -- `PairingSurface` trait for showing pairing strings
//! - `runner` -- `EventRunner` consuming `SessionEvent`s and spawning handlers

pub mod pairing;
pub mod runner;

pub use pairing::PairingSurface;
pub use runner::{EventRunner, RunStats};
