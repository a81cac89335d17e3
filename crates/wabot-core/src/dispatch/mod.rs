//! Message classification and response dispatch.
//!
//! - `classify` -- pure per-message decision: reaction plus route
//! - `mention` -- mention and welcome text builders
//! - `dispatcher` -- `Dispatcher` performing the decided actions on a
//!   `SessionProvider`

pub mod classify;
pub mod dispatcher;
pub mod mention;

pub use classify::{Classification, ClassifierRules, GroupRoute, Route, classify};
pub use dispatcher::{Dispatcher, PrivateReplyMode};
