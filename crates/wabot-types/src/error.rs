use thiserror::Error;

/// Errors from the messaging session (transport, bridge or provider side).
///
/// None of these are retried. The dispatcher abandons the remaining steps of
/// the message that hit the error and the runner logs it.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The provider rejected or failed the action.
    #[error("session provider error: {0}")]
    Remote(String),

    #[error("session request timed out after {0}ms")]
    Timeout(u64),

    #[error("session closed")]
    Closed,

    #[error("session I/O error: {0}")]
    Io(String),

    /// The provider sent something that does not match the wire protocol.
    #[error("session protocol error: {0}")]
    Protocol(String),
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::Io(err.to_string())
    }
}

/// Errors presenting a pairing string to the operator.
#[derive(Debug, Error)]
pub enum PairingError {
    #[error("failed to encode pairing code: {0}")]
    Encode(String),

    #[error("failed to write pairing output: {0}")]
    Io(String),
}

impl From<std::io::Error> for PairingError {
    fn from(err: std::io::Error) -> Self {
        PairingError::Io(err.to_string())
    }
}
