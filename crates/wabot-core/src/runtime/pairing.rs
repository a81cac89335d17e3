//! PairingSurface trait definition.

use wabot_types::error::PairingError;

/// Shows a pairing string to the operator (terminal QR code, image file, ...).
///
/// Called once per `qr` event. The provider may rotate the pairing string,
/// so implementations must tolerate repeated calls.
pub trait PairingSurface: Send + Sync {
    fn present(&self, pairing: &str) -> Result<(), PairingError>;
}
