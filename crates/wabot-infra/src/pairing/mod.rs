//! Pairing surfaces.
//!
//! - `qr` -- terminal QR code with optional PNG and data-URL output

pub mod qr;

pub use qr::QrPairingSurface;
