//! QR code pairing surface.
//!
//! Prints the pairing string as a compact half-block QR code on the console
//! and, when configured, also saves it as a PNG plus a sibling `.txt` file
//! holding a `data:image/png;base64,...` URL (handy on headless hosts).

use std::io::Write;
use std::path::{Path, PathBuf};

use base64::Engine;
use image::{ImageBuffer, Luma};
use qrcode::{Color, EcLevel, QrCode};

use wabot_core::runtime::PairingSurface;
use wabot_types::error::PairingError;

/// Pixels per QR module in the PNG output.
const MODULE_PX: u32 = 10;
/// Light border around the code, in modules.
const QUIET_ZONE: usize = 2;

/// Renders pairing strings as QR codes.
#[derive(Debug, Clone, Default)]
pub struct QrPairingSurface {
    png_path: Option<PathBuf>,
}

impl QrPairingSurface {
    pub fn new(png_path: Option<PathBuf>) -> Self {
        Self { png_path }
    }

    /// Where the PNG is written, if anywhere.
    pub fn png_path(&self) -> Option<&Path> {
        self.png_path.as_deref()
    }

    fn write_png(&self, path: &Path, pairing: &str) -> Result<(), PairingError> {
        let png = render_png(pairing)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, &png)?;
        std::fs::write(data_url_path(path), data_url(&png))?;

        tracing::info!(path = %path.display(), "Pairing QR code saved");
        Ok(())
    }
}

impl PairingSurface for QrPairingSurface {
    fn present(&self, pairing: &str) -> Result<(), PairingError> {
        let text = render_terminal(pairing)?;

        let mut stdout = std::io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        stdout.flush()?;
        drop(stdout);

        if let Some(path) = &self.png_path {
            self.write_png(path, pairing)?;
        }
        Ok(())
    }
}

fn encode(pairing: &str) -> Result<QrCode, PairingError> {
    if pairing.is_empty() {
        return Err(PairingError::Encode("pairing string is empty".to_string()));
    }
    QrCode::with_error_correction_level(pairing.as_bytes(), EcLevel::L)
        .map_err(|e| PairingError::Encode(e.to_string()))
}

/// Render as Unicode half blocks: two module rows per text line.
///
/// Dark modules are drawn, light ones left blank, with a quiet zone on all
/// sides. Best read on a light-on-dark terminal.
pub fn render_terminal(pairing: &str) -> Result<String, PairingError> {
    let code = encode(pairing)?;
    let width = code.width();
    let colors = code.into_colors();
    let size = width + QUIET_ZONE * 2;

    // Coordinates include the quiet zone.
    let is_dark = |row: usize, col: usize| -> bool {
        if row < QUIET_ZONE || col < QUIET_ZONE {
            return false;
        }
        let (r, c) = (row - QUIET_ZONE, col - QUIET_ZONE);
        r < width && c < width && colors[r * width + c] == Color::Dark
    };

    let mut out = String::with_capacity((size + 1) * size.div_ceil(2) * 3);
    for row in (0..size).step_by(2) {
        for col in 0..size {
            out.push(match (is_dark(row, col), is_dark(row + 1, col)) {
                (true, true) => '█',
                (true, false) => '▀',
                (false, true) => '▄',
                (false, false) => ' ',
            });
        }
        out.push('\n');
    }
    Ok(out)
}

/// Render as a grayscale PNG.
pub fn render_png(pairing: &str) -> Result<Vec<u8>, PairingError> {
    let code = encode(pairing)?;
    let modules = code.width() as u32;
    let quiet = QUIET_ZONE as u32;
    let img_size = (modules + quiet * 2) * MODULE_PX;

    let img = ImageBuffer::from_fn(img_size, img_size, |x, y| {
        let (mx, my) = (x / MODULE_PX, y / MODULE_PX);
        if mx < quiet || my < quiet || mx >= modules + quiet || my >= modules + quiet {
            return Luma([255u8]);
        }
        match code[((mx - quiet) as usize, (my - quiet) as usize)] {
            Color::Dark => Luma([0u8]),
            Color::Light => Luma([255u8]),
        }
    });

    let mut buf = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png)
        .map_err(|e| PairingError::Encode(format!("PNG encoding failed: {e}")))?;
    Ok(buf.into_inner())
}

/// `data:image/png;base64,...` for PNG bytes.
pub fn data_url(png: &[u8]) -> String {
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png)
    )
}

fn data_url_path(png_path: &Path) -> PathBuf {
    png_path.with_extension("txt")
}
