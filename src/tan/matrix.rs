//! photoTAN matrix codes
//!
//! Layout of the HHD_UC element for photoTAN procedures:
//!
//! ```text
//! ┌────────┬───────────────────┬────────┬──────────────────┐
//! │ 2 byte │ mime type         │ 2 byte │ image            │
//! │ length │ (length bytes)    │ skip   │ (rest)           │
//! └────────┴───────────────────┴────────┴──────────────────┘
//! ```
//!
//! The length is the decimal values of both prefix bytes written one after
//! the other, so `[0x00, 0x0A]` reads as `"0" + "10"` = 10. No image decoding
//! happens here.

use std::path::PathBuf;

use crate::error::{FintsError, Result};
use crate::segment::codec::decode_latin1;

const LENGTH_BYTES: usize = 2;
const SKIP_BYTES: usize = 2;

/// Decoded challenge image: mime type plus raw bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixCode {
    pub mime_type: String,
    pub image: Vec<u8>,
}

/// Concatenated decimal rendering of the prefix bytes
fn prefix_length(prefix: &[u8]) -> Option<usize> {
    prefix
        .iter()
        .map(|b| b.to_string())
        .collect::<String>()
        .parse()
        .ok()
}

impl MatrixCode {
    pub fn decode(raw: &[u8]) -> Result<Self> {
        if raw.len() < LENGTH_BYTES {
            return Err(FintsError::format("matrix code shorter than length prefix", raw));
        }

        let mime_len = prefix_length(&raw[..LENGTH_BYTES]).ok_or_else(|| {
            FintsError::format("matrix code length prefix unreadable", &raw[..LENGTH_BYTES])
        })?;

        let mime_end = LENGTH_BYTES + mime_len;
        if raw.len() < mime_end {
            return Err(FintsError::format(
                format!(
                    "matrix code declares {mime_len} byte mime type, {} available",
                    raw.len() - LENGTH_BYTES
                ),
                raw,
            ));
        }
        let image_start = mime_end + SKIP_BYTES;
        if raw.len() < image_start {
            return Err(FintsError::format("matrix code missing image header", raw));
        }

        Ok(Self {
            mime_type: decode_latin1(&raw[LENGTH_BYTES..mime_end]),
            image: raw[image_start..].to_vec(),
        })
    }

    /// File extension matching the mime type
    pub fn extension(&self) -> &str {
        match self.mime_type.as_str() {
            "image/png" => "png",
            "image/jpeg" | "image/jpg" => "jpg",
            "image/gif" => "gif",
            _ => "bin",
        }
    }
}

// ============================================================
// RENDERING
// ============================================================

/// Presents a matrix code to the user; the engine never renders itself
pub trait MatrixCodeRenderer: Send + Sync {
    fn render(&self, code: &MatrixCode) -> Result<()>;
}

/// Writes the raw image next to a base path, e.g. `challenge.png`
pub struct FileRenderer {
    base: PathBuf,
}

impl FileRenderer {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn path_for(&self, code: &MatrixCode) -> PathBuf {
        self.base.with_extension(code.extension())
    }
}

impl MatrixCodeRenderer for FileRenderer {
    fn render(&self, code: &MatrixCode) -> Result<()> {
        let path = self.path_for(code);
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&path, &code.image)?;
        tracing::info!(path = %path.display(), mime = %code.mime_type, "Matrix code written");
        Ok(())
    }
}
