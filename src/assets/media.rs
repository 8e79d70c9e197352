use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;
use infer::MatcherType;

use crate::foundation::error::{VizError, VizResult};

/// One user-supplied file: an opaque byte blob and its name.
#[derive(Clone, Debug)]
pub struct MediaInput {
    /// File name as supplied (used for MIME fallback and encoder hints).
    pub name: String,
    /// Raw file bytes.
    pub bytes: Arc<[u8]>,
}

impl MediaInput {
    /// Wrap bytes already in memory.
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> VizResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("read input file '{}'", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, bytes))
    }
}

/// Top-level media class of a sniffed MIME type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaKind {
    /// `audio/*`
    Audio,
    /// `image/*`
    Image,
    /// Anything else.
    Other,
}

/// Detect the MIME type of `bytes`, trying magic numbers first and the file name second.
pub fn sniff_mime(name: &str, bytes: &[u8]) -> (String, MediaKind) {
    if let Some(kind) = infer::get(bytes) {
        let media = match kind.matcher_type() {
            MatcherType::Audio => MediaKind::Audio,
            MatcherType::Image => MediaKind::Image,
            _ => MediaKind::Other,
        };
        return (kind.mime_type().to_string(), media);
    }

    let mime = mime_guess::from_path(name)
        .first_or_octet_stream()
        .to_string();
    let media = match mime.split('/').next() {
        Some("audio") => MediaKind::Audio,
        Some("image") => MediaKind::Image,
        _ => MediaKind::Other,
    };
    (mime, media)
}

/// Encoded audio exactly as supplied. The bytes are handed to the encoder untouched.
#[derive(Clone, Debug)]
pub struct AudioAsset {
    /// File name as supplied.
    pub name: String,
    /// Sniffed MIME type (`audio/*`).
    pub mime: String,
    /// Original compressed bytes.
    pub bytes: Arc<[u8]>,
}

impl AudioAsset {
    /// Accept `input` if it sniffs as `audio/*`.
    pub fn from_input(input: MediaInput) -> VizResult<Self> {
        let (mime, kind) = sniff_mime(&input.name, &input.bytes);
        if kind != MediaKind::Audio {
            return Err(VizError::audio_decode(format!(
                "'{}' is not an audio file ({mime})",
                input.name
            )));
        }
        Ok(Self {
            name: input.name,
            mime,
            bytes: input.bytes,
        })
    }

    /// Read and sniff an audio file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> VizResult<Self> {
        Self::from_input(MediaInput::from_path(path)?)
    }

    /// Lowercase extension of the supplied name, if any.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/media.rs"]
mod tests;
