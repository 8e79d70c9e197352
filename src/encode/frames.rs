use std::fmt;
use std::io::Cursor;

use image::ExtendedColorType;
use image::codecs::jpeg::JpegEncoder;

use crate::foundation::error::{VizError, VizResult};
use crate::foundation::math::flatten_premul_to_rgb8;

/// Position of a frame in the encoder's input sequence.
///
/// Displays as the zero-padded file stem `frame_000042`; the encoder derives timing from this
/// order alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameKey(pub u64);

impl FrameKey {
    /// ffmpeg `image2` pattern matching every key with extension `ext`.
    pub fn pattern(ext: &str) -> String {
        format!("frame_%06d.{ext}")
    }

    /// File name of this key with extension `ext`.
    pub fn file_name(self, ext: &str) -> String {
        format!("{self}.{ext}")
    }
}

impl fmt::Display for FrameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame_{:06}", self.0)
    }
}

/// One serialized still image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedFrame {
    /// Sequence position.
    pub key: FrameKey,
    /// JPEG bytes.
    pub bytes: Vec<u8>,
}

/// Frames pending encode, strictly ordered `0, 1, 2, ...` with no gaps or repeats.
#[derive(Debug)]
pub struct FrameSequence {
    width: u32,
    height: u32,
    frames: Vec<EncodedFrame>,
    buffered_bytes: u64,
    max_buffered_bytes: u64,
}

impl FrameSequence {
    /// Still-image extension used for every frame.
    pub const EXTENSION: &'static str = "jpg";

    /// Empty sequence of `width`x`height` frames holding at most `max_buffered_bytes`.
    pub fn new(width: u32, height: u32, max_buffered_bytes: u64) -> Self {
        Self {
            width,
            height,
            frames: Vec::new(),
            buffered_bytes: 0,
            max_buffered_bytes,
        }
    }

    /// Frame width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Key the next pushed frame must carry.
    pub fn next_key(&self) -> FrameKey {
        FrameKey(self.frames.len() as u64)
    }

    /// Append a frame. Its key must equal [`FrameSequence::next_key`].
    pub fn push(&mut self, key: FrameKey, bytes: Vec<u8>) -> VizResult<()> {
        let expected = self.next_key();
        if key != expected {
            return Err(VizError::validation(format!(
                "frame {key} submitted out of order, expected {expected}"
            )));
        }
        let size = bytes.len() as u64;
        if self.buffered_bytes.saturating_add(size) > self.max_buffered_bytes {
            return Err(VizError::resource_exhausted(format!(
                "frame buffer limit of {} bytes reached at {key}",
                self.max_buffered_bytes
            )));
        }
        self.frames.try_reserve(1).map_err(|_| {
            VizError::resource_exhausted(format!("cannot grow frame sequence at {key}"))
        })?;
        self.frames.push(EncodedFrame { key, bytes });
        self.buffered_bytes += size;
        Ok(())
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// `true` when no frames were pushed.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames in submission order.
    pub fn frames(&self) -> &[EncodedFrame] {
        &self.frames
    }

    /// Keys in submission order.
    pub fn keys(&self) -> impl Iterator<Item = FrameKey> + '_ {
        self.frames.iter().map(|f| f.key)
    }

    /// Total serialized size.
    pub fn buffered_bytes(&self) -> u64 {
        self.buffered_bytes
    }

    /// Drop every buffered frame and release the memory.
    pub fn clear(&mut self) {
        self.frames = Vec::new();
        self.buffered_bytes = 0;
    }
}

/// Serialize a premultiplied RGBA8 frame to JPEG, flattening alpha over black.
pub fn encode_jpeg(premul_rgba: &[u8], width: u32, height: u32, quality: u8) -> VizResult<Vec<u8>> {
    if premul_rgba.len() != (width as usize) * (height as usize) * 4 {
        return Err(VizError::render("frame byte length does not match width*height*4"));
    }
    let rgb = flatten_premul_to_rgb8(premul_rgba, [0, 0, 0]);
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(Cursor::new(&mut out), quality.clamp(1, 100))
        .encode(&rgb, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| VizError::render(format!("jpeg encode failed: {e}")))?;
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/frames.rs"]
mod tests;
