use std::path::Path;
use std::sync::Arc;

use crate::assets::media::{MediaInput, MediaKind, sniff_mime};
use crate::foundation::error::{VizError, VizResult};
use crate::foundation::math::premultiply_rgba8_in_place;

/// Decoded background image, premultiplied RGBA8. Immutable and cheap to clone.
#[derive(Clone, Debug)]
pub struct ImageAsset {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8, row-major.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl ImageAsset {
    /// Accept `input` if it sniffs as `image/*` and decodes.
    pub fn from_input(input: &MediaInput) -> VizResult<Self> {
        let (mime, kind) = sniff_mime(&input.name, &input.bytes);
        if kind != MediaKind::Image {
            return Err(VizError::image_decode(format!(
                "'{}' is not an image file ({mime})",
                input.name
            )));
        }
        decode_image(&input.bytes)
    }

    /// Read and decode an image file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> VizResult<Self> {
        Self::from_input(&MediaInput::from_path(path)?)
    }

    /// Build an image from straight-alpha RGBA8 pixels.
    pub fn from_rgba8(width: u32, height: u32, mut rgba8: Vec<u8>) -> VizResult<Self> {
        if width == 0 || height == 0 {
            return Err(VizError::image_decode("image has zero width or height"));
        }
        if rgba8.len() != (width as usize) * (height as usize) * 4 {
            return Err(VizError::image_decode(
                "rgba8 buffer does not match width*height*4",
            ));
        }
        premultiply_rgba8_in_place(&mut rgba8);
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8),
        })
    }
}

/// Decode PNG/JPEG/... bytes into a premultiplied [`ImageAsset`].
pub fn decode_image(bytes: &[u8]) -> VizResult<ImageAsset> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| VizError::image_decode(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    ImageAsset::from_rgba8(width, height, rgba.into_raw())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
