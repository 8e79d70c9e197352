use crate::foundation::error::{VizError, VizResult};

pub use kurbo::{Affine, BezPath, Point, Rect};

/// Absolute 0-based frame index on the export timeline.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

impl FrameIndex {
    /// Timeline position of this frame in seconds.
    ///
    /// Derived purely from `index / fps`; wall-clock render time never enters it.
    pub fn position_secs(self, fps: u32) -> f64 {
        if fps == 0 {
            return 0.0;
        }
        self.0 as f64 / f64::from(fps)
    }
}

/// Identity of one export run within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunId(pub u64);

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "run-{}", self.0)
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a validated canvas; both sides must be in `1..=65535`.
    pub fn new(width: u32, height: u32) -> VizResult<Self> {
        if width == 0 || height == 0 {
            return Err(VizError::validation("canvas width/height must be non-zero"));
        }
        if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(VizError::validation(
                "canvas width/height must fit in 16 bits",
            ));
        }
        Ok(Self { width, height })
    }

    /// Size of a tightly packed RGBA8 buffer for this canvas.
    pub fn rgba_len(self) -> usize {
        (self.width as usize) * (self.height as usize) * 4
    }
}

/// Number of frames covering `duration_secs` at `fps`: `ceil(duration * fps)`.
///
/// Products within 1e-9 of an integer are snapped first so that float noise such as
/// `0.1 * 30 = 3.0000000000000004` does not add a frame.
pub fn total_frames(duration_secs: f64, fps: u32) -> VizResult<u64> {
    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        return Err(VizError::validation("duration must be finite and > 0"));
    }
    if fps == 0 {
        return Err(VizError::validation("fps must be > 0"));
    }
    let exact = duration_secs * f64::from(fps);
    let nearest = exact.round();
    let frames = if (exact - nearest).abs() < 1e-9 {
        nearest
    } else {
        exact.ceil()
    };
    Ok((frames as u64).max(1))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
