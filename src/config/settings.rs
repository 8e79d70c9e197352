use std::str::FromStr;

use crate::foundation::error::{VizError, VizResult};
use crate::style::{Anchor, BarShape, ColorScheme};

/// Largest side accepted for custom resolutions.
pub const MAX_CUSTOM_SIDE: u32 = 8192;

/// Look of the bars. Immutable per render pass.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct VisualizerSettings {
    /// Gap between adjacent bars in pixels.
    pub bar_spacing: f64,
    /// Height multiplier applied after the 30% cap.
    pub bar_height_scale: f64,
    /// Color law.
    pub color_scheme: ColorScheme,
    /// Anchor edge.
    pub position: Anchor,
    /// Bar outline.
    pub shape: BarShape,
    /// Draw a blurred halo behind the bars.
    pub glow: bool,
}

impl Default for VisualizerSettings {
    fn default() -> Self {
        Self {
            bar_spacing: 2.0,
            bar_height_scale: 1.0,
            color_scheme: ColorScheme::default(),
            position: Anchor::default(),
            shape: BarShape::default(),
            glow: false,
        }
    }
}

impl VisualizerSettings {
    /// Check numeric ranges.
    pub fn validate(&self) -> VizResult<()> {
        if !self.bar_spacing.is_finite() || self.bar_spacing < 0.0 {
            return Err(VizError::validation("barSpacing must be finite and >= 0"));
        }
        if !self.bar_height_scale.is_finite() || self.bar_height_scale <= 0.0 {
            return Err(VizError::validation("barHeightScale must be finite and > 0"));
        }
        Ok(())
    }
}

/// Output frame size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Resolution {
    /// 854x480.
    #[serde(rename = "480p")]
    P480,
    /// 1280x720.
    #[serde(rename = "720p")]
    P720,
    /// 1920x1080.
    #[default]
    #[serde(rename = "1080p")]
    P1080,
    /// Explicit size; both sides even and at most 8192.
    Custom {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },
}

impl Resolution {
    /// `(width, height)` in pixels.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Self::P480 => (854, 480),
            Self::P720 => (1280, 720),
            Self::P1080 => (1920, 1080),
            Self::Custom { width, height } => (width, height),
        }
    }

    fn validate(self) -> VizResult<()> {
        let (w, h) = self.dimensions();
        if w == 0 || h == 0 || w > MAX_CUSTOM_SIDE || h > MAX_CUSTOM_SIDE {
            return Err(VizError::validation(format!(
                "resolution {w}x{h} must be within 1..={MAX_CUSTOM_SIDE} on each side"
            )));
        }
        if !w.is_multiple_of(2) || !h.is_multiple_of(2) {
            return Err(VizError::validation(format!(
                "resolution {w}x{h} must have even width and height (yuv420p)"
            )));
        }
        Ok(())
    }
}

impl FromStr for Resolution {
    type Err = VizError;

    /// Accepts `480p`, `720p`, `1080p` or `WIDTHxHEIGHT`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "480p" => Ok(Self::P480),
            "720p" => Ok(Self::P720),
            "1080p" => Ok(Self::P1080),
            other => {
                let parsed = other
                    .split_once('x')
                    .and_then(|(w, h)| Some((w.parse().ok()?, h.parse().ok()?)));
                match parsed {
                    Some((width, height)) => Ok(Self::Custom { width, height }),
                    None => Err(VizError::validation(format!("unknown resolution '{s}'"))),
                }
            }
        }
    }
}

/// Output container, which implies the codec pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VideoFormat {
    /// H.264 + AAC in MP4.
    #[default]
    Mp4,
    /// VP9 + Opus in WebM.
    Webm,
}

impl VideoFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Webm => "webm",
        }
    }
}

impl FromStr for VideoFormat {
    type Err = VizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mp4" => Ok(Self::Mp4),
            "webm" => Ok(Self::Webm),
            _ => Err(VizError::validation(format!("unknown video format '{s}'"))),
        }
    }
}

/// Target video bitrate tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Quality {
    /// 8 Mbit/s.
    #[default]
    High,
    /// 5 Mbit/s.
    Medium,
    /// 2 Mbit/s.
    Low,
}

impl Quality {
    /// Bitrate string as understood by the encoder.
    pub fn video_bitrate(self) -> &'static str {
        match self {
            Self::High => "8M",
            Self::Medium => "5M",
            Self::Low => "2M",
        }
    }
}

impl FromStr for Quality {
    type Err = VizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(VizError::validation(format!("unknown quality '{s}'"))),
        }
    }
}

/// Output video parameters. Snapshotted at the start of each export run.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ExportSettings {
    /// Frame size.
    pub resolution: Resolution,
    /// Frames per second, `1..=120`.
    pub fps: u32,
    /// Container/codec pairing.
    pub format: VideoFormat,
    /// Bitrate tier.
    pub quality: Quality,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            resolution: Resolution::default(),
            fps: 30,
            format: VideoFormat::default(),
            quality: Quality::default(),
        }
    }
}

impl ExportSettings {
    /// Check resolution and frame rate.
    pub fn validate(&self) -> VizResult<()> {
        self.resolution.validate()?;
        if !(1..=120).contains(&self.fps) {
            return Err(VizError::validation(format!(
                "fps must be in 1..=120, got {}",
                self.fps
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/settings.rs"]
mod tests;
