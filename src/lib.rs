//! audioviz renders audio-reactive spectrum bars over a still image.
//!
//! Two drivers share one compositor:
//!
//! - [`ExportPipeline`] renders every frame of a track at `frame / fps`, serializes the frames to
//!   JPEG and hands them, with the original audio file, to an [`Encoder`] (system `ffmpeg` via
//!   [`FfmpegEncoder`]). Output sync never depends on render speed.
//! - [`PreviewLoop`] redraws at display rate from the live playback position, with smoothing.
//!
//! A [`Session`] owns the single audio graph and hands it between the two.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod foundation;

/// Input boundary: MIME sniffing and asset decoding.
pub mod assets;
/// Audio decode, spectrum sampling, live analysis and the audio graph.
pub mod audio;
/// Serde settings records and the project file.
pub mod config;
/// Frame sequence, encoder trait and the ffmpeg encoder.
pub mod encode;
/// Export run state machine and pipeline.
pub mod export;
/// Live preview loop.
pub mod preview;
/// CPU frame compositor.
pub mod render;
/// Single-session ownership of preview, export and the audio graph.
pub mod session;
/// Bar color, shape and glow resolution.
pub mod style;

pub use crate::foundation::core::{
    Affine, BezPath, Canvas, FrameIndex, Point, Rect, RunId, total_frames,
};
pub use crate::foundation::error::{DecodeTarget, FailureReason, VizError, VizResult};

pub use crate::assets::{AudioAsset, ImageAsset, MediaInput};
pub use crate::audio::{AudioGraphSlot, DecodedAudio, FrequencySampler, FrequencySpectrum, GraphOwner};
pub use crate::config::{
    AnalysisConfig, ExportSettings, PipelineOptions, ProjectConfig, Quality, Resolution,
    VideoFormat, VisualizerSettings,
};
pub use crate::encode::{Encoder, FfmpegEncoder, FfmpegEncoderOpts, InMemoryEncoder, VideoAsset};
pub use crate::export::{ExportInputs, ExportPipeline, ExportRun, ExportState, ProgressObserver};
pub use crate::preview::{PreviewLoop, TickHandle, TickOutcome};
pub use crate::render::{Compositor, FrameCanvas, FrameRGBA};
pub use crate::session::Session;
pub use crate::style::{Anchor, BarShape, ColorScheme};
