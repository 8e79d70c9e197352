use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;

use crate::assets::AudioAsset;
use crate::config::{ExportSettings, VideoFormat};
use crate::encode::frames::{FrameKey, FrameSequence};
use crate::foundation::error::{VizError, VizResult};

/// Video stream codec.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VideoCodec {
    /// H.264 via libx264.
    H264,
    /// VP9 via libvpx.
    Vp9,
}

impl VideoCodec {
    /// ffmpeg encoder name.
    pub fn ffmpeg_name(self) -> &'static str {
        match self {
            Self::H264 => "libx264",
            Self::Vp9 => "libvpx-vp9",
        }
    }
}

/// Audio stream codec.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AudioCodec {
    /// AAC.
    Aac,
    /// Opus via libopus.
    Opus,
}

impl AudioCodec {
    /// ffmpeg encoder name.
    pub fn ffmpeg_name(self) -> &'static str {
        match self {
            Self::Aac => "aac",
            Self::Opus => "libopus",
        }
    }
}

/// Output container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Container {
    /// ISO MP4.
    Mp4,
    /// WebM (Matroska subset).
    Webm,
}

impl Container {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Webm => "webm",
        }
    }

    /// MIME type of the finished file.
    pub fn mime(self) -> &'static str {
        match self {
            Self::Mp4 => "video/mp4",
            Self::Webm => "video/webm",
        }
    }
}

impl From<VideoFormat> for Container {
    fn from(f: VideoFormat) -> Self {
        match f {
            VideoFormat::Mp4 => Self::Mp4,
            VideoFormat::Webm => Self::Webm,
        }
    }
}

/// Pixel layout of the encoded video. Fixed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 8-bit 4:2:0 planar.
    #[default]
    Yuv420p,
}

impl PixelFormat {
    /// ffmpeg `-pix_fmt` value.
    pub fn ffmpeg_name(self) -> &'static str {
        match self {
            Self::Yuv420p => "yuv420p",
        }
    }
}

/// Everything the encoder needs besides the frames and the audio.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Frame width.
    pub width: u32,
    /// Frame height.
    pub height: u32,
    /// Input frames per second.
    pub framerate: u32,
    /// Video codec.
    pub video_codec: VideoCodec,
    /// Audio codec.
    pub audio_codec: AudioCodec,
    /// Target video bitrate, e.g. `8M`.
    pub video_bitrate: String,
    /// Output pixel format.
    pub pixel_format: PixelFormat,
    /// Output container.
    pub container: Container,
    /// Trim the output to the shorter of the two streams.
    pub shortest: bool,
}

impl EncoderConfig {
    /// Derive codec, bitrate and container choices from export settings.
    pub fn from_settings(settings: &ExportSettings) -> VizResult<Self> {
        settings.validate()?;
        let (width, height) = settings.resolution.dimensions();
        let (video_codec, audio_codec) = match settings.format {
            VideoFormat::Mp4 => (VideoCodec::H264, AudioCodec::Aac),
            VideoFormat::Webm => (VideoCodec::Vp9, AudioCodec::Opus),
        };
        Ok(Self {
            width,
            height,
            framerate: settings.fps,
            video_codec,
            audio_codec,
            video_bitrate: settings.quality.video_bitrate().to_string(),
            pixel_format: PixelFormat::Yuv420p,
            container: settings.format.into(),
            shortest: true,
        })
    }

    /// Reject configurations the encoder cannot honor.
    pub fn validate(&self) -> VizResult<()> {
        if self.framerate == 0 {
            return Err(VizError::validation("framerate must be non-zero"));
        }
        if self.width == 0 || self.height == 0 {
            return Err(VizError::validation("encoder width/height must be non-zero"));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            return Err(VizError::validation(
                "encoder width/height must be even (required for yuv420p)",
            ));
        }
        Ok(())
    }
}

/// Input handed to an [`Encoder`]: ordered frames, the original audio and the configuration.
#[derive(Clone, Copy, Debug)]
pub struct EncodeJob<'a> {
    /// Ordered still images.
    pub frames: &'a FrameSequence,
    /// Original compressed audio, never the decoded PCM.
    pub audio: &'a AudioAsset,
    /// Codec and container choices.
    pub config: &'a EncoderConfig,
}

impl EncodeJob<'_> {
    /// Check the config and that frames match it and are strictly ordered from 0.
    pub fn validate(&self) -> VizResult<()> {
        self.config.validate()?;
        if self.frames.is_empty() {
            return Err(VizError::validation("encode job has no frames"));
        }
        if self.frames.width() != self.config.width || self.frames.height() != self.config.height
        {
            return Err(VizError::validation(format!(
                "frame size {}x{} does not match encoder size {}x{}",
                self.frames.width(),
                self.frames.height(),
                self.config.width,
                self.config.height
            )));
        }
        if self
            .frames
            .keys()
            .enumerate()
            .any(|(i, k)| k != FrameKey(i as u64))
        {
            return Err(VizError::validation("encode job frames are not sequential"));
        }
        Ok(())
    }
}

/// Finished video stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoAsset {
    bytes: Arc<[u8]>,
    container: Container,
}

impl VideoAsset {
    /// Wrap encoded bytes.
    pub fn new(bytes: impl Into<Arc<[u8]>>, container: Container) -> Self {
        Self {
            bytes: bytes.into(),
            container,
        }
    }

    /// Encoded bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Container of the stream.
    pub fn container(&self) -> Container {
        self.container
    }

    /// Suggested download name, `visualization.<ext>`.
    pub fn file_name(&self) -> String {
        format!("visualization.{}", self.container.extension())
    }

    /// MIME type.
    pub fn mime(&self) -> &'static str {
        self.container.mime()
    }

    /// Write the stream to `path`, creating parent directories.
    pub fn write_to(&self, path: impl AsRef<Path>) -> VizResult<()> {
        let path = path.as_ref();
        crate::encode::ffmpeg::ensure_parent_dir(path)?;
        std::fs::write(path, &self.bytes)
            .with_context(|| format!("write video to '{}'", path.display()))?;
        Ok(())
    }
}

/// Batch transcoder from an ordered image sequence plus audio to a video stream.
pub trait Encoder {
    /// Encode one job. Either returns the whole video or fails; never a partial result.
    fn encode(&mut self, job: EncodeJob<'_>) -> VizResult<VideoAsset>;
}

/// Snapshot of one job seen by [`InMemoryEncoder`].
#[derive(Clone, Debug)]
pub struct RecordedJob {
    /// Frame keys in received order.
    pub keys: Vec<FrameKey>,
    /// Name of the audio asset.
    pub audio_name: String,
    /// Audio bytes as received.
    pub audio_bytes: Arc<[u8]>,
    /// Configuration as received.
    pub config: EncoderConfig,
}

/// Encoder that records jobs instead of transcoding. For tests and dry runs.
#[derive(Debug, Default)]
pub struct InMemoryEncoder {
    jobs: Vec<RecordedJob>,
    fail_with: Option<String>,
}

impl InMemoryEncoder {
    /// Recording encoder that succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recording encoder that fails every job with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            jobs: Vec::new(),
            fail_with: Some(message.into()),
        }
    }

    /// Jobs received so far.
    pub fn jobs(&self) -> &[RecordedJob] {
        &self.jobs
    }
}

impl Encoder for InMemoryEncoder {
    fn encode(&mut self, job: EncodeJob<'_>) -> VizResult<VideoAsset> {
        job.validate().map_err(|e| VizError::encode(e.to_string()))?;
        self.jobs.push(RecordedJob {
            keys: job.frames.keys().collect(),
            audio_name: job.audio.name.clone(),
            audio_bytes: Arc::clone(&job.audio.bytes),
            config: job.config.clone(),
        });
        if let Some(msg) = &self.fail_with {
            return Err(VizError::encode(msg.clone()));
        }
        let summary = format!(
            "{} frames {}x{} @{}",
            job.frames.len(),
            job.config.width,
            job.config.height,
            job.config.framerate
        );
        Ok(VideoAsset::new(summary.into_bytes(), job.config.container))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/encoder.rs"]
mod tests;
