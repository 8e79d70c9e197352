//! Encoder boundary: the ordered still-image sequence, codec configuration and the encoders that
//! turn both plus the original audio into a video.

pub(crate) mod encoder;
pub(crate) mod ffmpeg;
pub(crate) mod frames;

pub use encoder::{
    AudioCodec, Container, EncodeJob, Encoder, EncoderConfig, InMemoryEncoder, PixelFormat,
    RecordedJob, VideoAsset, VideoCodec,
};
pub use ffmpeg::{FfmpegEncoder, FfmpegEncoderOpts, build_ffmpeg_args, is_ffmpeg_on_path};
pub use frames::{EncodedFrame, FrameKey, FrameSequence, encode_jpeg};
