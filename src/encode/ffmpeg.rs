use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context as _;

use crate::encode::encoder::{Container, EncodeJob, Encoder, EncoderConfig, VideoAsset};
use crate::encode::frames::{FrameKey, FrameSequence};
use crate::foundation::error::{VizError, VizResult};

/// Options for [`FfmpegEncoder`].
#[derive(Clone, Debug)]
pub struct FfmpegEncoderOpts {
    /// Program to run. Defaults to `ffmpeg` on `PATH`.
    pub program: OsString,
    /// Parent of the per-job scratch directory. Defaults to the system temp dir.
    pub work_dir: Option<PathBuf>,
    /// Leave the scratch directory behind after the job (debugging).
    pub keep_work_dir: bool,
}

impl Default for FfmpegEncoderOpts {
    fn default() -> Self {
        Self {
            program: OsString::from("ffmpeg"),
            work_dir: None,
            keep_work_dir: false,
        }
    }
}

/// Encoder that writes the image sequence and audio to a scratch directory and runs the system
/// `ffmpeg` on them.
#[derive(Clone, Debug, Default)]
pub struct FfmpegEncoder {
    opts: FfmpegEncoderOpts,
}

impl FfmpegEncoder {
    /// Encoder with the given options.
    pub fn new(opts: FfmpegEncoderOpts) -> Self {
        Self { opts }
    }
}

impl Encoder for FfmpegEncoder {
    #[tracing::instrument(skip_all, fields(frames = job.frames.len()))]
    fn encode(&mut self, job: EncodeJob<'_>) -> VizResult<VideoAsset> {
        job.validate().map_err(|e| VizError::encode(e.to_string()))?;

        let scratch = ScratchDir::create(self.opts.work_dir.as_deref(), self.opts.keep_work_dir)?;
        let dir = scratch.path();

        write_frames(dir, job.frames)?;
        let audio_ext = job.audio.extension().unwrap_or_else(|| "bin".to_string());
        let audio_path = dir.join(format!("audio.{audio_ext}"));
        std::fs::write(&audio_path, &job.audio.bytes)
            .map_err(|e| VizError::encode(format!("failed to stage audio input: {e}")))?;

        let out_path = dir.join(format!("output.{}", job.config.container.extension()));
        let args = build_ffmpeg_args(
            job.config,
            &dir.join(FrameKey::pattern(FrameSequence::EXTENSION)),
            &audio_path,
            &out_path,
        );
        tracing::debug!(dir = %dir.display(), "running ffmpeg");

        let output = Command::new(&self.opts.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                VizError::encode(format!(
                    "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
                ))
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VizError::encode(format!(
                "ffmpeg exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let bytes = std::fs::read(&out_path)
            .map_err(|e| VizError::encode(format!("ffmpeg produced no output file: {e}")))?;
        if bytes.is_empty() {
            return Err(VizError::encode("ffmpeg produced an empty output file"));
        }
        Ok(VideoAsset::new(bytes, job.config.container))
    }
}

fn write_frames(dir: &Path, frames: &FrameSequence) -> VizResult<()> {
    for frame in frames.frames() {
        let path = dir.join(frame.key.file_name(FrameSequence::EXTENSION));
        std::fs::write(&path, &frame.bytes)
            .map_err(|e| VizError::encode(format!("failed to stage {}: {e}", frame.key)))?;
    }
    Ok(())
}

/// Command line for one encode job, excluding the program name.
///
/// The image sequence is the first input and timed by `framerate` alone; the original audio is
/// the second input and is re-encoded to the configured codec.
pub fn build_ffmpeg_args(
    config: &EncoderConfig,
    frame_pattern: &Path,
    audio: &Path,
    out: &Path,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    let mut push = |s: &str| args.push(OsString::from(s));
    push("-y");
    push("-loglevel");
    push("error");
    push("-framerate");
    push(&config.framerate.to_string());
    push("-start_number");
    push("0");
    push("-i");
    args.push(frame_pattern.as_os_str().to_owned());
    args.push("-i".into());
    args.push(audio.as_os_str().to_owned());

    let framerate = config.framerate.to_string();
    let mut tail = vec![
        "-map",
        "0:v:0",
        "-map",
        "1:a:0",
        "-c:v",
        config.video_codec.ffmpeg_name(),
        "-b:v",
        config.video_bitrate.as_str(),
        "-r",
        framerate.as_str(),
        "-pix_fmt",
        config.pixel_format.ffmpeg_name(),
        "-c:a",
        config.audio_codec.ffmpeg_name(),
    ];
    if config.shortest {
        tail.push("-shortest");
    }
    if config.container == Container::Mp4 {
        tail.extend(["-movflags", "+faststart"]);
    }
    args.extend(tail.into_iter().map(OsString::from));
    args.push(out.as_os_str().to_owned());
    args
}

/// Ensure the parent directory of `path` exists.
pub(crate) fn ensure_parent_dir(path: &Path) -> VizResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Per-job directory removed on drop unless kept.
struct ScratchDir {
    path: PathBuf,
    keep: bool,
}

impl ScratchDir {
    fn create(parent: Option<&Path>, keep: bool) -> VizResult<Self> {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let parent = parent.map(Path::to_path_buf).unwrap_or_else(std::env::temp_dir);
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let path = parent.join(format!(
            "audioviz_encode_{}_{}_{}",
            std::process::id(),
            nanos,
            COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        std::fs::create_dir_all(&path)
            .map_err(|e| VizError::encode(format!("failed to create scratch directory: {e}")))?;
        Ok(Self { path, keep })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if self.keep {
            tracing::info!(dir = %self.path.display(), "keeping encoder scratch directory");
            return;
        }
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
