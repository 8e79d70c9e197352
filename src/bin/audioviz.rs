use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use audioviz::preview::IntervalClock;
use audioviz::{
    Anchor, AudioAsset, BarShape, Canvas, ColorScheme, Compositor, ExportInputs, FfmpegEncoder,
    FfmpegEncoderOpts, FrameCanvas, FrequencySampler, ImageAsset, ProjectConfig, Quality,
    Resolution, Session, VideoFormat,
};

#[derive(Parser, Debug)]
#[command(name = "audioviz", version, about = "Spectrum bars over a still image")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the frame at one timeline position as a PNG.
    Frame(FrameArgs),
    /// Render the full track to a video (requires `ffmpeg` on PATH).
    Export(ExportArgs),
    /// Run the live preview headlessly and save the last frame.
    Preview(PreviewArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Audio file (mp3, wav, ...).
    #[arg(long)]
    audio: PathBuf,

    /// Background image (jpg, png, ...).
    #[arg(long)]
    image: PathBuf,

    /// Project JSON; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    color_scheme: Option<ColorScheme>,

    #[arg(long)]
    shape: Option<BarShape>,

    /// Anchor edge: top or bottom.
    #[arg(long)]
    position: Option<Anchor>,

    #[arg(long)]
    bar_spacing: Option<f64>,

    #[arg(long)]
    bar_height_scale: Option<f64>,

    /// Enable the glow halo.
    #[arg(long)]
    glow: bool,

    /// 480p, 720p, 1080p or WxH.
    #[arg(long)]
    resolution: Option<Resolution>,

    #[arg(long)]
    fps: Option<u32>,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Timeline position in seconds.
    #[arg(long, default_value_t = 0.0)]
    at: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[command(flatten)]
    input: InputArgs,

    /// mp4 or webm.
    #[arg(long)]
    format: Option<VideoFormat>,

    /// high, medium or low.
    #[arg(long)]
    quality: Option<Quality>,

    /// Output path; defaults to `visualization.<ext>` in the current directory.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Keep the encoder's scratch directory.
    #[arg(long)]
    keep_work_dir: bool,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    #[command(flatten)]
    input: InputArgs,

    /// How long to run.
    #[arg(long, default_value_t = 2.0)]
    seconds: f64,

    /// Refresh rate in Hz.
    #[arg(long, default_value_t = IntervalClock::DISPLAY_REFRESH_HZ)]
    hz: u32,

    /// PNG path for the last preview frame.
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Export(args) => cmd_export(args),
        Command::Preview(args) => cmd_preview(args),
    }
}

impl InputArgs {
    fn project(&self) -> anyhow::Result<ProjectConfig> {
        let mut cfg = match &self.config {
            Some(path) => ProjectConfig::from_json_path(path)?,
            None => ProjectConfig::default(),
        };
        let vis = &mut cfg.visualizer;
        if let Some(v) = self.color_scheme {
            vis.color_scheme = v;
        }
        if let Some(v) = self.shape {
            vis.shape = v;
        }
        if let Some(v) = self.position {
            vis.position = v;
        }
        if let Some(v) = self.bar_spacing {
            vis.bar_spacing = v;
        }
        if let Some(v) = self.bar_height_scale {
            vis.bar_height_scale = v;
        }
        if self.glow {
            vis.glow = true;
        }
        if let Some(v) = self.resolution {
            cfg.export.resolution = v;
        }
        if let Some(v) = self.fps {
            cfg.export.fps = v;
        }
        Ok(cfg)
    }

    fn assets(&self) -> anyhow::Result<(AudioAsset, ImageAsset)> {
        let audio = AudioAsset::from_path(&self.audio)?;
        let image = ImageAsset::from_path(&self.image)?;
        Ok((audio, image))
    }
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = args.input.project()?;
    cfg.validate()?;
    let (audio, image) = args.input.assets()?;
    let decoded = audioviz::audio::decode_audio(&audio)?;

    let (w, h) = cfg.export.resolution.dimensions();
    let mut canvas = FrameCanvas::new(w, h)?;
    let spectrum = FrequencySampler::new(&cfg.analysis)?.sample(&decoded, args.at)?;
    Compositor::new().render_frame(&mut canvas, &image, &spectrum, &cfg.visualizer)?;

    write_png(&args.out, &canvas)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let mut cfg = args.input.project()?;
    if let Some(v) = args.format {
        cfg.export.format = v;
    }
    if let Some(v) = args.quality {
        cfg.export.quality = v;
    }
    let (audio, image) = args.input.assets()?;

    if !audioviz::encode::is_ffmpeg_on_path() {
        anyhow::bail!("ffmpeg is required for export, but was not found on PATH");
    }
    let mut encoder = FfmpegEncoder::new(FfmpegEncoderOpts {
        keep_work_dir: args.keep_work_dir,
        ..FfmpegEncoderOpts::default()
    });

    let mut session = Session::new(cfg)?;
    let mut last = 0u8;
    let mut observer = |p: u8| {
        if p >= last.saturating_add(10) || p == 100 {
            eprintln!("progress {p}%");
            last = p;
        }
    };
    let result = session.export(
        ExportInputs {
            audio: &audio,
            image: &image,
        },
        &mut encoder,
        &mut observer,
    );
    let video = match result {
        Ok(video) => video,
        Err(err) => {
            if let Some(msg) = err.user_message() {
                eprintln!("{msg}");
            }
            return Err(err.into());
        }
    };

    let out = args.out.unwrap_or_else(|| PathBuf::from(video.file_name()));
    video.write_to(&out)?;
    eprintln!("wrote {} ({})", out.display(), video.mime());
    Ok(())
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let cfg = args.input.project()?;
    let (audio, image) = args.input.assets()?;
    let decoded = Arc::new(audioviz::audio::decode_audio(&audio)?);

    let (w, h) = cfg.export.resolution.dimensions();
    let mut session = Session::new(cfg)?;
    let handle = session.start_preview(decoded, Canvas::new(w, h)?, Instant::now())?;

    let max_ticks = (args.seconds.max(0.0) * f64::from(args.hz.max(1))).ceil() as u64;
    let mut clock = IntervalClock::new(args.hz);
    let summary = session.drive_preview(handle, &image, &mut clock, Some(max_ticks))?;
    eprintln!(
        "preview drew {} frames, last at {:.2}s ({:?})",
        summary.ticks, summary.last_position_secs, summary.end
    );

    if let Some(path) = &args.snapshot {
        let preview = session
            .preview()
            .context("preview loop was never created")?;
        write_png(path, preview.canvas())?;
        eprintln!("wrote {}", path.display());
    }
    session.stop_preview();
    Ok(())
}

fn write_png(path: &Path, canvas: &FrameCanvas) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        path,
        canvas.data(),
        canvas.width(),
        canvas.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}
