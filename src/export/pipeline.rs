use std::sync::Arc;

use rayon::prelude::*;

use crate::assets::{AudioAsset, ImageAsset};
use crate::audio::{AudioGraphSlot, DecodedAudio, FrequencySampler, GraphOwner, decode_audio};
use crate::encode::{
    EncodeJob, EncodedFrame, Encoder, EncoderConfig, FrameKey, FrameSequence, VideoAsset,
    encode_jpeg,
};
use crate::export::run::{ExportRun, ExportState, ProgressObserver, rendering_progress};
use crate::foundation::core::{FrameIndex, total_frames};
use crate::foundation::error::{VizError, VizResult};
use crate::render::{Compositor, FrameCanvas};

/// The two user inputs of an export.
#[derive(Clone, Copy, Debug)]
pub struct ExportInputs<'a> {
    /// Original compressed audio; decoded for analysis and handed unchanged to the encoder.
    pub audio: &'a AudioAsset,
    /// Background image.
    pub image: &'a ImageAsset,
}

/// Offline, frame-exact export driver.
///
/// Frame `i` is always sampled at `i / fps` seconds, so the output stays in sync with the audio
/// no matter how long each frame takes to render.
#[derive(Debug, Default)]
pub struct ExportPipeline;

impl ExportPipeline {
    /// Drive `run` from `Idle` to a terminal state.
    ///
    /// The audio graph is acquired for the run after decoding and released on every outcome.
    /// On failure the run ends in `Failed` and no video is produced.
    #[tracing::instrument(skip_all, fields(run = %run.id()))]
    pub fn run(
        run: &mut ExportRun,
        inputs: ExportInputs<'_>,
        graph: &mut AudioGraphSlot,
        encoder: &mut dyn Encoder,
        observer: &mut dyn ProgressObserver,
    ) -> VizResult<VideoAsset> {
        let owner = GraphOwner::Export(run.id());
        let result = drive(run, inputs, graph, encoder, observer);

        if graph.owner() == Some(owner) {
            graph.release(owner)?;
        }

        match result {
            Ok(video) => {
                run.transition(ExportState::Completed(video.clone()))?;
                report(run, observer, 100);
                observer.on_state(run.state());
                Ok(video)
            }
            Err(err) => {
                run.fail(&err);
                observer.on_state(run.state());
                Err(err)
            }
        }
    }
}

fn drive(
    run: &mut ExportRun,
    inputs: ExportInputs<'_>,
    graph: &mut AudioGraphSlot,
    encoder: &mut dyn Encoder,
    observer: &mut dyn ProgressObserver,
) -> VizResult<VideoAsset> {
    enter(run, observer, ExportState::Decoding)?;
    report(run, observer, 0);
    check_cancel(run)?;

    let audio = Arc::new(decode_audio(inputs.audio)?);
    graph.acquire(GraphOwner::Export(run.id()), Arc::clone(&audio));
    report(run, observer, 10);

    let fps = run.export_settings().fps;
    let total = total_frames(audio.duration_secs(), fps)?;
    let config = EncoderConfig::from_settings(run.export_settings())?;
    let frames = render_all(run, &audio, inputs.image, &config, total, observer)?;
    drop(audio);

    check_cancel(run)?;
    enter(run, observer, ExportState::Encoding)?;
    report(run, observer, 90);

    tracing::info!(frames = frames.len(), bytes = frames.buffered_bytes(), "encoding");
    encoder.encode(EncodeJob {
        frames: &frames,
        audio: inputs.audio,
        config: &config,
    })
}

fn render_all(
    run: &mut ExportRun,
    audio: &DecodedAudio,
    image: &ImageAsset,
    config: &EncoderConfig,
    total: u64,
    observer: &mut dyn ProgressObserver,
) -> VizResult<FrameSequence> {
    let visualizer = run.visualizer().clone();
    let opts = run.pipeline().clone();
    let (width, height) = (config.width, config.height);

    let mut sampler = FrequencySampler::new(run.analysis())?;
    let mut compositor = Compositor::new();
    let mut canvas = FrameCanvas::new(width, height)?;
    let mut frames = FrameSequence::new(width, height, opts.max_buffered_bytes);

    let chunk_size = opts.normalized_chunk_size() as u64;
    let pool = if opts.parallel_serialize {
        Some(build_thread_pool(opts.threads)?)
    } else {
        None
    };

    let mut chunk_start = 0u64;
    while chunk_start < total {
        let chunk_end = (chunk_start + chunk_size).min(total);
        let mut pending: Vec<(FrameKey, Vec<u8>)> = Vec::new();
        pending
            .try_reserve_exact((chunk_end - chunk_start) as usize)
            .map_err(|_| VizError::resource_exhausted("cannot allocate frame batch"))?;

        for f in chunk_start..chunk_end {
            check_cancel(run)?;
            enter(run, observer, ExportState::Rendering { frame: f, total })?;

            let position = FrameIndex(f).position_secs(config.framerate);
            let spectrum = sampler.sample(audio, position)?;
            compositor.render_frame(&mut canvas, image, &spectrum, &visualizer)?;
            pending.push((FrameKey(f), copy_pixels(canvas.data())?));

            report(run, observer, rendering_progress(f, total));
            tracing::debug!(frame = f, position, "rendered frame");
        }

        for frame in serialize_chunk(&pending, width, height, opts.jpeg_quality, pool.as_ref())? {
            frames.push(frame.key, frame.bytes)?;
        }
        chunk_start = chunk_end;
    }

    Ok(frames)
}

fn serialize_chunk(
    pending: &[(FrameKey, Vec<u8>)],
    width: u32,
    height: u32,
    quality: u8,
    pool: Option<&rayon::ThreadPool>,
) -> VizResult<Vec<EncodedFrame>> {
    let encode = |(key, rgba): &(FrameKey, Vec<u8>)| {
        encode_jpeg(rgba, width, height, quality).map(|bytes| EncodedFrame { key: *key, bytes })
    };
    match pool {
        Some(pool) => pool.install(|| pending.par_iter().map(encode).collect()),
        None => pending.iter().map(encode).collect(),
    }
}

fn copy_pixels(data: &[u8]) -> VizResult<Vec<u8>> {
    let mut out = Vec::new();
    out.try_reserve_exact(data.len())
        .map_err(|_| VizError::resource_exhausted("cannot allocate frame buffer"))?;
    out.extend_from_slice(data);
    Ok(out)
}

fn enter(
    run: &mut ExportRun,
    observer: &mut dyn ProgressObserver,
    state: ExportState,
) -> VizResult<()> {
    run.transition(state)?;
    observer.on_state(run.state());
    Ok(())
}

fn report(run: &mut ExportRun, observer: &mut dyn ProgressObserver, percent: u8) {
    if let Some(p) = run.report(percent) {
        observer.on_progress(p);
    }
}

fn check_cancel(run: &ExportRun) -> VizResult<()> {
    if run.is_cancelled() {
        return Err(VizError::Cancelled);
    }
    Ok(())
}

fn build_thread_pool(threads: Option<usize>) -> VizResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(VizError::validation("'threads' must be >= 1 when set"));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| VizError::resource_exhausted(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/export/pipeline.rs"]
mod tests;
