use std::sync::Arc;
use std::time::Instant;

use crate::assets::ImageAsset;
use crate::audio::{AudioGraphSlot, DecodedAudio, GraphOwner};
use crate::config::{ProjectConfig, VisualizerSettings};
use crate::encode::{Encoder, VideoAsset};
use crate::export::{CancelToken, ExportInputs, ExportPipeline, ExportRun, ProgressObserver};
use crate::foundation::core::{Canvas, RunId};
use crate::foundation::error::{VizError, VizResult};
use crate::preview::{
    FrameClock, PreviewLoop, PreviewSummary, TickHandle, TickOutcome, run_preview,
};

/// One user session: the current settings, the audio graph, the preview loop and at most one
/// active export.
///
/// Preview and export hand the audio graph over strictly in sequence: whoever starts tears down
/// the other first.
#[derive(Debug)]
pub struct Session {
    config: ProjectConfig,
    graph: AudioGraphSlot,
    preview: Option<PreviewLoop>,
    active_export: Option<(RunId, CancelToken)>,
    next_run: u64,
}

impl Session {
    /// Session with validated `config`.
    pub fn new(config: ProjectConfig) -> VizResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            graph: AudioGraphSlot::new(),
            preview: None,
            active_export: None,
            next_run: 1,
        })
    }

    /// Current settings. New runs snapshot these.
    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Replace all settings. Active runs keep their snapshot; a running preview restarts.
    pub fn set_config(&mut self, config: ProjectConfig) -> VizResult<Option<TickHandle>> {
        config.validate()?;
        let visualizer = config.visualizer.clone();
        self.config = config;
        self.restart_preview_if_running(visualizer)
    }

    /// Current holder of the audio graph.
    pub fn graph_owner(&self) -> Option<GraphOwner> {
        self.graph.owner()
    }

    /// Run id of the export that currently may use the graph.
    pub fn active_export(&self) -> Option<RunId> {
        self.active_export.as_ref().map(|(id, _)| *id)
    }

    /// The preview loop, once a preview was started.
    pub fn preview(&self) -> Option<&PreviewLoop> {
        self.preview.as_ref()
    }

    /// Tear down whatever is active and create a new idle run from the current settings.
    pub fn begin_export(&mut self) -> VizResult<ExportRun> {
        self.cancel_active_export();
        self.stop_preview();
        if let Some(prev) = self.graph.force_release() {
            tracing::warn!(%prev, "audio graph still held at export start");
        }

        let id = RunId(self.next_run);
        self.next_run += 1;
        let run = ExportRun::new(id, &self.config)?;
        self.active_export = Some((id, run.cancel_token()));
        tracing::info!(run = %id, "export run created");
        Ok(run)
    }

    /// Drive `run` (from [`Session::begin_export`]) to completion.
    pub fn run_export(
        &mut self,
        run: &mut ExportRun,
        inputs: ExportInputs<'_>,
        encoder: &mut dyn Encoder,
        observer: &mut dyn ProgressObserver,
    ) -> VizResult<VideoAsset> {
        if self.active_export() != Some(run.id()) {
            let err = VizError::Cancelled;
            run.fail(&err);
            return Err(err);
        }
        let result = ExportPipeline::run(run, inputs, &mut self.graph, encoder, observer);
        if self.active_export() == Some(run.id()) {
            self.active_export = None;
        }
        result
    }

    /// Begin and run an export in one call.
    pub fn export(
        &mut self,
        inputs: ExportInputs<'_>,
        encoder: &mut dyn Encoder,
        observer: &mut dyn ProgressObserver,
    ) -> VizResult<VideoAsset> {
        let mut run = self.begin_export()?;
        self.run_export(&mut run, inputs, encoder, observer)
    }

    /// Cancel the active export, if any. It fails with `Cancelled` at its next frame boundary.
    pub fn cancel_active_export(&mut self) {
        if let Some((id, token)) = self.active_export.take() {
            token.cancel();
            tracing::info!(run = %id, "export cancelled");
        }
    }

    /// Take the audio graph for preview and start playback at `now`.
    ///
    /// Any active export is cancelled first.
    pub fn start_preview(
        &mut self,
        audio: Arc<DecodedAudio>,
        canvas: Canvas,
        now: Instant,
    ) -> VizResult<TickHandle> {
        self.cancel_active_export();

        let reuse = self
            .preview
            .as_ref()
            .is_some_and(|p| p.canvas().canvas() == canvas);
        if !reuse {
            self.preview = Some(PreviewLoop::new(canvas, &self.config.analysis)?);
        }

        let graph = self.graph.acquire(GraphOwner::Preview, audio);
        graph.clock.play(now);

        let visualizer = self.config.visualizer.clone();
        let Some(preview) = self.preview.as_mut() else {
            return Err(VizError::preview("preview loop missing"));
        };
        preview.restart(visualizer)
    }

    /// Apply new visualizer settings. A running preview restarts with a new generation.
    pub fn update_preview_settings(
        &mut self,
        settings: VisualizerSettings,
    ) -> VizResult<Option<TickHandle>> {
        settings.validate()?;
        self.config.visualizer = settings.clone();
        self.restart_preview_if_running(settings)
    }

    /// Stop preview and release the graph if preview holds it.
    pub fn stop_preview(&mut self) {
        if let Some(preview) = self.preview.as_mut() {
            preview.stop();
        }
        if self.graph.owner() == Some(GraphOwner::Preview) {
            self.graph.force_release();
        }
    }

    /// Run one preview tick against the graph.
    ///
    /// Preview errors stop preview and release the graph; export state is untouched.
    pub fn preview_tick(
        &mut self,
        handle: TickHandle,
        image: &ImageAsset,
        now: Instant,
    ) -> VizResult<TickOutcome> {
        let Some(preview) = self.preview.as_mut() else {
            return Ok(TickOutcome::Stopped);
        };
        let graph = match (self.graph.owner(), self.graph.graph()) {
            (Some(GraphOwner::Preview), Some(graph)) => graph,
            _ => {
                preview.stop();
                return Ok(TickOutcome::Stopped);
            }
        };
        match preview.tick(handle, graph, image, now) {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                self.stop_preview();
                Err(err)
            }
        }
    }

    /// Tick preview on `clock` until it stops, goes stale, playback ends or `max_ticks` is hit.
    pub fn drive_preview(
        &mut self,
        handle: TickHandle,
        image: &ImageAsset,
        clock: &mut dyn FrameClock,
        max_ticks: Option<u64>,
    ) -> VizResult<PreviewSummary> {
        let (Some(preview), Some(GraphOwner::Preview), Some(graph)) =
            (self.preview.as_mut(), self.graph.owner(), self.graph.graph())
        else {
            return Err(VizError::preview("preview is not running"));
        };
        let result = run_preview(preview, handle, graph, image, clock, max_ticks);
        if result.is_err() {
            self.stop_preview();
        }
        result
    }

    fn restart_preview_if_running(
        &mut self,
        settings: VisualizerSettings,
    ) -> VizResult<Option<TickHandle>> {
        match self.preview.as_mut() {
            Some(preview) if preview.is_running() => preview.restart(settings).map(Some),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/session.rs"]
mod tests;
