use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::{AnalysisConfig, ExportSettings, PipelineOptions, ProjectConfig, VisualizerSettings};
use crate::encode::VideoAsset;
use crate::foundation::core::RunId;
use crate::foundation::error::{FailureReason, VizError, VizResult};

/// Lifecycle of one export run.
///
/// `Idle -> Decoding -> Rendering{0..total} -> Encoding -> Completed`, with `Failed` reachable
/// from every non-terminal state. `Completed` and `Failed` are final.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportState {
    /// Created, not started.
    Idle,
    /// Decoding the audio asset.
    Decoding,
    /// Rendering frame `frame` of `total`.
    Rendering {
        /// Frame being rendered.
        frame: u64,
        /// Total frame count of the run.
        total: u64,
    },
    /// Encoder invoked with the complete sequence.
    Encoding,
    /// Video produced.
    Completed(VideoAsset),
    /// Run aborted; no partial video exists.
    Failed(FailureReason),
}

impl ExportState {
    /// `true` for `Completed` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed(_) | Self::Failed(_))
    }

    /// Whether moving from `self` to `next` is a legal step.
    pub fn can_transition_to(&self, next: &ExportState) -> bool {
        use ExportState::*;
        match (self, next) {
            (Completed(_) | Failed(_), _) => false,
            (_, Failed(_)) => true,
            (Idle, Decoding) => true,
            (Decoding, Rendering { frame: 0, total }) => *total > 0,
            (
                Rendering { frame, total },
                Rendering {
                    frame: next_frame,
                    total: next_total,
                },
            ) => total == next_total && *next_frame == frame + 1 && next_frame < next_total,
            (Rendering { frame, total }, Encoding) => frame + 1 == *total,
            (Encoding, Completed(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ExportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Decoding => f.write_str("decoding"),
            Self::Rendering { frame, total } => write!(f, "rendering {frame}/{total}"),
            Self::Encoding => f.write_str("encoding"),
            Self::Completed(_) => f.write_str("completed"),
            Self::Failed(reason) => write!(f, "failed ({reason:?})"),
        }
    }
}

/// Shared cancellation flag, checked between frames.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Fresh, not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Progress percentage of a render step: `20 + round(70 * frame / total)`.
pub fn rendering_progress(frame: u64, total: u64) -> u8 {
    if total == 0 {
        return 20;
    }
    let frac = frame.min(total) as f64 / total as f64;
    20 + (70.0 * frac).round() as u8
}

/// Monotonic progress in `0..=100`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProgressTracker {
    value: u8,
    reported: bool,
}

impl ProgressTracker {
    /// Current percentage.
    pub fn value(&self) -> u8 {
        self.value
    }

    /// Move to `percent` (clamped to 100, never backwards).
    ///
    /// Returns the new value when it should be reported: the first call, or any increase.
    pub fn advance(&mut self, percent: u8) -> Option<u8> {
        let next = percent.min(100).max(self.value);
        if self.reported && next == self.value {
            return None;
        }
        self.value = next;
        self.reported = true;
        Some(next)
    }
}

/// Receives progress and state changes of an export run.
pub trait ProgressObserver {
    /// Progress rose to `percent`.
    fn on_progress(&mut self, percent: u8);

    /// The run entered `state`.
    fn on_state(&mut self, _state: &ExportState) {}
}

impl<F> ProgressObserver for F
where
    F: FnMut(u8),
{
    fn on_progress(&mut self, percent: u8) {
        self(percent)
    }
}

/// One export: snapshotted settings, state, progress and cancellation.
///
/// Settings are copied at creation so edits made while the run is active cannot reach it.
#[derive(Debug)]
pub struct ExportRun {
    id: RunId,
    visualizer: VisualizerSettings,
    export: ExportSettings,
    analysis: AnalysisConfig,
    pipeline: PipelineOptions,
    state: ExportState,
    progress: ProgressTracker,
    cancel: CancelToken,
}

impl ExportRun {
    /// Validate and snapshot `config` into a new idle run.
    pub fn new(id: RunId, config: &ProjectConfig) -> VizResult<Self> {
        config.validate()?;
        Ok(Self {
            id,
            visualizer: config.visualizer.clone(),
            export: config.export.clone(),
            analysis: config.analysis.clone(),
            pipeline: config.pipeline.clone(),
            state: ExportState::Idle,
            progress: ProgressTracker::default(),
            cancel: CancelToken::new(),
        })
    }

    /// Run identity.
    pub fn id(&self) -> RunId {
        self.id
    }

    /// Visualizer settings snapshot.
    pub fn visualizer(&self) -> &VisualizerSettings {
        &self.visualizer
    }

    /// Export settings snapshot.
    pub fn export_settings(&self) -> &ExportSettings {
        &self.export
    }

    /// Analysis settings snapshot.
    pub fn analysis(&self) -> &AnalysisConfig {
        &self.analysis
    }

    /// Pipeline options snapshot.
    pub fn pipeline(&self) -> &PipelineOptions {
        &self.pipeline
    }

    /// Current state.
    pub fn state(&self) -> &ExportState {
        &self.state
    }

    /// Last reported progress.
    pub fn progress(&self) -> u8 {
        self.progress.value()
    }

    /// Handle that cancels this run from elsewhere.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Request cancellation; takes effect at the next frame boundary.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// The finished video, once completed.
    pub fn video(&self) -> Option<&VideoAsset> {
        match &self.state {
            ExportState::Completed(v) => Some(v),
            _ => None,
        }
    }

    /// Consume the run, yielding the video if it completed.
    pub fn into_video(self) -> Option<VideoAsset> {
        match self.state {
            ExportState::Completed(v) => Some(v),
            _ => None,
        }
    }

    pub(crate) fn transition(&mut self, next: ExportState) -> VizResult<()> {
        if !self.state.can_transition_to(&next) {
            return Err(VizError::validation(format!(
                "{}: illegal transition {} -> {}",
                self.id, self.state, next
            )));
        }
        if !matches!(next, ExportState::Rendering { .. }) {
            tracing::info!(run = %self.id, from = %self.state, to = %next, "export state");
        }
        self.state = next;
        Ok(())
    }

    pub(crate) fn report(&mut self, percent: u8) -> Option<u8> {
        self.progress.advance(percent)
    }

    /// Record `err` as the terminal failure. No effect once the run is terminal.
    pub fn fail(&mut self, err: &VizError) {
        if self.state.is_terminal() {
            return;
        }
        let reason = err.failure_reason();
        if err.is_silent() {
            tracing::info!(run = %self.id, "export cancelled");
        } else {
            tracing::error!(run = %self.id, error = %err, "export failed");
        }
        self.state = ExportState::Failed(reason);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/run.rs"]
mod tests;
