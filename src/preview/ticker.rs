use std::time::Instant;

use crate::assets::ImageAsset;
use crate::audio::{AudioGraph, LiveAnalyser};
use crate::config::{AnalysisConfig, VisualizerSettings};
use crate::foundation::core::Canvas;
use crate::foundation::error::{VizError, VizResult};
use crate::render::{Compositor, FrameCanvas};

/// Permission to run one tick of a specific loop generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickHandle {
    generation: u64,
}

impl TickHandle {
    /// Generation this handle belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Result of [`PreviewLoop::tick`].
#[derive(Clone, Debug, PartialEq)]
pub enum TickOutcome {
    /// A frame was drawn; schedule `next`.
    Rendered {
        /// Handle for the following tick.
        next: TickHandle,
        /// Playback position the frame reflects.
        position_secs: f64,
    },
    /// The handle belongs to a superseded generation; nothing was drawn.
    Stale,
    /// The loop is stopped; nothing was drawn.
    Stopped,
}

/// Live preview renderer.
///
/// Settings are fixed per generation: [`PreviewLoop::restart`] is the only way to change them.
#[derive(Debug)]
pub struct PreviewLoop {
    generation: u64,
    running: bool,
    settings: VisualizerSettings,
    analyser: LiveAnalyser,
    compositor: Compositor,
    canvas: FrameCanvas,
}

impl PreviewLoop {
    /// Stopped loop drawing onto a `canvas`-sized frame.
    pub fn new(canvas: Canvas, analysis: &AnalysisConfig) -> VizResult<Self> {
        Ok(Self {
            generation: 0,
            running: false,
            settings: VisualizerSettings::default(),
            analyser: LiveAnalyser::new(analysis)?,
            compositor: Compositor::new(),
            canvas: FrameCanvas::new(canvas.width, canvas.height)?,
        })
    }

    /// Start a new generation with `settings`.
    pub fn start(&mut self, settings: VisualizerSettings) -> VizResult<TickHandle> {
        settings.validate()?;
        self.generation += 1;
        self.running = true;
        self.settings = settings;
        self.analyser.reset();
        tracing::debug!(generation = self.generation, "preview started");
        Ok(TickHandle {
            generation: self.generation,
        })
    }

    /// Drop the current generation and start over with `settings`.
    pub fn restart(&mut self, settings: VisualizerSettings) -> VizResult<TickHandle> {
        self.stop();
        self.start(settings)
    }

    /// Stop the loop. Outstanding handles become stale.
    pub fn stop(&mut self) {
        if self.running {
            tracing::debug!(generation = self.generation, "preview stopped");
        }
        self.running = false;
        self.generation += 1;
    }

    /// Whether the loop is running.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Current generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Settings of the current generation.
    pub fn settings(&self) -> &VisualizerSettings {
        &self.settings
    }

    /// Most recently drawn frame.
    pub fn canvas(&self) -> &FrameCanvas {
        &self.canvas
    }

    /// Draw one frame at the graph's playback position as of `now`.
    ///
    /// A failure stops the loop and is returned as a [`VizError::Preview`].
    pub fn tick(
        &mut self,
        handle: TickHandle,
        graph: &AudioGraph,
        image: &ImageAsset,
        now: Instant,
    ) -> VizResult<TickOutcome> {
        if !self.running {
            return Ok(TickOutcome::Stopped);
        }
        if handle.generation != self.generation {
            tracing::trace!(
                stale = handle.generation,
                current = self.generation,
                "dropping stale preview tick"
            );
            return Ok(TickOutcome::Stale);
        }

        let position_secs = graph.clock.position_at(now);
        let drawn = self
            .analyser
            .analyse(&graph.audio, position_secs)
            .and_then(|spectrum| {
                self.compositor
                    .render_frame(&mut self.canvas, image, &spectrum, &self.settings)
            });
        if let Err(err) = drawn {
            self.stop();
            tracing::warn!(error = %err, "preview stopped on error");
            return Err(VizError::preview(err.to_string()));
        }

        Ok(TickOutcome::Rendered {
            next: handle,
            position_secs,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/preview/ticker.rs"]
mod tests;
