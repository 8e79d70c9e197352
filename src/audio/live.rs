use std::time::Instant;

use crate::audio::decode::DecodedAudio;
use crate::audio::sampler::{FrequencySampler, FrequencySpectrum};
use crate::config::AnalysisConfig;
use crate::foundation::error::VizResult;

/// Playback position driven by wall-clock time.
///
/// Preview only. Export positions always come from `frame / fps`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlaybackClock {
    offset_secs: f64,
    started_at: Option<Instant>,
}

impl PlaybackClock {
    /// Stopped clock at position 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or resume) playback at `now`. No-op while already playing.
    pub fn play(&mut self, now: Instant) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
    }

    /// Freeze the position reached at `now`.
    pub fn pause(&mut self, now: Instant) {
        self.offset_secs = self.position_at(now);
        self.started_at = None;
    }

    /// Stop and rewind to 0.
    pub fn stop(&mut self) {
        *self = Self::default();
    }

    /// Jump to `secs` (clamped at 0), keeping the play/pause state.
    pub fn seek(&mut self, secs: f64, now: Instant) {
        self.offset_secs = secs.max(0.0);
        if self.started_at.is_some() {
            self.started_at = Some(now);
        }
    }

    /// `true` while playing.
    pub fn is_playing(&self) -> bool {
        self.started_at.is_some()
    }

    /// Position in seconds at `now`.
    pub fn position_at(&self, now: Instant) -> f64 {
        match self.started_at {
            Some(start) => self.offset_secs + now.saturating_duration_since(start).as_secs_f64(),
            None => self.offset_secs,
        }
    }
}

/// Rolling spectrum analysis for on-screen preview.
///
/// Unlike [`FrequencySampler::sample`], results depend on previous calls: magnitudes are
/// exponentially smoothed with the configured time constant.
#[derive(Debug)]
pub struct LiveAnalyser {
    sampler: FrequencySampler,
    smoothing: f32,
    previous: Option<Vec<f32>>,
}

impl LiveAnalyser {
    /// Build from analysis settings.
    pub fn new(cfg: &AnalysisConfig) -> VizResult<Self> {
        Ok(Self {
            sampler: FrequencySampler::new(cfg)?,
            smoothing: cfg.smoothing as f32,
            previous: None,
        })
    }

    /// Bins per spectrum.
    pub fn bin_count(&self) -> usize {
        self.sampler.bin_count()
    }

    /// Forget smoothing history.
    pub fn reset(&mut self) {
        self.previous = None;
    }

    /// Smoothed spectrum at the current playback position.
    pub fn analyse(
        &mut self,
        audio: &DecodedAudio,
        position_secs: f64,
    ) -> VizResult<FrequencySpectrum> {
        let current = self.sampler.normalized_magnitudes(audio, position_secs)?;
        let s = self.smoothing;
        let smoothed: Vec<f32> = match self.previous.as_deref() {
            Some(prev) if prev.len() == current.len() => prev
                .iter()
                .zip(&current)
                .map(|(p, c)| s * p + (1.0 - s) * c)
                .collect(),
            _ => current,
        };
        let spectrum = self.sampler.quantize(&smoothed);
        self.previous = Some(smoothed);
        Ok(spectrum)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/live.rs"]
mod tests;
