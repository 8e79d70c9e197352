use std::path::Path;

use anyhow::Context as _;

use crate::config::settings::{ExportSettings, VisualizerSettings};
use crate::foundation::error::{VizError, VizResult};

/// How FFT magnitudes are mapped onto `0..=255`.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SpectrumScale {
    /// Magnitude relative to a full-scale sinusoid.
    #[default]
    Linear,
    /// dBFS mapped linearly from `min_db..max_db`.
    Decibels {
        /// Level mapped to 0.
        min_db: f64,
        /// Level mapped to 255.
        max_db: f64,
    },
}

/// Frequency analysis parameters shared by export sampling and live preview.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Samples per analysis window (power of two); the spectrum has half as many bins.
    pub window_size: usize,
    /// Magnitude scale.
    pub scale: SpectrumScale,
    /// Exponential smoothing of the live analyser, `0.0..1.0`.
    pub smoothing: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window_size: 256,
            scale: SpectrumScale::Linear,
            smoothing: 0.8,
        }
    }
}

impl AnalysisConfig {
    /// Check window size, scale bounds and smoothing.
    pub fn validate(&self) -> VizResult<()> {
        if !self.window_size.is_power_of_two() || !(32..=32768).contains(&self.window_size) {
            return Err(VizError::validation(format!(
                "windowSize must be a power of two in 32..=32768, got {}",
                self.window_size
            )));
        }
        if let SpectrumScale::Decibels { min_db, max_db } = self.scale
            && (!min_db.is_finite() || !max_db.is_finite() || min_db >= max_db)
        {
            return Err(VizError::validation("decibel scale requires minDb < maxDb"));
        }
        if !(0.0..1.0).contains(&self.smoothing) {
            return Err(VizError::validation("smoothing must be in [0, 1)"));
        }
        Ok(())
    }
}

/// Knobs of the offline export loop that do not change its output.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct PipelineOptions {
    /// JPEG quality of serialized frames, `1..=100`.
    pub jpeg_quality: u8,
    /// Frames rendered before a batch is serialized.
    pub chunk_size: usize,
    /// Serialize each batch on a rayon pool.
    pub parallel_serialize: bool,
    /// Worker thread count; `None` lets rayon decide.
    pub threads: Option<usize>,
    /// Upper bound on the encoded frame sequence held in memory.
    pub max_buffered_bytes: u64,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            jpeg_quality: 92,
            chunk_size: 16,
            parallel_serialize: true,
            threads: None,
            max_buffered_bytes: 2 * 1024 * 1024 * 1024,
        }
    }
}

impl PipelineOptions {
    /// Check ranges.
    pub fn validate(&self) -> VizResult<()> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(VizError::validation("jpegQuality must be in 1..=100"));
        }
        if self.threads == Some(0) {
            return Err(VizError::validation("threads must be >= 1 when set"));
        }
        if self.max_buffered_bytes == 0 {
            return Err(VizError::validation("maxBufferedBytes must be > 0"));
        }
        Ok(())
    }

    pub(crate) fn normalized_chunk_size(&self) -> usize {
        self.chunk_size.max(1)
    }
}

/// Every setting of a visualizer project, loadable from one JSON document.
///
/// Missing sections take their defaults:
///
/// ```json
/// { "visualizer": { "colorScheme": "sunset", "shape": "pill" },
///   "export": { "resolution": "720p", "fps": 30 } }
/// ```
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Bar styling.
    pub visualizer: VisualizerSettings,
    /// Output video.
    pub export: ExportSettings,
    /// Frequency analysis.
    pub analysis: AnalysisConfig,
    /// Export loop tuning.
    pub pipeline: PipelineOptions,
}

impl ProjectConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(s: &str) -> VizResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| VizError::validation(format!("invalid project config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_json_path(path: impl AsRef<Path>) -> VizResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read project config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Validate every section.
    pub fn validate(&self) -> VizResult<()> {
        self.visualizer.validate()?;
        self.export.validate()?;
        self.analysis.validate()?;
        self.pipeline.validate()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/project.rs"]
mod tests;
