use std::f32::consts::PI;
use std::fmt;
use std::sync::Arc;

use realfft::num_complex::Complex32;
use realfft::{RealFftPlanner, RealToComplex};

use crate::audio::decode::DecodedAudio;
use crate::config::{AnalysisConfig, SpectrumScale};
use crate::foundation::error::{VizError, VizResult};

/// Fixed-length magnitude vector, one byte per frequency bin.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FrequencySpectrum {
    bins: Vec<u8>,
}

impl FrequencySpectrum {
    /// Wrap precomputed bins.
    pub fn from_bins(bins: Vec<u8>) -> Self {
        Self { bins }
    }

    /// All-zero spectrum of `len` bins.
    pub fn silent(len: usize) -> Self {
        Self { bins: vec![0; len] }
    }

    /// Bin values in `0..=255`, lowest frequency first.
    pub fn bins(&self) -> &[u8] {
        &self.bins
    }

    /// Number of bins.
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    /// `true` when there are no bins.
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct CacheKey {
    audio: u64,
    centre: i64,
    window: usize,
}

struct FftResources {
    size: usize,
    plan: Arc<dyn RealToComplex<f32>>,
    window: Vec<f32>,
    input: Vec<f32>,
    spectrum: Vec<Complex32>,
    scratch: Vec<Complex32>,
}

/// Deterministic spectrum extraction at arbitrary timeline positions.
///
/// A window of `window_size` mono samples centred on the requested position is Hann-weighted and
/// transformed; samples outside the track are treated as silence. Identical inputs always yield
/// identical spectra.
pub struct FrequencySampler {
    planner: RealFftPlanner<f32>,
    fft: FftResources,
    scale: SpectrumScale,
    cache: Option<(CacheKey, FrequencySpectrum)>,
}

impl fmt::Debug for FrequencySampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrequencySampler")
            .field("window_size", &self.fft.size)
            .field("scale", &self.scale)
            .field("cached", &self.cache.is_some())
            .finish()
    }
}

impl FrequencySampler {
    /// Build a sampler from analysis settings.
    pub fn new(cfg: &AnalysisConfig) -> VizResult<Self> {
        cfg.validate()?;
        let mut planner = RealFftPlanner::new();
        let fft = plan(&mut planner, cfg.window_size);
        Ok(Self {
            planner,
            fft,
            scale: cfg.scale,
            cache: None,
        })
    }

    /// Linear-scale sampler with the given window size.
    pub fn with_window_size(window_size: usize) -> VizResult<Self> {
        Self::new(&AnalysisConfig {
            window_size,
            ..AnalysisConfig::default()
        })
    }

    /// Samples per analysis window.
    pub fn window_size(&self) -> usize {
        self.fft.size
    }

    /// Bins per spectrum (`window_size / 2`).
    pub fn bin_count(&self) -> usize {
        self.fft.size / 2
    }

    /// Re-plan the transform for a new window size. Drops any cached spectrum.
    pub fn set_window_size(&mut self, window_size: usize) -> VizResult<()> {
        AnalysisConfig {
            window_size,
            ..AnalysisConfig::default()
        }
        .validate()?;
        if window_size != self.fft.size {
            self.fft = plan(&mut self.planner, window_size);
        }
        self.cache = None;
        Ok(())
    }

    /// Change the magnitude scale. Drops any cached spectrum.
    pub fn set_scale(&mut self, scale: SpectrumScale) {
        self.scale = scale;
        self.cache = None;
    }

    /// Spectrum of `audio` around `position_secs`.
    pub fn sample(
        &mut self,
        audio: &DecodedAudio,
        position_secs: f64,
    ) -> VizResult<FrequencySpectrum> {
        let key = CacheKey {
            audio: audio.id(),
            centre: centre_sample(audio, position_secs)?,
            window: self.fft.size,
        };
        if let Some((cached_key, spectrum)) = &self.cache
            && *cached_key == key
        {
            return Ok(spectrum.clone());
        }

        let mags = self.magnitudes_at(audio, key.centre)?;
        let spectrum = self.quantize(&mags);
        self.cache = Some((key, spectrum.clone()));
        Ok(spectrum)
    }

    /// Bin magnitudes relative to a full-scale sinusoid (1.0), unclamped.
    pub fn normalized_magnitudes(
        &mut self,
        audio: &DecodedAudio,
        position_secs: f64,
    ) -> VizResult<Vec<f32>> {
        let centre = centre_sample(audio, position_secs)?;
        self.magnitudes_at(audio, centre)
    }

    /// Map normalized magnitudes onto bytes with the configured scale.
    pub fn quantize(&self, mags: &[f32]) -> FrequencySpectrum {
        let bins = mags
            .iter()
            .map(|&m| match self.scale {
                SpectrumScale::Linear => to_byte(m),
                SpectrumScale::Decibels { min_db, max_db } => {
                    if m <= 0.0 {
                        return 0;
                    }
                    let db = 20.0 * f64::from(m).log10();
                    to_byte(((db - min_db) / (max_db - min_db)) as f32)
                }
            })
            .collect();
        FrequencySpectrum { bins }
    }

    fn magnitudes_at(&mut self, audio: &DecodedAudio, centre: i64) -> VizResult<Vec<f32>> {
        let fft = &mut self.fft;
        let n = fft.size;
        // windows entirely outside the track read only padding
        let reach = n as i64;
        let centre = centre.clamp(-reach, (audio.frames() as i64).saturating_add(reach));
        let start = centre - (n / 2) as i64;
        for (i, (slot, w)) in fft.input.iter_mut().zip(&fft.window).enumerate() {
            *slot = audio.mono_sample(start.saturating_add(i as i64)) * w;
        }

        fft.plan
            .process_with_scratch(&mut fft.input, &mut fft.spectrum, &mut fft.scratch)
            .map_err(|e| anyhow::anyhow!("forward fft failed: {e}"))?;

        let full_scale = n as f32 / 4.0;
        Ok(fft.spectrum[..n / 2]
            .iter()
            .map(|c| c.norm() / full_scale)
            .collect())
    }
}

/// One-shot deterministic sample: linear scale, fresh plan.
pub fn sample_spectrum(
    audio: &DecodedAudio,
    position_secs: f64,
    window_size: usize,
) -> VizResult<FrequencySpectrum> {
    FrequencySampler::with_window_size(window_size)?.sample(audio, position_secs)
}

fn centre_sample(audio: &DecodedAudio, position_secs: f64) -> VizResult<i64> {
    if !position_secs.is_finite() {
        return Err(VizError::validation("sample position must be finite"));
    }
    Ok((position_secs * f64::from(audio.sample_rate())).round() as i64)
}

fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn plan(planner: &mut RealFftPlanner<f32>, size: usize) -> FftResources {
    let plan = planner.plan_fft_forward(size);
    FftResources {
        size,
        window: (0..size).map(|i| hann_value(i, size)).collect(),
        input: plan.make_input_vec(),
        spectrum: plan.make_output_vec(),
        scratch: plan.make_scratch_vec(),
        plan,
    }
}

fn hann_value(index: usize, len: usize) -> f32 {
    if len <= 1 {
        return 1.0;
    }
    0.5 - 0.5 * ((2.0 * PI * index as f32) / (len as f32 - 1.0)).cos()
}

#[cfg(test)]
#[path = "../../tests/unit/audio/sampler.rs"]
mod tests;
