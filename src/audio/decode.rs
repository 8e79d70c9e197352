use std::io::Cursor;
use std::sync::atomic::{AtomicU64, Ordering};

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::assets::AudioAsset;
use crate::foundation::error::{VizError, VizResult};

static NEXT_AUDIO_ID: AtomicU64 = AtomicU64::new(1);

/// Per-channel PCM decoded from an [`AudioAsset`]. Immutable once built.
#[derive(Clone, Debug)]
pub struct DecodedAudio {
    id: u64,
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl DecodedAudio {
    /// Build from planar PCM. All channels must have the same non-zero length.
    pub fn from_channels(sample_rate: u32, channels: Vec<Vec<f32>>) -> VizResult<Self> {
        if sample_rate == 0 {
            return Err(VizError::audio_decode("sample rate must be > 0"));
        }
        let Some(first) = channels.first() else {
            return Err(VizError::audio_decode("audio has no channels"));
        };
        let frames = first.len();
        if frames == 0 {
            return Err(VizError::audio_decode("audio contains no samples"));
        }
        if channels.iter().any(|c| c.len() != frames) {
            return Err(VizError::audio_decode("channel lengths differ"));
        }
        Ok(Self {
            id: NEXT_AUDIO_ID.fetch_add(1, Ordering::Relaxed),
            sample_rate,
            channels,
        })
    }

    /// Process-unique identity, used to key sampler caches.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Planar samples, one `Vec` per channel.
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Samples per channel.
    pub fn frames(&self) -> usize {
        self.channels[0].len()
    }

    /// Track length in seconds (always > 0).
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / f64::from(self.sample_rate)
    }

    /// Channel average at sample `i`; silence outside the track.
    pub fn mono_sample(&self, i: i64) -> f32 {
        if i < 0 || i as usize >= self.frames() {
            return 0.0;
        }
        let i = i as usize;
        let sum: f32 = self.channels.iter().map(|c| c[i]).sum();
        sum / self.channels.len() as f32
    }
}

/// Decode the compressed bytes of `asset` into planar `f32` PCM.
///
/// Individual corrupt packets are skipped. An unrecognised container, a missing audio track or
/// an empty result are [`VizError::AudioDecode`] errors.
#[tracing::instrument(skip(asset), fields(name = %asset.name, bytes = asset.bytes.len()))]
pub fn decode_audio(asset: &AudioAsset) -> VizResult<DecodedAudio> {
    let source = Cursor::new(asset.bytes.clone());
    let mss = MediaSourceStream::new(Box::new(source), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = asset.extension() {
        hint.with_extension(&ext);
    }
    hint.mime_type(&asset.mime);

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| VizError::audio_decode(format!("unrecognised audio container: {e}")))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| VizError::audio_decode("no audio track found"))?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| VizError::audio_decode(format!("unsupported audio codec: {e}")))?;

    let mut sample_rate = codec_params.sample_rate.unwrap_or(0);
    let mut channels: Vec<Vec<f32>> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;
    let mut skipped = 0usize;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(VizError::audio_decode(format!("read packet: {e}"))),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(_)) => {
                skipped += 1;
                continue;
            }
            Err(e) => return Err(VizError::audio_decode(format!("decode packet: {e}"))),
        };

        let spec = *decoded.spec();
        let n_frames = decoded.frames() as u64;
        if n_frames == 0 {
            continue;
        }
        let n_channels = spec.channels.count().max(1);
        if channels.is_empty() {
            channels = vec![Vec::new(); n_channels];
            sample_rate = spec.rate;
        }

        let needed = n_frames * n_channels as u64;
        if sample_buf
            .as_ref()
            .is_none_or(|b| (b.capacity() as u64) < needed)
        {
            sample_buf = Some(SampleBuffer::new(n_frames, spec));
        }
        let Some(buf) = sample_buf.as_mut() else {
            continue;
        };
        buf.copy_interleaved_ref(decoded);
        for frame in buf.samples().chunks_exact(n_channels) {
            for (ch, &s) in channels.iter_mut().zip(frame) {
                ch.push(s);
            }
        }
    }

    if skipped > 0 {
        tracing::warn!(skipped, "skipped corrupt audio packets");
    }
    let audio = DecodedAudio::from_channels(sample_rate, channels)?;
    tracing::info!(
        sample_rate = audio.sample_rate,
        channels = audio.channels.len(),
        duration_secs = audio.duration_secs(),
        "decoded audio"
    );
    Ok(audio)
}

#[cfg(test)]
#[path = "../../tests/unit/audio/decode.rs"]
mod tests;
