use super::*;
use crate::assets::MediaInput;
use crate::audio::SlotPhase;
use crate::config::{ProjectConfig, Resolution};
use crate::encode::InMemoryEncoder;
use crate::foundation::core::RunId;
use crate::foundation::error::{DecodeTarget, FailureReason};

fn wav_mono(sample_rate: u32, samples: &[i16]) -> Vec<u8> {
    let data_len = (samples.len() * 2) as u32;
    let mut b = Vec::new();
    b.extend_from_slice(b"RIFF");
    b.extend_from_slice(&(36 + data_len).to_le_bytes());
    b.extend_from_slice(b"WAVEfmt ");
    b.extend_from_slice(&16u32.to_le_bytes());
    b.extend_from_slice(&1u16.to_le_bytes());
    b.extend_from_slice(&1u16.to_le_bytes());
    b.extend_from_slice(&sample_rate.to_le_bytes());
    b.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    b.extend_from_slice(&2u16.to_le_bytes());
    b.extend_from_slice(&16u16.to_le_bytes());
    b.extend_from_slice(b"data");
    b.extend_from_slice(&data_len.to_le_bytes());
    for s in samples {
        b.extend_from_slice(&s.to_le_bytes());
    }
    b
}

fn half_second_tone() -> AudioAsset {
    let samples: Vec<i16> = (0..4000)
        .map(|i| ((i as f32 * 0.4).sin() * 12000.0) as i16)
        .collect();
    AudioAsset::from_input(MediaInput::new("tone.wav", wav_mono(8000, &samples))).unwrap()
}

fn small_config() -> ProjectConfig {
    let mut cfg = ProjectConfig::default();
    cfg.export.fps = 10;
    cfg.export.resolution = Resolution::Custom {
        width: 64,
        height: 36,
    };
    cfg.visualizer.bar_spacing = 0.0;
    cfg.analysis.window_size = 64;
    cfg.pipeline.chunk_size = 2;
    cfg.pipeline.threads = Some(2);
    cfg
}

fn image() -> ImageAsset {
    ImageAsset::from_rgba8(2, 2, vec![30, 30, 60, 255].repeat(4)).unwrap()
}

#[test]
fn renders_every_frame_in_order_and_releases_the_graph() {
    let audio = half_second_tone();
    let image = image();
    let mut run = ExportRun::new(RunId(1), &small_config()).unwrap();
    let mut slot = AudioGraphSlot::new();
    let mut encoder = InMemoryEncoder::new();
    let mut progress = Vec::new();
    let mut observer = |p: u8| progress.push(p);

    let video = ExportPipeline::run(
        &mut run,
        ExportInputs {
            audio: &audio,
            image: &image,
        },
        &mut slot,
        &mut encoder,
        &mut observer,
    )
    .unwrap();

    assert_eq!(run.video(), Some(&video));
    let job = &encoder.jobs()[0];
    assert_eq!(job.keys, (0..5).map(FrameKey).collect::<Vec<_>>());
    assert!(Arc::ptr_eq(&job.audio_bytes, &audio.bytes));
    assert_eq!(slot.phase(), SlotPhase::Released);
    assert!(progress.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(progress.first(), Some(&0));
    assert_eq!(progress.last(), Some(&100));
}

#[test]
fn cancellation_mid_render_fails_silently_and_frees_the_graph() {
    let audio = half_second_tone();
    let image = image();
    let mut run = ExportRun::new(RunId(2), &small_config()).unwrap();
    let token = run.cancel_token();
    let mut slot = AudioGraphSlot::new();
    let mut encoder = InMemoryEncoder::new();
    let mut observer = |p: u8| {
        if p >= 30 {
            token.cancel();
        }
    };

    let err = ExportPipeline::run(
        &mut run,
        ExportInputs {
            audio: &audio,
            image: &image,
        },
        &mut slot,
        &mut encoder,
        &mut observer,
    )
    .unwrap_err();

    assert!(err.is_silent());
    assert_eq!(run.state(), &ExportState::Failed(FailureReason::Cancelled));
    assert!(encoder.jobs().is_empty());
    assert_eq!(slot.owner(), None);
}

#[test]
fn corrupt_audio_is_an_audio_decode_failure() {
    let audio =
        AudioAsset::from_input(MediaInput::new("bad.wav", b"RIFF\0\0\0\0WAVEjunk".to_vec()))
            .unwrap();
    let image = image();
    let mut run = ExportRun::new(RunId(3), &small_config()).unwrap();
    let mut slot = AudioGraphSlot::new();
    let err = ExportPipeline::run(
        &mut run,
        ExportInputs {
            audio: &audio,
            image: &image,
        },
        &mut slot,
        &mut InMemoryEncoder::new(),
        &mut |_: u8| {},
    )
    .unwrap_err();
    assert!(matches!(err, VizError::AudioDecode(_)));
    assert_eq!(
        run.state(),
        &ExportState::Failed(FailureReason::DecodeError {
            target: DecodeTarget::Audio
        })
    );
}

#[test]
fn tiny_buffer_budget_is_resource_exhaustion() {
    let audio = half_second_tone();
    let image = image();
    let mut cfg = small_config();
    cfg.pipeline.max_buffered_bytes = 16;
    let mut run = ExportRun::new(RunId(4), &cfg).unwrap();
    let err = ExportPipeline::run(
        &mut run,
        ExportInputs {
            audio: &audio,
            image: &image,
        },
        &mut AudioGraphSlot::new(),
        &mut InMemoryEncoder::new(),
        &mut |_: u8| {},
    )
    .unwrap_err();
    assert!(matches!(err, VizError::ResourceExhausted(_)));
    assert_eq!(
        run.state(),
        &ExportState::Failed(FailureReason::ResourceExhausted)
    );
}

#[test]
fn parallel_and_sequential_serialization_agree() {
    let pending: Vec<(FrameKey, Vec<u8>)> = (0..6u8)
        .map(|i| (FrameKey(u64::from(i)), vec![i * 40, 10, 200, 255].repeat(16)))
        .collect();
    let pool = build_thread_pool(Some(3)).unwrap();
    let seq = serialize_chunk(&pending, 4, 4, 90, None).unwrap();
    let par = serialize_chunk(&pending, 4, 4, 90, Some(&pool)).unwrap();
    assert_eq!(seq, par);
    assert_eq!(
        par.iter().map(|f| f.key).collect::<Vec<_>>(),
        (0..6).map(FrameKey).collect::<Vec<_>>()
    );
}

#[test]
fn zero_threads_is_rejected() {
    assert!(build_thread_pool(Some(0)).is_err());
}
