use super::*;
use crate::assets::MediaInput;

fn wav_i16(sample_rate: u32, channels: u16, frames: &[Vec<i16>]) -> Vec<u8> {
    let data_len = (frames.len() * channels as usize * 2) as u32;
    let mut b = Vec::new();
    b.extend_from_slice(b"RIFF");
    b.extend_from_slice(&(36 + data_len).to_le_bytes());
    b.extend_from_slice(b"WAVEfmt ");
    b.extend_from_slice(&16u32.to_le_bytes());
    b.extend_from_slice(&1u16.to_le_bytes());
    b.extend_from_slice(&channels.to_le_bytes());
    b.extend_from_slice(&sample_rate.to_le_bytes());
    b.extend_from_slice(&(sample_rate * u32::from(channels) * 2).to_le_bytes());
    b.extend_from_slice(&(channels * 2).to_le_bytes());
    b.extend_from_slice(&16u16.to_le_bytes());
    b.extend_from_slice(b"data");
    b.extend_from_slice(&data_len.to_le_bytes());
    for frame in frames {
        for s in frame {
            b.extend_from_slice(&s.to_le_bytes());
        }
    }
    b
}

fn asset(name: &str, bytes: Vec<u8>) -> AudioAsset {
    AudioAsset::from_input(MediaInput::new(name, bytes)).unwrap()
}

#[test]
fn decodes_mono_wav() {
    let frames: Vec<Vec<i16>> = (0..8000)
        .map(|i| vec![((i as f32 * 0.1).sin() * 16000.0) as i16])
        .collect();
    let audio = decode_audio(&asset("tone.wav", wav_i16(8000, 1, &frames))).unwrap();
    assert_eq!(audio.sample_rate(), 8000);
    assert_eq!(audio.channels().len(), 1);
    assert_eq!(audio.frames(), 8000);
    assert!((audio.duration_secs() - 1.0).abs() < 1e-9);
}

#[test]
fn stereo_mono_sample_is_channel_average() {
    let frames: Vec<Vec<i16>> = (0..400).map(|_| vec![16384, 0]).collect();
    let audio = decode_audio(&asset("st.wav", wav_i16(4000, 2, &frames))).unwrap();
    assert_eq!(audio.channels().len(), 2);
    assert!((audio.mono_sample(10) - 0.25).abs() < 1e-3);
    assert_eq!(audio.mono_sample(-1), 0.0);
    assert_eq!(audio.mono_sample(400), 0.0);
}

#[test]
fn garbage_is_an_audio_decode_error() {
    let err = decode_audio(&asset("broken.mp3", vec![0x42; 512])).unwrap_err();
    assert!(matches!(err, VizError::AudioDecode(_)));
}

#[test]
fn each_decode_gets_a_fresh_id() {
    let a = DecodedAudio::from_channels(10, vec![vec![0.0; 10]]).unwrap();
    let b = DecodedAudio::from_channels(10, vec![vec![0.0; 10]]).unwrap();
    assert_ne!(a.id(), b.id());
}

#[test]
fn empty_or_ragged_pcm_is_rejected() {
    assert!(DecodedAudio::from_channels(10, vec![]).is_err());
    assert!(DecodedAudio::from_channels(10, vec![vec![]]).is_err());
    assert!(DecodedAudio::from_channels(10, vec![vec![0.0; 3], vec![0.0; 2]]).is_err());
    assert!(DecodedAudio::from_channels(0, vec![vec![0.0; 3]]).is_err());
}
