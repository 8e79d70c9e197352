use super::*;
use std::sync::Arc;
use std::time::Duration;

use crate::audio::{DecodedAudio, PlaybackClock};

fn analysis() -> AnalysisConfig {
    AnalysisConfig {
        window_size: 64,
        ..AnalysisConfig::default()
    }
}

fn graph() -> AudioGraph {
    let samples: Vec<f32> = (0..8000).map(|i| (i as f32 * 0.3).sin() * 0.5).collect();
    AudioGraph {
        audio: Arc::new(DecodedAudio::from_channels(8000, vec![samples]).unwrap()),
        clock: PlaybackClock::new(),
    }
}

fn image() -> ImageAsset {
    ImageAsset::from_rgba8(1, 1, vec![0, 0, 80, 255]).unwrap()
}

fn narrow_bars() -> VisualizerSettings {
    VisualizerSettings {
        bar_spacing: 0.0,
        ..VisualizerSettings::default()
    }
}

#[test]
fn rendered_tick_reports_clock_position() {
    let mut preview = PreviewLoop::new(Canvas::new(64, 32).unwrap(), &analysis()).unwrap();
    let mut graph = graph();
    let t0 = Instant::now();
    graph.clock.seek(0.25, t0);
    graph.clock.play(t0);

    let handle = preview.start(narrow_bars()).unwrap();
    let out = preview
        .tick(handle, &graph, &image(), t0 + Duration::from_millis(250))
        .unwrap();
    match out {
        TickOutcome::Rendered {
            next,
            position_secs,
        } => {
            assert!((position_secs - 0.5).abs() < 1e-9);
            assert_eq!(next.generation(), preview.generation());
        }
        other => panic!("expected a rendered tick, got {other:?}"),
    }
}

#[test]
fn restart_makes_old_handles_stale() {
    let mut preview = PreviewLoop::new(Canvas::new(64, 32).unwrap(), &analysis()).unwrap();
    let graph = graph();
    let old = preview.start(narrow_bars()).unwrap();
    let new = preview
        .restart(VisualizerSettings {
            glow: true,
            ..narrow_bars()
        })
        .unwrap();
    assert!(preview.settings().glow);

    let now = Instant::now();
    assert_eq!(
        preview.tick(old, &graph, &image(), now).unwrap(),
        TickOutcome::Stale
    );
    assert!(matches!(
        preview.tick(new, &graph, &image(), now).unwrap(),
        TickOutcome::Rendered { .. }
    ));
}

#[test]
fn stopped_loop_draws_nothing() {
    let mut preview = PreviewLoop::new(Canvas::new(64, 32).unwrap(), &analysis()).unwrap();
    let handle = preview.start(narrow_bars()).unwrap();
    preview.stop();
    assert!(!preview.is_running());
    assert_eq!(
        preview
            .tick(handle, &graph(), &image(), Instant::now())
            .unwrap(),
        TickOutcome::Stopped
    );
}

#[test]
fn render_failure_stops_the_loop_as_a_preview_error() {
    let mut preview = PreviewLoop::new(Canvas::new(8, 8).unwrap(), &analysis()).unwrap();
    let handle = preview
        .start(VisualizerSettings {
            bar_spacing: 10.0,
            ..VisualizerSettings::default()
        })
        .unwrap();
    let err = preview
        .tick(handle, &graph(), &image(), Instant::now())
        .unwrap_err();
    assert!(matches!(err, VizError::Preview(_)));
    assert!(!preview.is_running());
}
