use super::*;
use std::sync::Arc;

use crate::audio::{DecodedAudio, PlaybackClock};
use crate::config::{AnalysisConfig, VisualizerSettings};
use crate::foundation::core::Canvas;

struct StepClock {
    base: Instant,
    step: Duration,
    n: u32,
}

impl FrameClock for StepClock {
    fn next_tick(&mut self) -> Instant {
        let t = self.base + self.step * self.n;
        self.n += 1;
        t
    }
}

fn setup() -> (PreviewLoop, AudioGraph, ImageAsset, Instant) {
    let preview = PreviewLoop::new(
        Canvas::new(32, 16).unwrap(),
        &AnalysisConfig {
            window_size: 32,
            ..AnalysisConfig::default()
        },
    )
    .unwrap();
    let base = Instant::now();
    let mut graph = AudioGraph {
        audio: Arc::new(DecodedAudio::from_channels(100, vec![vec![0.25; 100]]).unwrap()),
        clock: PlaybackClock::new(),
    };
    graph.clock.play(base);
    let image = ImageAsset::from_rgba8(1, 1, vec![255, 255, 255, 255]).unwrap();
    (preview, graph, image, base)
}

fn settings() -> VisualizerSettings {
    VisualizerSettings {
        bar_spacing: 0.0,
        ..VisualizerSettings::default()
    }
}

#[test]
fn runs_until_playback_ends() {
    let (mut preview, graph, image, base) = setup();
    let handle = preview.start(settings()).unwrap();
    let mut clock = StepClock {
        base,
        step: Duration::from_millis(250),
        n: 0,
    };
    let summary = run_preview(&mut preview, handle, &graph, &image, &mut clock, None).unwrap();
    assert_eq!(summary.end, PreviewEnd::PlaybackEnded);
    assert_eq!(summary.ticks, 5);
    assert!((summary.last_position_secs - 1.0).abs() < 1e-9);
    assert!(!preview.is_running());
}

#[test]
fn tick_limit_and_stale_handles_end_the_run() {
    let (mut preview, graph, image, base) = setup();
    let handle = preview.start(settings()).unwrap();
    let mut clock = StepClock {
        base,
        step: Duration::from_millis(10),
        n: 0,
    };
    let summary =
        run_preview(&mut preview, handle.clone(), &graph, &image, &mut clock, Some(3)).unwrap();
    assert_eq!((summary.end, summary.ticks), (PreviewEnd::TickLimit, 3));

    preview.restart(settings()).unwrap();
    let summary = run_preview(&mut preview, handle, &graph, &image, &mut clock, None).unwrap();
    assert_eq!((summary.end, summary.ticks), (PreviewEnd::Stale, 0));
}

#[test]
fn interval_clock_rate() {
    assert_eq!(
        IntervalClock::default().interval(),
        Duration::from_secs(1) / 60
    );
    assert_eq!(IntervalClock::new(0).interval(), Duration::from_secs(1));

    let mut clock = IntervalClock::new(200);
    let a = clock.next_tick();
    let b = clock.next_tick();
    assert!(b >= a + Duration::from_millis(5));
}
