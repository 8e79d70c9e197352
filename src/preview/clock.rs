use std::time::{Duration, Instant};

use crate::assets::ImageAsset;
use crate::audio::AudioGraph;
use crate::foundation::error::VizResult;
use crate::preview::ticker::{PreviewLoop, TickHandle, TickOutcome};

/// Source of tick times.
pub trait FrameClock {
    /// Block until the next tick is due and return its time.
    fn next_tick(&mut self) -> Instant;
}

/// Fixed-rate clock, sleeping between ticks.
#[derive(Clone, Debug)]
pub struct IntervalClock {
    interval: Duration,
    deadline: Option<Instant>,
}

impl IntervalClock {
    /// Common display refresh rate.
    pub const DISPLAY_REFRESH_HZ: u32 = 60;

    /// Clock ticking `hz` times per second (at least once).
    pub fn new(hz: u32) -> Self {
        Self {
            interval: Duration::from_secs(1) / hz.max(1),
            deadline: None,
        }
    }

    /// Time between ticks.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for IntervalClock {
    fn default() -> Self {
        Self::new(Self::DISPLAY_REFRESH_HZ)
    }
}

impl FrameClock for IntervalClock {
    fn next_tick(&mut self) -> Instant {
        let now = Instant::now();
        let deadline = match self.deadline {
            Some(d) if d > now => {
                std::thread::sleep(d - now);
                d
            }
            // Late or first tick: run now and re-anchor.
            _ => now,
        };
        self.deadline = Some(deadline + self.interval);
        deadline
    }
}

/// Why [`run_preview`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreviewEnd {
    /// The loop was stopped.
    Stopped,
    /// The handle was superseded by a restart.
    Stale,
    /// Playback reached the end of the track.
    PlaybackEnded,
    /// `max_ticks` frames were drawn.
    TickLimit,
}

/// What [`run_preview`] did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PreviewSummary {
    /// Frames drawn.
    pub ticks: u64,
    /// Playback position of the last drawn frame.
    pub last_position_secs: f64,
    /// Exit reason.
    pub end: PreviewEnd,
}

/// Tick `preview` on `clock` until it stops, goes stale, playback ends or `max_ticks` is reached.
pub fn run_preview(
    preview: &mut PreviewLoop,
    mut handle: TickHandle,
    graph: &AudioGraph,
    image: &ImageAsset,
    clock: &mut dyn FrameClock,
    max_ticks: Option<u64>,
) -> VizResult<PreviewSummary> {
    let duration = graph.audio.duration_secs();
    let mut summary = PreviewSummary {
        ticks: 0,
        last_position_secs: 0.0,
        end: PreviewEnd::TickLimit,
    };

    loop {
        if max_ticks.is_some_and(|max| summary.ticks >= max) {
            summary.end = PreviewEnd::TickLimit;
            return Ok(summary);
        }
        let now = clock.next_tick();
        match preview.tick(handle, graph, image, now)? {
            TickOutcome::Rendered {
                next,
                position_secs,
            } => {
                summary.ticks += 1;
                summary.last_position_secs = position_secs;
                if position_secs >= duration {
                    preview.stop();
                    summary.end = PreviewEnd::PlaybackEnded;
                    return Ok(summary);
                }
                handle = next;
            }
            TickOutcome::Stale => {
                summary.end = PreviewEnd::Stale;
                return Ok(summary);
            }
            TickOutcome::Stopped => {
                summary.end = PreviewEnd::Stopped;
                return Ok(summary);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/preview/clock.rs"]
mod tests;
