//! Interactive preview: a cooperative, generation-checked tick loop over live analysis.
//!
//! Unlike export, preview is not frame-exact: each tick samples the spectrum at the playback
//! clock's current position. Any settings change starts a new generation, so ticks scheduled
//! for older settings are dropped.

pub(crate) mod clock;
pub(crate) mod ticker;

pub use clock::{FrameClock, IntervalClock, PreviewEnd, PreviewSummary, run_preview};
pub use ticker::{PreviewLoop, TickHandle, TickOutcome};
