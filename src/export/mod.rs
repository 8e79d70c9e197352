//! Offline export: the run state machine and the frame-exact pipeline that drives it.

pub(crate) mod pipeline;
pub(crate) mod run;

pub use pipeline::{ExportInputs, ExportPipeline};
pub use run::{
    CancelToken, ExportRun, ExportState, ProgressObserver, ProgressTracker, rendering_progress,
};
