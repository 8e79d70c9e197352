pub(crate) mod project;
pub(crate) mod settings;

pub use project::{AnalysisConfig, PipelineOptions, ProjectConfig, SpectrumScale};
pub use settings::{ExportSettings, Quality, Resolution, VideoFormat, VisualizerSettings};
