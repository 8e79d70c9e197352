pub(crate) mod decode;
pub(crate) mod graph;
pub(crate) mod live;
pub(crate) mod sampler;

pub use decode::{DecodedAudio, decode_audio};
pub use graph::{AudioGraph, AudioGraphSlot, GraphOwner, SlotPhase};
pub use live::{LiveAnalyser, PlaybackClock};
pub use sampler::{FrequencySampler, FrequencySpectrum, sample_spectrum};
