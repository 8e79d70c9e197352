use std::fmt;
use std::sync::Arc;

use crate::audio::decode::DecodedAudio;
use crate::audio::live::PlaybackClock;
use crate::foundation::core::RunId;
use crate::foundation::error::{VizError, VizResult};

/// Who currently holds the audio graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GraphOwner {
    /// The live preview loop.
    Preview,
    /// One export run.
    Export(RunId),
}

impl fmt::Display for GraphOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preview => f.write_str("preview"),
            Self::Export(id) => write!(f, "export {id}"),
        }
    }
}

/// Decoded audio plus its playback position: the one decode/playback context of a session.
#[derive(Clone, Debug)]
pub struct AudioGraph {
    /// Decoded PCM.
    pub audio: Arc<DecodedAudio>,
    /// Playback position (only advanced by preview).
    pub clock: PlaybackClock,
}

impl AudioGraph {
    fn new(audio: Arc<DecodedAudio>) -> Self {
        Self {
            audio,
            clock: PlaybackClock::new(),
        }
    }
}

/// Lifecycle phase of an [`AudioGraphSlot`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotPhase {
    /// Never acquired.
    Unacquired,
    /// Held by exactly one owner.
    Acquired,
    /// Released by its last owner; may be acquired again.
    Released,
}

/// Single-owner handle on the audio graph.
///
/// `Unacquired -> Acquired -> Released -> Acquired ...`. Acquiring while someone else holds the
/// graph force-releases them first, so there are never two owners.
#[derive(Debug)]
pub struct AudioGraphSlot {
    phase: SlotPhase,
    owner: Option<GraphOwner>,
    graph: Option<AudioGraph>,
}

impl Default for AudioGraphSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioGraphSlot {
    /// Empty slot.
    pub fn new() -> Self {
        Self {
            phase: SlotPhase::Unacquired,
            owner: None,
            graph: None,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> SlotPhase {
        self.phase
    }

    /// Current owner, if acquired.
    pub fn owner(&self) -> Option<GraphOwner> {
        self.owner
    }

    /// Borrow the graph, if acquired.
    pub fn graph(&self) -> Option<&AudioGraph> {
        self.graph.as_ref()
    }

    /// Mutably borrow the graph, if acquired.
    pub fn graph_mut(&mut self) -> Option<&mut AudioGraph> {
        self.graph.as_mut()
    }

    /// Hand the graph to `owner`, building it around `audio`.
    ///
    /// A different current owner is force-released first.
    pub fn acquire(&mut self, owner: GraphOwner, audio: Arc<DecodedAudio>) -> &mut AudioGraph {
        if let Some(prev) = self.owner
            && prev != owner
        {
            tracing::warn!(%prev, next = %owner, "force-releasing audio graph");
            self.force_release();
        }
        tracing::info!(%owner, "audio graph acquired");
        self.phase = SlotPhase::Acquired;
        self.owner = Some(owner);
        self.graph.insert(AudioGraph::new(audio))
    }

    /// Release the graph held by `owner`.
    pub fn release(&mut self, owner: GraphOwner) -> VizResult<()> {
        match self.owner {
            Some(current) if current == owner => {
                self.teardown();
                tracing::info!(%owner, "audio graph released");
                Ok(())
            }
            Some(current) => Err(VizError::validation(format!(
                "{owner} cannot release the audio graph held by {current}"
            ))),
            None => Err(VizError::validation(format!(
                "{owner} cannot release an audio graph that is not acquired"
            ))),
        }
    }

    /// Stop playback and drop the graph regardless of owner. Returns the evicted owner.
    pub fn force_release(&mut self) -> Option<GraphOwner> {
        let prev = self.owner;
        if prev.is_some() {
            self.teardown();
        }
        prev
    }

    fn teardown(&mut self) {
        if let Some(graph) = self.graph.as_mut() {
            graph.clock.stop();
        }
        self.graph = None;
        self.owner = None;
        self.phase = SlotPhase::Released;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/graph.rs"]
mod tests;
