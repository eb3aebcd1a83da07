//! Resolved witness transitions.

use serde::{Deserialize, Serialize};

use crate::coords::{Coords, LocationHints, SourceText};
use crate::graph::WitnessEdge;

/// Edge attributes that drive scheduling and value pinning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionMetadata {
    pub assumption: Option<String>,
    /// Branch direction; carried through, not interpreted.
    pub control: Option<String>,
    pub thread_id: Option<i64>,
    pub create_thread: Option<i64>,
}

/// One step of the witness path, in execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub coords: Option<Coords>,
    pub metadata: TransitionMetadata,
}

impl Transition {
    /// Resolves a witness edge against the program text.
    pub fn resolve(edge: &WitnessEdge, source: &SourceText<'_>) -> Self {
        Transition {
            coords: source.resolve(LocationHints::from(edge)),
            metadata: TransitionMetadata {
                assumption: edge.assumption.clone(),
                control: edge.control.clone(),
                thread_id: edge.thread_id,
                create_thread: edge.create_thread,
            },
        }
    }

    pub fn startline(&self) -> Option<usize> {
        self.coords.as_ref().map(|c| c.startline)
    }
}
