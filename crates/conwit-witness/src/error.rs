//! Witness error types for conwit-witness.
//!
//! Every variant is a classified rejection: the witness is not something the
//! validator can replay. [`WitnessError::verdict_reason`] gives the short
//! reason printed on the `Verdict:` line.

use thiserror::Error;

/// Errors produced while loading a witness and extracting its path.
#[derive(Debug, Error)]
pub enum WitnessError {
    /// The witness file could not be read.
    #[error("failed to read witness: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not well-formed GraphML.
    #[error("malformed witness: {reason}")]
    Malformed { reason: String },

    /// The graph carries no `witness-type` attribute.
    #[error("witness has no witness-type attribute")]
    MissingWitnessType,

    /// The graph is not a violation witness (typically a correctness witness).
    #[error("expected a violation witness, found '{found}'")]
    WrongWitnessKind { found: String },

    /// No node is marked as entry and none can be inferred.
    #[error("witness has no entry node")]
    NoEntryNode,

    /// More than one candidate entry node.
    #[error("witness has {count} entry nodes")]
    MultipleEntryNodes { count: usize },

    /// A node has more than one outgoing edge into non-sink nodes.
    #[error("witness branches at node '{node}'")]
    HasBranching { node: String },

    /// The non-sink path revisits a node.
    #[error("witness path revisits node '{node}'")]
    HasCycle { node: String },

    /// An edge attribute that must be numeric is not.
    #[error("invalid value '{value}' for witness attribute '{name}'")]
    InvalidAttribute { name: String, value: String },
}

impl WitnessError {
    /// Short reason reported as `Verdict: <reason>`.
    pub fn verdict_reason(&self) -> &'static str {
        match self {
            WitnessError::WrongWitnessKind { .. } => "Correctness witness",
            WitnessError::NoEntryNode => "No entry node",
            WitnessError::MultipleEntryNodes { .. } => "Multiple entry nodes",
            WitnessError::HasBranching { .. } => "Has branching",
            WitnessError::HasCycle { .. } => "Has cycle",
            WitnessError::Io(_)
            | WitnessError::Malformed { .. }
            | WitnessError::MissingWitnessType
            | WitnessError::InvalidAttribute { .. } => "Incompatible witness",
        }
    }
}
