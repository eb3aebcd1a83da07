//! Violation witness loading for conwit.
//!
//! This crate turns a GraphML violation witness into the ordered list of
//! [`Transition`]s the instrumentation engine replays.
//!
//! # Modules
//!
//! - [`graphml`] -- GraphML document reading with key/default resolution
//! - [`graph`] -- The witness automaton as a petgraph `DiGraph`
//! - [`path`] -- Entry resolution and linear path extraction
//! - [`coords`] -- Line/offset hints to exact source coordinates
//! - [`transition`] -- Resolved transitions
//! - [`error`] -- Classified witness rejections

pub mod coords;
pub mod error;
pub mod graph;
pub mod graphml;
pub mod path;
pub mod transition;

pub use coords::{Coords, LocationHints, SourceText};
pub use error::WitnessError;
pub use graph::{WitnessEdge, WitnessGraph, WitnessNode};
pub use transition::{Transition, TransitionMetadata};

use std::path::Path;

/// Parses witness text into a [`WitnessGraph`].
pub fn parse_witness(text: &str) -> Result<WitnessGraph, WitnessError> {
    let doc = graphml::parse_graphml(text)?;
    WitnessGraph::from_document(&doc)
}

/// Extracts the witness path and resolves every edge against `source`.
pub fn transitions(
    witness: &WitnessGraph,
    source: &[u8],
) -> Result<Vec<Transition>, WitnessError> {
    let text = SourceText::new(source);
    let path = path::extract_path(witness)?;
    Ok(path
        .into_iter()
        .map(|edge| Transition::resolve(&witness.graph()[edge], &text))
        .collect())
}

/// Reads a witness file and returns its resolved transitions.
pub fn load_transitions(
    witness_file: &Path,
    source: &[u8],
) -> Result<Vec<Transition>, WitnessError> {
    let text = std::fs::read_to_string(witness_file)?;
    let witness = parse_witness(&text)?;
    transitions(&witness, source)
}
