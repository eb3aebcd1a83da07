//! Linear path extraction.
//!
//! A replayable witness is a single chain: from the unique entry node, every
//! node has at most one outgoing edge into a non-sink node. Edges into sink
//! nodes are dropped; anything else is rejected.

use std::collections::HashSet;

use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::error::WitnessError;
use crate::graph::WitnessGraph;

/// Resolves the single entry node of the witness.
pub fn entry_node(witness: &WitnessGraph) -> Result<NodeIndex, WitnessError> {
    let candidates = witness.entry_candidates();
    match candidates.as_slice() {
        [] => Err(WitnessError::NoEntryNode),
        [entry] => Ok(*entry),
        many => Err(WitnessError::MultipleEntryNodes { count: many.len() }),
    }
}

/// Walks the witness from its entry node and returns the traversed edges in
/// order.
pub fn extract_path(witness: &WitnessGraph) -> Result<Vec<EdgeIndex>, WitnessError> {
    witness.ensure_violation_witness()?;
    let graph = witness.graph();
    let entry = entry_node(witness)?;
    let mut node = entry;
    let mut visited = HashSet::from([node]);
    let mut path = Vec::new();

    loop {
        let mut qualifying = graph
            .edges_directed(node, Direction::Outgoing)
            .filter(|e| !graph[e.target()].is_sink);
        let Some(edge) = qualifying.next() else {
            break;
        };
        if qualifying.next().is_some() {
            return Err(WitnessError::HasBranching {
                node: graph[node].id.clone(),
            });
        }
        let next = edge.target();
        if !visited.insert(next) {
            return Err(WitnessError::HasCycle {
                node: graph[next].id.clone(),
            });
        }
        path.push(edge.id());
        node = next;
    }

    tracing::debug!(
        transitions = path.len(),
        entry = %graph[entry].id,
        "extracted witness path"
    );
    Ok(path)
}
