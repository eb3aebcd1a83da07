//! The witness automaton as a petgraph [`DiGraph`].
//!
//! [`WitnessGraph`] keeps the graph-level witness type, the entry/sink markers
//! of every node, and the typed attributes of every edge. Nodes referenced by
//! an edge but never declared are created on demand.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use crate::error::WitnessError;
use crate::graphml::{Attributes, GraphMlDocument};

/// Graph attribute naming the witness kind.
pub const WITNESS_TYPE_KEY: &str = "witness-type";
/// The only witness kind this crate accepts.
pub const VIOLATION_WITNESS: &str = "violation_witness";

const ENTRY_KEYS: [&str; 2] = ["entry", "isEntryNode"];
const SINK_KEYS: [&str; 2] = ["sink", "isSinkNode"];

/// A witness automaton state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessNode {
    pub id: String,
    pub is_entry: bool,
    pub is_sink: bool,
}

/// Typed attributes of a witness transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessEdge {
    pub startline: Option<usize>,
    pub endline: Option<usize>,
    pub startoffset: Option<usize>,
    pub endoffset: Option<usize>,
    pub assumption: Option<String>,
    pub control: Option<String>,
    pub thread_id: Option<i64>,
    pub create_thread: Option<i64>,
}

impl WitnessEdge {
    /// Reads the attributes relevant to replay from a GraphML attribute map.
    pub fn from_attributes(attrs: &Attributes) -> Result<Self, WitnessError> {
        Ok(WitnessEdge {
            startline: parse_number(attrs, "startline")?,
            endline: parse_number(attrs, "endline")?,
            startoffset: parse_number(attrs, "startoffset")?,
            endoffset: parse_number(attrs, "endoffset")?,
            assumption: attrs.get("assumption").cloned(),
            control: attrs.get("control").cloned(),
            thread_id: parse_number(attrs, "threadId")?,
            create_thread: parse_number(attrs, "createThread")?,
        })
    }
}

fn parse_number<T: std::str::FromStr>(
    attrs: &Attributes,
    name: &str,
) -> Result<Option<T>, WitnessError> {
    match attrs.get(name).map(|v| v.trim()) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| WitnessError::InvalidAttribute {
                name: name.to_string(),
                value: value.to_string(),
            }),
    }
}

fn is_marked(attrs: &Attributes, keys: &[&str]) -> bool {
    keys.iter().any(|key| {
        attrs
            .get(*key)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true") || v.trim() == "1")
    })
}

/// A loaded witness automaton.
#[derive(Debug, Clone, Default)]
pub struct WitnessGraph {
    witness_type: Option<String>,
    graph: DiGraph<WitnessNode, WitnessEdge>,
    node_ids: HashMap<String, NodeIndex>,
}

impl WitnessGraph {
    /// Creates an empty graph with the given witness type.
    pub fn new(witness_type: Option<&str>) -> Self {
        WitnessGraph {
            witness_type: witness_type.map(str::to_string),
            ..WitnessGraph::default()
        }
    }

    /// Builds the graph from a parsed GraphML document.
    pub fn from_document(doc: &GraphMlDocument) -> Result<Self, WitnessError> {
        let mut witness = WitnessGraph::new(doc.graph.get(WITNESS_TYPE_KEY).map(String::as_str));
        for node in &doc.nodes {
            witness.add_node(
                &node.id,
                is_marked(&node.attrs, &ENTRY_KEYS),
                is_marked(&node.attrs, &SINK_KEYS),
            );
        }
        for edge in &doc.edges {
            witness.add_edge(
                &edge.source,
                &edge.target,
                WitnessEdge::from_attributes(&edge.attrs)?,
            );
        }
        Ok(witness)
    }

    /// Adds a node, or updates the markers of an existing one.
    pub fn add_node(&mut self, id: &str, is_entry: bool, is_sink: bool) -> NodeIndex {
        if let Some(&idx) = self.node_ids.get(id) {
            let node = &mut self.graph[idx];
            node.is_entry |= is_entry;
            node.is_sink |= is_sink;
            return idx;
        }
        let idx = self.graph.add_node(WitnessNode {
            id: id.to_string(),
            is_entry,
            is_sink,
        });
        self.node_ids.insert(id.to_string(), idx);
        idx
    }

    /// Adds an edge, creating unknown endpoints as unmarked nodes.
    pub fn add_edge(&mut self, source: &str, target: &str, edge: WitnessEdge) -> EdgeIndex {
        let s = self.add_node(source, false, false);
        let t = self.add_node(target, false, false);
        self.graph.add_edge(s, t, edge)
    }

    pub fn witness_type(&self) -> Option<&str> {
        self.witness_type.as_deref()
    }

    /// Returns a read-only reference to the underlying graph.
    pub fn graph(&self) -> &DiGraph<WitnessNode, WitnessEdge> {
        &self.graph
    }

    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.node_ids.get(id).copied()
    }

    /// Fails unless the graph is tagged as a violation witness.
    pub fn ensure_violation_witness(&self) -> Result<(), WitnessError> {
        match self.witness_type() {
            None => Err(WitnessError::MissingWitnessType),
            Some(kind) if kind.trim() == VIOLATION_WITNESS => Ok(()),
            Some(kind) => Err(WitnessError::WrongWitnessKind {
                found: kind.trim().to_string(),
            }),
        }
    }

    /// Candidate entry nodes: explicitly marked ones, or else every node with
    /// no incoming and at least one outgoing edge. Sorted by index.
    pub fn entry_candidates(&self) -> Vec<NodeIndex> {
        let marked: Vec<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|&n| self.graph[n].is_entry)
            .collect();
        if !marked.is_empty() {
            return marked;
        }
        self.graph
            .node_indices()
            .filter(|&n| {
                self.graph
                    .neighbors_directed(n, Direction::Incoming)
                    .next()
                    .is_none()
                    && self
                        .graph
                        .neighbors_directed(n, Direction::Outgoing)
                        .next()
                        .is_some()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> Attributes {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn edge_attributes_are_typed() {
        let edge = WitnessEdge::from_attributes(&attrs(&[
            ("startline", "7"),
            ("threadId", "2"),
            ("assumption", "x == 1;"),
        ]))
        .unwrap();
        assert_eq!(edge.startline, Some(7));
        assert_eq!(edge.thread_id, Some(2));
        assert_eq!(edge.assumption.as_deref(), Some("x == 1;"));
        assert_eq!(edge.endline, None);
    }

    #[test]
    fn non_numeric_line_is_rejected() {
        let err = WitnessEdge::from_attributes(&attrs(&[("startline", "seven")])).unwrap_err();
        assert!(matches!(
            err,
            WitnessError::InvalidAttribute { ref name, .. } if name == "startline"
        ));
    }

    #[test]
    fn correctness_witness_is_rejected() {
        let g = WitnessGraph::new(Some("correctness_witness"));
        assert!(matches!(
            g.ensure_violation_witness(),
            Err(WitnessError::WrongWitnessKind { .. })
        ));
        assert!(matches!(
            WitnessGraph::new(None).ensure_violation_witness(),
            Err(WitnessError::MissingWitnessType)
        ));
        assert!(WitnessGraph::new(Some("violation_witness"))
            .ensure_violation_witness()
            .is_ok());
    }

    #[test]
    fn marked_entry_wins_over_inferred() {
        let mut g = WitnessGraph::new(Some(VIOLATION_WITNESS));
        g.add_edge("A", "B", WitnessEdge::default());
        g.add_node("B", true, false);
        let entries = g.entry_candidates();
        assert_eq!(entries, vec![g.node_index("B").unwrap()]);
    }

    #[test]
    fn entry_is_inferred_from_degrees() {
        let mut g = WitnessGraph::new(Some(VIOLATION_WITNESS));
        g.add_node("isolated", false, false);
        g.add_edge("A", "B", WitnessEdge::default());
        g.add_edge("B", "C", WitnessEdge::default());
        assert_eq!(g.entry_candidates(), vec![g.node_index("A").unwrap()]);
    }

    #[test]
    fn sink_markers_accept_both_spellings() {
        assert!(is_marked(&attrs(&[("sink", "true")]), &SINK_KEYS));
        assert!(is_marked(&attrs(&[("isSinkNode", "TRUE")]), &SINK_KEYS));
        assert!(!is_marked(&attrs(&[("isSinkNode", "false")]), &SINK_KEYS));
    }
}
