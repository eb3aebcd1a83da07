//! GraphML reading.
//!
//! Turns a GraphML document into plain node/edge records with resolved
//! attribute maps. Each `<data>` value is stored under both its key id and the
//! key's declared `attr.name`, so callers can look an attribute up by either
//! spelling (`entry` / `isEntryNode`, `sink` / `isSinkNode`). Key defaults
//! declared with `<default>` are applied to elements that omit the value.

use indexmap::IndexMap;
use roxmltree::Node;

use crate::error::WitnessError;

/// Attribute values of one GraphML element, in declaration order.
pub type Attributes = IndexMap<String, String>;

/// Which element kind a `<key>` applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDomain {
    Graph,
    Node,
    Edge,
    All,
}

impl KeyDomain {
    fn from_attr(value: Option<&str>) -> Self {
        match value {
            Some("graph") => KeyDomain::Graph,
            Some("node") => KeyDomain::Node,
            Some("edge") => KeyDomain::Edge,
            _ => KeyDomain::All,
        }
    }

    fn applies_to(self, domain: KeyDomain) -> bool {
        self == KeyDomain::All || self == domain
    }
}

/// A `<key>` declaration.
#[derive(Debug, Clone)]
pub struct KeyDecl {
    pub id: String,
    pub name: Option<String>,
    pub domain: KeyDomain,
    pub default: Option<String>,
}

/// A `<node>` element.
#[derive(Debug, Clone)]
pub struct GraphMlNode {
    pub id: String,
    pub attrs: Attributes,
}

/// An `<edge>` element.
#[derive(Debug, Clone)]
pub struct GraphMlEdge {
    pub source: String,
    pub target: String,
    pub attrs: Attributes,
}

/// The first `<graph>` of a GraphML file, flattened.
#[derive(Debug, Clone, Default)]
pub struct GraphMlDocument {
    pub graph: Attributes,
    pub nodes: Vec<GraphMlNode>,
    pub edges: Vec<GraphMlEdge>,
}

fn is_element(node: &Node<'_, '_>, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

fn malformed(reason: impl Into<String>) -> WitnessError {
    WitnessError::Malformed {
        reason: reason.into(),
    }
}

/// Parses GraphML text into a [`GraphMlDocument`].
pub fn parse_graphml(text: &str) -> Result<GraphMlDocument, WitnessError> {
    let doc = roxmltree::Document::parse(text).map_err(|e| malformed(e.to_string()))?;
    let root = doc.root_element();
    if root.tag_name().name() != "graphml" {
        return Err(malformed(format!(
            "root element is <{}>, expected <graphml>",
            root.tag_name().name()
        )));
    }

    let keys: Vec<KeyDecl> = root
        .children()
        .filter(|n| is_element(n, "key"))
        .filter_map(|n| {
            let id = n.attribute("id")?.to_string();
            let default = n
                .children()
                .find(|c| is_element(c, "default"))
                .map(|c| c.text().unwrap_or_default().trim().to_string());
            Some(KeyDecl {
                id,
                name: n.attribute("attr.name").map(str::to_string),
                domain: KeyDomain::from_attr(n.attribute("for")),
                default,
            })
        })
        .collect();

    let graph = root
        .children()
        .find(|n| is_element(n, "graph"))
        .ok_or_else(|| malformed("missing <graph> element"))?;

    let mut document = GraphMlDocument {
        graph: collect_data(&graph, KeyDomain::Graph, &keys),
        ..GraphMlDocument::default()
    };

    for child in graph.children().filter(Node::is_element) {
        match child.tag_name().name() {
            "node" => {
                let id = child
                    .attribute("id")
                    .ok_or_else(|| malformed("<node> without id"))?;
                document.nodes.push(GraphMlNode {
                    id: id.to_string(),
                    attrs: collect_data(&child, KeyDomain::Node, &keys),
                });
            }
            "edge" => {
                let source = child
                    .attribute("source")
                    .ok_or_else(|| malformed("<edge> without source"))?;
                let target = child
                    .attribute("target")
                    .ok_or_else(|| malformed("<edge> without target"))?;
                document.edges.push(GraphMlEdge {
                    source: source.to_string(),
                    target: target.to_string(),
                    attrs: collect_data(&child, KeyDomain::Edge, &keys),
                });
            }
            _ => {}
        }
    }

    Ok(document)
}

fn insert_attr(attrs: &mut Attributes, key: Option<&KeyDecl>, key_id: &str, value: &str) {
    attrs.insert(key_id.to_string(), value.to_string());
    if let Some(name) = key.and_then(|k| k.name.as_deref()) {
        if name != key_id {
            attrs.insert(name.to_string(), value.to_string());
        }
    }
}

fn collect_data(element: &Node<'_, '_>, domain: KeyDomain, keys: &[KeyDecl]) -> Attributes {
    let mut attrs = Attributes::new();
    for key in keys.iter().filter(|k| k.domain.applies_to(domain)) {
        if let Some(default) = &key.default {
            insert_attr(&mut attrs, Some(key), &key.id, default);
        }
    }
    for data in element.children().filter(|n| is_element(n, "data")) {
        let Some(key_id) = data.attribute("key") else {
            continue;
        };
        let value = data.text().unwrap_or_default().trim();
        let decl = keys.iter().find(|k| k.id == key_id);
        insert_attr(&mut attrs, decl, key_id, value);
    }
    attrs
}
