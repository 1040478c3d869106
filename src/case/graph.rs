use std::collections::{HashMap, HashSet};

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Case,
    Person,
    Evidence,
    Location,
    Event,
    Statute,
}

impl NodeKind {
    pub const ALL: [NodeKind; 6] = [
        Self::Case,
        Self::Person,
        Self::Evidence,
        Self::Location,
        Self::Event,
        Self::Statute,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Case => "Case",
            Self::Person => "Person",
            Self::Evidence => "Evidence",
            Self::Location => "Location",
            Self::Event => "Event",
            Self::Statute => "Statute",
        }
    }

    /// Single-letter glyph painted inside the node circle.
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Case => "C",
            Self::Person => "P",
            Self::Evidence => "E",
            Self::Location => "L",
            Self::Event => "V",
            Self::Statute => "S",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(value.trim()))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct NodeMetadata {
    pub role: Option<String>,
    pub impact_score: Option<u8>,
    pub tags: Vec<String>,
    pub key_quote: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    pub description: String,
    pub metadata: Option<NodeMetadata>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub relation: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Edges touching `id`, paired with the id on the other end.
    pub fn connections<'a>(&'a self, id: &'a str) -> impl Iterator<Item = (&'a Edge, &'a str)> {
        self.edges.iter().filter_map(move |edge| {
            if edge.source == id {
                Some((edge, edge.target.as_str()))
            } else if edge.target == id {
                Some((edge, edge.source.as_str()))
            } else {
                None
            }
        })
    }
}

/// Additively combines `incoming` into a copy of `existing`.
///
/// A node is skipped when a node with the same id or the same label is
/// already present. An edge is skipped when its directed `(source, target)`
/// pair is already present, whatever its relation text. Incoming edges that
/// name a node collapsed by label are rewritten to the surviving id.
pub fn merge(existing: &Graph, incoming: &Graph) -> Graph {
    let mut nodes = existing.nodes.clone();
    let mut known_ids = nodes.iter().map(|node| node.id.clone()).collect::<HashSet<_>>();
    let mut id_by_label = nodes
        .iter()
        .map(|node| (node.label.clone(), node.id.clone()))
        .collect::<HashMap<_, _>>();
    let mut renamed: HashMap<&str, String> = HashMap::new();

    for node in &incoming.nodes {
        if known_ids.contains(&node.id) {
            continue;
        }
        if let Some(surviving) = id_by_label.get(&node.label) {
            renamed.insert(node.id.as_str(), surviving.clone());
            continue;
        }

        known_ids.insert(node.id.clone());
        id_by_label.insert(node.label.clone(), node.id.clone());
        nodes.push(node.clone());
    }

    let mut edges = existing.edges.clone();
    let mut pairs = edges
        .iter()
        .map(|edge| (edge.source.clone(), edge.target.clone()))
        .collect::<HashSet<_>>();

    for edge in &incoming.edges {
        let source = renamed
            .get(edge.source.as_str())
            .cloned()
            .unwrap_or_else(|| edge.source.clone());
        let target = renamed
            .get(edge.target.as_str())
            .cloned()
            .unwrap_or_else(|| edge.target.clone());

        if pairs.insert((source.clone(), target.clone())) {
            edges.push(Edge {
                source,
                target,
                relation: edge.relation.clone(),
            });
        }
    }

    if !renamed.is_empty() {
        tracing::debug!(
            collapsed = renamed.len(),
            "merged incoming nodes onto existing nodes by label"
        );
    }

    Graph { nodes, edges }
}

/// Drops every edge whose source or target is not in the node set.
pub fn validate(mut graph: Graph) -> Graph {
    let ids = graph
        .nodes
        .iter()
        .map(|node| node.id.as_str())
        .collect::<HashSet<_>>();

    let before = graph.edges.len();
    let kept = graph
        .edges
        .into_iter()
        .filter(|edge| ids.contains(edge.source.as_str()) && ids.contains(edge.target.as_str()))
        .collect::<Vec<_>>();

    let dropped = before - kept.len();
    if dropped > 0 {
        tracing::debug!(dropped, "dropped edges with unknown endpoints");
    }

    graph.edges = kept;
    graph
}
