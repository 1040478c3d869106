use std::collections::HashSet;

use anyhow::{Context, Result, anyhow};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::graph::{Edge, Graph, Node, NodeKind, NodeMetadata};

#[derive(Clone, Debug, Deserialize)]
struct RawNode {
    #[serde(default, deserialize_with = "lenient")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    label: Option<String>,
    #[serde(default, rename = "type", alias = "kind", deserialize_with = "lenient")]
    kind: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    metadata: Option<RawMetadata>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMetadata {
    #[serde(default, deserialize_with = "lenient")]
    role: Option<String>,
    #[serde(default, deserialize_with = "lenient_score")]
    impact_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_tags")]
    tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    key_quote: Option<String>,
}

/// Optional fields never sink the whole entry: a `null` or mistyped value
/// reads as absent.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

/// Accepts a number or a numeric string.
fn lenient_score<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    })
}

/// Keeps the string entries of a tag array; anything else yields no tags.
fn lenient_tags<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(tag) => Some(tag),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

#[derive(Clone, Debug, Deserialize)]
struct RawEdge {
    #[serde(default, deserialize_with = "lenient")]
    source: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    target: Option<String>,
    #[serde(default, alias = "label", deserialize_with = "lenient")]
    relation: Option<String>,
}

/// Parses a JSON graph snapshot, dropping entries that cannot form a node or
/// an edge. Edge endpoints are not checked here; partial snapshots may name
/// nodes that only exist in the graph they get merged into.
pub fn parse_snapshot(raw: &str) -> Result<Graph> {
    let parsed: Value = serde_json::from_str(raw).context("snapshot is not valid JSON")?;
    let object = parsed
        .as_object()
        .ok_or_else(|| anyhow!("snapshot root must be a JSON object"))?;

    let mut seen = HashSet::new();
    let mut nodes = Vec::new();
    let mut dropped_nodes = 0usize;
    for value in entries(object.get("nodes")) {
        match node_from_value(value) {
            Some(node) if seen.insert(node.id.clone()) => nodes.push(node),
            Some(node) => {
                tracing::debug!(id = %node.id, "dropping duplicate node id in snapshot");
                dropped_nodes += 1;
            }
            None => dropped_nodes += 1,
        }
    }

    let mut edges = Vec::new();
    let mut dropped_edges = 0usize;
    for value in entries(object.get("edges").or_else(|| object.get("links"))) {
        match edge_from_value(value) {
            Some(edge) => edges.push(edge),
            None => dropped_edges += 1,
        }
    }

    if dropped_nodes > 0 || dropped_edges > 0 {
        tracing::debug!(
            dropped_nodes,
            dropped_edges,
            "dropped malformed snapshot entries"
        );
    }

    Ok(Graph { nodes, edges })
}

fn entries(value: Option<&Value>) -> &[Value] {
    value
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn node_from_value(value: &Value) -> Option<Node> {
    let raw = match RawNode::deserialize(value) {
        Ok(raw) => raw,
        Err(error) => {
            tracing::debug!(%error, "dropping unreadable node entry");
            return None;
        }
    };

    let id = non_empty(raw.id)?;
    let label = non_empty(raw.label)?;
    let kind = match raw.kind.as_deref().and_then(NodeKind::parse) {
        Some(kind) => kind,
        None => {
            tracing::debug!(%id, kind = ?raw.kind, "unknown node kind, using evidence");
            NodeKind::Evidence
        }
    };

    Some(Node {
        id,
        label,
        kind,
        description: raw.description.unwrap_or_default(),
        metadata: raw.metadata.map(|metadata| NodeMetadata {
            role: non_empty(metadata.role),
            impact_score: metadata
                .impact_score
                .filter(|score| score.is_finite())
                .map(|score| score.round().clamp(1.0, 10.0) as u8),
            tags: metadata
                .tags
                .into_iter()
                .filter(|tag| !tag.trim().is_empty())
                .collect(),
            key_quote: non_empty(metadata.key_quote),
        }),
    })
}

fn edge_from_value(value: &Value) -> Option<Edge> {
    let raw = RawEdge::deserialize(value).ok()?;
    Some(Edge {
        source: non_empty(raw.source)?,
        target: non_empty(raw.target)?,
        relation: raw.relation.unwrap_or_default(),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_nodes_without_id_or_label() {
        let graph = parse_snapshot(
            r#"{
                "nodes": [
                    {"id": "a", "label": "Alice", "type": "person"},
                    {"label": "No id"},
                    {"id": "b"},
                    {"id": "", "label": "Blank id"},
                    42
                ],
                "edges": []
            }"#,
        )
        .unwrap();

        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.nodes[0].id, "a");
        assert_eq!(graph.nodes[0].kind, NodeKind::Person);
    }

    #[test]
    fn reads_metadata_fields() {
        let graph = parse_snapshot(
            r#"{
                "nodes": [{
                    "id": "w1",
                    "label": "Witness",
                    "type": "Person",
                    "description": "Saw the car",
                    "metadata": {
                        "role": "witness",
                        "impactScore": 14,
                        "tags": ["eyewitness", " "],
                        "keyQuote": "It was red."
                    }
                }]
            }"#,
        )
        .unwrap();

        let metadata = graph.nodes[0].metadata.clone().unwrap();
        assert_eq!(metadata.role.as_deref(), Some("witness"));
        assert_eq!(metadata.impact_score, Some(10));
        assert_eq!(metadata.tags, vec!["eyewitness".to_owned()]);
        assert_eq!(metadata.key_quote.as_deref(), Some("It was red."));
        assert_eq!(graph.nodes[0].description, "Saw the car");
    }

    #[test]
    fn mistyped_optional_fields_keep_the_node_and_its_edges() {
        let graph = parse_snapshot(
            r#"{
                "nodes": [
                    {"id": "a", "label": "Alice", "metadata": {"tags": null}},
                    {"id": "b", "label": "Bob", "metadata": {"impactScore": "8", "role": 3}},
                    {"id": "c", "label": "Carol", "description": null, "type": 7,
                     "metadata": {"impactScore": "high", "tags": ["ledger", 4]}},
                    {"id": "d", "label": "Dana", "metadata": "unknown"}
                ],
                "edges": [
                    {"source": "a", "target": "b", "relation": null},
                    {"source": "b", "target": "c", "relation": "paid"}
                ]
            }"#,
        )
        .unwrap();

        let ids = graph.nodes.iter().map(|node| node.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, ["a", "b", "c", "d"]);

        let alice = graph.nodes[0].metadata.clone().unwrap();
        assert!(alice.tags.is_empty());

        let bob = graph.nodes[1].metadata.clone().unwrap();
        assert_eq!(bob.impact_score, Some(8));
        assert_eq!(bob.role, None);

        let carol = &graph.nodes[2];
        assert_eq!(carol.description, "");
        assert_eq!(carol.kind, NodeKind::Evidence);
        let carol_metadata = carol.metadata.clone().unwrap();
        assert_eq!(carol_metadata.impact_score, None);
        assert_eq!(carol_metadata.tags, vec!["ledger".to_owned()]);

        assert!(graph.nodes[3].metadata.is_none());

        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.edges[0].relation, "");
        assert_eq!(graph.edges[1].relation, "paid");
    }

    #[test]
    fn keeps_first_of_duplicate_ids_and_defaults_kind() {
        let graph = parse_snapshot(
            r#"{"nodes": [
                {"id": "x", "label": "First", "type": "spaceship"},
                {"id": "x", "label": "Second"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.nodes[0].label, "First");
        assert_eq!(graph.nodes[0].kind, NodeKind::Evidence);
    }

    #[test]
    fn keeps_edges_to_unknown_nodes_for_later_merge() {
        let graph = parse_snapshot(
            r#"{
                "nodes": [{"id": "b", "label": "Bob"}],
                "links": [
                    {"source": "a", "target": "b", "label": "knows"},
                    {"source": "a"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edges[0].relation, "knows");
    }

    #[test]
    fn missing_arrays_yield_empty_graph() {
        let graph = parse_snapshot("{}").unwrap();
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn rejects_non_object_root() {
        assert!(parse_snapshot("[1, 2]").is_err());
        assert!(parse_snapshot("not json").is_err());
    }
}
