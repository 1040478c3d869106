use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::graph::Graph;
use super::parse::parse_snapshot;

pub fn load_snapshot(path: &Path) -> Result<Graph> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    let graph = parse_snapshot(&raw)
        .with_context(|| format!("failed to parse snapshot {}", path.display()))?;

    tracing::info!(
        path = %path.display(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "loaded snapshot"
    );
    Ok(graph)
}
