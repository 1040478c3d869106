use std::collections::HashSet;

use super::BoardGraph;

/// The focused node plus its direct neighbourhood.
pub(super) struct HighlightState {
    pub(super) nodes: HashSet<usize>,
    pub(super) edges: HashSet<usize>,
}

pub(super) fn build_highlight_state(board: &BoardGraph, focused: usize) -> Option<HighlightState> {
    let neighbors = board.neighbors.get(focused)?;

    let mut nodes = HashSet::with_capacity(neighbors.len() + 1);
    nodes.insert(focused);
    nodes.extend(neighbors.iter().copied());

    let edges = board
        .edges
        .iter()
        .enumerate()
        .filter(|(_, (source, target))| *source == focused || *target == focused)
        .map(|(index, _)| index)
        .collect();

    Some(HighlightState { nodes, edges })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::graph::build::board_from_graph;
    use crate::case::Graph;
    use crate::case::fixtures::{edge, node};
    use crate::config::PhysicsConfig;
    use eframe::egui::Vec2;

    #[test]
    fn collects_direct_neighbourhood_only() {
        let graph = Graph {
            nodes: vec![
                node("a", "A"),
                node("b", "B"),
                node("c", "C"),
                node("d", "D"),
            ],
            edges: vec![edge("a", "b", "x"), edge("c", "a", "y"), edge("c", "d", "z")],
        };
        let board = board_from_graph(&graph, Vec2::ZERO, &PhysicsConfig::default());

        let state = build_highlight_state(&board, 0).unwrap();
        assert_eq!(state.nodes, HashSet::from([0, 1, 2]));
        assert_eq!(state.edges, HashSet::from([0, 1]));
        assert!(build_highlight_state(&board, 9).is_none());
    }
}
