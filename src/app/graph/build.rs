use std::collections::HashMap;

use eframe::egui::Vec2;

use crate::case::{Graph, merge, validate};
use crate::config::{BoardConfig, PhysicsConfig};

use super::super::physics::seed_position;
use super::super::{BoardGraph, BoardNode, BoardView, PhysicsScratch, ViewScratch};
use super::interaction::{Camera, InteractionController};

fn collect_edges(graph: &Graph, index_by_id: &HashMap<String, usize>) -> Vec<(usize, usize)> {
    graph
        .edges
        .iter()
        .filter_map(|edge| {
            Some((
                *index_by_id.get(&edge.source)?,
                *index_by_id.get(&edge.target)?,
            ))
        })
        .collect()
}

fn neighbor_lists(node_count: usize, edges: &[(usize, usize)]) -> Vec<Vec<usize>> {
    let mut neighbors = vec![Vec::new(); node_count];
    for &(source, target) in edges {
        if source == target {
            continue;
        }
        if !neighbors[source].contains(&target) {
            neighbors[source].push(target);
        }
        if !neighbors[target].contains(&source) {
            neighbors[target].push(source);
        }
    }
    neighbors
}

/// Builds a fresh arena for a validated graph with every node on its spiral
/// seed and at rest.
pub(in crate::app) fn board_from_graph(
    graph: &Graph,
    center: Vec2,
    physics: &PhysicsConfig,
) -> BoardGraph {
    let nodes = graph
        .nodes
        .iter()
        .enumerate()
        .map(|(index, node)| BoardNode {
            id: node.id.clone(),
            world_pos: seed_position(index, center, physics),
            velocity: Vec2::ZERO,
        })
        .collect::<Vec<_>>();

    let index_by_id = nodes
        .iter()
        .enumerate()
        .map(|(index, node)| (node.id.clone(), index))
        .collect::<HashMap<_, _>>();
    let edges = collect_edges(graph, &index_by_id);
    let neighbors = neighbor_lists(nodes.len(), &edges);

    BoardGraph {
        nodes,
        edges,
        index_by_id,
        neighbors,
        center,
        physics_scratch: PhysicsScratch {
            forces: Vec::new(),
            positions: Vec::new(),
        },
        view_scratch: ViewScratch {
            screen_positions: Vec::new(),
        },
    }
}

/// Re-aligns an existing arena with a grown graph. Nodes already on the board
/// keep their simulation state; new ones are seeded from their index.
fn extend_board(board: &mut BoardGraph, graph: &Graph, physics: &PhysicsConfig) {
    let mut prior_nodes = std::mem::take(&mut board.nodes)
        .into_iter()
        .map(|node| (node.id.clone(), node))
        .collect::<HashMap<_, _>>();

    board.nodes = graph
        .nodes
        .iter()
        .enumerate()
        .map(|(index, node)| {
            prior_nodes.remove(&node.id).unwrap_or_else(|| BoardNode {
                id: node.id.clone(),
                world_pos: seed_position(index, board.center, physics),
                velocity: Vec2::ZERO,
            })
        })
        .collect();

    board.index_by_id = board
        .nodes
        .iter()
        .enumerate()
        .map(|(index, node)| (node.id.clone(), index))
        .collect();
    board.edges = collect_edges(graph, &board.index_by_id);
    board.neighbors = neighbor_lists(board.nodes.len(), &board.edges);
}

impl BoardView {
    pub(in crate::app) fn new(graph: Graph, config: BoardConfig) -> Self {
        let camera_config = config.camera.sanitized();
        let mut view = Self {
            graph: Graph::default(),
            board: None,
            interaction: InteractionController::new(camera_config, config.render.node_radius),
            camera: Camera::default(),
            animation: Default::default(),
            selected: None,
            hovered: None,
            search: String::new(),
            search_match_cache: None,
            graph_revision: 0,
            viewport: Vec2::new(config.viewport.width, config.viewport.height),
            show_all_labels: false,
            config: BoardConfig {
                physics: config.physics.sanitized(),
                camera: camera_config,
                ..config
            },
        };
        view.replace(graph);
        view
    }

    fn center(&self) -> Vec2 {
        self.viewport * 0.5
    }

    /// Swaps in a whole new snapshot. Nothing survives from the previous board:
    /// positions, camera, selection and the running loop are all reset.
    pub(in crate::app) fn replace(&mut self, graph: Graph) {
        self.animation.stop();

        self.graph = validate(graph);
        self.graph_revision = self.graph_revision.wrapping_add(1);
        self.search_match_cache = None;
        self.camera = Camera::default();
        self.interaction.reset();
        self.selected = None;
        self.hovered = None;

        if self.graph.is_empty() {
            self.board = None;
        } else {
            self.board = Some(board_from_graph(
                &self.graph,
                self.center(),
                &self.config.physics,
            ));
            self.animation.restart();
        }

        tracing::info!(
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            generation = self.animation.generation,
            "board replaced"
        );
    }

    /// Folds a partial snapshot into the board without disturbing the nodes
    /// already laid out.
    pub(in crate::app) fn merge(&mut self, incoming: Graph) {
        let before_nodes = self.graph.node_count();
        let before_edges = self.graph.edge_count();
        let was_empty = self.board.is_none();

        self.graph = validate(merge(&self.graph, &incoming));
        self.graph_revision = self.graph_revision.wrapping_add(1);
        self.search_match_cache = None;

        if self.graph.is_empty() {
            return;
        }

        match self.board.as_mut() {
            Some(board) => extend_board(board, &self.graph, &self.config.physics),
            None => {
                self.board = Some(board_from_graph(
                    &self.graph,
                    self.center(),
                    &self.config.physics,
                ));
            }
        }
        // A paused layout stays paused; only a board that was empty starts up.
        if was_empty {
            self.animation.restart();
        }

        tracing::info!(
            added_nodes = self.graph.node_count() - before_nodes,
            added_edges = self.graph.edge_count() - before_edges,
            "snapshot merged"
        );
    }

    /// Applies new layout constants. The loop keeps whatever state it is in.
    pub(in crate::app) fn set_physics(&mut self, physics: PhysicsConfig) {
        let physics = physics.sanitized();
        if physics != self.config.physics {
            tracing::debug!(physics = ?physics, "physics constants changed");
            self.config.physics = physics;
        }
    }

    pub(in crate::app) fn stop(&mut self) {
        self.animation.stop();
        self.interaction.reset();
    }

    /// Tracks the canvas size; gravity pulls toward its midpoint.
    pub(in crate::app) fn set_viewport(&mut self, size: Vec2) {
        if size.x <= 0.0 || size.y <= 0.0 || size == self.viewport {
            return;
        }
        self.viewport = size;
        if let Some(board) = self.board.as_mut() {
            board.center = size * 0.5;
        }
    }

    pub(in crate::app) fn selected_index(&self) -> Option<usize> {
        let id = self.selected.as_deref()?;
        self.board.as_ref()?.index_by_id.get(id).copied()
    }

    pub(in crate::app) fn set_selected(&mut self, selected: Option<String>) {
        if self.selected != selected {
            tracing::debug!(selected = ?selected, "selection changed");
            self.selected = selected;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::physics::step_physics;
    use crate::case::fixtures::{edge, node};
    use eframe::egui::vec2;

    fn graph(ids: &[&str], edges: &[(&str, &str)]) -> Graph {
        Graph {
            nodes: ids.iter().map(|id| node(id, &id.to_uppercase())).collect(),
            edges: edges.iter().map(|(s, t)| edge(s, t, "linked")).collect(),
        }
    }

    #[test]
    fn replace_resets_camera_selection_and_loop() {
        let mut view = BoardView::new(graph(&["a", "b"], &[("a", "b")]), BoardConfig::default());
        let first_generation = view.animation.generation;
        view.camera = Camera {
            pan: vec2(50.0, -20.0),
            zoom: 2.0,
        };
        view.set_selected(Some("a".to_owned()));
        if let Some(board) = view.board.as_mut() {
            board.nodes[0].velocity = vec2(3.0, 3.0);
        }

        view.replace(graph(&["a", "b", "c"], &[]));

        assert_eq!(view.camera, Camera::default());
        assert_eq!(view.selected, None);
        assert!(view.animation.running);
        assert!(view.animation.generation > first_generation);
        let board = view.board.as_ref().unwrap();
        assert_eq!(board.nodes.len(), 3);
        assert!(board.nodes.iter().all(|node| node.velocity == Vec2::ZERO));
        assert_eq!(
            board.nodes[0].world_pos,
            seed_position(0, view.center(), &view.config.physics)
        );
    }

    #[test]
    fn empty_graph_does_not_start_loop() {
        let view = BoardView::new(Graph::default(), BoardConfig::default());
        assert!(view.board.is_none());
        assert!(!view.animation.running);
    }

    #[test]
    fn replacing_with_empty_graph_stops_loop() {
        let mut view = BoardView::new(graph(&["a"], &[]), BoardConfig::default());
        assert!(view.animation.running);

        view.replace(Graph::default());
        assert!(!view.animation.running);
        assert!(view.board.is_none());
    }

    #[test]
    fn dangling_edges_never_reach_the_board() {
        let view = BoardView::new(graph(&["x"], &[("x", "y")]), BoardConfig::default());
        assert_eq!(view.graph.edge_count(), 0);
        assert!(view.board.as_ref().unwrap().edges.is_empty());
    }

    #[test]
    fn merge_keeps_existing_positions_and_seeds_new_nodes() {
        let config = BoardConfig::default();
        let mut view = BoardView::new(graph(&["a", "b"], &[("a", "b")]), config.clone());
        for _ in 0..20 {
            if let Some(board) = view.board.as_mut() {
                step_physics(board, view.config.physics, None);
            }
        }
        let before = view.board.as_ref().unwrap().nodes[0].world_pos;
        view.set_selected(Some("b".to_owned()));

        view.merge(graph(&["b", "c"], &[("b", "c"), ("a", "b")]));

        let board = view.board.as_ref().unwrap();
        assert_eq!(board.nodes.len(), 3);
        assert_eq!(board.nodes[0].world_pos, before);
        assert_eq!(
            board.nodes[2].world_pos,
            seed_position(2, view.center(), &view.config.physics)
        );
        assert_eq!(board.edges, vec![(0, 1), (1, 2)]);
        assert_eq!(board.neighbors[1], vec![0, 2]);
        assert_eq!(view.selected.as_deref(), Some("b"));
    }

    #[test]
    fn merge_into_empty_board_starts_loop() {
        let mut view = BoardView::new(Graph::default(), BoardConfig::default());
        view.merge(graph(&["a"], &[]));
        assert!(view.animation.running);
        assert_eq!(view.board.as_ref().unwrap().nodes.len(), 1);
    }

    #[test]
    fn merge_does_not_resume_a_paused_layout() {
        let mut view = BoardView::new(graph(&["a"], &[]), BoardConfig::default());
        view.animation.stop();
        let generation = view.animation.generation;

        view.merge(graph(&["b"], &[("a", "b")]));

        assert!(!view.animation.running);
        assert_eq!(view.animation.generation, generation);
        assert_eq!(view.board.as_ref().unwrap().nodes.len(), 2);
    }

    #[test]
    fn physics_change_is_sanitized_and_leaves_loop_alone() {
        let mut view = BoardView::new(graph(&["a", "b"], &[("a", "b")]), BoardConfig::default());
        view.animation.stop();

        view.set_physics(PhysicsConfig {
            damping: 4.0,
            repulsion: 900.0,
            ..PhysicsConfig::default()
        });

        assert!(!view.animation.running);
        assert_eq!(view.config.physics.repulsion, 900.0);
        assert_eq!(view.config.physics.damping, 0.99);
    }

    #[test]
    fn stop_halts_loop() {
        let mut view = BoardView::new(graph(&["a"], &[]), BoardConfig::default());
        view.stop();
        assert!(!view.animation.running);
    }
}
