mod forces;

use eframe::egui::{Vec2, vec2};

use super::BoardGraph;
use crate::config::PhysicsConfig;
use forces::{accumulate_gravity, accumulate_repulsion, accumulate_springs};

/// Spiral seed for the node at `index`, so a given node order always starts
/// from the same layout and no two nodes start on top of each other.
pub(in crate::app) fn seed_position(index: usize, center: Vec2, config: &PhysicsConfig) -> Vec2 {
    let angle = 0.5 * index as f32;
    let radius = config.spiral_base + config.spiral_step * index as f32;
    center + vec2(angle.cos(), angle.sin()) * radius
}

/// Advances the layout by one frame. `anchor` is the node under the pointer;
/// it keeps its position and has its velocity zeroed.
pub(in crate::app) fn step_physics(
    board: &mut BoardGraph,
    config: PhysicsConfig,
    anchor: Option<usize>,
) {
    let node_count = board.nodes.len();
    if node_count == 0 {
        return;
    }

    let scratch = &mut board.physics_scratch;
    scratch.positions.clear();
    scratch
        .positions
        .extend(board.nodes.iter().map(|node| node.world_pos));
    scratch.forces.clear();
    scratch.forces.resize(node_count, Vec2::ZERO);

    accumulate_repulsion(
        &scratch.positions,
        config.repulsion,
        config.min_distance_sq,
        &mut scratch.forces,
    );
    accumulate_springs(
        &scratch.positions,
        &board.edges,
        config.spring,
        config.ideal_length,
        &mut scratch.forces,
    );
    accumulate_gravity(
        &scratch.positions,
        board.center,
        config.gravity,
        &mut scratch.forces,
    );

    let max_velocity = config.max_velocity;
    for (index, (node, force)) in board
        .nodes
        .iter_mut()
        .zip(scratch.forces.iter())
        .enumerate()
    {
        if Some(index) == anchor {
            node.velocity = Vec2::ZERO;
            continue;
        }

        let velocity = (node.velocity + *force) * config.damping;
        node.velocity = vec2(
            velocity.x.clamp(-max_velocity, max_velocity),
            velocity.y.clamp(-max_velocity, max_velocity),
        );
        node.world_pos += node.velocity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::graph::build::board_from_graph;
    use crate::case::Graph;
    use crate::case::fixtures::{edge, node};
    use proptest::prelude::*;

    fn board(node_count: usize, edges: &[(usize, usize)], config: &PhysicsConfig) -> BoardGraph {
        let graph = Graph {
            nodes: (0..node_count)
                .map(|i| node(&format!("n{i}"), &format!("Node {i}")))
                .collect(),
            edges: edges
                .iter()
                .map(|(s, t)| edge(&format!("n{s}"), &format!("n{t}"), "linked"))
                .collect(),
        };
        board_from_graph(&graph, vec2(400.0, 300.0), config)
    }

    #[test]
    fn single_node_starts_at_spiral_origin_and_stays_finite() {
        let config = PhysicsConfig::default();
        let mut board = board(1, &[], &config);

        assert_eq!(
            board.nodes[0].world_pos,
            vec2(400.0 + config.spiral_base, 300.0)
        );

        for _ in 0..500 {
            step_physics(&mut board, config, None);
        }
        assert!(board.nodes[0].world_pos.is_finite());
        assert!(board.nodes[0].velocity.is_finite());
    }

    #[test]
    fn connected_pair_settles_near_ideal_length() {
        let config = PhysicsConfig::default();
        let mut board = board(2, &[(0, 1)], &config);

        for _ in 0..300 {
            step_physics(&mut board, config, None);
        }

        let distance = (board.nodes[0].world_pos - board.nodes[1].world_pos).length();
        let ideal = config.ideal_length;
        assert!(
            (distance - ideal).abs() <= ideal * 0.15,
            "distance {distance} not within 15% of {ideal}"
        );
    }

    #[test]
    fn unconnected_nodes_spread_apart() {
        let config = PhysicsConfig::default();
        let mut board = board(6, &[], &config);

        for _ in 0..300 {
            step_physics(&mut board, config, None);
        }

        for a in 0..6 {
            for b in (a + 1)..6 {
                let distance = (board.nodes[a].world_pos - board.nodes[b].world_pos).length();
                assert!(distance > 40.0, "nodes {a} and {b} only {distance} apart");
            }
        }
    }

    #[test]
    fn anchor_keeps_position_and_zero_velocity() {
        let config = PhysicsConfig::default();
        let mut board = board(5, &[(0, 1), (1, 2), (2, 3)], &config);
        let pinned = vec2(123.5, -42.25);
        board.nodes[1].world_pos = pinned;
        board.nodes[1].velocity = vec2(5.0, 5.0);

        for _ in 0..50 {
            step_physics(&mut board, config, Some(1));
        }

        assert_eq!(board.nodes[1].world_pos, pinned);
        assert_eq!(board.nodes[1].velocity, Vec2::ZERO);
        assert_ne!(board.nodes[0].velocity, Vec2::ZERO);
    }

    #[test]
    fn coincident_start_separates() {
        let config = PhysicsConfig::default();
        let mut board = board(3, &[], &config);
        for node in &mut board.nodes {
            node.world_pos = vec2(10.0, 10.0);
        }

        step_physics(&mut board, config, None);

        assert_ne!(board.nodes[0].world_pos, board.nodes[1].world_pos);
        assert_ne!(board.nodes[1].world_pos, board.nodes[2].world_pos);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn positions_stay_finite_over_long_runs(
            positions in proptest::collection::vec((-1.0e4f32..1.0e4, -1.0e4f32..1.0e4), 1..50),
            raw_edges in proptest::collection::vec((0usize..50, 0usize..50), 0..80),
            collapse in any::<bool>(),
        ) {
            let config = PhysicsConfig::default();
            let node_count = positions.len();
            let edges = raw_edges
                .into_iter()
                .filter(|(s, t)| *s < node_count && *t < node_count)
                .collect::<Vec<_>>();
            let mut board = board(node_count, &edges, &config);
            for (node, (x, y)) in board.nodes.iter_mut().zip(&positions) {
                node.world_pos = if collapse { vec2(positions[0].0, positions[0].1) } else { vec2(*x, *y) };
            }

            for _ in 0..500 {
                step_physics(&mut board, config, None);
            }

            for node in &board.nodes {
                prop_assert!(node.world_pos.is_finite());
                prop_assert!(node.velocity.is_finite());
            }
        }
    }
}
