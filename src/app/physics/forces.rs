use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

/// Deterministic direction used when two points coincide.
fn fallback_direction(from: usize, to: usize) -> Vec2 {
    let angle = ((from as f32) * 0.618_034 + (to as f32) * 0.414_214 + 0.37) * TAU;
    vec2(angle.cos(), angle.sin())
}

fn repulsion_between(
    point_a: Vec2,
    point_b: Vec2,
    pair: (usize, usize),
    repulsion_strength: f32,
    min_distance_sq: f32,
) -> Vec2 {
    let delta = point_a - point_b;
    let distance_sq = delta.length_sq();
    let direction = if distance_sq > 1.0e-8 {
        delta / distance_sq.sqrt()
    } else {
        fallback_direction(pair.0, pair.1)
    };
    direction * (repulsion_strength / distance_sq.max(min_distance_sq))
}

/// Pairwise repulsion over every unordered pair; O(n²).
pub(super) fn accumulate_repulsion(
    positions: &[Vec2],
    repulsion_strength: f32,
    min_distance_sq: f32,
    forces: &mut [Vec2],
) {
    for from in 0..positions.len() {
        for to in (from + 1)..positions.len() {
            let push = repulsion_between(
                positions[from],
                positions[to],
                (from, to),
                repulsion_strength,
                min_distance_sq,
            );
            forces[from] += push;
            forces[to] -= push;
        }
    }
}

/// Hooke springs along edges. Negative when an edge is shorter than ideal.
pub(super) fn accumulate_springs(
    positions: &[Vec2],
    edges: &[(usize, usize)],
    spring_strength: f32,
    ideal_length: f32,
    forces: &mut [Vec2],
) {
    let node_count = positions.len();
    for &(from, to) in edges {
        if from >= node_count || to >= node_count || from == to {
            continue;
        }

        let delta = positions[to] - positions[from];
        let distance = delta.length();
        let direction = if distance > 1.0e-4 {
            delta / distance
        } else {
            fallback_direction(from, to)
        };

        let pull = direction * (spring_strength * (distance - ideal_length));
        forces[from] += pull;
        forces[to] -= pull;
    }
}

pub(super) fn accumulate_gravity(
    positions: &[Vec2],
    center: Vec2,
    gravity: f32,
    forces: &mut [Vec2],
) {
    for (position, force) in positions.iter().zip(forces.iter_mut()) {
        *force -= (*position - center) * gravity;
    }
}
