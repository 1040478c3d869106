use eframe::egui::Vec2;

use crate::config::CameraConfig;

use super::super::BoardGraph;

/// Pan and zoom applied between simulation space and canvas-local screen
/// space: `screen = world * zoom + pan`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct Camera {
    pub(in crate::app) pan: Vec2,
    pub(in crate::app) zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl Camera {
    pub(in crate::app) fn to_screen(self, world: Vec2) -> Vec2 {
        world * self.zoom + self.pan
    }

    pub(in crate::app) fn to_world(self, screen: Vec2) -> Vec2 {
        (screen - self.pan) / self.zoom
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) enum Interaction {
    Idle,
    PanningCanvas {
        last: Vec2,
        travel: f32,
    },
    DraggingNode {
        index: usize,
        /// Latest pointer position; `None` until the pointer first moves.
        pointer: Option<Vec2>,
        last: Vec2,
        travel: f32,
    },
}

/// Canvas-local pointer input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) enum PointerEvent {
    Down(Vec2),
    Move(Vec2),
    Up(Vec2),
    Leave,
    Scroll { at: Vec2, delta: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum SelectionChange {
    Unchanged,
    Select(usize),
    Clear,
}

pub(in crate::app) struct InteractionController {
    state: Interaction,
    config: CameraConfig,
    node_radius: f32,
}

/// Nearest node whose fixed-size screen circle contains `screen`.
pub(in crate::app) fn hit_test(
    board: &BoardGraph,
    camera: Camera,
    screen: Vec2,
    radius: f32,
) -> Option<usize> {
    board
        .nodes
        .iter()
        .enumerate()
        .filter_map(|(index, node)| {
            let distance = (camera.to_screen(node.world_pos) - screen).length();
            (distance <= radius).then_some((index, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}

impl InteractionController {
    pub(in crate::app) fn new(config: CameraConfig, node_radius: f32) -> Self {
        Self {
            state: Interaction::Idle,
            config: config.sanitized(),
            node_radius,
        }
    }

    pub(in crate::app) fn state(&self) -> Interaction {
        self.state
    }

    pub(in crate::app) fn is_active(&self) -> bool {
        self.state != Interaction::Idle
    }

    pub(in crate::app) fn reset(&mut self) {
        self.state = Interaction::Idle;
    }

    /// Node currently held by the pointer.
    pub(in crate::app) fn anchor(&self) -> Option<usize> {
        match self.state {
            Interaction::DraggingNode { index, .. } => Some(index),
            _ => None,
        }
    }

    pub(in crate::app) fn clamp_zoom(&self, zoom: f32) -> f32 {
        zoom.clamp(self.config.min_zoom, self.config.max_zoom)
    }

    pub(in crate::app) fn set_zoom(&self, camera: &mut Camera, zoom: f32) {
        if zoom.is_finite() {
            camera.zoom = self.clamp_zoom(zoom);
        }
    }

    /// Zooms by `factor` while keeping the world point under `at` in place.
    pub(in crate::app) fn zoom_at(&self, camera: &mut Camera, at: Vec2, factor: f32) {
        let world_before = camera.to_world(at);
        self.set_zoom(camera, camera.zoom * factor);
        camera.pan = at - world_before * camera.zoom;
    }

    pub(in crate::app) fn dispatch(
        &mut self,
        event: PointerEvent,
        camera: &mut Camera,
        board: &mut BoardGraph,
    ) -> SelectionChange {
        match event {
            PointerEvent::Down(at) => {
                self.state = match hit_test(board, *camera, at, self.node_radius) {
                    Some(index) => {
                        board.nodes[index].velocity = Vec2::ZERO;
                        Interaction::DraggingNode {
                            index,
                            pointer: None,
                            last: at,
                            travel: 0.0,
                        }
                    }
                    None => Interaction::PanningCanvas {
                        last: at,
                        travel: 0.0,
                    },
                };
                SelectionChange::Unchanged
            }
            PointerEvent::Move(at) => {
                self.pointer_moved(at, camera, board);
                SelectionChange::Unchanged
            }
            PointerEvent::Up(at) => {
                self.pointer_moved(at, camera, board);
                let finished = std::mem::replace(&mut self.state, Interaction::Idle);
                match finished {
                    Interaction::DraggingNode { index, travel, .. }
                        if travel < self.config.click_threshold =>
                    {
                        SelectionChange::Select(index)
                    }
                    Interaction::PanningCanvas { travel, .. }
                        if travel < self.config.click_threshold =>
                    {
                        SelectionChange::Clear
                    }
                    _ => SelectionChange::Unchanged,
                }
            }
            PointerEvent::Leave => {
                self.state = Interaction::Idle;
                SelectionChange::Unchanged
            }
            PointerEvent::Scroll { at, delta } => {
                let factor = (1.0 + delta * self.config.scroll_sensitivity).clamp(0.85, 1.15);
                self.zoom_at(camera, at, factor);
                SelectionChange::Unchanged
            }
        }
    }

    fn pointer_moved(&mut self, at: Vec2, camera: &mut Camera, board: &mut BoardGraph) {
        match &mut self.state {
            Interaction::Idle => {}
            Interaction::PanningCanvas { last, travel } => {
                let delta = at - *last;
                camera.pan += delta;
                *travel += delta.length();
                *last = at;
            }
            Interaction::DraggingNode {
                pointer,
                last,
                travel,
                ..
            } => {
                *travel += (at - *last).length();
                *last = at;
                if pointer.is_some() || *travel >= self.config.click_threshold {
                    *pointer = Some(at);
                }
            }
        }
        self.hold_anchor(*camera, board);
    }

    /// Writes the pointer's world position onto the dragged node and zeroes its
    /// velocity. Runs on every pointer move and again every frame, so the node
    /// follows the pointer through camera changes too.
    pub(in crate::app) fn hold_anchor(&self, camera: Camera, board: &mut BoardGraph) {
        let Interaction::DraggingNode { index, pointer, .. } = self.state else {
            return;
        };
        let Some(node) = board.nodes.get_mut(index) else {
            return;
        };

        node.velocity = Vec2::ZERO;
        if let Some(pointer) = pointer {
            node.world_pos = camera.to_world(pointer);
        }
    }
}
