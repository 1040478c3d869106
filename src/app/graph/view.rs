use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::super::highlight::build_highlight_state;
use super::super::physics::step_physics;
use super::super::render_utils::{
    blend_color, circle_visible, dim_color, draw_background, edge_visible, kind_color,
    labels_visible, screen_to_local, truncate_label, world_to_screen,
};
use super::super::{BoardView, SearchMatchCache};
use super::interaction::{Interaction, PointerEvent, SelectionChange, hit_test};

const LABEL_MAX_CHARS: usize = 28;

impl BoardView {
    pub(in crate::app) fn cached_search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.graph_revision == self.graph_revision
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matcher = SkimMatcherV2::default();
        let matches = self
            .graph
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| matcher.fuzzy_match(&node.label, query).is_some())
            .map(|(index, _)| index)
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            graph_revision: self.graph_revision,
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }

    /// Turns this frame's raw pointer state into controller events.
    fn handle_pointer(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        let Some(board) = self.board.as_mut() else {
            return;
        };

        let (pressed, released, pointer, scroll) = ui.input(|input| {
            (
                input.pointer.primary_pressed(),
                input.pointer.primary_released(),
                input.pointer.latest_pos(),
                input.raw_scroll_delta.y,
            )
        });

        let mut changes = Vec::new();
        if pressed
            && response.hovered()
            && let Some(pointer) = pointer
        {
            changes.push(self.interaction.dispatch(
                PointerEvent::Down(screen_to_local(rect, pointer)),
                &mut self.camera,
                board,
            ));
        }

        if self.interaction.is_active() {
            match pointer {
                Some(pointer) if rect.contains(pointer) => {
                    let local = screen_to_local(rect, pointer);
                    let event = if released {
                        PointerEvent::Up(local)
                    } else {
                        PointerEvent::Move(local)
                    };
                    changes.push(self.interaction.dispatch(event, &mut self.camera, board));
                }
                _ => {
                    changes.push(self.interaction.dispatch(
                        PointerEvent::Leave,
                        &mut self.camera,
                        board,
                    ));
                }
            }
        }

        if response.hovered()
            && scroll.abs() > f32::EPSILON
            && let Some(pointer) = pointer
        {
            self.interaction.dispatch(
                PointerEvent::Scroll {
                    at: screen_to_local(rect, pointer),
                    delta: scroll,
                },
                &mut self.camera,
                board,
            );
        }

        self.hovered = match (self.interaction.anchor(), pointer) {
            (Some(index), _) => Some(index),
            (None, Some(pointer)) if response.hovered() => hit_test(
                board,
                self.camera,
                screen_to_local(rect, pointer),
                self.config.render.node_radius,
            ),
            _ => None,
        };

        let mut selection = None;
        for change in changes {
            match change {
                SelectionChange::Unchanged => {}
                SelectionChange::Select(index) => {
                    selection = Some(board.nodes.get(index).map(|node| node.id.clone()));
                }
                SelectionChange::Clear => selection = Some(None),
            }
        }
        if let Some(selected) = selection {
            self.set_selected(selected);
        }
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        self.set_viewport(rect.size());

        draw_background(&painter, rect, self.camera);

        if self.board.is_none() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No case entities to display yet.",
                FontId::proportional(18.0),
                Color32::from_gray(170),
            );
            return;
        }

        self.handle_pointer(ui, rect, &response);
        let search_matches = self.cached_search_matches();
        let selected_index = self.selected_index();

        let camera = self.camera;
        let render = self.config.render;
        let physics = self.config.physics;
        let show_all_labels = self.show_all_labels;
        let hovered = self.hovered;
        let Some(board) = self.board.as_mut() else {
            return;
        };

        self.interaction.hold_anchor(camera, board);
        if self.animation.running {
            step_physics(board, physics, self.interaction.anchor());
            ui.ctx().request_repaint();
        }

        let cursor = match self.interaction.state() {
            Interaction::PanningCanvas { .. } => Some(egui::CursorIcon::Grabbing),
            Interaction::DraggingNode { .. } => Some(egui::CursorIcon::Grabbing),
            _ if hovered.is_some() => Some(egui::CursorIcon::PointingHand),
            _ => None,
        };
        if let Some(cursor) = cursor {
            ui.output_mut(|output| output.cursor_icon = cursor);
        }

        let focus = selected_index.or(hovered);
        let highlight = focus.and_then(|index| build_highlight_state(board, index));
        let selection_highlight =
            selected_index.and_then(|index| build_highlight_state(board, index));

        board.view_scratch.screen_positions.clear();
        board.view_scratch.screen_positions.extend(
            board
                .nodes
                .iter()
                .map(|node| world_to_screen(rect, camera, node.world_pos)),
        );
        let screen_positions = &board.view_scratch.screen_positions;
        let search_active = search_matches
            .as_ref()
            .is_some_and(|matches| !matches.is_empty());
        let zoomed_labels = show_all_labels || labels_visible(camera.zoom, render.label_min_zoom, false);

        for (edge_index, &(source, target)) in board.edges.iter().enumerate() {
            if source == target {
                continue;
            }
            let start = screen_positions[source];
            let end = screen_positions[target];
            if !edge_visible(rect, start, end, 2.0) {
                continue;
            }

            let focused = highlight
                .as_ref()
                .is_some_and(|state| state.edges.contains(&edge_index));
            let dimmed = selection_highlight
                .as_ref()
                .is_some_and(|state| !state.edges.contains(&edge_index));

            let stroke = if focused {
                Stroke::new(2.2, Color32::from_rgb(241, 196, 94))
            } else if dimmed {
                Stroke::new(1.0, Color32::from_rgba_unmultiplied(80, 90, 104, 90))
            } else {
                Stroke::new(1.4, Color32::from_rgba_unmultiplied(130, 140, 155, 190))
            };
            painter.line_segment([start, end], stroke);

            let relation = self.graph.edges.get(edge_index).map(|edge| edge.relation.as_str());
            if let Some(relation) = relation
                && !relation.is_empty()
                && (focused || (zoomed_labels && !dimmed))
            {
                let mid = start + (end - start) * 0.5;
                painter.text(
                    mid,
                    Align2::CENTER_CENTER,
                    truncate_label(relation, LABEL_MAX_CHARS),
                    FontId::proportional(11.0),
                    if focused {
                        Color32::from_rgb(246, 214, 140)
                    } else {
                        Color32::from_gray(165)
                    },
                );
            }
        }

        let radius = render.node_radius;
        let mut draw_order = (0..board.nodes.len()).collect::<Vec<_>>();
        // Focused nodes last so they sit on top.
        draw_order.sort_by_key(|index| {
            highlight
                .as_ref()
                .is_some_and(|state| state.nodes.contains(index))
        });

        for index in draw_order {
            let position = screen_positions[index];
            if !circle_visible(rect, position, radius * 2.0) {
                continue;
            }
            let Some(node) = self.graph.nodes.get(index) else {
                continue;
            };

            let is_selected = selected_index == Some(index);
            let is_hovered = hovered == Some(index);
            let in_focus = highlight
                .as_ref()
                .is_some_and(|state| state.nodes.contains(&index));
            let in_selection = selection_highlight
                .as_ref()
                .is_none_or(|state| state.nodes.contains(&index));
            let is_match = search_matches
                .as_ref()
                .is_some_and(|matches| matches.contains(&index));

            let base_color = kind_color(node.kind);
            let color = if is_match {
                blend_color(base_color, Color32::from_rgb(103, 196, 255), 0.55)
            } else if !in_selection {
                dim_color(base_color, 0.42)
            } else if search_active {
                dim_color(base_color, 0.6)
            } else {
                base_color
            };

            if is_selected {
                for (spread, alpha) in [(14.0, 28u8), (9.0, 52), (5.0, 90)] {
                    painter.circle_filled(
                        position,
                        radius + spread,
                        Color32::from_rgba_unmultiplied(245, 206, 93, alpha),
                    );
                }
            }

            painter.circle_filled(position, radius, color);
            painter.circle_stroke(
                position,
                radius,
                Stroke::new(1.0, Color32::from_rgba_unmultiplied(15, 15, 15, 190)),
            );
            if is_selected {
                painter.circle_stroke(
                    position,
                    radius + 4.0,
                    Stroke::new(2.6, Color32::from_rgb(245, 206, 93)),
                );
            } else if is_hovered {
                painter.circle_stroke(
                    position,
                    radius + 3.0,
                    Stroke::new(1.6, Color32::from_gray(235)),
                );
            }

            painter.text(
                position,
                Align2::CENTER_CENTER,
                node.kind.glyph(),
                FontId::proportional(radius * 0.9),
                Color32::from_gray(20),
            );

            if (zoomed_labels && in_selection) || in_focus || is_match {
                painter.text(
                    position + vec2(0.0, radius + 4.0),
                    Align2::CENTER_TOP,
                    truncate_label(&node.label, LABEL_MAX_CHARS),
                    FontId::proportional(if is_selected { 14.0 } else { 12.0 }),
                    if in_selection {
                        Color32::from_gray(238)
                    } else {
                        Color32::from_gray(140)
                    },
                );
            }
        }

        if let Some(index) = hovered
            && let Some(node) = self.graph.nodes.get(index)
        {
            let degree = board.neighbors.get(index).map_or(0, Vec::len);
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                format!("{}  |  {}  |  connections {}", node.label, node.kind.label(), degree),
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        painter.text(
            Pos2::new(rect.right() - 10.0, rect.bottom() - 10.0),
            Align2::RIGHT_BOTTOM,
            format!("zoom {:.0}%", camera.zoom * 100.0),
            FontId::proportional(12.0),
            Color32::from_gray(150),
        );
    }
}
