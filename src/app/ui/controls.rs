use eframe::egui::{self, Align, Layout, RichText, Ui};

use crate::case::{Node, NodeKind};
use crate::config::PhysicsConfig;

use super::super::graph::interaction::Camera;
use super::super::render_utils::{kind_color, truncate_label};
use super::super::BoardView;

const SEARCH_RESULT_LIMIT: usize = 40;
const ZOOM_BUTTON_FACTOR: f32 = 1.25;

fn physics_slider(
    ui: &mut Ui,
    label: &str,
    value: &mut f32,
    range: std::ops::RangeInclusive<f32>,
    hint: &str,
) -> bool {
    ui.add(egui::Slider::new(value, range).text(label))
        .on_hover_text(hint)
        .changed()
}

impl BoardView {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Board");
        ui.add_space(4.0);

        self.draw_search(ui);
        ui.separator();
        self.draw_camera_controls(ui);
        ui.separator();
        self.draw_physics_controls(ui);
        ui.separator();
        draw_legend(ui);
    }

    fn draw_search(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.label("Search");
            ui.add(
                egui::TextEdit::singleline(&mut self.search)
                    .hint_text("name, place, exhibit...")
                    .desired_width(f32::INFINITY),
            );
        });

        let Some(matches) = self.cached_search_matches() else {
            return;
        };
        if matches.is_empty() {
            ui.label("No matching entities.");
            return;
        }

        // Highest impact first, then alphabetical.
        let mut ranked = matches
            .iter()
            .filter_map(|&index| self.graph.nodes.get(index).map(|node| (index, node)))
            .collect::<Vec<_>>();
        ranked.sort_by(|(_, left), (_, right)| {
            let impact = |node: &Node| {
                node.metadata
                    .as_ref()
                    .and_then(|metadata| metadata.impact_score)
                    .unwrap_or(0)
            };
            impact(right)
                .cmp(&impact(left))
                .then_with(|| left.label.cmp(&right.label))
        });

        ui.small(format!("{} match(es)", ranked.len()));
        let mut picked = None;
        egui::ScrollArea::vertical()
            .id_salt("search_results")
            .max_height(200.0)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for (index, node) in ranked.iter().take(SEARCH_RESULT_LIMIT) {
                    let selected = self.selected.as_deref() == Some(node.id.as_str());
                    let text = RichText::new(truncate_label(&node.label, 36))
                        .color(kind_color(node.kind));
                    if ui
                        .selectable_label(selected, text)
                        .on_hover_text(node.kind.label())
                        .clicked()
                    {
                        picked = Some(*index);
                    }
                }
            });

        if let Some(index) = picked {
            self.focus_node(index);
        }
    }

    /// Selects a node and pans so it sits in the middle of the canvas.
    fn focus_node(&mut self, index: usize) {
        let Some(board) = self.board.as_ref() else {
            return;
        };
        let Some(node) = board.nodes.get(index) else {
            return;
        };
        self.camera.pan = self.viewport * 0.5 - node.world_pos * self.camera.zoom;
        let id = node.id.clone();
        self.set_selected(Some(id));
    }

    fn draw_camera_controls(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("View").strong());
        ui.horizontal(|ui| {
            let center = self.viewport * 0.5;
            if ui.button("\u{2212}").on_hover_text("Zoom out").clicked() {
                self.interaction
                    .zoom_at(&mut self.camera, center, 1.0 / ZOOM_BUTTON_FACTOR);
            }
            ui.label(format!("{:.0}%", self.camera.zoom * 100.0));
            if ui.button("+").on_hover_text("Zoom in").clicked() {
                self.interaction
                    .zoom_at(&mut self.camera, center, ZOOM_BUTTON_FACTOR);
            }
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                if ui.button("Reset view").clicked() {
                    self.camera = Camera::default();
                    self.interaction.set_zoom(&mut self.camera, 1.0);
                }
            });
        });
        ui.checkbox(&mut self.show_all_labels, "Show all labels");
    }

    fn draw_physics_controls(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Layout").strong());

        let mut physics = self.config.physics;
        let mut changed = false;
        changed |= physics_slider(
            ui,
            "repulsion",
            &mut physics.repulsion,
            0.0..=10_000.0,
            "How hard every pair of entities pushes apart",
        );
        changed |= physics_slider(
            ui,
            "spring",
            &mut physics.spring,
            0.0..=0.5,
            "How strongly a relationship pulls toward its rest length",
        );
        changed |= physics_slider(
            ui,
            "link length",
            &mut physics.ideal_length,
            20.0..=400.0,
            "Rest length of a relationship",
        );
        changed |= physics_slider(
            ui,
            "gravity",
            &mut physics.gravity,
            0.0..=0.05,
            "Pull toward the middle of the canvas",
        );
        changed |= physics_slider(
            ui,
            "damping",
            &mut physics.damping,
            0.05..=0.99,
            "Fraction of velocity kept each frame",
        );
        changed |= physics_slider(
            ui,
            "max speed",
            &mut physics.max_velocity,
            0.5..=50.0,
            "Per-axis velocity cap",
        );

        ui.horizontal(|ui| {
            if ui.button("Default physics").clicked() {
                physics = PhysicsConfig::default();
                changed = true;
            }
            let toggle = if self.animation.running {
                "Pause layout"
            } else {
                "Resume layout"
            };
            if ui
                .add_enabled(self.board.is_some(), egui::Button::new(toggle))
                .clicked()
            {
                if self.animation.running {
                    self.animation.stop();
                } else {
                    self.animation.restart();
                }
            }
        });

        if changed {
            self.set_physics(physics);
        }
    }
}

fn draw_legend(ui: &mut Ui) {
    ui.label(RichText::new("Legend").strong());
    for kind in NodeKind::ALL {
        ui.horizontal(|ui| {
            ui.colored_label(kind_color(kind), kind.glyph());
            ui.label(kind.label());
        });
    }
}
