use eframe::egui::{self, ProgressBar, RichText, Ui};

use super::super::render_utils::kind_color;
use super::super::{BoardActions, BoardView, DeepDive};

impl BoardView {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui, actions: &mut BoardActions) {
        ui.heading("Entity Details");
        ui.add_space(6.0);

        let Some(selected_id) = self.selected.clone() else {
            ui.label("Select a node on the board.");
            return;
        };

        let Some(node) = self.graph.node(&selected_id) else {
            ui.label("Selected entity is no longer on the board.");
            return;
        };

        ui.label(RichText::new(&node.label).strong().size(17.0));
        ui.colored_label(kind_color(node.kind), node.kind.label());
        ui.small(node.id.as_str());
        ui.add_space(6.0);

        if !node.description.is_empty() {
            ui.label(&node.description);
            ui.add_space(4.0);
        }

        if let Some(metadata) = &node.metadata {
            if let Some(role) = &metadata.role {
                ui.label(format!("Role: {role}"));
            }
            if let Some(score) = metadata.impact_score {
                ui.horizontal(|ui| {
                    ui.label("Impact");
                    ui.add(
                        ProgressBar::new(f32::from(score) / 10.0)
                            .desired_width(160.0)
                            .text(format!("{score}/10")),
                    );
                });
            }
            if !metadata.tags.is_empty() {
                ui.horizontal_wrapped(|ui| {
                    for tag in &metadata.tags {
                        ui.label(RichText::new(format!("#{tag}")).monospace().small());
                    }
                });
            }
            if let Some(quote) = &metadata.key_quote {
                ui.add_space(4.0);
                ui.label(RichText::new(format!("\u{201c}{quote}\u{201d}")).italics());
            }
        }

        ui.add_space(8.0);
        if ui
            .button("Deep dive")
            .on_hover_text("Ask the case assistant about this entity")
            .clicked()
        {
            actions.deep_dive = Some(DeepDive::from_node(node));
        }

        ui.separator();
        ui.label(RichText::new("Connections").strong());

        let connections = self
            .graph
            .connections(&selected_id)
            .map(|(edge, other_id)| {
                let other_label = self
                    .graph
                    .node(other_id)
                    .map_or(other_id, |other| other.label.as_str());
                let outgoing = edge.source == selected_id;
                (other_id.to_owned(), other_label.to_owned(), edge.relation.clone(), outgoing)
            })
            .collect::<Vec<_>>();

        if connections.is_empty() {
            ui.label("No recorded relationships.");
            return;
        }

        let mut next_selection = None;
        egui::ScrollArea::vertical()
            .id_salt("connections_scroll")
            .max_height(320.0)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for (other_id, other_label, relation, outgoing) in &connections {
                    let relation = if relation.is_empty() {
                        "related to"
                    } else {
                        relation.as_str()
                    };
                    let text = if *outgoing {
                        format!("{relation} \u{2192} {other_label}")
                    } else {
                        format!("{other_label} \u{2192} {relation}")
                    };
                    if ui.link(text).on_hover_text(other_id.as_str()).clicked() {
                        next_selection = Some(other_id.clone());
                    }
                }
            });

        if let Some(id) = next_selection {
            self.set_selected(Some(id));
        }
    }
}
