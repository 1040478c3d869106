use eframe::egui::{self, Align, Context, Layout};

use super::super::{BoardActions, BoardView};

impl BoardView {
    pub(in crate::app) fn show(&mut self, ctx: &Context, actions: &mut BoardActions) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Investigation Board");
                    ui.separator();
                    ui.label(format!("entities: {}", self.graph.node_count()));
                    ui.label(format!("relationships: {}", self.graph.edge_count()));
                    if ui.button("Reload snapshot").clicked() {
                        actions.reload = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if ui.button("Close board").clicked() {
                            actions.close = true;
                        }
                        let status = if self.animation.running {
                            "layout running"
                        } else {
                            "layout idle"
                        };
                        ui.label(status);
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        if self.selected.is_some() {
            egui::SidePanel::right("details")
                .resizable(true)
                .default_width(340.0)
                .show(ctx, |ui| self.draw_details(ui, actions));
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_graph(ui));
    }
}
