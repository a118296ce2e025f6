use eframe::egui::{self, Color32, Context, RichText, Sense, Stroke, Ui, vec2};

use crate::taxonomy::InteractionType;
use crate::util::format_count;

use super::super::loader::Notice;
use super::super::render_utils::{draw_link, rgb};
use super::super::{ViewAction, ViewModel};

impl ViewModel {
    pub(in crate::app) fn show(&mut self, ctx: &Context) -> ViewAction {
        let mut action = ViewAction::None;

        egui::SidePanel::left("legend")
            .resizable(true)
            .default_width(240.0)
            .show(ctx, |ui| {
                if self.draw_legend(ui) {
                    action = ViewAction::Refresh;
                }
            });

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Err(error) = self.draw_graph(ui) {
                action = ViewAction::Failed(error.to_string());
            }
        });

        action
    }

    /// Returns `true` when a refresh of the shown predator was requested.
    fn draw_legend(&mut self, ui: &mut Ui) -> bool {
        let mut refresh = false;

        ui.heading(self.loaded.hierarchy.name.as_str());
        match &self.loaded.notice {
            Some(Notice::Substituted { requested, reason }) => {
                ui.colored_label(
                    Color32::from_rgb(241, 146, 94),
                    format!("No data for {requested}; showing {}.", self.loaded.shown),
                )
                .on_hover_text(reason.as_str());
            }
            Some(Notice::Stale { reason }) => {
                ui.colored_label(
                    Color32::from_rgb(241, 146, 94),
                    "Refresh failed; showing the stored copy.",
                )
                .on_hover_text(reason.as_str());
            }
            None => {}
        }
        ui.label(format!(
            "{} prey leaves, {} records",
            self.loaded.hierarchy.leaf_count(),
            format_count(self.loaded.hierarchy.total_value())
        ));

        ui.horizontal(|ui| {
            if ui.button("Refresh data").clicked() {
                refresh = true;
            }
            if ui.button("Reset view").clicked() {
                self.reset_view();
            }
        });

        ui.separator();
        ui.label(RichText::new("Prey categories").strong());
        for entry in &self.legend {
            let style = self.style.category_style(Some(entry.category.as_str()));
            ui.horizontal(|ui| {
                let (rect, _) = ui.allocate_exact_size(vec2(14.0, 14.0), Sense::hover());
                ui.painter()
                    .circle_filled(rect.center(), 6.0, rgb(style.fill));
                ui.label(entry.category.as_str());
                ui.weak(format!(
                    "{} ({} species)",
                    format_count(entry.total_value),
                    entry.leaf_count
                ));
            });
        }

        ui.separator();
        ui.label(RichText::new("Interactions").strong());
        for interaction in InteractionType::ALL {
            let link = self.style.link_style(interaction);
            ui.horizontal(|ui| {
                let (rect, _) = ui.allocate_exact_size(vec2(28.0, 14.0), Sense::hover());
                draw_link(
                    ui.painter(),
                    rect.left_center(),
                    rect.right_center(),
                    Stroke::new(2.0, rgb(link.color)),
                    link.dashed,
                );
                ui.label(interaction.label());
            });
        }

        ui.add_space(8.0);
        ui.weak("Drag to pan, scroll to zoom, click a species to open its reference page.");

        refresh
    }
}
