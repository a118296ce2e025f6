use eframe::egui::{self, Align2, Color32, FontId, Sense, Stroke, Ui, Vec2, vec2};
use tracing::info;

use crate::error::PipelineResult;
use crate::util::format_count;

use super::super::render_utils::{
    blend_color, circle_visible, draw_background, draw_link, label_anchor, link_paint, node_style,
    rgb, world_to_screen,
};
use super::super::{RenderGraph, ViewModel};
use super::interaction::click_action;

impl ViewModel {
    fn update_screen_space(rect: egui::Rect, pan: Vec2, zoom: f32, cache: &mut RenderGraph) {
        let scratch = &mut cache.view_scratch;
        scratch.screen_positions.clear();
        scratch.screen_radii.clear();
        for node in &cache.layout.nodes {
            scratch
                .screen_positions
                .push(world_to_screen(rect, pan, zoom, node.position));
            scratch
                .screen_radii
                .push((node.marker_radius * zoom.powf(0.5)).clamp(2.0, 40.0));
        }
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) -> PipelineResult<()> {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        self.ensure_render_graph(rect.size())?;

        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);
        if response.dragged() {
            ui.ctx().request_repaint();
        }

        let painter = ui.painter_at(rect);
        let pan = self.pan;
        let zoom = self.zoom;
        let Some(cache) = self.graph_cache.as_mut() else {
            return Ok(());
        };

        draw_background(&painter, rect, pan, zoom, &cache.rings);
        Self::update_screen_space(rect, pan, zoom, cache);
        Self::visible_indices_into(
            rect,
            &cache.view_scratch.screen_positions,
            &cache.view_scratch.screen_radii,
            &mut cache.view_scratch.visible_indices,
        );

        let hovered = Self::hovered_index(
            ui,
            &cache.view_scratch.visible_indices,
            &cache.view_scratch.screen_positions,
            &cache.view_scratch.screen_radii,
        );
        self.hovered = hovered;
        if hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        let link_width = (1.3 * zoom.sqrt()).clamp(0.7, 3.2);
        for (parent, child) in cache.layout.links() {
            let start = cache.view_scratch.screen_positions[parent];
            let end = cache.view_scratch.screen_positions[child];
            let (color, dashed) = link_paint(&self.style, &cache.layout.nodes[child].kind);
            let emphasised = self.selected == Some(child) || hovered == Some(child);
            let color = if emphasised {
                color
            } else {
                color.gamma_multiply(0.7)
            };
            let width = if emphasised { link_width * 1.8 } else { link_width };
            draw_link(&painter, start, end, Stroke::new(width, color), dashed);
        }

        let highlight = Color32::from_rgb(255, 164, 101);
        let show_leaf_labels = cache.layout.leaf_count <= 60 || zoom > 1.3;
        for &index in &cache.draw_order {
            let radius = cache.view_scratch.screen_radii[index];
            let position = cache.view_scratch.screen_positions[index];
            if !circle_visible(rect, position, radius + 80.0) {
                continue;
            }

            let node = &cache.layout.nodes[index];
            let style = node_style(&self.style, &node.kind);
            let is_hovered = hovered == Some(index);
            let is_selected = self.selected == Some(index);

            let fill = rgb(style.fill);
            let fill = if is_hovered {
                blend_color(fill, highlight, 0.55)
            } else {
                fill
            };
            painter.circle_filled(position, radius, fill);
            painter.circle_stroke(
                position,
                radius,
                Stroke::new(if is_selected { 2.2 } else { 1.0 }, rgb(style.stroke)),
            );
            if is_selected {
                painter.circle_stroke(
                    position,
                    radius + 4.0,
                    Stroke::new(1.4, Color32::from_rgba_unmultiplied(245, 206, 93, 170)),
                );
            }

            let should_draw_label =
                !node.kind.is_species() || show_leaf_labels || is_hovered || is_selected;
            if should_draw_label {
                let (offset, anchor) = if node.parent.is_none() {
                    (vec2(0.0, radius + 4.0), Align2::CENTER_TOP)
                } else {
                    let outward = node.position.normalized();
                    (outward * (radius + 4.0), label_anchor(node.angle))
                };
                painter.text(
                    position + offset,
                    anchor,
                    node.label.as_str(),
                    FontId::proportional(if node.kind.is_species() { 11.0 } else { 12.5 }),
                    Color32::from_gray(if is_hovered { 255 } else { 225 }),
                );
            }
        }

        if let Some(index) = hovered {
            let node = &cache.layout.nodes[index];
            let mut panel_text = format!("{}  |  {}", node.label, node.kind.label());
            if let Some(value) = node.kind.value() {
                panel_text.push_str(&format!("  |  {} records", format_count(value)));
            }
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                panel_text,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        if response.clicked_by(egui::PointerButton::Primary) {
            self.selected = hovered;
            if let Some(index) = hovered {
                let node = &cache.layout.nodes[index];
                if let Some(url) =
                    click_action(&node.kind, &node.label, &self.style.reference_url_template)
                {
                    info!(%url, "opening species reference");
                    ui.ctx().open_url(egui::OpenUrl::new_tab(url));
                }
            }
        }

        Ok(())
    }
}
