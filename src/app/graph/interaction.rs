use eframe::egui::{self, Pos2, Rect, Ui};

use crate::radial::NodeKind;
use crate::util::reference_url;

use super::super::ViewModel;
use super::super::render_utils::{circle_visible, screen_to_world};

/// Only species leaves link out; other nodes are selection targets only.
pub(in crate::app) fn click_action(kind: &NodeKind, label: &str, template: &str) -> Option<String> {
    kind.is_species().then(|| reference_url(template, label))
}

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.2, 8.0);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
    }

    /// Drag translates the whole drawing; layout coordinates are untouched.
    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Primary)
            || response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }
    }

    pub(in crate::app) fn visible_indices_into(
        rect: Rect,
        screen_positions: &[Pos2],
        screen_radii: &[f32],
        out: &mut Vec<usize>,
    ) {
        out.clear();
        out.extend(
            (0..screen_positions.len())
                .filter(|&index| circle_visible(rect, screen_positions[index], screen_radii[index])),
        );
    }

    pub(in crate::app) fn hovered_index(
        ui: &Ui,
        visible_indices: &[usize],
        screen_positions: &[Pos2],
        screen_radii: &[f32],
    ) -> Option<usize> {
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        nearest_hit(pointer, visible_indices, screen_positions, screen_radii)
    }

    pub(in crate::app) fn reset_view(&mut self) {
        self.pan = egui::Vec2::ZERO;
        self.zoom = 1.0;
    }
}

/// Closest marker containing `pointer`, with a small pick slop for tiny markers.
fn nearest_hit(
    pointer: Pos2,
    visible_indices: &[usize],
    screen_positions: &[Pos2],
    screen_radii: &[f32],
) -> Option<usize> {
    visible_indices
        .iter()
        .filter_map(|&index| {
            let distance = screen_positions[index].distance(pointer);
            (distance <= screen_radii[index].max(4.0)).then_some((index, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}
