use std::f32::consts::PI;

use eframe::egui::{Align2, Color32, Painter, Pos2, Rect, Shape, Stroke, Vec2};

use crate::config::{NodeStyle, Rgb, StyleConfig};
use crate::radial::NodeKind;

pub(super) fn rgb(color: Rgb) -> Color32 {
    Color32::from_rgb(color[0], color[1], color[2])
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn node_style<'a>(style: &'a StyleConfig, kind: &NodeKind) -> &'a NodeStyle {
    match kind {
        NodeKind::Root => &style.root,
        NodeKind::Kingdom => &style.kingdom,
        NodeKind::Family { class } | NodeKind::Species { class, .. } => {
            style.category_style(class.as_deref())
        }
    }
}

/// Edge paint is decided by the child end: category for group edges,
/// interaction type for species edges.
pub(super) fn link_paint(style: &StyleConfig, child: &NodeKind) -> (Color32, bool) {
    match child {
        NodeKind::Species { interaction, .. } => {
            let link = style.link_style(*interaction);
            (rgb(link.color), link.dashed)
        }
        other => (rgb(node_style(style, other).fill), false),
    }
}

pub(super) fn draw_link(painter: &Painter, start: Pos2, end: Pos2, stroke: Stroke, dashed: bool) {
    if dashed {
        painter.extend(Shape::dashed_line(&[start, end], stroke, 6.0, 4.0));
    } else {
        painter.line_segment([start, end], stroke);
    }
}

/// Labels on the right half read outward to the right, the left half to the
/// left; at the top and bottom they sit above or below the marker.
pub(super) fn label_anchor(angle: f32) -> Align2 {
    let angle = angle.rem_euclid(2.0 * PI);
    if angle < 1e-3 || (2.0 * PI - angle) < 1e-3 {
        Align2::CENTER_BOTTOM
    } else if (angle - PI).abs() < 1e-3 {
        Align2::CENTER_TOP
    } else if angle < PI {
        Align2::LEFT_CENTER
    } else {
        Align2::RIGHT_CENTER
    }
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32, rings: &[f32]) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let center = rect.center() + pan;
    for ring in rings {
        painter.circle_stroke(
            center,
            ring * zoom,
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70)),
        );
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}
