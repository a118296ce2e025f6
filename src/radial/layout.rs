use std::f32::consts::{FRAC_PI_2, TAU};

use eframe::egui::{Vec2, vec2};

use crate::config::LayoutConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::taxonomy::PreyHierarchy;

use super::tree::{LayoutNode, NodeKind, flatten};

/// Positions for one hierarchy in a fixed viewport, centred on the origin.
#[derive(Clone, Debug)]
pub struct RadialLayout {
    pub nodes: Vec<LayoutNode>,
    pub leaf_count: usize,
    pub max_depth: usize,
    pub radial_step: f32,
}

impl RadialLayout {
    pub fn compute(
        hierarchy: &PreyHierarchy,
        config: &LayoutConfig,
        viewport: Vec2,
    ) -> PipelineResult<Self> {
        if let Some(empty) = hierarchy.first_empty_group() {
            return Err(PipelineError::Render(format!("group {empty:?} has no children")));
        }
        if !(viewport.x.is_finite() && viewport.y.is_finite()) || viewport.min_elem() <= 0.0 {
            return Err(PipelineError::Render(format!(
                "viewport {}x{} has no area",
                viewport.x, viewport.y
            )));
        }

        let mut nodes = flatten(hierarchy);
        let leaves = (0..nodes.len())
            .filter(|&index| nodes[index].kind.is_species())
            .collect::<Vec<_>>();
        if leaves.is_empty() {
            return Err(PipelineError::Render("hierarchy has no species".to_owned()));
        }

        let max_depth = nodes.iter().map(LayoutNode::depth).max().unwrap_or(0).max(1);
        let container_radius = viewport.min_elem() / 2.0;
        let margin = config.margin.clamp(0.0, container_radius * 0.5);
        let radial_step = (container_radius - margin) / max_depth as f32;
        if !(radial_step.is_finite() && radial_step > 0.0) {
            return Err(PipelineError::Render(format!(
                "radial step {radial_step} is not positive"
            )));
        }

        assign_leaf_angles(&mut nodes, &leaves, config.cross_parent_separation);

        // Pre-order storage puts children after parents.
        for index in (0..nodes.len()).rev() {
            if nodes[index].children.is_empty() {
                continue;
            }
            let sum = nodes[index]
                .children
                .iter()
                .map(|&child| nodes[child].angle)
                .sum::<f32>();
            nodes[index].angle = sum / nodes[index].children.len() as f32;
        }

        for node in &mut nodes {
            node.radius = node.depth() as f32 * radial_step;
            node.position = project(node.angle, node.radius);
            node.marker_radius = marker_radius(&node.kind, config);
        }

        Ok(Self {
            leaf_count: leaves.len(),
            nodes,
            max_depth,
            radial_step,
        })
    }

    pub fn outer_radius(&self) -> f32 {
        self.max_depth as f32 * self.radial_step
    }

    /// `(parent, child)` index pairs in storage order.
    pub fn links(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| node.parent.map(|parent| (parent, index)))
    }
}

/// Leaves get consecutive slots; a slot boundary between different parents is
/// `separation` wide instead of 1, including the wrap-around boundary.
fn assign_leaf_angles(nodes: &mut [LayoutNode], leaves: &[usize], separation: f32) {
    let separation = if separation.is_finite() {
        separation.max(1.0)
    } else {
        1.0
    };
    let gap = |a: usize, b: usize| {
        if nodes[a].parent == nodes[b].parent {
            1.0
        } else {
            separation
        }
    };

    let mut offsets = Vec::with_capacity(leaves.len());
    let mut cursor = 0.0_f32;
    for (slot, &leaf) in leaves.iter().enumerate() {
        if slot > 0 {
            cursor += gap(leaves[slot - 1], leaf);
        }
        offsets.push(cursor);
    }

    let wrap = match (leaves.first(), leaves.last()) {
        (Some(&first), Some(&last)) if leaves.len() > 1 => gap(last, first),
        _ => 1.0,
    };
    let total = cursor + wrap;

    for (&leaf, offset) in leaves.iter().zip(offsets) {
        nodes[leaf].angle = (offset + wrap / 2.0) / total * TAU;
    }
}

fn project(angle: f32, radius: f32) -> Vec2 {
    let theta = angle - FRAC_PI_2;
    vec2(radius * theta.cos(), radius * theta.sin())
}

fn marker_radius(kind: &NodeKind, config: &LayoutConfig) -> f32 {
    match kind {
        NodeKind::Root => config.root_marker,
        NodeKind::Kingdom => config.kingdom_marker,
        NodeKind::Family { .. } => config.family_marker,
        NodeKind::Species { value, .. } => {
            (config.min_marker + config.marker_scale * (*value as f32).sqrt())
                .min(config.max_marker)
        }
    }
}
