use eframe::egui::{self, RichText, Ui};

use crate::radial::NodeKind;
use crate::util::{common_name, format_count, scientific_name};

use super::super::ViewModel;
use super::super::graph::click_action;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Node Details");
        ui.add_space(6.0);

        let Some(cache) = self.graph_cache.as_ref() else {
            ui.label("Layout not ready yet.");
            return;
        };

        let Some(index) = self.hovered.or(self.selected) else {
            ui.label("Hover or click a node in the tree.");
            return;
        };
        let Some(node) = cache.layout.nodes.get(index) else {
            ui.label("Selected node no longer exists in the layout.");
            return;
        };

        if self.hovered.is_some() && self.hovered != self.selected {
            ui.weak("hovered");
        }

        match &node.kind {
            NodeKind::Species { .. } | NodeKind::Root => {
                ui.label(RichText::new(common_name(&node.label)).strong());
                ui.label(RichText::new(scientific_name(&node.label)).italics());
            }
            NodeKind::Kingdom | NodeKind::Family { .. } => {
                ui.label(RichText::new(node.label.as_str()).strong());
            }
        }
        ui.small(node.kind.label());
        ui.add_space(6.0);

        if let Some(class) = node.kind.class() {
            ui.label(format!("Class: {class}"));
        }
        let category = self.style.category(node.kind.class());
        if !matches!(node.kind, NodeKind::Root | NodeKind::Kingdom) {
            ui.label(format!("Colour category: {category}"));
        }

        if let NodeKind::Species {
            value, interaction, ..
        } = &node.kind
        {
            ui.label(format!("Interaction: {interaction}"));
            ui.label(format!("Recorded interactions: {}", format_count(*value)));
        } else {
            ui.label(format!("Species beneath: {}", node.leaf_count));
            let total = subtree_value(cache, index);
            ui.label(format!("Recorded interactions: {}", format_count(total)));
        }

        if let Some(parent) = node.parent.and_then(|parent| cache.layout.nodes.get(parent)) {
            ui.label(format!("Parent: {}", parent.label));
        }

        if let Some(url) =
            click_action(&node.kind, &node.label, &self.style.reference_url_template)
        {
            ui.add_space(6.0);
            ui.hyperlink_to("Open reference page", url);
        }

        if !node.children.is_empty() {
            ui.separator();
            ui.label(RichText::new("Children").strong());
            let children = node.children.clone();
            egui::ScrollArea::vertical()
                .id_salt("node_children_scroll")
                .max_height(320.0)
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for child in children {
                        let Some(child_node) = cache.layout.nodes.get(child) else {
                            continue;
                        };
                        let text = match child_node.kind.value() {
                            Some(value) => format!("{}  ({})", child_node.label, format_count(value)),
                            None => format!("{}  [{} species]", child_node.label, child_node.leaf_count),
                        };
                        if ui.link(text).clicked() {
                            self.selected = Some(child);
                        }
                    }
                });
        }
    }
}

fn subtree_value(cache: &super::super::RenderGraph, index: usize) -> u64 {
    let nodes = &cache.layout.nodes;
    let mut stack = vec![index];
    let mut total = 0;
    while let Some(current) = stack.pop() {
        let node = &nodes[current];
        total += node.kind.value().unwrap_or(0);
        stack.extend(node.children.iter().copied());
    }
    total
}
