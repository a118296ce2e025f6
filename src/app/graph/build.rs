use std::collections::HashMap;
use std::sync::Arc;

use eframe::egui::Vec2;
use tracing::{debug, warn};

use crate::config::{LayoutConfig, StyleConfig};
use crate::error::PipelineResult;
use crate::radial::RadialLayout;
use crate::taxonomy::PreyHierarchy;

use super::super::{LegendEntry, LoadedHierarchy, RenderGraph, ViewModel, ViewScratch};

impl ViewModel {
    pub(in crate::app) fn new(
        loaded: LoadedHierarchy,
        style: Arc<StyleConfig>,
        layout_config: LayoutConfig,
    ) -> Self {
        let legend = legend_entries(&loaded.hierarchy, &style);

        Self {
            loaded,
            style,
            layout_config,
            graph_cache: None,
            legend,
            pan: Vec2::ZERO,
            zoom: 1.0,
            hovered: None,
            selected: None,
        }
    }

    /// Lays the hierarchy out once, sized to the first viewport it is shown in.
    pub(in crate::app) fn ensure_render_graph(&mut self, viewport: Vec2) -> PipelineResult<()> {
        if self.graph_cache.is_some() {
            return Ok(());
        }

        let layout = RadialLayout::compute(&self.loaded.hierarchy, &self.layout_config, viewport)
            .inspect_err(|error| warn!(predator = %self.loaded.shown, %error, "layout failed"))?;
        debug!(
            predator = %self.loaded.shown,
            nodes = layout.nodes.len(),
            leaves = layout.leaf_count,
            outer_radius = layout.outer_radius(),
            "radial layout computed"
        );

        self.graph_cache = Some(RenderGraph {
            draw_order: draw_order(&layout),
            rings: (1..=layout.max_depth)
                .map(|depth| depth as f32 * layout.radial_step)
                .collect(),
            layout,
            view_scratch: ViewScratch::default(),
        });
        Ok(())
    }
}

/// Internal nodes first, then leaves by ascending value so the most
/// prominent leaves are painted last.
fn draw_order(layout: &RadialLayout) -> Vec<usize> {
    let mut order = (0..layout.nodes.len()).collect::<Vec<_>>();
    order.sort_by_key(|&index| {
        let node = &layout.nodes[index];
        (node.kind.is_species(), node.kind.value().unwrap_or(0))
    });
    order
}

/// Category totals over all leaves, largest first.
pub(in crate::app) fn legend_entries(
    hierarchy: &PreyHierarchy,
    style: &StyleConfig,
) -> Vec<LegendEntry> {
    let mut totals: HashMap<&str, (u64, usize)> = HashMap::new();

    for family in hierarchy.children.iter().flat_map(|kingdom| &kingdom.children) {
        for leaf in &family.children {
            let class = leaf.class.as_deref().or(family.class.as_deref());
            let entry = totals.entry(style.category(class)).or_default();
            entry.0 += leaf.value.max(1);
            entry.1 += 1;
        }
    }

    let mut entries = totals
        .into_iter()
        .map(|(category, (total_value, leaf_count))| LegendEntry {
            category: category.to_owned(),
            total_value,
            leaf_count,
        })
        .collect::<Vec<_>>();
    entries.sort_by(|a, b| {
        b.total_value
            .cmp(&a.total_value)
            .then_with(|| a.category.cmp(&b.category))
    });
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::{FamilyNode, InteractionType, KingdomNode, SpeciesLeaf, UNKNOWN};

    fn leaf(name: &str, value: u64, class: Option<&str>) -> SpeciesLeaf {
        SpeciesLeaf {
            name: name.to_owned(),
            value,
            interaction_type: InteractionType::PreysOn,
            class: class.map(str::to_owned),
        }
    }

    fn hierarchy() -> PreyHierarchy {
        PreyHierarchy {
            name: "Eurasian otter (Lutra lutra)".into(),
            children: vec![
                KingdomNode {
                    name: "Animalia".into(),
                    children: vec![
                        FamilyNode {
                            name: "Salmonidae".into(),
                            class: Some("Actinopterygii".into()),
                            children: vec![
                                leaf("Brown trout (Salmo trutta)", 40, Some("Actinopterygii")),
                                leaf("Salmo salar (Salmo salar)", 12, None),
                            ],
                        },
                        FamilyNode {
                            name: "Ranidae".into(),
                            class: Some("Amphibia".into()),
                            children: vec![leaf("Rana temporaria (Rana temporaria)", 9, None)],
                        },
                    ],
                },
                KingdomNode {
                    name: "Unknown".into(),
                    children: vec![FamilyNode {
                        name: "Astacidae".into(),
                        class: Some("Malacostraca".into()),
                        children: vec![leaf("Astacus astacus (Astacus astacus)", 9, None)],
                    }],
                },
            ],
        }
    }

    #[test]
    fn legend_is_ordered_by_total_value() {
        let legend = legend_entries(&hierarchy(), &StyleConfig::default());
        let categories = legend
            .iter()
            .map(|entry| entry.category.as_str())
            .collect::<Vec<_>>();
        assert_eq!(categories, vec!["Actinopterygii", "Amphibia", UNKNOWN]);
        assert_eq!(legend[0].total_value, 52);
        assert_eq!(legend[0].leaf_count, 2);
    }

    #[test]
    fn draw_order_puts_heavy_leaves_last() {
        let layout = RadialLayout::compute(
            &hierarchy(),
            &LayoutConfig::default(),
            Vec2::new(900.0, 700.0),
        )
        .unwrap();
        let order = draw_order(&layout);
        assert_eq!(order.len(), layout.nodes.len());

        let last = &layout.nodes[*order.last().unwrap()];
        assert_eq!(last.kind.value(), Some(40));
        assert!(!layout.nodes[order[0]].kind.is_species());
    }

    #[test]
    fn render_graph_is_built_once() {
        let loaded = LoadedHierarchy {
            hierarchy: hierarchy(),
            shown: "Lutra lutra".into(),
            notice: None,
        };
        let mut model = ViewModel::new(loaded, Arc::new(StyleConfig::default()), LayoutConfig::default());
        model.ensure_render_graph(Vec2::new(900.0, 700.0)).unwrap();
        let radius = model.graph_cache.as_ref().unwrap().layout.outer_radius();

        model.ensure_render_graph(Vec2::new(300.0, 200.0)).unwrap();
        let cache = model.graph_cache.as_ref().unwrap();
        assert_eq!(cache.layout.outer_radius(), radius);
        assert_eq!(cache.rings.len(), 3);
    }

    #[test]
    fn layout_failure_is_reported() {
        let mut broken = hierarchy();
        broken.children[1].children.clear();
        let loaded = LoadedHierarchy {
            hierarchy: broken,
            shown: "Lutra lutra".into(),
            notice: None,
        };
        let mut model = ViewModel::new(loaded, Arc::new(StyleConfig::default()), LayoutConfig::default());
        assert!(model.ensure_render_graph(Vec2::new(900.0, 700.0)).is_err());
        assert!(model.graph_cache.is_none());
    }
}
