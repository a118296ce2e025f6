use eframe::egui::Vec2;

use crate::taxonomy::{InteractionType, PreyHierarchy};

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Root,
    Kingdom,
    Family {
        class: Option<String>,
    },
    Species {
        value: u64,
        interaction: InteractionType,
        class: Option<String>,
    },
}

impl NodeKind {
    pub fn depth(&self) -> usize {
        match self {
            Self::Root => 0,
            Self::Kingdom => 1,
            Self::Family { .. } => 2,
            Self::Species { .. } => 3,
        }
    }

    pub fn class(&self) -> Option<&str> {
        match self {
            Self::Family { class } | Self::Species { class, .. } => class.as_deref(),
            Self::Root | Self::Kingdom => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Root => "Predator",
            Self::Kingdom => "Kingdom",
            Self::Family { .. } => "Family",
            Self::Species { .. } => "Species",
        }
    }

    pub fn value(&self) -> Option<u64> {
        match self {
            Self::Species { value, .. } => Some(*value),
            _ => None,
        }
    }

    pub fn is_species(&self) -> bool {
        matches!(self, Self::Species { .. })
    }
}

#[derive(Clone, Debug)]
pub struct LayoutNode {
    pub kind: NodeKind,
    pub label: String,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    /// Radians clockwise from 12 o'clock.
    pub angle: f32,
    pub radius: f32,
    pub position: Vec2,
    pub marker_radius: f32,
    /// Species leaves at or below this node.
    pub leaf_count: usize,
}

impl LayoutNode {
    fn new(kind: NodeKind, label: &str, parent: Option<usize>) -> Self {
        Self {
            kind,
            label: label.to_owned(),
            parent,
            children: Vec::new(),
            angle: 0.0,
            radius: 0.0,
            position: Vec2::ZERO,
            marker_radius: 0.0,
            leaf_count: 0,
        }
    }

    pub fn depth(&self) -> usize {
        self.kind.depth()
    }
}

/// Siblings ordered by name; the sort is stable so equal names keep input order.
fn by_name<'a, T>(items: &'a [T], name: impl Fn(&T) -> &str) -> Vec<&'a T> {
    let mut sorted = items.iter().collect::<Vec<_>>();
    sorted.sort_by(|a, b| name(*a).cmp(name(*b)));
    sorted
}

fn push_child(nodes: &mut Vec<LayoutNode>, parent: usize, kind: NodeKind, label: &str) -> usize {
    let index = nodes.len();
    nodes.push(LayoutNode::new(kind, label, Some(parent)));
    nodes[parent].children.push(index);
    index
}

/// Flattens the hierarchy in pre-order with name-sorted siblings, so leaves
/// appear in their angular order.
pub(super) fn flatten(hierarchy: &PreyHierarchy) -> Vec<LayoutNode> {
    let mut nodes = vec![LayoutNode::new(NodeKind::Root, &hierarchy.name, None)];

    for kingdom in by_name(&hierarchy.children, |kingdom| kingdom.name.as_str()) {
        let k = push_child(&mut nodes, 0, NodeKind::Kingdom, &kingdom.name);

        for family in by_name(&kingdom.children, |family| family.name.as_str()) {
            let kind = NodeKind::Family {
                class: family.class.clone(),
            };
            let f = push_child(&mut nodes, k, kind, &family.name);

            for leaf in by_name(&family.children, |leaf| leaf.name.as_str()) {
                let kind = NodeKind::Species {
                    value: leaf.value.max(1),
                    interaction: leaf.interaction_type,
                    class: leaf.class.clone().or_else(|| family.class.clone()),
                };
                push_child(&mut nodes, f, kind, &leaf.name);
            }
        }
    }

    for index in (0..nodes.len()).rev() {
        nodes[index].leaf_count = if nodes[index].kind.is_species() {
            1
        } else {
            nodes[index]
                .children
                .iter()
                .map(|&child| nodes[child].leaf_count)
                .sum()
        };
    }

    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::{FamilyNode, KingdomNode, SpeciesLeaf};

    fn leaf(name: &str, interaction: InteractionType, value: u64) -> SpeciesLeaf {
        SpeciesLeaf {
            name: name.to_owned(),
            value,
            interaction_type: interaction,
            class: None,
        }
    }

    #[test]
    fn siblings_sorted_by_name_with_stable_ties() {
        let hierarchy = PreyHierarchy {
            name: "Otter (Lutra lutra)".into(),
            children: vec![
                KingdomNode {
                    name: "Unknown".into(),
                    children: vec![FamilyNode {
                        name: "Unknown".into(),
                        class: None,
                        children: vec![leaf("Zz (Zz)", InteractionType::Eats, 1)],
                    }],
                },
                KingdomNode {
                    name: "Animalia".into(),
                    children: vec![FamilyNode {
                        name: "Salmonidae".into(),
                        class: Some("Actinopterygii".into()),
                        children: vec![
                            leaf("Salmo trutta (Salmo trutta)", InteractionType::PreysOn, 9),
                            leaf("Salmo salar (Salmo salar)", InteractionType::PreysOn, 3),
                            leaf("Salmo salar (Salmo salar)", InteractionType::Eats, 30),
                        ],
                    }],
                },
            ],
        };

        let nodes = flatten(&hierarchy);
        let labels = nodes.iter().map(|node| node.label.as_str()).collect::<Vec<_>>();
        assert_eq!(
            labels,
            vec![
                "Otter (Lutra lutra)",
                "Animalia",
                "Salmonidae",
                "Salmo salar (Salmo salar)",
                "Salmo salar (Salmo salar)",
                "Salmo trutta (Salmo trutta)",
                "Unknown",
                "Unknown",
                "Zz (Zz)",
            ]
        );
        assert_eq!(nodes[3].kind.value(), Some(3));
        assert_eq!(nodes[4].kind.value(), Some(30));
        assert_eq!(nodes[3].kind.class(), Some("Actinopterygii"));
        assert_eq!(nodes[0].leaf_count, 4);
        assert_eq!(nodes[1].leaf_count, 3);
        assert!(nodes.iter().all(|node| node.depth() == node.parent.map_or(0, |p| nodes[p].depth() + 1)));
    }
}
