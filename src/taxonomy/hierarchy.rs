use serde::{Deserialize, Serialize};

use super::records::InteractionType;

/// Root of one predator's prey tree, as written to the hierarchy artifact.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PreyHierarchy {
    pub name: String,
    pub children: Vec<KingdomNode>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KingdomNode {
    pub name: String,
    pub children: Vec<FamilyNode>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FamilyNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    pub children: Vec<SpeciesLeaf>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeciesLeaf {
    pub name: String,
    pub value: u64,
    pub interaction_type: InteractionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
}

impl PreyHierarchy {
    pub fn leaves(&self) -> impl Iterator<Item = &SpeciesLeaf> {
        self.children
            .iter()
            .flat_map(|kingdom| kingdom.children.iter())
            .flat_map(|family| family.children.iter())
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves().count()
    }

    pub fn total_value(&self) -> u64 {
        self.leaves().map(|leaf| leaf.value).sum()
    }

    /// First empty kingdom or family, if the structural invariant is broken.
    pub fn first_empty_group(&self) -> Option<&str> {
        if self.children.is_empty() {
            return Some(self.name.as_str());
        }

        for kingdom in &self.children {
            if kingdom.children.is_empty() {
                return Some(kingdom.name.as_str());
            }
            for family in &kingdom.children {
                if family.children.is_empty() {
                    return Some(family.name.as_str());
                }
            }
        }

        None
    }
}
