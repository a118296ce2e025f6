use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub const UNKNOWN: &str = "Unknown";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InteractionType {
    PreysOn,
    Eats,
    Pollinates,
}

impl InteractionType {
    pub const ALL: [Self; 3] = [Self::PreysOn, Self::Eats, Self::Pollinates];

    pub fn label(self) -> &'static str {
        match self {
            Self::PreysOn => "preysOn",
            Self::Eats => "eats",
            Self::Pollinates => "pollinates",
        }
    }
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn default_occurrence_count() -> u64 {
    1
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRecord {
    pub target_taxon_name: String,
    #[serde(default)]
    pub target_taxon_path: Option<String>,
    pub interaction_type: InteractionType,
    #[serde(default = "default_occurrence_count")]
    pub occurrence_count: u64,
}

#[cfg(test)]
impl InteractionRecord {
    pub fn new(target: impl Into<String>, interaction_type: InteractionType, count: u64) -> Self {
        Self {
            target_taxon_name: target.into(),
            target_taxon_path: None,
            interaction_type,
            occurrence_count: count,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.target_taxon_path = Some(path.into());
        self
    }
}

/// Taxonomic ranks for one species. Absent ranks read as `"Unknown"`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyRecord {
    #[serde(default)]
    pub kingdom: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub order: Option<String>,
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub common_name: Option<String>,
}

impl TaxonomyRecord {
    #[cfg(test)]
    pub fn with_ranks(kingdom: &str, class: &str, family: &str) -> Self {
        Self {
            kingdom: Some(kingdom.to_owned()),
            class: Some(class.to_owned()),
            family: Some(family.to_owned()),
            ..Self::default()
        }
    }

    #[cfg(test)]
    pub fn with_common_name(mut self, common_name: &str) -> Self {
        self.common_name = Some(common_name.to_owned());
        self
    }

    /// Rank value if it carries real information.
    pub fn rank(&self, rank: Rank) -> Option<&str> {
        let value = match rank {
            Rank::Kingdom => self.kingdom.as_deref(),
            Rank::Class => self.class.as_deref(),
            Rank::Order => self.order.as_deref(),
            Rank::Family => self.family.as_deref(),
        };
        value.map(str::trim).filter(|value| is_known(value))
    }

    pub fn display_name(&self) -> Option<&str> {
        self.common_name
            .as_deref()
            .or(self.species.as_deref())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

pub(crate) fn is_known(value: &str) -> bool {
    !value.is_empty() && !value.eq_ignore_ascii_case(UNKNOWN)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rank {
    Kingdom,
    Class,
    Order,
    Family,
}

impl Rank {
    pub const ALL: [Self; 4] = [Self::Kingdom, Self::Class, Self::Order, Self::Family];

    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "kingdom" => Some(Self::Kingdom),
            "class" => Some(Self::Class),
            "order" => Some(Self::Order),
            "family" => Some(Self::Family),
            _ => None,
        }
    }
}

/// Taxonomy source consulted before the interaction's own taxon path.
pub trait TaxonomyLookup {
    /// `None` covers both "unknown species" and lookup failure.
    fn lookup(&self, species: &str) -> Option<TaxonomyRecord>;
}

impl TaxonomyLookup for HashMap<String, TaxonomyRecord> {
    fn lookup(&self, species: &str) -> Option<TaxonomyRecord> {
        self.get(species).cloned()
    }
}

impl<F> TaxonomyLookup for F
where
    F: Fn(&str) -> Option<TaxonomyRecord>,
{
    fn lookup(&self, species: &str) -> Option<TaxonomyRecord> {
        self(species)
    }
}

/// What the external fetch process prints on stdout.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchPayload {
    pub predator: String,
    #[serde(default)]
    pub predator_taxonomy: Option<TaxonomyRecord>,
    #[serde(default)]
    pub interactions: Vec<InteractionRecord>,
    #[serde(default)]
    pub taxonomy: HashMap<String, TaxonomyRecord>,
}
