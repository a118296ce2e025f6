use std::collections::HashMap;

use tracing::debug;

use crate::error::{PipelineError, PipelineResult};

use super::hierarchy::{FamilyNode, KingdomNode, PreyHierarchy, SpeciesLeaf};
use super::ranks::{ResolvedTaxonomy, resolve_taxonomy};
use super::records::{InteractionRecord, InteractionType, TaxonomyLookup, TaxonomyRecord};

type PairKey<'a> = (&'a str, InteractionType);

struct PreyRow<'a> {
    species: &'a str,
    interaction: InteractionType,
    count: u64,
    taxonomy: ResolvedTaxonomy,
}

impl PreyRow<'_> {
    fn leaf(&self) -> SpeciesLeaf {
        let common = self.taxonomy.common_name.as_deref().unwrap_or(self.species);
        SpeciesLeaf {
            name: format!("{common} ({})", self.species),
            value: self.count.max(1),
            interaction_type: self.interaction,
            class: self.taxonomy.known_class().map(str::to_owned),
        }
    }
}

pub fn predator_label(predator_taxon: &str, predator_taxonomy: Option<&TaxonomyRecord>) -> String {
    let common = predator_taxonomy
        .and_then(TaxonomyRecord::display_name)
        .unwrap_or(predator_taxon);
    format!("{common} ({predator_taxon})")
}

/// Builds the kingdom → family → species tree for one predator.
///
/// Rows are deduplicated per `(species, interaction)` pair, resolved against
/// `lookup` with the record's taxon path as fallback, filtered to animals
/// (uncertain classifications are kept), ordered by aggregated count and
/// grouped in first-appearance order. Returns [`PipelineError::NoDataFound`]
/// when nothing survives.
pub fn build_hierarchy(
    predator_taxon: &str,
    interactions: &[InteractionRecord],
    lookup: &dyn TaxonomyLookup,
    predator_taxonomy: Option<&TaxonomyRecord>,
) -> PipelineResult<PreyHierarchy> {
    let root_name = predator_label(predator_taxon, predator_taxonomy);

    let mut pair_order: Vec<PairKey<'_>> = Vec::new();
    let mut representative_path: HashMap<PairKey<'_>, Option<&str>> = HashMap::new();
    let mut counts: HashMap<PairKey<'_>, u64> = HashMap::new();

    for record in interactions {
        let species = record.target_taxon_name.trim();
        if species.is_empty() {
            continue;
        }

        let key = (species, record.interaction_type);
        let path = record
            .target_taxon_path
            .as_deref()
            .filter(|path| !path.trim().is_empty());

        match representative_path.get_mut(&key) {
            Some(existing) => {
                if existing.is_none() {
                    *existing = path;
                }
            }
            None => {
                pair_order.push(key);
                representative_path.insert(key, path);
            }
        }

        *counts.entry(key).or_insert(0) += record.occurrence_count.max(1);
    }

    let mut rows = Vec::with_capacity(pair_order.len());
    let mut dropped = 0usize;

    for key in pair_order {
        let (species, interaction) = key;
        let path = representative_path.get(&key).copied().flatten();
        let mut taxonomy = resolve_taxonomy(species, path, lookup);

        if !taxonomy.is_retained() {
            dropped += 1;
            continue;
        }
        taxonomy.normalize_kingdom();

        rows.push(PreyRow {
            species,
            interaction,
            count: counts.get(&key).copied().unwrap_or(1).max(1),
            taxonomy,
        });
    }

    debug!(
        predator = predator_taxon,
        kept = rows.len(),
        dropped,
        "resolved prey rows"
    );

    if rows.is_empty() {
        return Err(PipelineError::NoDataFound {
            predator: predator_taxon.to_owned(),
        });
    }

    // `sort_by` is stable, so equal counts keep encounter order.
    rows.sort_by(|a, b| b.count.cmp(&a.count));

    Ok(PreyHierarchy {
        name: root_name,
        children: group_rows(&rows),
    })
}

fn group_rows(rows: &[PreyRow<'_>]) -> Vec<KingdomNode> {
    let mut kingdoms: Vec<KingdomNode> = Vec::new();
    let mut kingdom_index: HashMap<&str, usize> = HashMap::new();
    let mut family_index: HashMap<(&str, &str), usize> = HashMap::new();

    for row in rows {
        let kingdom_name = row.taxonomy.kingdom.as_str();
        let family_name = row.taxonomy.family.as_str();

        let k = *kingdom_index.entry(kingdom_name).or_insert_with(|| {
            kingdoms.push(KingdomNode {
                name: kingdom_name.to_owned(),
                children: Vec::new(),
            });
            kingdoms.len() - 1
        });
        let families = &mut kingdoms[k].children;

        let f = *family_index
            .entry((kingdom_name, family_name))
            .or_insert_with(|| {
                families.push(FamilyNode {
                    name: family_name.to_owned(),
                    class: row.taxonomy.known_class().map(str::to_owned),
                    children: Vec::new(),
                });
                families.len() - 1
            });

        let family = &mut families[f];
        if family.class.is_none() {
            family.class = row.taxonomy.known_class().map(str::to_owned);
        }
        family.children.push(row.leaf());
    }

    kingdoms
}
