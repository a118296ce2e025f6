use super::records::{Rank, TaxonomyLookup, TaxonomyRecord, UNKNOWN, is_known};

pub const ANIMAL_KINGDOMS: [&str; 2] = ["Animalia", "Metazoa"];
pub const ANIMAL_CLASSES: [&str; 5] = ["Mammalia", "Aves", "Actinopterygii", "Reptilia", "Amphibia"];

/// Fully resolved ranks for a species; every field is a name or `"Unknown"`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedTaxonomy {
    pub kingdom: String,
    pub class: String,
    pub order: String,
    pub family: String,
    pub common_name: Option<String>,
}

impl ResolvedTaxonomy {
    pub fn unknown() -> Self {
        Self {
            kingdom: UNKNOWN.to_owned(),
            class: UNKNOWN.to_owned(),
            order: UNKNOWN.to_owned(),
            family: UNKNOWN.to_owned(),
            common_name: None,
        }
    }

    fn slot(&mut self, rank: Rank) -> &mut String {
        match rank {
            Rank::Kingdom => &mut self.kingdom,
            Rank::Class => &mut self.class,
            Rank::Order => &mut self.order,
            Rank::Family => &mut self.family,
        }
    }

    pub fn has_animal_class(&self) -> bool {
        ANIMAL_CLASSES.contains(&self.class.as_str())
    }

    /// Inclusive filter: only confidently non-animal rows are dropped.
    pub fn is_retained(&self) -> bool {
        ANIMAL_KINGDOMS.contains(&self.kingdom.as_str())
            || self.has_animal_class()
            || self.kingdom == UNKNOWN
            || self.class == UNKNOWN
    }

    pub fn normalize_kingdom(&mut self) {
        if self.kingdom == UNKNOWN && self.has_animal_class() {
            self.kingdom = "Animalia".to_owned();
        }
    }

    pub fn known_class(&self) -> Option<&str> {
        (self.class != UNKNOWN).then_some(self.class.as_str())
    }
}

/// Parses `"kingdom:Animalia | class:Mammalia | ..."` into a partial record.
pub fn parse_taxon_path(path: &str) -> TaxonomyRecord {
    let mut record = TaxonomyRecord::default();

    for token in path.split('|') {
        let Some((rank, name)) = token.split_once(':') else {
            continue;
        };
        let Some(rank) = Rank::from_token(rank) else {
            continue;
        };
        let name = name.trim();
        if !is_known(name) {
            continue;
        }

        let slot = match rank {
            Rank::Kingdom => &mut record.kingdom,
            Rank::Class => &mut record.class,
            Rank::Order => &mut record.order,
            Rank::Family => &mut record.family,
        };
        if slot.is_none() {
            *slot = Some(name.to_owned());
        }
    }

    record
}

/// Lookup first, then the taxon path, then `"Unknown"`, rank by rank.
pub fn resolve_taxonomy(
    species: &str,
    taxon_path: Option<&str>,
    lookup: &dyn TaxonomyLookup,
) -> ResolvedTaxonomy {
    let looked_up = lookup.lookup(species);
    let from_path = taxon_path
        .filter(|path| !path.trim().is_empty())
        .map(parse_taxon_path);

    let mut resolved = ResolvedTaxonomy::unknown();
    for rank in Rank::ALL {
        let value = looked_up
            .as_ref()
            .and_then(|record| record.rank(rank))
            .or_else(|| from_path.as_ref().and_then(|record| record.rank(rank)));
        if let Some(value) = value {
            *resolved.slot(rank) = value.to_owned();
        }
    }

    resolved.common_name = looked_up
        .as_ref()
        .and_then(|record| record.common_name.as_deref())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned);

    resolved
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn path_tokens_are_trimmed_and_case_insensitive() {
        let record =
            parse_taxon_path("Kingdom: Animalia | phylum:Chordata |CLASS:Aves| family : Corvidae");
        assert_eq!(record.rank(Rank::Kingdom), Some("Animalia"));
        assert_eq!(record.rank(Rank::Class), Some("Aves"));
        assert_eq!(record.rank(Rank::Order), None);
        assert_eq!(record.rank(Rank::Family), Some("Corvidae"));
    }

    #[test]
    fn malformed_tokens_are_skipped() {
        let record = parse_taxon_path("Animalia | class: | :Aves | genus:Corvus");
        assert_eq!(record, TaxonomyRecord::default());
    }

    #[test]
    fn lookup_wins_and_path_fills_missing_ranks() {
        let mut table = HashMap::new();
        table.insert(
            "Corvus corax".to_owned(),
            TaxonomyRecord {
                kingdom: Some("Animalia".into()),
                class: Some("Unknown".into()),
                ..TaxonomyRecord::default()
            },
        );

        let resolved = resolve_taxonomy(
            "Corvus corax",
            Some("kingdom:Plantae | class:Aves | family:Corvidae"),
            &table,
        );
        assert_eq!(resolved.kingdom, "Animalia");
        assert_eq!(resolved.class, "Aves");
        assert_eq!(resolved.order, UNKNOWN);
        assert_eq!(resolved.family, "Corvidae");
    }

    #[test]
    fn total_absence_resolves_to_unknown() {
        let lookup = |_: &str| -> Option<TaxonomyRecord> { None };
        let resolved = resolve_taxonomy("Mystery", None, &lookup);
        assert_eq!(resolved, ResolvedTaxonomy::unknown());
        assert!(resolved.is_retained());
    }

    #[test]
    fn filter_keeps_uncertain_and_drops_confident_non_animals() {
        let mut plant = ResolvedTaxonomy::unknown();
        plant.kingdom = "Plantae".into();
        plant.class = "Magnoliopsida".into();
        assert!(!plant.is_retained());

        let mut plant_unknown_class = plant.clone();
        plant_unknown_class.class = UNKNOWN.into();
        assert!(plant_unknown_class.is_retained());

        let mut fish = ResolvedTaxonomy::unknown();
        fish.class = "Actinopterygii".into();
        assert!(fish.is_retained());
        fish.normalize_kingdom();
        assert_eq!(fish.kingdom, "Animalia");
    }

    #[test]
    fn metazoa_is_retained_under_its_own_name() {
        let mut sponge = ResolvedTaxonomy::unknown();
        sponge.kingdom = "Metazoa".into();
        sponge.class = "Demospongiae".into();
        assert!(sponge.is_retained());
        sponge.normalize_kingdom();
        assert_eq!(sponge.kingdom, "Metazoa");
    }

    #[test]
    fn unknown_kingdom_reptile_is_promoted_to_animalia() {
        let mut viper = ResolvedTaxonomy::unknown();
        viper.class = "Reptilia".into();
        viper.family = "Viperidae".into();
        assert!(viper.is_retained());
        viper.normalize_kingdom();
        assert_eq!(viper.kingdom, "Animalia");
        assert_eq!(viper.family, "Viperidae");
    }

    #[test]
    fn invertebrate_class_does_not_promote_kingdom() {
        let mut insect = ResolvedTaxonomy::unknown();
        insect.class = "Insecta".into();
        assert!(insect.is_retained());
        insect.normalize_kingdom();
        assert_eq!(insect.kingdom, UNKNOWN);
    }
}
