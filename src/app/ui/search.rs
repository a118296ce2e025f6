use eframe::egui::{self, Key, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::store::ArtifactStore;

const MAX_SUGGESTIONS: usize = 8;

const BUILT_IN_PREDATORS: &[&str] = &[
    "Canis lupus",
    "Vulpes vulpes",
    "Lynx lynx",
    "Ursus arctos",
    "Panthera leo",
    "Lutra lutra",
    "Bubo bubo",
    "Falco peregrinus",
    "Accipiter gentilis",
    "Apis mellifera",
];

#[derive(Debug, PartialEq, Eq)]
pub(in crate::app) struct SearchRequest {
    pub predator: String,
    /// Fetch even when a stored hierarchy exists.
    pub refresh: bool,
}

pub(in crate::app) struct SearchBox {
    query: String,
    candidates: Vec<String>,
}

impl SearchBox {
    pub(in crate::app) fn new(cached: Vec<String>) -> Self {
        Self {
            query: String::new(),
            candidates: merge_candidates(cached),
        }
    }

    /// Picks up newly stored artifacts after a load.
    pub(in crate::app) fn remember(&mut self, predator: &str, store: &ArtifactStore) {
        let mut cached = store.list_predators();
        cached.push(predator.to_owned());
        self.candidates = merge_candidates(cached);
    }

    pub(in crate::app) fn suggestions_for(&self, query: &str) -> Vec<&str> {
        suggest(&self.candidates, query)
    }

    pub(in crate::app) fn show(&mut self, ui: &mut Ui) -> Option<SearchRequest> {
        let mut request = None;

        let response = ui.add(
            egui::TextEdit::singleline(&mut self.query)
                .hint_text("Predator, e.g. Canis lupus")
                .desired_width(220.0),
        );
        let submitted = response.lost_focus() && ui.input(|input| input.key_pressed(Key::Enter));

        if ui.button("Show").clicked() || submitted {
            request = self.request(false);
        }
        if ui
            .button("Fetch")
            .on_hover_text("Re-run the data fetch for this predator")
            .clicked()
        {
            request = self.request(true);
        }

        for suggestion in self.suggestions_for(&self.query) {
            if ui.small_button(suggestion).clicked() {
                request = Some(SearchRequest {
                    predator: suggestion.to_owned(),
                    refresh: false,
                });
            }
        }

        if request.is_some() {
            self.query.clear();
        }
        request
    }

    fn request(&self, refresh: bool) -> Option<SearchRequest> {
        let predator = self.query.trim();
        (!predator.is_empty()).then(|| SearchRequest {
            predator: predator.to_owned(),
            refresh,
        })
    }
}

fn merge_candidates(cached: Vec<String>) -> Vec<String> {
    let mut candidates = cached;
    candidates.extend(BUILT_IN_PREDATORS.iter().map(|name| (*name).to_owned()));
    candidates.sort();
    candidates.dedup();
    candidates
}

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

/// Best matches first, ties alphabetical; empty query suggests nothing.
fn suggest<'a>(candidates: &'a [String], query: &str) -> Vec<&'a str> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default();
    let mut scored = candidates
        .iter()
        .filter_map(|candidate| {
            fuzzy_match_score(&matcher, candidate, query).map(|score| (score, candidate.as_str()))
        })
        .collect::<Vec<_>>();
    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, candidate)| candidate)
        .collect()
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::taxonomy::{FamilyNode, InteractionType, KingdomNode, PreyHierarchy, SpeciesLeaf};

    #[test]
    fn suggestions_rank_closest_first() {
        let candidates = merge_candidates(vec!["Lynx pardinus".to_owned()]);
        let suggestions = suggest(&candidates, "lynx");
        assert_eq!(suggestions.len(), 2);
        assert!(suggestions.contains(&"Lynx lynx"));
        assert!(suggestions.contains(&"Lynx pardinus"));

        assert_eq!(suggest(&candidates, "canis").first(), Some(&"Canis lupus"));
    }

    #[test]
    fn suggestions_are_capped_and_need_a_query() {
        let many = (0..20).map(|index| format!("Sorex {index}")).collect();
        let candidates = merge_candidates(many);
        assert_eq!(suggest(&candidates, "sorex").len(), MAX_SUGGESTIONS);
        assert!(suggest(&candidates, "   ").is_empty());
        assert!(suggest(&candidates, "qqqzzz").is_empty());
    }

    #[test]
    fn remembered_predators_become_candidates() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        let hierarchy = PreyHierarchy {
            name: "Stoat (Mustela erminea)".into(),
            children: vec![KingdomNode {
                name: "Animalia".into(),
                children: vec![FamilyNode {
                    name: "Muridae".into(),
                    class: Some("Mammalia".into()),
                    children: vec![SpeciesLeaf {
                        name: "Apodemus sylvaticus (Apodemus sylvaticus)".into(),
                        value: 5,
                        interaction_type: InteractionType::PreysOn,
                        class: None,
                    }],
                }],
            }],
        };
        store.write("Mustela erminea", &hierarchy).unwrap();

        let mut search = SearchBox::new(Vec::new());
        assert!(suggest(&search.candidates, "mustela").is_empty());
        search.remember("Meles meles", &store);
        assert_eq!(suggest(&search.candidates, "mustela"), vec!["Mustela erminea"]);
        assert_eq!(suggest(&search.candidates, "meles").first(), Some(&"Meles meles"));
    }
}
