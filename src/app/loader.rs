use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{PipelineError, PipelineResult};
use crate::fetch::{FetchTrigger, PredatorName};
use crate::store::ArtifactStore;
use crate::taxonomy::PreyHierarchy;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    /// The requested predator failed and another predator is shown instead.
    Substituted { requested: String, reason: String },
    /// Refresh failed; the previously stored artifact is shown.
    Stale { reason: String },
}

#[derive(Clone, Debug)]
pub struct LoadedHierarchy {
    pub hierarchy: PreyHierarchy,
    pub shown: String,
    pub notice: Option<Notice>,
}

impl LoadedHierarchy {
    pub fn title(&self) -> String {
        match &self.notice {
            None => self.hierarchy.name.clone(),
            Some(Notice::Substituted { requested, .. }) => format!(
                "{} (substitute: no data for {requested})",
                self.hierarchy.name
            ),
            Some(Notice::Stale { .. }) => format!("{} (cached, refresh failed)", self.hierarchy.name),
        }
    }
}

pub struct Loader {
    store: ArtifactStore,
    fetcher: Arc<dyn FetchTrigger>,
    fallback: Option<String>,
}

impl Loader {
    pub fn new(store: ArtifactStore, fetcher: Arc<dyn FetchTrigger>, fallback: Option<String>) -> Self {
        Self {
            store,
            fetcher,
            fallback,
        }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Reads the stored hierarchy, fetching first when `refresh` is set or
    /// nothing is stored. Failures fall back to the default predator with a
    /// visible notice; invalid names never reach the fetch process.
    pub fn load(&self, predator: &str, refresh: bool) -> PipelineResult<LoadedHierarchy> {
        let name = PredatorName::parse(predator)?;

        let error = match self.load_requested(&name, refresh) {
            Ok(loaded) => return Ok(loaded),
            Err(error) => error,
        };

        let Some(fallback) = self
            .fallback
            .as_deref()
            .filter(|fallback| !fallback.eq_ignore_ascii_case(name.as_str()))
        else {
            return Err(error);
        };

        match self.store.read(fallback) {
            Ok(hierarchy) => {
                warn!(requested = %name, fallback, %error, "showing fallback predator");
                Ok(LoadedHierarchy {
                    hierarchy,
                    shown: fallback.to_owned(),
                    notice: Some(Notice::Substituted {
                        requested: name.to_string(),
                        reason: error.to_string(),
                    }),
                })
            }
            Err(fallback_error) => {
                warn!(fallback, error = %fallback_error, "fallback predator unavailable");
                Err(error)
            }
        }
    }

    fn load_requested(&self, name: &PredatorName, refresh: bool) -> PipelineResult<LoadedHierarchy> {
        let predator = name.as_str();

        if !refresh && self.store.contains(predator) {
            info!(%name, "using stored hierarchy");
            return self.stored(predator, None);
        }

        match self.fetcher.trigger(name) {
            Ok(_) => self.stored(predator, None),
            Err(error @ (PipelineError::Timeout { .. } | PipelineError::Upstream { .. }))
                if self.store.contains(predator) =>
            {
                warn!(%name, %error, "refresh failed, keeping stored hierarchy");
                self.stored(
                    predator,
                    Some(Notice::Stale {
                        reason: error.to_string(),
                    }),
                )
            }
            Err(error) => Err(error),
        }
    }

    fn stored(&self, predator: &str, notice: Option<Notice>) -> PipelineResult<LoadedHierarchy> {
        Ok(LoadedHierarchy {
            hierarchy: self.store.read(predator)?,
            shown: predator.to_owned(),
            notice,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::time::Duration;

    use tempfile::TempDir;

    use super::*;
    use crate::taxonomy::{FamilyNode, InteractionType, KingdomNode, SpeciesLeaf};

    enum Behaviour {
        Write(PreyHierarchy),
        Fail(fn(&str) -> PipelineError),
    }

    struct FakeFetcher {
        store: ArtifactStore,
        behaviour: Behaviour,
        calls: Mutex<Vec<String>>,
    }

    impl FetchTrigger for FakeFetcher {
        fn trigger(&self, predator: &PredatorName) -> PipelineResult<PathBuf> {
            self.calls.lock().unwrap().push(predator.to_string());
            match &self.behaviour {
                Behaviour::Write(hierarchy) => self.store.write(predator.as_str(), hierarchy),
                Behaviour::Fail(make) => Err(make(predator.as_str())),
            }
        }
    }

    fn tree(name: &str) -> PreyHierarchy {
        PreyHierarchy {
            name: name.to_owned(),
            children: vec![KingdomNode {
                name: "Animalia".into(),
                children: vec![FamilyNode {
                    name: "Cervidae".into(),
                    class: Some("Mammalia".into()),
                    children: vec![SpeciesLeaf {
                        name: "Capreolus capreolus (Capreolus capreolus)".into(),
                        value: 3,
                        interaction_type: InteractionType::PreysOn,
                        class: Some("Mammalia".into()),
                    }],
                }],
            }],
        }
    }

    fn setup(behaviour: Behaviour) -> (TempDir, Arc<FakeFetcher>, Loader) {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        let fetcher = Arc::new(FakeFetcher {
            store: store.clone(),
            behaviour,
            calls: Mutex::new(Vec::new()),
        });
        let loader = Loader::new(store, fetcher.clone(), Some("Canis lupus".to_owned()));
        (dir, fetcher, loader)
    }

    fn not_found(predator: &str) -> PipelineError {
        PipelineError::NoDataFound {
            predator: predator.to_owned(),
        }
    }

    fn timeout(predator: &str) -> PipelineError {
        PipelineError::Timeout {
            predator: predator.to_owned(),
            timeout: Duration::from_secs(600),
        }
    }

    #[test]
    fn stored_artifact_skips_fetch_unless_refreshing() {
        let (_dir, fetcher, loader) = setup(Behaviour::Write(tree("Lynx (Lynx lynx)")));
        loader.store().write("Lynx lynx", &tree("Old (Lynx lynx)")).unwrap();

        let cached = loader.load("Lynx lynx", false).unwrap();
        assert_eq!(cached.hierarchy.name, "Old (Lynx lynx)");
        assert!(fetcher.calls.lock().unwrap().is_empty());

        let fresh = loader.load("Lynx lynx", true).unwrap();
        assert_eq!(fresh.title(), "Lynx (Lynx lynx)");
        assert_eq!(fetcher.calls.lock().unwrap().as_slice(), ["Lynx lynx"]);
    }

    #[test]
    fn invalid_name_never_fetches_or_falls_back() {
        let (_dir, fetcher, loader) = setup(Behaviour::Fail(not_found));
        loader.store().write("Canis lupus", &tree("Gray wolf (Canis lupus)")).unwrap();

        let error = loader.load("Lynx; rm -rf ~", true).unwrap_err();
        assert!(matches!(error, PipelineError::Validation { .. }));
        assert!(fetcher.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn failed_fetch_shows_labelled_fallback() {
        let (_dir, _fetcher, loader) = setup(Behaviour::Fail(not_found));
        loader.store().write("Canis lupus", &tree("Gray wolf (Canis lupus)")).unwrap();

        let loaded = loader.load("Lynx lynx", false).unwrap();
        assert_eq!(loaded.shown, "Canis lupus");
        assert!(matches!(
            &loaded.notice,
            Some(Notice::Substituted { requested, .. }) if requested == "Lynx lynx"
        ));
        assert!(loaded.title().contains("substitute"));
        assert!(loaded.title().contains("Lynx lynx"));
    }

    #[test]
    fn failed_fetch_without_fallback_is_explicit_error() {
        let (_dir, _fetcher, loader) = setup(Behaviour::Fail(timeout));
        let error = loader.load("Lynx lynx", false).unwrap_err();
        assert!(matches!(error, PipelineError::Timeout { .. }));
    }

    #[test]
    fn timed_out_refresh_keeps_stored_copy() {
        let (_dir, _fetcher, loader) = setup(Behaviour::Fail(timeout));
        loader.store().write("Lynx lynx", &tree("Lynx (Lynx lynx)")).unwrap();

        let loaded = loader.load("Lynx lynx", true).unwrap();
        assert_eq!(loaded.shown, "Lynx lynx");
        assert!(matches!(loaded.notice, Some(Notice::Stale { .. })));
    }

    #[test]
    fn fallback_predator_failing_itself_is_an_error() {
        let (_dir, _fetcher, loader) = setup(Behaviour::Fail(not_found));
        let error = loader.load("Canis lupus", true).unwrap_err();
        assert!(matches!(error, PipelineError::NoDataFound { .. }));
    }
}
