use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{PipelineError, PipelineResult};
use crate::taxonomy::PreyHierarchy;
use crate::util::{artifact_file_name, predator_from_file_name};

/// Directory of `<Predator>_prey_hierarchy.json` artifacts.
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, predator: &str) -> PathBuf {
        self.dir.join(artifact_file_name(predator))
    }

    pub fn contains(&self, predator: &str) -> bool {
        self.path_for(predator).is_file()
    }

    /// Missing artifacts surface as [`PipelineError::NoDataFound`].
    pub fn read(&self, predator: &str) -> PipelineResult<PreyHierarchy> {
        let path = self.path_for(predator);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                return Err(PipelineError::NoDataFound {
                    predator: predator.to_owned(),
                });
            }
            Err(error) => return Err(PipelineError::io(path, error)),
        };

        serde_json::from_str(&raw)
            .map_err(|error| PipelineError::json(path.display().to_string(), error))
    }

    /// Writes through a sibling temp file so readers never see a partial artifact.
    pub fn write(&self, predator: &str, hierarchy: &PreyHierarchy) -> PipelineResult<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|error| PipelineError::io(&self.dir, error))?;

        let path = self.path_for(predator);
        let tmp = path.with_extension(format!("json.{}.tmp", std::process::id()));
        let body = serde_json::to_vec_pretty(hierarchy)
            .map_err(|error| PipelineError::json(format!("hierarchy for {predator}"), error))?;

        fs::write(&tmp, body).map_err(|error| PipelineError::io(&tmp, error))?;
        fs::rename(&tmp, &path).map_err(|error| PipelineError::io(&path, error))?;
        debug!(path = %path.display(), "wrote hierarchy artifact");
        Ok(path)
    }

    pub fn remove(&self, predator: &str) -> PipelineResult<()> {
        let path = self.path_for(predator);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "removed stale hierarchy artifact");
                Ok(())
            }
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(PipelineError::io(path, error)),
        }
    }

    pub fn list_predators(&self) -> Vec<String> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(error) => {
                if error.kind() != ErrorKind::NotFound {
                    warn!(dir = %self.dir.display(), %error, "cannot list hierarchy artifacts");
                }
                return Vec::new();
            }
        };

        let mut predators = entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let name = entry.file_name();
                predator_from_file_name(name.to_str()?)
            })
            .collect::<Vec<_>>();
        predators.sort();
        predators.dedup();
        predators
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::taxonomy::{FamilyNode, InteractionType, KingdomNode, SpeciesLeaf};

    fn hierarchy() -> PreyHierarchy {
        PreyHierarchy {
            name: "Barn owl (Tyto alba)".into(),
            children: vec![KingdomNode {
                name: "Animalia".into(),
                children: vec![FamilyNode {
                    name: "Cricetidae".into(),
                    class: Some("Mammalia".into()),
                    children: vec![SpeciesLeaf {
                        name: "Microtus agrestis (Microtus agrestis)".into(),
                        value: 11,
                        interaction_type: InteractionType::PreysOn,
                        class: Some("Mammalia".into()),
                    }],
                }],
            }],
        }
    }

    #[test]
    fn write_then_read_and_list() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path().join("data"));

        assert!(store.list_predators().is_empty());
        let path = store.write("Tyto alba", &hierarchy()).unwrap();
        assert!(path.ends_with("Tyto_alba_prey_hierarchy.json"));
        assert!(store.contains("Tyto alba"));
        assert_eq!(store.read("Tyto alba").unwrap(), hierarchy());
        assert_eq!(store.list_predators(), vec!["Tyto alba".to_owned()]);
    }

    #[test]
    fn missing_artifact_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        assert!(matches!(
            store.read("Lynx lynx"),
            Err(PipelineError::NoDataFound { .. })
        ));
        store.remove("Lynx lynx").unwrap();
    }

    #[test]
    fn corrupt_artifact_is_json_error() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        fs::write(store.path_for("Lynx lynx"), "{\"name\": 3}").unwrap();
        assert!(matches!(store.read("Lynx lynx"), Err(PipelineError::Json { .. })));

        store.remove("Lynx lynx").unwrap();
        assert!(!store.contains("Lynx lynx"));
    }
}
