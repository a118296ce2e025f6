use std::path::PathBuf;

use tracing::{info, warn};

use crate::error::{PipelineError, PipelineResult};
use crate::store::ArtifactStore;
use crate::taxonomy::{FetchPayload, build_hierarchy};

use super::command::FetchCommand;
use super::validate::PredatorName;

/// Produces or refreshes the hierarchy artifact for a predator.
pub trait FetchTrigger: Send + Sync {
    fn trigger(&self, predator: &PredatorName) -> PipelineResult<PathBuf>;
}

/// Runs the external fetch process, builds the hierarchy and stores it.
#[derive(Clone, Debug)]
pub struct CommandFetcher {
    command: FetchCommand,
    store: ArtifactStore,
}

impl CommandFetcher {
    pub fn new(command: FetchCommand, store: ArtifactStore) -> Self {
        Self { command, store }
    }
}

impl FetchTrigger for CommandFetcher {
    fn trigger(&self, predator: &PredatorName) -> PipelineResult<PathBuf> {
        let raw = self.command.run(predator)?;
        let payload = parse_payload(&raw, predator)?;
        store_payload(&self.store, predator, &payload)
    }
}

pub fn parse_payload(raw: &str, predator: &PredatorName) -> PipelineResult<FetchPayload> {
    let mut payload: FetchPayload = serde_json::from_str(raw)
        .map_err(|error| PipelineError::json(format!("fetch output for {predator}"), error))?;

    if payload.predator.trim().is_empty() {
        payload.predator = predator.to_string();
    } else if payload.predator.trim() != predator.as_str() {
        warn!(
            requested = %predator,
            reported = %payload.predator,
            "fetch process reported a different predator"
        );
    }

    Ok(payload)
}

/// Builds and writes the artifact; on no data the artifact is removed so a
/// stale tree never answers for a species that was not found.
pub fn store_payload(
    store: &ArtifactStore,
    predator: &PredatorName,
    payload: &FetchPayload,
) -> PipelineResult<PathBuf> {
    let built = build_hierarchy(
        predator.as_str(),
        &payload.interactions,
        &payload.taxonomy,
        payload.predator_taxonomy.as_ref(),
    );

    match built {
        Ok(hierarchy) => {
            let path = store.write(predator.as_str(), &hierarchy)?;
            info!(
                %predator,
                leaves = hierarchy.leaf_count(),
                path = %path.display(),
                "hierarchy artifact updated"
            );
            Ok(path)
        }
        Err(error @ PipelineError::NoDataFound { .. }) => {
            store.remove(predator.as_str())?;
            info!(%predator, "no prey interactions found");
            Err(error)
        }
        Err(error) => Err(error),
    }
}
