use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid predator name {input:?}: {reason}")]
    Validation { input: String, reason: String },

    #[error("no prey interactions found for {predator}")]
    NoDataFound { predator: String },

    #[error("fetch for {predator} exceeded {}s", timeout.as_secs())]
    Timeout { predator: String, timeout: Duration },

    #[error("fetch process failed for {predator}: {message}")]
    Upstream { predator: String, message: String },

    #[error("cannot render hierarchy: {0}")]
    Render(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    /// Short category used in status lines and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::NoDataFound { .. } => "not found",
            Self::Timeout { .. } => "timeout",
            Self::Upstream { .. } => "upstream",
            Self::Render(_) => "render",
            Self::Io { .. } => "io",
            Self::Json { .. } => "json",
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
