use std::fmt;

use crate::error::{PipelineError, PipelineResult};

/// Predator name that is safe to hand to the fetch process.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PredatorName(String);

impl PredatorName {
    /// Accepts `[A-Za-z0-9 .]` only, trimmed and non-empty.
    pub fn parse(input: &str) -> PipelineResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(PipelineError::Validation {
                input: input.to_owned(),
                reason: "name is empty".to_owned(),
            });
        }

        if let Some(bad) = trimmed
            .chars()
            .find(|ch| !(ch.is_ascii_alphanumeric() || *ch == ' ' || *ch == '.'))
        {
            return Err(PipelineError::Validation {
                input: input.to_owned(),
                reason: format!("character {bad:?} is not allowed"),
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PredatorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
