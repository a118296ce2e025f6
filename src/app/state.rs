use std::fmt::Display;

use tracing::debug;

pub enum Phase<T> {
    Idle,
    Fetching { predator: String },
    Loaded(T),
    Failed { predator: String, error: String },
}

/// Load state keyed by selection sequence: only the latest selection may
/// change the phase, whatever order the workers finish in.
pub struct LoadMachine<T> {
    latest: u64,
    phase: Phase<T>,
}

impl<T> Default for LoadMachine<T> {
    fn default() -> Self {
        Self {
            latest: 0,
            phase: Phase::Idle,
        }
    }
}

impl<T> LoadMachine<T> {
    pub fn phase(&self) -> &Phase<T> {
        &self.phase
    }

    pub fn phase_mut(&mut self) -> &mut Phase<T> {
        &mut self.phase
    }

    #[cfg(test)]
    pub fn is_fetching(&self) -> bool {
        matches!(self.phase, Phase::Fetching { .. })
    }

    /// Starts a new selection; any earlier in-flight result becomes stale.
    pub fn begin(&mut self, predator: &str) -> u64 {
        self.latest += 1;
        self.phase = Phase::Fetching {
            predator: predator.to_owned(),
        };
        self.latest
    }

    /// Applies a worker result. Returns `false` when it was stale and dropped.
    pub fn finish<E: Display>(&mut self, seq: u64, predator: &str, result: Result<T, E>) -> bool {
        if seq != self.latest {
            debug!(seq, latest = self.latest, predator, "dropping stale load result");
            return false;
        }

        self.phase = match result {
            Ok(value) => Phase::Loaded(value),
            Err(error) => Phase::Failed {
                predator: predator.to_owned(),
                error: error.to_string(),
            },
        };
        true
    }

    /// Fails the current selection, e.g. when its layout cannot be drawn.
    pub fn fail(&mut self, predator: &str, error: impl Display) {
        self.phase = Phase::Failed {
            predator: predator.to_owned(),
            error: error.to_string(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(machine: &LoadMachine<&'static str>) -> Option<&'static str> {
        match machine.phase() {
            Phase::Loaded(value) => Some(*value),
            _ => None,
        }
    }

    #[test]
    fn latest_selection_wins_regardless_of_completion_order() {
        let mut machine = LoadMachine::default();
        let first = machine.begin("Canis lupus");
        let second = machine.begin("Vulpes vulpes");
        assert!(machine.is_fetching());

        assert!(machine.finish::<String>(second, "Vulpes vulpes", Ok("fox")));
        assert!(!machine.finish::<String>(first, "Canis lupus", Ok("wolf")));
        assert_eq!(loaded(&machine), Some("fox"));
    }

    #[test]
    fn stale_failure_does_not_clobber_loaded_view() {
        let mut machine = LoadMachine::default();
        let first = machine.begin("Canis lupus");
        let second = machine.begin("Vulpes vulpes");
        machine.finish::<String>(second, "Vulpes vulpes", Ok("fox"));
        machine.finish(first, "Canis lupus", Err("timed out"));
        assert_eq!(loaded(&machine), Some("fox"));
    }

    #[test]
    fn current_failure_is_visible() {
        let mut machine: LoadMachine<&'static str> = LoadMachine::default();
        let seq = machine.begin("Lynx lynx");
        assert!(machine.finish(seq, "Lynx lynx", Err("no prey interactions found")));
        match machine.phase() {
            Phase::Failed { predator, error } => {
                assert_eq!(predator, "Lynx lynx");
                assert!(error.contains("no prey"));
            }
            _ => panic!("expected failed phase"),
        }
    }
}
