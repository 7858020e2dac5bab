use thiserror::Error;

/// Everything that can go wrong inside the match core.
///
/// Only `MatchSetup` is fatal, and only from `MatchManager::start_match`.
/// The other kinds are recovered from where they occur and surface as
/// log records (or a return value the caller is free to ignore).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// A malformed or out-of-range input event. Dropped without mutating state.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Tactic data failed validation. The default formation is used instead.
    #[error("malformed tactic data for '{name}': {reason}")]
    MalformedTacticData { name: String, reason: String },

    /// The solver hit its step cap before the field came to rest.
    #[error("simulation did not settle within {steps} steps")]
    SimulationTimeout { steps: u32 },

    /// A named configuration parameter was absent; its default was used.
    #[error("configuration parameter '{0}' missing, using default")]
    ConfigurationMissing(String),

    /// The match could not be constructed. Nothing has been ticked.
    #[error("cannot start match: {0}")]
    MatchSetup(String),
}

impl CoreError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        CoreError::InvalidInput(reason.into())
    }

    pub fn malformed_tactic(name: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::MalformedTacticData {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Whether the match can carry on after this error.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, CoreError::MatchSetup(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_setup_is_fatal() {
        assert!(CoreError::invalid_input("bad index").is_recoverable());
        assert!(CoreError::SimulationTimeout { steps: 10 }.is_recoverable());
        assert!(CoreError::ConfigurationMissing("fixed_dt".into()).is_recoverable());
        assert!(!CoreError::MatchSetup("no field".into()).is_recoverable());
    }

    #[test]
    fn messages_name_the_problem() {
        let err = CoreError::malformed_tactic("custom1", "expected 5 offsets, got 4");
        assert_eq!(
            err.to_string(),
            "malformed tactic data for 'custom1': expected 5 offsets, got 4"
        );
    }
}
