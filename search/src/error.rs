//! Typed exploration errors.
//!
//! `ExplorationError` covers pre-flight failures only. Everything that can
//! happen while exploring — constraint violations, depth limits, exhausted
//! activations, duplicates, cancellation — is an ordinary outcome carried
//! by [`crate::outcome::ExplorationOutcome`].

/// Typed failure for pre-flight strategy validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplorationError {
    /// The exploration policy is not runnable as configured.
    InvalidPolicy { detail: String },
}

impl std::fmt::Display for ExplorationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPolicy { detail } => {
                write!(f, "invalid exploration policy: {detail}")
            }
        }
    }
}

impl std::error::Error for ExplorationError {}
