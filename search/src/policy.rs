//! Exploration policy types.

use crate::error::ExplorationError;

/// Budget and pruning configuration shared by all strategies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorationPolicyV1 {
    /// Depth cutoff: no branch grows past this many fired activations.
    pub max_depth: u32,
    /// Stop once this many solutions are recorded.
    pub max_solutions: usize,
    /// Leave a solution state immediately instead of deepening it.
    pub backtrack_on_solution: bool,
    /// Prune states whose state code matches an already-visited class.
    pub prune_isomorphic: bool,
    /// Best-first only: keep descending when the child's fitness equals
    /// the parent's instead of returning to the frontier.
    pub continue_on_equal_fitness: bool,
    /// Best-first worker only: percent chance per step of resuming from a
    /// uniformly random frontier state instead of the best one.
    pub restart_probability_percent: u8,
}

impl ExplorationPolicyV1 {
    /// Validate the policy before a strategy is constructed.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorationError::InvalidPolicy`] when the configuration
    /// cannot drive a run (zero solution budget, probability over 100%).
    pub fn validate(&self) -> Result<(), ExplorationError> {
        if self.max_solutions == 0 {
            return Err(ExplorationError::InvalidPolicy {
                detail: "max_solutions must be at least 1".into(),
            });
        }
        if self.restart_probability_percent > 100 {
            return Err(ExplorationError::InvalidPolicy {
                detail: format!(
                    "restart_probability_percent {} exceeds 100",
                    self.restart_probability_percent
                ),
            });
        }
        Ok(())
    }
}

impl Default for ExplorationPolicyV1 {
    fn default() -> Self {
        Self {
            max_depth: 100,
            max_solutions: 1,
            backtrack_on_solution: true,
            prune_isomorphic: true,
            continue_on_equal_fitness: false,
            restart_probability_percent: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_validates() {
        assert!(ExplorationPolicyV1::default().validate().is_ok());
    }

    #[test]
    fn zero_solution_budget_is_rejected() {
        let policy = ExplorationPolicyV1 {
            max_solutions: 0,
            ..ExplorationPolicyV1::default()
        };
        let err = policy.validate().unwrap_err();
        assert!(
            matches!(err, ExplorationError::InvalidPolicy { .. }),
            "expected InvalidPolicy, got {err:?}"
        );
    }

    #[test]
    fn overfull_restart_probability_is_rejected() {
        let policy = ExplorationPolicyV1 {
            restart_probability_percent: 101,
            ..ExplorationPolicyV1::default()
        };
        assert!(policy.validate().is_err());
    }
}
