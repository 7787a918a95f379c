//! `EquivalenceClassStore`: visited states keyed by state code.
//!
//! Every committed state is submitted with its 32-bit code. The first
//! state of a code founds a new class; later states with the same code are
//! duplicates of that class, classified against the founding
//! representative by the injected [`IsomorphismPolicy`]. Whether a
//! duplicate is then pruned is the strategy's decision, keyed on the
//! class — the classification is informational.

use std::collections::HashMap;

use quarry_coder::classify::{classify, IsomorphismPolicy, StateEquivalence, UndecidedPolicy};
use quarry_store::model::ModelVersion;

/// Result of submitting one committed state.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Submission {
    /// The state founded a new equivalence class.
    New,
    /// The state's code matches an existing class.
    Duplicate {
        /// The class's founding state.
        representative: ModelVersion,
        /// How the candidate relates to the representative.
        equivalence: StateEquivalence,
    },
}

/// Index of visited equivalence classes.
pub struct EquivalenceClassStore {
    classes: HashMap<u32, Vec<ModelVersion>>,
    policy: Box<dyn IsomorphismPolicy>,
}

impl EquivalenceClassStore {
    /// A store consulting `policy` for equal-code candidates.
    #[must_use]
    pub fn new(policy: Box<dyn IsomorphismPolicy>) -> Self {
        Self {
            classes: HashMap::new(),
            policy,
        }
    }

    /// A store with the default never-confirming policy.
    #[must_use]
    pub fn with_undecided_policy() -> Self {
        Self::new(Box::new(UndecidedPolicy))
    }

    /// Replace the injected policy.
    pub fn set_policy(&mut self, policy: Box<dyn IsomorphismPolicy>) {
        self.policy = policy;
    }

    /// Submit a committed state under its code.
    pub fn submit(&mut self, code: u32, version: ModelVersion) -> Submission {
        if let Some(members) = self.classes.get_mut(&code) {
            let representative = members[0].clone();
            let equivalence =
                classify(code, code, &version, &representative, self.policy.as_ref());
            members.push(version);
            return Submission::Duplicate {
                representative,
                equivalence,
            };
        }
        self.classes.insert(code, vec![version]);
        Submission::New
    }

    /// Number of distinct classes seen.
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Total states submitted across all classes.
    #[must_use]
    pub fn state_count(&self) -> usize {
        self.classes.values().map(Vec::len).sum()
    }
}
