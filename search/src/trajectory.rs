//! `Trajectory`: the version path from the initial model to a state.
//!
//! Strategies resume a queued branch by restoring the trajectory's last
//! version; the prefix exists so solutions can be replayed and traced.

use quarry_store::model::ModelVersion;

/// Ordered sequence of committed versions, initial state first.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Trajectory(Vec<ModelVersion>);

impl Trajectory {
    /// A trajectory sitting at the initial version.
    #[must_use]
    pub fn new(initial: ModelVersion) -> Self {
        Self(vec![initial])
    }

    /// The version this trajectory currently points at.
    #[must_use]
    pub fn last(&self) -> &ModelVersion {
        // The vec is never empty: construction seeds it and pop() refuses
        // to remove the initial version.
        &self.0[self.0.len() - 1]
    }

    /// Number of fired activations along the path (initial state = 0).
    #[must_use]
    pub fn depth(&self) -> u32 {
        u32::try_from(self.0.len() - 1).unwrap_or(u32::MAX)
    }

    /// Append a newly committed version.
    pub fn push(&mut self, version: ModelVersion) {
        self.0.push(version);
    }

    /// Drop the last version and return it, or `None` at the initial
    /// state (the initial version is never removed).
    pub fn pop(&mut self) -> Option<ModelVersion> {
        if self.0.len() > 1 {
            self.0.pop()
        } else {
            None
        }
    }

    /// A child trajectory extending this one by `version`.
    #[must_use]
    pub fn child(&self, version: ModelVersion) -> Self {
        let mut versions = self.0.clone();
        versions.push(version);
        Self(versions)
    }

    /// All versions from the initial state to the current one.
    #[must_use]
    pub fn versions(&self) -> &[ModelVersion] {
        &self.0
    }
}
