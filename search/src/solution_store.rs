//! `SolutionStore`: bounded collection of found solutions.
//!
//! Recording is exactly-once per version, so revisiting a solution state
//! (which depth-first search does after backtracking) cannot inflate the
//! count. `has_enough_solutions` is the early-stop query the strategies
//! check at every loop boundary.

use std::collections::HashSet;

use quarry_store::model::ModelVersion;

use crate::trajectory::Trajectory;

/// One recorded solution: the state and the path that reached it.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SolutionRecordV1 {
    pub version: ModelVersion,
    pub trajectory: Trajectory,
}

/// Bounded, exactly-once solution collection.
pub struct SolutionStore {
    limit: usize,
    seen: HashSet<ModelVersion>,
    records: Vec<SolutionRecordV1>,
}

impl SolutionStore {
    /// A store that accepts at most `limit` solutions.
    #[must_use]
    pub fn bounded(limit: usize) -> Self {
        Self {
            limit,
            seen: HashSet::new(),
            records: Vec::new(),
        }
    }

    /// A store with no practical bound.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::bounded(usize::MAX)
    }

    /// Record a solution. Returns `true` if it was newly recorded; a
    /// version seen before, or a store already at its bound, records
    /// nothing.
    pub fn record(&mut self, version: ModelVersion, trajectory: Trajectory) -> bool {
        if self.has_enough_solutions() || !self.seen.insert(version.clone()) {
            return false;
        }
        self.records.push(SolutionRecordV1 {
            version,
            trajectory,
        });
        true
    }

    /// Whether the configured bound is reached.
    #[must_use]
    pub fn has_enough_solutions(&self) -> bool {
        self.records.len() >= self.limit
    }

    /// The recorded solutions, in recording order.
    #[must_use]
    pub fn solutions(&self) -> &[SolutionRecordV1] {
        &self.records
    }

    /// Number of recorded solutions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing was recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_store::map::StoreStrategy;
    use quarry_store::model::Model;
    use quarry_store::symbol::{Symbol, SymbolId};
    use quarry_store::tuple::{Tuple, Value};

    /// Distinct versions along one commit chain.
    fn versions(n: i64) -> Vec<ModelVersion> {
        let mut model = Model::new(vec![Symbol::counter("n")], StoreStrategy::Delta);
        (1..=n)
            .map(|i| {
                model.put(SymbolId(0), Tuple::empty(), Value::Int(i));
                model.commit()
            })
            .collect()
    }

    #[test]
    fn records_until_the_bound() {
        let chain = versions(3);
        let mut store = SolutionStore::bounded(2);
        assert!(store.record(chain[0].clone(), Trajectory::new(chain[0].clone())));
        assert!(!store.has_enough_solutions());
        assert!(store.record(chain[1].clone(), Trajectory::new(chain[1].clone())));
        assert!(store.has_enough_solutions());
        assert!(!store.record(chain[2].clone(), Trajectory::new(chain[2].clone())));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn same_version_records_once() {
        let chain = versions(1);
        let mut store = SolutionStore::unbounded();
        let v = chain[0].clone();
        assert!(store.record(v.clone(), Trajectory::new(v.clone())));
        assert!(!store.record(v.clone(), Trajectory::new(v)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn solutions_keep_recording_order() {
        let chain = versions(2);
        let mut store = SolutionStore::unbounded();
        store.record(chain[1].clone(), Trajectory::new(chain[1].clone()));
        store.record(chain[0].clone(), Trajectory::new(chain[0].clone()));
        let recorded: Vec<_> = store.solutions().iter().map(|s| s.version.clone()).collect();
        assert_eq!(recorded[0], chain[1]);
        assert_eq!(recorded[1], chain[0]);
    }
}
