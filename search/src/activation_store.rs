//! `ActivationStore`: untried activations per visited state.
//!
//! Each committed version gets an entry holding the activations not yet
//! fired from it. Taking the last one collapses the entry to a compact
//! `Exhausted` marker — the untried list is released, but revisits still
//! see the state as spent instead of re-enumerating it.

use std::collections::HashMap;

use quarry_store::model::ModelVersion;

use rand::rngs::StdRng;
use rand::Rng;

enum Entry<A> {
    /// Untried activations, in enumeration order.
    Open(Vec<A>),
    /// Everything was tried; the list storage is released.
    Exhausted,
}

/// Per-version untried-activation index.
pub struct ActivationStore<A> {
    entries: HashMap<ModelVersion, Entry<A>>,
}

impl<A: Clone + Eq> ActivationStore<A> {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Ensure `version` has an entry, enumerating its activations on the
    /// first visit. An enumeration that comes back empty records the
    /// state as exhausted outright.
    pub fn visit(&mut self, version: &ModelVersion, enumerate: impl FnOnce() -> Vec<A>) {
        self.entries
            .entry(version.clone())
            .or_insert_with(|| {
                let activations = enumerate();
                if activations.is_empty() {
                    Entry::Exhausted
                } else {
                    Entry::Open(activations)
                }
            });
    }

    /// Take the next untried activation at `version` in enumeration
    /// order, or `None` if the state is exhausted or unvisited.
    pub fn next_untried(&mut self, version: &ModelVersion) -> Option<A> {
        self.take(version, |_| 0)
    }

    /// Take a uniformly random untried activation at `version`.
    pub fn random_untried(&mut self, version: &ModelVersion, rng: &mut StdRng) -> Option<A> {
        self.take(version, |len| rng.gen_range(0..len))
    }

    fn take(&mut self, version: &ModelVersion, pick: impl FnOnce(usize) -> usize) -> Option<A> {
        let entry = self.entries.get_mut(version)?;
        let Entry::Open(untried) = entry else {
            return None;
        };
        let activation = untried.remove(pick(untried.len()));
        if untried.is_empty() {
            *entry = Entry::Exhausted;
        }
        Some(activation)
    }

    /// Untried activations remaining at `version` (0 when exhausted or
    /// unvisited).
    #[must_use]
    pub fn untried_count(&self, version: &ModelVersion) -> usize {
        match self.entries.get(version) {
            Some(Entry::Open(untried)) => untried.len(),
            _ => 0,
        }
    }

    /// Whether every activation at a visited `version` was tried.
    #[must_use]
    pub fn is_exhausted(&self, version: &ModelVersion) -> bool {
        matches!(self.entries.get(version), Some(Entry::Exhausted))
    }
}

impl<A: Clone + Eq> Default for ActivationStore<A> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_store::map::StoreStrategy;
    use quarry_store::model::Model;
    use quarry_store::symbol::{Symbol, SymbolId};
    use quarry_store::tuple::{Tuple, Value};
    use rand::SeedableRng;

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

    fn version(tag: i64) -> ModelVersion {
        versions(tag).pop().unwrap()
    }

    #[test]
    fn first_visit_enumerates_once() {
        let mut store: ActivationStore<u32> = ActivationStore::new();
        let v = version(1);
        let mut calls = 0;
        store.visit(&v, || {
            calls += 1;
            vec![10, 20]
        });
        store.visit(&v, || {
            calls += 1;
            vec![99]
        });
        assert_eq!(calls, 1, "revisit must not re-enumerate");
        assert_eq!(store.untried_count(&v), 2);
    }

    #[test]
    fn activations_come_out_in_order_exactly_once() {
        let mut store: ActivationStore<u32> = ActivationStore::new();
        let v = version(1);
        store.visit(&v, || vec![10, 20, 30]);
        assert_eq!(store.next_untried(&v), Some(10));
        assert_eq!(store.next_untried(&v), Some(20));
        assert!(!store.is_exhausted(&v));
        assert_eq!(store.next_untried(&v), Some(30));
        assert!(store.is_exhausted(&v), "taking the last entry releases it");
        assert_eq!(store.next_untried(&v), None);
    }

    #[test]
    fn empty_enumeration_is_exhausted_immediately() {
        let mut store: ActivationStore<u32> = ActivationStore::new();
        let v = version(1);
        store.visit(&v, Vec::new);
        assert!(store.is_exhausted(&v));
        assert_eq!(store.next_untried(&v), None);
    }

    #[test]
    fn unvisited_states_yield_nothing() {
        let mut store: ActivationStore<u32> = ActivationStore::new();
        let v = version(1);
        assert_eq!(store.next_untried(&v), None);
        assert!(!store.is_exhausted(&v));
    }

    #[test]
    fn random_take_drains_the_same_set() {
        let mut store: ActivationStore<u32> = ActivationStore::new();
        let v = version(1);
        store.visit(&v, || vec![1, 2, 3, 4]);
        let mut rng = StdRng::seed_from_u64(7);
        let mut taken = Vec::new();
        while let Some(a) = store.random_untried(&v, &mut rng) {
            taken.push(a);
        }
        taken.sort_unstable();
        assert_eq!(taken, vec![1, 2, 3, 4]);
        assert!(store.is_exhausted(&v));
    }

    #[test]
    fn entries_are_per_version() {
        let mut store: ActivationStore<u32> = ActivationStore::new();
        let chain = versions(2);
        let (a, b) = (chain[0].clone(), chain[1].clone());
        store.visit(&a, || vec![1]);
        store.visit(&b, || vec![2]);
        assert_eq!(store.next_untried(&a), Some(1));
        assert_eq!(store.untried_count(&b), 1);
    }
}
