//! Delta backend: commit history as an arena of transaction nodes.
//!
//! Each commit stores only its changes relative to the parent commit.
//! Nodes are addressed by integer id with the parent held as an index, so
//! the history tree carries no reference cycles and no per-node
//! allocation beyond the delta slice.
//!
//! Arena indices double as version numbers: a child is always appended
//! after its parent, so indices increase strictly along any chain. The
//! common-ancestor walk below relies on exactly that — repeatedly stepping
//! whichever side has the larger index must make progress and terminate.

use std::collections::BTreeMap;

use im::OrdMap;

use super::{set_entry, DiffEntry, MapVersion};

/// One changed entry of one commit: `key` went from `from` to `to`.
pub(crate) struct MapDelta<K, V> {
    pub(crate) key: K,
    pub(crate) from: V,
    pub(crate) to: V,
}

/// A commit node: the changes since `parent`.
struct MapTransaction<K, V> {
    /// Arena index of the parent commit; `None` only for the first commit.
    parent: Option<u64>,
    /// Changed entries, distinct keys.
    deltas: Box<[MapDelta<K, V>]>,
}

/// Append-only arena of commit nodes.
pub(crate) struct DeltaStore<K, V> {
    transactions: Vec<MapTransaction<K, V>>,
}

impl<K: Ord + Clone, V: Clone + Eq> DeltaStore<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            transactions: Vec::new(),
        }
    }

    pub(crate) fn contains(&self, version: MapVersion) -> bool {
        (version.0 as usize) < self.transactions.len()
    }

    pub(crate) fn commit(
        &mut self,
        parent: Option<MapVersion>,
        deltas: Vec<MapDelta<K, V>>,
    ) -> MapVersion {
        let index = self.transactions.len() as u64;
        self.transactions.push(MapTransaction {
            parent: parent.map(|v| v.0),
            deltas: deltas.into_boxed_slice(),
        });
        MapVersion(index)
    }

    fn parent_of(&self, index: u64) -> u64 {
        match self.transactions[index as usize].parent {
            Some(parent) => parent,
            // Index 0 is the only parentless node and also the smallest
            // index, so the ancestor walk never steps past it.
            None => unreachable!("walked past the root transaction"),
        }
    }

    /// Collect the chains from `a` and `b` down to (excluding) their
    /// lowest common ancestor, in walk order.
    fn chains_to_common_ancestor(&self, a: u64, b: u64) -> (Vec<u64>, Vec<u64>) {
        let mut from_a = Vec::new();
        let mut from_b = Vec::new();
        let (mut x, mut y) = (a, b);
        while x != y {
            if x > y {
                from_a.push(x);
                x = self.parent_of(x);
            } else {
                from_b.push(y);
                y = self.parent_of(y);
            }
        }
        (from_a, from_b)
    }

    /// Mutate `content` (currently at version `from`) into the content of
    /// version `to`: undo deltas up to the common ancestor, then apply
    /// deltas back down the other chain.
    pub(crate) fn replay(
        &self,
        from: MapVersion,
        to: MapVersion,
        content: &mut OrdMap<K, V>,
        default: &V,
    ) {
        let (undo, redo) = self.chains_to_common_ancestor(from.0, to.0);
        for &index in &undo {
            for delta in self.transactions[index as usize].deltas.iter() {
                set_entry(content, default, delta.key.clone(), delta.from.clone());
            }
        }
        for &index in redo.iter().rev() {
            for delta in self.transactions[index as usize].deltas.iter() {
                set_entry(content, default, delta.key.clone(), delta.to.clone());
            }
        }
    }

    /// The minimal changed-entry set between `from` and `to`.
    ///
    /// Folds the delta sequence along the ancestor walk per key, keeping
    /// the first old value and the last new one; keys whose values net out
    /// are dropped.
    pub(crate) fn diff(&self, from: MapVersion, to: MapVersion) -> Vec<DiffEntry<K, V>> {
        let (undo, redo) = self.chains_to_common_ancestor(from.0, to.0);
        let mut folded: BTreeMap<K, (V, V)> = BTreeMap::new();
        let mut fold = |key: &K, old: &V, new: &V| {
            folded
                .entry(key.clone())
                .and_modify(|entry| entry.1 = new.clone())
                .or_insert_with(|| (old.clone(), new.clone()));
        };
        for &index in &undo {
            for delta in self.transactions[index as usize].deltas.iter() {
                fold(&delta.key, &delta.to, &delta.from);
            }
        }
        for &index in redo.iter().rev() {
            for delta in self.transactions[index as usize].deltas.iter() {
                fold(&delta.key, &delta.from, &delta.to);
            }
        }
        folded
            .into_iter()
            .filter(|(_, (old, new))| old != new)
            .map(|(key, (from, to))| DiffEntry { key, from, to })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_chain() -> DeltaStore<u32, i64> {
        let mut store = DeltaStore::new();
        // v0: {1: 10}
        let v0 = store.commit(None, vec![MapDelta { key: 1, from: 0, to: 10 }]);
        // v1: {1: 10, 2: 20}
        let _v1 = store.commit(Some(v0), vec![MapDelta { key: 2, from: 0, to: 20 }]);
        store
    }

    #[test]
    fn contains_tracks_arena_bounds() {
        let store = store_with_chain();
        assert!(store.contains(MapVersion(0)));
        assert!(store.contains(MapVersion(1)));
        assert!(!store.contains(MapVersion(2)));
    }

    #[test]
    fn ancestor_walk_meets_at_fork_point() {
        let mut store: DeltaStore<u32, i64> = DeltaStore::new();
        let root = store.commit(None, vec![]);
        let a1 = store.commit(Some(root), vec![]);
        let a2 = store.commit(Some(a1), vec![]);
        let b1 = store.commit(Some(root), vec![]);

        let (from_a, from_b) = store.chains_to_common_ancestor(a2.0, b1.0);
        assert_eq!(from_a, vec![a2.0, a1.0]);
        assert_eq!(from_b, vec![b1.0]);
    }

    #[test]
    fn replay_moves_content_between_versions() {
        let store = store_with_chain();
        let mut content: OrdMap<u32, i64> = OrdMap::new();
        content.insert(1, 10);
        content.insert(2, 20);

        store.replay(MapVersion(1), MapVersion(0), &mut content, &0);
        assert_eq!(content.len(), 1);
        assert_eq!(content.get(&1), Some(&10));

        store.replay(MapVersion(0), MapVersion(1), &mut content, &0);
        assert_eq!(content.get(&2), Some(&20));
    }

    #[test]
    fn diff_folds_multi_hop_chains_per_key() {
        let mut store: DeltaStore<u32, i64> = DeltaStore::new();
        let v0 = store.commit(None, vec![MapDelta { key: 1, from: 0, to: 1 }]);
        let v1 = store.commit(Some(v0), vec![MapDelta { key: 1, from: 1, to: 2 }]);
        let v2 = store.commit(Some(v1), vec![MapDelta { key: 1, from: 2, to: 3 }]);

        let entries = store.diff(v0, v2);
        assert_eq!(entries, vec![DiffEntry { key: 1, from: 1, to: 3 }]);
    }
}
