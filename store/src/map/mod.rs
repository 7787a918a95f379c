//! `VersionedMap`: a branchable persistent key/value container.
//!
//! A versioned map is a total function from keys to values: absent keys
//! read as the map's declared default, and writing the default deletes.
//! `commit()` snapshots the current content and returns an opaque
//! [`MapVersion`]; `restore()` rewinds to *any* previously committed
//! version, not just the parent, so commit history forms a tree.
//!
//! Two interchangeable backends implement the history:
//!
//! - [`StoreStrategy::Delta`] records only the changes of each commit in an
//!   arena of transaction nodes. Memory grows with total changes recorded,
//!   and restore/diff cost is proportional to the edit distance between the
//!   two versions — the property that makes deep backtracking cheap.
//! - [`StoreStrategy::State`] keeps one structurally-shared persistent tree
//!   root per commit (`im::OrdMap`). Restore is O(1); commit cost is
//!   proportional to the entries changed since the last commit.
//!
//! # Contract faults
//!
//! Restoring or diffing a version this map never committed is a contract
//! fault and panics. There is no other failure case at this layer.

mod delta;
mod state;

use std::collections::BTreeMap;

use im::OrdMap;

use delta::DeltaStore;
use state::StateStore;

/// Opaque handle to one committed snapshot of one map.
///
/// Internally an index into the owning backend's append-only version
/// arena; indices are assigned in commit order, so they increase strictly
/// along any parent chain. Handles are only meaningful to the store that
/// produced them.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct MapVersion(pub(crate) u64);

/// Which history backend a map uses.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StoreStrategy {
    /// Per-commit change logs in a transaction-node arena.
    Delta,
    /// One structurally-shared tree root per commit.
    State,
}

/// One changed entry between two committed versions.
///
/// `from` is the value visible at the older end of the diff, `to` at the
/// newer end; both sides are total-function values, so a key absent on one
/// side surfaces as the default.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DiffEntry<K, V> {
    pub key: K,
    pub from: V,
    pub to: V,
}

/// Single-pass forward iterator over the changed entries of a diff.
///
/// Yields entries in key order; exhaustion is `None`, after which the
/// cursor stays exhausted.
pub struct DiffCursor<K, V> {
    entries: std::vec::IntoIter<DiffEntry<K, V>>,
}

impl<K, V> DiffCursor<K, V> {
    fn new(entries: Vec<DiffEntry<K, V>>) -> Self {
        Self {
            entries: entries.into_iter(),
        }
    }

    /// Number of changed entries not yet yielded.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.entries.len()
    }
}

impl<K, V> Iterator for DiffCursor<K, V> {
    type Item = DiffEntry<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }
}

enum Backend<K, V> {
    Delta(DeltaStore<K, V>),
    State(StateStore<K, V>),
}

/// A versioned map: total function from `K` to `V` with branchable commit
/// history.
///
/// The uncommitted view is mutable through [`put`](Self::put); everything
/// committed is immutable forever. See the module docs for the backend
/// trade-offs.
pub struct VersionedMap<K, V> {
    default: V,
    /// Live content: committed base plus uncommitted edits. Never stores
    /// default-valued entries, so iteration is exactly the non-default set.
    current: OrdMap<K, V>,
    /// Version the live content was built from (`None` before any commit).
    base: Option<MapVersion>,
    /// Uncommitted edits: key → value visible at `base`.
    dirty: BTreeMap<K, V>,
    backend: Backend<K, V>,
}

/// Write `value` into `content` under total-function semantics: storing
/// the default removes the entry.
fn set_entry<K: Ord + Clone, V: Clone + Eq>(
    content: &mut OrdMap<K, V>,
    default: &V,
    key: K,
    value: V,
) {
    if value == *default {
        content.remove(&key);
    } else {
        content.insert(key, value);
    }
}

impl<K: Ord + Clone, V: Clone + Eq> VersionedMap<K, V> {
    /// Create an empty map with the given default value and backend.
    #[must_use]
    pub fn new(default: V, strategy: StoreStrategy) -> Self {
        let backend = match strategy {
            StoreStrategy::Delta => Backend::Delta(DeltaStore::new()),
            StoreStrategy::State => Backend::State(StateStore::new()),
        };
        Self {
            default,
            current: OrdMap::new(),
            base: None,
            dirty: BTreeMap::new(),
            backend,
        }
    }

    /// The backend this map was built with.
    #[must_use]
    pub fn strategy(&self) -> StoreStrategy {
        match self.backend {
            Backend::Delta(_) => StoreStrategy::Delta,
            Backend::State(_) => StoreStrategy::State,
        }
    }

    /// The value absent keys read as.
    #[must_use]
    pub fn default_value(&self) -> &V {
        &self.default
    }

    /// Read the value visible for `key` (the default if absent).
    #[must_use]
    pub fn get(&self, key: &K) -> V {
        self.current
            .get(key)
            .cloned()
            .unwrap_or_else(|| self.default.clone())
    }

    /// Write `value` under `key` in the uncommitted view and return the
    /// value that was visible before. Writing the default deletes.
    pub fn put(&mut self, key: K, value: V) -> V {
        let old = self.get(&key);
        self.dirty.entry(key.clone()).or_insert_with(|| old.clone());
        set_entry(&mut self.current, &self.default, key, value);
        old
    }

    /// Iterate exactly the non-default entries, in key order.
    pub fn entries(&self) -> impl Iterator<Item = (&K, &V)> {
        self.current.iter()
    }

    /// Number of non-default entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.current.len()
    }

    /// Whether every key reads as the default.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Whether the uncommitted view differs from the committed base.
    ///
    /// Edits that restore a key to its base value do not count.
    #[must_use]
    pub fn has_uncommitted_changes(&self) -> bool {
        self.dirty.iter().any(|(key, from)| {
            self.current.get(key).unwrap_or(&self.default) != from
        })
    }

    /// Whether `version` was committed by this map.
    #[must_use]
    pub fn contains_version(&self, version: MapVersion) -> bool {
        match &self.backend {
            Backend::Delta(store) => store.contains(version),
            Backend::State(store) => store.contains(version),
        }
    }

    /// Snapshot the current content and return its version.
    ///
    /// A commit with no effective changes returns the base version
    /// unchanged instead of growing the history.
    pub fn commit(&mut self) -> MapVersion {
        let mut deltas = Vec::with_capacity(self.dirty.len());
        for (key, from) in &self.dirty {
            let to = self.current.get(key).unwrap_or(&self.default);
            if from != to {
                deltas.push(delta::MapDelta {
                    key: key.clone(),
                    from: from.clone(),
                    to: to.clone(),
                });
            }
        }
        self.dirty.clear();

        if deltas.is_empty() {
            if let Some(base) = self.base {
                return base;
            }
        }

        let version = match &mut self.backend {
            Backend::Delta(store) => store.commit(self.base, deltas),
            Backend::State(store) => store.commit(&self.current),
        };
        self.base = Some(version);
        version
    }

    /// Discard uncommitted edits and reset the content to `version`.
    ///
    /// # Panics
    ///
    /// Panics if `version` was never committed by this map (contract
    /// fault).
    pub fn restore(&mut self, version: MapVersion) {
        assert!(
            self.contains_version(version),
            "restore of unknown version {version:?}"
        );
        match &self.backend {
            Backend::Delta(store) => {
                // Roll uncommitted edits back to the base, then replay the
                // delta chains between base and target.
                for (key, from) in std::mem::take(&mut self.dirty) {
                    set_entry(&mut self.current, &self.default, key, from);
                }
                let Some(base) = self.base else {
                    // contains_version passed, so at least one commit
                    // exists, and every commit sets `base`.
                    unreachable!("a delta store with versions always has a base");
                };
                store.replay(base, version, &mut self.current, &self.default);
            }
            Backend::State(store) => {
                self.dirty.clear();
                self.current = store.root(version).clone();
            }
        }
        self.base = Some(version);
    }

    /// Enumerate the minimal changed-entry set between two committed
    /// versions, without materializing either side.
    ///
    /// # Panics
    ///
    /// Panics if either version was never committed by this map (contract
    /// fault).
    #[must_use]
    pub fn diff(&self, from: MapVersion, to: MapVersion) -> DiffCursor<K, V> {
        assert!(
            self.contains_version(from) && self.contains_version(to),
            "diff over unknown versions {from:?}..{to:?}"
        );
        let entries = match &self.backend {
            Backend::Delta(store) => store.diff(from, to),
            Backend::State(store) => store.diff(from, to, &self.default),
        };
        DiffCursor::new(entries)
    }
}
