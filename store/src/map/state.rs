//! State backend: one structurally-shared tree root per commit.
//!
//! `im::OrdMap` is a persistent B-tree: cloning a root is O(1) and
//! mutation path-copies only the touched spine, so unchanged subtrees are
//! shared by reference across every committed version. Restore is a root
//! swap; diff walks both trees but skips shared subtrees, so its cost
//! tracks the structural difference rather than the content size.

use im::ordmap::DiffItem;
use im::OrdMap;

use super::{DiffEntry, MapVersion};

/// Append-only arena of committed roots.
pub(crate) struct StateStore<K, V> {
    roots: Vec<OrdMap<K, V>>,
}

impl<K: Ord + Clone, V: Clone + Eq> StateStore<K, V> {
    pub(crate) fn new() -> Self {
        Self { roots: Vec::new() }
    }

    pub(crate) fn contains(&self, version: MapVersion) -> bool {
        (version.0 as usize) < self.roots.len()
    }

    pub(crate) fn commit(&mut self, content: &OrdMap<K, V>) -> MapVersion {
        let index = self.roots.len() as u64;
        self.roots.push(content.clone());
        MapVersion(index)
    }

    pub(crate) fn root(&self, version: MapVersion) -> &OrdMap<K, V> {
        &self.roots[version.0 as usize]
    }

    pub(crate) fn diff(
        &self,
        from: MapVersion,
        to: MapVersion,
        default: &V,
    ) -> Vec<DiffEntry<K, V>> {
        self.root(from)
            .diff(self.root(to))
            .map(|item| match item {
                DiffItem::Add(key, value) => DiffEntry {
                    key: key.clone(),
                    from: default.clone(),
                    to: value.clone(),
                },
                DiffItem::Update { old, new } => DiffEntry {
                    key: old.0.clone(),
                    from: old.1.clone(),
                    to: new.1.clone(),
                },
                DiffItem::Remove(key, value) => DiffEntry {
                    key: key.clone(),
                    from: value.clone(),
                    to: default.clone(),
                },
            })
            .collect()
    }
}
