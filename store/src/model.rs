//! `Model`: joint versioning of all relations of one model.
//!
//! A model owns one [`VersionedMap`] per registered [`Symbol`]. Commit and
//! restore act on every map in fixed symbol order and hand out a single
//! composite [`ModelVersion`], so callers never observe a state where some
//! relations have moved and others have not.

use crate::map::{DiffCursor, MapVersion, StoreStrategy, VersionedMap};
use crate::symbol::{Symbol, SymbolId};
use crate::tuple::{Tuple, Value};

/// Composite handle to one committed snapshot of a whole model: one
/// component version per symbol, in symbol order.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct ModelVersion(Box<[MapVersion]>);

impl ModelVersion {
    /// Per-symbol component versions, in symbol order.
    #[must_use]
    pub fn components(&self) -> &[MapVersion] {
        &self.0
    }
}

/// The mutable state carrier: one versioned map per symbol.
pub struct Model {
    symbols: Vec<Symbol>,
    maps: Vec<VersionedMap<Tuple, Value>>,
}

impl Model {
    /// Build a model with one empty map per symbol, all using `strategy`.
    #[must_use]
    pub fn new(symbols: Vec<Symbol>, strategy: StoreStrategy) -> Self {
        let maps = symbols
            .iter()
            .map(|symbol| VersionedMap::new(symbol.default_value(), strategy))
            .collect();
        Self { symbols, maps }
    }

    /// The registered symbols, in id order.
    #[must_use]
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Descriptor of `id`. Panics if the id is out of range.
    #[must_use]
    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    /// Look a symbol up by name.
    #[must_use]
    pub fn symbol_id(&self, name: &str) -> Option<SymbolId> {
        let index = self.symbols.iter().position(|s| s.name() == name)?;
        u32::try_from(index).ok().map(SymbolId)
    }

    fn check_arity(&self, id: SymbolId, tuple: &Tuple) {
        let symbol = &self.symbols[id.index()];
        assert!(
            symbol.arity() == tuple.arity(),
            "arity mismatch: relation `{}` expects {}, got {}",
            symbol.name(),
            symbol.arity(),
            tuple.arity()
        );
    }

    /// Read the value of `tuple` in relation `id`.
    ///
    /// # Panics
    ///
    /// Panics on arity mismatch (contract fault).
    #[must_use]
    pub fn get(&self, id: SymbolId, tuple: &Tuple) -> Value {
        self.check_arity(id, tuple);
        self.maps[id.index()].get(tuple)
    }

    /// Write `value` under `tuple` in relation `id`, returning the value
    /// previously visible.
    ///
    /// # Panics
    ///
    /// Panics on arity mismatch (contract fault).
    pub fn put(&mut self, id: SymbolId, tuple: Tuple, value: Value) -> Value {
        self.check_arity(id, &tuple);
        self.maps[id.index()].put(tuple, value)
    }

    /// Iterate the non-default entries of relation `id`, in key order.
    pub fn entries(&self, id: SymbolId) -> impl Iterator<Item = (&Tuple, &Value)> {
        self.maps[id.index()].entries()
    }

    /// Changed entries of relation `id` between two committed model
    /// versions.
    ///
    /// # Panics
    ///
    /// Panics if either version is unknown (contract fault).
    #[must_use]
    pub fn diff(
        &self,
        id: SymbolId,
        from: &ModelVersion,
        to: &ModelVersion,
    ) -> DiffCursor<Tuple, Value> {
        self.maps[id.index()].diff(from.0[id.index()], to.0[id.index()])
    }

    /// Whether any relation has uncommitted edits.
    #[must_use]
    pub fn has_uncommitted_changes(&self) -> bool {
        self.maps.iter().any(VersionedMap::has_uncommitted_changes)
    }

    /// One past the highest node id mentioned by any tuple, or 0 for a
    /// node-free model. Derived by scanning, so the answer is always
    /// consistent with the current content, including after restores.
    #[must_use]
    pub fn node_count(&self) -> u32 {
        let mut count = 0;
        for map in &self.maps {
            for (tuple, _) in map.entries() {
                for node in tuple.nodes() {
                    count = count.max(node + 1);
                }
            }
        }
        count
    }

    /// Commit every relation and return the composite version.
    pub fn commit(&mut self) -> ModelVersion {
        ModelVersion(self.maps.iter_mut().map(VersionedMap::commit).collect())
    }

    /// Whether `version` was committed by this model.
    #[must_use]
    pub fn contains_version(&self, version: &ModelVersion) -> bool {
        version.0.len() == self.maps.len()
            && self
                .maps
                .iter()
                .zip(version.0.iter())
                .all(|(map, &component)| map.contains_version(component))
    }

    /// Discard uncommitted edits and reset every relation to its component
    /// of `version`, in fixed symbol order.
    ///
    /// Every component is validated before any map is touched, so a
    /// contract fault never leaves the model partially restored.
    ///
    /// # Panics
    ///
    /// Panics if `version` was not committed by this model (contract
    /// fault).
    pub fn restore(&mut self, version: &ModelVersion) {
        assert!(
            self.contains_version(version),
            "restore of unknown model version {version:?}"
        );
        for (map, &component) in self.maps.iter_mut().zip(version.0.iter()) {
            map.restore(component);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person_friend_model(strategy: StoreStrategy) -> Model {
        Model::new(
            vec![Symbol::relation("person", 1), Symbol::relation("friend", 2)],
            strategy,
        )
    }

    const PERSON: SymbolId = SymbolId(0);
    const FRIEND: SymbolId = SymbolId(1);

    #[test]
    fn joint_commit_and_restore_cover_all_relations() {
        for strategy in [StoreStrategy::Delta, StoreStrategy::State] {
            let mut model = person_friend_model(strategy);
            model.put(PERSON, Tuple::of1(0), Value::TRUE);
            let v1 = model.commit();

            model.put(PERSON, Tuple::of1(1), Value::TRUE);
            model.put(FRIEND, Tuple::of2(0, 1), Value::TRUE);
            let v2 = model.commit();

            model.restore(&v1);
            assert_eq!(model.get(PERSON, &Tuple::of1(1)), Value::FALSE);
            assert_eq!(model.get(FRIEND, &Tuple::of2(0, 1)), Value::FALSE);
            assert!(!model.has_uncommitted_changes());

            model.restore(&v2);
            assert_eq!(model.get(FRIEND, &Tuple::of2(0, 1)), Value::TRUE);
        }
    }

    #[test]
    fn restore_discards_edits_in_every_relation() {
        let mut model = person_friend_model(StoreStrategy::Delta);
        let v1 = model.commit();
        model.put(PERSON, Tuple::of1(0), Value::TRUE);
        model.put(FRIEND, Tuple::of2(0, 0), Value::TRUE);
        assert!(model.has_uncommitted_changes());
        model.restore(&v1);
        assert!(!model.has_uncommitted_changes());
        assert_eq!(model.entries(PERSON).count(), 0);
        assert_eq!(model.entries(FRIEND).count(), 0);
    }

    #[test]
    fn unchanged_relations_keep_their_component_version() {
        let mut model = person_friend_model(StoreStrategy::Delta);
        model.put(PERSON, Tuple::of1(0), Value::TRUE);
        let v1 = model.commit();
        model.put(PERSON, Tuple::of1(1), Value::TRUE);
        let v2 = model.commit();
        assert_eq!(v1.components()[FRIEND.index()], v2.components()[FRIEND.index()]);
        assert_ne!(v1.components()[PERSON.index()], v2.components()[PERSON.index()]);
    }

    #[test]
    fn diff_is_per_relation() {
        let mut model = person_friend_model(StoreStrategy::State);
        model.put(PERSON, Tuple::of1(0), Value::TRUE);
        let v1 = model.commit();
        model.put(FRIEND, Tuple::of2(0, 0), Value::TRUE);
        let v2 = model.commit();

        assert_eq!(model.diff(PERSON, &v1, &v2).count(), 0);
        let friend_changes: Vec<_> = model.diff(FRIEND, &v1, &v2).collect();
        assert_eq!(friend_changes.len(), 1);
        assert_eq!(friend_changes[0].key, Tuple::of2(0, 0));
        assert_eq!(friend_changes[0].from, Value::FALSE);
        assert_eq!(friend_changes[0].to, Value::TRUE);
    }

    #[test]
    fn node_count_follows_restores() {
        let mut model = person_friend_model(StoreStrategy::Delta);
        model.put(PERSON, Tuple::of1(0), Value::TRUE);
        let v1 = model.commit();
        model.put(FRIEND, Tuple::of2(4, 2), Value::TRUE);
        let _v2 = model.commit();
        assert_eq!(model.node_count(), 5);
        model.restore(&v1);
        assert_eq!(model.node_count(), 1);
    }

    #[test]
    fn symbol_lookup_by_name() {
        let model = person_friend_model(StoreStrategy::Delta);
        assert_eq!(model.symbol_id("friend"), Some(FRIEND));
        assert_eq!(model.symbol_id("enemy"), None);
    }

    #[test]
    #[should_panic(expected = "arity mismatch")]
    fn arity_mismatch_is_a_contract_fault() {
        let mut model = person_friend_model(StoreStrategy::Delta);
        model.put(FRIEND, Tuple::of1(0), Value::TRUE);
    }

    #[test]
    #[should_panic(expected = "restore of unknown model version")]
    fn restore_foreign_version_is_a_contract_fault() {
        let mut a = person_friend_model(StoreStrategy::Delta);
        let mut b = Model::new(vec![Symbol::relation("person", 1)], StoreStrategy::Delta);
        let _ = a.commit();
        let foreign = b.commit();
        a.restore(&foreign);
    }
}
