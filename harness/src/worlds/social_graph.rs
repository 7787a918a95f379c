//! `social_graph`: grow a population and befriend everyone.
//!
//! Two relations: unary `person` and binary symmetric `friend`.
//! Activations either add the next person (ids are dense, so the only
//! add ever enabled is `AddPerson(population)`) or befriend an existing
//! unordered pair. The hard objective is a full population where every
//! person has at least one friend.
//!
//! Because friendship is symmetric and person ids are interchangeable,
//! different edge orders reach structurally equivalent states — exactly
//! the situation isomorphism pruning exists for.
//!
//! The source keeps an incrementally invalidated result set of lonely
//! persons (the query-engine seam) and flushes it before every
//! enumeration — matches are not trustworthy until flushed.

use quarry_search::contract::{ObjectiveOracle, QueryResultSet, TransformationSource};
use quarry_store::model::Model;
use quarry_store::symbol::{Symbol, SymbolId};
use quarry_store::tuple::{Tuple, Value};

use crate::contract::ExplorationWorldV1;

/// Unary person relation.
pub const PERSON: SymbolId = SymbolId(0);

/// Binary symmetric friendship relation.
pub const FRIEND: SymbolId = SymbolId(1);

/// One nondeterministic step of the social world.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum SocialActivation {
    /// Add person `id` (always the next dense id).
    AddPerson(u32),
    /// Befriend the existing pair `a < b`, symmetrically.
    Befriend { a: u32, b: u32 },
}

/// Fitness: population first, befriended persons second.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SocialFitness {
    pub population: u32,
    pub befriended: u32,
}

/// The world: grow to `target_population`, then connect everyone.
pub struct SocialGraphWorld {
    pub target_population: u32,
}

fn population(model: &Model) -> u32 {
    u32::try_from(model.entries(PERSON).count()).unwrap_or(u32::MAX)
}

fn is_person(model: &Model, node: u32) -> bool {
    model.get(PERSON, &Tuple::of1(node)) == Value::TRUE
}

fn are_friends(model: &Model, a: u32, b: u32) -> bool {
    model.get(FRIEND, &Tuple::of2(a, b)) == Value::TRUE
}

/// Persons with at least one friend.
fn befriended(model: &Model) -> u32 {
    let count = population(model);
    let mut satisfied = 0;
    for node in 0..count {
        let has_friend = model
            .entries(FRIEND)
            .any(|(tuple, _)| tuple.get(0) == node);
        if has_friend {
            satisfied += 1;
        }
    }
    satisfied
}

/// Result set of the `lonely(p)` query: persons without a friend.
///
/// Matches are maintained lazily: firing invalidates, and the owner must
/// flush before reading. The strategies also move the model between
/// versions behind the source's back (restore on backtrack), so the
/// source flushes at every enumeration rather than trusting its flag
/// alone.
pub struct LonelyResultSet {
    matches: Vec<Tuple>,
    dirty: bool,
}

impl LonelyResultSet {
    fn new() -> Self {
        Self {
            matches: Vec::new(),
            dirty: true,
        }
    }

    /// Note a model change; matches are stale until the next flush.
    fn invalidate(&mut self) {
        self.dirty = true;
    }
}

impl QueryResultSet for LonelyResultSet {
    fn size(&self) -> usize {
        self.matches.len()
    }

    fn matches(&self) -> Box<dyn Iterator<Item = &Tuple> + '_> {
        Box::new(self.matches.iter())
    }

    fn has_pending_changes(&self) -> bool {
        self.dirty
    }

    fn flush_changes(&mut self, model: &Model) {
        self.matches.clear();
        for node in 0..population(model) {
            let has_friend = model
                .entries(FRIEND)
                .any(|(tuple, _)| tuple.get(0) == node);
            if !has_friend {
                self.matches.push(Tuple::of1(node));
            }
        }
        self.dirty = false;
    }
}

/// Transformation collaborator of the social world.
pub struct SocialSource {
    target_population: u32,
    lonely: LonelyResultSet,
}

impl TransformationSource for SocialSource {
    type Activation = SocialActivation;

    fn activations(&mut self, model: &Model) -> Vec<SocialActivation> {
        // Backtracking restores versions behind our back; flush
        // unconditionally before trusting any match.
        self.lonely.flush_changes(model);
        let lonely: Vec<u32> = self.lonely.matches().map(|t| t.get(0)).collect();

        let count = population(model);
        let mut out = Vec::new();
        if count < self.target_population {
            out.push(SocialActivation::AddPerson(count));
        }
        let mut pairs = Vec::new();
        for a in 0..count {
            for b in (a + 1)..count {
                if !are_friends(model, a, b) {
                    pairs.push(SocialActivation::Befriend { a, b });
                }
            }
        }
        // Pairs repairing a lonely person come first; the stable sort
        // keeps enumeration deterministic.
        pairs.sort_by_key(|activation| match activation {
            SocialActivation::Befriend { a, b } => {
                usize::from(!lonely.contains(a) && !lonely.contains(b))
            }
            SocialActivation::AddPerson(_) => 0,
        });
        out.extend(pairs);
        out
    }

    fn fire(&mut self, activation: &SocialActivation, model: &mut Model) -> bool {
        let fired = match *activation {
            SocialActivation::AddPerson(id) => {
                if id != population(model) || id >= self.target_population {
                    return false;
                }
                model.put(PERSON, Tuple::of1(id), Value::TRUE);
                true
            }
            SocialActivation::Befriend { a, b } => {
                if !is_person(model, a) || !is_person(model, b) || are_friends(model, a, b) {
                    return false;
                }
                model.put(FRIEND, Tuple::of2(a, b), Value::TRUE);
                model.put(FRIEND, Tuple::of2(b, a), Value::TRUE);
                true
            }
        };
        if fired {
            self.lonely.invalidate();
        }
        fired
    }
}

/// Objective collaborator of the social world.
pub struct SocialOracle {
    target_population: u32,
}

impl ObjectiveOracle for SocialOracle {
    type Fitness = SocialFitness;

    fn measure(&self, model: &Model) -> SocialFitness {
        SocialFitness {
            population: population(model),
            befriended: befriended(model),
        }
    }

    fn compare(&self, a: &SocialFitness, b: &SocialFitness) -> std::cmp::Ordering {
        a.population
            .cmp(&b.population)
            .then(a.befriended.cmp(&b.befriended))
    }

    fn satisfies_hard_objectives(&self, fitness: &SocialFitness) -> bool {
        fitness.population == self.target_population
            && fitness.befriended == fitness.population
    }

    fn check_constraints(&self, model: &Model) -> bool {
        // Friendship must stay symmetric, irreflexive, and between persons.
        model.entries(FRIEND).all(|(tuple, _)| {
            let (a, b) = (tuple.get(0), tuple.get(1));
            a != b && is_person(model, a) && is_person(model, b) && are_friends(model, b, a)
        })
    }
}

impl ExplorationWorldV1 for SocialGraphWorld {
    type Source = SocialSource;
    type Oracle = SocialOracle;

    fn world_id(&self) -> &str {
        "social_graph"
    }

    fn symbols(&self) -> Vec<Symbol> {
        vec![Symbol::relation("person", 1), Symbol::relation("friend", 2)]
    }

    fn source(&self) -> SocialSource {
        SocialSource {
            target_population: self.target_population,
            lonely: LonelyResultSet::new(),
        }
    }

    fn oracle(&self) -> SocialOracle {
        SocialOracle {
            target_population: self.target_population,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_store::map::StoreStrategy;

    fn empty_model() -> Model {
        let world = SocialGraphWorld {
            target_population: 3,
        };
        Model::new(world.symbols(), StoreStrategy::Delta)
    }

    #[test]
    fn only_the_next_person_id_is_enabled() {
        let mut model = empty_model();
        let mut source = SocialGraphWorld {
            target_population: 3,
        }
        .source();

        assert_eq!(
            source.activations(&model),
            vec![SocialActivation::AddPerson(0)]
        );

        assert!(source.fire(&SocialActivation::AddPerson(0), &mut model));
        assert!(
            !source.fire(&SocialActivation::AddPerson(0), &mut model),
            "stale add must report a failed precondition"
        );
        assert_eq!(
            source.activations(&model),
            vec![SocialActivation::AddPerson(1)]
        );
    }

    #[test]
    fn befriend_is_symmetric_and_enabled_per_missing_pair() {
        let mut model = empty_model();
        let world = SocialGraphWorld {
            target_population: 2,
        };
        let mut source = world.source();
        assert!(source.fire(&SocialActivation::AddPerson(0), &mut model));
        assert!(source.fire(&SocialActivation::AddPerson(1), &mut model));

        assert_eq!(
            source.activations(&model),
            vec![SocialActivation::Befriend { a: 0, b: 1 }]
        );
        assert!(source.fire(&SocialActivation::Befriend { a: 0, b: 1 }, &mut model));
        assert!(are_friends(&model, 0, 1));
        assert!(are_friends(&model, 1, 0));
        assert!(
            source.activations(&model).is_empty(),
            "population full and everyone connected"
        );
    }

    #[test]
    fn oracle_orders_population_before_edges() {
        let world = SocialGraphWorld {
            target_population: 2,
        };
        let oracle = world.oracle();
        let small = SocialFitness {
            population: 1,
            befriended: 0,
        };
        let bigger = SocialFitness {
            population: 2,
            befriended: 0,
        };
        let connected = SocialFitness {
            population: 2,
            befriended: 2,
        };
        assert_eq!(oracle.compare(&bigger, &small), std::cmp::Ordering::Greater);
        assert_eq!(
            oracle.compare(&connected, &bigger),
            std::cmp::Ordering::Greater
        );
        assert!(!oracle.satisfies_hard_objectives(&bigger));
        assert!(oracle.satisfies_hard_objectives(&connected));
    }

    #[test]
    fn lonely_matches_are_stale_until_flushed() {
        let mut model = empty_model();
        let world = SocialGraphWorld {
            target_population: 2,
        };
        let mut source = world.source();
        source.fire(&SocialActivation::AddPerson(0), &mut model);
        source.fire(&SocialActivation::AddPerson(1), &mut model);
        assert!(source.lonely.has_pending_changes());
        source.lonely.flush_changes(&model);
        assert_eq!(source.lonely.size(), 2);
        assert!(!source.lonely.has_pending_changes());

        source.fire(&SocialActivation::Befriend { a: 0, b: 1 }, &mut model);
        assert!(source.lonely.has_pending_changes(), "firing invalidates");
        source.lonely.flush_changes(&model);
        assert_eq!(source.lonely.size(), 0);
    }

    #[test]
    fn repairing_pairs_are_enumerated_first() {
        let world = SocialGraphWorld {
            target_population: 4,
        };
        let mut model = Model::new(world.symbols(), StoreStrategy::Delta);
        let mut source = world.source();
        for id in 0..4 {
            assert!(source.fire(&SocialActivation::AddPerson(id), &mut model));
        }
        assert!(source.fire(&SocialActivation::Befriend { a: 0, b: 1 }, &mut model));
        assert!(source.fire(&SocialActivation::Befriend { a: 0, b: 2 }, &mut model));

        // Person 3 is the only lonely one; every pair touching 3 must
        // come before the (1,2) pair between already-befriended persons.
        let activations = source.activations(&model);
        assert_eq!(
            activations,
            vec![
                SocialActivation::Befriend { a: 0, b: 3 },
                SocialActivation::Befriend { a: 1, b: 3 },
                SocialActivation::Befriend { a: 2, b: 3 },
                SocialActivation::Befriend { a: 1, b: 2 },
            ]
        );
    }

    #[test]
    fn constraints_hold_over_fired_states() {
        let mut model = empty_model();
        let world = SocialGraphWorld {
            target_population: 2,
        };
        let mut source = world.source();
        let oracle = world.oracle();
        assert!(oracle.check_constraints(&model));
        source.fire(&SocialActivation::AddPerson(0), &mut model);
        source.fire(&SocialActivation::AddPerson(1), &mut model);
        source.fire(&SocialActivation::Befriend { a: 0, b: 1 }, &mut model);
        assert!(oracle.check_constraints(&model));
    }
}
