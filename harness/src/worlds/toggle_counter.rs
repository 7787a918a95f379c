//! `toggle_counter`: nullary relations only.
//!
//! Two nullary relations: an integer `level` raised step by step toward a
//! cap, and a boolean `armed` flag that can be toggled at any point. The
//! hard objective is reaching the cap with the flag set.
//!
//! The world exercises the nullary paths of the state coder (every state
//! differs only in nullary values) and produces long single-key delta
//! chains in the store. Toggling back re-creates earlier content, so
//! termination leans on duplicate pruning rather than on the activation
//! space running dry.

use quarry_search::contract::{ObjectiveOracle, TransformationSource};
use quarry_store::model::Model;
use quarry_store::symbol::{Symbol, SymbolId};
use quarry_store::tuple::{Tuple, Value};

use crate::contract::ExplorationWorldV1;

/// Nullary integer level.
pub const LEVEL: SymbolId = SymbolId(0);

/// Nullary boolean flag.
pub const ARMED: SymbolId = SymbolId(1);

/// One step of the toggle-counter world.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ToggleActivation {
    /// Raise `level` by one (enabled below the cap).
    Raise,
    /// Flip `armed`.
    Toggle,
}

/// The world: raise `level` to `cap` with `armed` set.
pub struct ToggleCounterWorld {
    pub cap: i64,
}

fn level(model: &Model) -> i64 {
    match model.get(LEVEL, &Tuple::empty()) {
        Value::Int(n) => n,
        Value::Bool(_) => 0,
    }
}

fn armed(model: &Model) -> bool {
    model.get(ARMED, &Tuple::empty()) == Value::TRUE
}

/// Transformation collaborator of the toggle-counter world.
pub struct ToggleSource {
    cap: i64,
}

impl TransformationSource for ToggleSource {
    type Activation = ToggleActivation;

    fn activations(&mut self, model: &Model) -> Vec<ToggleActivation> {
        let mut out = Vec::new();
        if level(model) < self.cap {
            out.push(ToggleActivation::Raise);
        }
        out.push(ToggleActivation::Toggle);
        out
    }

    fn fire(&mut self, activation: &ToggleActivation, model: &mut Model) -> bool {
        match activation {
            ToggleActivation::Raise => {
                if level(model) >= self.cap {
                    return false;
                }
                model.put(LEVEL, Tuple::empty(), Value::Int(level(model) + 1));
                true
            }
            ToggleActivation::Toggle => {
                let flipped = Value::Bool(!armed(model));
                model.put(ARMED, Tuple::empty(), flipped);
                true
            }
        }
    }
}

/// Objective collaborator of the toggle-counter world.
pub struct ToggleOracle {
    cap: i64,
}

/// Fitness: level first, armedness as tiebreak.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ToggleFitness {
    pub level: i64,
    pub armed: bool,
}

impl ObjectiveOracle for ToggleOracle {
    type Fitness = ToggleFitness;

    fn measure(&self, model: &Model) -> ToggleFitness {
        ToggleFitness {
            level: level(model),
            armed: armed(model),
        }
    }

    fn compare(&self, a: &ToggleFitness, b: &ToggleFitness) -> std::cmp::Ordering {
        a.level.cmp(&b.level).then(a.armed.cmp(&b.armed))
    }

    fn satisfies_hard_objectives(&self, fitness: &ToggleFitness) -> bool {
        fitness.level == self.cap && fitness.armed
    }

    fn check_constraints(&self, model: &Model) -> bool {
        (0..=self.cap).contains(&level(model))
    }
}

impl ExplorationWorldV1 for ToggleCounterWorld {
    type Source = ToggleSource;
    type Oracle = ToggleOracle;

    fn world_id(&self) -> &str {
        "toggle_counter"
    }

    fn symbols(&self) -> Vec<Symbol> {
        vec![Symbol::counter("level"), Symbol::relation("armed", 0)]
    }

    fn source(&self) -> ToggleSource {
        ToggleSource { cap: self.cap }
    }

    fn oracle(&self) -> ToggleOracle {
        ToggleOracle { cap: self.cap }
    }
}
