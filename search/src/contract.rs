//! Collaborator contracts: the traits the exploration core depends on.
//!
//! The transformation collaborator (pattern matching + rule engine), the
//! objective collaborator (fitness and constraints), and the query engine
//! are all external. The core sees them only through the narrow traits
//! below — never through a concrete matching engine.
//!
//! # Contract
//!
//! - `activations` must be deterministic: the same model content yields
//!   the same activations in the same order.
//! - Activations are opaque to the core; only firing them and tracking
//!   which ones were already tried at a state are visible here.
//! - Implementations backed by an incremental query engine must flush
//!   pending changes before enumerating (see [`QueryResultSet`]).

use std::cmp::Ordering;

use quarry_store::model::Model;
use quarry_store::tuple::Tuple;

/// The transformation collaborator: enumerates and fires nondeterministic
/// steps.
pub trait TransformationSource {
    /// One candidate step. Owned by the collaborator; opaque here.
    type Activation: Clone + Eq;

    /// Candidate activations enabled in the model's current state, in
    /// deterministic order.
    fn activations(&mut self, model: &Model) -> Vec<Self::Activation>;

    /// Fire `activation`, mutating the uncommitted view.
    ///
    /// Returns `false` if the activation's precondition no longer holds —
    /// an ordinary outcome, not a fault. The strategy discards any partial
    /// edits by restoring the current version.
    fn fire(&mut self, activation: &Self::Activation, model: &mut Model) -> bool;
}

/// The objective collaborator: fitness, ordering, and constraints.
pub trait ObjectiveOracle {
    /// Externally produced state-quality measure.
    type Fitness: Clone;

    /// Measure the model's current state.
    fn measure(&self, model: &Model) -> Self::Fitness;

    /// The injected total order. `Greater` means `a` is fitter than `b`.
    fn compare(&self, a: &Self::Fitness, b: &Self::Fitness) -> Ordering;

    /// Whether a state with this fitness is a solution.
    fn satisfies_hard_objectives(&self, fitness: &Self::Fitness) -> bool;

    /// Global constraint gate: `false` prunes the branch. An ordinary
    /// outcome, not a fault.
    fn check_constraints(&self, model: &Model) -> bool {
        let _ = model;
        true
    }
}

/// Narrow view of one incremental query's result set.
///
/// Matches are NOT guaranteed current until [`flush_changes`] has been
/// invoked after the most recent activation; transformation sources built
/// on a query engine must flush before trusting any match.
///
/// [`flush_changes`]: QueryResultSet::flush_changes
pub trait QueryResultSet {
    /// Number of current matches.
    fn size(&self) -> usize;

    /// Single-pass cursor over the current matches.
    fn matches(&self) -> Box<dyn Iterator<Item = &Tuple> + '_>;

    /// Whether model edits are pending incorporation.
    fn has_pending_changes(&self) -> bool;

    /// Incorporate pending model changes into the match set.
    fn flush_changes(&mut self, model: &Model);
}
