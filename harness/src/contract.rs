//! World contract: the minimal trait a world must implement.
//!
//! A world declares its relation schema, seeds the initial model content,
//! and supplies the two collaborators the strategies consume. Worlds may
//! NOT implement state coding, equivalence bookkeeping, or transcript
//! writing — those are core/runner concerns.

use quarry_search::contract::{ObjectiveOracle, TransformationSource};
use quarry_store::model::Model;
use quarry_store::symbol::Symbol;

/// The contract a world must implement to be run by the harness runner.
pub trait ExplorationWorldV1 {
    /// The world's transformation collaborator.
    type Source: TransformationSource;
    /// The world's objective collaborator.
    type Oracle: ObjectiveOracle;

    /// Unique world identifier (e.g. `"social_graph"`).
    fn world_id(&self) -> &str;

    /// The relation schema, in symbol-id order.
    fn symbols(&self) -> Vec<Symbol>;

    /// Write the initial content into a freshly built model. Called once,
    /// before the initial commit; the default leaves the model empty.
    fn seed_initial_state(&self, model: &mut Model) {
        let _ = model;
    }

    /// Build the transformation collaborator.
    fn source(&self) -> Self::Source;

    /// Build the objective collaborator.
    fn oracle(&self) -> Self::Oracle;
}
