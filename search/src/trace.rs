//! Observational trace hooks.
//!
//! Tracers watch states, transitions, and solutions as a strategy finds
//! them. They are strictly observational: nothing a tracer does can
//! influence a search decision.

use quarry_store::model::ModelVersion;

/// Observer of exploration progress. All hooks default to no-ops.
pub trait ExplorationTracer {
    /// A state founded a new equivalence class.
    fn state_added(&mut self, version: &ModelVersion, code: u32) {
        let _ = (version, code);
    }

    /// An activation was fired, committing `to` from `from`.
    fn transition_added(&mut self, from: &ModelVersion, to: &ModelVersion) {
        let _ = (from, to);
    }

    /// A solution was newly recorded.
    fn solution_added(&mut self, version: &ModelVersion) {
        let _ = version;
    }
}

/// The default tracer: observes nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTracer;

impl ExplorationTracer for NoopTracer {}
