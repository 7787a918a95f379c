//! Quarry Search: backtracking exploration strategies.
//!
//! This crate composes the versioned store and the state coder with
//! externally supplied activations and fitness into depth-first and
//! best-first exploration. It depends only on `quarry_store` and
//! `quarry_coder` — it does NOT depend on `quarry_harness`.
//!
//! # Crate dependency graph
//!
//! ```text
//! quarry_store  ←  quarry_coder  ←  quarry_search  ←  quarry_harness
//! ```
//!
//! # Key types
//!
//! - [`contract::TransformationSource`] / [`contract::ObjectiveOracle`] —
//!   the collaborator seams
//! - [`policy::ExplorationPolicyV1`] — budgets and pruning configuration
//! - [`depth_first::DepthFirstStrategy`] — single-branch backtracking
//! - [`best_first::BestFirstStrategy`] — frontier-driven search, with a
//!   probabilistic-restart worker constructor
//! - [`outcome::ExplorationOutcome`] — why a run stopped, plus counters
//!
//! Expected search outcomes (constraint violation, depth limit, exhausted
//! activations, duplicate states) are ordinary values here, never errors;
//! the only faults are store contract faults, and the only `Result`
//! surface is pre-flight policy validation.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod activation_store;
pub mod best_first;
pub mod cancel;
pub mod contract;
pub mod depth_first;
pub mod equivalence;
pub mod error;
pub mod objective_queue;
pub mod outcome;
pub mod policy;
pub mod solution_store;
pub mod trace;
pub mod trajectory;
