//! Quarry Store: versioned, structurally-shared model state.
//!
//! This crate is the bottom of the workspace. It owns the mutable state
//! carrier (`Model`), the persistent key/value container backing each
//! relation (`VersionedMap`), and the shared value vocabulary.
//!
//! # Crate dependency graph
//!
//! ```text
//! quarry_store  ←  quarry_coder  ←  quarry_search  ←  quarry_harness
//! (versioned maps)  (state codes)    (strategies)      (worlds, runner)
//! ```
//!
//! # Key types
//!
//! - [`tuple::Tuple`] / [`tuple::Value`] — relation keys and values
//! - [`symbol::Symbol`] — immutable relation descriptor
//! - [`map::VersionedMap`] — branchable persistent map, two backends
//! - [`map::MapVersion`] — opaque handle to one committed map snapshot
//! - [`model::Model`] / [`model::ModelVersion`] — joint versioning of all
//!   relations of one model
//!
//! # Versioning contract
//!
//! Versions are produced only by `commit()`, are immutable, and are valid
//! for the lifetime of the owning store. Restoring or diffing a version a
//! store has never produced is a contract fault and panics; every other
//! search-time condition is an ordinary return value.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod map;
pub mod model;
pub mod symbol;
pub mod tuple;
