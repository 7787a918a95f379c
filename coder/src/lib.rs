//! Quarry Coder: graph-canonicalization state codes.
//!
//! The coder summarizes a committed model as a 32-bit state code by
//! iterative neighbourhood-hash refinement. The summary is cheap and sound
//! for negatives: two states with different codes are definitely not
//! isomorphic. Equal codes are only candidates — deciding between
//! `Isomorphic` and `Unknown` is delegated to an injected
//! [`classify::IsomorphismPolicy`].
//!
//! # Crate dependency graph
//!
//! ```text
//! quarry_store  ←  quarry_coder  ←  quarry_search
//! ```
//!
//! # Key types
//!
//! - [`object_code::ObjectCode`] — per-node 64-bit code array
//! - [`neighbourhood::NeighbourhoodCoder`] — the refinement driver
//! - [`classify::StateEquivalence`] — DIFFERENT / ISOMORPHIC / UNKNOWN

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod classify;
pub mod neighbourhood;
pub mod object_code;
