//! Quarry Harness: worlds and orchestration for the exploration core.
//!
//! The harness runs a world through the search layer (build model → seed
//! content → commit → explore) and packages what happened as a
//! deterministic transcript artifact. It does NOT implement search or
//! coding logic — it delegates to `quarry_search` and `quarry_coder`.
//! Worlds provide domain data only; the runner owns orchestration.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod canon;
pub mod contract;
pub mod runner;
pub mod transcript;
pub mod worlds;
