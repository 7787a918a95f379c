//! Worlds exercising the exploration core end to end.

pub mod social_graph;
pub mod toggle_counter;
