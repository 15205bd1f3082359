//! Pustaka Graph: cross-document similarity, threshold graph, neighbours.

pub mod graph;
pub mod types;

pub use graph::{corpus_hash, SimilarityEngine, SimilarityGraph};
pub use types::*;
