//! Data types for corpus similarity.

use pustaka_infer::FeatureVector;
use serde::{Deserialize, Serialize};

/// Document identifier as assigned by the persistence collaborator.
pub type DocId = i64;

/// An undirected similarity edge, stored with `source < target`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityEdge {
    pub source: DocId,
    pub target: DocId,
    pub score: f64,
}

impl SimilarityEdge {
    /// Canonicalize the pair. Self-pairs have no edge.
    pub fn new(a: DocId, b: DocId, score: f64) -> Option<Self> {
        if a == b {
            return None;
        }
        Some(Self {
            source: a.min(b),
            target: a.max(b),
            score,
        })
    }
}

/// One document as seen by a similarity computation.
#[derive(Debug, Clone)]
pub struct CorpusDocument {
    pub id: DocId,
    pub content_hash: String,
    pub features: FeatureVector,
}

impl CorpusDocument {
    pub fn new(id: DocId, content_hash: impl Into<String>, features: FeatureVector) -> Self {
        Self {
            id,
            content_hash: content_hash.into(),
            features,
        }
    }
}

/// A ranked neighbour of a focal document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Neighbor {
    pub doc_id: DocId,
    pub score: f64,
}

/// Graph statistics at a given threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    /// Connected clusters, isolated documents included.
    pub component_count: usize,
    pub threshold: f64,
}
