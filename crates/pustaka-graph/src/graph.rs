//! Corpus similarity graph using petgraph.
//!
//! All unordered pairwise scores are computed once per rebuild and kept
//! threshold-free, so edge lists at any threshold and neighbour queries are
//! served from the same snapshot. Rebuilds are memoized by a hash over the
//! corpus' (id, content hash) pairs and published by swapping an `Arc`:
//! readers always see the last completed graph and never wait on a rebuild.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use petgraph::algo::connected_components;
use petgraph::graph::{NodeIndex, UnGraph};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use pustaka_core::config::{validate_positive, validate_threshold};
use pustaka_core::{Error, Result};
use pustaka_infer::FeatureVector;

use crate::types::{CorpusDocument, DocId, GraphStats, Neighbor, SimilarityEdge};

/// Hash identifying a corpus state: document ids plus their content hashes,
/// independent of input order.
pub fn corpus_hash(corpus: &[CorpusDocument]) -> String {
    let pairs: BTreeSet<(DocId, &str)> = corpus
        .iter()
        .map(|d| (d.id, d.content_hash.as_str()))
        .collect();
    let mut hasher = Sha256::new();
    for (id, hash) in pairs {
        hasher.update(id.to_le_bytes());
        hasher.update(hash.as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}

/// Immutable snapshot of every pairwise score in a corpus.
#[derive(Debug, Clone)]
pub struct SimilarityGraph {
    corpus_hash: String,
    doc_ids: Vec<DocId>,
    scores: BTreeMap<(DocId, DocId), f64>,
}

impl SimilarityGraph {
    /// Score all unordered pairs. A repeated id keeps the entry with the
    /// smallest content hash, so the result depends only on `corpus_hash`.
    pub fn compute(corpus: &[CorpusDocument]) -> Self {
        let mut docs: Vec<&CorpusDocument> = corpus.iter().collect();
        docs.sort_by(|a, b| (a.id, &a.content_hash).cmp(&(b.id, &b.content_hash)));
        docs.dedup_by(|later, kept| {
            let repeat = later.id == kept.id;
            if repeat {
                warn!("Duplicate document {} in corpus, ignoring repeat", later.id);
            }
            repeat
        });

        let mut scores = BTreeMap::new();
        for (i, a) in docs.iter().enumerate() {
            for b in &docs[i + 1..] {
                scores.insert((a.id, b.id), a.features.similarity(&b.features));
            }
        }

        Self {
            corpus_hash: corpus_hash(corpus),
            doc_ids: docs.iter().map(|d| d.id).collect(),
            scores,
        }
    }

    pub fn corpus_hash(&self) -> &str {
        &self.corpus_hash
    }

    /// Document ids in ascending order.
    pub fn doc_ids(&self) -> &[DocId] {
        &self.doc_ids
    }

    pub fn contains(&self, doc_id: DocId) -> bool {
        self.doc_ids.binary_search(&doc_id).is_ok()
    }

    /// Score of an unordered pair; None for self-pairs or unknown ids.
    pub fn score(&self, a: DocId, b: DocId) -> Option<f64> {
        if a == b {
            return None;
        }
        self.scores.get(&(a.min(b), a.max(b))).copied()
    }

    /// Edges with score at or above `threshold`, ordered by (source, target).
    pub fn edges(&self, threshold: f64) -> Vec<SimilarityEdge> {
        self.scores
            .iter()
            .filter(|(_, &score)| score >= threshold)
            .filter_map(|(&(a, b), &score)| SimilarityEdge::new(a, b, score))
            .collect()
    }

    /// Up to `limit` other documents by descending score, ties by ascending id.
    /// No threshold applies.
    pub fn neighbors(&self, doc_id: DocId, limit: usize) -> Vec<Neighbor> {
        let mut neighbors: Vec<Neighbor> = self
            .doc_ids
            .iter()
            .filter(|&&other| other != doc_id)
            .filter_map(|&other| {
                self.score(doc_id, other).map(|score| Neighbor {
                    doc_id: other,
                    score,
                })
            })
            .collect();
        neighbors.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.doc_id.cmp(&b.doc_id)));
        neighbors.truncate(limit);
        neighbors
    }

    /// Undirected petgraph view at `threshold`: one node per document
    /// (weighted by its id), one edge per retained pair (weighted by score).
    pub fn to_petgraph(&self, threshold: f64) -> UnGraph<DocId, f64> {
        let mut graph = UnGraph::with_capacity(self.doc_ids.len(), self.scores.len());
        let index: HashMap<DocId, NodeIndex> = self
            .doc_ids
            .iter()
            .map(|&id| (id, graph.add_node(id)))
            .collect();
        for edge in self.edges(threshold) {
            if let (Some(&a), Some(&b)) = (index.get(&edge.source), index.get(&edge.target)) {
                graph.add_edge(a, b, edge.score);
            }
        }
        graph
    }

    /// Get graph statistics.
    pub fn stats(&self, threshold: f64) -> GraphStats {
        let graph = self.to_petgraph(threshold);
        GraphStats {
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            component_count: connected_components(&graph),
            threshold,
        }
    }
}

/// Shared similarity cache for a corpus: rebuild-then-swap.
pub struct SimilarityEngine {
    current: RwLock<Option<Arc<SimilarityGraph>>>,
    rebuild: Mutex<()>,
    rebuilds: AtomicUsize,
}

impl SimilarityEngine {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
            rebuild: Mutex::new(()),
            rebuilds: AtomicUsize::new(0),
        }
    }

    /// Pairwise score of two feature vectors, in [0, 1].
    pub fn similarity(a: &FeatureVector, b: &FeatureVector) -> f64 {
        a.similarity(b)
    }

    /// The graph for `corpus`, rebuilt only when its hash changed.
    /// Repeated document ids are rejected before any state changes.
    pub fn graph(&self, corpus: &[CorpusDocument]) -> Result<Arc<SimilarityGraph>> {
        ensure_unique_ids(corpus)?;
        let hash = corpus_hash(corpus);
        if let Some(graph) = self.matching(&hash) {
            debug!("Similarity graph up to date ({})", &hash[..12]);
            return Ok(graph);
        }

        // One rebuild at a time; readers keep using the old snapshot
        let _guard = self.rebuild.lock();
        if let Some(graph) = self.matching(&hash) {
            return Ok(graph);
        }

        let graph = Arc::new(SimilarityGraph::compute(corpus));
        self.rebuilds.fetch_add(1, Ordering::Relaxed);
        info!(
            "Rebuilt similarity graph: {} documents, {} pairs",
            graph.doc_ids().len(),
            graph.scores.len()
        );
        *self.current.write() = Some(graph.clone());
        Ok(graph)
    }

    fn matching(&self, hash: &str) -> Option<Arc<SimilarityGraph>> {
        self.current
            .read()
            .as_ref()
            .filter(|g| g.corpus_hash == hash)
            .cloned()
    }

    /// Edges of the corpus graph at `threshold`. Fewer than two documents
    /// yield no edges.
    pub fn build_graph(
        &self,
        corpus: &[CorpusDocument],
        threshold: f64,
    ) -> Result<Vec<SimilarityEdge>> {
        validate_threshold(threshold)?;
        ensure_unique_ids(corpus)?;
        if corpus.len() < 2 {
            return Ok(Vec::new());
        }
        Ok(self.graph(corpus)?.edges(threshold))
    }

    /// Nearest neighbours of `doc_id` within `corpus`.
    pub fn nearest_neighbors(
        &self,
        doc_id: DocId,
        corpus: &[CorpusDocument],
        limit: usize,
    ) -> Result<Vec<Neighbor>> {
        validate_positive("limit", limit)?;
        let graph = self.graph(corpus)?;
        if !graph.contains(doc_id) {
            return Err(Error::InvalidParameter(format!(
                "document {} is not in the corpus",
                doc_id
            )));
        }
        Ok(graph.neighbors(doc_id, limit))
    }

    /// Last completed graph, if any.
    pub fn current(&self) -> Option<Arc<SimilarityGraph>> {
        self.current.read().clone()
    }

    /// Drop the memoized graph; the next query rebuilds.
    pub fn invalidate(&self) {
        *self.current.write() = None;
        debug!("Similarity graph invalidated");
    }

    /// Completed rebuilds since creation.
    pub fn rebuilds(&self) -> usize {
        self.rebuilds.load(Ordering::Relaxed)
    }
}

fn ensure_unique_ids(corpus: &[CorpusDocument]) -> Result<()> {
    let mut seen = BTreeSet::new();
    match corpus.iter().find(|d| !seen.insert(d.id)) {
        Some(doc) => Err(Error::InvalidParameter(format!(
            "document {} appears more than once in the corpus",
            doc.id
        ))),
        None => Ok(()),
    }
}

impl Default for SimilarityEngine {
    fn default() -> Self {
        Self::new()
    }
}
