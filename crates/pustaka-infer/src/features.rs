//! Per-document feature vectors and the cosine primitive.

use std::collections::BTreeMap;

use ndarray::Array1;

/// How a document is vectorized for similarity.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureVector {
    /// Relative term frequencies over the document's own vocabulary.
    Terms(BTreeMap<String, f64>),
    /// Dense embedding from an external embedder.
    Dense(Array1<f32>),
}

impl FeatureVector {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Terms(_) => "terms",
            Self::Dense(_) => "dense",
        }
    }

    /// Number of components (vocabulary size for term vectors).
    pub fn len(&self) -> usize {
        match self {
            Self::Terms(t) => t.len(),
            Self::Dense(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cosine similarity clamped to [0, 1].
    ///
    /// Term vectors are aligned over the union of their vocabularies. Mixed
    /// kinds and dense vectors of different dimension are incomparable and
    /// score 0, as does any zero-magnitude vector.
    pub fn similarity(&self, other: &FeatureVector) -> f64 {
        let score = match (self, other) {
            (Self::Terms(a), Self::Terms(b)) => term_cosine(a, b),
            (Self::Dense(a), Self::Dense(b)) if a.len() == b.len() => cosine_similarity(a, b),
            _ => 0.0,
        };
        score.clamp(0.0, 1.0)
    }
}

/// Cosine similarity of two equal-length dense vectors.
/// Returns 0 (never NaN) when either vector has zero magnitude.
pub fn cosine_similarity(a: &Array1<f32>, b: &Array1<f32>) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (x as f64, y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    finish_cosine(dot, norm_a, norm_b)
}

fn term_cosine(a: &BTreeMap<String, f64>, b: &BTreeMap<String, f64>) -> f64 {
    // Terms missing from one side contribute only to that side's norm
    let dot: f64 = a
        .iter()
        .filter_map(|(term, &x)| b.get(term).map(|&y| x * y))
        .sum();
    let norm_a: f64 = a.values().map(|x| x * x).sum();
    let norm_b: f64 = b.values().map(|y| y * y).sum();
    finish_cosine(dot, norm_a, norm_b)
}

fn finish_cosine(dot: f64, norm_a: f64, norm_b: f64) -> f64 {
    if norm_a <= 0.0 || norm_b <= 0.0 {
        return 0.0;
    }
    let score = dot / (norm_a.sqrt() * norm_b.sqrt());
    if score.is_finite() {
        score
    } else {
        0.0
    }
}
