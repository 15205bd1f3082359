//! Embedding engine trait and implementations.
//!
//! The `EmbedderBackend` trait abstracts over dense document embeddings
//! supplied by an external model. Without one, `NoopEmbedder` is used and
//! documents are compared by their term-frequency vectors.

use ndarray::Array1;

/// Trait for embedding backends.
pub trait EmbedderBackend: Send + Sync {
    /// Generate an embedding for a text string.
    /// Returns None if the embedder is not available.
    fn embed(&self, text: &str) -> Option<Array1<f32>>;

    /// Generate embeddings for a batch of texts.
    fn embed_batch(&self, texts: &[&str]) -> Vec<Option<Array1<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// Get the embedding dimension.
    fn dimension(&self) -> usize;

    /// Check if the embedder is available (model loaded).
    fn is_available(&self) -> bool;
}

/// Placeholder embedder that always returns None (term-vector mode).
pub struct NoopEmbedder {
    dim: usize,
}

impl NoopEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl Default for NoopEmbedder {
    fn default() -> Self {
        Self::new(384)
    }
}

impl EmbedderBackend for NoopEmbedder {
    fn embed(&self, _text: &str) -> Option<Array1<f32>> {
        None
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn is_available(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_embedder() {
        let embedder = NoopEmbedder::default();
        assert!(!embedder.is_available());
        assert_eq!(embedder.dimension(), 384);
        assert!(embedder.embed("teks").is_none());
        let batch = embedder.embed_batch(&["a", "b"]);
        assert_eq!(batch.len(), 2);
        assert!(batch.iter().all(Option::is_none));
    }
}
