//! Pustaka Infer: model collaborators, feature vectors, feature cache.
//!
//! Provides the `LanguageModel` trait for the optional rich-language model
//! and the `EmbedderBackend` trait for dense embeddings. Without either,
//! `NoopModel` and `NoopEmbedder` are used and every document goes through
//! the lightweight lexical path with term-frequency features.

pub mod cache;
pub mod embedder;
pub mod features;
pub mod model;

pub use cache::FeatureCache;
pub use embedder::{EmbedderBackend, NoopEmbedder};
pub use features::{cosine_similarity, FeatureVector};
pub use model::{LanguageModel, ModelError, NoopModel};
