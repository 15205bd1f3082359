//! Rich-language model collaborator.
//!
//! A model-backed keyword extractor and abstractive summarizer that may or
//! may not be present at runtime. Every call carries a deadline and returns
//! a typed failure instead of panicking; the caller owns the fallback.

use std::time::Duration;

use thiserror::Error;

/// Failure modes of a model call.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelError {
    #[error("model unavailable: {0}")]
    Unavailable(String),

    #[error("model timed out after {0:?}")]
    Timeout(Duration),

    #[error("model failed: {0}")]
    Failed(String),
}

impl From<ModelError> for pustaka_core::Error {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Unavailable(msg) => Self::CollaboratorUnavailable(msg),
            ModelError::Timeout(d) => Self::CollaboratorTimeout(d),
            ModelError::Failed(msg) => Self::CollaboratorUnavailable(msg),
        }
    }
}

/// Trait for rich-language model backends.
///
/// Calls are blocking; the orchestrator runs them off the async executor
/// under its own timeout. `deadline` is advisory for backends that can
/// abort early.
pub trait LanguageModel: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str {
        "model"
    }

    /// Check if the model is loaded and reachable.
    fn is_available(&self) -> bool;

    /// Keyword candidates with raw scores, best first.
    fn extract_keywords(
        &self,
        text: &str,
        top_k: usize,
        deadline: Duration,
    ) -> Result<Vec<(String, f64)>, ModelError>;

    /// An abstractive summary of roughly `sentence_count` sentences.
    fn summarize(
        &self,
        text: &str,
        sentence_count: usize,
        deadline: Duration,
    ) -> Result<String, ModelError>;
}

/// Placeholder model that is never available (lightweight-only mode).
#[derive(Debug, Default)]
pub struct NoopModel;

impl LanguageModel for NoopModel {
    fn name(&self) -> &str {
        "noop"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn extract_keywords(
        &self,
        _text: &str,
        _top_k: usize,
        _deadline: Duration,
    ) -> Result<Vec<(String, f64)>, ModelError> {
        Err(ModelError::Unavailable("no model configured".into()))
    }

    fn summarize(
        &self,
        _text: &str,
        _sentence_count: usize,
        _deadline: Duration,
    ) -> Result<String, ModelError> {
        Err(ModelError::Unavailable("no model configured".into()))
    }
}
