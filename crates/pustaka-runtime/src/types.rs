//! Runtime types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pustaka_core::{Error, Language, Result};
use pustaka_infer::FeatureVector;
use pustaka_ingest::{Keyword, ReferenceEntry};

/// Lifecycle of a document within the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ProcessingStatus {
    /// Legal moves: start a pass from `pending` or `completed` (reprocess),
    /// resolve a running pass, and retry a failed one.
    pub fn can_transition_to(&self, to: ProcessingStatus) -> bool {
        use ProcessingStatus::*;
        matches!(
            (self, to),
            (Pending, Processing)
                | (Completed, Processing)
                | (Processing, Completed)
                | (Processing, Failed)
                | (Failed, Pending)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// Keyword / summary extractor variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// External rich-language model, attempted once under a timeout.
    ModelBacked,
    /// Frequency/stopword extractor. Never fails.
    Lightweight,
}

/// A document and its derived intelligence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: i64,
    /// Extracted plain text; None when upstream extraction produced nothing.
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    pub status: ProcessingStatus,
    #[serde(default)]
    pub keywords: Vec<Keyword>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub references: Vec<ReferenceEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    #[serde(skip)]
    pub features: Option<FeatureVector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Document {
    pub fn new(id: i64, text: impl Into<String>) -> Self {
        Self::with_text(id, Some(text.into()))
    }

    /// A document whose text could not be extracted.
    pub fn without_text(id: i64) -> Self {
        Self::with_text(id, None)
    }

    fn with_text(id: i64, text: Option<String>) -> Self {
        Self {
            id,
            text,
            language: None,
            status: ProcessingStatus::Pending,
            keywords: Vec::new(),
            summary: String::new(),
            references: Vec::new(),
            content_hash: None,
            features: None,
            processed_at: None,
            error: None,
        }
    }

    /// Move to `to`, or fail without touching the document.
    pub fn transition(&mut self, to: ProcessingStatus) -> Result<()> {
        if !self.status.can_transition_to(to) {
            return Err(Error::InvalidTransition {
                from: self.status.as_str().into(),
                to: to.as_str().into(),
            });
        }
        self.status = to;
        Ok(())
    }

    /// Return a failed document to `pending` with all partial state cleared.
    pub fn retry(&mut self) -> Result<()> {
        self.transition(ProcessingStatus::Pending)?;
        self.clear_results();
        Ok(())
    }

    pub(crate) fn clear_results(&mut self) {
        self.language = None;
        self.keywords.clear();
        self.summary.clear();
        self.references.clear();
        self.content_hash = None;
        self.features = None;
        self.processed_at = None;
        self.error = None;
    }
}

/// What one processing pass did, for logs and callers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingReport {
    pub doc_id: i64,
    pub language: Language,
    pub keyword_strategy: Strategy,
    pub summary_strategy: Strategy,
    pub reference_count: usize,
    /// Collaborator failures absorbed by falling back.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fallbacks: Vec<String>,
    pub elapsed_ms: u64,
}
