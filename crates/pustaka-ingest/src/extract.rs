//! Text-derived document intelligence.
//!
//! Language classification, frequency-based keywords, extractive summaries
//! and bibliography parsing. Everything here is pure: no model, no I/O, no
//! shared mutable state.

pub mod language;
pub mod lexical;
pub mod references;
pub mod sentences;
pub mod stopwords;

use std::sync::Arc;

use pustaka_core::{Error, Language, PustakaConfig, Result};
use serde::{Deserialize, Serialize};

use language::LanguageClassifier;
use lexical::LexicalExtractor;
use references::ReferenceParser;
use stopwords::Lexicon;

/// A ranked keyword or two-word key phrase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub term: String,
    /// Non-negative relevance score.
    pub score: f64,
    /// 1-based position in descending-score order.
    pub rank: usize,
}

/// Review state of a parsed reference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    #[default]
    Pending,
    Validated,
    Rejected,
}

impl ValidationStatus {
    /// Only `pending` may move, and only to a decided state.
    pub fn can_transition_to(&self, to: ValidationStatus) -> bool {
        matches!(
            (self, to),
            (Self::Pending, Self::Validated) | (Self::Pending, Self::Rejected)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Validated => "validated",
            Self::Rejected => "rejected",
        }
    }
}

/// One bibliography entry as parsed from the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    /// Unique within the document's list.
    pub index: u32,
    /// Citation text merged onto a single line.
    pub text: String,
    #[serde(default)]
    pub status: ValidationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ReferenceEntry {
    pub fn new(index: u32, text: String) -> Self {
        Self {
            index,
            text,
            status: ValidationStatus::Pending,
            note: None,
        }
    }

    /// Apply an external validation decision.
    pub fn transition(&mut self, to: ValidationStatus, note: Option<String>) -> Result<()> {
        if !self.status.can_transition_to(to) {
            return Err(Error::InvalidTransition {
                from: self.status.as_str().into(),
                to: to.as_str().into(),
            });
        }
        self.status = to;
        self.note = note;
        Ok(())
    }
}

/// The lightweight components, built once from configuration.
#[derive(Debug, Clone)]
pub struct TextAnalyzer {
    pub classifier: LanguageClassifier,
    pub lexical: LexicalExtractor,
    pub references: ReferenceParser,
}

impl TextAnalyzer {
    pub fn from_config(config: &PustakaConfig) -> Self {
        let lexicon = Arc::new(Lexicon::from_config(&config.lexical));
        Self::with_lexicon(config, lexicon)
    }

    pub fn with_lexicon(config: &PustakaConfig, lexicon: Arc<Lexicon>) -> Self {
        Self {
            classifier: LanguageClassifier::new(&config.language),
            lexical: LexicalExtractor::new(lexicon, &config.lexical),
            references: ReferenceParser::new(&config.references),
        }
    }

    pub fn classify(&self, text: &str) -> Language {
        self.classifier.classify(text)
    }
}

impl Default for TextAnalyzer {
    fn default() -> Self {
        Self::from_config(&PustakaConfig::default())
    }
}
