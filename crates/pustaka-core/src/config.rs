//! Pipeline configuration: loaded once at startup and passed explicitly.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::language::Language;

/// Indonesian function words whose frequency marks a text as local-language.
pub const DEFAULT_MARKER_WORDS: &[&str] = &[
    "yang", "dan", "di", "ke", "dari", "ini", "itu", "dengan", "untuk", "dalam", "adalah",
    "pada", "tidak", "akan", "oleh", "atau", "juga", "karena", "sebagai", "bahwa", "dapat",
    "tersebut", "merupakan", "telah", "sudah", "kami", "kita", "mereka", "sangat", "lebih",
];

/// Language classifier settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageConfig {
    /// Marker words of the local language (case-folded on use).
    pub marker_words: Vec<String>,
    /// Marker occurrences needed to tag a text as local-language.
    pub marker_threshold: usize,
    /// Language for which the rich-language model is attempted.
    pub rich_resource: Language,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            marker_words: DEFAULT_MARKER_WORDS.iter().map(|w| w.to_string()).collect(),
            marker_threshold: 5,
            rich_resource: Language::English,
        }
    }
}

/// Lightweight keyword / summary extractor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LexicalConfig {
    /// Keywords kept per document.
    pub top_k: usize,
    /// Sentences selected for the extractive summary.
    pub summary_sentences: usize,
    /// Tokens shorter than this (in chars) are ignored.
    pub min_token_chars: usize,
    /// Ignore tokens made only of digits.
    pub drop_numeric_tokens: bool,
    /// Stopwords added on top of the built-in lists.
    pub extra_stopwords: BTreeMap<Language, Vec<String>>,
}

impl Default for LexicalConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            summary_sentences: 3,
            min_token_chars: 2,
            drop_numeric_tokens: true,
            extra_stopwords: BTreeMap::new(),
        }
    }
}

/// Reference parser settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceConfig {
    /// Restrict scanning to the text after a "References" style header when one exists.
    pub detect_section_header: bool,
    pub max_entries: usize,
    /// Entry text is truncated to this many chars.
    pub max_entry_chars: usize,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            detect_section_header: true,
            max_entries: 50,
            max_entry_chars: 1000,
        }
    }
}

/// Similarity engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    /// Minimum cosine score for an edge.
    pub threshold: f64,
    pub neighbor_limit: usize,
    pub feature_cache_size: usize,
    pub feature_cache_ttl_secs: u64,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            threshold: 0.3,
            neighbor_limit: 5,
            feature_cache_size: 1000,
            feature_cache_ttl_secs: 3600,
        }
    }
}

/// Rich-language model collaborator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Deadline for a single collaborator call.
    pub timeout_ms: u64,
    /// Text sent to the collaborator is truncated to this many chars.
    pub max_chars: usize,
    /// Shorter texts never attempt the collaborator.
    pub min_chars: usize,
}

impl ModelConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            max_chars: 3000,
            min_chars: 100,
        }
    }
}

/// Top-level Pustaka configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PustakaConfig {
    pub language: LanguageConfig,
    pub lexical: LexicalConfig,
    pub references: ReferenceConfig,
    pub similarity: SimilarityConfig,
    pub model: ModelConfig,
}

impl PustakaConfig {
    /// Load config from a JSON file (defaults when absent), apply env
    /// overrides, then validate.
    pub fn load(config_path: &Path) -> Result<Self> {
        let mut config = if config_path.exists() {
            let raw = std::fs::read_to_string(config_path)?;
            let parsed: PustakaConfig = serde_json::from_str(&raw)?;
            info!("Loaded config from {}", config_path.display());
            parsed
        } else {
            info!(
                "No config at {}, using defaults",
                config_path.display()
            );
            PustakaConfig::default()
        };

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus env overrides.
    pub fn from_env() -> Result<Self> {
        let mut config = PustakaConfig::default();
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Some(v) = env_parse("PUSTAKA_SIMILARITY_THRESHOLD") {
            self.similarity.threshold = v;
        }
        if let Some(v) = env_parse("PUSTAKA_MODEL_TIMEOUT_MS") {
            self.model.timeout_ms = v;
        }
        if let Some(v) = env_parse("PUSTAKA_MARKER_THRESHOLD") {
            self.language.marker_threshold = v;
        }
        if let Some(v) = env_parse("PUSTAKA_TOP_K") {
            self.lexical.top_k = v;
        }
        if let Some(v) = env_parse("PUSTAKA_SUMMARY_SENTENCES") {
            self.lexical.summary_sentences = v;
        }
    }

    /// Reject values no component can work with.
    pub fn validate(&self) -> Result<()> {
        validate_positive("lexical.top_k", self.lexical.top_k)?;
        validate_positive("lexical.summary_sentences", self.lexical.summary_sentences)?;
        validate_positive("language.marker_threshold", self.language.marker_threshold)?;
        validate_positive("references.max_entries", self.references.max_entries)?;
        validate_positive("similarity.feature_cache_size", self.similarity.feature_cache_size)?;
        validate_threshold(self.similarity.threshold)?;
        if self.model.timeout_ms == 0 {
            return Err(Error::InvalidParameter(
                "model.timeout_ms must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Check that a similarity threshold lies in `[0, 1]`.
pub fn validate_threshold(threshold: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(Error::InvalidParameter(format!(
            "similarity threshold must be within [0, 1], got {}",
            threshold
        )));
    }
    Ok(())
}

/// Check that a count parameter is non-zero.
pub fn validate_positive(name: &str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(Error::InvalidParameter(format!(
            "{} must be greater than 0",
            name
        )));
    }
    Ok(())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("Ignoring unparsable {}={:?}", key, raw);
            None
        }
    }
}
