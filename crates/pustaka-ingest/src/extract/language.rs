//! Marker-word language classifier.

use std::collections::HashSet;

use pustaka_core::{Language, LanguageConfig};

use super::lexical::word_tokens;

/// Tags text as Indonesian when enough marker words occur, English otherwise.
#[derive(Debug, Clone)]
pub struct LanguageClassifier {
    markers: HashSet<String>,
    threshold: usize,
}

impl LanguageClassifier {
    pub fn new(config: &LanguageConfig) -> Self {
        Self {
            markers: config
                .marker_words
                .iter()
                .map(|w| w.trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
            threshold: config.marker_threshold.max(1),
        }
    }

    /// Classify a text. Pure and deterministic.
    pub fn classify(&self, text: &str) -> Language {
        let tokens = word_tokens(text);

        // Too short to ever reach the threshold
        if tokens.len() < self.threshold {
            return Language::English;
        }

        let mut hits = 0usize;
        for token in &tokens {
            if self.markers.contains(token.as_str()) {
                hits += 1;
                if hits >= self.threshold {
                    return Language::Indonesian;
                }
            }
        }
        Language::English
    }
}

impl Default for LanguageClassifier {
    fn default() -> Self {
        Self::new(&LanguageConfig::default())
    }
}
