//! Lightweight lexical extractor: frequency-based keywords and extractive
//! summaries.
//!
//! Needs no model and never fails on well-formed input, which makes it the
//! unconditional fallback for the rich-language model. Tokenization is a
//! single linear pass; ranking is a sort over the candidate vocabulary.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use pustaka_core::config::validate_positive;
use pustaka_core::{Language, LexicalConfig, Result};

use super::sentences::split_sentences;
use super::stopwords::Lexicon;
use super::Keyword;

/// Lowercased alphanumeric word tokens, nothing filtered.
pub fn word_tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

/// Split text into runs of adjacent lowercased words.
///
/// Whitespace, hyphens and apostrophes separate words inside a run; any
/// other punctuation or control character ends the run, so phrase
/// candidates never straddle a comma or a sentence end.
pub fn token_runs(text: &str) -> Vec<Vec<String>> {
    let mut runs = Vec::new();
    let mut run: Vec<String> = Vec::new();
    let mut word = String::new();

    for c in text.chars() {
        if c.is_alphanumeric() {
            word.extend(c.to_lowercase());
            continue;
        }
        if !word.is_empty() {
            run.push(std::mem::take(&mut word));
        }
        let separates_words = c.is_whitespace() || matches!(c, '-' | '\'' | '\u{2019}');
        if !separates_words && !run.is_empty() {
            runs.push(std::mem::take(&mut run));
        }
    }
    if !word.is_empty() {
        run.push(word);
    }
    if !run.is_empty() {
        runs.push(run);
    }
    runs
}

/// Unigram counts over the filtered tokens of a text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermFrequencies {
    pub counts: BTreeMap<String, usize>,
    pub total: usize,
}

impl TermFrequencies {
    pub fn get(&self, term: &str) -> usize {
        self.counts.get(term).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Relative frequencies, for use as a term-weight feature vector.
    pub fn weights(&self) -> BTreeMap<String, f64> {
        if self.total == 0 {
            return BTreeMap::new();
        }
        let total = self.total as f64;
        self.counts
            .iter()
            .map(|(term, &count)| (term.clone(), count as f64 / total))
            .collect()
    }
}

/// Frequency/stopword-based keyword and summary extractor.
#[derive(Debug, Clone)]
pub struct LexicalExtractor {
    lexicon: Arc<Lexicon>,
    min_token_chars: usize,
    drop_numeric_tokens: bool,
}

impl LexicalExtractor {
    pub fn new(lexicon: Arc<Lexicon>, config: &LexicalConfig) -> Self {
        Self {
            lexicon,
            min_token_chars: config.min_token_chars,
            drop_numeric_tokens: config.drop_numeric_tokens,
        }
    }

    /// Whether a lowercased token takes part in scoring.
    fn keeps(&self, token: &str, language: Language) -> bool {
        if token.chars().count() < self.min_token_chars {
            return false;
        }
        if self.drop_numeric_tokens && token.chars().all(|c| c.is_numeric()) {
            return false;
        }
        !self.lexicon.is_stopword(language, token)
    }

    /// Filtered tokens of a text in document order.
    pub fn filtered_tokens(&self, text: &str, language: Language) -> Vec<String> {
        word_tokens(text)
            .into_iter()
            .filter(|t| self.keeps(t, language))
            .collect()
    }

    /// The shared scoring primitive: term frequency over filtered tokens.
    pub fn term_frequencies(&self, text: &str, language: Language) -> TermFrequencies {
        let mut tf = TermFrequencies::default();
        for token in self.filtered_tokens(text, language) {
            *tf.counts.entry(token).or_insert(0) += 1;
            tf.total += 1;
        }
        tf
    }

    /// Rank unigrams and adjacent-token bigrams by frequency score.
    ///
    /// A bigram scores the sum of its two unigram frequencies. Ties are
    /// broken by ascending term. Returns at most `top_k` keywords.
    pub fn extract_keywords(
        &self,
        text: &str,
        language: Language,
        top_k: usize,
    ) -> Result<Vec<Keyword>> {
        validate_positive("top_k", top_k)?;

        let tf = self.term_frequencies(text, language);
        if tf.is_empty() {
            return Ok(Vec::new());
        }

        let mut candidates: HashMap<String, f64> = tf
            .counts
            .iter()
            .map(|(term, &count)| (term.clone(), count as f64))
            .collect();

        for run in token_runs(text) {
            let mut prev: Option<&str> = None;
            for token in &run {
                if !self.keeps(token, language) {
                    prev = None;
                    continue;
                }
                if let Some(p) = prev {
                    if p != token.as_str() {
                        let score = (tf.get(p) + tf.get(token)) as f64;
                        candidates
                            .entry(format!("{} {}", p, token))
                            .or_insert(score);
                    }
                }
                prev = Some(token.as_str());
            }
        }

        Ok(rank_keywords(candidates.into_iter().collect(), top_k))
    }

    /// Select the `sentence_count` best sentences and re-emit them in their
    /// original order.
    ///
    /// A sentence scores the mean term frequency of its kept tokens; ties go
    /// to the earlier sentence. Output is a subsequence of the source
    /// sentences joined by single spaces.
    pub fn summarize(
        &self,
        text: &str,
        language: Language,
        sentence_count: usize,
    ) -> Result<String> {
        validate_positive("sentence_count", sentence_count)?;

        let sentences = split_sentences(text, language, &self.lexicon);
        if sentences.is_empty() {
            return Ok(String::new());
        }
        if sentences.len() <= sentence_count {
            return Ok(sentences.join(" "));
        }

        let tf = self.term_frequencies(text, language);
        let mut scored: Vec<(usize, f64)> = sentences
            .iter()
            .enumerate()
            .map(|(i, sentence)| {
                let tokens = self.filtered_tokens(sentence, language);
                if tokens.is_empty() {
                    return (i, 0.0);
                }
                let sum: usize = tokens.iter().map(|t| tf.get(t)).sum();
                (i, sum as f64 / tokens.len() as f64)
            })
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        let mut chosen: Vec<usize> = scored
            .into_iter()
            .take(sentence_count)
            .map(|(i, _)| i)
            .collect();
        chosen.sort_unstable();

        Ok(chosen
            .into_iter()
            .map(|i| sentences[i])
            .collect::<Vec<_>>()
            .join(" "))
    }
}

/// Sort candidates by descending score then ascending term, keep `top_k`,
/// and assign 1-based ranks. Negative and NaN scores are clamped to zero.
pub fn rank_keywords(candidates: Vec<(String, f64)>, top_k: usize) -> Vec<Keyword> {
    // Best score per distinct term
    let mut best: BTreeMap<String, f64> = BTreeMap::new();
    for (term, score) in candidates {
        let term = term.trim().to_string();
        if term.is_empty() {
            continue;
        }
        let score = if score.is_nan() { 0.0 } else { score.max(0.0) };
        let slot = best.entry(term).or_insert(score);
        if score > *slot {
            *slot = score;
        }
    }

    let mut candidates: Vec<(String, f64)> = best.into_iter().collect();
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    candidates.truncate(top_k);

    candidates
        .into_iter()
        .enumerate()
        .map(|(i, (term, score))| Keyword {
            term,
            score,
            rank: i + 1,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> LexicalExtractor {
        LexicalExtractor::new(Arc::new(Lexicon::default()), &LexicalConfig::default())
    }

    #[test]
    fn test_token_runs_break_on_punctuation() {
        let runs = token_runs("Deep-learning works, mostly. Data's fine");
        assert_eq!(
            runs,
            vec![
                vec!["deep".to_string(), "learning".into(), "works".into()],
                vec!["mostly".to_string()],
                vec!["data".to_string(), "s".into(), "fine".into()],
            ]
        );
    }

    #[test]
    fn test_term_frequencies_drop_stopwords_and_numbers() {
        let tf = extractor().term_frequencies(
            "Penelitian dan penelitian dengan data 2020 x",
            Language::Indonesian,
        );
        assert_eq!(tf.get("penelitian"), 2);
        assert_eq!(tf.get("data"), 1);
        assert_eq!(tf.get("dan"), 0);
        assert_eq!(tf.get("2020"), 0);
        assert_eq!(tf.get("x"), 0);
        assert_eq!(tf.total, 3);
    }

    #[test]
    fn test_keywords_ranked_with_bigrams() {
        let text = "Machine learning dan deep learning untuk klasifikasi dokumen. \
                    Machine learning adalah teknologi penting. \
                    Deep learning memberikan akurasi tinggi.";
        let keywords = extractor()
            .extract_keywords(text, Language::Indonesian, 5)
            .unwrap();

        assert_eq!(keywords.len(), 5);
        // learning=4, machine=2, deep=2, memberikan=1
        assert_eq!(keywords[0].term, "deep learning");
        assert_eq!(keywords[0].score, 6.0);
        assert_eq!(keywords[1].term, "machine learning");
        assert_eq!(keywords[2].term, "learning memberikan");
        assert_eq!(keywords[2].score, 5.0);
        assert_eq!(keywords[3].term, "learning");
        assert_eq!(keywords[3].score, 4.0);
        for (i, kw) in keywords.iter().enumerate() {
            assert_eq!(kw.rank, i + 1);
        }
    }

    #[test]
    fn test_keywords_sorted_and_bounded() {
        let text = "alpha beta gamma alpha beta alpha delta, epsilon zeta eta theta.";
        let keywords = extractor()
            .extract_keywords(text, Language::English, 4)
            .unwrap();
        assert!(keywords.len() <= 4);
        for pair in keywords.windows(2) {
            assert!(
                pair[0].score > pair[1].score
                    || (pair[0].score == pair[1].score && pair[0].term < pair[1].term)
            );
        }
        assert!(keywords.iter().all(|k| k.score >= 0.0));
    }

    #[test]
    fn test_keywords_small_vocabulary_and_empty() {
        let ex = extractor();
        let keywords = ex.extract_keywords("Kata", Language::Indonesian, 10).unwrap();
        assert_eq!(keywords.len(), 1);
        assert!(ex.extract_keywords("", Language::English, 10).unwrap().is_empty());
        assert!(ex
            .extract_keywords("the and of", Language::English, 10)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_keywords_reject_zero_top_k() {
        assert!(extractor()
            .extract_keywords("some text", Language::English, 0)
            .is_err());
    }

    #[test]
    fn test_bigrams_skip_stopword_gaps() {
        let keywords = extractor()
            .extract_keywords("data dan model", Language::Indonesian, 10)
            .unwrap();
        let terms: Vec<&str> = keywords.iter().map(|k| k.term.as_str()).collect();
        assert!(!terms.contains(&"data model"));
        assert_eq!(terms, vec!["data", "model"]);
    }

    #[test]
    fn test_summary_keeps_original_order() {
        let text = "Kalimat 1 tentang topik X. Kalimat 2 tentang topik Y. Kalimat 3 tentang topik Z.";
        let summary = extractor()
            .summarize(text, Language::Indonesian, 2)
            .unwrap();
        assert_eq!(summary, "Kalimat 1 tentang topik X. Kalimat 2 tentang topik Y.");
    }

    #[test]
    fn test_summary_selects_by_score_but_emits_in_order() {
        let text = "Cuaca cerah sekali. \
                    Machine learning mengubah riset machine learning. \
                    Kucing tidur. \
                    Riset machine learning butuh data.";
        let summary = extractor()
            .summarize(text, Language::Indonesian, 2)
            .unwrap();
        assert_eq!(
            summary,
            "Machine learning mengubah riset machine learning. Riset machine learning butuh data."
        );
    }

    #[test]
    fn test_summary_edge_cases() {
        let ex = extractor();
        assert_eq!(ex.summarize("", Language::English, 3).unwrap(), "");
        assert_eq!(
            ex.summarize("Only one sentence here.", Language::English, 3)
                .unwrap(),
            "Only one sentence here."
        );
        assert!(ex.summarize("Text.", Language::English, 0).is_err());
    }

    #[test]
    fn test_rank_keywords_clamps_scores() {
        let ranked = rank_keywords(
            vec![
                ("b".into(), -1.0),
                ("a".into(), f64::NAN),
                ("c".into(), 2.0),
                ("  ".into(), 9.0),
            ],
            10,
        );
        let terms: Vec<&str> = ranked.iter().map(|k| k.term.as_str()).collect();
        assert_eq!(terms, vec!["c", "a", "b"]);
        assert!(ranked.iter().all(|k| k.score >= 0.0));
    }
}
