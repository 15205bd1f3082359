//! Orchestrator: sequences the per-document analysis stages.
//!
//! One pass classifies the text, picks keyword and summary extractors from
//! an ordered strategy list, parses references, and attaches a feature
//! vector. The rich-language model is tried at most once per stage under a
//! timeout; any failure falls through to the lightweight extractor.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, info, warn};

use pustaka_core::{Error, Language, PustakaConfig, Result};
use pustaka_graph::CorpusDocument;
use pustaka_infer::{
    EmbedderBackend, FeatureCache, FeatureVector, LanguageModel, ModelError, NoopEmbedder,
    NoopModel,
};
use pustaka_ingest::{
    content_hash, rank_keywords, usable_text, Keyword, ReferenceEntry, TextAnalyzer,
};

use crate::progress::{NoopProgress, ProcessingStage, ProgressSink};
use crate::types::*;

/// Per-document pipeline with its collaborators.
pub struct Orchestrator {
    config: Arc<PustakaConfig>,
    analyzer: TextAnalyzer,
    model: Arc<dyn LanguageModel>,
    embedder: Arc<dyn EmbedderBackend>,
    features: FeatureCache,
    progress: Arc<dyn ProgressSink>,
}

impl Orchestrator {
    /// Create an orchestrator with no model, no embedder and no progress sink.
    pub fn new(config: Arc<PustakaConfig>) -> Result<Self> {
        config.validate()?;
        let analyzer = TextAnalyzer::from_config(&config);
        let features = FeatureCache::from_config(&config.similarity);

        info!(
            "Orchestrator initialized: rich_resource={}, model_timeout={}ms",
            config.language.rich_resource, config.model.timeout_ms
        );

        Ok(Self {
            config,
            analyzer,
            model: Arc::new(NoopModel),
            embedder: Arc::new(NoopEmbedder::default()),
            features,
            progress: Arc::new(NoopProgress),
        })
    }

    pub fn with_model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.model = model;
        self
    }

    pub fn with_embedder(mut self, embedder: Arc<dyn EmbedderBackend>) -> Self {
        self.embedder = embedder;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    /// Extractors to try, in order. Lightweight is always last.
    ///
    /// The model is only a candidate for the rich-resource language, when it
    /// reports itself available, and for texts long enough to benefit.
    pub fn strategies(&self, language: Language, text_chars: usize) -> Vec<Strategy> {
        let mut strategies = Vec::with_capacity(2);
        if language == self.config.language.rich_resource
            && text_chars >= self.config.model.min_chars
            && self.model.is_available()
        {
            strategies.push(Strategy::ModelBacked);
        }
        strategies.push(Strategy::Lightweight);
        strategies
    }

    /// Run one analysis pass over `doc`.
    ///
    /// `pending` and `completed` documents may be processed; a `failed` one
    /// must be retried first. Unusable text moves the document to `failed`
    /// and returns `TextUnavailable`. Every other sub-stage problem is
    /// absorbed by the fallback policy.
    pub async fn process(&self, doc: &mut Document) -> Result<ProcessingReport> {
        let started = Instant::now();
        let previous = doc.status;
        doc.transition(ProcessingStatus::Processing)?;
        self.progress.report(doc.id, ProcessingStage::Started, None);
        debug!("Document {}: {} -> processing", doc.id, previous.as_str());

        let text = match usable_text(doc.text.as_deref()) {
            Ok(t) => t.to_string(),
            Err(e) => {
                doc.clear_results();
                doc.error = Some(e.to_string());
                doc.transition(ProcessingStatus::Failed)?;
                self.progress
                    .report(doc.id, ProcessingStage::Failed, Some("text unavailable"));
                warn!("Document {} failed: {}", doc.id, e);
                return Err(e);
            }
        };

        match self.analyze(doc.id, &text).await {
            Ok(analysis) => {
                let report = ProcessingReport {
                    doc_id: doc.id,
                    language: analysis.language,
                    keyword_strategy: analysis.keyword_strategy,
                    summary_strategy: analysis.summary_strategy,
                    reference_count: analysis.references.len(),
                    fallbacks: analysis.fallbacks,
                    elapsed_ms: started.elapsed().as_millis() as u64,
                };

                doc.language = Some(analysis.language);
                doc.keywords = analysis.keywords;
                doc.summary = analysis.summary;
                doc.references = analysis.references;
                doc.content_hash = Some(analysis.content_hash);
                doc.features = Some(analysis.features);
                doc.processed_at = Some(Utc::now());
                doc.error = None;
                doc.transition(ProcessingStatus::Completed)?;
                self.progress.report(doc.id, ProcessingStage::Completed, None);

                info!(
                    "Processed document {}: language={}, keywords={} ({:?}), summary={:?}, references={}, {}ms",
                    doc.id,
                    report.language,
                    doc.keywords.len(),
                    report.keyword_strategy,
                    report.summary_strategy,
                    report.reference_count,
                    report.elapsed_ms
                );
                Ok(report)
            }
            Err(e) => {
                // Not a document failure; leave it as it was
                doc.status = previous;
                Err(e)
            }
        }
    }

    /// Process documents concurrently. Outcomes are independent and in
    /// input order.
    pub async fn process_many(&self, docs: &mut [Document]) -> Vec<Result<ProcessingReport>> {
        for doc in docs.iter() {
            self.progress.report(doc.id, ProcessingStage::Queued, None);
        }
        join_all(docs.iter_mut().map(|doc| self.process(doc))).await
    }

    /// Similarity input for a completed document.
    pub fn corpus_entry(doc: &Document) -> Option<CorpusDocument> {
        if doc.status != ProcessingStatus::Completed {
            return None;
        }
        match (&doc.content_hash, &doc.features) {
            (Some(hash), Some(features)) => {
                Some(CorpusDocument::new(doc.id, hash.clone(), features.clone()))
            }
            _ => None,
        }
    }

    /// Similarity input for every completed document.
    pub fn corpus(docs: &[Document]) -> Vec<CorpusDocument> {
        docs.iter().filter_map(Self::corpus_entry).collect()
    }

    async fn analyze(&self, doc_id: i64, text: &str) -> Result<Analysis> {
        let lexical = &self.analyzer.lexical;
        let top_k = self.config.lexical.top_k;
        let sentence_count = self.config.lexical.summary_sentences;

        let language = self.analyzer.classify(text);
        let strategies = self.strategies(language, text.chars().count());
        debug!("Document {}: language={}, strategies={:?}", doc_id, language, strategies);

        let model_text = truncate_chars(text, self.config.model.max_chars);
        let mut fallbacks = Vec::new();

        // Keywords
        let mut keywords: Option<(Strategy, Vec<Keyword>)> = None;
        for &strategy in &strategies {
            match strategy {
                Strategy::ModelBacked => {
                    let input = model_text.clone();
                    let outcome = self
                        .call_model(move |model, deadline| {
                            model.extract_keywords(&input, top_k, deadline)
                        })
                        .await
                        .and_then(|raw| {
                            let ranked = rank_keywords(raw, top_k);
                            if ranked.is_empty() {
                                Err(ModelError::Failed("empty keyword list".into()))
                            } else {
                                Ok(ranked)
                            }
                        });
                    match outcome {
                        Ok(k) => {
                            keywords = Some((strategy, k));
                            break;
                        }
                        Err(e) => self.fall_back(doc_id, "keywords", e, &mut fallbacks),
                    }
                }
                Strategy::Lightweight => {
                    keywords = Some((strategy, lexical.extract_keywords(text, language, top_k)?));
                    break;
                }
            }
        }
        let (keyword_strategy, keywords) = keywords
            .ok_or_else(|| Error::Internal("no keyword strategy produced a result".into()))?;
        self.progress
            .report(doc_id, ProcessingStage::Keywords, Some(strategy_label(keyword_strategy)));

        // Summary
        let mut summary: Option<(Strategy, String)> = None;
        for &strategy in &strategies {
            match strategy {
                Strategy::ModelBacked => {
                    let input = model_text.clone();
                    let outcome = self
                        .call_model(move |model, deadline| {
                            model.summarize(&input, sentence_count, deadline)
                        })
                        .await
                        .and_then(|s| {
                            let s = s.trim().to_string();
                            if s.is_empty() {
                                Err(ModelError::Failed("blank summary".into()))
                            } else {
                                Ok(s)
                            }
                        });
                    match outcome {
                        Ok(s) => {
                            summary = Some((strategy, s));
                            break;
                        }
                        Err(e) => self.fall_back(doc_id, "summary", e, &mut fallbacks),
                    }
                }
                Strategy::Lightweight => {
                    summary = Some((strategy, lexical.summarize(text, language, sentence_count)?));
                    break;
                }
            }
        }
        let (summary_strategy, summary) = summary
            .ok_or_else(|| Error::Internal("no summary strategy produced a result".into()))?;
        self.progress
            .report(doc_id, ProcessingStage::Summary, Some(strategy_label(summary_strategy)));

        // References run regardless of language or model
        let references = self.analyzer.references.parse(text);
        self.progress.report(doc_id, ProcessingStage::References, None);

        let hash = content_hash(text);
        let features = self.features_for(&hash, text, language);
        self.progress
            .report(doc_id, ProcessingStage::Features, Some(features.kind()));

        Ok(Analysis {
            language,
            keyword_strategy,
            keywords,
            summary_strategy,
            summary,
            references,
            content_hash: hash,
            features,
            fallbacks,
        })
    }

    /// Single model attempt off the async executor, bounded by the
    /// configured timeout. A timed-out call is left to finish and discarded.
    async fn call_model<T, F>(&self, call: F) -> std::result::Result<T, ModelError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn LanguageModel, Duration) -> std::result::Result<T, ModelError>
            + Send
            + 'static,
    {
        let model = self.model.clone();
        let timeout = self.config.model.timeout();
        let handle = tokio::task::spawn_blocking(move || call(model.as_ref(), timeout));

        match tokio::time::timeout(timeout, handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(ModelError::Failed(format!("model task aborted: {}", join_err))),
            Err(_) => Err(ModelError::Timeout(timeout)),
        }
    }

    fn fall_back(&self, doc_id: i64, stage: &str, err: ModelError, fallbacks: &mut Vec<String>) {
        let err: Error = err.into();
        warn!(
            "Document {}: {} model {} failed, using lightweight extractor: {}",
            doc_id,
            self.model.name(),
            stage,
            err
        );
        fallbacks.push(format!("{}: {}", stage, err));
    }

    /// Dense embedding when available, else lexical term weights. Cached by
    /// content hash.
    fn features_for(&self, hash: &str, text: &str, language: Language) -> FeatureVector {
        if let Some(cached) = self.features.get(hash) {
            return cached;
        }

        let dense = if self.embedder.is_available() {
            self.embedder.embed(text).filter(|v| !v.is_empty())
        } else {
            None
        };
        let features = match dense {
            Some(embedding) => FeatureVector::Dense(embedding),
            None => {
                let tf = self.analyzer.lexical.term_frequencies(text, language);
                FeatureVector::Terms(tf.weights())
            }
        };

        self.features.put(hash.to_string(), features.clone());
        features
    }
}

/// Results of the analysis stages, applied to the document at once.
struct Analysis {
    language: Language,
    keyword_strategy: Strategy,
    keywords: Vec<Keyword>,
    summary_strategy: Strategy,
    summary: String,
    references: Vec<ReferenceEntry>,
    content_hash: String,
    features: FeatureVector,
    fallbacks: Vec<String>,
}

fn strategy_label(strategy: Strategy) -> &'static str {
    match strategy {
        Strategy::ModelBacked => "model",
        Strategy::Lightweight => "lightweight",
    }
}

/// Prefix of at most `max_chars` characters, cut on a char boundary.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte, _)) => text[..byte].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::ProgressTracker;
    use parking_lot::Mutex;

    const ENGLISH: &str = "Machine learning models classify documents with high accuracy. \
        Deep learning improves machine learning pipelines for document classification. \
        The weather was pleasant yesterday.";

    const INDONESIAN: &str = "Penelitian ini membahas pembelajaran mesin yang digunakan untuk \
        klasifikasi dokumen. Metode yang diusulkan dapat meningkatkan akurasi dan efisiensi \
        dalam pengolahan dokumen ilmiah.";

    /// Available model returning canned output and recording its inputs.
    struct CannedModel {
        calls: Mutex<Vec<String>>,
    }

    impl CannedModel {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl LanguageModel for CannedModel {
        fn is_available(&self) -> bool {
            true
        }

        fn extract_keywords(
            &self,
            text: &str,
            _top_k: usize,
            _deadline: Duration,
        ) -> std::result::Result<Vec<(String, f64)>, ModelError> {
            self.calls.lock().push(text.to_string());
            Ok(vec![("neural ranking".into(), 0.9), ("corpus".into(), -2.0)])
        }

        fn summarize(
            &self,
            _text: &str,
            _sentence_count: usize,
            _deadline: Duration,
        ) -> std::result::Result<String, ModelError> {
            Ok("  A model summary.  ".into())
        }
    }

    fn orchestrator() -> Orchestrator {
        Orchestrator::new(Arc::new(PustakaConfig::default())).unwrap()
    }

    #[test]
    fn test_strategy_order() {
        let orch = orchestrator().with_model(Arc::new(CannedModel::new()));
        assert_eq!(
            orch.strategies(Language::English, 500),
            vec![Strategy::ModelBacked, Strategy::Lightweight]
        );
        assert_eq!(
            orch.strategies(Language::Indonesian, 500),
            vec![Strategy::Lightweight]
        );
        // Too short for the model
        assert_eq!(orch.strategies(Language::English, 20), vec![Strategy::Lightweight]);

        // Unavailable model is never a candidate
        assert_eq!(
            orchestrator().strategies(Language::English, 500),
            vec![Strategy::Lightweight]
        );
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = PustakaConfig::default();
        config.lexical.top_k = 0;
        assert!(matches!(
            Orchestrator::new(Arc::new(config)),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_truncate_chars_on_boundary() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[tokio::test]
    async fn test_lightweight_pass() {
        let orch = orchestrator();
        let mut doc = Document::new(1, ENGLISH);
        let report = orch.process(&mut doc).await.unwrap();

        assert_eq!(doc.status, ProcessingStatus::Completed);
        assert_eq!(doc.language, Some(Language::English));
        assert_eq!(report.keyword_strategy, Strategy::Lightweight);
        assert!(!doc.keywords.is_empty());
        assert!(doc.keywords.len() <= 10);
        assert!(!doc.summary.is_empty());
        assert!(doc.references.is_empty());
        assert!(matches!(doc.features, Some(FeatureVector::Terms(_))));
        assert_eq!(doc.content_hash.as_deref(), Some(content_hash(ENGLISH).as_str()));
        assert!(doc.processed_at.is_some());
    }

    #[tokio::test]
    async fn test_model_output_normalized() {
        let model = Arc::new(CannedModel::new());
        let orch = orchestrator().with_model(model.clone());
        let mut doc = Document::new(2, ENGLISH);
        let report = orch.process(&mut doc).await.unwrap();

        assert_eq!(report.keyword_strategy, Strategy::ModelBacked);
        assert_eq!(report.summary_strategy, Strategy::ModelBacked);
        assert_eq!(doc.keywords[0].term, "neural ranking");
        assert_eq!(doc.keywords[1].score, 0.0);
        assert_eq!(doc.summary, "A model summary.");
        assert_eq!(model.calls.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_model_input_truncated() {
        let model = Arc::new(CannedModel::new());
        let mut config = PustakaConfig::default();
        config.model.max_chars = 120;
        let orch = Orchestrator::new(Arc::new(config))
            .unwrap()
            .with_model(model.clone());

        let mut doc = Document::new(3, ENGLISH);
        orch.process(&mut doc).await.unwrap();
        assert_eq!(model.calls.lock()[0].chars().count(), 120);
    }

    #[tokio::test]
    async fn test_indonesian_never_calls_model() {
        let model = Arc::new(CannedModel::new());
        let orch = orchestrator().with_model(model.clone());
        let mut doc = Document::new(4, INDONESIAN);
        let report = orch.process(&mut doc).await.unwrap();

        assert_eq!(doc.language, Some(Language::Indonesian));
        assert_eq!(report.keyword_strategy, Strategy::Lightweight);
        assert!(model.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_empty_text_fails_and_retries() {
        let tracker = Arc::new(ProgressTracker::new());
        let orch = orchestrator().with_progress(tracker.clone());

        let mut doc = Document::new(5, "   ");
        let err = orch.process(&mut doc).await.unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(doc.status, ProcessingStatus::Failed);
        assert!(doc.error.is_some());
        assert_eq!(tracker.get(5).unwrap().stage, ProcessingStage::Failed);

        // A failed document must be retried before reprocessing
        assert!(matches!(
            orch.process(&mut doc).await,
            Err(Error::InvalidTransition { .. })
        ));

        doc.retry().unwrap();
        doc.text = Some(ENGLISH.into());
        orch.process(&mut doc).await.unwrap();
        assert_eq!(doc.status, ProcessingStatus::Completed);
        assert_eq!(tracker.get(5).unwrap().percent, 100);
    }

    #[tokio::test]
    async fn test_missing_text_fails() {
        let orch = orchestrator();
        let mut doc = Document::without_text(6);
        assert!(matches!(
            orch.process(&mut doc).await,
            Err(Error::TextUnavailable(_))
        ));
        assert_eq!(doc.status, ProcessingStatus::Failed);
    }

    #[tokio::test]
    async fn test_reprocess_is_idempotent() {
        let orch = orchestrator();
        let mut doc = Document::new(7, format!("{}\n\nReferences\n[1] Smith 2020.\n[2] Jones 2019.", ENGLISH));
        orch.process(&mut doc).await.unwrap();
        let first = (doc.keywords.clone(), doc.summary.clone(), doc.references.clone());

        orch.process(&mut doc).await.unwrap();
        orch.process(&mut doc).await.unwrap();
        assert_eq!((doc.keywords.clone(), doc.summary.clone(), doc.references.clone()), first);
        assert_eq!(doc.references.len(), 2);
    }

    #[tokio::test]
    async fn test_reprocess_with_model_is_idempotent() {
        let orch = orchestrator().with_model(Arc::new(CannedModel::new()));
        let mut doc = Document::new(7, format!("{}\n\nReferences\n[1] Smith 2020.\n[2] Jones 2019.", ENGLISH));
        let report = orch.process(&mut doc).await.unwrap();
        assert_eq!(report.keyword_strategy, Strategy::ModelBacked);
        assert_eq!(report.summary_strategy, Strategy::ModelBacked);
        let first = (doc.keywords.clone(), doc.summary.clone(), doc.references.clone());

        for _ in 0..2 {
            let again = orch.process(&mut doc).await.unwrap();
            assert_eq!(again.keyword_strategy, Strategy::ModelBacked);
            assert_eq!((doc.keywords.clone(), doc.summary.clone(), doc.references.clone()), first);
        }
        assert_eq!(doc.summary, "A model summary.");
    }

    #[tokio::test]
    async fn test_corpus_entry_requires_completion() {
        let orch = orchestrator();
        let mut docs = vec![Document::new(8, ENGLISH), Document::new(9, "")];
        let results = orch.process_many(&mut docs).await;
        assert!(results[0].is_ok());
        assert!(results[1].is_err());

        let corpus = Orchestrator::corpus(&docs);
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus[0].id, 8);
    }
}
