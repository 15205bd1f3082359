//! Pustaka Ingest: language classification, lexical keywords and summaries,
//! reference parsing, text intake.

pub mod extract;
pub mod ingest;

pub use extract::language::LanguageClassifier;
pub use extract::lexical::{rank_keywords, LexicalExtractor, TermFrequencies};
pub use extract::references::ReferenceParser;
pub use extract::sentences::split_sentences;
pub use extract::stopwords::Lexicon;
pub use extract::{Keyword, ReferenceEntry, TextAnalyzer, ValidationStatus};
pub use ingest::{content_hash, read_text, usable_text};
