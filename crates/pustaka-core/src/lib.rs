//! Pustaka Core: error taxonomy, language tags, configuration.

pub mod config;
pub mod error;
pub mod language;

pub use config::{
    LanguageConfig, LexicalConfig, ModelConfig, PustakaConfig, ReferenceConfig, SimilarityConfig,
};
pub use error::{Error, Result};
pub use language::Language;
