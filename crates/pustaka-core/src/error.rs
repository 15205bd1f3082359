//! Error types for Pustaka.

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The document text is empty or could not be extracted upstream.
    /// The only error that fails a document.
    #[error("Text unavailable: {0}")]
    TextUnavailable(String),

    #[error("Collaborator unavailable: {0}")]
    CollaboratorUnavailable(String),

    #[error("Collaborator timed out after {0:?}")]
    CollaboratorTimeout(Duration),

    #[error("Parse ambiguity: {0}")]
    ParseAmbiguity(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error ends a processing pass. Everything else is
    /// absorbed by a fallback.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::TextUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_text_unavailable_is_fatal() {
        assert!(Error::TextUnavailable("empty".into()).is_fatal());
        assert!(!Error::CollaboratorTimeout(Duration::from_millis(5)).is_fatal());
        assert!(!Error::CollaboratorUnavailable("offline".into()).is_fatal());
        assert!(!Error::ParseAmbiguity("dup".into()).is_fatal());
    }

    #[test]
    fn test_transition_display() {
        let err = Error::InvalidTransition {
            from: "validated".into(),
            to: "rejected".into(),
        };
        assert_eq!(err.to_string(), "Invalid transition: validated -> rejected");
    }
}
