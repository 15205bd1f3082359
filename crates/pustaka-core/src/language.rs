//! Language tags understood by the pipeline.

use serde::{Deserialize, Serialize};

/// Language tag assigned to a document by the classifier.
///
/// `Indonesian` is the local language detected through marker words;
/// `English` is the default for everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "id")]
    Indonesian,
    #[serde(rename = "en")]
    English,
}

impl Language {
    /// Short ISO 639-1 tag.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Indonesian => "id",
            Self::English => "en",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "id" | "ind" | "indonesian" => Some(Self::Indonesian),
            "en" | "eng" | "english" => Some(Self::English),
            _ => None,
        }
    }

    pub fn all() -> &'static [Language] {
        &[Self::Indonesian, Self::English]
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}
