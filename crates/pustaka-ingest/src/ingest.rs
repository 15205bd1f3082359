//! Text intake: usability check, content hashing, plain-text file reading.

use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::debug;

use pustaka_core::{Error, Result};

/// Compute SHA-256 content hash.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

/// The text itself when it has any non-whitespace content.
///
/// `None` means upstream extraction produced nothing. Both that and a blank
/// string are `TextUnavailable`, the only fatal condition of a pass.
pub fn usable_text(text: Option<&str>) -> Result<&str> {
    match text {
        Some(t) if !t.trim().is_empty() => Ok(t),
        Some(_) => Err(Error::TextUnavailable("extracted text is empty".into())),
        None => Err(Error::TextUnavailable("no text was extracted".into())),
    }
}

/// Read a UTF-8 text file. Content that looks binary is unavailable text.
pub fn read_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    let content = match String::from_utf8(bytes) {
        Ok(c) => c,
        Err(_) => {
            debug!("Not UTF-8: {}", path.display());
            return Err(Error::TextUnavailable(format!(
                "{} is not UTF-8 text",
                path.display()
            )));
        }
    };

    let control = content
        .chars()
        .filter(|c| c.is_control() && !matches!(c, '\n' | '\r' | '\t'))
        .count();
    if control > content.len() / 10 {
        debug!("Likely binary: {}", path.display());
        return Err(Error::TextUnavailable(format!(
            "{} looks like binary content",
            path.display()
        )));
    }

    Ok(content)
}
