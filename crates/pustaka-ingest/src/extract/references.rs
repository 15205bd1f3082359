//! Line-oriented bibliography parser.
//!
//! A line starting with an enumerator (`[12]`, `12.`, `12)`, or a bracketed
//! label such as `[Smi20]`) opens a new entry; any other non-blank line is a
//! continuation of the previous entry. When no enumerated entry exists, lines
//! opening with an author-year citation (`Smith, J. (2020).`) start entries
//! instead. Entries repeating an earlier one are dropped. Never fails: text
//! without reference-like lines yields an empty list.

use std::collections::{BTreeSet, HashSet};

use once_cell::sync::Lazy;
use pustaka_core::{Error, ReferenceConfig};
use regex::Regex;
use tracing::debug;

use super::ReferenceEntry;

/// Leading enumerator. Bracketed labels must contain a digit so "[Online]"
/// stays a continuation; numeric `n.`/`n)` forms need trailing whitespace so
/// decimals and years ("2019.") do not match.
static ENUMERATOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:\[([^\[\]\s\d]{0,8}\d[^\[\]\s]{0,8})\]\s*|(\d{1,3})[.)](?:\s+|$))(.*)$")
        .unwrap()
});

/// A line that is only a bibliography section header.
static SECTION_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?im)^[ \t]*(?:references|bibliography|daftar[ \t]+pustaka|referensi|works[ \t]+cited)[ \t]*:?[ \t\r]*$",
    )
    .unwrap()
});

/// Author-year entry start: a surname and initial, then a parenthesised year
/// on the same line ("Smith, J. (2020).", "Lee, K., & Park, S. (2019a).").
static AUTHOR_YEAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\p{Lu}[\p{L}'\-]+,\s+\p{Lu}\.[^()]{0,160}?\((?:19|20)\d{2}[a-z]?\)")
        .unwrap()
});

/// Characters compared when looking for repeated entries.
const DEDUP_PREFIX_CHARS: usize = 100;

/// Raw entry before index assignment.
struct RawEntry {
    number: Option<u32>,
    text: String,
}

/// Parser for numbered reference lists.
#[derive(Debug, Clone)]
pub struct ReferenceParser {
    detect_section_header: bool,
    max_entries: usize,
    max_entry_chars: usize,
}

impl ReferenceParser {
    pub fn new(config: &ReferenceConfig) -> Self {
        Self {
            detect_section_header: config.detect_section_header,
            max_entries: config.max_entries,
            max_entry_chars: config.max_entry_chars,
        }
    }

    /// Parse reference entries in source order.
    pub fn parse(&self, text: &str) -> Vec<ReferenceEntry> {
        let section = if self.detect_section_header {
            reference_section(text)
        } else {
            text
        };

        let mut raw = enumerated_entries(section);
        if raw.is_empty() {
            raw = author_year_entries(section);
            if !raw.is_empty() {
                debug!("No enumerated references, using {} author-year entries", raw.len());
            }
        }

        drop_repeats(&mut raw);
        raw.truncate(self.max_entries);

        let indices = assign_indices(&raw);
        raw.into_iter()
            .zip(indices)
            .map(|(entry, index)| {
                ReferenceEntry::new(index, self.clean_text(&entry.text))
            })
            .collect()
    }

    /// Collapse whitespace to a single line and cap the length.
    fn clean_text(&self, text: &str) -> String {
        let single_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if single_line.chars().count() <= self.max_entry_chars {
            single_line
        } else {
            single_line.chars().take(self.max_entry_chars).collect()
        }
    }
}

impl Default for ReferenceParser {
    fn default() -> Self {
        Self::new(&ReferenceConfig::default())
    }
}

/// Text after the last bibliography header, or the whole text when none.
fn reference_section(text: &str) -> &str {
    match SECTION_HEADER_RE.find_iter(text).last() {
        Some(m) => &text[m.end()..],
        None => text,
    }
}

/// Entries opened by a leading enumerator.
fn enumerated_entries(section: &str) -> Vec<RawEntry> {
    let mut raw: Vec<RawEntry> = Vec::new();
    for line in section.lines() {
        if let Some(caps) = ENUMERATOR_RE.captures(line) {
            let label = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str());
            let number = label.and_then(|l| l.parse::<u32>().ok()).filter(|&n| n > 0);
            let body = caps.get(3).map(|m| m.as_str().trim()).unwrap_or("");
            raw.push(RawEntry {
                number,
                text: body.to_string(),
            });
        } else {
            continue_last(&mut raw, line);
        }
    }
    raw.retain(|entry| !entry.text.trim().is_empty());
    raw
}

/// Unnumbered entries opened by an author-year citation; indices are positional.
fn author_year_entries(section: &str) -> Vec<RawEntry> {
    let mut raw: Vec<RawEntry> = Vec::new();
    for line in section.lines() {
        if AUTHOR_YEAR_RE.is_match(line) {
            raw.push(RawEntry {
                number: None,
                text: line.trim().to_string(),
            });
        } else {
            continue_last(&mut raw, line);
        }
    }
    raw
}

/// Append a non-blank line to the last entry. Lines before the first entry
/// are preamble.
fn continue_last(raw: &mut [RawEntry], line: &str) {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return;
    }
    if let Some(last) = raw.last_mut() {
        if !last.text.is_empty() {
            last.text.push(' ');
        }
        last.text.push_str(trimmed);
    }
}

/// Keep the first of entries whose leading text matches ignoring case and
/// spacing.
fn drop_repeats(raw: &mut Vec<RawEntry>) {
    let mut seen = HashSet::new();
    raw.retain(|entry| {
        let key: String = entry
            .text
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .chars()
            .take(DEDUP_PREFIX_CHARS)
            .collect::<String>()
            .to_lowercase();
        let first = seen.insert(key);
        if !first {
            debug!("Dropping repeated reference {:?}", entry.text);
        }
        first
    });
}

/// Sequence indices: the enumerator value when parsable and unused,
/// otherwise the 1-based position, otherwise the next index above all
/// used ones. Indices are unique.
fn assign_indices(entries: &[RawEntry]) -> Vec<u32> {
    let mut used: BTreeSet<u32> = BTreeSet::new();
    let mut indices = Vec::with_capacity(entries.len());

    for (pos, entry) in entries.iter().enumerate() {
        let position = pos as u32 + 1;
        let index = match entry.number {
            Some(n) if !used.contains(&n) => n,
            other => {
                if let Some(n) = other {
                    let ambiguity =
                        Error::ParseAmbiguity(format!("duplicate enumerator {} at entry {}", n, position));
                    debug!("{}; using positional index", ambiguity);
                }
                if !used.contains(&position) {
                    position
                } else {
                    used.iter().next_back().copied().unwrap_or(0) + 1
                }
            }
        };
        used.insert(index);
        indices.push(index);
    }

    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ValidationStatus;

    fn parse(text: &str) -> Vec<ReferenceEntry> {
        ReferenceParser::default().parse(text)
    }

    #[test]
    fn test_bracket_entries_with_continuation() {
        let refs = parse("[1] Smith 2020.\ncontinued line.\n[2] Jones 2019.");
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].index, 1);
        assert_eq!(refs[0].text, "Smith 2020. continued line.");
        assert_eq!(refs[1].index, 2);
        assert_eq!(refs[1].text, "Jones 2019.");
        assert!(refs.iter().all(|r| r.status == ValidationStatus::Pending));
        assert!(refs.iter().all(|r| r.note.is_none()));
    }

    #[test]
    fn test_dot_and_paren_enumerators() {
        let text = "1. Author, A. (2020). Title one.\n   Journal of Things.\n2) Author, B. 2021.\n12. Third entry.";
        let refs = parse(text);
        let indices: Vec<u32> = refs.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![1, 2, 12]);
        assert_eq!(refs[0].text, "Author, A. (2020). Title one. Journal of Things.");
    }

    #[test]
    fn test_no_references_is_empty() {
        assert!(parse("").is_empty());
        assert!(parse("Just a paragraph of prose.\nAnother line.").is_empty());
    }

    #[test]
    fn test_years_and_decimals_are_continuations() {
        let refs = parse("[1] Smith, J.\n2019. A study.\n3.5 percent of cases.");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].text, "Smith, J. 2019. A study. 3.5 percent of cases.");
    }

    #[test]
    fn test_unparsable_label_uses_position() {
        let refs = parse("[Smi20] Smith 2020.\n[Jon19] Jones 2019.");
        let indices: Vec<u32> = refs.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![1, 2]);
    }

    #[test]
    fn test_duplicate_numbers_stay_unique() {
        let refs = parse("[1] A.\n[1] B.\n[2] C.\n[2] D.");
        let indices: Vec<u32> = refs.iter().map(|r| r.index).collect();
        // Repeated numbers fall back to their positions
        assert_eq!(indices, vec![1, 2, 3, 4]);
        let unique: BTreeSet<u32> = indices.iter().copied().collect();
        assert_eq!(unique.len(), indices.len());
    }

    #[test]
    fn test_colliding_position_moves_past_max() {
        let refs = parse("[2] A.\n[2] B.\n[1] C.");
        let indices: Vec<u32> = refs.iter().map(|r| r.index).collect();
        // B: 2 taken, position 2 taken → 3; C keeps 1
        assert_eq!(indices, vec![2, 3, 1]);
    }

    #[test]
    fn test_section_header_restricts_scan() {
        let text = "Pendahuluan\n1. Latar belakang masalah.\n2. Rumusan masalah.\n\nDaftar Pustaka\n[1] Santoso 2021. Judul.\n[2] Wati 2020.";
        let refs = parse(text);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].text, "Santoso 2021. Judul.");

        let parser = ReferenceParser::new(&ReferenceConfig {
            detect_section_header: false,
            ..ReferenceConfig::default()
        });
        assert_eq!(parser.parse(text).len(), 4);
    }

    #[test]
    fn test_limits() {
        let text: String = (1..=60).map(|i| format!("[{}] Entry {}\n", i, i)).collect();
        assert_eq!(parse(&text).len(), 50);

        let parser = ReferenceParser::new(&ReferenceConfig {
            max_entry_chars: 5,
            ..ReferenceConfig::default()
        });
        assert_eq!(parser.parse("[1] Abcdefghij")[0].text, "Abcde");
    }

    #[test]
    fn test_bracketed_word_is_continuation() {
        let refs = parse("[3] Doe, \"Paper,\" 2018.\n[Online]. Available: https://example.org");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].index, 3);
        assert!(refs[0].text.ends_with("[Online]. Available: https://example.org"));
    }

    #[test]
    fn test_empty_entry_dropped() {
        let refs = parse("[1]\n[2] Real entry.");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].index, 2);
    }

    #[test]
    fn test_author_year_entries_without_enumerators() {
        let refs = parse(
            "References\nSmith, J. (2020). Deep learning for text. Journal of AI.\n\
             Jones, K. (2019). Text mining. ACM Press.",
        );
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].index, 1);
        assert_eq!(refs[0].text, "Smith, J. (2020). Deep learning for text. Journal of AI.");
        assert_eq!(refs[1].index, 2);
        assert_eq!(refs[1].text, "Jones, K. (2019). Text mining. ACM Press.");
        assert!(refs.iter().all(|r| r.status == ValidationStatus::Pending));
    }

    #[test]
    fn test_author_year_continuations_and_preamble() {
        let text = "Daftar Pustaka\nSumber yang dikutip:\n\
                    Santoso, B., & Wati, R. (2021a). Klasifikasi dokumen.\n   Jurnal Informatika, 5(2), 10-20.\n\
                    Lee, K. (2018). Neural ranking. ACM.";
        let refs = parse(text);
        assert_eq!(refs.len(), 2);
        assert_eq!(
            refs[0].text,
            "Santoso, B., & Wati, R. (2021a). Klasifikasi dokumen. Jurnal Informatika, 5(2), 10-20."
        );
        assert_eq!(refs[1].index, 2);
    }

    #[test]
    fn test_enumerated_entries_take_precedence() {
        let refs = parse("[1] Smith, J. (2020). First.\nJones, K. (2019). Second.");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].text, "Smith, J. (2020). First. Jones, K. (2019). Second.");
    }

    #[test]
    fn test_prose_citation_without_initial_is_ignored() {
        assert!(parse("As Smith (2020) showed, results vary.\nMore prose here.").is_empty());
    }

    #[test]
    fn test_repeated_entries_dropped() {
        let refs = parse(
            "[1] Smith, J. Deep learning for text. 2020.\n[2] Smith, J. Deep learning for text. 2020.",
        );
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].index, 1);

        // Case and spacing are ignored; later distinct entries keep their numbers
        let refs = parse("[1] Smith, J. Deep.\n[2] SMITH,  J. deep.\n[3] Jones 2019.");
        let indices: Vec<u32> = refs.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![1, 3]);
    }

    #[test]
    fn test_repeats_do_not_count_toward_limit() {
        let mut text = String::new();
        for i in 1..=55 {
            text.push_str(&format!("[{}] Entry {}\n", i, i.min(10)));
        }
        text.push_str("[56] Last entry\n");
        let refs = parse(&text);
        assert_eq!(refs.len(), 11);
        assert_eq!(refs[10].text, "Last entry");
    }

    #[test]
    fn test_enumerator_alone_takes_next_line() {
        let refs = parse("[1]\nSmith 2020.\n[2] Jones.");
        assert_eq!(refs[0].text, "Smith 2020.");
        assert_eq!(refs[0].index, 1);
    }
}
