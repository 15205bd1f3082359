//! Sentence boundary detection.
//!
//! A boundary is terminal punctuation (`.`, `!`, `?`), optionally followed by
//! closing quotes or brackets, then whitespace, then the start of a new clause
//! (an uppercase letter, a digit, or an opening quote/bracket). A blank line
//! always ends a sentence. Periods after a known abbreviation of the text's
//! language ("dkk.", "Dr.", "et al.") never end one.

use pustaka_core::Language;

use super::stopwords::Lexicon;

const CLOSERS: &[char] = &['"', '\'', ')', ']', '\u{201D}', '\u{2019}'];
const OPENERS: &[char] = &['"', '\'', '(', '[', '\u{201C}', '\u{2018}'];

/// Split text into trimmed sentences, in document order.
pub fn split_sentences<'a>(text: &'a str, language: Language, lexicon: &Lexicon) -> Vec<&'a str> {
    let mut sentences = Vec::new();
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut start = 0usize;
    let mut i = 0usize;

    while i < chars.len() {
        let (pos, c) = chars[i];

        // Paragraph break
        if c == '\n' {
            let mut j = i + 1;
            while j < chars.len() && chars[j].1.is_whitespace() && chars[j].1 != '\n' {
                j += 1;
            }
            if j < chars.len() && chars[j].1 == '\n' {
                push_trimmed(&mut sentences, &text[start..pos]);
                start = chars[j].0;
                i = j;
                continue;
            }
        }

        if matches!(c, '.' | '!' | '?') {
            // Closing quotes/brackets belong to this sentence
            let mut end = i;
            while end + 1 < chars.len() && CLOSERS.contains(&chars[end + 1].1) {
                end += 1;
            }
            let mut next = end + 1;
            let mut saw_space = false;
            while next < chars.len() && chars[next].1.is_whitespace() {
                saw_space = true;
                next += 1;
            }

            let opens_clause = next < chars.len() && {
                let n = chars[next].1;
                n.is_uppercase() || n.is_numeric() || OPENERS.contains(&n)
            };

            if saw_space
                && opens_clause
                && !(c == '.' && ends_with_abbreviation(&text[start..pos], language, lexicon))
            {
                let end_byte = chars[end].0 + chars[end].1.len_utf8();
                push_trimmed(&mut sentences, &text[start..end_byte]);
                start = end_byte;
                i = next;
                continue;
            }
        }

        i += 1;
    }

    push_trimmed(&mut sentences, &text[start..]);
    sentences
}

fn push_trimmed<'a>(sentences: &mut Vec<&'a str>, s: &'a str) {
    let s = s.trim();
    if !s.is_empty() {
        sentences.push(s);
    }
}

/// Whether the word right before a period is an abbreviation.
fn ends_with_abbreviation(before: &str, language: Language, lexicon: &Lexicon) -> bool {
    let word: String = before
        .chars()
        .rev()
        .take_while(|c| c.is_alphabetic())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if word.is_empty() {
        return false;
    }
    lexicon.is_abbreviation(language, &word.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(text: &str) -> Vec<&str> {
        split_sentences(text, Language::Indonesian, &Lexicon::default())
    }

    #[test]
    fn test_basic_split() {
        let text = "Kalimat 1 tentang topik X. Kalimat 2 tentang topik Y. Kalimat 3 tentang topik Z.";
        assert_eq!(
            split(text),
            vec![
                "Kalimat 1 tentang topik X.",
                "Kalimat 2 tentang topik Y.",
                "Kalimat 3 tentang topik Z."
            ]
        );
    }

    #[test]
    fn test_lowercase_continuation_does_not_split() {
        let text = "Nilai naik e.g. sebesar dua kali. Hasil berikutnya stabil.";
        assert_eq!(
            split(text),
            vec!["Nilai naik e.g. sebesar dua kali.", "Hasil berikutnya stabil."]
        );
    }

    #[test]
    fn test_abbreviation_does_not_split() {
        let text = "Menurut Santoso dkk. Metode ini efektif. Dr. Wati setuju.";
        assert_eq!(
            split(text),
            vec!["Menurut Santoso dkk. Metode ini efektif.", "Dr. Wati setuju."]
        );
    }

    #[test]
    fn test_question_and_quotes() {
        let text = "Is it \"done?\" Yes! (Mostly.) Fine";
        assert_eq!(
            split_sentences(text, Language::English, &Lexicon::default()),
            vec!["Is it \"done?\"", "Yes!", "(Mostly.)", "Fine"]
        );
    }

    #[test]
    fn test_paragraph_break_ends_sentence() {
        let text = "Judul Bab\n\nIsi paragraf pertama. Isi kedua";
        assert_eq!(
            split(text),
            vec!["Judul Bab", "Isi paragraf pertama.", "Isi kedua"]
        );
    }

    #[test]
    fn test_decimal_and_empty() {
        assert_eq!(split("Nilai 3.5 persen naik."), vec!["Nilai 3.5 persen naik."]);
        assert!(split("").is_empty());
        assert!(split("   \n\n  ").is_empty());
    }
}
