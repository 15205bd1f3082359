//! Built-in stopword and abbreviation lists, and the `Lexicon` built from them.
//!
//! The lists are compile-time constants; a `Lexicon` is assembled once from
//! configuration and shared read-only (`Arc<Lexicon>`) by every component.

use std::collections::{HashMap, HashSet};

use pustaka_core::{Language, LexicalConfig};

pub const INDONESIAN_STOPWORDS: &[&str] = &[
    "ada", "adalah", "adanya", "agar", "akan", "akhirnya", "aku", "amat", "anda", "antara",
    "apa", "apabila", "apakah", "atas", "atau", "bagaimana", "bagi", "bahkan", "bahwa",
    "banyak", "baru", "beberapa", "begitu", "belum", "berada", "berbagai", "berikut",
    "bersama", "besar", "bisa", "boleh", "bukan", "cara", "cukup", "dalam", "dan", "dapat",
    "dari", "daripada", "demikian", "dengan", "di", "dia", "diri", "dua", "hal", "hanya",
    "harus", "hingga", "ia", "ialah", "ini", "itu", "jadi", "jika", "juga", "justru", "kalau",
    "kami", "kamu", "karena", "ke", "kecuali", "kembali", "kemudian", "kepada", "ketika",
    "kita", "lagi", "lain", "lainnya", "lalu", "lebih", "maka", "masih", "melalui", "memang",
    "memiliki", "menjadi", "menurut", "mereka", "merupakan", "meski", "mungkin", "namun",
    "nya", "oleh", "pada", "para", "perlu", "pula", "saat", "saja", "salah", "sama",
    "sampai", "sangat", "satu", "saya", "seba", "sebagai", "sebagaimana", "sebelum",
    "sebuah", "sedang", "sedangkan", "sehingga", "sejak", "sekali", "selain", "selama",
    "seluruh", "semua", "sendiri", "seperti", "serta", "sesuai", "setelah", "setiap",
    "sudah", "supaya", "tanpa", "tapi", "telah", "tempat", "tentang", "terhadap",
    "termasuk", "tersebut", "tetapi", "tidak", "untuk", "yaitu", "yakni", "yang",
];

pub const ENGLISH_STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and",
    "any", "are", "as", "at", "be", "because", "been", "before", "being", "below", "between",
    "both", "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during",
    "each", "few", "for", "from", "further", "had", "has", "have", "having", "he", "her",
    "here", "hers", "herself", "him", "himself", "his", "how", "however", "i", "if", "in",
    "into", "is", "it", "its", "itself", "just", "may", "me", "might", "more", "most", "must",
    "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once", "only", "or",
    "other", "our", "ours", "ourselves", "out", "over", "own", "same", "she", "should", "so",
    "some", "such", "than", "that", "the", "their", "theirs", "them", "themselves", "then",
    "there", "these", "they", "this", "those", "through", "thus", "to", "too", "under",
    "until", "up", "upon", "us", "very", "was", "we", "were", "what", "when", "where",
    "whether", "which", "while", "who", "whom", "why", "will", "with", "within", "would",
    "you", "your", "yours", "yourself", "yourselves",
];

/// Words that end with a period without ending the sentence.
pub const INDONESIAN_ABBREVIATIONS: &[&str] = &[
    "dr", "drs", "dra", "ir", "prof", "dkk", "hlm", "no", "vol", "tbk", "pt", "sdr", "jl",
    "tsb", "dll", "dsb", "al", "gbr", "tab",
];

pub const ENGLISH_ABBREVIATIONS: &[&str] = &[
    "dr", "mr", "mrs", "ms", "prof", "st", "jr", "sr", "vs", "al", "fig", "figs", "eq",
    "no", "vol", "pp", "ed", "eds", "inc", "ltd", "co", "etc", "cf", "approx", "dept",
];

fn builtin_stopwords(language: Language) -> &'static [&'static str] {
    match language {
        Language::Indonesian => INDONESIAN_STOPWORDS,
        Language::English => ENGLISH_STOPWORDS,
    }
}

fn builtin_abbreviations(language: Language) -> &'static [&'static str] {
    match language {
        Language::Indonesian => INDONESIAN_ABBREVIATIONS,
        Language::English => ENGLISH_ABBREVIATIONS,
    }
}

/// Immutable per-language word sets.
#[derive(Debug, Clone)]
pub struct Lexicon {
    stopwords: HashMap<Language, HashSet<String>>,
    abbreviations: HashMap<Language, HashSet<String>>,
}

impl Lexicon {
    /// Built-in lists plus the configured extra stopwords.
    pub fn from_config(config: &LexicalConfig) -> Self {
        let mut stopwords = HashMap::new();
        let mut abbreviations = HashMap::new();

        for &language in Language::all() {
            let mut set: HashSet<String> = builtin_stopwords(language)
                .iter()
                .map(|w| w.to_string())
                .collect();
            if let Some(extra) = config.extra_stopwords.get(&language) {
                set.extend(extra.iter().map(|w| w.trim().to_lowercase()));
            }
            stopwords.insert(language, set);

            abbreviations.insert(
                language,
                builtin_abbreviations(language)
                    .iter()
                    .map(|w| w.to_string())
                    .collect(),
            );
        }

        Self {
            stopwords,
            abbreviations,
        }
    }

    /// `token` must already be lowercase.
    pub fn is_stopword(&self, language: Language, token: &str) -> bool {
        self.stopwords
            .get(&language)
            .map(|set| set.contains(token))
            .unwrap_or(false)
    }

    /// `word` must already be lowercase and carry no trailing period.
    pub fn is_abbreviation(&self, language: Language, word: &str) -> bool {
        self.abbreviations
            .get(&language)
            .map(|set| set.contains(word))
            .unwrap_or(false)
    }

    pub fn stopword_count(&self, language: Language) -> usize {
        self.stopwords.get(&language).map(|s| s.len()).unwrap_or(0)
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::from_config(&LexicalConfig::default())
    }
}
