//! Language resources for summarisation.
//!
//! Holds the per-language stop-word set and the abbreviation set used by
//! sentence segmentation. Both are static data compiled into the binary,
//! built once on first access and read-only afterwards, so they can be
//! shared freely across tasks.

use lazy_static::lazy_static;
use std::collections::HashSet;

/// Languages with bundled stop-word and sentence-boundary resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
}

impl Language {
    /// Parse a language tag from configuration (e.g. `"english"` or `"en"`).
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "english" | "en" => Some(Language::English),
            _ => None,
        }
    }

    /// Stop words excluded from frequency scoring.
    pub fn stop_words(&self) -> &'static HashSet<&'static str> {
        match self {
            Language::English => &ENGLISH_STOP_WORDS,
        }
    }

    /// Abbreviations that suppress a sentence break after a period.
    ///
    /// Entries are lowercase with interior dots stripped, matching how the
    /// segmenter normalises the token before the period (`"e.g."` -> `"eg"`).
    pub fn abbreviations(&self) -> &'static HashSet<&'static str> {
        match self {
            Language::English => &ENGLISH_ABBREVIATIONS,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Language::English => write!(f, "english"),
        }
    }
}

/// English functional words: articles, prepositions, pronouns, auxiliaries.
///
/// Includes the bare contraction fragments (`don`, `t`, `ve`, ...) because
/// word tokenisation splits on the apostrophe.
const ENGLISH_STOP_WORD_LIST: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
    "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
    "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
    "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
    "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an",
    "the", "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by",
    "for", "with", "about", "against", "between", "into", "through", "during", "before",
    "after", "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over",
    "under", "again", "further", "then", "once", "here", "there", "when", "where", "why",
    "how", "all", "any", "both", "each", "few", "more", "most", "other", "some", "such",
    "no", "nor", "not", "only", "own", "same", "so", "than", "too", "very", "s", "t", "can",
    "will", "just", "don", "should", "now", "d", "ll", "m", "o", "re", "ve", "y", "ain",
    "aren", "couldn", "didn", "doesn", "hadn", "hasn", "haven", "isn", "ma", "mightn",
    "mustn", "needn", "shan", "shouldn", "wasn", "weren", "won", "wouldn",
];

/// Abbreviations commonly followed by a period mid-sentence.
const ENGLISH_ABBREVIATION_LIST: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "rev", "hon", "sr", "jr", "st", "vs", "etc", "eg",
    "ie", "cf", "al", "approx", "dept", "fig", "inc", "ltd", "co", "corp", "est",
];

lazy_static! {
    static ref ENGLISH_STOP_WORDS: HashSet<&'static str> =
        ENGLISH_STOP_WORD_LIST.iter().copied().collect();
    static ref ENGLISH_ABBREVIATIONS: HashSet<&'static str> =
        ENGLISH_ABBREVIATION_LIST.iter().copied().collect();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_tags() {
        assert_eq!(Language::from_tag("english"), Some(Language::English));
        assert_eq!(Language::from_tag("EN"), Some(Language::English));
        assert_eq!(Language::from_tag(" English "), Some(Language::English));
    }

    #[test]
    fn rejects_unknown_tags() {
        assert_eq!(Language::from_tag("klingon"), None);
        assert_eq!(Language::from_tag(""), None);
    }

    #[test]
    fn stop_words_cover_common_function_words() {
        let words = Language::English.stop_words();
        for w in ["the", "is", "of", "and", "a", "too"] {
            assert!(words.contains(w), "missing stop word: {}", w);
        }
        assert!(!words.contains("mammals"));
    }

    #[test]
    fn abbreviations_are_normalised() {
        let abbrevs = Language::English.abbreviations();
        assert!(abbrevs.contains("dr"));
        assert!(abbrevs.contains("eg"));
        assert!(!abbrevs.contains("e.g"));
    }
}
