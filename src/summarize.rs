//! Extractive summarisation of message bodies.
//!
//! Scores sentences by the document-wide frequency of their words (stop
//! words excluded) and returns the highest-scoring sentences in their
//! original order. Pure and synchronous; a `Summarizer` holds only a
//! `Language` handle to static resources, so one instance can be shared
//! across tasks without coordination.

use crate::language::Language;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// Number of sentences in a summary unless configured otherwise.
pub const DEFAULT_SUMMARY_SENTENCES: usize = 3;

/// Returned in place of a summary when sentence selection cannot complete.
/// Callers forward this like any other summary.
pub const FALLBACK_SUMMARY: &str =
    "Could not summarise the message content. Please check the original email.";

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref WORD: Regex = Regex::new(r"[\p{Alphabetic}\p{Nd}]+").unwrap();
}

/// Extractive summariser for a single configured language.
pub struct Summarizer {
    language: Language,
}

impl Summarizer {
    /// Create a summariser for the given language.
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    /// Summarise `text` down to at most `max_sentences` sentences.
    ///
    /// Whitespace runs are collapsed first, so a body mangled by multi-part
    /// decoding still segments cleanly. Text that already fits within
    /// `max_sentences` is returned whole (normalised). Empty or
    /// whitespace-only input yields an empty string.
    pub fn summarize(&self, text: &str, max_sentences: usize) -> String {
        let text = normalize_whitespace(text);
        if text.is_empty() {
            return text;
        }

        let sentences = self.split_sentences(&text);
        if sentences.len() <= max_sentences {
            return text;
        }

        match self.select_top(&text, &sentences, max_sentences) {
            Some(summary) => summary,
            None => {
                tracing::warn!("sentence selection failed, returning fallback summary");
                FALLBACK_SUMMARY.to_string()
            }
        }
    }

    /// Score all sentences against the document frequency table and join
    /// the top `max` of them in document order.
    fn select_top(&self, text: &str, sentences: &[String], max: usize) -> Option<String> {
        let stop_words = self.language.stop_words();

        let mut frequencies: HashMap<String, u64> = HashMap::new();
        for token in WORD.find_iter(&text.to_lowercase()) {
            let token = token.as_str();
            if !stop_words.contains(token) {
                *frequencies.entry(token.to_string()).or_insert(0) += 1;
            }
        }

        // Tokens absent from the table (stop words included) contribute zero.
        let mut scored: Vec<(usize, u64)> = sentences
            .iter()
            .enumerate()
            .map(|(index, sentence)| {
                let score = WORD
                    .find_iter(&sentence.to_lowercase())
                    .filter_map(|token| frequencies.get(token.as_str()))
                    .sum();
                (index, score)
            })
            .collect();

        // Highest score first; equal scores keep the earliest sentence.
        scored.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(max);
        scored.sort_by_key(|&(index, _)| index);

        let mut selected = Vec::with_capacity(scored.len());
        for (index, _) in scored {
            selected.push(sentences.get(index)?.as_str());
        }
        Some(selected.join(" "))
    }

    /// Split normalised text into sentences.
    ///
    /// Breaks at `.`/`!`/`?` (plus any trailing closing quotes or brackets)
    /// followed by whitespace or end of text. A period does not break after
    /// a known abbreviation or a single-letter initial, and a decimal point
    /// never qualifies because it is not followed by whitespace.
    fn split_sentences(&self, text: &str) -> Vec<String> {
        let abbreviations = self.language.abbreviations();
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let mut sentences = Vec::new();
        let mut start = 0;
        let mut i = 0;

        while i < chars.len() {
            let (offset, c) = chars[i];
            if matches!(c, '.' | '!' | '?') {
                let mut j = i + 1;
                while j < chars.len()
                    && matches!(chars[j].1, '"' | '\'' | ')' | ']' | '\u{201d}' | '\u{2019}')
                {
                    j += 1;
                }
                let at_end = j >= chars.len();
                let breaks = (at_end || chars[j].1.is_whitespace())
                    && (c != '.' || !is_abbreviation(&text[start..offset], abbreviations));
                if breaks {
                    let end = if at_end { text.len() } else { chars[j].0 };
                    let sentence = text[start..end].trim();
                    if !sentence.is_empty() {
                        sentences.push(sentence.to_string());
                    }
                    start = end;
                    i = j;
                    continue;
                }
            }
            i += 1;
        }

        let tail = text[start..].trim();
        if !tail.is_empty() {
            sentences.push(tail.to_string());
        }
        sentences
    }
}

/// Collapse any run of whitespace into a single space and trim the ends.
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Whether the word ending at a period marks an abbreviation rather than
/// a sentence boundary. The token is compared with dots stripped, so
/// `"e.g."` matches the entry `"eg"`.
fn is_abbreviation(prefix: &str, abbreviations: &HashSet<&'static str>) -> bool {
    let last = match prefix.split_whitespace().last() {
        Some(word) => word,
        None => return false,
    };
    let normalised: String = last
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect::<String>()
        .to_lowercase();
    if normalised.is_empty() {
        return false;
    }
    // A lone letter is an initial, as in "J. Smith".
    if normalised.chars().count() == 1 && normalised.chars().all(|c| c.is_alphabetic()) {
        return true;
    }
    abbreviations.contains(normalised.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summarizer() -> Summarizer {
        Summarizer::new(Language::English)
    }

    #[test]
    fn short_input_is_returned_normalised() {
        let text = "One  sentence here.\nAnother   one!  A third?";
        let result = summarizer().summarize(text, 3);
        assert_eq!(result, "One sentence here. Another one! A third?");
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert_eq!(summarizer().summarize("", 3), "");
        assert_eq!(summarizer().summarize("   \n\t  ", 3), "");
    }

    #[test]
    fn selects_highest_frequency_sentences() {
        let text = "Cats are mammals. Cats sleep a lot. \
                    Dogs are mammals too. Dogs like to play.";
        let result = summarizer().summarize(text, 2);
        // All four sentences tie on score, so the earliest two win.
        assert_eq!(result, "Cats are mammals. Cats sleep a lot.");
    }

    #[test]
    fn output_preserves_document_order() {
        let text = "Apples grow on trees. The weather is nice today. \
                    Apples and more apples fill the basket. Bananas are yellow.";
        let result = summarizer().summarize(text, 2);
        // The third sentence scores highest but still follows the first.
        assert_eq!(
            result,
            "Apples grow on trees. Apples and more apples fill the basket."
        );
    }

    #[test]
    fn output_never_exceeds_requested_sentence_count() {
        let text = "Rust is a language. Rust has a compiler. Rust has crates. \
                    Rust has macros. Rust has lifetimes. Rust has traits.";
        let s = summarizer();
        let result = s.summarize(text, 2);
        assert_eq!(s.split_sentences(&result).len(), 2);
    }

    #[test]
    fn identical_input_produces_identical_output() {
        let text = "Ships sail the sea. The sea is deep. Deep water hides ships. \
                    Sailors watch the water. Storms test every sailor.";
        let s = summarizer();
        assert_eq!(s.summarize(text, 2), s.summarize(text, 2));
    }

    #[test]
    fn single_stop_word_sentence_is_returned_whole() {
        // One sentence, fewer than requested: the short-circuit path.
        assert_eq!(summarizer().summarize("the a an is of", 1), "the a an is of");
    }

    #[test]
    fn all_stop_word_document_still_selects_sentences() {
        let text = "The is of. A an the. Of the a. It is the.";
        let result = summarizer().summarize(text, 2);
        // No sentence scores, so selection falls back to document order.
        assert_eq!(result, "The is of. A an the.");
    }

    #[test]
    fn abbreviations_and_decimals_do_not_split() {
        let s = summarizer();
        let sentences = s.split_sentences(
            "Dr. Smith paid 3.50 for tea. He thanked J. Jones. The receipt was lost.",
        );
        assert_eq!(
            sentences,
            vec![
                "Dr. Smith paid 3.50 for tea.",
                "He thanked J. Jones.",
                "The receipt was lost.",
            ]
        );
    }

    #[test]
    fn closing_quotes_stay_with_their_sentence() {
        let s = summarizer();
        let sentences = s.split_sentences("He said \"Stop!\" Then he left.");
        assert_eq!(sentences, vec!["He said \"Stop!\"", "Then he left."]);
    }

    #[test]
    fn unterminated_tail_forms_a_sentence() {
        let s = summarizer();
        let sentences = s.split_sentences("First sentence. And a trailing fragment");
        assert_eq!(sentences, vec!["First sentence.", "And a trailing fragment"]);
    }

    #[test]
    fn exclamation_and_question_always_split() {
        let s = summarizer();
        let sentences = s.split_sentences("What a day! Did it rain? It did.");
        assert_eq!(sentences.len(), 3);
    }

    #[test]
    fn normalize_collapses_all_whitespace_kinds() {
        assert_eq!(
            normalize_whitespace("  a\tb\r\n c \n\nd  "),
            "a b c d"
        );
    }
}
