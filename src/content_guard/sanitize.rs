//! Forbidden-word sanitizer
//!
//! Matching is case-insensitive and whole-word, using Unicode word
//! boundaries. A forbidden word embedded in a longer word is left alone.
//! Both the word list and the text are NFC-composed before matching, so a
//! decomposed accent cannot hide a word.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use tracing::error;
use unicode_normalization::UnicodeNormalization;

/// Two or more horizontal whitespace characters
static HSPACE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]{2,}").unwrap());

/// Three or more newlines
static NEWLINE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Compiled whole-word matcher over a forbidden word list.
///
/// All words go into one alternation, longest first, so overlapping entries
/// ("company", "company party") match the same way whatever the list order.
#[derive(Debug, Clone, Default)]
pub struct ForbiddenMatcher {
    patterns: Vec<Regex>,
}

impl ForbiddenMatcher {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut words: Vec<String> = words
            .into_iter()
            .map(|w| normalize_word(w.as_ref()))
            .filter(|w| !w.is_empty())
            .collect();
        words.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
        words.dedup();

        if words.is_empty() {
            return Self::default();
        }

        let alternation = words
            .iter()
            .map(|w| regex::escape(w))
            .collect::<Vec<_>>()
            .join("|");

        match whole_word(&alternation) {
            Ok(re) => Self { patterns: vec![re] },
            Err(e) => {
                // Combined pattern too large: fall back to one pattern per word
                error!(error = %e, words = words.len(), "Forbidden matcher compile failed, using per-word patterns");
                let patterns = words
                    .iter()
                    .filter_map(|w| match whole_word(&regex::escape(w)) {
                        Ok(re) => Some(re),
                        Err(e) => {
                            error!(word = %w, error = %e, "Skipping uncompilable forbidden word");
                            None
                        }
                    })
                    .collect();
                Self { patterns }
            }
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        let text = compose(text);
        self.patterns.iter().any(|re| re.is_match(&text))
    }

    /// Remove all matches, then normalize whitespace.
    ///
    /// Repeats until nothing changes, so that a removal which makes a
    /// multi-word entry adjacent is also caught and the result is stable
    /// under re-application.
    pub fn sanitize(&self, text: &str) -> String {
        let mut current = compose(text);
        loop {
            let mut next = current.clone();
            for re in &self.patterns {
                next = re.replace_all(&next, "").into_owned();
            }
            let next = normalize_whitespace(&next);
            if next == current {
                return next;
            }
            current = next;
        }
    }
}

/// Canonical (NFC) composition
pub(crate) fn compose(text: &str) -> String {
    text.nfc().collect()
}

/// Lexicon form of a word: trimmed, lowercased, composed
pub(crate) fn normalize_word(word: &str) -> String {
    compose(&word.trim().to_lowercase())
}

fn whole_word(alternation: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(&format!(r"\b(?:{})\b", alternation))
        .case_insensitive(true)
        .build()
}

/// Collapse horizontal whitespace runs, cap blank lines, trim.
fn normalize_whitespace(text: &str) -> String {
    let collapsed = HSPACE_RUN_RE.replace_all(text, " ");
    let capped = NEWLINE_RUN_RE.replace_all(&collapsed, "\n\n");
    capped.trim().to_string()
}

/// Remove forbidden words from `text`.
pub fn sanitize<S: AsRef<str>>(text: &str, forbidden: &[S]) -> String {
    ForbiddenMatcher::new(forbidden).sanitize(text)
}

/// True if any forbidden word occurs in `text` as a whole word.
pub fn contains_forbidden<S: AsRef<str>>(text: &str, forbidden: &[S]) -> bool {
    ForbiddenMatcher::new(forbidden).is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_case_insensitive_whole_words() {
        let out = sanitize("Drum, drum and DRUMS!", &["drum", "drums"]);
        assert_eq!(out, ", and !");
    }

    #[test]
    fn test_leaves_embedded_substrings() {
        let out = sanitize("dobogó szív, dob", &["dob"]);
        assert_eq!(out, "dobogó szív,");
    }

    #[test]
    fn test_accented_words_match_whole() {
        assert_eq!(sanitize("gyors tempó kell", &["tempó"]), "gyors kell");
        assert!(!contains_forbidden("tempós", &["tempó"]));
    }

    #[test]
    fn test_whitespace_normalized() {
        let out = sanitize("  egy\t\tkét   \n\n\n\nhárom  ", &[] as &[&str]);
        assert_eq!(out, "egy két \n\nhárom");
    }

    #[test]
    fn test_overlapping_entries_order_independent() {
        let text = "the company party was loud";
        let a = sanitize(text, &["company", "company party"]);
        let b = sanitize(text, &["company party", "company"]);
        assert_eq!(a, b);
        assert_eq!(a, "the was loud");
    }

    #[test]
    fn test_removal_exposing_phrase_is_stable() {
        let forbidden = ["big party", "x"];
        let once = sanitize("big x party", &forbidden);
        assert_eq!(once, "");
        assert_eq!(sanitize(&once, &forbidden), once);
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        assert!(!contains_forbidden("abc", &["a.c"]));
        assert!(contains_forbidden("x a.c y", &["a.c"]));
    }

    #[test]
    fn test_decomposed_text_is_matched() {
        // "tempo" + combining acute accent
        let text = "gyors tempo\u{301} kell";
        assert!(contains_forbidden(text, &["tempó"]));
        assert_eq!(sanitize(text, &["tempó"]), "gyors kell");
    }

    #[test]
    fn test_decomposed_word_list_is_composed() {
        assert!(contains_forbidden("gyors tempó kell", &["tempo\u{301}"]));
        assert!(!contains_forbidden("gyors tempo kell", &["tempo\u{301}"]));
    }

    #[test]
    fn test_contains_forbidden() {
        assert!(contains_forbidden("Let's go CORPORATE", &["corporate"]));
        assert!(!contains_forbidden("incorporated", &["corporate"]));
        assert!(!contains_forbidden("anything", &[] as &[&str]));
    }
}
