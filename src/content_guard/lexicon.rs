//! Allowed / Forbidden lexicon builder
//!
//! Tokenization performs:
//! - Lowercase conversion
//! - Unicode NFC composition (so `e` + combining acute equals `é`)
//! - Replacement of everything but letters, digits, whitespace and `-` with a space
//! - Whitespace split, dropping tokens shorter than 2 chars and stopwords

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use super::sanitize::{normalize_word, ForbiddenMatcher};

/// Fixed stopword set removed from the Allowed Lexicon
pub const STOPWORDS: &[&str] = &[
    "és", "vagy", "hogy", "ami", "mert", "mint", "de", "ha", "is", "meg", "az", "a", "egy",
    "vagyis", "ám", "ámde", "egyben", "hiszen", "ugyan", "szóval", "valamint", "illetve", "én",
    "te", "ő", "mi", "ti", "ők", "énnekem", "tőled", "neki", "nekem", "velem", "vele",
];

/// Global denylist. Stripped from every output unless the brief reclaims it.
pub const FORBIDDEN_GLOBAL: &[&str] = &[
    "céges",
    "ceges",
    "évzáró",
    "evzaro",
    "corporate",
    "company",
    "company party",
    "tempó",
    "tempo",
    "dob",
    "dobok",
    "ritmus",
    "drum",
    "drums",
];

/// Runs of characters that are not letters, digits, whitespace or hyphen
static NON_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}\s\-]+").unwrap());

// =============================================================================
// ALLOWED LEXICON
// =============================================================================

/// Free-text fields of an Order Brief that feed the Allowed Lexicon.
///
/// Missing fields are empty strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct BriefFields<'a> {
    pub brief: &'a str,
    pub style: &'a str,
    pub vocals: &'a str,
    pub language: &'a str,
    pub names: &'a [String],
}

/// Tokens the customer used in their own brief
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedLexicon(BTreeSet<String>);

impl AllowedLexicon {
    pub fn contains(&self, token: &str) -> bool {
        self.0.contains(token)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Tokens joined for prompt use ("mandatory keywords")
    pub fn to_keyword_list(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

/// Build the Allowed Lexicon from the concatenated free-text fields.
pub fn build_allowed_lexicon(fields: &BriefFields<'_>) -> AllowedLexicon {
    let raw = [fields.brief, fields.style, fields.vocals, fields.language]
        .into_iter()
        .chain(fields.names.iter().map(String::as_str))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let composed: String = raw.to_lowercase().nfc().collect();
    let stripped = NON_TOKEN_RE.replace_all(&composed, " ");

    let tokens = stripped
        .split_whitespace()
        .map(str::trim)
        .filter(|t| t.chars().count() >= 2 && !STOPWORDS.contains(t))
        .map(str::to_string)
        .collect();

    AllowedLexicon(tokens)
}

// =============================================================================
// FORBIDDEN LEXICON
// =============================================================================

/// Words to strip from generated output for one order
#[derive(Debug, Clone)]
pub struct ForbiddenLexicon {
    words: BTreeSet<String>,
    matcher: ForbiddenMatcher,
}

impl ForbiddenLexicon {
    /// Lexicon over an explicit word set (no denylist, no reclaim)
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: BTreeSet<String> = words
            .into_iter()
            .map(|w| normalize_word(w.as_ref()))
            .filter(|w| !w.is_empty())
            .collect();
        let matcher = ForbiddenMatcher::new(words.iter());
        Self { words, matcher }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&normalize_word(word))
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Remove every whole-word occurrence of a forbidden word
    pub fn sanitize(&self, text: &str) -> String {
        self.matcher.sanitize(text)
    }

    /// True if any forbidden word occurs as a whole word
    pub fn contains_forbidden(&self, text: &str) -> bool {
        self.matcher.is_match(text)
    }
}

/// Build the Forbidden Lexicon: (global denylist ∪ extra) minus the Allowed
/// Lexicon.
///
/// The reclaim runs after the union, so an extra word that the brief uses is
/// released too.
pub fn build_forbidden_lexicon<S: AsRef<str>>(
    extra_forbidden: &[S],
    allowed: &AllowedLexicon,
) -> ForbiddenLexicon {
    let mut base: BTreeSet<String> = FORBIDDEN_GLOBAL
        .iter()
        .map(|w| normalize_word(w))
        .chain(extra_forbidden.iter().map(|w| normalize_word(w.as_ref())))
        .filter(|w| !w.is_empty())
        .collect();

    for token in allowed.iter() {
        base.remove(token);
    }

    ForbiddenLexicon::from_words(base)
}
