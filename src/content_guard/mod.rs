//! Content guard for generated lyrics
//!
//! A denylist/allowlist word-boundary filter:
//! - `lexicon` derives the Allowed Lexicon from the customer's own brief and
//!   the Forbidden Lexicon from the global denylist minus what the brief
//!   reclaims.
//! - `sanitize` strips forbidden words from generated text and tests text for
//!   violations.
//!
//! A word the customer used in their brief is never stripped from that
//! order's output, even when it is globally denylisted.

pub mod lexicon;
pub mod sanitize;

pub use lexicon::{
    build_allowed_lexicon, build_forbidden_lexicon, AllowedLexicon, BriefFields, ForbiddenLexicon,
    FORBIDDEN_GLOBAL, STOPWORDS,
};
pub use sanitize::{contains_forbidden, sanitize, ForbiddenMatcher};
