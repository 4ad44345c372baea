//! Deterministic lyric post-processing
//!
//! Runs on composed lyrics before they are sanitized:
//! 1. Section headings (`Verze 2`, `Refrén:`, `chorus`) become `(Verse n)` / `(Chorus)`
//! 2. Fixed phrase corrections
//! 3. Single digits spelled out in Hungarian lyrics
//! 4. Story names from the brief woven into verse 4 (techno-family styles)
//! 5. The song is rebuilt as Verse 1, Verse 2, Chorus, Verse 3, Verse 4, Chorus

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex, RegexBuilder};
use tracing::debug;

/// Section order every song is rebuilt into
pub const SONG_STRUCTURE: [&str; 6] = [
    "Verse 1", "Verse 2", "Chorus", "Verse 3", "Verse 4", "Chorus",
];

/// Body of a section the draft did not provide
pub const PLACEHOLDER: &str = "...";

/// Awkward phrasings and their replacements (whole words, any case)
const PHRASE_FIXES: &[(&str, &str)] = &[
    ("dúgja", "dúdolja"),
    ("él a szó", "száll a szó"),
    ("örök éltet", "örökké éltet"),
    ("út nyitva áll", "nyitva a világ"),
    ("szívünk mindig szabad", "szívünk szabadon dobban"),
];

const HUNGARIAN_DIGITS: [&str; 10] = [
    "nulla", "egy", "kettő", "három", "négy", "öt", "hat", "hét", "nyolc", "kilenc",
];

/// (brief stem, word the lyrics must carry)
const STORY_NAMES: &[(&str, &str)] = &[
    ("nóra", "Nóra"),
    ("pali", "Pali"),
    ("szardíni", "Szardínia"),
    ("portugáli", "Portugália"),
    ("barátság", "barátság"),
    ("újrakezd", "újrakezdés"),
];

static VERSE_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^[ \t]*(?:verze|verse)[ \t]*([1-4])[ \t]*:?[ \t]*$").unwrap()
});

static CHORUS_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^[ \t]*(?:refr[eé]n|chorus)[ \t]*:?[ \t]*$").unwrap()
});

static PHRASE_FIX_RES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    PHRASE_FIXES
        .iter()
        .map(|(from, to)| (whole_word(from).unwrap(), *to))
        .collect()
});

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[0-9]+\b").unwrap());

static HUNGARIAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:hu|hungarian|magyar)$").unwrap());

static TECHNO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)techno|minimal|house").unwrap());

static VERSE_4_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\(verse 4\)").unwrap());

static NEXT_CHORUS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\n\(chorus\)").unwrap());

/// A section heading at the start of a line: `(Verse 3)`, `(Verse)`, `(Chorus)`
static SECTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\((?:verse[ \t]*([0-9]*)|chorus)\)").unwrap());

/// Order context the polish steps depend on
#[derive(Debug, Clone, Copy, Default)]
pub struct PolishOptions<'a> {
    pub language: &'a str,
    pub styles: &'a str,
    pub brief: &'a str,
}

/// Run every polish step in order.
pub fn polish(lyrics: &str, opts: &PolishOptions<'_>) -> String {
    let text = lyrics.replace("\r\n", "\n");
    let text = text.trim();
    if text.is_empty() {
        return String::new();
    }

    let mut out = normalize_headings(text);
    out = apply_phrase_fixes(&out);
    if is_hungarian(opts.language) {
        out = spell_out_digits(&out);
    }
    if TECHNO_RE.is_match(opts.styles) {
        out = weave_story_names(&out, opts.brief);
    }
    enforce_song_structure(&out)
}

pub fn is_hungarian(language: &str) -> bool {
    HUNGARIAN_RE.is_match(language.trim())
}

/// Standalone heading lines become `(Verse n)` or `(Chorus)`.
pub fn normalize_headings(text: &str) -> String {
    let out = VERSE_HEADING_RE.replace_all(text, "(Verse ${1})");
    CHORUS_HEADING_RE.replace_all(&out, "(Chorus)").into_owned()
}

pub fn apply_phrase_fixes(text: &str) -> String {
    PHRASE_FIX_RES
        .iter()
        .fold(text.to_string(), |acc, (re, to)| {
            re.replace_all(&acc, *to).into_owned()
        })
}

/// Standalone numbers 0-9 become Hungarian words; larger numbers stay.
pub fn spell_out_digits(text: &str) -> String {
    NUMBER_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let digits = &caps[0];
            digits
                .parse::<usize>()
                .ok()
                .and_then(|n| HUNGARIAN_DIGITS.get(n))
                .map_or_else(|| digits.to_string(), |word| word.to_string())
        })
        .into_owned()
}

/// Append story words the brief mentions but the lyrics lack to the end of
/// verse 4. Without a verse 4 heading the text is returned unchanged.
pub fn weave_story_names(text: &str, brief: &str) -> String {
    let brief = brief.to_lowercase();
    let missing: Vec<&str> = STORY_NAMES
        .iter()
        .filter(|(stem, word)| brief.contains(stem) && !contains_word(text, word))
        .map(|(_, word)| *word)
        .collect();
    if missing.is_empty() {
        return text.to_string();
    }

    let Some(heading) = VERSE_4_RE.find(text) else {
        return text.to_string();
    };
    let rest = &text[heading.end()..];
    let body_end = NEXT_CHORUS_RE
        .find(rest)
        .map_or(rest.len(), |m| m.start());

    debug!(missing = ?missing, "Weaving story names into verse 4");
    format!(
        "{}(Verse 4)\n{}\n{}\n{}",
        &text[..heading.start()],
        rest[..body_end].trim(),
        missing.join(", "),
        &rest[body_end..]
    )
}

/// Rebuild the fixed section order.
///
/// A section starts at a line beginning with a heading and runs to the next
/// one. Text before the first heading is dropped, a repeated heading keeps
/// its last occurrence, and missing sections get a `...` placeholder.
pub fn enforce_song_structure(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        return String::new();
    }

    let mut sections: HashMap<String, String> = HashMap::new();
    let mut current: Option<(String, Vec<&str>)> = None;
    for line in text.lines() {
        if let Some(caps) = SECTION_RE.captures(line) {
            if let Some((key, lines)) = current.take() {
                sections.insert(key, lines.join("\n").trim().to_string());
            }
            current = Some((section_key(&caps), vec![line]));
        } else if let Some((_, lines)) = current.as_mut() {
            lines.push(line);
        }
    }
    if let Some((key, lines)) = current {
        sections.insert(key, lines.join("\n").trim().to_string());
    }

    SONG_STRUCTURE
        .iter()
        .map(|key| {
            sections
                .get(*key)
                .cloned()
                .unwrap_or_else(|| format!("({})\n{}", key, PLACEHOLDER))
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn section_key(caps: &Captures<'_>) -> String {
    match caps.get(1) {
        Some(n) if n.as_str().is_empty() => "Verse".to_string(),
        Some(n) => format!("Verse {}", n.as_str()),
        None => "Chorus".to_string(),
    }
}

fn whole_word(phrase: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(&format!(r"\b{}\b", regex::escape(phrase)))
        .case_insensitive(true)
        .build()
}

fn contains_word(text: &str, word: &str) -> bool {
    whole_word(word).map_or(false, |re| re.is_match(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_SONG: &str = "(Verse 1)\negy\n\n(Verse 2)\nkettő\n\n(Chorus)\nrefrén\n\n\
                             (Verse 3)\nhárom\n\n(Verse 4)\nnégy\n\n(Chorus)\nrefrén";

    #[test]
    fn test_headings_normalized() {
        let text = "Verze 1:\nsor\nRefrén\nsor\n  verse 2 \nsor\nCHORUS:";
        assert_eq!(
            normalize_headings(text),
            "(Verse 1)\nsor\n(Chorus)\nsor\n(Verse 2)\nsor\n(Chorus)"
        );
    }

    #[test]
    fn test_heading_words_inside_lines_untouched() {
        let text = "a chorus szól\nverse 5";
        assert_eq!(normalize_headings(text), text);
    }

    #[test]
    fn test_phrase_fixes_any_case() {
        assert_eq!(
            apply_phrase_fixes("Dúgja a dalt, él a szó"),
            "dúdolja a dalt, száll a szó"
        );
        assert_eq!(apply_phrase_fixes("dúgjam"), "dúgjam");
    }

    #[test]
    fn test_single_digits_spelled_out() {
        assert_eq!(spell_out_digits("3 nap, 7 éj"), "három nap, hét éj");
        assert_eq!(spell_out_digits("12 hónap"), "12 hónap");
        assert_eq!(spell_out_digits("05 perc"), "öt perc");
    }

    #[test]
    fn test_digits_kept_for_other_languages() {
        let opts = PolishOptions {
            language: "english",
            ..Default::default()
        };
        assert!(polish("(Verse 1)\n3 days", &opts).starts_with("(Verse 1)\n3 days"));

        let opts = PolishOptions {
            language: "Magyar",
            ..Default::default()
        };
        assert!(polish("(Verse 1)\n3 nap", &opts).starts_with("(Verse 1)\nhárom nap"));
    }

    #[test]
    fn test_story_names_appended_to_verse_4() {
        let text = "(Verse 4)\nmég egy kör\n(Chorus)\nrefrén";
        let out = weave_story_names(text, "Nóra és Pali barátsága, Nóra már ott van");
        assert_eq!(
            out,
            "(Verse 4)\nmég egy kör\nNóra, Pali, barátság\n\n(Chorus)\nrefrén"
        );
    }

    #[test]
    fn test_story_names_already_present_not_repeated() {
        let text = "(Verse 4)\nnóra táncol\n(Chorus)";
        assert_eq!(weave_story_names(text, "Nóra szülinapja"), text);
    }

    #[test]
    fn test_story_names_only_for_techno_styles() {
        let draft = "(Verse 4)\nmég egy kör";
        let pop = PolishOptions {
            language: "magyar",
            styles: "pop",
            brief: "Pali",
        };
        assert!(!polish(draft, &pop).contains("Pali"));

        let techno = PolishOptions {
            styles: "Minimal Techno",
            ..pop
        };
        assert!(polish(draft, &techno).contains("még egy kör\nPali"));
    }

    #[test]
    fn test_structure_reordered_with_placeholders() {
        let text = "intro\n(Chorus)\nrefrén\n(Verse 1)\negy";
        assert_eq!(
            enforce_song_structure(text),
            "(Verse 1)\negy\n\n(Verse 2)\n...\n\n(Chorus)\nrefrén\n\n\
             (Verse 3)\n...\n\n(Verse 4)\n...\n\n(Chorus)\nrefrén"
        );
    }

    #[test]
    fn test_structure_extra_sections_dropped_and_last_repeat_wins() {
        let text = "(Verse 1)\nelső\n(Verse 1)\nmásodik\n(Verse 5)\nfelesleges";
        let out = enforce_song_structure(text);
        assert!(out.starts_with("(Verse 1)\nmásodik\n\n(Verse 2)"));
        assert!(!out.contains("felesleges"));
    }

    #[test]
    fn test_complete_song_is_stable() {
        assert_eq!(enforce_song_structure(FULL_SONG), FULL_SONG);
        let opts = PolishOptions {
            language: "magyar",
            styles: "pop",
            brief: "",
        };
        assert_eq!(polish(FULL_SONG, &opts), FULL_SONG);
    }

    #[test]
    fn test_empty_draft_stays_empty() {
        assert_eq!(polish("  \n ", &PolishOptions::default()), "");
    }

    #[test]
    fn test_full_pipeline() {
        let draft = "Verze 1\nÉl a szó, 2 szív\n\nRefrén:\nszól a dal\r\n\r\nVerze 4\nvége";
        let opts = PolishOptions {
            language: "hu",
            styles: "house",
            brief: "Szardínián töltött nyár",
        };
        assert_eq!(
            polish(draft, &opts),
            "(Verse 1)\nszáll a szó, kettő szív\n\n(Verse 2)\n...\n\n(Chorus)\nszól a dal\n\n\
             (Verse 3)\n...\n\n(Verse 4)\nvége\nSzardínia\n\n(Chorus)\nszól a dal"
        );
    }
}
