//! Lexicon builder and sanitizer behaviour on realistic briefs

use proptest::prelude::*;

use enzenem::content_guard::{
    build_allowed_lexicon, build_forbidden_lexicon, contains_forbidden, sanitize, BriefFields,
    FORBIDDEN_GLOBAL,
};

#[test]
fn test_brief_reclaims_its_own_words() {
    let allowed = build_allowed_lexicon(&BriefFields {
        brief: "Céges évzáróra készül a dal, sok dob és tempó kell bele!",
        ..Default::default()
    });
    for word in ["céges", "dob", "tempó", "évzáróra"] {
        assert!(allowed.contains(word), "{} should be allowed", word);
    }

    let forbidden = build_forbidden_lexicon::<&str>(&[], &allowed);
    assert!(!forbidden.contains("céges"));
    assert!(!forbidden.contains("dob"));
    assert!(!forbidden.contains("tempó"));
    assert!(forbidden.contains("corporate"));

    let lyrics = "A céges buli corporate hangulat, dob és tempó";
    assert_eq!(
        forbidden.sanitize(lyrics),
        "A céges buli hangulat, dob és tempó"
    );
}

#[test]
fn test_unrequested_sensitive_words_are_stripped() {
    let allowed = build_allowed_lexicon(&BriefFields {
        brief: "Szerelmes dal Nórának",
        ..Default::default()
    });
    let forbidden = build_forbidden_lexicon::<&str>(&[], &allowed);

    let cleaned = forbidden.sanitize("Dob pörög, a Tempó gyorsul, company party van");
    assert!(!contains_forbidden(&cleaned, FORBIDDEN_GLOBAL));
    assert!(cleaned.contains("pörög"));
}

#[test]
fn test_extra_denylist_applies_unless_reclaimed() {
    let allowed = build_allowed_lexicon(&BriefFields {
        brief: "Pali és Nóra",
        names: &["Pali".to_string()],
        ..Default::default()
    });
    let forbidden = build_forbidden_lexicon(&["pali", "főnök"], &allowed);

    assert!(!forbidden.contains("pali"));
    assert!(forbidden.contains("főnök"));
    assert_eq!(forbidden.sanitize("Pali a főnök"), "Pali a");
}

#[test]
fn test_decomposed_accents_cannot_hide_forbidden_words() {
    // "tempo" + U+0301 is canonically "tempó"
    let lyrics = "gyors tempo\u{301} kell";
    assert!(contains_forbidden(lyrics, FORBIDDEN_GLOBAL));
    assert_eq!(sanitize(lyrics, FORBIDDEN_GLOBAL), "gyors kell");
}

#[test]
fn test_decomposed_extra_word_reclaimed_by_composed_brief() {
    let allowed = build_allowed_lexicon(&BriefFields {
        brief: "pezsgő",
        ..Default::default()
    });
    let forbidden = build_forbidden_lexicon(&["pezsgo\u{30B}"], &allowed);

    assert!(!forbidden.contains("pezsgő"));
    assert!(!forbidden.contains("pezsgo\u{30B}"));
    assert_eq!(
        forbidden.sanitize("koccints pezsgo\u{30B} van"),
        "koccints pezsgő van"
    );
}

#[test]
fn test_overlapping_entries_independent_of_order() {
    let forward = sanitize("a company party tonight", &["company", "company party"]);
    let reverse = sanitize("a company party tonight", &["company party", "company"]);
    assert_eq!(forward, "a tonight");
    assert_eq!(forward, reverse);
}

#[test]
fn test_substrings_are_untouched() {
    assert_eq!(sanitize("dobogó szív", &["dob"]), "dobogó szív");
    assert!(!contains_forbidden("dobogó szív", &["dob"]));
    assert!(contains_forbidden("a DOB szól", &["dob"]));
}

#[test]
fn test_empty_lexicon_only_normalizes() {
    assert_eq!(sanitize("sor  egy\n\n\n\nsor kettő", &[] as &[&str]), "sor egy\n\nsor kettő");
}

fn word() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("dob".to_string()),
        Just("tempó".to_string()),
        Just("company".to_string()),
        Just("party".to_string()),
        Just("céges".to_string()),
        "[a-záéíóöőúüű]{1,8}",
    ]
}

fn text() -> impl Strategy<Value = String> {
    prop::collection::vec((word(), prop_oneof![Just(" "), Just("  "), Just("\n"), Just(", ")]), 0..24)
        .prop_map(|parts| parts.into_iter().map(|(w, sep)| format!("{}{}", w, sep)).collect())
}

proptest! {
    #[test]
    fn prop_sanitize_is_idempotent(input in text()) {
        let once = sanitize(&input, FORBIDDEN_GLOBAL);
        let twice = sanitize(&once, FORBIDDEN_GLOBAL);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_sanitized_text_has_no_forbidden_words(input in text()) {
        let cleaned = sanitize(&input, FORBIDDEN_GLOBAL);
        prop_assert!(!contains_forbidden(&cleaned, FORBIDDEN_GLOBAL));
    }

    #[test]
    fn prop_contains_agrees_with_sanitize(input in text()) {
        let cleaned = sanitize(&input, FORBIDDEN_GLOBAL);
        let normalized_only = sanitize(&input, &[] as &[&str]);
        prop_assert_eq!(contains_forbidden(&input, FORBIDDEN_GLOBAL), cleaned != normalized_only);
    }

    #[test]
    fn prop_reclaimed_words_survive(word in "[a-záéíóöőúüű]{2,10}") {
        let brief = format!("kérünk {} szót", word);
        let allowed = build_allowed_lexicon(&BriefFields { brief: &brief, ..Default::default() });
        let forbidden = build_forbidden_lexicon(&[word.as_str()], &allowed);
        if allowed.contains(&word) {
            prop_assert!(!forbidden.contains(&word));
            let lyric = format!("itt a {} szó", word);
            prop_assert_eq!(forbidden.sanitize(&lyric), lyric);
        }
    }
}
