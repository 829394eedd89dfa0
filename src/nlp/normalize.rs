//! Lexical normalization of construction vocabulary
//!
//! Lower-cases, expands trade abbreviations, and canonicalizes pour and
//! floor references so the domain patterns only have to match one form.
//! Normalizing already-normalized text returns it unchanged.

use crate::nlp::pattern;
use regex::Regex;
use std::sync::OnceLock;

/// Abbreviation -> expansion (expansions are lower-case so the output is
/// stable under re-normalization)
pub const ABBREVIATIONS: &[(&str, &str)] = &[
    ("hvac", "hvac"),
    ("mep", "mep"),
    ("gb", "grade beams"),
    ("sw", "site work"),
    ("fn", "foundation"),
    ("el", "elevator"),
    ("str", "structural"),
    ("arch", "architectural"),
];

const FLOOR_ORDINALS: &[(&str, &str)] = &[
    ("1st", "first"),
    ("2nd", "second"),
    ("3rd", "third"),
    ("ground", "main"),
];

struct NormalizerPatterns {
    abbreviations: Vec<(Regex, &'static str)>,
    pour: Regex,
    floors: Vec<(Regex, &'static str)>,
}

fn patterns() -> &'static NormalizerPatterns {
    static PATTERNS: OnceLock<NormalizerPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| NormalizerPatterns {
        abbreviations: ABBREVIATIONS
            .iter()
            .filter(|(abbrev, full)| abbrev != full)
            .map(|(abbrev, full)| (word_regex(abbrev), *full))
            .collect(),
        pour: pattern(r"\bpour\s*#?\s*(\d+)\b"),
        floors: FLOOR_ORDINALS
            .iter()
            .map(|(ordinal, word)| (word_regex(ordinal), *word))
            .collect(),
    })
}

fn word_regex(word: &str) -> Regex {
    pattern(&format!(r"\b{}\b", regex::escape(word)))
}

/// Normalize an utterance for domain pattern matching
pub fn normalize(text: &str) -> String {
    let patterns = patterns();
    let mut normalized = text.to_lowercase();

    for (pattern, full) in &patterns.abbreviations {
        normalized = pattern.replace_all(&normalized, *full).into_owned();
    }

    normalized = patterns
        .pour
        .replace_all(&normalized, "Pour #${1}")
        .into_owned();

    for (pattern, word) in &patterns.floors {
        normalized = pattern.replace_all(&normalized, *word).into_owned();
    }

    normalized
}
