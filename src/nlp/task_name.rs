//! Task-name extraction
//!
//! Matchers run in priority order and the first hit wins:
//! 1. structured patterns for recurring site entities ("door 1000 installation", "slab a")
//! 2. domain patterns (pour numbers, floor + activity, installation/inspection
//!    phrases, task categories)
//! 3. a noun-phrase fallback that keeps the longest run of content words,
//!    skipping scheduling vocabulary and small talk

use crate::nlp::pattern;
use crate::nlp::tokenize::{contains_word, is_stopword, title_case, tokens};
use crate::nlp::utterance::Utterance;
use regex::{Captures, Regex};

/// Generic scheduling words that never form part of a task name
pub const GENERIC_WORDS: &[&str] = &[
    "task", "tasks", "project", "item", "status", "date", "start", "end", "finish", "deadline",
    "schedule", "reschedule", "update", "change", "modify", "set", "new", "create", "add",
    "remove", "delete", "please", "could", "would", "mark", "move", "need", "want", "like",
    "due", "yes", "no", "ok",
];

/// Greetings, thanks and filler that a reply can consist of entirely
const CONVERSATIONAL_WORDS: &[&str] = &[
    "thanks", "thank", "thx", "cheers", "hello", "hi", "hey", "bye", "goodbye", "cool", "great",
    "nice", "awesome", "good", "fine", "okay", "sure", "yeah", "yep", "nope", "nah", "never",
    "mind", "nevermind", "time", "sorry", "morning", "afternoon", "evening", "help", "anyway",
];

/// Words that may close a task name ("site work") but never open one
const TRAILING_ONLY: &[&str] = &["work"];

const STATUS_WORDS: &[&str] = &[
    "complete", "completed", "finished", "done", "progress", "ongoing", "hold", "paused",
    "suspended", "suspend", "started", "begun", "unstarted", "commenced", "underway", "ready",
    "pending", "delayed", "halted",
];

const DATE_WORDS: &[&str] = &[
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december", "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sep",
    "sept", "oct", "nov", "dec", "monday", "tuesday", "wednesday", "thursday", "friday",
    "saturday", "sunday", "today", "tomorrow", "next", "week", "weeks", "month", "months",
    "year", "day", "days",
];

/// Activities that combine with a floor reference into an installation task
pub const FLOOR_ACTIVITIES: &[&str] = &["Glazing", "Windows", "Drywall", "Door", "Railing"];

pub trait TaskNameMatcher: Send + Sync {
    fn label(&self) -> &'static str;
    fn find(&self, utterance: &Utterance) -> Option<String>;
}

/// A high-precision pattern over the lower-cased text with a fixed output shape
pub struct StructuredPattern {
    label: &'static str,
    regex: Regex,
    build: fn(&Captures) -> String,
}

impl StructuredPattern {
    pub fn new(label: &'static str, regex: &str, build: fn(&Captures) -> String) -> Self {
        Self {
            label,
            regex: pattern(regex),
            build,
        }
    }
}

impl TaskNameMatcher for StructuredPattern {
    fn label(&self) -> &'static str {
        self.label
    }

    fn find(&self, utterance: &Utterance) -> Option<String> {
        self.regex
            .captures(&utterance.lower)
            .map(|captures| (self.build)(&captures))
    }
}

/// The site entities that recur often enough to deserve exact patterns
pub fn structured_patterns() -> Vec<StructuredPattern> {
    vec![
        StructuredPattern::new("door", r"\bdoor\s+(\d+)\s+installation\b", |c| {
            format!("Door {} Installation", &c[1])
        }),
        StructuredPattern::new("stair", r"\bstair\s+(\d+)\b", |c| format!("Stair {}", &c[1])),
        StructuredPattern::new("slab", r"\bslab\s+([a-z])\b", |c| {
            format!("Slab {}", c[1].to_uppercase())
        }),
        StructuredPattern::new("window", r"\bwindow\s+([a-z])\b", |c| {
            format!("Window {}", c[1].to_uppercase())
        }),
        StructuredPattern::new("painting", r"\bpainting\b", |_| "Painting".to_string()),
        StructuredPattern::new("railing", r"\brailing\b", |_| "Railing".to_string()),
    ]
}

/// Numbered grade-beam pours ("pour 12" normalizes to "Pour #12")
pub struct PourNumber {
    regex: Regex,
}

impl PourNumber {
    pub fn new() -> Self {
        Self {
            regex: pattern(r"(?i)\bpour #(\d+)"),
        }
    }
}

impl Default for PourNumber {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskNameMatcher for PourNumber {
    fn label(&self) -> &'static str {
        "pour"
    }

    fn find(&self, utterance: &Utterance) -> Option<String> {
        let captures = self.regex.captures(&utterance.normalized)?;
        Some(format!("Grade Beams Pour #{}", &captures[1]))
    }
}

/// A floor reference combined with a known activity
pub struct FloorActivity {
    regex: Regex,
}

impl FloorActivity {
    pub fn new() -> Self {
        Self {
            regex: pattern(r"\b(main|first|second|third)\s+floor\b"),
        }
    }
}

impl Default for FloorActivity {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskNameMatcher for FloorActivity {
    fn label(&self) -> &'static str {
        "floor"
    }

    fn find(&self, utterance: &Utterance) -> Option<String> {
        let captures = self.regex.captures(&utterance.normalized)?;
        let floor = title_case(&captures[1]);
        let activity = FLOOR_ACTIVITIES
            .iter()
            .find(|activity| utterance.normalized.contains(&activity.to_lowercase()));
        Some(match activity {
            Some(activity) => format!("{} Floor {} Installation", floor, activity),
            None => format!("{} Floor", floor),
        })
    }
}

/// "<word> installation" / "<word> inspection" phrases
pub struct QualifiedPhrase {
    label: &'static str,
    regex: Regex,
}

impl QualifiedPhrase {
    pub fn new(label: &'static str, head: &str) -> Self {
        Self {
            label,
            regex: pattern(&format!(r"\b([a-z]+)\s+{}\b", head)),
        }
    }
}

impl TaskNameMatcher for QualifiedPhrase {
    fn label(&self) -> &'static str {
        self.label
    }

    fn find(&self, utterance: &Utterance) -> Option<String> {
        self.regex
            .captures_iter(&utterance.normalized)
            .find(|captures| {
                let word = &captures[1];
                !is_stopword(word) && !GENERIC_WORDS.contains(&word)
            })
            .map(|captures| title_case(&captures[0]))
    }
}

/// Short category keys from the persisted task mapping
pub struct CategoryLookup {
    entries: Vec<(String, String)>,
}

impl CategoryLookup {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(key, display)| (key.into().to_lowercase(), display.into()))
                .collect(),
        }
    }
}

impl TaskNameMatcher for CategoryLookup {
    fn label(&self) -> &'static str {
        "category"
    }

    fn find(&self, utterance: &Utterance) -> Option<String> {
        self.entries
            .iter()
            .find(|(key, _)| contains_word(&utterance.normalized, key))
            .map(|(_, display)| display.clone())
    }
}

/// Longest run of content words in the normalized sentence
#[derive(Debug, Clone, Copy, Default)]
pub struct NounPhraseFallback;

impl NounPhraseFallback {
    fn breaks_phrase(word: &str) -> bool {
        is_stopword(word)
            || GENERIC_WORDS.contains(&word)
            || CONVERSATIONAL_WORDS.contains(&word)
            || STATUS_WORDS.contains(&word)
            || DATE_WORDS.contains(&word)
            || word.contains('/')
            || is_ordinal_day(word)
    }

    fn candidates(text: &str) -> Vec<String> {
        let mut candidates = Vec::new();
        let mut current: Vec<String> = Vec::new();

        for token in tokens(text) {
            let word = token.to_lowercase();
            let opens_nothing = word.chars().all(|c| c.is_ascii_digit() || c == '#')
                || TRAILING_ONLY.contains(&word.as_str());

            if Self::breaks_phrase(&word) || (current.is_empty() && opens_nothing) {
                if !current.is_empty() {
                    candidates.push(current.join(" "));
                    current.clear();
                }
                continue;
            }
            current.push(word);
        }
        if !current.is_empty() {
            candidates.push(current.join(" "));
        }
        candidates
    }
}

impl TaskNameMatcher for NounPhraseFallback {
    fn label(&self) -> &'static str {
        "noun_phrase"
    }

    fn find(&self, utterance: &Utterance) -> Option<String> {
        Self::candidates(&utterance.normalized)
            .into_iter()
            .fold(None, |best: Option<String>, candidate| match best {
                Some(best) if best.len() >= candidate.len() => Some(best),
                _ => Some(candidate),
            })
            .map(|phrase| title_case(&phrase))
    }
}

fn is_ordinal_day(word: &str) -> bool {
    let digits = word.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    let suffix = &word[digits.len()..];
    !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit())
        && matches!(suffix, "st" | "nd" | "rd" | "th")
}

/// Ordered task-name matchers with first-hit-wins evaluation
pub struct TaskNameExtractor {
    matchers: Vec<Box<dyn TaskNameMatcher>>,
}

impl TaskNameExtractor {
    /// The standard matcher order, with task categories from the mapping file
    pub fn new<I, K, V>(categories: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut matchers: Vec<Box<dyn TaskNameMatcher>> = Vec::new();
        for structured in structured_patterns() {
            matchers.push(Box::new(structured));
        }
        matchers.push(Box::new(PourNumber::new()));
        matchers.push(Box::new(FloorActivity::new()));
        matchers.push(Box::new(QualifiedPhrase::new("installation", "installation")));
        matchers.push(Box::new(QualifiedPhrase::new("inspection", "inspection")));
        matchers.push(Box::new(CategoryLookup::new(categories)));
        matchers.push(Box::new(NounPhraseFallback));
        Self { matchers }
    }

    /// First matcher hit, with the label of the matcher that produced it
    pub fn extract_with_source(&self, utterance: &Utterance) -> Option<(&'static str, String)> {
        self.matchers.iter().find_map(|matcher| {
            matcher
                .find(utterance)
                .filter(|name| !name.trim().is_empty())
                .map(|name| (matcher.label(), name))
        })
    }

    pub fn extract(&self, utterance: &Utterance) -> Option<String> {
        self.extract_with_source(utterance).map(|(_, name)| name)
    }
}
