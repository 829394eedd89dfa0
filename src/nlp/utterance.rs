//! The forms of one input string every extractor reads from

use crate::nlp::normalize::normalize;
use crate::nlp::tokenize::lemmatize;

/// Raw input plus its derived forms. Built once per command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub raw: String,
    pub lower: String,
    pub normalized: String,
    pub lemmatized: String,
}

impl Utterance {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let lower = raw.to_lowercase();
        let normalized = normalize(&raw);
        let lemmatized = lemmatize(&raw);
        Self {
            raw,
            lower,
            normalized,
            lemmatized,
        }
    }
}
