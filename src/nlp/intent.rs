//! Hybrid intent classification
//!
//! Keyword rules are evaluated in order and the first hit wins with
//! confidence 1.0. The statistical classifier only sees commands no rule
//! recognises.

use crate::core::types::Intent;
use crate::nlp::classifier::IntentClassifier;
use crate::nlp::tokenize::contains_word;
use crate::nlp::utterance::Utterance;
use tracing::debug;

/// How an intent was decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentSource {
    Rule(&'static str),
    Model,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntentPrediction {
    pub intent: Intent,
    pub confidence: f32,
    pub source: IntentSource,
}

/// A deterministic keyword rule over lower-cased text
pub struct IntentRule {
    pub label: &'static str,
    pub intent: Intent,
    pub matches: fn(&str) -> bool,
}

fn any_word(text: &str, words: &[&str]) -> bool {
    words.iter().any(|word| contains_word(text, word))
}

fn status_phrasing(text: &str) -> bool {
    any_word(text, &["update", "change", "set"]) && contains_word(text, "status")
}

fn date_phrasing(text: &str) -> bool {
    any_word(text, &["update", "change", "set", "move", "reschedule"])
        && any_word(
            text,
            &["start date", "finish date", "end date", "due date"],
        )
}

fn create_phrasing(text: &str) -> bool {
    any_word(text, &["add", "create", "new task"])
}

fn delete_phrasing(text: &str) -> bool {
    any_word(text, &["delete", "remove"])
}

/// Rules in evaluation order
pub fn default_rules() -> Vec<IntentRule> {
    vec![
        IntentRule {
            label: "status_update",
            intent: Intent::UpdateStatus,
            matches: status_phrasing,
        },
        IntentRule {
            label: "date_update",
            intent: Intent::UpdateDate,
            matches: date_phrasing,
        },
        IntentRule {
            label: "create",
            intent: Intent::CreateTask,
            matches: create_phrasing,
        },
        IntentRule {
            label: "delete",
            intent: Intent::DeleteTask,
            matches: delete_phrasing,
        },
    ]
}

pub struct IntentRecognizer {
    rules: Vec<IntentRule>,
    classifier: IntentClassifier,
}

impl IntentRecognizer {
    pub fn new(classifier: IntentClassifier) -> Self {
        Self {
            rules: default_rules(),
            classifier,
        }
    }

    /// Trains the fallback classifier on the synthetic corpus
    pub fn trained() -> Self {
        let (classifier, _) = IntentClassifier::train_default();
        Self::new(classifier)
    }

    pub fn rule_intent(&self, lower: &str) -> Option<&IntentRule> {
        self.rules.iter().find(|rule| (rule.matches)(lower))
    }

    pub fn recognize(&self, utterance: &Utterance) -> IntentPrediction {
        if let Some(rule) = self.rule_intent(&utterance.lower) {
            debug!(rule = rule.label, intent = %rule.intent, "Intent matched by rule");
            return IntentPrediction {
                intent: rule.intent,
                confidence: 1.0,
                source: IntentSource::Rule(rule.label),
            };
        }

        let (intent, confidence) = self.classifier.predict(&utterance.lemmatized);
        debug!(intent = %intent, confidence, "Intent predicted by classifier");
        IntentPrediction {
            intent,
            confidence,
            source: IntentSource::Model,
        }
    }
}
