//! Status extraction
//!
//! Direct phrases are checked first and score 1.0. Only when none match
//! does the semantic tier embed what the utterance says besides the task
//! name and compare it with every status keyword, keeping the best cosine.

use crate::core::error::Result;
use crate::core::types::TaskStatus;
use crate::nlp::embedding::{Embedding, SentenceEncoder};
use crate::nlp::task_name::GENERIC_WORDS;
use crate::nlp::tokenize::{contains_word, is_stopword, tokens};
use ordered_float::OrderedFloat;
use tracing::warn;

/// Surface phrases that name a status outright, checked in this order so
/// "not started" wins over anything it contains
pub const DIRECT_PHRASES: &[(TaskStatus, &[&str])] = &[
    (
        TaskStatus::NotStarted,
        &["not started", "not start", "not begun", "unstarted", "not commenced"],
    ),
    (TaskStatus::Suspended, &["suspended", "suspend"]),
    (TaskStatus::OnHold, &["on hold", "hold"]),
    (TaskStatus::InProgress, &["in progress", "ongoing", "underway"]),
    (TaskStatus::Complete, &["complete", "completed", "finished", "done"]),
];

/// Looser vocabulary for the semantic tier
pub const STATUS_KEYWORDS: &[(TaskStatus, &[&str])] = &[
    (
        TaskStatus::Complete,
        &["complete", "finished", "done", "completed", "end", "ready"],
    ),
    (
        TaskStatus::InProgress,
        &["progress", "ongoing", "started", "working", "begin", "start", "doing"],
    ),
    (
        TaskStatus::OnHold,
        &["hold", "pause", "stopped", "delay", "wait", "pending"],
    ),
    (
        TaskStatus::Suspended,
        &["suspended", "suspend", "temporarily halted"],
    ),
    (
        TaskStatus::NotStarted,
        &["not start", "not started", "not begun", "unstarted", "not commenced"],
    ),
];

/// Status with the confidence it was found at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusMatch {
    pub status: TaskStatus,
    pub confidence: f32,
}

/// Direct-phrase lookup over lower-cased text
pub fn direct_status(lower: &str) -> Option<TaskStatus> {
    DIRECT_PHRASES
        .iter()
        .find(|(_, phrases)| phrases.iter().any(|phrase| contains_word(lower, phrase)))
        .map(|(status, _)| *status)
}

/// Content words outside the task name, joined; `None` when nothing is left
///
/// "not" survives so "not begun" keeps its meaning.
pub fn status_phrase(lower: &str, task_name: Option<&str>) -> Option<String> {
    let task_words: Vec<String> = task_name
        .map(|name| tokens(&name.to_lowercase()).into_iter().map(str::to_string).collect())
        .unwrap_or_default();
    let words: Vec<&str> = tokens(lower)
        .into_iter()
        .filter(|word| {
            *word == "not"
                || !(is_stopword(word)
                    || GENERIC_WORDS.contains(word)
                    || task_words.iter().any(|task_word| task_word.as_str() == *word))
        })
        .collect();
    (!words.is_empty()).then(|| words.join(" "))
}

/// Status keywords embedded once, plus the encoder for utterances
pub struct SemanticStatus {
    encoder: Box<dyn SentenceEncoder>,
    keywords: Vec<(TaskStatus, Vec<Embedding>)>,
}

impl SemanticStatus {
    pub fn new(encoder: Box<dyn SentenceEncoder>) -> Result<Self> {
        let keywords = STATUS_KEYWORDS
            .iter()
            .map(|(status, words)| -> Result<(TaskStatus, Vec<Embedding>)> {
                let texts: Vec<String> = words.iter().map(|word| word.to_string()).collect();
                Ok((*status, encoder.embed(&texts)?))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { encoder, keywords })
    }

    /// Best status by maximum cosine against its keywords
    fn best(&self, phrase: &Embedding) -> Option<StatusMatch> {
        self.keywords
            .iter()
            .map(|(status, keywords)| {
                let best = keywords
                    .iter()
                    .map(|keyword| OrderedFloat(phrase.cosine(keyword)))
                    .max()
                    .unwrap_or(OrderedFloat(0.0));
                (*status, best)
            })
            .max_by_key(|(_, score)| *score)
            .map(|(status, score)| StatusMatch {
                status,
                confidence: score.0,
            })
    }
}

pub struct StatusExtractor {
    semantic: Option<SemanticStatus>,
    floor: f32,
}

impl StatusExtractor {
    /// Direct phrases only
    pub fn new(floor: f32) -> Self {
        Self {
            semantic: None,
            floor,
        }
    }

    /// Direct phrases plus the semantic tier; an encoder that cannot embed
    /// the keywords leaves the tier off
    pub fn with_encoder(encoder: impl SentenceEncoder + 'static, floor: f32) -> Self {
        let semantic = match SemanticStatus::new(Box::new(encoder)) {
            Ok(semantic) => Some(semantic),
            Err(e) => {
                warn!(error = %e, "Could not embed status keywords, semantic status matching disabled");
                None
            }
        };
        Self { semantic, floor }
    }

    pub fn has_semantic_tier(&self) -> bool {
        self.semantic.is_some()
    }

    /// Semantic match for the words outside `task_name`, ignoring scores
    /// under the floor. Encoder failures are a miss.
    pub fn semantic(&self, lower: &str, task_name: Option<&str>) -> Option<StatusMatch> {
        let semantic = self.semantic.as_ref()?;
        let phrase = status_phrase(lower, task_name)?;
        let embedded = match semantic.encoder.embed(std::slice::from_ref(&phrase)) {
            Ok(mut embedded) => embedded.pop()?,
            Err(e) => {
                warn!(error = %e, phrase, "Embedding failed, no semantic status");
                return None;
            }
        };
        semantic
            .best(&embedded)
            .filter(|found| found.confidence >= self.floor)
    }

    /// Direct phrase first; the semantic tier only when `allow_semantic`
    pub fn extract(
        &self,
        lower: &str,
        task_name: Option<&str>,
        allow_semantic: bool,
    ) -> Option<StatusMatch> {
        if let Some(status) = direct_status(lower) {
            return Some(StatusMatch {
                status,
                confidence: 1.0,
            });
        }
        if allow_semantic {
            self.semantic(lower, task_name)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::embedding::fixtures::{BrokenEncoder, TableEncoder};

    fn extractor() -> StatusExtractor {
        StatusExtractor::with_encoder(TableEncoder, 0.5)
    }

    #[test]
    fn test_direct_phrases() {
        assert_eq!(direct_status("set slab a to complete"), Some(TaskStatus::Complete));
        assert_eq!(
            direct_status("update the status for stair 1000 to in progress"),
            Some(TaskStatus::InProgress)
        );
        assert_eq!(direct_status("window b on hold"), Some(TaskStatus::OnHold));
        assert_eq!(direct_status("suspend the roofing"), Some(TaskStatus::Suspended));
    }

    #[test]
    fn test_not_started_beats_started() {
        assert_eq!(
            direct_status("painting has not started"),
            Some(TaskStatus::NotStarted)
        );
    }

    #[test]
    fn test_direct_phrases_need_whole_words() {
        assert_eq!(direct_status("mark it incomplete"), None);
        assert_eq!(direct_status("update finish date"), None);
    }

    #[test]
    fn test_direct_match_has_full_confidence() {
        let found = extractor().extract("mark it done", None, false).unwrap();
        assert_eq!(found.status, TaskStatus::Complete);
        assert_eq!(found.confidence, 1.0);
    }

    #[test]
    fn test_status_phrase_drops_task_words() {
        assert_eq!(
            status_phrase("the roof membrane is paused", Some("Roof Membrane")).as_deref(),
            Some("paused")
        );
        assert_eq!(
            status_phrase("update the status for punch list completion", Some("Punch List Completion")),
            None
        );
        assert_eq!(
            status_phrase("slab b has not begun", Some("Slab B")).as_deref(),
            Some("not begun")
        );
    }

    #[test]
    fn test_semantic_tier_only_when_allowed() {
        let extractor = extractor();
        let text = "the roof membrane is paused";
        assert_eq!(extractor.extract(text, Some("Roof Membrane"), false), None);

        let found = extractor.extract(text, Some("Roof Membrane"), true).unwrap();
        assert_eq!(found.status, TaskStatus::OnHold);
        assert!(found.confidence < 1.0);
    }

    #[test]
    fn test_task_name_alone_names_no_status() {
        let text = "update the status for punch list completion";
        assert_eq!(extractor().semantic(text, Some("Punch List Completion")), None);
    }

    #[test]
    fn test_semantic_tier_respects_floor() {
        let found = extractor().semantic("roofing is wrapped up", Some("Roofing")).unwrap();
        assert_eq!(found.status, TaskStatus::Complete);
        assert!((found.confidence - 0.6).abs() < 1e-4);

        let strict = StatusExtractor::with_encoder(TableEncoder, 0.7);
        assert_eq!(strict.semantic("roofing is wrapped up", Some("Roofing")), None);
        assert_eq!(extractor().semantic("stair 1000 crew", Some("Stair 1000")), None);
    }

    #[test]
    fn test_unavailable_model_disables_semantic_tier() {
        let extractor = StatusExtractor::with_encoder(BrokenEncoder, 0.5);
        assert!(!extractor.has_semantic_tier());
        assert_eq!(extractor.extract("slab a is paused", Some("Slab A"), true), None);
        assert_eq!(
            extractor
                .extract("slab a is on hold", Some("Slab A"), true)
                .map(|found| found.status),
            Some(TaskStatus::OnHold)
        );
        assert!(!StatusExtractor::new(0.5).has_semantic_tier());
    }
}
