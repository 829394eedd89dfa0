//! Command understanding: normalization, entity extraction, intent
//!
//! [`NlpEngine`] runs every extractor over one [`Utterance`] and returns a
//! typed [`ParsedCommand`]. Nothing here touches task state.

pub mod classifier;
pub mod dates;
pub mod embedding;
pub mod intent;
pub mod normalize;
pub mod status;
pub mod task_name;
pub mod tokenize;
pub mod training;
pub mod utterance;

pub use intent::{IntentPrediction, IntentRecognizer, IntentSource};
pub use normalize::normalize;
pub use utterance::Utterance;

use crate::core::config::PipelineConfig;
use crate::core::types::{ExtractedEntities, Intent};
use chrono::NaiveDate;
use dates::DateExtractor;
use embedding::Embedder;
use regex::Regex;
use serde::{Deserialize, Serialize};
use status::StatusExtractor;
use task_name::TaskNameExtractor;
use tracing::{debug, warn};

/// Compile a pattern that is a literal in this crate
pub(crate) fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("static pattern")
}

/// One command after classification and extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedCommand {
    pub text: String,
    pub intent: Intent,
    pub entities: ExtractedEntities,
}

impl ParsedCommand {
    pub fn confidence(&self) -> f32 {
        self.entities.confidence
    }
}

pub struct NlpEngine {
    task_names: TaskNameExtractor,
    dates: DateExtractor,
    status: StatusExtractor,
    intents: IntentRecognizer,
}

impl NlpEngine {
    pub fn new(
        task_names: TaskNameExtractor,
        intents: IntentRecognizer,
        status: StatusExtractor,
    ) -> Self {
        Self {
            task_names,
            dates: DateExtractor::new(),
            status,
            intents,
        }
    }

    /// Standard extractors plus a freshly trained intent classifier. The
    /// embedding model is loaded when `semantic_status` is on; if it cannot
    /// be loaded, statuses come from direct phrases only.
    pub fn with_categories<I, K, V>(categories: I, config: &PipelineConfig) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let floor = config.status_similarity_floor;
        let status = if config.semantic_status {
            match Embedder::load(&config.embedding_cache_dir) {
                Ok(embedder) => StatusExtractor::with_encoder(embedder, floor),
                Err(e) => {
                    warn!(error = %e, "Sentence-embedding model unavailable, semantic status matching disabled");
                    StatusExtractor::new(floor)
                }
            }
        } else {
            StatusExtractor::new(floor)
        };
        Self::new(
            TaskNameExtractor::new(categories),
            IntentRecognizer::trained(),
            status,
        )
    }

    pub fn parse(&self, text: &str, today: NaiveDate) -> ParsedCommand {
        let utterance = Utterance::new(text);
        let prediction = self.intents.recognize(&utterance);

        let task_name = self.task_names.extract(&utterance);
        let dates = self.dates.extract(&utterance, today);
        let status = self
            .status
            .extract(
                &utterance.lower,
                task_name.as_deref(),
                prediction.intent == Intent::UpdateStatus,
            )
            .map(|found| found.status);

        let entities = ExtractedEntities {
            task_name,
            dates,
            status,
            confidence: prediction.confidence,
        };
        debug!(
            intent = %prediction.intent,
            confidence = prediction.confidence,
            ?entities,
            "Parsed command"
        );

        ParsedCommand {
            text: text.to_string(),
            intent: prediction.intent,
            entities,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{DateType, TaskStatus};
    use crate::nlp::embedding::fixtures::TableEncoder;

    const CATEGORIES: [(&str, &str); 1] = [("hvac", "HVAC Installation")];

    fn engine() -> NlpEngine {
        let config = PipelineConfig {
            semantic_status: false,
            ..PipelineConfig::default()
        };
        NlpEngine::with_categories(CATEGORIES, &config)
    }

    fn semantic_engine() -> NlpEngine {
        NlpEngine::new(
            TaskNameExtractor::new(CATEGORIES),
            IntentRecognizer::trained(),
            StatusExtractor::with_encoder(TableEncoder, 0.5),
        )
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn test_parse_start_date_command() {
        let parsed = engine().parse(
            "Update start date for door 1000 installation to March 9",
            today(),
        );
        assert_eq!(parsed.intent, Intent::UpdateDate);
        assert_eq!(parsed.confidence(), 1.0);
        assert_eq!(
            parsed.entities.task_name.as_deref(),
            Some("Door 1000 Installation")
        );
        assert_eq!(
            parsed.entities.dates.start_date,
            NaiveDate::from_ymd_opt(2026, 3, 9)
        );
        assert_eq!(parsed.entities.dates.date_type, DateType::Start);
        assert_eq!(parsed.entities.status, None);
    }

    #[test]
    fn test_parse_status_command() {
        let parsed = engine().parse("Update the status for slab A to complete", today());
        assert_eq!(parsed.intent, Intent::UpdateStatus);
        assert_eq!(parsed.entities.task_name.as_deref(), Some("Slab A"));
        assert_eq!(parsed.entities.status, Some(TaskStatus::Complete));
    }

    #[test]
    fn test_status_without_status_word() {
        let parsed = engine().parse("Update the status for stair 1000", today());
        assert_eq!(parsed.intent, Intent::UpdateStatus);
        assert_eq!(parsed.entities.task_name.as_deref(), Some("Stair 1000"));
        assert_eq!(parsed.entities.status, None);
    }

    #[test]
    fn test_semantic_status_only_for_status_intent() {
        let engine = semantic_engine();
        let parsed = engine.parse("change hvac status to paused", today());
        assert_eq!(parsed.intent, Intent::UpdateStatus);
        assert_eq!(parsed.entities.status, Some(TaskStatus::OnHold));

        let parsed = engine.parse("add hvac, paused for now", today());
        assert_eq!(parsed.intent, Intent::CreateTask);
        assert_eq!(parsed.entities.status, None);
    }

    #[test]
    fn test_task_name_is_not_read_as_status() {
        let parsed = semantic_engine().parse("Update the status for punch list completion", today());
        assert_eq!(parsed.intent, Intent::UpdateStatus);
        assert_eq!(
            parsed.entities.task_name.as_deref(),
            Some("Punch List Completion")
        );
        assert_eq!(parsed.entities.status, None);
    }

    #[test]
    fn test_without_model_only_direct_phrases() {
        let parsed = engine().parse("change hvac status to paused", today());
        assert_eq!(parsed.entities.status, None);
    }

    #[test]
    fn test_parse_keeps_original_text() {
        let parsed = engine().parse("Delete railing task", today());
        assert_eq!(parsed.text, "Delete railing task");
        assert_eq!(parsed.intent, Intent::DeleteTask);
        assert_eq!(parsed.entities.task_name.as_deref(), Some("Railing"));
    }
}
