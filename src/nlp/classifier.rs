//! Statistical intent classifier
//!
//! TF-IDF over word 1-3-grams of the lemmatized command, fed to a
//! multinomial naive Bayes model. Only consulted when no intent rule fires.

use crate::core::types::Intent;
use crate::nlp::tokenize::lemmatize;
use crate::nlp::training::{generate_training_data, TrainingExample};
use ahash::AHashMap;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

/// Seed for the train/test split, fixed so training is reproducible
pub const SPLIT_SEED: u64 = 42;
/// Share of the corpus held out for evaluation
pub const TEST_FRACTION: f32 = 0.2;

const NGRAM_MAX: usize = 3;
const MIN_DOCUMENT_FREQUENCY: usize = 2;
const SMOOTHING: f32 = 0.1;

fn class_index(intent: Intent) -> usize {
    Intent::ALL
        .iter()
        .position(|candidate| *candidate == intent)
        .unwrap_or(0)
}

/// Word n-grams (1 through `NGRAM_MAX`) of already-lemmatized text
pub fn ngrams(text: &str) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    (1..=NGRAM_MAX)
        .flat_map(|n| words.windows(n).map(|gram| gram.join(" ")))
        .collect()
}

/// Vocabulary plus smoothed inverse document frequencies
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: AHashMap<String, usize>,
    idf: Vec<f32>,
}

impl TfidfVectorizer {
    pub fn fit(documents: &[String]) -> Self {
        let mut document_frequency: AHashMap<String, usize> = AHashMap::new();
        for document in documents {
            let mut seen = ngrams(document);
            seen.sort();
            seen.dedup();
            for gram in seen {
                *document_frequency.entry(gram).or_insert(0) += 1;
            }
        }

        let mut kept: Vec<(String, usize)> = document_frequency
            .into_iter()
            .filter(|(_, df)| *df >= MIN_DOCUMENT_FREQUENCY)
            .collect();
        kept.sort();

        let n = documents.len() as f32;
        let idf = kept
            .iter()
            .map(|(_, df)| ((1.0 + n) / (1.0 + *df as f32)).ln() + 1.0)
            .collect();
        let vocabulary = kept
            .into_iter()
            .enumerate()
            .map(|(index, (gram, _))| (gram, index))
            .collect();

        Self { vocabulary, idf }
    }

    pub fn vocabulary_size(&self) -> usize {
        self.idf.len()
    }

    /// Sparse, L2-normalized TF-IDF vector
    pub fn transform(&self, document: &str) -> Vec<(usize, f32)> {
        let mut counts: AHashMap<usize, f32> = AHashMap::new();
        for gram in ngrams(document) {
            if let Some(&index) = self.vocabulary.get(&gram) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }
        let mut features: Vec<(usize, f32)> = counts
            .into_iter()
            .map(|(index, tf)| (index, tf * self.idf[index]))
            .collect();
        features.sort_by_key(|(index, _)| *index);

        let norm = features.iter().map(|(_, v)| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            features.iter_mut().for_each(|(_, v)| *v /= norm);
        }
        features
    }
}

/// Held-out evaluation of a trained model
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    /// (correct, total) per intent, in `Intent::ALL` order
    pub per_intent: [(usize, usize); 4],
}

impl Evaluation {
    pub fn accuracy(&self) -> f32 {
        let (correct, total) = self
            .per_intent
            .iter()
            .fold((0, 0), |(c, t), (ci, ti)| (c + ci, t + ti));
        if total == 0 {
            0.0
        } else {
            correct as f32 / total as f32
        }
    }

    pub fn intent_accuracy(&self, intent: Intent) -> Option<f32> {
        let (correct, total) = self.per_intent[class_index(intent)];
        (total > 0).then(|| correct as f32 / total as f32)
    }
}

#[derive(Debug, Clone)]
pub struct IntentClassifier {
    vectorizer: TfidfVectorizer,
    log_prior: [f32; 4],
    /// log P(feature | class), `[class][feature]`
    log_likelihood: [Vec<f32>; 4],
}

impl IntentClassifier {
    /// Fit on labelled examples (texts are lemmatized here)
    pub fn train(examples: &[TrainingExample]) -> Self {
        let documents: Vec<String> = examples.iter().map(|e| lemmatize(&e.text)).collect();
        let vectorizer = TfidfVectorizer::fit(&documents);
        let vocabulary_size = vectorizer.vocabulary_size();

        let mut class_counts = [0usize; 4];
        let mut feature_totals: [Vec<f32>; 4] =
            std::array::from_fn(|_| vec![0.0; vocabulary_size]);

        for (document, example) in documents.iter().zip(examples) {
            let class = class_index(example.intent);
            class_counts[class] += 1;
            for (index, value) in vectorizer.transform(document) {
                feature_totals[class][index] += value;
            }
        }

        let total_examples = examples.len().max(1) as f32;
        let log_prior = std::array::from_fn(|class| {
            ((class_counts[class] as f32 + 1.0) / (total_examples + 4.0)).ln()
        });
        let log_likelihood = feature_totals.map(|totals| {
            let denominator: f32 =
                totals.iter().sum::<f32>() + SMOOTHING * vocabulary_size as f32;
            totals
                .iter()
                .map(|count| ((count + SMOOTHING) / denominator).ln())
                .collect()
        });

        Self {
            vectorizer,
            log_prior,
            log_likelihood,
        }
    }

    /// Train on the synthetic corpus with a seeded 80/20 split and log the
    /// held-out accuracy per intent
    pub fn train_default() -> (Self, Evaluation) {
        let mut examples = generate_training_data();
        let mut rng = ChaCha8Rng::seed_from_u64(SPLIT_SEED);
        examples.shuffle(&mut rng);

        let test_len = (examples.len() as f32 * TEST_FRACTION).round() as usize;
        let (test, train) = examples.split_at(test_len);

        let classifier = Self::train(train);
        let evaluation = classifier.evaluate(test);

        for intent in Intent::ALL {
            if let Some(accuracy) = evaluation.intent_accuracy(intent) {
                info!(intent = %intent, accuracy, "Intent classifier held-out accuracy");
            }
        }
        info!(
            train = train.len(),
            test = test.len(),
            vocabulary = classifier.vectorizer.vocabulary_size(),
            accuracy = evaluation.accuracy(),
            "Intent classifier trained"
        );

        (classifier, evaluation)
    }

    pub fn evaluate(&self, examples: &[TrainingExample]) -> Evaluation {
        let mut evaluation = Evaluation::default();
        for example in examples {
            let (predicted, _) = self.predict(&lemmatize(&example.text));
            let slot = &mut evaluation.per_intent[class_index(example.intent)];
            slot.1 += 1;
            if predicted == example.intent {
                slot.0 += 1;
            }
        }
        evaluation
    }

    /// Posterior over `Intent::ALL` for lemmatized text
    pub fn predict_proba(&self, lemmatized: &str) -> [f32; 4] {
        let features = self.vectorizer.transform(lemmatized);
        let joint: [f32; 4] = std::array::from_fn(|class| {
            self.log_prior[class]
                + features
                    .iter()
                    .map(|(index, value)| value * self.log_likelihood[class][*index])
                    .sum::<f32>()
        });
        let max = joint.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let exp = joint.map(|j| (j - max).exp());
        let total: f32 = exp.iter().sum();
        exp.map(|e| e / total)
    }

    /// Most probable intent with its posterior as confidence
    pub fn predict(&self, lemmatized: &str) -> (Intent, f32) {
        let proba = self.predict_proba(lemmatized);
        Intent::ALL
            .into_iter()
            .zip(proba)
            .fold((Intent::ALL[0], f32::MIN), |best, candidate| {
                if candidate.1 > best.1 {
                    candidate
                } else {
                    best
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> (Intent, f32) {
        let (classifier, _) = IntentClassifier::train_default();
        classifier.predict(&lemmatize(text))
    }

    #[test]
    fn test_ngrams() {
        assert_eq!(
            ngrams("mark roof complete"),
            vec![
                "mark",
                "roof",
                "complete",
                "mark roof",
                "roof complete",
                "mark roof complete"
            ]
        );
    }

    #[test]
    fn test_min_document_frequency() {
        let docs = vec!["add roof".to_string(), "add wall".to_string()];
        let vectorizer = TfidfVectorizer::fit(&docs);
        // only "add" appears in two documents
        assert_eq!(vectorizer.vocabulary_size(), 1);
        assert_eq!(vectorizer.transform("add roof"), vec![(0, 1.0)]);
        assert!(vectorizer.transform("paint wall").is_empty());
    }

    #[test]
    fn test_held_out_accuracy() {
        let (_, evaluation) = IntentClassifier::train_default();
        assert!(evaluation.accuracy() > 0.9, "accuracy {}", evaluation.accuracy());
    }

    #[test]
    fn test_training_is_reproducible() {
        let (a, _) = IntentClassifier::train_default();
        let (b, _) = IntentClassifier::train_default();
        let text = lemmatize("push the landscaping back to april 4");
        assert_eq!(a.predict_proba(&text), b.predict_proba(&text));
    }

    #[test]
    fn test_predicts_novel_phrasing() {
        assert_eq!(classify("push the landscaping back to june 15").0, Intent::UpdateDate);
        assert_eq!(classify("cancel the fencing installation").0, Intent::DeleteTask);
        assert_eq!(classify("i need a new task for tile installation").0, Intent::CreateTask);
        assert_eq!(classify("mark the roofing as on hold").0, Intent::UpdateStatus);
    }

    #[test]
    fn test_posterior_is_a_distribution() {
        let (classifier, _) = IntentClassifier::train_default();
        let proba = classifier.predict_proba(&lemmatize("shift bricklaying to tomorrow"));
        let total: f32 = proba.iter().sum();
        assert!((total - 1.0).abs() < 1e-4);
        let (_, confidence) = classifier.predict(&lemmatize("shift bricklaying to tomorrow"));
        assert!(confidence > 0.6, "confidence {}", confidence);
    }

    #[test]
    fn test_unknown_words_fall_back_to_prior() {
        let (classifier, _) = IntentClassifier::train_default();
        let (intent, confidence) = classifier.predict("zzz qqq");
        assert!(Intent::ALL.contains(&intent));
        assert!(confidence < 0.6, "confidence {}", confidence);
    }
}
