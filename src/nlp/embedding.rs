//! Sentence embeddings for the semantic status tier
//!
//! [`Embedder`] runs the all-MiniLM-L6-v2 sentence-transformer locally
//! through fastembed (ONNX runtime). The model is downloaded on first use
//! and cached under the configured directory. Vectors are L2-normalized as
//! they come in, so cosine similarity is a dot product.

use crate::core::error::{Result, SchedulerError};
use fastembed::{EmbeddingModel, TextEmbedding, TextInitOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

/// Output width of all-MiniLM-L6-v2
pub const EMBEDDING_DIM: usize = 384;

/// A unit-length embedding (all zeros if the encoder returned a zero vector)
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding(Vec<f32>);

impl Embedding {
    pub fn new(mut vector: Vec<f32>) -> Self {
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        Self(vector)
    }

    /// Zero when the dimensions differ
    pub fn cosine(&self, other: &Embedding) -> f32 {
        if self.0.len() != other.0.len() {
            return 0.0;
        }
        self.0.iter().zip(&other.0).map(|(a, b)| a * b).sum()
    }
}

/// Anything that turns text into dense vectors
pub trait SentenceEncoder: Send + Sync {
    /// One raw vector per input, in input order
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let vectors = self.encode(texts)?;
        if vectors.len() != texts.len() {
            return Err(SchedulerError::Embedding(format!(
                "encoder returned {} vectors for {} texts",
                vectors.len(),
                texts.len()
            )));
        }
        Ok(vectors.into_iter().map(Embedding::new).collect())
    }
}

/// all-MiniLM-L6-v2 via fastembed
///
/// `TextEmbedding::embed` needs `&mut self`, so the model sits behind a
/// mutex and the embedder can be shared between sessions.
pub struct Embedder {
    model: Mutex<TextEmbedding>,
}

impl Embedder {
    /// Load the model, downloading it into `cache_dir` on first run
    pub fn load(cache_dir: &Path) -> Result<Self> {
        let model = TextEmbedding::try_new(
            TextInitOptions::new(EmbeddingModel::AllMiniLML6V2)
                .with_cache_dir(cache_dir.to_path_buf())
                .with_show_download_progress(false),
        )
        .map_err(|e| SchedulerError::Embedding(e.to_string()))?;
        info!(cache = %cache_dir.display(), "Sentence-embedding model loaded");
        Ok(Self {
            model: Mutex::new(model),
        })
    }
}

impl SentenceEncoder for Embedder {
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut model = self
            .model
            .lock()
            .map_err(|_| SchedulerError::Embedding("embedding model lock poisoned".into()))?;
        model
            .embed(texts.to_vec(), None)
            .map_err(|e| SchedulerError::Embedding(e.to_string()))
    }
}
