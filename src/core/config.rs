//! Assistant configuration with documented defaults
//!
//! Every tunable the pipeline, task store and backend client read lives
//! here. Values come from an optional TOML file, then environment
//! overrides, then command-line overrides in the binary.

use crate::core::error::{Result, SchedulerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub backend: BackendConfig,
    pub storage: StorageConfig,
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
}

/// Scheduling backend connection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the scheduling service
    ///
    /// The timeliner add-in listens on localhost:5000 unless reconfigured.
    pub base_url: String,

    /// Client id used for token authentication
    pub client_id: Option<String>,

    /// Client secret used for token authentication
    pub client_secret: Option<String>,

    /// Seconds before the reported expiry at which a token counts as expired
    ///
    /// A token that expires mid-request fails the whole command, so the
    /// client re-authenticates a little early. 300 = five minutes.
    pub token_refresh_margin_secs: i64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".into(),
            client_id: None,
            client_secret: None,
            token_refresh_margin_secs: 300,
        }
    }
}

/// Where task state is persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Snapshot of task statuses and dates, rewritten after every mutation
    pub state_file: PathBuf,

    /// Task category mapping (short key -> display name), seeded on first run
    pub mapping_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_file: PathBuf::from("task_state.json"),
            mapping_file: PathBuf::from("task_mapping.json"),
        }
    }
}

/// Command-understanding thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Minimum intent confidence for a command to execute without confirmation
    ///
    /// Rule matches always score 1.0, so this only gates the statistical
    /// fallback. At 0.6 the classifier has to clearly prefer one intent.
    pub confidence_threshold: f32,

    /// Minimum similarity for a semantic (non-keyword) status match
    ///
    /// Below this the utterance is treated as naming no status at all and
    /// the user is asked which status they meant. MiniLM puts unrelated
    /// single words around 0.2-0.4.
    pub status_similarity_floor: f32,

    /// Load the sentence-embedding model for semantic status matching
    pub semantic_status: bool,

    /// Where fastembed caches the downloaded model
    pub embedding_cache_dir: PathBuf,

    /// Length of a newly created task when no finish date is given
    pub default_duration_days: i64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.6,
            status_similarity_floor: 0.5,
            semantic_status: true,
            embedding_cache_dir: PathBuf::from(".fastembed_cache"),
            default_duration_days: 30,
        }
    }
}

/// Log output
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive, used when RUST_LOG is not set
    pub filter: String,

    /// Append log lines to this file instead of stderr
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "site_scheduler=info".into(),
            file: None,
        }
    }
}

impl AssistantConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document; absent keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load from a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Apply SCHEDULER_BASE_URL, SCHEDULER_CLIENT_ID and SCHEDULER_CLIENT_SECRET
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("SCHEDULER_BASE_URL") {
            self.backend.base_url = url;
        }
        if let Some(id) = lookup("SCHEDULER_CLIENT_ID") {
            self.backend.client_id = Some(id);
        }
        if let Some(secret) = lookup("SCHEDULER_CLIENT_SECRET") {
            self.backend.client_secret = Some(secret);
        }
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(0.0..=1.0).contains(&self.pipeline.confidence_threshold) {
            return Err(format!(
                "confidence_threshold ({}) must be within 0.0..=1.0",
                self.pipeline.confidence_threshold
            ));
        }

        if !(0.0..=1.0).contains(&self.pipeline.status_similarity_floor) {
            return Err(format!(
                "status_similarity_floor ({}) must be within 0.0..=1.0",
                self.pipeline.status_similarity_floor
            ));
        }

        if self.pipeline.default_duration_days < 0 {
            return Err("default_duration_days must not be negative".into());
        }

        if self.backend.token_refresh_margin_secs < 0 {
            return Err("token_refresh_margin_secs must not be negative".into());
        }

        if !self.backend.base_url.starts_with("http://")
            && !self.backend.base_url.starts_with("https://")
        {
            return Err(format!(
                "base_url ({}) must be an http(s) URL",
                self.backend.base_url
            ));
        }

        Ok(())
    }

    /// Validate, converting failures into the crate error type
    pub fn validated(self) -> Result<Self> {
        self.validate().map_err(SchedulerError::Config)?;
        Ok(self)
    }

    /// Client credentials, when both halves are configured
    pub fn credentials(&self) -> Option<(String, String)> {
        match (&self.backend.client_id, &self.backend.client_secret) {
            (Some(id), Some(secret)) => Some((id.clone(), secret.clone())),
            _ => None,
        }
    }
}
