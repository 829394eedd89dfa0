use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Not authenticated with the scheduling backend")]
    NotAuthenticated,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Embedding model error: {0}")]
    Embedding(String),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
