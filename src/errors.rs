use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrediRagError {
    #[error("Invalid question: {0}")]
    Validation(String),

    #[error("Complaint retrieval timed out after {0}s")]
    RetrievalTimeout(u64),

    #[error("Answer generation timed out after {0}s")]
    PipelineTimeout(u64),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Vector index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("Rate limit exceeded for client {0}")]
    RateLimitExceeded(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CrediRagError>;
