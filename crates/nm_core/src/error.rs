use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Scoring error: {0}")]
    Scoring(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Blob not found: {container}/{key}")]
    BlobNotFound { container: String, key: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid blob key: {0:?}")]
    InvalidKey(String),

    #[error("{invocation} exceeded its {budget:?} budget")]
    Timeout {
        invocation: String,
        budget: Duration,
    },
}

impl Error {
    /// Name of the error class, as reported in logs and HTTP bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Fetch(_) => "FetchError",
            Error::Parse(_) => "ParseError",
            Error::MalformedInput(_) => "MalformedInputError",
            Error::Scoring(_) => "ScoringError",
            Error::Storage(_) | Error::BlobNotFound { .. } | Error::Io(_) => "StorageError",
            Error::Validation(_) => "ValidationError",
            Error::Config(_) => "ConfigError",
            Error::InvalidKey(_) => "InvalidKeyError",
            Error::Timeout { .. } => "TimeoutError",
            Error::Serialization(_) => "SerializationError",
        }
    }

    /// True for failures caused by the caller's input rather than the system.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::MalformedInput(_) | Error::InvalidKey(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
