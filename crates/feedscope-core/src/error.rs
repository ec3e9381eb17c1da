//! Error types for feedscope

use thiserror::Error;

/// Result type alias using FeedscopeError
pub type Result<T> = std::result::Result<T, FeedscopeError>;

/// Error type alias for convenience
pub type Error = FeedscopeError;

/// Exit codes for CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const NOT_FOUND: i32 = 2;
    pub const INVALID_INPUT: i32 = 3;
}

/// Main error type for feedscope
#[derive(Debug, Error)]
pub enum FeedscopeError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Embedding unavailable after {attempts} attempts: {reason}")]
    EmbeddingUnavailable { attempts: usize, reason: String },

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("{provider} returned HTTP {status}: {body}")]
    ProviderStatus {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("Malformed response from {provider}: {reason}")]
    MalformedResponse { provider: String, reason: String },

    #[error("{provider} returned {length} characters, need more than {min}")]
    EmptyResponse {
        provider: String,
        length: usize,
        min: usize,
    },

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: String,
        after: std::time::Duration,
    },

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Coarse classification of a failed provider call
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorKind {
    /// Deadline exceeded
    Timeout,
    /// Connection-level failure
    Transport,
    /// Non-success HTTP/API status
    Status,
    /// Body could not be parsed or had the wrong shape
    Malformed,
    /// Empty or too-short text
    Empty,
    Other,
}

impl FeedscopeError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound(_) => exit_codes::NOT_FOUND,
            Self::InvalidInput(_) | Self::Config(_) => exit_codes::INVALID_INPUT,
            _ => exit_codes::GENERAL_ERROR,
        }
    }

    /// Caller mistakes, as opposed to degraded external services
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// Classify a provider-side failure
    pub fn provider_error_kind(&self) -> ProviderErrorKind {
        match self {
            Self::Timeout { .. } => ProviderErrorKind::Timeout,
            Self::Http(e) if e.is_timeout() => ProviderErrorKind::Timeout,
            Self::Http(e) if e.is_decode() => ProviderErrorKind::Malformed,
            Self::Http(_) => ProviderErrorKind::Transport,
            Self::ProviderStatus { .. } => ProviderErrorKind::Status,
            Self::MalformedResponse { .. }
            | Self::Serialization(_)
            | Self::DimensionMismatch { .. } => ProviderErrorKind::Malformed,
            Self::EmptyResponse { .. } => ProviderErrorKind::Empty,
            _ => ProviderErrorKind::Other,
        }
    }
}
