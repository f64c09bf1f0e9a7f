//! Error types for the triage service.

use std::time::Duration;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} timed out after {timeout:?}")]
    Timeout { provider: String, timeout: Duration },
}

/// Classification errors.
///
/// A completion that cannot be parsed is not an error: the parser absorbs
/// it into a fallback result.
#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    /// The caller supplied no usable text.
    #[error("{0}")]
    Input(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
}

/// Failures while reading a `/process` submission off the wire.
///
/// An upload that decodes to an empty string is not an error here; it
/// surfaces later as [`ClassifyError::Input`].
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Request body exceeds the {limit} byte limit")]
    TooLarge { limit: usize },

    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("Malformed form body: {0}")]
    MalformedForm(String),

    /// The uploaded file stream broke mid-read.
    #[error("{0}")]
    FileRead(String),
}
