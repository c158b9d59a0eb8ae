/*!
 * Error types for the pagetrans library.
 *
 * This module contains custom error types for the different layers of the
 * engine, using the thiserror crate for ergonomic error definitions.
 *
 * Only pass-level failures (`TranslationError`) ever reach the user. Provider
 * errors raised for a single text unit are swallowed by the batch executor and
 * detection errors are recovered by the language resolver.
 */

use thiserror::Error;

/// Errors that can occur when talking to a translation capability
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// The translator refused the text
    #[error("Translation rejected: {0}")]
    Rejected(String),

    /// The requested language pair is not supported
    #[error("Unsupported language pair: {source_language} -> {target_language}")]
    UnsupportedLanguagePair {
        /// Source language code
        source_language: String,
        /// Target language code
        target_language: String,
    },
}

/// Errors raised by the optional language detection capability
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectionError {
    /// No detector is installed, or it reports itself unusable
    #[error("Language detection is unavailable")]
    Unavailable,

    /// The detector failed while running
    #[error("Language detection failed: {0}")]
    Failed(String),

    /// The detector ran but produced no candidate
    #[error("Language detection returned no result")]
    NoResult,
}

/// Pass-level translation failures
#[derive(Error, Debug)]
pub enum TranslationError {
    /// The host provides no translation capability at all
    #[error("Translation capability is unavailable")]
    CapabilityUnavailable,

    /// A failure outside the per-unit boundary aborted the pass
    #[error("Translation pass failed while {stage}: {source}")]
    PassFailure {
        /// What the pass was doing when it failed
        stage: &'static str,
        /// Underlying provider error
        #[source]
        source: ProviderError,
    },
}

impl TranslationError {
    /// Create a pass failure for the given stage
    pub fn pass_failure(stage: &'static str, source: ProviderError) -> Self {
        Self::PassFailure { stage, source }
    }

    /// Short text suitable for a status surface
    pub fn detail(&self) -> String {
        match self {
            Self::CapabilityUnavailable => "No translator is configured for this document".to_string(),
            Self::PassFailure { source, .. } => source.to_string(),
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error while producing or consuming HTML
    #[error("Document error: {0}")]
    Document(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from a translation pass
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
