//! Error types for Insight.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A generation call could not be completed (network, HTTP status, timeout).
    #[error("Generative service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The call succeeded but the text did not have the expected structure.
    #[error("Malformed generated output: {0}")]
    MalformedOutput(String),

    /// Well-formed output that failed a semantic constraint.
    #[error("Generated output rejected: {0}")]
    ValidationRejected(String),

    /// Every generation attempt for a document failed.
    #[error("Synthesis failed for all {attempted} attempt(s)")]
    TotalSynthesisFailure { attempted: usize },

    /// A content normalizer produced nothing worth synthesizing.
    #[error("No usable text: {0}")]
    NoUsableText(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(String),
}

pub type Result<T> = std::result::Result<T, Error>;
