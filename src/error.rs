//! HookForge error types

use thiserror::Error;

/// HookForge error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// No configured backend (including the fallback) could be reached
    #[error("Backend '{backend}' unavailable: {reason}")]
    BackendUnavailable { backend: String, reason: String },

    /// A backend call exceeded its timeout
    #[error("Backend '{backend}' timed out after {seconds}s")]
    BackendTimeout { backend: String, seconds: u64 },

    /// Compliance rule set error
    #[error("Compliance error: {0}")]
    Compliance(String),

    /// Ad corpus error
    #[error("Corpus error: {0}")]
    Corpus(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for HookForge operations
pub type Result<T> = std::result::Result<T, Error>;
