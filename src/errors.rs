use std::path::PathBuf;

use thiserror::Error;

// Errors for the fallible edges of the crate: loading flag data and reading
// runner input. Translation and dispatch never return these.
#[derive(Debug, Error)]
pub enum ProviderError {
    // Input that should have been JSON was not
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Flag data that parsed but cannot be evaluated
    #[error("invalid flag '{flag}': {message}")]
    InvalidFlag { flag: String, message: String },

    #[error("default value {value} is not a valid {expected} value")]
    DefaultType { value: String, expected: String },
}

// Type alias for results that use `ProviderError` as the error type
pub type Result<T> = std::result::Result<T, ProviderError>;
