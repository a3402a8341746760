use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Failed to access cache {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Corrupt cache file {path:?}: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to encode cache: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Failed to persist cache: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Cache lock poisoned")]
    LockPoisoned,
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Rate limited: retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Repository not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Version {version} is not found for action {action}")]
    NotFound { action: String, version: String },

    #[error("Lookup failed for {reference}: {source}")]
    Transport {
        reference: String,
        source: LookupError,
    },
}

impl ResolveError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolveError::NotFound { .. })
    }
}
