use std::path::PathBuf;

use thiserror::Error;

pub use crate::pin::error::{CacheError, LookupError, ResolveError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Failure of a version-control operation
#[derive(Debug, Error)]
pub enum VcsError {
    #[error("Failed to run git: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("git {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("Failed to create clone directory: {0}")]
    TempDir(std::io::Error),
}

/// Failure while traversing a repository or workspace
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("{0:?} is not a Git repository")]
    NotARepository(PathBuf),

    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Version control error: {0}")]
    Vcs(#[from] VcsError),

    #[error("Failed to clone {url}: {source}")]
    Clone { url: String, source: VcsError },
}

/// Failure while rewriting a workflow file
#[derive(Debug, Error)]
pub enum FixError {
    #[error("Could not find {original:?} at line {line}, col {column} in {path:?}")]
    PositionMismatch {
        path: PathBuf,
        original: String,
        line: usize,
        column: usize,
    },

    #[error("Failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Failure while installing the log subscriber
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log file path {0:?}")]
    InvalidLogFile(PathBuf),

    #[error("Failed to install log subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}
