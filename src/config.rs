use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

// =============================================================================
// Lookup-related constants
// =============================================================================

/// Default base URL for the GitHub REST API
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Timeout for a single lookup request in milliseconds (5 seconds)
pub const FETCH_TIMEOUT_MS: u64 = 5_000;

/// Page size requested from the tags/branches listings
pub const LISTING_PAGE_SIZE: usize = 100;

/// Upper bound on listing pages followed for a single action
pub const LISTING_MAX_PAGES: usize = 10;

// =============================================================================
// Filesystem layout
// =============================================================================

/// Name of the JSON snapshot inside a cache namespace directory
pub const CACHE_FILE_NAME: &str = "cache.json";

/// Workflow directory relative to a repository root
pub const WORKFLOW_DIR: &str = ".github/workflows";

/// Entries at a workspace root that are never treated as repositories
pub const IGNORED_DIR_NAMES: &[&str] = &[
    ".DS_Store",
    ".ruff_cache",
    ".ropeproject",
    ".git",
    ".idea",
    ".vscode",
];

/// Top-level configuration, usually read from a JSON file
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub cache: CacheConfig,
    pub github: GitHubConfig,
}

/// Reference cache configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheConfig {
    /// Cache namespace directory; defaults to the per-user cache directory
    pub dir: Option<PathBuf>,
    /// Entries older than this many seconds are re-resolved. `None` keeps them forever.
    pub ttl_secs: Option<u64>,
}

/// GitHub lookup configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct GitHubConfig {
    pub api_url: String,
    pub timeout_ms: u64,
    pub token: Option<String>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_ms: FETCH_TIMEOUT_MS,
            token: None,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Cache namespace directory, falling back to [`cache_dir`]
    pub fn cache_dir(&self) -> PathBuf {
        self.cache.dir.clone().unwrap_or_else(cache_dir)
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache.ttl_secs.map(Duration::from_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.github.timeout_ms)
    }

    /// GitHub token from the config, or from `GITHUB_TOKEN` when unset
    pub fn github_token(&self) -> Option<String> {
        self.github
            .token
            .clone()
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
            .filter(|t| !t.is_empty())
    }
}

/// Returns the per-machine cache namespace for pinsha.
/// Uses $XDG_CACHE_HOME/pinsha if XDG_CACHE_HOME is set,
/// otherwise falls back to ~/.cache/pinsha,
/// or ./pinsha if neither is available.
pub fn cache_dir() -> PathBuf {
    cache_dir_with_env(std::env::var("XDG_CACHE_HOME").ok(), dirs::home_dir())
}

/// Returns the workflow directory of a repository rooted at `root`.
pub fn workflow_dir(root: &Path) -> PathBuf {
    root.join(WORKFLOW_DIR)
}

fn cache_dir_with_env(xdg_cache_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let cache_dir = xdg_cache_home
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".cache")))
        .unwrap_or_else(|| PathBuf::from("."));

    cache_dir.join("pinsha")
}
