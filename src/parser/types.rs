//! Common types for reference scanning

use serde::Serialize;

/// Version used when a reference carries no `@version` part
pub const DEFAULT_VERSION: &str = "main";

/// An `owner/name@version` action reference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionRef {
    /// Repository part, e.g. "actions/checkout"
    pub action: String,
    /// Tag, version or branch, e.g. "v4"
    pub version: String,
}

impl ActionRef {
    /// Split a raw reference on its last `@`.
    ///
    /// A missing or empty version defaults to [`DEFAULT_VERSION`].
    pub fn parse(raw: &str) -> Self {
        let (action, version) = match raw.rsplit_once('@') {
            Some((action, version)) => (action, version),
            None => (raw, ""),
        };
        let version = if version.is_empty() {
            DEFAULT_VERSION
        } else {
            version
        };

        Self {
            action: action.to_string(),
            version: version.to_string(),
        }
    }

    /// Whether the version is routed to the tags listing.
    ///
    /// Anything starting with `v`/`V` is a tag; everything else, bare numeric
    /// versions included, is looked up as a branch.
    pub fn is_tag(&self) -> bool {
        self.version
            .get(..1)
            .is_some_and(|first| first.eq_ignore_ascii_case("v"))
    }

    /// The pinned form: `owner/name@<sha> # <version>`
    pub fn pinned(&self, sha: &str) -> String {
        format!("{}@{} # {}", self.action, sha, self.version)
    }
}

impl std::fmt::Display for ActionRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.action, self.version)
    }
}

/// A mutable reference located in file content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    /// Matched text, e.g. "actions/checkout@v4"
    pub text: String,
    /// Owner segment (first pattern group)
    pub owner: String,
    /// Name segment (second pattern group)
    pub name: String,
    /// Version segment (third pattern group)
    pub version: String,
    /// Line number (1-indexed)
    pub line: usize,
    /// Byte column within the line (1-indexed)
    pub column: usize,
}

impl Match {
    pub fn action(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    pub fn action_ref(&self) -> ActionRef {
        ActionRef {
            action: self.action(),
            version: self.version.clone(),
        }
    }
}
