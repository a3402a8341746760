//! Remote lookup trait for listing an action's tags and branches

#[cfg(test)]
use mockall::automock;

use serde::{Deserialize, Serialize};

use crate::pin::error::LookupError;

/// Commit a named ref points at
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    #[serde(default)]
    pub sha: String,
    #[serde(default)]
    pub url: String,
}

/// A tag or branch as returned by the listing endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitRef {
    pub name: String,
    #[serde(default)]
    pub commit: Commit,
}

impl GitRef {
    pub fn new(name: impl Into<String>, sha: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commit: Commit {
                sha: sha.into(),
                url: String::new(),
            },
        }
    }
}

/// Find the commit for `version` in a listing.
///
/// An entry whose name matches but whose commit sha is empty counts as absent.
pub fn find_commit<'a>(refs: &'a [GitRef], version: &str) -> Option<&'a str> {
    refs.iter()
        .find(|r| r.name == version)
        .map(|r| r.commit.sha.as_str())
        .filter(|sha| !sha.is_empty())
}

/// Trait for listing the named refs of an action repository
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait RefLookup: Send + Sync {
    /// Lists tags for `action` ("owner/name")
    async fn list_tags(&self, action: &str) -> Result<Vec<GitRef>, LookupError>;

    /// Lists branches for `action` ("owner/name")
    async fn list_branches(&self, action: &str) -> Result<Vec<GitRef>, LookupError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn listing() -> Vec<GitRef> {
        vec![
            GitRef::new("v1.0.0", "sha-1"),
            GitRef::new("v2.0.0", ""),
            GitRef::new("v2.0.0", "sha-dup"),
        ]
    }

    #[rstest]
    #[case("v1.0.0", Some("sha-1"))]
    #[case("v2.0.0", None)]
    #[case("v3.0.0", None)]
    fn find_commit_returns_expected(#[case] version: &str, #[case] expected: Option<&str>) {
        assert_eq!(find_commit(&listing(), version), expected);
    }

    #[test]
    fn git_ref_deserializes_github_shape() {
        let refs: Vec<GitRef> = serde_json::from_str(
            r#"[{"name": "v4", "commit": {"sha": "abc", "url": "https://api.github.com/x"}, "zipball_url": "z"}]"#,
        )
        .unwrap();

        assert_eq!(refs[0].name, "v4");
        assert_eq!(refs[0].commit.sha, "abc");
    }

    #[test]
    fn git_ref_without_commit_has_empty_sha() {
        let refs: Vec<GitRef> = serde_json::from_str(r#"[{"name": "main"}]"#).unwrap();

        assert_eq!(find_commit(&refs, "main"), None);
    }
}
