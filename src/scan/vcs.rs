//! Version-control capability used by the traversal
//!
//! Abstracting the VCS lets the traversal run against in-memory fakes in
//! tests instead of real repositories.

use std::path::Path;

#[cfg(test)]
use mockall::automock;

use crate::error::VcsError;

#[cfg_attr(test, automock)]
pub trait Vcs: Send + Sync {
    /// Whether `path` is the root of a working tree
    fn is_repository(&self, path: &Path) -> bool;

    /// What to check out to return to the current state: the branch name,
    /// or the commit SHA when HEAD is detached
    fn current_ref(&self, path: &Path) -> Result<String, VcsError>;

    /// Local branch names
    fn list_branches(&self, path: &Path) -> Result<Vec<String>, VcsError>;

    /// Switch the working tree to `branch`. Fails if the branch doesn't exist.
    fn checkout(&self, path: &Path, branch: &str) -> Result<(), VcsError>;

    /// Clone `url` into the empty directory `into`, fetching only the tip
    fn clone_shallow(&self, url: &str, into: &Path) -> Result<(), VcsError>;
}
