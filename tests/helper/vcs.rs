//! Filesystem-backed fake VCS
//!
//! Each fake repository keeps per-branch workflow files; checking out a
//! branch rewrites `.github/workflows` on disk with that branch's files.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use pinsha::config::workflow_dir;
use pinsha::error::VcsError;
use pinsha::scan::Vcs;

type Files = Vec<(String, String)>;

struct FakeRepo {
    current: Mutex<String>,
    branches: Vec<(String, Files)>,
    broken: bool,
}

#[derive(Default)]
pub struct FakeVcs {
    repos: HashMap<PathBuf, FakeRepo>,
    remotes: HashMap<String, Files>,
    clones: Mutex<Vec<PathBuf>>,
    checkouts: Mutex<Vec<String>>,
}

fn failed(command: &str, stderr: &str) -> VcsError {
    VcsError::CommandFailed {
        command: command.to_string(),
        stderr: stderr.to_string(),
    }
}

fn materialize(root: &Path, files: &Files) {
    let dir = workflow_dir(root);
    let _ = std::fs::remove_dir_all(&dir);
    if files.is_empty() {
        return;
    }
    std::fs::create_dir_all(&dir).unwrap();
    for (name, content) in files {
        std::fs::write(dir.join(name), content).unwrap();
    }
}

impl FakeVcs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `branch` with its workflow files to the repository at `path`.
    ///
    /// The first branch added to a repository is the checked-out one.
    pub fn with_branch(mut self, path: &Path, branch: &str, files: &[(&str, &str)]) -> Self {
        let files: Files = files
            .iter()
            .map(|(n, c)| (n.to_string(), c.to_string()))
            .collect();

        let repo = self.repos.entry(path.to_path_buf()).or_insert_with(|| {
            std::fs::create_dir_all(path).unwrap();
            materialize(path, &files);
            FakeRepo {
                current: Mutex::new(branch.to_string()),
                branches: Vec::new(),
                broken: false,
            }
        });
        repo.branches.push((branch.to_string(), files));
        self
    }

    /// Register a repository whose branch listing always fails
    pub fn with_broken_repo(mut self, path: &Path) -> Self {
        std::fs::create_dir_all(path).unwrap();
        self.repos.insert(
            path.to_path_buf(),
            FakeRepo {
                current: Mutex::new("main".to_string()),
                branches: Vec::new(),
                broken: true,
            },
        );
        self
    }

    /// Register a remote that clones to the given workflow files
    pub fn with_remote(mut self, url: &str, files: &[(&str, &str)]) -> Self {
        self.remotes.insert(
            url.to_string(),
            files
                .iter()
                .map(|(n, c)| (n.to_string(), c.to_string()))
                .collect(),
        );
        self
    }

    /// Branch names checked out so far, in order
    pub fn checkouts(&self) -> Vec<String> {
        self.checkouts.lock().unwrap().clone()
    }

    pub fn current_branch_of(&self, path: &Path) -> Option<String> {
        self.repos
            .get(path)
            .map(|repo| repo.current.lock().unwrap().clone())
    }
}

impl Vcs for FakeVcs {
    fn is_repository(&self, path: &Path) -> bool {
        self.repos.contains_key(path) || self.clones.lock().unwrap().iter().any(|c| c == path)
    }

    fn current_ref(&self, path: &Path) -> Result<String, VcsError> {
        self.repos
            .get(path)
            .map(|repo| repo.current.lock().unwrap().clone())
            .ok_or_else(|| failed("rev-parse", "not a git repository"))
    }

    fn list_branches(&self, path: &Path) -> Result<Vec<String>, VcsError> {
        let repo = self
            .repos
            .get(path)
            .ok_or_else(|| failed("for-each-ref", "not a git repository"))?;
        if repo.broken {
            return Err(failed("for-each-ref", "corrupt repository"));
        }
        Ok(repo.branches.iter().map(|(b, _)| b.clone()).collect())
    }

    fn checkout(&self, path: &Path, branch: &str) -> Result<(), VcsError> {
        let repo = self
            .repos
            .get(path)
            .ok_or_else(|| failed("checkout", "not a git repository"))?;
        let (_, files) = repo
            .branches
            .iter()
            .find(|(b, _)| b == branch)
            .ok_or_else(|| failed("checkout", "pathspec did not match"))?;

        materialize(path, files);
        *repo.current.lock().unwrap() = branch.to_string();
        self.checkouts.lock().unwrap().push(branch.to_string());
        Ok(())
    }

    fn clone_shallow(&self, url: &str, into: &Path) -> Result<(), VcsError> {
        let files = self
            .remotes
            .get(url)
            .ok_or_else(|| failed("clone", "repository not found"))?;
        std::fs::create_dir_all(into).unwrap();
        materialize(into, files);
        self.clones.lock().unwrap().push(into.to_path_buf());
        Ok(())
    }
}
