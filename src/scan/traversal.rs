//! Traversal: single repository audit/autofix and multi-repository find

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::audit::fix::{FixReport, apply_fixes};
use crate::audit::workflow::{Workflow, assemble_workflow};
use crate::config::{IGNORED_DIR_NAMES, workflow_dir};
use crate::error::{FixError, ScanError, VcsError};
use crate::parser::traits::ReferenceScanner;
use crate::pin::resolver::Resolver;
use crate::scan::inventory::{Inventory, InventoryRecord};
use crate::scan::vcs::Vcs;

/// Branch name recorded in head-only mode
pub const HEAD_BRANCH: &str = "HEAD";

/// Outcome of fixing every workflow in a repository
#[derive(Debug, Default)]
pub struct AutofixSummary {
    pub reports: Vec<FixReport>,
    /// Files that could not be fixed; they were left unmodified
    pub failures: Vec<FixError>,
}

impl AutofixSummary {
    pub fn applied_count(&self) -> usize {
        self.reports.iter().map(|r| r.applied.len()).sum()
    }

    pub fn skipped_count(&self) -> usize {
        self.reports.iter().map(|r| r.skipped.len()).sum()
    }
}

/// Walks repositories and their workflow directories
pub struct Traversal {
    vcs: Arc<dyn Vcs>,
    scanner: Arc<dyn ReferenceScanner>,
}

impl Traversal {
    pub fn new(vcs: Arc<dyn Vcs>, scanner: Arc<dyn ReferenceScanner>) -> Self {
        Self { vcs, scanner }
    }

    /// Audit the repository at `root`.
    ///
    /// Only workflows with at least one finding are returned.
    pub async fn audit_repository(
        &self,
        root: &Path,
        resolver: &dyn Resolver,
    ) -> Result<Vec<Workflow>, ScanError> {
        if !self.vcs.is_repository(root) {
            return Err(ScanError::NotARepository(root.to_path_buf()));
        }

        let mut workflows = Vec::new();
        for path in workflow_files(root)? {
            let content = match std::fs::read(&path) {
                Ok(content) => content,
                Err(e) => {
                    warn!("Skipping unreadable workflow {:?}: {}", path, e);
                    continue;
                }
            };

            let workflow =
                assemble_workflow(&content, &path, self.scanner.as_ref(), resolver).await;
            if !workflow.is_empty() {
                workflows.push(workflow);
            }
        }

        info!(
            "Audited {:?}: {} workflows with mutable references",
            root,
            workflows.len()
        );
        Ok(workflows)
    }

    /// Audit and rewrite every workflow in the repository at `root`.
    ///
    /// A file that fails to fix is recorded in the summary and the remaining
    /// files are still processed.
    pub async fn autofix_repository(
        &self,
        root: &Path,
        resolver: &dyn Resolver,
        dry_run: bool,
    ) -> Result<AutofixSummary, ScanError> {
        let workflows = self.audit_repository(root, resolver).await?;

        let mut summary = AutofixSummary::default();
        for workflow in &workflows {
            match apply_fixes(workflow, dry_run) {
                Ok(report) => summary.reports.push(report),
                Err(e) => {
                    warn!("Failed to fix {:?}: {}", workflow.file_path, e);
                    summary.failures.push(e);
                }
            }
        }
        Ok(summary)
    }

    /// Shallow-clone `url` into a temporary directory and audit it.
    ///
    /// Returned file paths are relative to the clone root, which is removed
    /// before this returns.
    pub async fn audit_remote(
        &self,
        url: &str,
        resolver: &dyn Resolver,
    ) -> Result<Vec<Workflow>, ScanError> {
        let temp_dir = TempDir::new().map_err(|e| ScanError::Clone {
            url: url.to_string(),
            source: VcsError::TempDir(e),
        })?;
        let checkout = temp_dir.path().join("repo");

        info!("Cloning {} into {:?}", url, checkout);
        self.vcs
            .clone_shallow(url, &checkout)
            .map_err(|source| ScanError::Clone {
                url: url.to_string(),
                source,
            })?;

        let mut workflows = self.audit_repository(&checkout, resolver).await?;
        for workflow in &mut workflows {
            if let Ok(relative) = workflow.file_path.strip_prefix(&checkout) {
                workflow.file_path = relative.to_path_buf();
            }
        }
        Ok(workflows)
    }

    /// Inventory mutable references across every repository directly under
    /// `root`, on every local branch (or only the checked-out one when
    /// `head_only`).
    ///
    /// Repositories whose branches can't be listed, branches that can't be
    /// checked out and branches without a workflow directory are skipped.
    pub fn find(&self, root: &Path, head_only: bool) -> Result<Inventory, ScanError> {
        let mut inventory = Inventory::default();

        for (name, path) in candidate_repositories(root)? {
            if !self.vcs.is_repository(&path) {
                debug!("Skipping {:?}: not a repository", path);
                continue;
            }

            if head_only {
                inventory.extend(self.scan_branch(&name, HEAD_BRANCH, &path));
                continue;
            }

            inventory.extend(self.scan_all_branches(&name, &path));
        }

        Ok(inventory)
    }

    fn scan_all_branches(&self, name: &str, path: &Path) -> Vec<InventoryRecord> {
        let original = match self.vcs.current_ref(path) {
            Ok(current) => current,
            Err(e) => {
                warn!("Couldn't detect current branch of {}, skipping: {}", name, e);
                return Vec::new();
            }
        };
        let branches = match self.vcs.list_branches(path) {
            Ok(branches) => branches,
            Err(e) => {
                warn!("Couldn't list branches of {}, skipping: {}", name, e);
                return Vec::new();
            }
        };

        let mut records = Vec::new();
        let mut switched = false;
        for branch in &branches {
            if let Err(e) = self.vcs.checkout(path, branch) {
                warn!("Couldn't check out {} in {}, skipping: {}", branch, name, e);
                continue;
            }
            switched = true;
            records.extend(self.scan_branch(name, branch, path));
        }

        if switched && let Err(e) = self.vcs.checkout(path, &original) {
            warn!("Couldn't restore {} in {}: {}", original, name, e);
        }
        records
    }

    fn scan_branch(&self, repository: &str, branch: &str, root: &Path) -> Vec<InventoryRecord> {
        debug!("Processing {} on {}", repository, branch);

        let files = match workflow_files(root) {
            Ok(files) => files,
            Err(e) => {
                debug!("Couldn't list workflows of {} on {}: {}", repository, branch, e);
                return Vec::new();
            }
        };

        let mut records = Vec::new();
        for path in files {
            let Ok(content) = std::fs::read(&path) else {
                debug!("Skipping unreadable workflow {:?}", path);
                continue;
            };

            let matches: Vec<String> = self
                .scanner
                .scan(&content)
                .into_iter()
                .map(|m| m.text)
                .collect();
            if matches.is_empty() {
                continue;
            }

            records.push(InventoryRecord {
                repository: repository.to_string(),
                branch: branch.to_string(),
                file_path: path.display().to_string(),
                matches,
            });
        }
        records
    }
}

/// Regular files directly inside the workflow directory of `root`, by name.
///
/// A missing workflow directory yields no files.
pub fn workflow_files(root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let dir = workflow_dir(root);
    if !dir.is_dir() {
        debug!("No workflow directory at {:?}", dir);
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(&dir).map_err(|source| ScanError::Io {
        path: dir.clone(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}

fn candidate_repositories(root: &Path) -> Result<Vec<(String, PathBuf)>, ScanError> {
    let entries = std::fs::read_dir(root).map_err(|source| ScanError::Io {
        path: root.to_path_buf(),
        source,
    })?;

    let mut candidates: Vec<(String, PathBuf)> = entries
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            let path = entry.path();
            (path.is_dir() && !IGNORED_DIR_NAMES.contains(&name.as_str()))
                .then_some((name, path))
        })
        .collect();
    candidates.sort();
    Ok(candidates)
}
