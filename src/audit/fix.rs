//! Remediation: rewrite mutable references in place
//!
//! Findings are applied top-to-bottom, left-to-right. A replacement only
//! grows its own line, so a later finding on the same line is searched for
//! at or after its recorded column and still found; later lines keep their
//! numbering because no edit adds or removes a newline.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::audit::workflow::{Finding, Workflow};
use crate::error::FixError;

/// One substitution made (or proposed, in dry-run) in a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedFix {
    pub line: usize,
    pub column: usize,
    pub original: String,
    pub replacement: String,
}

/// Result of applying a workflow's findings to its file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixReport {
    pub file_path: PathBuf,
    pub applied: Vec<AppliedFix>,
    /// Findings left untouched because they could not be resolved
    pub skipped: Vec<Finding>,
    /// Content after all substitutions
    pub content: Vec<u8>,
    /// Whether the file on disk was rewritten
    pub written: bool,
}

/// Apply `workflow`'s findings to its file.
///
/// With `dry_run` the file is left alone and the report carries the content
/// that would have been written. Any position mismatch aborts the whole file
/// before anything is written.
pub fn apply_fixes(workflow: &Workflow, dry_run: bool) -> Result<FixReport, FixError> {
    let path = &workflow.file_path;
    let original = std::fs::read(path).map_err(|source| FixError::Io {
        path: path.clone(),
        source,
    })?;

    let (content, applied, skipped) = rewrite(&original, &workflow.findings, path)?;

    let written = !dry_run && content != original;
    if written {
        std::fs::write(path, &content).map_err(|source| FixError::Io {
            path: path.clone(),
            source,
        })?;
        info!("Pinned {} references in {:?}", applied.len(), path);
    }

    Ok(FixReport {
        file_path: path.clone(),
        applied,
        skipped,
        content,
        written,
    })
}

/// Apply `findings` to `content` and return the new bytes.
pub fn rewrite(
    content: &[u8],
    findings: &[Finding],
    path: &Path,
) -> Result<(Vec<u8>, Vec<AppliedFix>, Vec<Finding>), FixError> {
    let mut lines = split_lines(content);

    let mut ordered: Vec<&Finding> = findings.iter().collect();
    ordered.sort_by_key(|f| (f.line, f.column));

    let mut applied = Vec::new();
    let mut skipped = Vec::new();

    for finding in ordered {
        let Some(replacement) = finding.replacement() else {
            warn!(
                "[Line {}, Col {}] Couldn't fix {}: reference '{}' is not found upstream",
                finding.line, finding.column, finding.action, finding.version
            );
            skipped.push(finding.clone());
            continue;
        };

        let mismatch = || FixError::PositionMismatch {
            path: path.to_path_buf(),
            original: finding.original.clone(),
            line: finding.line,
            column: finding.column,
        };

        let line = finding
            .line
            .checked_sub(1)
            .and_then(|index| lines.get_mut(index))
            .ok_or_else(mismatch)?;
        let start = finding.column.checked_sub(1).ok_or_else(mismatch)?;
        let offset = line
            .get(start..)
            .and_then(|suffix| find_subslice(suffix, finding.original.as_bytes()))
            .ok_or_else(mismatch)?;

        let at = start + offset;
        line.splice(
            at..at + finding.original.len(),
            replacement.bytes(),
        );

        info!(
            "[Line {}, Col {}] Pinned '{}' to '{}'",
            finding.line, finding.column, finding.original, replacement
        );
        applied.push(AppliedFix {
            line: finding.line,
            column: finding.column,
            original: finding.original.clone(),
            replacement,
        });
    }

    Ok((join_lines(&lines), applied, skipped))
}

/// Split on `\n`, keeping everything else (including `\r`) in the lines.
pub fn split_lines(content: &[u8]) -> Vec<Vec<u8>> {
    content.split(|&b| b == b'\n').map(<[u8]>::to_vec).collect()
}

/// Inverse of [`split_lines`].
pub fn join_lines(lines: &[Vec<u8>]) -> Vec<u8> {
    lines.join(&b'\n')
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
