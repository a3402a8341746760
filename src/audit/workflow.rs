//! Workflow assembly: scan matches + resolutions -> findings

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::parser::traits::ReferenceScanner;
use crate::parser::types::{ActionRef, Match};
use crate::pin::resolver::Resolver;

/// Outcome of resolving one finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "sha", rename_all = "snake_case")]
pub enum Resolution {
    Resolved(String),
    Unavailable,
}

impl Resolution {
    pub fn sha(&self) -> Option<&str> {
        match self {
            Resolution::Resolved(sha) => Some(sha),
            Resolution::Unavailable => None,
        }
    }
}

/// One mutable reference found in a workflow file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Line number (1-indexed)
    pub line: usize,
    /// Byte column within the line (1-indexed)
    pub column: usize,
    pub description: String,
    pub fix_message: String,
    pub resolution: Resolution,
    /// "owner/name"
    pub action: String,
    pub version: String,
    /// Matched text, e.g. "actions/checkout@v4"
    pub original: String,
}

impl Finding {
    pub fn from_match(found: &Match, resolution: Resolution) -> Self {
        let action_ref = found.action_ref();
        let description = format!("Mutable reference '{}' found", found.text);
        let fix_message = match &resolution {
            Resolution::Resolved(sha) => format!("Pin to {}", action_ref.pinned(sha)),
            Resolution::Unavailable => format!(
                "Reference '{}' is not found upstream. Try listing available versions with `pinsha list {}`",
                found.text, action_ref.action
            ),
        };

        Self {
            line: found.line,
            column: found.column,
            description,
            fix_message,
            resolution,
            action: action_ref.action,
            version: action_ref.version,
            original: found.text.clone(),
        }
    }

    pub fn action_ref(&self) -> ActionRef {
        ActionRef {
            action: self.action.clone(),
            version: self.version.clone(),
        }
    }

    /// Replacement text, if the reference was resolved
    pub fn replacement(&self) -> Option<String> {
        self.resolution
            .sha()
            .map(|sha| self.action_ref().pinned(sha))
    }
}

/// All findings for one workflow file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Workflow {
    pub file_path: PathBuf,
    pub findings: Vec<Finding>,
}

impl Workflow {
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn unavailable_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.resolution == Resolution::Unavailable)
            .count()
    }
}

/// Scan `content` and resolve every match.
///
/// Resolution failures become `Unavailable` findings; they never fail the
/// assembly.
pub async fn assemble_workflow(
    content: &[u8],
    file_path: &Path,
    scanner: &dyn ReferenceScanner,
    resolver: &dyn Resolver,
) -> Workflow {
    let matches = scanner.scan(content);
    debug!("Found {} references in {:?}", matches.len(), file_path);

    let mut findings = Vec::with_capacity(matches.len());
    for found in &matches {
        let resolution = match resolver.resolve(&found.text).await {
            Ok(sha) => Resolution::Resolved(sha),
            Err(e) => {
                warn!("Could not resolve {} in {:?}: {}", found.text, file_path, e);
                Resolution::Unavailable
            }
        };
        findings.push(Finding::from_match(found, resolution));
    }

    Workflow {
        file_path: file_path.to_path_buf(),
        findings,
    }
}
