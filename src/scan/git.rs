//! `git` CLI implementation of [`Vcs`]

use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::error::VcsError;
use crate::scan::vcs::Vcs;

/// What `rev-parse --abbrev-ref HEAD` prints on a detached HEAD
const DETACHED_HEAD: &str = "HEAD";

/// Shells out to the `git` binary on `PATH`
#[derive(Debug, Clone)]
pub struct GitCli {
    program: OsString,
}

impl Default for GitCli {
    fn default() -> Self {
        Self {
            program: OsString::from("git"),
        }
    }
}

impl GitCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific git executable
    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run<I, S>(&self, dir: Option<&Path>, args: I) -> Result<String, VcsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<OsString> = args.into_iter().map(|a| a.as_ref().to_owned()).collect();

        let mut command = Command::new(&self.program);
        if let Some(dir) = dir {
            command.arg("-C").arg(dir);
        }
        let output = command.args(&args).output()?;

        if !output.status.success() {
            let command = args
                .iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ");
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            debug!("git {} failed: {}", command, stderr);
            return Err(VcsError::CommandFailed { command, stderr });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl Vcs for GitCli {
    fn is_repository(&self, path: &Path) -> bool {
        // Only a working-tree root counts; a subdirectory of some enclosing
        // repository is not a repository of its own.
        let Ok(toplevel) = self.run(Some(path), ["rev-parse", "--show-toplevel"]) else {
            return false;
        };
        match (
            std::fs::canonicalize(path),
            std::fs::canonicalize(&toplevel),
        ) {
            (Ok(path), Ok(toplevel)) => path == toplevel,
            _ => false,
        }
    }

    fn current_ref(&self, path: &Path) -> Result<String, VcsError> {
        let branch = self.run(Some(path), ["rev-parse", "--abbrev-ref", "HEAD"])?;
        if branch != DETACHED_HEAD {
            return Ok(branch);
        }
        self.run(Some(path), ["rev-parse", "HEAD"])
    }

    fn list_branches(&self, path: &Path) -> Result<Vec<String>, VcsError> {
        let output = self.run(
            Some(path),
            ["for-each-ref", "--format=%(refname:short)", "refs/heads"],
        )?;
        Ok(output
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect())
    }

    fn checkout(&self, path: &Path, branch: &str) -> Result<(), VcsError> {
        self.run(Some(path), ["checkout", "--quiet", branch])
            .map(|_| ())
    }

    fn clone_shallow(&self, url: &str, into: &Path) -> Result<(), VcsError> {
        let args: [&OsStr; 5] = [
            OsStr::new("clone"),
            OsStr::new("--quiet"),
            OsStr::new("--depth=1"),
            OsStr::new(url),
            into.as_os_str(),
        ];
        self.run(None, args).map(|_| ())
    }
}
