//! Shared fixtures for integration tests

#![allow(dead_code)]

mod lookup;
mod vcs;

pub use lookup::{MockLookup, create_test_resolver};
pub use vcs::FakeVcs;

use std::path::{Path, PathBuf};

pub const CHECKOUT_SHA: &str = "11bd71901bbe5b1630ceea73d27597364c9af683";

/// Write `content` to `root/relative`, creating parent directories
pub fn write_file(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}
