//! In-memory lookup for resolver tests

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tempfile::TempDir;

use pinsha::error::LookupError;
use pinsha::pin::{CacheStore, GitRef, RefLookup, ShaResolver};

/// Lookup backed by fixed tag and branch listings
#[derive(Default)]
pub struct MockLookup {
    tags: HashMap<String, Vec<GitRef>>,
    branches: HashMap<String, Vec<GitRef>>,
    calls: AtomicUsize,
}

impl MockLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag(mut self, action: &str, name: &str, sha: &str) -> Self {
        self.tags
            .entry(action.to_string())
            .or_default()
            .push(GitRef::new(name, sha));
        self
    }

    pub fn with_branch(mut self, action: &str, name: &str, sha: &str) -> Self {
        self.branches
            .entry(action.to_string())
            .or_default()
            .push(GitRef::new(name, sha));
        self
    }

    /// Number of listing requests served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn listing(
        &self,
        listings: &HashMap<String, Vec<GitRef>>,
        action: &str,
    ) -> Result<Vec<GitRef>, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        listings
            .get(action)
            .cloned()
            .ok_or_else(|| LookupError::NotFound(action.to_string()))
    }
}

#[async_trait]
impl RefLookup for MockLookup {
    async fn list_tags(&self, action: &str) -> Result<Vec<GitRef>, LookupError> {
        self.listing(&self.tags, action)
    }

    async fn list_branches(&self, action: &str) -> Result<Vec<GitRef>, LookupError> {
        self.listing(&self.branches, action)
    }
}

/// Resolver over `lookup` with a fresh cache namespace.
///
/// The TempDir must outlive the resolver.
pub fn create_test_resolver(lookup: Arc<MockLookup>) -> (TempDir, CacheStore, ShaResolver) {
    let temp_dir = TempDir::new().unwrap();
    let store = CacheStore::new(temp_dir.path());
    let resolver = ShaResolver::new(lookup, CacheStore::new(temp_dir.path()), None).unwrap();
    (temp_dir, store, resolver)
}
