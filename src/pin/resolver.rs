//! Reference resolver
//!
//! Turns `owner/name@version` into an immutable commit sha. The persisted
//! cache is read once at construction; every successful resolution is
//! written through to it. Negative results are never cached.

#[cfg(test)]
use mockall::automock;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::parser::types::ActionRef;
use crate::pin::cache::{CacheMap, CacheStore};
use crate::pin::error::{CacheError, LookupError, ResolveError};
use crate::pin::lookup::{RefLookup, find_commit};

/// Trait for resolving a reference string to a commit sha
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Resolver: Send + Sync {
    /// Resolve `reference` ("owner/name@version", version optional)
    async fn resolve(&self, reference: &str) -> Result<String, ResolveError>;
}

/// Resolver that consults the persistent cache before the remote lookup
pub struct ShaResolver {
    lookup: Arc<dyn RefLookup>,
    store: CacheStore,
    resolved: Mutex<HashMap<String, String>>,
}

impl ShaResolver {
    /// Build a resolver seeded from `store`.
    ///
    /// Entries older than `ttl` are left out of the seed so they get
    /// re-resolved. A corrupt cache file fails construction.
    pub fn new(
        lookup: Arc<dyn RefLookup>,
        store: CacheStore,
        ttl: Option<Duration>,
    ) -> Result<Self, CacheError> {
        let entries = store.load()?;
        let resolved = seed(entries, ttl);
        debug!(
            "Seeded resolver with {} cached references from {:?}",
            resolved.len(),
            store.dir()
        );

        Ok(Self {
            lookup,
            store,
            resolved: Mutex::new(resolved),
        })
    }

    fn cached(&self, reference: &str) -> Option<String> {
        self.resolved
            .lock()
            .ok()
            .and_then(|resolved| resolved.get(reference).cloned())
    }

    fn remember(&self, reference: &str, sha: &str) {
        if let Ok(mut resolved) = self.resolved.lock() {
            resolved.insert(reference.to_string(), sha.to_string());
        }

        if let Err(e) = self.store.upsert(reference, sha) {
            warn!("Failed to persist {} to cache: {}", reference, e);
        }
    }
}

fn seed(entries: CacheMap, ttl: Option<Duration>) -> HashMap<String, String> {
    let now = Utc::now();
    entries
        .into_iter()
        .filter(|(key, entry)| {
            let fresh = match ttl.and_then(|ttl| chrono::Duration::from_std(ttl).ok()) {
                Some(ttl) => now.signed_duration_since(entry.updated_at) <= ttl,
                None => true,
            };
            if !fresh {
                debug!("Skipping expired cache entry {}", key);
            }
            fresh && !entry.sha.is_empty()
        })
        .map(|(key, entry)| (key, entry.sha))
        .collect()
}

#[async_trait::async_trait]
impl Resolver for ShaResolver {
    async fn resolve(&self, reference: &str) -> Result<String, ResolveError> {
        if let Some(sha) = self.cached(reference) {
            debug!("Cache hit for {}", reference);
            return Ok(sha);
        }

        let action_ref = ActionRef::parse(reference);
        let listing = if action_ref.is_tag() {
            self.lookup.list_tags(&action_ref.action).await
        } else {
            self.lookup.list_branches(&action_ref.action).await
        };

        let refs = match listing {
            Ok(refs) => refs,
            Err(LookupError::NotFound(_)) => {
                return Err(ResolveError::NotFound {
                    action: action_ref.action,
                    version: action_ref.version,
                });
            }
            Err(source) => {
                return Err(ResolveError::Transport {
                    reference: reference.to_string(),
                    source,
                });
            }
        };

        let Some(sha) = find_commit(&refs, &action_ref.version) else {
            return Err(ResolveError::NotFound {
                action: action_ref.action,
                version: action_ref.version,
            });
        };
        let sha = sha.to_string();

        info!("Resolved {} to {}", reference, sha);
        self.remember(reference, &sha);
        Ok(sha)
    }
}
