//! Resolution layer: mutable reference -> immutable commit sha
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Resolver    │────▶│    Cache    │     │   Lookup    │
//! │ (ShaResolver) │     │ (cache.json)│     │ (tags/brs)  │
//! └───────────────┘     └─────────────┘     └─────────────┘
//!         │                                        ▲
//!         └────────────── on cache miss ───────────┘
//! ```
//!
//! # Modules
//!
//! - [`cache`]: JSON snapshot cache, one file per namespace directory
//! - [`lookup`]: `RefLookup` trait for listing tags and branches
//! - [`lookups`]: Concrete lookups (GitHub REST API)
//! - [`resolver`]: Cache-first resolver
//! - [`error`]: Error types for cache, lookup and resolution

pub mod cache;
pub mod error;
pub mod lookup;
pub mod lookups;
pub mod resolver;

pub use cache::{CacheEntry, CacheMap, CacheStore};
pub use lookup::{Commit, GitRef, RefLookup};
pub use lookups::GitHubLookup;
pub use resolver::{Resolver, ShaResolver};
