//! Remote lookup implementations

pub mod github;

pub use github::GitHubLookup;
