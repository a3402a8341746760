//! Repository traversal layer
//! - vcs.rs: Vcs trait (branch listing, checkout, clone)
//! - git.rs: git CLI implementation
//! - inventory.rs: find results across repositories and branches
//! - traversal.rs: audit/autofix of one repository, find across a workspace

pub mod git;
pub mod inventory;
pub mod traversal;
pub mod vcs;

pub use git::GitCli;
pub use inventory::{Inventory, InventoryRecord, InventoryRow};
pub use traversal::{AutofixSummary, Traversal};
pub use vcs::Vcs;
