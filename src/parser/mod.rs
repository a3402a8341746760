//! Reference scanning layer
//! - traits.rs: ReferenceScanner trait definition
//! - types.rs: Common types (ActionRef, Match)
//! - workflow.rs: mutable action reference scanner

pub mod traits;
pub mod types;
pub mod workflow;

pub use traits::ReferenceScanner;
pub use types::{ActionRef, Match};
pub use workflow::WorkflowScanner;
