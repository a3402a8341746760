//! Audit layer
//! - workflow.rs: assemble findings for one workflow file
//! - fix.rs: rewrite findings in place
//! - report.rs: text/JSON/CSV renderers

pub mod fix;
pub mod report;
pub mod workflow;

pub use fix::{AppliedFix, FixReport, apply_fixes};
pub use workflow::{Finding, Resolution, Workflow, assemble_workflow};
