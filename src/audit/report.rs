//! Renderers for audit results, ref listings and find inventories

use std::fmt::Write as _;
use std::io::{self, Write};

use crate::audit::workflow::Workflow;
use crate::pin::lookup::GitRef;
use crate::scan::inventory::Inventory;

/// Header row of the CSV inventory
pub const CSV_HEADER: [&str; 4] = ["repository_name", "branch_name", "actions_file", "action"];

/// Human-readable audit report, one block per workflow file
pub fn format_audit_report(workflows: &[Workflow]) -> String {
    let mut out = String::new();

    for workflow in workflows {
        let _ = writeln!(out, "{}", workflow.file_path.display());
        for finding in &workflow.findings {
            let _ = writeln!(
                out,
                "  - [Line {}, Col {}] {}",
                finding.line, finding.column, finding.description
            );
            let _ = writeln!(out, "    Fix: {}", finding.fix_message);
            out.push('\n');
        }
    }

    out
}

/// Two-column `VERSION  COMMIT SHA` table
pub fn format_ref_listing(refs: &[GitRef]) -> String {
    let width = refs
        .iter()
        .map(|r| r.name.len())
        .chain(std::iter::once("VERSION".len()))
        .max()
        .unwrap_or_default();

    let mut out = String::new();
    let _ = writeln!(out, "{:<width$}  COMMIT SHA", "VERSION");
    for r in refs {
        let _ = writeln!(out, "{:<width$}  {}", r.name, r.commit.sha);
    }
    out
}

pub fn audit_to_json(workflows: &[Workflow]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(workflows)
}

pub fn inventory_to_json(inventory: &Inventory) -> serde_json::Result<String> {
    serde_json::to_string_pretty(inventory)
}

/// Write `inventory` as CSV, one row per matched reference
pub fn write_inventory_csv<W: Write>(inventory: &Inventory, mut writer: W) -> io::Result<()> {
    write_csv_row(&mut writer, &CSV_HEADER)?;
    for row in inventory.rows() {
        write_csv_row(
            &mut writer,
            &[row.repository, row.branch, row.file_path, row.action],
        )?;
    }
    writer.flush()
}

fn write_csv_row<W: Write>(writer: &mut W, fields: &[&str]) -> io::Result<()> {
    let line = fields
        .iter()
        .map(|field| escape_csv(field))
        .collect::<Vec<_>>()
        .join(",");
    writeln!(writer, "{line}")
}

fn escape_csv(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
