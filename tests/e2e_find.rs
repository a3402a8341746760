//! Multi-repository find end to end

mod helper;

use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use helper::{FakeVcs, write_file};
use pinsha::audit::report::{inventory_to_json, write_inventory_csv};
use pinsha::parser::WorkflowScanner;
use pinsha::scan::Traversal;

fn workspace(root: &Path) -> FakeVcs {
    write_file(root, ".idea/.github/workflows/ci.yml", "uses: ignored/editor@v1\n");
    write_file(root, "notes/.github/workflows/ci.yml", "uses: not/a-repo@v1\n");

    FakeVcs::new()
        .with_branch(
            &root.join("svc"),
            "main",
            &[("ci.yml", "steps:\n  - uses: actions/checkout@v4\n")],
        )
        .with_branch(
            &root.join("svc"),
            "dev",
            &[
                ("ci.yml", "- uses: actions/checkout@v4\n- uses: actions/setup-go@dev\n"),
                ("deploy.yml", "- uses: aws-actions/configure-aws-credentials@v4.0.2\n"),
            ],
        )
        .with_branch(&root.join("docs"), "main", &[])
        .with_broken_repo(&root.join("legacy"))
}

fn traversal(vcs: Arc<FakeVcs>) -> Traversal {
    Traversal::new(vcs, Arc::new(WorkflowScanner::new()))
}

#[test]
fn find_inventories_every_branch_and_restores_checkout() {
    let root = TempDir::new().unwrap();
    let vcs = Arc::new(workspace(root.path()));

    let inventory = traversal(vcs.clone()).find(root.path(), false).unwrap();

    let summary: Vec<_> = inventory
        .records
        .iter()
        .map(|r| {
            (
                r.repository.as_str(),
                r.branch.as_str(),
                Path::new(&r.file_path)
                    .file_name()
                    .unwrap()
                    .to_string_lossy()
                    .into_owned(),
                r.matches.clone(),
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            ("svc", "main", "ci.yml".to_string(), vec!["actions/checkout@v4".to_string()]),
            (
                "svc",
                "dev",
                "ci.yml".to_string(),
                vec![
                    "actions/checkout@v4".to_string(),
                    "actions/setup-go@dev".to_string()
                ]
            ),
            (
                "svc",
                "dev",
                "deploy.yml".to_string(),
                vec!["aws-actions/configure-aws-credentials@v4.0.2".to_string()]
            ),
        ]
    );

    // docs: main, restore main; svc: main, dev, restore main
    assert_eq!(vcs.checkouts(), vec!["main", "main", "main", "dev", "main"]);
    assert_eq!(
        vcs.current_branch_of(&root.path().join("svc")).as_deref(),
        Some("main")
    );
    assert!(!root.path().join("svc/.github/workflows/deploy.yml").exists());
}

#[test]
fn find_head_only_scans_checked_out_files_as_head() {
    let root = TempDir::new().unwrap();
    let vcs = Arc::new(workspace(root.path()));

    let inventory = traversal(vcs.clone()).find(root.path(), true).unwrap();

    assert_eq!(inventory.records.len(), 1);
    assert_eq!(inventory.records[0].repository, "svc");
    assert_eq!(inventory.records[0].branch, "HEAD");
    assert_eq!(inventory.records[0].matches, vec!["actions/checkout@v4"]);
    assert!(vcs.checkouts().is_empty());
}

#[test]
fn find_output_renders_as_json_and_csv() {
    let root = TempDir::new().unwrap();
    let vcs = Arc::new(workspace(root.path()));
    let inventory = traversal(vcs).find(root.path(), true).unwrap();
    let file = root.path().join("svc/.github/workflows/ci.yml");

    let json: serde_json::Value =
        serde_json::from_str(&inventory_to_json(&inventory).unwrap()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "findings": [{
                "repository_name": "svc",
                "branch_name": "HEAD",
                "actions_file": file.display().to_string(),
                "matches": ["actions/checkout@v4"]
            }]
        })
    );

    let mut csv = Vec::new();
    write_inventory_csv(&inventory, &mut csv).unwrap();
    assert_eq!(
        String::from_utf8(csv).unwrap(),
        format!(
            "repository_name,branch_name,actions_file,action\nsvc,HEAD,{},actions/checkout@v4\n",
            file.display()
        )
    );
}

#[test]
fn find_on_empty_workspace_returns_empty_inventory() {
    let root = TempDir::new().unwrap();

    let inventory = traversal(Arc::new(FakeVcs::new()))
        .find(root.path(), false)
        .unwrap();

    assert!(inventory.is_empty());
}
