use serde::{Deserialize, Serialize};

/// Mutable references found in one workflow file on one branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    #[serde(rename = "repository_name")]
    pub repository: String,
    #[serde(rename = "branch_name")]
    pub branch: String,
    #[serde(rename = "actions_file")]
    pub file_path: String,
    /// Matched reference texts, in file order
    pub matches: Vec<String>,
}

/// Records across every repository and branch of a workspace
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(rename = "findings")]
    pub records: Vec<InventoryRecord>,
}

/// One (record, match) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventoryRow<'a> {
    pub repository: &'a str,
    pub branch: &'a str,
    pub file_path: &'a str,
    pub action: &'a str,
}

impl Inventory {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = InventoryRecord>) {
        self.records.extend(records);
    }

    /// Flattened view, one row per match
    pub fn rows(&self) -> impl Iterator<Item = InventoryRow<'_>> {
        self.records.iter().flat_map(|record| {
            record.matches.iter().map(move |action| InventoryRow {
                repository: &record.repository,
                branch: &record.branch,
                file_path: &record.file_path,
                action,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(repository: &str, branch: &str, matches: &[&str]) -> InventoryRecord {
        InventoryRecord {
            repository: repository.to_string(),
            branch: branch.to_string(),
            file_path: format!("/ws/{repository}/.github/workflows/ci.yml"),
            matches: matches.iter().map(|m| m.to_string()).collect(),
        }
    }

    #[test]
    fn serializes_with_external_field_names() {
        let inventory = Inventory {
            records: vec![record("svc", "main", &["actions/checkout@v4"])],
        };

        assert_eq!(
            serde_json::to_value(&inventory).unwrap(),
            json!({
                "findings": [{
                    "repository_name": "svc",
                    "branch_name": "main",
                    "actions_file": "/ws/svc/.github/workflows/ci.yml",
                    "matches": ["actions/checkout@v4"]
                }]
            })
        );
    }

    #[test]
    fn rows_flatten_one_per_match() {
        let inventory = Inventory {
            records: vec![
                record("a", "main", &["x/y@v1", "x/z@main"]),
                record("b", "dev", &["p/q@v2"]),
            ],
        };

        let rows: Vec<_> = inventory
            .rows()
            .map(|r| (r.repository, r.branch, r.action))
            .collect();

        assert_eq!(
            rows,
            vec![
                ("a", "main", "x/y@v1"),
                ("a", "main", "x/z@main"),
                ("b", "dev", "p/q@v2"),
            ]
        );
    }

    #[test]
    fn empty_inventory_serializes_empty_list() {
        assert_eq!(
            serde_json::to_value(Inventory::default()).unwrap(),
            json!({"findings": []})
        );
    }
}
