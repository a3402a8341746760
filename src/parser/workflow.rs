//! Mutable action reference scanner for workflow files
//!
//! Content is treated as opaque text. A reference is `owner/name@version`
//! where version is one of:
//! - a `v`-prefixed version: `v4`, `v1.2`, `V10.0.1`
//! - a bare dotted numeric version with at least one dot: `1.2`, `2.0.3`
//! - a literal branch name: `main`, `dev`, `master`

use regex::bytes::Regex;

use crate::parser::traits::ReferenceScanner;
use crate::parser::types::Match;

/// Pattern groups are positional: 1 = owner, 2 = name, 3 = version.
const MUTABLE_REFERENCE_PATTERN: &str = concat!(
    r"([A-Za-z0-9_-]+)/([A-Za-z0-9_-]+)@",
    r"(",
    r"[vV][0-9]+(?:\.[0-9]+)*",
    r"|",
    r"[0-9]+\.[0-9]+(?:\.[0-9]+)*",
    r"|",
    r"main|dev|master",
    r")",
);

/// Bytes that continue a version token. A match followed by one of these is
/// a prefix of a longer ref (`@develop`, `@v1.2.3-rc.1`) and is not reported.
fn continues_version(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'.' | b'-')
}

/// Scanner for mutable action references (.github/workflows/*.yml)
pub struct WorkflowScanner {
    pattern: Regex,
}

impl WorkflowScanner {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(MUTABLE_REFERENCE_PATTERN)
                .expect("mutable reference pattern is valid"),
        }
    }
}

impl Default for WorkflowScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceScanner for WorkflowScanner {
    fn scan(&self, content: &[u8]) -> Vec<Match> {
        // Matching line by line keeps references from spanning newlines.
        content
            .split(|&b| b == b'\n')
            .enumerate()
            .flat_map(|(index, line)| {
                self.pattern.captures_iter(line).filter_map(move |caps| {
                    let whole = caps.get(0)?;
                    if line.get(whole.end()).is_some_and(|&b| continues_version(b)) {
                        return None;
                    }
                    let group = |i: usize| {
                        caps.get(i)
                            .map(|g| String::from_utf8_lossy(g.as_bytes()).into_owned())
                            .unwrap_or_default()
                    };

                    Some(Match {
                        text: String::from_utf8_lossy(whole.as_bytes()).into_owned(),
                        owner: group(1),
                        name: group(2),
                        version: group(3),
                        line: index + 1,
                        column: whole.start() + 1,
                    })
                })
            })
            .collect()
    }
}
