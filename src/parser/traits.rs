//! Scanner trait definition

use crate::parser::types::Match;

/// Trait for locating mutable references in raw file content
pub trait ReferenceScanner: Send + Sync {
    /// Return every non-overlapping match in reading order.
    ///
    /// Content without references yields an empty vector.
    fn scan(&self, content: &[u8]) -> Vec<Match>;
}
