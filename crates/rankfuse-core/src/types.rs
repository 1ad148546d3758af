//! Shared data model.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RankResult;

/// One line of a run file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunEntry {
    pub query: String,
    pub document: String,
    pub rank: usize,
    pub score: f64,
    pub tag: String,
}

/// One line of a fused run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedRunEntry {
    pub query: String,
    pub document: String,
    pub rank: usize,
    pub score: f64,
}

impl FusedRunEntry {
    /// Render as `<query> <collection> <document> <rank> <score> <run>`.
    pub fn to_line(&self, collection_tag: &str, run_tag: &str) -> String {
        format!(
            "{} {} {} {} {} {}",
            self.query, collection_tag, self.document, self.rank, self.score, run_tag
        )
    }
}

/// Base-ranker names in feature-index order.
///
/// Feature index `i + 1` always names `names()[i]`. The order is the sorted
/// order of the base-ranker file names and never changes once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankerOrder(Vec<String>);

impl RankerOrder {
    /// Build from arbitrary names; they are sorted and deduplicated.
    pub fn new(names: impl IntoIterator<Item = String>) -> Self {
        let mut names: Vec<String> = names.into_iter().collect();
        names.sort();
        names.dedup();
        Self(names)
    }

    /// Build from the regular files in `dir`.
    pub fn from_dir(dir: &Path) -> RankResult<Self> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        Ok(Self::new(names))
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// One-based feature index of a ranker.
    pub fn feature_index(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|n| n == name).map(|i| i + 1)
    }
}

impl fmt::Display for RankerOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, name) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}:{}", i + 1, name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ranker_order_sorted() {
        let order = RankerOrder::new(vec!["bm25.run".to_string(), "annot.run".to_string()]);
        assert_eq!(order.names(), &["annot.run".to_string(), "bm25.run".to_string()]);
        assert_eq!(order.feature_index("annot.run"), Some(1));
        assert_eq!(order.feature_index("bm25.run"), Some(2));
        assert_eq!(order.feature_index("missing"), None);
    }

    #[test]
    fn test_ranker_order_from_dir_skips_directories() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("z.run"), "").unwrap();
        std::fs::write(temp_dir.path().join("a.run"), "").unwrap();
        std::fs::create_dir(temp_dir.path().join("nested")).unwrap();

        let order = RankerOrder::from_dir(temp_dir.path()).unwrap();
        assert_eq!(order.len(), 2);
        assert_eq!(order.to_string(), "1:a.run, 2:z.run");
    }

    #[test]
    fn test_fused_entry_line() {
        let entry = FusedRunEntry {
            query: "q1".to_string(),
            document: "d1".to_string(),
            rank: 0,
            score: 1.5,
        };
        assert_eq!(entry.to_line("Q0", "combined"), "q1 Q0 d1 0 1.5 combined");
    }
}
