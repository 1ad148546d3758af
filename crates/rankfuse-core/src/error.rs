//! Core errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading, building, combining or scoring rankings.
#[derive(Debug, Error)]
pub enum RankError {
    /// Fold count is below 2 or exceeds the number of distinct queries.
    #[error("Invalid fold count {folds} for {queries} distinct queries")]
    InvalidFoldCount { folds: usize, queries: usize },

    /// A pooled query has no relevance judgments.
    #[error("No judgments for query: {0}")]
    MissingJudgment(String),

    /// Weight vector and feature vector dimensions disagree.
    #[error("Feature dimension mismatch in {context}: features have {expected}, weights have {found}")]
    FeatureDimensionMismatch {
        expected: usize,
        found: usize,
        context: String,
    },

    /// A (query, document) pair cannot be written into a feature marker.
    #[error("Cannot encode query '{query}' and document '{document}' as a feature marker: document ids must not contain '_' and ids must not contain '#'")]
    UnencodableId { query: String, document: String },

    /// A line could not be parsed.
    #[error("Malformed line {line} in {path}: {reason}")]
    Malformed {
        path: String,
        line: usize,
        reason: String,
    },

    /// An expected input file does not exist.
    #[error("File not found: {}", .0.display())]
    MissingFile(PathBuf),

    /// Not enough values to compute a statistic.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for core operations.
pub type RankResult<T> = Result<T, RankError>;

impl RankError {
    pub(crate) fn malformed(path: &std::path::Path, line: usize, reason: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.display().to_string(),
            line,
            reason: reason.into(),
        }
    }
}

/// Read a whole file, reporting a missing file as [`RankError::MissingFile`].
pub(crate) fn read_file(path: &std::path::Path) -> RankResult<String> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => RankError::MissingFile(path.to_path_buf()),
        _ => RankError::Io(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_fold_count_display() {
        let err = RankError::InvalidFoldCount { folds: 1, queries: 10 };
        let display = err.to_string();
        assert!(display.contains("1"));
        assert!(display.contains("10"));
    }

    #[test]
    fn test_dimension_mismatch_display() {
        let err = RankError::FeatureDimensionMismatch {
            expected: 3,
            found: 2,
            context: "feature-file-0.txt".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("feature-file-0.txt"));
        assert!(display.contains("features have 3"));
        assert!(display.contains("weights have 2"));
    }

    #[test]
    fn test_read_missing_file() {
        let result = read_file(std::path::Path::new("/nonexistent/run.txt"));
        assert!(matches!(result, Err(RankError::MissingFile(_))));
    }
}
