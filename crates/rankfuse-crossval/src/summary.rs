//! Run summary persisted next to the intermediate files.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CrossValError;

/// Per-fold record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoldSummary {
    pub fold: usize,
    /// Queries assigned to this fold.
    pub queries: usize,
    pub test_file: PathBuf,
    pub feature_rows: usize,
    /// Fold queries with no judgments, left out of the test file.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_queries: Vec<String>,
    /// Training file that leaves this fold out.
    pub train_file: PathBuf,
    /// Folds concatenated into `train_file`.
    pub train_window: Vec<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combined_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learner_secs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fused_lines: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dropped_zero: Option<usize>,
}

/// Whole-run record written to `summary.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub folds: usize,
    pub num_queries: usize,
    pub zscore: bool,
    pub metric: String,
    /// Base rankers; feature `i + 1` is `rankers[i]`.
    pub rankers: Vec<String>,
    /// Learner name, absent when the run stopped after train assembly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learner: Option<String>,
    pub fold_details: Vec<FoldSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_run: Option<PathBuf>,
}

impl RunSummary {
    pub fn read(path: &Path) -> Result<Self, CrossValError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn write(&self, path: &Path) -> Result<(), CrossValError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Whether weights were learned and combined.
    pub fn is_complete(&self) -> bool {
        self.final_run.is_some()
    }
}
