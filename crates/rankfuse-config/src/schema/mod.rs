//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

mod schema_combine;
mod schema_learner;

pub use schema_combine::*;
pub use schema_learner::*;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crossval: CrossValConfig,

    #[serde(default)]
    pub learner: LearnerConfig,

    #[serde(default)]
    pub combine: CombineConfig,
}

/// Cross-validation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossValConfig {
    /// Number of folds.
    #[serde(default = "default_folds")]
    pub folds: usize,

    /// Z-score normalize every feature column before writing feature files.
    #[serde(default)]
    pub zscore: bool,

    /// Upper bound on folds processed concurrently.
    #[serde(default = "default_max_parallel_folds")]
    pub max_parallel_folds: usize,

    /// Metric name handed to the weight learner.
    #[serde(default = "default_metric")]
    pub metric: String,
}

impl Default for CrossValConfig {
    fn default() -> Self {
        Self {
            folds: default_folds(),
            zscore: false,
            max_parallel_folds: default_max_parallel_folds(),
            metric: default_metric(),
        }
    }
}

fn default_folds() -> usize {
    5
}

fn default_max_parallel_folds() -> usize {
    4
}

fn default_metric() -> String {
    "MAP".to_string()
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
