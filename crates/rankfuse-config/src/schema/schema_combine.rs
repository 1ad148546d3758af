//! Weight-combination policies.

use serde::{Deserialize, Serialize};

/// What to do with documents whose combined score is exactly zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZeroScorePolicy {
    /// Zero means "no signal"; leave the document out of the fused run.
    #[default]
    Drop,
    /// Rank zero-scored documents like any other.
    Keep,
}

/// What to do when a weight file and a feature row disagree on dimensions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionPolicy {
    /// Any mismatch is an error.
    #[default]
    Strict,
    /// Missing weights count as 0.0; a warning is logged once per file.
    Lenient,
}

/// Weight-combiner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombineConfig {
    #[serde(default)]
    pub zero_score: ZeroScorePolicy,

    #[serde(default)]
    pub dimensions: DimensionPolicy,

    /// Second column of every fused run line.
    #[serde(default = "default_collection_tag")]
    pub collection_tag: String,

    /// Last column of every fused run line.
    #[serde(default = "default_run_tag")]
    pub run_tag: String,
}

impl Default for CombineConfig {
    fn default() -> Self {
        Self {
            zero_score: ZeroScorePolicy::default(),
            dimensions: DimensionPolicy::default(),
            collection_tag: default_collection_tag(),
            run_tag: default_run_tag(),
        }
    }
}

fn default_collection_tag() -> String {
    "Q0".to_string()
}

fn default_run_tag() -> String {
    "combined".to_string()
}
