//! # rankfuse Core
//!
//! Data marshalling for cross-validated rank fusion.
//!
//! ## Components
//!
//! - Run and qrel readers
//! - Fold partitioner
//! - Feature matrix builder (RankLib feature files)
//! - Weight-combiner
//! - MAP, P@1 and standard error

pub mod combine;
pub mod error;
pub mod features;
pub mod folds;
pub mod metrics;
pub mod reader;
pub mod types;

pub use combine::{CombineStats, Combiner, WeightVector};
pub use error::{RankError, RankResult};
pub use features::{FeatureBuilder, FeatureFile, FeatureLine};
pub use folds::{Fold, FoldAssignment};
pub use metrics::MetricReport;
pub use reader::{Qrels, Rankings, Run};
pub use types::{FusedRunEntry, RankerOrder, RunEntry};
