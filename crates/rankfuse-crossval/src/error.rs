//! Cross-validation errors.

use std::fmt;
use std::path::PathBuf;

use rankfuse_core::RankError;
use rankfuse_learner::LearnerError;
use thiserror::Error;

/// Per-fold pipeline phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    TestBuild,
    TrainAssembly,
    WeightLearning,
    Combine,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TestBuild => "test build",
            Self::TrainAssembly => "train assembly",
            Self::WeightLearning => "weight learning",
            Self::Combine => "combine",
        };
        f.write_str(name)
    }
}

/// Cross-validation error types. Every variant aborts the whole run.
#[derive(Debug, Error)]
pub enum CrossValError {
    /// Inputs cannot support a run.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Reading, building or combining failed.
    #[error(transparent)]
    Rank(#[from] RankError),

    /// The external learner failed or timed out for a fold.
    #[error("Weight learning failed for fold {fold}: {source}")]
    Learner {
        fold: usize,
        #[source]
        source: LearnerError,
    },

    /// A phase's output is absent at the next phase boundary.
    #[error("Missing intermediate file after {phase}: {}", path.display())]
    MissingIntermediateFile { phase: Phase, path: PathBuf },

    /// A fold task panicked or was cancelled.
    #[error("Fold task failed: {0}")]
    TaskFailed(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<tokio::task::JoinError> for CrossValError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::TaskFailed(err.to_string())
    }
}
