//! Learner errors.

use std::path::PathBuf;

use thiserror::Error;

/// Learner error types.
#[derive(Debug, Error)]
pub enum LearnerError {
    /// The learner exited with a non-zero status.
    #[error("Learner failed with exit code {code:?}: {stderr}")]
    Failed { code: Option<i32>, stderr: String },

    /// The learner did not finish in time and was killed.
    #[error("Learner timed out after {0} seconds")]
    Timeout(u64),

    /// The learner could not be started.
    #[error("Failed to spawn learner '{program}': {message}")]
    Spawn { program: String, message: String },

    /// The training feature file is missing.
    #[error("Training file not found: {}", .0.display())]
    MissingInput(PathBuf),

    /// The learner exited cleanly but wrote no weight file.
    #[error("Learner produced no weight file at {}", .0.display())]
    MissingOutput(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
