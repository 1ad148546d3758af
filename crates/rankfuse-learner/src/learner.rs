//! Weight learner trait.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::LearnerError;

/// Captured result of one learner invocation.
#[derive(Debug, Clone, Default)]
pub struct LearnerOutput {
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

/// Learns a weight vector from a training feature file.
///
/// Implementations read `train`, optimize for `metric`, and write
/// `index:weight` tokens to `model`. Returning `Ok` means `model` exists.
#[async_trait]
pub trait WeightLearner: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    async fn learn(
        &self,
        train: &Path,
        metric: &str,
        model: &Path,
    ) -> Result<LearnerOutput, LearnerError>;
}
