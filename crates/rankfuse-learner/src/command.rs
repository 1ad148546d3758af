//! External-process weight learner.

use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info};

use rankfuse_config::{
    JAR_PLACEHOLDER, LearnerConfig, METRIC_PLACEHOLDER, MODEL_PLACEHOLDER, TRAIN_PLACEHOLDER,
};

use crate::error::LearnerError;
use crate::learner::{LearnerOutput, WeightLearner};

/// Bytes of stderr kept in a failure message.
const STDERR_TAIL: usize = 2000;

/// Runs an external program per training file.
///
/// Arguments come from a template whose `{train}`, `{metric}`, `{model}` and
/// `{jar}` placeholders are filled per call. The child is killed when the
/// call times out or its future is dropped.
pub struct CommandLearner {
    program: String,
    args: Vec<String>,
    jar: Option<String>,
    timeout: Duration,
}

impl CommandLearner {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            jar: None,
            timeout: Duration::from_secs(3600),
        }
    }

    pub fn from_config(config: &LearnerConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            jar: config.jar.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_jar(mut self, jar: impl Into<String>) -> Self {
        self.jar = Some(jar.into());
        self
    }

    fn render_args(&self, train: &Path, metric: &str, model: &Path) -> Vec<String> {
        let train = train.display().to_string();
        let model = model.display().to_string();
        let jar = self.jar.as_deref().unwrap_or_default();
        self.args
            .iter()
            .map(|arg| {
                arg.replace(TRAIN_PLACEHOLDER, &train)
                    .replace(METRIC_PLACEHOLDER, metric)
                    .replace(MODEL_PLACEHOLDER, &model)
                    .replace(JAR_PLACEHOLDER, jar)
            })
            .collect()
    }
}

#[async_trait]
impl WeightLearner for CommandLearner {
    fn name(&self) -> &str {
        &self.program
    }

    async fn learn(
        &self,
        train: &Path,
        metric: &str,
        model: &Path,
    ) -> Result<LearnerOutput, LearnerError> {
        if !tokio::fs::try_exists(train).await? {
            return Err(LearnerError::MissingInput(train.to_path_buf()));
        }

        // The weight file checked below must come from this call.
        if let Err(e) = tokio::fs::remove_file(model).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                return Err(e.into());
            }
        }

        let args = self.render_args(train, metric, model);
        debug!("Running learner: {} {}", self.program, args.join(" "));

        let mut cmd = Command::new(&self.program);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let started = Instant::now();
        let output = timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| LearnerError::Timeout(self.timeout.as_secs()))?
            .map_err(|e| LearnerError::Spawn {
                program: self.program.clone(),
                message: e.to_string(),
            })?;
        let elapsed = started.elapsed();

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        for line in stdout.lines() {
            debug!(target: "rankfuse::learner", "{}", line);
        }

        if !output.status.success() {
            let start = stderr.len().saturating_sub(STDERR_TAIL);
            let start = (start..stderr.len())
                .find(|i| stderr.is_char_boundary(*i))
                .unwrap_or(stderr.len());
            return Err(LearnerError::Failed {
                code: output.status.code(),
                stderr: stderr[start..].trim().to_string(),
            });
        }

        if !tokio::fs::try_exists(model).await? {
            return Err(LearnerError::MissingOutput(model.to_path_buf()));
        }

        info!(
            "Learner finished for {} in {:.1}s",
            train.display(),
            elapsed.as_secs_f64()
        );
        Ok(LearnerOutput {
            stdout,
            stderr,
            elapsed,
        })
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
