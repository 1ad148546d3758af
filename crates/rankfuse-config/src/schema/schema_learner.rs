//! External weight learner configuration.

use serde::{Deserialize, Serialize};

/// Placeholder replaced with the training feature file path.
pub const TRAIN_PLACEHOLDER: &str = "{train}";
/// Placeholder replaced with the target metric name.
pub const METRIC_PLACEHOLDER: &str = "{metric}";
/// Placeholder replaced with the output weight file path.
pub const MODEL_PLACEHOLDER: &str = "{model}";
/// Placeholder replaced with the configured jar path.
pub const JAR_PLACEHOLDER: &str = "{jar}";

/// How the external weight learner is launched.
///
/// The default is RankLib with Coordinate Ascent:
/// `java -jar {jar} -train {train} -ranker 4 -metric2t {metric} -save {model}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnerConfig {
    /// Executable to spawn.
    #[serde(default = "default_program")]
    pub program: String,

    /// Argument template.
    #[serde(default = "default_args")]
    pub args: Vec<String>,

    /// Path substituted for `{jar}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jar: Option<String>,

    /// Seconds before a learner invocation is killed.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            jar: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl LearnerConfig {
    /// Whether the argument template references `{jar}`.
    pub fn uses_jar(&self) -> bool {
        self.args.iter().any(|arg| arg.contains(JAR_PLACEHOLDER))
    }

    /// Whether enough is configured to actually launch the learner.
    pub fn is_runnable(&self) -> bool {
        !self.program.is_empty() && (!self.uses_jar() || self.jar.is_some())
    }
}

fn default_program() -> String {
    "java".to_string()
}

fn default_args() -> Vec<String> {
    [
        "-jar",
        JAR_PLACEHOLDER,
        "-train",
        TRAIN_PLACEHOLDER,
        "-ranker",
        "4",
        "-metric2t",
        METRIC_PLACEHOLDER,
        "-save",
        MODEL_PLACEHOLDER,
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_timeout_secs() -> u64 {
    3600
}
