//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Turn the first error, if any, into a `ConfigError`.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(ConfigError::InvalidValue {
                field: error.path,
                message: error.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_crossval(config, &mut result);
        Self::validate_learner(config, &mut result);
        Self::validate_combine(config, &mut result);

        result
    }

    fn validate_crossval(config: &Config, result: &mut ValidationResult) {
        if config.crossval.folds < 2 {
            result.add_error(ValidationError::new(
                "crossval.folds",
                "folds must be at least 2",
            ));
        }

        if config.crossval.max_parallel_folds == 0 {
            result.add_error(ValidationError::new(
                "crossval.max_parallel_folds",
                "max_parallel_folds must be greater than 0",
            ));
        }

        if config.crossval.metric.trim().is_empty() {
            result.add_error(ValidationError::new(
                "crossval.metric",
                "metric cannot be empty",
            ));
        }
    }

    fn validate_learner(config: &Config, result: &mut ValidationResult) {
        if config.learner.program.trim().is_empty() {
            result.add_error(ValidationError::new(
                "learner.program",
                "program cannot be empty",
            ));
        }

        if config.learner.timeout_secs == 0 {
            result.add_error(ValidationError::new(
                "learner.timeout_secs",
                "timeout_secs must be greater than 0",
            ));
        }

        if config.learner.uses_jar() && config.learner.jar.is_none() {
            result.add_warning(ValidationWarning::new(
                "learner.jar",
                "no jar configured, runs stop after building train and test files",
            ));
        }

        if let Some(ref jar) = config.learner.jar {
            if !std::path::Path::new(jar).exists() {
                result.add_warning(ValidationWarning::new(
                    "learner.jar",
                    format!("jar does not exist: {}", jar),
                ));
            }
        }
    }

    fn validate_combine(config: &Config, result: &mut ValidationResult) {
        for (path, tag) in [
            ("combine.collection_tag", &config.combine.collection_tag),
            ("combine.run_tag", &config.combine.run_tag),
        ] {
            if tag.is_empty() || tag.contains(char::is_whitespace) {
                result.add_error(ValidationError::new(
                    path,
                    "tag must be a single non-empty token",
                ));
            }
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
