use super::*;

#[test]
fn test_validate_default_config() {
    let config = Config::default();
    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    // Default RankLib template without a jar.
    assert!(result.warnings.iter().any(|w| w.path == "learner.jar"));
}

#[test]
fn test_validate_single_fold() {
    let mut config = Config::default();
    config.crossval.folds = 1;

    let result = ConfigValidator::validate(&config);
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "crossval.folds"));
}

#[test]
fn test_validate_zero_parallelism() {
    let mut config = Config::default();
    config.crossval.max_parallel_folds = 0;

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "crossval.max_parallel_folds"));
}

#[test]
fn test_validate_zero_timeout() {
    let mut config = Config::default();
    config.learner.timeout_secs = 0;

    let result = ConfigValidator::validate(&config);
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "learner.timeout_secs"));
}

#[test]
fn test_validate_empty_program() {
    let mut config = Config::default();
    config.learner.program = "  ".to_string();

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "learner.program"));
}

#[test]
fn test_validate_missing_jar_warning() {
    let mut config = Config::default();
    config.learner.jar = Some("/nonexistent/RankLib.jar".to_string());

    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result
        .warnings
        .iter()
        .any(|w| w.message.contains("/nonexistent/RankLib.jar")));
}

#[test]
fn test_validate_tag_with_whitespace() {
    let mut config = Config::default();
    config.combine.run_tag = "my run".to_string();

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "combine.run_tag"));
}

#[test]
fn test_into_result_reports_first_error() {
    let mut config = Config::default();
    config.crossval.folds = 0;

    let err = ConfigValidator::validate(&config).into_result().unwrap_err();
    match err {
        ConfigError::InvalidValue { field, .. } => assert_eq!(field, "crossval.folds"),
        other => panic!("Expected InvalidValue, got {:?}", other),
    }
}

#[test]
fn test_into_result_passes_warnings_through() {
    let config = Config::default();
    let warnings = ConfigValidator::validate(&config).into_result().unwrap();
    assert!(!warnings.is_empty());
}
