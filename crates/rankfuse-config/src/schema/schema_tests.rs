use super::*;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.crossval.folds, 5);
    assert!(!config.crossval.zscore);
    assert_eq!(config.crossval.max_parallel_folds, 4);
    assert_eq!(config.crossval.metric, "MAP");
}

#[test]
fn test_learner_default_is_ranklib_template() {
    let learner = LearnerConfig::default();
    assert_eq!(learner.program, "java");
    assert_eq!(learner.args[0], "-jar");
    assert!(learner.args.contains(&"-ranker".to_string()));
    assert!(learner.args.contains(&MODEL_PLACEHOLDER.to_string()));
    assert!(learner.uses_jar());
}

#[test]
fn test_learner_not_runnable_without_jar() {
    let mut learner = LearnerConfig::default();
    assert!(!learner.is_runnable());

    learner.jar = Some("/opt/RankLib.jar".to_string());
    assert!(learner.is_runnable());
}

#[test]
fn test_learner_custom_program_runnable() {
    let learner = LearnerConfig {
        program: "./learn.sh".to_string(),
        args: vec![TRAIN_PLACEHOLDER.to_string(), MODEL_PLACEHOLDER.to_string()],
        jar: None,
        timeout_secs: 10,
    };
    assert!(!learner.uses_jar());
    assert!(learner.is_runnable());
}

#[test]
fn test_combine_default_policies() {
    let combine = CombineConfig::default();
    assert_eq!(combine.zero_score, ZeroScorePolicy::Drop);
    assert_eq!(combine.dimensions, DimensionPolicy::Strict);
    assert_eq!(combine.collection_tag, "Q0");
    assert_eq!(combine.run_tag, "combined");
}

#[test]
fn test_config_serialization_roundtrip() {
    let mut config = Config::default();
    config.combine.zero_score = ZeroScorePolicy::Keep;
    let serialized = toml::to_string(&config).unwrap();
    assert!(serialized.contains("zero_score = \"keep\""));

    let parsed: Config = toml::from_str(&serialized).unwrap();
    assert_eq!(parsed.combine.zero_score, ZeroScorePolicy::Keep);
    assert_eq!(parsed.crossval.folds, config.crossval.folds);
}
