use super::*;
use tempfile::TempDir;

fn script_learner(script: &str) -> CommandLearner {
    CommandLearner::new(
        "sh",
        vec![
            "-c".to_string(),
            script.to_string(),
            "learner".to_string(),
            TRAIN_PLACEHOLDER.to_string(),
            METRIC_PLACEHOLDER.to_string(),
            MODEL_PLACEHOLDER.to_string(),
        ],
    )
}

fn train_file(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("leave-0.txt");
    std::fs::write(&path, "1 qid:1 1:1 2:0 #q_d\n").unwrap();
    path
}

#[test]
fn test_render_args_ranklib_template() {
    let learner = CommandLearner::from_config(&LearnerConfig::default()).with_jar("/opt/RankLib.jar");
    let args = learner.render_args(Path::new("/cv/train/leave-1.txt"), "MAP", Path::new("/cv/models/model-1.txt"));
    assert_eq!(
        args,
        vec![
            "-jar",
            "/opt/RankLib.jar",
            "-train",
            "/cv/train/leave-1.txt",
            "-ranker",
            "4",
            "-metric2t",
            "MAP",
            "-save",
            "/cv/models/model-1.txt",
        ]
    );
    assert_eq!(learner.name(), "java");
}

#[test]
fn test_from_config_timeout() {
    let config = LearnerConfig {
        timeout_secs: 42,
        ..Default::default()
    };
    let learner = CommandLearner::from_config(&config);
    assert_eq!(learner.timeout, Duration::from_secs(42));
}

#[tokio::test]
async fn test_learn_writes_model() {
    let temp_dir = TempDir::new().unwrap();
    let train = train_file(&temp_dir);
    let model = temp_dir.path().join("model-0.txt");

    let learner = script_learner("echo training on $1 for $2; printf '## CA\\n1:0.5 2:0.5\\n' > \"$3\"");
    let output = learner.learn(&train, "MAP", &model).await.unwrap();

    assert!(output.stdout.contains("for MAP"));
    let weights = std::fs::read_to_string(&model).unwrap();
    assert!(weights.contains("1:0.5 2:0.5"));
}

#[tokio::test]
async fn test_learn_nonzero_exit() {
    let temp_dir = TempDir::new().unwrap();
    let train = train_file(&temp_dir);
    let model = temp_dir.path().join("model-0.txt");

    let learner = script_learner("echo bad feature file >&2; exit 3");
    let result = learner.learn(&train, "MAP", &model).await;
    match result {
        Err(LearnerError::Failed { code, stderr }) => {
            assert_eq!(code, Some(3));
            assert!(stderr.contains("bad feature file"));
        }
        other => panic!("Expected Failed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_learn_timeout() {
    let temp_dir = TempDir::new().unwrap();
    let train = train_file(&temp_dir);
    let model = temp_dir.path().join("model-0.txt");

    let learner = script_learner("sleep 10").with_timeout(Duration::from_millis(100));
    let result = learner.learn(&train, "MAP", &model).await;
    match result {
        Err(LearnerError::Timeout(_)) => {}
        other => panic!("Expected Timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_learn_missing_training_file() {
    let temp_dir = TempDir::new().unwrap();
    let learner = script_learner("exit 0");
    let result = learner
        .learn(
            &temp_dir.path().join("leave-9.txt"),
            "MAP",
            &temp_dir.path().join("model-9.txt"),
        )
        .await;
    assert!(matches!(result, Err(LearnerError::MissingInput(_))));
}

#[tokio::test]
async fn test_learn_success_without_model() {
    let temp_dir = TempDir::new().unwrap();
    let train = train_file(&temp_dir);
    let learner = script_learner("exit 0");
    let result = learner
        .learn(&train, "MAP", &temp_dir.path().join("model-0.txt"))
        .await;
    assert!(matches!(result, Err(LearnerError::MissingOutput(_))));
}

#[tokio::test]
async fn test_learn_ignores_previous_model() {
    let temp_dir = TempDir::new().unwrap();
    let train = train_file(&temp_dir);
    let model = temp_dir.path().join("model-0.txt");
    std::fs::write(&model, "## CA\n1:7\n").unwrap();

    let learner = script_learner("exit 0");
    let result = learner.learn(&train, "MAP", &model).await;

    assert!(matches!(result, Err(LearnerError::MissingOutput(_))));
    assert!(!model.exists());
}

#[tokio::test]
async fn test_learn_spawn_failure() {
    let temp_dir = TempDir::new().unwrap();
    let train = train_file(&temp_dir);
    let learner = CommandLearner::new("/nonexistent/learner-binary", Vec::new());
    let result = learner
        .learn(&train, "MAP", &temp_dir.path().join("model-0.txt"))
        .await;
    assert!(matches!(result, Err(LearnerError::Spawn { .. })));
}
