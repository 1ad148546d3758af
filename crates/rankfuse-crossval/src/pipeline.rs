//! Cross-validation orchestrator.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use rankfuse_config::{CombineConfig, CrossValConfig};
use rankfuse_core::folds::{collect_query_ids, fold_file_name};
use rankfuse_core::{Combiner, FeatureBuilder, FoldAssignment, Qrels, RankerOrder};
use rankfuse_learner::WeightLearner;
use tracing::{debug, info, warn};

use crate::assembly::{TrainingSet, concat_files, leave_one_out_sets};
use crate::context::{PipelineContext, remove_if_exists};
use crate::error::{CrossValError, Phase};
use crate::pool::{FoldPool, blocking};
use crate::summary::{FoldSummary, RunSummary};

/// Inputs of one cross-validation run.
#[derive(Debug, Clone)]
pub struct CrossValOptions {
    /// Directory of base-ranker run files; every regular file is a ranker.
    pub run_dir: PathBuf,
    pub qrel_file: PathBuf,
    /// Working directory for all intermediate and final files.
    pub cv_dir: PathBuf,
    pub crossval: CrossValConfig,
    pub combine: CombineConfig,
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct CrossValOutcome {
    pub summary: RunSummary,
    pub summary_path: PathBuf,
}

impl CrossValOutcome {
    /// Final fused run, absent when no learner was configured.
    pub fn final_run(&self) -> Option<&Path> {
        self.summary.final_run.as_deref()
    }
}

struct Prepared {
    rankers: Arc<RankerOrder>,
    qrels: Arc<Qrels>,
    assignment: FoldAssignment,
}

struct TestBuild {
    rows: usize,
    skipped: Vec<String>,
}

struct Fusion {
    learner_secs: f64,
    written: usize,
    dropped_zero: usize,
}

/// Drives the phases of a k-fold run. Phases run in order; each phase fans
/// out one task per fold and completes before the next starts.
pub struct CrossValidator {
    options: CrossValOptions,
    ctx: Arc<PipelineContext>,
    learner: Option<Arc<dyn WeightLearner>>,
    pool: FoldPool,
}

impl CrossValidator {
    pub fn new(options: CrossValOptions) -> Self {
        let ctx = Arc::new(PipelineContext::new(&options.cv_dir));
        let pool = FoldPool::new(options.crossval.max_parallel_folds);
        Self {
            options,
            ctx,
            learner: None,
            pool,
        }
    }

    /// Learn weights with `learner`. Without one the run stops once the
    /// training files are assembled.
    pub fn with_learner(mut self, learner: Arc<dyn WeightLearner>) -> Self {
        self.learner = Some(learner);
        self
    }

    pub fn context(&self) -> &PipelineContext {
        &self.ctx
    }

    pub async fn run(&self) -> Result<CrossValOutcome, CrossValError> {
        let started_at = Utc::now();
        let k = self.options.crossval.folds;
        info!(
            "Starting {}-fold cross-validation in {}",
            k,
            self.ctx.root().display()
        );

        let prepared = self.setup().await?;
        info!("Rankers: {}", prepared.rankers);

        let tests = self.build_test_sets(&prepared).await?;
        check_outputs(Phase::TestBuild, (0..k).map(|i| self.ctx.test_file(i)))?;

        let sets = leave_one_out_sets(k);
        self.assemble_training(&sets).await?;
        check_outputs(Phase::TrainAssembly, (0..k).map(|i| self.ctx.train_file(i)))?;

        let mut details: Vec<FoldSummary> = tests
            .into_iter()
            .map(|(fold, test)| {
                let window = sets
                    .iter()
                    .find(|set| set.excluded == fold)
                    .map(|set| set.window.clone())
                    .unwrap_or_default();
                FoldSummary {
                    fold,
                    queries: prepared.assignment.fold(fold).map(|f| f.len()).unwrap_or(0),
                    test_file: self.ctx.test_file(fold),
                    feature_rows: test.rows,
                    skipped_queries: test.skipped,
                    train_file: self.ctx.train_file(fold),
                    train_window: window,
                    model_file: None,
                    combined_file: None,
                    learner_secs: None,
                    fused_lines: None,
                    dropped_zero: None,
                }
            })
            .collect();

        let mut summary = RunSummary {
            started_at,
            finished_at: started_at,
            folds: k,
            num_queries: prepared.assignment.num_queries(),
            zscore: self.options.crossval.zscore,
            metric: self.options.crossval.metric.clone(),
            rankers: prepared.rankers.names().to_vec(),
            learner: None,
            fold_details: Vec::new(),
            final_run: None,
        };

        if let Some(learner) = &self.learner {
            summary.learner = Some(learner.name().to_string());

            let fusions = self.learn_and_combine(learner.clone()).await?;
            check_outputs(Phase::Combine, (0..k).map(|i| self.ctx.combined_file(i)))?;

            for (fold, fusion) in fusions {
                if let Some(detail) = details.get_mut(fold) {
                    detail.model_file = Some(self.ctx.model_file(fold));
                    detail.combined_file = Some(self.ctx.combined_file(fold));
                    detail.learner_secs = Some(fusion.learner_secs);
                    detail.fused_lines = Some(fusion.written);
                    detail.dropped_zero = Some(fusion.dropped_zero);
                }
            }

            summary.final_run = Some(self.concat_final(k).await?);
        } else {
            info!("No weight learner configured, stopping after train assembly");
        }

        summary.fold_details = details;
        summary.finished_at = Utc::now();
        let summary_path = self.ctx.summary_file();
        summary.write(&summary_path)?;

        info!(
            "Cross-validation finished in {:.1}s ({} fold tasks)",
            (summary.finished_at - summary.started_at).num_milliseconds() as f64 / 1000.0,
            self.pool.total_completed()
        );
        Ok(CrossValOutcome {
            summary,
            summary_path,
        })
    }

    /// Create directories, copy runs, partition queries and split every run.
    async fn setup(&self) -> Result<Prepared, CrossValError> {
        let ctx = self.ctx.clone();
        let run_dir = self.options.run_dir.clone();
        let qrel_file = self.options.qrel_file.clone();
        let k = self.options.crossval.folds;
        let with_learner = self.learner.is_some();

        blocking(move || {
            if !run_dir.is_dir() {
                return Err(CrossValError::InvalidInput(format!(
                    "run directory {} does not exist",
                    run_dir.display()
                )));
            }

            if ctx.root().is_dir()
                && fs::canonicalize(&run_dir)?.starts_with(fs::canonicalize(ctx.root())?)
            {
                return Err(CrossValError::InvalidInput(format!(
                    "run directory {} lies inside the working directory {}",
                    run_dir.display(),
                    ctx.root().display()
                )));
            }

            ctx.clear_stale()?;
            ctx.create_dirs(k, with_learner)?;
            let copied = ctx.copy_runs(&run_dir)?;
            let rankers = RankerOrder::new(
                copied
                    .iter()
                    .filter_map(|path| path.file_name())
                    .map(|name| name.to_string_lossy().into_owned()),
            );
            if rankers.is_empty() {
                return Err(CrossValError::InvalidInput(format!(
                    "no run files in {}",
                    run_dir.display()
                )));
            }

            let qrels = Qrels::read(&qrel_file)?;
            if qrels.is_empty() {
                warn!("No judgments in {}", qrel_file.display());
            }

            let queries = collect_query_ids(&copied)?;
            let assignment = FoldAssignment::partition(queries, k)?;
            info!(
                "Partitioned {} queries into {} folds",
                assignment.num_queries(),
                k
            );

            for run in &copied {
                assignment.write_fold_runs(run, &ctx.folds_dir())?;
            }

            Ok(Prepared {
                rankers: Arc::new(rankers),
                qrels: Arc::new(qrels),
                assignment,
            })
        })
        .await
    }

    async fn build_test_sets(
        &self,
        prepared: &Prepared,
    ) -> Result<Vec<(usize, TestBuild)>, CrossValError> {
        let k = self.options.crossval.folds;
        let zscore = self.options.crossval.zscore;

        self.pool
            .run_phase(Phase::TestBuild, 0..k, |fold| {
                let ctx = self.ctx.clone();
                let rankers = prepared.rankers.clone();
                let qrels = prepared.qrels.clone();
                blocking(move || {
                    let builder = FeatureBuilder::new(&rankers, &qrels).with_zscore(zscore);
                    let runs = builder.load_runs(&ctx.fold_dir(fold), |name| {
                        fold_file_name(fold, name)
                    })?;
                    let features = builder.build(&runs)?;
                    let path = ctx.test_file(fold);
                    features.write(&path)?;
                    debug!(
                        "Test set for fold {} has {} rows",
                        fold,
                        features.lines().len()
                    );
                    Ok(TestBuild {
                        rows: features.lines().len(),
                        skipped: features.skipped().to_vec(),
                    })
                })
            })
            .await
    }

    async fn assemble_training(&self, sets: &[TrainingSet]) -> Result<(), CrossValError> {
        let excluded: Vec<usize> = sets.iter().map(|set| set.excluded).collect();

        self.pool
            .run_phase(Phase::TrainAssembly, excluded, |fold| {
                let ctx = self.ctx.clone();
                let window = sets
                    .iter()
                    .find(|set| set.excluded == fold)
                    .map(|set| set.window.clone())
                    .unwrap_or_default();
                blocking(move || {
                    let inputs: Vec<PathBuf> = window.iter().map(|&i| ctx.test_file(i)).collect();
                    for input in &inputs {
                        if !input.is_file() {
                            return Err(CrossValError::MissingIntermediateFile {
                                phase: Phase::TestBuild,
                                path: input.clone(),
                            });
                        }
                    }
                    let output = ctx.train_file(fold);
                    concat_files(&inputs, &output)?;
                    debug!("Training set {} built from folds {:?}", fold, window);
                    Ok(())
                })
            })
            .await?;
        Ok(())
    }

    /// Learn weights on each training set and apply them to the fold it left out.
    async fn learn_and_combine(
        &self,
        learner: Arc<dyn WeightLearner>,
    ) -> Result<Vec<(usize, Fusion)>, CrossValError> {
        let k = self.options.crossval.folds;
        let metric = self.options.crossval.metric.clone();
        let combiner = Arc::new(Combiner::new(self.options.combine.clone()));

        self.pool
            .run_phase(Phase::WeightLearning, 0..k, |fold| {
                let ctx = self.ctx.clone();
                let learner = learner.clone();
                let combiner = combiner.clone();
                let metric = metric.clone();
                async move {
                    let train = ctx.train_file(fold);
                    let model = ctx.model_file(fold);
                    remove_if_exists(&model)?;
                    info!("Learning weights for fold {} with {}", fold, learner.name());

                    let output = learner
                        .learn(&train, &metric, &model)
                        .await
                        .map_err(|source| CrossValError::Learner { fold, source })?;
                    if !model.is_file() {
                        return Err(CrossValError::MissingIntermediateFile {
                            phase: Phase::WeightLearning,
                            path: model,
                        });
                    }

                    let test = ctx.test_file(fold);
                    let combined = ctx.combined_file(fold);
                    let stats = blocking(move || {
                        Ok(combiner.combine_files(&test, &model, &combined)?)
                    })
                    .await?;

                    Ok(Fusion {
                        learner_secs: output.elapsed.as_secs_f64(),
                        written: stats.written,
                        dropped_zero: stats.dropped_zero,
                    })
                }
            })
            .await
    }

    async fn concat_final(&self, k: usize) -> Result<PathBuf, CrossValError> {
        let ctx = self.ctx.clone();
        blocking(move || {
            let inputs: Vec<PathBuf> = (0..k).map(|i| ctx.combined_file(i)).collect();
            let output = ctx.final_run(k);
            concat_files(&inputs, &output)?;
            info!("Final run written to {}", output.display());
            Ok(output)
        })
        .await
    }
}

/// Fail with the first path a phase should have produced but did not.
fn check_outputs(
    phase: Phase,
    paths: impl IntoIterator<Item = PathBuf>,
) -> Result<(), CrossValError> {
    for path in paths {
        if !path.is_file() {
            return Err(CrossValError::MissingIntermediateFile { phase, path });
        }
    }
    Ok(())
}
