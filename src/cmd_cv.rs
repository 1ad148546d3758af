//! Cross-validation subcommand handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use rankfuse_config::Config;
use rankfuse_core::FoldAssignment;
use rankfuse_core::folds::collect_query_ids;
use rankfuse_crossval::{CrossValOptions, CrossValidator};
use rankfuse_learner::CommandLearner;

/// Run the full cross-validation pipeline.
pub(crate) async fn run_cv(
    runs: PathBuf,
    qrels: PathBuf,
    out: PathBuf,
    config: Config,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting rankfuse v{}", env!("CARGO_PKG_VERSION"));

    let options = CrossValOptions {
        run_dir: runs,
        qrel_file: qrels,
        cv_dir: out,
        crossval: config.crossval.clone(),
        combine: config.combine.clone(),
    };

    let mut validator = CrossValidator::new(options);
    if config.learner.is_runnable() {
        let learner = CommandLearner::from_config(&config.learner);
        validator = validator.with_learner(Arc::new(learner));
    } else {
        info!("Learner is not runnable without a jar; only features will be prepared");
    }

    let outcome = validator.run().await?;
    let summary = &outcome.summary;

    println!("Folds:    {}", summary.folds);
    println!("Queries:  {}", summary.num_queries);
    println!("Rankers:  {}", summary.rankers.len());
    for (i, name) in summary.rankers.iter().enumerate() {
        println!("  {}:{}", i + 1, name);
    }
    println!();
    println!(
        "{:<6} {:<8} {:<8} {:<8} {:<8} {}",
        "FOLD", "QUERIES", "ROWS", "SKIPPED", "FUSED", "TRAIN"
    );
    println!("{}", "-".repeat(70));
    for fold in &summary.fold_details {
        let fused = fold
            .fused_lines
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<6} {:<8} {:<8} {:<8} {:<8} {}",
            fold.fold,
            fold.queries,
            fold.feature_rows,
            fold.skipped_queries.len(),
            fused,
            fold.train_file.display()
        );
    }
    println!();
    match outcome.final_run() {
        Some(path) => println!("Final run: {}", path.display()),
        None => println!("Final run: not produced (no learner configured)"),
    }
    println!("Summary:   {}", outcome.summary_path.display());

    Ok(())
}

/// Split one run file into `folds` per-fold files under `out`.
pub(crate) fn split(run: &Path, folds: usize, out: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let queries = collect_query_ids(&[run.to_path_buf()])?;
    let assignment = FoldAssignment::partition(queries, folds)?;
    std::fs::create_dir_all(out)?;
    let written = assignment.write_fold_runs(run, out)?;

    for (index, path) in written.iter().enumerate() {
        let size = assignment.fold(index).map(|f| f.len()).unwrap_or(0);
        println!("{:<4} {:<6} {}", index, size, path.display());
    }
    Ok(())
}
