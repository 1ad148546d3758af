//! Feature and combine subcommand handlers.

use std::path::Path;

use tracing::warn;

use rankfuse_config::CombineConfig;
use rankfuse_core::{Combiner, FeatureBuilder, Qrels, RankerOrder};

/// Build one feature file from every run in `runs`.
pub(crate) fn build_features(
    runs: &Path,
    qrels: &Path,
    output: &Path,
    zscore: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let rankers = RankerOrder::from_dir(runs)?;
    if rankers.is_empty() {
        return Err(format!("no run files in {}", runs.display()).into());
    }
    let qrels = Qrels::read(qrels)?;

    let builder = FeatureBuilder::new(&rankers, &qrels).with_zscore(zscore);
    let loaded = builder.load_runs(runs, |name| name.to_string())?;
    let features = builder.build(&loaded)?;
    features.write(output)?;

    if !features.skipped().is_empty() {
        warn!(
            "{} queries had no judgments: {}",
            features.skipped().len(),
            features.skipped().join(", ")
        );
    }
    println!("Rankers: {}", rankers);
    println!("Rows:    {}", features.lines().len());
    println!("Output:  {}", output.display());
    Ok(())
}

/// Apply `weights` to `features` and write the fused run.
pub(crate) fn combine(
    features: &Path,
    weights: &Path,
    output: &Path,
    config: CombineConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let stats = Combiner::new(config).combine_files(features, weights, output)?;

    println!("Queries:      {}", stats.queries);
    println!("Lines:        {}", stats.written);
    println!("Zero dropped: {}", stats.dropped_zero);
    println!("Output:       {}", output.display());
    Ok(())
}
