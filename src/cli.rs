//! CLI definitions for rankfuse.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// rankfuse CLI.
#[derive(Parser)]
#[command(name = "rankfuse")]
#[command(about = "Learned rank fusion with k-fold cross-validation")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "RANKFUSE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run k-fold cross-validated fusion over a directory of runs
    Cv {
        /// Directory of base-ranker run files
        #[arg(long)]
        runs: PathBuf,

        /// Relevance judgments
        #[arg(long)]
        qrels: PathBuf,

        /// Working directory for intermediate and final files
        #[arg(long)]
        out: PathBuf,

        /// Number of folds
        #[arg(short = 'k', long)]
        folds: Option<usize>,

        /// Upper bound on folds processed concurrently
        #[arg(long)]
        parallel: Option<usize>,

        /// Metric the learner optimizes
        #[arg(long)]
        metric: Option<String>,

        /// Path to the RankLib jar
        #[arg(long)]
        jar: Option<String>,

        /// Learner timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        #[command(flatten)]
        features: FeatureArgs,

        #[command(flatten)]
        combine: CombineArgs,
    },

    /// Build one feature file from a directory of runs
    Features {
        /// Directory of base-ranker run files
        #[arg(long)]
        runs: PathBuf,

        /// Relevance judgments
        #[arg(long)]
        qrels: PathBuf,

        /// Output feature file
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        features: FeatureArgs,
    },

    /// Apply a weight file to a feature file
    Combine {
        /// Feature file
        #[arg(long)]
        features: PathBuf,

        /// Weight file of `index:weight` tokens
        #[arg(long)]
        weights: PathBuf,

        /// Output run file
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        combine: CombineArgs,
    },

    /// Split one run file into per-fold files
    Split {
        /// Run file to split
        run: PathBuf,

        /// Number of folds
        #[arg(short = 'k', long)]
        folds: Option<usize>,

        /// Destination directory
        #[arg(long)]
        out: PathBuf,
    },

    /// Mean average precision of a run
    Map {
        #[command(flatten)]
        eval: EvalArgs,
    },

    /// Precision at rank 1 of a run
    #[command(name = "p1")]
    P1 {
        #[command(flatten)]
        eval: EvalArgs,
    },

    /// Standard error of per-query metric values
    Stderr {
        /// trec_eval -q output holding per-query values
        #[arg(long, conflicts_with = "run", required_unless_present = "run")]
        eval: Option<PathBuf>,

        /// Run file; per-query average precision is used as the values
        #[arg(long)]
        run: Option<PathBuf>,

        /// Only use trec_eval rows of this measure
        #[arg(long, requires = "eval")]
        measure: Option<String>,

        /// Relevance judgments
        #[arg(long)]
        qrels: PathBuf,

        /// Output format (table, json)
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Rank every run in a directory by MAP
    Best {
        /// Directory of run files
        #[arg(long)]
        runs: PathBuf,

        /// Relevance judgments
        #[arg(long)]
        qrels: PathBuf,

        /// Output format (table, json)
        #[arg(long, default_value = "table")]
        format: String,
    },
}

#[derive(Args)]
pub(crate) struct FeatureArgs {
    /// Z-score normalize every feature column
    #[arg(long)]
    pub zscore: bool,
}

#[derive(Args)]
pub(crate) struct CombineArgs {
    /// Keep documents whose combined score is exactly zero
    #[arg(long)]
    pub keep_zero_scores: bool,

    /// Treat missing weights as zero instead of failing
    #[arg(long)]
    pub lenient_dimensions: bool,
}

#[derive(Args)]
pub(crate) struct EvalArgs {
    /// Run file
    #[arg(long)]
    pub run: PathBuf,

    /// Relevance judgments
    #[arg(long)]
    pub qrels: PathBuf,

    /// Print one row per query before the summary row
    #[arg(long)]
    pub per_query: bool,

    /// Output format (table, json)
    #[arg(long, default_value = "table")]
    pub format: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cv() {
        let cli = Cli::try_parse_from([
            "rankfuse", "cv", "--runs", "runs", "--qrels", "qrels.txt", "--out", "cv", "-k", "3",
            "--zscore", "--keep-zero-scores",
        ])
        .unwrap();

        match cli.command {
            Commands::Cv { folds, features, combine, jar, .. } => {
                assert_eq!(folds, Some(3));
                assert!(features.zscore);
                assert!(combine.keep_zero_scores);
                assert!(!combine.lenient_dimensions);
                assert!(jar.is_none());
            }
            _ => panic!("expected cv"),
        }
    }

    #[test]
    fn test_parse_p1_per_query() {
        let cli = Cli::try_parse_from([
            "rankfuse", "p1", "--run", "a.run", "--qrels", "q.txt", "--per-query", "--format", "json",
        ])
        .unwrap();

        match cli.command {
            Commands::P1 { eval } => {
                assert!(eval.per_query);
                assert_eq!(eval.format, "json");
            }
            _ => panic!("expected p1"),
        }
    }

    #[test]
    fn test_stderr_needs_one_source() {
        assert!(Cli::try_parse_from(["rankfuse", "stderr", "--qrels", "q.txt"]).is_err());
        assert!(
            Cli::try_parse_from([
                "rankfuse", "stderr", "--qrels", "q.txt", "--eval", "e.txt", "--run", "a.run",
            ])
            .is_err()
        );
        assert!(
            Cli::try_parse_from(["rankfuse", "stderr", "--qrels", "q.txt", "--run", "a.run"]).is_ok()
        );
    }

    #[test]
    fn test_global_config() {
        let cli = Cli::try_parse_from([
            "rankfuse", "split", "a.run", "--out", "folds", "--config", "rankfuse.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("rankfuse.toml")));
    }
}
