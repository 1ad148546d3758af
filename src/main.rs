//! rankfuse - learned rank fusion with k-fold cross-validation
//!
//! Main entry point for the rankfuse CLI.

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use rankfuse_config::{Config, ConfigLoader, ConfigValidator, DimensionPolicy, ZeroScorePolicy};

mod cli;
mod cmd_cv;
mod cmd_eval;
mod cmd_fuse;

use cli::{Cli, CombineArgs, Commands};

/// Get the rankfuse home directory (~/.rankfuse).
fn rankfuse_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".rankfuse"))
        .unwrap_or_else(|| PathBuf::from(".rankfuse"))
}

/// Initialize tracing with console and file output.
///
/// Log files are written to ~/.rankfuse/logs/ with daily rotation.
fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = rankfuse_dir().join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("rankfuse")
        .filename_suffix("log")
        .max_log_files(30)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Flushes the file writer on exit.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        // Console layer on stderr; stdout carries command output
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(true)
                .with_writer(std::io::stderr),
        )
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing()?;

    let cli = Cli::parse();

    if let Err(e) = dispatch(cli).await {
        error!("{}", e);
        std::process::exit(1);
    }
    Ok(())
}

async fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Cv {
            runs,
            qrels,
            out,
            folds,
            parallel,
            metric,
            jar,
            timeout,
            features,
            combine,
        } => {
            let mut config = config;
            if let Some(folds) = folds {
                config.crossval.folds = folds;
            }
            if let Some(parallel) = parallel {
                config.crossval.max_parallel_folds = parallel;
            }
            if let Some(metric) = metric {
                config.crossval.metric = metric;
            }
            if let Some(jar) = jar {
                config.learner.jar = Some(ConfigLoader::expand_path(&jar));
            }
            if let Some(timeout) = timeout {
                config.learner.timeout_secs = timeout;
            }
            config.crossval.zscore |= features.zscore;
            apply_combine_args(&mut config, &combine);
            validate(&config)?;

            cmd_cv::run_cv(runs, qrels, out, config).await
        }
        Commands::Features { runs, qrels, output, features } => {
            cmd_fuse::build_features(&runs, &qrels, &output, features.zscore || config.crossval.zscore)
        }
        Commands::Combine { features, weights, output, combine } => {
            let mut config = config;
            apply_combine_args(&mut config, &combine);
            validate(&config)?;
            cmd_fuse::combine(&features, &weights, &output, config.combine)
        }
        Commands::Split { run, folds, out } => {
            cmd_cv::split(&run, folds.unwrap_or(config.crossval.folds), &out)
        }
        Commands::Map { eval } => cmd_eval::map(&eval),
        Commands::P1 { eval } => cmd_eval::precision_at_1(&eval),
        Commands::Stderr { eval, run, measure, qrels, format } => {
            cmd_eval::stderr(eval.as_deref(), run.as_deref(), measure.as_deref(), &qrels, &format)
        }
        Commands::Best { runs, qrels, format } => cmd_eval::best(&runs, &qrels, &format),
    }
}

/// Load the configuration file, or defaults when none is given.
fn load_config(path: Option<&std::path::Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = ConfigLoader::load_or_default(path)?;
    if let Some(jar) = config.learner.jar.take() {
        config.learner.jar = Some(ConfigLoader::expand_path(&jar));
    }
    Ok(config)
}

fn apply_combine_args(config: &mut Config, args: &CombineArgs) {
    if args.keep_zero_scores {
        config.combine.zero_score = ZeroScorePolicy::Keep;
    }
    if args.lenient_dimensions {
        config.combine.dimensions = DimensionPolicy::Lenient;
    }
}

/// Reject invalid configuration and log warnings.
fn validate(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let warnings = ConfigValidator::validate(config).into_result()?;
    for warning in warnings {
        warn!("{}: {}", warning.path, warning.message);
    }
    Ok(())
}
