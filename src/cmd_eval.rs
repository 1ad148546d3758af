//! Evaluation subcommand handlers.

use std::path::Path;

use serde_json::json;
use tracing::{info, warn};

use rankfuse_core::metrics::{
    mean_average_precision, precision_at_1 as p1_report, read_trec_eval_values, standard_error,
};
use rankfuse_core::{MetricReport, Qrels, RankerOrder, Rankings};

use crate::cli::EvalArgs;

pub(crate) fn map(args: &EvalArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (run, qrels) = read_inputs(&args.run, &args.qrels)?;
    print_report(&mean_average_precision(&run, &qrels), args)
}

pub(crate) fn precision_at_1(args: &EvalArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (run, qrels) = read_inputs(&args.run, &args.qrels)?;
    print_report(&p1_report(&run, &qrels), args)
}

/// Standard error of per-query values from trec_eval output or a run's AP.
pub(crate) fn stderr(
    eval: Option<&Path>,
    run: Option<&Path>,
    measure: Option<&str>,
    qrels: &Path,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let judgments = Qrels::read(qrels)?;
    let (measure, values) = match (eval, run) {
        (Some(eval), _) => (
            measure.unwrap_or("all measures").to_string(),
            read_trec_eval_values(eval, measure)?,
        ),
        (None, Some(run)) => {
            let report = mean_average_precision(&Rankings::read(run)?, &judgments);
            (report.measure.clone(), report.values())
        }
        (None, None) => return Err("either --eval or --run is required".into()),
    };

    let error = standard_error(&values, judgments.len())?;
    info!(
        "Standard error over {} values, {} judged queries",
        values.len(),
        judgments.len()
    );

    match format {
        "json" => {
            let out = json!({
                "measure": measure,
                "values": values.len(),
                "queries": judgments.len(),
                "standard_error": error,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        _ => println!("{:.4}", error),
    }
    Ok(())
}

/// Score every run in `runs` by MAP and print them best first.
pub(crate) fn best(runs: &Path, qrels: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let judgments = Qrels::read(qrels)?;
    let names = RankerOrder::from_dir(runs)?;
    if names.is_empty() {
        println!("No runs found.");
        return Ok(());
    }

    let mut scored = Vec::with_capacity(names.len());
    for name in names.names() {
        let report = mean_average_precision(&Rankings::read(&runs.join(name))?, &judgments);
        if !report.skipped.is_empty() {
            warn!("{}: {} queries without judgments", name, report.skipped.len());
        }
        scored.push((name.as_str(), report.mean));
    }
    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    match format {
        "json" => {
            let out: Vec<_> = scored
                .iter()
                .map(|(name, map)| json!({ "run": name, "map": map }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        _ => {
            println!("{:<6} {:<10} {}", "RANK", "MAP", "RUN");
            println!("{}", "-".repeat(50));
            for (rank, (name, map)) in scored.iter().enumerate() {
                println!("{:<6} {:<10.4} {}", rank + 1, map, name);
            }
        }
    }
    Ok(())
}

fn read_inputs(run: &Path, qrels: &Path) -> Result<(Rankings, Qrels), Box<dyn std::error::Error>> {
    Ok((Rankings::read(run)?, Qrels::read(qrels)?))
}

fn print_report(report: &MetricReport, args: &EvalArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(report)?),
        _ => print!("{}", report.render(args.per_query)),
    }
    Ok(())
}
