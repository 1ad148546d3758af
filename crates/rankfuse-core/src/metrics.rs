//! Retrieval metrics: MAP, P@1 and standard error.

use std::collections::HashSet;
use std::path::Path;

use serde::Serialize;
use tracing::warn;

use crate::error::{read_file, RankError, RankResult};
use crate::reader::{Qrels, Rankings};

/// Per-query values and their mean for one measure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricReport {
    pub measure: String,
    /// `(query, value)` in run order.
    pub per_query: Vec<(String, f64)>,
    /// Mean over `per_query`; 0.0 when no query could be scored.
    pub mean: f64,
    /// Run queries left out for lack of judgments.
    pub skipped: Vec<String>,
}

impl MetricReport {
    fn from_values(measure: &str, per_query: Vec<(String, f64)>, skipped: Vec<String>) -> Self {
        let mean = if per_query.is_empty() {
            warn!("No judged queries for {}", measure);
            0.0
        } else {
            per_query.iter().map(|(_, v)| v).sum::<f64>() / per_query.len() as f64
        };
        Self {
            measure: measure.to_string(),
            per_query,
            mean,
            skipped,
        }
    }

    pub fn values(&self) -> Vec<f64> {
        self.per_query.iter().map(|(_, v)| *v).collect()
    }

    /// trec_eval-style rows: `<measure>\t\t\t<query>\t<value>`, then the `all` row.
    pub fn render(&self, per_query: bool) -> String {
        let mut out = String::new();
        if per_query {
            for (query, value) in &self.per_query {
                out.push_str(&format!("{}\t\t\t{}\t{:.4}\n", self.measure, query, value));
            }
        }
        out.push_str(&format!("{}\t\t\tall\t{:.4}\n", self.measure, self.mean));
        out
    }
}

/// Average precision of one ranked list.
///
/// Sums precision at every relevant hit and divides by the total number of
/// relevant documents, retrieved or not.
pub fn average_precision(retrieved: &[String], relevant: &HashSet<String>) -> f64 {
    if relevant.is_empty() {
        return 0.0;
    }
    let mut hits = 0usize;
    let mut sum = 0.0;
    for (position, document) in retrieved.iter().enumerate() {
        if relevant.contains(document) {
            hits += 1;
            sum += hits as f64 / (position + 1) as f64;
        }
    }
    sum / relevant.len() as f64
}

/// Mean Average Precision over queries present in both run and judgments.
pub fn mean_average_precision(run: &Rankings, qrels: &Qrels) -> MetricReport {
    let mut per_query = Vec::new();
    let mut skipped = Vec::new();
    for query in run.queries() {
        let retrieved = run.documents(query).unwrap_or_default();
        match qrels.relevant(query) {
            Some(relevant) => per_query.push((query.clone(), average_precision(retrieved, relevant))),
            None => {
                warn!("Did not find ground truth for query: {}", query);
                skipped.push(query.clone());
            }
        }
    }
    MetricReport::from_values("map", per_query, skipped)
}

/// Precision at rank 1.
pub fn precision_at_1(run: &Rankings, qrels: &Qrels) -> MetricReport {
    let mut per_query = Vec::new();
    let mut skipped = Vec::new();
    for query in run.queries() {
        let relevant = match qrels.relevant(query) {
            Some(relevant) if !relevant.is_empty() => relevant,
            _ => {
                warn!("Did not find ground truth for query: {}", query);
                skipped.push(query.clone());
                continue;
            }
        };
        let top = run.documents(query).and_then(|docs| docs.first());
        let value = if top.is_some_and(|d| relevant.contains(d)) { 1.0 } else { 0.0 };
        per_query.push((query.clone(), value));
    }
    MetricReport::from_values("P@1", per_query, skipped)
}

/// Sample standard deviation of `values` divided by `sqrt(num_queries)`.
pub fn standard_error(values: &[f64], num_queries: usize) -> RankResult<f64> {
    if values.len() < 2 {
        return Err(RankError::InsufficientData(format!(
            "standard error needs at least 2 values, got {}",
            values.len()
        )));
    }
    if num_queries == 0 {
        return Err(RankError::InsufficientData(
            "judgment file has no queries".to_string(),
        ));
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Ok(variance.sqrt() / (num_queries as f64).sqrt())
}

/// Per-query values from trec_eval `-q` output (`<measure> <query> <value>`).
///
/// The `all` summary row is skipped. When `measure` is given, only rows of
/// that measure are kept.
pub fn read_trec_eval_values(path: &Path, measure: Option<&str>) -> RankResult<Vec<f64>> {
    let content = read_file(path)?;
    let mut values = Vec::new();
    for (lineno, line) in content.lines().enumerate() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() < 3 {
            return Err(RankError::malformed(path, lineno + 1, "expected 3 fields"));
        }
        if fields[1] == "all" || measure.is_some_and(|m| m != fields[0]) {
            continue;
        }
        let value = fields[2].parse::<f64>().map_err(|e| {
            RankError::malformed(path, lineno + 1, format!("bad value '{}': {}", fields[2], e))
        })?;
        values.push(value);
    }
    Ok(values)
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
