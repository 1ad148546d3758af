//! Feature matrix builder and RankLib feature files.
//!
//! One row per pooled (query, document) pair:
//!
//! ```text
//! <target> qid:<n> 1:<score> 2:<score> ... #<query>_<document>
//! ```
//!
//! `qid` is a sequential integer assigned in query iteration order. The
//! trailing marker is the only place the original identifiers survive, so
//! every consumer recovers (query, document) from it.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{read_file, RankError, RankResult};
use crate::reader::{Qrels, Run};
use crate::types::RankerOrder;

/// One row of a feature file.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureLine {
    /// 1 when the document is judged relevant for the query.
    pub target: u8,
    pub qid: usize,
    /// `(feature index, value)` pairs in file order.
    pub features: Vec<(usize, f64)>,
    pub query: String,
    pub document: String,
}

impl FeatureLine {
    pub fn render(&self) -> String {
        let mut line = format!("{} qid:{}", self.target, self.qid);
        for (index, value) in &self.features {
            let _ = write!(line, " {}:{}", index, value);
        }
        let _ = write!(line, " #{}_{}", self.query, self.document);
        line
    }

    pub fn parse(line: &str, origin: &Path, lineno: usize) -> RankResult<Self> {
        let (head, marker) = line
            .split_once('#')
            .ok_or_else(|| RankError::malformed(origin, lineno, "missing #query_document marker"))?;
        let (query, document) = marker
            .trim()
            .rsplit_once('_')
            .ok_or_else(|| RankError::malformed(origin, lineno, "marker lacks '_' separator"))?;

        let mut tokens = head.split_whitespace();
        let target = tokens
            .next()
            .and_then(|t| t.parse::<u8>().ok())
            .ok_or_else(|| RankError::malformed(origin, lineno, "missing or bad target"))?;
        let qid = tokens
            .next()
            .and_then(|t| t.strip_prefix("qid:"))
            .and_then(|t| t.parse::<usize>().ok())
            .ok_or_else(|| RankError::malformed(origin, lineno, "missing or bad qid"))?;

        let mut features = Vec::new();
        for token in tokens {
            let parsed = token
                .split_once(':')
                .and_then(|(i, v)| Some((i.parse::<usize>().ok()?, v.parse::<f64>().ok()?)));
            match parsed {
                Some(pair) => features.push(pair),
                None => {
                    return Err(RankError::malformed(
                        origin,
                        lineno,
                        format!("bad feature token '{}'", token),
                    ));
                }
            }
        }

        Ok(Self {
            target,
            qid,
            features,
            query: query.to_string(),
            document: document.to_string(),
        })
    }
}

/// A whole feature file.
#[derive(Debug, Clone, Default)]
pub struct FeatureFile {
    lines: Vec<FeatureLine>,
    skipped: Vec<String>,
}

impl FeatureFile {
    pub fn read(path: &Path) -> RankResult<Self> {
        let content = read_file(path)?;
        Self::parse(&content, path)
    }

    pub fn parse(content: &str, origin: &Path) -> RankResult<Self> {
        let mut lines = Vec::new();
        for (lineno, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            lines.push(FeatureLine::parse(line, origin, lineno + 1)?);
        }
        Ok(Self {
            lines,
            skipped: Vec::new(),
        })
    }

    pub fn lines(&self) -> &[FeatureLine] {
        &self.lines
    }

    /// Pooled queries left out because they had no judgments.
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(&line.render());
            out.push('\n');
        }
        out
    }

    pub fn write(&self, path: &Path) -> RankResult<()> {
        fs::write(path, self.render())?;
        info!("Feature file written to {} ({} rows)", path.display(), self.lines.len());
        Ok(())
    }
}

/// Pool: per query, the union of documents retrieved by any ranker, in
/// first-seen order.
#[derive(Debug, Default)]
struct Pool {
    queries: Vec<String>,
    docs: HashMap<String, Vec<String>>,
    seen: HashSet<(String, String)>,
}

impl Pool {
    fn from_runs(runs: &[Run]) -> Self {
        let mut pool = Self::default();
        for run in runs {
            for entry in run.entries() {
                let key = (entry.query.clone(), entry.document.clone());
                if !pool.seen.insert(key) {
                    continue;
                }
                match pool.docs.get_mut(&entry.query) {
                    Some(docs) => docs.push(entry.document.clone()),
                    None => {
                        pool.queries.push(entry.query.clone());
                        pool.docs
                            .insert(entry.query.clone(), vec![entry.document.clone()]);
                    }
                }
            }
        }
        pool
    }
}

/// Builds feature files from base-ranker runs and judgments.
pub struct FeatureBuilder<'a> {
    rankers: &'a RankerOrder,
    qrels: &'a Qrels,
    zscore: bool,
}

impl<'a> FeatureBuilder<'a> {
    pub fn new(rankers: &'a RankerOrder, qrels: &'a Qrels) -> Self {
        Self {
            rankers,
            qrels,
            zscore: false,
        }
    }

    /// Z-score normalize each feature column over every row of the build.
    pub fn with_zscore(mut self, zscore: bool) -> Self {
        self.zscore = zscore;
        self
    }

    /// Read one run per ranker from `dir`, in ranker order.
    ///
    /// `file_name` maps a ranker name to its file name inside `dir`.
    pub fn load_runs<F>(&self, dir: &Path, file_name: F) -> RankResult<Vec<Run>>
    where
        F: Fn(&str) -> String,
    {
        self.rankers
            .names()
            .iter()
            .map(|name| Run::read(&dir.join(file_name(name))))
            .collect()
    }

    /// Build the feature file. `runs[i]` must be the run of ranker `i`.
    pub fn build(&self, runs: &[Run]) -> RankResult<FeatureFile> {
        if runs.len() != self.rankers.len() {
            return Err(RankError::FeatureDimensionMismatch {
                expected: self.rankers.len(),
                found: runs.len(),
                context: "base-ranker runs".to_string(),
            });
        }

        let pool = Pool::from_runs(runs);
        let mut rows: Vec<(usize, &str, Vec<f64>)> = Vec::new();
        for (query_pos, query) in pool.queries.iter().enumerate() {
            for document in &pool.docs[query] {
                let values = runs
                    .iter()
                    .map(|run| run.score(query, document).unwrap_or(0.0))
                    .collect();
                rows.push((query_pos, document.as_str(), values));
            }
        }

        if self.zscore {
            debug!("Using zscore normalization over {} rows", rows.len());
            let mut columns: Vec<Vec<f64>> = (0..self.rankers.len())
                .map(|col| rows.iter().map(|(_, _, values)| values[col]).collect())
                .collect();
            for column in &mut columns {
                zscore(column);
            }
            for (row, (_, _, values)) in rows.iter_mut().enumerate() {
                for (col, value) in values.iter_mut().enumerate() {
                    *value = columns[col][row];
                }
            }
        }

        let mut lines = Vec::with_capacity(rows.len());
        let mut skipped = Vec::new();
        let mut qid = 0;
        let mut current = None;
        for (query_pos, document, values) in rows {
            let query = &pool.queries[query_pos];
            let Some(relevant) = self.qrels.relevant(query) else {
                if current != Some(query_pos) {
                    warn!("{}; skipping", RankError::MissingJudgment(query.clone()));
                    skipped.push(query.clone());
                    current = Some(query_pos);
                }
                continue;
            };
            if !marker_safe(query, document) {
                return Err(RankError::UnencodableId {
                    query: query.clone(),
                    document: document.to_string(),
                });
            }
            if current != Some(query_pos) {
                qid += 1;
                current = Some(query_pos);
            }
            lines.push(FeatureLine {
                target: u8::from(relevant.contains(document)),
                qid,
                features: values
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| (i + 1, v))
                    .collect(),
                query: query.clone(),
                document: document.to_string(),
            });
        }

        debug!(
            "Built {} feature rows for {} queries ({} skipped)",
            lines.len(),
            qid,
            skipped.len()
        );
        Ok(FeatureFile { lines, skipped })
    }
}

/// Whether `#<query>_<document>` parses back to the same pair: the marker
/// splits at the last `_`, and everything after `#` is the marker.
fn marker_safe(query: &str, document: &str) -> bool {
    !document.contains('_') && !document.contains('#') && !query.contains('#')
}

/// Replace `values` with `(x - mean) / stddev` using the population standard
/// deviation. A constant column becomes all zeros.
fn zscore(values: &mut [f64]) {
    if values.is_empty() {
        return;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();
    for value in values.iter_mut() {
        *value = if stddev > 0.0 { (*value - mean) / stddev } else { 0.0 };
    }
}

#[cfg(test)]
#[path = "features_tests.rs"]
mod tests;
