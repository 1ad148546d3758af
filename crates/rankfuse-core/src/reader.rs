//! Run and qrel file readers.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::debug;

use crate::error::{read_file, RankError, RankResult};
use crate::types::RunEntry;

/// A parsed run file: one base ranker's candidate lists.
#[derive(Debug, Clone)]
pub struct Run {
    name: String,
    entries: Vec<RunEntry>,
    scores: HashMap<String, HashMap<String, f64>>,
}

impl Run {
    /// Read a run file. The file name becomes the run name.
    pub fn read(path: &Path) -> RankResult<Self> {
        let content = read_file(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let run = Self::parse(name, &content, path)?;
        debug!("Read {} run lines from {}", run.entries.len(), path.display());
        Ok(run)
    }

    /// Parse run file content.
    pub fn parse(name: impl Into<String>, content: &str, origin: &Path) -> RankResult<Self> {
        let mut entries = Vec::new();
        for (lineno, line) in content.lines().enumerate() {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.is_empty() {
                continue;
            }
            if fields.len() < 5 {
                return Err(RankError::malformed(
                    origin,
                    lineno + 1,
                    format!("expected at least 5 fields, found {}", fields.len()),
                ));
            }
            let rank = fields[3].parse::<usize>().map_err(|e| {
                RankError::malformed(origin, lineno + 1, format!("bad rank '{}': {}", fields[3], e))
            })?;
            let score = fields[4].parse::<f64>().map_err(|e| {
                RankError::malformed(origin, lineno + 1, format!("bad score '{}': {}", fields[4], e))
            })?;
            entries.push(RunEntry {
                query: fields[0].to_string(),
                document: fields[2].to_string(),
                rank,
                score,
                tag: fields.get(5).copied().unwrap_or_default().to_string(),
            });
        }
        Ok(Self::from_entries(name, entries))
    }

    /// Build a run from entries already in memory.
    pub fn from_entries(name: impl Into<String>, entries: Vec<RunEntry>) -> Self {
        let mut scores: HashMap<String, HashMap<String, f64>> = HashMap::new();
        for entry in &entries {
            scores
                .entry(entry.query.clone())
                .or_default()
                .insert(entry.document.clone(), entry.score);
        }
        Self {
            name: name.into(),
            entries,
            scores,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &[RunEntry] {
        &self.entries
    }

    /// Score this ranker gave `document` for `query`; a repeated line wins over earlier ones.
    pub fn score(&self, query: &str, document: &str) -> Option<f64> {
        self.scores.get(query).and_then(|docs| docs.get(document)).copied()
    }
}

/// Per-query document lists in file order.
///
/// Works for both run files and qrel files: only the first and third
/// columns are read.
#[derive(Debug, Clone, Default)]
pub struct Rankings {
    order: Vec<String>,
    docs: HashMap<String, Vec<String>>,
}

impl Rankings {
    pub fn read(path: &Path) -> RankResult<Self> {
        let content = read_file(path)?;
        Self::parse(&content, path)
    }

    pub fn parse(content: &str, origin: &Path) -> RankResult<Self> {
        let mut rankings = Self::default();
        for (lineno, line) in content.lines().enumerate() {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.is_empty() {
                continue;
            }
            if fields.len() < 3 {
                return Err(RankError::malformed(
                    origin,
                    lineno + 1,
                    format!("expected at least 3 fields, found {}", fields.len()),
                ));
            }
            rankings.push(fields[0], fields[2]);
        }
        Ok(rankings)
    }

    /// Append a document to a query's list.
    pub fn push(&mut self, query: &str, document: &str) {
        match self.docs.get_mut(query) {
            Some(list) => list.push(document.to_string()),
            None => {
                self.order.push(query.to_string());
                self.docs.insert(query.to_string(), vec![document.to_string()]);
            }
        }
    }

    /// Queries in order of first appearance.
    pub fn queries(&self) -> &[String] {
        &self.order
    }

    pub fn documents(&self, query: &str) -> Option<&[String]> {
        self.docs.get(query).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Relevance judgments: query to relevant documents.
///
/// Every listed (query, document) pair counts as relevant; the relevance
/// column itself is not interpreted.
#[derive(Debug, Clone, Default)]
pub struct Qrels {
    judgments: HashMap<String, HashSet<String>>,
}

impl Qrels {
    pub fn read(path: &Path) -> RankResult<Self> {
        let content = read_file(path)?;
        let rankings = Rankings::parse(&content, path)?;
        let qrels = Self::from_rankings(&rankings);
        debug!("Read judgments for {} queries from {}", qrels.len(), path.display());
        Ok(qrels)
    }

    pub fn from_rankings(rankings: &Rankings) -> Self {
        let judgments = rankings
            .docs
            .iter()
            .map(|(query, docs)| (query.clone(), docs.iter().cloned().collect()))
            .collect();
        Self { judgments }
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut judgments: HashMap<String, HashSet<String>> = HashMap::new();
        for (query, document) in pairs {
            judgments
                .entry(query.to_string())
                .or_default()
                .insert(document.to_string());
        }
        Self { judgments }
    }

    /// Relevant documents of a query, `None` when the query is unjudged.
    pub fn relevant(&self, query: &str) -> Option<&HashSet<String>> {
        self.judgments.get(query)
    }

    pub fn is_relevant(&self, query: &str, document: &str) -> bool {
        self.relevant(query).is_some_and(|docs| docs.contains(document))
    }

    /// Number of distinct judged queries.
    pub fn len(&self) -> usize {
        self.judgments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.judgments.is_empty()
    }
}
