//! Fold partitioning and per-fold run files.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{read_file, RankError, RankResult};

/// Query id used for fold membership: the raw query with any `+suffix` removed.
pub fn query_id(raw: &str) -> &str {
    raw.split_once('+').map_or(raw, |(id, _)| id)
}

/// Directory name of fold `index`.
pub fn fold_dir_name(index: usize) -> String {
    format!("fold-{}", index)
}

/// File name of base ranker `run_name` restricted to fold `index`.
pub fn fold_file_name(index: usize, run_name: &str) -> String {
    format!("fold_{}_{}", index, run_name)
}

/// A set of queries used for one round of train/test separation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub index: usize,
    pub queries: BTreeSet<String>,
}

impl Fold {
    pub fn contains(&self, query: &str) -> bool {
        self.queries.contains(query)
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}

/// Assignment of every query in a universe to exactly one fold.
#[derive(Debug, Clone)]
pub struct FoldAssignment {
    folds: Vec<Fold>,
    lookup: HashMap<String, usize>,
}

impl FoldAssignment {
    /// Split `queries` into `k` folds.
    ///
    /// Queries are sorted and deduplicated first; the query at position `i`
    /// goes to fold `i mod k`.
    pub fn partition<I, S>(queries: I, k: usize) -> RankResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let universe: BTreeSet<String> = queries.into_iter().map(Into::into).collect();
        if k <= 1 || k > universe.len() {
            return Err(RankError::InvalidFoldCount {
                folds: k,
                queries: universe.len(),
            });
        }

        let mut folds: Vec<Fold> = (0..k)
            .map(|index| Fold {
                index,
                queries: BTreeSet::new(),
            })
            .collect();
        let mut lookup = HashMap::with_capacity(universe.len());

        for (position, query) in universe.into_iter().enumerate() {
            let index = position % k;
            lookup.insert(query.clone(), index);
            folds[index].queries.insert(query);
        }

        debug!(
            "Partitioned {} queries into {} folds of sizes {:?}",
            lookup.len(),
            k,
            folds.iter().map(Fold::len).collect::<Vec<_>>()
        );

        Ok(Self { folds, lookup })
    }

    pub fn k(&self) -> usize {
        self.folds.len()
    }

    pub fn folds(&self) -> &[Fold] {
        &self.folds
    }

    pub fn fold(&self, index: usize) -> Option<&Fold> {
        self.folds.get(index)
    }

    /// Fold of a raw query (composite suffix is stripped).
    pub fn fold_of(&self, raw_query: &str) -> Option<usize> {
        self.lookup.get(query_id(raw_query)).copied()
    }

    pub fn num_queries(&self) -> usize {
        self.lookup.len()
    }

    /// Write one file per fold holding only the lines of `run_path` whose
    /// query falls in that fold.
    ///
    /// Files land in `dest/fold-i/fold_i_<run name>`; the paths are returned
    /// in fold order.
    pub fn write_fold_runs(&self, run_path: &Path, dest: &Path) -> RankResult<Vec<PathBuf>> {
        let content = read_file(run_path)?;
        let run_name = run_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| RankError::MissingFile(run_path.to_path_buf()))?;

        let mut buffers = vec![String::new(); self.k()];
        for line in content.lines() {
            let Some(query) = line.split_whitespace().next() else {
                continue;
            };
            if let Some(index) = self.fold_of(query) {
                buffers[index].push_str(line.trim_end());
                buffers[index].push('\n');
            }
        }

        let mut written = Vec::with_capacity(self.k());
        for (index, buffer) in buffers.into_iter().enumerate() {
            let fold_dir = dest.join(fold_dir_name(index));
            fs::create_dir_all(&fold_dir)?;
            let path = fold_dir.join(fold_file_name(index, &run_name));
            fs::write(&path, buffer)?;
            written.push(path);
        }

        info!("Split {} into {} folds", run_name, self.k());
        Ok(written)
    }
}

/// Distinct query ids (suffix stripped) across the given run files, sorted.
pub fn collect_query_ids(paths: &[PathBuf]) -> RankResult<BTreeSet<String>> {
    let mut queries = BTreeSet::new();
    for path in paths {
        let content = read_file(path)?;
        for line in content.lines() {
            if let Some(query) = line.split_whitespace().next() {
                queries.insert(query_id(query).to_string());
            }
        }
    }
    Ok(queries)
}

#[cfg(test)]
#[path = "folds_tests.rs"]
mod tests;
