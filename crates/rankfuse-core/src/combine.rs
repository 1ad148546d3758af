//! Weight-combiner: applies a learned weight vector to a feature file.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use rankfuse_config::{CombineConfig, DimensionPolicy, ZeroScorePolicy};
use tracing::{debug, info, warn};

use crate::error::{read_file, RankError, RankResult};
use crate::features::FeatureFile;
use crate::types::FusedRunEntry;

/// Feature index to learned weight.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightVector {
    weights: BTreeMap<usize, f64>,
}

impl WeightVector {
    pub fn new(weights: impl IntoIterator<Item = (usize, f64)>) -> Self {
        Self {
            weights: weights.into_iter().collect(),
        }
    }

    /// Read `index:weight` tokens; lines starting with `#` are ignored.
    pub fn read(path: &Path) -> RankResult<Self> {
        let content = read_file(path)?;
        Self::parse(&content, path)
    }

    pub fn parse(content: &str, origin: &Path) -> RankResult<Self> {
        let mut weights = BTreeMap::new();
        for (lineno, line) in content.lines().enumerate() {
            if line.trim_start().starts_with('#') {
                continue;
            }
            for token in line.split_whitespace() {
                let (index, weight) = token
                    .split_once(':')
                    .and_then(|(i, w)| Some((i.parse::<usize>().ok()?, w.parse::<f64>().ok()?)))
                    .ok_or_else(|| {
                        RankError::malformed(origin, lineno + 1, format!("bad weight token '{}'", token))
                    })?;
                weights.insert(index, weight);
            }
        }
        Ok(Self { weights })
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.weights.get(&index).copied()
    }

    /// Number of weighted features.
    pub fn dimension(&self) -> usize {
        self.weights.len()
    }

    /// Dot product with `(index, value)` pairs; missing weights count as 0.0.
    pub fn dot(&self, features: &[(usize, f64)]) -> f64 {
        features
            .iter()
            .map(|(index, value)| self.get(*index).unwrap_or(0.0) * value)
            .sum()
    }

    fn covers(&self, features: &[(usize, f64)]) -> bool {
        features.len() == self.weights.len()
            && features.iter().all(|(index, _)| self.weights.contains_key(index))
    }
}

/// Counts from one combination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CombineStats {
    pub queries: usize,
    pub written: usize,
    pub dropped_zero: usize,
}

/// Turns (feature file, weight vector) into a fused run.
pub struct Combiner {
    config: CombineConfig,
}

impl Combiner {
    pub fn new(config: CombineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CombineConfig {
        &self.config
    }

    /// Score, group, sort and rank every row of `features`.
    ///
    /// Queries keep their first-seen order. Within a query, documents are
    /// ordered by score then document id, both descending, and ranked from 0.
    pub fn combine(
        &self,
        features: &FeatureFile,
        weights: &WeightVector,
        context: &str,
    ) -> RankResult<(Vec<FusedRunEntry>, CombineStats)> {
        let mut order: Vec<&str> = Vec::new();
        let mut scores: HashMap<&str, HashMap<&str, f64>> = HashMap::new();
        let mut warned = false;

        for line in features.lines() {
            if !weights.covers(&line.features) {
                match self.config.dimensions {
                    DimensionPolicy::Strict => {
                        return Err(RankError::FeatureDimensionMismatch {
                            expected: line.features.len(),
                            found: weights.dimension(),
                            context: context.to_string(),
                        });
                    }
                    DimensionPolicy::Lenient if !warned => {
                        warn!(
                            "Weights ({}) do not match features ({}) in {}; missing weights count as 0",
                            weights.dimension(),
                            line.features.len(),
                            context
                        );
                        warned = true;
                    }
                    DimensionPolicy::Lenient => {}
                }
            }

            let score = weights.dot(&line.features);
            let docs = scores.entry(line.query.as_str()).or_insert_with(|| {
                order.push(line.query.as_str());
                HashMap::new()
            });
            docs.insert(line.document.as_str(), score);
        }

        let mut stats = CombineStats {
            queries: order.len(),
            ..Default::default()
        };
        let mut fused = Vec::new();
        for query in order {
            let mut ranked: Vec<(&str, f64)> = scores[query].iter().map(|(d, s)| (*d, *s)).collect();
            ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| b.0.cmp(a.0)));

            let mut rank = 0;
            for (document, score) in ranked {
                if score == 0.0 && self.config.zero_score == ZeroScorePolicy::Drop {
                    stats.dropped_zero += 1;
                    continue;
                }
                fused.push(FusedRunEntry {
                    query: query.to_string(),
                    document: document.to_string(),
                    rank,
                    score,
                });
                rank += 1;
            }
        }
        stats.written = fused.len();

        if stats.dropped_zero > 0 {
            debug!("Dropped {} zero-score documents from {}", stats.dropped_zero, context);
        }
        Ok((fused, stats))
    }

    /// File-to-file combination.
    pub fn combine_files(
        &self,
        feature_path: &Path,
        weight_path: &Path,
        output_path: &Path,
    ) -> RankResult<CombineStats> {
        let weights = WeightVector::read(weight_path)?;
        debug!("The weight vector is {:?}", weights.weights);
        let features = FeatureFile::read(feature_path)?;

        let context = feature_path.display().to_string();
        let (fused, stats) = self.combine(&features, &weights, &context)?;

        let mut out = String::new();
        for entry in &fused {
            out.push_str(&entry.to_line(&self.config.collection_tag, &self.config.run_tag));
            out.push('\n');
        }
        fs::write(output_path, out)?;

        info!(
            "Combined run file written to {} ({} lines)",
            output_path.display(),
            stats.written
        );
        Ok(stats)
    }
}

#[cfg(test)]
#[path = "combine_tests.rs"]
mod tests;
