//! Leave-one-fold-out training sets.

use std::collections::{BTreeSet, VecDeque};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// A training set built from every fold but one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingSet {
    /// Fold left out of this set.
    pub excluded: usize,
    /// Folds concatenated into the set, in concatenation order.
    pub window: Vec<usize>,
}

/// Training sets for `k` folds by cyclic rotation.
///
/// Rotation `r` takes the first `k - 1` indices of `[0, k)` rotated left `r`
/// times, so rotation 0 leaves out `k - 1` and rotation `r > 0` leaves out
/// `r - 1`. Each fold is excluded by exactly one set.
pub fn leave_one_out_sets(k: usize) -> Vec<TrainingSet> {
    if k < 2 {
        return Vec::new();
    }

    let mut ring: VecDeque<usize> = (0..k).collect();
    let mut sets = Vec::with_capacity(k);

    for _ in 0..k {
        let window: Vec<usize> = ring.iter().take(k - 1).copied().collect();
        let members: BTreeSet<usize> = window.iter().copied().collect();
        if let Some(excluded) = (0..k).find(|i| !members.contains(i)) {
            sets.push(TrainingSet { excluded, window });
        }
        ring.rotate_left(1);
    }

    sets
}

/// Append `inputs` byte for byte into `output`. Returns bytes written.
pub fn concat_files(inputs: &[PathBuf], output: &Path) -> io::Result<u64> {
    let mut writer = BufWriter::new(File::create(output)?);
    let mut total = 0;
    for input in inputs {
        let mut reader = fs::File::open(input)?;
        total += io::copy(&mut reader, &mut writer)?;
    }
    writer.flush()?;
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_five_fold_rotation() {
        let sets = leave_one_out_sets(5);
        assert_eq!(sets.len(), 5);
        assert_eq!(sets[0], TrainingSet { excluded: 4, window: vec![0, 1, 2, 3] });
        assert_eq!(sets[1], TrainingSet { excluded: 0, window: vec![1, 2, 3, 4] });
        assert_eq!(sets[2], TrainingSet { excluded: 1, window: vec![2, 3, 4, 0] });
        assert_eq!(sets[4], TrainingSet { excluded: 3, window: vec![4, 0, 1, 2] });
    }

    #[test]
    fn test_every_fold_excluded_once() {
        for k in 2..12 {
            let sets = leave_one_out_sets(k);
            let excluded: BTreeSet<usize> = sets.iter().map(|s| s.excluded).collect();
            assert_eq!(excluded, (0..k).collect::<BTreeSet<_>>());
            for set in &sets {
                assert_eq!(set.window.len(), k - 1);
                assert!(!set.window.contains(&set.excluded));
            }
        }
    }

    #[test]
    fn test_two_folds() {
        let sets = leave_one_out_sets(2);
        assert_eq!(sets[0], TrainingSet { excluded: 1, window: vec![0] });
        assert_eq!(sets[1], TrainingSet { excluded: 0, window: vec![1] });
    }

    #[test]
    fn test_degenerate_k() {
        assert!(leave_one_out_sets(0).is_empty());
        assert!(leave_one_out_sets(1).is_empty());
    }

    #[test]
    fn test_concat_preserves_order_and_bytes() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a.txt");
        let b = temp.path().join("b.txt");
        fs::write(&a, "0 qid:1 1:1 #q1_d1\n").unwrap();
        fs::write(&b, "1 qid:1 1:2 #q2_d2\n").unwrap();

        let out = temp.path().join("out.txt");
        let written = concat_files(&[b.clone(), a.clone()], &out).unwrap();

        assert_eq!(
            fs::read_to_string(&out).unwrap(),
            "1 qid:1 1:2 #q2_d2\n0 qid:1 1:1 #q1_d1\n"
        );
        assert_eq!(written, 38);
    }

    #[test]
    fn test_concat_missing_input() {
        let temp = TempDir::new().unwrap();
        let result = concat_files(&[temp.path().join("nope")], &temp.path().join("out"));
        assert!(result.is_err());
    }
}
