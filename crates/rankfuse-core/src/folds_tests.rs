use super::*;
use tempfile::TempDir;

fn queries(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("q{:03}", i)).collect()
}

#[test]
fn test_query_id_strips_suffix() {
    assert_eq!(query_id("enwiki:Coffee+Roasting"), "enwiki:Coffee");
    assert_eq!(query_id("enwiki:Coffee"), "enwiki:Coffee");
    assert_eq!(query_id("a+b+c"), "a");
}

#[test]
fn test_partition_round_robin_over_sorted_queries() {
    let assignment =
        FoldAssignment::partition(vec!["d", "b", "a", "c", "e", "b"], 2).unwrap();
    assert_eq!(assignment.k(), 2);
    assert_eq!(assignment.num_queries(), 5);

    let fold0: Vec<&str> = assignment.folds()[0].queries.iter().map(String::as_str).collect();
    let fold1: Vec<&str> = assignment.folds()[1].queries.iter().map(String::as_str).collect();
    assert_eq!(fold0, vec!["a", "c", "e"]);
    assert_eq!(fold1, vec!["b", "d"]);
}

#[test]
fn test_partition_properties_hold_for_all_k() {
    for n in 2..30 {
        let universe = queries(n);
        for k in 2..=n {
            let assignment = FoldAssignment::partition(universe.clone(), k).unwrap();
            let folds = assignment.folds();
            assert_eq!(folds.len(), k);

            let total: usize = folds.iter().map(Fold::len).sum();
            assert_eq!(total, n, "union must cover the universe (n={}, k={})", n, k);

            let mut seen = BTreeSet::new();
            for fold in folds {
                for q in &fold.queries {
                    assert!(seen.insert(q.clone()), "query {} in two folds", q);
                }
            }

            let max = folds.iter().map(Fold::len).max().unwrap();
            let min = folds.iter().map(Fold::len).min().unwrap();
            assert!(max - min <= 1, "unbalanced folds (n={}, k={})", n, k);
        }
    }
}

#[test]
fn test_partition_is_reproducible() {
    let mut shuffled = queries(17);
    shuffled.reverse();
    let a = FoldAssignment::partition(queries(17), 4).unwrap();
    let b = FoldAssignment::partition(shuffled, 4).unwrap();
    assert_eq!(a.folds(), b.folds());
}

#[test]
fn test_partition_invalid_fold_counts() {
    for k in [0, 1, 4] {
        let result = FoldAssignment::partition(queries(3), k);
        match result {
            Err(RankError::InvalidFoldCount { folds, queries }) => {
                assert_eq!(folds, k);
                assert_eq!(queries, 3);
            }
            other => panic!("Expected InvalidFoldCount, got {:?}", other),
        }
    }
}

#[test]
fn test_fold_of_uses_query_id() {
    let assignment = FoldAssignment::partition(vec!["a", "b"], 2).unwrap();
    assert_eq!(assignment.fold_of("a+section"), Some(0));
    assert_eq!(assignment.fold_of("b"), Some(1));
    assert_eq!(assignment.fold_of("z"), None);
}

#[test]
fn test_write_fold_runs() {
    let temp_dir = TempDir::new().unwrap();
    let run_path = temp_dir.path().join("bm25.run");
    std::fs::write(
        &run_path,
        "a Q0 d1 1 3.0 bm25\na+x Q0 d2 2 2.0 bm25\nb Q0 d3 1 1.0 bm25\n",
    )
    .unwrap();

    let assignment = FoldAssignment::partition(vec!["a", "b"], 2).unwrap();
    let dest = temp_dir.path().join("folds");
    let written = assignment.write_fold_runs(&run_path, &dest).unwrap();

    assert_eq!(written.len(), 2);
    assert_eq!(written[0], dest.join("fold-0").join("fold_0_bm25.run"));
    let fold0 = std::fs::read_to_string(&written[0]).unwrap();
    let fold1 = std::fs::read_to_string(&written[1]).unwrap();
    assert_eq!(fold0, "a Q0 d1 1 3.0 bm25\na+x Q0 d2 2 2.0 bm25\n");
    assert_eq!(fold1, "b Q0 d3 1 1.0 bm25\n");
}

#[test]
fn test_collect_query_ids() {
    let temp_dir = TempDir::new().unwrap();
    let a = temp_dir.path().join("a.run");
    let b = temp_dir.path().join("b.run");
    std::fs::write(&a, "q2 Q0 d1 1 1.0 a\nq1+s Q0 d1 1 1.0 a\n").unwrap();
    std::fs::write(&b, "q3 Q0 d1 1 1.0 b\n\n").unwrap();

    let ids = collect_query_ids(&[a, b]).unwrap();
    let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
    assert_eq!(ids, vec!["q1", "q2", "q3"]);
}
