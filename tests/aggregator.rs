use burstperm::data::{BatchStatus, CsvConnector, DatasetAggregator, SchemaValidator};
use burstperm::error::BurstPermError;
use std::fs;
use std::path::Path;

fn write_labeled_batch(path: &Path, rows: usize, with_horizon: bool) {
    let mut contents = String::from(
        "Ticker,Date,BurstID,Direction,StartTime,EndTime,StartPrice,PeakPrice,EndPrice,CloseMid,Volume,TradeCount",
    );
    if with_horizon {
        contents.push_str(",Mid_1m");
    }
    contents.push_str(",Perm_tCLOSE\n");

    for i in 0..rows {
        contents.push_str(&format!(
            "NVDA,2024-03-05,{},1,34200.0,34210.0,10.0,12.0,11.0,11.5,200,4",
            i
        ));
        if with_horizon {
            contents.push_str(",11.2");
        }
        contents.push_str(",0.75\n");
    }

    fs::write(path, contents).unwrap();
}

fn write_unlabeled_batch(path: &Path) {
    let contents = "Ticker,Date,BurstID,Direction,StartTime,EndTime,StartPrice,PeakPrice,EndPrice,CloseMid,Volume,TradeCount\n\
        NVDA,2024-03-05,1,1,34200.0,34210.0,10.0,12.0,11.0,11.5,200,4\n";
    fs::write(path, contents).unwrap();
}

#[test]
fn test_aggregate_includes_labeled_and_excludes_unlabeled() {
    let dir = tempfile::tempdir().unwrap();
    let labeled_a = dir.path().join("bursts_a.csv");
    let labeled_b = dir.path().join("bursts_b.csv");
    let unlabeled = dir.path().join("bursts_c.csv");
    write_labeled_batch(&labeled_a, 3, true);
    write_labeled_batch(&labeled_b, 2, false);
    write_unlabeled_batch(&unlabeled);

    let paths = vec![labeled_a, labeled_b, unlabeled];
    let aggregate = DatasetAggregator::aggregate(&paths).unwrap();

    // Aggregate row count equals the sum of qualifying batches' row counts.
    assert_eq!(aggregate.frame.height(), 5);

    let loaded = aggregate
        .reports
        .iter()
        .filter(|r| matches!(r.status, BatchStatus::Loaded { .. }))
        .count();
    assert_eq!(loaded, 2);

    let skipped: Vec<_> = aggregate
        .reports
        .iter()
        .filter(|r| matches!(r.status, BatchStatus::Skipped { .. }))
        .collect();
    assert_eq!(skipped.len(), 1);
    assert!(skipped[0].path.contains("bursts_c.csv"));
    assert!(skipped[0].to_string().contains("no Perm_tCLOSE column"));
}

#[test]
fn test_aggregate_tags_provenance_per_row() {
    let dir = tempfile::tempdir().unwrap();
    let labeled_a = dir.path().join("bursts_a.csv");
    let labeled_b = dir.path().join("bursts_b.csv");
    write_labeled_batch(&labeled_a, 2, false);
    write_labeled_batch(&labeled_b, 1, false);

    let paths = vec![labeled_a.clone(), labeled_b.clone()];
    let aggregate = DatasetAggregator::aggregate(&paths).unwrap();

    let source = aggregate.frame.column("source").unwrap();
    let source = source.str().unwrap();
    assert_eq!(source.get(0).unwrap(), labeled_a.display().to_string());
    assert_eq!(source.get(1).unwrap(), labeled_a.display().to_string());
    assert_eq!(source.get(2).unwrap(), labeled_b.display().to_string());
}

#[test]
fn test_aggregate_reconciles_horizon_schemas() {
    let dir = tempfile::tempdir().unwrap();
    let with_horizon = dir.path().join("bursts_a.csv");
    let without_horizon = dir.path().join("bursts_b.csv");
    write_labeled_batch(&with_horizon, 2, true);
    write_labeled_batch(&without_horizon, 2, false);

    let paths = vec![with_horizon, without_horizon];
    let aggregate = DatasetAggregator::aggregate(&paths).unwrap();

    // The union schema keeps Mid_1m; rows from the other batch are null.
    assert!(SchemaValidator::has_column(&aggregate.frame, "Mid_1m"));
    let mid = aggregate.frame.column("Mid_1m").unwrap();
    assert_eq!(mid.null_count(), 2);
}

#[test]
fn test_zero_qualifying_batches_is_distinct_from_empty_frame() {
    let dir = tempfile::tempdir().unwrap();
    let unlabeled = dir.path().join("bursts_c.csv");
    write_unlabeled_batch(&unlabeled);

    let result = DatasetAggregator::aggregate(&[unlabeled]);
    match result {
        Err(BurstPermError::EmptyInput(msg)) => {
            assert!(msg.contains("bursts_c.csv"));
        }
        other => panic!("expected EmptyInput, got {:?}", other),
    }
}

#[test]
fn test_discover_matches_only_the_pattern() {
    let dir = tempfile::tempdir().unwrap();
    write_labeled_batch(&dir.path().join("bursts_a.csv"), 1, false);
    write_labeled_batch(&dir.path().join("other_a.csv"), 1, false);

    let pattern = dir.path().join("bursts_*.csv");
    let paths = DatasetAggregator::discover(pattern.to_str().unwrap()).unwrap();
    assert_eq!(paths.len(), 1);
    assert!(paths[0].to_string_lossy().contains("bursts_a.csv"));

    // Loading a discovered batch round-trips through the connector.
    let df = CsvConnector::load(&paths[0]).unwrap();
    assert_eq!(df.height(), 1);
}
