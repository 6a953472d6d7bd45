use pddmat::{
    PdError,
    assembler::{self, MatrixOutcome},
    languages::LanguageSet,
    matrix_file,
    parameters::{DistanceKind, ParameterSpace, ParameterTuple},
    record::ResultRecord,
    result_store::ResultStore,
};
use std::fs;
use std::path::Path;

fn record(experiment: &str, words: u64, pair: (&str, &str), value: f64) -> ResultRecord {
    let mut languages = [pair.0.to_string(), pair.1.to_string()];
    languages.sort();
    ResultRecord {
        experiment_name: experiment.to_string(),
        word_count: words,
        embedding_dimension: 300,
        job_id: 0,
        metric: "euclidean".to_string(),
        dimension: 0,
        distance_kind: DistanceKind::Bottleneck,
        languages,
        value,
    }
}

fn space() -> ParameterSpace {
    let metrics = ["euclidean".to_string()];
    ParameterSpace::enumerate(&metrics, &[0], &[DistanceKind::Bottleneck]).unwrap()
}

fn tuple() -> ParameterTuple {
    ParameterTuple::new("euclidean", 0, DistanceKind::Bottleneck)
}

fn languages() -> LanguageSet {
    LanguageSet::new(["a", "b", "c"]).unwrap()
}

fn merge(data: &Path, out: &Path) -> Result<assembler::MergeSummary, PdError> {
    assembler::merge("exp", 1000, space(), languages(), data, out)
}

#[test]
fn test_missing_pair_reports_one_cell_and_writes_nothing() -> Result<(), PdError> {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let store = ResultStore::new(data.path(), "exp");
    store.write_batch(
        0,
        &[record("exp", 1000, ("b", "a"), 0.25), record("exp", 1000, ("c", "a"), 0.5)],
    )?;

    let summary = merge(data.path(), out.path())?;

    assert_eq!(
        summary.outcome(&tuple()),
        Some(&MatrixOutcome::Rejected { missing: 1, conflicts: 0 })
    );
    assert_eq!(fs::read_dir(out.path())?.count(), 0, "no matrix file may be emitted");
    Ok(())
}

#[test]
fn test_complete_matrix_layout() -> Result<(), PdError> {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let store = ResultStore::new(data.path(), "exp");
    // Spread over two batches, in no particular order.
    store.write_batch(1, &[record("exp", 1000, ("c", "b"), 0.75)])?;
    store.write_batch(
        0,
        &[record("exp", 1000, ("a", "c"), 0.5), record("exp", 1000, ("b", "a"), 0.25)],
    )?;

    let summary = merge(data.path(), out.path())?;
    assert!(summary.all_written());
    assert_eq!(summary.artifacts, 2);
    assert_eq!(summary.records, 3);

    let expected_path = out.path().join("pddmat.exp.n1000.euclidean.bottleneck.d0.txt");
    assert_eq!(
        summary.outcome(&tuple()),
        Some(&MatrixOutcome::Written { path: expected_path.clone() })
    );
    let text = fs::read_to_string(&expected_path)?;
    assert_eq!(text, "a b c\n0.2500000000\n0.5000000000 0.7500000000\n");
    Ok(())
}

#[test]
fn test_word_count_disagreement_is_fatal_before_writing() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let store = ResultStore::new(data.path(), "exp");
    store
        .write_batch(
            0,
            &[record("exp", 1000, ("b", "a"), 0.25), record("exp", 1000, ("c", "a"), 0.5)],
        )
        .unwrap();
    store.write_batch(1, &[record("exp", 2000, ("c", "b"), 0.75)]).unwrap();

    let result = merge(data.path(), out.path());

    assert!(matches!(result, Err(PdError::Consistency { .. })));
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn test_corrupt_artifact_aborts_merge() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let store = ResultStore::new(data.path(), "exp");
    store
        .write_batch(0, &[record("exp", 1000, ("b", "a"), 0.25)])
        .unwrap();
    fs::write(store.artifact_path(1), b"[{\"truncated\": ").unwrap();

    let result = merge(data.path(), out.path());
    assert!(matches!(result, Err(PdError::CorruptArtifact { .. })));
}

#[test]
fn test_unrequested_tuples_do_not_block_requested_ones() -> Result<(), PdError> {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let store = ResultStore::new(data.path(), "exp");
    let mut other = record("exp", 1000, ("b", "a"), 9.0);
    other.metric = "cosine".to_string();
    store.write_batch(
        0,
        &[
            record("exp", 1000, ("b", "a"), 0.25),
            record("exp", 1000, ("c", "a"), 0.5),
            record("exp", 1000, ("c", "b"), 0.75),
            other,
        ],
    )?;

    let summary = merge(data.path(), out.path())?;
    assert!(summary.all_written());
    assert_eq!(summary.ignored, 1);
    assert_eq!(summary.outcomes.len(), 1);
    Ok(())
}

#[test]
fn test_repeated_merge_is_byte_identical() -> Result<(), PdError> {
    let data = tempfile::tempdir().unwrap();
    let store = ResultStore::new(data.path(), "exp");
    store.write_batch(
        0,
        &[
            record("exp", 1000, ("b", "a"), 0.1 + 0.2),
            record("exp", 1000, ("c", "a"), 1.0 / 3.0),
        ],
    )?;
    // A retried worker re-wrote an identical record into another batch.
    store.write_batch(
        1,
        &[
            record("exp", 1000, ("c", "b"), 2.0 / 3.0),
            record("exp", 1000, ("a", "b"), 0.1 + 0.2),
        ],
    )?;

    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    merge(data.path(), first.path())?;
    merge(data.path(), second.path())?;

    let name = "pddmat.exp.n1000.euclidean.bottleneck.d0.txt";
    let a = fs::read(first.path().join(name))?;
    let b = fs::read(second.path().join(name))?;
    assert_eq!(a, b);

    let loaded = matrix_file::read_matrix(&first.path().join(name))?;
    assert_eq!(loaded.labels, vec!["a", "b", "c"]);
    assert!((loaded.get(2, 1) - 2.0 / 3.0).abs() < 1e-10);
    Ok(())
}

#[test]
fn test_conflicting_duplicate_is_reported() -> Result<(), PdError> {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let store = ResultStore::new(data.path(), "exp");
    store.write_batch(
        0,
        &[
            record("exp", 1000, ("b", "a"), 0.25),
            record("exp", 1000, ("c", "a"), 0.5),
            record("exp", 1000, ("c", "b"), 0.75),
        ],
    )?;
    store.write_batch(1, &[record("exp", 1000, ("b", "a"), 0.3)])?;

    let summary = merge(data.path(), out.path())?;
    assert_eq!(
        summary.outcome(&tuple()),
        Some(&MatrixOutcome::Rejected { missing: 0, conflicts: 1 })
    );
    assert_eq!(fs::read_dir(out.path())?.count(), 0);
    Ok(())
}

#[test]
fn test_incomplete_tuple_does_not_block_complete_one() -> Result<(), PdError> {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let store = ResultStore::new(data.path(), "exp");
    let in_dimension_one = |pair: (&'static str, &'static str), value: f64| {
        let mut r = record("exp", 1000, pair, value);
        r.dimension = 1;
        r
    };
    store.write_batch(
        0,
        &[
            record("exp", 1000, ("b", "a"), 0.25),
            record("exp", 1000, ("c", "a"), 0.5),
            record("exp", 1000, ("c", "b"), 0.75),
            in_dimension_one(("b", "a"), 1.25),
            in_dimension_one(("c", "b"), 1.75),
        ],
    )?;
    let metrics = ["euclidean".to_string()];
    let space = ParameterSpace::enumerate(&metrics, &[0, 1], &[DistanceKind::Bottleneck])?;

    let summary = assembler::merge("exp", 1000, space, languages(), data.path(), out.path())?;

    let complete = out.path().join("pddmat.exp.n1000.euclidean.bottleneck.d0.txt");
    assert_eq!(summary.outcome(&tuple()), Some(&MatrixOutcome::Written { path: complete.clone() }));
    assert_eq!(
        summary.outcome(&ParameterTuple::new("euclidean", 1, DistanceKind::Bottleneck)),
        Some(&MatrixOutcome::Rejected { missing: 1, conflicts: 0 })
    );
    assert!(!summary.all_written());
    let written: Vec<_> = fs::read_dir(out.path())?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<_, _>>()?;
    assert_eq!(written, vec![complete]);
    Ok(())
}

#[test]
fn test_experiment_sharing_the_prefix_is_not_merged() -> Result<(), PdError> {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    ResultStore::new(data.path(), "exp").write_batch(
        0,
        &[
            record("exp", 1000, ("b", "a"), 0.25),
            record("exp", 1000, ("c", "a"), 0.5),
            record("exp", 1000, ("c", "b"), 0.75),
        ],
    )?;
    ResultStore::new(data.path(), "exp.partial")
        .write_batch(0, &[record("exp.partial", 1000, ("b", "a"), 9.0)])?;

    let summary = merge(data.path(), out.path())?;
    assert!(summary.all_written());
    assert_eq!(summary.artifacts, 1);
    Ok(())
}
