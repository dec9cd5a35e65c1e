use std::fs;

use c_verify::analysis::warnings::BugKind;
use c_verify::api::CVerify;
use c_verify::classify::BugClassifier;
use c_verify::db::BugStore;

const LEAKY: &str = r#"
void hold() {
    int* slot = malloc(sizeof(int));
    *slot = 7;
}
"#;

const SPINNING: &str = r#"
void spin() {
    while (1) {
        tick();
    }
}
"#;

#[test]
fn test_analyze_and_record_to_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("history.db");
    let src_path = dir.path().join("leaky.c");
    fs::write(&src_path, LEAKY).unwrap();

    let store = BugStore::open(&db_path).unwrap();
    let verifier = CVerify::new();
    let report = verifier.analyze_and_record(&store, &src_path).unwrap();

    assert!(!report.findings.is_empty());
    assert_eq!(store.sample_count().unwrap(), 1);

    // Reopen the same file to check persistence.
    drop(store);
    let reopened = BugStore::open(&db_path).unwrap();
    let samples = reopened.code_samples().unwrap();
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].file_name, "leaky.c");
    assert!(samples[0].has_bugs);
    assert_eq!(samples[0].bugs.len(), report.findings.len());
}

#[test]
fn test_history_query_by_kind() {
    let dir = tempfile::tempdir().unwrap();
    let spin_path = dir.path().join("spin.c");
    fs::write(&spin_path, SPINNING).unwrap();

    let store = BugStore::open_in_memory().unwrap();
    let verifier = CVerify::new();
    verifier.analyze_and_record(&store, &spin_path).unwrap();

    let loops = store.bugs_by_kind(&BugKind::InfiniteLoop).unwrap();
    assert_eq!(loops.len(), 1);
    assert!(store.bugs_by_kind(&BugKind::MemoryLeak).unwrap().is_empty());
}

#[test]
fn test_train_from_recorded_history() {
    let dir = tempfile::tempdir().unwrap();
    let leak_path = dir.path().join("leaky.c");
    let spin_path = dir.path().join("spin.c");
    fs::write(&leak_path, LEAKY).unwrap();
    fs::write(&spin_path, SPINNING).unwrap();

    let store = BugStore::open_in_memory().unwrap();
    let verifier = CVerify::new();
    verifier.analyze_and_record(&store, &leak_path).unwrap();
    verifier.analyze_and_record(&store, &spin_path).unwrap();

    let samples = store.training_samples().unwrap();
    assert_eq!(samples.len(), 2);

    let mut classifier = BugClassifier::new(0.1);
    classifier.train(&samples).unwrap();
    assert!(classifier.is_trained());

    let predictions = classifier
        .predict("void f() { char* p = malloc(16); *p = 'x'; }")
        .unwrap();
    assert!(!predictions.is_empty());
    assert!(predictions.iter().any(|p| p.kind == BugKind::MemoryLeak));
}

#[test]
fn test_model_survives_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let model_path = dir.path().join("model.json");

    let store = BugStore::open_in_memory().unwrap();
    let leak_path = dir.path().join("leaky.c");
    fs::write(&leak_path, LEAKY).unwrap();
    CVerify::new().analyze_and_record(&store, &leak_path).unwrap();

    let mut classifier = BugClassifier::new(0.1);
    classifier.train(&store.training_samples().unwrap()).unwrap();
    classifier.save_to_file(&model_path).unwrap();

    let loaded = BugClassifier::load_from_file(&model_path).unwrap();
    assert!(loaded.is_trained());
}
