use c_verify::analysis::warnings::{BugKind, Severity};
use c_verify::api::{CVerify, ConfigManager};

const LEAKY: &str = r#"
void hold() {
    char* line = malloc(64);
    line[0] = '\0';
}
"#;

const SPINNING: &str = r#"
void spin() {
    for (;;) {
        poll();
    }
}
"#;

#[test]
fn test_targeted_memory_leak_analysis() {
    let verifier = CVerify::new();
    let warnings = verifier.analyze_memory_leaks(LEAKY).unwrap();

    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].kind, BugKind::MemoryLeak);
    assert_eq!(warnings[0].severity, Severity::High);
    assert_eq!(warnings[0].function.as_deref(), Some("hold"));
}

#[test]
fn test_targeted_infinite_loop_analysis() {
    let verifier = CVerify::new();
    let warnings = verifier.analyze_infinite_loops(SPINNING).unwrap();

    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].kind, BugKind::InfiniteLoop);
}

#[test]
fn test_loop_with_break_not_flagged() {
    let src = r#"
void wait_ready() {
    while (1) {
        if (ready()) {
            break;
        }
    }
}
"#;
    let verifier = CVerify::new();
    assert!(verifier.analyze_infinite_loops(src).unwrap().is_empty());
}

#[test]
fn test_targeted_buffer_overflow_analysis() {
    let src = r#"
void read_name(char* name) {
    gets(name);
}
"#;
    let verifier = CVerify::new();
    let warnings = verifier.analyze_buffer_overflows(src).unwrap();

    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].description.contains("gets"));
}

#[test]
fn test_targeted_null_pointer_analysis() {
    let src = r#"
void touch(struct Node* node) {
    node->data = 1;
}
"#;
    let verifier = CVerify::new();
    let warnings = verifier.analyze_null_pointers(src).unwrap();

    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].description.contains("node"));
}

#[test]
fn test_targeted_uninitialized_analysis() {
    let src = r#"
int total(int n) {
    int acc;
    acc += n;
    return acc;
}
"#;
    let verifier = CVerify::new();
    let warnings = verifier.analyze_uninitialized(src).unwrap();

    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].kind, BugKind::UninitializedVariable);
}

#[test]
fn test_targeted_missing_return_analysis() {
    let src = r#"
int answer() {
    int x = 42;
}
"#;
    let verifier = CVerify::new();
    let warnings = verifier.analyze_missing_returns(src).unwrap();

    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].severity, Severity::Low);
}

#[test]
fn test_disabled_detectors_return_nothing() {
    let config = ConfigManager::builder()
        .detect_memory_leak(false)
        .detect_infinite_loop(false)
        .build();
    let verifier = CVerify::with_config(config);

    assert!(verifier.analyze_memory_leaks(LEAKY).unwrap().is_empty());
    assert!(verifier.analyze_infinite_loops(SPINNING).unwrap().is_empty());

    // Detectors left enabled still run.
    let report = verifier.analyze_source("leaky.c", LEAKY).unwrap();
    assert!(!report
        .findings
        .iter()
        .any(|f| f.kind == BugKind::MemoryLeak));
}

#[test]
fn test_warnings_in_comments_are_ignored() {
    let src = r#"
void documented() {
    /* strcpy(dest, src) would overflow here */
    // while (1) { }
    int x = 0;
}
"#;
    let verifier = CVerify::new();
    let report = verifier.analyze_source("doc.c", src).unwrap();
    assert!(report.findings.is_empty(), "got: {:?}", report.findings);
}
