use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

use crate::analysis::analyzer::SourceAnalyzer;
use crate::analysis::warnings::BugWarning;

/// Detects pointer dereferences with no preceding NULL check.
///
/// This module focuses on identifying:
/// 1. `p->member` accesses where `p` is never compared against NULL
/// 2. Unary `*p` dereferences in assignment or argument position
///
/// The guard search is per function: a comparison or truthiness test of
/// the pointer anywhere earlier in the same body counts as a check.
pub fn detect_null_dereferences(analyzer: &SourceAnalyzer) -> Vec<BugWarning> {
    let mut warnings = Vec::new();

    for function in analyzer.functions() {
        let body = analyzer.function_body(function);
        let mut reported: HashSet<String> = HashSet::new();

        for caps in ARROW_DEREF.captures_iter(body) {
            let var = &caps[1];
            let pos = caps.get(1).map(|m| m.start()).unwrap_or(0);
            if reported.contains(var) || is_guarded(body, var, pos) {
                continue;
            }
            let line = analyzer.line_of_offset(function.body_start + pos);
            warnings.push(BugWarning::null_pointer(line, &function.name, var));
            reported.insert(var.to_string());
        }

        for caps in STAR_DEREF.captures_iter(body) {
            let var = &caps[1];
            let pos = caps.get(1).map(|m| m.start()).unwrap_or(0);
            if reported.contains(var) || is_guarded(body, var, pos) {
                continue;
            }
            // Only pointer-typed names matter; without type tracking,
            // require the name to also appear with a pointer operator.
            if !looks_like_pointer(body, var) {
                continue;
            }
            let line = analyzer.line_of_offset(function.body_start + pos);
            warnings.push(BugWarning::null_pointer(line, &function.name, var));
            reported.insert(var.to_string());
        }
    }

    warnings.sort_by_key(|w| w.line);
    warnings
}

lazy_static! {
    static ref ARROW_DEREF: Regex =
        Regex::new(r"\b([A-Za-z_][A-Za-z0-9_]*)\s*->").expect("arrow pattern compiles");
    static ref STAR_DEREF: Regex =
        Regex::new(r"[=(,;]\s*\*\s*([A-Za-z_][A-Za-z0-9_]*)\b").expect("star pattern compiles");
}

/// Whether the pointer is checked against NULL before the dereference.
///
/// Accepted guard forms: `p != NULL`, `p == NULL`, `if (p)`, `while (p)`,
/// `p &&`, and `assert(p`.
fn is_guarded(body: &str, var: &str, before: usize) -> bool {
    let window = &body[..before];
    let v = regex::escape(var);
    let patterns = [
        format!(r"\b{}\s*!=\s*NULL", v),
        format!(r"\b{}\s*==\s*NULL", v),
        format!(r"\bif\s*\(\s*{}\s*[\)&]", v),
        format!(r"\bwhile\s*\(\s*{}\s*[\)&]", v),
        format!(r"\b{}\s*&&", v),
        format!(r"\bassert\s*\(\s*{}\b", v),
    ];
    patterns
        .iter()
        .any(|p| Regex::new(p).map(|re| re.is_match(window)).unwrap_or(false))
}

fn looks_like_pointer(body: &str, var: &str) -> bool {
    let v = regex::escape(var);
    Regex::new(&format!(r"\*\s*{}\b|\b{}\s*=\s*(?:malloc|calloc|NULL)\b", v, v))
        .map(|re| re.is_match(body))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_unguarded_arrow_deref() {
        let src = r#"
void print_list(struct Node* head) {
    struct Node* current = head;
    while (current->next != NULL) {
        printf("%d ", current->data);
        current = current->next;
    }
}
"#;
        let analyzer = SourceAnalyzer::new("list.c", src);
        let warnings = detect_null_dereferences(&analyzer);

        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].description.contains("current"));
        assert_eq!(warnings[0].line, 4);
    }

    #[test]
    fn test_guarded_deref_not_flagged() {
        let src = r#"
void print_list(struct Node* head) {
    struct Node* current = head;
    while (current != NULL) {
        printf("%d ", current->data);
        current = current->next;
    }
}
"#;
        let analyzer = SourceAnalyzer::new("list.c", src);
        let warnings = detect_null_dereferences(&analyzer);

        assert!(warnings.is_empty(), "got: {:?}", warnings);
    }

    #[test]
    fn test_if_guard_accepted() {
        let src = r#"
void use(struct Node* node) {
    if (node) {
        node->data = 1;
    }
}
"#;
        let analyzer = SourceAnalyzer::new("guard.c", src);
        assert!(detect_null_dereferences(&analyzer).is_empty());
    }

    #[test]
    fn test_star_deref_of_allocated_pointer() {
        let src = r#"
void fill() {
    int* ptr = malloc(sizeof(int));
    *ptr = 42;
}
"#;
        let analyzer = SourceAnalyzer::new("star.c", src);
        let warnings = detect_null_dereferences(&analyzer);

        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].description.contains("ptr"));
    }

    #[test]
    fn test_multiplication_not_flagged() {
        let src = r#"
int scale(int a, int b) {
    int r = a * b;
    return r;
}
"#;
        let analyzer = SourceAnalyzer::new("mul.c", src);
        assert!(detect_null_dereferences(&analyzer).is_empty());
    }
}
