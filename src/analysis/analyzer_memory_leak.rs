use lazy_static::lazy_static;
use regex::Regex;

use crate::analysis::analyzer::SourceAnalyzer;
use crate::analysis::warnings::BugWarning;

/// Detects heap allocations with no matching release.
///
/// Per function, every assignment from an allocating call is paired
/// against a `free` of the same variable in the same body. A `return`
/// of the variable transfers ownership to the caller and downgrades
/// the finding to an informational note instead of a leak.
pub fn detect_memory_leaks(analyzer: &SourceAnalyzer) -> Vec<BugWarning> {
    let mut warnings = Vec::new();

    for function in analyzer.functions() {
        let body = analyzer.function_body(function);

        for caps in ALLOC.captures_iter(body) {
            let var = &caps[1];
            let callee = &caps[2];
            let pos = caps.get(1).map(|m| m.start()).unwrap_or(0);
            let line = analyzer.line_of_offset(function.body_start + pos);

            if is_freed(body, var) {
                continue;
            }

            if is_returned(body, var) {
                warnings.push(BugWarning::escaping_allocation(line, &function.name, var));
            } else {
                warnings.push(BugWarning::memory_leak(line, &function.name, var, callee));
            }
        }
    }

    warnings.sort_by_key(|w| w.line);
    warnings
}

lazy_static! {
    static ref ALLOC: Regex = Regex::new(
        r"\b([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(?:\([^()]*\)\s*)?(malloc|calloc|realloc|strdup)\s*\("
    )
    .expect("alloc pattern compiles");
}

fn is_freed(body: &str, var: &str) -> bool {
    Regex::new(&format!(r"\bfree\s*\(\s*{}\s*\)", regex::escape(var)))
        .map(|re| re.is_match(body))
        .unwrap_or(false)
}

fn is_returned(body: &str, var: &str) -> bool {
    Regex::new(&format!(r"\breturn\s+\(?\s*{}\b", regex::escape(var)))
        .map(|re| re.is_match(body))
        .unwrap_or(false)
}
