use lazy_static::lazy_static;
use regex::Regex;

use crate::analysis::analyzer::SourceAnalyzer;
use crate::analysis::warnings::BugWarning;

/// Detects scalar variables read before their first assignment.
///
/// A declaration without an initializer starts the variable in an
/// indeterminate state; any use that reads the value (compound
/// assignment, increment, or appearance in an expression) before a
/// plain assignment is flagged.
pub fn detect_uninitialized_reads(analyzer: &SourceAnalyzer) -> Vec<BugWarning> {
    let mut warnings = Vec::new();

    for function in analyzer.functions() {
        let body = analyzer.function_body(function);

        for caps in BARE_DECL.captures_iter(body) {
            let var = &caps[2];
            let decl_end = caps.get(0).map(|m| m.end()).unwrap_or(0);
            let decl_pos = caps.get(2).map(|m| m.start()).unwrap_or(0);
            let rest = &body[decl_end..];

            if let Some(read_offset) = first_read_before_write(rest, var) {
                let decl_line = analyzer.line_of_offset(function.body_start + decl_pos);
                let read_line =
                    analyzer.line_of_offset(function.body_start + decl_end + read_offset);
                warnings.push(BugWarning::uninitialized(
                    decl_line,
                    &function.name,
                    var,
                    read_line,
                ));
            }
        }
    }

    warnings.sort_by_key(|w| w.line);
    warnings
}

lazy_static! {
    static ref BARE_DECL: Regex = Regex::new(
        r"\b(int|long|short|unsigned|float|double|char|size_t)\s+([A-Za-z_][A-Za-z0-9_]*)\s*;"
    )
    .expect("declaration pattern compiles");
}

/// Offset of the first read of `var`, unless a plain write comes first.
fn first_read_before_write(text: &str, var: &str) -> Option<usize> {
    let v = regex::escape(var);
    let usage = match Regex::new(&format!(r"\b{}\b", v)) {
        Ok(re) => re,
        Err(_) => return None,
    };

    for m in usage.find_iter(text) {
        let after = text[m.end()..].trim_start();
        if after.starts_with("==") {
            return Some(m.start()); // comparison reads the value
        }
        if after.starts_with('=') {
            return None; // plain assignment writes first
        }
        if is_address_taken(text, m.start()) {
            return None; // &var usually means it is written through
        }
        return Some(m.start());
    }
    None
}

fn is_address_taken(text: &str, var_start: usize) -> bool {
    text[..var_start]
        .trim_end()
        .ends_with('&')
        // `a && var` is a read, not an address-of
        && !text[..var_start].trim_end().ends_with("&&")
}
