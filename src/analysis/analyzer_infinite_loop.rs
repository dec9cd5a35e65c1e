use lazy_static::lazy_static;
use regex::Regex;

use crate::analysis::analyzer::SourceAnalyzer;
use crate::analysis::functions::matching_brace;
use crate::analysis::warnings::BugWarning;

/// Detects loops that can never terminate.
///
/// Flags `while (1)`, `while (true)` and `for (;;)` whose body contains
/// no `break`, `return`, `goto` or `exit` call. Loops that are
/// unconditional by construction but leave through one of those paths
/// are accepted.
pub fn detect_infinite_loops(analyzer: &SourceAnalyzer) -> Vec<BugWarning> {
    let mut warnings = Vec::new();

    for function in analyzer.functions() {
        let body = analyzer.function_body(function);

        for m in UNCONDITIONAL_LOOP.find_iter(body) {
            let loop_body = match loop_body_after(body, m.end()) {
                Some(text) => text,
                None => continue,
            };

            if !HAS_EXIT.is_match(loop_body) {
                let line = analyzer.line_of_offset(function.body_start + m.start());
                warnings.push(BugWarning::infinite_loop(line, &function.name));
            }
        }
    }

    warnings.sort_by_key(|w| w.line);
    warnings
}

lazy_static! {
    static ref UNCONDITIONAL_LOOP: Regex =
        Regex::new(r"\bwhile\s*\(\s*(?:1|true)\s*\)|\bfor\s*\(\s*;\s*;\s*\)")
            .expect("loop pattern compiles");
    static ref HAS_EXIT: Regex =
        Regex::new(r"\b(?:break|return|goto)\b|\bexit\s*\(").expect("exit pattern compiles");
}

/// Body text of the loop starting right after its closing parenthesis.
///
/// A braced body runs to the matching brace; an unbraced body is the
/// single statement up to the next semicolon.
fn loop_body_after(body: &str, after: usize) -> Option<&str> {
    let rest = &body[after..];
    let first = rest.find(|c: char| !c.is_whitespace())?;
    if rest.as_bytes().get(first) == Some(&b'{') {
        let close = matching_brace(rest, first)?;
        Some(&rest[first + 1..close])
    } else {
        let end = rest[first..].find(';')?;
        Some(&rest[first..first + end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_while_one() {
        let src = r#"
void infinite_counter() {
    int count = 0;
    while (1) {
        count++;
        printf("%d\n", count);
    }
}
"#;
        let analyzer = SourceAnalyzer::new("spin.c", src);
        let warnings = detect_infinite_loops(&analyzer);

        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].line, 4);
    }

    #[test]
    fn test_loop_with_break_not_flagged() {
        let src = r#"
void poll() {
    while (1) {
        if (done()) {
            break;
        }
    }
}
"#;
        let analyzer = SourceAnalyzer::new("poll.c", src);
        assert!(detect_infinite_loops(&analyzer).is_empty());
    }

    #[test]
    fn test_for_semicolons() {
        let src = r#"
void run() {
    for (;;) {
        tick();
    }
}
"#;
        let analyzer = SourceAnalyzer::new("forever.c", src);
        assert_eq!(detect_infinite_loops(&analyzer).len(), 1);
    }

    #[test]
    fn test_loop_with_return_not_flagged() {
        let src = r#"
int wait_for_event() {
    while (true) {
        int e = next_event();
        if (e != 0) {
            return e;
        }
    }
}
"#;
        let analyzer = SourceAnalyzer::new("wait.c", src);
        assert!(detect_infinite_loops(&analyzer).is_empty());
    }

    #[test]
    fn test_bounded_loop_not_flagged() {
        let src = r#"
void count_to(int n) {
    int i = 0;
    while (i < n) {
        i++;
    }
}
"#;
        let analyzer = SourceAnalyzer::new("bounded.c", src);
        assert!(detect_infinite_loops(&analyzer).is_empty());
    }
}
