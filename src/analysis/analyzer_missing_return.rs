use lazy_static::lazy_static;
use regex::Regex;

use crate::analysis::analyzer::SourceAnalyzer;
use crate::analysis::warnings::BugWarning;

/// Detects non-void functions with no return statement.
pub fn detect_missing_returns(analyzer: &SourceAnalyzer) -> Vec<BugWarning> {
    let mut warnings = Vec::new();

    for function in analyzer.functions() {
        if function.is_void() {
            continue;
        }
        let body = analyzer.function_body(function);
        if !HAS_RETURN.is_match(body) {
            warnings.push(BugWarning::missing_return(function.line, &function.name));
        }
    }

    warnings.sort_by_key(|w| w.line);
    warnings
}

lazy_static! {
    static ref HAS_RETURN: Regex = Regex::new(r"\breturn\b").expect("return pattern compiles");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_missing_return() {
        let src = r#"
int get_value() {
    int x = 42;
}
"#;
        let analyzer = SourceAnalyzer::new("get.c", src);
        let warnings = detect_missing_returns(&analyzer);

        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].description.contains("get_value"));
        assert_eq!(warnings[0].line, 2);
    }

    #[test]
    fn test_void_function_not_flagged() {
        let src = r#"
void log_value(int x) {
    printf("%d\n", x);
}
"#;
        let analyzer = SourceAnalyzer::new("log.c", src);
        assert!(detect_missing_returns(&analyzer).is_empty());
    }

    #[test]
    fn test_returning_function_not_flagged() {
        let src = r#"
int get_value() {
    return 42;
}
"#;
        let analyzer = SourceAnalyzer::new("ok.c", src);
        assert!(detect_missing_returns(&analyzer).is_empty());
    }
}
