use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::analysis::warnings::{BugKind, BugWarning};

/// A concrete fix for a detected defect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixSuggestion {
    /// Defect class being fixed
    pub kind: BugKind,
    /// 1-based line the fix applies to
    pub line: usize,
    /// Replacement or insertion text
    pub replacement: String,
    /// What the fix does
    pub description: String,
}

lazy_static! {
    static ref ALLOC_VAR: Regex = Regex::new(
        r"\b([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(?:\([^()]*\)\s*)?(?:malloc|calloc|realloc|strdup)\s*\("
    )
    .expect("alloc pattern compiles");
    static ref ARROW_VAR: Regex =
        Regex::new(r"\b([A-Za-z_][A-Za-z0-9_]*)\s*->").expect("arrow pattern compiles");
    static ref STAR_VAR: Regex =
        Regex::new(r"\*\s*([A-Za-z_][A-Za-z0-9_]*)\b").expect("star pattern compiles");
    static ref LOOP_HEAD: Regex =
        Regex::new(r"while\s*\(\s*(?:1|true)\s*\)|for\s*\(\s*;\s*;\s*\)")
            .expect("loop pattern compiles");
}

/// Suggest a concrete fix for a warning.
///
/// Returns `None` when the warning's line is outside the source or the
/// defect has no mechanical fix.
pub fn suggest_fix(warning: &BugWarning, source: &str) -> Option<FixSuggestion> {
    let lines: Vec<&str> = source.lines().collect();
    if warning.line == 0 || warning.line > lines.len() {
        return None;
    }
    let text = lines[warning.line - 1];

    match &warning.kind {
        BugKind::MemoryLeak => {
            let var = ALLOC_VAR.captures(text)?.get(1)?.as_str().to_string();
            Some(FixSuggestion {
                kind: warning.kind.clone(),
                line: warning.line,
                replacement: format!("free({});", var),
                description: format!("Release `{}` once it is no longer needed", var),
            })
        }
        BugKind::NullPointerDereference => {
            let var = ARROW_VAR
                .captures(text)
                .or_else(|| STAR_VAR.captures(text))?
                .get(1)?
                .as_str()
                .to_string();
            Some(FixSuggestion {
                kind: warning.kind.clone(),
                line: warning.line,
                replacement: format!("if ({} != NULL) {{\n    {}\n}}", var, text.trim()),
                description: format!("Guard the dereference with a `{} != NULL` check", var),
            })
        }
        BugKind::UninitializedVariable => {
            let trimmed = text.trim_end();
            let without_semicolon = trimmed.strip_suffix(';')?;
            Some(FixSuggestion {
                kind: warning.kind.clone(),
                line: warning.line,
                replacement: format!("{} = 0;", without_semicolon.trim_end()),
                description: "Initialize the variable at its declaration".to_string(),
            })
        }
        BugKind::InfiniteLoop => {
            if !LOOP_HEAD.is_match(text) {
                return None;
            }
            let replacement = LOOP_HEAD.replace(text, "while (condition)").into_owned();
            Some(FixSuggestion {
                kind: warning.kind.clone(),
                line: warning.line,
                replacement: replacement.trim().to_string(),
                description: "Replace the unconditional loop with a checked condition"
                    .to_string(),
            })
        }
        BugKind::BufferOverflow => buffer_fix(warning, text),
        BugKind::MissingReturn | BugKind::SyntaxError | BugKind::Other(_) => None,
    }
}

fn buffer_fix(warning: &BugWarning, text: &str) -> Option<FixSuggestion> {
    let (replacement, description) = if text.contains("strcpy") {
        (
            text.trim().replace("strcpy", "strncpy"),
            "Use strncpy with the destination size".to_string(),
        )
    } else if text.contains("strcat") {
        (
            text.trim().replace("strcat", "strncat"),
            "Use strncat with the remaining destination size".to_string(),
        )
    } else if text.contains("gets") {
        (
            text.trim().replace("gets", "fgets"),
            "Use fgets with the destination size".to_string(),
        )
    } else if text.contains("sprintf") {
        (
            text.trim().replace("sprintf", "snprintf"),
            "Use snprintf with the destination size".to_string(),
        )
    } else if text.contains("while") {
        (
            "while (src[i] != '\\0' && i < dest_size - 1)".to_string(),
            "Bound the copy by the destination capacity".to_string(),
        )
    } else {
        return None;
    };

    Some(FixSuggestion {
        kind: warning.kind.clone(),
        line: warning.line,
        replacement,
        description,
    })
}
