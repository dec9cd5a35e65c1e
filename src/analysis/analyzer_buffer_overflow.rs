use lazy_static::lazy_static;
use regex::Regex;

use crate::analysis::analyzer::SourceAnalyzer;
use crate::analysis::functions::matching_brace;
use crate::analysis::warnings::BugWarning;

/// Detects writes that are not checked against the destination capacity.
///
/// Three patterns are covered:
/// 1. Calls to unbounded copy/input routines (`strcpy`, `strcat`,
///    `gets`, `sprintf`, and `scanf` with a bare `%s`)
/// 2. `strcpy` of a string literal into a fixed-size array that is
///    provably too small, which escalates to Critical
/// 3. Hand-rolled copy loops whose condition tests only the source
///    terminator while the body writes through a second array
pub fn detect_buffer_overflows(analyzer: &SourceAnalyzer) -> Vec<BugWarning> {
    let mut warnings = Vec::new();

    for function in analyzer.functions() {
        let body = analyzer.function_body(function);

        for caps in UNSAFE_CALL.captures_iter(body) {
            let callee = &caps[1];
            let pos = caps.get(0).map(|m| m.start()).unwrap_or(0);
            let offset = function.body_start + pos;
            let line = analyzer.line_of_offset(offset);

            if callee == "strcpy" {
                match check_literal_copy(analyzer, offset) {
                    LiteralCopy::Overflow { dest, capacity, needed } => {
                        warnings.push(BugWarning::fixed_buffer_overflow(
                            line,
                            &function.name,
                            &dest,
                            capacity,
                            needed,
                        ));
                        continue;
                    }
                    LiteralCopy::Fits => continue,
                    LiteralCopy::Unknown => {}
                }
            }

            warnings.push(BugWarning::unsafe_copy_call(line, &function.name, callee));
        }

        for m in SCANF_CALL.find_iter(body) {
            let offset = function.body_start + m.start();
            if scanf_has_bare_string(analyzer, offset) {
                let line = analyzer.line_of_offset(offset);
                warnings.push(BugWarning::unsafe_copy_call(line, &function.name, "scanf"));
            }
        }
    }

    detect_terminator_bounded_loops(analyzer, &mut warnings);

    warnings.sort_by_key(|w| w.line);
    warnings
}

lazy_static! {
    static ref UNSAFE_CALL: Regex =
        Regex::new(r"\b(strcpy|strcat|gets|sprintf)\s*\(").expect("call pattern compiles");
    static ref SCANF_CALL: Regex = Regex::new(r"\bscanf\s*\(").expect("scanf pattern compiles");
    static ref STRCPY_LITERAL: Regex = Regex::new(
        r#"^strcpy\s*\(\s*([A-Za-z_][A-Za-z0-9_]*)\s*,\s*"((?:[^"\\]|\\.)*)""#
    )
    .expect("strcpy literal pattern compiles");
    static ref PERCENT_S: Regex = Regex::new(r"%(\d*)s").expect("format pattern compiles");
    static ref COPY_LOOP: Regex = Regex::new(
        r"\bwhile\s*\(\s*([A-Za-z_][A-Za-z0-9_]*)\s*\[\s*([A-Za-z_][A-Za-z0-9_]*)\s*\]\s*!=\s*'\\0'\s*\)"
    )
    .expect("copy loop pattern compiles");
}

enum LiteralCopy {
    /// Literal source is larger than the destination array
    Overflow {
        dest: String,
        capacity: usize,
        needed: usize,
    },
    /// Literal source provably fits
    Fits,
    /// Source length or destination capacity not visible
    Unknown,
}

/// Inspect a `strcpy` call in the raw source for a literal source and a
/// visible fixed-size destination.
fn check_literal_copy(analyzer: &SourceAnalyzer, offset: usize) -> LiteralCopy {
    let raw = &analyzer.source()[offset..];
    let caps = match STRCPY_LITERAL.captures(raw) {
        Some(caps) => caps,
        None => return LiteralCopy::Unknown,
    };

    let dest = caps[1].to_string();
    let needed = literal_byte_len(&caps[2]) + 1;

    match array_capacity(analyzer.stripped(), &dest) {
        Some(capacity) if needed > capacity => LiteralCopy::Overflow {
            dest,
            capacity,
            needed,
        },
        Some(_) => LiteralCopy::Fits,
        None => LiteralCopy::Unknown,
    }
}

/// Declared capacity of `char name[N]` anywhere in the stripped source.
fn array_capacity(stripped: &str, name: &str) -> Option<usize> {
    let pattern = format!(r"\bchar\s+{}\s*\[\s*(\d+)\s*\]", regex::escape(name));
    let re = Regex::new(&pattern).ok()?;
    re.captures(stripped)?
        .get(1)
        .and_then(|m| m.as_str().parse().ok())
}

/// Byte length of a C string literal body, counting escapes as one byte.
fn literal_byte_len(body: &str) -> usize {
    let mut len = 0;
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            chars.next();
        }
        len += 1;
    }
    len
}

/// Whether a scanf call's format string contains a width-less `%s`.
fn scanf_has_bare_string(analyzer: &SourceAnalyzer, offset: usize) -> bool {
    let raw = &analyzer.source()[offset..];
    let window_end = raw.find(';').unwrap_or(raw.len());
    let call_text = &raw[..window_end];

    // A width-limited %Ns is the accepted remediation, so only a bare
    // %s counts.
    PERCENT_S
        .captures_iter(call_text)
        .any(|caps| caps[1].is_empty())
}

/// Flag copy loops bounded only by the source terminator.
fn detect_terminator_bounded_loops(analyzer: &SourceAnalyzer, warnings: &mut Vec<BugWarning>) {
    let raw = analyzer.source();
    let stripped = analyzer.stripped();

    for caps in COPY_LOOP.captures_iter(raw) {
        let whole = match caps.get(0) {
            Some(m) => m,
            None => continue,
        };
        // A match inside a comment is blanked in the stripped copy
        if !stripped[whole.start()..].starts_with("while") {
            continue;
        }

        let function = match analyzer.function_at(whole.start()) {
            Some(f) => f,
            None => continue,
        };

        let src_var = caps[1].to_string();
        let index_var = caps[2].to_string();

        let loop_body = match loop_body_text(stripped, whole.end()) {
            Some(text) => text,
            None => continue,
        };

        if writes_other_array(loop_body, &src_var, &index_var) {
            let line = analyzer.line_of_offset(whole.start());
            warnings.push(BugWarning::unbounded_copy(line, &function.name, &src_var));
        }
    }
}

fn loop_body_text(stripped: &str, after: usize) -> Option<&str> {
    let rest = &stripped[after..];
    let first = rest.find(|c: char| !c.is_whitespace())?;
    if rest.as_bytes().get(first) == Some(&b'{') {
        let close = matching_brace(rest, first)?;
        Some(&rest[first + 1..close])
    } else {
        let end = rest[first..].find(';')?;
        Some(&rest[first..first + end + 1])
    }
}

fn writes_other_array(body: &str, src_var: &str, index_var: &str) -> bool {
    let pattern = format!(
        r"\b([A-Za-z_][A-Za-z0-9_]*)\s*\[\s*{}\s*\]\s*=[^=]",
        regex::escape(index_var)
    );
    let re = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(_) => return false,
    };
    let overwrites = re.captures_iter(body).any(|caps| &caps[1] != src_var);
    overwrites
}
