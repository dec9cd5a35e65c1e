use lazy_static::lazy_static;
use regex::Regex;

use crate::analysis::warnings::BugWarning;

/// A function definition located in the scanned source.
///
/// Offsets index into the stripped text, which shares its byte layout
/// with the original source.
#[derive(Debug, Clone)]
pub struct FunctionInfo {
    /// Function name
    pub name: String,
    /// Declared return type, normalized to single spaces
    pub return_type: String,
    /// Raw parameter list text
    pub params: String,
    /// 1-based line of the signature
    pub line: usize,
    /// Byte offset just after the opening brace
    pub body_start: usize,
    /// Byte offset of the matching closing brace
    pub body_end: usize,
}

impl FunctionInfo {
    pub fn is_void(&self) -> bool {
        self.return_type == "void"
    }
}

lazy_static! {
    static ref SIGNATURE: Regex = Regex::new(
        r"(?m)^[ \t]*((?:[A-Za-z_][A-Za-z0-9_]*[ \t\*]+)+)([A-Za-z_][A-Za-z0-9_]*)[ \t]*\(([^()]*)\)[ \t\r\n]*\{"
    )
    .expect("signature pattern compiles");
}

// Keywords that look like a call followed by a block
const NOT_FUNCTIONS: [&str; 5] = ["if", "while", "for", "switch", "else"];

/// Replace comment and string-literal contents with spaces so lexical
/// scans cannot match inside them. Newlines are preserved, so byte
/// offsets and line numbers remain valid for the original source.
pub fn strip_comments_and_strings(source: &str) -> String {
    enum Mode {
        Code,
        LineComment,
        BlockComment,
        Str,
        Char,
    }

    let bytes = source.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut mode = Mode::Code;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match mode {
            Mode::Code => {
                if b == b'/' && i + 1 < bytes.len() && bytes[i + 1] == b'/' {
                    mode = Mode::LineComment;
                    out.extend_from_slice(b"  ");
                    i += 2;
                    continue;
                }
                if b == b'/' && i + 1 < bytes.len() && bytes[i + 1] == b'*' {
                    mode = Mode::BlockComment;
                    out.extend_from_slice(b"  ");
                    i += 2;
                    continue;
                }
                if b == b'"' {
                    mode = Mode::Str;
                }
                if b == b'\'' {
                    mode = Mode::Char;
                }
                out.push(b);
                i += 1;
            }
            Mode::LineComment => {
                if b == b'\n' {
                    mode = Mode::Code;
                    out.push(b'\n');
                } else {
                    out.push(b' ');
                }
                i += 1;
            }
            Mode::BlockComment => {
                if b == b'*' && i + 1 < bytes.len() && bytes[i + 1] == b'/' {
                    mode = Mode::Code;
                    out.extend_from_slice(b"  ");
                    i += 2;
                    continue;
                }
                out.push(if b == b'\n' { b'\n' } else { b' ' });
                i += 1;
            }
            Mode::Str => {
                if b == b'\\' && i + 1 < bytes.len() {
                    // A line continuation inside a literal still ends the
                    // physical line, so its newline must survive.
                    out.push(b' ');
                    out.push(if bytes[i + 1] == b'\n' { b'\n' } else { b' ' });
                    i += 2;
                    continue;
                }
                if b == b'"' {
                    mode = Mode::Code;
                    out.push(b'"');
                } else {
                    out.push(if b == b'\n' { b'\n' } else { b' ' });
                }
                i += 1;
            }
            Mode::Char => {
                if b == b'\\' && i + 1 < bytes.len() {
                    out.push(b' ');
                    out.push(if bytes[i + 1] == b'\n' { b'\n' } else { b' ' });
                    i += 2;
                    continue;
                }
                if b == b'\'' {
                    mode = Mode::Code;
                    out.push(b'\'');
                } else {
                    out.push(if b == b'\n' { b'\n' } else { b' ' });
                }
                i += 1;
            }
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

/// Byte offset of the start of every line.
///
/// A trailing newline terminates the last line rather than opening a
/// new one, so it contributes no offset.
pub fn line_offsets(text: &str) -> Vec<usize> {
    let mut offsets = vec![0];
    for (i, b) in text.bytes().enumerate() {
        if b == b'\n' {
            offsets.push(i + 1);
        }
    }
    if !text.is_empty() && offsets.last() == Some(&text.len()) {
        offsets.pop();
    }
    offsets
}

/// 1-based line number of a byte offset.
pub fn line_of_offset(offsets: &[usize], offset: usize) -> usize {
    offsets.partition_point(|&start| start <= offset)
}

/// Find the closing brace matching the brace at `open`.
pub fn matching_brace(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(open) != Some(&b'{') {
        return None;
    }
    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Scan stripped source text for function definitions.
///
/// Definitions whose body brace cannot be matched are reported as
/// syntax errors instead of aborting the scan.
pub fn scan_functions(stripped: &str, offsets: &[usize]) -> (Vec<FunctionInfo>, Vec<BugWarning>) {
    let mut functions = Vec::new();
    let mut warnings = Vec::new();

    for caps in SIGNATURE.captures_iter(stripped) {
        let name = caps[2].to_string();
        if NOT_FUNCTIONS.contains(&name.as_str()) {
            continue;
        }

        let return_type = normalize_type(&caps[1]);
        if NOT_FUNCTIONS.contains(&return_type.as_str()) || return_type == "return" {
            continue;
        }

        let whole = caps.get(0).expect("whole match");
        let open = whole.end() - 1;
        let line = line_of_offset(offsets, whole.start());

        match matching_brace(stripped, open) {
            Some(close) => functions.push(FunctionInfo {
                name,
                return_type,
                params: caps[3].trim().to_string(),
                line,
                body_start: open + 1,
                body_end: close,
            }),
            None => {
                warnings.push(BugWarning::syntax_error(
                    line,
                    &format!("unterminated body of `{}`", name),
                ));
            }
        }
    }

    (functions, warnings)
}

fn normalize_type(raw: &str) -> String {
    let mut out = String::new();
    for token in raw.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(token);
    }
    // Keep the pointer marker attached to the type name
    out.trim_end_matches(' ').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_preserves_offsets() {
        let src = "int x; // trailing comment\nchar *s = \"a{b}c\";\n";
        let stripped = strip_comments_and_strings(src);
        assert_eq!(src.len(), stripped.len());
        assert!(!stripped.contains("trailing"));
        assert!(!stripped.contains("a{b}c"));
        // Code outside comments and strings is untouched
        assert!(stripped.starts_with("int x;"));
    }

    #[test]
    fn test_strip_block_comment_keeps_newlines() {
        let src = "a /* line\nline */ b\n";
        let stripped = strip_comments_and_strings(src);
        assert_eq!(stripped.matches('\n').count(), 2);
        assert!(stripped.contains('a'));
        assert!(stripped.contains('b'));
    }

    #[test]
    fn test_scan_simple_function() {
        let src = "int add(int a, int b) {\n    return a + b;\n}\n";
        let stripped = strip_comments_and_strings(src);
        let offsets = line_offsets(&stripped);
        let (functions, warnings) = scan_functions(&stripped, &offsets);

        assert!(warnings.is_empty());
        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].name, "add");
        assert_eq!(functions[0].return_type, "int");
        assert_eq!(functions[0].line, 1);
        assert!(!functions[0].is_void());
    }

    #[test]
    fn test_scan_pointer_return_type() {
        let src = "struct Node* create_node(int value) {\n    return 0;\n}\n";
        let stripped = strip_comments_and_strings(src);
        let offsets = line_offsets(&stripped);
        let (functions, _) = scan_functions(&stripped, &offsets);

        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].name, "create_node");
        assert!(functions[0].return_type.starts_with("struct Node"));
    }

    #[test]
    fn test_scan_skips_control_keywords() {
        let src = "void f(void) {\n    while (x) {\n    }\n    if (y) {\n    }\n}\n";
        let stripped = strip_comments_and_strings(src);
        let offsets = line_offsets(&stripped);
        let (functions, _) = scan_functions(&stripped, &offsets);

        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].name, "f");
    }

    #[test]
    fn test_unterminated_body_degrades_to_warning() {
        let src = "int broken(void) {\n    return 1;\n";
        let stripped = strip_comments_and_strings(src);
        let offsets = line_offsets(&stripped);
        let (functions, warnings) = scan_functions(&stripped, &offsets);

        assert!(functions.is_empty());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].description.contains("broken"));
    }

    #[test]
    fn test_line_of_offset() {
        let text = "a\nbb\nccc\n";
        let offsets = line_offsets(text);
        assert_eq!(line_of_offset(&offsets, 0), 1);
        assert_eq!(line_of_offset(&offsets, 2), 2);
        assert_eq!(line_of_offset(&offsets, 5), 3);
    }

    #[test]
    fn test_trailing_newline_opens_no_line() {
        assert_eq!(line_offsets("int x;\n").len(), 1);
        assert_eq!(line_offsets("a\nb").len(), 2);
        assert_eq!(line_offsets("a\n\n").len(), 2);
    }

    #[test]
    fn test_strip_keeps_continuation_newline_in_string() {
        let src = "char* s = \"a\\\nb\";\nint x = 0;\n";
        let stripped = strip_comments_and_strings(src);

        assert_eq!(src.len(), stripped.len());
        assert_eq!(
            stripped.matches('\n').count(),
            src.matches('\n').count()
        );
        assert!(stripped.contains("int x = 0;"));
    }
}
