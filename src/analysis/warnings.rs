use serde::{Deserialize, Serialize};

/// Defect classes reported by the analyzers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BugKind {
    /// Pointer dereferenced without a preceding NULL check
    NullPointerDereference,
    /// Heap allocation with no matching release
    MemoryLeak,
    /// Variable read before its first assignment
    UninitializedVariable,
    /// Loop with no reachable exit condition
    InfiniteLoop,
    /// Write into a buffer without a destination capacity check
    BufferOverflow,
    /// Non-void function without a return statement
    MissingReturn,
    /// Source the scanner could not follow
    SyntaxError,
    /// Other defect class
    Other(String),
}

impl BugKind {
    /// Stable identifier used in the history database and reports.
    pub fn as_str(&self) -> &str {
        match self {
            BugKind::NullPointerDereference => "null_pointer",
            BugKind::MemoryLeak => "memory_leak",
            BugKind::UninitializedVariable => "uninitialized_var",
            BugKind::InfiniteLoop => "infinite_loop",
            BugKind::BufferOverflow => "buffer_overflow",
            BugKind::MissingReturn => "missing_return",
            BugKind::SyntaxError => "syntax_error",
            BugKind::Other(name) => name,
        }
    }

    /// Parse a stored identifier back into a kind.
    pub fn from_db_str(value: &str) -> Self {
        match value {
            "null_pointer" => BugKind::NullPointerDereference,
            "memory_leak" => BugKind::MemoryLeak,
            "uninitialized_var" => BugKind::UninitializedVariable,
            "infinite_loop" => BugKind::InfiniteLoop,
            "buffer_overflow" => BugKind::BufferOverflow,
            "missing_return" => BugKind::MissingReturn,
            "syntax_error" => BugKind::SyntaxError,
            other => BugKind::Other(other.to_string()),
        }
    }
}

/// Severity level of a warning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Informational issue
    Info,
    /// Low severity issue
    Low,
    /// Medium severity issue
    Medium,
    /// High severity issue
    High,
    /// Critical severity issue
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &str {
        match self {
            Severity::Info => "info",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    pub fn from_db_str(value: &str) -> Self {
        match value {
            "info" => Severity::Info,
            "low" => Severity::Low,
            "high" => Severity::High,
            "critical" => Severity::Critical,
            _ => Severity::Medium,
        }
    }
}

/// A single defect found in the analyzed source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BugWarning {
    /// Defect class
    pub kind: BugKind,
    /// Severity level
    pub severity: Severity,
    /// 1-based line number in the analyzed source
    pub line: usize,
    /// Enclosing function, when known
    pub function: Option<String>,
    /// Description of the issue
    pub description: String,
    /// Suggested remediation
    pub remediation: String,
}

impl BugWarning {
    /// Create a new warning
    pub fn new(
        kind: BugKind,
        severity: Severity,
        line: usize,
        function: Option<String>,
        description: String,
        remediation: String,
    ) -> Self {
        Self {
            kind,
            severity,
            line,
            function,
            description,
            remediation,
        }
    }

    /// Pointer dereferenced without a NULL check in scope
    pub fn null_pointer(line: usize, function: &str, var: &str) -> Self {
        Self::new(
            BugKind::NullPointerDereference,
            Severity::High,
            line,
            Some(function.to_string()),
            format!(
                "Pointer `{}` is dereferenced at line {} without a preceding NULL check",
                var, line
            ),
            format!("Check `{} != NULL` before dereferencing", var),
        )
    }

    /// Allocation that is never released in its function
    pub fn memory_leak(line: usize, function: &str, var: &str, callee: &str) -> Self {
        Self::new(
            BugKind::MemoryLeak,
            Severity::High,
            line,
            Some(function.to_string()),
            format!(
                "`{}` is assigned from {}() at line {} but never freed in `{}`",
                var, callee, line, function
            ),
            format!("Call free({}) on every path once the allocation is no longer needed", var),
        )
    }

    /// Allocation returned to the caller; ownership leaves the function
    pub fn escaping_allocation(line: usize, function: &str, var: &str) -> Self {
        Self::new(
            BugKind::MemoryLeak,
            Severity::Info,
            line,
            Some(function.to_string()),
            format!(
                "`{}` allocated at line {} is returned from `{}`; the caller owns the release",
                var, line, function
            ),
            format!("Document that callers of {}() must free the returned pointer", function),
        )
    }

    /// Variable read before its first assignment
    pub fn uninitialized(line: usize, function: &str, var: &str, read_line: usize) -> Self {
        Self::new(
            BugKind::UninitializedVariable,
            Severity::Medium,
            line,
            Some(function.to_string()),
            format!(
                "`{}` declared at line {} is read at line {} before being assigned",
                var, line, read_line
            ),
            format!("Initialize `{}` at its declaration", var),
        )
    }

    /// Loop with no exit condition in its body
    pub fn infinite_loop(line: usize, function: &str) -> Self {
        Self::new(
            BugKind::InfiniteLoop,
            Severity::Medium,
            line,
            Some(function.to_string()),
            format!("Unconditional loop at line {} has no break, return or exit", line),
            "Add an explicit, checked termination condition".to_string(),
        )
    }

    /// Call to an API that writes without a destination bound
    pub fn unsafe_copy_call(line: usize, function: &str, callee: &str) -> Self {
        Self::new(
            BugKind::BufferOverflow,
            Severity::High,
            line,
            Some(function.to_string()),
            format!(
                "{}() at line {} writes without checking the destination capacity",
                callee, line
            ),
            format!("Replace {}() with a bounds-checked variant", callee),
        )
    }

    /// Copy of a known-length source into a known, smaller buffer
    pub fn fixed_buffer_overflow(
        line: usize,
        function: &str,
        dest: &str,
        capacity: usize,
        needed: usize,
    ) -> Self {
        Self::new(
            BugKind::BufferOverflow,
            Severity::Critical,
            line,
            Some(function.to_string()),
            format!(
                "Copy at line {} writes {} bytes into `{}[{}]`",
                line, needed, dest, capacity
            ),
            format!("Grow `{}` to at least {} bytes or truncate the source", dest, needed),
        )
    }

    /// Copy loop bounded only by the source terminator
    pub fn unbounded_copy(line: usize, function: &str, src: &str) -> Self {
        Self::new(
            BugKind::BufferOverflow,
            Severity::High,
            line,
            Some(function.to_string()),
            format!(
                "Copy loop at line {} runs until `{}` terminates, never checking the destination",
                line, src
            ),
            "Bound the loop by the destination capacity as well as the source terminator"
                .to_string(),
        )
    }

    /// Non-void function with no return statement
    pub fn missing_return(line: usize, function: &str) -> Self {
        Self::new(
            BugKind::MissingReturn,
            Severity::Low,
            line,
            Some(function.to_string()),
            format!("Function `{}` might not return a value", function),
            format!("Return a value on every path out of `{}`", function),
        )
    }

    /// Source the function scanner could not follow
    pub fn syntax_error(line: usize, detail: &str) -> Self {
        Self::new(
            BugKind::SyntaxError,
            Severity::High,
            line,
            None,
            format!("Syntax error near line {}: {}", line, detail),
            "Fix the syntax so the file can be analyzed".to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        let kinds = [
            BugKind::NullPointerDereference,
            BugKind::MemoryLeak,
            BugKind::UninitializedVariable,
            BugKind::InfiniteLoop,
            BugKind::BufferOverflow,
            BugKind::MissingReturn,
            BugKind::SyntaxError,
        ];
        for kind in kinds {
            assert_eq!(BugKind::from_db_str(kind.as_str()), kind);
        }
        assert_eq!(
            BugKind::from_db_str("weird"),
            BugKind::Other("weird".to_string())
        );
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        assert!(Severity::Low > Severity::Info);
    }

    #[test]
    fn test_helper_severities() {
        let leak = BugWarning::memory_leak(5, "create_node", "node", "malloc");
        assert_eq!(leak.severity, Severity::High);

        let escape = BugWarning::escaping_allocation(5, "create_node", "node");
        assert_eq!(escape.severity, Severity::Info);
        assert_eq!(escape.kind, BugKind::MemoryLeak);

        let ret = BugWarning::missing_return(3, "get_value");
        assert_eq!(ret.severity, Severity::Low);
    }
}
