pub mod analyzer;
pub mod functions;
pub mod types;
pub mod warnings;

pub mod analyzer_buffer_overflow;
pub mod analyzer_infinite_loop;
pub mod analyzer_memory_leak;
pub mod analyzer_missing_return;
pub mod analyzer_null_pointer;
pub mod analyzer_uninitialized;

pub mod fixes;

pub use analyzer::SourceAnalyzer;
pub use fixes::{suggest_fix, FixSuggestion};
pub use types::*;
pub use warnings::*;
