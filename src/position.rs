use std::fmt::{Display, Formatter};

/// A 1-based line/column pair derived from a byte offset, for diagnostics only.
///
/// Repair decisions never consult `Position` — only [`crate::error::RepairError`]
/// and debug tracing do, so a line/column pair is always derived lazily from
/// a byte offset rather than tracked incrementally while scanning.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
