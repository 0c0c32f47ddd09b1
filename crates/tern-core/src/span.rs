//! Source location tracking for error reporting.
//!
//! Provides [`Span`] to track where names and expressions occur in source code.

use std::fmt;

/// A span of source code, represented by its starting position.
///
/// Similar to Rust compiler diagnostics, we track the line:column
/// where a name starts for debugging and error reporting.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, byte-based).
    pub col: u32,
    /// Length in bytes (for additional context).
    pub len: u32,
}

impl Span {
    /// Create a new span from a line, column, and length.
    #[inline]
    pub fn new(line: u32, col: u32, len: u32) -> Self {
        Self { line, col, len }
    }

    /// Create a zero-length span at a position.
    #[inline]
    pub fn point(line: u32, col: u32) -> Self {
        Self { line, col, len: 0 }
    }

    /// Whether this span is empty (zero length).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The length of this span in bytes.
    #[inline]
    pub fn len(&self) -> u32 {
        self.len
    }

}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}
