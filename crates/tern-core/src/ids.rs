//! Identifier types shared across the resolution pipeline.
//!
//! These are small copyable handles into arenas. Using handles instead of
//! references lets multiple passes mutate AST nodes and class table entries
//! without fighting the borrow checker over shared graph structure.

use std::fmt;

/// Identifies a class table entry.
///
/// Every type reference in the AST is a `ClassId`. Resolution never rewrites
/// the AST's type positions; it redirects the referenced entry instead.
///
/// # Example
///
/// ```
/// use tern_core::ClassId;
///
/// let id = ClassId::new(7);
/// assert_eq!(id.index(), 7);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassId(u32);

impl ClassId {
    /// Create a new class ID with the given index.
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get the underlying index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class_{}", self.0)
    }
}

/// Identifies a binary class descriptor loaded through a
/// class loader, interned in the class table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadedClassId(u32);

impl LoadedClassId {
    /// Create a new loaded-class ID with the given index.
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get the underlying index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for LoadedClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "loaded_{}", self.0)
    }
}

/// Identifies a variable scope within a source unit's scope arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

impl ScopeId {
    /// Create a new scope ID with the given index.
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get the underlying index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope_{}", self.0)
    }
}
