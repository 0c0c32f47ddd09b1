//! Lookup result cache.
//!
//! Class lookup is repeated constantly for the same names, so results are
//! memoized per qualified name. The cache is deliberately a three-state
//! enum: a hit, a definite miss, and "a source file exists". The last two
//! must be distinguishable because a later event (a script actually being
//! compiled, or a source file appearing) softens them differently.

use rustc_hash::FxHashMap;
use tern_core::ClassId;

/// One memoized lookup outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheEntry {
    /// The name is a loaded class (canonical class table entry).
    Found(ClassId),
    /// The name is definitely not a class the loader knows.
    NoClass,
    /// The name has a source file that still needs compiling.
    Script,
}

/// Per-name memo of lookup outcomes.
#[derive(Debug, Clone, Default)]
pub struct LookupCache {
    entries: FxHashMap<String, CacheEntry>,
}

impl LookupCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The memoized outcome for a name, if any.
    pub fn get(&self, name: &str) -> Option<CacheEntry> {
        self.entries.get(name).copied()
    }

    /// Memoize an outcome.
    pub fn put(&mut self, name: impl Into<String>, entry: CacheEntry) {
        self.entries.insert(name.into(), entry);
    }

    /// Forget a name, forcing the next lookup to retry. Used when a source
    /// file turns out to be newer than the class compiled from it, or when
    /// a queued script finishes compiling.
    pub fn invalidate(&mut self, name: &str) {
        self.entries.remove(name);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
