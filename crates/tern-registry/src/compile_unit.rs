//! The compilation unit: all classes being compiled together, plus the
//! queue of script sources discovered during lookup.
//!
//! Lookup that finds a source file instead of a compiled class does not
//! recurse into compiling it. It records the file here together with the
//! class table entries waiting on it, and the pipeline driver drains the
//! queue between passes. That keeps resolution non-reentrant while still
//! letting mutually referencing sources resolve each other.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use tern_core::{ClassId, Span};

use crate::loader::ScriptSource;

/// A discovered source file and the entries waiting for its class.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingScript {
    pub source: ScriptSource,
    /// Unresolved entries to redirect once the class exists, with the span
    /// of the reference that triggered discovery.
    pub forwards: Vec<(ClassId, Span)>,
}

/// All classes of the current compilation, by qualified name.
#[derive(Debug, Clone, Default)]
pub struct CompileUnit {
    classes: FxHashMap<String, ClassId>,
    queue: VecDeque<PendingScript>,
    queued: FxHashMap<String, usize>,
}

impl CompileUnit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a primary class under its qualified name.
    pub fn add_class(&mut self, name: impl Into<String>, id: ClassId) {
        self.classes.insert(name.into(), id);
    }

    /// Look up a sibling class being compiled in this unit.
    pub fn get_class(&self, name: &str) -> Option<ClassId> {
        self.classes.get(name).copied()
    }

    /// Number of registered classes.
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Queue a discovered source file. A file already queued just gains
    /// another forward reference.
    pub fn enqueue_script(&mut self, source: ScriptSource, forward: ClassId, span: Span) {
        if let Some(&idx) = self.queued.get(&source.class_name) {
            self.queue[idx].forwards.push((forward, span));
            return;
        }
        self.queued
            .insert(source.class_name.clone(), self.queue.len());
        self.queue.push_back(PendingScript {
            source,
            forwards: vec![(forward, span)],
        });
    }

    /// Whether any scripts are waiting to be compiled.
    pub fn has_pending_scripts(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Take everything queued so far.
    pub fn drain_pending(&mut self) -> Vec<PendingScript> {
        self.queued.clear();
        self.queue.drain(..).collect()
    }
}
