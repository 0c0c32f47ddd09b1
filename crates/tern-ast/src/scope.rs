//! Variable scopes.
//!
//! Scopes form a tree per source unit. Blocks, methods, closures, and `for`
//! statements each open a scope. A scope records which names it declares and
//! which unbound (dynamic) names its expressions referenced; when resolution
//! later decides such a name is actually a class, the stale references are
//! scrubbed from the chain.

use rustc_hash::FxHashSet;
use tern_core::ScopeId;

/// One variable scope.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VariableScope {
    pub parent: Option<ScopeId>,
    /// True inside static methods and static initializers.
    pub static_context: bool,
    declared: FxHashSet<String>,
    referenced_dynamic: FxHashSet<String>,
}

impl VariableScope {
    /// Names this scope declares.
    pub fn declared(&self) -> &FxHashSet<String> {
        &self.declared
    }

    /// Unbound names referenced from this scope.
    pub fn referenced_dynamic(&self) -> &FxHashSet<String> {
        &self.referenced_dynamic
    }
}

/// All scopes of one source unit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScopeArena {
    scopes: Vec<VariableScope>,
}

impl ScopeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a root scope (no parent).
    pub fn root(&mut self, static_context: bool) -> ScopeId {
        self.push(None, static_context)
    }

    /// Open a child scope.
    pub fn child(&mut self, parent: ScopeId, static_context: bool) -> ScopeId {
        self.push(Some(parent), static_context)
    }

    fn push(&mut self, parent: Option<ScopeId>, static_context: bool) -> ScopeId {
        let id = ScopeId::new(self.scopes.len() as u32);
        self.scopes.push(VariableScope {
            parent,
            static_context,
            declared: FxHashSet::default(),
            referenced_dynamic: FxHashSet::default(),
        });
        id
    }

    pub fn get(&self, id: ScopeId) -> &VariableScope {
        &self.scopes[id.index()]
    }

    pub fn get_mut(&mut self, id: ScopeId) -> &mut VariableScope {
        &mut self.scopes[id.index()]
    }

    /// Declare a name in a scope.
    pub fn declare(&mut self, id: ScopeId, name: impl Into<String>) {
        self.get_mut(id).declared.insert(name.into());
    }

    /// Whether a name is declared in the scope or any ancestor.
    pub fn is_declared(&self, id: ScopeId, name: &str) -> bool {
        let mut current = Some(id);
        while let Some(scope_id) = current {
            let scope = self.get(scope_id);
            if scope.declared.contains(name) {
                return true;
            }
            current = scope.parent;
        }
        false
    }

    /// Record a reference to an unbound name.
    pub fn record_dynamic(&mut self, id: ScopeId, name: impl Into<String>) {
        self.get_mut(id).referenced_dynamic.insert(name.into());
    }

    /// Scrub a dynamic-name reference from the scope chain, after the name
    /// turned out to be a class rather than a variable.
    pub fn remove_dynamic_reference(&mut self, id: ScopeId, name: &str) {
        let mut current = Some(id);
        while let Some(scope_id) = current {
            let scope = self.get_mut(scope_id);
            scope.referenced_dynamic.remove(name);
            current = scope.parent;
        }
    }

    /// Whether the scope (or any ancestor up to the nearest method root)
    /// sits in a static context.
    pub fn in_static_context(&self, id: ScopeId) -> bool {
        self.get(id).static_context
    }
}
