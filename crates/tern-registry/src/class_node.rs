//! The class table.
//!
//! Every type reference in a program gets its own entry here, created
//! unresolved and later redirected at the entry that actually defines the
//! class. Redirects are explicit and acyclic: [`ClassArena::set_redirect`]
//! rejects self-redirects and cycles as internal errors instead of letting
//! a later walk spin.

use rustc_hash::FxHashSet;
use tern_core::{BugError, ClassFlags, ClassId, ConstantValue, GenericsType, LoadedClassId, names};
use tern_ast::{ClassDecl, Expr};

use crate::loader::{FieldSig, LoadedClass, MemberTable, MethodSig};

/// Names that resolve without any lookup.
const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "char", "short", "int", "long", "float", "double", "void",
];

/// How an entry was constructed, which limits how lookup may treat it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    /// An ordinary name.
    Plain,
    /// A name starting lower case. Lookup skips expensive strategies and
    /// never asks the loader for sources.
    LowerCase,
    /// A name built as package-prefix plus simple name. Lookup must not
    /// retry it under other packages.
    WithPackage {
        /// Byte length of the package prefix, trailing dot included.
        prefix_len: usize,
    },
    /// A candidate nested-class name (`Outer$Inner`). Lookup must not treat
    /// it as a fresh top-level name.
    Nested {
        /// The outer class the candidate was derived from.
        outer: ClassId,
    },
}

/// The resolution state of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassState {
    /// Not yet bound to anything.
    Unresolved,
    /// Defined by a class declaration in the current compilation.
    Primary,
    /// Backed by a loaded class descriptor.
    Loaded(LoadedClassId),
}

/// One class table entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassNode {
    /// The name as written (after any construction-time mangling).
    pub name: String,
    pub kind: ClassKind,
    pub state: ClassState,
    /// The entry this one is an alias of, once resolved.
    pub redirect: Option<ClassId>,
    /// Set when this entry is an array type of the component.
    pub component: Option<ClassId>,
    /// Type arguments written at the usage site.
    pub generics: Option<Vec<GenericsType>>,
    /// Whether this entry stands for a type parameter.
    pub placeholder: bool,
    pub flags: ClassFlags,
    /// Superclass reference (primary) or canonical superclass (loaded).
    pub superclass: Option<ClassId>,
    pub interfaces: Vec<ClassId>,
    /// The outer class, for nested primary classes.
    pub enclosing: Option<ClassId>,
    /// Member signatures, for primary classes.
    pub members: Option<MemberTable>,
    /// Whether the class came from a script body.
    pub is_script: bool,
}

impl ClassNode {
    fn unresolved(name: String, kind: ClassKind) -> Self {
        Self {
            name,
            kind,
            state: ClassState::Unresolved,
            redirect: None,
            component: None,
            generics: None,
            placeholder: false,
            flags: ClassFlags::empty(),
            superclass: None,
            interfaces: Vec::new(),
            enclosing: None,
            members: None,
            is_script: false,
        }
    }
}

/// The class table: all entries plus interned loaded descriptors.
#[derive(Debug, Clone, Default)]
pub struct ClassArena {
    nodes: Vec<ClassNode>,
    loaded: Vec<LoadedClass>,
    /// Canonical entry per loaded class name (primitives included).
    canonical: rustc_hash::FxHashMap<String, ClassId>,
}

impl ClassArena {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// A table with the primitive types and `java.lang.Object` interned.
    pub fn with_primitives() -> Self {
        let mut arena = Self::new();
        for name in PRIMITIVES {
            let descriptor = LoadedClass {
                superclass: None,
                ..LoadedClass::new(*name)
            }
            .with_flags(ClassFlags::PUBLIC | ClassFlags::FINAL);
            arena.intern_loaded(descriptor);
        }
        arena.intern_loaded(LoadedClass::new("java.lang.Object"));
        arena
    }

    fn push(&mut self, node: ClassNode) -> ClassId {
        let id = ClassId::new(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: ClassId) -> &ClassNode {
        &self.nodes[id.index()]
    }

    pub fn get_mut(&mut self, id: ClassId) -> &mut ClassNode {
        &mut self.nodes[id.index()]
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ========================================================================
    // Entry construction
    // ========================================================================

    /// A fresh unresolved entry for a written name. Primitive names return
    /// their canonical resolved entry instead.
    pub fn make(&mut self, name: impl Into<String>) -> ClassId {
        let name = name.into();
        if PRIMITIVES.contains(&name.as_str())
            && let Some(&id) = self.canonical.get(&name)
        {
            return id;
        }
        self.push(ClassNode::unresolved(name, ClassKind::Plain))
    }

    /// An entry for a name starting lower case, with lookup limited
    /// accordingly.
    pub fn make_lower_case(&mut self, name: impl Into<String>) -> ClassId {
        self.push(ClassNode::unresolved(name.into(), ClassKind::LowerCase))
    }

    /// An entry for `prefix` (trailing dot included) plus `simple`, with
    /// package retries disabled.
    pub fn make_with_package(&mut self, prefix: &str, simple: &str) -> ClassId {
        debug_assert!(prefix.ends_with('.'));
        let name = format!("{prefix}{simple}");
        self.push(ClassNode::unresolved(
            name,
            ClassKind::WithPackage {
                prefix_len: prefix.len(),
            },
        ))
    }

    /// A candidate nested-class entry `Outer$Inner`. Dots in `inner` become
    /// dollars so deeper nesting stays a single mangled name.
    pub fn make_nested(&mut self, outer: ClassId, inner: &str) -> ClassId {
        let name = format!("{}${}", self.name_of(outer), inner.replace('.', "$"));
        self.push(ClassNode::unresolved(name, ClassKind::Nested { outer }))
    }

    /// An array entry over `component`.
    pub fn make_array(&mut self, component: ClassId) -> ClassId {
        let name = format!("{}[]", self.name_of(component));
        let mut node = ClassNode::unresolved(name, ClassKind::Plain);
        node.component = Some(component);
        self.push(node)
    }

    /// The canonical entry of a primitive name, if `name` is one.
    pub fn primitive(&self, name: &str) -> Option<ClassId> {
        if PRIMITIVES.contains(&name) {
            self.canonical.get(name).copied()
        } else {
            None
        }
    }

    /// The canonical `java.lang.Object` entry, interning it on first use.
    pub fn object_type(&mut self) -> ClassId {
        if let Some(&id) = self.canonical.get("java.lang.Object") {
            return id;
        }
        self.intern_loaded(LoadedClass::new("java.lang.Object"))
    }

    // ========================================================================
    // Loaded classes
    // ========================================================================

    /// Intern a loaded descriptor, returning its canonical entry. Interning
    /// the same name twice returns the original entry.
    pub fn intern_loaded(&mut self, descriptor: LoadedClass) -> ClassId {
        if let Some(&id) = self.canonical.get(&descriptor.name) {
            return id;
        }
        let loaded_id = LoadedClassId::new(self.loaded.len() as u32);
        let mut node = ClassNode::unresolved(descriptor.name.clone(), ClassKind::Plain);
        node.state = ClassState::Loaded(loaded_id);
        node.flags = descriptor.flags;
        self.loaded.push(descriptor);
        let id = self.push(node);
        self.canonical.insert(self.nodes[id.index()].name.clone(), id);
        id
    }

    /// The canonical entry for a loaded class name, if interned.
    pub fn canonical_loaded(&self, name: &str) -> Option<ClassId> {
        self.canonical.get(name).copied()
    }

    /// The interned descriptor backing an entry, if it is loaded.
    pub fn loaded_descriptor(&self, id: ClassId) -> Option<&LoadedClass> {
        match self.get(self.redirect_of(id)).state {
            ClassState::Loaded(lid) => Some(&self.loaded[lid.index()]),
            _ => None,
        }
    }

    /// Link a loaded entry to its canonical superclass entry.
    pub fn link_superclass(&mut self, id: ClassId, superclass: ClassId) {
        self.get_mut(id).superclass = Some(superclass);
    }

    // ========================================================================
    // Primary classes
    // ========================================================================

    /// Mark a declaration's entry as primary and record its signature
    /// summary for member queries.
    pub fn register_primary(&mut self, decl: &ClassDecl) {
        let members = self.member_table_of(decl);
        let node = self.get_mut(decl.class_id);
        node.name = decl.name.clone();
        node.state = ClassState::Primary;
        node.flags = decl.flags;
        node.superclass = Some(decl.superclass);
        node.interfaces = decl.interfaces.clone();
        node.enclosing = decl.enclosing;
        node.is_script = decl.is_script;
        node.members = Some(members);
    }

    fn member_table_of(&self, decl: &ClassDecl) -> MemberTable {
        let methods = decl
            .methods
            .iter()
            .filter(|m| !m.is_constructor)
            .map(|m| {
                let required = m
                    .params
                    .iter()
                    .filter(|p| p.default_value.is_none())
                    .count();
                let return_name = &self.get(m.return_type).name;
                MethodSig {
                    name: m.name.clone(),
                    flags: m.flags,
                    min_args: required,
                    max_args: Some(m.params.len()),
                    returns_boolean: return_name == "boolean"
                        || return_name == "Boolean"
                        || return_name == "java.lang.Boolean",
                }
            })
            .collect();
        let fields = decl
            .fields
            .iter()
            .map(|f| {
                let constant = match (&f.initializer, f.flags.is_static()) {
                    (Some(Expr::Constant(c)), true)
                        if f.flags.contains(tern_core::MemberFlags::FINAL) =>
                    {
                        Some(c.value.clone())
                    }
                    _ => None,
                };
                FieldSig {
                    name: f.name.clone(),
                    flags: f.flags,
                    is_property: f.is_property,
                    constant,
                }
            })
            .collect();
        MemberTable { methods, fields }
    }

    // ========================================================================
    // Redirects
    // ========================================================================

    /// Redirect `id` at `target`.
    ///
    /// Rejects self-redirects, redirect cycles, and rebinding a placeholder
    /// that already points elsewhere. All three are internal errors.
    pub fn set_redirect(&mut self, id: ClassId, target: ClassId) -> Result<(), BugError> {
        if id == target {
            return Err(BugError::SelfRedirect {
                name: self.get(id).name.clone(),
            });
        }
        if self.get(id).placeholder
            && let Some(existing) = self.get(id).redirect
            && existing != target
        {
            return Err(BugError::PlaceholderRebound {
                name: self.get(id).name.clone(),
            });
        }
        // Walk from the target; reaching `id` again would close a cycle.
        let mut seen = FxHashSet::default();
        let mut current = target;
        seen.insert(id);
        while let Some(next) = self.get(current).redirect {
            if !seen.insert(current) || next == id {
                return Err(BugError::RedirectCycle {
                    name: self.get(id).name.clone(),
                });
            }
            current = next;
        }
        self.get_mut(id).redirect = Some(target);
        Ok(())
    }

    /// Undo a trial redirect. Only lookup strategies probing candidates use
    /// this; a resolved entry is never un-resolved by the pipeline.
    pub fn clear_redirect(&mut self, id: ClassId) {
        self.get_mut(id).redirect = None;
    }

    /// Follow redirects to the terminal entry.
    pub fn redirect_of(&self, id: ClassId) -> ClassId {
        let mut current = id;
        let mut steps = 0usize;
        while let Some(next) = self.get(current).redirect {
            current = next;
            steps += 1;
            // set_redirect keeps the graph acyclic.
            debug_assert!(steps <= self.nodes.len(), "redirect cycle");
            if steps > self.nodes.len() {
                break;
            }
        }
        current
    }

    /// The terminal entry's name.
    pub fn name_of(&self, id: ClassId) -> &str {
        &self.get(self.redirect_of(id)).name
    }

    /// Whether the entry (through redirects) is bound to a definition.
    /// Array entries are resolved when their component is.
    pub fn is_resolved(&self, id: ClassId) -> bool {
        let terminal = self.redirect_of(id);
        let node = self.get(terminal);
        if let Some(component) = node.component {
            return self.is_resolved(component);
        }
        node.state != ClassState::Unresolved
    }

    /// Whether the entry (through redirects) is a primary class.
    pub fn is_primary(&self, id: ClassId) -> bool {
        self.get(self.redirect_of(id)).state == ClassState::Primary
    }

    /// The terminal entry's flags.
    pub fn flags_of(&self, id: ClassId) -> ClassFlags {
        self.get(self.redirect_of(id)).flags
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    /// The superclass entry of the terminal entry, if known.
    pub fn superclass_of(&self, id: ClassId) -> Option<ClassId> {
        let terminal = self.redirect_of(id);
        let node = self.get(terminal);
        match node.state {
            ClassState::Loaded(lid) => {
                if let Some(linked) = node.superclass {
                    return Some(linked);
                }
                // Fall back to an interned superclass by name.
                let super_name = self.loaded[lid.index()].superclass.as_deref()?;
                self.canonical_loaded(super_name)
            }
            _ => node.superclass,
        }
    }

    /// The chain of enclosing classes, innermost first.
    pub fn outer_chain(&self, id: ClassId) -> Vec<ClassId> {
        let mut chain = Vec::new();
        let mut current = self.get(self.redirect_of(id)).enclosing;
        let mut steps = 0usize;
        while let Some(outer) = current {
            chain.push(outer);
            current = self.get(self.redirect_of(outer)).enclosing;
            steps += 1;
            if steps > self.nodes.len() {
                break;
            }
        }
        chain
    }

    /// Whether `id` is `ancestor` or transitively extends/implements it.
    pub fn is_derived_from(&self, id: ClassId, ancestor: ClassId) -> bool {
        let target = self.redirect_of(ancestor);
        let mut seen = FxHashSet::default();
        let mut stack = vec![self.redirect_of(id)];
        while let Some(current) = stack.pop() {
            if current == target {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            if let Some(superclass) = self.superclass_of(current) {
                stack.push(self.redirect_of(superclass));
            }
            for &iface in &self.get(current).interfaces {
                stack.push(self.redirect_of(iface));
            }
        }
        false
    }

    fn members_at(&self, terminal: ClassId) -> Option<&MemberTable> {
        let node = self.get(terminal);
        match node.state {
            ClassState::Primary => node.members.as_ref(),
            ClassState::Loaded(lid) => Some(&self.loaded[lid.index()].members),
            ClassState::Unresolved => None,
        }
    }

    fn walk_hierarchy<R>(
        &self,
        id: ClassId,
        mut f: impl FnMut(ClassId, &MemberTable) -> Option<R>,
    ) -> Option<R> {
        let mut seen = FxHashSet::default();
        let mut current = Some(self.redirect_of(id));
        while let Some(terminal) = current {
            if !seen.insert(terminal) {
                break;
            }
            if let Some(table) = self.members_at(terminal)
                && let Some(result) = f(terminal, table)
            {
                return Some(result);
            }
            current = self.superclass_of(terminal).map(|s| self.redirect_of(s));
        }
        None
    }

    // ========================================================================
    // Member queries (hierarchy-wide)
    // ========================================================================

    /// Whether any method named `name` accepting `argc` arguments exists in
    /// the class or its superclasses.
    pub fn has_possible_method(&self, id: ClassId, name: &str, argc: Option<usize>) -> bool {
        self.walk_hierarchy(id, |_, table| table.has_possible_method(name, argc).then_some(()))
            .is_some()
    }

    /// Whether a static method named `name` accepting `argc` arguments
    /// exists in the class or its superclasses.
    pub fn has_possible_static_method(&self, id: ClassId, name: &str, argc: Option<usize>) -> bool {
        self.walk_hierarchy(id, |_, table| {
            table.has_possible_static_method(name, argc).then_some(())
        })
        .is_some()
    }

    /// Whether an instance method named `name` exists in the class or its
    /// superclasses.
    pub fn has_instance_method(&self, id: ClassId, name: &str) -> bool {
        self.walk_hierarchy(id, |_, table| table.has_instance_method(name).then_some(()))
            .is_some()
    }

    /// Find a static field by name, returning its declaring class.
    pub fn static_field(&self, id: ClassId, name: &str) -> Option<(ClassId, FieldSig)> {
        self.walk_hierarchy(id, |declaring, table| {
            table
                .field(name)
                .filter(|f| f.flags.is_static())
                .map(|f| (declaring, f.clone()))
        })
    }

    /// Whether a static property named `name` exists in the class or its
    /// superclasses.
    pub fn has_static_property(&self, id: ClassId, name: &str) -> bool {
        self.walk_hierarchy(id, |_, table| table.has_static_property(name).then_some(()))
            .is_some()
    }

    /// The literal value of a static final field, when the class defines one.
    pub fn find_constant(&self, id: ClassId, name: &str) -> Option<ConstantValue> {
        self.walk_hierarchy(id, |_, table| {
            table
                .field(name)
                .filter(|f| f.flags.is_static() && f.flags.contains(tern_core::MemberFlags::FINAL))
                .and_then(|f| f.constant.clone())
        })
    }

    /// Whether the class or a superclass could satisfy a static member
    /// reference: a static method, static property, or static field.
    pub fn has_possible_static_member(&self, id: ClassId, name: &str) -> bool {
        self.has_possible_static_method(id, name, None)
            || self.has_static_property(id, name)
            || self.static_field(id, name).is_some()
    }

    /// The simple name of the terminal entry (package stripped, nesting kept).
    pub fn simple_name_of(&self, id: ClassId) -> &str {
        names::simple_name_of(self.name_of(id))
    }
}

// ============================================================================
// Tests
// ============================================================================
