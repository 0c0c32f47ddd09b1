//! The name resolution pass.
//!
//! [`NameResolver`] walks one source unit and binds every type reference in
//! the class table, trying strategies in a fixed order:
//!
//! 1. already resolved / primary entry
//! 2. array component
//! 3. generics placeholder in scope
//! 4. the current class's own simple name
//! 5. nested classes of the current class, its hierarchy, and its outers
//! 6. the module's imports (aliases, package-local, single static, star,
//!    static star)
//! 7. sibling classes of the compilation unit
//! 8. the default import packages
//! 9. the outer world, through [`ClassNodeResolver`]
//! 10. dot-to-dollar mangling for inner classes written with dots
//!
//! Alongside type binding, the pass rewrites expressions whose meaning the
//! bindings decide: unbound variables that name classes become class
//! literals, dotted constant chains collapse into qualified class literals,
//! and `Type[]`/`Type[k:v]` subscripts on class literals become array types
//! and casts.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use tern_ast::{
    AnnotationNode, BinOp, BinaryExpr, CastExpr, ClassDecl, ClassExpr, ClosureExpr,
    ConstructorCallExpr, ConstructorKind, DeclarationExpr, Expr, FieldDecl, ImportKind,
    MethodCallExpr, MethodDecl, ModuleNode, PropertyExpr, ScopeArena, Stmt, VariableExpr,
};
use tern_core::{
    BugError, ClassId, ErrorCollector, GenericsType, ResolveError, ScopeId, Span, names,
};
use tern_registry::{ClassArena, ClassKind, ClassLoader, CompileUnit};

use crate::lookup::{ClassNodeResolver, Lookup};

/// The packages tried for any unqualified name that nothing closer claims.
const DEFAULT_IMPORTS: &[&str] = &[
    "java.lang.",
    "java.util.",
    "java.io.",
    "java.net.",
    "tern.lang.",
    "tern.util.",
];

/// Which strategy groups a lookup may use. Constructed candidate names
/// disable the groups that would re-derive them and loop.
#[derive(Debug, Clone, Copy)]
pub struct LookupOpts {
    pub module_imports: bool,
    pub default_imports: bool,
    pub static_inner: bool,
}

impl LookupOpts {
    pub const ALL: LookupOpts = LookupOpts {
        module_imports: true,
        default_imports: true,
        static_inner: true,
    };
    pub const NONE: LookupOpts = LookupOpts {
        module_imports: false,
        default_imports: false,
        static_inner: false,
    };
    /// Nested-candidate lookups: no imports, but inner mangling allowed.
    pub const INNER: LookupOpts = LookupOpts {
        module_imports: false,
        default_imports: false,
        static_inner: true,
    };
}

/// Context that flows down the expression walk by value. Each recursion
/// owns its copy, so there is no save-and-restore bookkeeping.
#[derive(Debug, Clone, Copy, Default)]
struct Walk {
    /// This expression is the object of an enclosing property access.
    in_property_chain: bool,
    /// This expression sits on the left of a declaration.
    declaring_variable: bool,
}

/// Resolves every type reference of one source unit.
pub struct NameResolver<'a> {
    arena: &'a mut ClassArena,
    module: &'a mut ModuleNode,
    scopes: &'a mut ScopeArena,
    unit: &'a mut CompileUnit,
    lookup: &'a mut ClassNodeResolver,
    loader: &'a dyn ClassLoader,
    errors: &'a mut ErrorCollector,
    current_class: ClassId,
    current_scope: Option<ScopeId>,
    /// Type parameters in scope, by name, mapped at their backing entries.
    generic_parameters: FxHashMap<String, ClassId>,
    /// Index of the import whose own class reference is being resolved, so
    /// alias lookup does not match an import against itself.
    resolving_import: Option<usize>,
    /// Span of the reference currently being resolved, for diagnostics
    /// raised deep inside a strategy.
    current_span: Span,
}

impl<'a> NameResolver<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        arena: &'a mut ClassArena,
        module: &'a mut ModuleNode,
        scopes: &'a mut ScopeArena,
        unit: &'a mut CompileUnit,
        lookup: &'a mut ClassNodeResolver,
        loader: &'a dyn ClassLoader,
        errors: &'a mut ErrorCollector,
    ) -> Self {
        Self {
            arena,
            module,
            scopes,
            unit,
            lookup,
            loader,
            errors,
            current_class: ClassId::new(0),
            current_scope: None,
            generic_parameters: FxHashMap::default(),
            resolving_import: None,
            current_span: Span::point(0, 0),
        }
    }

    // ========================================================================
    // Declaration walk
    // ========================================================================

    /// Resolve one class declaration. The first class of a module also
    /// resolves the module's import table.
    pub fn visit_class(&mut self, class: &mut ClassDecl) -> Result<(), BugError> {
        tracing::debug!(class = %class.name, "resolving class");
        self.current_class = class.class_id;

        if !self.module.imports_resolved {
            self.resolve_module_imports()?;
            self.module.imports_resolved = true;
        }

        self.generic_parameters.clear();
        if class.is_nested() && !class.flags.is_static() {
            // Inner classes see the type parameters of their outers.
            for outer in self.arena.outer_chain(class.class_id) {
                let terminal = self.arena.redirect_of(outer);
                if let Some(generics) = self.arena.get(terminal).generics.clone() {
                    self.install_placeholders(&generics);
                }
            }
        }
        if let Some(mut generics) = class.generics.take() {
            self.current_span = class.span;
            self.resolve_generics_header(&mut generics)?;
            // Keep a copy on the table entry so inner classes can inherit
            // the placeholders without reaching back into the declaration.
            self.arena.get_mut(class.class_id).generics = Some(generics.clone());
            class.generics = Some(generics);
        }

        self.resolve_supertype(class.superclass, class.span)?;
        for i in 0..class.interfaces.len() {
            self.resolve_supertype(class.interfaces[i], class.span)?;
        }
        self.check_cyclic_inheritance(class);
        self.visit_annotations(&mut class.annotations)?;

        for field in &mut class.fields {
            self.visit_field(field)?;
        }
        for method in &mut class.methods {
            self.visit_method(method)?;
        }
        Ok(())
    }

    /// Resolve a superclass or interface reference: aliases win over other
    /// strategies, and wildcard type arguments are rejected.
    fn resolve_supertype(&mut self, ty: ClassId, span: Span) -> Result<(), BugError> {
        self.current_span = span;
        let resolved = self.resolve_alias_from_module(ty)? || self.resolve(ty)?;
        if !resolved && !self.resolve_to_inner_name(ty)? {
            self.errors.report(ResolveError::UnresolvedClass {
                name: self.arena.get(ty).name.clone(),
                span,
            });
            return Ok(());
        }
        if let Some(generics) = &self.arena.get(ty).generics
            && generics.iter().any(GenericsType::is_wildcard)
        {
            self.errors.report(ResolveError::WildcardSupertype {
                name: self.arena.name_of(ty).to_string(),
                span,
            });
        }
        Ok(())
    }

    fn check_cyclic_inheritance(&mut self, class: &ClassDecl) {
        let me = class.class_id;
        let cyclic = self.arena.is_derived_from(class.superclass, me)
            || class
                .interfaces
                .iter()
                .any(|&iface| self.arena.is_derived_from(iface, me));
        if cyclic {
            self.errors.report(ResolveError::CyclicInheritance {
                name: class.name.clone(),
                span: class.span,
            });
        }
    }

    fn visit_field(&mut self, field: &mut FieldDecl) -> Result<(), BugError> {
        self.resolve_or_fail(field.ty, field.span)?;
        self.visit_annotations(&mut field.annotations)?;
        if let Some(init) = field.initializer.take() {
            field.initializer = Some(self.transform(init, Walk::default())?);
        }
        Ok(())
    }

    fn visit_method(&mut self, method: &mut MethodDecl) -> Result<(), BugError> {
        let saved_generics = self.generic_parameters.clone();
        if method.is_static() {
            // Static methods do not see the class's type parameters.
            self.generic_parameters.clear();
        }
        if let Some(mut generics) = method.generics.take() {
            self.current_span = method.span;
            self.resolve_generics_header(&mut generics)?;
            method.generics = Some(generics);
        }

        let saved_scope = self.current_scope;
        self.current_scope = Some(method.scope);
        for param in &mut method.params {
            if let Some(default) = param.default_value.take() {
                param.default_value = Some(self.transform(default, Walk::default())?);
            }
            self.resolve_or_fail(param.ty, param.span)?;
            self.visit_annotations(&mut param.annotations)?;
        }
        for i in 0..method.exceptions.len() {
            self.resolve_or_fail(method.exceptions[i], method.span)?;
        }
        self.resolve_or_fail(method.return_type, method.span)?;
        self.visit_annotations(&mut method.annotations)?;
        if let Some(body) = method.body.as_mut() {
            self.visit_stmt(body, Walk::default())?;
        }
        self.current_scope = saved_scope;
        self.generic_parameters = saved_generics;
        Ok(())
    }

    fn visit_annotations(&mut self, annotations: &mut [AnnotationNode]) -> Result<(), BugError> {
        let mut seen: FxHashSet<ClassId> = FxHashSet::default();
        for annotation in annotations.iter_mut() {
            self.resolve_or_fail(annotation.ty, annotation.span)?;
            let terminal = self.arena.redirect_of(annotation.ty);
            if self.arena.is_resolved(annotation.ty) && !seen.insert(terminal) {
                self.errors.report(ResolveError::DuplicateAnnotation {
                    name: self.arena.name_of(annotation.ty).to_string(),
                    span: annotation.span,
                });
            }
            for (_, value) in annotation.members.iter_mut() {
                let taken = value.take();
                *value = self.transform(taken, Walk::default())?;
            }
        }
        Ok(())
    }

    // ========================================================================
    // Statement walk
    // ========================================================================

    fn visit_stmt(&mut self, stmt: &mut Stmt, walk: Walk) -> Result<(), BugError> {
        match stmt {
            Stmt::Block(block) => {
                let saved = self.current_scope;
                self.current_scope = Some(block.scope);
                for stmt in &mut block.stmts {
                    self.visit_stmt(stmt, walk)?;
                }
                self.current_scope = saved;
            }
            Stmt::Expr(stmt) => {
                let expr = stmt.expr.take();
                stmt.expr = self.transform(expr, walk)?;
            }
            Stmt::If(stmt) => {
                let cond = stmt.cond.take();
                stmt.cond = self.transform(cond, walk)?;
                self.visit_stmt(&mut stmt.then, walk)?;
                if let Some(otherwise) = stmt.otherwise.as_mut() {
                    self.visit_stmt(otherwise, walk)?;
                }
            }
            Stmt::While(stmt) => {
                let cond = stmt.cond.take();
                stmt.cond = self.transform(cond, walk)?;
                self.visit_stmt(&mut stmt.body, walk)?;
            }
            Stmt::For(stmt) => {
                self.resolve_or_fail(stmt.variable.ty, stmt.variable.span)?;
                let collection = stmt.collection.take();
                stmt.collection = self.transform(collection, walk)?;
                let saved = self.current_scope;
                self.current_scope = Some(stmt.scope);
                self.visit_stmt(&mut stmt.body, walk)?;
                self.current_scope = saved;
            }
            Stmt::Return(stmt) => {
                if let Some(expr) = stmt.expr.as_mut() {
                    let taken = expr.take();
                    *expr = self.transform(taken, walk)?;
                }
            }
            Stmt::Throw(stmt) => {
                let expr = stmt.expr.take();
                stmt.expr = self.transform(expr, walk)?;
            }
            Stmt::TryCatch(stmt) => {
                self.visit_stmt(&mut stmt.body, walk)?;
                for catch in &mut stmt.catches {
                    // An untyped catch parameter catches Exception.
                    if self.arena.get(catch.parameter.ty).name == "def" {
                        let exception = self.arena.make("java.lang.Exception");
                        self.resolve_or_fail(exception, catch.parameter.span)?;
                        catch.parameter.ty = exception;
                    } else {
                        self.resolve_or_fail(catch.parameter.ty, catch.parameter.span)?;
                    }
                    self.visit_stmt(&mut catch.body, walk)?;
                }
                if let Some(finally) = stmt.finally.as_mut() {
                    self.visit_stmt(finally, walk)?;
                }
            }
        }
        Ok(())
    }

    // ========================================================================
    // Expression transforms
    // ========================================================================

    fn transform(&mut self, expr: Expr, walk: Walk) -> Result<Expr, BugError> {
        match expr {
            Expr::Variable(e) => self.transform_variable(e, walk),
            Expr::Property(e) => self.transform_property(*e, walk),
            Expr::MethodCall(e) => self.transform_method_call(*e, walk),
            Expr::ConstructorCall(e) => self.transform_constructor_call(*e, walk),
            Expr::Binary(e) => self.transform_binary(*e, walk),
            Expr::Declaration(e) => self.transform_declaration(*e, walk),
            Expr::Closure(e) => self.transform_closure(*e),
            Expr::Cast(mut e) => {
                self.resolve_or_fail(e.ty, e.span)?;
                e.operand = self.transform(e.operand, Walk::default())?;
                Ok(Expr::Cast(e))
            }
            Expr::StaticMethodCall(mut e) => {
                e.args = self.transform_all(e.args)?;
                Ok(Expr::StaticMethodCall(e))
            }
            Expr::List(mut e) => {
                e.elements = self.transform_all(e.elements)?;
                Ok(Expr::List(e))
            }
            Expr::Map(mut e) => {
                for entry in &mut e.entries {
                    let key = entry.key.take();
                    entry.key = self.transform(key, Walk::default())?;
                    let value = entry.value.take();
                    entry.value = self.transform(value, Walk::default())?;
                }
                Ok(Expr::Map(e))
            }
            leaf @ (Expr::Empty(_) | Expr::Constant(_) | Expr::Class(_)) => Ok(leaf),
        }
    }

    fn transform_all(&mut self, exprs: Vec<Expr>) -> Result<Vec<Expr>, BugError> {
        let mut out = Vec::with_capacity(exprs.len());
        for expr in exprs {
            out.push(self.transform(expr, Walk::default())?);
        }
        Ok(out)
    }

    /// An unbound variable whose name resolves to a class becomes a class
    /// literal, and the stale dynamic reference is scrubbed from the scopes.
    fn transform_variable(&mut self, var: VariableExpr, walk: Walk) -> Result<Expr, BugError> {
        if var.is_dynamic() {
            self.current_span = var.span;
            let ty = if let Some(primitive) = self.arena.primitive(&var.name) {
                primitive
            } else if names::starts_lower_case(&var.name) {
                self.arena.make_lower_case(var.name.clone())
            } else {
                self.arena.make(var.name.clone())
            };
            if self.arena.is_resolved(ty) || self.resolve(ty)? {
                if let Some(scope) = self.current_scope {
                    self.scopes.remove_dynamic_reference(scope, &var.name);
                }
                return Ok(Expr::Class(ClassExpr { ty, span: var.span }));
            }
        } else if walk.declaring_variable
            && let Some(ty) = var.ty
        {
            self.resolve_or_fail(ty, var.span)?;
        }
        Ok(Expr::Variable(var))
    }

    fn transform_property(&mut self, mut prop: PropertyExpr, walk: Walk) -> Result<Expr, BugError> {
        let top_level = !walk.in_property_chain;
        prop.object = self.transform(
            prop.object,
            Walk {
                in_property_chain: true,
                ..Walk::default()
            },
        )?;
        prop.property = self.transform(prop.property, Walk::default())?;

        // A chain of constant names may spell one qualified class name.
        if let Some(name) = dotted_name_of(&prop) {
            self.current_span = prop.span;
            let ty = self.arena.make(name);
            if self.resolve(ty)? {
                return Ok(Expr::Class(ClassExpr {
                    ty,
                    span: prop.span,
                }));
            }
        }

        // `Owner.Inner` where `Inner` is a static class nested somewhere in
        // Owner's hierarchy.
        if let Expr::Class(class) = &prop.object
            && let Some(inner) = prop.property_name().map(str::to_string)
            && !names::starts_lower_case(&inner)
        {
            self.current_span = prop.span;
            for owner in self.hierarchy_chain(class.ty) {
                let candidate = self.arena.make_nested(owner, &inner);
                if self.resolve_from_compile_unit(candidate)? || self.resolve_to_outer(candidate)? {
                    return Ok(Expr::Class(ClassExpr {
                        ty: candidate,
                        span: prop.span,
                    }));
                }
            }
        }

        self.check_qualified_this_super(&prop);
        let result = Expr::Property(Box::new(prop));
        Ok(if top_level {
            strip_class_literal(result)
        } else {
            result
        })
    }

    /// `Outer.this` / `Outer.super` is only valid in a nested class whose
    /// outer chain contains the qualifier.
    fn check_qualified_this_super(&mut self, prop: &PropertyExpr) {
        let Some(name) = prop.property_name() else {
            return;
        };
        if name != "this" && name != "super" {
            return;
        }
        let Expr::Class(class) = &prop.object else {
            return;
        };
        let outers = self.arena.outer_chain(self.current_class);
        if outers.is_empty() {
            self.errors
                .report(ResolveError::QualifiedThisInTopLevel { span: prop.span });
            return;
        }
        let qualifier = self.arena.redirect_of(class.ty);
        let enclosing = outers
            .iter()
            .any(|&outer| self.arena.redirect_of(outer) == qualifier);
        if !enclosing {
            self.errors.report(ResolveError::NotAnOuterClass {
                qualifier: self.arena.name_of(class.ty).to_string(),
                current: self.arena.name_of(self.current_class).to_string(),
                span: prop.span,
            });
        }
    }

    fn transform_method_call(
        &mut self,
        mut call: MethodCallExpr,
        _walk: Walk,
    ) -> Result<Expr, BugError> {
        call.object = self.transform(call.object, Walk::default())?;
        call.method = self.transform(call.method, Walk::default())?;
        call.args = self.transform_all(call.args)?;
        Ok(Expr::MethodCall(Box::new(call)))
    }

    fn transform_constructor_call(
        &mut self,
        mut call: ConstructorCallExpr,
        _walk: Walk,
    ) -> Result<Expr, BugError> {
        if call.kind == ConstructorKind::New {
            self.resolve_or_fail(call.ty, call.span)?;
            let flags = self.arena.flags_of(call.ty);
            if self.arena.is_resolved(call.ty) && flags.is_abstract() {
                self.errors.report(ResolveError::AbstractInstantiation {
                    name: self.arena.name_of(call.ty).to_string(),
                    span: call.span,
                });
            }
        }
        call.args = self.transform_all(call.args)?;
        Ok(Expr::ConstructorCall(Box::new(call)))
    }

    fn transform_binary(&mut self, mut bin: BinaryExpr, walk: Walk) -> Result<Expr, BugError> {
        bin.left = self.transform(bin.left, walk)?;
        if let Expr::Class(class) = &bin.left {
            if bin.op.is_assignment() {
                self.errors.report(ResolveError::AssignToClass {
                    name: self.arena.name_of(class.ty).to_string(),
                    span: bin.span,
                });
            } else if bin.op == BinOp::Index {
                // `Type[]` parses as a subscript on a class literal; an
                // empty list subscript means the array type, a map literal
                // means a coercing cast.
                match &bin.right {
                    Expr::List(list) if list.elements.is_empty() => {
                        let array = self.arena.make_array(class.ty);
                        return Ok(Expr::Class(ClassExpr {
                            ty: array,
                            span: bin.span,
                        }));
                    }
                    Expr::Map(_) => {
                        let ty = class.ty;
                        let span = bin.span;
                        let operand = self.transform(bin.right, Walk::default())?;
                        return Ok(Expr::Cast(Box::new(CastExpr {
                            ty,
                            operand,
                            coerce: true,
                            span,
                        })));
                    }
                    _ => {}
                }
            }
        }
        bin.right = self.transform(bin.right, Walk::default())?;
        Ok(Expr::Binary(Box::new(bin)))
    }

    fn transform_declaration(
        &mut self,
        mut decl: DeclarationExpr,
        _walk: Walk,
    ) -> Result<Expr, BugError> {
        decl.left = self.transform(
            decl.left,
            Walk {
                declaring_variable: true,
                ..Walk::default()
            },
        )?;
        if let Expr::Class(class) = &decl.left {
            self.errors.report(ResolveError::AssignToClass {
                name: self.arena.name_of(class.ty).to_string(),
                span: decl.span,
            });
        }
        decl.right = self.transform(decl.right, Walk::default())?;
        Ok(Expr::Declaration(Box::new(decl)))
    }

    fn transform_closure(&mut self, mut closure: ClosureExpr) -> Result<Expr, BugError> {
        let saved = self.current_scope;
        self.current_scope = Some(closure.scope);
        for param in &mut closure.params {
            if let Some(default) = param.default_value.take() {
                param.default_value = Some(self.transform(default, Walk::default())?);
            }
            self.resolve_or_fail(param.ty, param.span)?;
            self.visit_annotations(&mut param.annotations)?;
        }
        self.visit_stmt(&mut closure.body, Walk::default())?;
        self.current_scope = saved;
        Ok(Expr::Closure(Box::new(closure)))
    }

    // ========================================================================
    // Lookup strategies
    // ========================================================================

    /// Resolve a type reference or report an unresolved-class error.
    pub fn resolve_or_fail(&mut self, ty: ClassId, span: Span) -> Result<bool, BugError> {
        self.current_span = span;
        if self.resolve(ty)? || self.resolve_to_inner_name(ty)? {
            return Ok(true);
        }
        self.errors.report(ResolveError::UnresolvedClass {
            name: self.arena.get(ty).name.clone(),
            span,
        });
        Ok(false)
    }

    /// Resolve with every strategy group enabled.
    pub fn resolve(&mut self, ty: ClassId) -> Result<bool, BugError> {
        self.resolve_with(ty, LookupOpts::ALL)
    }

    fn resolve_with(&mut self, ty: ClassId, opts: LookupOpts) -> Result<bool, BugError> {
        // Usage-site type arguments resolve regardless of how the base name
        // does; a resolved argument entry is never resolved twice.
        if let Some(mut generics) = self.arena.get_mut(ty).generics.take() {
            for arg in &mut generics {
                self.resolve_generics_usage(arg)?;
            }
            self.arena.get_mut(ty).generics = Some(generics);
        }

        if self.arena.is_resolved(ty) || self.arena.is_primary(ty) {
            return Ok(true);
        }

        if let Some(component) = self.arena.get(ty).component {
            if self.resolve_with(component, opts)? {
                return Ok(true);
            }
            return Ok(false);
        }

        let name = self.arena.get(ty).name.clone();
        tracing::trace!(name = %name, "resolving type reference");

        if let Some(&backing) = self.generic_parameters.get(&name) {
            if backing != ty {
                self.arena.set_redirect(ty, backing)?;
            }
            self.arena.get_mut(ty).placeholder = true;
            return Ok(true);
        }

        if ty == self.current_class
            || self.arena.redirect_of(ty) == self.arena.redirect_of(self.current_class)
        {
            return Ok(true);
        }
        if names::simple_name_of(self.arena.get(self.current_class).name.as_str()) == name {
            self.arena.set_redirect(ty, self.current_class)?;
            return Ok(true);
        }

        let unqualified = !names::has_package(&name);
        if unqualified && self.resolve_nested(ty)? {
            return Ok(true);
        }
        if self.resolve_from_module(ty, opts.module_imports)? {
            return Ok(true);
        }
        if self.resolve_from_compile_unit(ty)? {
            return Ok(true);
        }
        if opts.default_imports && unqualified && self.resolve_from_default_imports(ty)? {
            return Ok(true);
        }
        if self.resolve_to_outer(ty)? {
            return Ok(true);
        }
        if opts.static_inner && !unqualified && self.resolve_from_static_inner(ty)? {
            return Ok(true);
        }
        Ok(false)
    }

    /// The current class, its superclass chain, and its outer classes, as
    /// candidate owners for a nested-class name.
    fn hierarchy_chain(&self, id: ClassId) -> Vec<ClassId> {
        let mut chain = Vec::new();
        let mut seen = FxHashSet::default();
        let mut current = Some(self.arena.redirect_of(id));
        while let Some(terminal) = current {
            if !seen.insert(terminal) {
                break;
            }
            chain.push(terminal);
            current = self
                .arena
                .superclass_of(terminal)
                .map(|s| self.arena.redirect_of(s));
        }
        chain
    }

    fn resolve_nested(&mut self, ty: ClassId) -> Result<bool, BugError> {
        let name = self.arena.get(ty).name.clone();
        let mut owners = self.hierarchy_chain(self.current_class);
        for outer in self.arena.outer_chain(self.current_class) {
            owners.extend(self.hierarchy_chain(outer));
        }
        for owner in owners {
            if self.arena.name_of(owner) == name {
                continue;
            }
            let candidate = self.arena.make_nested(owner, &name);
            if self.resolve_from_compile_unit(candidate)? || self.resolve_to_outer(candidate)? {
                let target = self.arena.redirect_of(candidate);
                self.arena.set_redirect(ty, target)?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn resolve_from_module(&mut self, ty: ClassId, test_imports: bool) -> Result<bool, BugError> {
        let kind = self.arena.get(ty).kind;
        if matches!(kind, ClassKind::Nested { .. }) {
            return Ok(false);
        }
        let name = self.arena.get(ty).name.clone();

        // Classes declared in this module, by plain or package-qualified name.
        let qualified = match &self.module.package {
            Some(package) if !names::has_package(&name) => Some(format!("{package}.{name}")),
            _ => None,
        };
        for sibling in self.module.classes.clone() {
            let sibling_name = self.arena.get(sibling).name.clone();
            if sibling_name == name || qualified.as_deref() == Some(sibling_name.as_str()) {
                if self.arena.redirect_of(ty) != self.arena.redirect_of(sibling) {
                    self.arena.set_redirect(ty, sibling)?;
                }
                return Ok(true);
            }
        }

        if !test_imports {
            return Ok(false);
        }
        if self.resolve_alias_from_module(ty)? {
            return Ok(true);
        }

        let constructed = matches!(kind, ClassKind::WithPackage { .. });
        if constructed || names::has_package(&name) {
            return Ok(false);
        }

        // Package-local classes outside the current module.
        if let Some(package) = self.module.package.clone() {
            let candidate = self.arena.make_with_package(&format!("{package}."), &name);
            if self.resolve_with(candidate, LookupOpts::NONE)? {
                let target = self.arena.redirect_of(candidate);
                self.arena.set_redirect(ty, target)?;
                return Ok(true);
            }
        }

        // A single static import whose member is actually a nested type.
        if let Some((owner, member)) = self
            .module
            .static_import(&name)
            .map(|(owner, member)| (owner, member.to_string()))
            && self.arena.is_resolved(owner)
        {
            let candidate = self.arena.make_nested(owner, &member);
            if self.resolve_with(candidate, LookupOpts::INNER)?
                && self.arena.flags_of(candidate).is_static()
            {
                let target = self.arena.redirect_of(candidate);
                self.arena.set_redirect(ty, target)?;
                return Ok(true);
            }
        }

        // Star imports. Two packages supplying the name is an ambiguity; the
        // later import wins so resolution can continue.
        let stars: SmallVec<[String; 4]> =
            self.module.star_imports().map(str::to_string).collect();
        let mut found: SmallVec<[ClassId; 2]> = SmallVec::new();
        for package in &stars {
            let candidate = self.arena.make_with_package(&format!("{package}."), &name);
            if self.resolve_with(candidate, LookupOpts::INNER)? {
                found.push(self.arena.redirect_of(candidate));
                if found.len() == 2 {
                    break;
                }
            }
        }
        if let Some(&last) = found.last() {
            if found.len() == 2 {
                self.errors.report(ResolveError::AmbiguousClass {
                    name: name.clone(),
                    first: self.arena.name_of(found[0]).to_string(),
                    second: self.arena.name_of(found[1]).to_string(),
                    span: self.current_span,
                });
            }
            self.arena.set_redirect(ty, last)?;
            return Ok(true);
        }

        // Types nested in statically star-imported classes.
        let static_stars: SmallVec<[ClassId; 2]> = self.module.static_star_imports().collect();
        for owner in static_stars {
            if !self.arena.is_resolved(owner) {
                continue;
            }
            let candidate = self.arena.make_nested(owner, &name);
            if self.resolve_with(candidate, LookupOpts::INNER)?
                && self.arena.flags_of(candidate).is_static()
            {
                let target = self.arena.redirect_of(candidate);
                self.arena.set_redirect(ty, target)?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Aliases cover dotted names too: for `A.B.C`, each prefix is tried as
    /// an alias, and the remainder becomes a nested-class suffix.
    fn resolve_alias_from_module(&mut self, ty: ClassId) -> Result<bool, BugError> {
        let kind = self.arena.get(ty).kind;
        if matches!(
            kind,
            ClassKind::WithPackage { .. } | ClassKind::Nested { .. }
        ) {
            return Ok(false);
        }
        let name = self.arena.get(ty).name.clone();
        let mut prefix = name.as_str();
        loop {
            if let Some(target) = self.single_import_excluding_current(prefix) {
                if prefix == name {
                    if self.arena.is_resolved(target) || self.arena.is_primary(target) {
                        let terminal = self.arena.redirect_of(target);
                        if terminal != ty {
                            self.arena.set_redirect(ty, terminal)?;
                        }
                        return Ok(true);
                    }
                } else {
                    // Alias names a class; the rest of the dotted name must
                    // be nested classes inside it.
                    let rest = name[prefix.len() + 1..].replace('.', "$");
                    let target_name = self.arena.name_of(target).to_string();
                    let candidate = match names::package_of(&target_name) {
                        Some(package) => {
                            let simple = names::simple_name_of(&target_name);
                            self.arena
                                .make_with_package(&format!("{package}."), &format!("{simple}${rest}"))
                        }
                        None => self.arena.make(format!("{target_name}${rest}")),
                    };
                    if self.resolve_with(candidate, LookupOpts::NONE)? {
                        let terminal = self.arena.redirect_of(candidate);
                        self.arena.set_redirect(ty, terminal)?;
                        return Ok(true);
                    }
                }
            }
            match prefix.rfind('.') {
                Some(dot) => prefix = &name[..dot],
                None => return Ok(false),
            }
        }
    }

    fn single_import_excluding_current(&self, alias: &str) -> Option<ClassId> {
        self.module
            .imports
            .iter()
            .enumerate()
            .find_map(|(index, node)| {
                if Some(index) == self.resolving_import {
                    return None;
                }
                match &node.kind {
                    ImportKind::Single { alias: a, ty } if a == alias => Some(*ty),
                    _ => None,
                }
            })
    }

    fn resolve_from_compile_unit(&mut self, ty: ClassId) -> Result<bool, BugError> {
        let name = self.arena.get(ty).name.clone();
        if let Some(sibling) = self.unit.get_class(&name) {
            if self.arena.redirect_of(ty) != self.arena.redirect_of(sibling) {
                self.arena.set_redirect(ty, sibling)?;
            }
            return Ok(true);
        }
        Ok(false)
    }

    fn resolve_from_default_imports(&mut self, ty: ClassId) -> Result<bool, BugError> {
        let kind = self.arena.get(ty).kind;
        if matches!(kind, ClassKind::LowerCase) {
            return Ok(false);
        }
        let name = self.arena.get(ty).name.clone();
        for package in DEFAULT_IMPORTS {
            let candidate = self.arena.make_with_package(package, &name);
            if self.resolve_with(candidate, LookupOpts::NONE)? {
                let target = self.arena.redirect_of(candidate);
                self.arena.set_redirect(ty, target)?;
                return Ok(true);
            }
        }
        if name == "BigInteger" || name == "BigDecimal" {
            let candidate = self.arena.make_with_package("java.math.", &name);
            if self.resolve_with(candidate, LookupOpts::NONE)? {
                let target = self.arena.redirect_of(candidate);
                self.arena.set_redirect(ty, target)?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn resolve_to_outer(&mut self, ty: ClassId) -> Result<bool, BugError> {
        let kind = self.arena.get(ty).kind;
        let name = self.arena.get(ty).name.clone();
        if matches!(kind, ClassKind::LowerCase) {
            // A plain lower-case name is never a class; remember the miss so
            // later mentions short-circuit.
            self.lookup.cache_no_class(&name);
            return Ok(false);
        }
        // In a package-scoped module an unqualified name must have matched a
        // closer strategy; the loader only sees qualified names.
        if self.module.has_package() && !name.contains('.') && !name.contains('$') {
            return Ok(false);
        }
        match self.lookup.resolve_name(&name, self.arena, self.loader) {
            Some(Lookup::Class(found)) => {
                self.arena.set_redirect(ty, found)?;
                Ok(true)
            }
            Some(Lookup::Script(source)) => {
                // Queue the source and treat the reference as resolved; the
                // driver drains the queue and redirects the forwards.
                self.unit.enqueue_script(source, ty, self.current_span);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// `a.b.Outer.Inner` written with dots: mangle trailing dots into `$`
    /// one at a time and retry.
    fn resolve_from_static_inner(&mut self, ty: ClassId) -> Result<bool, BugError> {
        match self.arena.get(ty).kind {
            ClassKind::LowerCase | ClassKind::Nested { .. } => Ok(false),
            ClassKind::WithPackage { prefix_len } => {
                let name = self.arena.get(ty).name.clone();
                let Some(mangled) = names::replace_last_dot_with_dollar(&name[prefix_len..]) else {
                    return Ok(false);
                };
                self.arena.get_mut(ty).name = format!("{}{}", &name[..prefix_len], mangled);
                if self.resolve_with(ty, LookupOpts::INNER)? {
                    return Ok(true);
                }
                self.arena.get_mut(ty).name = name;
                Ok(false)
            }
            ClassKind::Plain => {
                let name = self.arena.get(ty).name.clone();
                let Some(mangled) = names::replace_last_dot_with_dollar(&name) else {
                    return Ok(false);
                };
                self.arena.get_mut(ty).name = mangled;
                if self.resolve_with(
                    ty,
                    LookupOpts {
                        module_imports: false,
                        default_imports: true,
                        static_inner: true,
                    },
                )? {
                    return Ok(true);
                }
                self.arena.get_mut(ty).name = name;
                Ok(false)
            }
        }
    }

    /// Full-strategy retry under dot-to-dollar mangling, used as the last
    /// resort before reporting an unresolved class.
    fn resolve_to_inner_name(&mut self, ty: ClassId) -> Result<bool, BugError> {
        if !matches!(self.arena.get(ty).kind, ClassKind::Plain) {
            return Ok(false);
        }
        let saved = self.arena.get(ty).name.clone();
        let mut name = saved.clone();
        while let Some(mangled) = names::replace_last_dot_with_dollar(&name) {
            name = mangled.clone();
            self.arena.get_mut(ty).name = mangled;
            if self.resolve(ty)? {
                return Ok(true);
            }
        }
        self.arena.get_mut(ty).name = saved;
        Ok(false)
    }

    // ========================================================================
    // Imports
    // ========================================================================

    fn resolve_module_imports(&mut self) -> Result<(), BugError> {
        for index in 0..self.module.imports.len() {
            let node = &self.module.imports[index];
            let span = node.span;
            let kind = node.kind.clone();
            self.resolving_import = Some(index);
            self.current_span = span;
            match kind {
                ImportKind::Single { ty, .. } => {
                    if !self.resolve_with(ty, LookupOpts::INNER)? {
                        self.errors.report(ResolveError::UnresolvedClass {
                            name: self.arena.get(ty).name.clone(),
                            span,
                        });
                    }
                }
                ImportKind::StaticSingle { ty, .. } => {
                    if !self.resolve(ty)? {
                        self.errors.report(ResolveError::UnresolvedClass {
                            name: self.arena.get(ty).name.clone(),
                            span,
                        });
                    }
                }
                ImportKind::StaticStar { ty } => {
                    if !self.resolve_with(ty, LookupOpts::INNER)? && !self.retry_in_package(ty)? {
                        self.errors.report(ResolveError::UnresolvedClass {
                            name: self.arena.get(ty).name.clone(),
                            span,
                        });
                    }
                }
                ImportKind::Star { .. } => {
                    // Packages are not validated; resolution of names under
                    // them happens per use.
                }
            }
            self.resolving_import = None;
        }
        Ok(())
    }

    /// An unqualified static-star import may name a class in the module's
    /// own package.
    fn retry_in_package(&mut self, ty: ClassId) -> Result<bool, BugError> {
        let Some(package) = self.module.package.clone() else {
            return Ok(false);
        };
        let name = self.arena.get(ty).name.clone();
        if names::has_package(&name) {
            return Ok(false);
        }
        let candidate = self.arena.make_with_package(&format!("{package}."), &name);
        if self.resolve_with(candidate, LookupOpts::NONE)? {
            let target = self.arena.redirect_of(candidate);
            self.arena.set_redirect(ty, target)?;
            return Ok(true);
        }
        Ok(false)
    }

    // ========================================================================
    // Generics
    // ========================================================================

    fn install_placeholders(&mut self, generics: &[GenericsType]) {
        for generic in generics {
            if !generic.is_wildcard() {
                self.generic_parameters
                    .insert(generic.name.clone(), generic.ty);
            }
        }
    }

    /// Resolve a declaration-site parameter list (`<T extends Bound>`).
    /// Names register before bounds resolve, so bounds may refer to any
    /// parameter of the list.
    fn resolve_generics_header(&mut self, generics: &mut [GenericsType]) -> Result<(), BugError> {
        for generic in generics.iter_mut() {
            if generic.is_wildcard() {
                continue;
            }
            self.generic_parameters
                .insert(generic.name.clone(), generic.ty);
            if !generic.resolved {
                generic.placeholder = true;
                self.arena.get_mut(generic.ty).placeholder = true;
            }
        }
        let object = self.arena.object_type();
        for generic in generics.iter_mut() {
            if generic.is_wildcard() || generic.resolved {
                continue;
            }
            if generic.upper_bounds.is_empty() {
                if self.arena.get(generic.ty).redirect.is_none() {
                    self.arena.set_redirect(generic.ty, object)?;
                }
            } else {
                for i in 0..generic.upper_bounds.len() {
                    self.resolve_or_fail(generic.upper_bounds[i], self.current_span)?;
                }
                if self.arena.get(generic.ty).redirect.is_none() {
                    self.arena.set_redirect(generic.ty, generic.upper_bounds[0])?;
                }
            }
            generic.resolved = true;
        }
        Ok(())
    }

    /// Resolve a usage-site type argument (`List<T>`, `List<String>`,
    /// `List<?>`). Resolving an already-resolved argument is a no-op.
    fn resolve_generics_usage(&mut self, generic: &mut GenericsType) -> Result<(), BugError> {
        if generic.resolved {
            return Ok(());
        }
        if let Some(&backing) = self.generic_parameters.get(&generic.name) {
            if backing != generic.ty {
                self.arena.set_redirect(generic.ty, backing)?;
            }
            generic.placeholder = true;
            self.arena.get_mut(generic.ty).placeholder = true;
            generic.resolved = true;
            return Ok(());
        }
        if generic.is_wildcard() {
            if let Some(&bound) = generic.upper_bounds.first() {
                self.resolve_or_fail(bound, self.current_span)?;
                if self.arena.get(generic.ty).redirect.is_none() {
                    self.arena.set_redirect(generic.ty, bound)?;
                }
            } else {
                if let Some(lower) = generic.lower_bound {
                    self.resolve_or_fail(lower, self.current_span)?;
                }
                let object = self.arena.object_type();
                if self.arena.get(generic.ty).redirect.is_none() {
                    self.arena.set_redirect(generic.ty, object)?;
                }
            }
        } else {
            self.resolve_or_fail(generic.ty, self.current_span)?;
        }
        generic.resolved = self.arena.is_resolved(generic.ty);
        Ok(())
    }
}

// ============================================================================
// Property-chain helpers
// ============================================================================

/// The qualified name a chain of constant property accesses spells, if any.
///
/// The chain must bottom out in a plain variable (not `this`/`super`), every
/// segment must be a constant string, no segment may be `class`, and the
/// outermost segment must not start lower case.
fn dotted_name_of(prop: &PropertyExpr) -> Option<String> {
    let mut segments: Vec<&str> = Vec::new();
    let mut current = prop;
    let mut outermost = true;
    loop {
        let name = current.property_name()?;
        if name == "class" {
            return None;
        }
        if outermost {
            if names::starts_lower_case(name) {
                return None;
            }
            outermost = false;
        }
        segments.push(name);
        match &current.object {
            Expr::Property(inner) => current = inner,
            Expr::Variable(var) => {
                if var.is_this_or_super() || !var.is_dynamic() {
                    return None;
                }
                segments.push(&var.name);
                break;
            }
            _ => return None,
        }
    }
    segments.reverse();
    Some(segments.join("."))
}

/// Correct a top-level property chain whose innermost link is a class
/// literal followed by `.class`: the redundant `.class` segment is dropped,
/// so `Foo.class.name` reads the class's `name` property.
fn strip_class_literal(expr: Expr) -> Expr {
    match expr {
        Expr::Property(mut prop) => {
            if matches!(prop.object, Expr::Class(_)) {
                if prop.property_name() == Some("class") {
                    return prop.object;
                }
                return Expr::Property(prop);
            }
            prop.object = strip_class_literal(prop.object);
            Expr::Property(prop)
        }
        other => other,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tern_ast::ConstantExpr;

    fn s() -> Span {
        Span::point(1, 1)
    }

    fn chain(root: &str, props: &[&str]) -> PropertyExpr {
        let mut expr = Expr::Variable(VariableExpr::dynamic(root, s()));
        for prop in props {
            expr = Expr::Property(Box::new(PropertyExpr {
                object: expr,
                property: Expr::Constant(ConstantExpr::new(*prop, s())),
                safe: false,
                spread_safe: false,
                implicit_this: false,
                span: s(),
            }));
        }
        match expr {
            Expr::Property(p) => *p,
            _ => unreachable!("chain built at least one property"),
        }
    }

    #[test]
    fn dotted_name_collects_segments() {
        let prop = chain("java", &["util", "List"]);
        assert_eq!(dotted_name_of(&prop), Some("java.util.List".to_string()));
    }

    #[test]
    fn dotted_name_rejects_lower_case_tail() {
        let prop = chain("java", &["util", "list"]);
        assert_eq!(dotted_name_of(&prop), None);
    }

    #[test]
    fn dotted_name_rejects_class_segment() {
        let prop = chain("Foo", &["class", "Name"]);
        assert_eq!(dotted_name_of(&prop), None);
    }

    #[test]
    fn dotted_name_rejects_this_root() {
        let mut prop = chain("ignored", &["Inner"]);
        prop.object = Expr::Variable(VariableExpr {
            name: "this".to_string(),
            kind: tern_ast::VariableKind::This,
            ty: None,
            span: s(),
        });
        assert_eq!(dotted_name_of(&prop), None);
    }

    #[test]
    fn class_class_chain_is_stripped() {
        let class = Expr::Class(ClassExpr {
            ty: ClassId::new(7),
            span: s(),
        });
        let class_prop = Expr::Property(Box::new(PropertyExpr {
            object: class,
            property: Expr::Constant(ConstantExpr::new("class", s())),
            safe: false,
            spread_safe: false,
            implicit_this: false,
            span: s(),
        }));
        let name_prop = Expr::Property(Box::new(PropertyExpr {
            object: class_prop,
            property: Expr::Constant(ConstantExpr::new("name", s())),
            safe: false,
            spread_safe: false,
            implicit_this: false,
            span: s(),
        }));

        let out = strip_class_literal(name_prop);
        match out {
            Expr::Property(p) => {
                assert!(matches!(p.object, Expr::Class(_)));
                assert_eq!(p.property_name(), Some("name"));
            }
            other => panic!("expected property, got {other:?}"),
        }
    }

    #[test]
    fn bare_class_literal_access_collapses() {
        let class = Expr::Class(ClassExpr {
            ty: ClassId::new(3),
            span: s(),
        });
        let prop = Expr::Property(Box::new(PropertyExpr {
            object: class,
            property: Expr::Constant(ConstantExpr::new("class", s())),
            safe: false,
            spread_safe: false,
            implicit_this: false,
            span: s(),
        }));
        assert!(matches!(strip_class_literal(prop), Expr::Class(_)));
    }

    #[test]
    fn non_class_bottom_is_untouched() {
        let prop = Expr::Property(Box::new(chain("foo", &["bar", "class"])));
        let out = strip_class_literal(prop.clone());
        assert_eq!(out, prop);
    }
}
