//! The static import rewrite pass.
//!
//! After name resolution, references that static imports give meaning to
//! are still dynamic: a bare `max(a, b)` under `import static
//! java.lang.Math.max`, a bare `PI` under `import static java.lang.Math.PI`.
//! This pass rewrites them into receiver-qualified forms:
//!
//! - unbound variables become static property accesses or accessor calls on
//!   the importing class, with known constant values inlined
//! - implicit-this calls become [`StaticMethodCallExpr`]s when an imported
//!   or current-class static member matches, with instance methods of the
//!   current class taking precedence
//! - a setter-shaped rewrite in assignment position is folded together with
//!   the assigned value into a single call
//! - named arguments of delegation constructor calls translate aliased keys
//!   back to the imported member names
//!
//! The pass only reads the class table; every rewrite is pure expression
//! construction.

use tern_ast::{
    AnnotationNode, BinaryExpr, ClassDecl, ClassExpr, ConstantExpr, Expr, MethodCallExpr,
    ModuleNode, PropertyExpr, StaticMethodCallExpr, Stmt, VariableExpr, VariableKind,
};
use tern_core::{ClassId, ErrorCollector, MemberFlags, ResolveError, Span, names};
use tern_registry::ClassArena;

/// Context that flows down the walk by value.
#[derive(Debug, Clone, Copy, Default)]
struct Ctx {
    /// Inside a closure body.
    in_closure: bool,
    /// Inside the arguments of a `this(...)`/`super(...)` delegation call.
    in_special_ctor: bool,
    /// This expression is the target of an assignment.
    write: bool,
}

/// Rewrites statically imported member references in one source unit.
pub struct StaticImportRewriter<'a> {
    arena: &'a ClassArena,
    module: &'a ModuleNode,
    errors: &'a mut ErrorCollector,
    current_class: ClassId,
    /// Whether the method being walked is static.
    method_static: bool,
}

impl<'a> StaticImportRewriter<'a> {
    pub fn new(
        arena: &'a ClassArena,
        module: &'a ModuleNode,
        errors: &'a mut ErrorCollector,
    ) -> Self {
        Self {
            arena,
            module,
            errors,
            current_class: ClassId::new(0),
            method_static: false,
        }
    }

    pub fn visit_class(&mut self, class: &mut ClassDecl) {
        tracing::debug!(class = %class.name, "rewriting static imports");
        self.current_class = class.class_id;
        self.method_static = false;

        self.visit_annotations(&mut class.annotations);
        for field in &mut class.fields {
            self.method_static = field.flags.is_static();
            self.visit_annotations(&mut field.annotations);
            if let Some(init) = field.initializer.take() {
                field.initializer = Some(self.transform(init, Ctx::default()));
            }
        }
        for method in &mut class.methods {
            self.method_static = method.is_static();
            self.visit_annotations(&mut method.annotations);
            for param in &mut method.params {
                self.visit_annotations(&mut param.annotations);
                if let Some(default) = param.default_value.take() {
                    param.default_value = Some(self.transform(default, Ctx::default()));
                }
            }
            if let Some(body) = method.body.as_mut() {
                self.visit_stmt(body, Ctx::default());
            }
        }
    }

    // ========================================================================
    // Statement walk
    // ========================================================================

    fn visit_stmt(&mut self, stmt: &mut Stmt, ctx: Ctx) {
        match stmt {
            Stmt::Block(block) => {
                for stmt in &mut block.stmts {
                    self.visit_stmt(stmt, ctx);
                }
            }
            Stmt::Expr(stmt) => {
                let expr = stmt.expr.take();
                stmt.expr = self.transform(expr, ctx);
            }
            Stmt::If(stmt) => {
                let cond = stmt.cond.take();
                stmt.cond = self.transform(cond, ctx);
                self.visit_stmt(&mut stmt.then, ctx);
                if let Some(otherwise) = stmt.otherwise.as_mut() {
                    self.visit_stmt(otherwise, ctx);
                }
            }
            Stmt::While(stmt) => {
                let cond = stmt.cond.take();
                stmt.cond = self.transform(cond, ctx);
                self.visit_stmt(&mut stmt.body, ctx);
            }
            Stmt::For(stmt) => {
                let collection = stmt.collection.take();
                stmt.collection = self.transform(collection, ctx);
                self.visit_stmt(&mut stmt.body, ctx);
            }
            Stmt::Return(stmt) => {
                if let Some(expr) = stmt.expr.as_mut() {
                    let taken = expr.take();
                    *expr = self.transform(taken, ctx);
                }
            }
            Stmt::Throw(stmt) => {
                let expr = stmt.expr.take();
                stmt.expr = self.transform(expr, ctx);
            }
            Stmt::TryCatch(stmt) => {
                self.visit_stmt(&mut stmt.body, ctx);
                for catch in &mut stmt.catches {
                    self.visit_stmt(&mut catch.body, ctx);
                }
                if let Some(finally) = stmt.finally.as_mut() {
                    self.visit_stmt(finally, ctx);
                }
            }
        }
    }

    fn visit_annotations(&mut self, annotations: &mut [AnnotationNode]) {
        for annotation in annotations.iter_mut() {
            for (name, value) in annotation.members.iter_mut() {
                let taken = value.take();
                let transformed = self.transform(taken, Ctx::default());
                let transformed = self.inline_constant(transformed);
                if !is_annotation_constant(&transformed) {
                    self.errors.report(ResolveError::AnnotationMemberNotConstant {
                        member: name.clone(),
                        span: transformed.span(),
                    });
                }
                *value = transformed;
            }
        }
    }

    // ========================================================================
    // Expression transforms
    // ========================================================================

    fn transform(&mut self, expr: Expr, ctx: Ctx) -> Expr {
        match expr {
            Expr::Variable(e) => self.transform_variable(e, ctx),
            Expr::Binary(e) => self.transform_binary(*e, ctx),
            Expr::MethodCall(e) => self.transform_method_call(*e, ctx),
            Expr::ConstructorCall(mut e) => {
                let arg_ctx = if e.is_delegation() {
                    Ctx {
                        in_special_ctor: true,
                        ..ctx
                    }
                } else {
                    ctx
                };
                self.alias_named_arguments(e.ty, &mut e.args);
                e.args = e
                    .args
                    .into_iter()
                    .map(|arg| self.transform(arg, arg_ctx))
                    .collect();
                Expr::ConstructorCall(e)
            }
            Expr::Property(mut e) => {
                e.object = self.transform_receiver(e.object, ctx);
                e.property = self.transform(e.property, Ctx::default());
                Expr::Property(e)
            }
            Expr::Closure(mut e) => {
                let inner = Ctx {
                    in_closure: true,
                    ..ctx
                };
                for param in &mut e.params {
                    if let Some(default) = param.default_value.take() {
                        param.default_value = Some(self.transform(default, inner));
                    }
                }
                self.visit_stmt(&mut e.body, inner);
                Expr::Closure(e)
            }
            other => other.transform_children(&mut |e| self.transform(e, Ctx { write: false, ..ctx })),
        }
    }

    /// An unbound variable may be a statically imported field, property, or
    /// accessor. In write position the accessor form is left as an empty
    /// setter call for [`Self::transform_binary`] to complete.
    fn transform_variable(&mut self, var: VariableExpr, ctx: Ctx) -> Expr {
        match var.kind {
            VariableKind::Dynamic => {
                if let Some(access) = self.imported_member_access(&var.name, ctx.write, var.span) {
                    return if ctx.write {
                        access
                    } else {
                        self.inline_constant(access)
                    };
                }
                Expr::Variable(var)
            }
            // In a delegation call no instance fields exist yet; a static
            // field of the declaring class is still addressable.
            VariableKind::Field {
                declaring,
                is_static: true,
            } if ctx.in_special_ctor => Expr::Property(Box::new(PropertyExpr {
                object: Expr::Class(ClassExpr {
                    ty: declaring,
                    span: var.span,
                }),
                property: Expr::Constant(ConstantExpr::new(var.name.clone(), var.span)),
                safe: false,
                spread_safe: false,
                implicit_this: false,
                span: var.span,
            })),
            _ => Expr::Variable(var),
        }
    }

    fn transform_binary(&mut self, bin: BinaryExpr, ctx: Ctx) -> Expr {
        let BinaryExpr {
            op,
            left,
            right,
            span,
        } = bin;
        let is_assign = op.is_assignment();
        let left = self.transform(
            left,
            Ctx {
                write: is_assign,
                ..ctx
            },
        );
        let right = self.transform(right, Ctx { write: false, ..ctx });
        match (is_assign, left) {
            // A setter rewrite in write position: fold the assigned value in.
            (true, Expr::StaticMethodCall(mut call)) if call.args.is_empty() => {
                call.args.push(right);
                call.span = span;
                Expr::StaticMethodCall(call)
            }
            (_, left) => Expr::Binary(Box::new(BinaryExpr {
                op,
                left,
                right,
                span,
            })),
        }
    }

    fn transform_method_call(&mut self, call: MethodCallExpr, ctx: Ctx) -> Expr {
        let MethodCallExpr {
            object,
            method,
            args,
            implicit_this,
            safe,
            spread_safe,
            span,
        } = call;
        let name = method.constant_string().map(str::to_string);
        let object = self.transform_receiver(object, ctx);
        let method = self.transform(method, Ctx { write: false, ..ctx });
        let args: Vec<Expr> = args
            .into_iter()
            .map(|arg| self.transform(arg, Ctx { write: false, ..ctx }))
            .collect();

        if implicit_this && let Some(name) = name {
            let static_context = ctx.in_special_ctor || self.method_static;
            let argc = Some(args.len());
            // An instance method of the current class or any enclosing class
            // always keeps the call dynamic.
            let instance_wins = !static_context
                && std::iter::once(self.current_class)
                    .chain(self.arena.outer_chain(self.current_class))
                    .any(|owner| self.arena.has_possible_method(owner, &name, argc));
            // A matching static method of the class itself outranks imports.
            let own_static_wins = static_context
                && self
                    .arena
                    .has_possible_static_method(self.current_class, &name, argc);
            if !instance_wins {
                if !own_static_wins
                    && let Some((owner, method)) = self.find_static_method_import(&name, argc)
                {
                    return Expr::StaticMethodCall(Box::new(StaticMethodCallExpr {
                        owner,
                        method,
                        args,
                        span,
                    }));
                }
                // The current class or an enclosing class may satisfy the
                // call statically. `call` is exempt so closure invocation
                // stays dynamic.
                if ctx.in_special_ctor || (!ctx.in_closure && name != "call") {
                    let mut owners = vec![self.current_class];
                    owners.extend(self.arena.outer_chain(self.current_class));
                    for owner in owners {
                        if self.arena.has_possible_static_member(owner, &name) {
                            return Expr::StaticMethodCall(Box::new(StaticMethodCallExpr {
                                owner,
                                method: name,
                                args,
                                span,
                            }));
                        }
                    }
                }
            }
        }
        Expr::MethodCall(Box::new(MethodCallExpr {
            object,
            method,
            args,
            implicit_this,
            safe,
            spread_safe,
            span,
        }))
    }

    /// `super` used as a receiver inside a static method stands for the
    /// superclass itself.
    fn transform_receiver(&mut self, object: Expr, ctx: Ctx) -> Expr {
        if self.method_static
            && !ctx.in_closure
            && let Expr::Variable(var) = &object
            && var.kind == VariableKind::Super
            && let Some(superclass) = self.arena.superclass_of(self.current_class)
        {
            let span = var.span;
            return Expr::Class(ClassExpr {
                ty: superclass,
                span,
            });
        }
        self.transform(object, Ctx { write: false, ..ctx })
    }

    /// Rewrite named-argument keys that are aliases of static single imports
    /// of the constructed class back to the member names.
    fn alias_named_arguments(&self, ty: ClassId, args: &mut [Expr]) {
        let target = self.arena.redirect_of(ty);
        for arg in args.iter_mut() {
            let Expr::Map(map) = arg else {
                continue;
            };
            for entry in &mut map.entries {
                let Some(key) = entry.key.constant_string() else {
                    continue;
                };
                if let Some((owner, member)) = self.module.static_import(key)
                    && self.arena.redirect_of(owner) == target
                {
                    let span = entry.key.span();
                    entry.key = Expr::Constant(ConstantExpr::new(member.to_string(), span));
                }
            }
        }
    }

    // ========================================================================
    // Import queries
    // ========================================================================

    /// A variable read or write backed by a static import, if any.
    fn imported_member_access(&self, name: &str, write: bool, span: Span) -> Option<Expr> {
        // Accessor-aliased import: the alias has accessor shape, so the
        // reference turns into a zero-argument (or, once the assignment is
        // folded, one-argument) static call.
        let accessor = names::accessor_name(name, write);
        if let Some((owner, member)) = self.module.static_import(&accessor)
            && self.arena.is_resolved(owner)
            && self
                .arena
                .has_possible_static_method(owner, member, Some(usize::from(write)))
        {
            return Some(Expr::StaticMethodCall(Box::new(StaticMethodCallExpr {
                owner,
                method: member.to_string(),
                args: Vec::new(),
                span,
            })));
        }
        if !write
            && let Some((owner, member)) = self.module.static_import(&names::boolean_getter_name(name))
            && self.arena.is_resolved(owner)
            && self.arena.has_possible_static_method(owner, member, Some(0))
        {
            return Some(Expr::StaticMethodCall(Box::new(StaticMethodCallExpr {
                owner,
                method: member.to_string(),
                args: Vec::new(),
                span,
            })));
        }
        // Plain alias, then static star imports, as property access.
        if let Some((owner, member)) = self.module.static_import(name)
            && let Some(access) = self.static_property_or_field(owner, member, span)
        {
            return Some(access);
        }
        for owner in self.module.static_star_imports() {
            if let Some(access) = self.static_property_or_field(owner, name, span) {
                return Some(access);
            }
        }
        None
    }

    fn static_property_or_field(&self, owner: ClassId, name: &str, span: Span) -> Option<Expr> {
        if !self.arena.is_resolved(owner) {
            return None;
        }
        let receiver = if let Some((declaring, sig)) = self.arena.static_field(owner, name) {
            if !self.accessible(declaring, sig.flags) {
                return None;
            }
            declaring
        } else if self.arena.has_static_property(owner, name) {
            owner
        } else {
            return None;
        };
        Some(Expr::Property(Box::new(PropertyExpr {
            object: Expr::Class(ClassExpr { ty: receiver, span }),
            property: Expr::Constant(ConstantExpr::new(name.to_string(), span)),
            safe: false,
            spread_safe: false,
            implicit_this: false,
            span,
        })))
    }

    /// An implicit-this call matched by a static import, yielding the
    /// receiver class and the real method name to call.
    fn find_static_method_import(&self, name: &str, argc: Option<usize>) -> Option<(ClassId, String)> {
        if let Some((owner, member)) = self.module.static_import(name)
            && self.arena.is_resolved(owner)
            && self.arena.has_possible_static_method(owner, member, argc)
        {
            return Some((owner, member.to_string()));
        }
        // Accessor-shaped call on an imported property: `getX()` where `x`
        // was imported calls the property's accessor.
        if names::is_valid_accessor_name(name)
            && let Some(property) = names::property_name_of_accessor(name)
            && let Some((owner, member)) = self.module.static_import(&property)
            && self.arena.is_resolved(owner)
            && self.arena.has_static_property(owner, member)
        {
            let real = if name.starts_with("set") {
                names::setter_name(member)
            } else if name.starts_with("is") {
                names::boolean_getter_name(member)
            } else {
                names::getter_name(member)
            };
            return Some((owner, real));
        }
        for owner in self.module.static_star_imports() {
            if !self.arena.is_resolved(owner) {
                continue;
            }
            if self.arena.has_possible_static_method(owner, name, argc) {
                return Some((owner, name.to_string()));
            }
            if names::is_valid_accessor_name(name)
                && let Some(property) = names::property_name_of_accessor(name)
                && self.arena.has_static_property(owner, &property)
            {
                return Some((owner, name.to_string()));
            }
        }
        None
    }

    fn accessible(&self, declaring: ClassId, flags: MemberFlags) -> bool {
        if flags.is_public() {
            return true;
        }
        if flags.is_private() {
            return self.arena.redirect_of(declaring) == self.arena.redirect_of(self.current_class);
        }
        let current = names::package_of(self.arena.name_of(self.current_class)).map(str::to_string);
        let owner = names::package_of(self.arena.name_of(declaring));
        if current.as_deref() == owner {
            return true;
        }
        flags.is_protected() && self.arena.is_derived_from(self.current_class, declaring)
    }

    /// Replace a static property access with the field's literal value when
    /// the value is a compile-time constant.
    fn inline_constant(&self, expr: Expr) -> Expr {
        if let Expr::Property(prop) = &expr
            && let Expr::Class(class) = &prop.object
            && let Some(name) = prop.property_name()
            && let Some(value) = self.arena.find_constant(class.ty, name)
        {
            return Expr::Constant(ConstantExpr {
                value,
                span: prop.span,
            });
        }
        expr
    }
}

fn is_annotation_constant(expr: &Expr) -> bool {
    match expr {
        Expr::Constant(_) | Expr::Class(_) => true,
        Expr::List(list) => list.elements.iter().all(is_annotation_constant),
        _ => false,
    }
}

// ============================================================================
// Tests
// ============================================================================
