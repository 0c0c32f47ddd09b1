//! The static context verification pass.
//!
//! After resolution and static import rewriting, any variable still dynamic
//! has no static meaning. Inside a static method that is an error, and
//! inside a `this(...)`/`super(...)` delegation call it is an error in any
//! method, because no instance exists yet either way. Closure bodies are
//! exempt: a closure may be called later with a delegate that supplies the
//! name.

use tern_ast::{ClassDecl, ConstructorCallExpr, Expr, MethodDecl, Stmt};
use tern_core::{ClassId, ErrorCollector, ResolveError};
use tern_registry::ClassArena;

#[derive(Debug, Clone, Copy, Default)]
struct Ctx {
    /// Inside a static method body.
    static_method: bool,
    /// Inside the arguments of a delegation constructor call.
    in_special_ctor: bool,
    /// Inside a closure body; suppresses both checks.
    in_closure: bool,
}

/// Checks that static contexts reference only static meanings.
pub struct StaticContextVerifier<'a> {
    arena: &'a ClassArena,
    errors: &'a mut ErrorCollector,
    current_class: ClassId,
}

impl<'a> StaticContextVerifier<'a> {
    pub fn new(arena: &'a ClassArena, errors: &'a mut ErrorCollector) -> Self {
        Self {
            arena,
            errors,
            current_class: ClassId::new(0),
        }
    }

    pub fn visit_class(&mut self, class: &ClassDecl) {
        tracing::debug!(class = %class.name, "verifying static contexts");
        self.current_class = class.class_id;
        for field in &class.fields {
            if let Some(init) = &field.initializer {
                let ctx = Ctx {
                    static_method: field.flags.is_static(),
                    ..Ctx::default()
                };
                self.visit_expr(init, ctx);
            }
        }
        for method in &class.methods {
            self.visit_method(method);
        }
    }

    fn visit_method(&mut self, method: &MethodDecl) {
        let ctx = Ctx {
            static_method: method.is_static(),
            ..Ctx::default()
        };
        for param in &method.params {
            if let Some(default) = &param.default_value {
                self.visit_expr(default, ctx);
            }
        }
        if let Some(body) = &method.body {
            self.visit_stmt(body, ctx);
        }
    }

    fn visit_stmt(&mut self, stmt: &Stmt, ctx: Ctx) {
        match stmt {
            Stmt::Block(block) => {
                for stmt in &block.stmts {
                    self.visit_stmt(stmt, ctx);
                }
            }
            Stmt::Expr(stmt) => self.visit_expr(&stmt.expr, ctx),
            Stmt::If(stmt) => {
                self.visit_expr(&stmt.cond, ctx);
                self.visit_stmt(&stmt.then, ctx);
                if let Some(otherwise) = &stmt.otherwise {
                    self.visit_stmt(otherwise, ctx);
                }
            }
            Stmt::While(stmt) => {
                self.visit_expr(&stmt.cond, ctx);
                self.visit_stmt(&stmt.body, ctx);
            }
            Stmt::For(stmt) => {
                self.visit_expr(&stmt.collection, ctx);
                self.visit_stmt(&stmt.body, ctx);
            }
            Stmt::Return(stmt) => {
                if let Some(expr) = &stmt.expr {
                    self.visit_expr(expr, ctx);
                }
            }
            Stmt::Throw(stmt) => self.visit_expr(&stmt.expr, ctx),
            Stmt::TryCatch(stmt) => {
                self.visit_stmt(&stmt.body, ctx);
                for catch in &stmt.catches {
                    self.visit_stmt(&catch.body, ctx);
                }
                if let Some(finally) = &stmt.finally {
                    self.visit_stmt(finally, ctx);
                }
            }
        }
    }

    fn visit_expr(&mut self, expr: &Expr, ctx: Ctx) {
        match expr {
            Expr::Variable(var) => {
                if !var.is_dynamic() || ctx.in_closure {
                    return;
                }
                if ctx.in_special_ctor {
                    self.errors.report(ResolveError::SpecialCallVariable {
                        name: var.name.clone(),
                        span: var.span,
                    });
                } else if ctx.static_method
                    && self.arena.static_field(self.current_class, &var.name).is_none()
                    && !self.arena.has_static_property(self.current_class, &var.name)
                {
                    self.errors.report(ResolveError::StaticScopeVariable {
                        name: var.name.clone(),
                        span: var.span,
                    });
                }
            }
            Expr::Closure(closure) => {
                let inner = Ctx {
                    in_closure: true,
                    ..ctx
                };
                for param in &closure.params {
                    if let Some(default) = &param.default_value {
                        self.visit_expr(default, inner);
                    }
                }
                self.visit_stmt(&closure.body, inner);
            }
            Expr::ConstructorCall(call) => self.visit_constructor_call(call, ctx),
            Expr::Property(prop) => {
                self.visit_expr(&prop.object, ctx);
                self.visit_expr(&prop.property, ctx);
            }
            Expr::MethodCall(call) => {
                self.visit_expr(&call.object, ctx);
                self.visit_expr(&call.method, ctx);
                for arg in &call.args {
                    self.visit_expr(arg, ctx);
                }
            }
            Expr::StaticMethodCall(call) => {
                for arg in &call.args {
                    self.visit_expr(arg, ctx);
                }
            }
            Expr::Binary(bin) => {
                self.visit_expr(&bin.left, ctx);
                self.visit_expr(&bin.right, ctx);
            }
            Expr::Declaration(decl) => {
                self.visit_expr(&decl.left, ctx);
                self.visit_expr(&decl.right, ctx);
            }
            Expr::Cast(cast) => self.visit_expr(&cast.operand, ctx),
            Expr::List(list) => {
                for element in &list.elements {
                    self.visit_expr(element, ctx);
                }
            }
            Expr::Map(map) => {
                for entry in &map.entries {
                    self.visit_expr(&entry.key, ctx);
                    self.visit_expr(&entry.value, ctx);
                }
            }
            Expr::Empty(_) | Expr::Constant(_) | Expr::Class(_) => {}
        }
    }

    fn visit_constructor_call(&mut self, call: &ConstructorCallExpr, ctx: Ctx) {
        let arg_ctx = if call.is_delegation() {
            Ctx {
                in_special_ctor: true,
                ..ctx
            }
        } else {
            ctx
        };
        for arg in &call.args {
            self.visit_expr(arg, arg_ctx);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
