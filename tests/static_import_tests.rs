//! End-to-end static import rewriting and static context verification.
//!
//! These run the full pass sequence: names resolve first, the static
//! import pass gives leftover dynamic names their imported meanings, and
//! the verifier rejects what remains in static contexts.

use tern::ast::{
    BinOp, BinaryExpr, ClassDecl, ConstantExpr, ConstructorCallExpr, ConstructorKind, Expr,
    ExprStmt, ImportKind, ImportNode, MethodCallExpr, MethodDecl, ModuleNode, Parameter,
    SourceUnit, Stmt, VariableExpr, VariableKind,
};
use tern::core::{ClassFlags, ClassId, ConstantValue, MemberFlags, ResolveError, ScopeId, Span};
use tern::registry::{LoadedClass, MapClassLoader};
use tern::resolve::Compilation;

fn s() -> Span {
    Span::point(1, 1)
}

fn class_named(name: &str, class_id: ClassId, superclass: ClassId) -> ClassDecl {
    ClassDecl {
        name: name.to_string(),
        class_id,
        flags: ClassFlags::PUBLIC,
        superclass,
        interfaces: vec![],
        generics: None,
        fields: vec![],
        methods: vec![],
        annotations: vec![],
        enclosing: None,
        is_script: false,
        span: s(),
    }
}

fn method_with_body(return_type: ClassId, scope: ScopeId, body: Expr) -> MethodDecl {
    MethodDecl {
        name: "run".to_string(),
        flags: MemberFlags::PUBLIC,
        return_type,
        params: vec![],
        exceptions: vec![],
        generics: None,
        body: Some(Stmt::Expr(ExprStmt {
            expr: body,
            span: s(),
        })),
        is_constructor: false,
        scope,
        annotations: vec![],
        span: s(),
    }
}

fn dynvar(name: &str) -> Expr {
    Expr::Variable(VariableExpr::dynamic(name, s()))
}

/// An unqualified call `name(args)` as the parser produces it.
fn implicit_call(name: &str, args: Vec<Expr>) -> Expr {
    Expr::MethodCall(Box::new(MethodCallExpr {
        object: Expr::Variable(VariableExpr {
            name: "this".to_string(),
            kind: VariableKind::This,
            ty: None,
            span: s(),
        }),
        method: Expr::Constant(ConstantExpr::new(name, s())),
        args,
        implicit_this: true,
        safe: false,
        spread_safe: false,
        span: s(),
    }))
}

fn static_single(alias: &str, ty: ClassId, member: &str) -> ImportNode {
    ImportNode {
        kind: ImportKind::StaticSingle {
            alias: alias.to_string(),
            ty,
            member: member.to_string(),
        },
        span: s(),
    }
}

fn body_of<'a>(compilation: &'a Compilation<'_>, class: usize) -> &'a Expr {
    match &compilation.sources()[0].classes[class].methods[0].body {
        Some(Stmt::Expr(stmt)) => &stmt.expr,
        other => panic!("expected expression body, got {other:?}"),
    }
}

// =============================================================================
// Rewrites
// =============================================================================

#[test]
fn imported_static_method_call_is_rewritten() {
    let loader = MapClassLoader::with_core_types();
    let mut compilation = Compilation::new(&loader);
    let object = compilation.arena_mut().object_type();
    let app = compilation.arena_mut().make("demo.App");
    let math = compilation.arena_mut().make("java.lang.Math");

    let mut module = ModuleNode::new(Some("demo"));
    module.imports.push(static_single("max", math, "max"));

    let body = implicit_call("max", vec![dynvar("a"), dynvar("b")]);
    let mut source = SourceUnit::new(module);
    let scope = source.scopes.root(false);
    let mut decl = class_named("demo.App", app, object);
    decl.methods.push(method_with_body(object, scope, body));
    source.classes.push(decl);
    compilation.add_source(source);

    compilation.resolve().unwrap();
    assert!(compilation.is_success(), "{:?}", compilation.errors());
    match body_of(&compilation, 0) {
        Expr::StaticMethodCall(call) => {
            assert_eq!(compilation.arena().name_of(call.owner), "java.lang.Math");
            assert_eq!(call.method, "max");
            assert_eq!(call.args.len(), 2);
        }
        other => panic!("expected static call, got {other:?}"),
    }
}

#[test]
fn static_star_import_covers_calls() {
    let loader = MapClassLoader::with_core_types();
    let mut compilation = Compilation::new(&loader);
    let object = compilation.arena_mut().object_type();
    let app = compilation.arena_mut().make("demo.App");
    let math = compilation.arena_mut().make("java.lang.Math");

    let mut module = ModuleNode::new(Some("demo"));
    module.imports.push(ImportNode {
        kind: ImportKind::StaticStar { ty: math },
        span: s(),
    });

    let body = implicit_call("min", vec![dynvar("a"), dynvar("b")]);
    let mut source = SourceUnit::new(module);
    let scope = source.scopes.root(false);
    let mut decl = class_named("demo.App", app, object);
    decl.methods.push(method_with_body(object, scope, body));
    source.classes.push(decl);
    compilation.add_source(source);

    compilation.resolve().unwrap();
    assert!(compilation.is_success(), "{:?}", compilation.errors());
    assert!(matches!(body_of(&compilation, 0), Expr::StaticMethodCall(_)));
}

#[test]
fn imported_constant_is_inlined() {
    let loader = MapClassLoader::with_core_types();
    let mut compilation = Compilation::new(&loader);
    let object = compilation.arena_mut().object_type();
    let app = compilation.arena_mut().make("demo.App");
    let math = compilation.arena_mut().make("java.lang.Math");

    let mut module = ModuleNode::new(Some("demo"));
    module.imports.push(static_single("PI", math, "PI"));

    let mut source = SourceUnit::new(module);
    let scope = source.scopes.root(false);
    let mut decl = class_named("demo.App", app, object);
    decl.methods.push(method_with_body(object, scope, dynvar("PI")));
    source.classes.push(decl);
    compilation.add_source(source);

    compilation.resolve().unwrap();
    assert!(compilation.is_success(), "{:?}", compilation.errors());
    match body_of(&compilation, 0) {
        Expr::Constant(constant) => {
            assert_eq!(constant.value, ConstantValue::Float(std::f64::consts::PI));
        }
        other => panic!("expected inlined constant, got {other:?}"),
    }
}

#[test]
fn setter_alias_folds_assignment_into_call() {
    let mut loader = MapClassLoader::with_core_types();
    loader.add_class(LoadedClass::new("acme.Holder").static_method("setValue", 1));
    let mut compilation = Compilation::new(&loader);
    let object = compilation.arena_mut().object_type();
    let app = compilation.arena_mut().make("demo.App");
    let holder = compilation.arena_mut().make("acme.Holder");

    let mut module = ModuleNode::new(Some("demo"));
    module.imports.push(static_single("value", holder, "value"));

    let body = Expr::Binary(Box::new(BinaryExpr {
        left: dynvar("value"),
        op: BinOp::Assign,
        right: Expr::Constant(ConstantExpr::new(1i64, s())),
        span: s(),
    }));
    let mut source = SourceUnit::new(module);
    let scope = source.scopes.root(false);
    let mut decl = class_named("demo.App", app, object);
    decl.methods.push(method_with_body(object, scope, body));
    source.classes.push(decl);
    compilation.add_source(source);

    compilation.resolve().unwrap();
    assert!(compilation.is_success(), "{:?}", compilation.errors());
    match body_of(&compilation, 0) {
        Expr::StaticMethodCall(call) => {
            assert_eq!(call.method, "setValue");
            assert_eq!(call.args.len(), 1);
        }
        other => panic!("expected folded setter call, got {other:?}"),
    }
}

#[test]
fn instance_method_beats_static_import() {
    let loader = MapClassLoader::with_core_types();
    let mut compilation = Compilation::new(&loader);
    let object = compilation.arena_mut().object_type();
    let app = compilation.arena_mut().make("demo.App");
    let math = compilation.arena_mut().make("java.lang.Math");
    let int_ty = compilation.arena_mut().primitive("int").unwrap();

    let mut module = ModuleNode::new(Some("demo"));
    module.imports.push(static_single("max", math, "max"));

    let body = implicit_call("max", vec![dynvar("a"), dynvar("b")]);
    let mut source = SourceUnit::new(module);
    let scope = source.scopes.root(false);
    let own_scope = source.scopes.root(false);
    let mut decl = class_named("demo.App", app, object);
    decl.methods.push(method_with_body(int_ty, scope, body));
    decl.methods.push(MethodDecl {
        name: "max".to_string(),
        flags: MemberFlags::PUBLIC,
        return_type: int_ty,
        params: vec![
            Parameter::new("a", int_ty, s()),
            Parameter::new("b", int_ty, s()),
        ],
        exceptions: vec![],
        generics: None,
        body: None,
        is_constructor: false,
        scope: own_scope,
        annotations: vec![],
        span: s(),
    });
    source.classes.push(decl);
    compilation.add_source(source);

    compilation.resolve().unwrap();
    assert!(compilation.is_success(), "{:?}", compilation.errors());
    assert!(
        matches!(body_of(&compilation, 0), Expr::MethodCall(_)),
        "an instance method in scope outranks the import"
    );
}

#[test]
fn current_class_static_method_beats_import() {
    let loader = MapClassLoader::with_core_types();
    let mut compilation = Compilation::new(&loader);
    let object = compilation.arena_mut().object_type();
    let app = compilation.arena_mut().make("demo.App");
    let math = compilation.arena_mut().make("java.lang.Math");
    let int_ty = compilation.arena_mut().primitive("int").unwrap();

    let mut module = ModuleNode::new(Some("demo"));
    module.imports.push(static_single("max", math, "max"));

    let body = implicit_call(
        "max",
        vec![
            Expr::Constant(ConstantExpr::new(1i64, s())),
            Expr::Constant(ConstantExpr::new(2i64, s())),
        ],
    );
    let mut source = SourceUnit::new(module);
    let scope = source.scopes.root(true);
    let own_scope = source.scopes.root(true);
    let mut decl = class_named("demo.App", app, object);
    let mut caller = method_with_body(int_ty, scope, body);
    caller.flags |= MemberFlags::STATIC;
    decl.methods.push(caller);
    decl.methods.push(MethodDecl {
        name: "max".to_string(),
        flags: MemberFlags::PUBLIC | MemberFlags::STATIC,
        return_type: int_ty,
        params: vec![
            Parameter::new("a", int_ty, s()),
            Parameter::new("b", int_ty, s()),
        ],
        exceptions: vec![],
        generics: None,
        body: None,
        is_constructor: false,
        scope: own_scope,
        annotations: vec![],
        span: s(),
    });
    source.classes.push(decl);
    compilation.add_source(source);

    compilation.resolve().unwrap();
    assert!(compilation.is_success(), "{:?}", compilation.errors());
    match body_of(&compilation, 0) {
        Expr::StaticMethodCall(call) => {
            assert_eq!(compilation.arena().name_of(call.owner), "demo.App");
            assert_eq!(call.method, "max");
        }
        other => panic!("expected call on the declaring class, got {other:?}"),
    }
}

// =============================================================================
// Static context verification
// =============================================================================

#[test]
fn dynamic_variable_in_static_method_is_rejected() {
    let loader = MapClassLoader::with_core_types();
    let mut compilation = Compilation::new(&loader);
    let object = compilation.arena_mut().object_type();
    let app = compilation.arena_mut().make("demo.App");

    let mut source = SourceUnit::new(ModuleNode::new(Some("demo")));
    let scope = source.scopes.root(true);
    let mut decl = class_named("demo.App", app, object);
    let mut method = method_with_body(object, scope, dynvar("unknown"));
    method.flags |= MemberFlags::STATIC;
    decl.methods.push(method);
    source.classes.push(decl);
    compilation.add_source(source);

    compilation.resolve().unwrap();
    assert!(compilation.errors().iter().any(|e| matches!(
        e,
        ResolveError::StaticScopeVariable { name, .. } if name == "unknown"
    )));
}

#[test]
fn delegation_call_arguments_are_rejected() {
    let loader = MapClassLoader::with_core_types();
    let mut compilation = Compilation::new(&loader);
    let object = compilation.arena_mut().object_type();
    let app = compilation.arena_mut().make("demo.App");

    let body = Expr::ConstructorCall(Box::new(ConstructorCallExpr {
        ty: app,
        args: vec![dynvar("oops")],
        kind: ConstructorKind::This,
        span: s(),
    }));
    let mut source = SourceUnit::new(ModuleNode::new(Some("demo")));
    let scope = source.scopes.root(false);
    let mut decl = class_named("demo.App", app, object);
    let mut ctor = method_with_body(object, scope, body);
    ctor.name = "<init>".to_string();
    ctor.is_constructor = true;
    decl.methods.push(ctor);
    source.classes.push(decl);
    compilation.add_source(source);

    compilation.resolve().unwrap();
    assert!(compilation.errors().iter().any(|e| matches!(
        e,
        ResolveError::SpecialCallVariable { name, .. } if name == "oops"
    )));
}

#[test]
fn closure_body_is_exempt_from_static_checks() {
    let loader = MapClassLoader::with_core_types();
    let mut compilation = Compilation::new(&loader);
    let object = compilation.arena_mut().object_type();
    let app = compilation.arena_mut().make("demo.App");

    let mut source = SourceUnit::new(ModuleNode::new(Some("demo")));
    let scope = source.scopes.root(true);
    let closure_scope = source.scopes.child(scope, true);
    let body = Expr::Closure(Box::new(tern::ast::ClosureExpr {
        params: vec![],
        body: Stmt::Expr(ExprStmt {
            expr: dynvar("later"),
            span: s(),
        }),
        scope: closure_scope,
        span: s(),
    }));
    let mut decl = class_named("demo.App", app, object);
    let mut method = method_with_body(object, scope, body);
    method.flags |= MemberFlags::STATIC;
    decl.methods.push(method);
    source.classes.push(decl);
    compilation.add_source(source);

    compilation.resolve().unwrap();
    assert!(compilation.is_success(), "{:?}", compilation.errors());
}
