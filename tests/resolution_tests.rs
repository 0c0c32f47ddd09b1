//! End-to-end name resolution over complete source units.
//!
//! Each test assembles a unit the way a front end would (class table
//! entries for every written type, declarations referencing them), runs
//! the full pass sequence, and checks where the written names ended up.

use tern::ast::{
    BinOp, BinaryExpr, ClassDecl, ConstantExpr, ConstructorCallExpr, ConstructorKind, Expr,
    ExprStmt, FieldDecl, ImportKind, ImportNode, ListExpr, MethodDecl, ModuleNode, PropertyExpr,
    SourceUnit, Stmt, VariableExpr,
};
use tern::core::{ClassFlags, ClassId, GenericsType, MemberFlags, ResolveError, ScopeId, Span};
use tern::registry::{ClassArena, LoadedClass, MapClassLoader, ScriptSource};
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

fn field(name: &str, ty: ClassId) -> FieldDecl {
    FieldDecl {
        name: name.to_string(),
        ty,
        flags: MemberFlags::PUBLIC,
        initializer: None,
        is_property: false,
        annotations: vec![],
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

/// A property chain `root.a.b.c` with constant segment names.
fn chain(root: Expr, segments: &[&str]) -> Expr {
    segments.iter().fold(root, |object, segment| {
        Expr::Property(Box::new(PropertyExpr {
            object,
            property: Expr::Constant(ConstantExpr::new(*segment, s())),
            safe: false,
            spread_safe: false,
            implicit_this: false,
            span: s(),
        }))
    })
}

fn body_of<'a>(compilation: &'a Compilation<'_>, class: usize) -> &'a Expr {
    match &compilation.sources()[0].classes[class].methods[0].body {
        Some(Stmt::Expr(stmt)) => &stmt.expr,
        other => panic!("expected expression body, got {other:?}"),
    }
}

// =============================================================================
// Written type names
// =============================================================================

#[test]
fn default_imports_resolve_bare_names() {
    let loader = MapClassLoader::with_core_types();
    let mut compilation = Compilation::new(&loader);
    let object = compilation.arena_mut().object_type();
    let app = compilation.arena_mut().make("demo.App");
    let list = compilation.arena_mut().make("List");

    let mut decl = class_named("demo.App", app, object);
    decl.fields.push(field("items", list));
    let mut source = SourceUnit::new(ModuleNode::new(Some("demo")));
    source.classes.push(decl);
    compilation.add_source(source);

    compilation.resolve().unwrap();
    assert!(compilation.is_success(), "{:?}", compilation.errors());
    assert_eq!(compilation.arena().name_of(list), "java.util.List");
}

#[test]
fn current_class_simple_name_beats_imports() {
    let loader = MapClassLoader::with_core_types();
    let mut compilation = Compilation::new(&loader);
    let object = compilation.arena_mut().object_type();
    let own_list = compilation.arena_mut().make("demo.List");
    let written = compilation.arena_mut().make("List");

    let mut decl = class_named("demo.List", own_list, object);
    decl.fields.push(field("next", written));
    let mut source = SourceUnit::new(ModuleNode::new(Some("demo")));
    source.classes.push(decl);
    compilation.add_source(source);

    compilation.resolve().unwrap();
    assert!(compilation.is_success(), "{:?}", compilation.errors());
    assert_eq!(compilation.arena().name_of(written), "demo.List");
}

#[test]
fn single_import_beats_star_import() {
    let mut loader = MapClassLoader::with_core_types();
    loader.add_class(LoadedClass::new("acme.List"));
    let mut compilation = Compilation::new(&loader);
    let object = compilation.arena_mut().object_type();
    let app = compilation.arena_mut().make("demo.App");
    let imported = compilation.arena_mut().make("acme.List");
    let written = compilation.arena_mut().make("List");

    let mut module = ModuleNode::new(Some("demo"));
    module.imports.push(ImportNode {
        kind: ImportKind::Star {
            package: "java.util".to_string(),
        },
        span: s(),
    });
    module.imports.push(ImportNode {
        kind: ImportKind::Single {
            alias: "List".to_string(),
            ty: imported,
        },
        span: s(),
    });

    let mut decl = class_named("demo.App", app, object);
    decl.fields.push(field("items", written));
    let mut source = SourceUnit::new(module);
    source.classes.push(decl);
    compilation.add_source(source);

    compilation.resolve().unwrap();
    assert!(compilation.is_success(), "{:?}", compilation.errors());
    assert_eq!(compilation.arena().name_of(written), "acme.List");
}

#[test]
fn ambiguous_star_imports_report_and_keep_second() {
    let mut loader = MapClassLoader::new();
    loader.add_class(LoadedClass::new("java.lang.Object"));
    loader.add_class(LoadedClass::new("p1.Thing"));
    loader.add_class(LoadedClass::new("p2.Thing"));
    let mut compilation = Compilation::new(&loader);
    let object = compilation.arena_mut().object_type();
    let app = compilation.arena_mut().make("demo.App");
    let written = compilation.arena_mut().make("Thing");

    let mut module = ModuleNode::new(Some("demo"));
    for package in ["p1", "p2"] {
        module.imports.push(ImportNode {
            kind: ImportKind::Star {
                package: package.to_string(),
            },
            span: s(),
        });
    }

    let mut decl = class_named("demo.App", app, object);
    decl.fields.push(field("thing", written));
    let mut source = SourceUnit::new(module);
    source.classes.push(decl);
    compilation.add_source(source);

    compilation.resolve().unwrap();
    assert!(compilation.errors().iter().any(|e| matches!(
        e,
        ResolveError::AmbiguousClass { first, second, .. }
            if first == "p1.Thing" && second == "p2.Thing"
    )));
    assert_eq!(compilation.arena().name_of(written), "p2.Thing");
}

#[test]
fn alias_import_resolves_written_alias() {
    let loader = MapClassLoader::with_core_types();
    let mut compilation = Compilation::new(&loader);
    let object = compilation.arena_mut().object_type();
    let app = compilation.arena_mut().make("demo.App");
    let imported = compilation.arena_mut().make("java.util.List");
    let written = compilation.arena_mut().make("L");

    let mut module = ModuleNode::new(Some("demo"));
    module.imports.push(ImportNode {
        kind: ImportKind::Single {
            alias: "L".to_string(),
            ty: imported,
        },
        span: s(),
    });

    let mut decl = class_named("demo.App", app, object);
    decl.fields.push(field("items", written));
    let mut source = SourceUnit::new(module);
    source.classes.push(decl);
    compilation.add_source(source);

    compilation.resolve().unwrap();
    assert!(compilation.is_success(), "{:?}", compilation.errors());
    assert_eq!(compilation.arena().name_of(written), "java.util.List");
}

#[test]
fn nested_class_resolves_by_simple_name() {
    let loader = MapClassLoader::with_core_types();
    let mut compilation = Compilation::new(&loader);
    let object = compilation.arena_mut().object_type();
    let outer = compilation.arena_mut().make("demo.Outer");
    let inner = compilation.arena_mut().make("demo.Outer$Inner");
    let written = compilation.arena_mut().make("Inner");

    let mut outer_decl = class_named("demo.Outer", outer, object);
    outer_decl.fields.push(field("inner", written));
    let mut inner_decl = class_named("demo.Outer$Inner", inner, object);
    inner_decl.enclosing = Some(outer);

    let mut source = SourceUnit::new(ModuleNode::new(Some("demo")));
    source.classes.push(outer_decl);
    source.classes.push(inner_decl);
    compilation.add_source(source);

    compilation.resolve().unwrap();
    assert!(compilation.is_success(), "{:?}", compilation.errors());
    assert_eq!(compilation.arena().name_of(written), "demo.Outer$Inner");
}

// =============================================================================
// Expression rewrites
// =============================================================================

#[test]
fn dotted_property_chain_collapses_to_class() {
    let loader = MapClassLoader::with_core_types();
    let mut compilation = Compilation::new(&loader);
    let object = compilation.arena_mut().object_type();
    let app = compilation.arena_mut().make("demo.App");

    let body = chain(dynvar("java"), &["util", "List"]);
    let mut source = SourceUnit::new(ModuleNode::new(Some("demo")));
    let scope = source.scopes.root(false);
    let mut decl = class_named("demo.App", app, object);
    decl.methods.push(method_with_body(object, scope, body));
    source.classes.push(decl);
    compilation.add_source(source);

    compilation.resolve().unwrap();
    assert!(compilation.is_success(), "{:?}", compilation.errors());
    match body_of(&compilation, 0) {
        Expr::Class(class) => {
            assert_eq!(compilation.arena().name_of(class.ty), "java.util.List");
        }
        other => panic!("expected class expression, got {other:?}"),
    }
}

#[test]
fn class_literal_chain_strips_to_class() {
    let loader = MapClassLoader::with_core_types();
    let mut compilation = Compilation::new(&loader);
    let object = compilation.arena_mut().object_type();
    let app = compilation.arena_mut().make("demo.App");

    let body = chain(dynvar("java"), &["util", "List", "class"]);
    let mut source = SourceUnit::new(ModuleNode::new(Some("demo")));
    let scope = source.scopes.root(false);
    let mut decl = class_named("demo.App", app, object);
    decl.methods.push(method_with_body(object, scope, body));
    source.classes.push(decl);
    compilation.add_source(source);

    compilation.resolve().unwrap();
    assert!(compilation.is_success(), "{:?}", compilation.errors());
    assert!(
        matches!(body_of(&compilation, 0), Expr::Class(_)),
        "trailing .class should strip at the top level"
    );
}

#[test]
fn empty_list_subscript_makes_array_type() {
    let loader = MapClassLoader::with_core_types();
    let mut compilation = Compilation::new(&loader);
    let object = compilation.arena_mut().object_type();
    let app = compilation.arena_mut().make("demo.App");

    let body = Expr::Binary(Box::new(BinaryExpr {
        left: dynvar("String"),
        op: BinOp::Index,
        right: Expr::List(ListExpr {
            elements: vec![],
            span: s(),
        }),
        span: s(),
    }));
    let mut source = SourceUnit::new(ModuleNode::new(Some("demo")));
    let scope = source.scopes.root(false);
    let mut decl = class_named("demo.App", app, object);
    decl.methods.push(method_with_body(object, scope, body));
    source.classes.push(decl);
    compilation.add_source(source);

    compilation.resolve().unwrap();
    assert!(compilation.is_success(), "{:?}", compilation.errors());
    match body_of(&compilation, 0) {
        Expr::Class(class) => {
            assert_eq!(compilation.arena().name_of(class.ty), "java.lang.String[]");
        }
        other => panic!("expected array class expression, got {other:?}"),
    }
}

// =============================================================================
// Semantic checks
// =============================================================================

#[test]
fn cyclic_inheritance_is_reported() {
    let loader = MapClassLoader::with_core_types();
    let mut compilation = Compilation::new(&loader);
    let a = compilation.arena_mut().make("demo.A");
    let b = compilation.arena_mut().make("demo.B");

    let mut source = SourceUnit::new(ModuleNode::new(Some("demo")));
    source.classes.push(class_named("demo.A", a, b));
    source.classes.push(class_named("demo.B", b, a));
    compilation.add_source(source);

    compilation.resolve().unwrap();
    assert!(compilation
        .errors()
        .iter()
        .any(|e| matches!(e, ResolveError::CyclicInheritance { .. })));
}

#[test]
fn abstract_class_cannot_be_instantiated() {
    let mut loader = MapClassLoader::with_core_types();
    loader.add_class(
        LoadedClass::new("acme.Shape").with_flags(ClassFlags::PUBLIC | ClassFlags::ABSTRACT),
    );
    let mut compilation = Compilation::new(&loader);
    let object = compilation.arena_mut().object_type();
    let app = compilation.arena_mut().make("demo.App");
    let shape = compilation.arena_mut().make("acme.Shape");

    let body = Expr::ConstructorCall(Box::new(ConstructorCallExpr {
        ty: shape,
        args: vec![],
        kind: ConstructorKind::New,
        span: s(),
    }));
    let mut source = SourceUnit::new(ModuleNode::new(Some("demo")));
    let scope = source.scopes.root(false);
    let mut decl = class_named("demo.App", app, object);
    decl.methods.push(method_with_body(object, scope, body));
    source.classes.push(decl);
    compilation.add_source(source);

    compilation.resolve().unwrap();
    assert!(compilation.errors().iter().any(|e| matches!(
        e,
        ResolveError::AbstractInstantiation { name, .. } if name == "acme.Shape"
    )));
}

#[test]
fn untyped_catch_parameter_defaults_to_exception() {
    let loader = MapClassLoader::with_core_types();
    let mut compilation = Compilation::new(&loader);
    let object = compilation.arena_mut().object_type();
    let app = compilation.arena_mut().make("demo.App");
    let untyped = compilation.arena_mut().make("def");

    let mut source = SourceUnit::new(ModuleNode::new(Some("demo")));
    let scope = source.scopes.root(false);
    let body = Stmt::TryCatch(Box::new(tern::ast::TryCatchStmt {
        body: Stmt::Expr(ExprStmt {
            expr: dynvar("x"),
            span: s(),
        }),
        catches: vec![tern::ast::CatchClause {
            parameter: tern::ast::Parameter::new("e", untyped, s()),
            body: Stmt::Expr(ExprStmt {
                expr: dynvar("e"),
                span: s(),
            }),
            span: s(),
        }],
        finally: None,
        span: s(),
    }));
    let mut decl = class_named("demo.App", app, object);
    let mut method = method_with_body(object, scope, dynvar("x"));
    method.body = Some(body);
    decl.methods.push(method);
    source.classes.push(decl);
    compilation.add_source(source);

    compilation.resolve().unwrap();
    assert!(compilation.is_success(), "{:?}", compilation.errors());
    let caught = match &compilation.sources()[0].classes[0].methods[0].body {
        Some(Stmt::TryCatch(stmt)) => stmt.catches[0].parameter.ty,
        other => panic!("expected try/catch body, got {other:?}"),
    };
    assert_eq!(compilation.arena().name_of(caught), "java.lang.Exception");
}

// =============================================================================
// Generics
// =============================================================================

#[test]
fn bounded_parameter_binds_to_its_first_bound() {
    let loader = MapClassLoader::with_core_types();
    let mut compilation = Compilation::new(&loader);
    let object = compilation.arena_mut().object_type();
    let boxed = compilation.arena_mut().make("demo.Box");
    let t_decl = compilation.arena_mut().make("T");
    let bound = compilation.arena_mut().make("List");

    let mut decl = class_named("demo.Box", boxed, object);
    decl.generics = Some(vec![GenericsType::bounded("T", t_decl, vec![bound])]);
    decl.fields.push(field("value", t_decl));
    let mut source = SourceUnit::new(ModuleNode::new(Some("demo")));
    source.classes.push(decl);
    compilation.add_source(source);

    compilation.resolve().unwrap();
    assert!(compilation.is_success(), "{:?}", compilation.errors());
    let generics = compilation.sources()[0].classes[0]
        .generics
        .as_ref()
        .unwrap();
    assert!(generics[0].resolved);
    assert!(generics[0].placeholder);
    assert_eq!(compilation.arena().name_of(t_decl), "java.util.List");
}

#[test]
fn usage_site_argument_binds_to_in_scope_parameter() {
    let loader = MapClassLoader::with_core_types();
    let mut compilation = Compilation::new(&loader);
    let object = compilation.arena_mut().object_type();
    let boxed = compilation.arena_mut().make("demo.Box");
    let t_decl = compilation.arena_mut().make("T");
    let t_use = compilation.arena_mut().make("T");
    let list = compilation.arena_mut().make("List");
    compilation.arena_mut().get_mut(list).generics = Some(vec![GenericsType::new("T", t_use)]);

    let mut decl = class_named("demo.Box", boxed, object);
    decl.generics = Some(vec![GenericsType::new("T", t_decl)]);
    decl.fields.push(field("items", list));
    let mut source = SourceUnit::new(ModuleNode::new(Some("demo")));
    source.classes.push(decl);
    compilation.add_source(source);

    compilation.resolve().unwrap();
    assert!(compilation.is_success(), "{:?}", compilation.errors());
    assert_eq!(compilation.arena().name_of(list), "java.util.List");
    // The argument rides on the declared parameter, which defaults to Object.
    assert_eq!(
        compilation.arena().redirect_of(t_use),
        compilation.arena().redirect_of(t_decl)
    );
    assert_eq!(compilation.arena().name_of(t_decl), "java.lang.Object");
    let args = compilation.arena().get(list).generics.as_ref().unwrap();
    assert!(args[0].resolved);
    assert!(args[0].placeholder);
}

#[test]
fn resolved_argument_is_left_untouched() {
    let loader = MapClassLoader::with_core_types();
    let mut compilation = Compilation::new(&loader);
    let object = compilation.arena_mut().object_type();
    let app = compilation.arena_mut().make("demo.App");
    let list = compilation.arena_mut().make("List");
    let frozen = compilation.arena_mut().make("NoSuchParameter");
    let mut arg = GenericsType::new("NoSuchParameter", frozen);
    arg.resolved = true;
    compilation.arena_mut().get_mut(list).generics = Some(vec![arg]);

    let mut decl = class_named("demo.App", app, object);
    // Two mentions of the same written entry resolve it twice.
    decl.fields.push(field("items", list));
    decl.fields.push(field("more", list));
    let mut source = SourceUnit::new(ModuleNode::new(Some("demo")));
    source.classes.push(decl);
    compilation.add_source(source);

    compilation.resolve().unwrap();
    assert!(compilation.is_success(), "{:?}", compilation.errors());
    assert!(!compilation.arena().is_resolved(frozen));
}

#[test]
fn static_method_does_not_see_class_parameters() {
    let loader = MapClassLoader::with_core_types();
    let mut compilation = Compilation::new(&loader);
    let object = compilation.arena_mut().object_type();
    let boxed = compilation.arena_mut().make("demo.Box");
    let t_decl = compilation.arena_mut().make("T");
    let t_inst = compilation.arena_mut().make("T");
    let t_static = compilation.arena_mut().make("T");

    let mut decl = class_named("demo.Box", boxed, object);
    decl.generics = Some(vec![GenericsType::new("T", t_decl)]);
    let mut source = SourceUnit::new(ModuleNode::new(Some("demo")));
    let scope = source.scopes.root(false);
    let static_scope = source.scopes.root(true);
    decl.methods.push(method_with_body(
        t_inst,
        scope,
        Expr::Constant(ConstantExpr::new(1i64, s())),
    ));
    let mut st = method_with_body(
        t_static,
        static_scope,
        Expr::Constant(ConstantExpr::new(1i64, s())),
    );
    st.flags |= MemberFlags::STATIC;
    decl.methods.push(st);
    source.classes.push(decl);
    compilation.add_source(source);

    compilation.resolve().unwrap();
    // The instance method's return type rides the class parameter.
    assert_eq!(
        compilation.arena().redirect_of(t_inst),
        compilation.arena().redirect_of(t_decl)
    );
    // The static method's does not, so the bare name has no meaning.
    assert!(compilation.errors().iter().any(|e| matches!(
        e,
        ResolveError::UnresolvedClass { name, .. } if name == "T"
    )));
    assert!(!compilation.arena().is_resolved(t_static));
}

// =============================================================================
// Script discovery
// =============================================================================

#[test]
fn discovered_script_is_parsed_and_linked() {
    let mut loader = MapClassLoader::with_core_types();
    loader.add_script(ScriptSource {
        class_name: "demo.Helper".to_string(),
        location: "demo/Helper.tern".to_string(),
        last_modified: 100,
    });
    let mut compilation = Compilation::new(&loader);
    let object = compilation.arena_mut().object_type();
    let app = compilation.arena_mut().make("demo.App");
    let written = compilation.arena_mut().make("demo.Helper");

    compilation.set_script_parser(Box::new(|source: &ScriptSource, arena: &mut ClassArena| {
        let class_id = arena.make(source.class_name.clone());
        let superclass = arena.object_type();
        let mut unit = SourceUnit::new(ModuleNode::new(Some("demo")));
        unit.classes
            .push(class_named(&source.class_name, class_id, superclass));
        Some(unit)
    }));

    let mut decl = class_named("demo.App", app, object);
    decl.fields.push(field("helper", written));
    let mut source = SourceUnit::new(ModuleNode::new(Some("demo")));
    source.classes.push(decl);
    compilation.add_source(source);

    compilation.resolve().unwrap();
    assert!(compilation.is_success(), "{:?}", compilation.errors());
    assert_eq!(compilation.arena().name_of(written), "demo.Helper");
    assert!(compilation
        .arena()
        .is_primary(compilation.arena().redirect_of(written)));
    assert_eq!(compilation.sources().len(), 2);
}
