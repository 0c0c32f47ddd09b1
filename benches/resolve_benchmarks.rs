//! Performance benchmarks for the resolution pipeline.
//!
//! The suite measures the full pass sequence over synthetic units of
//! increasing size, plus the lookup-heavy cases that dominate real
//! workloads: default-import fallbacks and star-import scans.

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

use tern::ast::{
    ClassDecl, ConstantExpr, Expr, ExprStmt, FieldDecl, ImportKind, ImportNode, MethodCallExpr,
    MethodDecl, ModuleNode, SourceUnit, Stmt, VariableExpr, VariableKind,
};
use tern::core::{ClassFlags, ClassId, MemberFlags, Span};
use tern::registry::MapClassLoader;
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

/// A unit with `classes` classes of `fields` fields each, every field
/// written as a bare `List` that resolves through the default imports.
fn build_unit(compilation: &mut Compilation<'_>, classes: usize, fields: usize) {
    let object = compilation.arena_mut().object_type();
    let mut source = SourceUnit::new(ModuleNode::new(Some("bench")));
    for c in 0..classes {
        let name = format!("bench.C{c}");
        let class_id = compilation.arena_mut().make(name.clone());
        let mut decl = class_named(&name, class_id, object);
        for f in 0..fields {
            let ty = compilation.arena_mut().make("List");
            decl.fields.push(FieldDecl {
                name: format!("f{f}"),
                ty,
                flags: MemberFlags::PUBLIC,
                initializer: None,
                is_property: false,
                annotations: vec![],
                span: s(),
            });
        }
        source.classes.push(decl);
    }
    compilation.add_source(source);
}

fn bench_unit_sizes(c: &mut Criterion) {
    let loader = MapClassLoader::with_core_types();
    let mut group = c.benchmark_group("resolve");
    for (label, classes, fields) in [
        ("small_5_classes", 5usize, 4usize),
        ("medium_50_classes", 50, 8),
        ("large_200_classes", 200, 8),
    ] {
        group.throughput(Throughput::Elements((classes * fields) as u64));
        group.bench_function(label, |b| {
            b.iter(|| {
                let mut compilation = Compilation::new(&loader);
                build_unit(&mut compilation, classes, fields);
                compilation.resolve().unwrap();
                black_box(compilation.is_success())
            });
        });
    }
    group.finish();
}

fn bench_star_import_scan(c: &mut Criterion) {
    let loader = MapClassLoader::with_core_types();
    c.bench_function("star_import_scan", |b| {
        b.iter(|| {
            let mut compilation = Compilation::new(&loader);
            let object = compilation.arena_mut().object_type();
            let mut module = ModuleNode::new(Some("bench"));
            for package in ["java.io", "java.net", "java.util"] {
                module.imports.push(ImportNode {
                    kind: ImportKind::Star {
                        package: package.to_string(),
                    },
                    span: s(),
                });
            }
            let class_id = compilation.arena_mut().make("bench.App");
            let mut decl = class_named("bench.App", class_id, object);
            for f in 0..16 {
                let ty = compilation.arena_mut().make("HashMap");
                decl.fields.push(FieldDecl {
                    name: format!("f{f}"),
                    ty,
                    flags: MemberFlags::PUBLIC,
                    initializer: None,
                    is_property: false,
                    annotations: vec![],
                    span: s(),
                });
            }
            let mut source = SourceUnit::new(module);
            source.classes.push(decl);
            compilation.add_source(source);
            compilation.resolve().unwrap();
            black_box(compilation.is_success())
        });
    });
}

fn bench_static_import_rewrite(c: &mut Criterion) {
    let loader = MapClassLoader::with_core_types();
    c.bench_function("static_import_rewrite", |b| {
        b.iter(|| {
            let mut compilation = Compilation::new(&loader);
            let object = compilation.arena_mut().object_type();
            let math = compilation.arena_mut().make("java.lang.Math");
            let mut module = ModuleNode::new(Some("bench"));
            module.imports.push(ImportNode {
                kind: ImportKind::StaticStar { ty: math },
                span: s(),
            });
            let class_id = compilation.arena_mut().make("bench.App");
            let mut decl = class_named("bench.App", class_id, object);
            let mut source = SourceUnit::new(module);
            for m in 0..32 {
                let scope = source.scopes.root(false);
                decl.methods.push(MethodDecl {
                    name: format!("m{m}"),
                    flags: MemberFlags::PUBLIC,
                    return_type: object,
                    params: vec![],
                    exceptions: vec![],
                    generics: None,
                    body: Some(Stmt::Expr(ExprStmt {
                        expr: Expr::MethodCall(Box::new(MethodCallExpr {
                            object: Expr::Variable(VariableExpr {
                                name: "this".to_string(),
                                kind: VariableKind::This,
                                ty: None,
                                span: s(),
                            }),
                            method: Expr::Constant(ConstantExpr::new("abs", s())),
                            args: vec![Expr::Variable(VariableExpr::dynamic("x", s()))],
                            implicit_this: true,
                            safe: false,
                            spread_safe: false,
                            span: s(),
                        })),
                        span: s(),
                    })),
                    is_constructor: false,
                    scope,
                    annotations: vec![],
                    span: s(),
                });
            }
            source.classes.push(decl);
            compilation.add_source(source);
            compilation.resolve().unwrap();
            black_box(compilation.is_success())
        });
    });
}

criterion_group!(
    benches,
    bench_unit_sizes,
    bench_star_import_scan,
    bench_static_import_rewrite
);
criterion_main!(benches);
