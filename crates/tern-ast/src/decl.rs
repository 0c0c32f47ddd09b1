//! Declaration nodes: classes, methods, fields, parameters, annotations.

use tern_core::{ClassFlags, ClassId, GenericsType, MemberFlags, ScopeId, Span};

use crate::expr::Expr;
use crate::stmt::Stmt;

/// An annotation applied to a declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationNode {
    /// The annotation class.
    pub ty: ClassId,
    /// Named member values: `@Foo(bar = 1)`.
    pub members: Vec<(String, Expr)>,
    pub span: Span,
}

/// A method or closure parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub ty: ClassId,
    pub default_value: Option<Expr>,
    pub annotations: Vec<AnnotationNode>,
    pub span: Span,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: ClassId, span: Span) -> Self {
        Self {
            name: name.into(),
            ty,
            default_value: None,
            annotations: Vec::new(),
            span,
        }
    }
}

/// A field or property declaration.
///
/// Properties are fields with `is_property` set; their accessor methods are
/// generated later and are visible to static-import member queries by name
/// convention.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: String,
    pub ty: ClassId,
    pub flags: MemberFlags,
    pub initializer: Option<Expr>,
    pub is_property: bool,
    pub annotations: Vec<AnnotationNode>,
    pub span: Span,
}

/// A method or constructor declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub name: String,
    pub flags: MemberFlags,
    pub return_type: ClassId,
    pub params: Vec<Parameter>,
    pub exceptions: Vec<ClassId>,
    pub generics: Option<Vec<GenericsType>>,
    pub body: Option<Stmt>,
    pub is_constructor: bool,
    /// The method's root variable scope.
    pub scope: ScopeId,
    pub annotations: Vec<AnnotationNode>,
    pub span: Span,
}

impl MethodDecl {
    /// Whether the method is declared `static`.
    #[inline]
    pub fn is_static(&self) -> bool {
        self.flags.is_static()
    }
}

/// A class declaration in a source unit.
///
/// Nested classes are separate entries in the unit's class list with
/// `enclosing` pointing at the outer class; their `name` is the mangled
/// form (`Outer$Inner`).
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    /// Fully qualified name (package, and `$` for nesting).
    pub name: String,
    /// The class table entry this declaration defines.
    pub class_id: ClassId,
    pub flags: ClassFlags,
    pub superclass: ClassId,
    pub interfaces: Vec<ClassId>,
    pub generics: Option<Vec<GenericsType>>,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<MethodDecl>,
    pub annotations: Vec<AnnotationNode>,
    /// The outer class, for nested declarations.
    pub enclosing: Option<ClassId>,
    /// Whether this class was generated from a script body.
    pub is_script: bool,
    pub span: Span,
}

impl ClassDecl {
    /// Whether this declaration is nested inside another class.
    #[inline]
    pub fn is_nested(&self) -> bool {
        self.enclosing.is_some()
    }

    /// The package portion of the class name, if any.
    pub fn package_name(&self) -> Option<&str> {
        tern_core::names::package_of(&self.name)
    }

    /// Find a declared method by name.
    pub fn method(&self, name: &str) -> Option<&MethodDecl> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Find a declared field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|f| f.name == name)
    }
}
