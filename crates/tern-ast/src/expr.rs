//! Expression nodes.
//!
//! Expressions are owned values; resolution passes consume an expression and
//! return its replacement, so rewrites (dynamic variable to class literal,
//! implicit call to static call) are ordinary value construction rather than
//! in-place graph surgery.
//!
//! Type positions never hold type names directly. They hold a [`ClassId`]
//! into the class table, and resolution redirects the referenced entry.

use tern_core::{ClassId, ConstantValue, ScopeId, Span};

use crate::decl::Parameter;
use crate::stmt::Stmt;

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Placeholder produced when an expression is taken out of its slot.
    Empty(Span),
    /// A variable reference.
    Variable(VariableExpr),
    /// A literal constant.
    Constant(ConstantExpr),
    /// A class literal (a name resolved to a class).
    Class(ClassExpr),
    /// `object.property` access.
    Property(Box<PropertyExpr>),
    /// `object.method(args)` call.
    MethodCall(Box<MethodCallExpr>),
    /// A call with a statically known receiver class.
    StaticMethodCall(Box<StaticMethodCallExpr>),
    /// `new Type(args)`, `this(args)`, or `super(args)`.
    ConstructorCall(Box<ConstructorCallExpr>),
    /// A binary operation, including assignment and subscript.
    Binary(Box<BinaryExpr>),
    /// A local declaration with initializer: `Type name = value`.
    Declaration(Box<DeclarationExpr>),
    /// `(Type) value` or `value as Type`.
    Cast(Box<CastExpr>),
    /// A closure literal.
    Closure(Box<ClosureExpr>),
    /// `[a, b, c]`.
    List(ListExpr),
    /// `[k: v, ...]`.
    Map(MapExpr),
}

impl Expr {
    /// The source span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Expr::Empty(span) => *span,
            Expr::Variable(e) => e.span,
            Expr::Constant(e) => e.span,
            Expr::Class(e) => e.span,
            Expr::Property(e) => e.span,
            Expr::MethodCall(e) => e.span,
            Expr::StaticMethodCall(e) => e.span,
            Expr::ConstructorCall(e) => e.span,
            Expr::Binary(e) => e.span,
            Expr::Declaration(e) => e.span,
            Expr::Cast(e) => e.span,
            Expr::Closure(e) => e.span,
            Expr::List(e) => e.span,
            Expr::Map(e) => e.span,
        }
    }

    /// Move this expression out of its slot, leaving an empty placeholder.
    pub fn take(&mut self) -> Expr {
        let span = self.span();
        std::mem::replace(self, Expr::Empty(span))
    }

    /// The string value, when this is a string constant.
    pub fn constant_string(&self) -> Option<&str> {
        match self {
            Expr::Constant(ConstantExpr {
                value: ConstantValue::Str(s),
                ..
            }) => Some(s),
            _ => None,
        }
    }

    /// Whether this is a list literal with no elements.
    pub fn is_empty_list(&self) -> bool {
        matches!(self, Expr::List(list) if list.elements.is_empty())
    }

    /// Apply `f` to every direct child expression, rebuilding this node.
    ///
    /// Closure bodies are statements, not child expressions, and are not
    /// walked here; passes that care about closures match on them directly.
    pub fn transform_children(self, f: &mut dyn FnMut(Expr) -> Expr) -> Expr {
        match self {
            Expr::Property(mut e) => {
                e.object = f(e.object);
                e.property = f(e.property);
                Expr::Property(e)
            }
            Expr::MethodCall(mut e) => {
                e.object = f(e.object);
                e.method = f(e.method);
                e.args = e.args.into_iter().map(&mut *f).collect();
                Expr::MethodCall(e)
            }
            Expr::StaticMethodCall(mut e) => {
                e.args = e.args.into_iter().map(&mut *f).collect();
                Expr::StaticMethodCall(e)
            }
            Expr::ConstructorCall(mut e) => {
                e.args = e.args.into_iter().map(&mut *f).collect();
                Expr::ConstructorCall(e)
            }
            Expr::Binary(mut e) => {
                e.left = f(e.left);
                e.right = f(e.right);
                Expr::Binary(e)
            }
            Expr::Declaration(mut e) => {
                e.left = f(e.left);
                e.right = f(e.right);
                Expr::Declaration(e)
            }
            Expr::Cast(mut e) => {
                e.operand = f(e.operand);
                Expr::Cast(e)
            }
            Expr::List(mut e) => {
                e.elements = e.elements.into_iter().map(&mut *f).collect();
                Expr::List(e)
            }
            Expr::Map(mut e) => {
                e.entries = e
                    .entries
                    .into_iter()
                    .map(|entry| MapEntry {
                        key: f(entry.key),
                        value: f(entry.value),
                        span: entry.span,
                    })
                    .collect();
                Expr::Map(e)
            }
            leaf => leaf,
        }
    }
}

/// What kind of binding a variable reference has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    /// A local variable declared in an enclosing scope.
    Local,
    /// A method or closure parameter.
    Parameter,
    /// A field of the declaring class.
    Field {
        /// The class declaring the field.
        declaring: ClassId,
        /// Whether the field is static.
        is_static: bool,
    },
    /// `this`.
    This,
    /// `super`.
    Super,
    /// Unbound at parse time. Resolution decides whether this is a class
    /// name, a statically imported member, or a genuinely dynamic variable.
    Dynamic,
}

/// A variable reference.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableExpr {
    pub name: String,
    pub kind: VariableKind,
    /// The declared type, when known (`This`/`Super` carry the class).
    pub ty: Option<ClassId>,
    pub span: Span,
}

impl VariableExpr {
    /// An unbound variable reference.
    pub fn dynamic(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            kind: VariableKind::Dynamic,
            ty: None,
            span,
        }
    }

    /// Whether this reference is `this` or `super`.
    pub fn is_this_or_super(&self) -> bool {
        matches!(self.kind, VariableKind::This | VariableKind::Super)
    }

    /// Whether this reference is still unbound.
    pub fn is_dynamic(&self) -> bool {
        self.kind == VariableKind::Dynamic
    }
}

/// A literal constant.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantExpr {
    pub value: ConstantValue,
    pub span: Span,
}

impl ConstantExpr {
    pub fn new(value: impl Into<ConstantValue>, span: Span) -> Self {
        Self {
            value: value.into(),
            span,
        }
    }
}

/// A class literal.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassExpr {
    pub ty: ClassId,
    pub span: Span,
}

/// `object.property` access.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyExpr {
    pub object: Expr,
    /// Usually a string constant; dynamic property names stay expressions.
    pub property: Expr,
    /// `?.` access.
    pub safe: bool,
    /// `*.` access.
    pub spread_safe: bool,
    /// True when the receiver was inserted by the parser (`foo` for `this.foo`).
    pub implicit_this: bool,
    pub span: Span,
}

impl PropertyExpr {
    /// The property name, when it is a static string.
    pub fn property_name(&self) -> Option<&str> {
        self.property.constant_string()
    }
}

/// `object.method(args)`.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCallExpr {
    pub object: Expr,
    /// Usually a string constant; dynamic method names stay expressions.
    pub method: Expr,
    pub args: Vec<Expr>,
    /// True when the receiver was inserted by the parser (`foo()` for `this.foo()`).
    pub implicit_this: bool,
    pub safe: bool,
    pub spread_safe: bool,
    pub span: Span,
}

impl MethodCallExpr {
    /// The method name, when it is a static string.
    pub fn method_name(&self) -> Option<&str> {
        self.method.constant_string()
    }
}

/// A call whose receiver class is statically known.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticMethodCallExpr {
    pub owner: ClassId,
    pub method: String,
    pub args: Vec<Expr>,
    pub span: Span,
}

/// How a constructor call delegates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructorKind {
    /// `new Type(...)`.
    New,
    /// `this(...)` inside a constructor.
    This,
    /// `super(...)` inside a constructor.
    Super,
}

/// `new Type(args)`, `this(args)`, or `super(args)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorCallExpr {
    pub ty: ClassId,
    pub args: Vec<Expr>,
    pub kind: ConstructorKind,
    pub span: Span,
}

impl ConstructorCallExpr {
    /// Whether this is a `this(...)`/`super(...)` delegation call.
    pub fn is_delegation(&self) -> bool {
        self.kind != ConstructorKind::New
    }
}

/// Binary operators that survive to resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Assign,
    Plus,
    Minus,
    Multiply,
    Divide,
    Mod,
    Power,
    Eq,
    Neq,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    LeftShift,
    RightShift,
    /// Subscript: `a[b]`.
    Index,
    /// `in`.
    In,
    /// `<=>`.
    Spaceship,
}

impl BinOp {
    /// Whether this operator stores into its left operand.
    #[inline]
    pub fn is_assignment(self) -> bool {
        self == BinOp::Assign
    }
}

/// A binary operation.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub op: BinOp,
    pub left: Expr,
    pub right: Expr,
    pub span: Span,
}

/// `Type name = value`.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclarationExpr {
    /// The declared variable (carries the declared type).
    pub left: Expr,
    pub right: Expr,
    pub span: Span,
}

/// `(Type) value` or `value as Type`.
#[derive(Debug, Clone, PartialEq)]
pub struct CastExpr {
    pub ty: ClassId,
    pub operand: Expr,
    /// True for `as`-style coercion.
    pub coerce: bool,
    pub span: Span,
}

/// A closure literal.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosureExpr {
    pub params: Vec<Parameter>,
    pub body: Stmt,
    pub scope: ScopeId,
    pub span: Span,
}

/// `[a, b, c]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ListExpr {
    pub elements: Vec<Expr>,
    pub span: Span,
}

/// One `k: v` entry of a map literal.
#[derive(Debug, Clone, PartialEq)]
pub struct MapEntry {
    pub key: Expr,
    pub value: Expr,
    pub span: Span,
}

/// `[k: v, ...]`.
#[derive(Debug, Clone, PartialEq)]
pub struct MapExpr {
    pub entries: Vec<MapEntry>,
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s() -> Span {
        Span::point(1, 1)
    }

    #[test]
    fn constant_string_helper() {
        let c = Expr::Constant(ConstantExpr::new("name", s()));
        assert_eq!(c.constant_string(), Some("name"));

        let n = Expr::Constant(ConstantExpr::new(3i64, s()));
        assert_eq!(n.constant_string(), None);
    }

    #[test]
    fn take_leaves_placeholder() {
        let mut e = Expr::Variable(VariableExpr::dynamic("x", s()));
        let taken = e.take();
        assert!(matches!(taken, Expr::Variable(_)));
        assert!(matches!(e, Expr::Empty(_)));
    }

    #[test]
    fn transform_children_rebuilds_binary() {
        let bin = Expr::Binary(Box::new(BinaryExpr {
            op: BinOp::Plus,
            left: Expr::Constant(ConstantExpr::new(1i64, s())),
            right: Expr::Constant(ConstantExpr::new(2i64, s())),
            span: s(),
        }));
        // Replace every constant child with a variable.
        let out = bin.transform_children(&mut |_| Expr::Variable(VariableExpr::dynamic("v", s())));
        match out {
            Expr::Binary(b) => {
                assert!(matches!(b.left, Expr::Variable(_)));
                assert!(matches!(b.right, Expr::Variable(_)));
            }
            other => panic!("expected binary, got {other:?}"),
        }
    }

    #[test]
    fn empty_list_detection() {
        let empty = Expr::List(ListExpr {
            elements: vec![],
            span: s(),
        });
        assert!(empty.is_empty_list());

        let full = Expr::List(ListExpr {
            elements: vec![Expr::Constant(ConstantExpr::new(1i64, s()))],
            span: s(),
        });
        assert!(!full.is_empty_list());
    }
}
