//! Statement nodes.

use tern_core::{ScopeId, Span};

use crate::decl::Parameter;
use crate::expr::Expr;

/// A statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `{ ... }` with its own variable scope.
    Block(BlockStmt),
    /// An expression in statement position.
    Expr(ExprStmt),
    If(Box<IfStmt>),
    While(Box<WhileStmt>),
    /// `for (Type name : collection) body`.
    For(Box<ForStmt>),
    Return(ReturnStmt),
    Throw(ThrowStmt),
    TryCatch(Box<TryCatchStmt>),
}

impl Stmt {
    /// The source span of this statement.
    pub fn span(&self) -> Span {
        match self {
            Stmt::Block(s) => s.span,
            Stmt::Expr(s) => s.span,
            Stmt::If(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::For(s) => s.span,
            Stmt::Return(s) => s.span,
            Stmt::Throw(s) => s.span,
            Stmt::TryCatch(s) => s.span,
        }
    }

    /// An empty block, used for synthetic bodies.
    pub fn empty_block(scope: ScopeId, span: Span) -> Stmt {
        Stmt::Block(BlockStmt {
            stmts: Vec::new(),
            scope,
            span,
        })
    }
}

/// `{ ... }`.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStmt {
    pub stmts: Vec<Stmt>,
    pub scope: ScopeId,
    pub span: Span,
}

/// An expression in statement position.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub expr: Expr,
    pub span: Span,
}

/// `if (cond) then else otherwise`.
#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub cond: Expr,
    pub then: Stmt,
    pub otherwise: Option<Stmt>,
    pub span: Span,
}

/// `while (cond) body`.
#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub cond: Expr,
    pub body: Stmt,
    pub span: Span,
}

/// `for (Type name : collection) body`.
#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub variable: Parameter,
    pub collection: Expr,
    pub body: Stmt,
    pub scope: ScopeId,
    pub span: Span,
}

/// `return expr?`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub expr: Option<Expr>,
    pub span: Span,
}

/// `throw expr`.
#[derive(Debug, Clone, PartialEq)]
pub struct ThrowStmt {
    pub expr: Expr,
    pub span: Span,
}

/// One `catch (Type name) { ... }` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub parameter: Parameter,
    pub body: Stmt,
    pub span: Span,
}

/// `try { ... } catch ... finally ...`.
#[derive(Debug, Clone, PartialEq)]
pub struct TryCatchStmt {
    pub body: Stmt,
    pub catches: Vec<CatchClause>,
    pub finally: Option<Stmt>,
    pub span: Span,
}
