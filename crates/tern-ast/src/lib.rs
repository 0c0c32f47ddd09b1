//! Abstract syntax tree for the Tern resolution pipeline.
//!
//! The tree is built by value and mutated in place across resolution passes.
//! Expression rewrites are modeled as consuming transforms: a pass takes an
//! [`Expr`] out of its slot, returns a replacement, and the walker stores it
//! back. Type positions hold [`tern_core::ClassId`] handles into the class
//! table instead of names, so resolving a type never touches the tree.
//!
//! # Example
//!
//! ```
//! use tern_ast::{ModuleNode, SourceUnit};
//!
//! let mut unit = SourceUnit::new(ModuleNode::new(Some("com.example")));
//! assert!(unit.module.has_package());
//! assert!(unit.classes.is_empty());
//! ```

pub mod decl;
pub mod expr;
pub mod module;
pub mod scope;
pub mod stmt;

pub use decl::{AnnotationNode, ClassDecl, FieldDecl, MethodDecl, Parameter};
pub use expr::{
    BinOp, BinaryExpr, CastExpr, ClassExpr, ClosureExpr, ConstantExpr, ConstructorCallExpr,
    ConstructorKind, DeclarationExpr, Expr, ListExpr, MapEntry, MapExpr, MethodCallExpr,
    PropertyExpr, StaticMethodCallExpr, VariableExpr, VariableKind,
};
pub use module::{ImportKind, ImportNode, ModuleNode, SourceUnit};
pub use scope::{ScopeArena, VariableScope};
pub use stmt::{
    BlockStmt, CatchClause, ExprStmt, ForStmt, IfStmt, ReturnStmt, Stmt, ThrowStmt, TryCatchStmt,
    WhileStmt,
};
