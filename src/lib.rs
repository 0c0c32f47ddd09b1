//! Umbrella crate for the Tern compiler front end.
//!
//! The work lives in the member crates; this crate re-exports them under
//! one roof:
//!
//! - [`core`]: spans, identifiers, flags, errors, and name utilities.
//! - [`ast`]: the expression, statement, and declaration trees plus the
//!   per-unit scope table.
//! - [`registry`]: the class table, loaded-class descriptors, the lookup
//!   cache, and the compile unit.
//! - [`resolve`]: the resolution passes and the [`Compilation`] driver
//!   that sequences them.
//!
//! [`Compilation`]: resolve::Compilation

pub use tern_ast as ast;
pub use tern_core as core;
pub use tern_registry as registry;
pub use tern_resolve as resolve;

pub mod prelude {
    pub use tern_ast::{ClassDecl, Expr, ModuleNode, SourceUnit, Stmt};
    pub use tern_core::{
        BugError, ClassFlags, ClassId, ErrorCollector, MemberFlags, ResolveError, ScopeId, Span,
    };
    pub use tern_registry::{ClassArena, ClassLoader, CompileUnit, LoadedClass, MapClassLoader};
    pub use tern_resolve::{
        ClassNodeResolver, Compilation, NameResolver, ResolverConfig, ScriptParser,
        StaticContextVerifier, StaticImportRewriter, Transformation,
    };
}
