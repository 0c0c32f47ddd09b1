//! Module-level structure: package, imports, and the source unit.

use tern_core::{ClassId, Span};

use crate::decl::ClassDecl;
use crate::scope::ScopeArena;

/// One import declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportNode {
    pub kind: ImportKind,
    pub span: Span,
}

/// The four import forms.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportKind {
    /// `import a.b.C` or `import a.b.C as D`. `alias` is the local name.
    Single { alias: String, ty: ClassId },
    /// `import a.b.*`. `package` has no trailing dot.
    Star { package: String },
    /// `import static a.b.C.member` (or `as alias`).
    StaticSingle {
        alias: String,
        ty: ClassId,
        member: String,
    },
    /// `import static a.b.C.*`.
    StaticStar { ty: ClassId },
}

/// The module header of one source file: its package and import table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModuleNode {
    /// Package name without trailing dot, if declared.
    pub package: Option<String>,
    pub imports: Vec<ImportNode>,
    /// Class table entries of the classes declared in this module,
    /// in declaration order. Filled in at registration.
    pub classes: Vec<ClassId>,
    /// Latch set once the import table's own class references have been
    /// resolved, so visiting a second class in the module skips the work.
    pub imports_resolved: bool,
}

impl ModuleNode {
    /// Create a module header for the given package.
    pub fn new(package: Option<&str>) -> Self {
        Self {
            package: package.map(str::to_string),
            ..Self::default()
        }
    }

    /// Whether the module declares a package.
    pub fn has_package(&self) -> bool {
        self.package.is_some()
    }

    /// Look up a single (non-static) import by its local alias.
    pub fn import(&self, alias: &str) -> Option<ClassId> {
        self.imports.iter().find_map(|node| match &node.kind {
            ImportKind::Single { alias: a, ty } if a == alias => Some(*ty),
            _ => None,
        })
    }

    /// Look up a static single import by its local alias.
    pub fn static_import(&self, alias: &str) -> Option<(ClassId, &str)> {
        self.imports.iter().find_map(|node| match &node.kind {
            ImportKind::StaticSingle {
                alias: a,
                ty,
                member,
            } if a == alias => Some((*ty, member.as_str())),
            _ => None,
        })
    }

    /// Star-imported packages, in declaration order.
    pub fn star_imports(&self) -> impl Iterator<Item = &str> {
        self.imports.iter().filter_map(|node| match &node.kind {
            ImportKind::Star { package } => Some(package.as_str()),
            _ => None,
        })
    }

    /// Static-star-imported classes, in declaration order.
    pub fn static_star_imports(&self) -> impl Iterator<Item = ClassId> + '_ {
        self.imports.iter().filter_map(|node| match &node.kind {
            ImportKind::StaticStar { ty } => Some(*ty),
            _ => None,
        })
    }

    /// All static single imports, in declaration order.
    pub fn static_single_imports(&self) -> impl Iterator<Item = (&str, ClassId, &str)> {
        self.imports.iter().filter_map(|node| match &node.kind {
            ImportKind::StaticSingle { alias, ty, member } => {
                Some((alias.as_str(), *ty, member.as_str()))
            }
            _ => None,
        })
    }
}

/// One source file: module header, its class declarations, and the
/// variable scopes their bodies use.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceUnit {
    pub module: ModuleNode,
    pub classes: Vec<ClassDecl>,
    pub scopes: ScopeArena,
}

impl SourceUnit {
    pub fn new(module: ModuleNode) -> Self {
        Self {
            module,
            classes: Vec::new(),
            scopes: ScopeArena::new(),
        }
    }
}
