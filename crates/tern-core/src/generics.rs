//! Type parameter usages and declarations.
//!
//! A [`GenericsType`] stands for one entry in an angle-bracket list, either
//! at a declaration site (`class Box<T extends Number>`) or a usage site
//! (`List<String>`, `Map<?, V>`). Placeholders share their backing class
//! table entry with every usage of the same parameter name in scope, so
//! redirecting the backing entry once resolves all usages together.

use crate::ClassId;

/// The name used for wildcard type arguments.
pub const WILDCARD: &str = "?";

/// One entry in a generics list.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericsType {
    /// The parameter or argument name (`T`, `String`, `?`).
    pub name: String,
    /// The class table entry standing for this type argument.
    pub ty: ClassId,
    /// Upper bounds (`T extends A & B`). Empty for unbounded entries.
    pub upper_bounds: Vec<ClassId>,
    /// Lower bound (`? super T`).
    pub lower_bound: Option<ClassId>,
    /// Whether this entry is a wildcard (`?`).
    pub wildcard: bool,
    /// Whether this entry names a type parameter rather than a concrete class.
    pub placeholder: bool,
    /// Set once resolution has bound this entry. Resolving an entry a second
    /// time must be a no-op.
    pub resolved: bool,
}

impl GenericsType {
    /// A plain named entry (concrete argument or parameter, decided later).
    pub fn new(name: impl Into<String>, ty: ClassId) -> Self {
        Self {
            name: name.into(),
            ty,
            upper_bounds: Vec::new(),
            lower_bound: None,
            wildcard: false,
            placeholder: false,
            resolved: false,
        }
    }

    /// A named entry with upper bounds.
    pub fn bounded(name: impl Into<String>, ty: ClassId, upper_bounds: Vec<ClassId>) -> Self {
        Self {
            upper_bounds,
            ..Self::new(name, ty)
        }
    }

    /// An unbounded wildcard entry.
    pub fn wildcard(ty: ClassId) -> Self {
        Self {
            wildcard: true,
            ..Self::new(WILDCARD, ty)
        }
    }

    /// Whether this entry is the `?` wildcard.
    #[inline]
    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }
}
