//! Class table, class loading, and lookup memoization for the Tern
//! resolution pipeline.
//!
//! The [`ClassArena`] holds every type reference as its own entry; resolving
//! a reference sets an explicit redirect at the defining entry. Compiled
//! classes enter the table through the [`ClassLoader`] seam as interned
//! [`LoadedClass`] descriptors, and lookup outcomes are memoized in the
//! three-state [`LookupCache`].
//!
//! # Example
//!
//! ```
//! use tern_registry::{ClassArena, LoadedClass};
//!
//! let mut arena = ClassArena::with_primitives();
//! let list = arena.intern_loaded(LoadedClass::new("java.util.List"));
//! let reference = arena.make("List");
//! arena.set_redirect(reference, list).unwrap();
//! assert_eq!(arena.name_of(reference), "java.util.List");
//! ```

pub mod cache;
pub mod class_node;
pub mod compile_unit;
pub mod loader;

pub use cache::{CacheEntry, LookupCache};
pub use class_node::{ClassArena, ClassKind, ClassNode, ClassState};
pub use compile_unit::{CompileUnit, PendingScript};
pub use loader::{
    ClassLoader, FieldSig, LoadedClass, MapClassLoader, MemberTable, MethodSig, ScriptSource,
};
