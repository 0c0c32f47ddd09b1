//! Outer lookup: finding classes beyond the current compilation.
//!
//! [`ClassNodeResolver`] sits between resolution and the [`ClassLoader`]. It
//! memoizes every outcome in the three-state [`LookupCache`], interns found
//! descriptors into the class table (superclass chain included), and prefers
//! a source file over a compiled class when the source is newer.

use tern_registry::{CacheEntry, ClassArena, ClassLoader, LoadedClass, LookupCache, ScriptSource};
use tern_core::ClassId;

/// What an outer lookup found.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// A compiled class, interned into the class table.
    Class(ClassId),
    /// A source file that would define the class, queued for compilation
    /// by the driver.
    Script(ScriptSource),
}

/// Resolves class names against the loader, with memoization.
#[derive(Debug, Default)]
pub struct ClassNodeResolver {
    cache: LookupCache,
}

impl ClassNodeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// The memoized outcomes so far.
    pub fn cache(&self) -> &LookupCache {
        &self.cache
    }

    /// Forget the outcome for one name. Used when a queued script has been
    /// compiled and the name now resolves to a primary class.
    pub fn invalidate(&mut self, name: &str) {
        self.cache.invalidate(name);
    }

    /// Record that a name has no class without consulting the loader.
    pub fn cache_no_class(&mut self, name: &str) {
        self.cache.put(name, CacheEntry::NoClass);
    }

    /// Look a name up, memoizing the outcome.
    pub fn resolve_name(
        &mut self,
        name: &str,
        arena: &mut ClassArena,
        loader: &dyn ClassLoader,
    ) -> Option<Lookup> {
        match self.cache.get(name) {
            Some(CacheEntry::Found(id)) => return Some(Lookup::Class(id)),
            Some(CacheEntry::NoClass) => return None,
            Some(CacheEntry::Script) => {
                // Still pending compilation; hand later references the same
                // source so they queue up behind it.
                if let Some(source) = loader.find_script(name) {
                    return Some(Lookup::Script(source));
                }
                // The source vanished since it was cached; look again.
                self.cache.invalidate(name);
            }
            None => {}
        }

        let result = self.find_name(name, arena, loader);
        match &result {
            Some(Lookup::Class(id)) => self.cache.put(name, CacheEntry::Found(*id)),
            Some(Lookup::Script(_)) => self.cache.put(name, CacheEntry::Script),
            None => self.cache.put(name, CacheEntry::NoClass),
        }
        result
    }

    fn find_name(
        &mut self,
        name: &str,
        arena: &mut ClassArena,
        loader: &dyn ClassLoader,
    ) -> Option<Lookup> {
        match loader.load_class(name) {
            Some(descriptor) => {
                // A newer source file wins over the stale compiled class.
                if script_eligible(name)
                    && let Some(source) = loader.find_script(name)
                    && source.last_modified > descriptor.timestamp
                {
                    tracing::debug!(class = name, "source newer than compiled class");
                    return Some(Lookup::Script(source));
                }
                let id = intern_with_supers(descriptor, arena, loader);
                Some(Lookup::Class(id))
            }
            None => {
                if script_eligible(name)
                    && let Some(source) = loader.find_script(name)
                {
                    return Some(Lookup::Script(source));
                }
                None
            }
        }
    }
}

/// Intern a descriptor and its superclass chain, linking each entry at its
/// canonical superclass.
fn intern_with_supers(
    descriptor: LoadedClass,
    arena: &mut ClassArena,
    loader: &dyn ClassLoader,
) -> ClassId {
    let super_name = descriptor.superclass.clone();
    let id = arena.intern_loaded(descriptor);
    if arena.get(id).superclass.is_some() {
        return id;
    }
    if let Some(super_name) = super_name {
        // Canonical-first keeps a cyclic descriptor chain from recursing
        // forever: the second visit of a name hits the interned entry.
        let super_id = match arena.canonical_loaded(&super_name) {
            Some(existing) => Some(existing),
            None => loader
                .load_class(&super_name)
                .map(|d| intern_with_supers(d, arena, loader)),
        };
        if let Some(super_id) = super_id {
            arena.link_superclass(id, super_id);
        }
    }
    id
}

/// Whether a name may be backed by a source file. Platform classes and
/// mangled nested names never are.
fn script_eligible(name: &str) -> bool {
    !name.starts_with("java.") && !name.contains('$')
}

// ============================================================================
// Tests
// ============================================================================
