//! Semantic name resolution for the compiler front end.
//!
//! Resolution runs as a fixed sequence of passes over every source unit in
//! a compilation:
//!
//! 1. **Name resolution** ([`NameResolver`]) binds every written type name
//!    to a class table entry, rewriting expressions where a name turns out
//!    to denote a class.
//! 2. **Script discovery** drains the work queue of newer script sources
//!    found during lookup, parses them, and resolves the resulting units
//!    before moving on.
//! 3. **User transformations** ([`Transformation`]) run between resolution
//!    and the static passes.
//! 4. **Static import rewriting** ([`StaticImportRewriter`]) gives the
//!    remaining dynamic names their statically imported meanings.
//! 5. **Static context verification** ([`StaticContextVerifier`]) rejects
//!    dynamic names in static methods and constructor delegation calls.
//!
//! [`Compilation`] owns the shared state and drives the sequence. Errors
//! accumulate in an [`ErrorCollector`]; the driver stops early once the
//! configured tolerance is reached so a badly broken unit does not produce
//! an avalanche of follow-on diagnostics.

pub mod lookup;
pub mod resolver;
pub mod static_import;
pub mod static_verify;

pub use lookup::{ClassNodeResolver, Lookup};
pub use resolver::{LookupOpts, NameResolver};
pub use static_import::StaticImportRewriter;
pub use static_verify::StaticContextVerifier;

use tern_ast::{ClassDecl, SourceUnit};
use tern_core::{BugError, ErrorCollector, ResolveError};
use tern_registry::{ClassArena, ClassLoader, CompileUnit, ScriptSource};

/// Knobs for the resolution driver.
#[derive(Debug, Clone, Copy)]
pub struct ResolverConfig {
    /// Errors tolerated before resolution stops between phases.
    pub error_limit: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self { error_limit: 10 }
    }
}

/// A compiler extension run on each class after name resolution, before
/// the static import and verification passes.
pub trait Transformation {
    /// Name reported in trace output.
    fn name(&self) -> &'static str;

    fn apply(&mut self, class: &mut ClassDecl, arena: &mut ClassArena, errors: &mut ErrorCollector);
}

/// Parses a discovered script source into a source unit, or `None` when
/// the source cannot be compiled. The parser allocates class table entries
/// for the declarations it produces.
pub type ScriptParser<'a> =
    Box<dyn FnMut(&ScriptSource, &mut ClassArena) -> Option<SourceUnit> + 'a>;

/// Shared state for resolving a batch of source units together.
pub struct Compilation<'a> {
    arena: ClassArena,
    unit: CompileUnit,
    sources: Vec<SourceUnit>,
    lookup: ClassNodeResolver,
    loader: &'a dyn ClassLoader,
    script_parser: Option<ScriptParser<'a>>,
    transformations: Vec<Box<dyn Transformation + 'a>>,
    errors: ErrorCollector,
    config: ResolverConfig,
}

impl<'a> Compilation<'a> {
    pub fn new(loader: &'a dyn ClassLoader) -> Self {
        Self::with_config(loader, ResolverConfig::default())
    }

    pub fn with_config(loader: &'a dyn ClassLoader, config: ResolverConfig) -> Self {
        Self {
            arena: ClassArena::with_primitives(),
            unit: CompileUnit::new(),
            sources: Vec::new(),
            lookup: ClassNodeResolver::new(),
            loader,
            script_parser: None,
            transformations: Vec::new(),
            errors: ErrorCollector::new(),
            config,
        }
    }

    /// The class table. Front ends allocate entries here while building
    /// declarations, before handing the unit to [`add_source`].
    ///
    /// [`add_source`]: Compilation::add_source
    pub fn arena(&self) -> &ClassArena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut ClassArena {
        &mut self.arena
    }

    /// Register a source unit for resolution. Every class declaration is
    /// recorded as a primary class of this compilation.
    pub fn add_source(&mut self, mut source: SourceUnit) {
        for class in &source.classes {
            self.arena.register_primary(class);
            self.unit.add_class(class.name.clone(), class.class_id);
            source.module.classes.push(class.class_id);
        }
        self.sources.push(source);
    }

    pub fn set_script_parser(&mut self, parser: ScriptParser<'a>) {
        self.script_parser = Some(parser);
    }

    pub fn add_transformation(&mut self, transformation: Box<dyn Transformation + 'a>) {
        self.transformations.push(transformation);
    }

    /// Run the full pass sequence over every registered source.
    ///
    /// Semantic problems land in the error collector; `Err` is reserved
    /// for internal invariant breaks.
    pub fn resolve(&mut self) -> Result<(), BugError> {
        let mut index = 0;
        while index < self.sources.len() {
            self.resolve_names_in(index)?;
            index += 1;
            // Parsed scripts append sources, picked up by the loop.
            self.drain_scripts()?;
        }
        if self.stop_for_errors("name resolution") {
            return Ok(());
        }

        let mut transformations = std::mem::take(&mut self.transformations);
        for transformation in &mut transformations {
            tracing::debug!(name = transformation.name(), "running transformation");
            for source in &mut self.sources {
                for class in &mut source.classes {
                    transformation.apply(class, &mut self.arena, &mut self.errors);
                }
            }
        }
        self.transformations = transformations;
        if self.stop_for_errors("transformations") {
            return Ok(());
        }

        for source in &mut self.sources {
            let mut rewriter =
                StaticImportRewriter::new(&self.arena, &source.module, &mut self.errors);
            for class in &mut source.classes {
                rewriter.visit_class(class);
            }
        }
        if self.stop_for_errors("static import rewriting") {
            return Ok(());
        }

        let mut verifier = StaticContextVerifier::new(&self.arena, &mut self.errors);
        for source in &self.sources {
            for class in &source.classes {
                verifier.visit_class(class);
            }
        }
        Ok(())
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &ErrorCollector {
        &self.errors
    }

    pub fn sources(&self) -> &[SourceUnit] {
        &self.sources
    }

    pub fn into_sources(self) -> Vec<SourceUnit> {
        self.sources
    }

    fn resolve_names_in(&mut self, index: usize) -> Result<(), BugError> {
        let Compilation {
            arena,
            unit,
            sources,
            lookup,
            loader,
            errors,
            ..
        } = self;
        let SourceUnit {
            module,
            classes,
            scopes,
        } = &mut sources[index];
        for class in classes {
            NameResolver::new(arena, module, scopes, unit, lookup, *loader, errors)
                .visit_class(class)?;
        }
        Ok(())
    }

    /// Parse and resolve every script queued during lookup, redirecting
    /// the forward entries that referenced it. Parse failures become one
    /// error per reference site.
    fn drain_scripts(&mut self) -> Result<(), BugError> {
        let mut parser = self.script_parser.take();
        let result = self.drain_scripts_with(parser.as_mut());
        self.script_parser = parser;
        result
    }

    fn drain_scripts_with(
        &mut self,
        mut parser: Option<&mut ScriptParser<'a>>,
    ) -> Result<(), BugError> {
        while self.unit.has_pending_scripts() {
            for pending in self.unit.drain_pending() {
                let name = pending.source.class_name.clone();
                let parsed = parser
                    .as_mut()
                    .and_then(|parse| parse(&pending.source, &mut self.arena));
                let Some(parsed) = parsed else {
                    self.report_script_failure(&pending.source, &pending.forwards);
                    continue;
                };
                // Registered now, resolved by the driver loop in turn.
                self.add_source(parsed);
                let Some(target) = self.unit.get_class(&name) else {
                    self.report_script_failure(&pending.source, &pending.forwards);
                    continue;
                };
                for (forward, _) in &pending.forwards {
                    if self.arena.redirect_of(*forward) != target {
                        self.arena.set_redirect(*forward, target)?;
                    }
                }
                self.lookup.invalidate(&name);
            }
        }
        Ok(())
    }

    fn report_script_failure(
        &mut self,
        source: &ScriptSource,
        forwards: &[(tern_core::ClassId, tern_core::Span)],
    ) {
        for (_, span) in forwards {
            self.errors.report(ResolveError::ScriptCompilationFailed {
                name: source.class_name.clone(),
                location: source.location.clone(),
                span: *span,
            });
        }
    }

    fn stop_for_errors(&self, phase: &str) -> bool {
        if self.errors.exceeds(self.config.error_limit) {
            tracing::warn!(
                phase,
                errors = self.errors.len(),
                limit = self.config.error_limit,
                "stopping resolution, error limit reached"
            );
            true
        } else {
            false
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
