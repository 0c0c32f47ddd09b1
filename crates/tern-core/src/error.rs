//! Error types for name resolution.
//!
//! Resolution distinguishes two failure modes:
//!
//! - [`ResolveError`] - a problem with the program being compiled. These are
//!   collected and reported together so a single pass can surface many
//!   diagnostics; resolution keeps going after recording one.
//! - [`BugError`] - a broken internal invariant (a redirect cycle, a rebound
//!   placeholder). These indicate a defect in the compiler itself, abort the
//!   pipeline immediately, and are never mixed into user diagnostics.

use thiserror::Error;

use crate::Span;

// ============================================================================
// User-facing resolution errors
// ============================================================================

/// Errors describing problems in the program under compilation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    /// A class name could not be resolved by any lookup strategy.
    #[error("at {span}: unable to resolve class '{name}'")]
    UnresolvedClass {
        /// The name as written in source.
        name: String,
        /// Where the name was referenced.
        span: Span,
    },

    /// Two import strategies both supplied a class for the same name.
    #[error("at {span}: reference to '{name}' is ambiguous, both class '{first}' and '{second}' match")]
    AmbiguousClass {
        /// The simple name that was looked up.
        name: String,
        /// The first matching qualified name.
        first: String,
        /// The second matching qualified name.
        second: String,
        /// Where the name was referenced.
        span: Span,
    },

    /// The left-hand side of an assignment resolved to a class.
    #[error("at {span}: cannot assign a value to the class '{name}'")]
    AssignToClass {
        /// The class name.
        name: String,
        /// Where the assignment occurred.
        span: Span,
    },

    /// A class appears in its own superclass or interface chain.
    #[error("at {span}: cyclic inheritance involving '{name}'")]
    CyclicInheritance {
        /// The class closing the cycle.
        name: String,
        /// Where the class was declared.
        span: Span,
    },

    /// `new` was applied to an abstract class or interface.
    #[error("at {span}: cannot instantiate abstract class '{name}'")]
    AbstractInstantiation {
        /// The abstract class name.
        name: String,
        /// Where the constructor call occurred.
        span: Span,
    },

    /// A wildcard type argument appeared on a superclass or interface.
    #[error("at {span}: a supertype may not specify a wildcard type argument ('{name}')")]
    WildcardSupertype {
        /// The supertype name carrying the wildcard.
        name: String,
        /// Where the supertype was declared.
        span: Span,
    },

    /// `Class.this` or `Class.super` used outside a nested class.
    #[error("at {span}: the usage of 'Class.this' and 'Class.super' is only allowed in nested or inner classes")]
    QualifiedThisInTopLevel {
        /// Where the qualified access occurred.
        span: Span,
    },

    /// The qualifier of `Class.this`/`Class.super` is not an enclosing class.
    #[error("at {span}: the class '{qualifier}' needs to be an outer class of '{current}' for 'this'/'super' qualification")]
    NotAnOuterClass {
        /// The qualifier as written.
        qualifier: String,
        /// The class being compiled.
        current: String,
        /// Where the qualified access occurred.
        span: Span,
    },

    /// An apparent variable in a static context has no static meaning.
    #[error("at {span}: apparent variable '{name}' was found in a static scope but doesn't refer to a local variable, static field, or class")]
    StaticScopeVariable {
        /// The variable name.
        name: String,
        /// Where the variable was referenced.
        span: Span,
    },

    /// A dynamic variable was referenced in a `this(...)`/`super(...)` call.
    #[error("at {span}: apparent variable '{name}' cannot be used in a constructor delegation call")]
    SpecialCallVariable {
        /// The variable name.
        name: String,
        /// Where the variable was referenced.
        span: Span,
    },

    /// The same annotation was applied twice to one target.
    #[error("at {span}: cannot specify duplicate annotation '{name}'")]
    DuplicateAnnotation {
        /// The annotation class name.
        name: String,
        /// Where the second application occurred.
        span: Span,
    },

    /// An annotation member value is not a compile-time constant.
    #[error("at {span}: expected a constant value for annotation member '{member}'")]
    AnnotationMemberNotConstant {
        /// The member name.
        member: String,
        /// Where the member value occurred.
        span: Span,
    },

    /// A source file was found for a class but could not be compiled.
    #[error("at {span}: source '{location}' for class '{name}' could not be compiled")]
    ScriptCompilationFailed {
        /// The class name that was being looked up.
        name: String,
        /// Where the source was found.
        location: String,
        /// Where the class was referenced.
        span: Span,
    },

    /// A generic resolution error.
    #[error("at {span}: {message}")]
    Other {
        /// The error message.
        message: String,
        /// Where the error occurred.
        span: Span,
    },
}

impl ResolveError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            ResolveError::UnresolvedClass { span, .. } => *span,
            ResolveError::AmbiguousClass { span, .. } => *span,
            ResolveError::AssignToClass { span, .. } => *span,
            ResolveError::CyclicInheritance { span, .. } => *span,
            ResolveError::AbstractInstantiation { span, .. } => *span,
            ResolveError::WildcardSupertype { span, .. } => *span,
            ResolveError::QualifiedThisInTopLevel { span } => *span,
            ResolveError::NotAnOuterClass { span, .. } => *span,
            ResolveError::StaticScopeVariable { span, .. } => *span,
            ResolveError::SpecialCallVariable { span, .. } => *span,
            ResolveError::DuplicateAnnotation { span, .. } => *span,
            ResolveError::AnnotationMemberNotConstant { span, .. } => *span,
            ResolveError::ScriptCompilationFailed { span, .. } => *span,
            ResolveError::Other { span, .. } => *span,
        }
    }
}

// ============================================================================
// Internal invariant violations
// ============================================================================

/// Fatal internal errors. Any of these means the resolver itself is broken;
/// the pipeline stops immediately instead of producing misleading diagnostics.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BugError {
    /// Following redirects from a class entry revisited an entry.
    #[error("internal error: redirect cycle through class '{name}'")]
    RedirectCycle {
        /// The name of the entry where the cycle was detected.
        name: String,
    },

    /// A class entry was redirected to itself.
    #[error("internal error: class '{name}' redirected to itself")]
    SelfRedirect {
        /// The offending entry's name.
        name: String,
    },

    /// A resolved generics placeholder was bound a second time to a
    /// different target.
    #[error("internal error: generics placeholder '{name}' rebound after resolution")]
    PlaceholderRebound {
        /// The placeholder name.
        name: String,
    },

    /// The lookup cache contradicted itself.
    #[error("internal error: inconsistent lookup cache for '{name}': {detail}")]
    InconsistentCache {
        /// The cached name.
        name: String,
        /// What went wrong.
        detail: String,
    },
}

// ============================================================================
// Error collection
// ============================================================================

/// Accumulates recoverable errors across resolution passes.
///
/// Passes keep running after recording an error so one compile surfaces as
/// many diagnostics as possible. The driver checks [`ErrorCollector::exceeds`]
/// at phase boundaries and abandons later phases once the limit is hit.
#[derive(Debug, Clone, Default)]
pub struct ErrorCollector {
    errors: Vec<ResolveError>,
}

impl ErrorCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error.
    pub fn report(&mut self, error: ResolveError) {
        self.errors.push(error);
    }

    /// Check if any errors have been recorded.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// The number of recorded errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether the recorded error count has reached the given limit.
    pub fn exceeds(&self, limit: usize) -> bool {
        self.errors.len() >= limit
    }

    /// Iterate over the recorded errors.
    pub fn iter(&self) -> impl Iterator<Item = &ResolveError> {
        self.errors.iter()
    }

    /// The recorded errors as a slice.
    pub fn as_slice(&self) -> &[ResolveError] {
        &self.errors
    }

    /// Consume the collector, returning the recorded errors.
    pub fn into_vec(self) -> Vec<ResolveError> {
        self.errors
    }
}

impl IntoIterator for ErrorCollector {
    type Item = ResolveError;
    type IntoIter = std::vec::IntoIter<ResolveError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ErrorCollector {
    type Item = &'a ResolveError;
    type IntoIter = std::slice::Iter<'a, ResolveError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_class_display() {
        let err = ResolveError::UnresolvedClass {
            name: "Foo".to_string(),
            span: Span::new(10, 5, 3),
        };
        assert_eq!(format!("{err}"), "at 10:5: unable to resolve class 'Foo'");
    }

    #[test]
    fn ambiguous_class_display() {
        let err = ResolveError::AmbiguousClass {
            name: "List".to_string(),
            first: "java.util.List".to_string(),
            second: "java.awt.List".to_string(),
            span: Span::new(1, 1, 4),
        };
        let text = format!("{err}");
        assert!(text.contains("ambiguous"));
        assert!(text.contains("java.util.List"));
        assert!(text.contains("java.awt.List"));
    }

    #[test]
    fn error_span() {
        let span = Span::new(3, 7, 2);
        let err = ResolveError::AssignToClass {
            name: "Foo".to_string(),
            span,
        };
        assert_eq!(err.span(), span);
    }

    #[test]
    fn bug_error_display() {
        let err = BugError::RedirectCycle {
            name: "A".to_string(),
        };
        assert_eq!(
            format!("{err}"),
            "internal error: redirect cycle through class 'A'"
        );
    }

    #[test]
    fn collector_tolerance() {
        let mut errors = ErrorCollector::new();
        assert!(errors.is_empty());
        assert!(!errors.exceeds(1));

        for i in 0..3 {
            errors.report(ResolveError::UnresolvedClass {
                name: format!("C{i}"),
                span: Span::point(1, 1),
            });
        }
        assert_eq!(errors.len(), 3);
        assert!(errors.exceeds(3));
        assert!(!errors.exceeds(4));
    }
}
