//! Core types shared by every crate in the Tern resolution pipeline.
//!
//! This crate carries no pipeline logic of its own. It provides:
//!
//! - [`Span`] - source positions for diagnostics
//! - [`ClassId`], [`LoadedClassId`], [`ScopeId`] - arena handles
//! - [`ResolveError`], [`BugError`], [`ErrorCollector`] - the error model
//! - [`ClassFlags`], [`MemberFlags`] - modifier bitsets
//! - [`GenericsType`] - type parameter usages and declarations
//! - [`ConstantValue`] - literal values
//! - [`names`] - qualified-name and accessor-name helpers

mod error;
mod flags;
mod generics;
mod ids;
pub mod names;
mod span;
mod value;

pub use error::{BugError, ErrorCollector, ResolveError};
pub use flags::{ClassFlags, MemberFlags};
pub use generics::{GenericsType, WILDCARD};
pub use ids::{ClassId, LoadedClassId, ScopeId};
pub use span::Span;
pub use value::ConstantValue;
