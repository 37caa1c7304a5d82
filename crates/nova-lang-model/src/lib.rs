//! An in-memory model of Java's static type system.
//!
//! The crate has three layers:
//!
//! - [`model`]: an arena of type and element nodes populated through write-once setters, with
//!   optional deferred slots that a backend completes on first use.
//! - [`delegate`]: read-only wrappers that resolve deferred slots under the process-wide
//!   [`guard`] and compare through an [`Equality`] policy.
//! - [`Visitors`]: the type relations (erasure, supertypes, containment, same-type, subtyping,
//!   assignability, capture, member types, closures) computed over a [`TypeAndElementSource`].
//!
//! [`MemorySource`] is a self-contained source; [`MemorySource::with_minimal_jdk`] preloads
//! the `java.lang` declarations most relations need.

mod error;
mod visitors;

pub mod config;
pub mod delegate;
pub mod equality;
pub mod guard;
pub mod kind;
pub mod memory;
pub mod model;
pub mod source;

pub use config::{ClosureOrder, VisitorsConfig};
pub use delegate::{Delegates, DelegatingElement, DelegatingType};
pub use equality::Equality;
pub use error::{LangError, Result};
pub use kind::{ElementKind, Modifier, NestingKind, TypeKind};
pub use memory::MemorySource;
pub use model::{ElementId, Model, TypeId};
pub use source::TypeAndElementSource;
pub use visitors::{Adaptation, Visitors};
