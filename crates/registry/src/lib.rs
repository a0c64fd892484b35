//! Handler registries: who handles a subject, and in what order.
//!
//! A [`HandlerRegistry`] owns statically registerable [`HandlerDef`]s for
//! one capability family (a [`HandlerKind`]). Queries take a [`Subject`],
//! the matching-relevant view of an element, build its query vectors,
//! rank matches through `loupe-matcher`, then filter survivors through each
//! definition's stateless capability check.
//!
//! Registries are plain owned values. Definition gathering is the caller's
//! business (typically `inventory` collections fed through
//! [`HandlerRegistry::extend_canonical`]); this crate stays collection
//! mechanism agnostic.

mod def;
mod error;
mod kind;
mod registry;
mod subject;

pub use def::{ConstraintsDecl, HandlerDef};
pub use error::RegistryError;
pub use kind::HandlerKind;
pub use registry::{HandlerId, HandlerRegistry, MAX_QUERY_ARITY, QueryVec, Resolved};
pub use subject::{EmptySubject, Subject, SubjectExt};

pub use loupe_matcher::{Conformance, ConstraintSig, ConstraintSlot, OrderPriority, TypeKey};
