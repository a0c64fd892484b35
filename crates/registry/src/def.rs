use std::fmt;

use loupe_matcher::{ConstraintSig, OrderPriority, TypeKey};

use crate::kind::HandlerKind;
use crate::subject::Subject;

/// Constraint declaration on a [`HandlerDef`].
///
/// Signatures are produced through a function because `TypeId` cannot be
/// computed in a const context; the registry invokes it once per build.
#[derive(Clone, Copy, Debug)]
pub enum ConstraintsDecl {
	/// Matches every query vector.
	Wildcard,
	Signature(fn() -> ConstraintSig),
}

impl ConstraintsDecl {
	pub fn resolve(&self) -> Option<ConstraintSig> {
		match self {
			ConstraintsDecl::Wildcard => None,
			ConstraintsDecl::Signature(f) => Some(f()),
		}
	}
}

/// Statically registerable handler definition.
///
/// Everything here is a function pointer or plain data so definitions can
/// live in `static`s and be gathered by `inventory`. The capability check
/// is deliberately stateless: no handler instance exists when it runs.
pub struct HandlerDef<K: HandlerKind> {
	/// Canonical id, unique within one registry. Bulk-collected definitions
	/// are ordered by it, so it doubles as the deterministic tie-break for
	/// link-order shuffles.
	pub id: &'static str,
	/// Key of the concrete handler type. One definition per handler type
	/// per registry; merged match results deduplicate on it.
	pub handler_type: fn() -> TypeKey,
	/// Explicit priority. `None` defers to the registry's fallbacks, then
	/// to [`OrderPriority::DEFAULT`].
	pub priority: Option<OrderPriority>,
	pub constraints: ConstraintsDecl,
	/// Stateless capability check, consulted after constraint matching.
	pub can_handle: fn(&dyn Subject) -> bool,
	pub construct: fn() -> Box<K::Instance>,
}

impl<K: HandlerKind> HandlerDef<K> {
	pub fn type_key(&self) -> TypeKey {
		(self.handler_type)()
	}
}

impl<K: HandlerKind> fmt::Debug for HandlerDef<K> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HandlerDef")
			.field("kind", &K::LABEL)
			.field("id", &self.id)
			.field("handler_type", &self.type_key())
			.field("priority", &self.priority)
			.finish_non_exhaustive()
	}
}
