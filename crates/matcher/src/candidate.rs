use smallvec::SmallVec;

use crate::key::TypeKey;
use crate::matcher::Conformance;
use crate::priority::OrderPriority;

/// One position of a constraint signature.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ConstraintSlot {
	/// Open slot: any query type is accepted at this position.
	Any,
	/// The query type at this position must conform to the given key.
	Is(TypeKey),
}

/// Positional constraint signature. A signature of arity N accepts only
/// query vectors of arity N, slot by slot. The zero-arity signature accepts
/// only the empty query vector; the *absence* of a signature (see
/// [`TypeMatchCandidate::constraints`]) is the wildcard that accepts
/// everything.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct ConstraintSig {
	slots: SmallVec<[ConstraintSlot; 2]>,
}

impl ConstraintSig {
	pub fn new(slots: impl IntoIterator<Item = ConstraintSlot>) -> Self {
		Self {
			slots: slots.into_iter().collect(),
		}
	}

	/// Arity-0 signature: matches the empty query vector only.
	pub fn empty() -> Self {
		Self::default()
	}

	/// `[Is(T)]`: matches single-type queries conforming to `T`.
	pub fn is<T: ?Sized + 'static>() -> Self {
		Self::new([ConstraintSlot::Is(TypeKey::of::<T>())])
	}

	/// `[Is(A), Is(B)]`: matches two-type queries, slot-wise.
	pub fn pair<A: ?Sized + 'static, B: ?Sized + 'static>() -> Self {
		Self::new([ConstraintSlot::Is(TypeKey::of::<A>()), ConstraintSlot::Is(TypeKey::of::<B>())])
	}

	/// `[Is(A), Any]`: first slot pinned, second open.
	pub fn with_any<A: ?Sized + 'static>() -> Self {
		Self::new([ConstraintSlot::Is(TypeKey::of::<A>()), ConstraintSlot::Any])
	}

	pub fn push(&mut self, slot: ConstraintSlot) {
		self.slots.push(slot);
	}

	pub fn arity(&self) -> usize {
		self.slots.len()
	}

	pub fn slots(&self) -> &[ConstraintSlot] {
		&self.slots
	}

	pub fn accepts(&self, query: &[TypeKey], conformance: Conformance) -> bool {
		if self.slots.len() != query.len() {
			return false;
		}
		self.slots.iter().zip(query).all(|(slot, &q)| match slot {
			ConstraintSlot::Any => true,
			ConstraintSlot::Is(key) => conformance.conforms(q, *key),
		})
	}
}

/// A handler type offered to the matcher, with everything ranking needs.
#[derive(Clone, Debug)]
pub struct TypeMatchCandidate {
	/// The handler type this candidate stands for; match results carry it
	/// and merged result sets are deduplicated by it.
	pub matched: TypeKey,
	pub priority: OrderPriority,
	/// Stable insertion index from the registry build. Unique per candidate
	/// set; breaks priority ties deterministically.
	pub registration: u32,
	/// `None` is the wildcard: the candidate matches every query vector.
	pub constraints: Option<ConstraintSig>,
}

impl TypeMatchCandidate {
	pub fn new(matched: TypeKey, priority: OrderPriority, registration: u32, constraints: Option<ConstraintSig>) -> Self {
		Self {
			matched,
			priority,
			registration,
			constraints,
		}
	}

	pub fn accepts(&self, query: &[TypeKey], conformance: Conformance) -> bool {
		match &self.constraints {
			None => true,
			Some(sig) => sig.accepts(query, conformance),
		}
	}
}

/// One matched candidate, in ranked order.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TypeMatchResult {
	pub matched: TypeKey,
	pub priority: OrderPriority,
	pub registration: u32,
}

impl TypeMatchResult {
	pub(crate) fn of(candidate: &TypeMatchCandidate) -> Self {
		Self {
			matched: candidate.matched,
			priority: candidate.priority,
			registration: candidate.registration,
		}
	}
}
