use std::cmp::Ordering;

use rustc_hash::FxHashSet;
use tracing::trace;

use crate::candidate::{TypeMatchCandidate, TypeMatchResult};
use crate::key::TypeKey;

/// How a query type is tested against an `Is` constraint slot.
///
/// `TypeId` carries no subtype relation, so the default is exact equality.
/// Hosts that model their own hierarchies install a custom function to
/// widen the test (e.g. "query implements the constrained trait").
#[derive(Clone, Copy, Debug, Default)]
pub enum Conformance {
	#[default]
	Exact,
	Custom(fn(query: TypeKey, constraint: TypeKey) -> bool),
}

impl Conformance {
	pub fn conforms(self, query: TypeKey, constraint: TypeKey) -> bool {
		match self {
			Conformance::Exact => query == constraint,
			Conformance::Custom(f) => query == constraint || f(query, constraint),
		}
	}
}

/// Ranked candidate set with constraint matching.
///
/// # Ranking contract
///
/// - Candidates are ordered by priority (descending), then registration
///   index (ascending). Registration indices are unique, so the order is
///   total and two builds over the same candidates agree exactly.
/// - The order is frozen at [`TypeMatcher::set_candidates`]; queries never
///   reorder and are safe to issue from multiple threads.
///
/// Enforced in: `rank_order`, `set_candidates`.
/// Tested by: `ranking_prefers_priority_then_registration`,
/// `shuffled_input_order_is_irrelevant`.
/// Failure symptom: handler order flips between runs or between equal
/// queries.
#[derive(Clone, Debug, Default)]
pub struct TypeMatcher {
	candidates: Vec<TypeMatchCandidate>,
	conformance: Conformance,
}

fn rank_order(a: &TypeMatchCandidate, b: &TypeMatchCandidate) -> Ordering {
	b.priority.cmp(&a.priority).then(a.registration.cmp(&b.registration))
}

impl TypeMatcher {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_conformance(conformance: Conformance) -> Self {
		Self {
			candidates: Vec::new(),
			conformance,
		}
	}

	pub fn conformance(&self) -> Conformance {
		self.conformance
	}

	/// Replaces the candidate set and sorts it once into ranked order.
	pub fn set_candidates(&mut self, mut candidates: Vec<TypeMatchCandidate>) {
		candidates.sort_by(rank_order);
		trace!(count = candidates.len(), "type matcher candidates set");
		self.candidates = candidates;
	}

	/// Candidates in ranked order.
	pub fn candidates(&self) -> &[TypeMatchCandidate] {
		&self.candidates
	}

	pub fn len(&self) -> usize {
		self.candidates.len()
	}

	pub fn is_empty(&self) -> bool {
		self.candidates.is_empty()
	}

	/// All candidates accepting `query`, in ranked order. An empty result is
	/// an answer, not an error.
	pub fn matches(&self, query: &[TypeKey]) -> Vec<TypeMatchResult> {
		self.candidates
			.iter()
			.filter(|c| c.accepts(query, self.conformance))
			.map(TypeMatchResult::of)
			.collect()
	}

	/// Concatenates per-vector result lists in the order given and drops
	/// duplicates by matched type, keeping the first-seen position. The
	/// caller's list order is the significance order; ranking metadata on a
	/// later duplicate never resurfaces it.
	pub fn merge<I>(lists: I) -> Vec<TypeMatchResult>
	where
		I: IntoIterator,
		I::Item: IntoIterator<Item = TypeMatchResult>,
	{
		let mut seen: FxHashSet<TypeKey> = FxHashSet::default();
		let mut out = Vec::new();
		for list in lists {
			for result in list {
				if seen.insert(result.matched) {
					out.push(result);
				}
			}
		}
		out
	}
}
