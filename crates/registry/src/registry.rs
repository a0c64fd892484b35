use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use arc_swap::ArcSwapOption;
use loupe_matcher::{Conformance, OrderPriority, TypeKey, TypeMatchCandidate, TypeMatcher};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use smallvec::{SmallVec, smallvec};
use tracing::{debug, warn};

use crate::def::HandlerDef;
use crate::error::RegistryError;
use crate::kind::HandlerKind;
use crate::subject::Subject;

/// Widest query vector the registry will build or accept: `[attribute,
/// value]`. Definitions with wider signatures can never match and are
/// rejected (explicit `add`) or skipped with a warning (bulk collection).
pub const MAX_QUERY_ARITY: usize = 2;

/// One query vector. Arity is at most [`MAX_QUERY_ARITY`] for vectors the
/// registry builds itself; caller-supplied extras may be anything.
pub type QueryVec = SmallVec<[TypeKey; 2]>;

/// Dense handle for a definition inside one registry build. Doubles as the
/// pool index for resolver pooling downstream.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct HandlerId(u32);

impl HandlerId {
	pub fn index(self) -> usize {
		self.0 as usize
	}
}

/// A definition that matched, filtered, and accepted a subject.
pub struct Resolved<K: HandlerKind> {
	pub def: &'static HandlerDef<K>,
	pub id: HandlerId,
}

impl<K: HandlerKind> Clone for Resolved<K> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<K: HandlerKind> Copy for Resolved<K> {}

impl<K: HandlerKind> std::fmt::Debug for Resolved<K> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Resolved").field("id", &self.id).field("def", &self.def.id).finish()
	}
}

type PriorityFallback<K> = Box<dyn Fn(&HandlerDef<K>) -> Option<OrderPriority> + Send + Sync>;

struct RegistryState<K: HandlerKind> {
	defs: Vec<&'static HandlerDef<K>>,
	fallbacks: Vec<PriorityFallback<K>>,
}

struct Built<K: HandlerKind> {
	matcher: TypeMatcher,
	by_type: FxHashMap<TypeKey, u32>,
	defs: Vec<&'static HandlerDef<K>>,
}

impl<K: HandlerKind> Built<K> {
	fn build(state: &RegistryState<K>, conformance: Conformance) -> Self {
		let mut candidates = Vec::with_capacity(state.defs.len());
		let mut by_type = FxHashMap::default();
		for (index, def) in state.defs.iter().enumerate() {
			let priority = def
				.priority
				.or_else(|| state.fallbacks.iter().find_map(|fallback| fallback(def)))
				.unwrap_or_default();
			candidates.push(TypeMatchCandidate::new(def.type_key(), priority, index as u32, def.constraints.resolve()));
			by_type.insert(def.type_key(), index as u32);
		}
		let mut matcher = TypeMatcher::with_conformance(conformance);
		matcher.set_candidates(candidates);
		debug!(kind = K::LABEL, defs = state.defs.len(), "handler registry built");
		Self {
			matcher,
			by_type,
			defs: state.defs.clone(),
		}
	}
}

/// Priority-ranked handler registry for one capability family.
///
/// An owned value: hosts hold as many independent registries as they need,
/// and tests build throwaway ones. Registration and fallback changes
/// invalidate the built snapshot; the next query rebuilds it once, behind a
/// lock, with a double check so concurrent first queries cannot build
/// twice.
///
/// # Determinism contract
///
/// - Registration rank is insertion order. Bulk batches are canonicalized
///   by id first, so link/scan order never leaks into results.
/// - Queries against the same registrations always agree, across threads
///   and across rebuilds.
///
/// Enforced in: `extend_canonical`, `Built::build`.
/// Tested by: `collect_order_does_not_change_results`,
/// `concurrent_first_queries_build_once`.
pub struct HandlerRegistry<K: HandlerKind> {
	inner: Mutex<RegistryState<K>>,
	built: ArcSwapOption<Built<K>>,
	conformance: Conformance,
	build_count: AtomicU32,
}

impl<K: HandlerKind> Default for HandlerRegistry<K> {
	fn default() -> Self {
		Self::new()
	}
}

impl<K: HandlerKind> HandlerRegistry<K> {
	pub fn new() -> Self {
		Self::with_conformance(Conformance::default())
	}

	pub fn with_conformance(conformance: Conformance) -> Self {
		Self {
			inner: Mutex::new(RegistryState {
				defs: Vec::new(),
				fallbacks: Vec::new(),
			}),
			built: ArcSwapOption::const_empty(),
			conformance,
			build_count: AtomicU32::new(0),
		}
	}

	fn validate(defs: &[&'static HandlerDef<K>], def: &'static HandlerDef<K>) -> Result<(), RegistryError> {
		if let Some(sig) = def.constraints.resolve()
			&& sig.arity() > MAX_QUERY_ARITY
		{
			return Err(RegistryError::ArityTooWide {
				id: def.id,
				arity: sig.arity(),
			});
		}
		for existing in defs {
			if existing.id == def.id {
				return Err(RegistryError::DuplicateId { id: def.id });
			}
			if existing.type_key() == def.type_key() {
				return Err(RegistryError::DuplicateType {
					id: def.id,
					type_name: def.type_key().name(),
				});
			}
		}
		Ok(())
	}

	/// Registers one definition. The registration rank is the call order.
	pub fn add(&self, def: &'static HandlerDef<K>) -> Result<(), RegistryError> {
		let mut state = self.inner.lock();
		Self::validate(&state.defs, def)?;
		state.defs.push(def);
		self.built.store(None);
		Ok(())
	}

	/// Registers a batch in canonical (id-sorted) order. Malformed or
	/// duplicate definitions are skipped with a warning; a bulk load must
	/// not abort the rest of the batch.
	pub fn extend_canonical<I>(&self, defs: I)
	where
		I: IntoIterator<Item = &'static HandlerDef<K>>,
	{
		let mut batch: Vec<_> = defs.into_iter().collect();
		batch.sort_by_key(|def| def.id);
		let mut state = self.inner.lock();
		for def in batch {
			match Self::validate(&state.defs, def) {
				Ok(()) => state.defs.push(def),
				Err(err) => warn!(kind = K::LABEL, id = def.id, %err, "skipping handler definition"),
			}
		}
		self.built.store(None);
	}

	/// Appends a priority fallback consulted, in append order, for
	/// definitions without an explicit priority. Invalidates the built
	/// snapshot so re-ranking takes effect on the next query.
	pub fn add_fallback_priority<F>(&self, fallback: F)
	where
		F: Fn(&HandlerDef<K>) -> Option<OrderPriority> + Send + Sync + 'static,
	{
		let mut state = self.inner.lock();
		state.fallbacks.push(Box::new(fallback));
		self.built.store(None);
	}

	pub fn len(&self) -> usize {
		self.inner.lock().defs.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// How many times the snapshot has been (re)built.
	pub fn build_count(&self) -> u32 {
		self.build_count.load(Ordering::Relaxed)
	}

	fn snapshot(&self) -> Arc<Built<K>> {
		if let Some(built) = self.built.load_full() {
			return built;
		}
		let state = self.inner.lock();
		// Another thread may have built while we waited on the lock.
		if let Some(built) = self.built.load_full() {
			return built;
		}
		let built = Arc::new(Built::build(&state, self.conformance));
		self.build_count.fetch_add(1, Ordering::Relaxed);
		self.built.store(Some(Arc::clone(&built)));
		built
	}

	pub fn get(&self, id: HandlerId) -> Option<&'static HandlerDef<K>> {
		self.snapshot().defs.get(id.index()).copied()
	}

	/// The query vectors for `subject`, in significance order: empty, value
	/// type, then per attribute `[A]` and `[A, value]`, followed by any
	/// caller extras.
	fn query_vectors(subject: &dyn Subject, extra: &[QueryVec]) -> SmallVec<[QueryVec; 8]> {
		let value = subject.value_type();
		let mut vectors: SmallVec<[QueryVec; 8]> = smallvec![QueryVec::new()];
		if let Some(value) = value {
			vectors.push(smallvec![value]);
		}
		for &attr in subject.attribute_types() {
			vectors.push(smallvec![attr]);
			if let Some(value) = value {
				vectors.push(smallvec![attr, value]);
			}
		}
		vectors.extend(extra.iter().cloned());
		vectors
	}

	fn select<F>(&self, subject: &dyn Subject, extra: &[QueryVec], filter: F, first_only: bool) -> Vec<Resolved<K>>
	where
		F: Fn(&HandlerDef<K>) -> bool,
	{
		let built = self.snapshot();
		let vectors = Self::query_vectors(subject, extra);
		let merged = TypeMatcher::merge(vectors.iter().map(|query| built.matcher.matches(query)));

		let mut out = Vec::new();
		for result in merged {
			let Some(&index) = built.by_type.get(&result.matched) else {
				continue;
			};
			let def = built.defs[index as usize];
			if !filter(def) {
				continue;
			}
			if !(def.can_handle)(subject) {
				continue;
			}
			out.push(Resolved {
				def,
				id: HandlerId(index),
			});
			if first_only {
				break;
			}
		}
		out
	}

	/// First definition that matches, passes `filter`, and accepts the
	/// subject. `None` means the capability is absent for this subject.
	pub fn first_matching(&self, subject: &dyn Subject) -> Option<Resolved<K>> {
		self.first_matching_where(subject, |_| true)
	}

	pub fn first_matching_where<F>(&self, subject: &dyn Subject, filter: F) -> Option<Resolved<K>>
	where
		F: Fn(&HandlerDef<K>) -> bool,
	{
		self.select(subject, &[], filter, true).into_iter().next()
	}

	pub fn first_matching_with<F>(&self, subject: &dyn Subject, extra: &[QueryVec], filter: F) -> Option<Resolved<K>>
	where
		F: Fn(&HandlerDef<K>) -> bool,
	{
		self.select(subject, extra, filter, true).into_iter().next()
	}

	/// Every accepting definition, in merged significance order.
	pub fn all_matching(&self, subject: &dyn Subject) -> Vec<Resolved<K>> {
		self.all_matching_where(subject, |_| true)
	}

	pub fn all_matching_where<F>(&self, subject: &dyn Subject, filter: F) -> Vec<Resolved<K>>
	where
		F: Fn(&HandlerDef<K>) -> bool,
	{
		self.select(subject, &[], filter, false)
	}

	pub fn all_matching_with<F>(&self, subject: &dyn Subject, extra: &[QueryVec], filter: F) -> Vec<Resolved<K>>
	where
		F: Fn(&HandlerDef<K>) -> bool,
	{
		self.select(subject, extra, filter, false)
	}
}
