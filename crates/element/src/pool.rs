use std::marker::PhantomData;

use loupe_registry::{HandlerId, HandlerKind, Resolved};
use slab::Slab;
use tracing::trace;

/// Hooks on every pooled instance.
///
/// An instance is bound to at most one element at a time; `on_release` runs
/// between bindings and must clear every cached field, because the next
/// element sees the same allocation.
pub trait PoolItem {
	/// The instance was rented and is about to bind to an element.
	fn on_rent(&mut self) {}

	/// The instance returned to the pool. Reset all binding state here.
	fn on_release(&mut self);
}

/// Handle to one rented pool slot.
///
/// Carries the slot's generation at rent time; the pool bumps the
/// generation on release, so a ticket that outlives its rental is detected
/// instead of silently aliasing the next renter.
pub struct PoolTicket<K: HandlerKind> {
	handler: HandlerId,
	slot: usize,
	generation: u32,
	_kind: PhantomData<fn() -> K>,
}

impl<K: HandlerKind> PoolTicket<K> {
	/// Which definition the rented instance was constructed from.
	pub fn handler(&self) -> HandlerId {
		self.handler
	}
}

impl<K: HandlerKind> Clone for PoolTicket<K> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<K: HandlerKind> Copy for PoolTicket<K> {}

impl<K: HandlerKind> PartialEq for PoolTicket<K> {
	fn eq(&self, other: &Self) -> bool {
		self.handler == other.handler && self.slot == other.slot && self.generation == other.generation
	}
}

impl<K: HandlerKind> Eq for PoolTicket<K> {}

impl<K: HandlerKind> std::fmt::Debug for PoolTicket<K> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PoolTicket")
			.field("kind", &K::LABEL)
			.field("handler", &self.handler)
			.field("slot", &self.slot)
			.field("generation", &self.generation)
			.finish()
	}
}

/// Lifetime counters for one pool, mostly for tests and diagnostics.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct PoolStats {
	/// Instances constructed because no idle one was available.
	pub created: u64,
	pub rented: u64,
	pub released: u64,
}

impl PoolStats {
	pub fn outstanding(&self) -> u64 {
		self.rented - self.released
	}
}

enum SlotState<K: HandlerKind> {
	/// Parked between bindings, already reset.
	Idle(Box<K::Instance>),
	/// Bound to one element.
	Bound(Box<K::Instance>),
	/// Temporarily taken by the driver; see [`ResolverPool::checkout`].
	CheckedOut,
}

struct PoolSlot<K: HandlerKind> {
	generation: u32,
	state: SlotState<K>,
}

struct Shelf<K: HandlerKind> {
	slots: Slab<PoolSlot<K>>,
	idle: Vec<usize>,
}

impl<K: HandlerKind> Shelf<K> {
	fn empty() -> Self {
		Self {
			slots: Slab::new(),
			idle: Vec::new(),
		}
	}
}

/// Instance pool for one handler kind, shelved by dense [`HandlerId`].
///
/// Misuse (stale tickets, double release, checkout collisions) is a
/// programming error in the driver and panics; the lifecycle depends on
/// every rental being released exactly once.
pub struct ResolverPool<K: HandlerKind> {
	shelves: Vec<Shelf<K>>,
	stats: PoolStats,
}

impl<K: HandlerKind> Default for ResolverPool<K> {
	fn default() -> Self {
		Self {
			shelves: Vec::new(),
			stats: PoolStats::default(),
		}
	}
}

impl<K: HandlerKind> ResolverPool<K>
where
	K::Instance: PoolItem,
{
	pub fn new() -> Self {
		Self::default()
	}

	/// Rents an instance of the resolved definition, reusing an idle slot
	/// when one exists and constructing otherwise.
	pub fn rent(&mut self, resolved: Resolved<K>) -> PoolTicket<K> {
		let shelf_index = resolved.id.index();
		if self.shelves.len() <= shelf_index {
			self.shelves.resize_with(shelf_index + 1, Shelf::empty);
		}
		let shelf = &mut self.shelves[shelf_index];

		let slot = match shelf.idle.pop() {
			Some(slot) => {
				match std::mem::replace(&mut shelf.slots[slot].state, SlotState::CheckedOut) {
					SlotState::Idle(mut item) => {
						item.on_rent();
						shelf.slots[slot].state = SlotState::Bound(item);
					}
					_ => unreachable!("idle list out of sync with slot states"),
				}
				slot
			}
			None => {
				let mut item = (resolved.def.construct)();
				item.on_rent();
				self.stats.created += 1;
				trace!(kind = K::LABEL, id = resolved.def.id, "constructed pooled instance");
				shelf.slots.insert(PoolSlot {
					generation: 0,
					state: SlotState::Bound(item),
				})
			}
		};

		self.stats.rented += 1;
		PoolTicket {
			handler: resolved.id,
			slot,
			generation: self.shelves[shelf_index].slots[slot].generation,
			_kind: PhantomData,
		}
	}

	/// Returns a rental to the pool. Runs `on_release`, bumps the slot
	/// generation, and parks the instance for the next rent.
	pub fn release(&mut self, ticket: PoolTicket<K>) {
		let slot = Self::slot_mut(&mut self.shelves, &ticket);
		match std::mem::replace(&mut slot.state, SlotState::CheckedOut) {
			SlotState::Bound(mut item) => {
				item.on_release();
				slot.generation += 1;
				slot.state = SlotState::Idle(item);
			}
			SlotState::CheckedOut => {
				panic!("{} pool: slot {} released while checked out", K::LABEL, ticket.slot)
			}
			SlotState::Idle(_) => panic!("{} pool: slot {} released twice", K::LABEL, ticket.slot),
		}
		self.shelves[ticket.handler.index()].idle.push(ticket.slot);
		self.stats.released += 1;
	}

	/// Takes the bound instance out of its slot so the driver can hold it
	/// `&mut` while also passing the tree around. The slot stays reserved;
	/// [`ResolverPool::restore`] puts the instance back.
	pub fn checkout(&mut self, ticket: &PoolTicket<K>) -> Box<K::Instance> {
		let slot = Self::slot_mut(&mut self.shelves, ticket);
		match std::mem::replace(&mut slot.state, SlotState::CheckedOut) {
			SlotState::Bound(item) => item,
			SlotState::CheckedOut => {
				panic!("{} pool: slot {} checked out twice", K::LABEL, ticket.slot)
			}
			SlotState::Idle(_) => panic!("{} pool: slot {} checked out after release", K::LABEL, ticket.slot),
		}
	}

	pub fn restore(&mut self, ticket: &PoolTicket<K>, item: Box<K::Instance>) {
		let slot = Self::slot_mut(&mut self.shelves, ticket);
		match slot.state {
			SlotState::CheckedOut => slot.state = SlotState::Bound(item),
			_ => panic!("{} pool: slot {} restored without checkout", K::LABEL, ticket.slot),
		}
	}

	pub fn stats(&self) -> PoolStats {
		self.stats
	}

	fn slot_mut<'a>(shelves: &'a mut [Shelf<K>], ticket: &PoolTicket<K>) -> &'a mut PoolSlot<K> {
		let slot = shelves
			.get_mut(ticket.handler.index())
			.and_then(|shelf| shelf.slots.get_mut(ticket.slot));
		let Some(slot) = slot else {
			panic!("{} pool: ticket for unknown slot {}", K::LABEL, ticket.slot);
		};
		if slot.generation != ticket.generation {
			panic!(
				"{} pool: stale ticket for slot {} (generation {}, ticket {}): double release?",
				K::LABEL,
				ticket.slot,
				slot.generation,
				ticket.generation
			);
		}
		slot
	}
}
