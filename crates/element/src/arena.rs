use slab::Slab;

/// Generational element handle. Stale handles (the slot was vacated or
/// re-used) are detectable, which is what turns use-after-destroy into a
/// typed error instead of silent aliasing.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ElementId {
	pub(crate) index: usize,
	pub(crate) generation: u32,
}

impl std::fmt::Display for ElementId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "#{}v{}", self.index, self.generation)
	}
}

/// Slab arena with per-slot generation counters. Removal bumps the slot's
/// generation, so an id minted before the removal never resolves again.
pub(crate) struct Arena<T> {
	slots: Slab<T>,
	generations: Vec<u32>,
}

impl<T> Arena<T> {
	pub fn new() -> Self {
		Self {
			slots: Slab::new(),
			generations: Vec::new(),
		}
	}

	pub fn insert(&mut self, value: T) -> ElementId {
		let entry = self.slots.vacant_entry();
		let index = entry.key();
		if self.generations.len() <= index {
			self.generations.resize(index + 1, 0);
		}
		entry.insert(value);
		ElementId {
			index,
			generation: self.generations[index],
		}
	}

	fn live(&self, id: ElementId) -> bool {
		self.generations.get(id.index).is_some_and(|&generation| generation == id.generation)
	}

	pub fn get(&self, id: ElementId) -> Option<&T> {
		if self.live(id) { self.slots.get(id.index) } else { None }
	}

	pub fn get_mut(&mut self, id: ElementId) -> Option<&mut T> {
		if self.live(id) { self.slots.get_mut(id.index) } else { None }
	}

	pub fn contains(&self, id: ElementId) -> bool {
		self.live(id) && self.slots.contains(id.index)
	}

	pub fn remove(&mut self, id: ElementId) -> Option<T> {
		if !self.contains(id) {
			return None;
		}
		self.generations[id.index] += 1;
		Some(self.slots.remove(id.index))
	}

	pub fn len(&self) -> usize {
		self.slots.len()
	}
}
