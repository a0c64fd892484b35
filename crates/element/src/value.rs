use std::any::Any;
use std::rc::Rc;

use crate::definition::Definition;

/// Last value seen for an element, plus a revision counter bumped on every
/// observed change. The first pull always counts as a change.
#[derive(Default, Debug)]
pub struct ValueState {
	current: Option<Rc<dyn Any>>,
	revision: u64,
}

impl ValueState {
	pub fn current(&self) -> Option<&Rc<dyn Any>> {
		self.current.as_ref()
	}

	pub fn revision(&self) -> u64 {
		self.revision
	}

	pub(crate) fn record(&mut self, value: Rc<dyn Any>, changed: bool) {
		self.current = Some(value);
		if changed {
			self.revision += 1;
		}
	}
}

/// Moves values between an element and its host data. Implementations are
/// pooled, so any internal cache must be cleared on release.
pub trait ValueOperation {
	/// Reads the host value into `state`. Returns whether the value changed
	/// since the last pull.
	fn pull(&mut self, definition: &Definition, state: &mut ValueState) -> bool;

	/// Writes `value` through to the host. Default goes via the definition
	/// accessor; `false` means the write was rejected.
	fn store(&mut self, definition: &Definition, value: &dyn Any) -> bool {
		match definition.accessor() {
			Some(accessor) => accessor.set(value),
			None => false,
		}
	}
}

/// Accessor-backed operation used whenever no handler overrides value
/// handling for the element's value type.
#[derive(Default)]
pub struct GenericValueOperation;

impl ValueOperation for GenericValueOperation {
	fn pull(&mut self, definition: &Definition, state: &mut ValueState) -> bool {
		let Some(accessor) = definition.accessor() else {
			return false;
		};
		let fresh = accessor.get();
		let changed = match state.current() {
			Some(prev) => !accessor.values_equal(prev.as_ref(), fresh.as_ref()),
			None => true,
		};
		state.record(fresh, changed);
		changed
	}
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;
	use std::rc::Rc;

	use super::*;

	#[test]
	fn pull_reports_changes_and_bumps_revision() {
		let source = Rc::new(Cell::new(1_i32));
		let reader = Rc::clone(&source);
		let def = Definition::value_with("count", move || reader.get());
		let mut op = GenericValueOperation;
		let mut state = ValueState::default();

		assert!(op.pull(&def, &mut state), "first pull counts as a change");
		assert_eq!(state.revision(), 1);
		assert!(!op.pull(&def, &mut state));
		assert_eq!(state.revision(), 1);

		source.set(2);
		assert!(op.pull(&def, &mut state));
		assert_eq!(state.revision(), 2);
	}

	#[test]
	fn store_rejects_read_only_accessors() {
		let def = Definition::value_with("count", || 7_i32);
		let mut op = GenericValueOperation;
		assert!(!op.store(&def, &9_i32));
	}

	#[test]
	fn store_writes_through_read_write_accessors() {
		let sink = Rc::new(Cell::new(0_i32));
		let writer = Rc::clone(&sink);
		let def = Definition::value_read_write("count", || 0_i32, move |v| writer.set(v));
		let mut op = GenericValueOperation;

		assert!(op.store(&def, &42_i32));
		assert_eq!(sink.get(), 42);
		assert!(!op.store(&def, &"wrong type"), "mismatched payloads are rejected");
	}
}
