//! Value plumbing: pulls, change detection, and host write-through.

use std::cell::Cell;
use std::rc::Rc;

use super::fixtures::{builtin_registries, record_events, value_changes};
use crate::{BackendMode, Definition, ElementTree};

#[test]
fn updates_pull_the_host_value_and_emit_on_change() {
	let source = Rc::new(Cell::new(10_i32));
	let reader = Rc::clone(&source);
	let mut tree = ElementTree::new(
		builtin_registries(),
		BackendMode::Immediate,
		Definition::value_with("fuel", move || reader.get()),
	);
	let root = tree.root();
	let events = record_events(&mut tree);

	tree.update(root, false).unwrap();
	let state = tree.value(root).unwrap();
	assert_eq!(state.revision(), 1, "the first pull always counts as a change");
	assert_eq!(state.current().unwrap().downcast_ref::<i32>(), Some(&10));
	assert_eq!(value_changes(&events, root), 1);

	tree.update(root, false).unwrap();
	assert_eq!(tree.value(root).unwrap().revision(), 1, "an unchanged host must not bump the revision");
	assert_eq!(value_changes(&events, root), 1);

	source.set(11);
	tree.update(root, false).unwrap();
	let state = tree.value(root).unwrap();
	assert_eq!(state.revision(), 2);
	assert_eq!(state.current().unwrap().downcast_ref::<i32>(), Some(&11));
	assert_eq!(value_changes(&events, root), 2);
}

#[test]
fn set_value_writes_through_and_pulls_immediately() {
	let store = Rc::new(Cell::new(5_i32));
	let reader = Rc::clone(&store);
	let writer = Rc::clone(&store);
	let mut tree = ElementTree::new(
		builtin_registries(),
		BackendMode::Immediate,
		Definition::value_read_write("gain", move || reader.get(), move |value| writer.set(value)),
	);
	let root = tree.root();
	let events = record_events(&mut tree);
	tree.update(root, false).unwrap();

	assert!(tree.set_value(root, &9_i32).unwrap());
	assert_eq!(store.get(), 9, "the write must reach the host");
	let state = tree.value(root).unwrap();
	assert_eq!(state.revision(), 2, "a successful store pulls right away");
	assert_eq!(state.current().unwrap().downcast_ref::<i32>(), Some(&9));
	assert_eq!(value_changes(&events, root), 2);

	assert!(!tree.set_value(root, &"wrong type").unwrap(), "mismatched payloads are rejected");
	assert_eq!(tree.value(root).unwrap().revision(), 2);
}

#[test]
fn read_only_values_and_groups_reject_writes() {
	let mut readonly = ElementTree::new(
		builtin_registries(),
		BackendMode::Immediate,
		Definition::value_with("lock", || 3_i32),
	);
	let root = readonly.root();
	readonly.update(root, false).unwrap();
	assert!(!readonly.set_value(root, &4_i32).unwrap());
	assert_eq!(readonly.value(root).unwrap().revision(), 1);

	let mut grouped = ElementTree::new(builtin_registries(), BackendMode::Immediate, Definition::group("folder"));
	let root = grouped.root();
	grouped.update(root, false).unwrap();
	assert!(!grouped.set_value(root, &4_i32).unwrap(), "groups carry no value operation");
	assert_eq!(grouped.value(root).unwrap().revision(), 0);
}

#[test]
fn accessorless_value_elements_never_change() {
	let mut tree = ElementTree::new(
		builtin_registries(),
		BackendMode::Immediate,
		Definition::value::<u8>("raw_slot"),
	);
	let root = tree.root();
	let events = record_events(&mut tree);
	tree.update(root, false).unwrap();

	let state = tree.value(root).unwrap();
	assert_eq!(state.revision(), 0);
	assert!(state.current().is_none());
	assert_eq!(value_changes(&events, root), 0);
	assert!(!tree.set_value(root, &1_u8).unwrap());
}

#[test]
fn draws_pick_up_host_changes_between_passes() {
	let source = Rc::new(Cell::new(1_u32));
	let reader = Rc::clone(&source);
	let mut tree = ElementTree::new(
		builtin_registries(),
		BackendMode::Immediate,
		Definition::value_with("frame", move || reader.get()),
	);
	let root = tree.root();
	let events = record_events(&mut tree);
	let mut surface = ();

	tree.draw(root, &mut surface).unwrap();
	assert_eq!(tree.value(root).unwrap().revision(), 1);

	source.set(2);
	tree.draw(root, &mut surface).unwrap();
	assert_eq!(tree.value(root).unwrap().revision(), 2);
	assert_eq!(value_changes(&events, root), 2);
}
