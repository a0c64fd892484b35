//! Chain assembly and dispatch: rank order, overriding, the skip flag,
//! and how constrained handlers slot in behind wildcard ones.

use std::cell::RefCell;

use super::fixtures::{NameDrawer, TestCanvas, accept_all, builtin_registries, drawer_def, processor_def};
use crate::{
	BackendMode, ConstraintSig, ConstraintsDecl, Definition, DrawPass, Drawer, DrawerChain, ElementError, ElementTree,
	EmptySubject, OrderPriority, PostChain, PostProcessor, ProcessPass,
};

thread_local! {
	static POST_LOG: RefCell<Vec<&'static str>> = RefCell::new(Vec::new());
}

macro_rules! tag_drawer {
	($ty:ident, $tag:literal) => {
		#[derive(Default)]
		struct $ty;

		impl Drawer for $ty {
			fn draw(&mut self, pass: &mut DrawPass<'_, '_>, chain: &mut DrawerChain) -> Result<(), ElementError> {
				if let Some(canvas) = pass.surface_as::<TestCanvas>() {
					canvas.log($tag);
				}
				chain.call_next(pass)
			}
		}
	};
}

tag_drawer!(HighDrawer, "high");
tag_drawer!(TieA, "tie-a");
tag_drawer!(TieB, "tie-b");
tag_drawer!(ValueTagged, "value");
tag_drawer!(PairTagged, "pair");

macro_rules! tag_processor {
	($ty:ident, $tag:literal) => {
		#[derive(Default)]
		struct $ty;

		impl PostProcessor for $ty {
			fn process(&mut self, _pass: &mut ProcessPass<'_>, _chain: &mut PostChain) -> Result<(), ElementError> {
				POST_LOG.with(|log| log.borrow_mut().push($tag));
				Ok(())
			}
		}
	};
}

tag_processor!(FirstProc, "first");
tag_processor!(SecondProc, "second");
tag_processor!(TailProc, "tail");

/// Paints and deliberately never forwards.
#[derive(Default)]
struct SwallowDrawer;

impl Drawer for SwallowDrawer {
	fn draw(&mut self, pass: &mut DrawPass<'_, '_>, _chain: &mut DrawerChain) -> Result<(), ElementError> {
		if let Some(canvas) = pass.surface_as::<TestCanvas>() {
			canvas.log("swallowed");
		}
		Ok(())
	}
}

/// Resolvable but excluded from live passes.
#[derive(Default)]
struct PresenceOnly;

impl Drawer for PresenceOnly {
	fn skip_when_drawing(&self) -> bool {
		true
	}

	fn draw(&mut self, pass: &mut DrawPass<'_, '_>, chain: &mut DrawerChain) -> Result<(), ElementError> {
		if let Some(canvas) = pass.surface_as::<TestCanvas>() {
			canvas.log("presence");
		}
		chain.call_next(pass)
	}
}

#[derive(Default)]
struct BoomProc;

impl PostProcessor for BoomProc {
	fn process(&mut self, pass: &mut ProcessPass<'_>, _chain: &mut PostChain) -> Result<(), ElementError> {
		POST_LOG.with(|log| log.borrow_mut().push("boom"));
		let element = pass.element();
		pass.tree_mut().destroy(element);
		Ok(())
	}
}

struct Gilded;

fn sig_value_f32() -> ConstraintSig {
	ConstraintSig::is::<f32>()
}

fn sig_pair_gilded_f32() -> ConstraintSig {
	ConstraintSig::pair::<Gilded, f32>()
}

#[test]
fn drawer_chains_rank_by_priority_then_registration() {
	let registries = builtin_registries();
	registries
		.drawers
		.add(drawer_def::<TieA>(
			"test.drawer.tie-a",
			Some(OrderPriority::VALUE),
			ConstraintsDecl::Wildcard,
			accept_all,
		))
		.unwrap();
	registries
		.drawers
		.add(drawer_def::<TieB>(
			"test.drawer.tie-b",
			Some(OrderPriority::VALUE),
			ConstraintsDecl::Wildcard,
			accept_all,
		))
		.unwrap();
	registries
		.drawers
		.add(drawer_def::<HighDrawer>(
			"test.drawer.high",
			Some(OrderPriority::SUPER),
			ConstraintsDecl::Wildcard,
			accept_all,
		))
		.unwrap();

	let mut tree = ElementTree::new(registries, BackendMode::Immediate, Definition::root());
	let root = tree.root();
	let mut canvas = TestCanvas::default();
	tree.draw(root, &mut canvas).unwrap();

	assert_eq!(
		canvas.lines,
		vec!["high", "tie-a", "tie-b"],
		"priority outranks registration; ties keep registration order"
	);
}

#[test]
fn overriding_drawer_swallows_the_chain_below_it() {
	let registries = builtin_registries();
	registries
		.drawers
		.add(drawer_def::<SwallowDrawer>(
			"test.drawer.swallow",
			Some(OrderPriority::SUPER),
			ConstraintsDecl::Wildcard,
			accept_all,
		))
		.unwrap();
	registries
		.drawers
		.add(drawer_def::<NameDrawer>(
			"test.drawer.name",
			Some(OrderPriority::VALUE),
			ConstraintsDecl::Wildcard,
			accept_all,
		))
		.unwrap();

	let mut tree = ElementTree::new(
		registries,
		BackendMode::Immediate,
		Definition::root().with_child(Definition::group("inner")),
	);
	let root = tree.root();
	let mut canvas = TestCanvas::default();
	tree.draw(root, &mut canvas).unwrap();

	assert_eq!(canvas.lines, vec!["swallowed"], "a drawer that does not forward paints alone");
	assert_eq!(
		tree.children(root).unwrap().len(),
		1,
		"swallowing the draw must not affect structure"
	);
}

#[test]
fn skip_when_drawing_excludes_but_keeps_the_handler_enumerable() {
	let registries = builtin_registries();
	registries
		.drawers
		.add(drawer_def::<PresenceOnly>(
			"test.drawer.presence",
			Some(OrderPriority::SUPER),
			ConstraintsDecl::Wildcard,
			accept_all,
		))
		.unwrap();
	registries
		.drawers
		.add(drawer_def::<NameDrawer>(
			"test.drawer.name",
			Some(OrderPriority::VALUE),
			ConstraintsDecl::Wildcard,
			accept_all,
		))
		.unwrap();

	let mut tree = ElementTree::new(registries, BackendMode::Immediate, Definition::root());
	let root = tree.root();
	let mut canvas = TestCanvas::default();
	tree.draw(root, &mut canvas).unwrap();

	assert_eq!(canvas.lines, vec!["Root"], "a skip-flagged drawer never paints");
	let ids: Vec<&str> = tree
		.registries()
		.drawers
		.all_matching(&EmptySubject)
		.iter()
		.map(|resolved| resolved.def.id)
		.collect();
	assert_eq!(
		ids,
		vec!["test.drawer.presence", "test.drawer.name", "loupe.drawer.default"],
		"the skip flag only affects chain advancement, not resolution"
	);
}

#[test]
fn value_vector_drawers_precede_attribute_vector_drawers() {
	let registries = builtin_registries();
	registries
		.drawers
		.add(drawer_def::<PairTagged>(
			"test.drawer.pair",
			None,
			ConstraintsDecl::Signature(sig_pair_gilded_f32),
			accept_all,
		))
		.unwrap();
	registries
		.drawers
		.add(drawer_def::<ValueTagged>(
			"test.drawer.value",
			None,
			ConstraintsDecl::Signature(sig_value_f32),
			accept_all,
		))
		.unwrap();
	registries
		.drawers
		.add(drawer_def::<NameDrawer>(
			"test.drawer.name",
			Some(OrderPriority::VALUE),
			ConstraintsDecl::Wildcard,
			accept_all,
		))
		.unwrap();

	let definition = Definition::value_with("mass", || 1.5_f32).with_attribute(Gilded);
	let mut tree = ElementTree::new(registries, BackendMode::Immediate, definition);
	let root = tree.root();
	let mut canvas = TestCanvas::default();
	tree.draw(root, &mut canvas).unwrap();

	// Registration order would put the pair drawer first; the query
	// vectors rank the value-constrained one ahead of it anyway.
	assert_eq!(canvas.lines, vec!["Mass", "value", "pair"]);
}

#[test]
fn post_chains_run_every_processor_in_rank_order() {
	let registries = builtin_registries();
	registries
		.post_processors
		.add(processor_def::<SecondProc>("test.post.second", None))
		.unwrap();
	registries
		.post_processors
		.add(processor_def::<FirstProc>("test.post.first", Some(OrderPriority::SUPER)))
		.unwrap();

	let mut tree = ElementTree::new(registries, BackendMode::Immediate, Definition::root());
	let root = tree.root();
	tree.update(root, false).unwrap();

	POST_LOG.with(|log| log.borrow_mut().clear());
	assert!(tree.post_process(root).unwrap());
	POST_LOG.with(|log| {
		assert_eq!(
			*log.borrow(),
			vec!["first", "second"],
			"the driver walks the whole chain even though processors do not forward"
		);
	});
	assert!(!tree.post_process(root).unwrap());
}

#[test]
fn destroying_mid_post_process_stops_the_chain() {
	let registries = builtin_registries();
	registries
		.post_processors
		.add(processor_def::<BoomProc>("test.post.boom", Some(OrderPriority::SUPER)))
		.unwrap();
	registries
		.post_processors
		.add(processor_def::<TailProc>("test.post.tail", None))
		.unwrap();

	let mut tree = ElementTree::new(registries, BackendMode::Immediate, Definition::root());
	let root = tree.root();
	tree.update(root, false).unwrap();

	POST_LOG.with(|log| log.borrow_mut().clear());
	assert!(tree.post_process(root).unwrap());
	POST_LOG.with(|log| {
		assert_eq!(*log.borrow(), vec!["boom"], "processors ranked after the destroy never run");
	});
	assert!(!tree.contains(root));
	assert!(tree.is_empty());
}
