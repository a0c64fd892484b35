//! Retained-mode drawing: visual construction, sibling slots, and the
//! visual-processor chain.

use super::fixtures::{accept_all, builtin_registries, leaked_def};
use crate::{
	BackendMode, BasicVisual, ConstraintsDecl, Definition, ElementCx, ElementError, ElementTree, OrderPriority,
	PoolItem, ProcessPass, TypeKey, VisualBuilder, VisualBuilderResolver, VisualBuilderResolverKind, VisualChain,
	VisualHandle, VisualProcessor, VisualProcessorKind,
};

/// Appends a `*` to the visual's label on every pass it sees.
#[derive(Default)]
struct Decorator;

impl VisualProcessor for Decorator {
	fn process(
		&mut self,
		visual: &VisualHandle,
		_pass: &mut ProcessPass<'_>,
		_chain: &mut VisualChain,
	) -> Result<(), ElementError> {
		let label = visual.downcast_ref::<BasicVisual>().map(BasicVisual::label).unwrap_or_default();
		visual.node().set_label(&format!("{label}*"));
		Ok(())
	}
}

/// Declines to supply a builder for anything.
#[derive(Default)]
struct NoBuilderResolver;

impl PoolItem for NoBuilderResolver {
	fn on_release(&mut self) {}
}

impl VisualBuilderResolver for NoBuilderResolver {
	fn builder(&mut self, _cx: &ElementCx<'_>) -> Option<&mut (dyn VisualBuilder + 'static)> {
		None
	}
}

fn child_labels(handle: &VisualHandle) -> Vec<String> {
	handle
		.downcast_ref::<BasicVisual>()
		.map(|basic| {
			basic
				.children()
				.iter()
				.map(|child| child.downcast_ref::<BasicVisual>().map(BasicVisual::label).unwrap_or_default())
				.collect()
		})
		.unwrap_or_default()
}

#[test]
fn retained_draws_build_one_visual_per_element() {
	let mut tree = ElementTree::new(
		builtin_registries(),
		BackendMode::Retained,
		Definition::root()
			.with_child(Definition::group("status_bar"))
			.with_child(Definition::group("sidebar")),
	);
	let root = tree.root();
	let host = VisualHandle::new(BasicVisual::new("host"));
	tree.set_root_visual(host.clone());
	assert!(tree.root_visual().is_some_and(|visual| visual.ptr_eq(&host)));

	let mut surface = ();
	tree.draw(root, &mut surface).unwrap();

	let root_visual = tree.visual(root).unwrap().unwrap();
	assert!(
		host.downcast_ref::<BasicVisual>().unwrap().children()[0].ptr_eq(&root_visual),
		"the root visual must be adopted by the host"
	);
	assert_eq!(child_labels(&root_visual), vec!["Status Bar", "Sidebar"]);

	let children = tree.children(root).unwrap();
	let bar_visual = tree.visual(children[0]).unwrap().unwrap();
	assert!(root_visual.downcast_ref::<BasicVisual>().unwrap().children()[0].ptr_eq(&bar_visual));
	assert_eq!(bar_visual.downcast_ref::<BasicVisual>().unwrap().label(), "Status Bar");
}

#[test]
fn refreshed_middle_child_keeps_its_sibling_slot() {
	let mut tree = ElementTree::new(
		builtin_registries(),
		BackendMode::Retained,
		Definition::root()
			.with_child(Definition::group("alpha"))
			.with_child(Definition::group("beta"))
			.with_child(Definition::group("gamma")),
	);
	let root = tree.root();
	let mut surface = ();
	tree.draw(root, &mut surface).unwrap();

	let root_visual = tree.visual(root).unwrap().unwrap();
	let before = root_visual.downcast_ref::<BasicVisual>().unwrap().children();
	assert_eq!(before.len(), 3);

	let beta = tree.children(root).unwrap()[1];
	tree.request_refresh(beta).unwrap();
	tree.draw(root, &mut surface).unwrap();

	let after = root_visual.downcast_ref::<BasicVisual>().unwrap().children();
	assert_eq!(after.len(), 3);
	assert!(after[0].ptr_eq(&before[0]));
	assert!(!after[1].ptr_eq(&before[1]), "a refreshed element gets a fresh visual");
	assert!(after[2].ptr_eq(&before[2]));
	assert_eq!(after[1].downcast_ref::<BasicVisual>().unwrap().label(), "Beta");
}

#[test]
fn missing_visual_builder_is_not_fatal() {
	let registries = builtin_registries();
	registries
		.visual_builder_resolvers
		.add(leaked_def::<VisualBuilderResolverKind>(
			"test.resolver.visual-builder.none",
			TypeKey::of::<NoBuilderResolver>,
			Some(OrderPriority::SUPER),
			ConstraintsDecl::Wildcard,
			accept_all,
			|| Box::new(NoBuilderResolver),
		))
		.unwrap();
	let mut tree = ElementTree::new(
		registries,
		BackendMode::Retained,
		Definition::root().with_child(Definition::group("ghost")),
	);
	let root = tree.root();
	let host = VisualHandle::new(BasicVisual::new("host"));
	tree.set_root_visual(host.clone());

	let mut surface = ();
	tree.draw(root, &mut surface).unwrap();

	assert!(tree.visual(root).unwrap().is_none(), "no builder means no visual");
	assert!(host.downcast_ref::<BasicVisual>().unwrap().children().is_empty());
	assert_eq!(tree.len(), 2, "the pass still updates and recurses");
}

#[test]
fn visual_processors_decorate_every_pass() {
	let registries = builtin_registries();
	registries
		.visual_processors
		.add(leaked_def::<VisualProcessorKind>(
			"test.visual.decorator",
			TypeKey::of::<Decorator>,
			Some(OrderPriority::VALUE),
			ConstraintsDecl::Wildcard,
			accept_all,
			|| Box::new(Decorator),
		))
		.unwrap();
	let mut tree = ElementTree::new(registries, BackendMode::Retained, Definition::root());
	let root = tree.root();
	let mut surface = ();

	tree.draw(root, &mut surface).unwrap();
	let visual = tree.visual(root).unwrap().unwrap();
	assert_eq!(visual.downcast_ref::<BasicVisual>().unwrap().label(), "Root*");

	tree.draw(root, &mut surface).unwrap();
	assert_eq!(
		visual.downcast_ref::<BasicVisual>().unwrap().label(),
		"Root**",
		"the chain runs again over the persistent visual"
	);
}
