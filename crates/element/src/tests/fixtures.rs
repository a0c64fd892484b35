//! Shared scaffolding: a recording canvas, a name-painting drawer, and
//! leaked definitions for handlers that only exist inside one test.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::{
	ConstraintsDecl, DrawPass, Drawer, DrawerChain, DrawerKind, ElementError, ElementId, ElementTree, HandlerDef,
	HandlerKind, OrderPriority, PostProcessor, PostProcessorKind, Registries, Subject, TreeEvent, TypeKey,
};

/// Immediate-mode surface that remembers everything drawn onto it.
#[derive(Default)]
pub struct TestCanvas {
	pub lines: Vec<String>,
}

impl TestCanvas {
	pub fn log(&mut self, line: impl Into<String>) {
		self.lines.push(line.into());
	}
}

/// Paints the element's display label and forwards down the chain.
#[derive(Default)]
pub struct NameDrawer;

impl Drawer for NameDrawer {
	fn draw(&mut self, pass: &mut DrawPass<'_, '_>, chain: &mut DrawerChain) -> Result<(), ElementError> {
		let label = pass.tree().label(pass.element())?.to_string();
		if let Some(canvas) = pass.surface_as::<TestCanvas>() {
			canvas.log(label);
		}
		chain.call_next(pass)
	}
}

pub fn accept_all(_subject: &dyn Subject) -> bool {
	true
}

/// Builds a definition with a `'static` life so it can enter a registry
/// without going through the linker-collected tables.
pub fn leaked_def<K: HandlerKind>(
	id: &'static str,
	handler_type: fn() -> TypeKey,
	priority: Option<OrderPriority>,
	constraints: ConstraintsDecl,
	can_handle: fn(&dyn Subject) -> bool,
	construct: fn() -> Box<K::Instance>,
) -> &'static HandlerDef<K> {
	Box::leak(Box::new(HandlerDef {
		id,
		handler_type,
		priority,
		constraints,
		can_handle,
		construct,
	}))
}

fn construct_drawer<D: Drawer + Default + 'static>() -> Box<dyn Drawer> {
	Box::new(D::default())
}

pub fn drawer_def<D: Drawer + Default + 'static>(
	id: &'static str,
	priority: Option<OrderPriority>,
	constraints: ConstraintsDecl,
	can_handle: fn(&dyn Subject) -> bool,
) -> &'static HandlerDef<DrawerKind> {
	leaked_def::<DrawerKind>(id, TypeKey::of::<D>, priority, constraints, can_handle, construct_drawer::<D>)
}

fn construct_processor<P: PostProcessor + Default + 'static>() -> Box<dyn PostProcessor> {
	Box::new(P::default())
}

pub fn processor_def<P: PostProcessor + Default + 'static>(
	id: &'static str,
	priority: Option<OrderPriority>,
) -> &'static HandlerDef<PostProcessorKind> {
	leaked_def::<PostProcessorKind>(
		id,
		TypeKey::of::<P>,
		priority,
		ConstraintsDecl::Wildcard,
		accept_all,
		construct_processor::<P>,
	)
}

/// Built-in handlers only. Tests add their own definitions on top so
/// they stay insulated from anything other test modules link in.
pub fn builtin_registries() -> Arc<Registries> {
	Arc::new(Registries::with_builtins())
}

pub fn record_events(tree: &mut ElementTree) -> Rc<RefCell<Vec<TreeEvent>>> {
	let log = Rc::new(RefCell::new(Vec::new()));
	let sink = Rc::clone(&log);
	tree.subscribe(move |event| sink.borrow_mut().push(*event));
	log
}

pub fn refreshes_of(log: &RefCell<Vec<TreeEvent>>, element: ElementId) -> usize {
	log.borrow()
		.iter()
		.filter(|event| matches!(event, TreeEvent::Refreshed { element: seen } if *seen == element))
		.count()
}

pub fn value_changes(log: &RefCell<Vec<TreeEvent>>, element: ElementId) -> usize {
	log.borrow()
		.iter()
		.filter(|event| matches!(event, TreeEvent::ValueChanged { element: seen } if *seen == element))
		.count()
}
