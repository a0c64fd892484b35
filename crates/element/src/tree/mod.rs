//! The element tree: arena storage, lifecycle passes, and the deferred
//! work queue that keeps mid-pass mutation safe.
//!
//! Every public pass entry point brackets itself with a pass depth
//! counter. Mutations requested while the depth is nonzero (destroys, and
//! refreshes of elements that are mid-phase) land in a FIFO queue and run
//! once the outermost pass unwinds, in request order.

mod node;
mod passes;

pub use passes::{DrawPass, ProcessPass};

use std::any::Any;
use std::mem;
use std::sync::Arc;

use tracing::{error, trace, warn};

use crate::arena::{Arena, ElementId};
use crate::attribute::AttributeInfo;
use crate::context::{ElementCx, SubjectView};
use crate::definition::{Definition, RefreshPolicy};
use crate::error::ElementError;
use crate::events::{EventSink, TreeEvent};
use crate::factory::Factories;
use crate::kinds::Registries;
use crate::phase::{ElementPhases, PhaseEvent};
use crate::queue::WorkQueue;
use crate::value::ValueState;
use crate::visual::{BackendMode, VisualHandle};

use self::node::ElementNode;

/// Owns the elements, their resolver pools, and the event sink. One tree
/// per inspected subject; trees are single-threaded by construction.
pub struct ElementTree {
	arena: Arena<ElementNode>,
	root: ElementId,
	backend: BackendMode,
	registries: Arc<Registries>,
	factories: Factories,
	queue: WorkQueue,
	events: EventSink,
	/// Bumped when the outermost pass begins; per-element update stamps
	/// compare against it to coalesce repeated updates within one pass.
	update_id: u64,
	pass_depth: u32,
	draining: bool,
	root_visual: Option<VisualHandle>,
}

impl ElementTree {
	/// Builds a tree around a root definition. The root stays unrefreshed
	/// until the first update touches it.
	pub fn new(registries: Arc<Registries>, backend: BackendMode, definition: Definition) -> Self {
		let factories = Factories::new(&registries);
		let mut arena = Arena::new();
		let root = arena.insert(ElementNode::new(definition, None));
		Self {
			arena,
			root,
			backend,
			registries,
			factories,
			queue: WorkQueue::new(),
			events: EventSink::new(),
			update_id: 0,
			pass_depth: 0,
			draining: false,
			root_visual: None,
		}
	}

	pub fn root(&self) -> ElementId {
		self.root
	}

	pub fn backend(&self) -> BackendMode {
		self.backend
	}

	pub fn registries(&self) -> &Registries {
		&self.registries
	}

	pub fn factories(&self) -> &Factories {
		&self.factories
	}

	pub fn subscribe(&mut self, subscriber: impl Fn(&TreeEvent) + 'static) {
		self.events.subscribe(subscriber);
	}

	/// Host visual that adopts the root element's visual in retained mode.
	pub fn set_root_visual(&mut self, visual: VisualHandle) {
		self.root_visual = Some(visual);
	}

	pub fn root_visual(&self) -> Option<&VisualHandle> {
		self.root_visual.as_ref()
	}

	pub fn contains(&self, id: ElementId) -> bool {
		self.arena.contains(id)
	}

	pub fn len(&self) -> usize {
		self.arena.len()
	}

	pub fn is_empty(&self) -> bool {
		self.arena.len() == 0
	}

	pub fn pending_work(&self) -> usize {
		self.queue.len()
	}

	pub fn definition(&self, id: ElementId) -> Result<&Definition, ElementError> {
		Ok(&self.node(id)?.definition)
	}

	pub fn label(&self, id: ElementId) -> Result<&str, ElementError> {
		Ok(self.node(id)?.label())
	}

	pub fn phases(&self, id: ElementId) -> Result<ElementPhases, ElementError> {
		Ok(self.node(id)?.phases)
	}

	pub fn parent(&self, id: ElementId) -> Result<Option<ElementId>, ElementError> {
		Ok(self.node(id)?.parent)
	}

	pub fn children(&self, id: ElementId) -> Result<Vec<ElementId>, ElementError> {
		Ok(self.node(id)?.children.clone())
	}

	/// The element's effective attributes, as of its last refresh.
	pub fn attribute_infos(&self, id: ElementId) -> Result<&[AttributeInfo], ElementError> {
		Ok(&self.node(id)?.attrs)
	}

	pub fn value(&self, id: ElementId) -> Result<&ValueState, ElementError> {
		Ok(&self.node(id)?.value)
	}

	pub fn visual(&self, id: ElementId) -> Result<Option<VisualHandle>, ElementError> {
		Ok(self.node(id)?.visual.clone())
	}

	fn node(&self, id: ElementId) -> Result<&ElementNode, ElementError> {
		self.arena.get(id).ok_or(ElementError::UseAfterDestroy { id })
	}

	fn node_mut(&mut self, id: ElementId) -> Result<&mut ElementNode, ElementError> {
		self.arena.get_mut(id).ok_or(ElementError::UseAfterDestroy { id })
	}

	fn apply_phase(&mut self, id: ElementId, event: PhaseEvent) -> Result<(), ElementError> {
		let node = self.node_mut(id)?;
		node.phases = node.phases.apply(event)?;
		Ok(())
	}

	fn element_cx<'a>(&'a self, node: &'a ElementNode) -> ElementCx<'a> {
		let inherited = node
			.parent
			.and_then(|parent| self.arena.get(parent))
			.map(|parent| parent.propagated.as_slice())
			.unwrap_or(&[]);
		ElementCx {
			definition: &node.definition,
			subject: SubjectView::new(node.definition.value_type(), &node.attr_keys, &node.attrs),
			registries: &self.registries,
			backend: self.backend,
			inherited,
		}
	}

	fn enter_pass(&mut self) {
		self.pass_depth += 1;
		if self.pass_depth == 1 {
			self.update_id += 1;
		}
	}

	fn leave_pass(&mut self) {
		self.pass_depth -= 1;
		if self.pass_depth == 0 && !self.draining {
			self.drain_deferred();
		}
	}

	fn drain_deferred(&mut self) {
		if self.queue.is_empty() {
			return;
		}
		trace!(pending = self.queue.len(), "draining deferred work");
		self.draining = true;
		while let Some(queued) = self.queue.pop() {
			(queued.work)(self);
		}
		self.draining = false;
	}

	/// Runs `work` against the tree, deferring it past the active pass
	/// when one is running (or unconditionally with `force_delay`).
	/// `Ok(true)` means it ran synchronously.
	pub fn request(
		&mut self,
		id: ElementId,
		work: impl FnOnce(&mut ElementTree) + 'static,
		force_delay: bool,
	) -> Result<bool, ElementError> {
		if !self.arena.contains(id) {
			return Err(ElementError::UseAfterDestroy { id });
		}
		if force_delay || self.pass_depth > 0 {
			let seq = self.queue.enqueue(Box::new(work));
			trace!(element = %id, seq, "work deferred");
			return Ok(false);
		}
		work(self);
		Ok(true)
	}

	/// Updates one element: clears its just-refreshed marker, refreshes it
	/// if it never was, and pulls its value. Repeated updates within one
	/// pass coalesce into the first unless `force` is set.
	pub fn update(&mut self, id: ElementId, force: bool) -> Result<(), ElementError> {
		self.enter_pass();
		let outcome = self.update_node(id, force);
		self.leave_pass();
		outcome
	}

	fn update_node(&mut self, id: ElementId, force: bool) -> Result<(), ElementError> {
		let (on_destroy_path, last_update) = {
			let node = self.node(id)?;
			(node.phases.on_destroy_path(), node.last_update)
		};
		if on_destroy_path {
			return Ok(());
		}
		if !force && last_update == Some(self.update_id) {
			return Ok(());
		}
		let stamp = self.update_id;
		self.node_mut(id)?.last_update = Some(stamp);

		self.apply_phase(id, PhaseEvent::ClearJustRefreshed)?;
		if last_update.is_none() {
			self.request_refresh_inner(id)?;
		}
		self.pull_value(id)?;
		Ok(())
	}

	/// Requests a refresh. Returns `Ok(false)` when the request collapses
	/// into an already-pending one, is blocked by the refresh policy, or
	/// hits an element on the destroy path. `Ok(true)` means the refresh
	/// ran, or was queued because the element is mid-phase.
	pub fn request_refresh(&mut self, id: ElementId) -> Result<bool, ElementError> {
		self.enter_pass();
		let outcome = self.request_refresh_inner(id);
		self.leave_pass();
		outcome
	}

	fn request_refresh_inner(&mut self, id: ElementId) -> Result<bool, ElementError> {
		let (phases, policy, first_refreshed) = {
			let node = self.node(id)?;
			(node.phases, node.definition.refresh_policy(), node.first_refreshed)
		};
		if phases.on_destroy_path() || phases.contains(ElementPhases::PENDING_REFRESH) {
			return Ok(false);
		}
		if first_refreshed && policy == RefreshPolicy::Once {
			return Ok(false);
		}
		self.apply_phase(id, PhaseEvent::QueueRefresh)?;
		if phases.intersects(ElementPhases::DRAWING | ElementPhases::REFRESHING | ElementPhases::POST_PROCESSING) {
			let seq = self.queue.enqueue(Box::new(move |tree| {
				if let Err(err) = tree.refresh_if_pending(id) {
					warn!(element = %id, %err, "deferred refresh failed");
				}
			}));
			trace!(element = %id, seq, "refresh deferred");
			return Ok(true);
		}
		self.refresh_now(id)?;
		Ok(true)
	}

	fn refresh_if_pending(&mut self, id: ElementId) -> Result<(), ElementError> {
		let Some(node) = self.arena.get(id) else {
			return Ok(());
		};
		if node.phases.contains(ElementPhases::PENDING_REFRESH) && !node.phases.on_destroy_path() {
			self.refresh_now(id)?;
		}
		Ok(())
	}

	/// Tears down and re-provisions one element: children, attributes,
	/// resolvers, chains. The element comes out pending post-process and
	/// pending draw.
	fn refresh_now(&mut self, id: ElementId) -> Result<(), ElementError> {
		self.apply_phase(id, PhaseEvent::BeginRefresh)?;
		trace!(element = %id, "refresh");

		// Old children go first; a refresh rebuilds structure from
		// scratch. They are already detached here, so their deferred
		// teardown cannot race the rebuild.
		let old_children = mem::take(&mut self.node_mut(id)?.children);
		let had_children = !old_children.is_empty();
		for child in old_children {
			self.destroy(child);
		}

		self.release_resolvers(id);
		self.node_mut(id)?.reseed_attributes();

		// Attributes resolve first so everything after (structure, chain
		// building, value ops) matches against the effective set.
		let attr_ticket = {
			let Some(node) = self.arena.get(id) else {
				return Err(ElementError::UseAfterDestroy { id });
			};
			let view = SubjectView::new(node.definition.value_type(), &node.attr_keys, &node.attrs);
			self.factories.attribute.create_resolver(&view)
		};
		if let Some(ticket) = attr_ticket {
			self.node_mut(id)?.resolvers.attribute = Some(ticket);
			let mut resolver = self.factories.attribute.checkout(&ticket);
			let attrs = {
				let Some(node) = self.arena.get(id) else {
					self.factories.attribute.restore(&ticket, resolver);
					return Err(ElementError::UseAfterDestroy { id });
				};
				let cx = self.element_cx(node);
				resolver.attributes(&cx).to_vec()
			};
			self.factories.attribute.restore(&ticket, resolver);
			self.node_mut(id)?.set_attributes(attrs);
		}

		macro_rules! provision {
			($family:ident) => {{
				let ticket = {
					let Some(node) = self.arena.get(id) else {
						return Err(ElementError::UseAfterDestroy { id });
					};
					let view = SubjectView::new(node.definition.value_type(), &node.attr_keys, &node.attrs);
					self.factories.$family.create_resolver(&view)
				};
				if let Some(ticket) = ticket {
					self.node_mut(id)?.resolvers.$family = Some(ticket);
				}
			}};
		}

		let mut spawned = 0usize;
		if self.node(id)?.definition.can_have_children() {
			provision!(structure);
			if let Some(ticket) = self.node(id)?.resolvers.structure {
				let mut resolver = self.factories.structure.checkout(&ticket);
				let child_defs = {
					let Some(node) = self.arena.get(id) else {
						self.factories.structure.restore(&ticket, resolver);
						return Err(ElementError::UseAfterDestroy { id });
					};
					let cx = self.element_cx(node);
					resolver.children(&cx).to_vec()
				};
				self.factories.structure.restore(&ticket, resolver);
				for child_def in child_defs {
					self.spawn(child_def, id);
					spawned += 1;
				}
			}
		}
		if had_children || spawned > 0 {
			self.events.emit(TreeEvent::ChildListChanged { parent: id });
		}

		provision!(value_op);
		provision!(post_chain);
		match self.backend {
			BackendMode::Immediate => provision!(drawer_chain),
			BackendMode::Retained => {
				provision!(visual_builder);
				provision!(visual_chain);
			}
		}

		self.apply_phase(id, PhaseEvent::EndRefresh)?;
		self.node_mut(id)?.first_refreshed = true;
		self.events.emit(TreeEvent::Refreshed { element: id });
		Ok(())
	}

	fn spawn(&mut self, definition: Definition, parent: ElementId) -> ElementId {
		let child = self.arena.insert(ElementNode::new(definition, Some(parent)));
		if let Some(node) = self.arena.get_mut(parent) {
			node.children.push(child);
		}
		trace!(element = %child, parent = %parent, "spawned");
		child
	}

	/// Releases every resolver the element holds back to its pool.
	fn release_resolvers(&mut self, id: ElementId) {
		let Some(node) = self.arena.get_mut(id) else {
			return;
		};
		let slots = mem::take(&mut node.resolvers);
		if let Some(ticket) = slots.structure {
			self.factories.structure.release(ticket);
		}
		if let Some(ticket) = slots.attribute {
			self.factories.attribute.release(ticket);
		}
		if let Some(ticket) = slots.drawer_chain {
			self.factories.drawer_chain.release(ticket);
		}
		if let Some(ticket) = slots.post_chain {
			self.factories.post_chain.release(ticket);
		}
		if let Some(ticket) = slots.visual_builder {
			self.factories.visual_builder.release(ticket);
		}
		if let Some(ticket) = slots.visual_chain {
			self.factories.visual_chain.release(ticket);
		}
		if let Some(ticket) = slots.value_op {
			self.factories.value_op.release(ticket);
		}
	}

	/// Requests destruction. Stale ids and repeated requests are quiet
	/// no-ops; actual teardown waits for the active pass to unwind.
	pub fn destroy(&mut self, id: ElementId) {
		let Some(node) = self.arena.get(id) else {
			return;
		};
		if node.phases.on_destroy_path() {
			return;
		}
		if let Err(err) = self.apply_phase(id, PhaseEvent::QueueDestroy) {
			warn!(element = %id, %err, "destroy request rejected");
			return;
		}
		if self.pass_depth > 0 {
			let seq = self.queue.enqueue(Box::new(move |tree| tree.finalize_destroy(id)));
			trace!(element = %id, seq, "destroy deferred");
		} else {
			self.finalize_destroy(id);
		}
	}

	fn finalize_destroy(&mut self, id: ElementId) {
		if !self.arena.contains(id) {
			return;
		}
		if let Err(err) = self.apply_phase(id, PhaseEvent::BeginDestroy) {
			warn!(element = %id, %err, "destroy finalization rejected");
			return;
		}
		trace!(element = %id, "destroying");

		// Detach from the parent's child list first so sibling traversal
		// stops seeing the element mid-teardown.
		let parent = self.arena.get(id).and_then(|node| node.parent);
		if let Some(parent_id) = parent {
			if let Some(parent_node) = self.arena.get_mut(parent_id) {
				let before = parent_node.children.len();
				parent_node.children.retain(|child| *child != id);
				if parent_node.children.len() != before {
					self.events.emit(TreeEvent::ChildListChanged { parent: parent_id });
				}
			}
		}

		// Children tear down depth-first. Passes have unwound by the time
		// finalization runs, so the nested destroys are immediate.
		let children = self.arena.get(id).map(|node| node.children.clone()).unwrap_or_default();
		for child in children {
			self.destroy(child);
		}

		self.release_resolvers(id);

		let visual = self.arena.get(id).and_then(|node| node.visual.clone());
		if let Some(visual) = visual {
			if let Some(owner) = self.owning_visual(parent) {
				owner.node().remove_child(&visual);
			}
		}

		if let Err(err) = self.apply_phase(id, PhaseEvent::FinishDestroy) {
			warn!(element = %id, %err, "destroy completion rejected");
		}
		self.arena.remove(id);
		// Emitted after removal: the id in the event is already stale and
		// only names which element went away.
		self.events.emit(TreeEvent::Destroyed { element: id });
	}

	/// Nearest ancestor visual, falling back to the host's root visual.
	fn owning_visual(&self, mut parent: Option<ElementId>) -> Option<VisualHandle> {
		while let Some(id) = parent {
			let node = self.arena.get(id)?;
			if let Some(visual) = &node.visual {
				return Some(visual.clone());
			}
			parent = node.parent;
		}
		self.root_visual.clone()
	}

	/// Runs the element's post-process chain to exhaustion. `Ok(false)`
	/// when no post-process is pending.
	pub fn post_process(&mut self, id: ElementId) -> Result<bool, ElementError> {
		self.enter_pass();
		let outcome = self.post_process_node(id);
		self.leave_pass();
		outcome
	}

	fn post_process_node(&mut self, id: ElementId) -> Result<bool, ElementError> {
		let (phases, ticket) = {
			let node = self.node(id)?;
			(node.phases, node.resolvers.post_chain)
		};
		if phases.on_destroy_path() || !phases.contains(ElementPhases::PENDING_POST_PROCESS) {
			return Ok(false);
		}
		let Some(ticket) = ticket else {
			self.apply_phase(id, PhaseEvent::FinishPostProcess)?;
			return Ok(true);
		};

		let mut resolver = self.factories.post_chain.checkout(&ticket);
		let chain = {
			let Some(node) = self.arena.get(id) else {
				self.factories.post_chain.restore(&ticket, resolver);
				return Err(ElementError::UseAfterDestroy { id });
			};
			let cx = self.element_cx(node);
			resolver.chain(&cx)
		};
		chain.reset();

		let mut outcome = Ok(());
		loop {
			match self.node(id) {
				Ok(node) if node.phases.on_destroy_path() => break,
				Ok(_) => {}
				Err(err) => {
					outcome = Err(err);
					break;
				}
			}
			if let Err(err) = self.apply_phase(id, PhaseEvent::BeginPostProcess) {
				outcome = Err(err);
				break;
			}
			let mut pass = ProcessPass {
				tree: &mut *self,
				element: id,
			};
			let ran = match chain.call_next(&mut pass) {
				Ok(ran) => ran,
				Err(err) => {
					outcome = Err(err);
					false
				}
			};
			if let Err(err) = self.apply_phase(id, PhaseEvent::EndPostProcess) {
				outcome = Err(err);
				break;
			}
			if !ran {
				break;
			}
		}
		self.factories.post_chain.restore(&ticket, resolver);
		outcome?;
		self.apply_phase(id, PhaseEvent::FinishPostProcess)?;
		Ok(true)
	}

	/// Draws one element and, through its drawer chain or the retained
	/// recursion, its subtree. Updates and post-processes on the way so a
	/// bare `draw` is a complete pass.
	pub fn draw(&mut self, id: ElementId, surface: &mut dyn Any) -> Result<(), ElementError> {
		self.enter_pass();
		let outcome = self.draw_node(id, surface);
		self.leave_pass();
		outcome
	}

	pub(crate) fn draw_node(&mut self, id: ElementId, surface: &mut dyn Any) -> Result<(), ElementError> {
		if self.node(id)?.phases.on_destroy_path() {
			return Ok(());
		}
		self.update_node(id, false)?;
		self.post_process_node(id)?;
		// A post-processor may have destroyed the element.
		if self.node(id)?.phases.on_destroy_path() {
			return Ok(());
		}
		match self.backend {
			BackendMode::Immediate => self.draw_immediate(id, surface),
			BackendMode::Retained => self.draw_retained(id, surface),
		}
	}

	fn draw_immediate(&mut self, id: ElementId, surface: &mut dyn Any) -> Result<(), ElementError> {
		self.apply_phase(id, PhaseEvent::BeginDraw)?;
		let ticket = self.node(id)?.resolvers.drawer_chain;
		let outcome = match ticket {
			Some(ticket) => {
				let mut resolver = self.factories.drawer_chain.checkout(&ticket);
				let chain = {
					let Some(node) = self.arena.get(id) else {
						self.factories.drawer_chain.restore(&ticket, resolver);
						return Err(ElementError::UseAfterDestroy { id });
					};
					let cx = self.element_cx(node);
					resolver.chain(&cx)
				};
				chain.reset();
				let mut pass = DrawPass {
					tree: &mut *self,
					element: id,
					surface,
				};
				let outcome = chain.call_next(&mut pass);
				self.factories.drawer_chain.restore(&ticket, resolver);
				outcome
			}
			None => Ok(()),
		};
		self.apply_phase(id, PhaseEvent::EndDraw)?;
		self.apply_phase(id, PhaseEvent::ClearPendingDraw)?;
		outcome
	}

	fn draw_retained(&mut self, id: ElementId, surface: &mut dyn Any) -> Result<(), ElementError> {
		self.apply_phase(id, PhaseEvent::BeginDraw)?;
		let outcome = self.draw_retained_inner(id, surface);
		self.apply_phase(id, PhaseEvent::EndDraw)?;
		outcome
	}

	fn draw_retained_inner(&mut self, id: ElementId, surface: &mut dyn Any) -> Result<(), ElementError> {
		if self.node(id)?.phases.contains(ElementPhases::PENDING_DRAW) {
			self.rebuild_visual(id)?;
			self.apply_phase(id, PhaseEvent::ClearPendingDraw)?;
		}

		let visual = self.node(id)?.visual.clone();
		let ticket = self.node(id)?.resolvers.visual_chain;
		if let (Some(visual), Some(ticket)) = (visual, ticket) {
			let mut resolver = self.factories.visual_chain.checkout(&ticket);
			let chain = {
				let Some(node) = self.arena.get(id) else {
					self.factories.visual_chain.restore(&ticket, resolver);
					return Err(ElementError::UseAfterDestroy { id });
				};
				let cx = self.element_cx(node);
				resolver.chain(&cx)
			};
			chain.reset();
			let mut pass = ProcessPass {
				tree: &mut *self,
				element: id,
			};
			let outcome = chain.call_next(&visual, &mut pass);
			self.factories.visual_chain.restore(&ticket, resolver);
			outcome?;
		}

		for child in self.children(id)? {
			self.draw_node(child, surface)?;
		}
		Ok(())
	}

	/// (Re)builds the element's retained visual, keeping its sibling slot
	/// in the owning visual when it replaces an old one.
	fn rebuild_visual(&mut self, id: ElementId) -> Result<(), ElementError> {
		let Some(ticket) = self.node(id)?.resolvers.visual_builder else {
			error!(element = %id, "no visual builder resolver; element stays visual-less");
			return Ok(());
		};
		let mut resolver = self.factories.visual_builder.checkout(&ticket);
		let built = {
			let Some(node) = self.arena.get(id) else {
				self.factories.visual_builder.restore(&ticket, resolver);
				return Err(ElementError::UseAfterDestroy { id });
			};
			let cx = self.element_cx(node);
			resolver.builder(&cx).map(|builder| builder.build(&cx))
		};
		self.factories.visual_builder.restore(&ticket, resolver);

		let Some(new_visual) = built else {
			error!(element = %id, "no visual builder matched; element stays visual-less");
			return Ok(());
		};
		let old = mem::replace(&mut self.node_mut(id)?.visual, Some(new_visual.clone()));
		let parent = self.node(id)?.parent;
		if let Some(owner) = self.owning_visual(parent) {
			let old_index = old.and_then(|old| owner.node().remove_child(&old));
			match old_index {
				Some(index) => owner.node().insert_child(index, &new_visual),
				None => owner.node().add_child(&new_visual),
			}
		}
		trace!(element = %id, "visual rebuilt");
		Ok(())
	}

	/// Pulls the element's value through its value operation, bumping the
	/// revision and emitting [`TreeEvent::ValueChanged`] on change.
	fn pull_value(&mut self, id: ElementId) -> Result<(), ElementError> {
		let (on_destroy_path, ticket) = {
			let node = self.node(id)?;
			(node.phases.on_destroy_path(), node.resolvers.value_op)
		};
		if on_destroy_path {
			return Ok(());
		}
		let Some(ticket) = ticket else {
			return Ok(());
		};

		let mut state = mem::take(&mut self.node_mut(id)?.value);
		let mut resolver = self.factories.value_op.checkout(&ticket);
		let changed = {
			let Some(node) = self.arena.get(id) else {
				self.factories.value_op.restore(&ticket, resolver);
				return Err(ElementError::UseAfterDestroy { id });
			};
			let cx = self.element_cx(node);
			match resolver.operation(&cx) {
				Some(op) => op.pull(&node.definition, &mut state),
				None => false,
			}
		};
		self.factories.value_op.restore(&ticket, resolver);
		self.node_mut(id)?.value = state;
		if changed {
			self.events.emit(TreeEvent::ValueChanged { element: id });
		}
		Ok(())
	}

	/// Writes a value through the element's value operation. `Ok(true)`
	/// means the write went through; the follow-up pull runs immediately
	/// so observed state and events stay consistent.
	pub fn set_value(&mut self, id: ElementId, value: &dyn Any) -> Result<bool, ElementError> {
		let Some(ticket) = self.node(id)?.resolvers.value_op else {
			return Ok(false);
		};
		let mut resolver = self.factories.value_op.checkout(&ticket);
		let stored = {
			let Some(node) = self.arena.get(id) else {
				self.factories.value_op.restore(&ticket, resolver);
				return Err(ElementError::UseAfterDestroy { id });
			};
			let cx = self.element_cx(node);
			match resolver.operation(&cx) {
				Some(op) => op.store(&node.definition, value),
				None => false,
			}
		};
		self.factories.value_op.restore(&ticket, resolver);
		if stored {
			self.pull_value(id)?;
		}
		Ok(stored)
	}
}
