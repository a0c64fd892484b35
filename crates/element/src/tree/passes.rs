use std::any::Any;

use crate::arena::ElementId;
use crate::error::ElementError;
use crate::tree::ElementTree;

/// Per-element context handed to drawers while an immediate-mode draw
/// runs. Carries the tree and the caller's surface; the surface stays
/// `dyn Any` so the tree never commits to a host's paint target type.
pub struct DrawPass<'t, 's> {
	pub(crate) tree: &'t mut ElementTree,
	pub(crate) element: ElementId,
	pub(crate) surface: &'s mut dyn Any,
}

impl DrawPass<'_, '_> {
	/// The element this pass is drawing.
	pub fn element(&self) -> ElementId {
		self.element
	}

	pub fn tree(&self) -> &ElementTree {
		self.tree
	}

	pub fn tree_mut(&mut self) -> &mut ElementTree {
		self.tree
	}

	pub fn surface(&mut self) -> &mut dyn Any {
		self.surface
	}

	/// The surface downcast to the host's concrete type. `None` means the
	/// host handed in something else; a drawer treats that as "not mine"
	/// and forwards.
	pub fn surface_as<S: Any>(&mut self) -> Option<&mut S> {
		self.surface.downcast_mut::<S>()
	}

	/// Draws every current child of the element, in child-list order.
	pub fn draw_children(&mut self) -> Result<(), ElementError> {
		for child in self.tree.children(self.element)? {
			self.draw_child(child)?;
		}
		Ok(())
	}

	/// Draws one element against this pass's surface. Usually a child,
	/// but drawers that re-parent visually may point it anywhere.
	pub fn draw_child(&mut self, child: ElementId) -> Result<(), ElementError> {
		self.tree.draw_node(child, &mut *self.surface)
	}
}

/// Per-element context handed to post-processors and visual processors.
pub struct ProcessPass<'t> {
	pub(crate) tree: &'t mut ElementTree,
	pub(crate) element: ElementId,
}

impl ProcessPass<'_> {
	pub fn element(&self) -> ElementId {
		self.element
	}

	pub fn tree(&self) -> &ElementTree {
		self.tree
	}

	pub fn tree_mut(&mut self) -> &mut ElementTree {
		self.tree
	}
}
