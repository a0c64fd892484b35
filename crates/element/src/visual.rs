use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Which draw path the tree runs.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BackendMode {
	/// Drawers repaint every pass against a caller-supplied surface.
	Immediate,
	/// Each element owns a persistent visual node; drawing (re)creates the
	/// node only when the element is pending draw.
	Retained,
}

/// A retained-mode UI node as the tree sees it: an ordered child list under
/// shared handles. Hosts back this with their real widget type; mutation is
/// interior because handles are shared.
pub trait VisualNode: Any {
	fn add_child(&self, child: &VisualHandle);
	fn insert_child(&self, index: usize, child: &VisualHandle);
	/// Detaches `child`, returning the index it occupied.
	fn remove_child(&self, child: &VisualHandle) -> Option<usize>;
	fn index_of(&self, child: &VisualHandle) -> Option<usize>;
	fn child_count(&self) -> usize;
	fn set_label(&self, label: &str) {
		let _ = label;
	}
	fn as_any(&self) -> &dyn Any;
}

/// Shared handle to a visual node. Identity is pointer identity, which is
/// what sibling-index bookkeeping keys on.
#[derive(Clone)]
pub struct VisualHandle(Rc<dyn VisualNode>);

impl VisualHandle {
	pub fn new(node: impl VisualNode) -> Self {
		Self(Rc::new(node))
	}

	pub fn from_rc(node: Rc<dyn VisualNode>) -> Self {
		Self(node)
	}

	pub fn node(&self) -> &dyn VisualNode {
		&*self.0
	}

	pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
		self.0.as_any().downcast_ref::<T>()
	}

	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}

impl fmt::Debug for VisualHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "VisualHandle({:p})", Rc::as_ptr(&self.0))
	}
}

/// Plain container node: a label and an ordered child list. The default
/// visual builder produces these; hosts with real widgets supply their own
/// [`VisualNode`] instead.
#[derive(Default)]
pub struct BasicVisual {
	label: RefCell<String>,
	children: RefCell<Vec<VisualHandle>>,
}

impl BasicVisual {
	pub fn new(label: impl Into<String>) -> Self {
		Self {
			label: RefCell::new(label.into()),
			children: RefCell::new(Vec::new()),
		}
	}

	pub fn label(&self) -> String {
		self.label.borrow().clone()
	}

	pub fn children(&self) -> Vec<VisualHandle> {
		self.children.borrow().clone()
	}
}

impl VisualNode for BasicVisual {
	fn add_child(&self, child: &VisualHandle) {
		self.children.borrow_mut().push(child.clone());
	}

	fn insert_child(&self, index: usize, child: &VisualHandle) {
		let mut children = self.children.borrow_mut();
		let index = index.min(children.len());
		children.insert(index, child.clone());
	}

	fn remove_child(&self, child: &VisualHandle) -> Option<usize> {
		let mut children = self.children.borrow_mut();
		let index = children.iter().position(|c| c.ptr_eq(child))?;
		children.remove(index);
		Some(index)
	}

	fn index_of(&self, child: &VisualHandle) -> Option<usize> {
		self.children.borrow().iter().position(|c| c.ptr_eq(child))
	}

	fn child_count(&self) -> usize {
		self.children.borrow().len()
	}

	fn set_label(&self, label: &str) {
		*self.label.borrow_mut() = label.to_string();
	}

	fn as_any(&self) -> &dyn Any {
		self
	}
}
