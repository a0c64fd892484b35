use crate::error::ElementError;
use crate::handlers::{Drawer, PostProcessor, VisualProcessor};
use crate::tree::{DrawPass, ProcessPass};
use crate::visual::VisualHandle;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum ChainCursor {
	BeforeStart,
	At(usize),
	Exhausted,
}

/// Ranked handler list with a single-pass cursor.
///
/// `call_next` hands the running handler a `&mut` to the chain itself so
/// it can forward deeper. To make that aliasing-free, the handler is moved
/// out of its slot for the duration of the call; an empty slot reached by
/// the cursor means somebody reset and re-entered a running chain, which
/// is a driver bug and panics.
pub struct Chain<H: ?Sized> {
	slots: Vec<Option<Box<H>>>,
	cursor: ChainCursor,
}

impl<H: ?Sized> Chain<H> {
	pub fn new(handlers: Vec<Box<H>>) -> Self {
		Self {
			slots: handlers.into_iter().map(Some).collect(),
			cursor: ChainCursor::BeforeStart,
		}
	}

	pub fn len(&self) -> usize {
		self.slots.len()
	}

	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}

	/// Rewinds the cursor for a fresh pass.
	pub fn reset(&mut self) {
		self.cursor = ChainCursor::BeforeStart;
	}

	pub fn is_exhausted(&self) -> bool {
		self.cursor == ChainCursor::Exhausted
	}

	fn advance_where(&mut self, eligible: impl Fn(&H) -> bool) -> Option<usize> {
		let mut next = match self.cursor {
			ChainCursor::BeforeStart => 0,
			ChainCursor::At(index) => index + 1,
			ChainCursor::Exhausted => return None,
		};
		while next < self.slots.len() {
			match &self.slots[next] {
				None => panic!("chain re-entered: slot {next} is mid-call"),
				Some(handler) if eligible(handler) => {
					self.cursor = ChainCursor::At(next);
					return Some(next);
				}
				Some(_) => next += 1,
			}
		}
		self.cursor = ChainCursor::Exhausted;
		None
	}

	fn take(&mut self, index: usize) -> Box<H> {
		match self.slots[index].take() {
			Some(handler) => handler,
			None => panic!("chain re-entered: slot {index} is mid-call"),
		}
	}

	fn put_back(&mut self, index: usize, handler: Box<H>) {
		debug_assert!(self.slots[index].is_none());
		self.slots[index] = Some(handler);
	}
}

/// Drawer chains are driven with `reset` plus a single head call; drawers
/// forward cooperatively.
pub type DrawerChain = Chain<dyn Drawer>;

/// Post-processor chains are driven to exhaustion; every processor runs.
pub type PostChain = Chain<dyn PostProcessor>;

/// Visual-processor chains are driven like drawer chains.
pub type VisualChain = Chain<dyn VisualProcessor>;

impl DrawerChain {
	/// Invokes the next drawer that draws. Exhaustion is not an error; it
	/// means the element has nothing (left) to paint.
	pub fn call_next(&mut self, pass: &mut DrawPass<'_, '_>) -> Result<(), ElementError> {
		let Some(index) = self.advance_where(|drawer| !drawer.skip_when_drawing()) else {
			return Ok(());
		};
		let mut drawer = self.take(index);
		let outcome = drawer.draw(pass, self);
		self.put_back(index, drawer);
		outcome
	}
}

impl PostChain {
	/// Invokes the next processor. `Ok(false)` once the chain is exhausted.
	pub fn call_next(&mut self, pass: &mut ProcessPass<'_>) -> Result<bool, ElementError> {
		let Some(index) = self.advance_where(|_| true) else {
			return Ok(false);
		};
		let mut processor = self.take(index);
		let outcome = processor.process(pass, self);
		self.put_back(index, processor);
		outcome.map(|()| true)
	}
}

impl VisualChain {
	pub fn call_next(&mut self, visual: &VisualHandle, pass: &mut ProcessPass<'_>) -> Result<(), ElementError> {
		let Some(index) = self.advance_where(|_| true) else {
			return Ok(());
		};
		let mut processor = self.take(index);
		let outcome = processor.process(visual, pass, self);
		self.put_back(index, processor);
		outcome
	}
}
