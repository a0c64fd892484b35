use crate::chain::{DrawerChain, PostChain, VisualChain};
use crate::context::ElementCx;
use crate::error::ElementError;
use crate::tree::{DrawPass, ProcessPass};
use crate::visual::VisualHandle;

/// Immediate-mode paint handler.
///
/// Drawers run as a chain: the highest-ranked one is called first and
/// cooperatively forwards to the rest through [`DrawerChain::call_next`].
/// A drawer that does not forward swallows everything below it, which is
/// how overriding drawers replace the default rendering.
pub trait Drawer {
	/// Excluded from chain advancement while the chain runs a draw. Lets a
	/// handler participate in resolution (it still ranks, it is still
	/// enumerable) without painting anything.
	fn skip_when_drawing(&self) -> bool {
		false
	}

	fn draw(&mut self, pass: &mut DrawPass<'_, '_>, chain: &mut DrawerChain) -> Result<(), ElementError>;
}

/// Runs after refresh, before drawing. Unlike drawers, every processor in
/// the chain runs: the driver keeps calling until the chain is exhausted,
/// so forwarding is optional and only matters for relative ordering.
pub trait PostProcessor {
	fn process(&mut self, pass: &mut ProcessPass<'_>, chain: &mut PostChain) -> Result<(), ElementError>;
}

/// Produces the retained-mode visual node for an element. Consulted only
/// when the element is pending draw; the produced handle persists until
/// the next refresh or destroy.
pub trait VisualBuilder {
	fn build(&mut self, cx: &ElementCx<'_>) -> VisualHandle;
}

/// Decorates or adjusts a retained visual after it exists. Chained like
/// drawers: the head runs and forwards.
pub trait VisualProcessor {
	fn process(&mut self, visual: &VisualHandle, pass: &mut ProcessPass<'_>, chain: &mut VisualChain) -> Result<(), ElementError>;
}
