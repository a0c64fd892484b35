//! Resolver traits, one per provisioning concern.
//!
//! A resolver answers one question about one element: which children, which
//! attributes, which chain, which builder, which value operation. Instances
//! are pooled and bound to one element at a time; whatever they derive from
//! the [`ElementCx`] they may cache across calls, as long as `on_release`
//! drops it again.

use crate::attribute::AttributeInfo;
use crate::chain::{DrawerChain, PostChain, VisualChain};
use crate::context::ElementCx;
use crate::definition::Definition;
use crate::handlers::VisualBuilder;
use crate::pool::PoolItem;
use crate::value::ValueOperation;

/// Provisions the child definitions created under an element on refresh.
pub trait StructureResolver: PoolItem {
	fn children(&mut self, cx: &ElementCx<'_>) -> &[Definition];
}

/// Produces the element's effective attribute set, typically declared
/// attributes plus whatever propagates down from ancestors.
pub trait AttributeResolver: PoolItem {
	fn attributes(&mut self, cx: &ElementCx<'_>) -> &[AttributeInfo];
}

/// Builds and owns the element's drawer chain (immediate mode).
pub trait DrawerChainResolver: PoolItem {
	fn chain(&mut self, cx: &ElementCx<'_>) -> &mut DrawerChain;
}

/// Builds and owns the element's post-processor chain.
pub trait PostChainResolver: PoolItem {
	fn chain(&mut self, cx: &ElementCx<'_>) -> &mut PostChain;
}

/// Picks the visual builder for the element (retained mode). `None` leaves
/// the element visual-less.
pub trait VisualBuilderResolver: PoolItem {
	fn builder(&mut self, cx: &ElementCx<'_>) -> Option<&mut (dyn VisualBuilder + 'static)>;
}

/// Builds and owns the element's visual-processor chain (retained mode).
pub trait VisualChainResolver: PoolItem {
	fn chain(&mut self, cx: &ElementCx<'_>) -> &mut VisualChain;
}

/// Supplies the operation that moves values between the element and its
/// host data. `None` means the element carries no pullable value.
pub trait ValueOperationResolver: PoolItem {
	fn operation(&mut self, cx: &ElementCx<'_>) -> Option<&mut (dyn ValueOperation + 'static)>;
}
