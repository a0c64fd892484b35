//! Built-in defaults: the handlers every tree falls back to when nothing
//! registered ranks higher.
//!
//! All of them sit at [`OrderPriority::LOWEST`] with wildcard constraints,
//! so any host registration with an explicit or genus-derived priority
//! outranks them. They are submitted to inventory like any host handler
//! and additionally installed explicitly by
//! [`Registries::with_builtins`](crate::Registries::with_builtins).

use loupe_registry::{ConstraintsDecl, OrderPriority, Subject};

use crate::attribute::AttributeInfo;
use crate::chain::{DrawerChain, PostChain, VisualChain};
use crate::context::ElementCx;
use crate::definition::Definition;
use crate::error::ElementError;
use crate::handlers::{Drawer, VisualBuilder};
use crate::kinds::Registries;
use crate::label::nicify;
use crate::pool::PoolItem;
use crate::resolvers::{
	AttributeResolver, DrawerChainResolver, PostChainResolver, StructureResolver, ValueOperationResolver,
	VisualBuilderResolver, VisualChainResolver,
};
use crate::tree::DrawPass;
use crate::value::{GenericValueOperation, ValueOperation};
use crate::visual::{BasicVisual, VisualHandle};

/// Tail of every drawer chain: paints nothing itself, recurses into the
/// element's children. Overriding drawers that still want the children
/// painted forward to it via the chain.
#[derive(Default)]
pub struct DefaultDrawer;

impl Drawer for DefaultDrawer {
	fn draw(&mut self, pass: &mut DrawPass<'_, '_>, chain: &mut DrawerChain) -> Result<(), ElementError> {
		pass.draw_children()?;
		chain.call_next(pass)
	}
}

crate::register_drawer!(DefaultDrawer {
	id: "loupe.drawer.default",
	constraints: ConstraintsDecl::Wildcard,
	priority: Some(OrderPriority::LOWEST),
});

/// Produces a plain [`BasicVisual`] labelled with the nicified definition
/// name.
#[derive(Default)]
pub struct DefaultVisualBuilder;

impl VisualBuilder for DefaultVisualBuilder {
	fn build(&mut self, cx: &ElementCx<'_>) -> VisualHandle {
		VisualHandle::new(BasicVisual::new(nicify(cx.definition.name())))
	}
}

crate::register_visual_builder!(DefaultVisualBuilder {
	id: "loupe.visual-builder.default",
	constraints: ConstraintsDecl::Wildcard,
	priority: Some(OrderPriority::LOWEST),
});

/// Children come straight from the definition.
#[derive(Default)]
pub struct DefaultStructureResolver {
	children: Option<Vec<Definition>>,
}

impl PoolItem for DefaultStructureResolver {
	fn on_release(&mut self) {
		self.children = None;
	}
}

impl StructureResolver for DefaultStructureResolver {
	fn children(&mut self, cx: &ElementCx<'_>) -> &[Definition] {
		self.children.get_or_insert_with(|| cx.definition.children().to_vec()).as_slice()
	}
}

crate::handler_def! {
	kind: crate::StructureResolverKind,
	reg: crate::StructureResolverReg,
	handler: DefaultStructureResolver,
	id: "loupe.resolver.structure.default",
	priority: Some(OrderPriority::LOWEST),
	constraints: ConstraintsDecl::Wildcard,
	can_handle: |_| true,
}

/// Declared attributes first, inherited propagating attributes after, so
/// a direct declaration shadows an inherited one under the subject view's
/// first-match lookup.
#[derive(Default)]
pub struct DefaultAttributeResolver {
	attrs: Option<Vec<AttributeInfo>>,
}

impl PoolItem for DefaultAttributeResolver {
	fn on_release(&mut self) {
		self.attrs = None;
	}
}

impl AttributeResolver for DefaultAttributeResolver {
	fn attributes(&mut self, cx: &ElementCx<'_>) -> &[AttributeInfo] {
		self.attrs
			.get_or_insert_with(|| {
				let mut attrs = cx.definition.attributes().to_vec();
				attrs.extend(cx.inherited.iter().cloned());
				attrs
			})
			.as_slice()
	}
}

crate::handler_def! {
	kind: crate::AttributeResolverKind,
	reg: crate::AttributeResolverReg,
	handler: DefaultAttributeResolver,
	id: "loupe.resolver.attribute.default",
	priority: Some(OrderPriority::LOWEST),
	constraints: ConstraintsDecl::Wildcard,
	can_handle: |_| true,
}

/// Assembles the drawer chain from every drawer matching the subject, in
/// registry rank order.
#[derive(Default)]
pub struct DefaultDrawerChainResolver {
	chain: Option<DrawerChain>,
}

impl PoolItem for DefaultDrawerChainResolver {
	fn on_release(&mut self) {
		self.chain = None;
	}
}

impl DrawerChainResolver for DefaultDrawerChainResolver {
	fn chain(&mut self, cx: &ElementCx<'_>) -> &mut DrawerChain {
		self.chain.get_or_insert_with(|| {
			let drawers = cx
				.registries
				.drawers
				.all_matching(&cx.subject)
				.into_iter()
				.map(|resolved| (resolved.def.construct)())
				.collect();
			DrawerChain::new(drawers)
		})
	}
}

crate::handler_def! {
	kind: crate::DrawerChainResolverKind,
	reg: crate::DrawerChainResolverReg,
	handler: DefaultDrawerChainResolver,
	id: "loupe.resolver.drawer-chain.default",
	priority: Some(OrderPriority::LOWEST),
	constraints: ConstraintsDecl::Wildcard,
	can_handle: |_| true,
}

#[derive(Default)]
pub struct DefaultPostChainResolver {
	chain: Option<PostChain>,
}

impl PoolItem for DefaultPostChainResolver {
	fn on_release(&mut self) {
		self.chain = None;
	}
}

impl PostChainResolver for DefaultPostChainResolver {
	fn chain(&mut self, cx: &ElementCx<'_>) -> &mut PostChain {
		self.chain.get_or_insert_with(|| {
			let processors = cx
				.registries
				.post_processors
				.all_matching(&cx.subject)
				.into_iter()
				.map(|resolved| (resolved.def.construct)())
				.collect();
			PostChain::new(processors)
		})
	}
}

crate::handler_def! {
	kind: crate::PostChainResolverKind,
	reg: crate::PostChainResolverReg,
	handler: DefaultPostChainResolver,
	id: "loupe.resolver.post-chain.default",
	priority: Some(OrderPriority::LOWEST),
	constraints: ConstraintsDecl::Wildcard,
	can_handle: |_| true,
}

/// Picks the best-ranked visual builder for the subject, if any.
#[derive(Default)]
pub struct DefaultVisualBuilderResolver {
	builder: Option<Box<dyn VisualBuilder>>,
	resolved: bool,
}

impl PoolItem for DefaultVisualBuilderResolver {
	fn on_release(&mut self) {
		self.builder = None;
		self.resolved = false;
	}
}

impl VisualBuilderResolver for DefaultVisualBuilderResolver {
	fn builder(&mut self, cx: &ElementCx<'_>) -> Option<&mut (dyn VisualBuilder + 'static)> {
		if !self.resolved {
			self.builder = cx
				.registries
				.visual_builders
				.first_matching(&cx.subject)
				.map(|resolved| (resolved.def.construct)());
			self.resolved = true;
		}
		self.builder.as_deref_mut()
	}
}

crate::handler_def! {
	kind: crate::VisualBuilderResolverKind,
	reg: crate::VisualBuilderResolverReg,
	handler: DefaultVisualBuilderResolver,
	id: "loupe.resolver.visual-builder.default",
	priority: Some(OrderPriority::LOWEST),
	constraints: ConstraintsDecl::Wildcard,
	can_handle: |_| true,
}

#[derive(Default)]
pub struct DefaultVisualChainResolver {
	chain: Option<VisualChain>,
}

impl PoolItem for DefaultVisualChainResolver {
	fn on_release(&mut self) {
		self.chain = None;
	}
}

impl VisualChainResolver for DefaultVisualChainResolver {
	fn chain(&mut self, cx: &ElementCx<'_>) -> &mut VisualChain {
		self.chain.get_or_insert_with(|| {
			let processors = cx
				.registries
				.visual_processors
				.all_matching(&cx.subject)
				.into_iter()
				.map(|resolved| (resolved.def.construct)())
				.collect();
			VisualChain::new(processors)
		})
	}
}

crate::handler_def! {
	kind: crate::VisualChainResolverKind,
	reg: crate::VisualChainResolverReg,
	handler: DefaultVisualChainResolver,
	id: "loupe.resolver.visual-chain.default",
	priority: Some(OrderPriority::LOWEST),
	constraints: ConstraintsDecl::Wildcard,
	can_handle: |_| true,
}

/// Hands out [`GenericValueOperation`] for value-shaped subjects, nothing
/// for the rest.
#[derive(Default)]
pub struct DefaultValueOperationResolver {
	operation: Option<Box<dyn ValueOperation>>,
	resolved: bool,
}

impl PoolItem for DefaultValueOperationResolver {
	fn on_release(&mut self) {
		self.operation = None;
		self.resolved = false;
	}
}

impl ValueOperationResolver for DefaultValueOperationResolver {
	fn operation(&mut self, cx: &ElementCx<'_>) -> Option<&mut (dyn ValueOperation + 'static)> {
		if !self.resolved {
			if cx.subject.value_type().is_some() {
				self.operation = Some(Box::new(GenericValueOperation));
			}
			self.resolved = true;
		}
		self.operation.as_deref_mut()
	}
}

crate::handler_def! {
	kind: crate::ValueOperationResolverKind,
	reg: crate::ValueOperationResolverReg,
	handler: DefaultValueOperationResolver,
	id: "loupe.resolver.value-op.default",
	priority: Some(OrderPriority::LOWEST),
	constraints: ConstraintsDecl::Wildcard,
	can_handle: |_| true,
}

/// Registers every default above directly, bypassing inventory.
pub(crate) fn install(registries: &Registries) {
	registries.drawers.extend_canonical([&DEFAULT_DRAWER_DEF]);
	registries.visual_builders.extend_canonical([&DEFAULT_VISUAL_BUILDER_DEF]);
	registries.structure_resolvers.extend_canonical([&DEFAULT_STRUCTURE_RESOLVER_DEF]);
	registries.attribute_resolvers.extend_canonical([&DEFAULT_ATTRIBUTE_RESOLVER_DEF]);
	registries.drawer_chain_resolvers.extend_canonical([&DEFAULT_DRAWER_CHAIN_RESOLVER_DEF]);
	registries.post_chain_resolvers.extend_canonical([&DEFAULT_POST_CHAIN_RESOLVER_DEF]);
	registries.visual_builder_resolvers.extend_canonical([&DEFAULT_VISUAL_BUILDER_RESOLVER_DEF]);
	registries.visual_chain_resolvers.extend_canonical([&DEFAULT_VISUAL_CHAIN_RESOLVER_DEF]);
	registries.value_op_resolvers.extend_canonical([&DEFAULT_VALUE_OPERATION_RESOLVER_DEF]);
}
