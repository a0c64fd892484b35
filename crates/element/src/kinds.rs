//! Handler kind markers and the registry bundle a tree consults.

use loupe_registry::{HandlerDef, HandlerKind, HandlerRegistry, OrderPriority};

use crate::handlers::{Drawer, PostProcessor, VisualBuilder, VisualProcessor};
use crate::resolvers::{
	AttributeResolver, DrawerChainResolver, PostChainResolver, StructureResolver, ValueOperationResolver,
	VisualBuilderResolver, VisualChainResolver,
};

macro_rules! declare_kind {
	($(#[$meta:meta])* $kind:ident => $reg:ident, $instance:ty, $label:literal) => {
		$(#[$meta])*
		pub struct $kind;

		impl HandlerKind for $kind {
			type Instance = $instance;
			const LABEL: &'static str = $label;
		}

		/// Inventory wrapper gathering definitions of this kind at link
		/// time. Feed collected entries through [`Registries::collected`].
		pub struct $reg(pub &'static HandlerDef<$kind>);

		inventory::collect!($reg);
	};
}

declare_kind!(
	/// Immediate-mode drawers.
	DrawerKind => DrawerReg, dyn Drawer, "drawer"
);
declare_kind!(
	/// Post-refresh processors.
	PostProcessorKind => PostProcessorReg, dyn PostProcessor, "post-processor"
);
declare_kind!(
	/// Retained-mode visual builders.
	VisualBuilderKind => VisualBuilderReg, dyn VisualBuilder, "visual-builder"
);
declare_kind!(
	/// Retained-mode visual decorators.
	VisualProcessorKind => VisualProcessorReg, dyn VisualProcessor, "visual-processor"
);
declare_kind!(StructureResolverKind => StructureResolverReg, dyn StructureResolver, "structure-resolver");
declare_kind!(AttributeResolverKind => AttributeResolverReg, dyn AttributeResolver, "attribute-resolver");
declare_kind!(DrawerChainResolverKind => DrawerChainResolverReg, dyn DrawerChainResolver, "drawer-chain-resolver");
declare_kind!(PostChainResolverKind => PostChainResolverReg, dyn PostChainResolver, "post-chain-resolver");
declare_kind!(VisualBuilderResolverKind => VisualBuilderResolverReg, dyn VisualBuilderResolver, "visual-builder-resolver");
declare_kind!(VisualChainResolverKind => VisualChainResolverReg, dyn VisualChainResolver, "visual-chain-resolver");
declare_kind!(ValueOperationResolverKind => ValueOperationResolverReg, dyn ValueOperationResolver, "value-operation-resolver");

/// Every registry one tree consults, one per capability family.
///
/// Plain owned data: hosts and tests hold independent bundles, and nothing
/// here is global. Registration happens either through the inventory
/// collections ([`Registries::collected`]) or explicitly against the
/// public fields.
#[derive(Default)]
pub struct Registries {
	pub drawers: HandlerRegistry<DrawerKind>,
	pub post_processors: HandlerRegistry<PostProcessorKind>,
	pub visual_builders: HandlerRegistry<VisualBuilderKind>,
	pub visual_processors: HandlerRegistry<VisualProcessorKind>,
	pub structure_resolvers: HandlerRegistry<StructureResolverKind>,
	pub attribute_resolvers: HandlerRegistry<AttributeResolverKind>,
	pub drawer_chain_resolvers: HandlerRegistry<DrawerChainResolverKind>,
	pub post_chain_resolvers: HandlerRegistry<PostChainResolverKind>,
	pub visual_builder_resolvers: HandlerRegistry<VisualBuilderResolverKind>,
	pub visual_chain_resolvers: HandlerRegistry<VisualChainResolverKind>,
	pub value_op_resolvers: HandlerRegistry<ValueOperationResolverKind>,
}

impl Registries {
	/// Completely empty registries, no fallbacks, no defaults.
	pub fn new() -> Self {
		Self::default()
	}

	/// Empty registries plus the built-in defaults, registered explicitly.
	/// Use this when inventory contributions from the linked host are
	/// unwanted (tests, embedded tools).
	pub fn with_builtins() -> Self {
		let registries = Self::new();
		registries.install_priority_fallbacks();
		crate::builtins::install(&registries);
		registries
	}

	/// Registries fed from the inventory collections, which include the
	/// built-in defaults and everything the linked host submitted.
	pub fn collected() -> Self {
		let registries = Self::new();
		registries.install_priority_fallbacks();
		registries.drawers.extend_canonical(inventory::iter::<DrawerReg>.into_iter().map(|reg| reg.0));
		registries
			.post_processors
			.extend_canonical(inventory::iter::<PostProcessorReg>.into_iter().map(|reg| reg.0));
		registries
			.visual_builders
			.extend_canonical(inventory::iter::<VisualBuilderReg>.into_iter().map(|reg| reg.0));
		registries
			.visual_processors
			.extend_canonical(inventory::iter::<VisualProcessorReg>.into_iter().map(|reg| reg.0));
		registries
			.structure_resolvers
			.extend_canonical(inventory::iter::<StructureResolverReg>.into_iter().map(|reg| reg.0));
		registries
			.attribute_resolvers
			.extend_canonical(inventory::iter::<AttributeResolverReg>.into_iter().map(|reg| reg.0));
		registries
			.drawer_chain_resolvers
			.extend_canonical(inventory::iter::<DrawerChainResolverReg>.into_iter().map(|reg| reg.0));
		registries
			.post_chain_resolvers
			.extend_canonical(inventory::iter::<PostChainResolverReg>.into_iter().map(|reg| reg.0));
		registries
			.visual_builder_resolvers
			.extend_canonical(inventory::iter::<VisualBuilderResolverReg>.into_iter().map(|reg| reg.0));
		registries
			.visual_chain_resolvers
			.extend_canonical(inventory::iter::<VisualChainResolverReg>.into_iter().map(|reg| reg.0));
		registries
			.value_op_resolvers
			.extend_canonical(inventory::iter::<ValueOperationResolverReg>.into_iter().map(|reg| reg.0));
		registries
	}

	/// Installs the constraint-genus fallback on the handler families that
	/// draw per value or per attribute: pair-constrained definitions rank
	/// at the attribute level, single-slot ones at the value level.
	fn install_priority_fallbacks(&self) {
		self.drawers.add_fallback_priority(genus_priority);
		self.visual_builders.add_fallback_priority(genus_priority);
		self.visual_processors.add_fallback_priority(genus_priority);
	}
}

fn genus_priority<K: HandlerKind>(def: &HandlerDef<K>) -> Option<OrderPriority> {
	let sig = def.constraints.resolve()?;
	match sig.arity() {
		2 => Some(OrderPriority::ATTRIBUTE),
		1 => Some(OrderPriority::VALUE),
		_ => None,
	}
}

/// Registry lookup by kind, which is what lets [`crate::ResolverFactory`]
/// stay a single generic type over seven families.
pub trait HasRegistry<K: HandlerKind> {
	fn registry(&self) -> &HandlerRegistry<K>;
}

macro_rules! impl_has_registry {
	($($kind:ty => $field:ident),+ $(,)?) => {
		$(impl HasRegistry<$kind> for Registries {
			fn registry(&self) -> &HandlerRegistry<$kind> {
				&self.$field
			}
		})+
	};
}

impl_has_registry! {
	DrawerKind => drawers,
	PostProcessorKind => post_processors,
	VisualBuilderKind => visual_builders,
	VisualProcessorKind => visual_processors,
	StructureResolverKind => structure_resolvers,
	AttributeResolverKind => attribute_resolvers,
	DrawerChainResolverKind => drawer_chain_resolvers,
	PostChainResolverKind => post_chain_resolvers,
	VisualBuilderResolverKind => visual_builder_resolvers,
	VisualChainResolverKind => visual_chain_resolvers,
	ValueOperationResolverKind => value_op_resolvers,
}

#[cfg(test)]
mod tests {
	use loupe_registry::{ConstraintSig, ConstraintSlot, ConstraintsDecl, TypeKey};

	use super::*;
	use crate::SubjectView;

	trait Probe {}

	struct ProbeKind;

	impl HandlerKind for ProbeKind {
		type Instance = dyn Probe;
		const LABEL: &'static str = "probe";
	}

	#[derive(Default)]
	struct Inert;

	impl Probe for Inert {}

	#[derive(Default)]
	struct Dormant;

	impl Probe for Dormant {}

	struct Marker;

	fn construct_probe<H: Probe + Default + 'static>() -> Box<dyn Probe> {
		Box::new(H::default())
	}

	fn probe_def<H: Probe + Default + 'static>(
		id: &'static str,
		priority: Option<OrderPriority>,
		constraints: ConstraintsDecl,
	) -> &'static HandlerDef<ProbeKind> {
		Box::leak(Box::new(HandlerDef {
			id,
			handler_type: TypeKey::of::<H>,
			priority,
			constraints,
			can_handle: |_| true,
			construct: construct_probe::<H>,
		}))
	}

	fn sig_value_f32() -> ConstraintSig {
		ConstraintSig::is::<f32>()
	}

	fn sig_pair_marker_f32() -> ConstraintSig {
		ConstraintSig::pair::<Marker, f32>()
	}

	fn sig_arity_three() -> ConstraintSig {
		let mut sig = ConstraintSig::pair::<Marker, f32>();
		sig.push(ConstraintSlot::Any);
		sig
	}

	#[test]
	fn genus_priority_follows_constraint_arity() {
		let pair = probe_def::<Inert>("probe.pair", None, ConstraintsDecl::Signature(sig_pair_marker_f32));
		assert_eq!(genus_priority(pair), Some(OrderPriority::ATTRIBUTE));

		let value = probe_def::<Inert>("probe.value", None, ConstraintsDecl::Signature(sig_value_f32));
		assert_eq!(genus_priority(value), Some(OrderPriority::VALUE));

		let wildcard = probe_def::<Inert>("probe.wildcard", None, ConstraintsDecl::Wildcard);
		assert_eq!(genus_priority(wildcard), None, "wildcards get no genus rank");

		let triple = probe_def::<Inert>("probe.triple", None, ConstraintsDecl::Signature(sig_arity_three));
		assert_eq!(genus_priority(triple), None, "exotic arities stay unranked");
	}

	#[test]
	fn installed_fallback_re_ranks_unprioritized_definitions() {
		let registry = HandlerRegistry::<ProbeKind>::new();
		registry.add_fallback_priority(genus_priority);
		registry
			.add(probe_def::<Inert>(
				"probe.pinned-low",
				Some(OrderPriority::LOWEST),
				ConstraintsDecl::Signature(sig_pair_marker_f32),
			))
			.unwrap();
		registry
			.add(probe_def::<Dormant>("probe.genus-ranked", None, ConstraintsDecl::Signature(sig_pair_marker_f32)))
			.unwrap();

		let attrs = [TypeKey::of::<Marker>()];
		let subject = SubjectView::new(Some(TypeKey::of::<f32>()), &attrs, &[]);
		let ids: Vec<&str> = registry.all_matching(&subject).into_iter().map(|resolved| resolved.def.id).collect();
		assert_eq!(
			ids,
			vec!["probe.genus-ranked", "probe.pinned-low"],
			"the genus rank must beat an explicit rock-bottom priority"
		);
	}
}
