use std::cell::OnceCell;

use loupe_matcher::TypeKey;
use smallvec::SmallVec;

use crate::arena::ElementId;
use crate::attribute::AttributeInfo;
use crate::definition::Definition;
use crate::kinds::{
	AttributeResolverKind, DrawerChainResolverKind, PostChainResolverKind, StructureResolverKind,
	ValueOperationResolverKind, VisualBuilderResolverKind, VisualChainResolverKind,
};
use crate::label::nicify;
use crate::phase::ElementPhases;
use crate::pool::PoolTicket;
use crate::value::ValueState;
use crate::visual::VisualHandle;

/// Pool tickets for the resolver families an element currently holds.
/// `None` means the family does not apply to this element, or the element
/// has not been provisioned yet.
#[derive(Default)]
pub(crate) struct ResolverSlots {
	pub structure: Option<PoolTicket<StructureResolverKind>>,
	pub attribute: Option<PoolTicket<AttributeResolverKind>>,
	pub drawer_chain: Option<PoolTicket<DrawerChainResolverKind>>,
	pub post_chain: Option<PoolTicket<PostChainResolverKind>>,
	pub visual_builder: Option<PoolTicket<VisualBuilderResolverKind>>,
	pub visual_chain: Option<PoolTicket<VisualChainResolverKind>>,
	pub value_op: Option<PoolTicket<ValueOperationResolverKind>>,
}

/// Arena payload for one element.
pub(crate) struct ElementNode {
	pub definition: Definition,
	pub parent: Option<ElementId>,
	pub children: Vec<ElementId>,
	pub phases: ElementPhases,
	/// Stamp of the pass that last updated this element; updates within
	/// one pass coalesce on it.
	pub last_update: Option<u64>,
	/// Whether the element has completed at least one refresh, which is
	/// what [`RefreshPolicy::Once`](crate::RefreshPolicy) keys on.
	pub first_refreshed: bool,
	label: OnceCell<String>,
	/// Attribute keys in attribute order, the shape the matcher wants.
	pub attr_keys: SmallVec<[TypeKey; 4]>,
	pub attrs: Vec<AttributeInfo>,
	/// The propagating subset of `attrs`, reframed for the children.
	pub propagated: Vec<AttributeInfo>,
	pub resolvers: ResolverSlots,
	pub value: ValueState,
	pub visual: Option<VisualHandle>,
}

impl ElementNode {
	pub fn new(definition: Definition, parent: Option<ElementId>) -> Self {
		let mut node = Self {
			definition,
			parent,
			children: Vec::new(),
			phases: ElementPhases::empty(),
			last_update: None,
			first_refreshed: false,
			label: OnceCell::new(),
			attr_keys: SmallVec::new(),
			attrs: Vec::new(),
			propagated: Vec::new(),
			resolvers: ResolverSlots::default(),
			value: ValueState::default(),
			visual: None,
		};
		node.reseed_attributes();
		node
	}

	/// Display label, nicified from the definition name on first use.
	pub fn label(&self) -> &str {
		self.label.get_or_init(|| nicify(self.definition.name()))
	}

	/// Replaces the effective attribute set and recomputes the derived
	/// views: the key list the matcher queries and the propagating subset
	/// the children inherit.
	pub fn set_attributes(&mut self, attrs: Vec<AttributeInfo>) {
		self.attr_keys = attrs.iter().map(AttributeInfo::key).collect();
		self.propagated = attrs.iter().filter(|attr| attr.propagates()).map(AttributeInfo::flowed_down).collect();
		self.attrs = attrs;
	}

	/// Drops whatever a resolver produced last refresh and goes back to
	/// the definition's declared attributes.
	pub fn reseed_attributes(&mut self) {
		self.set_attributes(self.definition.attributes().to_vec());
	}
}
