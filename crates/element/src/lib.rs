//! Element lifecycle: the tree of inspected elements, their phase state
//! machine, pooled resolvers, and the draw/post-process drivers.
//!
//! An [`ElementTree`] owns arena-allocated elements described by immutable
//! [`Definition`]s. Each element moves through a validated phase bit-set
//! ([`ElementPhases`]) as it refreshes, post-processes, and draws. All
//! per-element behavior (child structure, effective attributes, drawer
//! and processor chains, value transfer, retained visuals) comes from
//! handlers resolved through `loupe-registry` and pooled per family by
//! [`ResolverFactory`]. Mutations requested mid-pass defer to a FIFO queue
//! drained when the outermost pass unwinds.
//!
//! Hosts register handlers with the `register_*` macros (gathered through
//! [`Registries::collected`]) or explicitly against [`Registries`] fields.

mod arena;
mod attribute;
mod builtins;
mod chain;
mod context;
mod definition;
mod error;
mod events;
mod factory;
mod handlers;
mod kinds;
mod label;
mod macros;
mod phase;
mod pool;
mod queue;
mod resolvers;
mod tree;
mod value;
mod visual;

pub use arena::ElementId;
pub use attribute::{AttributeInfo, AttributeSource};
pub use builtins::{
	DefaultAttributeResolver, DefaultDrawer, DefaultDrawerChainResolver, DefaultPostChainResolver,
	DefaultStructureResolver, DefaultValueOperationResolver, DefaultVisualBuilder, DefaultVisualBuilderResolver,
	DefaultVisualChainResolver,
};
pub use chain::{Chain, DrawerChain, PostChain, VisualChain};
pub use context::{ElementCx, SubjectView};
pub use definition::{Definition, RefreshPolicy, Shape, ValueAccessor};
pub use error::ElementError;
pub use events::{EventSink, TreeEvent};
pub use factory::{Factories, ResolverFactory};
pub use handlers::{Drawer, PostProcessor, VisualBuilder, VisualProcessor};
pub use kinds::{
	AttributeResolverKind, AttributeResolverReg, DrawerChainResolverKind, DrawerChainResolverReg, DrawerKind,
	DrawerReg, HasRegistry, PostChainResolverKind, PostChainResolverReg, PostProcessorKind, PostProcessorReg,
	Registries, StructureResolverKind, StructureResolverReg, ValueOperationResolverKind, ValueOperationResolverReg,
	VisualBuilderKind, VisualBuilderReg, VisualBuilderResolverKind, VisualBuilderResolverReg, VisualChainResolverKind,
	VisualChainResolverReg, VisualProcessorKind, VisualProcessorReg,
};
pub use label::nicify;
pub use phase::{ElementPhases, PhaseError, PhaseEvent};
pub use pool::{PoolItem, PoolStats, PoolTicket, ResolverPool};
pub use queue::TreeWork;
pub use resolvers::{
	AttributeResolver, DrawerChainResolver, PostChainResolver, StructureResolver, ValueOperationResolver,
	VisualBuilderResolver, VisualChainResolver,
};
pub use tree::{DrawPass, ElementTree, ProcessPass};
pub use value::{GenericValueOperation, ValueOperation, ValueState};
pub use visual::{BackendMode, BasicVisual, VisualHandle, VisualNode};

pub use loupe_registry::{
	Conformance, ConstraintSig, ConstraintSlot, ConstraintsDecl, EmptySubject, HandlerDef, HandlerId, HandlerKind,
	HandlerRegistry, OrderPriority, RegistryError, Resolved, Subject, SubjectExt, TypeKey,
};

#[doc(hidden)]
pub mod __private {
	pub use inventory;
	pub use paste::paste;
}

#[cfg(test)]
mod tests;
