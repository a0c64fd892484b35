use std::sync::Arc;

use loupe_registry::{HandlerKind, Subject};

use crate::kinds::{
	AttributeResolverKind, DrawerChainResolverKind, HasRegistry, PostChainResolverKind, Registries,
	StructureResolverKind, ValueOperationResolverKind, VisualBuilderResolverKind, VisualChainResolverKind,
};
use crate::pool::{PoolItem, PoolStats, PoolTicket, ResolverPool};

/// Resolves and pools instances of one resolver family.
///
/// The factory is the only way elements obtain resolvers: resolution picks
/// the definition, the pool provides the instance, and the ticket ties the
/// two together until release.
pub struct ResolverFactory<K: HandlerKind> {
	registries: Arc<Registries>,
	pool: ResolverPool<K>,
}

impl<K: HandlerKind> ResolverFactory<K>
where
	K::Instance: PoolItem,
	Registries: HasRegistry<K>,
{
	pub fn new(registries: Arc<Registries>) -> Self {
		Self {
			registries,
			pool: ResolverPool::new(),
		}
	}

	/// Resolves the best definition for `subject` and rents an instance of
	/// it. `None` means no handler of this family applies; callers treat
	/// the capability as absent.
	pub fn create_resolver(&mut self, subject: &dyn Subject) -> Option<PoolTicket<K>> {
		let registry = <Registries as HasRegistry<K>>::registry(&self.registries);
		let resolved = registry.first_matching(subject)?;
		Some(self.pool.rent(resolved))
	}

	pub fn release(&mut self, ticket: PoolTicket<K>) {
		self.pool.release(ticket);
	}

	pub fn checkout(&mut self, ticket: &PoolTicket<K>) -> Box<K::Instance> {
		self.pool.checkout(ticket)
	}

	pub fn restore(&mut self, ticket: &PoolTicket<K>, instance: Box<K::Instance>) {
		self.pool.restore(ticket, instance);
	}

	pub fn stats(&self) -> PoolStats {
		self.pool.stats()
	}
}

/// One factory per resolver family, all sharing the tree's registries.
pub struct Factories {
	pub structure: ResolverFactory<StructureResolverKind>,
	pub attribute: ResolverFactory<AttributeResolverKind>,
	pub drawer_chain: ResolverFactory<DrawerChainResolverKind>,
	pub post_chain: ResolverFactory<PostChainResolverKind>,
	pub visual_builder: ResolverFactory<VisualBuilderResolverKind>,
	pub visual_chain: ResolverFactory<VisualChainResolverKind>,
	pub value_op: ResolverFactory<ValueOperationResolverKind>,
}

impl Factories {
	pub fn new(registries: &Arc<Registries>) -> Self {
		Self {
			structure: ResolverFactory::new(Arc::clone(registries)),
			attribute: ResolverFactory::new(Arc::clone(registries)),
			drawer_chain: ResolverFactory::new(Arc::clone(registries)),
			post_chain: ResolverFactory::new(Arc::clone(registries)),
			visual_builder: ResolverFactory::new(Arc::clone(registries)),
			visual_chain: ResolverFactory::new(Arc::clone(registries)),
			value_op: ResolverFactory::new(Arc::clone(registries)),
		}
	}
}
