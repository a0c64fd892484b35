use std::any::Any;

use loupe_matcher::TypeKey;

/// What handler matching may observe about an element.
///
/// Implementations are cheap views; the registry never stores one. All
/// methods have defaults so a bare subject (no value, no attributes) is a
/// valid one-liner.
pub trait Subject {
	/// Type of the wrapped value, if the subject wraps one.
	fn value_type(&self) -> Option<TypeKey> {
		None
	}

	/// Attribute type keys in declaration order. The order decides query
	/// vector order and therefore merged result order.
	fn attribute_types(&self) -> &[TypeKey] {
		&[]
	}

	/// Payload of the attribute with the given type key, for capability
	/// checks that inspect attribute data.
	fn attribute_raw(&self, key: TypeKey) -> Option<&dyn Any> {
		let _ = key;
		None
	}
}

/// Typed conveniences over [`Subject`]. Blanket-implemented; not object
/// safe, so it stays separate from the core trait.
pub trait SubjectExt: Subject {
	fn attribute<T: 'static>(&self) -> Option<&T> {
		self.attribute_raw(TypeKey::of::<T>())?.downcast_ref::<T>()
	}

	fn has_attribute<T: 'static>(&self) -> bool {
		self.attribute_types().contains(&TypeKey::of::<T>())
	}
}

impl<S: Subject + ?Sized> SubjectExt for S {}

/// Subject with no value and no attributes; matches only wildcard and
/// empty-signature candidates.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptySubject;

impl Subject for EmptySubject {}
