use std::any::Any;

use loupe_matcher::TypeKey;
use loupe_registry::Subject;

use crate::attribute::AttributeInfo;
use crate::definition::Definition;
use crate::kinds::Registries;
use crate::visual::BackendMode;

/// Matching view over one element's data: value type plus attribute set.
///
/// Borrowed straight out of the node, so building one per query costs
/// nothing. Attribute payload lookup is a linear scan; attribute sets are
/// a handful of entries.
#[derive(Clone, Copy)]
pub struct SubjectView<'a> {
	value_type: Option<TypeKey>,
	attr_keys: &'a [TypeKey],
	attrs: &'a [AttributeInfo],
}

impl<'a> SubjectView<'a> {
	pub fn new(value_type: Option<TypeKey>, attr_keys: &'a [TypeKey], attrs: &'a [AttributeInfo]) -> Self {
		Self {
			value_type,
			attr_keys,
			attrs,
		}
	}
}

impl Subject for SubjectView<'_> {
	fn value_type(&self) -> Option<TypeKey> {
		self.value_type
	}

	fn attribute_types(&self) -> &[TypeKey] {
		self.attr_keys
	}

	fn attribute_raw(&self, key: TypeKey) -> Option<&dyn Any> {
		self.attrs.iter().find(|attr| attr.key() == key).map(AttributeInfo::payload)
	}
}

/// Everything a resolver may consult while provisioning for one element.
///
/// Handed in per call; resolvers cache what they derive from it and drop
/// the cache in `on_release`.
pub struct ElementCx<'a> {
	pub definition: &'a Definition,
	pub subject: SubjectView<'a>,
	pub registries: &'a Registries,
	pub backend: BackendMode,
	/// Propagating attributes flowing down from the parent element, in
	/// ancestor declaration order.
	pub inherited: &'a [AttributeInfo],
}
