use std::any::Any;
use std::fmt;
use std::rc::Rc;

use loupe_matcher::TypeKey;

/// Where an attribute on an element came from.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AttributeSource {
	/// Declared on the element's own definition.
	Direct,
	/// Flowed down from an ancestor that flagged it as propagating.
	Propagated,
}

/// One attribute instance on an element: an arbitrary shared payload plus
/// its type key. Payloads are immutable descriptors; sharing them through
/// `Rc` keeps definitions cheap to clone and lets propagated attributes
/// alias their ancestor's instance.
#[derive(Clone)]
pub struct AttributeInfo {
	payload: Rc<dyn Any>,
	key: TypeKey,
	source: AttributeSource,
	propagate: bool,
}

impl AttributeInfo {
	pub fn direct<A: 'static>(payload: A) -> Self {
		Self {
			payload: Rc::new(payload),
			key: TypeKey::of::<A>(),
			source: AttributeSource::Direct,
			propagate: false,
		}
	}

	/// Direct attribute that also flows to child elements.
	pub fn propagating<A: 'static>(payload: A) -> Self {
		Self {
			propagate: true,
			..Self::direct(payload)
		}
	}

	/// The same payload, reframed as inherited by a child element.
	pub(crate) fn flowed_down(&self) -> Self {
		Self {
			payload: Rc::clone(&self.payload),
			key: self.key,
			source: AttributeSource::Propagated,
			propagate: self.propagate,
		}
	}

	pub fn key(&self) -> TypeKey {
		self.key
	}

	pub fn source(&self) -> AttributeSource {
		self.source
	}

	pub fn propagates(&self) -> bool {
		self.propagate
	}

	pub fn payload(&self) -> &dyn Any {
		&*self.payload
	}

	pub fn downcast<T: 'static>(&self) -> Option<&T> {
		self.payload.downcast_ref::<T>()
	}
}

impl fmt::Debug for AttributeInfo {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AttributeInfo")
			.field("key", &self.key)
			.field("source", &self.source)
			.field("propagate", &self.propagate)
			.finish()
	}
}
