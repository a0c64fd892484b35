use std::any::Any;
use std::fmt;
use std::rc::Rc;

use loupe_matcher::TypeKey;

use crate::attribute::AttributeInfo;

/// Whether an element refreshes again after its first refresh.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum RefreshPolicy {
	#[default]
	Always,
	/// Later refresh requests are ignored once the element has refreshed.
	Once,
}

/// Typed access to the host data a value element wraps. The equality
/// function is captured with the concrete type so change detection works
/// without `PartialEq` on `dyn Any`.
#[derive(Clone)]
pub struct ValueAccessor {
	get: Rc<dyn Fn() -> Rc<dyn Any>>,
	set: Option<Rc<dyn Fn(&dyn Any) -> bool>>,
	eq: Rc<dyn Fn(&dyn Any, &dyn Any) -> bool>,
}

impl ValueAccessor {
	pub fn reader<T, G>(get: G) -> Self
	where
		T: PartialEq + 'static,
		G: Fn() -> T + 'static,
	{
		Self {
			get: Rc::new(move || Rc::new(get()) as Rc<dyn Any>),
			set: None,
			eq: Rc::new(Self::typed_eq::<T>),
		}
	}

	pub fn read_write<T, G, S>(get: G, set: S) -> Self
	where
		T: PartialEq + Clone + 'static,
		G: Fn() -> T + 'static,
		S: Fn(T) + 'static,
	{
		Self {
			get: Rc::new(move || Rc::new(get()) as Rc<dyn Any>),
			set: Some(Rc::new(move |value: &dyn Any| match value.downcast_ref::<T>() {
				Some(value) => {
					set(value.clone());
					true
				}
				None => false,
			})),
			eq: Rc::new(Self::typed_eq::<T>),
		}
	}

	fn typed_eq<T: PartialEq + 'static>(a: &dyn Any, b: &dyn Any) -> bool {
		match (a.downcast_ref::<T>(), b.downcast_ref::<T>()) {
			(Some(a), Some(b)) => a == b,
			_ => false,
		}
	}

	pub fn get(&self) -> Rc<dyn Any> {
		(self.get)()
	}

	/// Writes through to the host. `false` means rejected: the accessor is
	/// read-only or the payload type does not match.
	pub fn set(&self, value: &dyn Any) -> bool {
		match &self.set {
			Some(set) => set(value),
			None => false,
		}
	}

	pub fn is_writable(&self) -> bool {
		self.set.is_some()
	}

	pub fn values_equal(&self, a: &dyn Any, b: &dyn Any) -> bool {
		(self.eq)(a, b)
	}
}

impl fmt::Debug for ValueAccessor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ValueAccessor").field("writable", &self.is_writable()).finish()
	}
}

/// Structural species of an element.
#[derive(Clone)]
pub enum Shape {
	Root,
	Group,
	Value { key: TypeKey, accessor: Option<ValueAccessor> },
}

impl Shape {
	pub fn value_type(&self) -> Option<TypeKey> {
		match self {
			Shape::Value { key, .. } => Some(*key),
			_ => None,
		}
	}
}

impl fmt::Debug for Shape {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Shape::Root => f.write_str("Root"),
			Shape::Group => f.write_str("Group"),
			Shape::Value { key, .. } => f.debug_tuple("Value").field(key).finish(),
		}
	}
}

/// Immutable element descriptor: what the element is, which attributes it
/// carries, and which children the default structure resolver provisions.
/// Cloning is cheap; attribute payloads and accessors are shared.
#[derive(Clone, Debug)]
pub struct Definition {
	name: String,
	shape: Shape,
	attributes: Vec<AttributeInfo>,
	children: Vec<Definition>,
	refresh: RefreshPolicy,
}

impl Definition {
	pub fn root() -> Self {
		Self::with_shape("root", Shape::Root)
	}

	pub fn group(name: impl Into<String>) -> Self {
		Self::with_shape(name, Shape::Group)
	}

	/// Value element without an accessor; it matches on its value type but
	/// no value operation can pull from it.
	pub fn value<T: 'static>(name: impl Into<String>) -> Self {
		Self::with_shape(
			name,
			Shape::Value {
				key: TypeKey::of::<T>(),
				accessor: None,
			},
		)
	}

	pub fn value_with<T: PartialEq + 'static>(name: impl Into<String>, get: impl Fn() -> T + 'static) -> Self {
		Self::with_shape(
			name,
			Shape::Value {
				key: TypeKey::of::<T>(),
				accessor: Some(ValueAccessor::reader(get)),
			},
		)
	}

	pub fn value_read_write<T: PartialEq + Clone + 'static>(
		name: impl Into<String>,
		get: impl Fn() -> T + 'static,
		set: impl Fn(T) + 'static,
	) -> Self {
		Self::with_shape(
			name,
			Shape::Value {
				key: TypeKey::of::<T>(),
				accessor: Some(ValueAccessor::read_write(get, set)),
			},
		)
	}

	fn with_shape(name: impl Into<String>, shape: Shape) -> Self {
		Self {
			name: name.into(),
			shape,
			attributes: Vec::new(),
			children: Vec::new(),
			refresh: RefreshPolicy::default(),
		}
	}

	pub fn with_attribute<A: 'static>(mut self, payload: A) -> Self {
		self.attributes.push(AttributeInfo::direct(payload));
		self
	}

	/// Attribute that also flows down to children provisioned under this
	/// element.
	pub fn with_propagating_attribute<A: 'static>(mut self, payload: A) -> Self {
		self.attributes.push(AttributeInfo::propagating(payload));
		self
	}

	pub fn with_child(mut self, child: Definition) -> Self {
		self.children.push(child);
		self
	}

	pub fn with_children(mut self, children: impl IntoIterator<Item = Definition>) -> Self {
		self.children.extend(children);
		self
	}

	pub fn with_refresh_policy(mut self, refresh: RefreshPolicy) -> Self {
		self.refresh = refresh;
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn shape(&self) -> &Shape {
		&self.shape
	}

	pub fn attributes(&self) -> &[AttributeInfo] {
		&self.attributes
	}

	pub fn children(&self) -> &[Definition] {
		&self.children
	}

	pub fn refresh_policy(&self) -> RefreshPolicy {
		self.refresh
	}

	pub fn value_type(&self) -> Option<TypeKey> {
		self.shape.value_type()
	}

	pub fn accessor(&self) -> Option<&ValueAccessor> {
		match &self.shape {
			Shape::Value { accessor, .. } => accessor.as_ref(),
			_ => None,
		}
	}

	pub fn can_have_children(&self) -> bool {
		matches!(self.shape, Shape::Root | Shape::Group) || !self.children.is_empty()
	}

	pub fn attribute_keys(&self) -> Vec<TypeKey> {
		self.attributes.iter().map(AttributeInfo::key).collect()
	}
}
