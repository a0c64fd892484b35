use std::any::{TypeId, type_name};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Runtime identity of a Rust type: the `TypeId` plus the static type name
/// for diagnostics. Equality, hashing, and ordering use the id only; two
/// keys for the same type always compare equal even across crate renames.
#[derive(Clone, Copy)]
pub struct TypeKey {
	id: TypeId,
	name: &'static str,
}

impl TypeKey {
	pub fn of<T: ?Sized + 'static>() -> Self {
		Self {
			id: TypeId::of::<T>(),
			name: type_name::<T>(),
		}
	}

	pub fn id(&self) -> TypeId {
		self.id
	}

	/// Fully qualified type name as the compiler spells it.
	pub fn name(&self) -> &'static str {
		self.name
	}

	/// Type name with module paths stripped, including inside generic
	/// arguments: `alloc::vec::Vec<core::string::String>` becomes
	/// `Vec<String>`.
	pub fn short_name(&self) -> String {
		let mut out = String::with_capacity(self.name.len());
		let mut ident = String::new();
		for ch in self.name.chars() {
			if ch == ':' {
				ident.clear();
			} else if ch.is_alphanumeric() || ch == '_' {
				ident.push(ch);
			} else {
				out.push_str(&ident);
				ident.clear();
				out.push(ch);
			}
		}
		out.push_str(&ident);
		out
	}
}

impl PartialEq for TypeKey {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id.hash(state);
	}
}

impl PartialOrd for TypeKey {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for TypeKey {
	fn cmp(&self, other: &Self) -> Ordering {
		self.id.cmp(&other.id)
	}
}

impl fmt::Debug for TypeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "TypeKey({})", self.short_name())
	}
}

impl fmt::Display for TypeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.short_name())
	}
}
