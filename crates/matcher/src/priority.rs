use std::fmt;

/// Dispatch priority. Higher values win; ties fall back to registration order.
///
/// The named levels leave wide gaps so hosts can slot relative adjustments
/// between them with [`OrderPriority::offset`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct OrderPriority(i32);

impl OrderPriority {
	/// Floor for handlers that should only match when nothing else does.
	pub const LOWEST: Self = Self(-100_000);
	/// Handlers keyed on the subject's value type.
	pub const VALUE: Self = Self(100_000);
	/// Handlers keyed on an attribute; these outrank plain value handlers.
	pub const ATTRIBUTE: Self = Self(200_000);
	/// Handlers that must run before everything else.
	pub const SUPER: Self = Self(300_000);
	/// Assigned when neither the definition nor any fallback names a priority.
	pub const DEFAULT: Self = Self::LOWEST;

	pub const fn new(raw: i32) -> Self {
		Self(raw)
	}

	pub const fn get(self) -> i32 {
		self.0
	}

	/// Relative adjustment, e.g. `OrderPriority::VALUE.offset(10)`.
	pub const fn offset(self, delta: i32) -> Self {
		Self(self.0 + delta)
	}
}

impl Default for OrderPriority {
	fn default() -> Self {
		Self::DEFAULT
	}
}

impl From<i32> for OrderPriority {
	fn from(raw: i32) -> Self {
		Self(raw)
	}
}

impl fmt::Display for OrderPriority {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn levels_are_strictly_ordered() {
		assert!(OrderPriority::LOWEST < OrderPriority::VALUE);
		assert!(OrderPriority::VALUE < OrderPriority::ATTRIBUTE);
		assert!(OrderPriority::ATTRIBUTE < OrderPriority::SUPER);
		assert_eq!(OrderPriority::DEFAULT, OrderPriority::LOWEST);
	}

	#[test]
	fn offset_shifts_within_a_level() {
		let p = OrderPriority::VALUE.offset(25);
		assert_eq!(p.get(), 100_025);
		assert!(p > OrderPriority::VALUE);
		assert!(p < OrderPriority::ATTRIBUTE);
	}
}
