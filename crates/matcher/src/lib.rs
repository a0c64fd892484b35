//! Constraint-driven type matching.
//!
//! A [`TypeMatcher`] holds a ranked set of handler candidates, each with an
//! optional positional [`ConstraintSig`]. Callers probe it with *query
//! vectors* (slices of [`TypeKey`]) and merge the per-vector results into
//! one significance-ordered, deduplicated list. Ranking is priority
//! (descending) then registration index (ascending) and is deterministic by
//! construction.
//!
//! This crate knows nothing about handlers themselves; it ranks and matches
//! opaque type keys. The registry layer owns query-vector construction and
//! capability checks.

mod candidate;
mod key;
mod matcher;
mod priority;

pub use candidate::{ConstraintSig, ConstraintSlot, TypeMatchCandidate, TypeMatchResult};
pub use key::TypeKey;
pub use matcher::{Conformance, TypeMatcher};
pub use priority::OrderPriority;
