use thiserror::Error;

use crate::registry::MAX_QUERY_ARITY;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
	#[error("duplicate handler id `{id}`")]
	DuplicateId { id: &'static str },

	#[error("handler type `{type_name}` already registered (new id `{id}`)")]
	DuplicateType { id: &'static str, type_name: &'static str },

	#[error("constraint signature on `{id}` has arity {arity}, max is {MAX_QUERY_ARITY}")]
	ArityTooWide { id: &'static str, arity: usize },
}
