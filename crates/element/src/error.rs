use thiserror::Error;

use crate::arena::ElementId;
use crate::phase::PhaseError;

#[derive(Debug, Error)]
pub enum ElementError {
	/// The id refers to an element that was destroyed (or never existed).
	/// Every tree operation except `destroy` reports this for stale ids.
	#[error("element {id} no longer exists")]
	UseAfterDestroy { id: ElementId },

	#[error(transparent)]
	Phase(#[from] PhaseError),
}
