use bitflags::bitflags;
use thiserror::Error;

bitflags! {
	/// Lifecycle phase bits of one element.
	///
	/// `PENDING_*` bits are requests; the matching active bit is set while
	/// the work runs. Several bits coexist (a refreshed element is pending
	/// post-process *and* pending draw), which is why this is a set and not
	/// an enum.
	#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
	pub struct ElementPhases: u16 {
		const PENDING_REFRESH = 1 << 0;
		const REFRESHING = 1 << 1;
		/// Set by a finished refresh, cleared by the next update.
		const JUST_REFRESHED = 1 << 2;
		const PENDING_POST_PROCESS = 1 << 3;
		const POST_PROCESSING = 1 << 4;
		const PENDING_DRAW = 1 << 5;
		const DRAWING = 1 << 6;
		const PENDING_DESTROY = 1 << 7;
		const DESTROYING = 1 << 8;
		/// Terminal. No other bit is ever set again.
		const DESTROYED = 1 << 9;
	}
}

impl ElementPhases {
	/// Destruction has been requested, is running, or is done.
	pub fn on_destroy_path(self) -> bool {
		self.intersects(Self::PENDING_DESTROY | Self::DESTROYING | Self::DESTROYED)
	}
}

/// Validated lifecycle transitions. Phase bits are never written directly;
/// every change goes through [`ElementPhases::apply`], which rejects
/// transitions the lifecycle does not allow.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PhaseEvent {
	QueueRefresh,
	BeginRefresh,
	EndRefresh,
	ClearJustRefreshed,
	BeginPostProcess,
	EndPostProcess,
	FinishPostProcess,
	BeginDraw,
	EndDraw,
	ClearPendingDraw,
	QueueDestroy,
	BeginDestroy,
	FinishDestroy,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Error)]
#[error("illegal transition {event:?} from phases {phases:?}")]
pub struct PhaseError {
	pub phases: ElementPhases,
	pub event: PhaseEvent,
}

impl ElementPhases {
	/// Applies a lifecycle event, returning the next phase set or an error
	/// when the event is illegal in the current one.
	pub fn apply(self, event: PhaseEvent) -> Result<Self, PhaseError> {
		use PhaseEvent::*;
		let next = match event {
			QueueRefresh if !self.on_destroy_path() => self | Self::PENDING_REFRESH,
			BeginRefresh if self.contains(Self::PENDING_REFRESH) && !self.intersects(Self::REFRESHING | Self::DESTROYING | Self::DESTROYED) => {
				(self - Self::PENDING_REFRESH) | Self::REFRESHING
			}
			EndRefresh if self.contains(Self::REFRESHING) => {
				(self - Self::REFRESHING) | Self::JUST_REFRESHED | Self::PENDING_POST_PROCESS | Self::PENDING_DRAW
			}
			ClearJustRefreshed if !self.contains(Self::DESTROYED) => self - Self::JUST_REFRESHED,
			BeginPostProcess if self.contains(Self::PENDING_POST_PROCESS) && !self.intersects(Self::POST_PROCESSING | Self::DESTROYED) => {
				self | Self::POST_PROCESSING
			}
			EndPostProcess if self.contains(Self::POST_PROCESSING) => self - Self::POST_PROCESSING,
			FinishPostProcess if self.contains(Self::PENDING_POST_PROCESS) && !self.contains(Self::POST_PROCESSING) => {
				self - Self::PENDING_POST_PROCESS
			}
			BeginDraw if !self.intersects(Self::DRAWING | Self::DESTROYED) => self | Self::DRAWING,
			EndDraw if self.contains(Self::DRAWING) => self - Self::DRAWING,
			ClearPendingDraw if !self.contains(Self::DESTROYED) => self - Self::PENDING_DRAW,
			QueueDestroy if !self.on_destroy_path() => self | Self::PENDING_DESTROY,
			BeginDestroy if self.contains(Self::PENDING_DESTROY) && !self.intersects(Self::DESTROYING | Self::DESTROYED) => {
				(self - Self::PENDING_DESTROY) | Self::DESTROYING
			}
			FinishDestroy if self.contains(Self::DESTROYING) => Self::DESTROYED,
			_ => return Err(PhaseError { phases: self, event }),
		};
		Ok(next)
	}
}
