use std::collections::VecDeque;

use crate::tree::ElementTree;

/// Deferred tree mutation. Runs against the tree once the active pass has
/// unwound; it observes drain-time state, not enqueue-time state.
pub type TreeWork = Box<dyn FnOnce(&mut ElementTree)>;

pub(crate) struct QueuedWork {
	pub seq: u64,
	pub work: TreeWork,
}

/// FIFO queue for mutations requested while a pass is active. Sequence
/// numbers are handed out monotonically and never reused, so log lines can
/// correlate enqueue and drain.
pub(crate) struct WorkQueue {
	seq_next: u64,
	queue: VecDeque<QueuedWork>,
}

impl WorkQueue {
	pub fn new() -> Self {
		Self {
			seq_next: 0,
			queue: VecDeque::new(),
		}
	}

	pub fn enqueue(&mut self, work: TreeWork) -> u64 {
		let seq = self.seq_next;
		self.seq_next += 1;
		self.queue.push_back(QueuedWork { seq, work });
		seq
	}

	pub fn pop(&mut self) -> Option<QueuedWork> {
		self.queue.pop_front()
	}

	pub fn len(&self) -> usize {
		self.queue.len()
	}

	pub fn is_empty(&self) -> bool {
		self.queue.is_empty()
	}
}
