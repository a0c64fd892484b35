use crate::arena::ElementId;

/// Tree notifications. Destroyed events carry an id that is already stale;
/// it identifies *which* element went away and resolves to nothing.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TreeEvent {
	Refreshed { element: ElementId },
	Destroyed { element: ElementId },
	ValueChanged { element: ElementId },
	ChildListChanged { parent: ElementId },
}

/// Subscriber list. Callbacks get a shared reference only; they observe,
/// they do not mutate the tree from inside an emission.
#[derive(Default)]
pub struct EventSink {
	subscribers: Vec<Box<dyn Fn(&TreeEvent)>>,
}

impl EventSink {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn subscribe(&mut self, subscriber: impl Fn(&TreeEvent) + 'static) {
		self.subscribers.push(Box::new(subscriber));
	}

	pub fn emit(&self, event: TreeEvent) {
		for subscriber in &self.subscribers {
			subscriber(&event);
		}
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::rc::Rc;

	use super::*;
	use crate::arena::ElementId;

	#[test]
	fn every_subscriber_sees_every_event() {
		let seen = Rc::new(RefCell::new(Vec::new()));
		let mut sink = EventSink::new();
		for tag in ["a", "b"] {
			let seen = Rc::clone(&seen);
			sink.subscribe(move |event| seen.borrow_mut().push((tag, *event)));
		}

		let id = ElementId { index: 0, generation: 0 };
		sink.emit(TreeEvent::Refreshed { element: id });
		assert_eq!(seen.borrow().len(), 2);
	}
}
