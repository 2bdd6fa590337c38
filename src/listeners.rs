use tracing::{error, trace};
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{Event, EventTarget};

struct Binding {
	target: EventTarget,
	event: &'static str,
	closure: Closure<dyn FnMut(Event)>,
}

/// Owns a set of DOM event listeners and detaches them again on [`clear`](`ListenerSet::clear`) or drop.
///
/// Components re-bind by clearing and listening again, so binding is idempotent and nodes never have to be
/// cloned just to shed stale handlers.
#[derive(Default)]
pub struct ListenerSet {
	bindings: Vec<Binding>,
}

impl core::fmt::Debug for ListenerSet {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("ListenerSet").field("len", &self.bindings.len()).finish()
	}
}

impl ListenerSet {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	pub fn listen(&mut self, target: &EventTarget, event: &'static str, handler: impl 'static + FnMut(Event)) {
		let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
		if let Err(error) = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
			return error!("Failed to add {:?} listener: {:?}", event, error);
		}
		self.bindings.push(Binding {
			target: target.clone(),
			event,
			closure,
		});
	}

	/// Detaches every listener added through this set.
	pub fn clear(&mut self) {
		let count = self.bindings.len();
		for Binding { target, event, closure } in self.bindings.drain(..) {
			if let Err(error) = target.remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
				error!("Failed to remove {:?} listener: {:?}", event, error);
			}
		}
		if count > 0 {
			trace!("Detached {} event listener(s).", count);
		}
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.bindings.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.bindings.is_empty()
	}
}

impl Drop for ListenerSet {
	fn drop(&mut self) {
		self.clear();
	}
}
