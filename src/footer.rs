use tracing::{error, trace};
use web_sys::{Document, Element};

use crate::{fragment::Scope, listeners::ListenerSet};

/// Collapsible footer link lists: each toggle flips its own `aria-expanded`.
#[derive(Debug, Default)]
pub struct FooterToggles {
	listeners: ListenerSet,
}

impl FooterToggles {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	pub fn bind(&mut self, document: &Document, selector: &str) {
		self.listeners.clear();
		for toggle in document.find_all::<Element>(selector) {
			let toggle_ = toggle.clone();
			self.listeners.listen(&toggle, "click", move |_| flip_expanded(&toggle_));
		}
		trace!("Bound {} footer toggle(s).", self.listeners.len());
	}
}

fn flip_expanded(toggle: &Element) {
	let expanded = toggle.get_attribute("aria-expanded").as_deref() == Some("true");
	if let Err(error) = toggle.set_attribute("aria-expanded", if expanded { "false" } else { "true" }) {
		error!("Failed to set `aria-expanded`: {:?}", error);
	}
}
