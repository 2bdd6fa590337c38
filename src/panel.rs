//! The filter sidebar's mobile overlay.

use std::rc::Rc;
use tracing::{debug, error};
use web_sys::{Document, Element, HtmlElement};

use crate::{config::Selectors, fragment::Scope, listeners::ListenerSet};

/// Open/closed state of the filter sidebar container, kept as a class on the container itself.
///
/// While open, page scrolling is locked.
#[derive(Debug, Clone)]
pub struct FilterPanel {
	container: Element,
	body: Option<HtmlElement>,
	open_class: String,
}

impl FilterPanel {
	#[must_use]
	pub fn find(document: &Document, selectors: &Selectors) -> Option<Self> {
		Some(Self {
			container: document.find(&selectors.filter_panel)?,
			body: document.body(),
			open_class: selectors.filter_panel_open_class.clone(),
		})
	}

	#[must_use]
	pub fn is_open(&self) -> bool {
		self.container.class_list().contains(&self.open_class)
	}

	pub fn set_open(&self, open: bool) {
		let class_list = self.container.class_list();
		let result = if open { class_list.add_1(&self.open_class) } else { class_list.remove_1(&self.open_class) };
		if let Err(error) = result {
			return error!("Failed to toggle filter panel class: {:?}", error);
		}
		self.lock_scroll(open);
		debug!(open, "Filter panel toggled.");
	}

	pub fn toggle(&self) {
		self.set_open(!self.is_open());
	}

	/// Closes the panel if it is open. Scroll is only unlocked if this actually closed it.
	pub fn close(&self) {
		if self.is_open() {
			self.set_open(false);
		}
	}

	fn lock_scroll(&self, locked: bool) {
		if let Some(body) = &self.body {
			let style = body.style();
			let result = if locked { style.set_property("overflow", "hidden") } else { style.remove_property("overflow").map(drop) };
			if let Err(error) = result {
				error!("Failed to (un)lock page scroll: {:?}", error);
			}
		}
	}
}

/// Binds the panel's open/close controls.
#[derive(Debug)]
pub struct FilterPanelControls {
	panel: Rc<FilterPanel>,
	listeners: ListenerSet,
}

impl FilterPanelControls {
	#[must_use]
	pub fn new(panel: Rc<FilterPanel>) -> Self {
		Self {
			panel,
			listeners: ListenerSet::new(),
		}
	}

	/// (Re-)binds the toggle icon and the close button. Idempotent.
	pub fn bind(&mut self, document: &Document, selectors: &Selectors) {
		self.listeners.clear();
		if let Some(icon) = document.find(&selectors.filter_icon) {
			let panel = Rc::clone(&self.panel);
			self.listeners.listen(&icon, "click", move |_| panel.toggle());
		}
		if let Some(close) = document.get_element_by_id(&selectors.filter_close_button_id) {
			let panel = Rc::clone(&self.panel);
			self.listeners.listen(&close, "click", move |_| panel.set_open(false));
		}
	}

	#[must_use]
	pub fn panel(&self) -> &Rc<FilterPanel> {
		&self.panel
	}
}
