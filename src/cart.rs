//! Cart count display and add-to-cart buttons.

use core::cell::Cell;
use gloo_timers::callback::Timeout;
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use tracing::{debug, error, info, instrument, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{CustomEvent, Document, Element, HtmlButtonElement, HtmlElement, Window};

use crate::{config::Config, fragment::Scope, http, listeners::ListenerSet, redacted, Error, Result};

/// The part of `GET /cart.js` this crate looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Cart {
	pub item_count: u32,
}

#[derive(Debug, Serialize)]
struct AddItem<'a> {
	id: &'a str,
	quantity: u32,
}

/// Label/enablement phase of one add-to-cart button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddButtonPhase {
	Ready,
	Adding,
	Added,
	Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddButtonEvent {
	Click,
	Succeeded,
	Failed,
	ResetElapsed,
}

impl AddButtonPhase {
	/// # Errors
	///
	/// Iff `event` can't happen in this phase, e.g. a click while the button is disabled or a stale reset timer.
	pub fn on(self, event: AddButtonEvent) -> Result<Self> {
		use AddButtonEvent as E;
		use AddButtonPhase as P;
		Ok(match (self, event) {
			(P::Ready | P::Failed, E::Click) => P::Adding,
			(P::Adding, E::Succeeded) => P::Added,
			(P::Adding, E::Failed) => P::Failed,
			(P::Added | P::Failed, E::ResetElapsed) => P::Ready,
			(phase, event) => {
				return Err(Error::InvalidTransition {
					state: phase.name(),
					event: event.name(),
				})
			}
		})
	}

	#[must_use]
	pub fn name(self) -> &'static str {
		match self {
			AddButtonPhase::Ready => "ready",
			AddButtonPhase::Adding => "adding",
			AddButtonPhase::Added => "added",
			AddButtonPhase::Failed => "failed",
		}
	}

	/// The button stays disabled from the click until its label is reset after a successful add.
	#[must_use]
	pub fn disabled(self) -> bool {
		matches!(self, AddButtonPhase::Adding | AddButtonPhase::Added)
	}

	#[must_use]
	pub fn label<'a>(self, labels: &'a crate::config::Labels, original: &'a str) -> &'a str {
		match self {
			AddButtonPhase::Ready => original,
			AddButtonPhase::Adding => &labels.pending,
			AddButtonPhase::Added => &labels.confirmed,
			AddButtonPhase::Failed => &labels.failed,
		}
	}
}

impl AddButtonEvent {
	#[must_use]
	pub fn name(self) -> &'static str {
		match self {
			AddButtonEvent::Click => "click",
			AddButtonEvent::Succeeded => "succeed",
			AddButtonEvent::Failed => "fail",
			AddButtonEvent::ResetElapsed => "reset",
		}
	}
}

/// Reads and writes the storefront cart and keeps count displays in sync.
#[derive(Debug, Clone)]
pub struct CartClient {
	window: Window,
	document: Document,
	config: Rc<Config>,
}

impl CartClient {
	#[must_use]
	pub fn new(window: Window, document: Document, config: Rc<Config>) -> Self {
		Self { window, document, config }
	}

	/// Fetches the cart and writes its item count into every count display.
	///
	/// On failure the displayed counts are left as they are.
	#[instrument(skip(self))]
	pub async fn refresh_cart_count(&self) -> Result<u32> {
		let cart: Cart = http::get_json(&self.window, &self.config.endpoints.cart_read).await?;
		self.show_count(cart.item_count);
		info!("Cart updated: {} item(s)", cart.item_count);
		Ok(cart.item_count)
	}

	/// Writes `count` into every count display. Bubbles are shown iff `count > 0`.
	pub fn show_count(&self, count: u32) {
		let text = count.to_string();
		let selectors = &self.config.selectors;
		for bubble in self.document.find_all::<HtmlElement>(&selectors.cart_count_bubbles) {
			bubble.set_text_content(Some(&text));
			if let Err(error) = bubble.style().set_property("display", if count > 0 { "flex" } else { "none" }) {
				error!("Failed to set cart bubble visibility: {:?}", error);
			}
		}
		for element in self.document.find_all::<Element>(&selectors.cart_counts) {
			element.set_text_content(Some(&text));
		}
	}

	/// Adds one unit of `variant_id` to the cart.
	///
	/// On success, the counts are refreshed and the cart-changed event is dispatched on `<html>`.
	#[instrument(skip(self, variant_id))]
	pub async fn add_item(&self, variant_id: &str) -> Result<()> {
		debug!(variant_id = redacted(variant_id), "Adding to cart.");
		http::post_json(&self.window, &self.config.endpoints.cart_add, &AddItem { id: variant_id, quantity: 1 }).await?;

		let this = self.clone();
		spawn_local(async move {
			if let Err(error) = this.refresh_cart_count().await {
				error!("Error updating cart: {}", error);
			}
		});
		if let Err(error) = self.announce_change() {
			error!("Failed to dispatch cart change event: {}", error);
		}
		Ok(())
	}

	fn announce_change(&self) -> Result<()> {
		let event = CustomEvent::new(&self.config.endpoints.cart_changed_event)?;
		if let Some(root) = self.document.document_element() {
			root.dispatch_event(&event)?;
		}
		Ok(())
	}

	#[must_use]
	pub fn config(&self) -> &Config {
		&self.config
	}
}

/// Add-to-cart buttons in the live document, bound to a [`CartClient`].
#[derive(Debug)]
pub struct AddToCartButtons {
	client: CartClient,
	listeners: ListenerSet,
}

impl AddToCartButtons {
	#[must_use]
	pub fn new(client: CartClient) -> Self {
		Self {
			client,
			listeners: ListenerSet::new(),
		}
	}

	/// (Re-)binds every matching button currently in the document. Idempotent.
	#[instrument(skip(self))]
	pub fn bind(&mut self) {
		self.listeners.clear();
		let config = self.client.config();
		for button in self.client.document.find_all::<HtmlElement>(&config.selectors.add_to_cart_buttons) {
			let labels = &config.labels;
			let original = match button.text_content() {
				Some(text) if !text.trim().is_empty() && ![&labels.pending, &labels.confirmed, &labels.failed].contains(&&text) => text,
				_ => labels.default.clone(),
			};
			let button_ = button.clone();
			let client = self.client.clone();
			let state = Rc::new(ButtonState {
				phase: Cell::new(AddButtonPhase::Ready),
				attempt: Cell::new(0),
			});
			let original = Rc::<str>::from(original);
			self.listeners.listen(&button, "click", move |_| {
				let variant_id = match button_.get_attribute(&client.config().selectors.variant_id_attribute) {
					Some(variant_id) => variant_id,
					None => return warn!("Add-to-cart button without variant id clicked."),
				};
				spawn_local(press(client.clone(), button_.clone(), state.clone(), original.clone(), variant_id));
			});
		}
		debug!("Bound {} add-to-cart button(s).", self.listeners.len());
	}
}

fn render(button: &HtmlElement, phase: AddButtonPhase, labels: &crate::config::Labels, original: &str) {
	button.set_text_content(Some(phase.label(labels, original)));
	match button.dyn_ref::<HtmlButtonElement>() {
		Some(button) => button.set_disabled(phase.disabled()),
		None => {
			let result = if phase.disabled() { button.set_attribute("disabled", "") } else { button.remove_attribute("disabled") };
			if let Err(error) = result {
				error!("Failed to toggle `disabled`: {:?}", error);
			}
		}
	}
}

#[derive(Debug)]
struct ButtonState {
	phase: Cell<AddButtonPhase>,
	/// Lets a reset timer recognise that the button was clicked again in the meantime.
	attempt: Cell<u32>,
}

fn advance(state: &ButtonState, event: AddButtonEvent) -> Option<AddButtonPhase> {
	match state.phase.get().on(event) {
		Ok(next) => {
			state.phase.set(next);
			Some(next)
		}
		Err(error) => {
			debug!("Ignoring button event: {}", error);
			None
		}
	}
}

async fn press(client: CartClient, button: HtmlElement, state: Rc<ButtonState>, original: Rc<str>, variant_id: String) {
	let labels = &client.config().labels;
	let Some(next) = advance(&state, AddButtonEvent::Click) else { return };
	let attempt = state.attempt.get().wrapping_add(1);
	state.attempt.set(attempt);
	render(&button, next, labels, &original);

	let event = match client.add_item(&variant_id).await {
		Ok(()) => AddButtonEvent::Succeeded,
		Err(error) => {
			error!("Error: {}", error);
			AddButtonEvent::Failed
		}
	};
	if let Some(next) = advance(&state, event) {
		render(&button, next, labels, &original);
	}

	let reset_ms = client.config().timing.label_reset_ms;
	Timeout::new(reset_ms, move || {
		if state.attempt.get() != attempt {
			return;
		}
		if let Some(next) = advance(&state, AddButtonEvent::ResetElapsed) {
			render(&button, next, &client.config().labels, &original);
		}
	})
	.forget();
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::Labels;

	#[test]
	fn success_sequence() {
		let labels = Labels::default();
		let mut phase = AddButtonPhase::Ready;
		let mut seen = vec![];
		for event in [AddButtonEvent::Click, AddButtonEvent::Succeeded, AddButtonEvent::ResetElapsed] {
			phase = phase.on(event).unwrap();
			seen.push((phase.label(&labels, "Add to Cart").to_owned(), phase.disabled()));
		}
		assert_eq!(
			seen,
			vec![
				("Adding...".to_owned(), true),
				("Added to Cart".to_owned(), true),
				("Add to Cart".to_owned(), false)
			]
		);
	}

	#[test]
	fn failure_reenables_immediately() {
		let phase = AddButtonPhase::Ready.on(AddButtonEvent::Click).unwrap().on(AddButtonEvent::Failed).unwrap();
		assert_eq!(phase, AddButtonPhase::Failed);
		assert!(!phase.disabled());
		assert_eq!(phase.label(&Labels::default(), "Buy"), "Error");
		assert_eq!(phase.on(AddButtonEvent::ResetElapsed).unwrap().label(&Labels::default(), "Buy"), "Buy");
	}

	#[test]
	fn disabled_button_ignores_clicks() {
		assert!(AddButtonPhase::Adding.on(AddButtonEvent::Click).is_err());
		assert!(AddButtonPhase::Added.on(AddButtonEvent::Click).is_err());
	}

	#[test]
	fn stale_reset_is_rejected() {
		// Retried after a failure: the first attempt's reset timer must not touch the new attempt.
		let phase = AddButtonPhase::Failed.on(AddButtonEvent::Click).unwrap();
		assert!(matches!(phase.on(AddButtonEvent::ResetElapsed), Err(Error::InvalidTransition { state: "adding", event: "reset" })));
	}

	#[test]
	fn add_item_body() {
		let body = serde_json::to_value(AddItem { id: "4242", quantity: 1 }).unwrap();
		assert_eq!(body, serde_json::json!({ "id": "4242", "quantity": 1 }));
	}

	#[test]
	fn cart_ignores_other_fields() {
		let cart: Cart = serde_json::from_str(r#"{ "token": "x", "item_count": 3, "items": [] }"#).unwrap();
		assert_eq!(cart, Cart { item_count: 3 });
	}
}
