use js_sys::Promise;
use std::rc::Rc;
use tracing::{info, instrument, warn};
use wasm_bindgen::{prelude::wasm_bindgen, JsValue};
use wasm_bindgen_futures::future_to_promise;
use web_sys::{Document, Window};

use crate::{
	cart::{AddToCartButtons, CartClient},
	config::Config,
	filter::FilterReconciler,
	footer::FooterToggles,
	panel::{FilterPanel, FilterPanelControls},
	Error, Result,
};

/// Everything this crate binds on a collection page.
///
/// Construct one after `DOMContentLoaded` and keep it alive for the page's lifetime. Freeing it detaches all
/// listeners.
#[wasm_bindgen]
#[derive(Debug)]
pub struct CollectionPage {
	cart: CartClient,
	filter: Option<FilterReconciler>,
	/// Held for its listeners. Only present without a filter form, otherwise the [`FilterReconciler`] binds the
	/// buttons.
	_cart_buttons: Option<AddToCartButtons>,
	_panel_controls: Option<FilterPanelControls>,
	_footer: FooterToggles,
}

#[wasm_bindgen]
impl CollectionPage {
	/// Binds the current page. `config` may be `undefined` or a partial configuration object.
	///
	/// # Errors
	///
	/// Iff `config` is malformed or there is no `window.document`.
	#[wasm_bindgen(constructor)]
	pub fn new(config: JsValue) -> Result<CollectionPage, JsValue> {
		let config = Config::from_js(config)?;
		let window = web_sys::window().ok_or_else(|| JsValue::from_str("no `window`"))?;
		let document = window.document().ok_or_else(|| JsValue::from_str("no `window.document`"))?;
		Ok(Self::bind(window, document, config))
	}

	/// Re-reads the cart and updates every count display. Resolves to the item count.
	#[wasm_bindgen(js_name = refreshCartCount)]
	pub fn refresh_cart_count_js(&self) -> Promise {
		let cart = self.cart.clone();
		future_to_promise(async move { Ok(cart.refresh_cart_count().await?.into()) })
	}
}

impl CollectionPage {
	#[instrument(skip(window, document, config))]
	pub fn bind(window: Window, document: Document, config: Config) -> Self {
		let config = Rc::new(config);
		let cart = CartClient::new(window.clone(), document.clone(), Rc::clone(&config));

		let panel = FilterPanel::find(&document, &config.selectors).map(Rc::new);
		let panel_controls = panel.clone().map(|panel| {
			let mut controls = FilterPanelControls::new(panel);
			controls.bind(&document, &config.selectors);
			controls
		});

		let (filter, cart_buttons) = match FilterReconciler::new(window, document.clone(), Rc::clone(&config), cart.clone(), panel) {
			Ok(filter) => {
				filter.bind();
				filter.schedule_restore();
				(Some(filter), None)
			}
			Err(Error::MissingElement(selector)) => {
				info!("No {} on this page. AJAX filtering is off.", selector);
				let mut buttons = AddToCartButtons::new(cart.clone());
				buttons.bind();
				(None, Some(buttons))
			}
			Err(error) => {
				warn!("Failed to set up filtering: {}", error);
				let mut buttons = AddToCartButtons::new(cart.clone());
				buttons.bind();
				(None, Some(buttons))
			}
		};

		let mut footer = FooterToggles::new();
		footer.bind(&document, &config.selectors.footer_toggles);

		Self {
			cart,
			filter,
			_cart_buttons: cart_buttons,
			_panel_controls: panel_controls,
			_footer: footer,
		}
	}

	#[must_use]
	pub fn cart(&self) -> &CartClient {
		&self.cart
	}

	#[must_use]
	pub fn filter(&self) -> Option<&FilterReconciler> {
		self.filter.as_ref()
	}
}
