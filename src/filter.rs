//! AJAX filtering of the collection page.
//!
//! [`FilterReconciler`] owns the filter form, the product grid and every listener on the controls inside them.
//! A filter change fetches the same page with the new query, parses it and splices the relevant regions into
//! the live document (see [`crate::reconcile`]), then re-binds its listeners, since replaced markup loses them.

use core::cell::RefCell;
use gloo_timers::callback::Timeout;
use std::rc::{Rc, Weak};
use tracing::{debug, error, info, instrument, trace, warn};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, Event, FormData, HtmlElement, HtmlFormElement, HtmlInputElement, HtmlSelectElement, ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition, Window};

use crate::{
	cart::{AddToCartButtons, CartClient},
	config::Config,
	fragment::{parse_document, Scope},
	http::{self, AjaxHeader},
	listeners::ListenerSet,
	panel::FilterPanel,
	query::{price_range_complete, FilterQuery, RemovalTarget},
	reconcile::{reconcile_fields, Anchor, FieldSelectors, Region},
	redacted,
	state::{Completion, FetchCycle, FetchState, Generation},
	Error, Result,
};

/// Whether a finished fetch made it into the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
	Current,
	/// A newer fetch was started before this one's response arrived. The document wasn't touched.
	Superseded,
}

/// Which parts of the page a fetch updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
	/// Filter refinement: everything is reconciled and the history entry is replaced.
	Refine,
	/// Pagination: only the grid and pagination are updated and a history entry is pushed.
	Navigate,
}

#[derive(Debug)]
struct Inner {
	window: Window,
	document: Document,
	config: Rc<Config>,
	form: HtmlFormElement,
	products: HtmlElement,
	sidebar: Option<Element>,
	panel: Option<Rc<FilterPanel>>,
	cycle: RefCell<FetchCycle>,
	listeners: RefCell<ListenerSet>,
	cart_buttons: RefCell<AddToCartButtons>,
	restore_timer: RefCell<Option<Timeout>>,
}

/// The filter sidebar, product grid and pagination of a collection page.
#[derive(Debug, Clone)]
pub struct FilterReconciler {
	inner: Rc<Inner>,
}

impl FilterReconciler {
	/// Finds the filter form and product grid in `document`.
	///
	/// Nothing is bound yet; call [`bind`](`FilterReconciler::bind`).
	///
	/// # Errors
	///
	/// Iff the form or the product grid is missing.
	pub fn new(window: Window, document: Document, config: Rc<Config>, cart: CartClient, panel: Option<Rc<FilterPanel>>) -> Result<Self> {
		let selectors = &config.selectors;
		let form = document
			.get_element_by_id(&selectors.filter_form_id)
			.and_then(|form| form.dyn_into::<HtmlFormElement>().ok())
			.ok_or_else(|| Error::MissingElement(format!("#{}", selectors.filter_form_id)))?;
		let products = document
			.find(&selectors.products_grid)
			.and_then(|products| products.dyn_into::<HtmlElement>().ok())
			.ok_or_else(|| Error::MissingElement(selectors.products_grid.clone()))?;
		let sidebar = document.find(&selectors.filter_sidebar);
		if sidebar.is_none() {
			warn!("No filter sidebar ({:?}) found. Sidebar state won't be refreshed.", selectors.filter_sidebar);
		}

		Ok(Self {
			inner: Rc::new(Inner {
				window,
				document,
				form,
				products,
				sidebar,
				panel,
				cycle: RefCell::new(FetchCycle::new()),
				listeners: RefCell::new(ListenerSet::new()),
				cart_buttons: RefCell::new(AddToCartButtons::new(cart)),
				restore_timer: RefCell::new(None),
				config,
			}),
		})
	}

	#[must_use]
	pub fn state(&self) -> FetchState {
		self.inner.cycle.borrow().state()
	}

	/// How the most recent fetch cycle ended, once it has been applied.
	#[must_use]
	pub fn last_settled(&self) -> Option<FetchState> {
		self.inner.cycle.borrow().last_settled()
	}

	#[must_use]
	pub fn form(&self) -> &HtmlFormElement {
		&self.inner.form
	}

	fn checkboxes(&self) -> Vec<HtmlInputElement> {
		self.inner.form.find_all(&self.inner.config.selectors.checkboxes)
	}

	fn price_inputs(&self) -> Vec<HtmlInputElement> {
		self.inner.form.find_all(&self.inner.config.selectors.price_inputs)
	}

	fn sort_select(&self) -> Option<HtmlSelectElement> {
		self.inner.form.find(&self.inner.config.selectors.sort_select).and_then(|select| select.dyn_into().ok())
	}

	/// Serializes the form. Blank fields and the sort field on its first option are left out.
	///
	/// # Errors
	///
	/// Iff the browser refuses to read the form.
	pub fn form_query(&self) -> Result<FilterQuery> {
		let form_data = FormData::new_with_form(&self.inner.form)?;
		let entries = js_sys::try_iter(&form_data)?.ok_or_else(|| Error::Js(JsValue::from_str("FormData is not iterable.")))?;
		let mut pairs = Vec::new();
		for entry in entries {
			let entry: js_sys::Array = entry?.unchecked_into();
			match (entry.get(0).as_string(), entry.get(1).as_string()) {
				(Some(name), Some(value)) => pairs.push((name, value)),
				_ => trace!("Skipping non-text form entry."),
			}
		}

		let default_sort = self.sort_select().filter(|select| select.selected_index() <= 0).map(|select| select.name());
		Ok(FilterQuery::from_pairs(pairs, default_sort.as_deref()))
	}

	/// Whether any checkbox is checked, any price is entered or the sort order isn't the default.
	#[must_use]
	pub fn has_active_filters(&self) -> bool {
		self.checkboxes().iter().any(HtmlInputElement::checked)
			|| self.price_inputs().iter().any(|input| !input.value().trim().is_empty())
			|| self.sort_select().map_or(false, |select| select.selected_index() > 0)
	}

	/// Unchecks every checkbox, empties the price inputs and selects the first sort option.
	pub fn reset_form(&self) {
		for checkbox in self.checkboxes() {
			checkbox.set_checked(false);
		}
		for input in self.price_inputs() {
			input.set_value("");
		}
		if let Some(select) = self.sort_select() {
			select.set_selected_index(0);
		}
	}

	/// Fetches the page for the current form state and reconciles the live document with it.
	///
	/// # Errors
	///
	/// Iff the fetch or the reconciliation failed. The product list is left as it was, the container's loading
	/// state is reverted and the user is alerted.
	#[instrument(skip(self))]
	pub async fn apply_filters(&self) -> Result<Applied> {
		let path = self.inner.window.location().pathname()?;
		let url = self.form_query()?.url_for(&path);
		self.run_cycle(&url, FetchKind::Refine).await
	}

	/// [`reset_form`](`FilterReconciler::reset_form`), then [`apply_filters`](`FilterReconciler::apply_filters`).
	///
	/// # Errors
	///
	/// See [`apply_filters`](`FilterReconciler::apply_filters`).
	pub async fn clear_all_filters(&self) -> Result<Applied> {
		self.reset_form();
		self.apply_filters().await
	}

	/// Updates the form for a clicked active-filter chip remove link, without fetching anything.
	///
	/// The price chip clears both price inputs. Any other chip's link points at the filter set without it, so
	/// checked boxes missing from that link's query are unchecked.
	///
	/// # Errors
	///
	/// Iff the link's `href` can't be resolved.
	pub fn remove_active_filter(&self, link: &Element) -> Result<()> {
		let config = &self.inner.config;
		let chip_text = link
			.closest(&config.selectors.active_filter_chip)?
			.and_then(|chip| chip.text_content())
			.unwrap_or_default();

		if chip_text.trim().contains(&config.labels.price_chip_marker) {
			debug!("Removing price filter.");
			for input in self.price_inputs() {
				input.set_value("");
			}
			return Ok(());
		}

		let href = link.get_attribute("href").unwrap_or_default();
		let target = RemovalTarget::parse(&href, &self.inner.window.location().origin()?)?;
		for checkbox in self.inner.form.find_all::<HtmlInputElement>(&config.selectors.checked_checkboxes) {
			if !target.retains(&checkbox.name(), &checkbox.value()) {
				debug!(name = redacted(&checkbox.name()), value = redacted(&checkbox.value()), "Unchecking removed filter.");
				checkbox.set_checked(false);
			}
		}
		Ok(())
	}

	/// Loads another page of the current listing. Only the grid and pagination are touched.
	///
	/// # Errors
	///
	/// Iff the fetch or the reconciliation failed. No alert is shown in that case.
	#[instrument(skip(self, href))]
	pub async fn paginate(&self, href: &str) -> Result<Applied> {
		self.run_cycle(href, FetchKind::Navigate).await
	}

	/// (Re-)binds every listener on the form controls, chips, pagination links and add-to-cart buttons. Idempotent.
	#[instrument(skip(self))]
	pub fn bind(&self) {
		let selectors = &self.inner.config.selectors;
		let mut listeners = self.inner.listeners.borrow_mut();
		listeners.clear();

		listeners.listen(
			&self.inner.form,
			"submit",
			self.handler(|this, event| {
				event.prevent_default();
				this.spawn_apply();
			}),
		);

		for checkbox in self.checkboxes() {
			listeners.listen(&checkbox, "change", self.handler(|this, _| this.spawn_apply()));
		}
		for input in self.price_inputs() {
			listeners.listen(&input, "change", self.handler(|this, _| this.on_price_change()));
		}
		if let Some(select) = self.sort_select() {
			listeners.listen(&select, "change", self.handler(|this, _| this.spawn_apply()));
		}

		if let Some(sidebar) = &self.inner.sidebar {
			if let Some(clear) = sidebar.find(&selectors.clear_all_button) {
				listeners.listen(
					&clear,
					"click",
					self.handler(|this, event| {
						event.prevent_default();
						let this = this.clone();
						spawn_local(async move {
							if let Err(error) = this.clear_all_filters().await {
								error!("Filter error: {}", error);
							}
						});
					}),
				);
			}

			for link in sidebar.find_all::<Element>(&selectors.active_filter_remove_links) {
				let link_ = link.clone();
				listeners.listen(
					&link,
					"click",
					self.handler(move |this, event| {
						event.prevent_default();
						match this.remove_active_filter(&link_) {
							Ok(()) => this.spawn_apply(),
							Err(error) => error!("Failed to remove active filter: {}", error),
						}
					}),
				);
			}
		}

		for link in self.inner.document.find_all::<Element>(&selectors.pagination_links) {
			let link_ = link.clone();
			listeners.listen(
				&link,
				"click",
				self.handler(move |this, event| {
					let href = match link_.get_attribute("href") {
						Some(href) => href,
						None => return,
					};
					event.prevent_default();
					let this = this.clone();
					spawn_local(async move {
						if let Err(error) = this.paginate(&href).await {
							error!("Pagination error: {}", error);
						}
					});
				}),
			);
		}

		debug!("Bound {} filter listener(s).", listeners.len());
		drop(listeners);
		self.inner.cart_buttons.borrow_mut().bind();
	}

	/// After the configured settle delay, applies the filters once if the browser restored a filtered form.
	pub fn schedule_restore(&self) {
		let weak = Rc::downgrade(&self.inner);
		let timeout = Timeout::new(self.inner.config.timing.restore_settle_ms, move || {
			if let Some(inner) = weak.upgrade() {
				let this = FilterReconciler { inner };
				if this.has_active_filters() {
					info!("Detected pre-filled filters, applying them...");
					this.spawn_apply();
				}
			}
		});
		*self.inner.restore_timer.borrow_mut() = Some(timeout);
	}

	fn handler(&self, f: impl 'static + Fn(&FilterReconciler, &Event)) -> impl 'static + FnMut(Event) {
		let weak: Weak<Inner> = Rc::downgrade(&self.inner);
		move |event| {
			if let Some(inner) = weak.upgrade() {
				f(&FilterReconciler { inner }, &event);
			}
		}
	}

	fn spawn_apply(&self) {
		let this = self.clone();
		spawn_local(async move {
			if let Err(error) = this.apply_filters().await {
				error!("Filter error: {}", error);
			}
		});
	}

	fn on_price_change(&self) {
		let prices = self.price_inputs();
		if let [min, max, ..] = prices.as_slice() {
			if price_range_complete(&min.value(), &max.value()) {
				return self.spawn_apply();
			}
		}
		trace!("Price range incomplete. Not applying.");
	}

	fn set_loading(&self, loading: bool) {
		let style = self.inner.products.style();
		let (opacity, pointer_events) = if loading { ("0.5", "none") } else { ("1", "auto") };
		if let Err(error) = style.set_property("opacity", opacity).and_then(|()| style.set_property("pointer-events", pointer_events)) {
			error!("Failed to update loading state: {:?}", error);
		}
	}

	async fn run_cycle(&self, url: &str, kind: FetchKind) -> Result<Applied> {
		let generation = self.start(url, kind)?;

		let endpoints = &self.inner.config.endpoints;
		let header = AjaxHeader {
			name: &endpoints.ajax_header_name,
			value: &endpoints.ajax_header_value,
		};
		let fetched = match http::get_html(&self.inner.window, url, header).await {
			Ok(html) => parse_document(&html),
			Err(error) => Err(error),
		};
		self.complete(generation, url, fetched, kind)
	}

	/// Runs a fetch cycle for a response that is already at hand, from loading state to history update.
	///
	/// # Errors
	///
	/// Like [`apply_filters`](`FilterReconciler::apply_filters`) and [`paginate`](`FilterReconciler::paginate`).
	#[doc(hidden)]
	pub fn apply_fetched(&self, url: &str, fetched: Result<Document>, kind: FetchKind) -> Result<Applied> {
		let generation = self.start(url, kind)?;
		self.complete(generation, url, fetched, kind)
	}

	fn start(&self, url: &str, kind: FetchKind) -> Result<Generation> {
		let generation = self.inner.cycle.borrow_mut().begin()?;
		info!(?generation, ?kind, url = redacted(url), "Fetching listing.");
		self.set_loading(true);
		Ok(generation)
	}

	fn complete(&self, generation: Generation, url: &str, fetched: Result<Document>, kind: FetchKind) -> Result<Applied> {
		if !self.inner.cycle.borrow().is_current(generation) {
			debug!(?generation, "Dropping superseded response.");
			return Ok(Applied::Superseded);
		}

		let result = fetched.and_then(|fetched| self.splice(&fetched, kind));
		let completion = self.inner.cycle.borrow_mut().finish(generation, result.is_ok())?;
		debug_assert_eq!(completion, Completion::Current);
		self.set_loading(false);
		self.inner.cycle.borrow_mut().settle()?;

		match result {
			Ok(()) => {
				self.after_success(url, kind)?;
				Ok(Applied::Current)
			}
			Err(error) => {
				if kind == FetchKind::Refine {
					let message = &self.inner.config.labels.filter_error_alert;
					if !message.is_empty() {
						self.inner.window.alert_with_message(message)?;
					}
				}
				Err(error)
			}
		}
	}

	fn splice(&self, fetched: &Document, kind: FetchKind) -> Result<()> {
		let Inner { document, products, sidebar, config, .. } = &*self.inner;
		let selectors = &config.selectors;

		Region {
			name: "product grid",
			old: Some(products.clone().into()),
			new: fetched.find(&selectors.products_grid).as_ref(),
			anchor: Anchor::Nowhere,
			persistent: true,
		}
		.reconcile(document)?;

		let pagination_anchor = match products.parent_element() {
			Some(parent) => Anchor::AppendTo(parent),
			None => Anchor::Nowhere,
		};
		Region {
			name: "pagination",
			old: document.find(&selectors.pagination),
			new: fetched.find(&selectors.pagination).as_ref(),
			anchor: pagination_anchor,
			persistent: kind == FetchKind::Navigate,
		}
		.reconcile(document)?;

		if kind == FetchKind::Navigate {
			return Ok(());
		}

		Region {
			name: "product count",
			old: document.find(&selectors.product_count),
			new: fetched.find(&selectors.product_count).as_ref(),
			anchor: Anchor::Nowhere,
			persistent: true,
		}
		.reconcile(document)?;

		let (sidebar, new_sidebar) = match (sidebar, fetched.find(&selectors.filter_sidebar)) {
			(Some(sidebar), Some(new_sidebar)) => (sidebar, new_sidebar),
			(Some(_), None) => {
				warn!("Fetched page has no filter sidebar. Leaving the live one as is.");
				return Ok(());
			}
			(None, _) => return Ok(()),
		};

		reconcile_fields(
			sidebar,
			&new_sidebar,
			FieldSelectors {
				checkboxes: &selectors.checkboxes,
				price_inputs: &selectors.price_inputs,
				sort_select: &selectors.sort_select,
			},
			config.field_matching,
		);

		Region {
			name: "active filters",
			old: sidebar.find(&selectors.active_filters),
			new: new_sidebar.find(&selectors.active_filters).as_ref(),
			anchor: Anchor::AppendTo(sidebar.clone()),
			persistent: false,
		}
		.reconcile(document)?;

		Region {
			name: "clear all button",
			old: sidebar.find(&selectors.clear_all_button),
			new: new_sidebar.find(&selectors.clear_all_button).as_ref(),
			anchor: sidebar.find(&selectors.submit_button).map_or(Anchor::Nowhere, Anchor::Before),
			persistent: false,
		}
		.reconcile(document)?;

		Ok(())
	}

	fn after_success(&self, url: &str, kind: FetchKind) -> Result<()> {
		if kind == FetchKind::Refine {
			if let Some(panel) = &self.inner.panel {
				panel.close();
			}
		}

		self.bind();

		let options = ScrollIntoViewOptions::new();
		options.set_behavior(ScrollBehavior::Smooth);
		options.set_block(ScrollLogicalPosition::Start);
		self.inner.products.scroll_into_view_with_scroll_into_view_options(&options);

		let history = self.inner.window.history()?;
		let state = js_sys::Object::new();
		match kind {
			FetchKind::Refine => history.replace_state_with_url(&state, "", Some(url))?,
			FetchKind::Navigate => history.push_state_with_url(&state, "", Some(url))?,
		}
		Ok(())
	}
}
