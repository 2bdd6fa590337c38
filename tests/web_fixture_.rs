#![cfg(target_arch = "wasm32")]
#![allow(dead_code)]

use collection_dom::{cart::CartClient, config::Config, filter::FilterReconciler, fragment::Scope};
use gloo_timers::callback::Timeout;
use js_sys::Promise;
use std::{rc::Rc, sync::Once};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{window, Document, HtmlElement, HtmlInputElement, HtmlSelectElement, Window};

static LOG_INITIALIZED: Once = Once::new();

/// Replaces the content of the test root (appended to the body on first use) with `html`.
///
/// The rest of the body belongs to the test runner.
pub fn mount(html: &str) -> (Window, Document) {
	LOG_INITIALIZED.call_once(tracing_wasm::set_as_global_default);

	let window = window().unwrap();
	let document = window.document().unwrap();
	let root = match document.get_element_by_id("test-root") {
		Some(root) => root,
		None => {
			let root = document.create_element("div").unwrap();
			root.set_id("test-root");
			document.body().unwrap().append_child(&root).unwrap();
			root
		}
	};
	root.set_inner_html(html);
	(window, document)
}

pub const COLLECTION_PAGE: &str = r#"
<div class="filter">
	<div class="filter-sidebar">
		<form id="filterForm">
			<input type="checkbox" name="filter.v.option.color" value="Red" id="color-red"><label for="color-red">Red (4)</label>
			<input type="checkbox" name="filter.v.option.color" value="Blue" id="color-blue"><label for="color-blue">Blue (2)</label>
			<input type="number" name="filter.v.price.gte" id="price-min">
			<input type="number" name="filter.v.price.lte" id="price-max">
			<select class="sort-select" name="sort_by">
				<option value="manual">Featured</option>
				<option value="price-ascending">Price, low to high</option>
			</select>
			<button type="submit">Apply</button>
		</form>
	</div>
</div>
<div class="products-wrapper">
	<p class="product-count">6 products</p>
	<div class="products-grid"><div class="product">Old product</div></div>
	<div class="pagination"><a href="/collections/all?page=2">2</a></div>
</div>
"#;

pub fn reconciler(window: &Window, document: &Document, config: Config) -> FilterReconciler {
	let config = Rc::new(config);
	let cart = CartClient::new(window.clone(), document.clone(), Rc::clone(&config));
	FilterReconciler::new(window.clone(), document.clone(), config, cart, None).unwrap()
}

pub fn input(document: &Document, id: &str) -> HtmlInputElement {
	document.get_element_by_id(id).unwrap().dyn_into().unwrap()
}

pub fn sort_select(document: &Document) -> HtmlSelectElement {
	document.find(".sort-select").unwrap().dyn_into().unwrap()
}

pub fn grid(document: &Document) -> HtmlElement {
	document.find(".products-grid").unwrap().dyn_into().unwrap()
}

/// Resolves after `ms` milliseconds.
pub async fn sleep(ms: u32) {
	let promise = Promise::new(&mut |resolve, _| {
		Timeout::new(ms, move || {
			resolve.call0(&JsValue::UNDEFINED).unwrap();
		})
		.forget();
	});
	JsFuture::from(promise).await.unwrap();
}

/// Lets already spawned tasks run up to their next pending await.
pub async fn yield_now() {
	JsFuture::from(Promise::resolve(&JsValue::UNDEFINED)).await.unwrap();
}

/// Polls `condition` until it holds, for at most about five seconds.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
	for _ in 0..250 {
		if condition() {
			return;
		}
		sleep(20).await;
	}
	panic!("Condition not met in time.");
}
