#![cfg(target_arch = "wasm32")]

use collection_dom::{
	config::Selectors,
	footer::FooterToggles,
	panel::{FilterPanel, FilterPanelControls},
};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::HtmlElement;

wasm_bindgen_test_configure!(run_in_browser);

mod web_fixture_;
use web_fixture_::mount;

fn click(document: &web_sys::Document, selector: &str) {
	document.query_selector(selector).unwrap().unwrap().dyn_into::<HtmlElement>().unwrap().click();
}

#[wasm_bindgen_test]
fn icon_toggles_and_close_button_closes() {
	let (_, document) = mount(
		r#"
		<button class="filter-icon">Filter</button>
		<div class="filter"><button id="filterCloseBtn">×</button></div>
		"#,
	);
	let selectors = Selectors::default();
	let panel = Rc::new(FilterPanel::find(&document, &selectors).unwrap());
	let mut controls = FilterPanelControls::new(Rc::clone(&panel));
	controls.bind(&document, &selectors);
	controls.bind(&document, &selectors);
	let body = document.body().unwrap();

	click(&document, ".filter-icon");
	assert!(panel.is_open());
	assert_eq!(body.style().get_property_value("overflow").unwrap(), "hidden");

	click(&document, ".filter-icon");
	assert!(!panel.is_open());
	assert_eq!(body.style().get_property_value("overflow").unwrap(), "");

	click(&document, ".filter-icon");
	click(&document, "#filterCloseBtn");
	assert!(!panel.is_open());
	assert_eq!(body.style().get_property_value("overflow").unwrap(), "");
}

#[wasm_bindgen_test]
fn close_leaves_a_closed_panel_alone() {
	let (_, document) = mount(r#"<div class="filter"></div>"#);
	let panel = FilterPanel::find(&document, &Selectors::default()).unwrap();
	let body = document.body().unwrap();
	body.style().set_property("overflow", "scroll").unwrap();

	panel.close();
	assert_eq!(body.style().get_property_value("overflow").unwrap(), "scroll");
	body.style().remove_property("overflow").unwrap();
}

#[wasm_bindgen_test]
fn footer_toggles_flip_aria_expanded() {
	let (_, document) = mount(
		r#"
		<button class="footer-list__toggle" aria-expanded="false">Shop</button>
		<button class="footer-list__toggle">Help</button>
		"#,
	);
	let mut toggles = FooterToggles::new();
	toggles.bind(&document, &Selectors::default().footer_toggles);

	let buttons = document.query_selector_all(".footer-list__toggle").unwrap();
	let shop: HtmlElement = buttons.item(0).unwrap().dyn_into().unwrap();
	let help: HtmlElement = buttons.item(1).unwrap().dyn_into().unwrap();

	shop.click();
	assert_eq!(shop.get_attribute("aria-expanded").as_deref(), Some("true"));
	shop.click();
	assert_eq!(shop.get_attribute("aria-expanded").as_deref(), Some("false"));
	help.click();
	assert_eq!(help.get_attribute("aria-expanded").as_deref(), Some("true"));
}
