#![cfg(target_arch = "wasm32")]

use collection_dom::{
	config::FieldMatching,
	fragment::{parse_document, Scope},
	reconcile::{reconcile_fields, Anchor, FieldSelectors, Region, RegionOutcome},
};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{Element, HtmlInputElement, HtmlSelectElement};

wasm_bindgen_test_configure!(run_in_browser);

mod web_fixture_;
use web_fixture_::mount;

const SELECTORS: FieldSelectors<'static> = FieldSelectors {
	checkboxes: r#"input[type="checkbox"]"#,
	price_inputs: r#"input[type="number"]"#,
	sort_select: ".sort-select",
};

fn sidebar(checkboxes: &[(&str, bool, &str)], prices: [&str; 2], sort: &str) -> String {
	let mut html = String::from(r#"<div class="filter-sidebar">"#);
	for (value, checked, label) in checkboxes {
		html += &format!(
			r#"<input type="checkbox" name="filter.v.option.color" value="{}"{}><label>{}</label>"#,
			value,
			if *checked { " checked" } else { "" },
			label
		);
	}
	html += &format!(
		r#"<input type="number" name="filter.v.price.gte" value="{}"><input type="number" name="filter.v.price.lte" value="{}">"#,
		prices[0], prices[1]
	);
	html += &format!(
		r#"<select class="sort-select" name="sort_by"><option value="manual">Featured</option><option value="price-ascending"{}>Price</option></select>"#,
		if sort == "price-ascending" { " selected" } else { "" }
	);
	html += "</div>";
	html
}

fn checkbox_states(sidebar: &Element) -> Vec<(String, bool, String)> {
	sidebar
		.find_all::<HtmlInputElement>(SELECTORS.checkboxes)
		.iter()
		.map(|checkbox| (checkbox.value(), checkbox.checked(), checkbox.next_element_sibling().unwrap().inner_html()))
		.collect()
}

#[wasm_bindgen_test]
fn positional_matching_copies_by_index_even_when_reordered() {
	let (_, document) = mount(&sidebar(&[("Red", false, "Red (4)"), ("Blue", false, "Blue (2)")], ["", ""], "manual"));
	let live = document.find(".filter-sidebar").unwrap();

	// The server swapped the option order and Blue is now checked.
	let fetched = parse_document(&sidebar(&[("Blue", true, "Blue (7)"), ("Red", false, "Red (1)")], ["10", "50"], "price-ascending")).unwrap();
	let new = fetched.find(".filter-sidebar").unwrap();

	reconcile_fields(&live, &new, SELECTORS, FieldMatching::Positional);

	// Index 0 is still the live "Red" box but carries the fetched index 0's state and label.
	assert_eq!(
		checkbox_states(&live),
		vec![("Red".to_owned(), true, "Blue (7)".to_owned()), ("Blue".to_owned(), false, "Red (1)".to_owned())]
	);
	let prices: Vec<String> = live.find_all::<HtmlInputElement>(SELECTORS.price_inputs).iter().map(HtmlInputElement::value).collect();
	assert_eq!(prices, vec!["10", "50"]);
	let sort: HtmlSelectElement = live.find(SELECTORS.sort_select).unwrap().dyn_into().unwrap();
	assert_eq!(sort.value(), "price-ascending");
}

#[wasm_bindgen_test]
fn keyed_matching_follows_name_and_value() {
	let (_, document) = mount(&sidebar(&[("Red", false, "Red (4)"), ("Blue", false, "Blue (2)")], ["", ""], "manual"));
	let live = document.find(".filter-sidebar").unwrap();

	let fetched = parse_document(&sidebar(&[("Blue", true, "Blue (7)"), ("Green", true, "Green (3)"), ("Red", false, "Red (1)")], ["", ""], "manual")).unwrap();
	let new = fetched.find(".filter-sidebar").unwrap();

	reconcile_fields(&live, &new, SELECTORS, FieldMatching::Keyed);

	assert_eq!(
		checkbox_states(&live),
		vec![("Red".to_owned(), false, "Red (1)".to_owned()), ("Blue".to_owned(), true, "Blue (7)".to_owned())]
	);
}

#[wasm_bindgen_test]
fn extra_fetched_checkboxes_are_ignored_positionally() {
	let (_, document) = mount(&sidebar(&[("Red", true, "Red (4)")], ["", ""], "manual"));
	let live = document.find(".filter-sidebar").unwrap();
	let fetched = parse_document(&sidebar(&[("Red", false, "Red (0)"), ("Blue", true, "Blue (9)")], ["", ""], "manual")).unwrap();

	reconcile_fields(&live, &fetched.find(".filter-sidebar").unwrap(), SELECTORS, FieldMatching::Positional);
	assert_eq!(checkbox_states(&live), vec![("Red".to_owned(), false, "Red (0)".to_owned())]);
}

const LISTING: &str = r#"
<div class="products-wrapper">
	<div class="products-grid"><div class="product">Old</div></div>
	<div class="pagination"><a href="?page=2">2</a></div>
</div>
"#;

#[wasm_bindgen_test]
fn pagination_is_removed_when_missing_from_fetched_page() {
	let (_, document) = mount(LISTING);
	let fetched = parse_document(r#"<div class="products-grid"><div class="product">Only one</div></div>"#).unwrap();

	let outcome = Region {
		name: "pagination",
		old: document.find(".pagination"),
		new: fetched.find(".pagination").as_ref(),
		anchor: Anchor::AppendTo(document.find(".products-wrapper").unwrap()),
		persistent: false,
	}
	.reconcile(&document)
	.unwrap();

	assert_eq!(outcome, RegionOutcome::Remove);
	assert!(document.find(".pagination").is_none());
}

#[wasm_bindgen_test]
fn pagination_is_inserted_when_it_appears() {
	let (_, document) = mount(r#"<div class="products-wrapper"><div class="products-grid"></div></div>"#);
	let fetched = parse_document(LISTING).unwrap();

	let outcome = Region {
		name: "pagination",
		old: document.find(".pagination"),
		new: fetched.find(".pagination").as_ref(),
		anchor: Anchor::AppendTo(document.find(".products-wrapper").unwrap()),
		persistent: false,
	}
	.reconcile(&document)
	.unwrap();

	assert_eq!(outcome, RegionOutcome::Insert);
	let pagination = document.find(".products-wrapper > .pagination").unwrap();
	assert_eq!(pagination.owner_document().unwrap(), document);
	assert!(pagination.inner_html().contains("page=2"));
}

#[wasm_bindgen_test]
fn persistent_grid_is_replaced_but_never_removed() {
	let (_, document) = mount(LISTING);
	let grid = document.find(".products-grid").unwrap();

	let fetched = parse_document(r#"<div class="products-grid"><div class="product">New</div></div>"#).unwrap();
	let outcome = Region {
		name: "product grid",
		old: Some(grid.clone()),
		new: fetched.find(".products-grid").as_ref(),
		anchor: Anchor::Nowhere,
		persistent: true,
	}
	.reconcile(&document)
	.unwrap();
	assert_eq!(outcome, RegionOutcome::Replace);
	assert_eq!(grid.inner_html(), r#"<div class="product">New</div>"#);

	let empty = parse_document("<p>Nothing here</p>").unwrap();
	let outcome = Region {
		name: "product grid",
		old: Some(grid.clone()),
		new: empty.find(".products-grid").as_ref(),
		anchor: Anchor::Nowhere,
		persistent: true,
	}
	.reconcile(&document)
	.unwrap();
	assert_eq!(outcome, RegionOutcome::Untouched);
	assert!(grid.is_connected());
}

#[wasm_bindgen_test]
fn clear_button_is_inserted_before_submit() {
	let (_, document) = mount(r#"<div class="filter-sidebar"><form><button type="submit">Apply</button></form></div>"#);
	let sidebar = document.find(".filter-sidebar").unwrap();
	let fetched = parse_document(r#"<div class="filter-sidebar"><a class="clear-all-btn" href="/collections/all">Clear all</a></div>"#).unwrap();

	Region {
		name: "clear all button",
		old: sidebar.find(".clear-all-btn"),
		new: fetched.find(".clear-all-btn").as_ref(),
		anchor: Anchor::Before(sidebar.find(r#"button[type="submit"]"#).unwrap()),
		persistent: false,
	}
	.reconcile(&document)
	.unwrap();

	let clear = sidebar.find(".clear-all-btn").unwrap();
	assert_eq!(clear.next_element_sibling().unwrap().tag_name(), "BUTTON");
}
