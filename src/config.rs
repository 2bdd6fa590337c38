//! Page configuration.
//!
//! Every value has a default matching the storefront theme's markup, so the host page only needs to pass
//! the fields it overrides:
//!
//! ```js
//! new CollectionPage({ labels: { pending: "Wird hinzugefügt..." }, fieldMatching: "keyed" });
//! ```

use serde::Deserialize;
use wasm_bindgen::JsValue;

use crate::Result;

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
	pub selectors: Selectors,
	pub endpoints: Endpoints,
	pub labels: Labels,
	pub timing: Timing,
	pub field_matching: FieldMatching,
}

impl Config {
	/// Decodes a configuration object handed over from JavaScript.
	///
	/// `undefined` and `null` yield [`Config::default()`].
	///
	/// # Errors
	///
	/// Iff `value` is present but doesn't have the expected shape.
	pub fn from_js(value: JsValue) -> Result<Self> {
		if value.is_undefined() || value.is_null() {
			return Ok(Self::default());
		}
		Ok(serde_wasm_bindgen::from_value(value)?)
	}
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Selectors {
	pub filter_form_id: String,
	pub products_grid: String,
	pub filter_sidebar: String,
	pub pagination: String,
	pub pagination_links: String,
	pub product_count: String,
	pub active_filters: String,
	pub active_filter_chip: String,
	pub active_filter_remove_links: String,
	pub clear_all_button: String,
	pub submit_button: String,
	pub checkboxes: String,
	pub checked_checkboxes: String,
	pub price_inputs: String,
	pub sort_select: String,
	pub add_to_cart_buttons: String,
	pub variant_id_attribute: String,
	pub cart_count_bubbles: String,
	pub cart_counts: String,
	pub filter_panel: String,
	pub filter_panel_open_class: String,
	pub filter_icon: String,
	pub filter_close_button_id: String,
	pub footer_toggles: String,
}

impl Default for Selectors {
	fn default() -> Self {
		Self {
			filter_form_id: "filterForm".to_owned(),
			products_grid: ".products-grid".to_owned(),
			filter_sidebar: ".filter-sidebar".to_owned(),
			pagination: ".pagination".to_owned(),
			pagination_links: ".pagination a".to_owned(),
			product_count: ".product-count".to_owned(),
			active_filters: r#"div[style*="border-top"]"#.to_owned(),
			active_filter_chip: r#"div[style*="background: #000"]"#.to_owned(),
			active_filter_remove_links: r#"div[style*="border-top"] a[href*="url_to_remove"], div[style*="border-top"] a[style*="color: #fff"]"#.to_owned(),
			clear_all_button: ".clear-all-btn".to_owned(),
			submit_button: r#"button[type="submit"]"#.to_owned(),
			checkboxes: r#"input[type="checkbox"]"#.to_owned(),
			checked_checkboxes: r#"input[type="checkbox"]:checked"#.to_owned(),
			price_inputs: r#"input[type="number"]"#.to_owned(),
			sort_select: ".sort-select".to_owned(),
			add_to_cart_buttons: ".add-to-cart-btn:not(.add-to-cart-link):not(.add-to-cart-sold-out)".to_owned(),
			variant_id_attribute: "data-variant-id".to_owned(),
			cart_count_bubbles: ".cart-count-bubble".to_owned(),
			cart_counts: "[data-cart-count]".to_owned(),
			filter_panel: ".filter".to_owned(),
			filter_panel_open_class: "filter-open".to_owned(),
			filter_icon: ".filter-icon".to_owned(),
			filter_close_button_id: "filterCloseBtn".to_owned(),
			footer_toggles: ".footer-list__toggle".to_owned(),
		}
	}
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Endpoints {
	pub cart_read: String,
	pub cart_add: String,
	pub ajax_header_name: String,
	pub ajax_header_value: String,
	/// Name of the [`CustomEvent`](web_sys::CustomEvent) dispatched on `<html>` after each successful add.
	pub cart_changed_event: String,
}

impl Default for Endpoints {
	fn default() -> Self {
		Self {
			cart_read: "/cart.js".to_owned(),
			cart_add: "/cart/add.js".to_owned(),
			ajax_header_name: "X-Requested-With".to_owned(),
			ajax_header_value: "XMLHttpRequest".to_owned(),
			cart_changed_event: "cart:refresh".to_owned(),
		}
	}
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Labels {
	pub pending: String,
	pub confirmed: String,
	pub failed: String,
	/// Used when a button had no text of its own to restore.
	pub default: String,
	pub filter_error_alert: String,
	/// Chip text marking the price range chip.
	pub price_chip_marker: String,
}

impl Default for Labels {
	fn default() -> Self {
		Self {
			pending: "Adding...".to_owned(),
			confirmed: "Added to Cart".to_owned(),
			failed: "Error".to_owned(),
			default: "Add to Cart".to_owned(),
			filter_error_alert: "Error applying filters. Please try again.".to_owned(),
			price_chip_marker: "Price:".to_owned(),
		}
	}
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Timing {
	pub label_reset_ms: u32,
	/// Grace period for the browser to restore form state (back/forward cache) before auto-applying.
	pub restore_settle_ms: u32,
}

impl Default for Timing {
	fn default() -> Self {
		Self {
			label_reset_ms: 2000,
			restore_settle_ms: 100,
		}
	}
}

/// How sidebar controls in a fetched document are paired with the live ones.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FieldMatching {
	/// `old[i] ↔ new[i]`. Mis-maps silently if the server reorders options between requests.
	#[default]
	Positional,
	/// Checkboxes by `name` and `value`, number inputs by `name`.
	Keyed,
}
