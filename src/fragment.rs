use tracing::{error, trace};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, DomParser, Element, NodeList, SupportedType};

use crate::Result;

/// Parses a fetched page into a detached [`Document`]. Scripts in it don't run.
pub fn parse_document(html: &str) -> Result<Document> {
	let document = DomParser::new()?.parse_from_string(html, SupportedType::TextHtml)?;
	trace!(len = html.len(), "Parsed fetched document.");
	Ok(document)
}

/// Something selectors can be evaluated against.
pub trait Scope {
	fn try_find_all(&self, selector: &str) -> Result<NodeList, JsValue>;
	fn try_find(&self, selector: &str) -> Result<Option<Element>, JsValue>;

	/// First match, with invalid selectors logged and treated as no match.
	fn find(&self, selector: &str) -> Option<Element> {
		self.try_find(selector).unwrap_or_else(|error| {
			error!("Invalid selector {:?}: {:?}", selector, error);
			None
		})
	}

	/// All element matches of type `T` in document order, with invalid selectors logged and treated as no match.
	fn find_all<T: JsCast>(&self, selector: &str) -> Vec<T> {
		let nodes = match self.try_find_all(selector) {
			Ok(nodes) => nodes,
			Err(error) => {
				error!("Invalid selector {:?}: {:?}", selector, error);
				return Vec::new();
			}
		};
		(0..nodes.length()).filter_map(|i| nodes.item(i)).filter_map(|node| node.dyn_into::<T>().ok()).collect()
	}
}

impl Scope for Document {
	fn try_find_all(&self, selector: &str) -> Result<NodeList, JsValue> {
		self.query_selector_all(selector)
	}

	fn try_find(&self, selector: &str) -> Result<Option<Element>, JsValue> {
		self.query_selector(selector)
	}
}

impl Scope for Element {
	fn try_find_all(&self, selector: &str) -> Result<NodeList, JsValue> {
		self.query_selector_all(selector)
	}

	fn try_find(&self, selector: &str) -> Result<Option<Element>, JsValue> {
		self.query_selector(selector)
	}
}

/// Copies `node` (deeply) into `document`, so it can be inserted there.
pub fn import(document: &Document, node: &Element) -> Result<Element> {
	Ok(document.import_node_with_deep(node, true)?.unchecked_into())
}
