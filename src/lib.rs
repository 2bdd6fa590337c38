#![doc(html_root_url = "https://docs.rs/collection-dom/0.0.1")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod cart;
pub mod config;
mod error;
pub mod filter;
pub mod footer;
pub mod fragment;
pub mod http;
pub mod listeners;
pub mod page;
pub mod panel;
pub mod query;
pub mod reconcile;
pub mod state;

pub use error::{Error, Result};
pub use page::CollectionPage;

/// Passes `value` through iff the `dangerous-logging` feature is enabled.
///
/// Query strings, URLs and variant ids can identify a shopper's browsing, so they are kept out of logs by default.
#[must_use]
pub fn redacted(value: &str) -> &str {
	if cfg!(feature = "dangerous-logging") {
		value
	} else {
		"<redacted>"
	}
}
