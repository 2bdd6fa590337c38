//! Filter query strings, independent of the DOM.

use hashbrown::HashSet;
use url::{form_urlencoded, Url};

use crate::{Error, Result};

/// Ordered `name=value` pairs of a serialized filter form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterQuery {
	pairs: Vec<(String, String)>,
}

impl FilterQuery {
	/// Collects form entries, dropping blank values and every entry named `omitted` (the sort field while it's on
	/// its default option), so an untouched form serializes to no parameters at all.
	pub fn from_pairs<I, N, V>(pairs: I, omitted: Option<&str>) -> Self
	where
		I: IntoIterator<Item = (N, V)>,
		N: Into<String>,
		V: Into<String>,
	{
		Self {
			pairs: pairs
				.into_iter()
				.map(|(name, value)| (name.into(), value.into()))
				.filter(|(name, value)| !value.trim().is_empty() && Some(name.as_str()) != omitted)
				.collect(),
		}
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.pairs.is_empty()
	}

	#[must_use]
	pub fn pairs(&self) -> &[(String, String)] {
		&self.pairs
	}

	#[must_use]
	pub fn to_query_string(&self) -> String {
		form_urlencoded::Serializer::new(String::new()).extend_pairs(&self.pairs).finish()
	}

	/// `path?query`, or just `path` if there is nothing to filter by.
	#[must_use]
	pub fn url_for(&self, path: &str) -> String {
		if self.is_empty() {
			path.to_owned()
		} else {
			format!("{}?{}", path, self.to_query_string())
		}
	}
}

/// The filter set an active-filter chip's remove link points at.
///
/// Checkboxes whose `name=value` pair is missing here are the ones the chip stands for.
#[derive(Debug, Clone, Default)]
pub struct RemovalTarget {
	pairs: HashSet<(String, String)>,
}

impl RemovalTarget {
	/// Parses `href` relative to `base` (the page's origin or location).
	///
	/// # Errors
	///
	/// Iff `base` isn't an absolute URL or `href` can't be resolved against it.
	pub fn parse(href: &str, base: &str) -> Result<Self> {
		let base = Url::parse(base).map_err(|source| Error::Url { url: base.to_owned(), source })?;
		let url = base.join(href).map_err(|source| Error::Url { url: href.to_owned(), source })?;
		Ok(Self {
			pairs: url.query_pairs().map(|(name, value)| (name.into_owned(), value.into_owned())).collect(),
		})
	}

	#[must_use]
	pub fn retains(&self, name: &str, value: &str) -> bool {
		self.pairs.contains(&(name.to_owned(), value.to_owned()))
	}
}

/// A price range is only worth a request once both bounds are entered.
#[must_use]
pub fn price_range_complete(min: &str, max: &str) -> bool {
	!min.is_empty() && !max.is_empty()
}
