//! Splices regions of a freshly fetched document into the live one.
//!
//! Whole regions (product grid, pagination, chip block, …) are reconciled by presence, see [`RegionOutcome`].
//! Sidebar form controls are reconciled field by field instead, so the live controls (and the form they belong
//! to) keep their identity while their state and labels follow the fetched page.

use core::hash::Hash;
use hashbrown::{hash_map::Entry, HashMap};
use std::collections::VecDeque;
use tracing::{debug, error, instrument, trace, warn};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlInputElement, HtmlSelectElement, Node};

use crate::{config::FieldMatching, fragment::import, fragment::Scope, Result};

/// What happens to one tracked region, given whether it exists in the live (`old`) and fetched (`new`) document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionOutcome {
	/// Both exist: the old region's content is replaced by the new region's.
	Replace,
	/// Only the new one exists: a copy is inserted at the region's anchor.
	Insert,
	/// Only the old one exists: it is removed.
	Remove,
	/// Neither exists, or the region is persistent and missing from one side.
	Untouched,
}

impl RegionOutcome {
	/// Persistent regions (the product grid) are only ever replaced.
	#[must_use]
	pub fn decide(old: bool, new: bool, persistent: bool) -> Self {
		match (old, new) {
			(true, true) => RegionOutcome::Replace,
			_ if persistent => RegionOutcome::Untouched,
			(false, true) => RegionOutcome::Insert,
			(true, false) => RegionOutcome::Remove,
			(false, false) => RegionOutcome::Untouched,
		}
	}
}

/// Where a region appears when it's new.
#[derive(Debug, Clone)]
pub enum Anchor {
	/// Appended as last child.
	AppendTo(Element),
	/// Inserted as previous sibling.
	Before(Element),
	/// The region can't be inserted (it is persistent, or its anchor is missing from the live document).
	Nowhere,
}

#[derive(Debug, Clone)]
pub struct Region<'a> {
	pub name: &'static str,
	pub old: Option<Element>,
	pub new: Option<&'a Element>,
	pub anchor: Anchor,
	pub persistent: bool,
}

impl Region<'_> {
	/// Applies the region's [`RegionOutcome`] to the live document `document`.
	#[instrument(skip(self, document), fields(region = self.name))]
	pub fn reconcile(self, document: &Document) -> Result<RegionOutcome> {
		let outcome = RegionOutcome::decide(self.old.is_some(), self.new.is_some(), self.persistent);
		match (outcome, &self.old, self.new) {
			(RegionOutcome::Replace, Some(old), Some(new)) => old.set_inner_html(&new.inner_html()),
			(RegionOutcome::Insert, None, Some(new)) => {
				let copy = import(document, new)?;
				match &self.anchor {
					Anchor::AppendTo(parent) => {
						parent.append_child(&copy)?;
					}
					Anchor::Before(sibling) => match sibling.parent_node() {
						Some(parent) => {
							let sibling: &Node = sibling;
							parent.insert_before(&copy, Some(sibling))?;
						}
						None => {
							warn!("Anchor of new {} region is detached. Skipping insertion.", self.name);
							return Ok(RegionOutcome::Untouched);
						}
					},
					Anchor::Nowhere => {
						debug!("No anchor for new {} region. Skipping insertion.", self.name);
						return Ok(RegionOutcome::Untouched);
					}
				}
			}
			(RegionOutcome::Remove, Some(old), None) => old.remove(),
			(RegionOutcome::Untouched, ..) => (),
			(outcome, old, new) => {
				error!("collection-dom bug: {:?} decided for old: {}, new: {}", outcome, old.is_some(), new.is_some());
				return Ok(RegionOutcome::Untouched);
			}
		}
		trace!(?outcome, "Region reconciled.");
		Ok(outcome)
	}
}

/// Positional pairing: `old[i] ↔ new[i]` for every index both sides have.
pub fn pair_positional(old_len: usize, new_len: usize) -> impl Iterator<Item = (usize, usize)> {
	(0..old_len.min(new_len)).map(|i| (i, i))
}

/// Keyed pairing: each new key is matched to the first not yet matched old entry with an equal key.
///
/// Returns `(old, new)` index pairs in new order. Unmatched entries on either side are left out.
pub fn pair_keyed<K: Eq + Hash>(old: &[K], new: &[K]) -> Vec<(usize, usize)> {
	let mut unmatched = HashMap::<&K, VecDeque<usize>>::new();
	for (i, key) in old.iter().enumerate() {
		match unmatched.entry(key) {
			Entry::Occupied(mut occupied) => occupied.get_mut().push_back(i),
			Entry::Vacant(vacant) => {
				vacant.insert(VecDeque::from([i]));
			}
		}
	}

	new.iter()
		.enumerate()
		.filter_map(|(j, key)| unmatched.get_mut(key).and_then(VecDeque::pop_front).map(|i| (i, j)))
		.collect()
}

/// Selectors for the sidebar controls that are reconciled field by field.
#[derive(Debug, Clone, Copy)]
pub struct FieldSelectors<'a> {
	pub checkboxes: &'a str,
	pub price_inputs: &'a str,
	pub sort_select: &'a str,
}

fn pairs<K: Eq + Hash>(matching: FieldMatching, old: &[K], new: &[K]) -> Vec<(usize, usize)> {
	match matching {
		FieldMatching::Positional => pair_positional(old.len(), new.len()).collect(),
		FieldMatching::Keyed => pair_keyed(old, new),
	}
}

/// Copies checkbox states and labels, price values and the sort selection from `new_sidebar` onto `old_sidebar`.
#[instrument(skip(old_sidebar, new_sidebar))]
pub fn reconcile_fields(old_sidebar: &Element, new_sidebar: &Element, selectors: FieldSelectors<'_>, matching: FieldMatching) {
	let old_checkboxes: Vec<HtmlInputElement> = old_sidebar.find_all(selectors.checkboxes);
	let new_checkboxes: Vec<HtmlInputElement> = new_sidebar.find_all(selectors.checkboxes);
	let checkbox_key = |checkbox: &HtmlInputElement| (checkbox.name(), checkbox.value());
	let checkbox_pairs = pairs(
		matching,
		&old_checkboxes.iter().map(checkbox_key).collect::<Vec<_>>(),
		&new_checkboxes.iter().map(checkbox_key).collect::<Vec<_>>(),
	);
	for &(i, j) in &checkbox_pairs {
		let (old, new) = (&old_checkboxes[i], &new_checkboxes[j]);
		if let (Some(old_label), Some(new_label)) = (old.next_element_sibling(), new.next_element_sibling()) {
			old_label.set_inner_html(&new_label.inner_html());
		}
		old.set_checked(new.checked());
	}

	let old_prices: Vec<HtmlInputElement> = old_sidebar.find_all(selectors.price_inputs);
	let new_prices: Vec<HtmlInputElement> = new_sidebar.find_all(selectors.price_inputs);
	let price_pairs = pairs(
		matching,
		&old_prices.iter().map(HtmlInputElement::name).collect::<Vec<_>>(),
		&new_prices.iter().map(HtmlInputElement::name).collect::<Vec<_>>(),
	);
	for &(i, j) in &price_pairs {
		old_prices[i].set_value(&new_prices[j].value());
	}

	let old_sort = old_sidebar.find(selectors.sort_select).and_then(|e| e.dyn_into::<HtmlSelectElement>().ok());
	let new_sort = new_sidebar.find(selectors.sort_select).and_then(|e| e.dyn_into::<HtmlSelectElement>().ok());
	if let (Some(old_sort), Some(new_sort)) = (old_sort, new_sort) {
		old_sort.set_value(&new_sort.value());
	}

	debug!(
		checkboxes = checkbox_pairs.len(),
		unmatched_checkboxes = new_checkboxes.len() - checkbox_pairs.len(),
		prices = price_pairs.len(),
		"Sidebar fields reconciled."
	);
}
