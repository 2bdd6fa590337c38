//! Fetch cycle bookkeeping for the product container.
//!
//! ```text
//! Idle ──begin──▶ Loading ──finish(Ok)──▶ Succeeded ──settle──▶ Idle
//!                   │  ▲   ──finish(Err)─▶ Failed    ──settle──▶ Idle
//!                   └──┘ begin (supersedes the request in flight)
//! ```

use tracing::{debug, trace};

use crate::{Error, Result};

/// Sequence number of a fetch. Later requests always compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
	Idle,
	Loading { generation: Generation },
	Succeeded { generation: Generation },
	Failed { generation: Generation },
}

impl FetchState {
	#[must_use]
	pub fn name(self) -> &'static str {
		match self {
			FetchState::Idle => "idle",
			FetchState::Loading { .. } => "loading",
			FetchState::Succeeded { .. } => "succeeded",
			FetchState::Failed { .. } => "failed",
		}
	}

	#[must_use]
	pub fn is_loading(self) -> bool {
		matches!(self, FetchState::Loading { .. })
	}
}

/// What [`FetchCycle::finish`] decided about a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
	/// The response belongs to the latest request and may be applied.
	Current,
	/// A newer request was started in the meantime. The response must be dropped without touching the DOM.
	Superseded,
}

#[derive(Debug)]
pub struct FetchCycle {
	state: FetchState,
	latest: u64,
	last_settled: Option<FetchState>,
}

impl Default for FetchCycle {
	fn default() -> Self {
		Self::new()
	}
}

impl FetchCycle {
	#[must_use]
	pub fn new() -> Self {
		Self {
			state: FetchState::Idle,
			latest: 0,
			last_settled: None,
		}
	}

	#[must_use]
	pub fn state(&self) -> FetchState {
		self.state
	}

	/// The `Succeeded` or `Failed` state the most recent cycle settled from.
	#[must_use]
	pub fn last_settled(&self) -> Option<FetchState> {
		self.last_settled
	}

	/// Whether `generation` is the latest request, i.e. its response may still be applied.
	#[must_use]
	pub fn is_current(&self, generation: Generation) -> bool {
		generation.0 == self.latest
	}

	/// Starts a request, superseding any request still in flight.
	///
	/// # Errors
	///
	/// Iff the previous response is still being applied (state `Succeeded` or `Failed`).
	pub fn begin(&mut self) -> Result<Generation> {
		match self.state {
			FetchState::Idle | FetchState::Loading { .. } => {
				if let FetchState::Loading { generation } = self.state {
					debug!(?generation, "Superseding request in flight.");
				}
				self.latest += 1;
				let generation = Generation(self.latest);
				self.state = FetchState::Loading { generation };
				trace!(?generation, "Fetch cycle started.");
				Ok(generation)
			}
			state => Err(Error::InvalidTransition { state: state.name(), event: "begin a request" }),
		}
	}

	/// Records the outcome of the request `generation`.
	///
	/// # Errors
	///
	/// Iff `generation` is the latest request but the cycle isn't loading, i.e. it was finished twice.
	pub fn finish(&mut self, generation: Generation, succeeded: bool) -> Result<Completion> {
		if !self.is_current(generation) {
			trace!(?generation, latest = self.latest, "Discarding superseded response.");
			return Ok(Completion::Superseded);
		}
		match self.state {
			FetchState::Loading { generation: loading } if loading == generation => {
				self.state = if succeeded { FetchState::Succeeded { generation } } else { FetchState::Failed { generation } };
				Ok(Completion::Current)
			}
			state => Err(Error::InvalidTransition { state: state.name(), event: "finish a request" }),
		}
	}

	/// Returns to `Idle` once a finished response has been applied.
	///
	/// # Errors
	///
	/// Iff the cycle isn't in `Succeeded` or `Failed`.
	pub fn settle(&mut self) -> Result<()> {
		match self.state {
			state @ (FetchState::Succeeded { .. } | FetchState::Failed { .. }) => {
				self.last_settled = Some(state);
				self.state = FetchState::Idle;
				Ok(())
			}
			state => Err(Error::InvalidTransition { state: state.name(), event: "settle" }),
		}
	}
}
