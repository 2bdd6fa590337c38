use thiserror::Error;
use wasm_bindgen::JsValue;

/// Everything that can go wrong while talking to the storefront endpoints or patching the live document.
#[derive(Debug, Error)]
pub enum Error {
	/// A Web API call threw.
	#[error("JavaScript exception: {0:?}")]
	Js(JsValue),

	#[error("{method} {url} answered with HTTP status {status}")]
	Status { method: &'static str, url: String, status: u16 },

	#[error("could not decode the response body: {0}")]
	Decode(#[from] serde_wasm_bindgen::Error),

	#[error("no element matches `{0}`")]
	MissingElement(String),

	#[error("invalid URL {url:?}: {source}")]
	Url { url: String, source: url::ParseError },

	/// A fetch cycle was driven through a transition its current state doesn't allow.
	#[error("cannot {event} while {state}")]
	InvalidTransition { state: &'static str, event: &'static str },
}

impl From<JsValue> for Error {
	fn from(value: JsValue) -> Self {
		Self::Js(value)
	}
}

impl From<Error> for JsValue {
	fn from(error: Error) -> Self {
		match error {
			Error::Js(value) => value,
			error => js_sys::Error::new(&error.to_string()).into(),
		}
	}
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
