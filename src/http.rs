//! Thin `fetch` wrappers. Each one fails on transport errors and on non-success statuses.

use serde::{de::IgnoredAny, de::DeserializeOwned, Serialize};
use tracing::{instrument, trace};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response, Window};

use crate::{redacted, Error, Result};

/// Header marking a request as a partial-page fetch.
#[derive(Debug, Clone, Copy)]
pub struct AjaxHeader<'a> {
	pub name: &'a str,
	pub value: &'a str,
}

fn request(method: &'static str, url: &str, body: Option<&JsValue>) -> Result<Request> {
	let init = RequestInit::new();
	init.set_method(method);
	if let Some(body) = body {
		init.set_body(body);
	}
	Ok(Request::new_with_str_and_init(url, &init)?)
}

async fn send(window: &Window, method: &'static str, url: &str, request: &Request) -> Result<Response> {
	let response: Response = JsFuture::from(window.fetch_with_request(request)).await?.dyn_into()?;
	trace!(status = response.status(), "Response received.");
	if !response.ok() {
		return Err(Error::Status {
			method,
			url: redacted(url).to_owned(),
			status: response.status(),
		});
	}
	Ok(response)
}

async fn json<T: DeserializeOwned>(response: &Response) -> Result<T> {
	let value = JsFuture::from(response.json()?).await?;
	Ok(serde_wasm_bindgen::from_value(value)?)
}

/// `GET`s `url` and decodes the JSON body.
#[instrument(skip(window, url))]
pub async fn get_json<T: DeserializeOwned>(window: &Window, url: &str) -> Result<T> {
	let request = request("GET", url, None)?;
	let response = send(window, "GET", url, &request).await?;
	json(&response).await
}

/// `POST`s `body` as JSON. The response must be JSON too, but its content is ignored.
#[instrument(skip(window, url, body))]
pub async fn post_json<B: Serialize>(window: &Window, url: &str, body: &B) -> Result<()> {
	let body = js_sys::JSON::stringify(&serde_wasm_bindgen::to_value(body)?)?;
	let request = request("POST", url, Some(&body.into()))?;
	request.headers().set("Content-Type", "application/json")?;
	let response = send(window, "POST", url, &request).await?;

	let _: IgnoredAny = json(&response).await?;
	Ok(())
}

/// `GET`s `url` with the partial-page header and returns the body text.
#[instrument(skip(window, url, header))]
pub async fn get_html(window: &Window, url: &str, header: AjaxHeader<'_>) -> Result<String> {
	let request = request("GET", url, None)?;
	request.headers().set(header.name, header.value)?;
	let response = send(window, "GET", url, &request).await?;

	let text = JsFuture::from(response.text()?).await?;
	text.as_string().ok_or_else(|| Error::Js(JsValue::from_str("Response text was not a string.")))
}
