#![forbid(unsafe_code)]

//! Browser backend for hostdialog.
//!
//! - [`WebDom`] implements [`hostdialog::Dom`] over the top-level document.
//! - [`WebHost`] implements [`hostdialog::Host`] over a window.
//! - [`MessageListener`] feeds window `message` events to
//!   [`ModalDialog::handle_message`](hostdialog::ModalDialog::handle_message).
//! - [`post_dismiss`] is the embedded-side half of the dismiss bridge.
//!
//! Everything here needs a browser and only compiles for `wasm32`.

#[cfg(target_arch = "wasm32")]
mod bridge;
#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod host;

#[cfg(target_arch = "wasm32")]
pub use bridge::{MessageListener, post_dismiss};
#[cfg(target_arch = "wasm32")]
pub use dom::{IframeContext, WebDom};
#[cfg(target_arch = "wasm32")]
pub use host::WebHost;

/// Name of the entry point embedded content exposes for
/// [`ModalDialog::embedded_response`](hostdialog::ModalDialog::embedded_response).
pub const RESPONSE_ENTRY_POINT: &str = "getResponse";

/// Interpret a `MessageEvent.origin` value; opaque and empty origins carry
/// no information.
pub fn normalize_origin(origin: &str) -> Option<String> {
    match origin.trim() {
        "" | "null" => None,
        origin => Some(origin.to_owned()),
    }
}

/// Convert the `JSON.stringify` output of a response into a value.
///
/// `None` (an `undefined` response) becomes `null`.
pub fn response_from_json(json: Option<&str>) -> Result<serde_json::Value, serde_json::Error> {
    match json {
        Some(json) => serde_json::from_str(json),
        None => Ok(serde_json::Value::Null),
    }
}
