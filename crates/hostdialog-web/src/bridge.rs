//! Window `message` plumbing for the dismiss bridge.

use hostdialog::markup::FRAME_ID;
use hostdialog::{BridgeMessage, IncomingMessage, ModalDialog};
use js_sys::Object;
use serde_json::Value;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlIFrameElement, MessageEvent, Window};

use crate::normalize_origin;

/// Forwards window `message` events to a dialog; unsubscribes on drop.
///
/// Only events sent by the dialog's own frame are forwarded.
pub struct MessageListener {
    window: Window,
    callback: Closure<dyn FnMut(MessageEvent)>,
}

impl MessageListener {
    /// Listen on `window` (the top-level window the dialog renders in).
    pub fn install(window: &Window, dialog: &ModalDialog) -> Result<Self, JsValue> {
        let dialog = dialog.clone();
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("document is unavailable"))?;
        let callback = Closure::<dyn FnMut(MessageEvent)>::wrap(Box::new(
            move |event: MessageEvent| {
                if !sent_by_dialog_frame(&document, &event) {
                    return;
                }
                let Some(data) = event.data().as_string() else {
                    return;
                };
                let message = IncomingMessage::new(normalize_origin(&event.origin()), data);
                if dialog.handle_message(&message) {
                    tracing::debug!(origin = ?message.origin, "dismiss message handled");
                }
            },
        ));
        window.add_event_listener_with_callback("message", callback.as_ref().unchecked_ref())?;
        Ok(Self {
            window: window.clone(),
            callback,
        })
    }
}

fn sent_by_dialog_frame(document: &Document, event: &MessageEvent) -> bool {
    let Some(source) = event.source() else {
        return false;
    };
    document
        .get_element_by_id(FRAME_ID)
        .and_then(|frame| frame.dyn_into::<HtmlIFrameElement>().ok())
        .and_then(|frame| frame.content_window())
        .is_some_and(|frame_window| Object::is(frame_window.as_ref(), source.as_ref()))
}

impl Drop for MessageListener {
    fn drop(&mut self) {
        let _ = self
            .window
            .remove_event_listener_with_callback("message", self.callback.as_ref().unchecked_ref());
    }
}

/// Ask the page that embeds this document to close its dialog.
///
/// Call from inside the embedded content. `target_origin` is the origin
/// of the embedding page (`"*"` when unknown).
pub fn post_dismiss(response: Option<Value>, target_origin: &str) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("window is unavailable"))?;
    let parent = window
        .parent()?
        .ok_or_else(|| JsValue::from_str("no parent window"))?;
    let data = BridgeMessage::Dismiss { response }
        .encode()
        .map_err(|err| JsValue::from_str(&err.to_string()))?;
    parent.post_message(&JsValue::from_str(&data), target_origin)
}
