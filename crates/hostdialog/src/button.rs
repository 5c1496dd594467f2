#![forbid(unsafe_code)]

//! Footer buttons: declarative specs, rendering, and click dispatch.
//!
//! # Invariants
//!
//! - Buttons render left-to-right in list order; an empty list renders no
//!   footer at all.
//! - A button is focus-eligible when it is the only button and its
//!   `set_focus` is not `Some(false)`, or when `set_focus` is `Some(true)`.
//! - While a callback runs, every footer button is disabled.
//! - After the callback the clicked footer is re-enabled, even if the
//!   dialog was hidden. A footer rebuilt by the callback is left alone.
//!
//! # Failure Modes
//!
//! - A callback returning `Err` or panicking is reported through
//!   [`Host::alert`](crate::Host::alert); dispatch continues normally.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::{Rc, Weak};

use crate::dialog::DialogCore;
use crate::dom::{Content, NodeId};
use crate::error::{CallbackError, DialogError};
use crate::host::Host;
use crate::markup::{
    BUTTON_CLASS, BUTTON_FOCUS_CLASS, FOOTER_BUTTONS_SELECTOR, FOOTER_SELECTOR, button_element_id,
};

/// Zero-argument action run when a button is clicked.
pub type ButtonCallback = Rc<dyn Fn() -> Result<(), CallbackError>>;

/// A button in the dialog footer.
#[derive(Clone)]
pub struct ButtonSpec {
    /// Label, inserted as markup unless built with [`Content::text`].
    pub label: Content,
    pub callback: Option<ButtonCallback>,
    /// `None` lets a lone button take focus; `Some(false)` opts out.
    pub set_focus: Option<bool>,
    /// Keep the dialog open while (and after) the callback runs.
    pub prevent_close: bool,
    /// Stable id for later enable/disable.
    pub internal_id: Option<String>,
}

impl ButtonSpec {
    /// Create a button with a label and no action.
    pub fn new(label: impl Into<Content>) -> Self {
        Self {
            label: label.into(),
            callback: None,
            set_focus: None,
            prevent_close: false,
            internal_id: None,
        }
    }

    /// The default "OK" button.
    pub fn ok() -> Self {
        Self::new("OK")
    }

    /// Run `callback` on click.
    pub fn on_click(mut self, callback: impl Fn() -> Result<(), CallbackError> + 'static) -> Self {
        self.callback = Some(Rc::new(callback));
        self
    }

    /// Explicitly request or refuse focus.
    pub fn focus(mut self, focus: bool) -> Self {
        self.set_focus = Some(focus);
        self
    }

    /// Keep the dialog open on click.
    pub fn prevent_close(mut self) -> Self {
        self.prevent_close = true;
        self
    }

    /// Address the rendered button by `id` later.
    pub fn internal_id(mut self, id: impl Into<String>) -> Self {
        self.internal_id = Some(id.into());
        self
    }

    /// Whether this button receives focus in a list of `count` buttons.
    pub fn wants_focus(&self, count: usize) -> bool {
        match self.set_focus {
            Some(focus) => focus,
            None => count == 1,
        }
    }
}

impl fmt::Debug for ButtonSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ButtonSpec")
            .field("label", &self.label)
            .field("callback", &self.callback.is_some())
            .field("set_focus", &self.set_focus)
            .field("prevent_close", &self.prevent_close)
            .field("internal_id", &self.internal_id)
            .finish()
    }
}

/// Rebuild the footer from `buttons`; returns the focus targets in order.
pub(crate) fn render_footer(
    core: &Rc<DialogCore>,
    buttons: &[ButtonSpec],
) -> Result<Vec<NodeId>, DialogError> {
    let dom = core.dom();
    let generation = core.next_footer_generation();
    let mut focus = Vec::new();

    let Some(footer) = dom.query(FOOTER_SELECTOR) else {
        return Ok(focus);
    };
    dom.remove_children(footer);

    for spec in buttons {
        let node = dom.create_element("button")?;
        dom.set_attribute(node, "type", "button");
        dom.add_class(node, BUTTON_CLASS);
        if spec.wants_focus(buttons.len()) {
            dom.add_class(node, BUTTON_FOCUS_CLASS);
            focus.push(node);
        }
        dom.set_content(node, &spec.label);
        if let Some(id) = spec.internal_id.as_deref().filter(|id| !id.is_empty()) {
            dom.set_attribute(
                node,
                "id",
                &button_element_id(&core.config().button_id_prefix, id),
            );
        }

        let weak = Rc::downgrade(core);
        let callback = spec.callback.clone();
        let prevent_close = spec.prevent_close;
        dom.on_click(
            node,
            Rc::new(move || dispatch(&weak, generation, callback.clone(), prevent_close)),
        );
        dom.append_child(footer, node)?;
    }

    tracing::debug!(count = buttons.len(), generation, "footer rebuilt");
    Ok(focus)
}

fn dispatch(
    core: &Weak<DialogCore>,
    generation: u64,
    callback: Option<ButtonCallback>,
    prevent_close: bool,
) {
    let Some(core) = core.upgrade() else {
        return;
    };
    set_footer_disabled(&core, true);

    if !prevent_close {
        core.hide_dialog();
    }
    if let Some(callback) = callback {
        invoke_guarded(core.host(), || callback());
    }

    if core.footer_generation() == generation {
        set_footer_disabled(&core, false);
    } else {
        tracing::debug!(generation, "footer replaced during callback; not re-enabling");
    }
}

fn set_footer_disabled(core: &DialogCore, disabled: bool) {
    let dom = core.dom();
    for button in dom.query_all(FOOTER_BUTTONS_SELECTOR) {
        dom.set_disabled(button, disabled);
    }
}

/// Run a caller callback inside the failure boundary.
///
/// Returns `false` when the callback failed; the failure has already been
/// reported through the host alert.
pub(crate) fn invoke_guarded(
    host: &dyn Host,
    callback: impl FnOnce() -> Result<(), CallbackError>,
) -> bool {
    let message = match catch_unwind(AssertUnwindSafe(callback)) {
        Ok(Ok(())) => return true,
        Ok(Err(err)) => err.to_string(),
        Err(payload) => panic_message(payload.as_ref()),
    };
    tracing::warn!(error = %message, "dialog callback failed");
    host.alert(&message);
    false
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_owned()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "dialog callback panicked".to_owned()
    }
}

/// Enable or disable the button rendered for `internal_id`.
pub(crate) fn set_enabled(
    core: &DialogCore,
    internal_id: Option<&str>,
    enabled: bool,
) -> Result<(), DialogError> {
    let id = internal_id
        .filter(|id| !id.is_empty())
        .ok_or(DialogError::ArgumentMissing("internal_id"))?;
    // Matched by attribute: ids are caller text and need not be valid selectors.
    let element_id = button_element_id(&core.config().button_id_prefix, id);
    let dom = core.dom();
    let node = dom
        .query_all(FOOTER_BUTTONS_SELECTOR)
        .into_iter()
        .find(|&node| dom.attribute(node, "id").as_deref() == Some(element_id.as_str()))
        .ok_or_else(|| DialogError::ButtonNotFound(id.to_owned()))?;
    dom.set_disabled(node, !enabled);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct RecordingHost(RefCell<Vec<String>>);

    impl Host for RecordingHost {
        fn alert(&self, message: &str) {
            self.0.borrow_mut().push(message.to_owned());
        }

        fn client_url(&self) -> Option<String> {
            None
        }
    }

    #[test]
    fn lone_button_takes_focus_unless_refused() {
        assert!(ButtonSpec::ok().wants_focus(1));
        assert!(!ButtonSpec::ok().focus(false).wants_focus(1));
    }

    #[test]
    fn multi_button_focus_is_opt_in() {
        assert!(!ButtonSpec::new("Yes").wants_focus(2));
        assert!(ButtonSpec::new("No").focus(true).wants_focus(2));
    }

    #[test]
    fn builder_sets_fields() {
        let spec = ButtonSpec::new("Save")
            .internal_id("save")
            .prevent_close()
            .on_click(|| Ok(()));
        assert_eq!(spec.label, Content::markup("Save"));
        assert_eq!(spec.internal_id.as_deref(), Some("save"));
        assert!(spec.prevent_close);
        assert!(spec.callback.is_some());
        assert!(format!("{spec:?}").contains("callback: true"));
    }

    #[test]
    fn guarded_error_is_alerted() {
        let host = RecordingHost(RefCell::new(Vec::new()));
        let ok = invoke_guarded(&host, || Err("save failed".into()));
        assert!(!ok);
        assert_eq!(host.0.borrow().as_slice(), ["save failed"]);
    }

    #[test]
    fn guarded_panic_is_alerted() {
        let host = RecordingHost(RefCell::new(Vec::new()));
        let ok = invoke_guarded(&host, || panic!("boom"));
        assert!(!ok);
        assert_eq!(host.0.borrow().as_slice(), ["boom"]);
    }

    #[test]
    fn guarded_success_is_silent() {
        let host = RecordingHost(RefCell::new(Vec::new()));
        assert!(invoke_guarded(&host, || Ok(())));
        assert!(host.0.borrow().is_empty());
    }
}
