#![forbid(unsafe_code)]

//! Test harness for hostdialog.
//!
//! Provides an in-memory document ([`FakeDom`]), a recording host
//! ([`FakeHost`]) and scripted embedded frames ([`FakeFrame`]) so the
//! dialog can be driven end to end without a browser.
//!
//! # Example
//!
//! ```
//! use hostdialog::{DialogOptions, Scope};
//! use hostdialog_harness::Fixture;
//!
//! let fx = Fixture::new();
//! fx.dialog.show(DialogOptions::alert("Saved", "Done.")).unwrap();
//! assert!(fx.root_visible());
//! fx.dialog.hide(Scope::Form);
//! assert!(!fx.root_visible());
//! ```

pub mod fake_dom;
pub mod fake_host;
pub mod parse;

use std::rc::Rc;

use hostdialog::markup::{FOOTER_BUTTONS_SELECTOR, FRAME_SELECTOR, ROOT_SELECTOR};
use hostdialog::{Dom, ModalDialog, NodeId};

pub use fake_dom::{FakeDom, FrameMode};
pub use fake_host::{FakeFrame, FakeHost};

/// Install a test-friendly tracing subscriber once per process.
///
/// Honors `RUST_LOG`; defaults to `hostdialog=debug`.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("hostdialog=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// A dialog attached to a fresh fake document and host.
pub struct Fixture {
    pub dom: Rc<FakeDom>,
    pub host: Rc<FakeHost>,
    pub dialog: ModalDialog,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_host(FakeHost::new())
    }

    pub fn with_host(host: FakeHost) -> Self {
        init_tracing();
        let dom = Rc::new(FakeDom::new());
        let host = Rc::new(host);
        let dialog = ModalDialog::attach(dom.clone(), host.clone());
        Self { dom, host, dialog }
    }

    /// Another handle attached to the same document and host.
    pub fn second_handle(&self) -> ModalDialog {
        ModalDialog::attach(self.dom.clone(), self.host.clone())
    }

    /// The node for `selector`; panics when it is missing.
    pub fn node(&self, selector: &str) -> NodeId {
        self.dom
            .query(selector)
            .unwrap_or_else(|| panic!("no element matches {selector}"))
    }

    pub fn root_visible(&self) -> bool {
        self.dom
            .query(ROOT_SELECTOR)
            .is_some_and(|root| self.dom.is_visible(root))
    }

    /// Footer buttons, left to right.
    pub fn buttons(&self) -> Vec<NodeId> {
        self.dom.query_all(FOOTER_BUTTONS_SELECTOR)
    }

    /// Labels of the footer buttons, left to right.
    pub fn button_labels(&self) -> Vec<String> {
        self.buttons()
            .into_iter()
            .map(|button| self.dom.text_content(button))
            .collect()
    }

    /// Click the `index`th footer button.
    pub fn click_button(&self, index: usize) {
        let buttons = self.buttons();
        let button = buttons
            .get(index)
            .copied()
            .unwrap_or_else(|| panic!("no footer button at {index}"));
        self.dom.click(button);
    }

    /// Fire the embedded frame's load event.
    pub fn load_frame(&self) {
        let frame = self.node(FRAME_SELECTOR);
        self.dom.fire_load(frame);
    }
}
