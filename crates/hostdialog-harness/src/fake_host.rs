#![forbid(unsafe_code)]

//! Recording doubles for the host page and embedded frames.

use std::cell::{Cell, RefCell};

use hostdialog::{EmbeddedContext, FrameAccessError, Host};
use serde_json::Value;

/// Host page that records alerts instead of blocking.
#[derive(Debug, Default)]
pub struct FakeHost {
    alerts: RefCell<Vec<String>>,
    client_url: RefCell<Option<String>>,
    location: Option<String>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host whose client URL is `url`.
    pub fn with_client_url(url: impl Into<String>) -> Self {
        Self {
            client_url: RefCell::new(Some(url.into())),
            ..Self::default()
        }
    }

    /// Same host, served from `url`.
    pub fn with_location(mut self, url: impl Into<String>) -> Self {
        self.location = Some(url.into());
        self
    }

    pub fn set_client_url(&self, url: Option<String>) {
        *self.client_url.borrow_mut() = url;
    }

    /// Every alert shown so far, oldest first.
    pub fn alerts(&self) -> Vec<String> {
        self.alerts.borrow().clone()
    }
}

impl Host for FakeHost {
    fn alert(&self, message: &str) {
        tracing::debug!(message, "host alert");
        self.alerts.borrow_mut().push(message.to_owned());
    }

    fn client_url(&self) -> Option<String> {
        self.client_url.borrow().clone()
    }

    fn location(&self) -> Option<String> {
        self.location.clone()
    }
}

/// Embedded browsing context with a scripted `getResponse`.
#[derive(Debug)]
pub struct FakeFrame {
    url: Option<String>,
    response: Result<Value, FrameAccessError>,
    calls: Cell<usize>,
}

impl FakeFrame {
    /// Content whose `getResponse` returns `value`.
    pub fn responding(url: impl Into<String>, value: Value) -> Self {
        Self {
            url: Some(url.into()),
            response: Ok(value),
            calls: Cell::new(0),
        }
    }

    /// Content without a `getResponse` entry point.
    pub fn without_entry_point(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            response: Err(FrameAccessError::EntryPointMissing("getResponse")),
            calls: Cell::new(0),
        }
    }

    /// How many times `getResponse` was invoked.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl EmbeddedContext for FakeFrame {
    fn url(&self) -> Option<String> {
        self.url.clone()
    }

    fn call_response(&self) -> Result<Value, FrameAccessError> {
        self.calls.set(self.calls.get() + 1);
        self.response.clone()
    }
}
