use hostdialog::Host;
use web_sys::Window;

/// The page that drives the dialog.
pub struct WebHost {
    window: Window,
    client_url: Option<String>,
}

impl WebHost {
    /// Host over `window`; `client_url` is the application's base URL.
    pub fn new(window: Window, client_url: Option<String>) -> Self {
        Self { window, client_url }
    }

    /// Host over the current window, if there is one.
    pub fn current(client_url: Option<String>) -> Option<Self> {
        web_sys::window().map(|window| Self::new(window, client_url))
    }

    pub fn window(&self) -> &Window {
        &self.window
    }
}

impl Host for WebHost {
    fn alert(&self, message: &str) {
        if self.window.alert_with_message(message).is_err() {
            tracing::warn!(message, "window alert unavailable");
        }
    }

    fn client_url(&self) -> Option<String> {
        self.client_url.clone()
    }

    fn location(&self) -> Option<String> {
        self.window.location().href().ok()
    }
}
