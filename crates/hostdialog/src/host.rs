#![forbid(unsafe_code)]

//! Host environment seam: the page that embeds the dialog.

/// Services the embedding page provides to the widget.
pub trait Host {
    /// Show a blocking, user-visible alert.
    fn alert(&self, message: &str);

    /// Base URL of the current client application, if the host knows it.
    ///
    /// Only used to build default resource and workflow URLs; every call
    /// that needs it also accepts an explicit override.
    fn client_url(&self) -> Option<String>;

    /// Location of the calling window, for diagnostics.
    fn location(&self) -> Option<String> {
        None
    }
}
