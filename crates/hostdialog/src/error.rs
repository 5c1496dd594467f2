#![forbid(unsafe_code)]

//! Error types for the dialog widget.
//!
//! # Failure Modes
//!
//! | Failure | Type | Behavior |
//! |---------|------|----------|
//! | Missing button id | [`DialogError::ArgumentMissing`] | Returned to caller |
//! | Unknown button id | [`DialogError::ButtonNotFound`] | Returned to caller |
//! | No client URL | [`DialogError::ClientUrlUnavailable`] | Returned to caller |
//! | Markup injection failed | [`DialogError::Dom`] | Returned from `show` |
//! | Embedded frame unreachable | [`FrameAccessError`] | Caught, degrades to `None` |
//! | Button callback failed | [`CallbackError`] | Caught, reported via `Host::alert` |

use std::fmt;

/// Error raised by a caller-supplied callback.
///
/// Never propagates out of the widget: the dispatch boundary reports it
/// through the host's blocking alert and carries on.
pub type CallbackError = Box<dyn std::error::Error>;

/// Errors returned by [`ModalDialog`](crate::ModalDialog) operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogError {
    /// A required argument was absent or empty.
    ArgumentMissing(&'static str),
    /// No rendered footer button carries the given internal id.
    ButtonNotFound(String),
    /// Neither the caller nor the host supplied a base client URL.
    ClientUrlUnavailable,
    /// A URL could not be built from the supplied parts.
    InvalidUrl(String),
    /// The DOM capability refused an operation.
    Dom(DomError),
}

impl fmt::Display for DialogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArgumentMissing(name) => write!(f, "argument missing: {name}"),
            Self::ButtonNotFound(id) => write!(f, "no dialog button with internal id '{id}'"),
            Self::ClientUrlUnavailable => write!(f, "client url is unavailable"),
            Self::InvalidUrl(msg) => write!(f, "invalid url: {msg}"),
            Self::Dom(err) => write!(f, "dom error: {err}"),
        }
    }
}

impl std::error::Error for DialogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Dom(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DomError> for DialogError {
    fn from(err: DomError) -> Self {
        Self::Dom(err)
    }
}

impl From<url::ParseError> for DialogError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

/// Errors reported by a [`Dom`](crate::dom::Dom) implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    /// The top-level document (or its body/head) is not reachable.
    DocumentUnavailable,
    /// An element of the given tag could not be created.
    ElementCreation(String),
    /// Markup or style could not be inserted.
    MarkupInsertion(String),
    /// The node handle no longer resolves to an element.
    StaleNode,
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DocumentUnavailable => write!(f, "top-level document is unavailable"),
            Self::ElementCreation(tag) => write!(f, "failed to create <{tag}> element"),
            Self::MarkupInsertion(msg) => write!(f, "failed to insert markup: {msg}"),
            Self::StaleNode => write!(f, "node handle is stale"),
        }
    }
}

impl std::error::Error for DomError {}

/// Failure to reach into an embedded frame's browsing context.
///
/// Always caught at the access site; callers only ever observe `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameAccessError {
    /// The frame has no browsing context yet.
    NotLoaded,
    /// The browsing context is cross-origin.
    SecurityRestricted,
    /// The embedded content does not expose the requested entry point.
    EntryPointMissing(&'static str),
    /// The entry point threw or returned something unusable.
    CallFailed(String),
}

impl fmt::Display for FrameAccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotLoaded => write!(f, "embedded frame has not loaded"),
            Self::SecurityRestricted => write!(f, "embedded frame is security restricted"),
            Self::EntryPointMissing(name) => write!(f, "embedded content has no '{name}'"),
            Self::CallFailed(msg) => write!(f, "embedded call failed: {msg}"),
        }
    }
}

impl std::error::Error for FrameAccessError {}

/// Errors from loading a [`DialogConfig`](crate::config::DialogConfig).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The document could not be parsed.
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "config parse error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_missing_names_the_argument() {
        let err = DialogError::ArgumentMissing("internal_id");
        assert_eq!(err.to_string(), "argument missing: internal_id");
    }

    #[test]
    fn dom_error_is_the_source() {
        use std::error::Error as _;
        let err = DialogError::from(DomError::DocumentUnavailable);
        assert!(err.source().is_some());
        assert!(err.to_string().contains("top-level document"));
    }

    #[test]
    fn url_parse_error_maps_to_invalid_url() {
        let err: DialogError = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, DialogError::InvalidUrl(_)));
    }
}
