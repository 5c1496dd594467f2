#![forbid(unsafe_code)]

//! DOM access facade.
//!
//! The widget never walks a frame hierarchy looking for a DOM library.
//! Instead the embedding application hands it a [`Dom`] that is already
//! bound to the top-level document, whichever nested context the widget
//! is driven from.
//!
//! # Invariants
//!
//! - Every [`NodeId`] returned by an implementation addresses a node of
//!   the top-level document.
//! - [`Content::Text`] is always escaped by the implementation;
//!   [`Content::Markup`] never is.
//! - Load handlers registered with [`Dom::on_load`] fire at most once.
//!
//! # Failure Modes
//!
//! - Queries that match nothing return `None` / an empty `Vec`.
//! - Mutations on a stale [`NodeId`] are silently ignored.

use std::fmt;
use std::rc::Rc;

use crate::error::{DomError, FrameAccessError};

/// Opaque handle for an element in the top-level document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Wrap a backend-specific raw id.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw id value.
    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Event handler bound to a DOM event.
pub type Handler = Rc<dyn Fn()>;

/// Content inserted into an element.
///
/// Insertion mode is explicit: `Text` is escaped by the backend, `Markup`
/// is inserted verbatim. Sanitizing markup from untrusted sources is the
/// caller's job (see [`html_encode`](crate::html_encode)).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Plain text, escaped on insertion.
    Text(String),
    /// Markup, inserted as-is.
    Markup(String),
}

impl Content {
    /// Plain text content.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Markup content.
    pub fn markup(value: impl Into<String>) -> Self {
        Self::Markup(value.into())
    }

    /// The raw string, regardless of insertion mode.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text(s) | Self::Markup(s) => s,
        }
    }

    /// Whether there is nothing to show.
    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }
}

impl Default for Content {
    fn default() -> Self {
        Self::Markup(String::new())
    }
}

/// Bare strings are markup, matching the widget's rich-text messages.
impl From<&str> for Content {
    fn from(value: &str) -> Self {
        Self::Markup(value.to_owned())
    }
}

impl From<String> for Content {
    fn from(value: String) -> Self {
        Self::Markup(value)
    }
}

impl fmt::Display for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The scripting context of an embedded frame.
///
/// Re-resolved on every access; the widget never holds on to one.
pub trait EmbeddedContext {
    /// Current location of the embedded document, if readable.
    fn url(&self) -> Option<String>;

    /// Invoke the embedded content's `getResponse` entry point.
    fn call_response(&self) -> Result<serde_json::Value, FrameAccessError>;
}

/// DOM capability scoped to the top-level document.
///
/// Selectors are CSS selectors. The widget only uses `#id`, `.class`,
/// tag names, and descendant combinations of those.
pub trait Dom {
    /// First element matching `selector`.
    fn query(&self, selector: &str) -> Option<NodeId>;

    /// All elements matching `selector`, in document order.
    fn query_all(&self, selector: &str) -> Vec<NodeId>;

    /// Add a style sheet to the document head.
    fn install_style(&self, css: &str) -> Result<(), DomError>;

    /// Append markup to the document body.
    fn append_markup(&self, markup: &str) -> Result<(), DomError>;

    /// Create a detached element.
    fn create_element(&self, tag: &str) -> Result<NodeId, DomError>;

    /// Append `child` to `parent`.
    fn append_child(&self, parent: NodeId, child: NodeId) -> Result<(), DomError>;

    /// Remove every child of `node`.
    fn remove_children(&self, node: NodeId);

    /// Replace the children of `node` with `content`.
    fn set_content(&self, node: NodeId, content: &Content);

    /// Add a class to the element's class list.
    fn add_class(&self, node: NodeId, class: &str);

    /// Remove a class from the element's class list.
    fn remove_class(&self, node: NodeId, class: &str);

    /// Whether the element's class list contains `class`.
    fn has_class(&self, node: NodeId, class: &str) -> bool;

    /// Set an inline CSS property.
    fn set_style(&self, node: NodeId, property: &str, value: &str);

    /// Read an inline CSS property.
    fn style(&self, node: NodeId, property: &str) -> Option<String>;

    /// Show or hide the element.
    fn set_visible(&self, node: NodeId, visible: bool);

    /// Whether the element is shown.
    fn is_visible(&self, node: NodeId) -> bool;

    /// Set an attribute.
    fn set_attribute(&self, node: NodeId, name: &str, value: &str);

    /// Read an attribute.
    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    /// Set the element's `disabled` property.
    fn set_disabled(&self, node: NodeId, disabled: bool);

    /// Read the element's `disabled` property.
    fn is_disabled(&self, node: NodeId) -> bool;

    /// Move keyboard focus to the element.
    fn focus(&self, node: NodeId);

    /// Bind a click handler.
    fn on_click(&self, node: NodeId, handler: Handler);

    /// Bind a one-shot load handler (frames).
    fn on_load(&self, node: NodeId, handler: Handler);

    /// Resolve the browsing context of a frame element.
    ///
    /// `Ok(None)` when the node is not a frame.
    fn frame_context(
        &self,
        frame: NodeId,
    ) -> Result<Option<Rc<dyn EmbeddedContext>>, FrameAccessError>;
}

/// Show or hide the first element matching `selector`.
pub(crate) fn set_visible_by(dom: &dyn Dom, selector: &str, visible: bool) -> Option<NodeId> {
    let node = dom.query(selector)?;
    dom.set_visible(node, visible);
    Some(node)
}
