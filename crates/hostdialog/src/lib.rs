#![forbid(unsafe_code)]

//! Modal dialog widget for pages hosted inside a business application.
//!
//! One dialog subtree is injected into the top-level document and reused
//! by every `show`. The widget talks to the page only through the [`Dom`]
//! and [`Host`] capabilities, so it runs the same against a browser
//! backend and an in-memory test double.

pub mod button;
pub mod config;
pub mod dialog;
pub mod dom;
pub mod embed;
pub mod encode;
pub mod error;
pub mod host;
pub mod icon;
pub mod markup;

pub use button::{ButtonCallback, ButtonSpec};
pub use config::{DialogConfig, Dimensions, LoadingPreset};
pub use dialog::{DialogLayout, DialogOptions, DialogState, ModalDialog, Scope};
pub use dom::{Content, Dom, EmbeddedContext, Handler, NodeId};
pub use embed::{BRIDGE_CHANNEL, BridgeMessage, EmbedOptions, IncomingMessage, WorkflowRequest};
pub use encode::html_encode;
pub use error::{CallbackError, ConfigError, DialogError, DomError, FrameAccessError};
pub use host::Host;
pub use icon::{IconKind, UnknownIcon};
