#![forbid(unsafe_code)]

//! Embedded content: URLs, named host resources and workflow dialogs
//! rendered in a frame inside the dialog, plus the dismiss bridge.
//!
//! Embedded content closes the dialog by posting a [`BridgeMessage`] to
//! its parent; the host backend feeds it to
//! [`ModalDialog::handle_message`]. The widget never reaches into the
//! embedded browsing context to rewire it.
//!
//! # Invariants
//!
//! - Each embedded show starts a new session; messages for a replaced
//!   session are ignored.
//! - A session accepts a dismiss only after its frame has loaded.
//! - When both sides know an origin, they must match.
//!
//! # Failure Modes
//!
//! | Failure | Behavior |
//! |---------|----------|
//! | Frame cross-origin or not loaded | `embedded_window` returns `None` |
//! | No `getResponse` in embedded content | `embedded_response` returns `None` |
//! | Malformed or foreign message | `handle_message` returns `false` |
//! | Dismiss callback fails | Reported via host alert; dialog still hides |

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::button::{ButtonCallback, ButtonSpec, invoke_guarded};
use crate::dialog::{DialogCore, DialogOptions, ModalDialog, Scope};
use crate::dom::{Content, EmbeddedContext, NodeId};
use crate::encode::html_encode;
use crate::error::{CallbackError, DialogError};
use crate::icon::IconKind;
use crate::markup::{FRAME_ID, FRAME_SELECTOR};

/// Channel tag carried by every bridge message.
pub const BRIDGE_CHANNEL: &str = "hostdialog";

/// Message posted by embedded content to the page that opened it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BridgeMessage {
    /// Close the dialog, optionally handing back a response.
    Dismiss {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        response: Option<Value>,
    },
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    channel: String,
    #[serde(flatten)]
    message: BridgeMessage,
}

impl BridgeMessage {
    /// A dismiss without a response.
    pub fn dismiss() -> Self {
        Self::Dismiss { response: None }
    }

    /// Serialize with the bridge channel tag.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&Envelope {
            channel: BRIDGE_CHANNEL.to_owned(),
            message: self.clone(),
        })
    }

    /// Parse a posted message; `None` for anything not on the bridge channel.
    pub fn decode(data: &str) -> Option<Self> {
        let envelope: Envelope = serde_json::from_str(data).ok()?;
        (envelope.channel == BRIDGE_CHANNEL).then_some(envelope.message)
    }
}

/// A message as delivered by the host's message event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    /// Origin of the sender, when the host reports one.
    pub origin: Option<String>,
    pub data: String,
}

impl IncomingMessage {
    pub fn new(origin: Option<String>, data: impl Into<String>) -> Self {
        Self {
            origin,
            data: data.into(),
        }
    }
}

/// Options for the embedded variants. Unset sizes use the embedded
/// defaults from [`DialogConfig`](crate::config::DialogConfig).
#[derive(Debug, Clone, Default)]
pub struct EmbedOptions {
    pub title: Content,
    /// `None` renders the default OK button; `Some(vec![])` renders none.
    pub buttons: Option<Vec<ButtonSpec>>,
    pub prevent_manual_close: bool,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub padding: Option<u32>,
}

impl EmbedOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<Content>) -> Self {
        self.title = title.into();
        self
    }

    pub fn buttons(mut self, buttons: Vec<ButtonSpec>) -> Self {
        self.buttons = Some(buttons);
        self
    }

    pub fn prevent_manual_close(mut self, prevent: bool) -> Self {
        self.prevent_manual_close = prevent;
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn padding(mut self, padding: u32) -> Self {
        self.padding = Some(padding);
        self
    }
}

/// A host workflow ("dialog process") to run against one record.
#[derive(Clone, Default)]
pub struct WorkflowRequest {
    pub dialog_id: String,
    pub entity_name: String,
    pub record_id: String,
    /// Runs when the workflow content dismisses the dialog.
    pub callback: Option<ButtonCallback>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Overrides the host's client URL.
    pub base_url: Option<String>,
}

impl WorkflowRequest {
    pub fn new(
        dialog_id: impl Into<String>,
        entity_name: impl Into<String>,
        record_id: impl Into<String>,
    ) -> Self {
        Self {
            dialog_id: dialog_id.into(),
            entity_name: entity_name.into(),
            record_id: record_id.into(),
            ..Self::default()
        }
    }

    pub fn on_dismiss(
        mut self,
        callback: impl Fn() -> Result<(), CallbackError> + 'static,
    ) -> Self {
        self.callback = Some(Rc::new(callback));
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

impl std::fmt::Debug for WorkflowRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowRequest")
            .field("dialog_id", &self.dialog_id)
            .field("entity_name", &self.entity_name)
            .field("record_id", &self.record_id)
            .field("callback", &self.callback.is_some())
            .field("width", &self.width)
            .field("height", &self.height)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// The frame currently embedded in the dialog.
pub(crate) struct EmbeddedSession {
    pub(crate) id: u64,
    /// Origin of the embedded URL; `None` when opaque or unresolvable.
    origin: Option<String>,
    /// Set by the frame's load handler.
    armed: bool,
    callback: Option<ButtonCallback>,
}

/// Origin of `url`, resolving relative URLs against `location`.
fn url_origin(url: &str, location: Option<&str>) -> Option<String> {
    let resolved = match Url::parse(url) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(location?).and_then(|base| base.join(url)).ok()?
        }
        Err(_) => return None,
    };
    Some(resolved.origin())
        .filter(|origin| origin.is_tuple())
        .map(|origin| origin.ascii_serialization())
}

fn client_base(core: &DialogCore, base_url: Option<&str>) -> Result<String, DialogError> {
    base_url
        .map(str::to_owned)
        .or_else(|| core.host().client_url())
        .filter(|base| !base.trim().is_empty())
        .ok_or(DialogError::ClientUrlUnavailable)
}

fn join_path(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// URL of the named resource under the client URL.
pub(crate) fn resource_url(base: &str, resource_path: &str, name: &str) -> Result<String, DialogError> {
    let joined = join_path(&join_path(base, resource_path.trim_matches('/')), name);
    Ok(Url::parse(&joined)?.to_string())
}

/// URL of the host's dialog runner for one workflow and record.
pub(crate) fn workflow_url(
    base: &str,
    runner_path: &str,
    request: &WorkflowRequest,
) -> Result<String, DialogError> {
    for (name, value) in [
        ("dialog_id", &request.dialog_id),
        ("entity_name", &request.entity_name),
        ("record_id", &request.record_id),
    ] {
        if value.trim().is_empty() {
            return Err(DialogError::ArgumentMissing(name));
        }
    }
    let mut url = Url::parse(&join_path(base, runner_path))?;
    url.query_pairs_mut()
        .append_pair("DialogId", &request.dialog_id)
        .append_pair("EntityName", &request.entity_name)
        .append_pair("ObjectId", &request.record_id);
    Ok(url.to_string())
}

impl DialogCore {
    fn show_embedded(
        self: &Rc<Self>,
        url: &str,
        options: EmbedOptions,
        callback: Option<ButtonCallback>,
    ) -> Result<(), DialogError> {
        let defaults = self.config().embedded;
        let markup = format!(
            r#"<iframe id="{FRAME_ID}" src="{}" frameborder="0"></iframe>"#,
            html_encode(url)
        );
        let layout = self.render(DialogOptions {
            title: options.title,
            message: Content::Markup(markup),
            buttons: options.buttons,
            icon: IconKind::None,
            prevent_manual_close: options.prevent_manual_close,
            width: Some(options.width.unwrap_or(defaults.width)),
            height: Some(options.height.unwrap_or(defaults.height)),
            padding: Some(options.padding.unwrap_or(defaults.padding)),
        })?;

        let Some(frame) = self.dom().query(FRAME_SELECTOR) else {
            tracing::debug!("embedded frame missing after render");
            return Ok(());
        };
        let frame_height = (layout.message_max_height
            - i64::from(self.config().frame_height_correction))
        .max(0);
        self.dom()
            .set_style(frame, "height", &format!("{frame_height}px"));
        self.begin_session(frame, url, callback);
        Ok(())
    }

    fn begin_session(self: &Rc<Self>, frame: NodeId, url: &str, callback: Option<ButtonCallback>) {
        let id = self.session_counter.get() + 1;
        self.session_counter.set(id);
        *self.session.borrow_mut() = Some(EmbeddedSession {
            id,
            origin: url_origin(url, self.host().location().as_deref()),
            armed: false,
            callback,
        });

        let weak = Rc::downgrade(self);
        self.dom().on_load(
            frame,
            Rc::new(move || {
                let Some(core) = weak.upgrade() else {
                    return;
                };
                let mut slot = core.session.borrow_mut();
                match slot.as_mut() {
                    Some(session) if session.id == id => {
                        session.armed = true;
                        tracing::debug!(session = id, "embedded frame loaded");
                    }
                    _ => tracing::debug!(session = id, "stale frame load ignored"),
                }
            }),
        );
        tracing::debug!(session = id, url, "embedded session started");
    }

    fn accept_dismiss(&self, origin: Option<&str>) -> Option<EmbeddedSession> {
        let mut slot = self.session.borrow_mut();
        let session = slot.as_ref()?;
        if !session.armed {
            tracing::debug!(session = session.id, "dismiss before frame load ignored");
            return None;
        }
        // A sender origin must match the frame's; an unknown frame origin matches none.
        if let Some(actual) = origin
            && session.origin.as_deref() != Some(actual)
        {
            tracing::warn!(
                expected = ?session.origin,
                actual,
                "dismiss from unexpected origin rejected"
            );
            return None;
        }
        slot.take()
    }
}

impl ModalDialog {
    /// Show `url` in a frame filling the dialog's message area.
    pub fn show_embedded_url(&self, url: &str, options: EmbedOptions) -> Result<(), DialogError> {
        self.core.show_embedded(url, options, None)
    }

    /// Show the host resource `name` (a path under the resource root).
    ///
    /// `base_url` overrides the host's client URL.
    pub fn show_embedded_resource(
        &self,
        name: &str,
        options: EmbedOptions,
        base_url: Option<&str>,
    ) -> Result<(), DialogError> {
        if name.trim().is_empty() {
            return Err(DialogError::ArgumentMissing("name"));
        }
        let base = client_base(&self.core, base_url)?;
        let url = resource_url(&base, &self.core.config().resource_path, name)?;
        self.show_embedded_url(&url, options)
    }

    /// Run a host workflow dialog against one record.
    ///
    /// The callback runs once the workflow content dismisses the dialog
    /// (after its frame has loaded); the dialog hides afterwards.
    pub fn show_workflow_dialog(&self, request: WorkflowRequest) -> Result<(), DialogError> {
        let base = client_base(&self.core, request.base_url.as_deref())?;
        let url = workflow_url(&base, &self.core.config().workflow_runner_path, &request)?;
        let defaults = self.core.config().workflow;
        let options = EmbedOptions::new()
            .buttons(Vec::new())
            .size(
                request.width.unwrap_or(defaults.width),
                request.height.unwrap_or(defaults.height),
            )
            .padding(defaults.padding);
        self.core.show_embedded(&url, options, request.callback)
    }

    /// Handle a message posted by embedded content.
    ///
    /// Returns `true` when the message dismissed the dialog.
    pub fn handle_message(&self, message: &IncomingMessage) -> bool {
        let Some(BridgeMessage::Dismiss { response }) = BridgeMessage::decode(&message.data)
        else {
            return false;
        };
        let Some(session) = self.core.accept_dismiss(message.origin.as_deref()) else {
            return false;
        };

        *self.core.last_response.borrow_mut() = response;
        let generation = self.core.footer_generation();
        if let Some(callback) = session.callback {
            invoke_guarded(self.core.host(), || callback());
        }
        if self.core.footer_generation() == generation {
            self.core.hide_dialog();
        } else {
            tracing::debug!("dialog replaced by dismiss callback; leaving it shown");
        }
        tracing::debug!(session = session.id, "embedded session dismissed");
        true
    }

    /// The embedded frame's browsing context, when reachable.
    pub fn embedded_window(&self, scope: Scope) -> Option<Rc<dyn EmbeddedContext>> {
        if scope == Scope::Form && !self.core.is_initialized() {
            return None;
        }
        let dom = self.core.dom();
        let frame = dom.query(FRAME_SELECTOR)?;
        match dom.frame_context(frame) {
            Ok(context) => context,
            Err(err) => {
                tracing::debug!(error = %err, "embedded frame unreachable");
                None
            }
        }
    }

    /// Value returned by the embedded content's `getResponse`, unmodified.
    pub fn embedded_response(&self, scope: Scope) -> Option<Value> {
        let context = self.embedded_window(scope)?;
        match context.call_response() {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::debug!(error = %err, "embedded response unavailable");
                None
            }
        }
    }

    /// Response carried by the last accepted dismiss message.
    pub fn last_dismiss_response(&self) -> Option<Value> {
        self.core.last_response.borrow().clone()
    }
}
