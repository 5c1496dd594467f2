#![forbid(unsafe_code)]

//! Dialog renderer and the public [`ModalDialog`] handle.
//!
//! The dialog lives in the top-level document as one injected subtree.
//! Every `show` re-populates that subtree in place; a second `show`
//! replaces the first rather than stacking.
//!
//! # Invariants
//!
//! - The markup is injected at most once per document: initialization
//!   checks for the root node before inserting.
//! - All content, class and size mutations of a `show` apply before the
//!   dialog is revealed, and focus is assigned last.
//! - No `RefCell` borrow is held while caller code runs, so callbacks may
//!   call back into the dialog.
//!
//! # Failure Modes
//!
//! - DOM failures during injection or button creation return
//!   [`DialogError::Dom`]; the dialog stays hidden.
//! - `hide(Scope::Form)` before the first `show` is a no-op.
//!
//! # Example
//!
//! ```ignore
//! let dialog = ModalDialog::attach(dom, host);
//! dialog.show(
//!     DialogOptions::new()
//!         .title("Record saved")
//!         .message("The record was saved.")
//!         .icon(IconKind::Success),
//! )?;
//! ```

use std::cell::{Cell, Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::button::{self, ButtonSpec};
use crate::config::DialogConfig;
use crate::dom::{Content, Dom, set_visible_by};
use crate::embed::EmbeddedSession;
use crate::error::DialogError;
use crate::host::Host;
use crate::icon::IconKind;
use crate::markup::{
    BOX_SELECTOR, CLOSE_SELECTOR, CONTENT_MAXIMIZED_CLASS, CONTENT_SELECTOR, CONTENT_TOP_CLASS,
    FOOTER_SELECTOR, ICON_SELECTOR, MARKUP, MESSAGE_SELECTOR, ROOT_SELECTOR, STYLE,
    TITLE_SELECTOR,
};

/// Which calling context an operation is performed on behalf of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    /// The form that owns the dialog.
    #[default]
    Form,
    /// A context nested deeper than the form (e.g. a subgrid). Addresses
    /// the top-level document directly and skips the initialized check.
    Child,
}

/// Everything one `show` call renders.
///
/// Unset sizes fall back to the [`DialogConfig`] alert defaults; unset
/// buttons fall back to a single "OK".
#[derive(Debug, Clone, Default)]
pub struct DialogOptions {
    pub title: Content,
    pub message: Content,
    /// `None` renders the default OK button; `Some(vec![])` renders no footer.
    pub buttons: Option<Vec<ButtonSpec>>,
    pub icon: IconKind,
    /// Hide the close control.
    pub prevent_manual_close: bool,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub padding: Option<u32>,
}

impl DialogOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Alert: message with a single OK button.
    pub fn alert(title: impl Into<Content>, message: impl Into<Content>) -> Self {
        Self::new().title(title).message(message)
    }

    /// Confirm: message with OK and Cancel.
    pub fn confirm(title: impl Into<Content>, message: impl Into<Content>) -> Self {
        Self::new()
            .title(title)
            .message(message)
            .icon(IconKind::Question)
            .buttons(vec![ButtonSpec::ok().focus(true), ButtonSpec::new("Cancel")])
    }

    pub fn title(mut self, title: impl Into<Content>) -> Self {
        self.title = title.into();
        self
    }

    pub fn message(mut self, message: impl Into<Content>) -> Self {
        self.message = message.into();
        self
    }

    /// Replace the button list.
    pub fn buttons(mut self, buttons: Vec<ButtonSpec>) -> Self {
        self.buttons = Some(buttons);
        self
    }

    /// Append one button (starting from an empty list).
    pub fn button(mut self, button: ButtonSpec) -> Self {
        self.buttons.get_or_insert_with(Vec::new).push(button);
        self
    }

    pub fn icon(mut self, icon: IconKind) -> Self {
        self.icon = icon;
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

    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    pub fn padding(mut self, padding: u32) -> Self {
        self.padding = Some(padding);
        self
    }
}

/// What the dialog currently shows.
#[derive(Debug, Clone, Default)]
pub struct DialogState {
    pub initialized: bool,
    pub visible: bool,
    pub title: Content,
    pub message: Content,
    pub icon: IconKind,
    pub buttons: Vec<ButtonSpec>,
    pub width: u32,
    pub height: u32,
    pub padding: u32,
    pub prevent_manual_close: bool,
}

/// Pixel geometry derived from one `show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogLayout {
    pub width: u32,
    pub height: u32,
    pub padding: u32,
    /// May be negative for degenerate sizes; written clamped at zero.
    pub message_max_height: i64,
    pub top_aligned: bool,
}

impl DialogLayout {
    /// `max-height = height - 2*padding - footer (if buttons) - title (if any)`.
    pub fn compute(
        config: &DialogConfig,
        width: u32,
        height: u32,
        padding: u32,
        has_buttons: bool,
        has_title: bool,
    ) -> Self {
        let footer = if has_buttons { config.footer_height } else { 0 };
        let title = if has_title { config.title_height } else { 0 };
        let message_max_height =
            i64::from(height) - 2 * i64::from(padding) - i64::from(footer) - i64::from(title);
        Self {
            width,
            height,
            padding,
            message_max_height,
            top_aligned: height > config.tall_content_threshold,
        }
    }

    /// Negative half-height, centering the box vertically.
    pub fn margin_top(&self) -> f64 {
        -f64::from(self.height) / 2.0
    }

    /// Negative half-width, centering the box horizontally.
    pub fn margin_left(&self) -> f64 {
        -f64::from(self.width) / 2.0
    }
}

fn px(value: impl fmt::Display) -> String {
    format!("{value}px")
}

/// Shared state behind every [`ModalDialog`] clone and DOM handler.
pub(crate) struct DialogCore {
    dom: Rc<dyn Dom>,
    host: Rc<dyn Host>,
    config: DialogConfig,
    state: RefCell<DialogState>,
    /// Bumped on every footer rebuild; identifies "the dialog that was clicked".
    footer_generation: Cell<u64>,
    pub(crate) session: RefCell<Option<EmbeddedSession>>,
    pub(crate) session_counter: Cell<u64>,
    pub(crate) last_response: RefCell<Option<serde_json::Value>>,
}

impl DialogCore {
    pub(crate) fn dom(&self) -> &dyn Dom {
        self.dom.as_ref()
    }

    pub(crate) fn host(&self) -> &dyn Host {
        self.host.as_ref()
    }

    pub(crate) fn config(&self) -> &DialogConfig {
        &self.config
    }

    pub(crate) fn is_initialized(&self) -> bool {
        self.state.borrow().initialized
    }

    pub(crate) fn footer_generation(&self) -> u64 {
        self.footer_generation.get()
    }

    pub(crate) fn next_footer_generation(&self) -> u64 {
        let next = self.footer_generation.get() + 1;
        self.footer_generation.set(next);
        next
    }

    fn initialize(self: &Rc<Self>) -> Result<(), DialogError> {
        if self.is_initialized() {
            return Ok(());
        }

        let dom = self.dom();
        if dom.query(ROOT_SELECTOR).is_none() {
            dom.install_style(STYLE)?;
            dom.append_markup(MARKUP)?;
            tracing::debug!("dialog markup injected");
        } else {
            tracing::debug!("dialog markup already present; reusing");
        }

        if let Some(close) = dom.query(CLOSE_SELECTOR) {
            let weak = Rc::downgrade(self);
            dom.on_click(
                close,
                Rc::new(move || {
                    if let Some(core) = weak.upgrade() {
                        core.hide_dialog();
                    }
                }),
            );
        }

        self.state.borrow_mut().initialized = true;
        Ok(())
    }

    /// Render `options` and reveal the dialog.
    pub(crate) fn render(self: &Rc<Self>, options: DialogOptions) -> Result<DialogLayout, DialogError> {
        let DialogOptions {
            title,
            message,
            buttons,
            icon,
            prevent_manual_close,
            width,
            height,
            padding,
        } = options;
        let defaults = self.config.alert;
        let width = width.unwrap_or(defaults.width);
        let height = height.unwrap_or(defaults.height);
        let padding = padding.unwrap_or(defaults.padding);
        let buttons = buttons.unwrap_or_else(|| vec![ButtonSpec::ok()]);

        let _span = tracing::debug_span!("dialog_show", width, height, icon = %icon).entered();
        self.initialize()?;
        self.session.borrow_mut().take();

        let dom = self.dom();
        if let Some(node) = dom.query(TITLE_SELECTOR) {
            dom.set_content(node, &title);
            dom.set_visible(node, !title.is_empty());
        }
        if let Some(node) = dom.query(MESSAGE_SELECTOR) {
            dom.set_content(node, &message);
            dom.set_visible(node, !message.is_empty());
        }
        if let Some(node) = dom.query(ICON_SELECTOR) {
            match icon.class_name() {
                None => dom.set_visible(node, false),
                Some(class) => {
                    for existing in IconKind::all_classes() {
                        dom.remove_class(node, existing);
                    }
                    dom.add_class(node, class);
                    dom.set_visible(node, true);
                }
            }
        }

        let focus = button::render_footer(self, &buttons)?;
        let has_buttons = !buttons.is_empty();
        set_visible_by(dom, FOOTER_SELECTOR, has_buttons);
        set_visible_by(dom, CLOSE_SELECTOR, !prevent_manual_close);

        let layout = DialogLayout::compute(
            &self.config,
            width,
            height,
            padding,
            has_buttons,
            !title.is_empty(),
        );

        if let Some(content) = dom.query(CONTENT_SELECTOR) {
            if has_buttons {
                dom.remove_class(content, CONTENT_MAXIMIZED_CLASS);
            } else {
                dom.add_class(content, CONTENT_MAXIMIZED_CLASS);
            }
            if layout.top_aligned {
                dom.add_class(content, CONTENT_TOP_CLASS);
            } else {
                dom.remove_class(content, CONTENT_TOP_CLASS);
            }
            dom.set_style(content, "padding-top", &px(padding));
            dom.set_style(content, "padding-bottom", &px(padding));
        }
        if let Some(dialog_box) = dom.query(BOX_SELECTOR) {
            dom.set_style(dialog_box, "height", &px(height));
            dom.set_style(dialog_box, "width", &px(width));
            dom.set_style(dialog_box, "margin-top", &px(layout.margin_top()));
            dom.set_style(dialog_box, "margin-left", &px(layout.margin_left()));
            dom.set_style(dialog_box, "padding-left", &px(padding));
            dom.set_style(dialog_box, "padding-right", &px(padding));
        }
        if let Some(node) = dom.query(MESSAGE_SELECTOR) {
            dom.set_style(node, "max-height", &px(layout.message_max_height.max(0)));
        }
        tracing::trace!(
            message_max_height = layout.message_max_height,
            top_aligned = layout.top_aligned,
            "dialog layout"
        );

        {
            let mut state = self.state.borrow_mut();
            state.visible = true;
            state.title = title;
            state.message = message;
            state.icon = icon;
            state.buttons = buttons;
            state.width = width;
            state.height = height;
            state.padding = padding;
            state.prevent_manual_close = prevent_manual_close;
        }
        set_visible_by(dom, ROOT_SELECTOR, true);
        for node in focus {
            dom.focus(node);
        }
        Ok(layout)
    }

    /// Hide the dialog node and end any embedded session.
    pub(crate) fn hide_dialog(&self) {
        set_visible_by(self.dom(), ROOT_SELECTOR, false);
        self.state.borrow_mut().visible = false;
        if let Some(session) = self.session.borrow_mut().take() {
            tracing::debug!(session = session.id, "embedded session closed");
        }
        tracing::debug!("dialog hidden");
    }
}

/// Handle to the page's modal dialog.
///
/// Cheap to clone; clones share one state. Construct it once in the
/// application's composition root with [`ModalDialog::attach`]. Handles
/// attached to the same document share the single injected subtree.
#[derive(Clone)]
pub struct ModalDialog {
    pub(crate) core: Rc<DialogCore>,
}

impl fmt::Debug for ModalDialog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalDialog")
            .field("state", &*self.core.state.borrow())
            .field("footer_generation", &self.core.footer_generation.get())
            .finish()
    }
}

impl ModalDialog {
    /// Bind a dialog to the top-level document `dom` and its `host` page.
    pub fn attach(dom: Rc<dyn Dom>, host: Rc<dyn Host>) -> Self {
        Self::with_config(dom, host, DialogConfig::default())
    }

    /// [`attach`](Self::attach) with explicit configuration.
    pub fn with_config(dom: Rc<dyn Dom>, host: Rc<dyn Host>, config: DialogConfig) -> Self {
        Self {
            core: Rc::new(DialogCore {
                dom,
                host,
                config,
                state: RefCell::new(DialogState::default()),
                footer_generation: Cell::new(0),
                session: RefCell::new(None),
                session_counter: Cell::new(0),
                last_response: RefCell::new(None),
            }),
        }
    }

    /// Render and reveal the dialog, injecting its markup on first use.
    pub fn show(&self, options: DialogOptions) -> Result<(), DialogError> {
        self.core.render(options).map(|_| ())
    }

    /// Show the fixed "loading" preset; dismiss it with [`hide`](Self::hide).
    pub fn show_loading(&self) -> Result<(), DialogError> {
        let preset = &self.core.config.loading;
        let options = DialogOptions::new()
            .title(preset.title.as_str())
            .buttons(Vec::new())
            .icon(IconKind::Loading)
            .prevent_manual_close(true)
            .size(preset.width, preset.height);
        self.show(options)
    }

    /// Hide the dialog.
    ///
    /// [`Scope::Form`] is a no-op until the dialog has been shown;
    /// [`Scope::Child`] hides whatever dialog the document holds.
    pub fn hide(&self, scope: Scope) {
        if scope == Scope::Form && !self.core.is_initialized() {
            return;
        }
        self.core.hide_dialog();
    }

    /// Enable or disable the footer button rendered for `internal_id`.
    pub fn set_button_enabled(
        &self,
        internal_id: Option<&str>,
        enabled: bool,
        scope: Scope,
    ) -> Result<(), DialogError> {
        if scope == Scope::Form && !self.core.is_initialized() {
            // Still validate the argument first.
            let id = internal_id
                .filter(|id| !id.is_empty())
                .ok_or(DialogError::ArgumentMissing("internal_id"))?;
            return Err(DialogError::ButtonNotFound(id.to_owned()));
        }
        button::set_enabled(&self.core, internal_id, enabled)
    }

    /// The page that drives this dialog.
    pub fn caller_window(&self) -> Rc<dyn Host> {
        Rc::clone(&self.core.host)
    }

    pub fn is_visible(&self) -> bool {
        self.core.state.borrow().visible
    }

    pub fn is_initialized(&self) -> bool {
        self.core.is_initialized()
    }

    /// Borrow the current dialog state.
    ///
    /// Do not hold the guard across calls into the dialog.
    pub fn state(&self) -> Ref<'_, DialogState> {
        self.core.state.borrow()
    }

    pub fn config(&self) -> &DialogConfig {
        &self.core.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn layout(height: u32, padding: u32, buttons: bool, title: bool) -> DialogLayout {
        DialogLayout::compute(&DialogConfig::default(), 500, height, padding, buttons, title)
    }

    #[test]
    fn message_height_with_buttons_and_title() {
        assert_eq!(layout(250, 20, true, true).message_max_height, 134);
    }

    #[test]
    fn message_height_bare() {
        assert_eq!(layout(115, 0, false, false).message_max_height, 115);
    }

    #[test]
    fn tall_content_threshold_is_exclusive() {
        assert!(!layout(250, 20, true, true).top_aligned);
        assert!(layout(251, 20, true, true).top_aligned);
    }

    #[test]
    fn margins_center_the_box() {
        let l = DialogLayout::compute(&DialogConfig::default(), 230, 115, 20, false, true);
        assert_eq!(px(l.margin_top()), "-57.5px");
        assert_eq!(px(l.margin_left()), "-115px");
    }

    #[test]
    fn options_default_to_no_explicit_buttons() {
        let options = DialogOptions::new();
        assert!(options.buttons.is_none());
        assert_eq!(options.icon, IconKind::None);
        assert!(!options.prevent_manual_close);
    }

    #[test]
    fn button_appends_to_empty_list() {
        let options = DialogOptions::new().button(ButtonSpec::new("A"));
        assert_eq!(options.buttons.map(|b| b.len()), Some(1));
    }

    #[test]
    fn confirm_preset_has_two_buttons() {
        let options = DialogOptions::confirm("Delete?", "This cannot be undone.");
        let buttons = options.buttons.unwrap_or_default();
        assert_eq!(buttons.len(), 2);
        assert_eq!(buttons[1].label, Content::markup("Cancel"));
    }

    proptest! {
        #[test]
        fn message_height_formula(
            height in 0u32..4000,
            padding in 0u32..200,
            buttons in any::<bool>(),
            title in any::<bool>(),
        ) {
            let l = layout(height, padding, buttons, title);
            let expected = i64::from(height)
                - 2 * i64::from(padding)
                - if buttons { 44 } else { 0 }
                - if title { 32 } else { 0 };
            prop_assert_eq!(l.message_max_height, expected);
            prop_assert_eq!(l.top_aligned, height > 250);
        }
    }
}
