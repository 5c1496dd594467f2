#![forbid(unsafe_code)]

//! Static style and markup asset for the dialog chrome.
//!
//! The fragment is injected once into the top-level document. Every
//! element the renderer touches carries one of the ids below.

/// Id of the injected root; its presence marks the document as initialized.
pub const ROOT_ID: &str = "hostdialog";
pub const BACKGROUND_ID: &str = "hostdialog-background";
pub const BOX_ID: &str = "hostdialog-box";
pub const CONTENT_ID: &str = "hostdialog-content";
pub const ICON_ID: &str = "hostdialog-icon";
pub const TITLE_ID: &str = "hostdialog-title";
pub const MESSAGE_ID: &str = "hostdialog-message";
pub const FOOTER_ID: &str = "hostdialog-footer";
pub const CLOSE_ID: &str = "hostdialog-close";
/// Id of the frame built by the embedded variants.
pub const FRAME_ID: &str = "hostdialog-frame";

pub const ROOT_SELECTOR: &str = "#hostdialog";
pub const BOX_SELECTOR: &str = "#hostdialog-box";
pub const CONTENT_SELECTOR: &str = "#hostdialog-content";
pub const ICON_SELECTOR: &str = "#hostdialog-icon";
pub const TITLE_SELECTOR: &str = "#hostdialog-title";
pub const MESSAGE_SELECTOR: &str = "#hostdialog-message";
pub const FOOTER_SELECTOR: &str = "#hostdialog-footer";
pub const CLOSE_SELECTOR: &str = "#hostdialog-close";
pub const FRAME_SELECTOR: &str = "#hostdialog-frame";
/// Every rendered footer button.
pub const FOOTER_BUTTONS_SELECTOR: &str = "#hostdialog-footer .hostdialog-button";

pub const BUTTON_CLASS: &str = "hostdialog-button";
pub const BUTTON_FOCUS_CLASS: &str = "hostdialog-button-focus";
/// Content area takes the footer's space when there are no buttons.
pub const CONTENT_MAXIMIZED_CLASS: &str = "hostdialog-content-maximized";
/// Large content (trace logs, frames) aligns to the top.
pub const CONTENT_TOP_CLASS: &str = "hostdialog-content-top";

pub const STYLE: &str = r#"
#hostdialog { position: fixed; inset: 0; z-index: 1000; font-family: "Segoe UI", Tahoma, Arial, sans-serif; }
#hostdialog-background { position: absolute; inset: 0; background: rgba(0, 0, 0, 0.4); }
#hostdialog-box { position: absolute; top: 50%; left: 50%; box-sizing: border-box; background: #ffffff; border: 1px solid #c6c6c6; box-shadow: 0 4px 16px rgba(0, 0, 0, 0.25); }
#hostdialog-content { position: absolute; top: 0; right: 0; bottom: 44px; left: 0; display: flex; align-items: center; overflow: hidden; }
#hostdialog-content.hostdialog-content-maximized { bottom: 0; }
#hostdialog-content.hostdialog-content-top { align-items: flex-start; }
#hostdialog-icon { flex: 0 0 32px; width: 32px; height: 32px; margin-right: 16px; background-repeat: no-repeat; background-size: contain; }
.hostdialog-icon-info { background-color: #0072c6; border-radius: 50%; }
.hostdialog-icon-warning { background-color: #ffb900; }
.hostdialog-icon-error { background-color: #e81123; border-radius: 50%; }
.hostdialog-icon-success { background-color: #107c10; border-radius: 50%; }
.hostdialog-icon-question { background-color: #5c2d91; border-radius: 50%; }
.hostdialog-icon-loading { border: 4px solid #e1e1e1; border-top-color: #0072c6; border-radius: 50%; animation: hostdialog-spin 1s linear infinite; }
@keyframes hostdialog-spin { to { transform: rotate(360deg); } }
#hostdialog-title { font-size: 20px; line-height: 32px; color: #262626; overflow: hidden; text-overflow: ellipsis; white-space: nowrap; }
#hostdialog-message { overflow: auto; color: #444444; font-size: 14px; }
#hostdialog-frame { width: 100%; border: 0; }
#hostdialog-footer { position: absolute; right: 0; bottom: 0; left: 0; height: 44px; padding: 6px 20px; box-sizing: border-box; text-align: right; }
.hostdialog-button { min-width: 86px; height: 30px; margin-left: 8px; padding: 0 12px; border: 1px solid #c6c6c6; background: #ffffff; color: #262626; cursor: pointer; }
.hostdialog-button-focus { border-color: #0072c6; background: #0072c6; color: #ffffff; }
.hostdialog-button[disabled] { opacity: 0.5; cursor: default; }
#hostdialog-close { position: absolute; top: 8px; right: 10px; cursor: pointer; color: #666666; font-size: 16px; }
"#;

pub const MARKUP: &str = r#"<div id="hostdialog" style="display: none"><div id="hostdialog-background"></div><div id="hostdialog-box"><div id="hostdialog-content"><div id="hostdialog-icon"></div><div id="hostdialog-text"><div id="hostdialog-title"></div><div id="hostdialog-message"></div></div></div><div id="hostdialog-footer"></div><div id="hostdialog-close" title="Close">&#x2715;</div></div></div>"#;

/// Element id for a footer button with the given internal id.
pub fn button_element_id(prefix: &str, internal_id: &str) -> String {
    format!("{prefix}{internal_id}")
}
