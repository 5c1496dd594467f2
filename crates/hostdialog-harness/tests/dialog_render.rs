#![forbid(unsafe_code)]

//! Integration tests: rendering, injection and visibility.

use hostdialog::markup::{
    BOX_SELECTOR, CLOSE_SELECTOR, CONTENT_MAXIMIZED_CLASS, CONTENT_SELECTOR, CONTENT_TOP_CLASS,
    FOOTER_SELECTOR, ICON_SELECTOR, MESSAGE_SELECTOR, ROOT_SELECTOR, TITLE_SELECTOR,
};
use hostdialog::{
    ButtonSpec, Content, DialogError, DialogOptions, Dom, DomError, Host, IconKind, Scope,
};
use hostdialog_harness::{FakeHost, Fixture};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

// ============================================================================
// Injection
// ============================================================================

#[test]
fn markup_is_injected_once_across_shows() {
    let fx = Fixture::new();
    for i in 0..5 {
        fx.dialog
            .show(DialogOptions::alert(format!("Title {i}"), "Body"))
            .unwrap();
    }
    assert_eq!(fx.dom.style_installs(), 1);
    assert_eq!(fx.dom.markup_appends(), 1);
    assert_eq!(fx.dom.count(ROOT_SELECTOR), 1);
}

#[test]
fn markup_is_injected_once_across_handles() {
    let fx = Fixture::new();
    fx.dialog.show(DialogOptions::new().message("one")).unwrap();
    let other = fx.second_handle();
    other.show(DialogOptions::new().message("two")).unwrap();
    assert_eq!(fx.dom.markup_appends(), 1);
    assert_eq!(fx.dom.count(ROOT_SELECTOR), 1);
    assert_eq!(fx.dom.text_content(fx.node(MESSAGE_SELECTOR)), "two");
}

#[test]
fn nothing_is_injected_before_first_show() {
    let fx = Fixture::new();
    fx.dialog.hide(Scope::Form);
    fx.dialog.hide(Scope::Child);
    assert_eq!(fx.dom.markup_appends(), 0);
    assert!(!fx.dialog.is_initialized());
    assert!(!fx.dialog.is_visible());
}

#[test]
fn dom_failure_surfaces_as_error() {
    let fx = Fixture::new();
    fx.dom.fail_element_creation(true);
    let err = fx.dialog.show(DialogOptions::new()).unwrap_err();
    assert_eq!(
        err,
        DialogError::Dom(DomError::ElementCreation("button".to_owned()))
    );
    assert!(!fx.root_visible());
}

// ============================================================================
// Content
// ============================================================================

#[test]
fn default_show_renders_single_ok_button() {
    let fx = Fixture::new();
    fx.dialog.show(DialogOptions::new().message("Hi")).unwrap();
    assert!(fx.root_visible());
    assert!(fx.dialog.is_visible());
    assert_eq!(fx.button_labels(), vec!["OK"]);
    assert!(fx.dom.is_visible(fx.node(FOOTER_SELECTOR)));
}

#[test]
fn empty_title_is_hidden_and_message_shown() {
    let fx = Fixture::new();
    fx.dialog.show(DialogOptions::new().message("Body")).unwrap();
    assert!(!fx.dom.is_visible(fx.node(TITLE_SELECTOR)));
    assert!(fx.dom.is_visible(fx.node(MESSAGE_SELECTOR)));

    fx.dialog.show(DialogOptions::new().title("Only title")).unwrap();
    assert!(fx.dom.is_visible(fx.node(TITLE_SELECTOR)));
    assert!(!fx.dom.is_visible(fx.node(MESSAGE_SELECTOR)));
}

#[test]
fn markup_message_is_parsed_and_text_is_not() {
    let fx = Fixture::new();
    fx.dialog
        .show(DialogOptions::new().message(r#"<b id="bold">Saved</b>"#))
        .unwrap();
    assert!(fx.dom.query("#hostdialog-message #bold").is_some());

    fx.dialog
        .show(DialogOptions::new().message(Content::text(r#"<b id="bold">Saved</b>"#)))
        .unwrap();
    assert!(fx.dom.query("#bold").is_none());
    assert_eq!(
        fx.dom.text_content(fx.node(MESSAGE_SELECTOR)),
        r#"<b id="bold">Saved</b>"#
    );
}

#[test]
fn icon_classes_are_exclusive() {
    let fx = Fixture::new();
    fx.dialog
        .show(DialogOptions::new().icon(IconKind::Warning))
        .unwrap();
    fx.dialog.show(DialogOptions::new().icon(IconKind::Info)).unwrap();
    let icon = fx.node(ICON_SELECTOR);
    assert!(fx.dom.is_visible(icon));
    assert!(fx.dom.has_class(icon, "hostdialog-icon-info"));
    assert!(!fx.dom.has_class(icon, "hostdialog-icon-warning"));
}

#[test]
fn no_icon_hides_the_slot() {
    let fx = Fixture::new();
    fx.dialog
        .show(DialogOptions::new().icon(IconKind::Error))
        .unwrap();
    fx.dialog.show(DialogOptions::new()).unwrap();
    assert!(!fx.dom.is_visible(fx.node(ICON_SELECTOR)));
}

#[test]
fn close_control_follows_prevent_manual_close() {
    let fx = Fixture::new();
    fx.dialog
        .show(DialogOptions::new().prevent_manual_close(true))
        .unwrap();
    assert!(!fx.dom.is_visible(fx.node(CLOSE_SELECTOR)));
    fx.dialog.show(DialogOptions::new()).unwrap();
    assert!(fx.dom.is_visible(fx.node(CLOSE_SELECTOR)));
}

#[test]
fn close_control_hides_the_dialog() {
    let fx = Fixture::new();
    fx.dialog.show(DialogOptions::new()).unwrap();
    assert!(fx.dom.click_selector(CLOSE_SELECTOR));
    assert!(!fx.root_visible());
    assert!(!fx.dialog.is_visible());
}

#[test]
fn empty_button_list_maximizes_content() {
    let fx = Fixture::new();
    fx.dialog.show(DialogOptions::new().buttons(vec![])).unwrap();
    let content = fx.node(CONTENT_SELECTOR);
    assert!(fx.dom.has_class(content, CONTENT_MAXIMIZED_CLASS));
    assert!(!fx.dom.is_visible(fx.node(FOOTER_SELECTOR)));
    assert!(fx.buttons().is_empty());

    fx.dialog.show(DialogOptions::new()).unwrap();
    assert!(!fx.dom.has_class(content, CONTENT_MAXIMIZED_CLASS));
}

// ============================================================================
// Layout
// ============================================================================

#[test]
fn default_layout_sizes_and_centers_the_box() {
    let fx = Fixture::new();
    fx.dialog.show(DialogOptions::alert("T", "M")).unwrap();
    let dialog_box = fx.node(BOX_SELECTOR);
    let style = |property| fx.dom.style(dialog_box, property);
    assert_eq!(style("width").as_deref(), Some("500px"));
    assert_eq!(style("height").as_deref(), Some("250px"));
    assert_eq!(style("margin-top").as_deref(), Some("-125px"));
    assert_eq!(style("margin-left").as_deref(), Some("-250px"));
    assert_eq!(style("padding-left").as_deref(), Some("20px"));
    assert_eq!(style("padding-right").as_deref(), Some("20px"));

    let content = fx.node(CONTENT_SELECTOR);
    assert_eq!(fx.dom.style(content, "padding-top").as_deref(), Some("20px"));
    assert_eq!(fx.dom.style(content, "padding-bottom").as_deref(), Some("20px"));
}

#[test]
fn message_height_with_title_and_buttons() {
    let fx = Fixture::new();
    fx.dialog.show(DialogOptions::alert("T", "M")).unwrap();
    assert_eq!(
        fx.dom.style(fx.node(MESSAGE_SELECTOR), "max-height").as_deref(),
        Some("134px")
    );
}

#[test]
fn message_height_without_title_buttons_or_padding() {
    let fx = Fixture::new();
    fx.dialog
        .show(
            DialogOptions::new()
                .message("M")
                .buttons(vec![])
                .size(230, 115)
                .padding(0),
        )
        .unwrap();
    assert_eq!(
        fx.dom.style(fx.node(MESSAGE_SELECTOR), "max-height").as_deref(),
        Some("115px")
    );
}

#[test]
fn message_height_is_clamped_at_zero() {
    let fx = Fixture::new();
    fx.dialog
        .show(DialogOptions::alert("T", "M").height(60))
        .unwrap();
    assert_eq!(
        fx.dom.style(fx.node(MESSAGE_SELECTOR), "max-height").as_deref(),
        Some("0px")
    );
}

#[test]
fn tall_dialogs_top_align_content() {
    let fx = Fixture::new();
    let content = || fx.node(CONTENT_SELECTOR);
    fx.dialog.show(DialogOptions::new().height(251)).unwrap();
    assert!(fx.dom.has_class(content(), CONTENT_TOP_CLASS));
    fx.dialog.show(DialogOptions::new().height(250)).unwrap();
    assert!(!fx.dom.has_class(content(), CONTENT_TOP_CLASS));
}

#[test]
fn odd_sizes_center_on_half_pixels() {
    let fx = Fixture::new();
    fx.dialog.show(DialogOptions::new().size(301, 115)).unwrap();
    let dialog_box = fx.node(BOX_SELECTOR);
    assert_eq!(fx.dom.style(dialog_box, "margin-top").as_deref(), Some("-57.5px"));
    assert_eq!(fx.dom.style(dialog_box, "margin-left").as_deref(), Some("-150.5px"));
}

// ============================================================================
// Presets and hide
// ============================================================================

#[test]
fn loading_preset() {
    let fx = Fixture::new();
    fx.dialog.show_loading().unwrap();
    assert_eq!(fx.dom.text_content(fx.node(TITLE_SELECTOR)), "Loading...");
    assert!(fx.dom.has_class(fx.node(ICON_SELECTOR), "hostdialog-icon-loading"));
    assert!(fx.buttons().is_empty());
    assert!(!fx.dom.is_visible(fx.node(CLOSE_SELECTOR)));
    let dialog_box = fx.node(BOX_SELECTOR);
    assert_eq!(fx.dom.style(dialog_box, "width").as_deref(), Some("230px"));
    assert_eq!(fx.dom.style(dialog_box, "height").as_deref(), Some("115px"));

    fx.dialog.hide(Scope::Form);
    assert!(!fx.root_visible());
}

#[test]
fn state_reflects_last_show() {
    let fx = Fixture::new();
    fx.dialog
        .show(
            DialogOptions::confirm("Delete?", "Really?")
                .button(ButtonSpec::new("Later")),
        )
        .unwrap();
    let state = fx.dialog.state();
    assert!(state.initialized);
    assert!(state.visible);
    assert_eq!(state.title, Content::markup("Delete?"));
    assert_eq!(state.icon, IconKind::Question);
    assert_eq!(state.buttons.len(), 3);
    assert_eq!((state.width, state.height, state.padding), (500, 250, 20));
}

#[test]
fn form_hide_on_uninitialized_handle_is_a_no_op() {
    let fx = Fixture::new();
    fx.dialog.show(DialogOptions::new()).unwrap();
    let fresh = fx.second_handle();
    fresh.hide(Scope::Form);
    assert!(fx.root_visible());
    fresh.hide(Scope::Child);
    assert!(!fx.root_visible());
}

#[test]
fn caller_window_is_the_host() {
    let fx = Fixture::new();
    fx.dialog.caller_window().alert("from caller");
    assert_eq!(fx.host.alerts(), vec!["from caller"]);
    assert_eq!(fx.dialog.caller_window().location(), None);

    let fx = Fixture::with_host(
        FakeHost::new().with_location("https://org.example.com/main.aspx?etc=1"),
    );
    assert_eq!(
        fx.dialog.caller_window().location().as_deref(),
        Some("https://org.example.com/main.aspx?etc=1")
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn written_max_height_matches_formula(
        height in 0u32..1200,
        padding in 0u32..120,
        with_buttons in any::<bool>(),
        title in "[a-z]{0,3}",
    ) {
        let fx = Fixture::new();
        let buttons = if with_buttons { vec![ButtonSpec::ok()] } else { vec![] };
        fx.dialog
            .show(
                DialogOptions::new()
                    .title(title.as_str())
                    .message("m")
                    .buttons(buttons)
                    .height(height)
                    .padding(padding),
            )
            .unwrap();
        let expected = (i64::from(height)
            - 2 * i64::from(padding)
            - if with_buttons { 44 } else { 0 }
            - if title.is_empty() { 0 } else { 32 })
        .max(0);
        let written = fx.dom.style(fx.node(MESSAGE_SELECTOR), "max-height");
        prop_assert_eq!(written, Some(format!("{expected}px")));
        prop_assert_eq!(fx.dom.markup_appends(), 1);
    }
}
