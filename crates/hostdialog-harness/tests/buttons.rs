#![forbid(unsafe_code)]

//! Integration tests: footer buttons, dispatch and the failure boundary.

use std::cell::RefCell;
use std::rc::Rc;

use hostdialog::markup::{BUTTON_FOCUS_CLASS, FOOTER_BUTTONS_SELECTOR};
use hostdialog::{ButtonSpec, DialogError, DialogOptions, Dom, Scope};
use hostdialog_harness::Fixture;
use pretty_assertions::assert_eq;

/// Shared event log written by callbacks.
fn log() -> Rc<RefCell<Vec<String>>> {
    Rc::new(RefCell::new(Vec::new()))
}

// ============================================================================
// Rendering and focus
// ============================================================================

#[test]
fn buttons_render_in_order() {
    let fx = Fixture::new();
    fx.dialog
        .show(DialogOptions::new().buttons(vec![
            ButtonSpec::new("Yes"),
            ButtonSpec::new("No"),
            ButtonSpec::new("Maybe"),
        ]))
        .unwrap();
    assert_eq!(fx.button_labels(), vec!["Yes", "No", "Maybe"]);
    for button in fx.buttons() {
        assert_eq!(fx.dom.tag(button).as_deref(), Some("button"));
        assert_eq!(fx.dom.attribute(button, "type").as_deref(), Some("button"));
    }
}

#[test]
fn rebuild_replaces_previous_buttons() {
    let fx = Fixture::new();
    fx.dialog
        .show(DialogOptions::new().buttons(vec![ButtonSpec::new("A"), ButtonSpec::new("B")]))
        .unwrap();
    fx.dialog.show(DialogOptions::new()).unwrap();
    assert_eq!(fx.dom.count(FOOTER_BUTTONS_SELECTOR), 1);
    assert_eq!(fx.button_labels(), vec!["OK"]);
}

#[test]
fn lone_button_is_focused() {
    let fx = Fixture::new();
    fx.dialog.show(DialogOptions::new()).unwrap();
    let ok = fx.buttons()[0];
    assert!(fx.dom.has_class(ok, BUTTON_FOCUS_CLASS));
    assert_eq!(fx.dom.focused(), Some(ok));
}

#[test]
fn lone_button_can_refuse_focus() {
    let fx = Fixture::new();
    fx.dialog
        .show(DialogOptions::new().buttons(vec![ButtonSpec::ok().focus(false)]))
        .unwrap();
    assert!(!fx.dom.has_class(fx.buttons()[0], BUTTON_FOCUS_CLASS));
    assert!(fx.dom.focus_log().is_empty());
}

#[test]
fn several_buttons_take_no_focus_by_default() {
    let fx = Fixture::new();
    fx.dialog
        .show(DialogOptions::new().buttons(vec![ButtonSpec::new("A"), ButtonSpec::new("B")]))
        .unwrap();
    assert!(fx.dom.focus_log().is_empty());
}

#[test]
fn every_requested_focus_is_applied_in_order() {
    let fx = Fixture::new();
    fx.dialog
        .show(DialogOptions::new().buttons(vec![
            ButtonSpec::new("A").focus(true),
            ButtonSpec::new("B"),
            ButtonSpec::new("C").focus(true),
        ]))
        .unwrap();
    let buttons = fx.buttons();
    assert_eq!(fx.dom.focus_log(), vec![buttons[0], buttons[2]]);
    assert_eq!(fx.dom.focused(), Some(buttons[2]));
    assert!(fx.dom.has_class(buttons[0], BUTTON_FOCUS_CLASS));
    assert!(!fx.dom.has_class(buttons[1], BUTTON_FOCUS_CLASS));
}

#[test]
fn focus_happens_after_reveal() {
    let fx = Fixture::new();
    fx.dialog.show(DialogOptions::new()).unwrap();
    fx.dialog.hide(Scope::Form);
    fx.dialog.show(DialogOptions::new()).unwrap();
    assert!(fx.root_visible());
    assert_eq!(fx.dom.focus_log().len(), 2);
}

// ============================================================================
// Dispatch
// ============================================================================

#[test]
fn click_hides_before_callback_and_disables_footer() {
    let fx = Fixture::new();
    let events = log();
    let (dialog, dom, sink) = (fx.dialog.clone(), fx.dom.clone(), events.clone());
    fx.dialog
        .show(DialogOptions::new().buttons(vec![ButtonSpec::ok().on_click(move || {
            let disabled = dom
                .query_all(FOOTER_BUTTONS_SELECTOR)
                .into_iter()
                .all(|b| dom.is_disabled(b));
            sink.borrow_mut()
                .push(format!("visible={} disabled={disabled}", dialog.is_visible()));
            Ok(())
        })]))
        .unwrap();

    fx.click_button(0);
    assert_eq!(events.borrow().as_slice(), ["visible=false disabled=true"]);
    assert!(!fx.root_visible());
    assert!(!fx.dom.is_disabled(fx.buttons()[0]));
}

#[test]
fn prevent_close_keeps_dialog_open() {
    let fx = Fixture::new();
    let events = log();
    let (dialog, sink) = (fx.dialog.clone(), events.clone());
    fx.dialog
        .show(DialogOptions::new().buttons(vec![
            ButtonSpec::new("Apply").prevent_close().on_click(move || {
                sink.borrow_mut()
                    .push(format!("visible={}", dialog.is_visible()));
                Ok(())
            }),
        ]))
        .unwrap();

    fx.click_button(0);
    assert_eq!(events.borrow().as_slice(), ["visible=true"]);
    assert!(fx.root_visible());
    assert!(!fx.dom.is_disabled(fx.buttons()[0]));
}

#[test]
fn button_without_callback_just_closes() {
    let fx = Fixture::new();
    fx.dialog.show(DialogOptions::new()).unwrap();
    fx.click_button(0);
    assert!(!fx.root_visible());
    assert!(fx.host.alerts().is_empty());
}

#[test]
fn failing_callback_is_alerted_and_buttons_recover() {
    let fx = Fixture::new();
    fx.dialog
        .show(DialogOptions::new().buttons(vec![
            ButtonSpec::new("Save")
                .prevent_close()
                .on_click(|| Err("record is locked".into())),
            ButtonSpec::new("Cancel"),
        ]))
        .unwrap();

    fx.click_button(0);
    assert_eq!(fx.host.alerts(), vec!["record is locked"]);
    assert!(fx.root_visible());
    for button in fx.buttons() {
        assert!(!fx.dom.is_disabled(button));
    }
}

#[test]
fn panicking_callback_is_contained() {
    let fx = Fixture::new();
    fx.dialog
        .show(DialogOptions::new().buttons(vec![
            ButtonSpec::ok().on_click(|| panic!("unexpected state")),
        ]))
        .unwrap();

    fx.click_button(0);
    assert_eq!(fx.host.alerts(), vec!["unexpected state"]);
    assert!(!fx.root_visible());
    assert!(!fx.dom.is_disabled(fx.buttons()[0]));
}

#[test]
fn callback_may_show_a_new_dialog() {
    let fx = Fixture::new();
    let dialog = fx.dialog.clone();
    fx.dialog
        .show(DialogOptions::new().buttons(vec![ButtonSpec::new("Next").on_click(move || {
            dialog.show(
                DialogOptions::alert("Step 2", "Continue?")
                    .buttons(vec![ButtonSpec::new("Finish"), ButtonSpec::new("Back")]),
            )?;
            Ok(())
        })]))
        .unwrap();

    fx.click_button(0);
    assert!(fx.root_visible());
    assert_eq!(fx.button_labels(), vec!["Finish", "Back"]);
    for button in fx.buttons() {
        assert!(!fx.dom.is_disabled(button));
    }
    assert!(fx.host.alerts().is_empty());
}

#[test]
fn callback_disabling_the_new_footer_is_respected() {
    let fx = Fixture::new();
    let dialog = fx.dialog.clone();
    fx.dialog
        .show(DialogOptions::new().buttons(vec![ButtonSpec::ok().on_click(move || {
            dialog.show(
                DialogOptions::new().buttons(vec![ButtonSpec::new("Wait").internal_id("wait")]),
            )?;
            dialog.set_button_enabled(Some("wait"), false, Scope::Form)?;
            Ok(())
        })]))
        .unwrap();

    fx.click_button(0);
    assert!(fx.dom.is_disabled(fx.buttons()[0]));
}

// ============================================================================
// Enable / disable by internal id
// ============================================================================

#[test]
fn internal_id_becomes_element_id() {
    let fx = Fixture::new();
    fx.dialog
        .show(DialogOptions::new().buttons(vec![ButtonSpec::new("Save").internal_id("save")]))
        .unwrap();
    assert_eq!(
        fx.dom.attribute(fx.buttons()[0], "id").as_deref(),
        Some("hostdialog-button-save")
    );
}

#[test]
fn set_button_enabled_toggles_one_button() {
    let fx = Fixture::new();
    fx.dialog
        .show(DialogOptions::new().buttons(vec![
            ButtonSpec::new("Save").internal_id("save"),
            ButtonSpec::new("Cancel").internal_id("cancel"),
        ]))
        .unwrap();
    let buttons = fx.buttons();

    fx.dialog
        .set_button_enabled(Some("save"), false, Scope::Form)
        .unwrap();
    assert!(fx.dom.is_disabled(buttons[0]));
    assert!(!fx.dom.is_disabled(buttons[1]));

    fx.dialog
        .set_button_enabled(Some("save"), true, Scope::Form)
        .unwrap();
    assert!(!fx.dom.is_disabled(buttons[0]));
}

#[test]
fn ids_that_are_not_css_identifiers_still_resolve() {
    let fx = Fixture::new();
    fx.dialog
        .show(DialogOptions::new().buttons(vec![
            ButtonSpec::new("Save").internal_id("save.draft"),
            ButtonSpec::new("Other").internal_id("a:b #c"),
        ]))
        .unwrap();
    let buttons = fx.buttons();

    fx.dialog
        .set_button_enabled(Some("save.draft"), false, Scope::Form)
        .unwrap();
    assert!(fx.dom.is_disabled(buttons[0]));
    assert!(!fx.dom.is_disabled(buttons[1]));

    fx.dialog
        .set_button_enabled(Some("a:b #c"), false, Scope::Child)
        .unwrap();
    assert!(fx.dom.is_disabled(buttons[1]));

    assert_eq!(
        fx.dialog.set_button_enabled(Some("save"), false, Scope::Form),
        Err(DialogError::ButtonNotFound("save".to_owned()))
    );
}

#[test]
fn disabled_button_ignores_clicks() {
    let fx = Fixture::new();
    let events = log();
    let sink = events.clone();
    fx.dialog
        .show(DialogOptions::new().buttons(vec![
            ButtonSpec::new("Save").internal_id("save").on_click(move || {
                sink.borrow_mut().push("saved".to_owned());
                Ok(())
            }),
        ]))
        .unwrap();
    fx.dialog
        .set_button_enabled(Some("save"), false, Scope::Form)
        .unwrap();
    fx.click_button(0);
    assert!(events.borrow().is_empty());
    assert!(fx.root_visible());
}

#[test]
fn set_button_enabled_argument_errors() {
    let fx = Fixture::new();
    fx.dialog.show(DialogOptions::new()).unwrap();
    assert_eq!(
        fx.dialog.set_button_enabled(None, true, Scope::Form),
        Err(DialogError::ArgumentMissing("internal_id"))
    );
    assert_eq!(
        fx.dialog.set_button_enabled(Some(""), true, Scope::Child),
        Err(DialogError::ArgumentMissing("internal_id"))
    );
    assert_eq!(
        fx.dialog.set_button_enabled(Some("missing"), true, Scope::Form),
        Err(DialogError::ButtonNotFound("missing".to_owned()))
    );
}

#[test]
fn form_scope_requires_initialization() {
    let fx = Fixture::new();
    assert_eq!(
        fx.dialog.set_button_enabled(None, false, Scope::Form),
        Err(DialogError::ArgumentMissing("internal_id"))
    );
    assert_eq!(
        fx.dialog.set_button_enabled(Some("save"), false, Scope::Form),
        Err(DialogError::ButtonNotFound("save".to_owned()))
    );
}

#[test]
fn child_scope_reaches_buttons_of_another_handle() {
    let fx = Fixture::new();
    fx.dialog
        .show(DialogOptions::new().buttons(vec![ButtonSpec::new("Save").internal_id("save")]))
        .unwrap();
    let subgrid = fx.second_handle();

    assert_eq!(
        subgrid.set_button_enabled(Some("save"), false, Scope::Form),
        Err(DialogError::ButtonNotFound("save".to_owned()))
    );
    subgrid
        .set_button_enabled(Some("save"), false, Scope::Child)
        .unwrap();
    assert!(fx.dom.is_disabled(fx.buttons()[0]));
}
