//! [`Dom`] over a browser document.
//!
//! Elements are handed out as [`NodeId`]s from a registry. Events are
//! delegated: one `click` and one capturing `load` listener on the
//! document look up the handlers registered for the target element, so
//! no JS closure is ever dropped while it runs (button callbacks routinely
//! rebuild the footer they were clicked in).

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use hostdialog::{Content, Dom, DomError, EmbeddedContext, FrameAccessError, Handler, NodeId};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{
    AddEventListenerOptions, Document, Element, Event, HtmlElement, HtmlIFrameElement, Window,
};

use crate::{RESPONSE_ENTRY_POINT, response_from_json};

#[derive(Default)]
struct Registry {
    next: u64,
    elements: HashMap<u64, Element>,
    click: HashMap<u64, Vec<Handler>>,
    load: HashMap<u64, Vec<Handler>>,
}

impl Registry {
    fn id_of(&mut self, element: Element) -> NodeId {
        if let Some((&id, _)) = self.elements.iter().find(|(_, known)| **known == element) {
            return NodeId::new(id);
        }
        self.next += 1;
        self.elements.insert(self.next, element);
        NodeId::new(self.next)
    }

    /// Registered id of `element` or its nearest registered ancestor that
    /// has handlers in `table`.
    fn handler_owner(
        &self,
        table: &HashMap<u64, Vec<Handler>>,
        mut element: Option<Element>,
    ) -> Option<u64> {
        while let Some(current) = element {
            if let Some((&id, _)) = self
                .elements
                .iter()
                .find(|(id, known)| **known == current && table.contains_key(*id))
            {
                return Some(id);
            }
            element = current.parent_element();
        }
        None
    }

    /// Forget every element below `parent`.
    fn prune_descendants(&mut self, parent: &Element) {
        let stale: Vec<u64> = self
            .elements
            .iter()
            .filter(|(_, element)| {
                let node: &web_sys::Node = element;
                *element != parent && parent.contains(Some(node))
            })
            .map(|(&id, _)| id)
            .collect();
        for id in &stale {
            self.elements.remove(id);
            self.click.remove(id);
            self.load.remove(id);
        }
        if !stale.is_empty() {
            tracing::trace!(count = stale.len(), "pruned detached elements");
        }
    }
}

type Listener = Closure<dyn FnMut(Event)>;

/// Browser implementation of [`Dom`], bound to one top-level document.
pub struct WebDom {
    document: Document,
    registry: Rc<RefCell<Registry>>,
    click_listener: Listener,
    load_listener: Listener,
}

impl WebDom {
    /// Bind to the top-level document of the current window.
    ///
    /// Walks up to the outermost same-origin window so the dialog always
    /// renders over the whole application, even when created from a nested
    /// frame.
    pub fn top_level() -> Result<Self, DomError> {
        let window = web_sys::window().ok_or(DomError::DocumentUnavailable)?;
        let top = window
            .top()
            .ok()
            .flatten()
            .filter(|top| top.location().href().is_ok())
            .unwrap_or(window);
        Self::for_window(&top)
    }

    pub fn for_window(window: &Window) -> Result<Self, DomError> {
        let document = window.document().ok_or(DomError::DocumentUnavailable)?;
        Self::new(document)
    }

    /// Bind to `document` and install the delegated listeners.
    pub fn new(document: Document) -> Result<Self, DomError> {
        let registry = Rc::new(RefCell::new(Registry::default()));

        let clicks = Rc::clone(&registry);
        let click_listener = Closure::<dyn FnMut(Event)>::wrap(Box::new(move |event: Event| {
            let target = event.target().and_then(|t| t.dyn_into::<Element>().ok());
            let handlers = {
                let registry = clicks.borrow();
                registry
                    .handler_owner(&registry.click, target)
                    .and_then(|id| registry.click.get(&id).cloned())
                    .unwrap_or_default()
            };
            for handler in handlers {
                handler();
            }
        }));
        document
            .add_event_listener_with_callback("click", click_listener.as_ref().unchecked_ref())
            .map_err(|_| DomError::DocumentUnavailable)?;

        let loads = Rc::clone(&registry);
        let load_listener = Closure::<dyn FnMut(Event)>::wrap(Box::new(move |event: Event| {
            let target = event.target().and_then(|t| t.dyn_into::<Element>().ok());
            let handlers = {
                let mut registry = loads.borrow_mut();
                let owner = target.and_then(|element| {
                    registry
                        .elements
                        .iter()
                        .find(|(_, known)| **known == element)
                        .map(|(&id, _)| id)
                });
                owner
                    .and_then(|id| registry.load.remove(&id))
                    .unwrap_or_default()
            };
            for handler in handlers {
                handler();
            }
        }));
        // Load does not bubble; listen in the capture phase.
        let options = AddEventListenerOptions::new();
        options.set_capture(true);
        document
            .add_event_listener_with_callback_and_add_event_listener_options(
                "load",
                load_listener.as_ref().unchecked_ref(),
                &options,
            )
            .map_err(|_| DomError::DocumentUnavailable)?;

        Ok(Self {
            document,
            registry,
            click_listener,
            load_listener,
        })
    }

    fn element(&self, node: NodeId) -> Option<Element> {
        self.registry.borrow().elements.get(&node.id()).cloned()
    }

    fn html_element(&self, node: NodeId) -> Option<HtmlElement> {
        self.element(node)?.dyn_into::<HtmlElement>().ok()
    }
}

impl Drop for WebDom {
    fn drop(&mut self) {
        let _ = self.document.remove_event_listener_with_callback(
            "click",
            self.click_listener.as_ref().unchecked_ref(),
        );
        let _ = self.document.remove_event_listener_with_callback_and_bool(
            "load",
            self.load_listener.as_ref().unchecked_ref(),
            true,
        );
    }
}

impl Dom for WebDom {
    fn query(&self, selector: &str) -> Option<NodeId> {
        let element = self.document.query_selector(selector).ok().flatten()?;
        Some(self.registry.borrow_mut().id_of(element))
    }

    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        let Ok(list) = self.document.query_selector_all(selector) else {
            return Vec::new();
        };
        let mut registry = self.registry.borrow_mut();
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|element| registry.id_of(element))
            .collect()
    }

    fn install_style(&self, css: &str) -> Result<(), DomError> {
        let head = self.document.head().ok_or(DomError::DocumentUnavailable)?;
        let style = self
            .document
            .create_element("style")
            .map_err(|_| DomError::ElementCreation("style".to_owned()))?;
        style.set_text_content(Some(css));
        head.append_child(&style)
            .map_err(|err| DomError::MarkupInsertion(format!("{err:?}")))?;
        Ok(())
    }

    fn append_markup(&self, markup: &str) -> Result<(), DomError> {
        let body = self.document.body().ok_or(DomError::DocumentUnavailable)?;
        body.insert_adjacent_html("beforeend", markup)
            .map_err(|err| DomError::MarkupInsertion(format!("{err:?}")))
    }

    fn create_element(&self, tag: &str) -> Result<NodeId, DomError> {
        let element = self
            .document
            .create_element(tag)
            .map_err(|_| DomError::ElementCreation(tag.to_owned()))?;
        Ok(self.registry.borrow_mut().id_of(element))
    }

    fn append_child(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let (Some(parent), Some(child)) = (self.element(parent), self.element(child)) else {
            return Err(DomError::StaleNode);
        };
        parent
            .append_child(&child)
            .map(|_| ())
            .map_err(|err| DomError::MarkupInsertion(format!("{err:?}")))
    }

    fn remove_children(&self, node: NodeId) {
        let Some(element) = self.element(node) else {
            return;
        };
        self.registry.borrow_mut().prune_descendants(&element);
        element.set_inner_html("");
    }

    fn set_content(&self, node: NodeId, content: &Content) {
        let Some(element) = self.element(node) else {
            return;
        };
        self.registry.borrow_mut().prune_descendants(&element);
        match content {
            Content::Text(text) => element.set_text_content(Some(text)),
            Content::Markup(markup) => element.set_inner_html(markup),
        }
    }

    fn add_class(&self, node: NodeId, class: &str) {
        if let Some(element) = self.element(node) {
            let _ = element.class_list().add_1(class);
        }
    }

    fn remove_class(&self, node: NodeId, class: &str) {
        if let Some(element) = self.element(node) {
            let _ = element.class_list().remove_1(class);
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node)
            .is_some_and(|element| element.class_list().contains(class))
    }

    fn set_style(&self, node: NodeId, property: &str, value: &str) {
        if let Some(element) = self.html_element(node) {
            let _ = element.style().set_property(property, value);
        }
    }

    fn style(&self, node: NodeId, property: &str) -> Option<String> {
        let value = self
            .html_element(node)?
            .style()
            .get_property_value(property)
            .ok()?;
        (!value.is_empty()).then_some(value)
    }

    fn set_visible(&self, node: NodeId, visible: bool) {
        if let Some(element) = self.html_element(node) {
            let style = element.style();
            let _ = if visible {
                style.remove_property("display").map(|_| ())
            } else {
                style.set_property("display", "none")
            };
        }
    }

    fn is_visible(&self, node: NodeId) -> bool {
        self.html_element(node).is_some_and(|element| {
            element.style().get_property_value("display").ok().as_deref() != Some("none")
        })
    }

    fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        if let Some(element) = self.element(node) {
            let _ = element.set_attribute(name, value);
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node)?.get_attribute(name)
    }

    fn set_disabled(&self, node: NodeId, disabled: bool) {
        if let Some(element) = self.element(node) {
            let _ = if disabled {
                element.set_attribute("disabled", "")
            } else {
                element.remove_attribute("disabled")
            };
        }
    }

    fn is_disabled(&self, node: NodeId) -> bool {
        self.element(node)
            .is_some_and(|element| element.has_attribute("disabled"))
    }

    fn focus(&self, node: NodeId) {
        if let Some(element) = self.html_element(node) {
            let _ = element.focus();
        }
    }

    fn on_click(&self, node: NodeId, handler: Handler) {
        self.registry
            .borrow_mut()
            .click
            .entry(node.id())
            .or_default()
            .push(handler);
    }

    fn on_load(&self, node: NodeId, handler: Handler) {
        self.registry
            .borrow_mut()
            .load
            .entry(node.id())
            .or_default()
            .push(handler);
    }

    fn frame_context(
        &self,
        frame: NodeId,
    ) -> Result<Option<Rc<dyn EmbeddedContext>>, FrameAccessError> {
        let Some(frame) = self
            .element(frame)
            .and_then(|element| element.dyn_into::<HtmlIFrameElement>().ok())
        else {
            return Ok(None);
        };
        let window = frame.content_window().ok_or(FrameAccessError::NotLoaded)?;
        // Reading the location throws for cross-origin content.
        window
            .location()
            .href()
            .map_err(|_| FrameAccessError::SecurityRestricted)?;
        Ok(Some(Rc::new(IframeContext { window })))
    }
}

/// Scripting context of a same-origin embedded frame.
pub struct IframeContext {
    window: Window,
}

impl EmbeddedContext for IframeContext {
    fn url(&self) -> Option<String> {
        self.window.location().href().ok()
    }

    fn call_response(&self) -> Result<serde_json::Value, FrameAccessError> {
        let entry = js_sys::Reflect::get(&self.window, &RESPONSE_ENTRY_POINT.into())
            .map_err(|_| FrameAccessError::SecurityRestricted)?;
        let entry = entry
            .dyn_into::<js_sys::Function>()
            .map_err(|_| FrameAccessError::EntryPointMissing(RESPONSE_ENTRY_POINT))?;
        let value = entry
            .call0(&self.window)
            .map_err(|err| FrameAccessError::CallFailed(format!("{err:?}")))?;
        if value.is_undefined() {
            return Ok(serde_json::Value::Null);
        }
        let json = js_sys::JSON::stringify(&value)
            .map_err(|err| FrameAccessError::CallFailed(format!("{err:?}")))?;
        response_from_json(json.as_string().as_deref())
            .map_err(|err| FrameAccessError::CallFailed(err.to_string()))
    }
}
