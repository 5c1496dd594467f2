#![forbid(unsafe_code)]

//! In-memory [`Dom`] for driving the dialog without a browser.
//!
//! `FakeDom` keeps a small node arena rooted at `<html>` with `<head>` and
//! `<body>`. Markup appended through the [`Dom`] trait is parsed, so the
//! dialog's injected subtree and embedded frames become queryable nodes.
//! On top of the trait it records what the widget did (style installs,
//! markup appends, focus moves) and lets tests fire DOM events.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use hostdialog::{Content, Dom, DomError, EmbeddedContext, FrameAccessError, Handler, NodeId};

use crate::parse::{Compound, Token, is_void, parse_selector, parse_style, tokenize};

const HTML: usize = 0;
const HEAD: usize = 1;
const BODY: usize = 2;

#[derive(Debug, Clone)]
enum Kind {
    Element(String),
    Text(String),
}

#[derive(Clone)]
struct Node {
    kind: Kind,
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    styles: BTreeMap<String, String>,
    parent: Option<usize>,
    children: Vec<usize>,
    disabled: bool,
    content: Option<Content>,
    click: Vec<Handler>,
    load: Vec<Handler>,
}

impl Node {
    fn element(tag: &str) -> Self {
        Self {
            kind: Kind::Element(tag.to_ascii_lowercase()),
            attributes: BTreeMap::new(),
            classes: Vec::new(),
            styles: BTreeMap::new(),
            parent: None,
            children: Vec::new(),
            disabled: false,
            content: None,
            click: Vec::new(),
            load: Vec::new(),
        }
    }

    fn text(value: &str) -> Self {
        Self {
            kind: Kind::Text(value.to_owned()),
            ..Self::element("#text")
        }
    }

    fn tag(&self) -> Option<&str> {
        match &self.kind {
            Kind::Element(tag) => Some(tag),
            Kind::Text(_) => None,
        }
    }

    fn set_attribute(&mut self, name: &str, value: &str) {
        match name {
            "class" => {
                self.classes = value.split_whitespace().map(str::to_owned).collect();
            }
            "style" => {
                self.styles = parse_style(value).into_iter().collect();
            }
            "disabled" => self.disabled = true,
            _ => {}
        }
        self.attributes.insert(name.to_owned(), value.to_owned());
    }

    fn matches(&self, compound: &Compound) -> bool {
        let Some(tag) = self.tag() else {
            return false;
        };
        compound.tag.as_deref().is_none_or(|want| want == tag)
            && compound
                .id
                .as_deref()
                .is_none_or(|id| self.attributes.get("id").is_some_and(|have| have == id))
            && compound
                .classes
                .iter()
                .all(|class| self.classes.contains(class))
    }
}

/// What [`Dom::frame_context`] hands back for `<iframe>` nodes.
#[derive(Clone)]
pub enum FrameMode {
    /// No browsing context yet.
    NotLoaded,
    /// Cross-origin content.
    Restricted,
    /// A reachable context.
    Ready(Rc<dyn EmbeddedContext>),
}

/// In-memory top-level document.
pub struct FakeDom {
    nodes: RefCell<Vec<Node>>,
    style_installs: Cell<usize>,
    markup_appends: Cell<usize>,
    focus_log: RefCell<Vec<NodeId>>,
    frame_mode: RefCell<FrameMode>,
    fail_creation: Cell<bool>,
}

impl Default for FakeDom {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeDom {
    pub fn new() -> Self {
        let mut html = Node::element("html");
        html.children = vec![HEAD, BODY];
        let mut head = Node::element("head");
        head.parent = Some(HTML);
        let mut body = Node::element("body");
        body.parent = Some(HTML);
        Self {
            nodes: RefCell::new(vec![html, head, body]),
            style_installs: Cell::new(0),
            markup_appends: Cell::new(0),
            focus_log: RefCell::new(Vec::new()),
            frame_mode: RefCell::new(FrameMode::NotLoaded),
            fail_creation: Cell::new(false),
        }
    }

    /// Number of style sheets installed so far.
    pub fn style_installs(&self) -> usize {
        self.style_installs.get()
    }

    /// Number of markup fragments appended to the body so far.
    pub fn markup_appends(&self) -> usize {
        self.markup_appends.get()
    }

    /// Number of attached elements matching `selector`.
    pub fn count(&self, selector: &str) -> usize {
        self.query_all(selector).len()
    }

    /// Every element that received focus, in order.
    pub fn focus_log(&self) -> Vec<NodeId> {
        self.focus_log.borrow().clone()
    }

    /// The element that currently has focus.
    pub fn focused(&self) -> Option<NodeId> {
        self.focus_log.borrow().last().copied()
    }

    /// Make the next element creations fail.
    pub fn fail_element_creation(&self, fail: bool) {
        self.fail_creation.set(fail);
    }

    /// Choose what embedded frames resolve to.
    pub fn set_frame_mode(&self, mode: FrameMode) {
        *self.frame_mode.borrow_mut() = mode;
    }

    /// Concatenated text of `node` and its descendants, entities as written.
    pub fn text_content(&self, node: NodeId) -> String {
        let nodes = self.nodes.borrow();
        let mut out = String::new();
        collect_text(&nodes, index(node), &mut out);
        out
    }

    /// The content last set on `node` through [`Dom::set_content`].
    pub fn content(&self, node: NodeId) -> Option<Content> {
        self.with_node(node, |n| n.content.clone()).flatten()
    }

    /// Tag name of an element.
    pub fn tag(&self, node: NodeId) -> Option<String> {
        self.with_node(node, |n| n.tag().map(str::to_owned)).flatten()
    }

    /// Element children of `node`, in order.
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        let nodes = self.nodes.borrow();
        nodes
            .get(index(node))
            .map(|n| {
                n.children
                    .iter()
                    .filter(|&&child| nodes[child].tag().is_some())
                    .map(|&child| node_id(child))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether `node` is reachable from the document root.
    pub fn is_attached(&self, node: NodeId) -> bool {
        let nodes = self.nodes.borrow();
        let mut current = Some(index(node));
        while let Some(i) = current {
            if i == HTML {
                return true;
            }
            current = nodes.get(i).and_then(|n| n.parent);
        }
        false
    }

    /// Dispatch a click to `node`'s handlers, as a user click would.
    ///
    /// Disabled elements swallow the click, like browser buttons do.
    pub fn click(&self, node: NodeId) {
        let handlers = {
            let nodes = self.nodes.borrow();
            match nodes.get(index(node)) {
                Some(n) if !n.disabled => n.click.clone(),
                _ => Vec::new(),
            }
        };
        for handler in handlers {
            handler();
        }
    }

    /// Click the first element matching `selector`; `false` if none.
    pub fn click_selector(&self, selector: &str) -> bool {
        match self.query(selector) {
            Some(node) => {
                self.click(node);
                true
            }
            None => false,
        }
    }

    /// Fire the pending load handlers of `node` (a frame finished loading).
    pub fn fire_load(&self, node: NodeId) {
        let handlers = match self.nodes.borrow_mut().get_mut(index(node)) {
            Some(n) => std::mem::take(&mut n.load),
            None => Vec::new(),
        };
        for handler in handlers {
            handler();
        }
    }

    fn with_node<R>(&self, node: NodeId, f: impl FnOnce(&Node) -> R) -> Option<R> {
        self.nodes.borrow().get(index(node)).map(f)
    }

    fn with_node_mut(&self, node: NodeId, f: impl FnOnce(&mut Node)) {
        if let Some(n) = self.nodes.borrow_mut().get_mut(index(node)) {
            f(n);
        }
    }

    fn push_node(nodes: &mut Vec<Node>, node: Node) -> usize {
        nodes.push(node);
        nodes.len() - 1
    }

    fn attach(nodes: &mut [Node], parent: usize, child: usize) {
        if let Some(old) = nodes[child].parent.take() {
            nodes[old].children.retain(|&c| c != child);
        }
        nodes[child].parent = Some(parent);
        nodes[parent].children.push(child);
    }

    fn detach_children(nodes: &mut [Node], parent: usize) {
        for child in std::mem::take(&mut nodes[parent].children) {
            nodes[child].parent = None;
        }
    }

    fn append_parsed(&self, parent: usize, markup: &str) {
        let mut nodes = self.nodes.borrow_mut();
        let mut stack = vec![parent];
        for token in tokenize(markup) {
            let top = stack.last().copied().unwrap_or(parent);
            match token {
                Token::Text(text) => {
                    let child = Self::push_node(&mut nodes, Node::text(&text));
                    Self::attach(&mut nodes, top, child);
                }
                Token::Open {
                    tag,
                    attrs,
                    self_closing,
                } => {
                    let mut element = Node::element(&tag);
                    for (name, value) in &attrs {
                        element.set_attribute(name, value);
                    }
                    let child = Self::push_node(&mut nodes, element);
                    Self::attach(&mut nodes, top, child);
                    if !self_closing && !is_void(&tag) {
                        stack.push(child);
                    }
                }
                Token::Close(tag) => {
                    if let Some(pos) = stack
                        .iter()
                        .skip(1)
                        .rposition(|&i| nodes[i].tag() == Some(tag.as_str()))
                    {
                        stack.truncate(pos + 1);
                    }
                }
            }
        }
    }

    fn matches_selector(nodes: &[Node], node: usize, compounds: &[Compound]) -> bool {
        let Some((last, outer)) = compounds.split_last() else {
            return false;
        };
        if !nodes[node].matches(last) {
            return false;
        }
        let mut ancestor = nodes[node].parent;
        for compound in outer.iter().rev() {
            loop {
                let Some(i) = ancestor else {
                    return false;
                };
                ancestor = nodes[i].parent;
                if nodes[i].matches(compound) {
                    break;
                }
            }
        }
        true
    }
}

fn index(node: NodeId) -> usize {
    usize::try_from(node.id()).unwrap_or(usize::MAX)
}

fn node_id(index: usize) -> NodeId {
    NodeId::new(index as u64)
}

fn collect_text(nodes: &[Node], node: usize, out: &mut String) {
    let Some(n) = nodes.get(node) else {
        return;
    };
    match &n.kind {
        Kind::Text(text) => out.push_str(text),
        Kind::Element(_) => {
            for &child in &n.children {
                collect_text(nodes, child, out);
            }
        }
    }
}

fn document_order(nodes: &[Node], node: usize, out: &mut Vec<usize>) {
    out.push(node);
    for &child in &nodes[node].children {
        document_order(nodes, child, out);
    }
}

impl Dom for FakeDom {
    fn query(&self, selector: &str) -> Option<NodeId> {
        self.query_all(selector).into_iter().next()
    }

    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        let Some(compounds) = parse_selector(selector) else {
            return Vec::new();
        };
        let nodes = self.nodes.borrow();
        let mut order = Vec::new();
        document_order(&nodes, HTML, &mut order);
        order
            .into_iter()
            .filter(|&i| Self::matches_selector(&nodes, i, &compounds))
            .map(node_id)
            .collect()
    }

    fn install_style(&self, css: &str) -> Result<(), DomError> {
        let mut nodes = self.nodes.borrow_mut();
        let mut style = Node::element("style");
        style.content = Some(Content::text(css));
        let style = Self::push_node(&mut nodes, style);
        let text = Self::push_node(&mut nodes, Node::text(css));
        Self::attach(&mut nodes, style, text);
        Self::attach(&mut nodes, HEAD, style);
        self.style_installs.set(self.style_installs.get() + 1);
        Ok(())
    }

    fn append_markup(&self, markup: &str) -> Result<(), DomError> {
        self.append_parsed(BODY, markup);
        self.markup_appends.set(self.markup_appends.get() + 1);
        Ok(())
    }

    fn create_element(&self, tag: &str) -> Result<NodeId, DomError> {
        if self.fail_creation.get() {
            return Err(DomError::ElementCreation(tag.to_owned()));
        }
        let mut nodes = self.nodes.borrow_mut();
        Ok(node_id(Self::push_node(&mut nodes, Node::element(tag))))
    }

    fn append_child(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let mut nodes = self.nodes.borrow_mut();
        let (parent, child) = (index(parent), index(child));
        if parent >= nodes.len() || child >= nodes.len() {
            return Err(DomError::StaleNode);
        }
        Self::attach(&mut nodes, parent, child);
        Ok(())
    }

    fn remove_children(&self, node: NodeId) {
        let mut nodes = self.nodes.borrow_mut();
        if index(node) < nodes.len() {
            Self::detach_children(&mut nodes, index(node));
        }
    }

    fn set_content(&self, node: NodeId, content: &Content) {
        let i = index(node);
        {
            let mut nodes = self.nodes.borrow_mut();
            if i >= nodes.len() {
                return;
            }
            Self::detach_children(&mut nodes, i);
            nodes[i].content = Some(content.clone());
            if let Content::Text(text) = content {
                let child = Self::push_node(&mut nodes, Node::text(text));
                Self::attach(&mut nodes, i, child);
            }
        }
        if let Content::Markup(markup) = content {
            self.append_parsed(i, markup);
        }
    }

    fn add_class(&self, node: NodeId, class: &str) {
        self.with_node_mut(node, |n| {
            if !n.classes.iter().any(|c| c == class) {
                n.classes.push(class.to_owned());
            }
        });
    }

    fn remove_class(&self, node: NodeId, class: &str) {
        self.with_node_mut(node, |n| n.classes.retain(|c| c != class));
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.with_node(node, |n| n.classes.iter().any(|c| c == class))
            .unwrap_or(false)
    }

    fn set_style(&self, node: NodeId, property: &str, value: &str) {
        self.with_node_mut(node, |n| {
            n.styles.insert(property.to_owned(), value.to_owned());
        });
    }

    fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.with_node(node, |n| n.styles.get(property).cloned())
            .flatten()
    }

    fn set_visible(&self, node: NodeId, visible: bool) {
        self.with_node_mut(node, |n| {
            if visible {
                n.styles.remove("display");
            } else {
                n.styles.insert("display".to_owned(), "none".to_owned());
            }
        });
    }

    fn is_visible(&self, node: NodeId) -> bool {
        self.with_node(node, |n| n.styles.get("display").is_none_or(|d| d != "none"))
            .unwrap_or(false)
    }

    fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        self.with_node_mut(node, |n| n.set_attribute(name, value));
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.with_node(node, |n| n.attributes.get(name).cloned())
            .flatten()
    }

    fn set_disabled(&self, node: NodeId, disabled: bool) {
        self.with_node_mut(node, |n| n.disabled = disabled);
    }

    fn is_disabled(&self, node: NodeId) -> bool {
        self.with_node(node, |n| n.disabled).unwrap_or(false)
    }

    fn focus(&self, node: NodeId) {
        self.focus_log.borrow_mut().push(node);
    }

    fn on_click(&self, node: NodeId, handler: Handler) {
        self.with_node_mut(node, |n| n.click.push(handler));
    }

    fn on_load(&self, node: NodeId, handler: Handler) {
        self.with_node_mut(node, |n| n.load.push(handler));
    }

    fn frame_context(
        &self,
        frame: NodeId,
    ) -> Result<Option<Rc<dyn EmbeddedContext>>, FrameAccessError> {
        if self.tag(frame).as_deref() != Some("iframe") {
            return Ok(None);
        }
        match &*self.frame_mode.borrow() {
            FrameMode::NotLoaded => Err(FrameAccessError::NotLoaded),
            FrameMode::Restricted => Err(FrameAccessError::SecurityRestricted),
            FrameMode::Ready(context) => Ok(Some(Rc::clone(context))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appended_markup_is_queryable() {
        let dom = FakeDom::new();
        dom.append_markup(r#"<div id="a" class="x"><span class="y">t</span></div>"#)
            .unwrap();
        let span = dom.query("#a .y").unwrap();
        assert_eq!(dom.tag(span).as_deref(), Some("span"));
        assert_eq!(dom.text_content(span), "t");
        assert!(dom.query("#a .x").is_none());
        assert_eq!(dom.markup_appends(), 1);
    }

    #[test]
    fn set_content_replaces_children() {
        let dom = FakeDom::new();
        dom.append_markup(r#"<div id="m"><b id="old"></b></div>"#).unwrap();
        let m = dom.query("#m").unwrap();
        dom.set_content(m, &Content::markup(r#"<i id="new"></i>"#));
        assert!(dom.query("#old").is_none());
        assert!(dom.query("#new").is_some());
        dom.set_content(m, &Content::text("<i id=\"raw\"></i>"));
        assert!(dom.query("#raw").is_none());
        assert_eq!(dom.text_content(m), "<i id=\"raw\"></i>");
    }

    #[test]
    fn inline_display_none_hides() {
        let dom = FakeDom::new();
        dom.append_markup(r#"<div id="h" style="display: none"></div>"#).unwrap();
        let h = dom.query("#h").unwrap();
        assert!(!dom.is_visible(h));
        dom.set_visible(h, true);
        assert!(dom.is_visible(h));
    }

    #[test]
    fn disabled_elements_swallow_clicks() {
        let dom = FakeDom::new();
        let button = dom.create_element("button").unwrap();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        dom.on_click(button, Rc::new(move || counter.set(counter.get() + 1)));
        dom.click(button);
        dom.set_disabled(button, true);
        dom.click(button);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn load_handlers_fire_once() {
        let dom = FakeDom::new();
        let frame = dom.create_element("iframe").unwrap();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        dom.on_load(frame, Rc::new(move || counter.set(counter.get() + 1)));
        dom.fire_load(frame);
        dom.fire_load(frame);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn detached_nodes_are_not_queried() {
        let dom = FakeDom::new();
        let node = dom.create_element("div").unwrap();
        dom.set_attribute(node, "id", "loose");
        assert!(dom.query("#loose").is_none());
        assert!(!dom.is_attached(node));
        let body = dom.query("body").unwrap();
        dom.append_child(body, node).unwrap();
        assert_eq!(dom.query("#loose"), Some(node));
    }
}
