//! In-memory document tree.
//!
//! An arena of nodes addressed by [`NodeId`]. It carries just enough of the
//! browser document model for the enhancement layer: elements with ordered
//! attributes, inline styles and layout boxes, text nodes, and trusted markup
//! fragments that are stored verbatim rather than parsed.
//!
//! Replaced text and markup nodes go on a free list and their slots are
//! reused, so rewriting content in place never grows the arena.

use regex::Regex;
use std::fmt::Write as _;
use std::sync::OnceLock;

/// Handle to a node in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Vertical layout box, in document coordinates (pixels from the top of the page).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

#[derive(Debug, Clone)]
struct ElementData {
    tag: String,
    attributes: Vec<(String, String)>,
    styles: Vec<(String, String)>,
    layout: Option<Rect>,
}

#[derive(Debug, Clone)]
enum NodeKind {
    Element(ElementData),
    Text(String),
    /// Trusted HTML fragment, kept as written.
    Markup(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "link", "meta", "source"];

static TAG_REGEX: OnceLock<Regex> = OnceLock::new();

fn tag_regex() -> &'static Regex {
    TAG_REGEX.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid tag regex"))
}

/// A document: `<html>` with `<head>` and `<body>`.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    free: Vec<NodeId>,
    root: NodeId,
    head: NodeId,
    body: NodeId,
    active_element: Option<NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: NodeId(0),
            head: NodeId(0),
            body: NodeId(0),
            active_element: None,
        };
        doc.root = doc.create_element("html");
        doc.head = doc.create_element("head");
        doc.body = doc.create_element("body");
        doc.append_child(doc.root, doc.head);
        doc.append_child(doc.root, doc.body);
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn head(&self) -> NodeId {
        self.head
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    // ==================== Construction ====================

    /// Create a detached element. Tag names are stored lowercase.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push_node(NodeKind::Element(ElementData {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
            styles: Vec::new(),
            layout: None,
        }))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push_node(NodeKind::Text(text.to_string()))
    }

    fn push_node(&mut self, kind: NodeKind) -> NodeId {
        let node = Node {
            kind,
            parent: None,
            children: Vec::new(),
        };
        match self.free.pop() {
            Some(id) => {
                self.nodes[id.0] = node;
                id
            }
            None => {
                self.nodes.push(node);
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    /// Return a detached subtree's slots to the free list.
    fn release(&mut self, node: NodeId) {
        let mut subtree = self.descendants(node);
        subtree.push(node);
        if self.active_element.is_some_and(|active| subtree.contains(&active)) {
            self.active_element = None;
        }
        for id in subtree {
            self.nodes[id.0] = Node {
                kind: NodeKind::Text(String::new()),
                parent: None,
                children: Vec::new(),
            };
            self.free.push(id);
        }
    }

    /// Arena size, counting freed slots that wait for reuse.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Append `child` to `parent`, detaching it from any previous parent.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Create an element with attributes and append it to `parent`.
    pub fn append_element(&mut self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let el = self.create_element(tag);
        for (name, value) in attrs {
            self.set_attr(el, name, value);
        }
        self.append_child(parent, el);
        el
    }

    /// Remove a node from the tree. The node stays valid but detached.
    pub fn remove(&mut self, node: NodeId) {
        self.detach(node);
        if let Some(active) = self.active_element {
            if self.contains(node, active) {
                self.active_element = None;
            }
        }
    }

    /// Remove a node and free its subtree. Handles into it must not be used
    /// afterwards.
    pub fn discard(&mut self, node: NodeId) {
        self.detach(node);
        self.release(node);
    }

    /// Remove and free every child of `node`.
    pub fn discard_children(&mut self, node: NodeId) {
        for child in std::mem::take(&mut self.nodes[node.0].children) {
            self.nodes[child.0].parent = None;
            self.release(child);
        }
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != node);
        }
    }

    /// Remove every child of `node`. Element children stay valid but
    /// detached; text and markup children are freed.
    pub fn clear_children(&mut self, node: NodeId) {
        let children = std::mem::take(&mut self.nodes[node.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
            if !self.is_element(child) {
                self.release(child);
            }
        }
    }

    // ==================== Structure ====================

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        matches!(self.nodes[node.0].kind, NodeKind::Element(_))
    }

    /// Whether `node` is reachable from the document root.
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.contains(self.root, node)
    }

    /// Inclusive containment: a node contains itself.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Pre-order descendants of `node`, excluding `node` itself.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Elements under `scope` matching `pred`, in document order.
    pub fn query_within<F>(&self, scope: NodeId, pred: F) -> Vec<NodeId>
    where
        F: Fn(&Document, NodeId) -> bool,
    {
        self.descendants(scope)
            .into_iter()
            .filter(|&id| self.is_element(id) && pred(self, id))
            .collect()
    }

    /// Elements in the whole document matching `pred`, in document order.
    pub fn query_all<F>(&self, pred: F) -> Vec<NodeId>
    where
        F: Fn(&Document, NodeId) -> bool,
    {
        self.query_within(self.root, pred)
    }

    pub fn query_first<F>(&self, pred: F) -> Option<NodeId>
    where
        F: Fn(&Document, NodeId) -> bool,
    {
        self.query_all(pred).into_iter().next()
    }

    /// First attached element with the given `id` attribute.
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.query_first(|doc, node| doc.attr(node, "id") == Some(id))
    }

    /// Nearest inclusive ancestor matching `pred`.
    pub fn closest<F>(&self, node: NodeId, pred: F) -> Option<NodeId>
    where
        F: Fn(&Document, NodeId) -> bool,
    {
        let mut current = Some(node);
        while let Some(id) = current {
            if self.is_element(id) && pred(self, id) {
                return Some(id);
            }
            current = self.parent(id);
        }
        None
    }

    // ==================== Elements ====================

    fn element(&self, node: NodeId) -> Option<&ElementData> {
        match &self.nodes[node.0].kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes[node.0].kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    /// Lowercase tag name, or `None` for text and markup nodes.
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|data| data.tag.as_str())
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?
            .attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, node: NodeId, name: &str) -> bool {
        self.attr(node, name).is_some()
    }

    /// Set an attribute, keeping its original position when it already exists.
    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(data) = self.element_mut(node) {
            match data.attributes.iter_mut().find(|(n, _)| n == name) {
                Some((_, v)) => *v = value.to_string(),
                None => data.attributes.push((name.to_string(), value.to_string())),
            }
        }
    }

    pub fn remove_attr(&mut self, node: NodeId, name: &str) {
        if let Some(data) = self.element_mut(node) {
            data.attributes.retain(|(n, _)| n != name);
        }
    }

    // ==================== Classes ====================

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.attr(node, "class")
            .map(|value| value.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        self.set_class(node, class, true);
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        self.set_class(node, class, false);
    }

    /// Flip a class. Returns whether the class is present afterwards.
    pub fn toggle_class(&mut self, node: NodeId, class: &str) -> bool {
        let on = !self.has_class(node, class);
        self.set_class(node, class, on);
        on
    }

    /// Force a class on or off.
    pub fn set_class(&mut self, node: NodeId, class: &str, on: bool) {
        if self.element(node).is_none() || self.has_class(node, class) == on {
            return;
        }
        let mut classes: Vec<String> = self
            .attr(node, "class")
            .map(|value| value.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        if on {
            classes.push(class.to_string());
        } else {
            classes.retain(|c| c != class);
        }
        self.set_attr(node, "class", &classes.join(" "));
    }

    // ==================== Styles & layout ====================

    /// Set an inline style property. An empty value removes it.
    pub fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(data) = self.element_mut(node) {
            data.styles.retain(|(p, _)| p != property);
            if !value.is_empty() {
                data.styles.push((property.to_string(), value.to_string()));
            }
        }
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.element(node)?
            .styles
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.as_str())
    }

    /// Record the layout box of an element, as reported by the host.
    pub fn set_layout(&mut self, node: NodeId, rect: Rect) {
        if let Some(data) = self.element_mut(node) {
            data.layout = Some(rect);
        }
    }

    pub fn layout(&self, node: NodeId) -> Option<Rect> {
        self.element(node)?.layout
    }

    // ==================== Focus ====================

    pub fn focus(&mut self, node: NodeId) {
        self.active_element = Some(node);
    }

    pub fn active_element(&self) -> Option<NodeId> {
        self.active_element
    }

    // ==================== Content ====================

    /// Replace the children of `node` with a single text node.
    pub fn set_text(&mut self, node: NodeId, text: &str) {
        self.clear_children(node);
        let text_node = self.create_text(text);
        self.append_child(node, text_node);
    }

    /// Replace the children of `node` with a trusted markup fragment.
    pub fn set_inner_html(&mut self, node: NodeId, html: &str) {
        self.clear_children(node);
        let markup = self.push_node(NodeKind::Markup(html.to_string()));
        self.append_child(node, markup);
    }

    /// Concatenated text of `node` and its descendants. Markup fragments
    /// contribute their text with tags removed.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        match &self.nodes[node.0].kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Markup(html) => out.push_str(&tag_regex().replace_all(html, "")),
            NodeKind::Element(_) => {
                for &child in self.children(node) {
                    self.collect_text(child, out);
                }
            }
        }
    }

    /// Document title: the text of the first `<title>` in `<head>`.
    pub fn title(&self) -> String {
        self.query_within(self.head, |doc, n| doc.tag(n) == Some("title"))
            .first()
            .map(|&title| self.text_content(title))
            .unwrap_or_default()
    }

    /// Set the document title, creating `<title>` when absent.
    pub fn set_title(&mut self, text: &str) {
        let existing = self
            .query_within(self.head, |doc, n| doc.tag(n) == Some("title"))
            .first()
            .copied();
        let title = match existing {
            Some(title) => title,
            None => self.append_element(self.head, "title", &[]),
        };
        self.set_text(title, text);
    }

    // ==================== Serialization ====================

    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(node) {
            self.write_node(child, &mut out);
        }
        out
    }

    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_node(node, &mut out);
        out
    }

    fn write_node(&self, node: NodeId, out: &mut String) {
        match &self.nodes[node.0].kind {
            NodeKind::Text(text) => out.push_str(&escape_text(text)),
            NodeKind::Markup(html) => out.push_str(html),
            NodeKind::Element(data) => {
                out.push('<');
                out.push_str(&data.tag);
                for (name, value) in &data.attributes {
                    let _ = write!(out, " {}=\"{}\"", name, escape_attr(value));
                }
                if !data.styles.is_empty() {
                    let style = data
                        .styles
                        .iter()
                        .map(|(p, v)| format!("{}: {};", p, v))
                        .collect::<Vec<_>>()
                        .join(" ");
                    let _ = write!(out, " style=\"{}\"", escape_attr(&style));
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&data.tag.as_str()) {
                    return;
                }
                for &child in self.children(node) {
                    self.write_node(child, out);
                }
                let _ = write!(out, "</{}>", data.tag);
            }
        }
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_has_head_and_body() {
        let doc = Document::new();
        assert_eq!(doc.children(doc.root()), &[doc.head(), doc.body()]);
        assert_eq!(doc.tag(doc.head()), Some("head"));
        assert_eq!(doc.outer_html(doc.root()), "<html><head></head><body></body></html>");
    }

    #[test]
    fn test_append_moves_between_parents() {
        let mut doc = Document::new();
        let a = doc.append_element(doc.body(), "div", &[]);
        let b = doc.append_element(doc.body(), "div", &[]);
        let span = doc.append_element(a, "span", &[]);

        doc.append_child(b, span);
        assert!(doc.children(a).is_empty());
        assert_eq!(doc.parent(span), Some(b));
    }

    #[test]
    fn test_remove_detaches() {
        let mut doc = Document::new();
        let link = doc.append_element(doc.head(), "link", &[("rel", "canonical")]);
        assert!(doc.is_attached(link));

        doc.remove(link);
        assert!(!doc.is_attached(link));
        assert!(doc.query_all(|d, n| d.tag(n) == Some("link")).is_empty());
    }

    #[test]
    fn test_remove_clears_focus_inside() {
        let mut doc = Document::new();
        let menu = doc.append_element(doc.body(), "nav", &[]);
        let link = doc.append_element(menu, "a", &[]);
        doc.focus(link);

        doc.remove(menu);
        assert_eq!(doc.active_element(), None);
    }

    #[test]
    fn test_query_is_document_order() {
        let mut doc = Document::new();
        let outer = doc.append_element(doc.body(), "div", &[("class", "x")]);
        let inner = doc.append_element(outer, "div", &[("class", "x")]);
        let after = doc.append_element(doc.body(), "div", &[("class", "x")]);

        let found = doc.query_all(|d, n| d.has_class(n, "x"));
        assert_eq!(found, vec![outer, inner, after]);
    }

    #[test]
    fn test_element_by_id_ignores_detached() {
        let mut doc = Document::new();
        let orphan = doc.create_element("div");
        doc.set_attr(orphan, "id", "ghost");
        assert_eq!(doc.element_by_id("ghost"), None);

        doc.append_child(doc.body(), orphan);
        assert_eq!(doc.element_by_id("ghost"), Some(orphan));
    }

    #[test]
    fn test_closest_is_inclusive() {
        let mut doc = Document::new();
        let a = doc.append_element(doc.body(), "a", &[("data-scroll", "about")]);
        let span = doc.append_element(a, "span", &[]);

        let is_scroll_link = |d: &Document, n: NodeId| d.has_attr(n, "data-scroll");
        assert_eq!(doc.closest(span, is_scroll_link), Some(a));
        assert_eq!(doc.closest(a, is_scroll_link), Some(a));
        assert_eq!(doc.closest(doc.body(), is_scroll_link), None);
    }

    #[test]
    fn test_class_helpers() {
        let mut doc = Document::new();
        let el = doc.append_element(doc.body(), "div", &[("class", "a  b")]);

        assert!(doc.has_class(el, "a"));
        doc.add_class(el, "c");
        doc.add_class(el, "c");
        assert_eq!(doc.attr(el, "class"), Some("a b c"));

        doc.remove_class(el, "a");
        assert_eq!(doc.attr(el, "class"), Some("b c"));

        assert!(!doc.toggle_class(el, "b"));
        assert!(doc.toggle_class(el, "b"));
        assert!(doc.has_class(el, "b"));
    }

    #[test]
    fn test_set_attr_keeps_position() {
        let mut doc = Document::new();
        let el = doc.append_element(doc.head(), "meta", &[("name", "description"), ("content", "old")]);
        doc.set_attr(el, "name", "description");
        doc.set_attr(el, "content", "new");
        assert_eq!(doc.outer_html(el), r#"<meta name="description" content="new">"#);
    }

    #[test]
    fn test_styles() {
        let mut doc = Document::new();
        let body = doc.body();
        doc.set_style(body, "overflow", "hidden");
        doc.set_style(body, "padding-right", "15px");
        assert_eq!(doc.style(body, "overflow"), Some("hidden"));
        assert_eq!(
            doc.outer_html(body),
            r#"<body style="overflow: hidden; padding-right: 15px;"></body>"#
        );

        doc.set_style(body, "overflow", "");
        assert_eq!(doc.style(body, "overflow"), None);
    }

    #[test]
    fn test_set_text_escapes_on_serialize() {
        let mut doc = Document::new();
        let p = doc.append_element(doc.body(), "p", &[]);
        doc.set_text(p, "a < b & c");
        assert_eq!(doc.text_content(p), "a < b & c");
        assert_eq!(doc.inner_html(p), "a &lt; b &amp; c");
    }

    #[test]
    fn test_set_inner_html_keeps_markup() {
        let mut doc = Document::new();
        let p = doc.append_element(doc.body(), "p", &[]);
        doc.set_text(p, "old");
        doc.set_inner_html(p, "Hello <strong>world</strong>");

        assert_eq!(doc.inner_html(p), "Hello <strong>world</strong>");
        assert_eq!(doc.text_content(p), "Hello world");
    }

    #[test]
    fn test_rewriting_text_reuses_slots() {
        let mut doc = Document::new();
        let p = doc.append_element(doc.body(), "p", &[]);
        doc.set_text(p, "first");
        let size = doc.node_count();

        for i in 0..50 {
            doc.set_text(p, &format!("text {}", i));
            doc.set_inner_html(p, "<em>markup</em>");
        }

        assert_eq!(doc.node_count(), size);
        assert_eq!(doc.inner_html(p), "<em>markup</em>");
    }

    #[test]
    fn test_clear_children_keeps_elements_valid() {
        let mut doc = Document::new();
        let p = doc.append_element(doc.body(), "p", &[]);
        let span = doc.append_element(p, "span", &[("id", "kept")]);
        doc.set_text(span, "inner");

        doc.set_text(p, "replaced");

        assert!(!doc.is_attached(span));
        assert_eq!(doc.attr(span, "id"), Some("kept"));
        assert_eq!(doc.text_content(span), "inner");
        assert_eq!(doc.text_content(p), "replaced");
    }

    #[test]
    fn test_discard_frees_subtree() {
        let mut doc = Document::new();
        let head = doc.head();
        let link = doc.append_element(head, "link", &[("rel", "canonical")]);
        let size = doc.node_count();

        doc.discard(link);
        let fresh = doc.append_element(head, "link", &[("rel", "alternate")]);

        assert_eq!(doc.node_count(), size);
        assert_eq!(doc.children(head), &[fresh]);
        assert_eq!(doc.attr(fresh, "rel"), Some("alternate"));
    }

    #[test]
    fn test_discard_children_reuses_element_slots() {
        let mut doc = Document::new();
        let span = doc.append_element(doc.body(), "span", &[]);
        let img = doc.append_element(span, "img", &[("src", "/a.png")]);
        doc.focus(img);
        let size = doc.node_count();

        doc.discard_children(span);
        doc.append_element(span, "img", &[("src", "/b.png")]);

        assert_eq!(doc.node_count(), size);
        assert_eq!(doc.active_element(), None);
        assert_eq!(doc.inner_html(span), "<img src=\"/b.png\">");
    }

    #[test]
    fn test_title_roundtrip() {
        let mut doc = Document::new();
        assert_eq!(doc.title(), "");
        doc.set_title("Home");
        doc.set_title("Accueil");
        assert_eq!(doc.title(), "Accueil");
        assert_eq!(doc.query_all(|d, n| d.tag(n) == Some("title")).len(), 1);
    }

    #[test]
    fn test_text_nodes_ignore_attributes() {
        let mut doc = Document::new();
        let text = doc.create_text("x");
        doc.set_attr(text, "id", "nope");
        assert_eq!(doc.attr(text, "id"), None);
        assert_eq!(doc.tag(text), None);
    }

    #[test]
    fn test_layout_rect() {
        let mut doc = Document::new();
        let section = doc.append_element(doc.body(), "section", &[]);
        assert_eq!(doc.layout(section), None);
        doc.set_layout(section, Rect::new(1200.0, 300.0));
        assert_eq!(doc.layout(section).unwrap().bottom(), 1500.0);
    }
}
