// ============================================================================
// spark-mvvm - Host Tree
// The minimal document tree the compiler binds against
// ============================================================================
//
// Just enough of a document for the binder: elements with string
// attributes, a value property and event listeners; text leaves; raw-markup
// leaves; and empty anchors marking rendered ranges. Parents are weak,
// children are strong, so dropping a detached subtree frees it.
// ============================================================================

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use crate::error::Result;

// =============================================================================
// EVENTS
// =============================================================================

/// A signal delivered to a node's listeners.
#[derive(Clone)]
pub struct Event {
    kind: String,
    target: Node,
}

impl Event {
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Node the event was dispatched on.
    pub fn target(&self) -> &Node {
        &self.target
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event").field("kind", &self.kind).finish()
    }
}

/// Event listener. Reads the target through the event, never by capturing
/// the node, so listeners do not keep their node alive.
pub type Listener = Box<dyn FnMut(&Event) -> Result<()>>;

// =============================================================================
// NODE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element(String),
    Text,
    /// Markup inserted verbatim (raw interpolation, `html` directive)
    Raw,
    /// Empty marker delimiting a rendered range
    Anchor,
}

struct NodeData {
    kind: NodeKind,
    attributes: RefCell<IndexMap<String, String>>,
    /// Text of a text leaf, markup of a raw leaf
    text: RefCell<String>,
    /// Value property of a form control
    value: RefCell<String>,
    children: RefCell<Vec<Node>>,
    parent: RefCell<Weak<NodeData>>,
    listeners: RefCell<Vec<(String, Rc<RefCell<Listener>>)>>,
}

/// A shared handle to a node of the host tree.
///
/// # Example
///
/// ```
/// use spark_mvvm::compiler::dom::Node;
///
/// let list = Node::element("ul")
///     .with_attr("class", "todos")
///     .with_child(Node::element("li").with_child(Node::text("milk")));
///
/// assert_eq!(list.to_html(), r#"<ul class="todos"><li>milk</li></ul>"#);
/// ```
#[derive(Clone)]
pub struct Node(Rc<NodeData>);

impl Node {
    fn with_kind(kind: NodeKind, text: String) -> Self {
        Node(Rc::new(NodeData {
            kind,
            attributes: RefCell::new(IndexMap::new()),
            text: RefCell::new(text),
            value: RefCell::new(String::new()),
            children: RefCell::new(Vec::new()),
            parent: RefCell::new(Weak::new()),
            listeners: RefCell::new(Vec::new()),
        }))
    }

    pub fn element(tag: &str) -> Self {
        Self::with_kind(NodeKind::Element(tag.to_owned()), String::new())
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::with_kind(NodeKind::Text, text.into())
    }

    pub fn raw(markup: impl Into<String>) -> Self {
        Self::with_kind(NodeKind::Raw, markup.into())
    }

    pub fn anchor() -> Self {
        Self::with_kind(NodeKind::Anchor, String::new())
    }

    /// Builder: set an attribute.
    pub fn with_attr(self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder: append a child.
    pub fn with_child(self, child: Node) -> Self {
        self.append_child(&child);
        self
    }

    pub fn kind(&self) -> &NodeKind {
        &self.0.kind
    }

    pub fn tag(&self) -> Option<&str> {
        match &self.0.kind {
            NodeKind::Element(tag) => Some(tag),
            _ => None,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self.0.kind, NodeKind::Element(_))
    }

    pub fn is_text(&self) -> bool {
        self.0.kind == NodeKind::Text
    }

    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    // =========================================================================
    // ATTRIBUTES AND PROPERTIES
    // =========================================================================

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.0.attributes.borrow().get(name).cloned()
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.0.attributes.borrow().contains_key(name)
    }

    /// Attributes in declaration order.
    pub fn attributes(&self) -> Vec<(String, String)> {
        self.0
            .attributes
            .borrow()
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        self.0
            .attributes
            .borrow_mut()
            .insert(name.to_owned(), value.to_owned());
    }

    pub fn remove_attribute(&self, name: &str) {
        self.0.attributes.borrow_mut().shift_remove(name);
    }

    pub fn value(&self) -> String {
        self.0.value.borrow().clone()
    }

    pub fn set_value(&self, value: &str) {
        *self.0.value.borrow_mut() = value.to_owned();
    }

    /// Own text of a text or raw leaf.
    pub fn text_content(&self) -> String {
        match self.0.kind {
            NodeKind::Element(_) => self
                .children()
                .iter()
                .map(Node::text_content)
                .collect(),
            _ => self.0.text.borrow().clone(),
        }
    }

    /// Set the text of a leaf, or replace an element's children with one
    /// text leaf.
    pub fn set_text_content(&self, text: &str) {
        match self.0.kind {
            NodeKind::Element(_) => self.replace_children(vec![Node::text(text)]),
            _ => *self.0.text.borrow_mut() = text.to_owned(),
        }
    }

    /// Set the markup of a raw leaf, or replace an element's children with
    /// one raw leaf.
    pub fn set_inner_html(&self, markup: &str) {
        match self.0.kind {
            NodeKind::Element(_) => self.replace_children(vec![Node::raw(markup)]),
            _ => *self.0.text.borrow_mut() = markup.to_owned(),
        }
    }

    // =========================================================================
    // TREE
    // =========================================================================

    pub fn children(&self) -> Vec<Node> {
        self.0.children.borrow().clone()
    }

    pub fn parent(&self) -> Option<Node> {
        self.0.parent.borrow().upgrade().map(Node)
    }

    fn detach(&self) {
        if let Some(parent) = self.parent() {
            parent
                .0
                .children
                .borrow_mut()
                .retain(|child| !child.ptr_eq(self));
        }
        *self.0.parent.borrow_mut() = Weak::new();
    }

    fn adopt(&self, child: &Node) {
        child.detach();
        *child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
    }

    pub fn append_child(&self, child: &Node) {
        self.adopt(child);
        self.0.children.borrow_mut().push(child.clone());
    }

    /// Insert `child` before `reference`, or append when `reference` is
    /// not a child of this node.
    pub fn insert_before(&self, child: &Node, reference: &Node) {
        self.adopt(child);
        let mut children = self.0.children.borrow_mut();
        match children.iter().position(|c| c.ptr_eq(reference)) {
            Some(index) => children.insert(index, child.clone()),
            None => children.push(child.clone()),
        }
    }

    pub fn remove_child(&self, child: &Node) {
        if child.parent().is_some_and(|parent| parent.ptr_eq(self)) {
            child.detach();
        }
    }

    fn replace_children(&self, nodes: Vec<Node>) {
        for child in self.children() {
            child.detach();
        }
        for node in &nodes {
            self.append_child(node);
        }
    }

    /// Replace this node in its parent with `nodes`, in order.
    pub fn replace_with(&self, nodes: &[Node]) {
        let Some(parent) = self.parent() else {
            return;
        };
        for node in nodes {
            parent.insert_before(node, self);
        }
        self.detach();
    }

    /// Remove every sibling strictly between `start` and `end`.
    pub fn remove_between(start: &Node, end: &Node) {
        let Some(parent) = start.parent() else {
            return;
        };
        let children = parent.children();
        let from = children.iter().position(|c| c.ptr_eq(start));
        let to = children.iter().position(|c| c.ptr_eq(end));
        if let (Some(from), Some(to)) = (from, to) {
            for child in children.iter().take(to).skip(from + 1) {
                child.detach();
            }
        }
    }

    /// Copy this subtree: kind, attributes, value and text. Listeners are
    /// not copied.
    pub fn deep_clone(&self) -> Node {
        let copy = Node::with_kind(self.0.kind.clone(), self.0.text.borrow().clone());
        *copy.0.attributes.borrow_mut() = self.0.attributes.borrow().clone();
        *copy.0.value.borrow_mut() = self.0.value.borrow().clone();
        for child in self.children() {
            copy.append_child(&child.deep_clone());
        }
        copy
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    pub fn add_event_listener(
        &self,
        kind: &str,
        listener: impl FnMut(&Event) -> Result<()> + 'static,
    ) {
        self.0.listeners.borrow_mut().push((
            kind.to_owned(),
            Rc::new(RefCell::new(Box::new(listener) as Listener)),
        ));
    }

    pub fn listener_count(&self, kind: &str) -> usize {
        self.0
            .listeners
            .borrow()
            .iter()
            .filter(|(k, _)| k == kind)
            .count()
    }

    /// Run the listeners registered for `kind`, in registration order.
    ///
    /// A listener already running (re-entrant dispatch) is skipped. Stops at
    /// the first failing listener.
    pub fn dispatch(&self, kind: &str) -> Result<()> {
        let listeners: Vec<Rc<RefCell<Listener>>> = self
            .0
            .listeners
            .borrow()
            .iter()
            .filter(|(k, _)| k == kind)
            .map(|(_, listener)| listener.clone())
            .collect();

        let event = Event {
            kind: kind.to_owned(),
            target: self.clone(),
        };
        for listener in listeners {
            if let Ok(mut listener) = listener.try_borrow_mut() {
                listener(&event)?;
            }
        }
        Ok(())
    }

    // =========================================================================
    // SERIALIZATION
    // =========================================================================

    /// Serialize the subtree. Anchors render as nothing, raw leaves
    /// verbatim, text escaped.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    /// Serialize the children only.
    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for child in self.children() {
            child.write_html(&mut out);
        }
        out
    }

    fn write_html(&self, out: &mut String) {
        match &self.0.kind {
            NodeKind::Element(tag) => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in self.0.attributes.borrow().iter() {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape_into(value, true, out);
                    out.push('"');
                }
                out.push('>');
                for child in self.children() {
                    child.write_html(out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
            NodeKind::Text => escape_into(&self.0.text.borrow(), false, out),
            NodeKind::Raw => out.push_str(&self.0.text.borrow()),
            NodeKind::Anchor => {}
        }
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.kind {
            NodeKind::Anchor => f.write_str("Anchor"),
            _ => write!(f, "Node({})", self.to_html()),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
