//! Document tree for annotation reinsertion
//!
//! A platform-agnostic tree the engine walks and rebuilds. Adapters to a real
//! rendering surface live outside this workspace; the engine only needs the
//! two structural cases below:
//! 1. `Element`: named node with attributes, classes and ordered children
//! 2. `Text`: a leaf holding a run of codepoints

use serde::{Deserialize, Serialize};

/// A node in the document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Node {
    pub fn text(content: impl Into<String>) -> Self {
        Node::Text(content.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(content) => Some(content),
            Node::Element(_) => None,
        }
    }

    /// Flattened text of this subtree.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// Codepoint count of the flattened text. All annotation offsets are
    /// expressed in these units.
    pub fn text_len(&self) -> usize {
        match self {
            Node::Text(content) => content.chars().count(),
            Node::Element(element) => element.children.iter().map(Node::text_len).sum(),
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

/// An element with a tag name, attributes, classes and ordered children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,

    /// Identity for back-references from segments and for downstream event
    /// wiring. Assigned by the engine on wrapper elements; caller-built
    /// content may carry its own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<(String, String)>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub class_list: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            id: None,
            attributes: Vec::new(),
            class_list: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class_list.push(class.into());
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children.extend(children);
        self
    }

    /// Copy of this element without its children. Reinsertion clones
    /// structure this way and rebuilds the children itself.
    pub fn shallow_clone(&self) -> Element {
        Element {
            tag: self.tag.clone(),
            id: self.id.clone(),
            attributes: self.attributes.clone(),
            class_list: self.class_list.clone(),
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.class_list.iter().any(|entry| entry == class)
    }
}

impl From<String> for Node {
    fn from(content: String) -> Self {
        Node::Text(content)
    }
}

impl From<&str> for Node {
    fn from(content: &str) -> Self {
        Node::Text(content.to_string())
    }
}

/// A detached ordered sequence of nodes.
///
/// Both the input and the output of reinsertion have this shape, so callers
/// can splice the result directly into a live structure without peeling off
/// a synthetic wrapper root.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub nodes: Vec<Node>,
}

impl Fragment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn push(&mut self, node: impl Into<Node>) {
        self.nodes.push(node.into());
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Flattened text of the whole fragment.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            collect_text(node, &mut out);
        }
        out
    }

    /// Codepoint count of the flattened text.
    pub fn text_len(&self) -> usize {
        self.nodes.iter().map(Node::text_len).sum()
    }

    /// Depth-first lookup of an element by id. This is how downstream wiring
    /// turns a segment's element back-references into concrete nodes.
    pub fn find_element(&self, id: &str) -> Option<&Element> {
        find_in_nodes(&self.nodes, id)
    }

    /// Render the fragment as an HTML string. Text and attribute values are
    /// escaped, tag and attribute names are reduced to the HTML name
    /// alphabet; nothing is ever re-parsed on the way out.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            write_node(node, &mut out);
        }
        out
    }
}

impl From<Vec<Node>> for Fragment {
    fn from(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }
}

fn collect_text(node: &Node, out: &mut String) {
    match node {
        Node::Text(content) => out.push_str(content),
        Node::Element(element) => {
            for child in &element.children {
                collect_text(child, out);
            }
        }
    }
}

fn find_in_nodes<'a>(nodes: &'a [Node], id: &str) -> Option<&'a Element> {
    for node in nodes {
        if let Node::Element(element) = node {
            if element.id.as_deref() == Some(id) {
                return Some(element);
            }
            if let Some(found) = find_in_nodes(&element.children, id) {
                return Some(found);
            }
        }
    }
    None
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Text(content) => out.push_str(&html_escape::encode_text(content)),
        Node::Element(element) => write_element(element, out),
    }
}

fn write_element(element: &Element, out: &mut String) {
    let tag = sanitized_name(&element.tag);
    out.push('<');
    out.push_str(&tag);
    if let Some(id) = &element.id {
        out.push_str(" id=\"");
        out.push_str(&html_escape::encode_double_quoted_attribute(id));
        out.push('"');
    }
    if !element.class_list.is_empty() {
        out.push_str(" class=\"");
        out.push_str(&html_escape::encode_double_quoted_attribute(
            &element.class_list.join(" "),
        ));
        out.push('"');
    }
    for (name, value) in &element.attributes {
        out.push(' ');
        out.push_str(&sanitized_name(name));
        out.push_str("=\"");
        out.push_str(&html_escape::encode_double_quoted_attribute(value));
        out.push('"');
    }
    out.push('>');

    if is_void_element(&tag) && element.children.is_empty() {
        return;
    }

    for child in &element.children {
        write_node(child, out);
    }
    out.push_str("</");
    out.push_str(&tag);
    out.push('>');
}

/// HTML has no escape sequence for name positions; codepoints outside
/// `[A-Za-z0-9_:-]` are dropped rather than encoded.
fn sanitized_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':'))
        .collect()
}

/// HTML elements that never take a closing tag.
fn is_void_element(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "source"
            | "track"
            | "wbr"
    )
}
