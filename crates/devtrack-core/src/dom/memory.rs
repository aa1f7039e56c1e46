//! In-memory document.
//!
//! Arena-backed element tree. Removed subtrees go back to a free list and
//! their slots are reused by later `create_element` calls, so a handle must
//! not be used after its element was removed.

use url::Url;

use super::Document;

/// Handle to an element of a [`MemoryDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Default)]
struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self { tag: tag.to_ascii_lowercase(), ..Self::default() }
    }
}

/// [`Document`] held entirely in memory, serializable to HTML.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    location: Url,
    title: String,
    nodes: Vec<Element>,
    free: Vec<usize>,
    body: NodeId,
}

impl MemoryDocument {
    /// Empty document with only a `<body>`.
    pub fn new(location: Url) -> Self {
        Self {
            location,
            title: String::new(),
            nodes: vec![Element::new("body")],
            free: Vec::new(),
            body: NodeId(0),
        }
    }

    /// Page title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Concatenated text of `node` and its descendants.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    /// Number of allocated, not yet recycled elements (attached or not).
    pub fn live_nodes(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Serialize `node` and its subtree.
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_node(node, &mut out);
        out
    }

    /// Serialize the whole page.
    pub fn to_html(&self) -> String {
        let mut out = String::from("<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>");
        out.push_str(&escape(&self.title, false));
        out.push_str("</title></head>");
        self.write_node(self.body, &mut out);
        out.push_str("</html>\n");
        out
    }

    fn element(&self, node: NodeId) -> &Element {
        &self.nodes[node.0]
    }

    fn element_mut(&mut self, node: NodeId) -> &mut Element {
        &mut self.nodes[node.0]
    }

    fn is_ancestor(&self, candidate: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            current = self.element(id).parent;
        }
        false
    }

    fn detach(&mut self, child: NodeId) {
        if let Some(parent) = self.element_mut(child).parent.take() {
            self.element_mut(parent).children.retain(|c| *c != child);
        }
    }

    fn release(&mut self, node: NodeId) {
        let children = std::mem::take(&mut self.element_mut(node).children);
        for child in children {
            self.release(child);
        }
        *self.element_mut(node) = Element::default();
        self.free.push(node.0);
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let element = self.element(node);
        out.push_str(&element.text);
        for child in &element.children {
            self.collect_text(*child, out);
        }
    }

    fn write_node(&self, node: NodeId, out: &mut String) {
        let element = self.element(node);
        out.push('<');
        out.push_str(&element.tag);
        for (name, value) in &element.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape(value, true));
            out.push('"');
        }
        out.push('>');
        out.push_str(&escape(&element.text, false));
        for child in &element.children {
            self.write_node(*child, out);
        }
        out.push_str("</");
        out.push_str(&element.tag);
        out.push('>');
    }
}

impl Document for MemoryDocument {
    type Node = NodeId;

    fn location(&self) -> &Url {
        &self.location
    }

    fn body(&self) -> NodeId {
        self.body
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = Element::new(tag);
                NodeId(slot)
            },
            None => {
                self.nodes.push(Element::new(tag));
                NodeId(self.nodes.len() - 1)
            },
        }
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let attributes = &mut self.element_mut(node).attributes;
        match attributes.iter_mut().find(|(existing, _)| existing == name) {
            Some((_, slot)) => value.clone_into(slot),
            None => attributes.push((name.to_owned(), value.to_owned())),
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node)
            .attributes
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.clone())
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        let children = std::mem::take(&mut self.element_mut(node).children);
        for child in children {
            self.element_mut(child).parent = None;
            self.release(child);
        }
        text.clone_into(&mut self.element_mut(node).text);
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        // An element cannot contain one of its ancestors
        if self.is_ancestor(child, parent) {
            return;
        }
        self.detach(child);
        self.element_mut(child).parent = Some(parent);
        self.element_mut(parent).children.push(child);
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        if self.element(child).parent != Some(parent) {
            return;
        }
        self.detach(child);
        self.release(child);
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.element(node).children.clone()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.element(node).parent
    }

    fn tag_name(&self, node: NodeId) -> String {
        self.element(node).tag.clone()
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let mut stack = vec![self.body];
        while let Some(node) = stack.pop() {
            let element = self.element(node);
            if element.attributes.iter().any(|(name, value)| name == "id" && value == id) {
                return Some(node);
            }
            stack.extend(element.children.iter().rev());
        }
        None
    }

    fn set_title(&mut self, title: &str) {
        title.clone_into(&mut self.title);
    }

    fn add_body_class(&mut self, class: &str) {
        let body = self.body;
        let current = self.attribute(body, "class").unwrap_or_default();
        if current.split_whitespace().any(|existing| existing == class) {
            return;
        }
        let updated =
            if current.is_empty() { class.to_owned() } else { format!("{current} {class}") };
        self.set_attribute(body, "class", &updated);
    }
}

fn escape(raw: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
