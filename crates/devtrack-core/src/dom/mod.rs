//! Rendering primitive.
//!
//! [`Document`] is the slice of the browser DOM the device tables need:
//! element creation, attributes, text, tree edits and lookup by id. Calls
//! are synchronous and cannot fail.

mod memory;

use url::Url;

pub use self::memory::{MemoryDocument, NodeId};

/// A mutable element tree with a body and a page location.
pub trait Document {
    /// Handle to an element.
    type Node: Copy + Eq + std::fmt::Debug;

    /// URL of the page the document is shown at.
    fn location(&self) -> &Url;

    /// The `<body>` element.
    fn body(&self) -> Self::Node;

    /// Create a detached element.
    fn create_element(&mut self, tag: &str) -> Self::Node;

    /// Set (or overwrite) an attribute.
    fn set_attribute(&mut self, node: Self::Node, name: &str, value: &str);

    /// Attribute value, if set.
    fn attribute(&self, node: Self::Node, name: &str) -> Option<String>;

    /// Replace all content of `node` with a text run.
    fn set_text(&mut self, node: Self::Node, text: &str);

    /// Append `child` as the last child of `parent`.
    fn append_child(&mut self, parent: Self::Node, child: Self::Node);

    /// Detach `child` from `parent`. No-op if it is not a child.
    fn remove_child(&mut self, parent: Self::Node, child: Self::Node);

    /// Element children in order.
    fn children(&self, node: Self::Node) -> Vec<Self::Node>;

    /// Parent element, if attached.
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// Lowercase tag name.
    fn tag_name(&self, node: Self::Node) -> String;

    /// First attached element with this `id`.
    fn element_by_id(&self, id: &str) -> Option<Self::Node>;

    /// Set the page title.
    fn set_title(&mut self, title: &str);

    /// Add a class to `<body>` unless already present.
    fn add_body_class(&mut self, class: &str);

    /// Set the `id` attribute.
    fn set_id(&mut self, node: Self::Node, id: &str) {
        self.set_attribute(node, "id", id);
    }

    /// Set the `class` attribute.
    fn set_class(&mut self, node: Self::Node, class: &str) {
        self.set_attribute(node, "class", class);
    }

    /// First child element with tag `tag`.
    fn first_child_by_tag(&self, node: Self::Node, tag: &str) -> Option<Self::Node> {
        self.children(node).into_iter().find(|child| self.tag_name(*child) == tag)
    }

    /// Remove every child of `node`.
    fn clear_children(&mut self, node: Self::Node) {
        for child in self.children(node) {
            self.remove_child(node, child);
        }
    }
}
