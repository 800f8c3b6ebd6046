//! Tolerant access to values in a parsed bulletin tree
//!
//! The bulletin format mixes bare scalars, elements carrying attributes, and
//! repeated elements for what is logically the same field. This module holds
//! the generic tree produced by the parser plus the few helpers that remove
//! that ambiguity, so the normalizer never inspects node shapes directly.

use std::collections::BTreeMap;

/// A node in a parsed bulletin document
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// An element with no attributes and no children, reduced to its text
    Text(String),
    /// An element carrying attributes and/or child elements
    Element(Element),
    /// Several sibling elements sharing the same name, in document order
    List(Vec<Node>),
}

/// An element with attributes, named children, and optional text content
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    /// Attribute values keyed by attribute name
    pub attributes: BTreeMap<String, String>,
    /// Child nodes keyed by element name
    pub children: BTreeMap<String, Node>,
    /// Text content of the element itself, if any
    pub text: Option<String>,
}

impl Element {
    /// Returns the child node with the given element name
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.get(name)
    }

    /// Returns the value of the given attribute
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Adds a child, turning repeated names into a `Node::List`
    pub fn push_child(&mut self, name: String, node: Node) {
        match self.children.remove(&name) {
            None => {
                self.children.insert(name, node);
            }
            Some(Node::List(mut items)) => {
                items.push(node);
                self.children.insert(name, Node::List(items));
            }
            Some(existing) => {
                self.children.insert(name, Node::List(vec![existing, node]));
            }
        }
    }
}

impl Node {
    /// Returns the element behind this node, if it is one
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Looks up a child element by name; scalars and lists have no children
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.as_element().and_then(|element| element.child(name))
    }

    /// Looks up an attribute; scalars and lists have no attributes
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.as_element().and_then(|element| element.attribute(name))
    }

    /// Follows a path of child names, e.g. `["wind", "speed"]`
    pub fn path(&self, names: &[&str]) -> Option<&Node> {
        names
            .iter()
            .try_fold(self, |node, name| node.child(name))
    }
}

/// Extracts the plain text of a node
///
/// Scalars are returned as-is, elements yield their text slot, and absent
/// nodes or lists yield an empty string.
pub fn extract_text(node: Option<&Node>) -> String {
    match node {
        Some(Node::Text(text)) => text.clone(),
        Some(Node::Element(element)) => element.text.clone().unwrap_or_default(),
        Some(Node::List(_)) | None => String::new(),
    }
}

/// Coerces a field that may be a single node or a list into a slice-like sequence
pub fn as_sequence(node: Option<&Node>) -> Vec<&Node> {
    match node {
        None => Vec::new(),
        Some(Node::List(items)) => items.iter().collect(),
        Some(single) => vec![single],
    }
}

/// Parses a numeric reading, returning `None` for empty or non-numeric text
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}
