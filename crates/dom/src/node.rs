//! Nodes, elements and attributes.
//!
//! Nodes are stored in a flat `Vec<Node>` owned by [`crate::Dom`] and referenced
//! by [`NodeId`]. Nodes are never freed: removing a node only detaches it, so a
//! `NodeId` stays valid for the lifetime of the tree and can be re-inserted.

use std::fmt;

/// A handle that uniquely identifies a DOM node within one [`crate::Dom`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ─── Attributes ──────────────────────────────────────────────────────────────

/// `name="value"` on an element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attr {
    pub name: String,
    pub value: String,
}

impl Attr {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

// ─── Elements ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementData {
    /// Lower-cased tag name.
    pub tag_name: String,
    pub attrs: Vec<Attr>,
    /// Copy of the `id` attribute.
    pub id: Option<String>,
    /// The `class` attribute, split on whitespace.
    pub classes: Vec<String>,
}

impl ElementData {
    pub fn new(tag_name: &str, attrs: Vec<Attr>) -> Self {
        let mut data = Self {
            tag_name: tag_name.to_ascii_lowercase(),
            attrs,
            id: None,
            classes: Vec::new(),
        };
        data.refresh_caches();
        data
    }

    /// Look up an attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Set (or replace) an attribute, keeping the id/class caches in sync.
    pub fn set_attr(&mut self, name: &str, value: &str) {
        match self.attrs.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value.to_string(),
            None => self.attrs.push(Attr::new(name, value)),
        }
        self.refresh_caches();
    }

    /// Remove an attribute; returns whether it was present.
    pub fn remove_attr(&mut self, name: &str) -> bool {
        let before = self.attrs.len();
        self.attrs.retain(|a| a.name != name);
        self.refresh_caches();
        self.attrs.len() != before
    }

    fn refresh_caches(&mut self) {
        self.id = self.attr("id").map(String::from);
        self.classes = self
            .attr("class")
            .map(|v| v.split_whitespace().map(String::from).collect())
            .unwrap_or_default();
    }
}

// ─── Nodes ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeData {
    Document,
    Element(ElementData),
    Text { data: String },
}

/// Payload plus links into the tree. Children form a doubly linked list
/// through the sibling fields.
#[derive(Clone, Debug)]
pub struct Node {
    pub data: NodeData,
    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub last_child: Option<NodeId>,
    pub prev_sibling: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
}

impl Node {
    pub fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
        }
    }

    pub fn as_element(&self) -> Option<&ElementData> {
        if let NodeData::Element(element) = &self.data {
            Some(element)
        } else {
            None
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        if let NodeData::Element(element) = &mut self.data {
            Some(element)
        } else {
            None
        }
    }
}
