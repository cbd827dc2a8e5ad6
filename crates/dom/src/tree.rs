//! The node tree.
//!
//! [`Dom`] owns all nodes in one `Vec` and keeps their parent and sibling
//! links in step as nodes are inserted, moved and removed. Index 0 is the
//! document node. A node is *connected* when the document is one of its
//! inclusive ancestors; only connected elements are found by the lookups.

use crate::error::DomError;
use crate::node::{Attr, ElementData, Node, NodeData, NodeId};

/// Every node of one document, addressed by index.
#[derive(Debug)]
pub struct Dom {
    nodes: Vec<Node>,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    /// Create a tree holding only the document node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeData::Document)],
        }
    }

    /// The document node.
    pub fn document(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    fn require(&self, id: NodeId) -> Result<&Node, DomError> {
        self.node(id).ok_or(DomError::UnknownNode(id))
    }

    /// Element data for `id`, or `None` for non-elements and unknown ids.
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.node(id).and_then(Node::as_element)
    }

    // ─── Building ────────────────────────────────────────────────────────

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(data));
        id
    }

    /// A new element outside the document. `id` and `class` are cached from
    /// `attrs`.
    pub fn create_element(&mut self, tag_name: &str, attrs: Vec<Attr>) -> NodeId {
        self.push(NodeData::Element(ElementData::new(tag_name, attrs)))
    }

    pub fn create_html_element(&mut self, tag_name: &str) -> NodeId {
        self.create_element(tag_name, Vec::new())
    }

    pub fn create_text(&mut self, data: &str) -> NodeId {
        self.push(NodeData::Text {
            data: data.to_owned(),
        })
    }

    /// Create an element as the last child of `parent`. A new node can be
    /// neither an ancestor of `parent` nor the document, so this cannot
    /// fail; for an unknown `parent` the element is left detached.
    pub fn append_new_element(&mut self, parent: NodeId, tag_name: &str) -> NodeId {
        let child = self.create_html_element(tag_name);
        if let Some(last) = self.node(parent).map(|p| p.last_child) {
            self.link(parent, child, last, None);
        }
        child
    }

    // ─── Mutation ────────────────────────────────────────────────────────

    /// Make `child` the last child of `parent`. A child that already has a
    /// parent is moved.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check_insertion(parent, child)?;
        self.unlink(child);
        let before = self.require(parent)?.last_child;
        self.link(parent, child, before, None);
        Ok(())
    }

    /// Place `child` right before `reference` under `parent`, or at the end
    /// when `reference` is `None`.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), DomError> {
        let Some(reference) = reference else {
            return self.append_child(parent, child);
        };
        if child == reference {
            return Ok(());
        }
        self.check_insertion(parent, child)?;
        if self.require(reference)?.parent != Some(parent) {
            return Err(DomError::NotAChild { parent, reference });
        }
        self.unlink(child);
        let before = self.require(reference)?.prev_sibling;
        self.link(parent, child, before, Some(reference));
        Ok(())
    }

    /// Take `child` out of `parent`. Its own subtree stays attached to it.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        if self.require(child)?.parent != Some(parent) {
            return Err(DomError::NotAChild {
                parent,
                reference: child,
            });
        }
        self.unlink(child);
        Ok(())
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        self.element_mut(id)?.set_attr(name, value);
        Ok(())
    }

    /// Removing an attribute that is not there is fine.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<(), DomError> {
        self.element_mut(id)?.remove_attr(name);
        Ok(())
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData, DomError> {
        self.node_mut(id)
            .ok_or(DomError::UnknownNode(id))?
            .as_element_mut()
            .ok_or(DomError::NotAnElement(id))
    }

    fn check_insertion(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.require(parent)?;
        let is_document = matches!(self.require(child)?.data, NodeData::Document);
        let would_cycle = parent == child || self.ancestors(parent).contains(&child);
        if is_document || would_cycle {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        Ok(())
    }

    /// Splice a parentless `child` between the siblings `before` and `after`.
    fn link(&mut self, parent: NodeId, child: NodeId, before: Option<NodeId>, after: Option<NodeId>) {
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
            node.prev_sibling = before;
            node.next_sibling = after;
        }
        match before.and_then(|id| self.node_mut(id)) {
            Some(node) => node.next_sibling = Some(child),
            None => {
                if let Some(node) = self.node_mut(parent) {
                    node.first_child = Some(child);
                }
            }
        }
        match after.and_then(|id| self.node_mut(id)) {
            Some(node) => node.prev_sibling = Some(child),
            None => {
                if let Some(node) = self.node_mut(parent) {
                    node.last_child = Some(child);
                }
            }
        }
    }

    /// Cut `id` out of its sibling chain. No-op for parentless nodes.
    fn unlink(&mut self, id: NodeId) {
        let Some(&Node {
            parent: Some(parent),
            prev_sibling: before,
            next_sibling: after,
            ..
        }) = self.node(id)
        else {
            return;
        };
        match before.and_then(|b| self.node_mut(b)) {
            Some(node) => node.next_sibling = after,
            None => {
                if let Some(node) = self.node_mut(parent) {
                    node.first_child = after;
                }
            }
        }
        match after.and_then(|a| self.node_mut(a)) {
            Some(node) => node.prev_sibling = before,
            None => {
                if let Some(node) = self.node_mut(parent) {
                    node.last_child = before;
                }
            }
        }
        if let Some(node) = self.node_mut(id) {
            node.parent = None;
            node.prev_sibling = None;
            node.next_sibling = None;
        }
    }

    // ─── Traversal ───────────────────────────────────────────────────────

    /// Immediate children of `parent` in document order.
    pub fn children(&self, parent: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = self.node(parent).and_then(|n| n.first_child);
        while let Some(id) = cursor {
            out.push(id);
            cursor = self.node(id).and_then(|n| n.next_sibling);
        }
        out
    }

    /// Ancestors from the direct parent up to (and including) the root.
    pub fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = self.node(node).and_then(|n| n.parent);
        while let Some(id) = cursor {
            out.push(id);
            cursor = self.node(id).and_then(|n| n.parent);
        }
        out
    }

    /// All descendants of `node` in pre-order (not including `node` itself).
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).into_iter().rev().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).into_iter().rev());
        }
        out
    }

    /// Whether `node` is the document or has the document as an ancestor.
    pub fn is_connected(&self, node: NodeId) -> bool {
        node == self.document() || self.ancestors(node).last() == Some(&self.document())
    }

    /// `node` and its element descendants, in document order.
    pub fn inclusive_element_descendants(&self, node: NodeId) -> Vec<NodeId> {
        std::iter::once(node)
            .chain(self.descendants(node))
            .filter(|&id| self.element(id).is_some())
            .collect()
    }

    /// Every connected element, in document order.
    pub fn connected_elements(&self) -> Vec<NodeId> {
        self.inclusive_element_descendants(self.document())
    }

    // ─── Lookups (connected elements only) ───────────────────────────────

    /// First connected element whose `id` attribute equals `id`.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        if id.is_empty() {
            return None;
        }
        self.connected_elements()
            .into_iter()
            .find(|&n| self.element(n).and_then(|e| e.id.as_deref()) == Some(id))
    }

    /// Connected elements with the given tag name (ASCII case-insensitive).
    /// `*` matches every element.
    pub fn get_elements_by_tag_name(&self, tag: &str) -> Vec<NodeId> {
        let tag = tag.to_ascii_lowercase();
        self.connected_elements()
            .into_iter()
            .filter(|&n| {
                self.element(n)
                    .is_some_and(|e| tag == "*" || e.tag_name == tag)
            })
            .collect()
    }

    /// Connected elements carrying every class in the whitespace-separated
    /// `classes` list. An empty list matches nothing.
    pub fn get_elements_by_class_name(&self, classes: &str) -> Vec<NodeId> {
        let wanted: Vec<&str> = classes.split_whitespace().collect();
        if wanted.is_empty() {
            return Vec::new();
        }
        self.connected_elements()
            .into_iter()
            .filter(|&n| {
                self.element(n)
                    .is_some_and(|e| wanted.iter().all(|c| e.has_class(c)))
            })
            .collect()
    }
}
