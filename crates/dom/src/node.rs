//! Tree vertices
//!
//! [`Node`] is the storage record kept in the arena: identity, kind, the
//! parent back-link, the child list and the name index over that list.
//! Sibling links are not stored here, they live in the arena's link table.
//!
//! [`NodeRef`] is a borrowed view that answers the read-only half of the
//! node API (`first_child`, `has_as_child`, ...) as methods on the node.

use crate::document::Document;
use crate::siblings::SiblingList;
use crate::types::{NodeId, NodeType};
use ahash::AHashMap;
use std::fmt;

#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    node_type: NodeType,
    name: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: SiblingList,
    /// Child name → child id. Key set always equals the names in `children`.
    pub(crate) child_index: AHashMap<String, NodeId>,
}

impl Node {
    pub(crate) fn new(id: NodeId, node_type: NodeType, name: String) -> Self {
        Self {
            id,
            node_type,
            name,
            parent: None,
            children: SiblingList::new(),
            child_index: AHashMap::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &SiblingList {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn child_count(&self) -> usize {
        self.child_index.len()
    }

    pub fn is_attached(&self) -> bool {
        self.parent.is_some()
    }

    /// Id of the child registered under `name`, if any.
    pub fn child_named(&self, name: &str) -> Option<NodeId> {
        self.child_index.get(name).copied()
    }

    /// Names registered in the child index, in no particular order.
    pub fn child_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.child_index.keys().map(String::as_str)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node(node_type={}, name={})", self.node_type, self.name)
    }
}

/// A child looked up either by name or by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildKey<'a> {
    Name(&'a str),
    Node(NodeId),
}

impl<'a> From<&'a str> for ChildKey<'a> {
    fn from(name: &'a str) -> Self {
        ChildKey::Name(name)
    }
}

impl<'a> From<&'a String> for ChildKey<'a> {
    fn from(name: &'a String) -> Self {
        ChildKey::Name(name)
    }
}

impl From<NodeId> for ChildKey<'_> {
    fn from(id: NodeId) -> Self {
        ChildKey::Node(id)
    }
}

impl<'a> From<&'a Node> for ChildKey<'a> {
    fn from(node: &'a Node) -> Self {
        ChildKey::Node(node.id())
    }
}

impl<'a> From<NodeRef<'a>> for ChildKey<'a> {
    fn from(node: NodeRef<'a>) -> Self {
        ChildKey::Node(node.id())
    }
}

/// Read-only view of one node inside its document.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    doc: &'a Document,
    node: &'a Node,
}

impl<'a> NodeRef<'a> {
    pub(crate) fn new(doc: &'a Document, node: &'a Node) -> Self {
        Self { doc, node }
    }

    fn view(&self, id: Option<NodeId>) -> Option<NodeRef<'a>> {
        id.and_then(|id| self.doc.node(id).ok())
    }

    pub fn id(&self) -> NodeId {
        self.node.id()
    }

    pub fn name(&self) -> &'a str {
        self.node.name()
    }

    pub fn node_type(&self) -> NodeType {
        self.node.node_type()
    }

    pub fn node(&self) -> &'a Node {
        self.node
    }

    pub fn document(&self) -> &'a Document {
        self.doc
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.view(self.node.parent())
    }

    pub fn has_children(&self) -> bool {
        self.node.has_children()
    }

    pub fn child_count(&self) -> usize {
        self.node.child_count()
    }

    /// First child in sibling order, `None` when there are no children.
    pub fn first_child(&self) -> Option<NodeRef<'a>> {
        self.view(self.node.children().head())
    }

    pub fn last_child(&self) -> Option<NodeRef<'a>> {
        self.view(self.node.children().tail())
    }

    pub fn previous_sibling(&self) -> Option<NodeRef<'a>> {
        self.view(self.doc.previous_sibling(self.id()))
    }

    pub fn next_sibling(&self) -> Option<NodeRef<'a>> {
        self.view(self.doc.next_sibling(self.id()))
    }

    pub fn has_as_child<'k>(&self, key: impl Into<ChildKey<'k>>) -> bool {
        self.doc.has_as_child(self.id(), key)
    }

    pub fn fetch_child_by_name(&self, name: &str) -> Option<NodeRef<'a>> {
        self.view(self.node.child_named(name))
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let doc = self.doc;
        doc.children(self.id())
            .filter_map(move |id| doc.node(id).ok())
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.id() == other.id()
    }
}

impl Eq for NodeRef<'_> {}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id())
            .field("node_type", &self.node_type())
            .field("name", &self.name())
            .finish()
    }
}

impl fmt::Display for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.node, f)
    }
}
