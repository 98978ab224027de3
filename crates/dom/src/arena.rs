//! Arena-based node storage
//!
//! "Bad programmers worry about the code. Good programmers worry about
//! data structures and their relationships."
//!
//! Every node of a document lives in one `Vec<Node>`; sibling links live in
//! a parallel [`LinkTable`]. Parents, siblings and index entries refer to
//! each other by `NodeId`, so no node ever owns another and removing a node
//! from the tree never frees it.
//!
//! ```text
//! nodes: [Node0][Node1][Node2]...
//! links: [L0   ][L1   ][L2   ]...
//!         ↑ 4-byte index, not 8-byte pointer
//! ```

use crate::error::{DomError, Result};
use crate::node::Node;
use crate::siblings::{LinkTable, Links, Siblings};
use crate::types::{NodeId, NodeType};
use ahash::AHashMap;
use std::collections::VecDeque;

/// Upper bound on node slots reserved up front; larger requests are clamped.
pub const MAX_RESERVED_NODES: usize = 1 << 20;

/// Arena allocator for tree nodes
#[derive(Debug, Default)]
pub struct DomArena {
    nodes: Vec<Node>,

    /// `prev`/`next` of every node, same indexing as `nodes`
    links: LinkTable,

    /// Document-wide name → NodeId lookup
    name_map: AHashMap<String, NodeId>,
}

impl DomArena {
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.min(MAX_RESERVED_NODES);
        Self {
            nodes: Vec::with_capacity(capacity),
            links: LinkTable::with_capacity(capacity),
            name_map: AHashMap::with_capacity(capacity),
        }
    }

    /// Arena holding a single node, which gets id 0
    pub fn with_root(capacity: usize, node_type: NodeType, name: String) -> (Self, NodeId) {
        let mut arena = Self::with_capacity(capacity);
        arena.push(0, node_type, name);
        (arena, 0)
    }

    /// Id the next allocated node will get
    pub fn next_id(&self) -> Result<NodeId> {
        NodeId::try_from(self.nodes.len()).map_err(|_| DomError::IdSpaceExhausted(self.nodes.len()))
    }

    /// Allocate a standalone node, returns its ID
    pub fn add_node(&mut self, node_type: NodeType, name: String) -> Result<NodeId> {
        let node_id = self.next_id()?;
        self.push(node_id, node_type, name);
        Ok(node_id)
    }

    fn push(&mut self, node_id: NodeId, node_type: NodeType, name: String) {
        self.name_map.insert(name.clone(), node_id);
        self.nodes.push(Node::new(node_id, node_type, name));
        self.links.push_unlinked();
    }

    pub fn get(&self, node_id: NodeId) -> Result<&Node> {
        self.nodes
            .get(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    pub(crate) fn get_mut(&mut self, node_id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    pub fn contains(&self, node_id: NodeId) -> bool {
        (node_id as usize) < self.nodes.len()
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Node> {
        self.id_by_name(name).and_then(|id| self.get(id).ok())
    }

    pub fn id_by_name(&self, name: &str) -> Option<NodeId> {
        self.name_map.get(name).copied()
    }

    pub fn links(&self) -> &LinkTable {
        &self.links
    }

    pub fn links_of(&self, node_id: NodeId) -> Result<Links> {
        self.get(node_id)?;
        Ok(self.links.get(node_id))
    }

    /// Parent node and the link table, borrowed together for splicing.
    pub(crate) fn splice_parts(&mut self, parent: NodeId) -> Result<(&mut Node, &mut LinkTable)> {
        let node = self
            .nodes
            .get_mut(parent as usize)
            .ok_or(DomError::NodeNotFound(parent))?;
        Ok((node, &mut self.links))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterator over all nodes, attached or not, in allocation order
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn children(&self, node_id: NodeId) -> Result<Siblings<'_>> {
        Ok(self.get(node_id)?.children().iter(&self.links))
    }

    pub fn parent(&self, node_id: NodeId) -> Result<Option<&Node>> {
        let node = self.get(node_id)?;
        match node.parent() {
            Some(parent_id) => Ok(Some(self.get(parent_id)?)),
            None => Ok(None),
        }
    }

    /// Traverse a subtree depth-first in document order (iterative, no recursion)
    pub fn traverse_df<F>(&self, start_id: NodeId, mut visit: F) -> Result<()>
    where
        F: FnMut(&Node) -> Result<()>,
    {
        let mut stack = vec![start_id];

        while let Some(node_id) = stack.pop() {
            let node = self.get(node_id)?;
            visit(node)?;

            // Walk back from the tail so the head is popped first
            let mut child = node.children().tail();
            while let Some(child_id) = child {
                stack.push(child_id);
                child = self.links.get(child_id).prev();
            }
        }

        Ok(())
    }

    /// Traverse a subtree breadth-first
    pub fn traverse_bf<F>(&self, start_id: NodeId, mut visit: F) -> Result<()>
    where
        F: FnMut(&Node) -> Result<()>,
    {
        let mut queue = VecDeque::new();
        queue.push_back(start_id);

        while let Some(node_id) = queue.pop_front() {
            let node = self.get(node_id)?;
            visit(node)?;
            queue.extend(node.children().iter(&self.links));
        }

        Ok(())
    }

    /// Find nodes matching predicate
    pub fn find<F>(&self, predicate: F) -> Vec<NodeId>
    where
        F: Fn(&Node) -> bool,
    {
        self.nodes
            .iter()
            .filter(|&node| predicate(node))
            .map(Node::id)
            .collect()
    }

    pub fn find_one<F>(&self, predicate: F) -> Option<NodeId>
    where
        F: Fn(&Node) -> bool,
    {
        self.nodes.iter().find(|&node| predicate(node)).map(Node::id)
    }

    pub fn find_by_type(&self, node_type: NodeType) -> Vec<NodeId> {
        self.find(|node| node.node_type() == node_type)
    }

    /// Nodes that currently have no parent
    pub fn find_detached(&self) -> Vec<NodeId> {
        self.find(|node| !node.is_attached())
    }
}
