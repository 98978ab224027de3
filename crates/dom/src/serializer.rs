//! Tree inspection output
//!
//! This module handles:
//! - Indented outlines of a subtree, one node name per line
//! - Serde snapshots of a subtree (JSON for logs and test fixtures)
//! - Slash-separated node paths
//!
//! Output is for people and diffs. Nothing reads it back.
//!
//! Every walk keeps an explicit stack, so a chain of any depth serializes
//! without growing the call stack.

use crate::document::Document;
use crate::error::{DomError, Result};
use crate::types::{NodeId, NodeType};
use serde::Serialize;

/// Serializer configuration
#[derive(Debug, Clone)]
pub struct SerializerConfig {
    pub indent_width: usize,
    pub show_node_type: bool,
    /// Deeper nodes are left out of outlines and snapshots
    pub max_depth: Option<usize>,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            indent_width: 2,
            show_node_type: false,
            max_depth: None,
        }
    }
}

/// Owned copy of a subtree's shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeSnapshot {
    pub name: String,
    pub node_type: NodeType,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

impl Drop for NodeSnapshot {
    // Flatten before dropping so deep snapshots do not recurse
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut child) = pending.pop() {
            pending.append(&mut child.children);
        }
    }
}

enum JsonStep {
    Open { id: NodeId, depth: usize, first: bool },
    Close,
}

/// Tree Serializer
pub struct TreeSerializer {
    config: SerializerConfig,
}

impl TreeSerializer {
    pub fn new() -> Self {
        Self::with_config(SerializerConfig::default())
    }

    pub fn with_config(config: SerializerConfig) -> Self {
        Self { config }
    }

    /// Outline of the whole tree below the document root
    pub fn serialize(&self, doc: &Document) -> Result<String> {
        self.serialize_from(doc, doc.root())
    }

    /// Outline of the subtree rooted at `node_id`
    pub fn serialize_from(&self, doc: &Document, node_id: NodeId) -> Result<String> {
        let mut output = String::with_capacity(256);
        let mut stack = vec![(node_id, 0)];

        while let Some((id, depth)) = stack.pop() {
            let node = doc.node(id)?;

            output.push_str(&" ".repeat(depth * self.config.indent_width));
            output.push_str(node.name());
            if self.config.show_node_type {
                output.push_str(&format!(" ({})", node.node_type()));
            }
            output.push('\n');

            if !self.too_deep(depth + 1) {
                push_children(&mut stack, doc, id, |child| (child, depth + 1));
            }
        }

        Ok(output)
    }

    pub fn snapshot(&self, doc: &Document, node_id: NodeId) -> Result<NodeSnapshot> {
        // Pre-order walk recording each node's parent slot, then build
        // bottom-up so every child is finished before its parent
        let mut order: Vec<(NodeId, Option<usize>)> = Vec::new();
        let mut stack = vec![(node_id, None, 0)];
        while let Some((id, parent, depth)) = stack.pop() {
            let slot = order.len();
            order.push((id, parent));
            if !self.too_deep(depth + 1) {
                push_children(&mut stack, doc, id, |child| (child, Some(slot), depth + 1));
            }
        }

        let mut built: Vec<Vec<NodeSnapshot>> = Vec::new();
        built.resize_with(order.len(), Vec::new);

        let mut top = None;
        for (slot, &(id, parent)) in order.iter().enumerate().rev() {
            let node = doc.node(id)?;
            let mut children = std::mem::take(&mut built[slot]);
            children.reverse();

            let snapshot = NodeSnapshot {
                name: node.name().to_string(),
                node_type: node.node_type(),
                children,
            };
            match parent {
                Some(parent) => built[parent].push(snapshot),
                None => top = Some(snapshot),
            }
        }

        top.ok_or(DomError::NodeNotFound(node_id))
    }

    /// Compact JSON of the subtree, same shape as a serialized [`NodeSnapshot`]
    pub fn to_json(&self, doc: &Document, node_id: NodeId) -> Result<String> {
        let mut out = String::with_capacity(256);
        let mut stack = vec![JsonStep::Open {
            id: node_id,
            depth: 0,
            first: true,
        }];

        while let Some(step) = stack.pop() {
            let (id, depth, first) = match step {
                JsonStep::Close => {
                    out.push_str("]}");
                    continue;
                }
                JsonStep::Open { id, depth, first } => (id, depth, first),
            };

            let node = doc.node(id)?;
            if !first {
                out.push(',');
            }
            out.push_str("{\"name\":");
            out.push_str(&serde_json::to_string(node.name())?);
            out.push_str(",\"node_type\":");
            out.push_str(&serde_json::to_string(&node.node_type())?);

            if !node.has_children() || self.too_deep(depth + 1) {
                out.push('}');
                continue;
            }

            out.push_str(",\"children\":[");
            stack.push(JsonStep::Close);
            let mut first_child = true;
            push_children(&mut stack, doc, id, |child| {
                let step = JsonStep::Open {
                    id: child,
                    depth: depth + 1,
                    first: first_child,
                };
                first_child = false;
                step
            });
        }

        Ok(out)
    }

    /// Path of names from the top of the tree, e.g. `/document_0/element_1`
    pub fn node_path(&self, doc: &Document, node_id: NodeId) -> Result<String> {
        let path = doc.path_to(node_id)?;

        let mut out = String::new();
        for id in path {
            out.push('/');
            out.push_str(doc.node(id)?.name());
        }
        Ok(out)
    }

    fn too_deep(&self, depth: usize) -> bool {
        self.config.max_depth.is_some_and(|max| depth > max)
    }
}

/// Push the children of `id` so that popping yields them first to last.
fn push_children<T>(
    stack: &mut Vec<T>,
    doc: &Document,
    id: NodeId,
    entry: impl FnMut(NodeId) -> T,
) {
    let start = stack.len();
    stack.extend(doc.children(id).map(entry));
    stack[start..].reverse();
}

impl Default for TreeSerializer {
    fn default() -> Self {
        Self::new()
    }
}
