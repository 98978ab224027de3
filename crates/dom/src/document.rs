//! Document - main entry point for tree operations
//!
//! A `Document` owns everything one tree needs:
//! - the node arena (storage, sibling links, name map)
//! - the name counter, so independent documents never share naming state
//! - a root node of type `Document`
//!
//! Every mutation goes through here. Each one checks its preconditions
//! first, then splices through [`SiblingList`](crate::siblings::SiblingList)
//! and updates the parent's child index in the same step.

use crate::arena::{DomArena, MAX_RESERVED_NODES};
use crate::error::{DomError, Result};
use crate::naming::NameGenerator;
use crate::node::{ChildKey, Node, NodeRef};
use crate::siblings::Siblings;
use crate::types::{NodeId, NodeType};
use crate::verify;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use uuid::Uuid;

/// Configuration for a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Node slots reserved up front, at most [`MAX_RESERVED_NODES`]
    pub initial_capacity: usize,
    /// First value of the naming counter
    pub name_counter_start: u64,
    /// Re-check the touched child list after every mutation
    pub verify_mutations: bool,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 1024,
            name_counter_start: 0,
            verify_mutations: false,
        }
    }
}

impl DocumentConfig {
    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(input: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.initial_capacity > MAX_RESERVED_NODES {
            return Err(DomError::InvalidConfig(format!(
                "initial_capacity {} exceeds the maximum of {}",
                self.initial_capacity, MAX_RESERVED_NODES
            )));
        }
        Ok(())
    }
}

/// A tree of nodes and the context that names them
#[derive(Debug)]
pub struct Document {
    id: Uuid,
    config: DocumentConfig,
    arena: DomArena,
    names: NameGenerator,
    root: NodeId,
}

impl Document {
    pub fn new() -> Self {
        Self::with_config(DocumentConfig::default())
    }

    /// Build a document from `config`, rejecting values `validate` refuses
    pub fn try_with_config(config: DocumentConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    /// Build a document from `config`. An oversized `initial_capacity` is
    /// clamped to [`MAX_RESERVED_NODES`].
    pub fn with_config(config: DocumentConfig) -> Self {
        let (names, root_name) =
            NameGenerator::seeded(config.name_counter_start, NodeType::Document);
        let (arena, root) =
            DomArena::with_root(config.initial_capacity, NodeType::Document, root_name);
        let id = Uuid::new_v4();

        tracing::debug!("[Document {}] created with config {:?}", id, config);

        Self {
            id,
            config,
            arena,
            names,
            root,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    pub fn arena(&self) -> &DomArena {
        &self.arena
    }

    #[cfg(test)]
    pub(crate) fn arena_mut_for_tests(&mut self) -> &mut DomArena {
        &mut self.arena
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes ever created in this document, root included
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    // --- Construction ---

    /// Create a standalone node: no parent, no children, empty index.
    ///
    /// Fails once the name counter or the id space is used up; nothing is
    /// allocated in that case.
    pub fn create_node(&mut self, node_type: NodeType) -> Result<NodeId> {
        self.arena.next_id()?;
        let name = self.names.next_name(node_type)?;
        let id = self.arena.add_node(node_type, name)?;
        tracing::trace!("[Document {}] created node {}", self.id, id);
        Ok(id)
    }

    /// Create a node and append it to `parent`
    pub fn create_child(&mut self, parent: NodeId, node_type: NodeType) -> Result<NodeId> {
        self.arena.get(parent)?;
        let child = self.create_node(node_type)?;
        self.insert_before(parent, child, None)
    }

    // --- Queries ---
    //
    // Ids that do not belong to this document read as "no node".

    pub fn node(&self, id: NodeId) -> Result<NodeRef<'_>> {
        Ok(NodeRef::new(self, self.arena.get(id)?))
    }

    pub fn get_by_name(&self, name: &str) -> Option<NodeRef<'_>> {
        self.arena.get_by_name(name).map(|node| NodeRef::new(self, node))
    }

    pub fn name_of(&self, id: NodeId) -> Option<&str> {
        self.arena.get(id).ok().map(Node::name)
    }

    pub fn node_type(&self, id: NodeId) -> Option<NodeType> {
        self.arena.get(id).ok().map(Node::node_type)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).ok().and_then(Node::parent)
    }

    pub fn has_children(&self, id: NodeId) -> bool {
        self.arena.get(id).is_ok_and(Node::has_children)
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.arena.get(id).map_or(0, Node::child_count)
    }

    /// First child in sibling order; `None` for a childless node
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).ok().and_then(|node| node.children().head())
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).ok().and_then(|node| node.children().tail())
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.arena.links_of(id).ok().and_then(|links| links.prev())
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.arena.links_of(id).ok().and_then(|links| links.next())
    }

    /// O(1) membership test against the child index of `parent`
    pub fn has_as_child<'k>(&self, parent: NodeId, key: impl Into<ChildKey<'k>>) -> bool {
        let Ok(parent) = self.arena.get(parent) else {
            return false;
        };

        match key.into() {
            ChildKey::Name(name) => parent.child_named(name).is_some(),
            ChildKey::Node(child) => self
                .name_of(child)
                .and_then(|name| parent.child_named(name))
                .is_some_and(|found| found == child),
        }
    }

    pub fn fetch_child_by_name(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.arena.get(parent).ok().and_then(|node| node.child_named(name))
    }

    /// Children of `id` from first to last
    pub fn children(&self, id: NodeId) -> Siblings<'_> {
        self.arena
            .children(id)
            .unwrap_or_else(|_| Siblings::empty(self.arena.links()))
    }

    /// `id` followed by every later sibling
    pub fn following_siblings(&self, id: NodeId) -> Siblings<'_> {
        let start = self.arena.contains(id).then_some(id);
        Siblings::starting_at(self.arena.links(), start)
    }

    /// Proper ancestors of `id`, nearest first
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.parent(id),
        }
    }

    /// `id` and its whole subtree in document order
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            root: id,
            next: self.arena.contains(id).then_some(id),
        }
    }

    /// True if `ancestor` is `id` or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        ancestor == id || self.ancestors(id).any(|a| a == ancestor)
    }

    /// Ids from the top of the tree down to `id`
    pub fn path_to(&self, id: NodeId) -> Result<SmallVec<[NodeId; 8]>> {
        self.arena.get(id)?;
        let mut path: SmallVec<[NodeId; 8]> = SmallVec::new();
        path.push(id);
        path.extend(self.ancestors(id));
        path.reverse();
        Ok(path)
    }

    // --- Mutation ---

    /// Attach `new` under `parent`, before `reference` or at the end.
    ///
    /// Fails with [`DomError::NotAChild`] if `reference` is given but is not
    /// a child of `parent`. On success `new` is linked, indexed by name and
    /// has `parent` as its parent.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        new: NodeId,
        reference: Option<NodeId>,
    ) -> Result<NodeId> {
        self.arena.get(parent)?;
        if let Some(reference) = reference {
            self.require_child(parent, reference)?;
        }
        self.require_insertable(parent, new)?;

        let name = self.arena.get(new)?.name().to_string();
        let (parent_node, links) = self.arena.splice_parts(parent)?;
        match reference {
            None => parent_node.children.append(links, new),
            Some(reference) => parent_node.children.insert_before(links, reference, new),
        }
        parent_node.child_index.insert(name, new);
        self.arena.get_mut(new)?.parent = Some(parent);

        tracing::debug!(
            "[Document {}] inserted {} under {} before {:?}",
            self.id,
            new,
            parent,
            reference
        );

        self.after_mutation(parent)?;
        Ok(new)
    }

    /// Append `new` as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, new: NodeId) -> Result<NodeId> {
        self.insert_before(parent, new, None)
    }

    /// Put `new` where `old` is and return `old`, now detached
    pub fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) -> Result<NodeId> {
        self.require_child(parent, old)?;
        self.require_insertable(parent, new)?;

        let old_name = self.arena.get(old)?.name().to_string();
        let new_name = self.arena.get(new)?.name().to_string();

        let (parent_node, links) = self.arena.splice_parts(parent)?;
        parent_node.children.insert_before(links, old, new);
        parent_node.child_index.insert(new_name, new);
        parent_node.children.delete(links, old);
        parent_node.child_index.remove(&old_name);

        self.arena.get_mut(new)?.parent = Some(parent);
        self.arena.get_mut(old)?.parent = None;

        tracing::debug!(
            "[Document {}] replaced {} with {} under {}",
            self.id,
            old,
            new,
            parent
        );

        self.after_mutation(parent)?;
        Ok(old)
    }

    /// Unlink `child` from `parent` and return it, now detached
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId> {
        self.require_child(parent, child)?;

        let name = self.arena.get(child)?.name().to_string();
        let (parent_node, links) = self.arena.splice_parts(parent)?;
        parent_node.children.delete(links, child);
        parent_node.child_index.remove(&name);
        self.arena.get_mut(child)?.parent = None;

        tracing::debug!("[Document {}] removed {} from {}", self.id, child, parent);

        self.after_mutation(parent)?;
        Ok(child)
    }

    /// Remove `id` from whatever parent it has. Returns that former parent.
    pub fn detach(&mut self, id: NodeId) -> Result<Option<NodeId>> {
        match self.arena.get(id)?.parent() {
            Some(parent) => {
                self.remove_child(parent, id)?;
                Ok(Some(parent))
            }
            None => Ok(None),
        }
    }

    // --- Preconditions ---

    fn require_child(&self, parent: NodeId, child: NodeId) -> Result<()> {
        let parent_node = self.arena.get(parent)?;
        let child_node = self.arena.get(child)?;

        if parent_node.child_named(child_node.name()) == Some(child) {
            return Ok(());
        }

        Err(DomError::NotAChild {
            child: child_node.name().to_string(),
            parent: parent_node.name().to_string(),
        })
    }

    fn require_insertable(&self, parent: NodeId, new: NodeId) -> Result<()> {
        let node = self.arena.get(new)?;

        if let Some(current) = node.parent() {
            return Err(DomError::AlreadyAttached {
                node: node.name().to_string(),
                parent: self.name_of(current).unwrap_or_default().to_string(),
            });
        }

        // A node without children can only be its own ancestor, so the
        // parent chain is walked only when `new` roots a subtree.
        let cycle = if node.has_children() {
            self.is_inclusive_ancestor(new, parent)
        } else {
            new == parent
        };

        if cycle {
            return Err(DomError::HierarchyCycle {
                node: node.name().to_string(),
                parent: self.name_of(parent).unwrap_or_default().to_string(),
            });
        }

        Ok(())
    }

    fn after_mutation(&self, parent: NodeId) -> Result<()> {
        if !self.config.verify_mutations {
            return Ok(());
        }

        verify::check_node(self, parent).inspect_err(|e| {
            tracing::error!("[Document {}] invariant violated: {}", self.id, e);
        })
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the proper ancestors of a node
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.parent(current);
        Some(current)
    }
}

/// Pre-order iterator over a subtree, its root first
pub struct Descendants<'a> {
    doc: &'a Document,
    root: NodeId,
    next: Option<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;

        self.next = self.doc.first_child(current).or_else(|| {
            let mut cursor = current;
            loop {
                if cursor == self.root {
                    return None;
                }
                if let Some(sibling) = self.doc.next_sibling(cursor) {
                    return Some(sibling);
                }
                cursor = self.doc.parent(cursor)?;
            }
        });

        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strict() -> Document {
        Document::with_config(DocumentConfig {
            verify_mutations: true,
            ..DocumentConfig::default()
        })
    }

    fn child_ids(doc: &Document, parent: NodeId) -> Vec<NodeId> {
        doc.children(parent).collect()
    }

    #[test]
    fn test_new_document_has_root() {
        let doc = Document::new();
        let root = doc.node(doc.root()).unwrap();

        assert_eq!(root.name(), "document_0");
        assert_eq!(root.node_type(), NodeType::Document);
        assert!(!root.has_children());
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_counter_start_from_config() {
        let mut doc = Document::with_config(DocumentConfig {
            name_counter_start: 40,
            ..DocumentConfig::default()
        });
        let node = doc.create_node(NodeType::Element).unwrap();

        assert_eq!(doc.name_of(doc.root()), Some("document_40"));
        assert_eq!(doc.name_of(node), Some("element_41"));
    }

    #[test]
    fn test_counter_start_at_max_names_root_then_fails() {
        let mut doc = Document::with_config(DocumentConfig {
            name_counter_start: u64::MAX,
            ..DocumentConfig::default()
        });
        let root = doc.root();

        assert_eq!(doc.name_of(root), Some("document_18446744073709551615"));
        assert!(matches!(
            doc.create_node(NodeType::Element),
            Err(DomError::NameCounterExhausted { .. })
        ));
        assert!(doc.create_child(root, NodeType::Text).is_err());
        assert_eq!(doc.len(), 1);
        assert!(!doc.has_children(root));
    }

    #[test]
    fn test_oversized_capacity_rejected_or_clamped() {
        let json = format!(r#"{{"initial_capacity": {}}}"#, usize::MAX);
        assert!(matches!(
            DocumentConfig::from_json(&json),
            Err(DomError::InvalidConfig(_))
        ));

        let config = DocumentConfig {
            initial_capacity: usize::MAX,
            ..DocumentConfig::default()
        };
        assert!(matches!(
            Document::try_with_config(config.clone()),
            Err(DomError::InvalidConfig(_))
        ));

        let mut doc = Document::with_config(config);
        let node = doc.create_node(NodeType::Element).unwrap();
        assert_eq!(doc.name_of(node), Some("element_1"));
    }

    #[test]
    fn test_config_from_json_uses_defaults() {
        let config = DocumentConfig::from_json(r#"{"verify_mutations": true}"#).unwrap();

        assert!(config.verify_mutations);
        assert_eq!(config.initial_capacity, 1024);
        assert!(matches!(
            DocumentConfig::from_json("{not json"),
            Err(DomError::Json(_))
        ));
    }

    #[test]
    fn test_documents_do_not_share_names() {
        let mut a = Document::new();
        let mut b = Document::new();
        a.create_node(NodeType::Element).unwrap();
        a.create_node(NodeType::Element).unwrap();

        let node = b.create_node(NodeType::Element).unwrap();
        assert_eq!(b.name_of(node), Some("element_1"));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_insert_sets_parent() {
        let mut doc = strict();
        let p = doc.create_node(NodeType::Element).unwrap();
        let a = doc.create_node(NodeType::Text).unwrap();

        doc.insert_before(p, a, None).unwrap();

        assert_eq!(doc.parent(a), Some(p));
        assert!(doc.has_as_child(p, a));
    }

    #[test]
    fn test_insert_rejects_attached_node() {
        let mut doc = strict();
        let p = doc.create_node(NodeType::Element).unwrap();
        let q = doc.create_node(NodeType::Element).unwrap();
        let a = doc.create_child(p, NodeType::Text).unwrap();

        let err = doc.insert_before(q, a, None).unwrap_err();

        assert!(matches!(err, DomError::AlreadyAttached { .. }));
        assert!(!doc.has_children(q));
        assert_eq!(child_ids(&doc, p), vec![a]);
    }

    #[test]
    fn test_insert_rejects_cycles() {
        let mut doc = strict();
        let a = doc.create_node(NodeType::Element).unwrap();
        let b = doc.create_child(a, NodeType::Element).unwrap();

        assert!(matches!(
            doc.insert_before(a, a, None),
            Err(DomError::HierarchyCycle { .. })
        ));
        assert!(matches!(
            doc.insert_before(b, a, None),
            Err(DomError::HierarchyCycle { .. })
        ));
        assert!(!doc.has_children(b));
    }

    #[test]
    fn test_insert_rejects_cycle_through_deep_subtree() {
        let mut doc = strict();
        let top = doc.create_node(NodeType::Element).unwrap();
        let mut bottom = top;
        for _ in 0..32 {
            bottom = doc.create_child(bottom, NodeType::Element).unwrap();
        }
        let leaf = doc.create_node(NodeType::Text).unwrap();

        assert!(matches!(
            doc.insert_before(bottom, top, None),
            Err(DomError::HierarchyCycle { .. })
        ));
        assert!(matches!(
            doc.insert_before(leaf, leaf, None),
            Err(DomError::HierarchyCycle { .. })
        ));
        assert!(!doc.has_children(leaf));
        assert!(!doc.has_children(bottom));

        doc.append_child(bottom, leaf).unwrap();
        assert_eq!(doc.ancestors(leaf).count(), 33);
    }

    #[test]
    fn test_deep_chain_builds_and_traverses() {
        let mut doc = Document::new();
        let mut tip = doc.root();
        for _ in 0..100_000 {
            tip = doc.create_child(tip, NodeType::Element).unwrap();
        }

        assert_eq!(doc.len(), 100_001);
        assert_eq!(doc.ancestors(tip).count(), 100_000);
        assert_eq!(doc.descendants(doc.root()).count(), 100_001);
        assert_eq!(doc.path_to(tip).unwrap().len(), 100_001);
    }

    #[test]
    fn test_unknown_ids_are_not_found() {
        let mut doc = Document::new();
        let root = doc.root();

        assert!(matches!(
            doc.insert_before(root, 77, None),
            Err(DomError::NodeNotFound(77))
        ));
        assert!(matches!(
            doc.remove_child(77, root),
            Err(DomError::NodeNotFound(77))
        ));
        assert!(!doc.has_children(77));
        assert_eq!(doc.first_child(77), None);
        assert_eq!(doc.children(77).count(), 0);
    }

    #[test]
    fn test_replace_with_self_is_rejected() {
        let mut doc = strict();
        let p = doc.root();
        let a = doc.create_child(p, NodeType::Element).unwrap();

        let err = doc.replace_child(p, a, a).unwrap_err();

        assert!(err.is_precondition());
        assert_eq!(child_ids(&doc, p), vec![a]);
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut doc = strict();
        let p = doc.root();
        let a = doc.create_child(p, NodeType::Element).unwrap();
        let b = doc.create_child(p, NodeType::Element).unwrap();
        let c = doc.create_child(p, NodeType::Element).unwrap();
        let d = doc.create_node(NodeType::Comment).unwrap();

        let old = doc.replace_child(p, b, d).unwrap();

        assert_eq!(old, b);
        assert_eq!(child_ids(&doc, p), vec![a, d, c]);
        assert_eq!(doc.parent(b), None);
        assert_eq!(doc.previous_sibling(b), None);
        assert_eq!(doc.next_sibling(b), None);
        assert_eq!(doc.previous_sibling(c), Some(d));
    }

    #[test]
    fn test_detach_and_reattach_elsewhere() {
        let mut doc = strict();
        let root = doc.root();
        let a = doc.create_child(root, NodeType::Element).unwrap();
        let b = doc.create_child(root, NodeType::Element).unwrap();
        let t = doc.create_child(a, NodeType::Text).unwrap();

        assert_eq!(doc.detach(t).unwrap(), Some(a));
        assert_eq!(doc.detach(t).unwrap(), None);

        doc.append_child(b, t).unwrap();
        assert_eq!(doc.parent(t), Some(b));
        assert!(!doc.has_children(a));
    }

    #[test]
    fn test_ancestors_descendants_and_path() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.create_child(root, NodeType::Element).unwrap();
        let b = doc.create_child(root, NodeType::Element).unwrap();
        let c = doc.create_child(a, NodeType::Text).unwrap();
        let d = doc.create_child(a, NodeType::Comment).unwrap();

        assert_eq!(doc.ancestors(c).collect::<Vec<_>>(), vec![a, root]);
        assert_eq!(
            doc.descendants(root).collect::<Vec<_>>(),
            vec![root, a, c, d, b]
        );
        assert_eq!(doc.descendants(a).collect::<Vec<_>>(), vec![a, c, d]);
        assert_eq!(doc.path_to(d).unwrap().as_slice(), &[root, a, d]);
        assert_eq!(doc.following_siblings(c).collect::<Vec<_>>(), vec![c, d]);
        assert!(doc.is_inclusive_ancestor(root, d));
        assert!(!doc.is_inclusive_ancestor(b, d));
    }

    #[test]
    fn test_has_as_child_by_name_and_id() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.create_child(root, NodeType::Element).unwrap();
        let stray = doc.create_node(NodeType::Element).unwrap();

        let name = doc.name_of(a).unwrap().to_string();
        assert!(doc.has_as_child(root, name.as_str()));
        assert!(doc.has_as_child(root, &name));
        assert!(doc.has_as_child(root, a));
        assert!(!doc.has_as_child(root, stray));
        assert!(!doc.has_as_child(root, "element_999"));
        assert_eq!(doc.fetch_child_by_name(root, &name), Some(a));
        assert_eq!(doc.fetch_child_by_name(root, "element_999"), None);
    }
}
