//! Doubly-linked sibling lists
//!
//! A child list is a `head`/`tail` pair stored on the parent. The `prev` and
//! `next` links of every node live in one [`LinkTable`] shared by the whole
//! arena, so a list can be spliced while the parent's other fields are
//! borrowed elsewhere.
//!
//! ```text
//! parent.children: head ─────────────────────────────┐ tail
//!                   ↓                                 ↓
//!                 [a] ⇄ [b] ⇄ [c] ⇄ ... ⇄ [z]
//! ```
//!
//! Nothing outside this module writes `prev`, `next`, `head` or `tail`.
//! Callers check membership before calling in; the list trusts them.

use crate::types::NodeId;

/// Sibling links of one node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Links {
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

impl Links {
    pub fn prev(&self) -> Option<NodeId> {
        self.prev
    }

    pub fn next(&self) -> Option<NodeId> {
        self.next
    }

    pub fn is_unlinked(&self) -> bool {
        self.prev.is_none() && self.next.is_none()
    }
}

/// Sibling links for every node of an arena, indexed by `NodeId`.
///
/// Ids handed to the table must come from the arena that owns it.
#[derive(Debug, Clone, Default)]
pub struct LinkTable {
    links: Vec<Links>,
}

impl LinkTable {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            links: Vec::with_capacity(capacity),
        }
    }

    /// Reserve an unlinked slot for the next node id.
    pub(crate) fn push_unlinked(&mut self) {
        self.links.push(Links::default());
    }

    /// Links of `id`, or `None` for an id this table has no slot for.
    pub fn lookup(&self, id: NodeId) -> Option<Links> {
        self.links.get(id as usize).copied()
    }

    pub(crate) fn get(&self, id: NodeId) -> Links {
        self.links[id as usize]
    }

    fn slot(&mut self, id: NodeId) -> &mut Links {
        &mut self.links[id as usize]
    }
}

/// Ordered children of one parent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SiblingList {
    head: Option<NodeId>,
    tail: Option<NodeId>,
}

impl SiblingList {
    pub const fn new() -> Self {
        Self {
            head: None,
            tail: None,
        }
    }

    pub fn head(&self) -> Option<NodeId> {
        self.head
    }

    pub fn tail(&self) -> Option<NodeId> {
        self.tail
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none() && self.tail.is_none()
    }

    /// Walk the list from head to tail. Every call starts over at the head.
    pub fn iter<'a>(&self, links: &'a LinkTable) -> Siblings<'a> {
        Siblings::starting_at(links, self.head)
    }

    /// Link `node` after the current tail.
    pub(crate) fn append(&mut self, links: &mut LinkTable, node: NodeId) {
        let old_tail = self.tail;

        let slot = links.slot(node);
        slot.prev = old_tail;
        slot.next = None;

        match old_tail {
            Some(tail) => links.slot(tail).next = Some(node),
            None => self.head = Some(node),
        }

        self.tail = Some(node);
    }

    /// Splice `new` in directly before `reference`, which must be a member.
    pub(crate) fn insert_before(&mut self, links: &mut LinkTable, reference: NodeId, new: NodeId) {
        let prev = links.get(reference).prev;

        let slot = links.slot(new);
        slot.prev = prev;
        slot.next = Some(reference);

        links.slot(reference).prev = Some(new);

        match prev {
            Some(prev) => links.slot(prev).next = Some(new),
            None => self.head = Some(new),
        }
    }

    /// Unlink `node`, which must be a member, and clear its own links.
    pub(crate) fn delete(&mut self, links: &mut LinkTable, node: NodeId) {
        let Links { prev, next } = std::mem::take(links.slot(node));

        match prev {
            Some(prev) => links.slot(prev).next = next,
            None => self.head = next,
        }

        match next {
            Some(next) => links.slot(next).prev = prev,
            None => self.tail = prev,
        }
    }
}

/// Forward iterator over a run of siblings.
#[derive(Debug, Clone)]
pub struct Siblings<'a> {
    links: &'a LinkTable,
    next: Option<NodeId>,
}

impl<'a> Siblings<'a> {
    pub(crate) fn starting_at(links: &'a LinkTable, start: Option<NodeId>) -> Self {
        Self { links, next: start }
    }

    pub(crate) fn empty(links: &'a LinkTable) -> Self {
        Self::starting_at(links, None)
    }
}

impl Iterator for Siblings<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.links.get(current).next;
        Some(current)
    }
}

impl std::iter::FusedIterator for Siblings<'_> {}
