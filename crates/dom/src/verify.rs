//! Structural consistency checks
//!
//! For every node:
//! - `head`/`tail` are both set or both unset
//! - walking `next` from `head` ends at `tail`, and each step's `prev`
//!   points at the node walked before it
//! - every child walked has this node as its parent
//! - the child index holds exactly the names of the children walked
//!
//! Nodes without a parent must carry no sibling links.

use crate::document::Document;
use crate::error::{DomError, Result};
use crate::node::Node;
use crate::types::NodeId;

fn violation(node: &Node, reason: String) -> DomError {
    DomError::InconsistentTree {
        node: node.name().to_string(),
        reason,
    }
}

/// Check the child list and child index of one node
pub fn check_node(doc: &Document, id: NodeId) -> Result<()> {
    let arena = doc.arena();
    let node = arena.get(id)?;
    let list = node.children();

    if list.head().is_some() != list.tail().is_some() {
        return Err(violation(
            node,
            format!("head {:?} and tail {:?} disagree", list.head(), list.tail()),
        ));
    }

    let mut previous: Option<NodeId> = None;
    let mut walked = 0usize;

    for child_id in list.iter(arena.links()) {
        walked += 1;
        if walked > arena.len() {
            return Err(violation(node, "sibling chain does not terminate".to_string()));
        }

        let child = arena.get(child_id)?;
        let links = arena.links().get(child_id);

        if links.prev() != previous {
            return Err(violation(
                node,
                format!(
                    "{} has prev {:?}, expected {:?}",
                    child.name(),
                    links.prev(),
                    previous
                ),
            ));
        }

        if child.parent() != Some(id) {
            return Err(violation(
                node,
                format!("{} has parent {:?}", child.name(), child.parent()),
            ));
        }

        if node.child_named(child.name()) != Some(child_id) {
            return Err(violation(
                node,
                format!("{} is linked but not indexed", child.name()),
            ));
        }

        previous = Some(child_id);
    }

    if previous != list.tail() {
        return Err(violation(
            node,
            format!("walk ended at {:?} but tail is {:?}", previous, list.tail()),
        ));
    }

    if walked != node.child_count() {
        return Err(violation(
            node,
            format!(
                "{} children linked but {} indexed",
                walked,
                node.child_count()
            ),
        ));
    }

    Ok(())
}

/// Check every node in the document, attached or not
pub fn check_tree(doc: &Document) -> Result<()> {
    let arena = doc.arena();

    for node in arena.iter() {
        check_node(doc, node.id())?;

        if !node.is_attached() && !arena.links().get(node.id()).is_unlinked() {
            return Err(violation(
                node,
                "detached node still has sibling links".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeType;

    #[test]
    fn test_fresh_document_is_consistent() {
        let doc = Document::new();
        check_tree(&doc).unwrap();
    }

    #[test]
    fn test_consistent_after_mixed_mutations() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.create_child(root, NodeType::Element).unwrap();
        let b = doc.create_child(root, NodeType::Element).unwrap();
        let c = doc.create_node(NodeType::Text).unwrap();
        let d = doc.create_node(NodeType::Comment).unwrap();

        doc.insert_before(root, c, Some(a)).unwrap();
        doc.replace_child(root, b, d).unwrap();
        doc.remove_child(root, a).unwrap();
        doc.append_child(d, a).unwrap();

        check_tree(&doc).unwrap();
    }

    #[test]
    fn test_detects_unindexed_child() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.create_child(root, NodeType::Element).unwrap();

        let name = doc.name_of(a).unwrap().to_string();
        doc.arena_mut_for_tests().get_mut(root).unwrap().child_index.remove(&name);

        let err = check_node(&doc, root).unwrap_err();
        assert!(matches!(err, DomError::InconsistentTree { .. }));
        assert!(err.to_string().contains("not indexed"));
    }

    #[test]
    fn test_detects_wrong_parent() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.create_child(root, NodeType::Element).unwrap();

        doc.arena_mut_for_tests().get_mut(a).unwrap().parent = None;

        let err = check_tree(&doc).unwrap_err();
        assert!(err.to_string().contains("has parent None"));
    }
}
