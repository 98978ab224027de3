//! Document tree primitive
//!
//! The structural kernel beneath an HTML-like document model: nodes with a
//! parent link, an ordered doubly-linked list of children, and a name index
//! over those children for O(1) lookup.
//!
//! ## Core Design
//!
//! ```text
//! Document ─┬─ DomArena ─┬─ Vec<Node>      (kind, name, parent, child list, child index)
//!           │            └─ LinkTable      (prev/next per node)
//!           └─ NameGenerator              (element_7, text_8, ...)
//!                                ↓
//!                         NodeId (u32)
//! ```
//!
//! Nodes never own each other. The arena owns all of them, and a node
//! removed from the tree simply becomes unattached, ready to be inserted
//! somewhere else.
//!
//! ```
//! use htmldom::{Document, NodeType};
//!
//! let mut doc = Document::new();
//! let root = doc.root();
//! let a = doc.create_child(root, NodeType::Element)?;
//! let b = doc.create_node(NodeType::Text)?;
//! doc.insert_before(root, b, Some(a))?;
//!
//! assert_eq!(doc.children(root).collect::<Vec<_>>(), vec![b, a]);
//! assert!(doc.has_as_child(root, "text_2"));
//! # Ok::<(), htmldom::DomError>(())
//! ```

pub mod arena;
pub mod document;
pub mod error;
pub mod naming;
pub mod node;
pub mod serializer;
pub mod siblings;
pub mod types;
pub mod verify;

pub use arena::DomArena;
pub use document::{Document, DocumentConfig};
pub use error::{DomError, Result};
pub use node::{ChildKey, Node, NodeRef};
pub use serializer::{NodeSnapshot, TreeSerializer};
pub use siblings::{SiblingList, Siblings};
pub use types::*;
