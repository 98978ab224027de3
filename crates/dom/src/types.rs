//! Core type definitions
//!
//! Key design principles:
//! 1. Use u32 for indices (4 bytes vs 8 bytes pointer)
//! 2. Every link between nodes is an index, the arena owns the nodes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Node identifier (index into the document arena)
pub type NodeId = u32;

/// Kind of a tree vertex.
///
/// The numeric codes follow declaration order starting at 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeType {
    Document = 1,
    #[default]
    Element = 2,
    Attribute = 3,
    ProcessingInstruction = 4,
    Comment = 5,
    Text = 6,
}

impl NodeType {
    pub const ALL: [NodeType; 6] = [
        NodeType::Document,
        NodeType::Element,
        NodeType::Attribute,
        NodeType::ProcessingInstruction,
        NodeType::Comment,
        NodeType::Text,
    ];

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(NodeType::Document),
            2 => Some(NodeType::Element),
            3 => Some(NodeType::Attribute),
            4 => Some(NodeType::ProcessingInstruction),
            5 => Some(NodeType::Comment),
            6 => Some(NodeType::Text),
            _ => None,
        }
    }

    /// Lowercase tag used as the prefix of generated node names.
    pub fn tag(self) -> &'static str {
        match self {
            NodeType::Document => "document",
            NodeType::Element => "element",
            NodeType::Attribute => "attribute",
            NodeType::ProcessingInstruction => "processinginstruction",
            NodeType::Comment => "comment",
            NodeType::Text => "text",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
