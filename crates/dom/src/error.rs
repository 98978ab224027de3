//! Error types for tree operations
//!
//! Flat hierarchy. Every mutation checks its preconditions before touching
//! the tree, so an error never leaves a half-applied change behind.

use crate::types::NodeId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DomError>;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("The node {child:?} is not a child of the parent node {parent:?}")]
    NotAChild { child: String, parent: String },

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("The node {node:?} is already a child of {parent:?}; detach it first")]
    AlreadyAttached { node: String, parent: String },

    #[error("Inserting {node:?} under {parent:?} would make it its own ancestor")]
    HierarchyCycle { node: String, parent: String },

    #[error("Inconsistent child list under {node:?}: {reason}")]
    InconsistentTree { node: String, reason: String },

    #[error("Name counter exhausted; no name left after {last:?}")]
    NameCounterExhausted { last: String },

    #[error("Node id space exhausted at {0} nodes")]
    IdSpaceExhausted(usize),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DomError {
    /// True for the caller-programming errors raised by precondition checks.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            DomError::NotAChild { .. }
                | DomError::AlreadyAttached { .. }
                | DomError::HierarchyCycle { .. }
        )
    }
}
