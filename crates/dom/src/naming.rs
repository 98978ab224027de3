//! Node naming
//!
//! Names are `<tag>_<n>` where `n` comes from a counter owned by one
//! document. Two documents never share a counter. The counter never wraps:
//! once `u64::MAX` has been handed out, every further request fails.

use crate::error::{DomError, Result};
use crate::types::NodeType;

#[derive(Debug, Clone)]
pub struct NameGenerator {
    /// `None` once the counter has passed `u64::MAX`
    next: Option<u64>,
    last: Option<String>,
}

impl Default for NameGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl NameGenerator {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(start: u64) -> Self {
        Self {
            next: Some(start),
            last: None,
        }
    }

    /// Generator whose first name, for `node_type`, is already taken.
    ///
    /// Cannot fail: a fresh counter always has `start` left to give.
    pub fn seeded(start: u64, node_type: NodeType) -> (Self, String) {
        let name = format_name(node_type, start);
        let names = Self {
            next: start.checked_add(1),
            last: Some(name.clone()),
        };
        (names, name)
    }

    /// Value the next generated name will carry, `None` when exhausted.
    pub fn peek(&self) -> Option<u64> {
        self.next
    }

    pub fn next_name(&mut self, node_type: NodeType) -> Result<String> {
        let Some(count) = self.next else {
            return Err(DomError::NameCounterExhausted {
                last: self.last.clone().unwrap_or_default(),
            });
        };

        let name = format_name(node_type, count);
        self.next = count.checked_add(1);
        self.last = Some(name.clone());
        Ok(name)
    }
}

fn format_name(node_type: NodeType, count: u64) -> String {
    format!("{}_{}", node_type.tag(), count)
}
