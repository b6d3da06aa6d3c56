//! Definitions Harvesting
//!
//! Builds a reverse index from schema node to the key it was declared under
//! in some `definitions` map, anywhere below a root. The parser uses it as
//! the naming fallback of last resort.

use std::collections::{HashMap, HashSet};

use crate::document::{NodeId, SchemaDocument};

/// Node -> the `definitions` key it was declared under
#[derive(Debug, Default, Clone)]
pub struct DefinitionsIndex {
    keys: HashMap<NodeId, String>,
}

impl DefinitionsIndex {
    /// Walk everything reachable from `root`, depth-first in document order.
    ///
    /// A node's own `definitions` are indexed before its children are
    /// visited; when a node is declared under several keys the first one
    /// seen wins. Each node is visited once, so cyclic documents terminate.
    /// The walk keeps its own stack, so document depth is not bounded by
    /// the thread's stack.
    pub fn harvest(document: &SchemaDocument, root: NodeId) -> Self {
        let mut index = Self::default();
        let mut visited = HashSet::new();
        let mut stack = vec![root];

        while let Some(node) = stack.pop() {
            if !visited.insert(node) {
                continue;
            }
            let Some(schema) = document.schema(node) else {
                continue;
            };

            for (key, &definition) in schema.definitions.iter().flatten() {
                index.keys.entry(definition).or_insert_with(|| key.clone());
            }

            // Reversed so the first child is popped first
            let start = stack.len();
            stack.extend(schema.children());
            stack[start..].reverse();
        }

        index
    }

    /// The key `node` was declared under, if any
    pub fn key_of(&self, node: NodeId) -> Option<&str> {
        self.keys.get(&node).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
