//! Schema Document
//!
//! Arena of input schema nodes. A node's identity is its [`NodeId`]: two
//! mappings with identical contents at different positions are distinct
//! nodes, while a dereferenced `$ref` is the *same* node as its target.
//! Cycles are therefore just ids pointing back up the tree.
//!
//! Documents come from [`loader`] (JSON plus local `$ref` resolution) or are
//! assembled directly with [`DocumentBuilder`].

pub mod loader;
pub mod schema;

pub use schema::{AdditionalProperties, Items, Schema, TypeSpec};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// =============================================================================
// Node Identity
// =============================================================================

/// Handle to a node inside one [`SchemaDocument`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) const fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One entry of the document arena
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// A structural schema, dispatched through the classifier
    Schema(Schema),
    /// A bare value used as an enum member
    Literal(Value),
}

impl SchemaNode {
    pub fn as_schema(&self) -> Option<&Schema> {
        match self {
            SchemaNode::Schema(schema) => Some(schema),
            SchemaNode::Literal(_) => None,
        }
    }
}

// =============================================================================
// Document
// =============================================================================

/// An immutable, possibly cyclic schema graph with a designated root
#[derive(Debug, Clone)]
pub struct SchemaDocument {
    nodes: Vec<SchemaNode>,
    /// JSON pointer each node was loaded from (None for builder-made nodes)
    pointers: Vec<Option<String>>,
    root: NodeId,
}

impl SchemaDocument {
    pub fn builder() -> DocumentBuilder {
        DocumentBuilder::default()
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&SchemaNode> {
        self.nodes.get(id.index())
    }

    pub fn schema(&self, id: NodeId) -> Option<&Schema> {
        self.get(id).and_then(SchemaNode::as_schema)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// JSON pointer of a node, if it was loaded from JSON
    pub fn pointer(&self, id: NodeId) -> Option<&str> {
        self.pointers.get(id.index()).and_then(|p| p.as_deref())
    }

    /// Human-readable location for diagnostics
    pub fn location(&self, id: NodeId) -> String {
        match self.pointer(id) {
            Some(pointer) => format!("#{}", pointer),
            None => format!("node {}", id),
        }
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Assembles a [`SchemaDocument`] node by node.
///
/// Nodes may be reserved first and filled later, which is how the loader
/// gives a schema its id before its children are loaded.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    nodes: Vec<SchemaNode>,
    pointers: Vec<Option<String>>,
}

impl DocumentBuilder {
    pub fn schema(&mut self, schema: Schema) -> NodeId {
        self.push(SchemaNode::Schema(schema), None)
    }

    pub fn literal(&mut self, value: Value) -> NodeId {
        self.push(SchemaNode::Literal(value), None)
    }

    /// Replace the contents of an already allocated node
    pub fn set(&mut self, id: NodeId, node: SchemaNode) {
        if let Some(slot) = self.nodes.get_mut(id.index()) {
            *slot = node;
        }
    }

    pub(crate) fn push(&mut self, node: SchemaNode, pointer: Option<String>) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(node);
        self.pointers.push(pointer);
        id
    }

    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut SchemaNode> {
        self.nodes.iter_mut()
    }

    pub fn build(self, root: NodeId) -> SchemaDocument {
        SchemaDocument {
            nodes: self.nodes,
            pointers: self.pointers,
            root,
        }
    }
}
