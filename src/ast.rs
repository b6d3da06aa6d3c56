//! Type AST
//!
//! Output of the parser: an arena of [`AstNode`]s addressed by [`AstId`].
//! Shared and recursive schemas become shared and recursive ids - a node
//! that (transitively) contains itself simply lists its own id.
//!
//! A renderer emits every node that has a `standalone_name` as its own
//! declaration and inlines the rest.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::ops::Index;

use crate::error::{Result, SchemaError};

/// Key used for index-signature (additional properties) parameters
pub const INDEX_SIGNATURE_KEY: &str = "[k: string]";

// =============================================================================
// Identity
// =============================================================================

/// Handle to a node inside one [`Ast`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AstId(u32);

impl AstId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for AstId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

// =============================================================================
// Nodes
// =============================================================================

/// A labelled member of a named enum
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumMember {
    pub label: String,
    pub ast: AstId,
}

/// One member of an interface: a property, a pattern property, an index
/// signature, or a harvested definition
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceParam {
    pub ast: AstId,
    pub key_name: String,
    pub is_required: bool,
    pub is_pattern_property: bool,
    pub is_unreachable_definition: bool,
}

impl InterfaceParam {
    pub fn is_index_signature(&self) -> bool {
        self.key_name == INDEX_SIGNATURE_KEY
    }
}

/// The shape of a node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AstKind {
    Any,
    Boolean,
    Null,
    Number,
    String,
    Literal { value: Value },
    Array { element: AstId },
    Tuple { elements: Vec<AstId> },
    Union { members: Vec<AstId> },
    Intersection { members: Vec<AstId> },
    Enum { members: Vec<EnumMember> },
    #[serde(rename_all = "camelCase")]
    Interface {
        params: Vec<InterfaceParam>,
        super_types: Vec<AstId>,
    },
}

/// A node plus the metadata every variant carries
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AstNode {
    #[serde(flatten)]
    pub kind: AstKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standalone_name: Option<String>,
}

impl AstNode {
    pub fn is_named(&self) -> bool {
        self.standalone_name.is_some()
    }

    /// Interface members, empty for every other kind
    pub fn params(&self) -> &[InterfaceParam] {
        match &self.kind {
            AstKind::Interface { params, .. } => params,
            _ => &[],
        }
    }

    pub fn super_types(&self) -> &[AstId] {
        match &self.kind {
            AstKind::Interface { super_types, .. } => super_types,
            _ => &[],
        }
    }
}

// =============================================================================
// Ast
// =============================================================================

/// A finished AST: every node is filled, `root` is the document root
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ast {
    root: AstId,
    nodes: Vec<AstNode>,
}

impl Ast {
    pub fn root(&self) -> AstId {
        self.root
    }

    pub fn root_node(&self) -> &AstNode {
        &self[self.root]
    }

    pub fn get(&self, id: AstId) -> Option<&AstNode> {
        self.nodes.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AstId, &AstNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (AstId(i as u32), node))
    }

    /// Nodes a renderer emits as named declarations, in allocation order
    pub fn declarations(&self) -> impl Iterator<Item = (AstId, &AstNode)> {
        self.iter().filter(|(_, node)| node.is_named())
    }

    /// Find the first node declared under `name`
    pub fn find_named(&self, name: &str) -> Option<AstId> {
        self.declarations()
            .find(|(_, node)| node.standalone_name.as_deref() == Some(name))
            .map(|(id, _)| id)
    }
}

impl Index<AstId> for Ast {
    type Output = AstNode;

    fn index(&self, id: AstId) -> &AstNode {
        &self.nodes[id.index()]
    }
}

// =============================================================================
// Arena (under construction)
// =============================================================================

/// A node slot that may still be waiting for its kind
#[derive(Debug, Default)]
struct Slot {
    kind: Option<AstKind>,
    comment: Option<String>,
    key_name: Option<String>,
    standalone_name: Option<String>,
}

/// Mutable arena used while parsing.
///
/// A slot is reserved before the children of its schema are parsed, so a
/// cyclic reference resolves to the reserved id. The slot is filled in place
/// once the children are done.
#[derive(Debug, Default)]
pub(crate) struct AstArena {
    slots: Vec<Slot>,
}

impl AstArena {
    pub(crate) fn reserve(&mut self) -> AstId {
        let id = AstId(self.slots.len() as u32);
        self.slots.push(Slot::default());
        id
    }

    /// Reserve and fill in one step, for nodes nothing can refer back to
    pub(crate) fn push(&mut self, kind: AstKind, key_name: Option<&str>) -> AstId {
        let id = self.reserve();
        self.describe(id, None, key_name, None);
        self.fill(id, kind);
        id
    }

    /// Set the metadata of a reserved slot. Comments already attached to the
    /// slot (by a parent while this node was pending) are kept after the
    /// node's own description.
    pub(crate) fn describe(
        &mut self,
        id: AstId,
        comment: Option<&str>,
        key_name: Option<&str>,
        standalone_name: Option<String>,
    ) {
        let slot = &mut self.slots[id.index()];
        slot.comment = join_comments(comment, slot.comment.take());
        slot.key_name = key_name.map(String::from);
        slot.standalone_name = standalone_name;
    }

    pub(crate) fn fill(&mut self, id: AstId, kind: AstKind) {
        self.slots[id.index()].kind = Some(kind);
    }

    pub(crate) fn standalone_name(&self, id: AstId) -> Option<&str> {
        self.slots[id.index()].standalone_name.as_deref()
    }

    /// Append a paragraph to a node's comment
    pub(crate) fn append_comment(&mut self, id: AstId, paragraph: String) {
        let slot = &mut self.slots[id.index()];
        slot.comment = join_comments(slot.comment.as_deref(), Some(paragraph));
    }

    /// Freeze the arena. Fails if any reserved slot was never filled.
    pub(crate) fn finish(self, root: AstId) -> Result<Ast> {
        let nodes = self
            .slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| {
                let kind = slot
                    .kind
                    .ok_or(SchemaError::UnfinishedNode(AstId(i as u32)))?;
                Ok(AstNode {
                    kind,
                    comment: slot.comment,
                    key_name: slot.key_name,
                    standalone_name: slot.standalone_name,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Ast { root, nodes })
    }
}

fn join_comments(first: Option<&str>, second: Option<String>) -> Option<String> {
    match (first, second) {
        (Some(a), Some(b)) => Some(format!("{}\n\n{}", a, b)),
        (Some(a), None) => Some(a.to_string()),
        (None, b) => b,
    }
}
