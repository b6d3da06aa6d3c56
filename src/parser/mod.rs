//! Schema -> AST Parser
//!
//! Recursive, memoized descent over a [`SchemaDocument`]:
//! - `processed` maps each schema node to its AST slot. The slot is reserved
//!   *before* the node's children are parsed, so a cycle back to an
//!   ancestor resolves to the ancestor's (still unfilled) slot.
//! - `extends` targets get their own cache: a supertype is always built as
//!   an interface, whatever the same node classifies as elsewhere.
//! - Names come from one [`NameAllocator`] shared by the whole parse.
//! - Definitions indexes are harvested lazily, once per distinct root.
//!
//! All of this state is created by [`parse_with`] and dropped when it
//! returns; nothing is shared between two parses.

pub mod definitions;
pub mod names;

mod interface;
mod literal;

pub use definitions::DefinitionsIndex;
pub use names::{to_safe_name, NameAllocator};

use std::collections::HashMap;
use tracing::{debug, trace};

use crate::ast::{Ast, AstArena, AstId, AstKind, EnumMember};
use crate::classify::{Classify, JsonSchemaClassifier, SchemaKind};
use crate::config::ParseOptions;
use crate::document::{Items, NodeId, Schema, SchemaDocument, SchemaNode, TypeSpec};
use crate::error::{Result, SchemaError};

// =============================================================================
// Public API
// =============================================================================

/// Parse a document from its root with the default classifier
pub fn parse(document: &SchemaDocument, options: &ParseOptions) -> Result<Ast> {
    parse_with(document, document.root(), &JsonSchemaClassifier, options)
}

/// Parse from `root` with a caller-supplied classifier
pub fn parse_with<C: Classify + ?Sized>(
    document: &SchemaDocument,
    root: NodeId,
    classifier: &C,
    options: &ParseOptions,
) -> Result<Ast> {
    debug!(%root, nodes = document.len(), "parsing schema document");

    let mut parser = Parser::new(document, classifier, options);
    let root_ast = parser.parse(root, root, None)?;
    let ast = parser.arena.finish(root_ast)?;

    debug!(
        ast_nodes = ast.len(),
        declarations = ast.declarations().count(),
        "parsed schema document"
    );
    Ok(ast)
}

// =============================================================================
// Parser
// =============================================================================

/// Grow the stack when less than this much is left
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment
const STACK_PER_RECURSION: usize = 2 * 1024 * 1024;

/// Run `f` on a stack with room for at least one more level of descent.
///
/// Parsing recurses once per document level; deep documents continue on
/// heap-allocated segments instead of overflowing the thread's stack.
pub(crate) fn ensure_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// State of one parse invocation
pub(crate) struct Parser<'a, C: Classify + ?Sized> {
    document: &'a SchemaDocument,
    classifier: &'a C,
    options: &'a ParseOptions,

    /// Schema node -> its AST slot (cycle breaking and sharing)
    processed: HashMap<NodeId, AstId>,

    /// `extends` target -> the interface built for it. Kept apart from
    /// `processed` so a node's classified shape never depends on whether it
    /// was first reached as a supertype.
    super_types: HashMap<NodeId, AstId>,

    /// Used names and id -> name
    names: NameAllocator,

    /// Root -> definitions harvested below it
    definitions: HashMap<NodeId, DefinitionsIndex>,

    arena: AstArena,
}

impl<'a, C: Classify + ?Sized> Parser<'a, C> {
    pub(crate) fn new(
        document: &'a SchemaDocument,
        classifier: &'a C,
        options: &'a ParseOptions,
    ) -> Self {
        Self {
            document,
            classifier,
            options,
            processed: HashMap::new(),
            super_types: HashMap::new(),
            names: NameAllocator::new(),
            definitions: HashMap::new(),
            arena: AstArena::default(),
        }
    }

    /// Parse `node`, or return the slot it already owns
    pub(crate) fn parse(
        &mut self,
        node: NodeId,
        root: NodeId,
        key_name: Option<&str>,
    ) -> Result<AstId> {
        ensure_stack(|| self.parse_node(node, root, key_name))
    }

    fn parse_node(&mut self, node: NodeId, root: NodeId, key_name: Option<&str>) -> Result<AstId> {
        if let Some(&ast) = self.processed.get(&node) {
            trace!(%node, %ast, "reusing processed node");
            return Ok(ast);
        }

        let document = self.document;
        let entry = document.get(node).ok_or(SchemaError::UnknownNode(node))?;
        let definition_key = self.definition_key(root, node);

        let slot = self.arena.reserve();
        self.processed.insert(node, slot);

        match entry {
            SchemaNode::Literal(value) => {
                self.parse_literal(slot, value, key_name, definition_key.as_deref())
            }
            SchemaNode::Schema(schema) => self.parse_schema(
                slot,
                node,
                schema,
                root,
                key_name,
                definition_key.as_deref(),
            )?,
        }

        Ok(slot)
    }

    /// Fill `slot` from a structural schema.
    ///
    /// `origin` is the node diagnostics point at; for synthetic schemas it
    /// is the node they were derived from.
    fn parse_schema(
        &mut self,
        slot: AstId,
        origin: NodeId,
        schema: &Schema,
        root: NodeId,
        key_name: Option<&str>,
        definition_key: Option<&str>,
    ) -> Result<()> {
        let kind = self.classifier.classify(schema);
        trace!(node = %origin, ?kind, "classified schema");

        match kind {
            SchemaKind::Reference => {
                let reference = schema.reference.as_deref().unwrap_or_default();
                return Err(self.unresolved(origin, reference));
            }

            SchemaKind::NamedSchema => self.build_interface(slot, schema, root, key_name, None)?,
            SchemaKind::UnnamedSchema => {
                self.build_interface(slot, schema, root, key_name, definition_key)?
            }

            SchemaKind::AllOf => {
                self.describe(slot, schema, key_name, definition_key);
                let members = self.parse_each(schema.all_of.as_deref(), root)?;
                self.arena.fill(slot, AstKind::Intersection { members });
            }
            SchemaKind::AnyOf => {
                self.describe(slot, schema, key_name, definition_key);
                let members = self.parse_each(schema.any_of.as_deref(), root)?;
                self.arena.fill(slot, AstKind::Union { members });
            }
            SchemaKind::OneOf => {
                self.describe(slot, schema, key_name, definition_key);
                let members = self.parse_each(schema.one_of.as_deref(), root)?;
                self.arena.fill(slot, AstKind::Union { members });
            }
            SchemaKind::TypeUnion => {
                self.describe(slot, schema, key_name, definition_key);
                let members = self.parse_type_union(origin, schema, root)?;
                self.arena.fill(slot, AstKind::Union { members });
            }

            SchemaKind::NamedEnum => {
                self.build_enum(slot, origin, schema, root, key_name, definition_key)?
            }
            SchemaKind::UnnamedEnum => {
                self.describe(slot, schema, key_name, definition_key);
                let members = self.parse_each(schema.enum_values.as_deref(), root)?;
                self.arena.fill(slot, AstKind::Union { members });
            }

            SchemaKind::TypedArray => {
                self.describe(slot, schema, key_name, definition_key);
                let kind = match &schema.items {
                    Some(Items::Tuple(items)) => AstKind::Tuple {
                        elements: self.parse_each(Some(items.as_slice()), root)?,
                    },
                    Some(Items::Single(item)) => AstKind::Array {
                        element: self.parse(*item, root, None)?,
                    },
                    None => AstKind::Array {
                        element: self.arena.push(AstKind::Any, None),
                    },
                };
                self.arena.fill(slot, kind);
            }
            SchemaKind::UntypedArray => {
                self.describe(slot, schema, key_name, definition_key);
                let element = self.arena.push(AstKind::Any, None);
                self.arena.fill(slot, AstKind::Array { element });
            }

            SchemaKind::Any => self.leaf(slot, schema, key_name, definition_key, AstKind::Any),
            SchemaKind::Boolean => {
                self.leaf(slot, schema, key_name, definition_key, AstKind::Boolean)
            }
            SchemaKind::Null => self.leaf(slot, schema, key_name, definition_key, AstKind::Null),
            SchemaKind::Number => {
                self.leaf(slot, schema, key_name, definition_key, AstKind::Number)
            }
            SchemaKind::String => {
                self.leaf(slot, schema, key_name, definition_key, AstKind::String)
            }
        }

        Ok(())
    }

    /// Enums are always declared, so they get a name even without a title,
    /// id or definitions key.
    fn build_enum(
        &mut self,
        slot: AstId,
        origin: NodeId,
        schema: &Schema,
        root: NodeId,
        key_name: Option<&str>,
        definition_key: Option<&str>,
    ) -> Result<()> {
        let values = schema.enum_values.as_deref().unwrap_or_default();
        let labels = schema.enum_names.as_deref().unwrap_or_default();

        if values.len() != labels.len() {
            return Err(SchemaError::EnumNamesMismatch {
                node: origin,
                location: self.document.location(origin),
                values: values.len(),
                names: labels.len(),
            });
        }

        let name = self.names.allocate_forced(
            schema.id.as_deref(),
            schema.title.as_deref(),
            definition_key.or(key_name),
        );
        debug!(node = %origin, name = %name, members = values.len(), "building enum");
        self.arena
            .describe(slot, schema.description.as_deref(), key_name, Some(name));

        let mut members = Vec::with_capacity(values.len());
        for (&value, label) in values.iter().zip(labels) {
            members.push(EnumMember {
                label: label.clone(),
                ast: self.parse(value, root, None)?,
            });
        }

        self.arena.fill(slot, AstKind::Enum { members });
        Ok(())
    }

    /// `type: [a, b]` parses each entry as a fresh `{type: a}` schema
    fn parse_type_union(
        &mut self,
        origin: NodeId,
        schema: &Schema,
        root: NodeId,
    ) -> Result<Vec<AstId>> {
        let Some(TypeSpec::Many(types)) = &schema.types else {
            return Ok(Vec::new());
        };

        types
            .iter()
            .map(|name| {
                let slot = self.arena.reserve();
                self.parse_schema(slot, origin, &Schema::of_type(name.as_str()), root, None, None)?;
                Ok(slot)
            })
            .collect()
    }

    fn parse_each(&mut self, nodes: Option<&[NodeId]>, root: NodeId) -> Result<Vec<AstId>> {
        nodes
            .unwrap_or_default()
            .iter()
            .map(|&node| self.parse(node, root, None))
            .collect()
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    /// Allocate the node's standalone name and record its metadata
    fn describe(
        &mut self,
        slot: AstId,
        schema: &Schema,
        key_name: Option<&str>,
        fallback: Option<&str>,
    ) {
        let name = self.standalone_name(schema, fallback);
        self.arena
            .describe(slot, schema.description.as_deref(), key_name, name);
    }

    fn leaf(
        &mut self,
        slot: AstId,
        schema: &Schema,
        key_name: Option<&str>,
        fallback: Option<&str>,
        kind: AstKind,
    ) {
        self.describe(slot, schema, key_name, fallback);
        self.arena.fill(slot, kind);
    }

    fn standalone_name(&mut self, schema: &Schema, fallback: Option<&str>) -> Option<String> {
        let name = self
            .names
            .allocate(schema.id.as_deref(), schema.title.as_deref(), fallback);
        if let Some(name) = &name {
            debug!(name = %name, "allocated standalone name");
        }
        name
    }

    fn definition_key(&mut self, root: NodeId, node: NodeId) -> Option<String> {
        let document = self.document;
        self.definitions
            .entry(root)
            .or_insert_with(|| DefinitionsIndex::harvest(document, root))
            .key_of(node)
            .map(String::from)
    }

    fn unresolved(&self, node: NodeId, reference: &str) -> SchemaError {
        SchemaError::UnresolvedReference {
            node,
            location: self.document.location(node),
            reference: reference.to_string(),
        }
    }
}
