//! Interface construction: properties, pattern properties, harvested
//! definitions, the index signature, and supertypes.

use tracing::debug;

use super::{ensure_stack, Parser};
use crate::ast::{AstId, AstKind, InterfaceParam, INDEX_SIGNATURE_KEY};
use crate::classify::Classify;
use crate::document::{AdditionalProperties, NodeId, Schema, SchemaNode};
use crate::error::{Result, SchemaError};

/// Parent label for cross-reference comments on nameless interfaces
const ANONYMOUS: &str = "anonymous";

impl<'a, C: Classify + ?Sized> Parser<'a, C> {
    /// Fill `slot` with an interface built from `schema`.
    ///
    /// The name is allocated and written to the slot before any member is
    /// parsed, so members that cycle back see it.
    pub(super) fn build_interface(
        &mut self,
        slot: AstId,
        schema: &Schema,
        root: NodeId,
        key_name: Option<&str>,
        fallback: Option<&str>,
    ) -> Result<()> {
        let name = self.standalone_name(schema, fallback);
        self.arena
            .describe(slot, schema.description.as_deref(), key_name, name.clone());

        let parent = name.as_deref().or(key_name).unwrap_or(ANONYMOUS);
        debug!(interface = parent, "building interface");

        let params = self.parse_params(schema, root, parent)?;
        let super_types = self.parse_super_types(schema)?;

        self.arena.fill(slot, AstKind::Interface { params, super_types });
        Ok(())
    }

    /// Members in declaration order: properties, pattern properties,
    /// harvested definitions, then the index signature.
    fn parse_params(
        &mut self,
        schema: &Schema,
        root: NodeId,
        parent: &str,
    ) -> Result<Vec<InterfaceParam>> {
        let mut params = Vec::new();

        for (key, &node) in schema.properties.iter().flatten() {
            let ast = self.parse(node, root, Some(key.as_str()))?;
            params.push(InterfaceParam {
                ast,
                key_name: key.clone(),
                is_required: schema.is_required(key),
                is_pattern_property: false,
                is_unreachable_definition: false,
            });
        }

        for (key, &node) in schema.pattern_properties.iter().flatten() {
            let ast = self.parse(node, root, Some(key.as_str()))?;
            self.arena.append_comment(ast, cross_reference(parent, "patternProperty", key));
            params.push(InterfaceParam {
                ast,
                key_name: key.clone(),
                is_required: schema.is_required(key),
                is_pattern_property: true,
                is_unreachable_definition: false,
            });
        }

        if self.options.unreachable_definitions {
            for (key, &node) in schema.definitions.iter().flatten() {
                let ast = self.parse(node, root, Some(key.as_str()))?;
                self.arena.append_comment(ast, cross_reference(parent, "definition", key));
                params.push(InterfaceParam {
                    ast,
                    key_name: key.clone(),
                    is_required: schema.is_required(key),
                    is_pattern_property: false,
                    is_unreachable_definition: true,
                });
            }
        }

        let index_signature = match &schema.additional_properties {
            None | Some(AdditionalProperties::Allowed(true)) => {
                Some(self.arena.push(AstKind::Any, Some(INDEX_SIGNATURE_KEY)))
            }
            Some(AdditionalProperties::Allowed(false)) => None,
            Some(AdditionalProperties::Schema(node)) => {
                Some(self.parse(*node, root, Some(INDEX_SIGNATURE_KEY))?)
            }
        };

        if let Some(ast) = index_signature {
            params.push(InterfaceParam {
                ast,
                key_name: INDEX_SIGNATURE_KEY.to_string(),
                is_required: true,
                is_pattern_property: false,
                is_unreachable_definition: false,
            });
        }

        Ok(params)
    }

    fn parse_super_types(&mut self, schema: &Schema) -> Result<Vec<AstId>> {
        schema
            .extends
            .iter()
            .flatten()
            .map(|&node| self.parse_super_type(node))
            .collect()
    }

    /// Parse an `extends` target as a named interface rooted at itself.
    ///
    /// Supertypes have their own cache, so the same node reached as a
    /// property still gets its classified shape there. The interface must
    /// carry a standalone name.
    fn parse_super_type(&mut self, node: NodeId) -> Result<AstId> {
        let ast = match self.super_types.get(&node) {
            Some(&ast) => ast,
            None => ensure_stack(|| self.build_super_type(node))?,
        };

        if self.arena.standalone_name(ast).is_none() {
            return Err(self.unnamed_super_type(node));
        }
        Ok(ast)
    }

    fn build_super_type(&mut self, node: NodeId) -> Result<AstId> {
        let document = self.document;
        let schema = match document.get(node) {
            Some(SchemaNode::Schema(schema)) => schema,
            Some(SchemaNode::Literal(_)) => return Err(self.unnamed_super_type(node)),
            None => return Err(SchemaError::UnknownNode(node)),
        };
        if let Some(reference) = &schema.reference {
            return Err(self.unresolved(node, reference));
        }

        // Registered before building, so `extends` cycles find the slot
        let slot = self.arena.reserve();
        self.super_types.insert(node, slot);
        self.build_interface(slot, schema, node, None, None)?;
        Ok(slot)
    }

    fn unnamed_super_type(&self, node: NodeId) -> SchemaError {
        SchemaError::UnnamedSupertype {
            node,
            location: self.document.location(node),
        }
    }
}

fn cross_reference(parent: &str, via: &str, key: &str) -> String {
    format!(
        "This interface was referenced by `{}`'s JSON-Schema definition\nvia the `{}` \"{}\".",
        parent, via, key
    )
}
