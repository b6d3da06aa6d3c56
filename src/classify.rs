//! Schema Classification
//!
//! Decides WHICH builder handles a schema node. This is pure shape
//! detection - no names, no recursion, no AST. The parser calls the
//! classifier once per structural node and matches the result exhaustively.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::{Schema, TypeSpec};

// =============================================================================
// Schema Kind
// =============================================================================

/// Structural kind of a schema node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemaKind {
    /// `{"allOf": [...]}`
    AllOf,
    /// `{"anyOf": [...]}`
    AnyOf,
    /// `{"oneOf": [...]}`
    OneOf,
    /// `{"type": ["string", "null"]}`
    TypeUnion,
    /// `{}` or `{"type": "any"}`
    Any,
    Boolean,
    Null,
    /// `number` or `integer`
    Number,
    String,
    /// `enum` with a parallel `tsEnumNames` label list
    NamedEnum,
    /// `enum` without labels
    UnnamedEnum,
    /// Object-like schema carrying its own `id` or `title`
    NamedSchema,
    /// Object-like schema with no name of its own
    UnnamedSchema,
    /// `{"items": ...}`
    TypedArray,
    /// `{"type": "array"}` without `items`
    UntypedArray,
    /// `$ref` the dereferencing pass left behind
    Reference,
}

/// Classifies a single schema node
pub trait Classify {
    fn classify(&self, schema: &Schema) -> SchemaKind;
}

// =============================================================================
// Default Classifier
// =============================================================================

/// Keyword-precedence classifier for JSON Schema (draft 3/4 keywords plus
/// `tsEnumNames`)
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaClassifier;

impl Classify for JsonSchemaClassifier {
    fn classify(&self, schema: &Schema) -> SchemaKind {
        if schema.reference.is_some() {
            return SchemaKind::Reference;
        }
        if schema.all_of.is_some() {
            return SchemaKind::AllOf;
        }
        if schema.any_of.is_some() {
            return SchemaKind::AnyOf;
        }
        if schema.one_of.is_some() {
            return SchemaKind::OneOf;
        }

        if matches!(schema.types, Some(TypeSpec::Many(_))) {
            return SchemaKind::TypeUnion;
        }
        let single_type = schema.types.as_ref().and_then(TypeSpec::single);

        if single_type == Some("null") {
            return SchemaKind::Null;
        }
        if schema.items.is_some() {
            return SchemaKind::TypedArray;
        }
        if schema.enum_values.is_some() {
            return if schema.enum_names.is_some() {
                SchemaKind::NamedEnum
            } else {
                SchemaKind::UnnamedEnum
            };
        }

        match single_type {
            Some("string") => return SchemaKind::String,
            Some("number") | Some("integer") => return SchemaKind::Number,
            Some("boolean") => return SchemaKind::Boolean,
            Some("array") => return SchemaKind::UntypedArray,
            Some("any") => return SchemaKind::Any,
            _ => {}
        }

        // Untyped schema: fall back on the type of its default value
        match &schema.default {
            Some(Value::Bool(_)) => return SchemaKind::Boolean,
            Some(Value::Number(_)) => return SchemaKind::Number,
            Some(Value::String(_)) => return SchemaKind::String,
            _ => {}
        }

        if schema.id.is_some() || schema.title.is_some() {
            SchemaKind::NamedSchema
        } else if !schema.is_empty() {
            SchemaKind::UnnamedSchema
        } else {
            SchemaKind::Any
        }
    }
}
