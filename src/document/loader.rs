//! JSON Loader
//!
//! Turns a `serde_json::Value` into a [`SchemaDocument`]:
//! - one schema node per schema position, one literal node per enum member
//! - every node remembers the JSON pointer it came from
//! - local `$ref`s (`#`, `#/definitions/Foo`, ...) are replaced by the
//!   identity of their target, which is where sharing and cycles come from
//!
//! Remote, dangling, or looping `$ref`s are left in place as
//! [`Schema::reference`]; the parser rejects them.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, trace};

use super::{
    AdditionalProperties, DocumentBuilder, Items, NodeId, Schema, SchemaDocument, SchemaNode,
    TypeSpec,
};
use crate::error::Result;
use crate::parser::ensure_stack;

impl SchemaDocument {
    /// Load and dereference a parsed JSON value
    pub fn from_value(value: &Value) -> Self {
        load(value)
    }

    pub fn from_json_str(source: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(source)?;
        Ok(load(&value))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_json_str(&source)
    }
}

/// Load a JSON schema, resolving local references to shared node identities
pub fn load(value: &Value) -> SchemaDocument {
    let mut loader = Loader::default();
    let root = loader.load_schema(value, "");
    loader.finish(root)
}

// =============================================================================
// Loader
// =============================================================================

#[derive(Default)]
struct Loader {
    builder: DocumentBuilder,
    /// JSON pointer -> node loaded at that position
    by_pointer: HashMap<String, NodeId>,
    /// `$ref` nodes waiting for resolution
    pending: Vec<(NodeId, String)>,
}

impl Loader {
    fn load_schema(&mut self, value: &Value, pointer: &str) -> NodeId {
        ensure_stack(|| self.load_node(value, pointer))
    }

    fn load_node(&mut self, value: &Value, pointer: &str) -> NodeId {
        let id = self.builder.push(
            SchemaNode::Schema(Schema::default()),
            Some(pointer.to_string()),
        );
        self.by_pointer.insert(pointer.to_string(), id);

        // `true`, `false` and other non-mappings load as the empty schema
        let Some(object) = value.as_object() else {
            return id;
        };

        // Siblings of a `$ref` are still loaded so pointers into them resolve;
        // once resolved, the target replaces the whole node.
        let schema = self.load_keywords(object, pointer);
        if let Some(reference) = &schema.reference {
            self.pending.push((id, reference.clone()));
        }
        self.builder.set(id, SchemaNode::Schema(schema));
        id
    }

    fn load_literal(&mut self, value: &Value, pointer: &str) -> NodeId {
        let id = self
            .builder
            .push(SchemaNode::Literal(value.clone()), Some(pointer.to_string()));
        self.by_pointer.insert(pointer.to_string(), id);
        id
    }

    fn load_keywords(&mut self, object: &Map<String, Value>, pointer: &str) -> Schema {
        let mut schema = Schema::default();

        for (key, value) in object {
            let here = child_pointer(pointer, key);

            match (key.as_str(), value) {
                ("$ref", Value::String(s)) => schema.reference = Some(s.clone()),
                ("id" | "$id", Value::String(s)) => schema.id = Some(s.clone()),
                ("title", Value::String(s)) => schema.title = Some(s.clone()),
                ("description", Value::String(s)) => schema.description = Some(s.clone()),

                ("type", Value::String(s)) => schema.types = Some(TypeSpec::Single(s.clone())),
                ("type", Value::Array(names)) => {
                    schema.types = Some(TypeSpec::Many(strings(names)));
                }

                ("enum", Value::Array(values)) => {
                    let members = values
                        .iter()
                        .enumerate()
                        .map(|(i, v)| self.load_literal(v, &child_pointer(&here, &i.to_string())))
                        .collect();
                    schema.enum_values = Some(members);
                }
                ("tsEnumNames", Value::Array(names)) => schema.enum_names = Some(strings(names)),

                ("allOf", Value::Array(members)) => {
                    schema.all_of = Some(self.load_list(members, &here));
                }
                ("anyOf", Value::Array(members)) => {
                    schema.any_of = Some(self.load_list(members, &here));
                }
                ("oneOf", Value::Array(members)) => {
                    schema.one_of = Some(self.load_list(members, &here));
                }

                ("properties", Value::Object(map)) => {
                    schema.properties = Some(self.load_map(map, &here));
                }
                ("patternProperties", Value::Object(map)) => {
                    schema.pattern_properties = Some(self.load_map(map, &here));
                }
                ("definitions" | "$defs", Value::Object(map)) => {
                    let loaded = self.load_map(map, &here);
                    schema
                        .definitions
                        .get_or_insert_with(IndexMap::new)
                        .extend(loaded);
                }

                ("additionalProperties", Value::Bool(allowed)) => {
                    schema.additional_properties = Some(AdditionalProperties::Allowed(*allowed));
                }
                ("additionalProperties", Value::Object(_)) => {
                    let id = self.load_schema(value, &here);
                    schema.additional_properties = Some(AdditionalProperties::Schema(id));
                }

                ("items", Value::Array(items)) => {
                    schema.items = Some(Items::Tuple(self.load_list(items, &here)));
                }
                ("items", Value::Object(_) | Value::Bool(_)) => {
                    schema.items = Some(Items::Single(self.load_schema(value, &here)));
                }

                ("required", Value::Array(keys)) => schema.required = strings(keys),

                ("extends", Value::Array(parents)) => {
                    schema.extends = Some(self.load_list(parents, &here));
                }
                ("extends", Value::Object(_)) => {
                    schema.extends = Some(vec![self.load_schema(value, &here)]);
                }

                ("default", _) => schema.default = Some(value.clone()),

                _ => {
                    schema.extra.insert(key.clone(), value.clone());
                }
            }
        }

        schema
    }

    fn load_list(&mut self, values: &[Value], pointer: &str) -> Vec<NodeId> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| self.load_schema(v, &child_pointer(pointer, &i.to_string())))
            .collect()
    }

    fn load_map(&mut self, map: &Map<String, Value>, pointer: &str) -> IndexMap<String, NodeId> {
        map.iter()
            .map(|(key, v)| (key.clone(), self.load_schema(v, &child_pointer(pointer, key))))
            .collect()
    }

    /// Resolve pending references and freeze the document
    fn finish(mut self, root: NodeId) -> SchemaDocument {
        let mut redirects: HashMap<NodeId, NodeId> = HashMap::new();

        for (node, reference) in &self.pending {
            let target = reference
                .strip_prefix('#')
                .and_then(|fragment| self.by_pointer.get(fragment));

            match target {
                Some(&target) => {
                    trace!(%node, %target, reference = %reference, "resolved local $ref");
                    redirects.insert(*node, target);
                }
                None => debug!(%node, reference = %reference, "leaving $ref unresolved"),
            }
        }

        let resolve = |id: NodeId| follow(&redirects, id);
        for node in self.builder.nodes_mut() {
            if let SchemaNode::Schema(schema) = node {
                schema.remap(&resolve);
            }
        }

        self.builder.build(resolve(root))
    }
}

/// Follow a redirect chain. A chain that loops back on itself stays at its
/// starting `$ref` node so the parser can report it.
fn follow(redirects: &HashMap<NodeId, NodeId>, start: NodeId) -> NodeId {
    let mut current = start;
    let mut seen = HashSet::new();

    while let Some(&next) = redirects.get(&current) {
        if !seen.insert(current) {
            return start;
        }
        current = next;
    }

    current
}

fn child_pointer(parent: &str, token: &str) -> String {
    format!("{}/{}", parent, token.replace('~', "~0").replace('/', "~1"))
}

fn strings(values: &[Value]) -> Vec<String> {
    values
        .iter()
        .filter_map(|v| v.as_str().map(String::from))
        .collect()
}
