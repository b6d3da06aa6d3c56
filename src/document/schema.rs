//! Typed view of a single JSON Schema mapping.
//!
//! Child schemas are stored as [`NodeId`]s into the owning
//! [`SchemaDocument`](super::SchemaDocument), never inline, so one node can
//! be reached from many places (and from itself).

use indexmap::IndexMap;
use serde_json::Value;

use super::NodeId;

// =============================================================================
// Keyword Shapes
// =============================================================================

/// The `type` keyword: a single type name or a list of them
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSpec {
    Single(String),
    Many(Vec<String>),
}

impl TypeSpec {
    /// The single type name, if this is not a list
    pub fn single(&self) -> Option<&str> {
        match self {
            TypeSpec::Single(name) => Some(name),
            TypeSpec::Many(_) => None,
        }
    }
}

/// The `items` keyword
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Items {
    /// `items: {...}` - every element has this schema
    Single(NodeId),
    /// `items: [...]` - positional tuple
    Tuple(Vec<NodeId>),
}

/// The `additionalProperties` keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdditionalProperties {
    Allowed(bool),
    Schema(NodeId),
}

// =============================================================================
// Schema
// =============================================================================

/// A structural schema node.
///
/// Keywords the AST builder does not care about are kept in `extra`, in
/// document order, so that "has any keyword at all" stays answerable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub types: Option<TypeSpec>,

    /// Enum members, each a literal node
    pub enum_values: Option<Vec<NodeId>>,
    /// Labels parallel to `enum_values` (`tsEnumNames`)
    pub enum_names: Option<Vec<String>>,

    pub all_of: Option<Vec<NodeId>>,
    pub any_of: Option<Vec<NodeId>>,
    pub one_of: Option<Vec<NodeId>>,

    pub properties: Option<IndexMap<String, NodeId>>,
    pub pattern_properties: Option<IndexMap<String, NodeId>>,
    pub additional_properties: Option<AdditionalProperties>,
    pub required: Vec<String>,

    pub items: Option<Items>,
    pub extends: Option<Vec<NodeId>>,
    pub definitions: Option<IndexMap<String, NodeId>>,

    pub default: Option<Value>,

    /// `$ref` that the dereferencing pass could not resolve
    pub reference: Option<String>,

    pub extra: IndexMap<String, Value>,
}

impl Schema {
    /// A bare `{"type": name}` schema
    pub fn of_type(name: impl Into<String>) -> Self {
        Self {
            types: Some(TypeSpec::Single(name.into())),
            ..Self::default()
        }
    }

    /// True when the source mapping had no keywords at all
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn is_required(&self, key: &str) -> bool {
        self.required.iter().any(|k| k == key)
    }

    /// Every child node, in document order.
    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        let lists = [
            &self.enum_values,
            &self.all_of,
            &self.any_of,
            &self.one_of,
        ]
        .into_iter()
        .flatten()
        .flatten()
        .copied();

        let maps = [&self.properties, &self.pattern_properties]
            .into_iter()
            .flatten()
            .flat_map(|m| m.values().copied());

        let additional = match self.additional_properties {
            Some(AdditionalProperties::Schema(id)) => Some(id),
            _ => None,
        };

        let items: Vec<NodeId> = match &self.items {
            Some(Items::Single(id)) => vec![*id],
            Some(Items::Tuple(ids)) => ids.clone(),
            None => Vec::new(),
        };

        let extends = self.extends.iter().flatten().copied();
        let definitions = self.definitions.iter().flat_map(|m| m.values().copied());

        lists
            .chain(maps)
            .chain(additional)
            .chain(items)
            .chain(extends)
            .chain(definitions)
    }

    /// Rewrite every child id through `f`
    pub(crate) fn remap(&mut self, f: impl Fn(NodeId) -> NodeId) {
        for list in [
            &mut self.enum_values,
            &mut self.all_of,
            &mut self.any_of,
            &mut self.one_of,
            &mut self.extends,
        ]
        .into_iter()
        .flatten()
        {
            for id in list.iter_mut() {
                *id = f(*id);
            }
        }

        for map in [
            &mut self.properties,
            &mut self.pattern_properties,
            &mut self.definitions,
        ]
        .into_iter()
        .flatten()
        {
            for id in map.values_mut() {
                *id = f(*id);
            }
        }

        if let Some(AdditionalProperties::Schema(id)) = &mut self.additional_properties {
            *id = f(*id);
        }

        match &mut self.items {
            Some(Items::Single(id)) => *id = f(*id),
            Some(Items::Tuple(ids)) => ids.iter_mut().for_each(|id| *id = f(*id)),
            None => {}
        }
    }
}
