//! Error types for schema loading and AST construction

use thiserror::Error;

use crate::ast::AstId;
use crate::document::NodeId;

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Fatal conditions. Any of these aborts the whole parse; there is no partial AST.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error(
        "Unresolved reference {reference:?} at {location}: \
         references must be dereferenced before parsing"
    )]
    UnresolvedReference {
        node: NodeId,
        location: String,
        reference: String,
    },

    #[error("Supertype at {location} has no standalone name (give it a title or id)")]
    UnnamedSupertype { node: NodeId, location: String },

    #[error("Enum at {location} has {values} values but {names} tsEnumNames")]
    EnumNamesMismatch {
        node: NodeId,
        location: String,
        values: usize,
        names: usize,
    },

    #[error("Schema node {0} does not belong to this document")]
    UnknownNode(NodeId),

    #[error("AST node {0} was reserved but never filled")]
    UnfinishedNode(AstId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] config_crate::ConfigError),
}
