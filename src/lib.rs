//! schema-ast
//!
//! Turns a JSON Schema document into a typed AST that a code generator can
//! render into type declarations (interfaces, unions, enums, ...).
//!
//! ## Features
//!
//! - **Shared identity**: local `$ref`s become shared nodes, so recursive
//!   schemas produce recursive ASTs instead of infinite ones
//! - **Stable naming**: every declared node gets a document-unique name
//!   derived from its title, id, property key or definitions key
//! - **Faithful objects**: required, pattern and index-signature members are
//!   kept apart, in declaration order
//!
//! ## Pipeline
//!
//! ```text
//! JSON ──loader──▶ SchemaDocument ──parser(classify)──▶ Ast ──▶ renderer
//!                  (NodeId arena)                        (AstId arena)
//! ```
//!
//! ## Example
//!
//! ```
//! use schema_ast::{parse, ParseOptions, SchemaDocument};
//!
//! let doc = SchemaDocument::from_json_str(r#"{
//!     "title": "Person",
//!     "properties": { "name": { "type": "string" } },
//!     "required": ["name"]
//! }"#).unwrap();
//!
//! let ast = parse(&doc, &ParseOptions::default()).unwrap();
//! assert_eq!(ast.root_node().standalone_name.as_deref(), Some("Person"));
//! ```

pub mod ast;
pub mod classify;
pub mod config;
pub mod document;
pub mod error;
pub mod parser;

pub use ast::{Ast, AstId, AstKind, AstNode, EnumMember, InterfaceParam};
pub use classify::{Classify, JsonSchemaClassifier, SchemaKind};
pub use config::{OutputFormat, ParseOptions, SchemaAstConfig};
pub use document::{NodeId, Schema, SchemaDocument, SchemaNode};
pub use error::{Result, SchemaError};
pub use parser::{parse, parse_with};
