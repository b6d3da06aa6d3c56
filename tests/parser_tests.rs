//! Parser Integration Tests
//!
//! End-to-end: JSON fixture -> SchemaDocument -> Ast. Covers naming,
//! recursion, member ordering and the fatal error paths.

use schema_ast::ast::INDEX_SIGNATURE_KEY;
use schema_ast::{
    parse, parse_with, Ast, AstId, AstKind, Classify, JsonSchemaClassifier, ParseOptions, Schema,
    SchemaDocument, SchemaError, SchemaKind,
};

fn load(source: &str) -> SchemaDocument {
    SchemaDocument::from_json_str(source).unwrap()
}

fn parse_fixture(source: &str) -> Ast {
    parse(&load(source), &ParseOptions::default()).unwrap()
}

/// The member of the root interface stored under `key`
fn member(ast: &Ast, owner: AstId, key: &str) -> AstId {
    ast[owner]
        .params()
        .iter()
        .find(|p| p.key_name == key)
        .unwrap_or_else(|| panic!("no member {:?}", key))
        .ast
}

fn member_keys(ast: &Ast, owner: AstId) -> Vec<&str> {
    ast[owner]
        .params()
        .iter()
        .map(|p| p.key_name.as_str())
        .collect()
}

fn declared_names(ast: &Ast) -> Vec<&str> {
    ast.declarations()
        .filter_map(|(_, node)| node.standalone_name.as_deref())
        .collect()
}

// =============================================================================
// Basic Shapes
// =============================================================================

#[test]
fn test_person() {
    let ast = parse_fixture(include_str!("fixtures/person.json"));
    let root = ast.root();

    assert_eq!(ast[root].standalone_name.as_deref(), Some("Person"));
    assert_eq!(ast[root].comment.as_deref(), Some("A person record"));
    assert_eq!(member_keys(&ast, root), ["name", "age", "address", "tags"]);

    assert_eq!(ast[member(&ast, root, "name")].kind, AstKind::String);

    let age = member(&ast, root, "age");
    assert_eq!(ast[age].kind, AstKind::Number);
    assert_eq!(ast[age].comment.as_deref(), Some("Age in years"));
    assert_eq!(ast[age].key_name.as_deref(), Some("age"));

    let AstKind::Array { element } = ast[member(&ast, root, "tags")].kind else {
        panic!("tags should be an array");
    };
    assert_eq!(ast[element].kind, AstKind::String);
}

#[test]
fn test_definition_key_names_referenced_schema() {
    let ast = parse_fixture(include_str!("fixtures/person.json"));
    let address = member(&ast, ast.root(), "address");

    assert_eq!(ast[address].standalone_name.as_deref(), Some("Address"));
    assert_eq!(ast[address].key_name.as_deref(), Some("address"));
    assert_eq!(member_keys(&ast, address), ["street", "city", INDEX_SIGNATURE_KEY]);
    assert_eq!(declared_names(&ast), ["Person", "Address"]);
}

#[test]
fn test_required_fidelity() {
    let ast = parse_fixture(include_str!("fixtures/person.json"));
    let root = ast.root();

    let required: Vec<_> = ast[root]
        .params()
        .iter()
        .filter(|p| p.is_required)
        .map(|p| p.key_name.as_str())
        .collect();
    assert_eq!(required, ["name"]);

    let address = member(&ast, root, "address");
    let params = ast[address].params();
    assert!(params[0].is_required);
    assert!(!params[1].is_required);
}

// =============================================================================
// Recursion
// =============================================================================

#[test]
fn test_self_recursive_root() {
    let ast = parse_fixture(include_str!("fixtures/tree.json"));
    let root = ast.root();

    let children = member(&ast, root, "children");
    assert_eq!(ast[children].kind, AstKind::Array { element: root });
    assert_eq!(declared_names(&ast), ["Tree"]);
}

#[test]
fn test_recursive_definition() {
    let ast = parse_fixture(include_str!("fixtures/linked_list.json"));

    let node = member(&ast, ast.root(), "head");
    assert_eq!(ast[node].standalone_name.as_deref(), Some("ListNode"));
    assert_eq!(member(&ast, node, "next"), node);
    assert_eq!(declared_names(&ast), ["ListNode"]);
}

#[test]
fn test_cyclic_super_types() {
    let ast = parse_fixture(include_str!("fixtures/extends_cycle.json"));

    let a = member(&ast, ast.root(), "a");
    assert_eq!(ast[a].standalone_name.as_deref(), Some("A"));

    let [b] = ast[a].super_types() else {
        panic!("A should have one supertype");
    };
    assert_eq!(ast[*b].standalone_name.as_deref(), Some("B"));
    assert_eq!(ast[*b].super_types(), [a]);
    assert_eq!(member_keys(&ast, *b), ["fromB"]);
}

#[test]
fn test_deep_definition_chain() {
    const DEPTH: usize = 3000;

    let mut definitions = serde_json::Map::new();
    for i in 0..DEPTH {
        let mut properties = serde_json::Map::new();
        if i + 1 < DEPTH {
            let next = format!("#/definitions/D{}", i + 1);
            properties.insert("next".to_string(), serde_json::json!({ "$ref": next }));
        }
        definitions.insert(
            format!("D{}", i),
            serde_json::json!({ "type": "object", "properties": properties }),
        );
    }
    let value = serde_json::json!({
        "title": "Chain",
        "properties": { "head": { "$ref": "#/definitions/D0" } },
        "definitions": definitions
    });

    let ast = parse(&SchemaDocument::from_value(&value), &ParseOptions::default()).unwrap();

    let mut current = member(&ast, ast.root(), "head");
    for i in 0..DEPTH - 1 {
        assert_eq!(ast[current].standalone_name, Some(format!("D{}", i)));
        current = member(&ast, current, "next");
    }
    assert_eq!(ast[current].standalone_name.as_deref(), Some("D2999"));
    assert!(member_keys(&ast, current).iter().all(|&key| key != "next"));
}

#[test]
fn test_deterministic() {
    for source in [
        include_str!("fixtures/person.json"),
        include_str!("fixtures/extends_cycle.json"),
        include_str!("fixtures/name_collisions.json"),
    ] {
        let doc = load(source);
        let first = parse(&doc, &ParseOptions::default()).unwrap();
        let second = parse(&doc, &ParseOptions::default()).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}

// =============================================================================
// Naming
// =============================================================================

#[test]
fn test_name_uniqueness() {
    let ast = parse_fixture(include_str!("fixtures/name_collisions.json"));
    let root = ast.root();

    let name = |key: &str| ast[member(&ast, root, key)].standalone_name.clone();
    assert_eq!(name("first").as_deref(), Some("Thing"));
    assert_eq!(name("second").as_deref(), Some("Thing1"));
    assert_eq!(name("third").as_deref(), Some("Thing2"));

    // Same id, same name, even with a different title
    assert_eq!(name("left").as_deref(), Some("Shared"));
    assert_eq!(name("right").as_deref(), Some("Shared"));
    assert_ne!(member(&ast, root, "left"), member(&ast, root, "right"));
}

// =============================================================================
// Members
// =============================================================================

#[test]
fn test_member_ordering() {
    let ast = parse_fixture(include_str!("fixtures/ordering.json"));
    let root = ast.root();
    let params = ast[root].params();

    assert_eq!(member_keys(&ast, root), ["a", "b", "^x", INDEX_SIGNATURE_KEY]);
    assert!(params[2].is_pattern_property);
    assert!(params[3].is_index_signature());
    assert!(params[3].is_required);
    assert_eq!(ast[params[3].ast].kind, AstKind::String);
    assert_eq!(ast[params[3].ast].key_name.as_deref(), Some(INDEX_SIGNATURE_KEY));
}

#[test]
fn test_additional_properties_tri_state() {
    let base = |additional: serde_json::Value| {
        let mut schema = serde_json::json!({
            "type": "object",
            "properties": { "a": { "type": "string" } }
        });
        if !additional.is_null() {
            schema["additionalProperties"] = additional;
        }
        parse(&SchemaDocument::from_value(&schema), &ParseOptions::default()).unwrap()
    };

    let closed = base(serde_json::json!(false));
    assert_eq!(member_keys(&closed, closed.root()), ["a"]);

    for open in [base(serde_json::Value::Null), base(serde_json::json!(true))] {
        assert_eq!(member_keys(&open, open.root()), ["a", INDEX_SIGNATURE_KEY]);
        assert_eq!(open[member(&open, open.root(), INDEX_SIGNATURE_KEY)].kind, AstKind::Any);
    }

    let typed = base(serde_json::json!({ "type": "number" }));
    assert_eq!(member_keys(&typed, typed.root()), ["a", INDEX_SIGNATURE_KEY]);
    assert_eq!(typed[member(&typed, typed.root(), INDEX_SIGNATURE_KEY)].kind, AstKind::Number);
}

#[test]
fn test_unreachable_definitions_option() {
    let doc = load(include_str!("fixtures/person.json"));

    let ast = parse(&doc, &ParseOptions::default()).unwrap();
    assert!(ast.root_node().params().iter().all(|p| !p.is_unreachable_definition));

    let options = ParseOptions {
        unreachable_definitions: true,
    };
    let ast = parse(&doc, &options).unwrap();
    let root = ast.root();

    assert_eq!(member_keys(&ast, root), ["name", "age", "address", "tags", "Address"]);
    let harvested = &ast[root].params()[4];
    assert!(harvested.is_unreachable_definition);

    // The definition and the property that references it are one node
    assert_eq!(harvested.ast, member(&ast, root, "address"));
    assert_eq!(
        ast[harvested.ast].comment.as_deref(),
        Some(concat!(
            "This interface was referenced by `Person`'s JSON-Schema definition\n",
            "via the `definition` \"Address\"."
        ))
    );
}

// =============================================================================
// Enums, Arrays, Tuples
// =============================================================================

#[test]
fn test_named_enum_and_union() {
    let ast = parse_fixture(include_str!("fixtures/enums.json"));
    let root = ast.root();

    let status = member(&ast, root, "status");
    assert_eq!(ast[status].standalone_name.as_deref(), Some("Status"));
    let AstKind::Enum { members } = &ast[status].kind else {
        panic!("status should be an enum");
    };
    let labels: Vec<_> = members.iter().map(|m| m.label.as_str()).collect();
    assert_eq!(labels, ["Active", "Inactive"]);
    assert_eq!(
        ast[members[0].ast].kind,
        AstKind::Literal { value: serde_json::json!("active") }
    );

    let level = member(&ast, root, "level");
    assert_eq!(ast[level].standalone_name, None);
    let AstKind::Union { members } = &ast[level].kind else {
        panic!("level should be a union");
    };
    assert_eq!(members.len(), 3);
    assert!(members
        .iter()
        .all(|&m| matches!(ast[m].kind, AstKind::Literal { .. })));
}

#[test]
fn test_any_of_and_one_of_members_in_order() {
    let ast = parse_fixture(include_str!("fixtures/combinators.json"));
    let root = ast.root();
    let shared = member(&ast, root, "shared");
    assert_eq!(ast[shared].standalone_name.as_deref(), Some("Shared"));

    let AstKind::Union { members } = &ast[member(&ast, root, "either")].kind else {
        panic!("either should be a union");
    };
    assert_eq!(members.len(), 2);
    assert_eq!(ast[members[0]].kind, AstKind::String);
    assert_eq!(members[1], shared);

    let AstKind::Union { members } = &ast[member(&ast, root, "one")].kind else {
        panic!("one should be a union");
    };
    assert_eq!(members.len(), 3);
    assert_eq!(ast[members[0]].kind, AstKind::Number);
    assert_eq!(members[1], shared);
    assert_eq!(ast[members[2]].kind, AstKind::Null);

    assert_eq!(declared_names(&ast), ["Choice", "Shared"]);
}

#[test]
fn test_tuple_vs_array() {
    let ast = parse_fixture(include_str!("fixtures/tuples.json"));
    let root = ast.root();

    let AstKind::Tuple { elements } = &ast[member(&ast, root, "point")].kind else {
        panic!("point should be a tuple");
    };
    assert_eq!(elements.len(), 2);
    assert!(elements.iter().all(|&e| ast[e].kind == AstKind::Number));

    let AstKind::Array { element } = ast[member(&ast, root, "labels")].kind else {
        panic!("labels should be an array");
    };
    assert_eq!(ast[element].kind, AstKind::String);

    let AstKind::Array { element } = ast[member(&ast, root, "anything")].kind else {
        panic!("anything should be an array");
    };
    assert_eq!(ast[element].kind, AstKind::Any);
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_unresolved_reference() {
    let doc = load(include_str!("fixtures/remote_ref.json"));
    let err = parse(&doc, &ParseOptions::default()).unwrap_err();

    match err {
        SchemaError::UnresolvedReference { location, reference, .. } => {
            assert_eq!(location, "#/properties/remote");
            assert_eq!(reference, "http://example.com/schemas/remote.json");
        }
        other => panic!("expected unresolved reference, got {:?}", other),
    }
}

#[test]
fn test_unnamed_super_type() {
    let doc = load(include_str!("fixtures/extends_unnamed.json"));
    let err = parse(&doc, &ParseOptions::default()).unwrap_err();

    assert!(matches!(
        err,
        SchemaError::UnnamedSupertype { ref location, .. } if location == "#/extends"
    ));
    assert!(err.to_string().contains("#/extends"));
}

#[test]
fn test_enum_names_mismatch() {
    let doc = load(include_str!("fixtures/enum_mismatch.json"));
    let err = parse(&doc, &ParseOptions::default()).unwrap_err();

    assert!(matches!(
        err,
        SchemaError::EnumNamesMismatch { values: 3, names: 2, ref location, .. }
            if location == "#/properties/color"
    ));
}

// =============================================================================
// Classifier Seam
// =============================================================================

/// Treats every string as a number, otherwise defers to the default
struct NumbersOnly;

impl Classify for NumbersOnly {
    fn classify(&self, schema: &Schema) -> SchemaKind {
        match JsonSchemaClassifier.classify(schema) {
            SchemaKind::String => SchemaKind::Number,
            other => other,
        }
    }
}

#[test]
fn test_custom_classifier() {
    let doc = load(include_str!("fixtures/person.json"));
    let ast = parse_with(&doc, doc.root(), &NumbersOnly, &ParseOptions::default()).unwrap();

    assert_eq!(ast[member(&ast, ast.root(), "name")].kind, AstKind::Number);

    let dynamic: &dyn Classify = &JsonSchemaClassifier;
    let ast = parse_with(&doc, doc.root(), dynamic, &ParseOptions::default()).unwrap();
    assert_eq!(ast[member(&ast, ast.root(), "name")].kind, AstKind::String);
}

#[test]
fn test_parse_from_inner_root() {
    let doc = load(include_str!("fixtures/linked_list.json"));
    let list_node = doc.schema(doc.root()).unwrap().definitions.as_ref().unwrap()["ListNode"];

    let ast = parse_with(&doc, list_node, &JsonSchemaClassifier, &ParseOptions::default()).unwrap();
    assert_eq!(member(&ast, ast.root(), "next"), ast.root());
    // No definitions below ListNode, and nothing else names it
    assert_eq!(ast.root_node().standalone_name, None);
}
