//! Literal nodes (enum members)

use serde_json::Value;

use super::Parser;
use crate::ast::{AstId, AstKind};
use crate::classify::Classify;

impl<'a, C: Classify + ?Sized> Parser<'a, C> {
    /// Wrap a raw enum value. Literals have no title or id of their own, so
    /// the only name they can get is a definitions key.
    pub(super) fn parse_literal(
        &mut self,
        slot: AstId,
        value: &Value,
        key_name: Option<&str>,
        definition_key: Option<&str>,
    ) {
        let name = self.names.allocate(None, None, definition_key);
        self.arena.describe(slot, None, key_name, name);
        self.arena.fill(slot, AstKind::Literal { value: value.clone() });
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::AstKind;
    use crate::config::ParseOptions;
    use crate::document::{Schema, SchemaDocument};
    use crate::parser::parse;
    use serde_json::json;

    #[test]
    fn test_unnamed_enum_members() {
        let doc = SchemaDocument::from_value(&json!({ "enum": ["a", 1, null] }));
        let ast = parse(&doc, &ParseOptions::default()).unwrap();

        let AstKind::Union { members } = &ast.root_node().kind else {
            panic!("expected union");
        };
        let values: Vec<_> = members
            .iter()
            .map(|&m| match &ast[m].kind {
                AstKind::Literal { value } => value.clone(),
                other => panic!("expected literal, got {:?}", other),
            })
            .collect();
        assert_eq!(values, [json!("a"), json!(1), json!(null)]);
        assert!(members.iter().all(|&m| ast[m].standalone_name.is_none()));
    }

    #[test]
    fn test_literal_named_from_definitions() {
        // A literal node that is also a definitions entry, which only a
        // hand-built document can express
        let mut builder = SchemaDocument::builder();
        let literal = builder.literal(json!("fixed"));

        let mut root = Schema::default();
        root.enum_values = Some(vec![literal]);
        root.definitions = Some([("Fixed".to_string(), literal)].into_iter().collect());
        let root = builder.schema(root);
        let doc = builder.build(root);

        let ast = parse(&doc, &ParseOptions::default()).unwrap();
        let AstKind::Union { members } = &ast.root_node().kind else {
            panic!("expected union");
        };
        assert_eq!(ast[members[0]].standalone_name.as_deref(), Some("Fixed"));
    }
}
