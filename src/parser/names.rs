//! Standalone Name Allocation
//!
//! Gives AST nodes document-unique identifiers, handling:
//! - Candidate selection (title, then id, then a caller-supplied fallback)
//! - `id` identity: every node declaring the same id gets the same name
//! - Collision disambiguation (`Thing`, `Thing1`, `Thing2`, ...)
//!
//! Allocation is order-dependent: the first node to claim a name gets it
//! verbatim. One allocator lives exactly as long as one parse.

use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Used when sanitizing a candidate leaves nothing behind
const EMPTY_NAME: &str = "NoName";

/// Document-wide name state: the used-name set and the id -> name map
#[derive(Debug, Default)]
pub struct NameAllocator {
    /// Every name handed out so far (insert-only)
    used: HashSet<String>,

    /// Declared schema id -> the name allocated for it
    by_id: HashMap<String, String>,
}

impl NameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a standalone name for a node.
    ///
    /// Returns `None` when the node has no candidate at all; such a node is
    /// inlined rather than declared.
    pub fn allocate(
        &mut self,
        id: Option<&str>,
        title: Option<&str>,
        fallback: Option<&str>,
    ) -> Option<String> {
        let id = id.filter(|id| !id.is_empty());

        if let Some(name) = id.and_then(|id| self.by_id.get(id)) {
            return Some(name.clone());
        }

        let candidate = [title, id, fallback]
            .into_iter()
            .flatten()
            .find(|candidate| !candidate.is_empty())?;

        let name = self.claim(candidate);
        if let Some(id) = id {
            self.by_id.insert(id.to_string(), name.clone());
        }

        Some(name)
    }

    /// Like [`allocate`](Self::allocate), but falls back on `NoName` when
    /// there is no candidate. Used for nodes that must be declared.
    pub fn allocate_forced(
        &mut self,
        id: Option<&str>,
        title: Option<&str>,
        fallback: Option<&str>,
    ) -> String {
        match self.allocate(id, title, fallback) {
            Some(name) => name,
            None => self.claim(EMPTY_NAME),
        }
    }

    /// Sanitize `candidate` and reserve the first unused variant of it
    fn claim(&mut self, candidate: &str) -> String {
        let mut base = to_safe_name(candidate);
        if base.is_empty() {
            base = EMPTY_NAME.to_string();
        }

        let mut name = base.clone();
        let mut counter = 1;
        while self.used.contains(&name) {
            name = format!("{}{}", base, counter);
            counter += 1;
        }

        if name != base {
            debug!(candidate, name = %name, "disambiguated standalone name");
        }
        self.used.insert(name.clone());
        name
    }

    pub fn is_used(&self, name: &str) -> bool {
        self.used.contains(name)
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}

// =============================================================================
// Sanitization
// =============================================================================

/// Turn an arbitrary string into a PascalCase identifier.
///
/// Characters outside `[A-Za-z0-9_$]` are word breaks, leading digits are
/// dropped, and `_` before a lowercase letter is a word break too (except
/// at the very start). Letters that begin a word or follow a digit, `$` or
/// `_` are upper-cased. May return an empty string.
pub fn to_safe_name(raw: &str) -> String {
    let mut result = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    let mut word_start = true;
    let mut prev: Option<char> = None;

    while let Some(c) = chars.next() {
        let is_ident = c.is_ascii_alphanumeric() || c == '_' || c == '$';
        if !is_ident || (result.is_empty() && c.is_ascii_digit()) {
            word_start = true;
            prev = None;
            continue;
        }

        // snake_case -> SnakeCase
        if c == '_' && !result.is_empty() && chars.peek().is_some_and(|n| n.is_ascii_lowercase()) {
            word_start = true;
            prev = None;
            continue;
        }

        let after_marker = matches!(prev, Some(p) if p.is_ascii_digit() || p == '$' || p == '_');
        if c.is_ascii_alphabetic() && (word_start || after_marker) {
            result.push(c.to_ascii_uppercase());
        } else {
            result.push(c);
        }

        word_start = false;
        prev = Some(c);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_safe_name() {
        assert_eq!(to_safe_name("person"), "Person");
        assert_eq!(to_safe_name("my-schema"), "MySchema");
        assert_eq!(to_safe_name("hello world"), "HelloWorld");
        assert_eq!(to_safe_name("foo_bar"), "FooBar");
        assert_eq!(to_safe_name("FOO_BAR"), "FOO_BAR");
        assert_eq!(to_safe_name("_private"), "_Private");
        assert_eq!(to_safe_name("123abc"), "Abc");
        assert_eq!(to_safe_name("version2beta"), "Version2Beta");
        assert_eq!(to_safe_name("$ref"), "$Ref");
        assert_eq!(
            to_safe_name("http://example.com/person.json"),
            "HttpExampleComPersonJson"
        );
        assert_eq!(to_safe_name("---"), "");
    }

    #[test]
    fn test_first_claim_wins() {
        let mut names = NameAllocator::new();
        assert_eq!(names.allocate(None, Some("Thing"), None).as_deref(), Some("Thing"));
        assert_eq!(names.allocate(None, Some("Thing"), None).as_deref(), Some("Thing1"));
        assert_eq!(names.allocate(None, Some("thing"), None).as_deref(), Some("Thing2"));
        assert_eq!(names.len(), 3);
    }

    #[test]
    fn test_same_id_same_name() {
        let mut names = NameAllocator::new();
        let first = names.allocate(Some("urn:a"), Some("Alpha"), None);
        let second = names.allocate(Some("urn:a"), Some("Other"), Some("key"));

        assert_eq!(first.as_deref(), Some("Alpha"));
        assert_eq!(second, first);
        assert!(!names.is_used("Other"));
    }

    #[test]
    fn test_candidate_precedence() {
        let mut names = NameAllocator::new();
        assert_eq!(names.allocate(Some("urn:x"), None, Some("key")).as_deref(), Some("UrnX"));
        assert_eq!(names.allocate(None, Some(""), Some("key")).as_deref(), Some("Key"));
        assert_eq!(names.allocate(None, None, None), None);
        assert_eq!(names.allocate(None, None, Some("")), None);
    }

    #[test]
    fn test_unsanitizable_candidate() {
        let mut names = NameAllocator::new();
        assert_eq!(names.allocate(None, Some("???"), None).as_deref(), Some("NoName"));
        assert_eq!(names.allocate(None, Some("!!!"), None).as_deref(), Some("NoName1"));
        assert_eq!(names.allocate_forced(None, None, None), "NoName2");
        assert_eq!(names.allocate_forced(None, None, Some("Status")), "Status");
    }
}
