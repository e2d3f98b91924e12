//! Rule evaluation context.
//!
//! A [`RuleContext`] is the immutable, case-insensitive field map derived
//! from one integration event plus enricher output. Conditions are evaluated
//! against its fields only.

mod builder;
mod factory;

pub use builder::RuleContextBuilder;
pub use factory::RuleContextFactory;

use indexmap::IndexMap;

use tagger_core::DocId;

use crate::schema::fold_key;

// ── Field map ───────────────────────────────────────────────────────

/// String map with case-insensitive keys and trimmed, non-blank values.
///
/// Entries keep the position of their first insertion; a later write to
/// the same key (in any casing) replaces the stored key spelling and value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    entries: IndexMap<String, (String, String)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a trimmed entry. Returns `false` when key or value is blank.
    pub fn insert(&mut self, key: &str, value: &str) -> bool {
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() || value.is_empty() {
            return false;
        }
        self.entries
            .insert(fold_key(key), (key.to_string(), value.to_string()));
        true
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&fold_key(key))
            .map(|(_, value)| value.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(&fold_key(key))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order, with the most recently written key spelling.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .values()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

// ── Rule context ────────────────────────────────────────────────────

/// Evaluation-ready snapshot of a document event. Built once per event via
/// [`RuleContextBuilder`], never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleContext {
    document_id: DocId,
    title: String,
    summary: Option<String>,
    content: Option<String>,
    metadata: FieldMap,
    fields: FieldMap,
}

impl RuleContext {
    /// Document the context was built for. Not used in matching.
    pub fn document_id(&self) -> DocId {
        self.document_id
    }

    /// Title exactly as received, even when blank.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Normalized metadata entries only.
    pub fn metadata(&self) -> &FieldMap {
        &self.metadata
    }

    /// Every field conditions can reference.
    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// Look up a field case-insensitively.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn field_map_is_case_insensitive_and_trims() {
        let mut map = FieldMap::new();
        assert!(map.insert("  Extension ", " .PDF  "));
        assert_eq!(map.get("extension"), Some(".PDF"));
        assert_eq!(map.get("EXTENSION"), Some(".PDF"));
        assert!(map.contains_key("eXtEnSiOn"));
    }

    #[test]
    fn field_map_skips_blank_entries() {
        let mut map = FieldMap::new();
        assert!(!map.insert("  ", "value"));
        assert!(!map.insert("key", "   "));
        assert!(map.is_empty());
    }

    #[test]
    fn field_map_last_writer_wins_in_first_position() {
        let mut map = FieldMap::new();
        map.insert("owner", "alice");
        map.insert("dept", "finance");
        map.insert("OWNER", "bob");

        let entries: Vec<(&str, &str)> = map.iter().collect();
        assert_eq!(entries, vec![("OWNER", "bob"), ("dept", "finance")]);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn context_get_reads_fields() {
        let mut builder = RuleContextBuilder::new(Uuid::nil(), "Report.pdf");
        builder.add_field("Extension", ".pdf");
        let context = builder.build();
        assert_eq!(context.get("extension"), Some(".pdf"));
        assert_eq!(context.get("title"), Some("Report.pdf"));
        assert_eq!(context.get("summary"), None);
    }
}
