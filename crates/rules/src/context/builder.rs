//! Staged construction of [`RuleContext`] values.

use indexmap::IndexMap;

use tagger_core::{DocId, IntegrationEvent};

use super::{FieldMap, RuleContext};

/// Collects base event data and enricher output into a [`RuleContext`].
///
/// Every write goes through the same rule: trimmed key and value must both
/// be non-empty, and a later write to the same key (case-insensitive)
/// overwrites the earlier one.
#[derive(Debug, Clone)]
pub struct RuleContextBuilder {
    document_id: DocId,
    title: String,
    summary: Option<String>,
    content: Option<String>,
    metadata: FieldMap,
    fields: FieldMap,
}

impl RuleContextBuilder {
    /// Start a context with the `title` field. A blank title is kept on the
    /// context as given but produces no `title` field.
    pub fn new(document_id: DocId, title: impl Into<String>) -> Self {
        let title = title.into();
        let mut fields = FieldMap::new();
        fields.insert("title", &title);
        Self {
            document_id,
            title,
            summary: None,
            content: None,
            metadata: FieldMap::new(),
            fields,
        }
    }

    /// Seed a builder from raw event parts: title, then summary, content and metadata.
    pub fn from_metadata(
        document_id: DocId,
        title: impl Into<String>,
        summary: Option<&str>,
        content: Option<&str>,
        metadata: Option<&IndexMap<String, String>>,
    ) -> Self {
        let mut builder = Self::new(document_id, title);
        builder.with_summary(summary).with_content(content);
        if let Some(metadata) = metadata {
            builder.add_metadata(metadata);
        }
        builder
    }

    pub fn from_event(event: &IntegrationEvent) -> Self {
        Self::from_metadata(
            event.document_id,
            event.title.clone(),
            event.summary.as_deref(),
            event.content.as_deref(),
            Some(&event.metadata),
        )
    }

    pub fn with_summary(&mut self, summary: Option<&str>) -> &mut Self {
        if let Some(summary) = summary.filter(|s| !s.trim().is_empty()) {
            self.summary = Some(summary.to_string());
            self.fields.insert("summary", summary);
        }
        self
    }

    pub fn with_content(&mut self, content: Option<&str>) -> &mut Self {
        if let Some(content) = content.filter(|c| !c.trim().is_empty()) {
            self.content = Some(content.to_string());
            self.fields.insert("content", content);
        }
        self
    }

    /// Add every metadata pair in iteration order.
    pub fn add_metadata(&mut self, metadata: &IndexMap<String, String>) -> &mut Self {
        for (key, value) in metadata {
            self.add_metadata_entry(key, value);
        }
        self
    }

    /// Record a metadata entry and expose it as a field of the same name.
    pub fn add_metadata_entry(&mut self, key: &str, value: &str) -> &mut Self {
        if self.metadata.insert(key, value) {
            self.fields.insert(key, value);
        }
        self
    }

    /// Add a derived field. Blank keys or values are ignored.
    pub fn add_field(&mut self, key: &str, value: &str) -> &mut Self {
        self.fields.insert(key, value);
        self
    }

    pub fn document_id(&self) -> DocId {
        self.document_id
    }

    /// Current value of a field, so enrichers can read base fields.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key)
    }

    pub fn build(self) -> RuleContext {
        RuleContext {
            document_id: self.document_id,
            title: self.title,
            summary: self.summary,
            content: self.content,
            metadata: self.metadata,
            fields: self.fields,
        }
    }
}
