//! Context enrichers: pluggable steps that add derived fields to a rule
//! context before evaluation.
//!
//! Each enricher receives the in-progress [`RuleContextBuilder`] and the raw
//! event. Enrichers are independent of each other; they may rely on the
//! base fields (title, summary, content, metadata) already being present.

mod document_type;
mod extension;
mod upload_date;

pub use document_type::DocumentTypeEnricher;
pub use extension::{normalize_extension, resolve_extension, ExtensionEnricher};
pub use upload_date::UploadDateEnricher;

use std::sync::Arc;

use tagger_core::IntegrationEvent;

use crate::context::RuleContextBuilder;

/// Adds derived fields to a context under construction.
pub trait ContextEnricher: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    fn enrich(&self, builder: &mut RuleContextBuilder, event: &IntegrationEvent);
}

/// The built-in enrichers in their default order.
pub fn default_enrichers() -> Vec<Arc<dyn ContextEnricher>> {
    vec![
        Arc::new(ExtensionEnricher),
        Arc::new(DocumentTypeEnricher),
        Arc::new(UploadDateEnricher),
    ]
}

/// Case-insensitive metadata lookup; the last non-blank matching entry wins,
/// as it does in the context's field map.
pub(crate) fn metadata_value<'a>(event: &'a IntegrationEvent, key: &str) -> Option<&'a str> {
    event
        .metadata
        .iter()
        .rev()
        .find(|(k, v)| k.trim().eq_ignore_ascii_case(key) && !v.trim().is_empty())
        .map(|(_, v)| v.as_str())
}
