//! Combines raw integration events with registered enrichers.

use std::sync::Arc;

use tracing::debug;

use tagger_core::IntegrationEvent;

use crate::enrichment::{self, ContextEnricher};

use super::{RuleContext, RuleContextBuilder};

/// Builds one [`RuleContext`] per integration event.
///
/// Enrichers run in registration order after the base fields (title,
/// summary, content, metadata, `eventName`) are in place.
#[derive(Clone, Default)]
pub struct RuleContextFactory {
    enrichers: Vec<Arc<dyn ContextEnricher>>,
}

impl RuleContextFactory {
    pub fn new(enrichers: Vec<Arc<dyn ContextEnricher>>) -> Self {
        Self { enrichers }
    }

    /// Factory with the built-in enrichers: extension, document type, upload date.
    pub fn with_default_enrichers() -> Self {
        Self::new(enrichment::default_enrichers())
    }

    /// Append an enricher; it runs after every previously registered one.
    pub fn register(&mut self, enricher: Arc<dyn ContextEnricher>) -> &mut Self {
        self.enrichers.push(enricher);
        self
    }

    pub fn enricher_names(&self) -> Vec<&str> {
        self.enrichers.iter().map(|e| e.name()).collect()
    }

    pub fn create(&self, event: &IntegrationEvent) -> RuleContext {
        let mut builder = RuleContextBuilder::from_event(event);
        builder.add_field("eventName", event.kind.as_str());

        for enricher in &self.enrichers {
            enricher.enrich(&mut builder, event);
        }

        let context = builder.build();
        debug!(
            document_id = %event.document_id,
            event = %event.kind,
            fields = context.fields().len(),
            "built rule context"
        );
        context
    }
}

impl std::fmt::Debug for RuleContextFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleContextFactory")
            .field("enrichers", &self.enricher_names())
            .finish()
    }
}
