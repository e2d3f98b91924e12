//! Event handling: context, rule-set selection, evaluation and tag hand-off.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use tagger_core::{DocId, IntegrationEvent, TagId, TaggerError};

use crate::context::RuleContextFactory;
use crate::evaluator::RuleEngine;
use crate::loader::OptionsMonitor;
use crate::schema::Trigger;
use crate::selector::RuleSetSelector;

// ── Tag assignment port ─────────────────────────────────────────────

/// Outbound port that associates tags with a document.
///
/// Implementations own persistence and idempotency; the processor only
/// hands over non-empty tag sets.
#[async_trait::async_trait]
pub trait TagAssignment: Send + Sync {
    async fn assign(&self, document_id: DocId, tags: &BTreeSet<TagId>) -> Result<(), TaggerError>;
}

/// Assignment sink that only logs, for dry runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingAssignment;

#[async_trait::async_trait]
impl TagAssignment for LoggingAssignment {
    async fn assign(&self, document_id: DocId, tags: &BTreeSet<TagId>) -> Result<(), TaggerError> {
        let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
        info!(document_id = %document_id, tags = %tags.join(","), "tags assigned (dry run)");
        Ok(())
    }
}

// ── Outcome ─────────────────────────────────────────────────────────

/// What handling one event produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessOutcome {
    pub event_id: Uuid,
    pub document_id: DocId,
    pub trigger: Trigger,
    /// Rule sets the selector chose; empty when every set was evaluated.
    pub rule_sets: Vec<String>,
    pub tags: BTreeSet<TagId>,
}

impl ProcessOutcome {
    pub fn is_tagged(&self) -> bool {
        !self.tags.is_empty()
    }
}

// ── Processor ───────────────────────────────────────────────────────

/// Runs integration events through the rule engine and applies the result.
#[derive(Clone)]
pub struct TaggingEventProcessor {
    engine: Arc<RuleEngine>,
    factory: Arc<RuleContextFactory>,
    monitor: OptionsMonitor,
    assignment: Arc<dyn TagAssignment>,
}

impl TaggingEventProcessor {
    pub fn new(
        engine: Arc<RuleEngine>,
        factory: Arc<RuleContextFactory>,
        monitor: OptionsMonitor,
        assignment: Arc<dyn TagAssignment>,
    ) -> Self {
        Self {
            engine,
            factory,
            monitor,
            assignment,
        }
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    /// Evaluate an event without assigning anything.
    ///
    /// Rule sets mapped to the event in `triggers` restrict evaluation. An
    /// event with no mapping is evaluated against every rule set rather than
    /// skipped, so options without `triggers` still tag documents.
    pub fn evaluate(&self, event: &IntegrationEvent) -> ProcessOutcome {
        let trigger = Trigger::from(event.kind);
        let context = self.factory.create(event);
        let rule_sets = RuleSetSelector::select(&self.monitor.current(), event.kind);

        let tags = if rule_sets.is_empty() {
            self.engine.evaluate(&context, trigger)
        } else {
            self.engine.evaluate_rule_sets(&context, trigger, &rule_sets)
        };

        ProcessOutcome {
            event_id: event.event_id,
            document_id: event.document_id,
            trigger,
            rule_sets,
            tags,
        }
    }

    /// Evaluate an event and hand any matched tags to the assignment port.
    pub async fn handle(&self, event: &IntegrationEvent) -> Result<ProcessOutcome, TaggerError> {
        let outcome = self.evaluate(event);

        if !outcome.is_tagged() {
            debug!(
                event_id = %event.event_id,
                document_id = %event.document_id,
                trigger = %outcome.trigger,
                "no tagging rules matched"
            );
            return Ok(outcome);
        }

        self.assignment.assign(event.document_id, &outcome.tags).await?;
        info!(
            event_id = %event.event_id,
            document_id = %event.document_id,
            trigger = %outcome.trigger,
            tags = outcome.tags.len(),
            "applied tags to document"
        );
        Ok(outcome)
    }
}

impl fmt::Debug for TaggingEventProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaggingEventProcessor")
            .field("engine", &self.engine)
            .field("factory", &self.factory)
            .field("monitor", &self.monitor)
            .finish_non_exhaustive()
    }
}
