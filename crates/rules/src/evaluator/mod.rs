//! Rule evaluation: eligibility, match modes and tag accumulation.
//!
//! [`RuleEngine`] aggregates every registered [`RuleSource`] on each call, so
//! updates to hosted options or rule files are picked up without a restart.
//! Evaluation itself is pure: it reads a context and an aggregated snapshot
//! and returns the set of matching tag IDs.

mod condition;


pub use condition::evaluate_condition;
pub(crate) use condition::compile_pattern;

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use tagger_core::TagId;

use crate::context::RuleContext;
use crate::loader::{aggregate, AggregatedRules, RuleSource};
use crate::schema::{fold_key, MatchMode, RuleDefinition, Trigger};

// ── Rule engine ─────────────────────────────────────────────────────

/// Evaluates rules from all registered sources against rule contexts.
///
/// Cheap to share behind an `Arc`; holds no per-call state.
#[derive(Clone, Default)]
pub struct RuleEngine {
    sources: Vec<Arc<dyn RuleSource>>,
}

impl RuleEngine {
    pub fn new(sources: Vec<Arc<dyn RuleSource>>) -> Self {
        Self { sources }
    }

    /// Register another source; it is queried after the existing ones.
    pub fn add_source(&mut self, source: Arc<dyn RuleSource>) -> &mut Self {
        self.sources.push(source);
        self
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Fresh aggregation of every source.
    pub fn current_rules(&self) -> AggregatedRules {
        aggregate(&self.sources)
    }

    /// Tags of every eligible, matching rule across all rule sets.
    pub fn evaluate(&self, context: &RuleContext, trigger: Trigger) -> BTreeSet<TagId> {
        evaluate_rules(&self.current_rules(), context, trigger)
    }

    /// Like [`evaluate`](Self::evaluate), restricted to the named rule sets
    /// (case-insensitive). Unknown names are ignored.
    pub fn evaluate_rule_sets(
        &self,
        context: &RuleContext,
        trigger: Trigger,
        rule_sets: &[String],
    ) -> BTreeSet<TagId> {
        let aggregated = self.current_rules();
        let mut seen = BTreeSet::new();
        let selected: AggregatedRules = rule_sets
            .iter()
            .filter(|name| seen.insert(fold_key(name)))
            .filter_map(|name| {
                let set = aggregated.get(name);
                if set.is_none() {
                    debug!(rule_set = %name, "selected rule set not found");
                }
                set.cloned()
            })
            .collect();
        evaluate_rules(&selected, context, trigger)
    }
}

impl fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleEngine")
            .field("sources", &self.source_names())
            .finish()
    }
}

// ── Pure evaluation ─────────────────────────────────────────────────

/// Evaluate an aggregated snapshot. Callers that manage their own snapshot
/// use this directly instead of going through [`RuleEngine`].
pub fn evaluate_rules(
    rules: &AggregatedRules,
    context: &RuleContext,
    trigger: Trigger,
) -> BTreeSet<TagId> {
    let mut tags = BTreeSet::new();
    for set in rules.rule_sets() {
        for rule in &set.rules {
            if !is_eligible(rule, trigger) || !rule_matches(rule, context) {
                continue;
            }
            debug!(
                rule = %rule.label(),
                rule_set = %set.name,
                tag_id = %rule.tag_id,
                document_id = %context.document_id(),
                "rule matched"
            );
            tags.insert(rule.tag_id);
        }
    }
    tags
}

/// Enabled, carries a tag, and declared for `All` or the requested trigger.
pub fn is_eligible(rule: &RuleDefinition, trigger: Trigger) -> bool {
    rule.enabled && rule.has_tag() && rule.trigger.applies_to(trigger)
}

/// Combine the rule's conditions under its match mode. A rule without
/// conditions matches under either mode.
pub fn rule_matches(rule: &RuleDefinition, context: &RuleContext) -> bool {
    if rule.conditions.is_empty() {
        return true;
    }
    match rule.match_mode {
        MatchMode::All => rule
            .conditions
            .iter()
            .all(|c| evaluate_condition(c, context)),
        MatchMode::Any => rule
            .conditions
            .iter()
            .any(|c| evaluate_condition(c, context)),
    }
}
