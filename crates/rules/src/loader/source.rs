//! The [`RuleSource`] seam and the in-process sources.

use crate::schema::{group_by_trigger, RuleDefinition, RuleSetDefinition};

use super::options::OptionsMonitor;

/// Supplies rule sets from one backing store.
///
/// Sources are queried on every evaluation. They never fail for "no rules
/// configured"; unreadable or malformed backing data is logged and treated
/// as an empty contribution.
pub trait RuleSource: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    fn rule_sets(&self) -> Vec<RuleSetDefinition>;

    /// All rules of this source, in rule-set order.
    fn rules(&self) -> Vec<RuleDefinition> {
        self.rule_sets()
            .into_iter()
            .flat_map(|set| set.rules)
            .collect()
    }
}

// ── Code-defined rules ──────────────────────────────────────────────

/// Rules defined in code, grouped under the rule set of their trigger.
#[derive(Debug, Clone)]
pub struct CodeRuleSource {
    name: String,
    rules: Vec<RuleDefinition>,
    rule_sets: Vec<RuleSetDefinition>,
}

impl CodeRuleSource {
    pub fn new(name: impl Into<String>, rules: Vec<RuleDefinition>) -> Self {
        let rule_sets = group_by_trigger(&rules);
        Self {
            name: name.into(),
            rules,
            rule_sets,
        }
    }

    /// Source with explicitly named rule sets.
    pub fn from_rule_sets(name: impl Into<String>, rule_sets: Vec<RuleSetDefinition>) -> Self {
        let rules = rule_sets.iter().flat_map(|s| s.rules.iter().cloned()).collect();
        Self {
            name: name.into(),
            rules,
            rule_sets,
        }
    }
}

impl RuleSource for CodeRuleSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn rule_sets(&self) -> Vec<RuleSetDefinition> {
        self.rule_sets.clone()
    }

    fn rules(&self) -> Vec<RuleDefinition> {
        self.rules.clone()
    }
}

// ── Hosted options ──────────────────────────────────────────────────

/// Inline rule sets and rules from the hosted options, read through the
/// monitor so reloads are picked up on the next evaluation.
#[derive(Debug, Clone)]
pub struct InlineRuleSource {
    monitor: OptionsMonitor,
}

impl InlineRuleSource {
    pub fn new(monitor: OptionsMonitor) -> Self {
        Self { monitor }
    }
}

impl RuleSource for InlineRuleSource {
    fn name(&self) -> &str {
        "inline"
    }

    fn rule_sets(&self) -> Vec<RuleSetDefinition> {
        self.monitor.current().inline_rule_sets()
    }
}
