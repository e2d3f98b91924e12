//! Hosted tagger options: the configuration surface read by the inline source,
//! the file source and the rule-set selector.

use serde::{Deserialize, Serialize};

use super::{group_by_trigger, RuleDefinition, RuleSetDefinition};

/// Tagger rule configuration as loaded from the hosted options file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TaggerRulesOptions {
    /// Rule files to load, absolute or relative to the content root.
    #[serde(default)]
    pub files: Vec<String>,
    /// Inline named rule sets.
    #[serde(default)]
    pub rule_sets: Vec<RuleSetDefinition>,
    /// Inline flat rules, grouped by trigger at read time.
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
    /// Which rule sets run for which integration event.
    #[serde(default)]
    pub triggers: Vec<TriggerMapping>,
}

impl TaggerRulesOptions {
    /// Inline rule sets followed by the flat rules grouped by trigger.
    pub fn inline_rule_sets(&self) -> Vec<RuleSetDefinition> {
        let mut sets = self.rule_sets.clone();
        sets.extend(group_by_trigger(&self.rules));
        sets
    }
}

/// Maps an integration event name to the rule sets evaluated for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TriggerMapping {
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub rule_sets: Vec<String>,
}
