//! Named rule sets and the on-disk rule file shapes.

use serde::{Deserialize, Serialize};

use super::{RuleDefinition, Trigger};

/// A named group of rules. Rule sets with the same name (case-insensitive)
/// from different sources are concatenated during aggregation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RuleSetDefinition {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

impl RuleSetDefinition {
    pub fn new(name: impl Into<String>, rules: Vec<RuleDefinition>) -> Self {
        Self {
            name: name.into(),
            rules,
        }
    }
}

/// Group flat rules under the conventional rule set of each concrete trigger.
///
/// Rules with trigger `All` are placed in every set. Empty sets are omitted.
pub fn group_by_trigger(rules: &[RuleDefinition]) -> Vec<RuleSetDefinition> {
    Trigger::CONCRETE
        .iter()
        .filter_map(|trigger| {
            let grouped: Vec<RuleDefinition> = rules
                .iter()
                .filter(|rule| rule.trigger.applies_to(*trigger))
                .cloned()
                .collect();
            if grouped.is_empty() {
                return None;
            }
            let name = trigger.rule_set_name()?;
            Some(RuleSetDefinition::new(name, grouped))
        })
        .collect()
}

/// Object-shaped rule file: flat rules and/or named rule sets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RuleFileDocument {
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
    #[serde(default)]
    pub rule_sets: Vec<RuleSetDefinition>,
}

/// Parsed contents of a rule file.
///
/// Two shapes are accepted: a top-level list of rule sets, or an object with
/// `rules` and/or `ruleSets`.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleFile {
    RuleSets(Vec<RuleSetDefinition>),
    Document(RuleFileDocument),
}

impl RuleFile {
    pub fn from_json_str(s: &str) -> std::result::Result<Self, serde_json::Error> {
        let value: serde_json::Value = serde_json::from_str(s)?;
        if value.is_array() {
            Ok(RuleFile::RuleSets(serde_json::from_value(value)?))
        } else {
            Ok(RuleFile::Document(serde_json::from_value(value)?))
        }
    }

    pub fn from_yaml_str(s: &str) -> std::result::Result<Self, serde_yaml::Error> {
        let value: serde_yaml::Value = serde_yaml::from_str(s)?;
        match value {
            serde_yaml::Value::Sequence(_) => Ok(RuleFile::RuleSets(serde_yaml::from_value(value)?)),
            // An empty YAML file parses as null.
            serde_yaml::Value::Null => Ok(RuleFile::Document(RuleFileDocument::default())),
            other => Ok(RuleFile::Document(serde_yaml::from_value(other)?)),
        }
    }

    /// Flatten into rule sets: explicit sets first, then flat rules grouped by trigger.
    pub fn into_rule_sets(self) -> Vec<RuleSetDefinition> {
        match self {
            RuleFile::RuleSets(sets) => sets,
            RuleFile::Document(doc) => {
                let mut sets = doc.rule_sets;
                sets.extend(group_by_trigger(&doc.rules));
                sets
            }
        }
    }
}
