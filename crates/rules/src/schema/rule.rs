//! Rule and condition definitions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tagger_core::TagId;

use super::{ConditionOperator, MatchMode, Trigger};

fn default_true() -> bool {
    true
}

/// A named, declarative unit of tagging logic.
///
/// A rule applies `tag_id` to a document when it is enabled, its trigger is
/// eligible, and its conditions hold under `match_mode`. A missing `tagId`
/// deserializes to the nil UUID, which validation reports and the engine
/// never treats as eligible.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RuleDefinition {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub tag_id: TagId,
    #[serde(default, rename = "match", alias = "matchMode")]
    pub match_mode: MatchMode,
    #[serde(default)]
    pub trigger: Trigger,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl RuleDefinition {
    /// Create an enabled rule that fires on every trigger and has no conditions.
    pub fn new(name: impl Into<String>, tag_id: TagId) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            tag_id,
            match_mode: MatchMode::All,
            trigger: Trigger::All,
            conditions: Vec::new(),
        }
    }

    pub fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn with_match(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn has_tag(&self) -> bool {
        self.tag_id != Uuid::nil()
    }

    /// Name for diagnostics: the rule name, or its tag ID when unnamed.
    pub fn label(&self) -> String {
        if self.name.trim().is_empty() {
            self.tag_id.to_string()
        } else {
            self.name.clone()
        }
    }
}

/// A single field test inside a rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub operator: ConditionOperator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
}

impl Condition {
    /// Condition with a single expected value (or pattern, for `Regex`).
    pub fn new(field: impl Into<String>, operator: ConditionOperator, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: Some(value.into()),
            values: None,
        }
    }

    /// Condition with a list of expected values.
    pub fn with_values<I, S>(field: impl Into<String>, operator: ConditionOperator, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            field: field.into(),
            operator,
            value: None,
            values: Some(values.into_iter().map(Into::into).collect()),
        }
    }

    /// Expected operands, trimmed, blanks dropped.
    ///
    /// A non-empty `values` list wins over the singular `value`. Regex
    /// conditions use [`Condition::pattern`] instead.
    pub fn expected_values(&self) -> Vec<&str> {
        if let Some(values) = self.values.as_ref().filter(|v| !v.is_empty()) {
            return values
                .iter()
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .collect();
        }

        match self.value.as_deref().map(str::trim) {
            Some(v) if !v.is_empty() => vec![v],
            _ => Vec::new(),
        }
    }

    /// Regex pattern, untrimmed; `None` when blank.
    pub fn pattern(&self) -> Option<&str> {
        self.value.as_deref().filter(|p| !p.trim().is_empty())
    }
}
