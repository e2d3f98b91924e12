//! Condition operators and rule match modes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::fold_name;

/// Comparison applied between a context field and a condition's expected values.
///
/// All comparisons are case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ConditionOperator {
    #[default]
    Equals,
    NotEquals,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    In,
    NotIn,
    Regex,
}

impl ConditionOperator {
    pub const ALL: [ConditionOperator; 9] = [
        ConditionOperator::Equals,
        ConditionOperator::NotEquals,
        ConditionOperator::Contains,
        ConditionOperator::NotContains,
        ConditionOperator::StartsWith,
        ConditionOperator::EndsWith,
        ConditionOperator::In,
        ConditionOperator::NotIn,
        ConditionOperator::Regex,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionOperator::Equals => "Equals",
            ConditionOperator::NotEquals => "NotEquals",
            ConditionOperator::Contains => "Contains",
            ConditionOperator::NotContains => "NotContains",
            ConditionOperator::StartsWith => "StartsWith",
            ConditionOperator::EndsWith => "EndsWith",
            ConditionOperator::In => "In",
            ConditionOperator::NotIn => "NotIn",
            ConditionOperator::Regex => "Regex",
        }
    }
}

impl fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConditionOperator {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let folded = fold_name(s);
        ConditionOperator::ALL
            .into_iter()
            .find(|op| op.as_str().to_lowercase() == folded)
            .ok_or_else(|| format!("unknown condition operator: '{}'", s))
    }
}

impl TryFrom<String> for ConditionOperator {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ConditionOperator> for String {
    fn from(op: ConditionOperator) -> Self {
        op.as_str().to_string()
    }
}

/// How a rule combines the results of its conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MatchMode {
    /// Every condition must hold.
    #[default]
    All,
    /// At least one condition must hold.
    Any,
}

impl MatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::All => "All",
            MatchMode::Any => "Any",
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match fold_name(s).as_str() {
            "all" | "and" => Ok(MatchMode::All),
            "any" | "or" => Ok(MatchMode::Any),
            _ => Err(format!("unknown match mode: '{}'", s)),
        }
    }
}

impl TryFrom<String> for MatchMode {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MatchMode> for String {
    fn from(mode: MatchMode) -> Self {
        mode.as_str().to_string()
    }
}
