//! Rule configuration schema with serde deserialization.
//!
//! Defines the type hierarchy shared by every rule source:
//! - `RuleDefinition` / `Condition`: one declarative tagging rule
//! - `RuleSetDefinition`: a named group of rules, conventionally one per trigger
//! - `RuleFile`: the two on-disk shapes a rule file may take
//! - `TaggerRulesOptions`: hosted configuration (inline rules, file list, trigger mappings)
//!
//! Enum-valued settings (`operator`, `match`, `trigger`) parse leniently:
//! case, spaces, dashes and underscores are ignored.

mod operator;
mod options;
mod rule;
mod rule_set;
mod trigger;

pub use operator::*;
pub use options::*;
pub use rule::*;
pub use rule_set::*;
pub use trigger::*;

/// Fold a configuration name for lenient comparison.
pub(crate) fn fold_name(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Case-insensitive key used for rule-set names and context fields.
pub(crate) fn fold_key(s: &str) -> String {
    s.trim().to_lowercase()
}
