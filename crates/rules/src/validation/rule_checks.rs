//! Rule-set, rule and condition checks.

use crate::evaluator::compile_pattern;
use crate::schema::{fold_name, rule_set_names, Condition, ConditionOperator, RuleDefinition, RuleSetDefinition};

use super::fuzzy::fuzzy_match;
use super::ValidationResult;

// ── Rule sets ───────────────────────────────────────────────────────

pub(super) fn validate_rule_sets(sets: &[RuleSetDefinition], path: &str, result: &mut ValidationResult) {
    for (i, set) in sets.iter().enumerate() {
        let set_path = format!("{path}[{i}]");
        let name = set.name.trim();

        if name.is_empty() {
            result.error(format!("{set_path}.name"), "rule set name is required");
        } else if !is_conventional(name) {
            // Custom names are fine; only near-misses of a conventional name are flagged.
            if let Some(close) = fuzzy_match(name, rule_set_names::ALL) {
                result.warn(
                    format!("{set_path}.name"),
                    format!(
                        "rule set '{name}' is not a trigger rule set. Did you mean '{close}'?"
                    ),
                );
            }
        }

        validate_rules(&set.rules, &format!("{set_path}.rules"), result);
    }
}

fn is_conventional(name: &str) -> bool {
    rule_set_names::ALL
        .iter()
        .any(|known| fold_name(known) == fold_name(name))
}

// ── Rules ───────────────────────────────────────────────────────────

pub(super) fn validate_rules(rules: &[RuleDefinition], path: &str, result: &mut ValidationResult) {
    for (i, rule) in rules.iter().enumerate() {
        validate_rule(rule, &format!("{path}[{i}]"), result);
    }
}

fn validate_rule(rule: &RuleDefinition, path: &str, result: &mut ValidationResult) {
    if rule.name.trim().is_empty() {
        result.error(format!("{path}.name"), "rule name is required");
    }

    if !rule.has_tag() {
        result.error(
            format!("{path}.tagId"),
            format!("rule '{}' requires a non-empty tagId", rule.label()),
        );
    }

    if !rule.enabled {
        result.warn(format!("{path}.enabled"), format!("rule '{}' is disabled", rule.label()));
    }

    for (i, condition) in rule.conditions.iter().enumerate() {
        validate_condition(condition, &format!("{path}.conditions[{i}]"), result);
    }
}

// ── Conditions ──────────────────────────────────────────────────────

fn validate_condition(condition: &Condition, path: &str, result: &mut ValidationResult) {
    if condition.field.trim().is_empty() {
        result.error(format!("{path}.field"), "condition field is required");
    }

    let has_values = condition.values.as_ref().is_some_and(|v| !v.is_empty());
    let has_value = condition.value.as_ref().is_some_and(|v| !v.trim().is_empty());

    if condition.operator == ConditionOperator::Regex {
        match condition.pattern() {
            None => result.error(format!("{path}.value"), "Regex condition requires a pattern in 'value'"),
            Some(pattern) => {
                if let Err(e) = compile_pattern(pattern) {
                    result.error(format!("{path}.value"), format!("invalid regex pattern '{pattern}': {e}"));
                }
            }
        }
        if has_values {
            result.warn(format!("{path}.values"), "Regex conditions ignore 'values'; the pattern is read from 'value'");
        }
        return;
    }

    if condition.expected_values().is_empty() {
        result.warn(
            format!("{path}.value"),
            format!("{} condition has no value and never matches", condition.operator),
        );
    } else if has_values && has_value {
        result.warn(
            format!("{path}.value"),
            "both 'value' and 'values' are set; 'values' takes precedence",
        );
    }
}
