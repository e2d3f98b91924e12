//! Rule configuration validation with structured errors and suggestions.
//!
//! Validates rule sets, flat rules and hosted options. Returns a
//! [`ValidationResult`] with errors (reject the configuration) and warnings
//! (advisory). Every offending entry is reported; validation never stops at
//! the first problem.

mod options_checks;
mod rule_checks;

pub mod fuzzy;


use serde::{Deserialize, Serialize};

use crate::schema::{RuleDefinition, RuleSetDefinition, TaggerRulesOptions};

// ── Result types ────────────────────────────────────────────────────

/// Overall validation outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

/// A blocking validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    /// JSON-path-like location, e.g. `"ruleSets[0].rules[2].tagId"`.
    pub path: String,
    pub message: String,
    /// Optional "Did you mean …?" suggestion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// A non-blocking advisory warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationResult {
    pub(crate) fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
            suggestion: None,
        });
    }

    pub(crate) fn error_with_suggestion(
        &mut self,
        path: impl Into<String>,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) {
        self.valid = false;
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
            suggestion: Some(suggestion.into()),
        });
    }

    pub(crate) fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationWarning {
            path: path.into(),
            message: message.into(),
        });
    }

    /// One line per error, `path: message (Did you mean 'x'?)`, joined with `"; "`.
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| {
                let mut line = if e.path.is_empty() {
                    e.message.clone()
                } else {
                    format!("{}: {}", e.path, e.message)
                };
                if let Some(suggestion) = &e.suggestion {
                    line.push_str(&format!(" (Did you mean '{suggestion}'?)"));
                }
                line
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

// ── Public API ──────────────────────────────────────────────────────

/// Validate named rule sets, e.g. the contents of one rule file.
pub fn validate_rule_sets(rule_sets: &[RuleSetDefinition]) -> ValidationResult {
    let mut result = ValidationResult::new();
    rule_checks::validate_rule_sets(rule_sets, "ruleSets", &mut result);
    result
}

/// Validate a flat list of rules.
pub fn validate_rules(rules: &[RuleDefinition]) -> ValidationResult {
    let mut result = ValidationResult::new();
    rule_checks::validate_rules(rules, "rules", &mut result);
    result
}

/// Validate hosted options: inline rule sets, flat rules, file list and
/// trigger mappings.
pub fn validate_options(options: &TaggerRulesOptions) -> ValidationResult {
    let mut result = ValidationResult::new();
    rule_checks::validate_rule_sets(&options.rule_sets, "ruleSets", &mut result);
    rule_checks::validate_rules(&options.rules, "rules", &mut result);
    options_checks::validate_files(&options.files, &mut result);
    options_checks::validate_triggers(&options.triggers, &mut result);
    result
}
