//! Single-condition evaluation against a rule context.

use std::num::NonZeroUsize;
use std::sync::{Mutex, OnceLock};

use lru::LruCache;
use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::context::RuleContext;
use crate::schema::{Condition, ConditionOperator};

/// Upper bound on a compiled pattern's size.
const REGEX_SIZE_LIMIT: usize = 1 << 20;

/// Distinct patterns kept compiled across evaluations.
const PATTERN_CACHE_CAPACITY: NonZeroUsize = NonZeroUsize::MIN.saturating_add(511);

/// Compiled patterns by source text; `None` marks a pattern that failed to compile.
static PATTERNS: OnceLock<Mutex<LruCache<String, Option<Regex>>>> = OnceLock::new();

/// Test one condition. All string comparisons are case-insensitive.
///
/// A blank field name, a field missing from the context, no usable expected
/// value, or a blank/invalid regex pattern all make the condition false.
pub fn evaluate_condition(condition: &Condition, context: &RuleContext) -> bool {
    let field = condition.field.trim();
    if field.is_empty() {
        return false;
    }
    let Some(actual) = context.get(field) else {
        return false;
    };

    if condition.operator == ConditionOperator::Regex {
        return condition
            .pattern()
            .map(|pattern| regex_matches(pattern, actual))
            .unwrap_or(false);
    }

    let expected = condition.expected_values();
    if expected.is_empty() {
        return false;
    }

    let actual = actual.to_lowercase();
    let expected: Vec<String> = expected.iter().map(|v| v.to_lowercase()).collect();

    match condition.operator {
        ConditionOperator::Equals | ConditionOperator::In => expected.iter().any(|v| actual == *v),
        ConditionOperator::NotEquals | ConditionOperator::NotIn => {
            expected.iter().all(|v| actual != *v)
        }
        ConditionOperator::Contains => expected.iter().any(|v| actual.contains(v.as_str())),
        ConditionOperator::NotContains => !expected.iter().any(|v| actual.contains(v.as_str())),
        ConditionOperator::StartsWith => expected.iter().any(|v| actual.starts_with(v.as_str())),
        ConditionOperator::EndsWith => expected.iter().any(|v| actual.ends_with(v.as_str())),
        ConditionOperator::Regex => false,
    }
}

/// Compile a condition pattern the way evaluation does.
pub(crate) fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .size_limit(REGEX_SIZE_LIMIT)
        .build()
}

fn regex_matches(pattern: &str, input: &str) -> bool {
    cached_pattern(pattern).is_some_and(|re| re.is_match(input))
}

/// Compile `pattern` once and reuse it until it falls out of the cache.
fn cached_pattern(pattern: &str) -> Option<Regex> {
    let cache = PATTERNS.get_or_init(|| Mutex::new(LruCache::new(PATTERN_CACHE_CAPACITY)));
    let mut cache = cache.lock().expect("pattern cache lock poisoned");
    if let Some(compiled) = cache.get(pattern) {
        return compiled.clone();
    }

    let compiled = match compile_pattern(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            debug!(pattern, error = %e, "invalid condition pattern");
            None
        }
    };
    cache.put(pattern.to_string(), compiled.clone());
    compiled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RuleContextBuilder;
    use uuid::Uuid;

    fn context() -> RuleContext {
        let mut builder = RuleContextBuilder::new(Uuid::nil(), "Invoice March 2024.pdf");
        builder
            .add_field("extension", ".pdf")
            .add_metadata_entry("Department", "  Finance ");
        builder.build()
    }

    fn check(field: &str, operator: ConditionOperator, value: &str) -> bool {
        evaluate_condition(&Condition::new(field, operator, value), &context())
    }

    #[test]
    fn string_operators_ignore_case() {
        assert!(check("title", ConditionOperator::Contains, "INVOICE"));
        assert!(check("title", ConditionOperator::StartsWith, "invoice"));
        assert!(check("title", ConditionOperator::EndsWith, ".PDF"));
        assert!(check("department", ConditionOperator::Equals, "finance"));
        assert!(check("Extension", ConditionOperator::Equals, " .PDF "));
        assert!(!check("department", ConditionOperator::NotEquals, "FINANCE"));
        assert!(check("title", ConditionOperator::NotContains, "receipt"));
        assert!(!check("title", ConditionOperator::NotContains, "march"));
    }

    #[test]
    fn list_operators() {
        let ctx = context();
        let is_in = Condition::with_values("extension", ConditionOperator::In, [".doc", ".PDF"]);
        let not_in = Condition::with_values("extension", ConditionOperator::NotIn, [".doc", ".pdf"]);
        let not_in_other = Condition::with_values("extension", ConditionOperator::NotIn, [".doc"]);
        assert!(evaluate_condition(&is_in, &ctx));
        assert!(!evaluate_condition(&not_in, &ctx));
        assert!(evaluate_condition(&not_in_other, &ctx));
    }

    #[test]
    fn missing_field_or_values_is_false() {
        assert!(!check("author", ConditionOperator::NotEquals, "anyone"));
        assert!(!check("  ", ConditionOperator::Contains, "a"));
        assert!(!check("title", ConditionOperator::Contains, "   "));

        let blank_values = Condition::with_values("title", ConditionOperator::NotIn, ["", " "]);
        assert!(!evaluate_condition(&blank_values, &context()));
    }

    #[test]
    fn values_take_precedence_over_value() {
        let mut condition = Condition::with_values("department", ConditionOperator::Equals, ["hr"]);
        condition.value = Some("finance".into());
        assert!(!evaluate_condition(&condition, &context()));

        condition.values = Some(Vec::new());
        assert!(evaluate_condition(&condition, &context()));
    }

    #[test]
    fn regex_uses_value_as_pattern() {
        assert!(check("title", ConditionOperator::Regex, r"^invoice\s+\w+\s+\d{4}"));
        assert!(!check("title", ConditionOperator::Regex, r"^receipt"));

        let mut condition = Condition::with_values("title", ConditionOperator::Regex, ["invoice"]);
        assert!(!evaluate_condition(&condition, &context()));
        condition.value = Some("MARCH".into());
        assert!(evaluate_condition(&condition, &context()));
    }

    #[test]
    fn invalid_or_blank_regex_is_false() {
        assert!(!check("title", ConditionOperator::Regex, "(unclosed"));
        assert!(!check("title", ConditionOperator::Regex, "  "));
        // Look-around is unsupported by the linear-time engine.
        assert!(!check("title", ConditionOperator::Regex, "(?=invoice)"));
    }

    #[test]
    fn patterns_are_compiled_once() {
        let valid = r"^invoice\s+march\s+#cached";
        let invalid = "(unclosed #cached";
        let first = cached_pattern(valid).unwrap();
        assert!(cached_pattern(invalid).is_none());

        let cache = PATTERNS.get().unwrap().lock().unwrap();
        assert!(cache.peek(valid).unwrap().as_ref().is_some_and(|re| re.as_str() == first.as_str()));
        assert!(matches!(cache.peek(invalid), Some(None)));
        drop(cache);

        assert!(check("title", ConditionOperator::Regex, r"march\s+2024"));
        assert!(check("title", ConditionOperator::Regex, r"march\s+2024"));
    }

    #[test]
    fn pathological_pattern_completes() {
        let mut builder = RuleContextBuilder::new(Uuid::nil(), "t");
        builder.add_field("body", &format!("{}!", "a".repeat(5_000)));
        let condition = Condition::new("body", ConditionOperator::Regex, "^(a+)+$");
        assert!(!evaluate_condition(&condition, &builder.build()));
    }
}
