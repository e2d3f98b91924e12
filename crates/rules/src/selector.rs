//! Chooses which rule sets run for an integration event.

use std::collections::HashSet;

use tagger_core::EventKind;

use crate::schema::{fold_key, TaggerRulesOptions};

/// Resolves the `triggers` mappings of the hosted options.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleSetSelector;

impl RuleSetSelector {
    /// Rule-set names configured for `kind`, trimmed and de-duplicated
    /// case-insensitively, in configuration order.
    ///
    /// Mappings whose event name does not parse are skipped. An empty result
    /// means no mapping applies and every rule set is evaluated.
    pub fn select(options: &TaggerRulesOptions, kind: EventKind) -> Vec<String> {
        let mut seen = HashSet::new();
        options
            .triggers
            .iter()
            .filter(|mapping| mapping.event.trim().parse::<EventKind>().ok() == Some(kind))
            .flat_map(|mapping| mapping.rule_sets.iter())
            .map(|name| name.trim())
            .filter(|name| !name.is_empty() && seen.insert(fold_key(name)))
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TriggerMapping;

    fn mapping(event: &str, rule_sets: &[&str]) -> TriggerMapping {
        TriggerMapping {
            event: event.to_string(),
            rule_sets: rule_sets.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn selects_sets_for_matching_event() {
        let options = TaggerRulesOptions {
            triggers: vec![
                mapping("DocumentUploaded", &["Document Uploaded", " Finance "]),
                mapping("ocr-completed", &["OCR Completed"]),
                mapping("document uploaded", &["finance", "Legal", ""]),
                mapping("Unknown", &["Ignored"]),
            ],
            ..Default::default()
        };

        assert_eq!(
            RuleSetSelector::select(&options, EventKind::DocumentUploaded),
            vec!["Document Uploaded", "Finance", "Legal"]
        );
        assert_eq!(
            RuleSetSelector::select(&options, EventKind::OcrCompleted),
            vec!["OCR Completed"]
        );
    }

    #[test]
    fn no_mappings_select_nothing() {
        let options = TaggerRulesOptions::default();
        assert!(RuleSetSelector::select(&options, EventKind::DocumentUploaded).is_empty());
    }
}
