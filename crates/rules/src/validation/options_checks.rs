//! Hosted-options checks: file list and trigger mappings.

use tagger_core::EventKind;

use crate::schema::TriggerMapping;

use super::fuzzy::fuzzy_match;
use super::ValidationResult;

pub(super) fn validate_files(files: &[String], result: &mut ValidationResult) {
    for (i, file) in files.iter().enumerate() {
        if file.trim().is_empty() {
            result.warn(format!("files[{i}]"), "blank rule file path is ignored");
        }
    }
}

pub(super) fn validate_triggers(triggers: &[TriggerMapping], result: &mut ValidationResult) {
    let event_names: Vec<&str> = EventKind::ALL.iter().map(|k| k.as_str()).collect();

    for (i, mapping) in triggers.iter().enumerate() {
        let path = format!("triggers[{i}]");
        let event = mapping.event.trim();

        if event.is_empty() {
            result.error(format!("{path}.event"), "trigger mapping requires an event name");
        } else if event.parse::<EventKind>().is_err() {
            let message = format!("unknown event '{event}'");
            match fuzzy_match(event, &event_names) {
                Some(close) => result.error_with_suggestion(format!("{path}.event"), message, close),
                None => result.error(
                    format!("{path}.event"),
                    format!("{message}, expected one of: {}", event_names.join(", ")),
                ),
            }
        }

        if mapping.rule_sets.iter().all(|name| name.trim().is_empty()) {
            result.warn(format!("{path}.ruleSets"), "trigger mapping selects no rule sets");
        } else {
            for (j, name) in mapping.rule_sets.iter().enumerate() {
                if name.trim().is_empty() {
                    result.warn(format!("{path}.ruleSets[{j}]"), "blank rule set name is ignored");
                }
            }
        }
    }
}
