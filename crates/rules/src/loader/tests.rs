//! Tests for rule sources, aggregation and the options monitor.

use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tempfile::TempDir;
use uuid::Uuid;

use super::*;
use crate::schema::{
    rule_set_names, Condition, ConditionOperator, RuleDefinition, RuleSetDefinition,
    TaggerRulesOptions, Trigger,
};

const RULE_SETS_JSON: &str = r#"
[
  {
    "name": "Document Uploaded",
    "rules": [
      {
        "name": "Invoices",
        "tagId": "6f1c2b0e-8d7a-4c39-9a51-0e2f3b4c5d6e",
        "conditions": [
          { "field": "title", "operator": "Contains", "value": "invoice" }
        ]
      }
    ]
  }
]
"#;

const DOCUMENT_YAML: &str = r#"
rules:
  - name: Scans
    tagId: 0b7d3f52-4a1e-4f0c-8e6b-2c9d1a7e5f30
    trigger: OcrCompleted
    conditions:
      - field: extension
        operator: In
        values: [".png", ".jpg"]
  - name: Everything
    tagId: 9a8b7c6d-5e4f-4a3b-8c2d-1e0f9a8b7c6d
"#;

const INVALID_JSON: &str = r#"
[
  {
    "name": "Document Uploaded",
    "rules": [
      { "name": "No tag", "conditions": [ { "field": "", "value": "x" } ] }
    ]
  }
]
"#;

fn tag(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

fn temp_root() -> TempDir {
    TempDir::new().expect("create tempdir")
}

/// Counts `WARN` events emitted while installed as the thread's subscriber.
struct WarnCounter(Arc<AtomicUsize>);

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for WarnCounter {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        if *event.metadata().level() == tracing::Level::WARN {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

fn count_warnings(f: impl FnOnce()) -> usize {
    use tracing_subscriber::layer::SubscriberExt;

    let count = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(WarnCounter(Arc::clone(&count)));
    tracing::subscriber::with_default(subscriber, f);
    count.load(Ordering::SeqCst)
}

// ── FileRuleSource ──────────────────────────────────────────────────

#[test]
fn loads_rule_set_list_relative_to_content_root() {
    let dir = temp_root();
    fs::write(dir.path().join("tagging.json"), RULE_SETS_JSON).unwrap();

    let source = FileRuleSource::new(dir.path(), vec!["tagging.json".into()]);
    let sets = source.rule_sets();

    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].name, "Document Uploaded");
    assert_eq!(sets[0].rules[0].name, "Invoices");
}

#[test]
fn yaml_document_groups_flat_rules_by_trigger() {
    let dir = temp_root();
    let path = dir.path().join("rules.yaml");
    fs::write(&path, DOCUMENT_YAML).unwrap();

    // Absolute path ignores the content root.
    let source = FileRuleSource::new("/nonexistent", vec![path.display().to_string()]);
    let sets = source.rule_sets();

    let names: Vec<_> = sets.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec![rule_set_names::DOCUMENT_UPLOADED, rule_set_names::OCR_COMPLETED]);
    // "Everything" has trigger All and lands in both sets.
    assert_eq!(sets[0].rules.len(), 1);
    assert_eq!(sets[1].rules.len(), 2);
}

#[test]
fn missing_file_is_skipped() {
    let dir = temp_root();
    let source = FileRuleSource::new(dir.path(), vec!["missing.json".into(), "  ".into()]);

    assert!(source.rule_sets().is_empty());
    let results = source.load_all();
    assert_eq!(results.len(), 2);
    assert!(results
        .iter()
        .all(|r| matches!(r.status, LoadStatus::Skipped { .. })));
}

#[test]
fn malformed_file_contributes_nothing() {
    let dir = temp_root();
    fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
    fs::write(dir.path().join("good.json"), RULE_SETS_JSON).unwrap();

    let source = FileRuleSource::new(dir.path(), vec!["broken.json".into(), "good.json".into()]);
    assert_eq!(source.rule_sets().len(), 1);

    let results = source.load_all();
    assert!(matches!(results[0].status, LoadStatus::Failed { .. }));
    assert_eq!(results[1].status, LoadStatus::Loaded { rule_count: 1 });
}

#[test]
fn invalid_file_lists_every_error() {
    let dir = temp_root();
    let path = dir.path().join("invalid.json");
    fs::write(&path, INVALID_JSON).unwrap();

    let source = FileRuleSource::new(dir.path(), vec!["invalid.json".into()]);
    assert!(source.rule_sets().is_empty());

    let err = source.load_file(&path).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("tagId"), "{message}");
    assert!(message.contains("field"), "{message}");
}

#[test]
fn empty_files_load_with_zero_rules() {
    let dir = temp_root();
    fs::write(dir.path().join("empty.json"), "{}").unwrap();
    fs::write(dir.path().join("empty.yml"), "").unwrap();

    let source = FileRuleSource::new(dir.path(), vec!["empty.json".into(), "empty.yml".into()]);
    let results = source.load_all();
    assert!(results
        .iter()
        .all(|r| r.status == LoadStatus::Loaded { rule_count: 0 }));
}

#[test]
fn file_edits_are_seen_on_next_call() {
    let dir = temp_root();
    let path = dir.path().join("tagging.json");
    fs::write(&path, "[]").unwrap();

    let source = FileRuleSource::new(dir.path(), vec!["tagging.json".into()]);
    assert!(source.rule_sets().is_empty());

    fs::write(&path, RULE_SETS_JSON).unwrap();
    assert_eq!(source.rule_sets().len(), 1);
}

#[test]
fn unchanged_files_are_parsed_and_reported_once() {
    let dir = temp_root();
    fs::write(
        dir.path().join("tagging.json"),
        r#"[ { "name": "Document Uploaded", "rules": [
               { "name": "Off", "tagId": "6f1c2b0e-8d7a-4c39-9a51-0e2f3b4c5d6e", "enabled": false } ] } ]"#,
    )
    .unwrap();
    let source = FileRuleSource::new(dir.path(), vec!["tagging.json".into(), "missing.json".into()]);

    // One warning for the disabled rule, one for the missing file.
    assert_eq!(count_warnings(|| assert_eq!(source.rule_sets().len(), 1)), 2);
    assert_eq!(
        count_warnings(|| {
            for _ in 0..4 {
                assert_eq!(source.rule_sets().len(), 1);
            }
            assert_eq!(source.clone().load_all().len(), 2);
        }),
        0
    );

    // The file appearing is a change and is picked up.
    fs::write(dir.path().join("missing.json"), RULE_SETS_JSON).unwrap();
    assert_eq!(count_warnings(|| assert_eq!(source.rule_sets().len(), 2)), 0);
}

#[test]
fn file_paths_follow_options() {
    let dir = temp_root();
    fs::write(dir.path().join("a.json"), RULE_SETS_JSON).unwrap();

    let monitor = OptionsMonitor::default();
    let source = FileRuleSource::from_options(dir.path(), monitor.clone());
    assert!(source.rule_sets().is_empty());

    monitor.replace(TaggerRulesOptions {
        files: vec!["a.json".into()],
        ..Default::default()
    });
    assert_eq!(source.rule_sets().len(), 1);
}

// ── Code and inline sources ─────────────────────────────────────────

#[test]
fn code_source_groups_by_trigger() {
    let rules = vec![
        RuleDefinition::new("a", tag(1)).with_trigger(Trigger::DocumentUploaded),
        RuleDefinition::new("b", tag(2)),
    ];
    let source = CodeRuleSource::new("code", rules);

    let sets = source.rule_sets();
    assert_eq!(sets.len(), 2);
    assert_eq!(sets[0].rules.len(), 2);
    assert_eq!(sets[1].rules.len(), 1);
    // Flattened rules are the originals, not the grouped copies.
    assert_eq!(source.rules().len(), 2);
}

#[test]
fn inline_source_reads_current_options() {
    let monitor = OptionsMonitor::new(TaggerRulesOptions {
        rule_sets: vec![RuleSetDefinition::new(
            "Custom",
            vec![RuleDefinition::new("x", tag(3))],
        )],
        rules: vec![RuleDefinition::new("y", tag(4)).with_trigger(Trigger::OcrCompleted)],
        ..Default::default()
    });
    let source = InlineRuleSource::new(monitor.clone());

    let names: Vec<_> = source.rule_sets().into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["Custom", rule_set_names::OCR_COMPLETED]);

    monitor.replace(TaggerRulesOptions::default());
    assert!(source.rule_sets().is_empty());
}

// ── Aggregation ─────────────────────────────────────────────────────

#[test]
fn aggregate_merges_case_insensitively_in_source_order() {
    let first: Arc<dyn RuleSource> = Arc::new(CodeRuleSource::from_rule_sets(
        "first",
        vec![RuleSetDefinition::new("Document Uploaded", vec![RuleDefinition::new("r1", tag(1))])],
    ));
    let second: Arc<dyn RuleSource> = Arc::new(CodeRuleSource::from_rule_sets(
        "second",
        vec![
            RuleSetDefinition::new("document uploaded", vec![RuleDefinition::new("r2", tag(2))]),
            RuleSetDefinition::new("   ", vec![RuleDefinition::new("dropped", tag(3))]),
        ],
    ));

    let aggregated = aggregate(&[first, second]);

    assert_eq!(aggregated.len(), 1);
    let set = aggregated.get("DOCUMENT UPLOADED").unwrap();
    assert_eq!(set.name, "Document Uploaded");
    let names: Vec<_> = set.rules.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["r1", "r2"]);
    assert_eq!(aggregated.rule_count(), 2);
}

#[test]
fn aggregate_is_idempotent() {
    let source: Arc<dyn RuleSource> = Arc::new(CodeRuleSource::new(
        "code",
        vec![RuleDefinition::new("r", tag(1)).with_condition(Condition::new(
            "title",
            ConditionOperator::Contains,
            "x",
        ))],
    ));
    let sources = vec![source];
    assert_eq!(aggregate(&sources), aggregate(&sources));
}

#[test]
fn aggregate_of_nothing_is_empty() {
    assert!(aggregate(&[]).is_empty());
}

// ── OptionsMonitor ──────────────────────────────────────────────────

const OPTIONS_JSON: &str = r#"
{
  "files": ["tagging.json"],
  "triggers": [ { "event": "DocumentUploaded", "ruleSets": ["Document Uploaded"] } ]
}
"#;

#[test]
fn monitor_loads_json_and_yaml() {
    let dir = temp_root();
    let json = dir.path().join("options.json");
    fs::write(&json, OPTIONS_JSON).unwrap();
    let monitor = OptionsMonitor::load(&json).unwrap();
    assert_eq!(monitor.current().files, vec!["tagging.json"]);
    assert_eq!(monitor.path(), Some(json.as_path()));

    let yaml = dir.path().join("options.yaml");
    fs::write(&yaml, "files:\n  - a.yml\n  - b.json\n").unwrap();
    let monitor = OptionsMonitor::load(&yaml).unwrap();
    assert_eq!(monitor.current().files.len(), 2);
}

#[test]
fn monitor_rejects_invalid_options_with_all_errors() {
    let dir = temp_root();
    let path = dir.path().join("options.json");
    fs::write(
        &path,
        r#"{ "rules": [ { "name": "", "tagId": "00000000-0000-0000-0000-000000000000" } ] }"#,
    )
    .unwrap();

    let err = OptionsMonitor::load(&path).unwrap_err();
    assert!(matches!(err, RuleError::Validation(_)));
    let message = err.to_string();
    assert!(message.contains("name"), "{message}");
    assert!(message.contains("tagId"), "{message}");
}

#[test]
fn reload_keeps_previous_options_on_failure() {
    let dir = temp_root();
    let path = dir.path().join("options.json");
    fs::write(&path, OPTIONS_JSON).unwrap();
    let monitor = OptionsMonitor::load(&path).unwrap();
    let before = monitor.current();

    fs::write(&path, "{ broken").unwrap();
    assert!(monitor.reload().is_err());
    assert_eq!(monitor.current(), before);

    fs::write(&path, r#"{ "files": ["other.json"] }"#).unwrap();
    monitor.reload().unwrap();
    assert_eq!(monitor.current().files, vec!["other.json"]);
    // The earlier snapshot is unaffected.
    assert_eq!(before.files, vec!["tagging.json"]);
}

#[test]
fn in_memory_monitor_cannot_reload_or_watch() {
    let monitor = OptionsMonitor::default();
    assert!(matches!(monitor.reload(), Err(RuleError::Unbacked)));
    assert!(matches!(monitor.watch(), Err(RuleError::Unbacked)));
    assert!(!monitor.is_watching());
}

#[test]
fn watch_starts_watcher() {
    let dir = temp_root();
    let path = dir.path().join("options.json");
    fs::write(&path, OPTIONS_JSON).unwrap();

    let monitor = OptionsMonitor::load(&path).unwrap();
    monitor.watch().unwrap();
    assert!(monitor.is_watching());
}
