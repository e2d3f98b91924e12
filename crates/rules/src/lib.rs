//! Declarative document tagging rule engine.
//!
//! This crate provides:
//! - JSON/YAML rule definitions with lenient serde deserialization
//! - Rule contexts built from integration events, extended by pluggable enrichers
//! - Rule sources (code, hosted options, rule files) merged by rule-set name
//! - Hosted options with hot-reload via `notify` watcher
//! - Condition evaluation, trigger eligibility and All/Any match modes
//! - Configuration validation with "Did you mean" suggestions
//! - An event processor that hands matched tags to an assignment port

pub mod context;
pub mod enrichment;
pub mod evaluator;
pub mod loader;
pub mod processor;
pub mod schema;
pub mod selector;
pub mod validation;

pub use context::{RuleContext, RuleContextBuilder, RuleContextFactory};
pub use evaluator::RuleEngine;
pub use loader::{AggregatedRules, OptionsMonitor, RuleError, RuleSource};
pub use processor::{ProcessOutcome, TagAssignment, TaggingEventProcessor};
