//! Merging rule sets from every source into one view.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::schema::{fold_key, RuleDefinition, RuleSetDefinition};

use super::source::RuleSource;

/// Rule sets from all sources merged by case-insensitive name.
///
/// Keeps first-seen order of set names; the display name is the first
/// spelling seen. Rebuilt on every evaluation and never cached.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedRules {
    sets: IndexMap<String, RuleSetDefinition>,
}

impl AggregatedRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule set, concatenating onto an existing set of the same
    /// name. Blank-named sets are dropped.
    pub fn push(&mut self, set: RuleSetDefinition) {
        let name = set.name.trim();
        if name.is_empty() {
            return;
        }
        match self.sets.get_mut(&fold_key(name)) {
            Some(existing) => existing.rules.extend(set.rules),
            None => {
                let key = fold_key(name);
                self.sets.insert(
                    key,
                    RuleSetDefinition {
                        name: name.to_string(),
                        rules: set.rules,
                    },
                );
            }
        }
    }

    /// Case-insensitive lookup by rule-set name.
    pub fn get(&self, name: &str) -> Option<&RuleSetDefinition> {
        self.sets.get(&fold_key(name))
    }

    pub fn rule_sets(&self) -> impl Iterator<Item = &RuleSetDefinition> {
        self.sets.values()
    }

    /// Every rule across all sets, in set order.
    pub fn rules(&self) -> impl Iterator<Item = &RuleDefinition> {
        self.sets.values().flat_map(|set| set.rules.iter())
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn rule_count(&self) -> usize {
        self.sets.values().map(|set| set.rules.len()).sum()
    }
}

impl FromIterator<RuleSetDefinition> for AggregatedRules {
    fn from_iter<I: IntoIterator<Item = RuleSetDefinition>>(iter: I) -> Self {
        let mut aggregated = AggregatedRules::new();
        for set in iter {
            aggregated.push(set);
        }
        aggregated
    }
}

/// Query every source in registration order and merge the results.
pub fn aggregate(sources: &[Arc<dyn RuleSource>]) -> AggregatedRules {
    let mut aggregated = AggregatedRules::new();
    for source in sources {
        let sets = source.rule_sets();
        debug!(source = source.name(), rule_sets = sets.len(), "queried rule source");
        for set in sets {
            aggregated.push(set);
        }
    }
    aggregated
}
