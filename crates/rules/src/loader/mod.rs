//! Rule sources and their aggregation.
//!
//! Rules come from code, from the hosted options (inline rule sets and flat
//! rules) and from rule files on disk. Every source is queried on each
//! evaluation and the results are merged by rule-set name. The hosted options
//! are held by an [`OptionsMonitor`] which can hot-reload them via a `notify`
//! watcher.

mod aggregate;
mod error;
mod file;
mod options;
mod source;
mod watcher;

#[cfg(test)]
mod tests;

pub use self::aggregate::{aggregate, AggregatedRules};
pub use self::error::{LoadResult, LoadStatus, Result, RuleError};
pub use self::file::FileRuleSource;
pub use self::options::OptionsMonitor;
pub use self::source::{CodeRuleSource, InlineRuleSource, RuleSource};
