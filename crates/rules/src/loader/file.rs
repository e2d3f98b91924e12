//! File-backed rule source.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use tracing::{debug, info, warn};

use crate::schema::{RuleFile, RuleSetDefinition};
use crate::validation::validate_rule_sets;

use super::error::{LoadResult, LoadStatus, Result, RuleError};
use super::options::OptionsMonitor;
use super::source::RuleSource;

/// Where the file list comes from.
#[derive(Debug, Clone)]
enum RulePaths {
    Fixed(Vec<String>),
    Options(OptionsMonitor),
}

/// Modification time and length of a rule file as last seen on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fingerprint {
    Missing,
    Present { modified: Option<SystemTime>, len: u64 },
}

impl Fingerprint {
    fn of(path: &Path) -> Self {
        match fs::metadata(path) {
            Ok(meta) if meta.is_file() => Fingerprint::Present {
                modified: meta.modified().ok(),
                len: meta.len(),
            },
            _ => Fingerprint::Missing,
        }
    }
}

/// Parsed outcome of one file, reused until its fingerprint changes.
#[derive(Debug)]
struct CachedFile {
    fingerprint: Fingerprint,
    status: LoadStatus,
    rule_sets: Vec<RuleSetDefinition>,
}

/// Rule files on disk, re-parsed only when they change.
///
/// Every call checks each file's modification time and length, so edits take
/// effect on the next evaluation without a restart while unchanged files are
/// served from the parsed cache (and log nothing). Each configured path is
/// absolute or relative to the content root. A missing file is skipped with a
/// warning. A file that fails to parse or validate contributes nothing.
/// Clones share the cache.
#[derive(Debug, Clone)]
pub struct FileRuleSource {
    content_root: PathBuf,
    paths: RulePaths,
    cache: Arc<Mutex<HashMap<PathBuf, CachedFile>>>,
}

impl FileRuleSource {
    /// Source over a fixed list of paths.
    pub fn new(content_root: impl Into<PathBuf>, paths: Vec<String>) -> Self {
        Self {
            content_root: content_root.into(),
            paths: RulePaths::Fixed(paths),
            cache: Arc::default(),
        }
    }

    /// Source whose paths are the `files` of the current hosted options.
    pub fn from_options(content_root: impl Into<PathBuf>, monitor: OptionsMonitor) -> Self {
        Self {
            content_root: content_root.into(),
            paths: RulePaths::Options(monitor),
            cache: Arc::default(),
        }
    }

    pub fn content_root(&self) -> &Path {
        &self.content_root
    }

    /// Currently configured paths, unresolved.
    pub fn configured_paths(&self) -> Vec<String> {
        match &self.paths {
            RulePaths::Fixed(paths) => paths.clone(),
            RulePaths::Options(monitor) => monitor.current().files.clone(),
        }
    }

    /// Resolve a configured path against the content root.
    pub fn resolve_path(&self, configured: &str) -> PathBuf {
        let path = Path::new(configured.trim());
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.content_root.join(path)
        }
    }

    /// Parse and validate a single rule file.
    ///
    /// Files ending in `.yml`/`.yaml` are read as YAML, everything else as JSON.
    pub fn load_file(&self, path: &Path) -> Result<Vec<RuleSetDefinition>> {
        let contents = fs::read_to_string(path)?;
        let file = if is_yaml(path) {
            RuleFile::from_yaml_str(&contents)?
        } else if contents.trim().is_empty() {
            RuleFile::RuleSets(Vec::new())
        } else {
            RuleFile::from_json_str(&contents)?
        };
        let rule_sets = file.into_rule_sets();

        let result = validate_rule_sets(&rule_sets);
        for warning in &result.warnings {
            warn!(path = %path.display(), at = %warning.path, "{}", warning.message);
        }
        if !result.valid {
            return Err(RuleError::Validation(result.error_summary()));
        }
        Ok(rule_sets)
    }

    /// Load every configured file, reporting a status per file.
    pub fn load_all(&self) -> Vec<LoadResult> {
        self.configured_paths()
            .iter()
            .map(|configured| self.load_configured(configured).0)
            .collect()
    }

    fn load_configured(&self, configured: &str) -> (LoadResult, Vec<RuleSetDefinition>) {
        if configured.trim().is_empty() {
            let result = LoadResult {
                path: PathBuf::new(),
                status: LoadStatus::Skipped {
                    reason: "blank path".to_string(),
                },
            };
            return (result, Vec::new());
        }

        let path = self.resolve_path(configured);
        let fingerprint = Fingerprint::of(&path);

        let mut cache = self.cache.lock().expect("rule file cache lock poisoned");
        if let Some(cached) = cache.get(&path).filter(|c| c.fingerprint == fingerprint) {
            let result = LoadResult {
                path,
                status: cached.status.clone(),
            };
            return (result, cached.rule_sets.clone());
        }

        let (status, rule_sets) = self.parse_configured(&path, fingerprint);
        cache.insert(
            path.clone(),
            CachedFile {
                fingerprint,
                status: status.clone(),
                rule_sets: rule_sets.clone(),
            },
        );
        (LoadResult { path, status }, rule_sets)
    }

    fn parse_configured(&self, path: &Path, fingerprint: Fingerprint) -> (LoadStatus, Vec<RuleSetDefinition>) {
        if fingerprint == Fingerprint::Missing {
            warn!(path = %path.display(), "rule file not found");
            let status = LoadStatus::Skipped {
                reason: "file not found".to_string(),
            };
            return (status, Vec::new());
        }

        match self.load_file(path) {
            Ok(rule_sets) => {
                let rule_count = rule_sets.iter().map(|s| s.rules.len()).sum();
                if rule_count == 0 {
                    info!(path = %path.display(), "rule file contains no rules");
                } else {
                    debug!(path = %path.display(), rule_sets = rule_sets.len(), rule_count, "loaded rule file");
                }
                (LoadStatus::Loaded { rule_count }, rule_sets)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load rule file");
                let status = LoadStatus::Failed {
                    error: e.to_string(),
                };
                (status, Vec::new())
            }
        }
    }
}

impl RuleSource for FileRuleSource {
    fn name(&self) -> &str {
        "file"
    }

    fn rule_sets(&self) -> Vec<RuleSetDefinition> {
        self.configured_paths()
            .iter()
            .flat_map(|configured| self.load_configured(configured).1)
            .collect()
    }
}

pub(super) fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("yml") || e.eq_ignore_ascii_case("yaml"))
        .unwrap_or(false)
}
