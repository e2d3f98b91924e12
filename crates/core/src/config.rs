use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    profiled_env_opt(profile, key)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

fn profiled_env_list(profile: &str, key: &str) -> Vec<String> {
    profiled_env_opt(profile, key)
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

// ── Top-level config ──────────────────────────────────────────

/// Runtime configuration of the tagger worker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaggerConfig {
    /// Active profile name (empty = default).
    pub profile: String,
    /// Root against which relative rule-file paths are resolved.
    pub content_root: PathBuf,
    /// Hosted rule options file (inline rule sets, file list, trigger mappings).
    pub rules_config: Option<PathBuf>,
    /// Extra rule files on top of those listed in the hosted options.
    pub rule_files: Vec<String>,
    /// Reload hosted options when the file changes.
    pub watch_rules: bool,
}

impl TaggerConfig {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `TAGGER_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("TAGGER_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            content_root: PathBuf::from(profiled_env_or(p, "CONTENT_ROOT", ".")),
            rules_config: profiled_env_opt(p, "TAGGER_RULES_CONFIG").map(PathBuf::from),
            rule_files: profiled_env_list(p, "TAGGER_RULE_FILES"),
            watch_rules: profiled_env_bool(p, "TAGGER_WATCH_RULES", false),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  content_root: {}", self.content_root.display());
        tracing::info!(
            "  rules_config: {}",
            self.rules_config
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(none)".to_string())
        );
        tracing::info!("  rule_files:   {}", self.rule_files.len());
        tracing::info!("  watch_rules:  {}", self.watch_rules);
    }
}

impl Default for TaggerConfig {
    fn default() -> Self {
        Self {
            profile: String::new(),
            content_root: PathBuf::from("."),
            rules_config: None,
            rule_files: Vec::new(),
            watch_rules: false,
        }
    }
}
