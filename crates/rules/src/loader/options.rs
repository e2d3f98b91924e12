//! Hot-reloadable view of the hosted [`TaggerRulesOptions`].

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, info, warn};

use crate::schema::TaggerRulesOptions;
use crate::validation::validate_options;

use super::error::{Result, RuleError};
use super::file::is_yaml;
use super::watcher::handle_fs_event;

/// Shared handle to the current hosted options.
///
/// Cloning is cheap; all clones observe the same snapshot. Readers take an
/// `Arc` snapshot via [`current`](Self::current) and never block on a reload
/// for longer than the pointer swap.
#[derive(Clone)]
pub struct OptionsMonitor {
    pub(super) state: Arc<MonitorState>,
}

pub(super) struct MonitorState {
    current: RwLock<Arc<TaggerRulesOptions>>,
    path: Option<PathBuf>,
    /// Active filesystem watcher (held to keep it alive).
    watcher: Mutex<Option<RecommendedWatcher>>,
}

impl OptionsMonitor {
    /// Monitor over in-memory options. [`reload`](Self::reload) and
    /// [`watch`](Self::watch) are unavailable.
    pub fn new(options: TaggerRulesOptions) -> Self {
        Self::with_state(options, None)
    }

    /// Load options from a JSON or YAML file (by extension) and validate them.
    ///
    /// Every validation error is listed in the returned [`RuleError::Validation`].
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let options = read_options(&path)?;
        info!(
            path = %path.display(),
            files = options.files.len(),
            rule_sets = options.rule_sets.len(),
            rules = options.rules.len(),
            triggers = options.triggers.len(),
            "loaded tagger options"
        );
        Ok(Self::with_state(options, Some(path)))
    }

    fn with_state(options: TaggerRulesOptions, path: Option<PathBuf>) -> Self {
        Self {
            state: Arc::new(MonitorState {
                current: RwLock::new(Arc::new(options)),
                path,
                watcher: Mutex::new(None),
            }),
        }
    }

    /// Point-in-time snapshot of the options.
    pub fn current(&self) -> Arc<TaggerRulesOptions> {
        Arc::clone(&self.state.current.read().expect("options lock poisoned"))
    }

    /// Swap in new options without validation.
    pub fn replace(&self, options: TaggerRulesOptions) {
        *self.state.current.write().expect("options lock poisoned") = Arc::new(options);
    }

    /// Backing file, when loaded from disk.
    pub fn path(&self) -> Option<&Path> {
        self.state.path.as_deref()
    }

    /// Re-read the backing file. An unreadable or invalid file leaves the
    /// previous options in place.
    pub fn reload(&self) -> Result<()> {
        let path = self.state.path.as_deref().ok_or(RuleError::Unbacked)?;
        match read_options(path) {
            Ok(options) => {
                info!(path = %path.display(), "reloaded tagger options");
                self.replace(options);
                Ok(())
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to reload tagger options, keeping previous version"
                );
                Err(e)
            }
        }
    }

    /// Start a filesystem watcher that reloads the options whenever the
    /// backing file changes. Calling it again replaces the previous watcher.
    pub fn watch(&self) -> Result<()> {
        let path = self.state.path.clone().ok_or(RuleError::Unbacked)?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let state = Arc::downgrade(&self.state);
        let target = path.clone();
        let mut watcher = notify::recommended_watcher(
            move |res: std::result::Result<notify::Event, notify::Error>| match res {
                Ok(event) => handle_fs_event(&event, &target, &state),
                Err(e) => warn!(error = %e, "filesystem watcher error"),
            },
        )?;

        // Watch the directory so editors that replace the file by rename are seen.
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        if let Err(e) = watcher.configure(notify::Config::default().with_poll_interval(Duration::from_millis(500))) {
            debug!(error = %e, "watcher does not accept a poll interval");
        }

        info!(path = %path.display(), "watching tagger options for changes");
        *self.state.watcher.lock().expect("watcher lock poisoned") = Some(watcher);
        Ok(())
    }

    /// Whether a watcher is active.
    pub fn is_watching(&self) -> bool {
        self.state.watcher.lock().expect("watcher lock poisoned").is_some()
    }
}

impl fmt::Debug for OptionsMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionsMonitor")
            .field("path", &self.state.path)
            .field("watching", &self.is_watching())
            .finish()
    }
}

impl Default for OptionsMonitor {
    fn default() -> Self {
        Self::new(TaggerRulesOptions::default())
    }
}

/// Parse and validate an options file.
fn read_options(path: &Path) -> Result<TaggerRulesOptions> {
    let contents = fs::read_to_string(path)?;
    let options = if is_yaml(path) {
        serde_yaml::from_str::<Option<TaggerRulesOptions>>(&contents)?.unwrap_or_default()
    } else if contents.trim().is_empty() {
        TaggerRulesOptions::default()
    } else {
        serde_json::from_str(&contents)?
    };

    let result = validate_options(&options);
    for warning in &result.warnings {
        warn!(path = %path.display(), at = %warning.path, "{}", warning.message);
    }
    if !result.valid {
        return Err(RuleError::Validation(result.error_summary()));
    }
    Ok(options)
}
