//! tagger-worker: runs integration events through the tagging rule engine.
//!
//! Subcommands:
//! - `validate`: load hosted options and rule files, print the validation report
//! - `evaluate`: evaluate a single event file and print the matched tag IDs
//! - `run`: process newline-delimited JSON events from a file or stdin
//!
//! Configuration comes from the environment (`TAGGER_*`, `CONTENT_ROOT`, with
//! `{PROFILE}_` overrides); command-line flags take precedence.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{error, info, warn};

use tagger_core::{IntegrationEvent, TaggerConfig};
use tagger_rules::loader::{FileRuleSource, InlineRuleSource, LoadStatus, OptionsMonitor, RuleSource};
use tagger_rules::processor::LoggingAssignment;
use tagger_rules::validation::validate_options;
use tagger_rules::{RuleContextFactory, RuleEngine, TaggingEventProcessor};

// ── CLI ─────────────────────────────────────────────────────────────

/// Document tagging worker: validates rules, evaluates events and applies tags.
#[derive(Parser, Debug)]
#[command(name = "tagger-worker", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Hosted rule options file (JSON or YAML).
    #[arg(long, global = true)]
    rules_config: Option<PathBuf>,

    /// Root against which relative rule-file paths are resolved.
    #[arg(long, global = true)]
    content_root: Option<PathBuf>,

    /// Extra rule file; may be repeated.
    #[arg(long = "rule-file", global = true)]
    rule_files: Vec<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate hosted options and every configured rule file.
    Validate,

    /// Evaluate one event (JSON file) and print the outcome.
    Evaluate {
        /// Path to an integration event JSON file.
        #[arg(long)]
        event: PathBuf,
    },

    /// Process newline-delimited JSON events and log the applied tags.
    Run {
        /// Events file (reads stdin if not provided).
        #[arg(long)]
        input: Option<PathBuf>,

        /// Reload the hosted options when the file changes.
        #[arg(long)]
        watch: bool,
    },
}

// ── Wiring ──────────────────────────────────────────────────────────

/// Sources and shared handles assembled from configuration.
struct Runtime {
    monitor: OptionsMonitor,
    file_sources: Vec<FileRuleSource>,
    processor: TaggingEventProcessor,
}

impl Runtime {
    fn build(config: &TaggerConfig) -> anyhow::Result<Self> {
        let monitor = match &config.rules_config {
            Some(path) => OptionsMonitor::load(path)
                .with_context(|| format!("failed to load tagger options from {}", path.display()))?,
            None => {
                warn!("no tagger options configured, using rule-file sources only");
                OptionsMonitor::default()
            }
        };

        let mut file_sources = vec![FileRuleSource::from_options(&config.content_root, monitor.clone())];
        if !config.rule_files.is_empty() {
            file_sources.push(FileRuleSource::new(&config.content_root, config.rule_files.clone()));
        }

        let mut sources: Vec<Arc<dyn RuleSource>> = vec![Arc::new(InlineRuleSource::new(monitor.clone()))];
        sources.extend(
            file_sources
                .iter()
                .cloned()
                .map(|source| Arc::new(source) as Arc<dyn RuleSource>),
        );

        let processor = TaggingEventProcessor::new(
            Arc::new(RuleEngine::new(sources)),
            Arc::new(RuleContextFactory::with_default_enrichers()),
            monitor.clone(),
            Arc::new(LoggingAssignment),
        );

        Ok(Self {
            monitor,
            file_sources,
            processor,
        })
    }
}

// ── Commands ────────────────────────────────────────────────────────

fn validate(config: &TaggerConfig) -> anyhow::Result<ExitCode> {
    let runtime = match Runtime::build(config) {
        Ok(runtime) => runtime,
        Err(e) => {
            let report = serde_json::json!({ "valid": false, "error": format!("{e:#}") });
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(ExitCode::FAILURE);
        }
    };

    let options = validate_options(&runtime.monitor.current());
    let mut valid = options.valid;

    let mut files = Vec::new();
    for source in &runtime.file_sources {
        for result in source.load_all() {
            let status = match &result.status {
                LoadStatus::Loaded { rule_count } => {
                    serde_json::json!({ "status": "loaded", "ruleCount": rule_count })
                }
                LoadStatus::Skipped { reason } => {
                    serde_json::json!({ "status": "skipped", "reason": reason })
                }
                LoadStatus::Failed { error } => {
                    valid = false;
                    serde_json::json!({ "status": "failed", "error": error })
                }
            };
            files.push(serde_json::json!({ "path": result.path.display().to_string(), "result": status }));
        }
    }

    let rules = runtime.processor.engine().current_rules();
    let report = serde_json::json!({
        "valid": valid,
        "options": options,
        "files": files,
        "ruleSets": rules.rule_sets().map(|s| s.name.clone()).collect::<Vec<_>>(),
        "ruleCount": rules.rule_count(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(if valid { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn evaluate(config: &TaggerConfig, event_path: &Path) -> anyhow::Result<ExitCode> {
    let runtime = Runtime::build(config)?;
    let raw = std::fs::read_to_string(event_path)
        .with_context(|| format!("failed to read event file {}", event_path.display()))?;
    let event: IntegrationEvent = serde_json::from_str(&raw).context("invalid integration event")?;

    let outcome = runtime.processor.evaluate(&event);
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(ExitCode::SUCCESS)
}

async fn run(config: &TaggerConfig, input: Option<PathBuf>, watch: bool) -> anyhow::Result<ExitCode> {
    let runtime = Runtime::build(config)?;

    if watch || config.watch_rules {
        match runtime.monitor.watch() {
            Ok(()) => {}
            Err(tagger_rules::RuleError::Unbacked) => warn!("--watch ignored: no tagger options file configured"),
            Err(e) => return Err(e).context("failed to watch tagger options"),
        }
    }

    let reader: Box<dyn AsyncRead + Unpin + Send> = match &input {
        Some(path) => Box::new(
            tokio::fs::File::open(path)
                .await
                .with_context(|| format!("failed to open events file {}", path.display()))?,
        ),
        None => Box::new(tokio::io::stdin()),
    };
    let mut lines = BufReader::new(reader).lines();

    info!(source = %input.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "stdin".into()), "tagger-worker processing events");

    let (mut processed, mut tagged, mut failed) = (0usize, 0usize, 0usize);
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received, stopping");
                break;
            }
        };
        let Some(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }

        let event: IntegrationEvent = match serde_json::from_str(&line) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "skipping malformed event");
                failed += 1;
                continue;
            }
        };

        processed += 1;
        match runtime.processor.handle(&event).await {
            Ok(outcome) => {
                if outcome.is_tagged() {
                    tagged += 1;
                }
                println!("{}", serde_json::to_string(&outcome)?);
            }
            Err(e) => {
                error!(event_id = %event.event_id, document_id = %event.document_id, error = %e, "failed to process event");
                failed += 1;
            }
        }
    }

    info!(processed, tagged, failed, "tagger-worker finished");
    Ok(ExitCode::SUCCESS)
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tagger_core::config::load_dotenv();
    let cli = Cli::parse();

    let mut config = TaggerConfig::from_env();
    if let Some(path) = cli.rules_config {
        config.rules_config = Some(path);
    }
    if let Some(root) = cli.content_root {
        config.content_root = root;
    }
    config.rule_files.extend(cli.rule_files);
    config.log_summary();

    match cli.command {
        Command::Validate => validate(&config),
        Command::Evaluate { event } => evaluate(&config, &event),
        Command::Run { input, watch } => run(&config, input, watch).await,
    }
}
