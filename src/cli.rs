use crate::backend::HttpBackend;
use crate::history::{DeleteOutcome, HistoryStore};
use crate::model::{ClientConfig, HistoryRecord};
use crate::orchestrator::{self, Submit, SubmissionController};
use crate::progress::{step_line, ProgressAnimator, StepState, DEFAULT_STEP_INTERVAL};
use crate::prompts::SamplePrompt;
use crate::render::RenderPlan;
use crate::text_summary;
use crate::view::{Confirm, ConsultView, ProgressMarker, TriggerState};
use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[cfg(test)]
#[path = "cli_test.rs"]
mod cli_test;

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "legal-consult",
    version,
    about = "Legal consultation client with optional TUI",
    group(clap::ArgGroup::new("result_source").args(["query", "sample", "restore"]).multiple(true))
)]
pub struct Cli {
    /// Base URL of the consultation service
    #[arg(long, env = "LEGAL_CONSULT_URL", default_value = "http://127.0.0.1:8000")]
    pub base_url: String,

    /// Submit this query and print the result (no TUI)
    #[arg(long, conflicts_with = "sample")]
    pub query: Option<String>,

    /// Submit one of the built-in example cases (no TUI)
    #[arg(long, value_enum)]
    pub sample: Option<SamplePrompt>,

    /// Print JSON and exit (no TUI)
    #[arg(long, conflicts_with = "text")]
    pub json: bool,

    /// Print text and exit (no TUI)
    #[arg(long)]
    pub text: bool,

    /// Print the stored query history and exit
    #[arg(long, conflicts_with_all = ["query", "sample", "restore", "delete"])]
    pub history: bool,

    /// Print a stored result by history id, without a new consultation
    #[arg(long, value_name = "ID", conflicts_with_all = ["query", "sample", "delete"])]
    pub restore: Option<i64>,

    /// Delete a history record by id
    #[arg(long, value_name = "ID", conflicts_with_all = ["query", "sample"])]
    pub delete: Option<i64>,

    /// Do not ask for confirmation before deleting
    #[arg(long, short = 'y', requires = "delete")]
    pub yes: bool,

    /// Export the consultation (or restored) result as JSON
    #[arg(long, requires = "result_source")]
    pub export_json: Option<PathBuf>,

    /// Interval between progress steps
    #[arg(long, default_value_t = humantime::Duration::from(DEFAULT_STEP_INTERVAL))]
    pub step_interval: humantime::Duration,

    /// Write logs to this file (the TUI defaults to the user cache directory)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log filter, e.g. "info" or "legal_consult=debug"
    #[arg(long, env = "LEGAL_CONSULT_LOG")]
    pub log_level: Option<String>,
}

impl Cli {
    /// Query to submit in one-shot mode, from `--query` or `--sample`.
    pub fn one_shot_query(&self) -> Option<String> {
        self.query
            .clone()
            .or_else(|| self.sample.map(|s| s.text().to_string()))
    }

    /// Whether this invocation opens the interactive UI.
    pub fn is_interactive(&self) -> bool {
        !self.history
            && self.restore.is_none()
            && self.delete.is_none()
            && self.one_shot_query().is_none()
            && !self.json
            && !self.text
    }
}

/// Build a `ClientConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> ClientConfig {
    ClientConfig {
        base_url: args.base_url.clone(),
        user_agent: format!("legal-consult-cli/{}", env!("CARGO_PKG_VERSION")),
        step_interval: Duration::from(args.step_interval),
    }
}

/// Install the tracing subscriber. The TUI owns the terminal, so it logs to a
/// file; one-shot modes log to stderr.
pub fn init_logging(args: &Cli) -> Result<()> {
    let interactive = cfg!(feature = "tui") && args.is_interactive();
    let default_level = if interactive { "info" } else { "warn" };
    let filter = EnvFilter::try_new(args.log_level.as_deref().unwrap_or(default_level))
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let log_file = args
        .log_file
        .clone()
        .or_else(|| interactive.then(crate::storage::default_log_path).flatten());

    let installed = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create log directory {}", parent.display()))?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None if interactive => return Ok(()),
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("install log subscriber: {e}"))
}

pub async fn run(args: Cli) -> Result<()> {
    let cfg = build_config(&args);
    let backend = Arc::new(HttpBackend::new(&cfg)?);

    if args.history {
        return run_history(&args, backend).await;
    }
    if let Some(id) = args.restore {
        return run_restore(&args, backend, id).await;
    }
    if let Some(id) = args.delete {
        return run_delete(&args, backend, id).await;
    }
    if let Some(query) = args.one_shot_query() {
        return run_consult(&args, &cfg, backend, query).await;
    }
    if args.json || args.text {
        return Err(anyhow::anyhow!(
            "--json/--text need --query, --sample, --history, --restore or --delete"
        ));
    }

    #[cfg(feature = "tui")]
    {
        crate::tui::run(cfg, backend).await
    }
    #[cfg(not(feature = "tui"))]
    {
        Err(anyhow::anyhow!(
            "built without TUI support; use --query, --sample or --history"
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Text,
    Json,
}

impl OutputMode {
    fn of(args: &Cli) -> Self {
        if args.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        }
    }
}

/// Line-oriented view: progress and notices on stderr, results on stdout.
/// In JSON mode only machine-readable output reaches stdout.
struct TextView {
    out: mpsc::UnboundedSender<OutputLine>,
    mode: OutputMode,
    steps: Mutex<Vec<String>>,
}

impl TextView {
    fn new(out: mpsc::UnboundedSender<OutputLine>, mode: OutputMode) -> Self {
        Self {
            out,
            mode,
            steps: Mutex::new(Vec::new()),
        }
    }

    fn stdout(&self, line: String) {
        let _ = self.out.send(OutputLine::Stdout(line));
    }

    fn stderr(&self, line: String) {
        let _ = self.out.send(OutputLine::Stderr(line));
    }

    fn steps(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        self.steps
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ConsultView for TextView {
    fn set_trigger(&self, state: TriggerState) {
        tracing::trace!(?state, "submit trigger");
    }

    fn set_query_input(&self, text: &str) {
        if self.mode == OutputMode::Text {
            self.stdout(format!("查詢: {text}"));
            self.stdout(String::new());
        }
    }

    fn clear_progress(&self) {
        self.steps().clear();
    }

    fn push_active_step(&self, label: &str) {
        self.steps().push(label.to_string());
        if self.mode == OutputMode::Text {
            self.stderr(step_line(label, StepState::Active));
        }
    }

    fn settle_step(&self, index: usize) {
        let label = self.steps().get(index).cloned();
        if let (Some(label), OutputMode::Text) = (label, self.mode) {
            self.stderr(step_line(&label, StepState::Settled));
        }
    }

    fn show_progress_marker(&self, marker: ProgressMarker) {
        self.stderr(marker.text().to_string());
    }

    fn render_result(&self, plan: &RenderPlan) {
        if self.mode == OutputMode::Text {
            for line in text_summary::build_text_summary(plan).lines {
                self.stdout(line);
            }
        }
    }

    fn set_result_visible(&self, _visible: bool) {}

    fn scroll_to_result(&self) {}

    fn render_history(&self, records: &[HistoryRecord]) {
        match self.mode {
            OutputMode::Text => {
                for line in text_summary::build_history_lines(records) {
                    self.stdout(line);
                }
            }
            OutputMode::Json => match serde_json::to_string_pretty(records) {
                Ok(json) => self.stdout(json),
                Err(e) => self.stderr(format!("Serialize history failed: {e}")),
            },
        }
    }

    fn set_history_open(&self, _open: bool) {}

    fn notify(&self, message: &str) {
        self.stderr(message.to_string());
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "是")
}

/// Asks on the terminal; `--yes` answers for the user.
struct StdinConfirm {
    assume_yes: bool,
}

impl Confirm for StdinConfirm {
    async fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        let prompt = prompt.to_string();
        tokio::task::spawn_blocking(move || {
            eprint!("{prompt} [y/N] ");
            let _ = std::io::stderr().flush();
            let mut answer = String::new();
            match std::io::stdin().read_line(&mut answer) {
                Ok(_) => is_affirmative(&answer),
                Err(_) => false,
            }
        })
        .await
        .unwrap_or(false)
    }
}

/// Wait for buffered output to be written once every sender is gone.
async fn finish_output(view: Arc<TextView>, handle: tokio::task::JoinHandle<()>) {
    drop(view);
    let _ = handle.await;
}

async fn run_consult(
    args: &Cli,
    cfg: &ClientConfig,
    backend: Arc<HttpBackend>,
    query: String,
) -> Result<()> {
    let (out_tx, out_handle) = spawn_output_writer();
    let mode = OutputMode::of(args);
    let view = Arc::new(TextView::new(out_tx, mode));
    let controller =
        SubmissionController::new(backend, view.clone(), ProgressAnimator::consult(cfg.step_interval));

    let outcome = controller.submit(&query).await;
    drop(controller);

    let mut export_res = Ok(());
    if let Ok(result) = &outcome {
        if mode == OutputMode::Json {
            match serde_json::to_string_pretty(result) {
                Ok(json) => view.stdout(json),
                Err(e) => export_res = Err(e).context("serialize result"),
            }
        }
        if let Some(path) = args.export_json.as_deref() {
            match crate::storage::export_json(path, result) {
                Ok(()) => view.stderr(format!("Exported JSON: {}", path.display())),
                Err(e) => export_res = Err(e),
            }
        }
    }

    finish_output(view, out_handle).await;
    outcome.context("consultation failed")?;
    export_res
}

async fn run_history(args: &Cli, backend: Arc<HttpBackend>) -> Result<()> {
    let (out_tx, out_handle) = spawn_output_writer();
    let view = Arc::new(TextView::new(out_tx, OutputMode::of(args)));
    let store = HistoryStore::new(backend);

    let refreshed = store.refresh(view.as_ref()).await;
    finish_output(view, out_handle).await;
    if refreshed {
        Ok(())
    } else {
        Err(anyhow::anyhow!("failed to load history from {}", args.base_url))
    }
}

async fn run_restore(args: &Cli, backend: Arc<HttpBackend>, id: i64) -> Result<()> {
    let store = HistoryStore::new(backend);
    store.list().await.context("failed to load history")?;
    let record = store
        .find(id)
        .with_context(|| format!("no history record with id {id}"))?;

    let (out_tx, out_handle) = spawn_output_writer();
    let mode = OutputMode::of(args);
    let view = Arc::new(TextView::new(out_tx, mode));
    orchestrator::restore_record(&store, view.as_ref(), &record);
    if mode == OutputMode::Json {
        view.stdout(serde_json::to_string_pretty(store.get(&record))?);
    }

    let export_res = match args.export_json.as_deref() {
        Some(path) => crate::storage::export_json(path, store.get(&record))
            .map(|()| view.stderr(format!("Exported JSON: {}", path.display()))),
        None => Ok(()),
    };
    finish_output(view, out_handle).await;
    export_res
}

async fn run_delete(args: &Cli, backend: Arc<HttpBackend>, id: i64) -> Result<()> {
    let (out_tx, out_handle) = spawn_output_writer();
    let view = Arc::new(TextView::new(out_tx, OutputMode::of(args)));
    let store = HistoryStore::new(backend);
    let confirm = StdinConfirm {
        assume_yes: args.yes,
    };

    let outcome = store.delete(id, &confirm, view.as_ref()).await;
    match outcome {
        DeleteOutcome::Deleted => {
            view.stderr(format!("Deleted #{id}"));
            if args.text || args.json {
                store.refresh(view.as_ref()).await;
            }
        }
        DeleteOutcome::Declined => view.stderr("Cancelled".to_string()),
        DeleteOutcome::Failed => {}
    }
    finish_output(view, out_handle).await;

    if outcome == DeleteOutcome::Failed {
        return Err(anyhow::anyhow!("failed to delete history record {id}"));
    }
    Ok(())
}
