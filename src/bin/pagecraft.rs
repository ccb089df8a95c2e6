//! Command-line front end: render a generated page with its edit ledger
//! replayed, or sample an element the way the inspector would.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{debug, error, info};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use pagecraft::config::EditorConfig;
use pagecraft::ledger::{JsonFileStore, LedgerStore, MemoryStore, StoreError};
use pagecraft::project::ProjectSnapshot;
use pagecraft::render::GeneratedDocument;
use pagecraft::session::{ProjectSession, SessionError};
use pagecraft::StyleEdit;
use pagecraft::viewport::{DeviceClass, UnknownDevice};

#[derive(Debug, Parser)]
#[command(name = "pagecraft", version, about = "Replay visual edits onto generated landing pages")]
struct Cli {
    /// Editor configuration as JSON; unspecified fields keep their defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Device class to lay the page out for (wide, medium, narrow).
    #[arg(long, global = true, default_value = "wide")]
    device: String,

    /// A ledger file (JSON array of edits) to replay instead of a stored one.
    #[arg(long, global = true)]
    edits: Option<PathBuf>,

    /// Directory of stored ledgers, one JSON file per project.
    #[arg(long, global = true, conflicts_with = "edits")]
    store: Option<PathBuf>,

    /// Override the surface root id.
    #[arg(long, global = true)]
    surface_id: Option<String>,

    /// Project id whose ledger is loaded from `--store`.
    #[arg(long, global = true, default_value = "default")]
    project: String,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the edited surface as HTML.
    Render {
        /// An HTML document or a saved project snapshot (JSON).
        input: PathBuf,
    },
    /// Print the sampled inspector fields of the first element matching a selector.
    Inspect { input: PathBuf, selector: String },
    /// Print the edits recorded for the project.
    Ledger { input: PathBuf },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Device(#[from] UnknownDevice),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("no element matches `{0}`")]
    NoMatch(String),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("pagecraft={level}"))))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            eprintln!("pagecraft: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = match &cli.config {
        Some(path) => EditorConfig::from_json(&read(path)?)?,
        None => EditorConfig::default(),
    };
    if let Some(id) = &cli.surface_id {
        config = config.with_surface_id(id.clone());
    }
    let device: DeviceClass = cli.device.parse()?;
    let source = read(cli.command.input())?;

    // a snapshot carries its own ledger; otherwise it comes from the store
    let (document, snapshot) = match serde_json::from_str::<ProjectSnapshot>(&source) {
        Ok(snapshot) => (GeneratedDocument::from_html(&snapshot.code), Some(snapshot)),
        Err(_) => (GeneratedDocument::from_html(&source), None),
    };

    if let Some(dir) = &cli.store {
        let store = JsonFileStore::new(dir);
        debug!(path = %store.path_for(&cli.project).display(), "using stored ledger");
        let session = ProjectSession::open(cli.project.clone(), document, config, store);
        return execute(&cli.command, session, device);
    }

    let mut store = MemoryStore::new();
    let project = match (&cli.edits, snapshot) {
        (Some(path), _) => {
            let edits: Vec<StyleEdit> = serde_json::from_str(&read(path)?)?;
            store.save(&cli.project, &edits)?;
            cli.project.clone()
        }
        (None, Some(snapshot)) => {
            store.save(&snapshot.id, snapshot.ledger().entries())?;
            snapshot.id
        }
        (None, None) => cli.project.clone(),
    };
    let session = ProjectSession::open(project, document, config, store);
    execute(&cli.command, session, device)
}

fn execute<S: LedgerStore>(command: &Command, mut session: ProjectSession<S>, device: DeviceClass) -> Result<(), CliError> {
    session.set_device(device);
    let report = session.last_replay();
    info!(applied = report.applied, skipped = report.skipped, "ledger replayed");

    match command {
        Command::Render { .. } => println!("{}", session.to_html()),
        Command::Inspect { selector, .. } => {
            let node = pagecraft::selector::parse(selector)
                .find_all(session.dom(), session.surface().root())
                .into_iter()
                .next()
                .ok_or_else(|| CliError::NoMatch(selector.clone()))?;
            session.select(node)?;
            if let Some(view) = session.panel().view() {
                println!("{}", view.selector);
                for field in &view.fields {
                    println!("  {}: {}", field.property.key(), field.value);
                }
            }
            if let Some(region) = session.viewport().region(node) {
                println!("  box: {}x{} at ({}, {})", region.width, region.height, region.x, region.y);
            }
        }
        Command::Ledger { .. } => {
            for edit in session.ledger().entries() {
                println!("{} {} = {}", edit.selector, edit.property, edit.value);
            }
        }
    }
    Ok(())
}

impl Command {
    fn input(&self) -> &Path {
        match self {
            Command::Render { input } | Command::Inspect { input, .. } | Command::Ledger { input } => input,
        }
    }
}

fn read(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}
