//! CLI entry point for tasklist.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tasklist_app::{ProjectConfig, SyncError, TaskSync};
use tasklist_core::{TaskFilter, TaskId};
use tasklist_server::TaskServer;
use tasklist_store_http::{HttpTaskStore, StoreError};
use tokio::net::TcpListener;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod commands;

/// To-do list kept in sync with a REST task store.
#[derive(Parser, Debug)]
#[command(
    name = "tasklist",
    version,
    about = "tasklist: list, add, toggle, rename and delete tasks on a /tasks REST store"
)]
struct Cli {
    /// Directory containing `.tasklist/config.toml` (defaults to current).
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Remote store URL, overriding config and `TASKLIST_BASE_URL`.
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(flatten)]
    Task(TaskCommand),

    /// Run the in-memory reference task store.
    Serve {
        /// Listen address (defaults to `server.bind`).
        #[arg(long)]
        bind: Option<String>,
    },
}

/// Commands that talk to a remote store.
#[derive(Subcommand, Debug)]
enum TaskCommand {
    /// List tasks.
    Ls {
        /// all, completed or incomplete (defaults to `sync.default_filter`).
        #[arg(short, long)]
        filter: Option<TaskFilter>,
        #[arg(long, value_enum, default_value_t = LsFormat::Table)]
        format: LsFormat,
    },

    /// Create a task.
    Add { title: String },

    /// Flip a task between completed and incomplete.
    Toggle { id: TaskId },

    /// Give a task a new title.
    Rename { id: TaskId, title: String },

    /// Delete a task.
    Rm { id: TaskId },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum LsFormat {
    #[default]
    Table,
    Json,
}

fn main() -> Result<()> {
    let Cli { dir, base_url, cmd } = Cli::parse();

    install_tracing();

    let dir = dir.unwrap_or_else(|| PathBuf::from("."));
    let mut config = ProjectConfig::load(&dir)?;
    if let Some(base_url) = base_url {
        config.remote.base_url = base_url;
        config.validate()?;
    }

    tokio::runtime::Runtime::new()?.block_on(execute_command(config, cmd))
}

async fn execute_command(config: ProjectConfig, command: Command) -> Result<()> {
    match command {
        Command::Serve { bind } => {
            let bind = bind.unwrap_or(config.server.bind);
            let listener = TcpListener::bind(&bind)
                .await
                .with_context(|| format!("failed to bind {bind}"))?;
            TaskServer::new().serve(listener, shutdown_signal()).await?;
            Ok(())
        }

        Command::Task(command) => {
            let base_url = config.remote.base_url.clone();
            let store = HttpTaskStore::new(&base_url, config.remote.timeout())?;
            let sync = TaskSync::with_options(store, config.sync.options());
            let mut stdout = io::stdout().lock();
            commands::run(command, &sync, config.sync.default_filter, &mut stdout)
                .await
                .map_err(|err| with_connection_hint(err, &base_url))
        }
    }
}

/// Point at the configured URL when the store could not be reached at all.
fn with_connection_hint(err: anyhow::Error, base_url: &str) -> anyhow::Error {
    let unreachable = err
        .downcast_ref::<SyncError>()
        .and_then(SyncError::store_failure)
        .and_then(|source| source.downcast_ref::<StoreError>())
        .is_some_and(StoreError::is_transport);
    if unreachable {
        err.context(format!("could not reach the task store at {base_url}"))
    } else {
        err
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

fn install_tracing() {
    // RUST_LOG is honoured; INFO otherwise.
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .compact()
        .try_init();
}
