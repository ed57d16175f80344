use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use taskdeck_core::{Draft, TaskBoard, TaskId, TaskStatus};
use taskdeck_sync::{run_worker, ApiClient, Synchronizer};
use tokio::sync::mpsc;

mod app;
mod config;
mod logging;
mod state;
mod tui;

use config::Config;

#[derive(Parser, Debug)]
#[command(
    name = "taskdeck",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TASKDECK_BUILD_SHA"), ")"),
    about = "Terminal client for a REST task collection"
)]
struct Cli {
    /// Backend origin serving /api/tasks (overrides TASKDECK_API_URL and config)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive task manager (default)
    Tui,

    /// Print every task
    List {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Create a task (status starts as pending)
    Add {
        #[arg(long)]
        title: String,

        #[arg(long)]
        description: String,
    },

    /// Flip a task between pending and completed
    Toggle { id: String },

    /// Set a task's status explicitly
    SetStatus { id: String, status: TaskStatus },

    /// Delete a task
    Delete { id: String },

    /// Manage ~/.taskdeck/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,

    /// Print the effective config (after flag/env overrides)
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Tui);

    let cfg = config::load_config()?
        .with_overrides(cli.api_url, std::env::var(config::API_URL_ENV).ok());

    if matches!(command, Command::Tui) {
        logging::init_file(&state::log_path()?)?;
    } else {
        logging::init_stderr();
    }

    match command {
        Command::Tui => run_tui(cfg).await?,

        Command::List { json } => {
            let sync = synchronizer(&cfg)?;
            let mut board = TaskBoard::new();
            sync.load(&mut board).await.context("loading tasks")?;
            if json {
                println!("{}", serde_json::to_string_pretty(board.tasks())?);
            } else {
                print_board(&board);
            }
        }

        Command::Add { title, description } => {
            let sync = synchronizer(&cfg)?;
            let mut board = TaskBoard::new();
            *board.draft_mut() = Draft::new(title, description);
            let id = sync.create_from_draft(&mut board).await.context("creating task")?;
            println!("Added task {id}");
        }

        Command::Toggle { id } => {
            let sync = synchronizer(&cfg)?;
            let mut board = TaskBoard::new();
            sync.load(&mut board).await.context("loading tasks")?;
            let id = TaskId::from(id);
            let status = sync
                .toggle_status(&mut board, &id)
                .await
                .with_context(|| format!("toggling task {id}"))?;
            println!("Task {id} is now {}", status.label());
        }

        Command::SetStatus { id, status } => {
            let sync = synchronizer(&cfg)?;
            let mut board = TaskBoard::new();
            let id = TaskId::from(id);
            sync.set_status(&mut board, &id, status)
                .await
                .with_context(|| format!("updating task {id}"))?;
            println!("Task {id} is now {}", status.label());
        }

        Command::Delete { id } => {
            let sync = synchronizer(&cfg)?;
            let mut board = TaskBoard::new();
            let id = TaskId::from(id);
            sync.delete(&mut board, &id)
                .await
                .with_context(|| format!("deleting task {id}"))?;
            println!("Deleted task {id}");
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                println!("# {}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

fn synchronizer(cfg: &Config) -> Result<Synchronizer> {
    let client = ApiClient::new(&cfg.api.base_url, cfg.api.timeout())
        .with_context(|| format!("building client for {}", cfg.api.base_url))?;
    Ok(Synchronizer::new(client))
}

async fn run_tui(cfg: Config) -> Result<()> {
    let client = ApiClient::new(&cfg.api.base_url, cfg.api.timeout())
        .with_context(|| format!("building client for {}", cfg.api.base_url))?;

    let (req_tx, req_rx) = mpsc::unbounded_channel();
    let (ev_tx, ev_rx) = std::sync::mpsc::channel();
    let worker = tokio::spawn(run_worker(client, req_rx, ev_tx));

    let tick = std::time::Duration::from_millis(cfg.ui.tick_millis.max(10));
    let res = tokio::task::spawn_blocking(move || tui::run_tui(tick, req_tx, ev_rx))
        .await
        .context("tui thread panicked")?;

    worker.abort();
    res
}

fn print_board(board: &TaskBoard) {
    if board.is_empty() {
        println!("No tasks.");
        return;
    }
    let width = board.tasks().iter().map(|t| t.id.as_str().len()).max().unwrap_or(2);
    for t in board.tasks() {
        let mark = if t.status.is_completed() { "x" } else { " " };
        println!("[{mark}] {:<width$}  {}", t.id.as_str(), t.title);
        if !t.description.is_empty() {
            println!("    {:<width$}  {}", "", t.description);
        }
    }
    let counts = board.counts();
    println!("\n{} pending, {} completed", counts.pending, counts.completed);
}
