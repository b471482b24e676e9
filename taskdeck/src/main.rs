//! `taskdeck` -- workspace-scoped task manager.
//!
//! Talks to a task store over HTTP. The bound workspace name is kept in a
//! small state file between runs; the password never is. Configuration via
//! CLI flags, environment variables, or config file
//! (`~/.config/taskdeck/config.toml`).
//!
//! ```bash
//! # Start a store locally
//! cargo run --bin taskdeck-server
//!
//! # Create a workspace and add a task
//! TASKDECK_PASSWORD=secret1 cargo run --bin taskdeck -- workspace create alice
//! cargo run --bin taskdeck -- add "Buy milk" --priority high --due 2025-01-31
//! cargo run --bin taskdeck -- list --sort priority
//! ```

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;

use taskdeck::app::{App, AppError};
use taskdeck::cli::{Command, WorkspaceArgs, WorkspaceCommand};
use taskdeck::config::{CliArgs, ClientConfig};
use taskdeck::remote::RemoteStore;
use taskdeck::remote::http::HttpStore;
use taskdeck::session::{FileNameStore, NameStore};
use taskdeck::tasks::Deletion;
use taskdeck::ui;
use taskdeck_proto::task::{Task, TaskDraft};

/// Failures reported by the binary before exiting non-zero.
#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error(transparent)]
    App(#[from] AppError),

    #[error("{}", ui::PROMPT_HINT)]
    Unbound,

    #[error("failed to read password: {0}")]
    Password(#[from] io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CliArgs::parse();

    // Load and resolve configuration (CLI args > env > config file > defaults).
    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Logs go to a file so stdout stays clean for command output.
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!(server = %config.server_url, "taskdeck starting");

    let remote = match HttpStore::new(&config.server_url, config.request_timeout) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let state_path = match config.state_file.clone().map_or_else(FileNameStore::default_path, Ok) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut app =
        App::new(Arc::new(remote), FileNameStore::new(state_path)).with_sort_mode(config.default_sort);
    let command = cli.command.unwrap_or(Command::List { sort: None });

    let result = run(&mut app, command, &config).await;
    tracing::info!(ok = result.is_ok(), "taskdeck exiting");
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            let mut cause = std::error::Error::source(&e);
            while let Some(inner) = cause {
                eprintln!("  caused by: {inner}");
                cause = inner.source();
            }
            ExitCode::FAILURE
        }
    }
}

/// Initialize file-based logging.
///
/// Logs are written to a file (never stdout, which carries command output).
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("taskdeck.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Executes one command against the app.
async fn run<R: RemoteStore, N: NameStore>(
    app: &mut App<R, N>,
    command: Command,
    config: &ClientConfig,
) -> Result<(), RunError> {
    match command {
        Command::Workspace(cmd) => return run_workspace(app, cmd).await,
        Command::List { sort } => {
            start_bound(app).await?;
            if let Some(sort) = sort {
                app.sort_mode = sort;
            }
        }
        Command::Add {
            title,
            description,
            due,
            priority,
        } => {
            start_bound(app).await?;
            app.draft = TaskDraft {
                title,
                description: description.unwrap_or_default(),
                due_date: due,
                priority,
            };
            app.add_task().await?;
        }
        Command::Toggle { id } => {
            start_bound(app).await?;
            app.toggle_task(&id).await?;
        }
        Command::Edit { id, fields } => {
            start_bound(app).await?;
            app.edit_task(&id, fields.to_patch()).await?;
        }
        Command::Delete { id, yes } => {
            start_bound(app).await?;
            let confirm = |task: &Task| yes || confirm_on_stdin(task);
            if app.delete_task(&id, &confirm).await? == Deletion::Cancelled {
                println!("Cancelled.");
                return Ok(());
            }
        }
        Command::Stats => {
            start_bound(app).await?;
            println!("{}", ui::stats_line(&app.stats()));
            return Ok(());
        }
    }
    print_list(app, config);
    Ok(())
}

async fn run_workspace<R: RemoteStore, N: NameStore>(
    app: &mut App<R, N>,
    command: WorkspaceCommand,
) -> Result<(), RunError> {
    match command {
        WorkspaceCommand::Create(WorkspaceArgs { name, password }) => {
            let password = password_or_prompt(password)?;
            app.create_workspace(&name, &password).await?;
            println!("Created workspace '{name}'.");
        }
        WorkspaceCommand::Login(WorkspaceArgs { name, password }) => {
            let password = password_or_prompt(password)?;
            app.restore();
            app.login_workspace(&name, &password).await?;
            println!("Entered workspace '{name}'.");
        }
        WorkspaceCommand::Leave => match app.restore().map(str::to_string) {
            Some(name) => {
                app.change_workspace();
                println!("Left workspace '{name}'.");
            }
            None => println!("No workspace selected."),
        },
        WorkspaceCommand::Show => match app.restore() {
            Some(name) => println!("{name}"),
            None => println!("No workspace selected."),
        },
    }
    Ok(())
}

/// Restores and loads the persisted workspace; fails if there is none.
async fn start_bound<R: RemoteStore, N: NameStore>(app: &mut App<R, N>) -> Result<(), RunError> {
    app.start().await?;
    if app.show_prompt() {
        return Err(RunError::Unbound);
    }
    Ok(())
}

fn print_list<R: RemoteStore, N: NameStore>(app: &App<R, N>, config: &ClientConfig) {
    let workspace = app.workspace_name().unwrap_or_default();
    print!(
        "{}",
        ui::task_list(
            workspace,
            &app.visible_tasks(),
            app.sort_mode,
            &config.timestamp_format
        )
    );
    println!("{}", ui::stats_line(&app.stats()));
}

fn password_or_prompt(password: Option<String>) -> io::Result<String> {
    if let Some(p) = password {
        return Ok(p);
    }
    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\n', '\r']).to_string())
}

fn confirm_on_stdin(task: &Task) -> bool {
    eprint!("Delete '{}'? [y/N] ", task.title);
    if io::stderr().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
