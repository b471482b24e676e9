//! Taskdeck store server -- in-memory reference implementation of the task
//! store API.
//!
//! # Usage
//!
//! ```bash
//! # Run on default address 127.0.0.1:8000
//! cargo run --bin taskdeck-server
//!
//! # Run on custom address with a stricter password policy
//! cargo run --bin taskdeck-server -- --bind 0.0.0.0:9100 --min-password-length 8
//!
//! # Or via environment variable
//! TASKDECK_SERVER_ADDR=0.0.0.0:9100 cargo run --bin taskdeck-server
//! ```

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use taskdeck_server::config::ServerArgs;
use taskdeck_server::server;

#[tokio::main]
async fn main() -> ExitCode {
    let args = ServerArgs::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let policy = args.policy();
    tracing::info!(
        addr = %args.bind,
        min_password_length = policy.min_password_length,
        sessions_per_workspace = policy.sessions_per_workspace,
        "starting taskdeck store server"
    );

    let store = Arc::new(args.build_store());
    match server::start_server_with_store(&args.bind.to_string(), store).await {
        Ok((bound_addr, handle)) => {
            tracing::info!(addr = %bound_addr, "store server listening");
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "store server task failed");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to start store server");
            ExitCode::FAILURE
        }
    }
}
