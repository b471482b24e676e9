//! Command-line configuration for the store server.
//!
//! Every setting is a flag with an environment fallback; there is no
//! config file. Values are validated while parsing, so a bad bind address
//! or a zero limit stops the server before it binds.

use std::net::SocketAddr;

use taskdeck_proto::workspace::{MIN_PASSWORD_LENGTH, SESSIONS_PER_WORKSPACE};

use crate::store::{StorePolicy, TaskStore};

/// Settings for one server process.
#[derive(clap::Parser, Debug, Clone)]
#[command(version, about = "Taskdeck in-memory task store server")]
pub struct ServerArgs {
    /// Socket address to listen on.
    #[arg(short, long, default_value = "127.0.0.1:8000", env = "TASKDECK_SERVER_ADDR")]
    pub bind: SocketAddr,

    /// Shortest password accepted when creating a workspace.
    #[arg(
        long,
        default_value_t = MIN_PASSWORD_LENGTH,
        value_parser = at_least_one,
        env = "TASKDECK_MIN_PASSWORD"
    )]
    pub min_password_length: usize,

    /// Bearer tokens kept per workspace before the oldest is revoked.
    #[arg(
        long,
        default_value_t = SESSIONS_PER_WORKSPACE,
        value_parser = at_least_one,
        env = "TASKDECK_SESSIONS"
    )]
    pub sessions_per_workspace: usize,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, default_value = "info", env = "TASKDECK_SERVER_LOG")]
    pub log_level: String,
}

impl ServerArgs {
    /// Store limits requested on the command line.
    #[must_use]
    pub const fn policy(&self) -> StorePolicy {
        StorePolicy {
            min_password_length: self.min_password_length,
            sessions_per_workspace: self.sessions_per_workspace,
        }
    }

    /// An empty store enforcing [`ServerArgs::policy`].
    #[must_use]
    pub fn build_store(&self) -> TaskStore {
        TaskStore::with_policy(self.policy())
    }
}

fn at_least_one(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}
