//! Remote task store abstraction.
//!
//! Defines the [`RemoteStore`] trait that every store client must satisfy.
//! Concrete implementations:
//! - [`http::HttpStore`] — JSON over HTTP against a live store
//! - [`memory::MemoryStore`] — in-process store for tests and offline use

pub mod http;
pub mod memory;

use std::fmt;
use std::future::Future;

use taskdeck_proto::task::{NewTask, Task, TaskId, TaskPatch};
use taskdeck_proto::workspace::{WorkspaceCredentials, WorkspaceInfo};

/// Session token presented to the store as a bearer credential.
///
/// Held in memory only. `Debug` output never shows the token.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wraps a token issued by the store.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token for use in an `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

/// Errors that can occur while talking to the remote store.
///
/// These are classified into workspace or task errors at the component
/// boundary and never reach callers of the session or synchronizer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The store answered with a non-success status.
    #[error("store rejected request ({status}): {detail}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// The store's `detail` message, or the status reason.
        detail: String,
    },

    /// The request did not complete within the configured timeout.
    #[error("store request timed out")]
    Timeout,

    /// The store could not be reached.
    #[error("store unreachable: {0}")]
    Transport(String),

    /// The store's response body could not be decoded.
    #[error("malformed store response: {0}")]
    Decode(String),
}

impl RemoteError {
    /// Returns the HTTP status if the store answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` for a 4xx answer: the store understood and refused.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        self.status().is_some_and(|s| (400..500).contains(&s))
    }
}

/// Async client for the task store contract.
///
/// Task calls take the session token explicitly; `None` is sent for
/// sessions that were restored from disk without re-entering a password.
pub trait RemoteStore: Send + Sync {
    /// `POST /workspaces/`
    fn create_workspace(
        &self,
        creds: &WorkspaceCredentials,
    ) -> impl Future<Output = Result<WorkspaceInfo, RemoteError>> + Send;

    /// `POST /workspaces/login`
    fn login_workspace(
        &self,
        creds: &WorkspaceCredentials,
    ) -> impl Future<Output = Result<WorkspaceInfo, RemoteError>> + Send;

    /// `GET /todos/{workspace}`
    fn list_tasks(
        &self,
        workspace: &str,
        token: Option<&AuthToken>,
    ) -> impl Future<Output = Result<Vec<Task>, RemoteError>> + Send;

    /// `POST /todos/`
    fn create_task(
        &self,
        task: &NewTask,
        token: Option<&AuthToken>,
    ) -> impl Future<Output = Result<Task, RemoteError>> + Send;

    /// `PUT /todos/{id}`
    fn update_task(
        &self,
        id: &TaskId,
        patch: &TaskPatch,
        token: Option<&AuthToken>,
    ) -> impl Future<Output = Result<Task, RemoteError>> + Send;

    /// `DELETE /todos/{id}`
    fn delete_task(
        &self,
        id: &TaskId,
        token: Option<&AuthToken>,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;
}
