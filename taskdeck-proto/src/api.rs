//! Endpoint paths and shared response bodies of the task store HTTP API.
//!
//! | Method | Path | Body | Response |
//! |---|---|---|---|
//! | POST | `/workspaces/` | [`WorkspaceCredentials`] | [`WorkspaceInfo`] |
//! | POST | `/workspaces/login` | [`WorkspaceCredentials`] | [`WorkspaceInfo`] |
//! | GET | `/todos/{workspace}` | | `Vec<Task>` |
//! | POST | `/todos/` | [`NewTask`] | [`Task`] |
//! | PUT | `/todos/{id}` | [`TaskPatch`] | [`Task`] |
//! | DELETE | `/todos/{id}` | | [`DeleteAck`] |
//!
//! Failures carry an [`ErrorBody`].
//!
//! [`WorkspaceCredentials`]: crate::workspace::WorkspaceCredentials
//! [`WorkspaceInfo`]: crate::workspace::WorkspaceInfo
//! [`Task`]: crate::task::Task
//! [`NewTask`]: crate::task::NewTask
//! [`TaskPatch`]: crate::task::TaskPatch

use serde::{Deserialize, Serialize};

/// Path segment of the workspace endpoints.
pub const WORKSPACES: &str = "workspaces";
/// Path segment of the login endpoint, under [`WORKSPACES`].
pub const LOGIN: &str = "login";
/// Path segment of the task endpoints.
pub const TODOS: &str = "todos";

/// Store message for a name collision on create.
pub const DETAIL_WORKSPACE_EXISTS: &str = "Workspace already exists";
/// Store message for a rejected login.
pub const DETAIL_INVALID_LOGIN: &str = "Invalid workspace name or password";
/// Store message for a task created in an unknown workspace.
pub const DETAIL_WORKSPACE_MISSING: &str = "Workspace does not exist";
/// Store message for an unknown task id.
pub const DETAIL_TODO_NOT_FOUND: &str = "Todo not found";
/// Store message for an update with no fields.
pub const DETAIL_EMPTY_UPDATE: &str = "No valid update data provided";
/// Store message for a successful delete.
pub const MESSAGE_TODO_DELETED: &str = "Todo deleted successfully";

/// Error payload returned with every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable reason.
    pub detail: String,
}

impl ErrorBody {
    /// Creates an error body.
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// Confirmation returned by a successful delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteAck {
    /// Confirmation text.
    pub message: String,
}
