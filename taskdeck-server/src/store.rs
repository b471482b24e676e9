//! In-memory workspace and task records.
//!
//! The [`TaskStore`] keeps workspaces (with salted password digests and the
//! bearer tokens issued to them) and per-workspace task lists in insertion
//! order. Nothing is persisted; a restart starts empty.

use std::collections::{HashMap, VecDeque};

use sha2::{Digest, Sha256};
use taskdeck_proto::api;
use taskdeck_proto::task::{NewTask, Task, TaskId, TaskPatch};
use taskdeck_proto::workspace::{
    MIN_PASSWORD_LENGTH, SESSIONS_PER_WORKSPACE, WorkspaceCredentials, WorkspaceInfo,
};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Errors reported by [`TaskStore`] operations.
///
/// The display text is the `detail` sent back to clients.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A workspace with this name already exists.
    #[error("{detail}", detail = api::DETAIL_WORKSPACE_EXISTS)]
    WorkspaceExists,
    /// Unknown workspace or wrong password.
    #[error("{detail}", detail = api::DETAIL_INVALID_LOGIN)]
    InvalidLogin,
    /// Workspace name is empty.
    #[error("Workspace name must not be empty")]
    EmptyName,
    /// Password shorter than the configured minimum.
    #[error("Password must be at least {min} characters long")]
    PasswordTooShort {
        /// Minimum length in characters.
        min: usize,
    },
    /// Task submitted for a workspace that does not exist.
    #[error("{detail}", detail = api::DETAIL_WORKSPACE_MISSING)]
    WorkspaceMissing,
    /// Task submitted without a title.
    #[error("Title must not be empty")]
    EmptyTitle,
    /// No task with the given id.
    #[error("{detail}", detail = api::DETAIL_TODO_NOT_FOUND)]
    TodoNotFound,
    /// Update request carried no fields.
    #[error("{detail}", detail = api::DETAIL_EMPTY_UPDATE)]
    EmptyUpdate,
    /// Bearer token is malformed or was never issued.
    #[error("Invalid token")]
    InvalidToken,
    /// Bearer token belongs to a different workspace.
    #[error("Token does not grant access to this workspace")]
    Forbidden,
}

/// A registered workspace.
struct WorkspaceRecord {
    id: String,
    salt: String,
    digest: [u8; 32],
    /// Live tokens, oldest first.
    sessions: VecDeque<String>,
}

#[derive(Default)]
struct Records {
    /// Workspace name -> record.
    workspaces: HashMap<String, WorkspaceRecord>,
    /// Issued bearer token -> workspace name.
    tokens: HashMap<String, String>,
    /// All tasks, oldest first.
    tasks: Vec<Task>,
}

/// Limits a [`TaskStore`] enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorePolicy {
    /// Shortest accepted password, in characters.
    pub min_password_length: usize,
    /// Tokens kept per workspace; the oldest is revoked when a new one
    /// would exceed this. Treated as at least 1.
    pub sessions_per_workspace: usize,
}

impl Default for StorePolicy {
    fn default() -> Self {
        Self {
            min_password_length: MIN_PASSWORD_LENGTH,
            sessions_per_workspace: SESSIONS_PER_WORKSPACE,
        }
    }
}

/// Thread-safe in-memory store backing the HTTP handlers.
pub struct TaskStore {
    records: RwLock<Records>,
    policy: StorePolicy,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    /// Creates an empty store with the default password policy.
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(StorePolicy::default())
    }

    /// Creates an empty store requiring passwords of at least `min` characters.
    #[must_use]
    pub fn with_min_password_length(min: usize) -> Self {
        Self::with_policy(StorePolicy {
            min_password_length: min,
            ..StorePolicy::default()
        })
    }

    /// Creates an empty store enforcing `policy`.
    #[must_use]
    pub fn with_policy(policy: StorePolicy) -> Self {
        Self {
            records: RwLock::new(Records::default()),
            policy: StorePolicy {
                sessions_per_workspace: policy.sessions_per_workspace.max(1),
                ..policy
            },
        }
    }

    /// The limits this store enforces.
    #[must_use]
    pub const fn policy(&self) -> StorePolicy {
        self.policy
    }

    /// Registers a new workspace and issues a session token for it.
    ///
    /// # Errors
    ///
    /// [`StoreError::EmptyName`], [`StoreError::PasswordTooShort`], or
    /// [`StoreError::WorkspaceExists`] if the name is taken.
    pub async fn create_workspace(
        &self,
        creds: &WorkspaceCredentials,
    ) -> Result<WorkspaceInfo, StoreError> {
        if creds.name.is_empty() {
            return Err(StoreError::EmptyName);
        }
        if creds.password.chars().count() < self.policy.min_password_length {
            return Err(StoreError::PasswordTooShort {
                min: self.policy.min_password_length,
            });
        }

        let mut records = self.records.write().await;
        if records.workspaces.contains_key(&creds.name) {
            return Err(StoreError::WorkspaceExists);
        }
        let salt = Uuid::new_v4().simple().to_string();
        let record = WorkspaceRecord {
            id: Uuid::now_v7().simple().to_string(),
            digest: password_digest(&salt, &creds.password),
            salt,
            sessions: VecDeque::new(),
        };
        let id = record.id.clone();
        records.workspaces.insert(creds.name.clone(), record);
        let token = issue_token(&mut records, &creds.name, self.policy.sessions_per_workspace);
        drop(records);

        tracing::info!(workspace = %creds.name, "workspace created");
        Ok(WorkspaceInfo {
            id,
            name: creds.name.clone(),
            token: Some(token),
        })
    }

    /// Verifies credentials and issues a fresh session token.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidLogin`] for an unknown name or wrong password.
    pub async fn login(&self, creds: &WorkspaceCredentials) -> Result<WorkspaceInfo, StoreError> {
        let mut records = self.records.write().await;
        let id = match records.workspaces.get(&creds.name) {
            Some(record)
                if digests_match(
                    &record.digest,
                    &password_digest(&record.salt, &creds.password),
                ) =>
            {
                record.id.clone()
            }
            _ => {
                tracing::debug!(workspace = %creds.name, "login rejected");
                return Err(StoreError::InvalidLogin);
            }
        };
        let token = issue_token(&mut records, &creds.name, self.policy.sessions_per_workspace);
        drop(records);

        Ok(WorkspaceInfo {
            id,
            name: creds.name.clone(),
            token: Some(token),
        })
    }

    /// Returns the workspace a token was issued to.
    pub async fn workspace_for_token(&self, token: &str) -> Option<String> {
        self.records.read().await.tokens.get(token).cloned()
    }

    /// Returns the workspace that owns a task.
    pub async fn task_workspace(&self, id: &TaskId) -> Option<String> {
        let records = self.records.read().await;
        records
            .tasks
            .iter()
            .find(|t| t.id == *id)
            .map(|t| t.workspace.clone())
    }

    /// Returns all tasks of a workspace, oldest first.
    ///
    /// An unknown workspace simply has no tasks.
    pub async fn list_tasks(&self, workspace: &str) -> Vec<Task> {
        let records = self.records.read().await;
        records
            .tasks
            .iter()
            .filter(|t| t.workspace == workspace)
            .cloned()
            .collect()
    }

    /// Stores a new task and assigns its id.
    ///
    /// # Errors
    ///
    /// [`StoreError::EmptyTitle`] or [`StoreError::WorkspaceMissing`].
    pub async fn create_task(&self, new_task: NewTask) -> Result<Task, StoreError> {
        if new_task.title.is_empty() {
            return Err(StoreError::EmptyTitle);
        }
        let mut records = self.records.write().await;
        if !records.workspaces.contains_key(&new_task.workspace) {
            return Err(StoreError::WorkspaceMissing);
        }
        let task = Task {
            id: TaskId::new(Uuid::now_v7().simple().to_string()),
            title: new_task.title,
            description: new_task.description,
            completed: false,
            created_at: Some(chrono::Utc::now().naive_utc()),
            due_date: new_task.due_date,
            priority: new_task.priority,
            workspace: new_task.workspace,
        };
        records.tasks.push(task.clone());
        drop(records);

        tracing::debug!(task_id = %task.id, workspace = %task.workspace, "task created");
        Ok(task)
    }

    /// Applies a partial update and returns the updated task.
    ///
    /// # Errors
    ///
    /// [`StoreError::EmptyUpdate`] if the patch sets nothing (or sets an
    /// empty title), [`StoreError::TodoNotFound`] for an unknown id.
    pub async fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, StoreError> {
        if patch.is_empty() {
            return Err(StoreError::EmptyUpdate);
        }
        if patch.title.as_deref() == Some("") {
            return Err(StoreError::EmptyTitle);
        }
        let mut records = self.records.write().await;
        let task = records
            .tasks
            .iter_mut()
            .find(|t| t.id == *id)
            .ok_or(StoreError::TodoNotFound)?;
        patch.apply_to(task);
        Ok(task.clone())
    }

    /// Removes a task.
    ///
    /// # Errors
    ///
    /// [`StoreError::TodoNotFound`] for an unknown id.
    pub async fn delete_task(&self, id: &TaskId) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let index = records
            .tasks
            .iter()
            .position(|t| t.id == *id)
            .ok_or(StoreError::TodoNotFound)?;
        records.tasks.remove(index);
        Ok(())
    }
}

/// Issues a token for `workspace`, revoking its oldest ones beyond `limit`.
fn issue_token(records: &mut Records, workspace: &str, limit: usize) -> String {
    let token = Uuid::new_v4().simple().to_string();
    records.tokens.insert(token.clone(), workspace.to_string());
    if let Some(record) = records.workspaces.get_mut(workspace) {
        record.sessions.push_back(token.clone());
        while record.sessions.len() > limit {
            if let Some(oldest) = record.sessions.pop_front() {
                tracing::debug!(%workspace, "revoking oldest session token");
                records.tokens.remove(&oldest);
            }
        }
    }
    token
}

fn password_digest(salt: &str, password: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}

fn digests_match(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a.iter().zip(b).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
}
