//! Application state: session, task list, draft and view settings.
//!
//! [`App`] wires the session manager and the task synchronizer to one
//! store and one busy flag, and is what the binary drives. Control only
//! flows one way: the session decides the workspace, the synchronizer
//! loads it, and the view functions project whatever was loaded.

use std::sync::Arc;

use taskdeck_proto::task::{Task, TaskDraft, TaskPatch};

use crate::busy::BusyFlag;
use crate::remote::RemoteStore;
use crate::session::{NameStore, SessionManager, WorkspaceError, WorkspaceIdentity};
use crate::tasks::{Confirm, Deletion, SyncError, TaskSynchronizer};
use crate::view::{AggregateStats, SortMode, compute_stats, sort_tasks};

/// Any failure surfaced by [`App`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppError {
    /// A workspace operation failed.
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    /// A task operation failed.
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// No loaded task has this id or id prefix.
    #[error("no task matches '{0}'")]
    UnknownTask(String),

    /// More than one loaded task starts with this prefix.
    #[error("'{0}' matches more than one task")]
    AmbiguousTask(String),
}

/// Main application state.
pub struct App<R, N> {
    session: SessionManager<R, N>,
    sync: TaskSynchronizer<R>,
    /// The task form being filled in.
    pub draft: TaskDraft,
    /// Ordering of [`App::visible_tasks`].
    pub sort_mode: SortMode,
    busy: BusyFlag,
}

impl<R: RemoteStore, N: NameStore> App<R, N> {
    /// Creates an unbound app talking to `remote` and persisting through `names`.
    pub fn new(remote: Arc<R>, names: N) -> Self {
        let busy = BusyFlag::new();
        Self {
            session: SessionManager::new(Arc::clone(&remote), names, busy.clone()),
            sync: TaskSynchronizer::new(remote, busy.clone()),
            draft: TaskDraft::default(),
            sort_mode: SortMode::default(),
            busy,
        }
    }

    /// Sets the initial sort mode.
    #[must_use]
    pub const fn with_sort_mode(mut self, mode: SortMode) -> Self {
        self.sort_mode = mode;
        self
    }

    /// Binds to the persisted workspace name, if any, without loading.
    pub fn restore(&mut self) -> Option<&str> {
        self.session.restore_workspace_name();
        self.workspace_name()
    }

    /// Restores the persisted workspace, if any, and loads its tasks.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Sync`] if the restored workspace cannot be loaded.
    pub async fn start(&mut self) -> Result<(), AppError> {
        self.clear_errors();
        self.session.restore_workspace_name();
        self.sync.load(self.session.active()).await?;
        Ok(())
    }

    /// Creates a workspace, binds to it and loads its (empty) task list.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Workspace`] if creation fails, or
    /// [`AppError::Sync`] if the new workspace cannot be loaded.
    pub async fn create_workspace(&mut self, name: &str, password: &str) -> Result<(), AppError> {
        self.clear_errors();
        self.session.create_workspace(name, password).await?;
        self.sync.load(self.session.active()).await?;
        Ok(())
    }

    /// Logs into a workspace, binds to it and loads its tasks.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Workspace`] if login fails, or
    /// [`AppError::Sync`] if the workspace cannot be loaded.
    pub async fn login_workspace(&mut self, name: &str, password: &str) -> Result<(), AppError> {
        self.clear_errors();
        if let Err(e) = self.session.login_workspace(name, password).await {
            if self.session.show_prompt() {
                self.sync.clear();
            }
            return Err(e.into());
        }
        self.sync.load(self.session.active()).await?;
        Ok(())
    }

    /// Forgets the current workspace and its tasks.
    pub fn change_workspace(&mut self) {
        self.clear_errors();
        self.session.unbind();
        self.sync.clear();
        self.draft = TaskDraft::default();
    }

    /// Reloads the task list of the bound workspace.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Sync`] if the store cannot be read.
    pub async fn refresh(&mut self) -> Result<(), AppError> {
        self.clear_errors();
        self.sync.load(self.session.active()).await?;
        Ok(())
    }

    /// Submits the current draft.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Sync`] if the draft is invalid or the store
    /// does not accept it.
    pub async fn add_task(&mut self) -> Result<(), AppError> {
        self.clear_errors();
        self.sync.create(&mut self.draft).await?;
        Ok(())
    }

    /// Flips the completion flag of the task matching `key`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::UnknownTask`] or [`AppError::AmbiguousTask`] if
    /// `key` does not pick out one task, or [`AppError::Sync`] on failure.
    pub async fn toggle_task(&mut self, key: &str) -> Result<(), AppError> {
        self.clear_errors();
        let task = self.resolve_task(key)?;
        self.sync.toggle_complete(&task).await?;
        Ok(())
    }

    /// Applies `patch` to the task matching `key`.
    ///
    /// # Errors
    ///
    /// As for [`App::toggle_task`].
    pub async fn edit_task(&mut self, key: &str, patch: TaskPatch) -> Result<(), AppError> {
        self.clear_errors();
        let task = self.resolve_task(key)?;
        self.sync.update(&task, patch).await?;
        Ok(())
    }

    /// Deletes the task matching `key` once `confirm` agrees.
    ///
    /// # Errors
    ///
    /// As for [`App::toggle_task`].
    pub async fn delete_task(&mut self, key: &str, confirm: &impl Confirm) -> Result<Deletion, AppError> {
        self.clear_errors();
        let task = self.resolve_task(key)?;
        Ok(self.sync.delete(&task, confirm).await?)
    }

    /// Finds a loaded task by full id or unique id prefix.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::UnknownTask`] or [`AppError::AmbiguousTask`].
    pub fn resolve_task(&self, key: &str) -> Result<Task, AppError> {
        let tasks = self.sync.tasks();
        if let Some(exact) = tasks.iter().find(|t| t.id.as_str() == key) {
            return Ok(exact.clone());
        }
        let mut matches = tasks.iter().filter(|t| !key.is_empty() && t.id.as_str().starts_with(key));
        match (matches.next(), matches.next()) {
            (Some(task), None) => Ok(task.clone()),
            (Some(_), Some(_)) => Err(AppError::AmbiguousTask(key.to_string())),
            (None, _) => Err(AppError::UnknownTask(key.to_string())),
        }
    }

    /// Loaded tasks in the current sort order.
    #[must_use]
    pub fn visible_tasks(&self) -> Vec<Task> {
        sort_tasks(self.sync.tasks(), self.sort_mode)
    }

    /// Counters over the loaded tasks.
    #[must_use]
    pub fn stats(&self) -> AggregateStats {
        compute_stats(self.sync.tasks())
    }

    /// Name of the bound workspace.
    #[must_use]
    pub fn workspace_name(&self) -> Option<&str> {
        self.session.active().map(WorkspaceIdentity::name)
    }

    /// `true` while no workspace is bound.
    #[must_use]
    pub const fn show_prompt(&self) -> bool {
        self.session.show_prompt()
    }

    /// `true` while a store request is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    /// The most recent failure as display text.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.session
            .last_error()
            .map(ToString::to_string)
            .or_else(|| self.sync.last_error().map(ToString::to_string))
    }

    /// The session manager.
    #[must_use]
    pub const fn session(&self) -> &SessionManager<R, N> {
        &self.session
    }

    /// The task synchronizer.
    #[must_use]
    pub const fn tasks(&self) -> &TaskSynchronizer<R> {
        &self.sync
    }

    fn clear_errors(&mut self) {
        self.session.clear_error();
        self.sync.clear_error();
    }
}
