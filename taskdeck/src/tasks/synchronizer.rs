//! Reload-after-mutation task list.

use std::sync::Arc;

use taskdeck_proto::task::{Task, TaskDraft, TaskPatch};

use super::{Confirm, Deletion, MutationKind, SyncError};
use crate::busy::BusyFlag;
use crate::error::ValidationError;
use crate::remote::{RemoteError, RemoteStore};
use crate::session::WorkspaceIdentity;

/// Owns the task collection of the bound workspace.
///
/// Methods take `&mut self`, so one synchronizer never runs two requests
/// at once. The shared [`BusyFlag`] stays set for a whole operation,
/// mutation and reload included. The most recent failure is kept until
/// the next operation starts.
pub struct TaskSynchronizer<R> {
    remote: Arc<R>,
    workspace: Option<WorkspaceIdentity>,
    tasks: Vec<Task>,
    busy: BusyFlag,
    last_error: Option<SyncError>,
}

impl<R: RemoteStore> TaskSynchronizer<R> {
    /// Creates an empty, unbound synchronizer.
    pub const fn new(remote: Arc<R>, busy: BusyFlag) -> Self {
        Self {
            remote,
            workspace: None,
            tasks: Vec::new(),
            busy,
            last_error: None,
        }
    }

    /// Loads the task list of `workspace`.
    ///
    /// With no workspace the collection is emptied and the call succeeds
    /// without contacting the store.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Fetch`] if the store cannot be read. The
    /// previous collection is kept when reloading the same workspace; a
    /// different workspace starts from an empty collection.
    pub async fn load(&mut self, workspace: Option<&WorkspaceIdentity>) -> Result<&[Task], SyncError> {
        self.last_error = None;
        let loaded = self.workspace.as_ref().map(WorkspaceIdentity::name);
        if loaded != workspace.map(WorkspaceIdentity::name) {
            self.tasks.clear();
        }
        self.workspace = workspace.cloned();
        let _busy = self.busy.enter();
        match self.refetch().await {
            Ok(()) => Ok(&self.tasks),
            Err(e) => Err(self.record(e)),
        }
    }

    /// Submits `draft` as a new task, resets it, and reloads.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Validation`] if the draft has no title
    /// - [`SyncError::Unbound`] with no workspace loaded
    /// - [`SyncError::Mutation`] if the store refuses or cannot be reached
    /// - [`SyncError::Fetch`] if the task was created but the reload failed
    pub async fn create(&mut self, draft: &mut TaskDraft) -> Result<(), SyncError> {
        self.last_error = None;
        let result = self.try_create(draft).await;
        result.map_err(|e| self.record(e))
    }

    async fn try_create(&mut self, draft: &mut TaskDraft) -> Result<(), SyncError> {
        if draft.is_untitled() {
            return Err(ValidationError::EmptyTitle.into());
        }
        let workspace = self.workspace.as_ref().ok_or(SyncError::Unbound)?;
        let new_task = draft.to_new_task(workspace.name());

        let _busy = self.busy.enter();
        let created = self
            .remote
            .create_task(&new_task, workspace.token())
            .await
            .map_err(mutation(MutationKind::Create))?;
        tracing::debug!(id = %created.id, workspace = %created.workspace, "task created");

        *draft = TaskDraft::default();
        self.refetch().await
    }

    /// Flips the completion flag of `task` and reloads.
    ///
    /// # Errors
    ///
    /// As for [`TaskSynchronizer::update`].
    pub async fn toggle_complete(&mut self, task: &Task) -> Result<(), SyncError> {
        self.update(task, TaskPatch::completed(!task.completed)).await
    }

    /// Applies a partial update to `task` and reloads.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Validation`] if the patch changes nothing
    /// - [`SyncError::Unbound`] with no workspace loaded
    /// - [`SyncError::Mutation`] if the store refuses or cannot be reached
    /// - [`SyncError::Fetch`] if the update landed but the reload failed
    pub async fn update(&mut self, task: &Task, patch: TaskPatch) -> Result<(), SyncError> {
        self.last_error = None;
        let result = self.try_update(task, &patch).await;
        result.map_err(|e| self.record(e))
    }

    async fn try_update(&mut self, task: &Task, patch: &TaskPatch) -> Result<(), SyncError> {
        if patch.is_empty() {
            return Err(ValidationError::EmptyPatch.into());
        }
        let workspace = self.workspace.as_ref().ok_or(SyncError::Unbound)?;

        let _busy = self.busy.enter();
        let updated = self
            .remote
            .update_task(&task.id, patch, workspace.token())
            .await
            .map_err(mutation(MutationKind::Update))?;
        tracing::debug!(id = %updated.id, completed = updated.completed, "task updated");

        self.refetch().await
    }

    /// Deletes `task` once `confirm` agrees, then reloads.
    ///
    /// The confirmation runs before any request. A declined confirmation
    /// returns [`Deletion::Cancelled`] and leaves the collection as it was.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Unbound`] with no workspace loaded
    /// - [`SyncError::Mutation`] if the store refuses or cannot be reached
    /// - [`SyncError::Fetch`] if the delete landed but the reload failed
    pub async fn delete(&mut self, task: &Task, confirm: &impl Confirm) -> Result<Deletion, SyncError> {
        self.last_error = None;
        let result = self.try_delete(task, confirm).await;
        result.map_err(|e| self.record(e))
    }

    async fn try_delete(&mut self, task: &Task, confirm: &impl Confirm) -> Result<Deletion, SyncError> {
        let workspace = self.workspace.as_ref().ok_or(SyncError::Unbound)?;
        if !confirm.confirm(task) {
            tracing::debug!(id = %task.id, "delete cancelled");
            return Ok(Deletion::Cancelled);
        }

        let _busy = self.busy.enter();
        self.remote
            .delete_task(&task.id, workspace.token())
            .await
            .map_err(mutation(MutationKind::Delete))?;
        tracing::debug!(id = %task.id, "task deleted");

        self.refetch().await?;
        Ok(Deletion::Deleted)
    }

    /// Drops the workspace and its tasks.
    pub fn clear(&mut self) {
        self.workspace = None;
        self.tasks.clear();
        self.last_error = None;
    }

    /// The last successfully loaded collection, in store order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// The workspace whose tasks are loaded, if any.
    #[must_use]
    pub const fn workspace(&self) -> Option<&WorkspaceIdentity> {
        self.workspace.as_ref()
    }

    /// The most recent failure, cleared when the next operation starts.
    #[must_use]
    pub const fn last_error(&self) -> Option<&SyncError> {
        self.last_error.as_ref()
    }

    /// Discards the most recent failure.
    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Replaces the collection with the store's current list.
    ///
    /// Callers hold the busy guard.
    async fn refetch(&mut self) -> Result<(), SyncError> {
        let Some(workspace) = &self.workspace else {
            self.tasks.clear();
            return Ok(());
        };

        let fetched = self
            .remote
            .list_tasks(workspace.name(), workspace.token())
            .await;
        match fetched {
            Ok(tasks) => {
                tracing::debug!(workspace = %workspace.name(), count = tasks.len(), "tasks loaded");
                self.tasks = tasks;
                Ok(())
            }
            Err(source) => Err(SyncError::Fetch { source }),
        }
    }

    fn record(&mut self, error: SyncError) -> SyncError {
        tracing::warn!(error = %error, cause = ?error, "task operation failed");
        self.last_error = Some(error.clone());
        error
    }
}

fn mutation(action: MutationKind) -> impl Fn(RemoteError) -> SyncError {
    move |source| SyncError::Mutation { action, source }
}
