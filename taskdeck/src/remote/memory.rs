//! In-process task store for testing.
//!
//! [`MemoryStore`] implements the store contract over a mutex-guarded map,
//! counts every request it receives, and can be told to fail the next call
//! of a given kind. Clones share the same state, so a test can hold one
//! handle while the code under test owns another.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use taskdeck_proto::api;
use taskdeck_proto::task::{NewTask, Task, TaskId, TaskPatch};
use taskdeck_proto::workspace::{
    MIN_PASSWORD_LENGTH, SESSIONS_PER_WORKSPACE, WorkspaceCredentials, WorkspaceInfo,
};
use uuid::Uuid;

use super::{AuthToken, RemoteError, RemoteStore};

/// Kind of store call, used to target injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `create_workspace`
    CreateWorkspace,
    /// `login_workspace`
    Login,
    /// `list_tasks`
    ListTasks,
    /// `create_task`
    CreateTask,
    /// `update_task`
    UpdateTask,
    /// `delete_task`
    DeleteTask,
}

#[derive(Default)]
struct State {
    /// Workspace name -> (id, password).
    workspaces: HashMap<String, (String, String)>,
    /// Issued token -> workspace name.
    tokens: HashMap<String, String>,
    /// Workspace name -> its live tokens, oldest first.
    sessions: HashMap<String, VecDeque<String>>,
    /// All tasks, oldest first.
    tasks: Vec<Task>,
    /// One-shot failures by operation.
    failures: HashMap<Operation, RemoteError>,
    /// Requests received per operation.
    calls: HashMap<Operation, usize>,
}

impl State {
    fn enter(&mut self, op: Operation) -> Result<(), RemoteError> {
        *self.calls.entry(op).or_default() += 1;
        self.failures.remove(&op).map_or(Ok(()), Err)
    }

    fn authorize(&self, token: Option<&AuthToken>, workspace: &str) -> Result<(), RemoteError> {
        let Some(token) = token else {
            return Ok(());
        };
        match self.tokens.get(token.expose()) {
            Some(owner) if owner == workspace => Ok(()),
            Some(_) => Err(rejected(403, "Token does not grant access to this workspace")),
            None => Err(rejected(401, "Invalid token")),
        }
    }

    fn issue_token(&mut self, workspace: &str) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.tokens.insert(token.clone(), workspace.to_string());
        let live = self.sessions.entry(workspace.to_string()).or_default();
        live.push_back(token.clone());
        while live.len() > SESSIONS_PER_WORKSPACE {
            if let Some(oldest) = live.pop_front() {
                self.tokens.remove(&oldest);
            }
        }
        token
    }

    fn owner_of(&self, id: &TaskId) -> Result<String, RemoteError> {
        self.tasks
            .iter()
            .find(|t| t.id == *id)
            .map(|t| t.workspace.clone())
            .ok_or_else(|| rejected(404, api::DETAIL_TODO_NOT_FOUND))
    }
}

fn rejected(status: u16, detail: &str) -> RemoteError {
    RemoteError::Status {
        status,
        detail: detail.to_string(),
    }
}

/// In-memory [`RemoteStore`] with request counting and failure injection.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next call of kind `op` fail with `error`.
    pub fn fail_next(&self, op: Operation, error: RemoteError) {
        self.state.lock().failures.insert(op, error);
    }

    /// Number of requests of kind `op` received so far.
    #[must_use]
    pub fn calls(&self, op: Operation) -> usize {
        self.state.lock().calls.get(&op).copied().unwrap_or(0)
    }

    /// Total number of requests received so far.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.state.lock().calls.values().sum()
    }

    /// Registers a workspace directly, bypassing the request counter.
    pub fn seed_workspace(&self, name: &str, password: &str) {
        self.state.lock().workspaces.insert(
            name.to_string(),
            (Uuid::now_v7().simple().to_string(), password.to_string()),
        );
    }

    /// Inserts a task directly, as another client would.
    pub fn seed_task(&self, new_task: NewTask) -> Task {
        let task = materialize(new_task);
        self.state.lock().tasks.push(task.clone());
        task
    }

    /// Snapshot of a workspace's tasks as the store currently holds them.
    #[must_use]
    pub fn snapshot(&self, workspace: &str) -> Vec<Task> {
        self.state
            .lock()
            .tasks
            .iter()
            .filter(|t| t.workspace == workspace)
            .cloned()
            .collect()
    }
}

fn materialize(new_task: NewTask) -> Task {
    Task {
        id: TaskId::new(Uuid::now_v7().simple().to_string()),
        title: new_task.title,
        description: new_task.description,
        completed: false,
        created_at: Some(chrono::Utc::now().naive_utc()),
        due_date: new_task.due_date,
        priority: new_task.priority,
        workspace: new_task.workspace,
    }
}

impl RemoteStore for MemoryStore {
    async fn create_workspace(
        &self,
        creds: &WorkspaceCredentials,
    ) -> Result<WorkspaceInfo, RemoteError> {
        let mut state = self.state.lock();
        state.enter(Operation::CreateWorkspace)?;
        if creds.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(rejected(400, "Password must be at least 5 characters long"));
        }
        if state.workspaces.contains_key(&creds.name) {
            return Err(rejected(400, api::DETAIL_WORKSPACE_EXISTS));
        }
        let id = Uuid::now_v7().simple().to_string();
        state
            .workspaces
            .insert(creds.name.clone(), (id.clone(), creds.password.clone()));
        let token = state.issue_token(&creds.name);
        Ok(WorkspaceInfo {
            id,
            name: creds.name.clone(),
            token: Some(token),
        })
    }

    async fn login_workspace(
        &self,
        creds: &WorkspaceCredentials,
    ) -> Result<WorkspaceInfo, RemoteError> {
        let mut state = self.state.lock();
        state.enter(Operation::Login)?;
        let id = match state.workspaces.get(&creds.name) {
            Some((id, password)) if *password == creds.password => id.clone(),
            _ => return Err(rejected(400, api::DETAIL_INVALID_LOGIN)),
        };
        let token = state.issue_token(&creds.name);
        Ok(WorkspaceInfo {
            id,
            name: creds.name.clone(),
            token: Some(token),
        })
    }

    async fn list_tasks(
        &self,
        workspace: &str,
        token: Option<&AuthToken>,
    ) -> Result<Vec<Task>, RemoteError> {
        let mut state = self.state.lock();
        state.enter(Operation::ListTasks)?;
        state.authorize(token, workspace)?;
        Ok(state
            .tasks
            .iter()
            .filter(|t| t.workspace == workspace)
            .cloned()
            .collect())
    }

    async fn create_task(
        &self,
        task: &NewTask,
        token: Option<&AuthToken>,
    ) -> Result<Task, RemoteError> {
        let mut state = self.state.lock();
        state.enter(Operation::CreateTask)?;
        state.authorize(token, &task.workspace)?;
        if !state.workspaces.contains_key(&task.workspace) {
            return Err(rejected(400, api::DETAIL_WORKSPACE_MISSING));
        }
        let created = materialize(task.clone());
        state.tasks.push(created.clone());
        Ok(created)
    }

    async fn update_task(
        &self,
        id: &TaskId,
        patch: &TaskPatch,
        token: Option<&AuthToken>,
    ) -> Result<Task, RemoteError> {
        let mut state = self.state.lock();
        state.enter(Operation::UpdateTask)?;
        if patch.is_empty() {
            return Err(rejected(400, api::DETAIL_EMPTY_UPDATE));
        }
        let owner = state.owner_of(id)?;
        state.authorize(token, &owner)?;
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == *id)
            .ok_or_else(|| rejected(404, api::DETAIL_TODO_NOT_FOUND))?;
        patch.apply_to(task);
        Ok(task.clone())
    }

    async fn delete_task(&self, id: &TaskId, token: Option<&AuthToken>) -> Result<(), RemoteError> {
        let mut state = self.state.lock();
        state.enter(Operation::DeleteTask)?;
        let owner = state.owner_of(id)?;
        state.authorize(token, &owner)?;
        state.tasks.retain(|t| t.id != *id);
        Ok(())
    }
}
