//! Integration tests for the workspace session.
//!
//! Drives `SessionManager` and `App` against the in-process store and an
//! in-memory name store, checking validation, error classification and
//! what ends up persisted.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;

use taskdeck::app::{App, AppError};
use taskdeck::busy::BusyFlag;
use taskdeck::error::ValidationError;
use taskdeck::remote::RemoteError;
use taskdeck::remote::memory::{MemoryStore, Operation};
use taskdeck::session::{MemoryNameStore, SessionManager, SessionState, WorkspaceError};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn session(store: &MemoryStore, names: &MemoryNameStore) -> SessionManager<MemoryStore, MemoryNameStore> {
    SessionManager::new(Arc::new(store.clone()), names.clone(), BusyFlag::new())
}

fn app(store: &MemoryStore, names: &MemoryNameStore) -> App<MemoryStore, MemoryNameStore> {
    App::new(Arc::new(store.clone()), names.clone())
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn short_credentials_fail_without_network_call() {
    let store = MemoryStore::new();
    let names = MemoryNameStore::new();
    let mut s = session(&store, &names);

    for password in ["", "a", "abcd", "\u{e9}\u{e9}\u{e9}\u{e9}"] {
        let err = s.create_workspace("alice", password).await.unwrap_err();
        assert_eq!(
            err,
            WorkspaceError::Validation(ValidationError::CredentialTooShort { min: 5 })
        );
        let err = s.login_workspace("alice", password).await.unwrap_err();
        assert_eq!(
            err,
            WorkspaceError::Validation(ValidationError::CredentialTooShort { min: 5 })
        );
    }
    assert_eq!(store.total_calls(), 0);
    assert!(s.show_prompt());
    assert_eq!(names.peek(), None);
}

#[tokio::test]
async fn empty_name_fails_without_network_call() {
    let store = MemoryStore::new();
    let names = MemoryNameStore::new();
    let mut s = session(&store, &names);

    let err = s.create_workspace("", "secret1").await.unwrap_err();
    assert_eq!(err, WorkspaceError::Validation(ValidationError::EmptyWorkspaceName));
    assert_eq!(store.total_calls(), 0);
}

// ---------------------------------------------------------------------------
// Create / login
// ---------------------------------------------------------------------------

#[tokio::test]
async fn wrong_password_stays_unbound_and_persists_nothing() {
    let store = MemoryStore::new();
    store.seed_workspace("alice", "secret1");
    let names = MemoryNameStore::new();
    let mut app = app(&store, &names);

    let err = app.login_workspace("alice", "wrong1").await.unwrap_err();
    assert_eq!(err, AppError::Workspace(WorkspaceError::InvalidCredentials));
    assert!(app.show_prompt());
    assert_eq!(app.session().state(), &SessionState::Unbound);
    assert_eq!(names.peek(), None);
    assert_eq!(store.calls(Operation::ListTasks), 0);
}

#[tokio::test]
async fn unknown_workspace_login_is_invalid_credentials() {
    let store = MemoryStore::new();
    let names = MemoryNameStore::new();
    let mut s = session(&store, &names);

    let err = s.login_workspace("nobody", "secret1").await.unwrap_err();
    assert_eq!(err, WorkspaceError::InvalidCredentials);
}

#[tokio::test]
async fn login_binds_persists_and_loads() {
    let store = MemoryStore::new();
    store.seed_workspace("alice", "secret1");
    let names = MemoryNameStore::new();
    let mut app = app(&store, &names);

    app.login_workspace("alice", "secret1").await.unwrap();
    assert!(!app.show_prompt());
    assert_eq!(app.workspace_name(), Some("alice"));
    assert_eq!(names.peek().as_deref(), Some("alice"));
    assert_eq!(store.calls(Operation::ListTasks), 1);
    assert!(app.session().active().unwrap().token().is_some());
}

#[tokio::test]
async fn create_taken_name_is_already_exists() {
    let store = MemoryStore::new();
    let names = MemoryNameStore::new();
    let mut first = session(&store, &names);
    first.create_workspace("team", "secret1").await.unwrap();

    let other_names = MemoryNameStore::new();
    let mut second = session(&store, &other_names);
    let err = second.create_workspace("team", "another1").await.unwrap_err();
    assert!(matches!(err, WorkspaceError::AlreadyExists { ref name } if name == "team"));
    assert_eq!(err.to_string(), "workspace 'team' already exists");
    assert_eq!(other_names.peek(), None);
}

#[tokio::test]
async fn transport_failures_are_transient() {
    let store = MemoryStore::new();
    let names = MemoryNameStore::new();
    let mut s = session(&store, &names);

    store.fail_next(
        Operation::CreateWorkspace,
        RemoteError::Transport("connection refused".to_string()),
    );
    let err = s.create_workspace("alice", "secret1").await.unwrap_err();
    assert!(matches!(err, WorkspaceError::Transient { .. }));
    assert!(s.show_prompt());

    // Retrying after the outage succeeds.
    s.create_workspace("alice", "secret1").await.unwrap();
    assert!(!s.show_prompt());
}

#[tokio::test]
async fn busy_flag_is_clear_after_session_calls() {
    let store = MemoryStore::new();
    let names = MemoryNameStore::new();
    let busy = BusyFlag::new();
    let mut s = SessionManager::new(Arc::new(store.clone()), names.clone(), busy.clone());

    s.create_workspace("alice", "secret1").await.unwrap();
    assert!(!busy.is_busy());
    store.fail_next(Operation::Login, RemoteError::Timeout);
    let _ = s.login_workspace("alice", "secret1").await;
    assert!(!busy.is_busy());
}

// ---------------------------------------------------------------------------
// Restore / unbind
// ---------------------------------------------------------------------------

#[tokio::test]
async fn restored_session_lists_without_token() {
    let store = MemoryStore::new();
    store.seed_workspace("alice", "secret1");
    store.seed_task(taskdeck_proto::task::TaskDraft::titled("carried over").to_new_task("alice"));
    let names = MemoryNameStore::holding("alice");
    let mut app = app(&store, &names);

    app.start().await.unwrap();
    assert_eq!(app.workspace_name(), Some("alice"));
    assert!(app.session().active().unwrap().token().is_none());
    assert_eq!(app.visible_tasks().len(), 1);
    assert_eq!(store.calls(Operation::Login), 0);
}

#[tokio::test]
async fn start_without_persisted_name_shows_prompt() {
    let store = MemoryStore::new();
    let names = MemoryNameStore::new();
    let mut app = app(&store, &names);

    app.start().await.unwrap();
    assert!(app.show_prompt());
    assert_eq!(store.total_calls(), 0);
}

#[tokio::test]
async fn change_workspace_clears_name_and_tasks() {
    let store = MemoryStore::new();
    let names = MemoryNameStore::new();
    let mut app = app(&store, &names);
    app.create_workspace("alice", "secret1").await.unwrap();
    app.draft = taskdeck_proto::task::TaskDraft::titled("t");
    app.add_task().await.unwrap();

    app.change_workspace();
    assert!(app.show_prompt());
    assert_eq!(names.peek(), None);
    assert!(app.visible_tasks().is_empty());

    // A fresh process finds nothing to restore.
    let mut next = self::app(&store, &names);
    assert_eq!(next.restore(), None);
}

#[tokio::test]
async fn rejected_revalidation_unbinds_restored_session() {
    let store = MemoryStore::new();
    store.seed_workspace("alice", "secret1");
    let names = MemoryNameStore::holding("alice");
    let mut app = app(&store, &names);
    app.start().await.unwrap();

    let err = app.login_workspace("alice", "wrong1").await.unwrap_err();
    assert_eq!(err, AppError::Workspace(WorkspaceError::InvalidCredentials));
    assert!(app.show_prompt());
    assert!(app.visible_tasks().is_empty());
    assert_eq!(names.peek(), None);
}
