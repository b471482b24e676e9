//! End-to-end tests: the client over real HTTP against the reference store.
//!
//! Each test starts a store server on an ephemeral port and drives the
//! client `App` through `HttpStore`, with the workspace name persisted to a
//! scratch state file.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use taskdeck::app::{App, AppError};
use taskdeck::remote::http::HttpStore;
use taskdeck::remote::{AuthToken, RemoteError, RemoteStore};
use taskdeck::session::{FileNameStore, NameStore, WorkspaceError};
use taskdeck::tasks::{Deletion, SyncError};
use taskdeck::view::{AggregateStats, SortMode};
use taskdeck_proto::task::{Priority, Task, TaskDraft, TaskId, TaskPatch, parse_due_date};
use taskdeck_proto::workspace::WorkspaceCredentials;
use taskdeck_server::server::start_server;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn spawn_store() -> HttpStore {
    let (addr, _handle) = start_server("127.0.0.1:0").await.expect("bind");
    HttpStore::new(&format!("http://{addr}"), Duration::from_secs(5)).unwrap()
}

fn scratch_state() -> PathBuf {
    std::env::temp_dir()
        .join(format!("taskdeck-it-{}", uuid::Uuid::new_v4()))
        .join("state.toml")
}

fn app(store: &HttpStore, state: &Path) -> App<HttpStore, FileNameStore> {
    App::new(Arc::new(store.clone()), FileNameStore::new(state))
}

fn creds(name: &str, password: &str) -> WorkspaceCredentials {
    WorkspaceCredentials {
        name: name.to_string(),
        password: password.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn buy_milk_over_http() {
    let store = spawn_store().await;
    let state = scratch_state();
    let mut app = app(&store, &state);

    app.create_workspace("alice", "secret1").await.unwrap();
    app.draft = TaskDraft::titled("Buy milk").with_priority(Priority::High);
    app.add_task().await.unwrap();

    let id = app.visible_tasks()[0].id.to_string();
    app.toggle_task(&id).await.unwrap();

    assert_eq!(
        app.stats(),
        AggregateStats {
            total: 1,
            completed: 1,
            pending: 0,
            high_priority_pending: 0,
        }
    );
    assert_eq!(
        FileNameStore::new(&state).load().unwrap().as_deref(),
        Some("alice")
    );
}

#[tokio::test]
async fn wrong_password_over_http() {
    let store = spawn_store().await;
    store.create_workspace(&creds("alice", "secret1")).await.unwrap();
    let state = scratch_state();
    let mut app = app(&store, &state);

    let err = app.login_workspace("alice", "wrong1").await.unwrap_err();
    assert_eq!(err, AppError::Workspace(WorkspaceError::InvalidCredentials));
    assert!(app.show_prompt());
    assert!(!state.exists());
}

#[tokio::test]
async fn duplicate_workspace_over_http() {
    let store = spawn_store().await;
    store.create_workspace(&creds("team", "secret1")).await.unwrap();
    let state = scratch_state();
    let mut app = app(&store, &state);

    let err = app.create_workspace("team", "secret1").await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Workspace(WorkspaceError::AlreadyExists { .. })
    ));
}

#[tokio::test]
async fn restored_session_survives_restart() {
    let store = spawn_store().await;
    let state = scratch_state();

    let mut first = app(&store, &state);
    first.create_workspace("alice", "secret1").await.unwrap();
    first.draft = TaskDraft::titled("later").with_due_date(parse_due_date("2025-03-01").unwrap());
    first.add_task().await.unwrap();
    first.draft = TaskDraft::titled("sooner").with_due_date(parse_due_date("2025-01-01").unwrap());
    first.add_task().await.unwrap();
    first.draft = TaskDraft::titled("someday");
    first.add_task().await.unwrap();
    drop(first);

    // A new process: no password, no token, same workspace.
    let mut second = app(&store, &state).with_sort_mode(SortMode::DueDate);
    second.start().await.unwrap();
    assert_eq!(second.workspace_name(), Some("alice"));
    let titles: Vec<_> = second
        .visible_tasks()
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(titles, ["sooner", "later", "someday"]);

    second.change_workspace();
    assert!(!state.exists());
}

#[tokio::test]
async fn edit_and_delete_over_http() {
    let store = spawn_store().await;
    let state = scratch_state();
    let mut app = app(&store, &state);
    app.create_workspace("alice", "secret1").await.unwrap();
    app.draft = TaskDraft::titled("draft title");
    app.add_task().await.unwrap();
    let id = app.visible_tasks()[0].id.to_string();

    let patch = TaskPatch {
        title: Some("final title".to_string()),
        description: Some("details".to_string()),
        ..TaskPatch::default()
    };
    app.edit_task(&id, patch).await.unwrap();
    let tasks = app.visible_tasks();
    let task = &tasks[0];
    assert_eq!(task.title, "final title");
    assert_eq!(task.description.as_deref(), Some("details"));

    let declined = app.delete_task(&id, &|_: &Task| false).await.unwrap();
    assert_eq!(declined, Deletion::Cancelled);
    assert_eq!(app.visible_tasks().len(), 1);

    let deleted = app.delete_task(&id, &|_: &Task| true).await.unwrap();
    assert_eq!(deleted, Deletion::Deleted);
    assert!(app.visible_tasks().is_empty());
}

#[tokio::test]
async fn store_error_details_reach_the_client() {
    let store = spawn_store().await;
    let err = store
        .update_task(&TaskId::new("missing"), &TaskPatch::completed(true), None)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        RemoteError::Status {
            status: 404,
            detail: "Todo not found".to_string(),
        }
    );

    let err = store.login_workspace(&creds("ghost", "secret1")).await.unwrap_err();
    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn foreign_token_is_refused_over_http() {
    let store = spawn_store().await;
    let alice = store.create_workspace(&creds("alice", "secret1")).await.unwrap();
    store.create_workspace(&creds("bob", "secret2")).await.unwrap();
    let token = AuthToken::new(alice.token.unwrap());

    assert!(store.list_tasks("alice", Some(&token)).await.is_ok());
    let err = store.list_tasks("bob", Some(&token)).await.unwrap_err();
    assert_eq!(err.status(), Some(403));
}

#[tokio::test]
async fn unreachable_store_is_a_transient_failure() {
    // Bind and immediately drop a listener to get a port nobody serves.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store = HttpStore::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap();
    let state = scratch_state();
    let mut app = app(&store, &state);

    let err = app.create_workspace("alice", "secret1").await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Workspace(WorkspaceError::Transient { .. })
    ));

    // A restored session against a dead store reports a load failure.
    FileNameStore::new(&state).save("alice").unwrap();
    let err = app.start().await.unwrap_err();
    assert!(matches!(err, AppError::Sync(SyncError::Fetch { .. })));
    let _ = std::fs::remove_dir_all(state.parent().unwrap());
}
