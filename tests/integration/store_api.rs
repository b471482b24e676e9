//! Integration tests for the reference store's HTTP contract.
//!
//! Each test starts a server on an ephemeral port and talks to it with a
//! plain HTTP client, checking status codes and `detail` messages.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use serde_json::{Value, json};
use taskdeck_server::server::start_server;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn spawn() -> String {
    let (addr, _handle) = start_server("127.0.0.1:0").await.expect("bind");
    format!("http://{addr}")
}

async fn post(client: &reqwest::Client, url: String, body: Value) -> (u16, Value) {
    let resp = client.post(url).json(&body).send().await.expect("send");
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap_or(Value::Null))
}

async fn create_workspace(client: &reqwest::Client, base: &str, name: &str) -> Value {
    let (status, body) = post(
        client,
        format!("{base}/workspaces/"),
        json!({ "name": name, "password": "testpassword" }),
    )
    .await;
    assert_eq!(status, 200);
    body
}

async fn create_todo(client: &reqwest::Client, base: &str, workspace: &str, title: &str) -> Value {
    let (status, body) = post(
        client,
        format!("{base}/todos/"),
        json!({
            "title": title,
            "description": "details",
            "due_date": "2024-12-31T00:00:00",
            "priority": "medium",
            "workspace": workspace,
        }),
    )
    .await;
    assert_eq!(status, 200);
    body
}

// ---------------------------------------------------------------------------
// Workspaces
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_workspace_returns_id_and_name() {
    let base = spawn().await;
    let client = reqwest::Client::new();
    let body = create_workspace(&client, &base, "personal").await;
    assert!(body["id"].is_string());
    assert_eq!(body["name"], "personal");
    assert!(body["token"].is_string());
}

#[tokio::test]
async fn duplicate_workspace_is_400_with_detail() {
    let base = spawn().await;
    let client = reqwest::Client::new();
    create_workspace(&client, &base, "dup").await;
    let (status, body) = post(
        &client,
        format!("{base}/workspaces/"),
        json!({ "name": "dup", "password": "testpassword" }),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["detail"], "Workspace already exists");
}

#[tokio::test]
async fn login_wrong_password_is_400() {
    let base = spawn().await;
    let client = reqwest::Client::new();
    create_workspace(&client, &base, "alice").await;
    let (status, body) = post(
        &client,
        format!("{base}/workspaces/login"),
        json!({ "name": "alice", "password": "wrongpassword" }),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["detail"], "Invalid workspace name or password");
}

#[tokio::test]
async fn short_password_is_400() {
    let base = spawn().await;
    let client = reqwest::Client::new();
    let (status, body) = post(
        &client,
        format!("{base}/workspaces/"),
        json!({ "name": "tiny", "password": "abc" }),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["detail"], "Password must be at least 5 characters long");
}

#[tokio::test]
async fn missing_password_field_is_rejected() {
    let base = spawn().await;
    let client = reqwest::Client::new();
    let (status, body) = post(
        &client,
        format!("{base}/workspaces/"),
        json!({ "name": "nopass" }),
    )
    .await;
    assert_eq!(status, 422);
    assert!(body["detail"].is_string());
}

// ---------------------------------------------------------------------------
// Todos
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_workspace_lists_nothing() {
    let base = spawn().await;
    let client = reqwest::Client::new();
    create_workspace(&client, &base, "empty").await;
    let list: Value = client
        .get(format!("{base}/todos/empty"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn todo_in_unknown_workspace_is_400() {
    let base = spawn().await;
    let client = reqwest::Client::new();
    let (status, body) = post(
        &client,
        format!("{base}/todos/"),
        json!({ "title": "orphan", "priority": "high", "workspace": "ghost" }),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["detail"], "Workspace does not exist");
}

#[tokio::test]
async fn invalid_priority_type_is_422() {
    let base = spawn().await;
    let client = reqwest::Client::new();
    create_workspace(&client, &base, "typed").await;
    let (status, _) = post(
        &client,
        format!("{base}/todos/"),
        json!({ "title": "bad", "due_date": "invalid-date-format",
                "priority": 123, "workspace": "typed" }),
    )
    .await;
    assert_eq!(status, 422);
}

#[tokio::test]
async fn update_then_delete_lifecycle() {
    let base = spawn().await;
    let client = reqwest::Client::new();
    create_workspace(&client, &base, "life").await;
    let todo = create_todo(&client, &base, "life", "Original Title").await;
    let id = todo["id"].as_str().unwrap();

    let updated: Value = client
        .put(format!("{base}/todos/{id}"))
        .json(&json!({ "title": "Updated Title", "completed": true }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated["title"], "Updated Title");
    assert_eq!(updated["completed"], true);
    assert_eq!(updated["priority"], "medium");

    let resp = client.delete(format!("{base}/todos/{id}")).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let ack: Value = resp.json().await.unwrap();
    assert_eq!(ack["message"], "Todo deleted successfully");

    let list: Value = client
        .get(format!("{base}/todos/life"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn unknown_todo_is_404() {
    let base = spawn().await;
    let client = reqwest::Client::new();
    let resp = client
        .put(format!("{base}/todos/64b8f9a2fc13ae1f8e000000"))
        .json(&json!({ "completed": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "Todo not found");

    let resp = client
        .delete(format!("{base}/todos/64b8f9a2fc13ae1f8e000001"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn empty_update_is_400() {
    let base = spawn().await;
    let client = reqwest::Client::new();
    create_workspace(&client, &base, "noop").await;
    let todo = create_todo(&client, &base, "noop", "t").await;
    let id = todo["id"].as_str().unwrap();
    let resp = client
        .put(format!("{base}/todos/{id}"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

// ---------------------------------------------------------------------------
// Bearer tokens
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bearer_token_is_checked_when_present() {
    let base = spawn().await;
    let client = reqwest::Client::new();
    let alice = create_workspace(&client, &base, "alice").await;
    create_workspace(&client, &base, "bob").await;
    let token = alice["token"].as_str().unwrap();

    let own = client
        .get(format!("{base}/todos/alice"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(own.status().as_u16(), 200);

    let foreign = client
        .get(format!("{base}/todos/bob"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(foreign.status().as_u16(), 403);

    let bogus = client
        .get(format!("{base}/todos/alice"))
        .bearer_auth("not-a-token")
        .send()
        .await
        .unwrap();
    assert_eq!(bogus.status().as_u16(), 401);
}
