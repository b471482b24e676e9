//! HTTP surface of the reference store: routing, bearer checks, and error
//! mapping.
//!
//! Bearer tokens are optional. A request that carries one must present a
//! token the store issued, and that token must belong to the workspace the
//! request touches.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{post, put};
use taskdeck_proto::api::{self, DeleteAck, ErrorBody};
use taskdeck_proto::task::{NewTask, Task, TaskId, TaskPatch};
use taskdeck_proto::workspace::{WorkspaceCredentials, WorkspaceInfo};

use crate::store::{StoreError, TaskStore};

/// Error returned from a handler.
#[derive(Debug)]
pub enum ApiError {
    /// The store refused the operation.
    Store(StoreError),
    /// The request body could not be decoded.
    Malformed(JsonRejection),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            Self::Store(err) => (store_status(&err), err.to_string()),
            Self::Malformed(rejection) => (rejection.status(), rejection.body_text()),
        };
        (status, Json(ErrorBody::new(detail))).into_response()
    }
}

const fn store_status(err: &StoreError) -> StatusCode {
    match err {
        StoreError::WorkspaceExists
        | StoreError::InvalidLogin
        | StoreError::EmptyName
        | StoreError::PasswordTooShort { .. }
        | StoreError::WorkspaceMissing
        | StoreError::EmptyTitle
        | StoreError::EmptyUpdate => StatusCode::BAD_REQUEST,
        StoreError::TodoNotFound => StatusCode::NOT_FOUND,
        StoreError::InvalidToken => StatusCode::UNAUTHORIZED,
        StoreError::Forbidden => StatusCode::FORBIDDEN,
    }
}

type Shared = State<Arc<TaskStore>>;

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(value)| value).map_err(ApiError::Malformed)
}

/// Extracts the bearer token, if an `Authorization` header is present.
fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, StoreError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(Some)
        .ok_or(StoreError::InvalidToken)
}

async fn authorize(store: &TaskStore, headers: &HeaderMap, workspace: &str) -> Result<(), ApiError> {
    let Some(token) = bearer_token(headers)? else {
        return Ok(());
    };
    match store.workspace_for_token(token).await {
        None => Err(StoreError::InvalidToken.into()),
        Some(owner) if owner != workspace => Err(StoreError::Forbidden.into()),
        Some(_) => Ok(()),
    }
}

async fn create_workspace(
    State(store): Shared,
    payload: Result<Json<WorkspaceCredentials>, JsonRejection>,
) -> Result<Json<WorkspaceInfo>, ApiError> {
    let creds = body(payload)?;
    Ok(Json(store.create_workspace(&creds).await?))
}

async fn login_workspace(
    State(store): Shared,
    payload: Result<Json<WorkspaceCredentials>, JsonRejection>,
) -> Result<Json<WorkspaceInfo>, ApiError> {
    let creds = body(payload)?;
    Ok(Json(store.login(&creds).await?))
}

async fn list_todos(
    State(store): Shared,
    headers: HeaderMap,
    Path(workspace): Path<String>,
) -> Result<Json<Vec<Task>>, ApiError> {
    authorize(&store, &headers, &workspace).await?;
    Ok(Json(store.list_tasks(&workspace).await))
}

async fn create_todo(
    State(store): Shared,
    headers: HeaderMap,
    payload: Result<Json<NewTask>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    let new_task = body(payload)?;
    authorize(&store, &headers, &new_task.workspace).await?;
    Ok(Json(store.create_task(new_task).await?))
}

async fn update_todo(
    State(store): Shared,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: Result<Json<TaskPatch>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    let patch = body(payload)?;
    let id = TaskId::new(id);
    let owner = store
        .task_workspace(&id)
        .await
        .ok_or(StoreError::TodoNotFound)?;
    authorize(&store, &headers, &owner).await?;
    Ok(Json(store.update_task(&id, &patch).await?))
}

async fn delete_todo(
    State(store): Shared,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<DeleteAck>, ApiError> {
    let id = TaskId::new(id);
    let owner = store
        .task_workspace(&id)
        .await
        .ok_or(StoreError::TodoNotFound)?;
    authorize(&store, &headers, &owner).await?;
    store.delete_task(&id).await?;
    Ok(Json(DeleteAck {
        message: api::MESSAGE_TODO_DELETED.to_string(),
    }))
}

/// Builds the router for the task store API.
///
/// `/todos/{key}` is a single route: `GET` reads `key` as a workspace name,
/// `PUT` and `DELETE` read it as a task id.
pub fn router(store: Arc<TaskStore>) -> axum::Router {
    axum::Router::new()
        .route(&format!("/{}/", api::WORKSPACES), post(create_workspace))
        .route(
            &format!("/{}/{}", api::WORKSPACES, api::LOGIN),
            post(login_workspace),
        )
        .route(&format!("/{}/", api::TODOS), post(create_todo))
        .route(
            &format!("/{}/{{key}}", api::TODOS),
            put(update_todo).get(list_todos).delete(delete_todo),
        )
        .with_state(store)
}

/// Starts the store server with an empty [`TaskStore`].
///
/// Returns the bound address (useful when binding port 0) and the server
/// task handle.
///
/// # Errors
///
/// Returns an error if the address cannot be bound.
pub async fn start_server(
    addr: &str,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    start_server_with_store(addr, Arc::new(TaskStore::new())).await
}

/// Starts the store server over an existing [`TaskStore`].
///
/// # Errors
///
/// Returns an error if the address cannot be bound.
pub async fn start_server_with_store(
    addr: &str,
    store: Arc<TaskStore>,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    let app = router(store);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "store server error");
        }
    });

    Ok((bound_addr, handle))
}
