//! HTTP client for a live task store.
//!
//! Speaks JSON via `reqwest`. Every request is bounded by the client-wide
//! timeout, logged at `debug`, and carries `Authorization: Bearer` when a
//! token is supplied.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use taskdeck_proto::api::{self, DeleteAck, ErrorBody};
use taskdeck_proto::task::{NewTask, Task, TaskId, TaskPatch};
use taskdeck_proto::workspace::{WorkspaceCredentials, WorkspaceInfo};
use url::Url;

use super::{AuthToken, RemoteError, RemoteStore};

/// [`RemoteStore`] backed by the store's HTTP API.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    base: Url,
}

impl HttpStore {
    /// Creates a client for the store at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Transport`] if the URL cannot be used as a
    /// base or the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let base = Url::parse(base_url)
            .map_err(|e| RemoteError::Transport(format!("invalid store url '{base_url}': {e}")))?;
        if base.cannot_be_a_base() {
            return Err(RemoteError::Transport(format!(
                "invalid store url '{base_url}': not a base url"
            )));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;
        Ok(Self { client, base })
    }

    /// Returns the store's base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base
    }

    /// Joins path segments onto the base URL, percent-encoding each one.
    ///
    /// A trailing empty segment yields a trailing slash (`/todos/`).
    fn endpoint(&self, segments: &[&str]) -> Result<Url, RemoteError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| RemoteError::Transport("store url cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        token: Option<&AuthToken>,
    ) -> Result<T, RemoteError> {
        let request = match token {
            Some(token) => request.bearer_auth(token.expose()),
            None => request,
        };
        let request = request.build().map_err(classify)?;
        tracing::debug!(method = %request.method(), url = %request.url(), "sending store request");

        let response = self.client.execute(request).await.map_err(classify)?;
        let status = response.status();
        let url = response.url().clone();

        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("request failed").to_string();
            let detail = match response.json::<ErrorBody>().await {
                Ok(body) => body.detail,
                Err(_) => reason,
            };
            tracing::debug!(%url, status = status.as_u16(), %detail, "store returned error");
            return Err(RemoteError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        tracing::debug!(%url, status = status.as_u16(), "received store response");
        response
            .json::<T>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

fn classify(err: reqwest::Error) -> RemoteError {
    if err.is_timeout() {
        RemoteError::Timeout
    } else if err.is_decode() {
        RemoteError::Decode(err.to_string())
    } else {
        RemoteError::Transport(err.to_string())
    }
}

impl RemoteStore for HttpStore {
    async fn create_workspace(
        &self,
        creds: &WorkspaceCredentials,
    ) -> Result<WorkspaceInfo, RemoteError> {
        let url = self.endpoint(&[api::WORKSPACES, ""])?;
        self.send(self.client.post(url).json(creds), None).await
    }

    async fn login_workspace(
        &self,
        creds: &WorkspaceCredentials,
    ) -> Result<WorkspaceInfo, RemoteError> {
        let url = self.endpoint(&[api::WORKSPACES, api::LOGIN])?;
        self.send(self.client.post(url).json(creds), None).await
    }

    async fn list_tasks(
        &self,
        workspace: &str,
        token: Option<&AuthToken>,
    ) -> Result<Vec<Task>, RemoteError> {
        let url = self.endpoint(&[api::TODOS, workspace])?;
        self.send(self.client.get(url), token).await
    }

    async fn create_task(
        &self,
        task: &NewTask,
        token: Option<&AuthToken>,
    ) -> Result<Task, RemoteError> {
        let url = self.endpoint(&[api::TODOS, ""])?;
        self.send(self.client.post(url).json(task), token).await
    }

    async fn update_task(
        &self,
        id: &TaskId,
        patch: &TaskPatch,
        token: Option<&AuthToken>,
    ) -> Result<Task, RemoteError> {
        let url = self.endpoint(&[api::TODOS, id.as_str()])?;
        self.send(self.client.put(url).json(patch), token).await
    }

    async fn delete_task(&self, id: &TaskId, token: Option<&AuthToken>) -> Result<(), RemoteError> {
        let url = self.endpoint(&[api::TODOS, id.as_str()])?;
        let _ack: DeleteAck = self.send(self.client.delete(url), token).await?;
        Ok(())
    }
}
