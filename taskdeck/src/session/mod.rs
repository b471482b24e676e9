//! Workspace session: which workspace this client is bound to.
//!
//! Nothing else in the client runs until a workspace is bound. The
//! [`SessionManager`] validates credentials locally, asks the store to
//! create or log into a workspace, keeps the issued token in memory and
//! persists only the workspace name through a [`NameStore`].

pub mod persist;

use std::sync::Arc;

use taskdeck_proto::workspace::{WorkspaceCredentials, WorkspaceInfo};

use crate::busy::BusyFlag;
use crate::error::{ValidationError, validate_credentials};
use crate::remote::{AuthToken, RemoteError, RemoteStore};

pub use persist::{FileNameStore, MemoryNameStore, NameStore, PersistError};

/// The workspace a session is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceIdentity {
    name: String,
    token: Option<AuthToken>,
}

impl WorkspaceIdentity {
    /// Identity established by a successful create or login.
    pub fn authenticated(name: impl Into<String>, token: Option<AuthToken>) -> Self {
        Self {
            name: name.into(),
            token,
        }
    }

    /// Identity rebuilt from a persisted name. Carries no token.
    pub fn restored(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            token: None,
        }
    }

    /// Workspace name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Session token, if the store issued one during this run.
    #[must_use]
    pub const fn token(&self) -> Option<&AuthToken> {
        self.token.as_ref()
    }
}

/// Whether the client is bound to a workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// No workspace; the workspace prompt is shown.
    #[default]
    Unbound,
    /// Bound to a workspace.
    Bound(WorkspaceIdentity),
}

/// Failure of a workspace operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkspaceError {
    /// Rejected before contacting the store.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The store already has a workspace with this name.
    #[error("workspace '{name}' already exists")]
    AlreadyExists {
        /// Requested name.
        name: String,
    },

    /// The store refused the name and password.
    #[error("invalid workspace name or password")]
    InvalidCredentials,

    /// The store could not be reached or failed; retrying may help.
    #[error("could not reach the task store, please try again")]
    Transient {
        /// What went wrong on the wire.
        source: RemoteError,
    },
}

/// Owns the workspace identity and its persisted name.
pub struct SessionManager<R, N> {
    remote: Arc<R>,
    names: N,
    state: SessionState,
    busy: BusyFlag,
    last_error: Option<WorkspaceError>,
}

impl<R: RemoteStore, N: NameStore> SessionManager<R, N> {
    /// Creates an unbound session.
    pub fn new(remote: Arc<R>, names: N, busy: BusyFlag) -> Self {
        Self {
            remote,
            names,
            state: SessionState::Unbound,
            busy,
            last_error: None,
        }
    }

    /// Reads the persisted workspace name and, if there is one, binds to it
    /// without a token.
    ///
    /// An unreadable state file is logged and treated as no name.
    pub fn restore_workspace_name(&mut self) -> Option<String> {
        match self.names.load() {
            Ok(Some(name)) => {
                tracing::info!(workspace = %name, "restored workspace from state file");
                self.state = SessionState::Bound(WorkspaceIdentity::restored(name.clone()));
                Some(name)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "could not read persisted workspace name");
                None
            }
        }
    }

    /// Creates a workspace on the store and binds to it.
    ///
    /// # Errors
    ///
    /// - [`WorkspaceError::Validation`] for an empty name or short password
    ///   (no request is sent)
    /// - [`WorkspaceError::AlreadyExists`] if the store answers 400
    /// - [`WorkspaceError::Transient`] for anything else
    pub async fn create_workspace(&mut self, name: &str, password: &str) -> Result<(), WorkspaceError> {
        self.last_error = None;
        let result = self.try_create(name, password).await;
        self.record(result)
    }

    async fn try_create(&mut self, name: &str, password: &str) -> Result<(), WorkspaceError> {
        validate_credentials(name, password)?;
        let creds = credentials(name, password);

        let info = {
            let _busy = self.busy.enter();
            self.remote.create_workspace(&creds).await
        };
        match info {
            Ok(info) => {
                self.bind(info);
                Ok(())
            }
            Err(RemoteError::Status { status: 400, .. }) => Err(WorkspaceError::AlreadyExists {
                name: name.to_string(),
            }),
            Err(source) => Err(WorkspaceError::Transient { source }),
        }
    }

    /// Logs into an existing workspace and binds to it.
    ///
    /// A rejected login for the workspace this session is already bound to
    /// unbinds it, since the remembered name can no longer be trusted.
    ///
    /// # Errors
    ///
    /// - [`WorkspaceError::Validation`] for an empty name or short password
    ///   (no request is sent)
    /// - [`WorkspaceError::InvalidCredentials`] on any 4xx answer
    /// - [`WorkspaceError::Transient`] for transport failures and 5xx
    pub async fn login_workspace(&mut self, name: &str, password: &str) -> Result<(), WorkspaceError> {
        self.last_error = None;
        let result = self.try_login(name, password).await;
        self.record(result)
    }

    async fn try_login(&mut self, name: &str, password: &str) -> Result<(), WorkspaceError> {
        validate_credentials(name, password)?;
        let creds = credentials(name, password);

        let info = {
            let _busy = self.busy.enter();
            self.remote.login_workspace(&creds).await
        };
        match info {
            Ok(info) => {
                self.bind(info);
                Ok(())
            }
            Err(e) if e.is_rejection() => {
                if self.active().is_some_and(|id| id.name() == name) {
                    tracing::info!(workspace = %name, "re-validation failed, unbinding");
                    self.unbind();
                }
                Err(WorkspaceError::InvalidCredentials)
            }
            Err(source) => Err(WorkspaceError::Transient { source }),
        }
    }

    /// Forgets the workspace: clears the persisted name and returns to
    /// [`SessionState::Unbound`].
    pub fn unbind(&mut self) {
        if let Err(e) = self.names.clear() {
            tracing::warn!(error = %e, "could not clear persisted workspace name");
        }
        if let SessionState::Bound(identity) = std::mem::take(&mut self.state) {
            tracing::info!(workspace = %identity.name(), "unbound workspace");
        }
    }

    /// Current session state.
    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// The bound workspace, if any.
    #[must_use]
    pub const fn active(&self) -> Option<&WorkspaceIdentity> {
        match &self.state {
            SessionState::Bound(identity) => Some(identity),
            SessionState::Unbound => None,
        }
    }

    /// `true` while no workspace is bound.
    #[must_use]
    pub const fn show_prompt(&self) -> bool {
        matches!(self.state, SessionState::Unbound)
    }

    /// The most recent failure, cleared when the next operation starts.
    #[must_use]
    pub const fn last_error(&self) -> Option<&WorkspaceError> {
        self.last_error.as_ref()
    }

    /// Discards the most recent failure.
    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    fn bind(&mut self, info: WorkspaceInfo) {
        if let Err(e) = self.names.save(&info.name) {
            tracing::warn!(error = %e, "could not persist workspace name");
        }
        tracing::info!(workspace = %info.name, id = %info.id, "bound workspace");
        self.state = SessionState::Bound(WorkspaceIdentity::authenticated(
            info.name,
            info.token.map(AuthToken::new),
        ));
    }

    fn record(&mut self, result: Result<(), WorkspaceError>) -> Result<(), WorkspaceError> {
        if let Err(e) = &result {
            tracing::warn!(error = %e, "workspace operation failed");
            self.last_error = Some(e.clone());
        }
        result
    }
}

fn credentials(name: &str, password: &str) -> WorkspaceCredentials {
    WorkspaceCredentials {
        name: name.to_string(),
        password: password.to_string(),
    }
}
