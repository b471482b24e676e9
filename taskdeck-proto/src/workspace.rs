//! Workspace authentication messages.

use serde::{Deserialize, Serialize};

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 5;

/// Bearer tokens a store keeps per workspace; issuing one more revokes the oldest.
pub const SESSIONS_PER_WORKSPACE: usize = 8;

/// Body of the create-workspace and login requests.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceCredentials {
    /// Workspace name.
    pub name: String,
    /// Plain password; only ever sent, never stored by clients.
    pub password: String,
}

impl std::fmt::Debug for WorkspaceCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceCredentials")
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Store response to a successful create or login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceInfo {
    /// Store-assigned workspace id.
    pub id: String,
    /// Workspace name.
    pub name: String,
    /// Session token to present as a bearer credential, if the store issues one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}
