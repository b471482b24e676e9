//! Errors caught on the client before anything is sent to the store.

use taskdeck_proto::workspace::MIN_PASSWORD_LENGTH;

/// Input rejected locally; never reaches the network.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Workspace name is empty or only whitespace.
    #[error("workspace name cannot be empty")]
    EmptyWorkspaceName,

    /// Password is shorter than the store accepts.
    #[error("password must be at least {min} characters long")]
    CredentialTooShort {
        /// Minimum length in characters.
        min: usize,
    },

    /// Task title is empty.
    #[error("task title cannot be empty")]
    EmptyTitle,

    /// Update would change no field.
    #[error("update changes nothing")]
    EmptyPatch,
}

/// Checks a workspace name and password before they are sent.
///
/// Length is counted in characters, not bytes.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found.
pub fn validate_credentials(name: &str, password: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyWorkspaceName);
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::CredentialTooShort {
            min: MIN_PASSWORD_LENGTH,
        });
    }
    Ok(())
}
