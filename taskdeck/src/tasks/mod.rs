//! Workspace-scoped task list kept in step with the store.
//!
//! The [`TaskSynchronizer`] never patches its collection locally: every
//! confirmed mutation is followed by a full reload, so the list always
//! matches what the store last returned.

pub mod synchronizer;

use std::fmt;

use taskdeck_proto::task::Task;

use crate::error::ValidationError;
use crate::remote::RemoteError;

pub use synchronizer::TaskSynchronizer;

/// Which mutation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// Creating a task.
    Create,
    /// Updating or toggling a task.
    Update,
    /// Deleting a task.
    Delete,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        })
    }
}

/// Failure of a task operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    /// Rejected before contacting the store.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A mutation was attempted with no workspace bound.
    #[error("no workspace selected")]
    Unbound,

    /// Loading the task list failed.
    #[error("failed to load tasks")]
    Fetch {
        /// What went wrong on the wire.
        source: RemoteError,
    },

    /// The store did not confirm a mutation.
    #[error("failed to {action} task")]
    Mutation {
        /// The attempted mutation.
        action: MutationKind,
        /// What went wrong on the wire.
        source: RemoteError,
    },
}

/// Outcome of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    /// The store deleted the task and the list was reloaded.
    Deleted,
    /// The user declined; nothing was sent.
    Cancelled,
}

/// Asks the user whether a task may be deleted.
pub trait Confirm {
    /// Returns `true` to proceed with deleting `task`.
    fn confirm(&self, task: &Task) -> bool;
}

impl<F: Fn(&Task) -> bool> Confirm for F {
    fn confirm(&self, task: &Task) -> bool {
        self(task)
    }
}
