//! Subcommands of the `taskdeck` binary.

use chrono::NaiveDateTime;
use taskdeck_proto::task::{Priority, TaskPatch, parse_due_date};

use crate::view::SortMode;

/// Top-level command.
#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create, enter, leave or show the workspace.
    #[command(subcommand)]
    Workspace(WorkspaceCommand),

    /// Show the task list.
    List {
        /// Order by `due` date or `priority`.
        #[arg(long)]
        sort: Option<SortMode>,
    },

    /// Add a task.
    Add {
        /// Task title.
        title: String,
        /// Longer description.
        #[arg(long, short)]
        description: Option<String>,
        /// Due date: `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM`.
        #[arg(long, value_parser = parse_due_date)]
        due: Option<NaiveDateTime>,
        /// `low`, `medium` or `high`.
        #[arg(long, short, default_value_t = Priority::Medium)]
        priority: Priority,
    },

    /// Mark a task done, or not done again.
    Toggle {
        /// Task id or unique id prefix.
        id: String,
    },

    /// Change fields of a task.
    Edit {
        /// Task id or unique id prefix.
        id: String,
        #[command(flatten)]
        fields: EditFields,
    },

    /// Delete a task.
    Delete {
        /// Task id or unique id prefix.
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },

    /// Show task counters.
    Stats,
}

/// `taskdeck workspace ...`
#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceCommand {
    /// Create a new workspace and enter it.
    Create(WorkspaceArgs),
    /// Enter an existing workspace.
    Login(WorkspaceArgs),
    /// Forget the current workspace.
    Leave,
    /// Print the current workspace.
    Show,
}

/// Name and password of a workspace.
#[derive(clap::Args, Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceArgs {
    /// Workspace name.
    pub name: String,
    /// Password; read from stdin when neither this nor the env var is set.
    #[arg(long, env = "TASKDECK_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

/// Fields accepted by `taskdeck edit`.
#[derive(clap::Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct EditFields {
    /// New title.
    #[arg(long)]
    pub title: Option<String>,
    /// New description.
    #[arg(long, short)]
    pub description: Option<String>,
    /// New due date.
    #[arg(long, value_parser = parse_due_date)]
    pub due: Option<NaiveDateTime>,
    /// New priority.
    #[arg(long, short)]
    pub priority: Option<Priority>,
    /// Mark done.
    #[arg(long, conflicts_with = "pending")]
    pub done: bool,
    /// Mark not done.
    #[arg(long)]
    pub pending: bool,
}

impl EditFields {
    /// Builds the update to send; empty when no flag was given.
    #[must_use]
    pub fn to_patch(&self) -> TaskPatch {
        TaskPatch {
            title: self.title.clone(),
            description: self.description.clone(),
            completed: match (self.done, self.pending) {
                (true, _) => Some(true),
                (false, true) => Some(false),
                (false, false) => None,
            },
            due_date: self.due,
            priority: self.priority,
        }
    }
}
