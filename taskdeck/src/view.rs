//! Display-ready projections of a task list.
//!
//! Everything here is a pure function of a borrowed slice; nothing is
//! cached and the input is never reordered in place.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use taskdeck_proto::task::{Priority, Task};

/// Ordering applied to the visible list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    /// Earliest due date first; tasks without one go last.
    #[default]
    DueDate,
    /// High before medium before low.
    Priority,
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::DueDate => "due date",
            Self::Priority => "priority",
        })
    }
}

/// Error returned when a sort mode name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort mode '{0}' (expected due or priority)")]
pub struct ParseSortModeError(String);

impl FromStr for SortMode {
    type Err = ParseSortModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "due" | "due_date" | "duedate" | "date" => Ok(Self::DueDate),
            "priority" | "prio" => Ok(Self::Priority),
            _ => Err(ParseSortModeError(s.to_string())),
        }
    }
}

/// Returns a sorted copy of `tasks`. Equal keys keep their input order.
#[must_use]
pub fn sort_tasks(tasks: &[Task], mode: SortMode) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    match mode {
        SortMode::DueDate => sorted.sort_by(by_due_date),
        SortMode::Priority => sorted.sort_by_key(|t| std::cmp::Reverse(t.priority.rank())),
    }
    sorted
}

fn by_due_date(a: &Task, b: &Task) -> Ordering {
    match (a.due_date, b.due_date) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Counters shown above the task list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregateStats {
    /// All tasks.
    pub total: usize,
    /// Tasks marked done.
    pub completed: usize,
    /// Tasks not yet done.
    pub pending: usize,
    /// Pending tasks with high priority.
    pub high_priority_pending: usize,
}

/// Counts tasks by completion and priority.
#[must_use]
pub fn compute_stats(tasks: &[Task]) -> AggregateStats {
    tasks.iter().fold(AggregateStats::default(), |mut stats, task| {
        stats.total += 1;
        if task.completed {
            stats.completed += 1;
        } else {
            stats.pending += 1;
            if task.priority == Priority::High {
                stats.high_priority_pending += 1;
            }
        }
        stats
    })
}
