//! Plain-text rendering of the task list and counters.
//!
//! Output is meant for a terminal's stdout; log lines never go here.

use std::fmt::Write;

use chrono::NaiveDateTime;
use taskdeck_proto::task::{Priority, Task};

use crate::view::{AggregateStats, SortMode};

/// Shown whenever a command needs a workspace and none is bound.
pub const PROMPT_HINT: &str = "No workspace selected. Run `taskdeck workspace create <name>` \
     or `taskdeck workspace login <name>` first.";

const FALLBACK_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Formats `at` with a user-supplied chrono format string.
///
/// An invalid format string falls back to `YYYY-MM-DD HH:MM` rather than
/// failing the whole listing.
#[must_use]
pub fn format_timestamp(at: &NaiveDateTime, format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", at.format(format)).is_ok() {
        return out;
    }
    at.format(FALLBACK_TIMESTAMP_FORMAT).to_string()
}

const fn checkbox(done: bool) -> &'static str {
    if done { "[x]" } else { "[ ]" }
}

const fn priority_label(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "HIGH",
        Priority::Medium => "med",
        Priority::Low => "low",
    }
}

/// Renders one task as one or two lines (the second holds the description).
///
/// Due and creation timestamps are shown only when the task has them.
#[must_use]
pub fn task_line(task: &Task, timestamp_format: &str) -> String {
    let mut line = format!(
        "{} {:<4} {}  {}",
        checkbox(task.completed),
        priority_label(task.priority),
        task.title,
        task.id
    );
    if let Some(due) = &task.due_date {
        let _ = write!(line, "  due {}", format_timestamp(due, timestamp_format));
    }
    if let Some(created) = &task.created_at {
        let _ = write!(line, "  added {}", format_timestamp(created, timestamp_format));
    }
    if let Some(description) = task.description.as_deref().filter(|d| !d.is_empty()) {
        let _ = write!(line, "\n         {description}");
    }
    line
}

/// Renders the whole list under a one-line header.
#[must_use]
pub fn task_list(workspace: &str, tasks: &[Task], sort: SortMode, timestamp_format: &str) -> String {
    let mut out = format!("Workspace '{workspace}' ({} tasks, by {sort})\n", tasks.len());
    if tasks.is_empty() {
        out.push_str("  No tasks yet. Add one with `taskdeck add <title>`.\n");
        return out;
    }
    for task in tasks {
        let _ = writeln!(out, "  {}", task_line(task, timestamp_format));
    }
    out
}

/// Renders the counters as a single line.
#[must_use]
pub fn stats_line(stats: &AggregateStats) -> String {
    format!(
        "total {}  completed {}  pending {}  high priority pending {}",
        stats.total, stats.completed, stats.pending, stats.high_priority_pending
    )
}
