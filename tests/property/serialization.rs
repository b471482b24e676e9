//! Property-based tests for the task store wire types.
//!
//! Uses proptest to verify:
//! 1. Any task the store can return survives a JSON write → read cycle.
//! 2. Patches only ever serialize the fields they set.
//! 3. Arbitrary text never panics the due-date parser or the task reader.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use chrono::{NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use taskdeck_proto::task::{Priority, Task, TaskDraft, TaskId, TaskPatch, parse_due_date};

// --- Strategies ---

/// Strategy for generating arbitrary `Priority` values.
fn arb_priority() -> impl Strategy<Value = Priority> {
    prop_oneof![
        Just(Priority::Low),
        Just(Priority::Medium),
        Just(Priority::High)
    ]
}

/// Strategy for whole-second date-times between 1970 and ~2100.
fn arb_datetime() -> impl Strategy<Value = NaiveDateTime> {
    (0i64..4_102_444_800).prop_map(|secs| {
        chrono::DateTime::from_timestamp(secs, 0)
            .expect("in range")
            .naive_utc()
    })
}

/// Strategy for generating arbitrary `Task` values.
fn arb_task() -> impl Strategy<Value = Task> {
    (
        "[0-9a-f]{24}",
        "[^\x00]{1,64}",
        proptest::option::of("[^\x00]{0,128}"),
        any::<bool>(),
        proptest::option::of(arb_datetime()),
        proptest::option::of(arb_datetime()),
        arb_priority(),
        "[a-z0-9_]{1,32}",
    )
        .prop_map(
            |(id, title, description, completed, created_at, due_date, priority, workspace)| Task {
                id: TaskId::new(id),
                title,
                description,
                completed,
                created_at,
                due_date,
                priority,
                workspace,
            },
        )
}

/// Strategy for generating arbitrary `TaskPatch` values.
fn arb_patch() -> impl Strategy<Value = TaskPatch> {
    (
        proptest::option::of("[^\x00]{1,32}"),
        proptest::option::of(any::<bool>()),
        proptest::option::of(arb_priority()),
    )
        .prop_map(|(title, completed, priority)| TaskPatch {
            title,
            completed,
            priority,
            ..TaskPatch::default()
        })
}

// --- Property tests ---

proptest! {
    /// Any task survives a JSON write → read cycle unchanged.
    #[test]
    fn task_json_round_trip(task in arb_task()) {
        let json = serde_json::to_string(&task).expect("serialize");
        let decoded: Task = serde_json::from_str(&json).expect("deserialize");
        prop_assert_eq!(task, decoded);
    }

    /// A serialized patch contains exactly the keys of its present fields.
    #[test]
    fn patch_serializes_only_set_fields(patch in arb_patch()) {
        let value = serde_json::to_value(&patch).expect("serialize");
        let object = value.as_object().expect("patch is an object");
        prop_assert_eq!(object.contains_key("title"), patch.title.is_some());
        prop_assert_eq!(object.contains_key("completed"), patch.completed.is_some());
        prop_assert_eq!(object.contains_key("priority"), patch.priority.is_some());
        prop_assert!(!object.contains_key("description"));
        prop_assert_eq!(object.is_empty(), patch.is_empty());
    }

    /// A draft keeps its title, priority and due date when bound to a workspace.
    #[test]
    fn draft_to_new_task_preserves_fields(
        title in "[^\x00]{1,64}",
        priority in arb_priority(),
        due in proptest::option::of(arb_datetime()),
    ) {
        let mut draft = TaskDraft::titled(title.clone()).with_priority(priority);
        draft.due_date = due;
        let new_task = draft.to_new_task("ws");
        prop_assert_eq!(new_task.title, title);
        prop_assert_eq!(new_task.priority, priority);
        prop_assert_eq!(new_task.due_date, due);
        prop_assert_eq!(new_task.workspace, "ws");
    }

    /// Every calendar date parses to midnight of that date.
    #[test]
    fn bare_dates_parse_to_midnight(days in 0i64..60_000) {
        let date = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap() + chrono::Duration::days(days);
        let parsed = parse_due_date(&date.format("%Y-%m-%d").to_string()).expect("valid date");
        prop_assert_eq!(parsed, date.and_hms_opt(0, 0, 0).unwrap());
    }

    /// Arbitrary text never panics the due-date parser.
    #[test]
    fn due_date_parser_no_panic(input in ".{0,64}") {
        let _ = parse_due_date(&input);
    }

    /// Arbitrary text never panics the task reader; it returns Err gracefully.
    #[test]
    fn random_json_decode_no_panic(input in ".{0,256}") {
        let _ = serde_json::from_str::<Task>(&input);
    }
}
