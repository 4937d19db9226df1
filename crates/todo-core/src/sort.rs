use std::cmp::Ordering;
use std::fmt;

use anyhow::anyhow;
use tracing::trace;

use crate::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortMode {
    #[default]
    Addition,
    Priority,
    DeadlineNearest,
}

impl SortMode {
    /// Radio-group order used by the front ends.
    pub const ALL: [SortMode; 3] = [
        SortMode::Priority,
        SortMode::DeadlineNearest,
        SortMode::Addition,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SortMode::Addition => "Addition order",
            SortMode::Priority => "Priority order",
            SortMode::DeadlineNearest => "Deadline-nearest order",
        }
    }

    pub fn as_key(self) -> &'static str {
        match self {
            SortMode::Addition => "addition",
            SortMode::Priority => "priority",
            SortMode::DeadlineNearest => "deadline",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_key())
    }
}

impl std::str::FromStr for SortMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "addition" | "added" | "insertion" => Ok(SortMode::Addition),
            "priority" => Ok(SortMode::Priority),
            "deadline" | "deadline-nearest" | "due" => Ok(SortMode::DeadlineNearest),
            other => Err(anyhow!(
                "unknown sort mode: {other} (expected addition, priority or deadline)"
            )),
        }
    }
}

/// Returns the tasks in display order for `mode`. The input is never reordered;
/// every mode works on a fresh copy with a stable sort.
pub fn order(tasks: &[Task], mode: SortMode) -> Vec<Task> {
    trace!(count = tasks.len(), mode = %mode, "ordering tasks");
    match mode {
        SortMode::Addition => tasks.to_vec(),
        SortMode::Priority => {
            let mut out = tasks.to_vec();
            out.sort_by(compare_by_priority);
            out
        }
        SortMode::DeadlineNearest => {
            let (mut with_deadline, mut without_deadline): (Vec<Task>, Vec<Task>) =
                tasks.iter().cloned().partition(|task| task.deadline.is_some());
            with_deadline.sort_by(compare_by_deadline);
            without_deadline.sort_by(compare_completion_then_priority);
            with_deadline.extend(without_deadline);
            with_deadline
        }
    }
}

fn compare_completion(a: &Task, b: &Task) -> Ordering {
    a.is_done.cmp(&b.is_done)
}

fn compare_completion_then_priority(a: &Task, b: &Task) -> Ordering {
    compare_completion(a, b).then_with(|| a.priority.cmp(&b.priority))
}

// Equal priorities only look at whether a deadline exists, not at its value.
fn compare_by_priority(a: &Task, b: &Task) -> Ordering {
    compare_completion_then_priority(a, b)
        .then_with(|| a.deadline.is_none().cmp(&b.deadline.is_none()))
}

fn compare_by_deadline(a: &Task, b: &Task) -> Ordering {
    compare_completion(a, b)
        .then_with(|| a.deadline.cmp(&b.deadline))
        .then_with(|| a.priority.cmp(&b.priority))
}
