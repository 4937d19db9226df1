use std::fmt::Display;

use chrono::{DateTime, TimeZone, Utc};

use crate::datetime::format_deadline;
use crate::sort::{SortMode, order};
use crate::task::{Priority, Task};

pub const NO_TASKS_NOTICE: &str = "There are no tasks registered right now.";

const STAR: &str = "★";

/// One task plus everything a front end derives from it for display.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRow {
    pub task: Task,
    pub overdue: bool,
    pub stars: String,
    pub deadline_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListView {
    /// Rendered as [`NO_TASKS_NOTICE`] instead of a list container.
    Empty,
    Rows(Vec<TaskRow>),
}

impl ListView {
    pub fn is_empty(&self) -> bool {
        matches!(self, ListView::Empty)
    }

    pub fn rows(&self) -> &[TaskRow] {
        match self {
            ListView::Empty => &[],
            ListView::Rows(rows) => rows,
        }
    }
}

pub fn remaining_count(tasks: &[Task]) -> usize {
    tasks.iter().filter(|task| !task.is_done).count()
}

pub fn is_overdue(task: &Task, now: DateTime<Utc>) -> bool {
    !task.is_done && task.deadline.is_some_and(|deadline| now > deadline)
}

pub fn star_glyphs(priority: Priority) -> String {
    STAR.repeat(priority.stars())
}

pub fn remaining_message(count: usize) -> String {
    if count == 1 {
        "You have 1 task left!".to_string()
    } else {
        format!("You have {count} tasks left!")
    }
}

#[tracing::instrument(skip(tasks, now, tz), fields(count = tasks.len()))]
pub fn build_view<Tz>(tasks: &[Task], mode: SortMode, now: DateTime<Utc>, tz: &Tz) -> ListView
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if tasks.is_empty() {
        return ListView::Empty;
    }

    let rows = order(tasks, mode)
        .into_iter()
        .map(|task| TaskRow {
            overdue: is_overdue(&task, now),
            stars: star_glyphs(task.priority),
            deadline_label: task.deadline.map(|deadline| format_deadline(deadline, tz)),
            task,
        })
        .collect();

    ListView::Rows(rows)
}
