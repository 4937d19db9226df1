use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Urgency of a task. The numeric value is what gets persisted; lower numbers
/// render with more stars.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum Priority {
    High = 1,
    Medium = 2,
    #[default]
    Low = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PriorityError {
    #[error("priority must be 1, 2 or 3 (got {0})")]
    OutOfRange(u8),
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_number(self) -> u8 {
        self as u8
    }

    pub fn stars(self) -> usize {
        4 - usize::from(self.as_number())
    }
}

impl TryFrom<u8> for Priority {
    type Error = PriorityError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Priority::High),
            2 => Ok(Priority::Medium),
            3 => Ok(Priority::Low),
            other => Err(PriorityError::OutOfRange(other)),
        }
    }
}

impl From<Priority> for u8 {
    fn from(value: Priority) -> Self {
        value.as_number()
    }
}

impl std::str::FromStr for Priority {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n: u8 = s
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("priority must be 1, 2 or 3 (got {s:?})"))?;
        Ok(Priority::try_from(n)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,

    pub name: String,

    #[serde(default)]
    pub is_done: bool,

    pub priority: Priority,

    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
}

/// Payload of the add/edit form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskDraft {
    pub name: String,
    pub priority: Priority,
    pub deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub priority: Option<Priority>,
    /// `Some(None)` clears the deadline.
    pub deadline: Option<Option<DateTime<Utc>>>,
}

impl Task {
    pub fn from_draft(draft: TaskDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: draft.name,
            is_done: false,
            priority: draft.priority,
            deadline: draft.deadline,
        }
    }

    pub fn to_draft(&self) -> TaskDraft {
        TaskDraft {
            name: self.name.clone(),
            priority: self.priority,
            deadline: self.deadline,
        }
    }

    pub fn apply(&mut self, patch: TaskPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(deadline) = patch.deadline {
            self.deadline = deadline;
        }
    }
}

impl TaskPatch {
    pub fn from_draft(draft: TaskDraft) -> Self {
        Self {
            name: Some(draft.name),
            priority: Some(draft.priority),
            deadline: Some(draft.deadline),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.priority.is_none() && self.deadline.is_none()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn priority_maps_to_star_count() {
        assert_eq!(Priority::High.stars(), 3);
        assert_eq!(Priority::Medium.stars(), 2);
        assert_eq!(Priority::Low.stars(), 1);
    }

    #[test]
    fn priority_rejects_out_of_range_numbers() {
        assert_eq!(Priority::try_from(0), Err(PriorityError::OutOfRange(0)));
        assert_eq!(Priority::try_from(4), Err(PriorityError::OutOfRange(4)));
        assert!("2".parse::<Priority>().is_ok());
        assert!("high".parse::<Priority>().is_err());
    }

    #[test]
    fn deserializes_browser_json_with_missing_deadline() {
        let raw = r#"{"id":"6f1c2f5e-5a8c-4b8e-9f55-2b7f0d1f6d11","name":"Buy milk","isDone":true,"priority":2}"#;
        let task: Task = serde_json::from_str(raw).expect("parse task");
        assert_eq!(task.name, "Buy milk");
        assert!(task.is_done);
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.deadline, None);
    }

    #[test]
    fn deserializes_millisecond_timestamps() {
        let raw = r#"{"id":"6f1c2f5e-5a8c-4b8e-9f55-2b7f0d1f6d11","name":"Report","isDone":false,"priority":1,"deadline":"2025-03-01T09:30:00.000Z"}"#;
        let task: Task = serde_json::from_str(raw).expect("parse task");
        let expected = Utc
            .with_ymd_and_hms(2025, 3, 1, 9, 30, 0)
            .single()
            .expect("valid time");
        assert_eq!(task.deadline, Some(expected));
    }

    #[test]
    fn rejects_invalid_priority_in_json() {
        let raw = r#"{"id":"6f1c2f5e-5a8c-4b8e-9f55-2b7f0d1f6d11","name":"Bad","isDone":false,"priority":7}"#;
        assert!(serde_json::from_str::<Task>(raw).is_err());
    }

    #[test]
    fn patch_can_clear_deadline() {
        let mut task = Task::from_draft(TaskDraft {
            name: "Call bank".to_string(),
            priority: Priority::High,
            deadline: Some(Utc::now()),
        });
        task.apply(TaskPatch {
            deadline: Some(None),
            ..TaskPatch::default()
        });
        assert_eq!(task.deadline, None);
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.name, "Call bank");
    }
}
