use anyhow::Context;
use tracing::debug;

use crate::task::Task;

/// Serializes the collection as the JSON array kept under the storage key.
pub fn encode(tasks: &[Task]) -> anyhow::Result<String> {
    debug!(count = tasks.len(), "encoding tasks");
    serde_json::to_string(tasks).context("failed to serialize tasks")
}

pub fn decode(raw: &str) -> anyhow::Result<Vec<Task>> {
    let tasks: Vec<Task> =
        serde_json::from_str(raw).context("failed to parse stored task list")?;
    debug!(count = tasks.len(), "decoded tasks");
    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::task::Priority;

    #[test]
    fn round_trip_keeps_deadline_presence_and_instant() {
        let deadline = Utc
            .with_ymd_and_hms(2026, 7, 1, 18, 45, 12)
            .single()
            .expect("valid time")
            + chrono::Duration::milliseconds(250);
        let tasks = vec![
            Task {
                id: Uuid::new_v4(),
                name: "With deadline".to_string(),
                is_done: false,
                priority: Priority::High,
                deadline: Some(deadline),
            },
            Task {
                id: Uuid::new_v4(),
                name: "Without deadline".to_string(),
                is_done: true,
                priority: Priority::Low,
                deadline: None,
            },
        ];

        let raw = encode(&tasks).expect("encode");
        assert_eq!(decode(&raw).expect("decode"), tasks);
    }

    #[test]
    fn absent_deadline_serializes_as_null() {
        let task = Task {
            id: Uuid::nil(),
            name: "No deadline".to_string(),
            is_done: false,
            priority: Priority::Medium,
            deadline: None,
        };
        let raw = encode(&[task]).expect("encode");
        assert!(raw.contains(r#""deadline":null"#), "{raw}");
        assert!(raw.contains(r#""isDone":false"#), "{raw}");
        assert!(raw.contains(r#""priority":2"#), "{raw}");
    }

    #[test]
    fn decode_reports_malformed_input() {
        let err = decode("{not json").expect_err("should fail");
        assert!(format!("{err:#}").contains("failed to parse stored task list"));
    }
}
