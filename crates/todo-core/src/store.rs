use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::codec;
use crate::storage::{KeyValueStore, STORAGE_KEY};
use crate::task::{Priority, Task, TaskDraft, TaskPatch};
use crate::validate::{NameError, validate_name};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    InvalidName(#[from] NameError),
    #[error("task not found: {0}")]
    NotFound(Uuid),
    #[error("failed to persist tasks: {0:#}")]
    Persist(anyhow::Error),
}

/// What to do when nothing usable is persisted yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeedPolicy {
    #[default]
    Defaults,
    Empty,
}

/// Owns the canonical task collection and writes it through to `S` after
/// every mutation.
///
/// The collection is held as an immutable snapshot. Mutations install a new
/// snapshot, so an `Arc` handed out by [`TaskStore::snapshot`] never changes.
#[derive(Debug, Clone)]
pub struct TaskStore<S> {
    backend: S,
    key: String,
    tasks: Arc<Vec<Task>>,
}

impl<S: KeyValueStore> TaskStore<S> {
    #[tracing::instrument(skip(backend, now))]
    pub fn open(backend: S, seed: SeedPolicy, now: DateTime<Utc>) -> Self {
        Self::open_with_key(backend, STORAGE_KEY, seed, now)
    }

    #[tracing::instrument(skip(backend, now))]
    fn open_with_key(backend: S, key: &str, seed: SeedPolicy, now: DateTime<Utc>) -> Self {
        let (tasks, seeded) = match restore(&backend, key) {
            Some(tasks) => {
                info!(count = tasks.len(), key, "restored tasks");
                (tasks, false)
            }
            None => {
                let tasks = match seed {
                    SeedPolicy::Defaults => default_tasks(now),
                    SeedPolicy::Empty => vec![],
                };
                info!(count = tasks.len(), key, ?seed, "starting from seed collection");
                let seeded = !tasks.is_empty();
                (tasks, seeded)
            }
        };

        let mut store = Self {
            backend,
            key: key.to_string(),
            tasks: Arc::new(tasks),
        };

        // Seeded ids and deadlines must survive the next open.
        if seeded {
            if let Err(err) = store.persist() {
                warn!(key, error = %err, "failed to persist seed collection");
            }
        }

        store
    }

    pub fn get_all(&self) -> &[Task] {
        &self.tasks
    }

    pub fn snapshot(&self) -> Arc<Vec<Task>> {
        Arc::clone(&self.tasks)
    }

    pub fn get(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    #[tracing::instrument(skip(self, draft), fields(name = %draft.name))]
    pub fn add(&mut self, draft: TaskDraft) -> Result<Uuid, StoreError> {
        validate_name(&draft.name)?;
        let task = Task::from_draft(draft);
        let id = task.id;
        self.commit(|tasks| {
            tasks.push(task);
            Ok(())
        })?;
        info!(%id, "added task");
        Ok(id)
    }

    #[tracing::instrument(skip(self, patch), fields(id = %id))]
    pub fn update(&mut self, id: Uuid, patch: TaskPatch) -> Result<(), StoreError> {
        if let Some(name) = patch.name.as_deref() {
            validate_name(name)?;
        }
        self.commit(|tasks| {
            find_mut(tasks, id)?.apply(patch);
            Ok(())
        })?;
        info!("updated task");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    pub fn set_done(&mut self, id: Uuid, value: bool) -> Result<(), StoreError> {
        self.commit(|tasks| {
            find_mut(tasks, id)?.is_done = value;
            Ok(())
        })?;
        info!(done = value, "set completion");
        Ok(())
    }

    pub fn toggle_done(&mut self, id: Uuid) -> Result<bool, StoreError> {
        let current = self.get(id).ok_or(StoreError::NotFound(id))?.is_done;
        self.set_done(id, !current)?;
        Ok(!current)
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    pub fn remove(&mut self, id: Uuid) -> Result<(), StoreError> {
        self.commit(|tasks| {
            let idx = tasks
                .iter()
                .position(|task| task.id == id)
                .ok_or(StoreError::NotFound(id))?;
            tasks.remove(idx);
            Ok(())
        })?;
        info!("removed task");
        Ok(())
    }

    #[tracing::instrument(skip(self, predicate))]
    pub fn remove_where<F>(&mut self, mut predicate: F) -> Result<usize, StoreError>
    where
        F: FnMut(&Task) -> bool,
    {
        let before = self.tasks.len();
        let mut removed = 0;
        self.commit(|tasks| {
            tasks.retain(|task| !predicate(task));
            removed = before - tasks.len();
            Ok(())
        })?;
        info!(before, removed, "removed matching tasks");
        Ok(removed)
    }

    pub fn remove_completed(&mut self) -> Result<usize, StoreError> {
        self.remove_where(|task| task.is_done)
    }

    /// Applies `change` to a fresh copy of the collection, installs it, then
    /// writes it through. A failed change leaves the snapshot untouched.
    fn commit<F>(&mut self, change: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Vec<Task>) -> Result<(), StoreError>,
    {
        let mut next = self.tasks.as_ref().clone();
        change(&mut next)?;
        self.tasks = Arc::new(next);
        self.persist()
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        let raw = codec::encode(&self.tasks).map_err(StoreError::Persist)?;
        self.backend
            .set(&self.key, &raw)
            .map_err(StoreError::Persist)?;
        debug!(key = %self.key, count = self.tasks.len(), "persisted tasks");
        Ok(())
    }
}

fn find_mut(tasks: &mut [Task], id: Uuid) -> Result<&mut Task, StoreError> {
    tasks
        .iter_mut()
        .find(|task| task.id == id)
        .ok_or(StoreError::NotFound(id))
}

/// Reads the persisted collection. `None` means "start from the seed": nothing
/// stored, an empty array, or data that cannot be read back.
fn restore<S: KeyValueStore>(backend: &S, key: &str) -> Option<Vec<Task>> {
    let raw = match backend.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!(key, "no persisted tasks");
            return None;
        }
        Err(err) => {
            warn!(key, error = %format!("{err:#}"), "failed reading persisted tasks");
            return None;
        }
    };

    if raw.trim().is_empty() || raw.trim() == "[]" {
        debug!(key, "persisted task list is empty");
        return None;
    }

    match codec::decode(&raw) {
        Ok(tasks) => Some(tasks),
        Err(err) => {
            warn!(key, error = %format!("{err:#}"), "discarding unreadable task list");
            None
        }
    }
}

/// Collection used on first run.
pub fn default_tasks(now: DateTime<Utc>) -> Vec<Task> {
    let seed = |name: &str, priority, is_done, deadline| Task {
        id: Uuid::new_v4(),
        name: name.to_string(),
        is_done,
        priority,
        deadline,
    };

    vec![
        seed(
            "Submit the weekly report",
            Priority::High,
            false,
            Some(now - Duration::days(1)),
        ),
        seed(
            "Book a dentist appointment",
            Priority::Medium,
            false,
            Some(now + Duration::days(3)),
        ),
        seed("Read a chapter of a book", Priority::Low, false, None),
        seed("Water the plants", Priority::Medium, true, None),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn draft(name: &str) -> TaskDraft {
        TaskDraft {
            name: name.to_string(),
            ..TaskDraft::default()
        }
    }

    fn empty_store() -> TaskStore<MemoryStore> {
        TaskStore::open(MemoryStore::new(), SeedPolicy::Empty, Utc::now())
    }

    #[test]
    fn seeds_defaults_when_nothing_is_stored() {
        let store = TaskStore::open(MemoryStore::new(), SeedPolicy::Defaults, Utc::now());
        assert_eq!(store.get_all().len(), 4);
        assert!(store.get_all().iter().any(|task| task.is_done));
        assert!(store.get_all().iter().any(|task| task.deadline.is_none()));
    }

    #[test]
    fn empty_array_is_treated_as_nothing_stored() {
        let backend = MemoryStore::with_entry(STORAGE_KEY, "[]");
        let store = TaskStore::open(backend, SeedPolicy::Defaults, Utc::now());
        assert_eq!(store.get_all().len(), 4);
    }

    #[test]
    fn unreadable_data_falls_back_instead_of_failing() {
        let backend = MemoryStore::with_entry(STORAGE_KEY, r#"[{"id":42}]"#);
        let store = TaskStore::open(backend, SeedPolicy::Empty, Utc::now());
        assert!(store.get_all().is_empty());
    }

    #[test]
    fn add_appends_open_task_and_persists() {
        let mut store = empty_store();
        let id = store.add(draft("Buy bread")).expect("add");

        let task = store.get(id).expect("task exists");
        assert!(!task.is_done);
        assert_eq!(task.priority, Priority::Low);

        let raw = store
            .backend()
            .get(STORAGE_KEY)
            .expect("read")
            .expect("persisted");
        assert_eq!(codec::decode(&raw).expect("decode"), store.get_all());
    }

    #[test]
    fn invalid_name_is_rejected_without_mutation() {
        let mut store = empty_store();
        let err = store.add(draft("x")).expect_err("too short");
        assert!(matches!(err, StoreError::InvalidName(NameError::TooShort { len: 1 })));
        assert!(store.get_all().is_empty());
        assert_eq!(store.backend().get(STORAGE_KEY).expect("read"), None);

        let id = store.add(draft("Valid name")).expect("add");
        let err = store
            .update(
                id,
                TaskPatch {
                    name: Some("y".repeat(40)),
                    ..TaskPatch::default()
                },
            )
            .expect_err("too long");
        assert!(matches!(err, StoreError::InvalidName(NameError::TooLong { .. })));
        assert_eq!(store.get(id).expect("exists").name, "Valid name");
    }

    #[test]
    fn update_keeps_position() {
        let mut store = empty_store();
        let first = store.add(draft("First")).expect("add");
        let second = store.add(draft("Second")).expect("add");
        store
            .update(
                first,
                TaskPatch::from_draft(TaskDraft {
                    name: "First, renamed".to_string(),
                    priority: Priority::High,
                    deadline: Some(Utc::now()),
                }),
            )
            .expect("update");

        let ids: Vec<Uuid> = store.get_all().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![first, second]);
        assert_eq!(store.get_all()[0].name, "First, renamed");
        assert_eq!(store.get_all()[0].priority, Priority::High);
    }

    #[test]
    fn remove_completed_leaves_only_open_tasks() {
        let mut store = empty_store();
        let done = store.add(draft("Finished")).expect("add");
        let open = store.add(draft("Pending")).expect("add");
        store.set_done(done, true).expect("set done");

        assert_eq!(store.remove_completed().expect("remove"), 1);
        let ids: Vec<Uuid> = store.get_all().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![open]);
    }

    #[test]
    fn snapshots_are_not_affected_by_later_mutations() {
        let mut store = empty_store();
        let id = store.add(draft("Keep me")).expect("add");
        let before = store.snapshot();
        store.toggle_done(id).expect("toggle");
        store.remove(id).expect("remove");

        assert_eq!(before.len(), 1);
        assert!(!before[0].is_done);
        assert!(store.get_all().is_empty());
    }

    #[test]
    fn unknown_ids_are_reported() {
        let mut store = empty_store();
        let id = Uuid::new_v4();
        assert!(matches!(store.remove(id), Err(StoreError::NotFound(missing)) if missing == id));
        assert!(matches!(store.set_done(id, true), Err(StoreError::NotFound(_))));
        assert!(matches!(store.toggle_done(id), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn reopening_restores_previous_state() {
        let mut store = empty_store();
        let id = store.add(draft("Survive restart")).expect("add");
        store.set_done(id, true).expect("done");

        let backend = store.backend().clone();
        let reopened = TaskStore::open(backend, SeedPolicy::Defaults, Utc::now());
        assert_eq!(reopened.get_all(), store.get_all());
    }

    #[test]
    fn seed_collection_is_written_on_first_open() {
        let store = TaskStore::open(MemoryStore::new(), SeedPolicy::Defaults, Utc::now());
        let raw = store
            .backend()
            .get(STORAGE_KEY)
            .expect("read")
            .expect("seed persisted");
        assert_eq!(codec::decode(&raw).expect("decode"), store.get_all());

        let later = Utc::now() + Duration::days(2);
        let reopened = TaskStore::open(store.backend().clone(), SeedPolicy::Defaults, later);
        let ids = |tasks: &[Task]| tasks.iter().map(|task| task.id).collect::<Vec<_>>();
        assert_eq!(ids(reopened.get_all()), ids(store.get_all()));
        assert_eq!(reopened.get_all(), store.get_all());
    }

    #[test]
    fn empty_seed_writes_nothing() {
        let store = empty_store();
        assert_eq!(store.backend().get(STORAGE_KEY).expect("read"), None);
    }
}
