//! Task list model, ordering rules and persistence shared by the terminal and
//! browser front ends.

pub mod codec;
pub mod datetime;
pub mod notify;
pub mod sort;
pub mod storage;
pub mod store;
pub mod task;
pub mod validate;
pub mod view;

pub use sort::{SortMode, order};
pub use storage::{KeyValueStore, MemoryStore, STORAGE_KEY};
pub use store::{SeedPolicy, StoreError, TaskStore};
pub use task::{Priority, Task, TaskDraft, TaskPatch};
pub use view::{ListView, NO_TASKS_NOTICE, TaskRow, build_view};
