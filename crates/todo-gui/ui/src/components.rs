mod sort_selector;
mod task_list;
mod task_list_row;
mod task_modal;

pub use sort_selector::SortSelector;
pub use task_list::TaskList;
pub use task_list_row::TaskListRow;
pub use task_modal::TaskModal;
