use todo_core::{
  ListView,
  NO_TASKS_NOTICE
};
use uuid::Uuid;
use yew::{
  Callback,
  Html,
  Properties,
  function_component,
  html
};

use super::TaskListRow;

#[derive(Properties, PartialEq)]
pub struct TaskListProps {
  pub view:    ListView,
  pub on_edit: Callback<Uuid>
}

#[function_component(TaskList)]
pub fn task_list(
  props: &TaskListProps
) -> Html {
  match &props.view {
    | ListView::Empty => html! {
        <p class="notice">{ NO_TASKS_NOTICE }</p>
    },
    | ListView::Rows(rows) => html! {
        <div class="list">
            {
                for rows.iter().cloned().map(|row| html! {
                    <TaskListRow
                        key={row.task.id.to_string()}
                        row={row.clone()}
                        on_edit={props.on_edit.clone()}
                    />
                })
            }
        </div>
    }
  }
}
