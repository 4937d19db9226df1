use todo_core::view::TaskRow;
use uuid::Uuid;
use yew::{
  Callback,
  Html,
  Properties,
  function_component,
  html,
  use_context
};

use crate::app::{
  TaskCommand,
  TaskDispatcher
};

#[derive(Properties, PartialEq)]
pub struct TaskListRowProps {
  pub row:     TaskRow,
  pub on_edit: Callback<Uuid>
}

#[function_component(TaskListRow)]
pub fn task_list_row(
  props: &TaskListRowProps
) -> Html {
  let dispatcher =
    use_context::<TaskDispatcher>();
  let task = &props.row.task;
  let id = task.id;
  let done = task.is_done;

  let class = if done {
    "row done"
  } else {
    "row"
  };

  let on_toggle = {
    let dispatcher = dispatcher.clone();
    Callback::from(
      move |_: web_sys::Event| {
        if let Some(dispatcher) =
          &dispatcher
        {
          dispatcher.dispatch(
            TaskCommand::SetDone(
              id, !done
            )
          );
        }
      }
    )
  };

  let on_remove =
    Callback::from(move |_: web_sys::MouseEvent| {
      if let Some(dispatcher) =
        &dispatcher
      {
        dispatcher.dispatch(
          TaskCommand::Remove(id)
        );
      }
    });

  let on_edit =
    props.on_edit.clone();

  html! {
      <div class={class}>
          <input type="checkbox" checked={done} onchange={on_toggle} />
          <div>
              <span class="task-name">{ &task.name }</span>
              {
                  if done {
                      html! { <span class="badge done">{ "Done" }</span> }
                  } else if props.row.overdue {
                      html! { <span class="badge overdue">{ "Overdue" }</span> }
                  } else {
                      html! {}
                  }
              }
              <div>
                  <span class="stars">{ &props.row.stars }</span>
                  {
                      match &props.row.deadline_label {
                          Some(label) => html! { <span class="badge">{ label }</span> },
                          None => html! {},
                      }
                  }
              </div>
          </div>
          <button onclick={move |_| on_edit.emit(id)}>{ "Edit" }</button>
          <button onclick={on_remove}>{ "Delete" }</button>
      </div>
  }
}
