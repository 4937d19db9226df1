use chrono::{
  Local,
  Utc
};
use todo_core::datetime::parse_deadline_input;
use todo_core::validate::name_error_message;
use todo_core::view::star_glyphs;
use todo_core::{
  Priority,
  TaskDraft
};
use yew::{
  Callback,
  Html,
  Properties,
  TargetCast,
  function_component,
  html,
  use_state
};

#[derive(Properties, PartialEq)]
pub struct TaskModalProps {
  pub editing:   bool,
  pub name:      String,
  pub priority:  Priority,
  /// `datetime-local` value, empty for
  /// no deadline.
  pub deadline:  String,
  pub on_submit: Callback<TaskDraft>,
  pub on_close:  Callback<()>
}

#[function_component(TaskModal)]
pub fn task_modal(
  props: &TaskModalProps
) -> Html {
  let name = {
    let initial = props.name.clone();
    use_state(move || initial)
  };
  let priority = {
    let initial = props.priority;
    use_state(move || initial)
  };
  let deadline = {
    let initial = props.deadline.clone();
    use_state(move || initial)
  };
  let deadline_error =
    use_state(|| None::<String>);

  let name_error =
    name_error_message(&name);

  let on_name_input = {
    let name = name.clone();
    Callback::from(
      move |e: web_sys::InputEvent| {
        if let Some(input) = e
          .target_dyn_into::<
            web_sys::HtmlInputElement
          >()
        {
          name.set(input.value());
        }
      }
    )
  };

  let on_deadline_input = {
    let deadline = deadline.clone();
    let deadline_error =
      deadline_error.clone();
    Callback::from(
      move |e: web_sys::InputEvent| {
        if let Some(input) = e
          .target_dyn_into::<
            web_sys::HtmlInputElement
          >()
        {
          deadline.set(input.value());
          deadline_error.set(None);
        }
      }
    )
  };

  let on_submit = {
    let name = name.clone();
    let priority = priority.clone();
    let deadline = deadline.clone();
    let deadline_error =
      deadline_error.clone();
    let on_submit =
      props.on_submit.clone();
    Callback::from(move |_: web_sys::MouseEvent| {
      if name_error_message(&name)
        .is_some()
      {
        return;
      }

      match parse_deadline_input(
        &deadline,
        Utc::now(),
        &Local
      ) {
        | Ok(parsed) => {
          on_submit.emit(TaskDraft {
            name:     (*name).clone(),
            priority: *priority,
            deadline: parsed
          });
        }
        | Err(err) => {
          tracing::warn!(
            error = %err,
            "rejected deadline input"
          );
          deadline_error
            .set(Some(format!("{err:#}")));
        }
      }
    })
  };

  let on_close = {
    let on_close =
      props.on_close.clone();
    Callback::from(move |_: web_sys::MouseEvent| {
      on_close.emit(())
    })
  };

  let submit_class =
    if name_error.is_some() {
      "primary disabled"
    } else {
      "primary"
    };
  let submit_label = if props.editing {
    "Save"
  } else {
    "Add"
  };

  html! {
      <div class="modal-backdrop">
          <div class="modal">
              <div class="header">
                  { if props.editing { "Edit task" } else { "New task" } }
              </div>
              <label>
                  { "Name" }
                  <input type="text" value={(*name).clone()} oninput={on_name_input} />
              </label>
              {
                  match &name_error {
                      Some(message) => html! { <div class="field-error">{ message }</div> },
                      None => html! {},
                  }
              }
              <div>
                  {
                      for Priority::ALL.into_iter().map(|level| {
                          let priority = priority.clone();
                          html! {
                              <label>
                                  <input
                                      type="radio"
                                      name="priority"
                                      checked={*priority == level}
                                      onchange={move |_| priority.set(level)}
                                  />
                                  <span class="stars">{ star_glyphs(level) }</span>
                              </label>
                          }
                      })
                  }
              </div>
              <label>
                  { "Deadline" }
                  <input
                      type="datetime-local"
                      value={(*deadline).clone()}
                      oninput={on_deadline_input}
                  />
              </label>
              {
                  match &*deadline_error {
                      Some(message) => html! { <div class="field-error">{ message }</div> },
                      None => html! {},
                  }
              }
              <div class="toolbar">
                  <button class={submit_class} onclick={on_submit}>{ submit_label }</button>
                  <button onclick={on_close}>{ "Cancel" }</button>
              </div>
          </div>
      </div>
  }
}
