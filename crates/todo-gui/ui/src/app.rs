mod notify;
mod storage;

use std::rc::Rc;

use chrono::{
  Local,
  Utc
};
use gloo::console::log;
use gloo::timers::callback::Interval;
use todo_core::datetime::format_input_value;
use todo_core::notify::{
  Permission,
  push_remaining,
  request_on_startup
};
use todo_core::view::{
  remaining_count,
  remaining_message
};
use todo_core::{
  Priority,
  SeedPolicy,
  SortMode,
  TaskDraft,
  TaskPatch,
  TaskStore,
  build_view
};
use uuid::Uuid;
use yew::{
  Callback,
  ContextProvider,
  Html,
  Reducible,
  UseReducerDispatcher,
  function_component,
  html,
  use_effect_with,
  use_force_update,
  use_reducer,
  use_state
};

use self::notify::{
  BrowserNotifier,
  browser_permission
};
use self::storage::{
  LocalStorage,
  load_sort_mode,
  save_sort_mode
};
use crate::components::{
  SortSelector,
  TaskList,
  TaskModal
};

const OVERDUE_REFRESH_MS: u32 = 30_000;

/// Every mutation the view layer may
/// ask of the task store.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskCommand {
  Add(TaskDraft),
  Update(Uuid, TaskPatch),
  SetDone(Uuid, bool),
  Remove(Uuid),
  RemoveCompleted
}

pub type TaskDispatcher =
  UseReducerDispatcher<StoreState>;

pub struct StoreState {
  store:      TaskStore<LocalStorage>,
  last_error: Option<String>
}

impl StoreState {
  fn restore() -> Self {
    Self {
      store:      TaskStore::open(
        LocalStorage,
        SeedPolicy::Defaults,
        Utc::now()
      ),
      last_error: None
    }
  }
}

impl Reducible for StoreState {
  type Action = TaskCommand;

  fn reduce(
    self: Rc<Self>,
    action: Self::Action
  ) -> Rc<Self> {
    let mut store = self.store.clone();

    let result = match action {
      | TaskCommand::Add(draft) => {
        store.add(draft).map(|_| ())
      }
      | TaskCommand::Update(
        id,
        patch
      ) => store.update(id, patch),
      | TaskCommand::SetDone(
        id,
        value
      ) => store.set_done(id, value),
      | TaskCommand::Remove(id) => {
        store.remove(id)
      }
      | TaskCommand::RemoveCompleted => {
        store
          .remove_completed()
          .map(|_| ())
      }
    };

    let last_error = match result {
      | Ok(()) => None,
      | Err(err) => {
        tracing::warn!(
          error = %err,
          "task command failed"
        );
        Some(err.to_string())
      }
    };

    Rc::new(Self {
      store,
      last_error
    })
  }
}

#[derive(Clone, PartialEq)]
struct ModalState {
  mode:     ModalMode,
  name:     String,
  priority: Priority,
  deadline: String
}

#[derive(Clone, PartialEq)]
enum ModalMode {
  Add,
  Edit(Uuid)
}

impl ModalState {
  fn add() -> Self {
    Self {
      mode:     ModalMode::Add,
      name:     String::new(),
      priority: Priority::default(),
      deadline: String::new()
    }
  }
}

fn ui_debug(message: &str) {
  log!(format!("[todo-ui] {message}"));
}

#[function_component(App)]
pub fn app() -> Html {
  let state =
    use_reducer(StoreState::restore);
  let sort_mode =
    use_state(load_sort_mode);
  let modal =
    use_state(|| None::<ModalState>);
  let permission =
    use_state(browser_permission);
  let refresh = use_force_update();

  {
    let permission = permission.clone();
    use_effect_with((), move |_| {
      let notifier =
        BrowserNotifier::with_listener(
          Callback::from(
            move |updated: Permission| {
              permission.set(updated);
            }
          )
        );
      request_on_startup(&notifier);
      || ()
    });
  }

  {
    let refresh = refresh.clone();
    use_effect_with((), move |_| {
      let interval = Interval::new(
        OVERDUE_REFRESH_MS,
        move || refresh.force_update()
      );
      move || drop(interval)
    });
  }

  use_effect_with(
    *sort_mode,
    move |mode| {
      save_sort_mode(*mode);
      tracing::debug!(
        mode = %mode,
        "persisted sort mode"
      );
      || ()
    }
  );

  let tasks = state.store.get_all();
  let view = build_view(
    tasks,
    *sort_mode,
    Utc::now(),
    &Local
  );
  let remaining =
    remaining_count(tasks);

  let on_sort = {
    let sort_mode = sort_mode.clone();
    Callback::from(
      move |mode: SortMode| {
        ui_debug(&format!(
          "sort mode -> {mode}"
        ));
        sort_mode.set(mode);
      }
    )
  };

  let on_open_add = {
    let modal = modal.clone();
    Callback::from(
      move |_: web_sys::MouseEvent| {
        modal.set(Some(
          ModalState::add()
        ));
      }
    )
  };

  let on_edit = {
    let modal = modal.clone();
    let snapshot =
      state.store.snapshot();
    Callback::from(move |id: Uuid| {
      let Some(task) = snapshot
        .iter()
        .find(|task| task.id == id)
      else {
        tracing::warn!(
          %id,
          "edit requested for unknown task"
        );
        return;
      };
      modal.set(Some(ModalState {
        mode:     ModalMode::Edit(id),
        name:     task.name.clone(),
        priority: task.priority,
        deadline: task
          .deadline
          .map(|deadline| {
            format_input_value(
              deadline, &Local
            )
          })
          .unwrap_or_default()
      }));
    })
  };

  let on_submit = {
    let modal = modal.clone();
    let dispatcher = state.dispatcher();
    Callback::from(
      move |draft: TaskDraft| {
        let Some(current) = &*modal
        else {
          return;
        };
        let command = match current.mode
        {
          | ModalMode::Add => {
            TaskCommand::Add(draft)
          }
          | ModalMode::Edit(id) => {
            TaskCommand::Update(
              id,
              TaskPatch::from_draft(
                draft
              )
            )
          }
        };
        dispatcher.dispatch(command);
        modal.set(None);
      }
    )
  };

  let on_close = {
    let modal = modal.clone();
    Callback::from(move |()| {
      modal.set(None)
    })
  };

  let on_clear_completed = {
    let dispatcher = state.dispatcher();
    Callback::from(
      move |_: web_sys::MouseEvent| {
        dispatcher.dispatch(
          TaskCommand::RemoveCompleted
        );
      }
    )
  };

  let on_push = {
    let snapshot =
      state.store.snapshot();
    Callback::from(
      move |_: web_sys::MouseEvent| {
        let shown = push_remaining(
          &BrowserNotifier::default(),
          &snapshot
        );
        tracing::debug!(
          shown,
          "push finished"
        );
      }
    )
  };

  let on_request_permission = {
    let permission = permission.clone();
    Callback::from(
      move |_: web_sys::MouseEvent| {
        let permission =
          permission.clone();
        let notifier =
          BrowserNotifier::with_listener(
            Callback::from(
              move |updated| {
                permission.set(updated)
              }
            )
          );
        request_on_startup(&notifier);
      }
    )
  };

  html! {
      <ContextProvider<TaskDispatcher> context={state.dispatcher()}>
          <div class="panel">
              <div class="header">
                  <span>{ remaining_message(remaining) }</span>
                  <button class="primary" onclick={on_open_add}>{ "New task" }</button>
              </div>
              <SortSelector mode={*sort_mode} on_change={on_sort} />
              <TaskList view={view} on_edit={on_edit} />
              <div class="toolbar">
                  <button onclick={on_clear_completed}>{ "Remove completed" }</button>
                  <button onclick={on_push}>{ "Push" }</button>
                  {
                      if *permission == Permission::Default {
                          html! {
                              <button onclick={on_request_permission}>
                                  { "Enable notifications" }
                              </button>
                          }
                      } else {
                          html! { <span class="badge">{ permission.as_label() }</span> }
                      }
                  }
              </div>
              {
                  match &state.last_error {
                      Some(message) => html! { <p class="notice">{ message }</p> },
                      None => html! {},
                  }
              }
          </div>
          {
              match &*modal {
                  Some(current) => html! {
                      <TaskModal
                          key={match current.mode {
                              ModalMode::Add => "add".to_string(),
                              ModalMode::Edit(id) => id.to_string(),
                          }}
                          editing={matches!(current.mode, ModalMode::Edit(_))}
                          name={current.name.clone()}
                          priority={current.priority}
                          deadline={current.deadline.clone()}
                          on_submit={on_submit}
                          on_close={on_close}
                      />
                  },
                  None => html! {},
              }
          }
      </ContextProvider<TaskDispatcher>>
  }
}
