use todo_core::SortMode;
use yew::{
  Callback,
  Html,
  Properties,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct SortSelectorProps {
  pub mode:      SortMode,
  pub on_change: Callback<SortMode>
}

#[function_component(SortSelector)]
pub fn sort_selector(
  props: &SortSelectorProps
) -> Html {
  html! {
      <div class="sort-modes">
          {
              for SortMode::ALL.into_iter().map(|mode| {
                  let on_change = props.on_change.clone();
                  html! {
                      <label>
                          <input
                              type="radio"
                              name="sort-mode"
                              value={mode.as_key()}
                              checked={props.mode == mode}
                              onchange={move |_| on_change.emit(mode)}
                          />
                          { mode.label() }
                      </label>
                  }
              })
          }
      </div>
  }
}
