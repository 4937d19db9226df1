use js_sys::Reflect;
use todo_core::notify::{
  Notifier,
  Permission
};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
  Notification,
  NotificationOptions,
  NotificationPermission
};
use yew::Callback;

/// Web `Notification` API. When set,
/// `on_change` receives the permission
/// once a prompt resolves.
#[derive(Clone, Default)]
pub struct BrowserNotifier {
  pub on_change:
    Option<Callback<Permission>>
}

impl BrowserNotifier {
  pub fn with_listener(
    on_change: Callback<Permission>
  ) -> Self {
    Self {
      on_change: Some(on_change)
    }
  }

  fn report(&self) {
    if let Some(on_change) =
      &self.on_change
    {
      on_change.emit(
        browser_permission()
      );
    }
  }
}

fn from_web(
  raw: NotificationPermission
) -> Permission {
  match raw {
    | NotificationPermission::Default => {
      Permission::Default
    }
    | NotificationPermission::Granted => {
      Permission::Granted
    }
    | NotificationPermission::Denied => {
      Permission::Denied
    }
    | _ => Permission::Unsupported
  }
}

pub(crate) fn browser_permission()
-> Permission {
  let supported = web_sys::window()
    .and_then(|window| {
      Reflect::has(
        window.as_ref(),
        &JsValue::from_str(
          "Notification"
        )
      )
      .ok()
    })
    .unwrap_or(false);

  if supported {
    from_web(Notification::permission())
  } else {
    Permission::Unsupported
  }
}

impl Notifier for BrowserNotifier {
  fn permission(&self) -> Permission {
    browser_permission()
  }

  fn request_permission(&self) {
    let prompt = match browser_permission()
    {
      | Permission::Unsupported => None,
      | _ => Notification::request_permission()
        .inspect_err(|err| {
          tracing::error!(
            error = ?err,
            "permission prompt refused"
          );
        })
        .ok()
    };

    let notifier = self.clone();
    wasm_bindgen_futures::spawn_local(
      async move {
        if let Some(promise) = prompt {
          if let Err(err) =
            JsFuture::from(promise).await
          {
            tracing::warn!(
              error = ?err,
              "permission prompt failed"
            );
          }
        }
        notifier.report();
      }
    );
  }

  fn show(
    &self,
    title: &str,
    body: &str
  ) -> bool {
    let options =
      NotificationOptions::new();
    options.set_body(body);

    Notification::new_with_options(
      title, &options
    )
    .inspect_err(|err| {
      tracing::error!(
        error = ?err,
        title,
        "notification not shown"
      );
    })
    .is_ok()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn maps_web_permission_states() {
    assert_eq!(
      from_web(
        NotificationPermission::Default
      ),
      Permission::Default
    );
    assert_eq!(
      from_web(
        NotificationPermission::Granted
      ),
      Permission::Granted
    );
    assert_eq!(
      from_web(
        NotificationPermission::Denied
      ),
      Permission::Denied
    );
  }
}
