use anyhow::anyhow;
use todo_core::{
  KeyValueStore,
  SortMode,
  STORAGE_KEY
};

/// `window.localStorage` as a task
/// store backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

fn browser_storage()
-> anyhow::Result<web_sys::Storage> {
  web_sys::window()
    .ok_or_else(|| anyhow!("no window"))?
    .local_storage()
    .map_err(|err| {
      anyhow!(
        "localStorage access denied: \
         {err:?}"
      )
    })?
    .ok_or_else(|| {
      anyhow!("localStorage unavailable")
    })
}

impl KeyValueStore for LocalStorage {
  fn get(
    &self,
    key: &str
  ) -> anyhow::Result<Option<String>> {
    browser_storage()?
      .get_item(key)
      .map_err(|err| {
        anyhow!(
          "failed reading {key}: {err:?}"
        )
      })
  }

  fn set(
    &mut self,
    key: &str,
    value: &str
  ) -> anyhow::Result<()> {
    browser_storage()?
      .set_item(key, value)
      .map_err(|err| {
        anyhow!(
          "failed writing {key}: {err:?}"
        )
      })
  }
}

fn sort_storage_key() -> String {
  format!("{STORAGE_KEY}.sort")
}

pub(crate) fn load_sort_mode() -> SortMode {
  let stored = LocalStorage
    .get(&sort_storage_key())
    .unwrap_or_else(|err| {
      tracing::warn!(
        error = %err,
        "could not read sort mode"
      );
      None
    });

  stored
    .as_deref()
    .and_then(|raw| raw.parse().ok())
    .unwrap_or_default()
}

pub(crate) fn save_sort_mode(
  mode: SortMode
) {
  if let Err(err) = LocalStorage.set(
    &sort_storage_key(),
    mode.as_key()
  ) {
    tracing::warn!(
      error = %err,
      "could not save sort mode"
    );
  }
}
