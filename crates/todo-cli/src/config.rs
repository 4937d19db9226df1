use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use chrono_tz::Tz;
use serde::Deserialize;
use todo_core::{
  SeedPolicy,
  SortMode
};
use tracing::{
  debug,
  info,
  warn
};

const CONFIG_ENV_VAR: &str =
  "TODO_CONFIG";
const TIMEZONE_ENV_VAR: &str =
  "TODO_TIMEZONE";
const DEFAULT_DATA_LOCATION: &str =
  "~/.todo";

#[derive(
  Debug, Clone, Default, Deserialize,
)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
  pub data:         DataSection,
  pub display:      DisplaySection,
  pub time:         TimeSection,
  pub store:        StoreSection,
  #[serde(skip)]
  pub loaded_files: Vec<PathBuf>
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataSection {
  pub location: String
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplaySection {
  pub color: bool,
  pub sort:  String
}

#[derive(
  Debug, Clone, Default, Deserialize,
)]
#[serde(default, deny_unknown_fields)]
pub struct TimeSection {
  pub timezone: Option<String>
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreSection {
  pub seed: bool
}

impl Default for DataSection {
  fn default() -> Self {
    Self {
      location: DEFAULT_DATA_LOCATION
        .to_string()
    }
  }
}

impl Default for DisplaySection {
  fn default() -> Self {
    Self {
      color: true,
      sort:  SortMode::default()
        .as_key()
        .to_string()
    }
  }
}

impl Default for StoreSection {
  fn default() -> Self {
    Self { seed: true }
  }
}

impl Config {
  #[tracing::instrument(skip(
    config_override
  ))]
  pub fn load(
    config_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let Some(path) = resolve_config_path(
      config_override
    )?
    else {
      warn!(
        "no config file found; using \
         defaults"
      );
      return Ok(Self::default());
    };

    info!(config = %path.display(), "loading config");
    let text =
      fs::read_to_string(&path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;
    let mut cfg = Self::parse(&text)
      .with_context(|| {
        format!(
          "invalid config file {}",
          path.display()
        )
      })?;
    cfg.loaded_files.push(path);
    Ok(cfg)
  }

  pub fn parse(
    text: &str
  ) -> anyhow::Result<Self> {
    let cfg: Self = toml::from_str(text)
      .context("failed to parse TOML")?;
    cfg.validate()?;
    Ok(cfg)
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) -> anyhow::Result<()>
  where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (key, value) in overrides {
      debug!(key = %key, value = %value, "applying override");
      match key.as_str() {
        | "data.location" => {
          self.data.location = value;
        }
        | "display.color" => {
          self.display.color =
            parse_bool(&value)
              .ok_or_else(|| {
                anyhow!(
                  "invalid boolean for \
                   {key}: {value}"
                )
              })?;
        }
        | "display.sort" => {
          self.display.sort = value;
        }
        | "time.timezone" => {
          self.time.timezone =
            Some(value);
        }
        | "store.seed" => {
          self.store.seed =
            parse_bool(&value)
              .ok_or_else(|| {
                anyhow!(
                  "invalid boolean for \
                   {key}: {value}"
                )
              })?;
        }
        | other => {
          return Err(anyhow!(
            "unknown config key: {other}"
          ));
        }
      }
    }
    self.validate()
  }

  pub fn sort_mode(
    &self
  ) -> anyhow::Result<SortMode> {
    self
      .display
      .sort
      .parse()
      .context("invalid display.sort")
  }

  pub fn seed_policy(&self) -> SeedPolicy {
    if self.store.seed {
      SeedPolicy::Defaults
    } else {
      SeedPolicy::Empty
    }
  }

  /// `time.timezone`, else `$TODO_TIMEZONE`, else UTC.
  pub fn timezone(
    &self
  ) -> anyhow::Result<Tz> {
    let raw = self
      .time
      .timezone
      .clone()
      .or_else(|| {
        std::env::var(TIMEZONE_ENV_VAR)
          .ok()
      })
      .unwrap_or_else(|| {
        "UTC".to_string()
      });

    raw.trim().parse::<Tz>().map_err(
      |err| {
        anyhow!(
          "invalid timezone {raw:?}: \
           {err}"
        )
      }
    )
  }

  fn validate(
    &self
  ) -> anyhow::Result<()> {
    self.sort_mode()?;
    if let Some(tz) =
      self.time.timezone.as_deref()
    {
      tz.trim().parse::<Tz>().map_err(
        |err| {
          anyhow!(
            "invalid time.timezone \
             {tz:?}: {err}"
          )
        }
      )?;
    }
    Ok(())
  }
}

#[tracing::instrument(skip(
  cfg,
  override_dir
))]
pub fn resolve_data_dir(
  cfg: &Config,
  override_dir: Option<&Path>
) -> anyhow::Result<PathBuf> {
  let dir = if let Some(path) =
    override_dir
  {
    path.to_path_buf()
  } else {
    expand_tilde(Path::new(
      &cfg.data.location
    ))
  };

  if !dir.exists() {
    info!(dir = %dir.display(), "creating data directory");
    fs::create_dir_all(&dir)
      .with_context(|| {
        format!(
          "failed to create {}",
          dir.display()
        )
      })?;
  }

  Ok(dir)
}

#[tracing::instrument(skip(
  override_path
))]
fn resolve_config_path(
  override_path: Option<&Path>
) -> anyhow::Result<Option<PathBuf>> {
  if let Some(path) = override_path {
    return Ok(Some(expand_tilde(path)));
  }

  if let Ok(config_env) =
    std::env::var(CONFIG_ENV_VAR)
  {
    if config_env == "/dev/null" {
      return Ok(None);
    }
    return Ok(Some(expand_tilde(
      Path::new(&config_env)
    )));
  }

  if let Some(config_dir) =
    dirs::config_dir()
  {
    let candidate = config_dir
      .join("todo")
      .join("config.toml");
    if candidate.exists() {
      return Ok(Some(candidate));
    }
  }

  let home = dirs::home_dir()
    .ok_or_else(|| {
      anyhow!(
        "cannot determine home \
         directory"
      )
    })?;
  let candidate =
    home.join(".todo.toml");
  if candidate.exists() {
    return Ok(Some(candidate));
  }

  Ok(None)
}

fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}

fn parse_bool(s: &str) -> Option<bool> {
  match s
    .trim()
    .to_ascii_lowercase()
    .as_str()
  {
    | "1" | "y" | "yes" | "on"
    | "true" => Some(true),
    | "0" | "n" | "no" | "off"
    | "false" => Some(false),
    | _ => None
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_file_uses_defaults() {
    let cfg = Config::parse("")
      .expect("parse empty");
    assert_eq!(
      cfg.data.location,
      "~/.todo"
    );
    assert!(cfg.display.color);
    assert_eq!(
      cfg.sort_mode().expect("sort"),
      SortMode::Addition
    );
    assert_eq!(
      cfg.seed_policy(),
      SeedPolicy::Defaults
    );
  }

  #[test]
  fn reads_sections() {
    let cfg = Config::parse(
      r#"
[data]
location = "/tmp/todo-data"

[display]
color = false
sort = "deadline"

[time]
timezone = "Asia/Tokyo"

[store]
seed = false
"#
    )
    .expect("parse config");
    assert_eq!(
      cfg.data.location,
      "/tmp/todo-data"
    );
    assert!(!cfg.display.color);
    assert_eq!(
      cfg.sort_mode().expect("sort"),
      SortMode::DeadlineNearest
    );
    assert_eq!(
      cfg.timezone().expect("tz"),
      chrono_tz::Asia::Tokyo
    );
    assert_eq!(
      cfg.seed_policy(),
      SeedPolicy::Empty
    );
  }

  #[test]
  fn rejects_bad_values() {
    assert!(
      Config::parse(
        "[display]\nsort = \"random\"\n"
      )
      .is_err()
    );
    assert!(
      Config::parse(
        "[time]\ntimezone = \"Mars/Base\"\n"
      )
      .is_err()
    );
    assert!(
      Config::parse(
        "[display]\nfont = \"mono\"\n"
      )
      .is_err()
    );
  }

  #[test]
  fn overrides_replace_file_values() {
    let mut cfg = Config::default();
    cfg
      .apply_overrides(vec![
        (
          "display.sort".to_string(),
          "priority".to_string()
        ),
        (
          "display.color".to_string(),
          "off".to_string()
        ),
      ])
      .expect("apply overrides");
    assert_eq!(
      cfg.sort_mode().expect("sort"),
      SortMode::Priority
    );
    assert!(!cfg.display.color);

    assert!(
      cfg
        .apply_overrides(vec![(
          "display.sort".to_string(),
          "sideways".to_string()
        )])
        .is_err()
    );
    assert!(
      cfg
        .apply_overrides(vec![(
          "nope".to_string(),
          "1".to_string()
        )])
        .is_err()
    );
  }
}
