pub mod cli;
pub mod commands;
pub mod config;
pub mod datastore;
pub mod render;

use std::ffi::OsString;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use todo_core::TaskStore;
use tracing::{
  debug,
  info
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let cli =
    cli::GlobalCli::parse_from(raw_args);

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting todo CLI"
  );
  debug!(overrides = cli.overrides.len(), "parsed config overrides");

  let mut cfg = config::Config::load(
    cli.config.as_deref()
  )?;
  cfg.apply_overrides(
    cli
      .overrides
      .into_iter()
      .map(|kv| (kv.key, kv.value))
  )?;

  let data_dir =
    config::resolve_data_dir(
      &cfg,
      cli.data.as_deref()
    )
    .context(
      "failed to resolve data \
       directory"
    )?;

  let backend =
    datastore::FileStore::open(
      &data_dir
    )
    .with_context(|| {
      format!(
        "failed to open datastore at \
         {}",
        data_dir.display()
      )
    })?;

  let now = Utc::now();
  let mut store = TaskStore::open(
    backend,
    cfg.seed_policy(),
    now
  );

  let ctx = commands::CommandContext {
    now,
    tz: cfg.timezone()?,
    default_sort: cfg.sort_mode()?
  };
  let mut renderer =
    render::Renderer::new(&cfg);
  let command = cli.command.unwrap_or(
    cli::Command::List { sort: None }
  );

  commands::dispatch(
    &mut store,
    &mut renderer,
    &ctx,
    command
  )?;

  info!("done");
  Ok(())
}
