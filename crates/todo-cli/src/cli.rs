use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Parser, Subcommand};
use todo_core::{Priority, SortMode};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct KeyVal {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for KeyVal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        Ok(Self {
            key: k.trim().to_string(),
            value: v.trim().to_string(),
        })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "todo",
    version,
    about = "Task list with priority and deadline ordering",
    disable_help_subcommand = true
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Override a config key, e.g. `--set display.sort=priority`.
    #[arg(
        long = "set",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append
    )]
    pub overrides: Vec<KeyVal>,

    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    #[arg(long = "data")]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show the task list.
    List {
        /// addition, priority or deadline
        #[arg(short = 's', long = "sort", value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<SortMode>()))]
        sort: Option<SortMode>,
    },
    /// Add a task.
    Add {
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,

        /// 1 (three stars) to 3 (one star)
        #[arg(short = 'p', long = "priority", value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<Priority>()))]
        priority: Option<Priority>,

        /// e.g. 2026-03-01T09:00, tomorrow, +2d
        #[arg(short = 'd', long = "deadline")]
        deadline: Option<String>,
    },
    /// Change a task's name, priority or deadline.
    Edit {
        task: String,

        #[arg(long = "name")]
        name: Option<String>,

        #[arg(short = 'p', long = "priority", value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<Priority>()))]
        priority: Option<Priority>,

        #[arg(short = 'd', long = "deadline", conflicts_with = "clear_deadline")]
        deadline: Option<String>,

        #[arg(long = "clear-deadline")]
        clear_deadline: bool,
    },
    /// Mark a task as done.
    Done { task: String },
    /// Mark a task as not done.
    Undo { task: String },
    /// Delete a task.
    Remove { task: String },
    /// Delete every completed task.
    Clear,
    /// Print the number of unfinished tasks.
    Count,
    /// Send a notification with the number of unfinished tasks.
    Push,
    /// Show one task.
    Info { task: String },
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}
