use std::io::{self, Write};

use anyhow::{Context, anyhow};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use todo_core::datetime::parse_deadline_input;
use todo_core::notify::{Notifier, Permission, push_remaining};
use todo_core::view::{is_overdue, remaining_count};
use todo_core::{KeyValueStore, SortMode, Task, TaskDraft, TaskPatch, TaskStore, build_view};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::cli::Command;
use crate::render::Renderer;

const MIN_ID_PREFIX: usize = 4;

/// Everything a command needs besides the store.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub now: DateTime<Utc>,
    pub tz: Tz,
    pub default_sort: SortMode,
}

/// Shows notifications as a line on stderr.
#[derive(Debug, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn permission(&self) -> Permission {
        Permission::Granted
    }

    fn request_permission(&self) {}

    fn show(&self, title: &str, body: &str) -> bool {
        let mut err = io::stderr().lock();
        writeln!(err, "[{title}] {body}").is_ok()
    }
}

#[instrument(skip(store, renderer, ctx))]
pub fn dispatch<S: KeyValueStore>(
    store: &mut TaskStore<S>,
    renderer: &mut Renderer,
    ctx: &CommandContext,
    command: Command,
) -> anyhow::Result<()> {
    match command {
        Command::List { sort } => {
            let mode = sort.unwrap_or(ctx.default_sort);
            let tasks = store.get_all();
            let view = build_view(tasks, mode, ctx.now, &ctx.tz);
            debug!(mode = %mode, empty = view.is_empty(), "rendering list");
            renderer.print_list(tasks, &view, remaining_count(tasks))
        }
        Command::Add {
            name,
            priority,
            deadline,
        } => {
            let draft = TaskDraft {
                name: name.join(" "),
                priority: priority.unwrap_or_default(),
                deadline: parse_deadline(deadline.as_deref(), ctx)?,
            };
            let id = store.add(draft)?;
            let position = store.get_all().len();
            info!(%id, position, "task added");
            renderer.print_message(&format!("Created task {position}."))
        }
        Command::Edit {
            task,
            name,
            priority,
            deadline,
            clear_deadline,
        } => {
            let id = resolve_ref(store.get_all(), &task)?;
            let deadline = if clear_deadline {
                Some(None)
            } else {
                match deadline.as_deref() {
                    Some(raw) => Some(parse_deadline(Some(raw), ctx)?),
                    None => None,
                }
            };
            let patch = TaskPatch {
                name,
                priority,
                deadline,
            };
            if patch.is_empty() {
                return Err(anyhow!(
                    "nothing to change; pass --name, --priority, --deadline or --clear-deadline"
                ));
            }
            store.update(id, patch)?;
            renderer.print_message(&format!("Modified task {task}."))
        }
        Command::Done { task } => {
            let id = resolve_ref(store.get_all(), &task)?;
            store.set_done(id, true)?;
            renderer.print_message(&format!("Completed task {task}."))
        }
        Command::Undo { task } => {
            let id = resolve_ref(store.get_all(), &task)?;
            store.set_done(id, false)?;
            renderer.print_message(&format!("Reopened task {task}."))
        }
        Command::Remove { task } => {
            let id = resolve_ref(store.get_all(), &task)?;
            store.remove(id)?;
            renderer.print_message(&format!("Deleted task {task}."))
        }
        Command::Clear => {
            let removed = store.remove_completed()?;
            renderer.print_message(&format!("Deleted {removed} completed task(s)."))
        }
        Command::Count => renderer.print_remaining(remaining_count(store.get_all())),
        Command::Push => {
            let shown = push_remaining(&TerminalNotifier, store.get_all());
            debug!(shown, "push finished");
            Ok(())
        }
        Command::Info { task } => {
            let id = resolve_ref(store.get_all(), &task)?;
            let task = store
                .get(id)
                .ok_or_else(|| anyhow!("task disappeared: {id}"))?;
            renderer.print_task_info(task, is_overdue(task, ctx.now), &ctx.tz)
        }
    }
}

fn parse_deadline(raw: Option<&str>, ctx: &CommandContext) -> anyhow::Result<Option<DateTime<Utc>>> {
    match raw {
        Some(raw) => parse_deadline_input(raw, ctx.now, &ctx.tz)
            .with_context(|| format!("invalid deadline {raw:?}")),
        None => Ok(None),
    }
}

/// Resolves a 1-based position in addition order, or a unique id prefix.
pub fn resolve_ref(tasks: &[Task], token: &str) -> anyhow::Result<Uuid> {
    let token = token.trim();

    if let Ok(position) = token.parse::<usize>() {
        let by_position = position
            .checked_sub(1)
            .and_then(|idx| tasks.get(idx))
            .map(|task| task.id);
        match by_position {
            Some(id) => return Ok(id),
            // all-digit tokens may still be id prefixes
            None if token.len() >= MIN_ID_PREFIX => {}
            None => return Err(anyhow!("no task at position {position}")),
        }
    }

    let needle = token.to_ascii_lowercase().replace('-', "");
    if needle.len() < MIN_ID_PREFIX || !needle.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(anyhow!(
            "expected a task number or an id prefix of at least {MIN_ID_PREFIX} hex digits, got: {token}"
        ));
    }

    let mut matches = tasks
        .iter()
        .filter(|task| task.id.simple().to_string().starts_with(&needle));
    let first = matches
        .next()
        .ok_or_else(|| anyhow!("no task matches id prefix {token}"))?;
    if matches.next().is_some() {
        return Err(anyhow!("id prefix {token} is ambiguous"));
    }
    Ok(first.id)
}
