use std::collections::HashMap;
use std::io::{self, IsTerminal, Write};

use chrono_tz::Tz;
use todo_core::datetime::format_deadline;
use todo_core::view::{ListView, TaskRow, star_glyphs};
use todo_core::{NO_TASKS_NOTICE, Task};
use unicode_width::UnicodeWidthStr;
use uuid::Uuid;

use crate::config::Config;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> Self {
        Self {
            color: cfg.display.color && io::stdout().is_terminal(),
        }
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    /// Prints `view` with each row numbered by its position in `tasks`
    /// (addition order), which is what task references resolve against.
    #[tracing::instrument(skip_all)]
    pub fn print_list(
        &mut self,
        tasks: &[Task],
        view: &ListView,
        remaining: usize,
    ) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        self.write_list(&mut out, tasks, view, remaining)
    }

    pub fn write_list<W: Write>(
        &self,
        mut out: W,
        tasks: &[Task],
        view: &ListView,
        remaining: usize,
    ) -> anyhow::Result<()> {
        let rows = match view {
            ListView::Empty => {
                writeln!(out, "{}", self.paint(NO_TASKS_NOTICE, "31"))?;
                return Ok(());
            }
            ListView::Rows(rows) => rows,
        };

        let positions: HashMap<Uuid, usize> = tasks
            .iter()
            .enumerate()
            .map(|(idx, task)| (task.id, idx + 1))
            .collect();

        let headers = vec![
            "#".to_string(),
            "Status".to_string(),
            "Priority".to_string(),
            "Name".to_string(),
            "Deadline".to_string(),
        ];

        let body = rows
            .iter()
            .map(|row| self.table_row(row, &positions))
            .collect();

        write_table(&mut out, headers, body)?;
        writeln!(out)?;
        writeln!(out, "{remaining} remaining")?;
        Ok(())
    }

    fn table_row(&self, row: &TaskRow, positions: &HashMap<Uuid, usize>) -> Vec<String> {
        let position = positions
            .get(&row.task.id)
            .map(|value| value.to_string())
            .unwrap_or_else(|| "-".to_string());

        let status = if row.task.is_done {
            self.paint("done", "32")
        } else if row.overdue {
            self.paint("overdue", "31")
        } else {
            "open".to_string()
        };

        let deadline = row.deadline_label.clone().unwrap_or_default();
        let deadline = if row.overdue {
            self.paint(&deadline, "31")
        } else {
            deadline
        };

        vec![
            self.paint(&position, "33"),
            status,
            row.stars.clone(),
            row.task.name.clone(),
            deadline,
        ]
    }

    #[tracing::instrument(skip(self, task, tz))]
    pub fn print_task_info(&mut self, task: &Task, overdue: bool, tz: &Tz) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        writeln!(out, "id        {}", task.id)?;
        writeln!(out, "name      {}", task.name)?;
        writeln!(out, "done      {}", if task.is_done { "yes" } else { "no" })?;
        writeln!(
            out,
            "priority  {} {}",
            task.priority.as_number(),
            star_glyphs(task.priority)
        )?;
        match task.deadline {
            Some(deadline) => {
                let label = format_deadline(deadline, tz);
                if overdue {
                    writeln!(out, "deadline  {} {}", label, self.paint("(overdue)", "31"))?;
                } else {
                    writeln!(out, "deadline  {label}")?;
                }
            }
            None => writeln!(out, "deadline  -")?,
        }

        Ok(())
    }

    pub fn print_remaining(&mut self, remaining: usize) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{remaining}")?;
        Ok(())
    }

    pub fn print_message(&mut self, message: &str) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{message}")?;
        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for idx in 0..column_count {
        write!(writer, "{:width$} ", headers[idx], width = widths[idx])?;
    }
    writeln!(writer)?;

    for width in &widths {
        write!(writer, "{:-<width$} ", "", width = *width)?;
    }
    writeln!(writer)?;

    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use todo_core::{Priority, SortMode, build_view};

    use super::*;

    fn task(name: &str, priority: Priority, done: bool) -> Task {
        Task {
            id: Uuid::new_v4(),
            name: name.to_string(),
            is_done: done,
            priority,
            deadline: None,
        }
    }

    fn render(tasks: &[Task], mode: SortMode) -> String {
        let view = build_view(tasks, mode, Utc::now(), &Utc);
        let mut buf = Vec::new();
        Renderer::plain()
            .write_list(&mut buf, tasks, &view, todo_core::view::remaining_count(tasks))
            .expect("render");
        String::from_utf8(buf).expect("utf8")
    }

    #[test]
    fn empty_list_prints_notice_only() {
        let out = render(&[], SortMode::Addition);
        assert_eq!(out.trim(), NO_TASKS_NOTICE);
    }

    #[test]
    fn rows_keep_addition_numbers_when_sorted() {
        let mut late = task("Late report", Priority::Low, false);
        late.deadline = Some(Utc::now() - Duration::days(1));
        let tasks = vec![late, task("Urgent call", Priority::High, false)];

        let out = render(&tasks, SortMode::Priority);
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("# "));
        assert!(lines[2].starts_with("2 "), "{out}");
        assert!(lines[2].contains("★★★"));
        assert!(lines[3].starts_with("1 "), "{out}");
        assert!(lines[3].contains("overdue"));
        assert!(out.trim_end().ends_with("2 remaining"));
    }

    #[test]
    fn strips_ansi_sequences() {
        assert_eq!(strip_ansi("\x1b[31mred\x1b[0m"), "red");
    }
}
