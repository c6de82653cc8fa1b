//! Human- and machine-readable output of command results

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use std::io::{self, Write};
use todo_daemon_core::{Error, Result, ServerStatus, Task};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

/// Render one task as `#<id> [✓] <summary>`.
///
/// The check mark only appears once the completion time has been reached.
pub fn format_task(task: &Task, now: DateTime<Utc>) -> String {
    let mark = match task.completed_at {
        Some(completed_at) if completed_at <= now => '✓',
        _ => ' ',
    };
    format!("#{} [{}] {}", task.id, mark, task.summary)
}

pub fn write_tasks<W: Write>(out: &mut W, tasks: &[Task], now: DateTime<Utc>) -> io::Result<()> {
    for task in tasks {
        writeln!(out, "{}", format_task(task, now))?;
    }
    Ok(())
}

/// Print the task list to stdout
pub fn print_tasks(tasks: &[Task]) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_tasks(&mut out, tasks, Utc::now())
        .and_then(|()| out.flush())
        .map_err(|e| Error::file_system("<stdout>", "print tasks", e))
}

pub fn format_status(status: &ServerStatus, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(status)?),
        OutputFormat::Text => Ok(format!(
            "pid: {}\napi_base_url: {}",
            status.pid, status.api_base_url
        )),
    }
}
