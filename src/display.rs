// Terminal rendering of the task list

use crate::models::{Task, TaskStatus};
use colored::{ColoredString, Colorize};

const NO_DUE_DATE: &str = "-";

/// Render tasks as an aligned table with ID, Description, Due and Status columns
pub fn format_task_table(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "No tasks.\n".dimmed().to_string();
    }

    let id_width = tasks.iter().map(|t| t.id.to_string().len()).max().unwrap_or(0).max(2);
    let desc_width = tasks
        .iter()
        .map(|t| t.description.chars().count())
        .max()
        .unwrap_or(0)
        .max("Description".len());
    let due_width = "YYYY-MM-DD".len();

    let header = format!(
        "{:<id_width$}  {:<desc_width$}  {:<due_width$}  {}",
        "ID", "Description", "Due", "Status"
    );

    let mut out = format!("{}\n", header.bold());
    for task in tasks {
        let due = task.due_date.as_deref().unwrap_or(NO_DUE_DATE);
        out.push_str(&format!(
            "{:<id_width$}  {:<desc_width$}  {:<due_width$}  {}\n",
            task.id,
            task.description,
            due,
            status_label(task.status)
        ));
    }

    out
}

fn status_label(status: TaskStatus) -> ColoredString {
    match status {
        TaskStatus::Todo => status.as_str().yellow(),
        TaskStatus::InProgress => status.as_str().cyan(),
        TaskStatus::Done => status.as_str().green(),
    }
}
