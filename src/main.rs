use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::Result;
use std::path::PathBuf;
use std::process;
use tasktrack::{Config, Store, TaskStatus, display};
use tracing::Level;

#[derive(Parser)]
#[command(name = "tasktrack")]
#[command(about = "tasktrack - Personal task tracker backed by a local SQLite file")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Path to the task database (default: from config, then the user data directory)
    #[arg(short, long, global = true)]
    db: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// What needs doing
        description: String,

        /// Due date as YYYY-MM-DD
        #[arg(long, default_value = "")]
        due: String,
    },

    /// List all tasks, earliest due date first
    List {
        /// Print tasks as JSON
        #[arg(long)]
        json: bool,
    },

    /// Mark a task as done
    Done { id: i64 },

    /// Set a task's status (to-do, in-progress, done)
    Status { id: i64, status: String },

    /// Delete a task
    Delete { id: i64 },
}

/// Rendered result of one command
#[derive(Debug, PartialEq, Eq)]
struct Outcome {
    stdout: String,
    stderr: String,
    exit_code: i32,
}

impl Outcome {
    fn success(stdout: String) -> Self {
        Self {
            stdout,
            stderr: String::new(),
            exit_code: 0,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing
    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load()?;
    let db_path = config.resolve_db_path(cli.db.as_deref())?;

    // Open store
    let mut store = Store::open(&db_path)?;
    let outcome = run(cli.command, &mut store)?;
    store.close()?;

    print!("{}", outcome.stdout);
    eprint!("{}", outcome.stderr);
    if outcome.exit_code != 0 {
        process::exit(outcome.exit_code);
    }

    Ok(())
}

/// Execute one command against the store
///
/// Mutations are followed by the refreshed task table. Validation failures
/// become a message on stderr and exit code 1; other store errors propagate.
fn run(command: Commands, store: &mut Store) -> Result<Outcome> {
    let mutated = match command {
        Commands::Add { description, due } => add_task(store, &description, &due),
        Commands::List { json } => {
            let tasks = store.list()?;
            let stdout = if json {
                format!("{}\n", serde_json::to_string_pretty(&tasks)?)
            } else {
                display::format_task_table(&tasks)
            };
            return Ok(Outcome::success(stdout));
        }
        Commands::Done { id } => set_status(store, id, TaskStatus::Done.as_str()),
        Commands::Status { id, status } => set_status(store, id, &status),
        Commands::Delete { id } => store
            .delete(id)
            .map(|()| format!("{} task {}\n", "Deleted".red(), id)),
    };

    match mutated {
        Ok(message) => {
            let table = display::format_task_table(&store.list()?);
            Ok(Outcome::success(format!("{}{}", message, table)))
        }
        Err(e) if e.is_validation() => Ok(Outcome {
            stdout: String::new(),
            stderr: format!("{} {}\n", "Error:".red().bold(), e),
            exit_code: 1,
        }),
        Err(e) => Err(e.into()),
    }
}

fn add_task(store: &mut Store, description: &str, due: &str) -> tasktrack::Result<String> {
    let id = store.add(description, due)?;
    let total = store.count()?;
    Ok(format!("{} task {} ({} total)\n", "Added".green(), id, total))
}

fn set_status(store: &mut Store, id: i64, status: &str) -> tasktrack::Result<String> {
    store.update_status(id, status)?;

    let message = match store.get(id)? {
        Some(task) => format!("{} task {}: {}\n", "Updated".green(), task.id, task.status),
        None => format!("No task with id {}\n", id),
    };
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasktrack::{StoreError, Task};

    fn plain_store() -> Store {
        colored::control::set_override(false);
        Store::open_in_memory().unwrap()
    }

    fn add(description: &str, due: &str) -> Commands {
        Commands::Add {
            description: description.to_string(),
            due: due.to_string(),
        }
    }

    #[test]
    fn test_add_prints_refreshed_table() {
        let mut store = plain_store();
        store.add("Existing", "2025-09-01").unwrap();

        let outcome = run(add("Buy milk", "2025-05-01"), &mut store).unwrap();

        assert_eq!(outcome.exit_code, 0);
        assert!(outcome.stderr.is_empty());
        let table = display::format_task_table(&store.list().unwrap());
        assert_eq!(outcome.stdout, format!("Added task 2 (2 total)\n{}", table));
        assert!(table.contains("Buy milk"));
    }

    #[test]
    fn test_add_empty_description_exits_one_without_writing() {
        let mut store = plain_store();
        store.add("Existing", "").unwrap();

        let outcome = run(add("", "2025-08-01"), &mut store).unwrap();

        assert_eq!(outcome.exit_code, 1);
        assert!(outcome.stdout.is_empty());
        assert_eq!(outcome.stderr, "Error: Task description cannot be empty\n");
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_add_invalid_due_date_exits_one_without_writing() {
        let mut store = plain_store();

        let outcome = run(add("Clean up", "01-05-2025"), &mut store).unwrap();

        assert_eq!(outcome.exit_code, 1);
        assert!(outcome.stderr.contains("01-05-2025"));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_done_echoes_task_and_refreshes() {
        let mut store = plain_store();
        let id = store.add("Learn Rust", "2025-06-10").unwrap();

        let outcome = run(Commands::Done { id }, &mut store).unwrap();

        assert_eq!(outcome.exit_code, 0);
        let table = display::format_task_table(&store.list().unwrap());
        assert_eq!(outcome.stdout, format!("Updated task {}: done\n{}", id, table));
        assert_eq!(store.get(id).unwrap().unwrap().status, TaskStatus::Done);
    }

    #[test]
    fn test_status_unknown_id_is_reported_not_failed() {
        let mut store = plain_store();
        store.add("Only task", "").unwrap();

        let outcome = run(
            Commands::Status {
                id: 42,
                status: "in-progress".to_string(),
            },
            &mut store,
        )
        .unwrap();

        assert_eq!(outcome.exit_code, 0);
        assert!(outcome.stdout.starts_with("No task with id 42\n"));
    }

    #[test]
    fn test_status_outside_enumeration_propagates() {
        let mut store = plain_store();
        let id = store.add("Only task", "").unwrap();

        let err = run(
            Commands::Status {
                id,
                status: "Terminé".to_string(),
            },
            &mut store,
        )
        .unwrap_err();

        let store_err = err.downcast_ref::<StoreError>().unwrap();
        assert!(store_err.is_constraint_violation());
    }

    #[test]
    fn test_delete_refreshes_table() {
        let mut store = plain_store();
        let keep = store.add("Keep", "2025-07-01").unwrap();
        let remove = store.add("Remove", "2025-07-02").unwrap();

        let outcome = run(Commands::Delete { id: remove }, &mut store).unwrap();

        assert_eq!(outcome.exit_code, 0);
        assert!(!outcome.stdout.contains("Remove"));
        assert!(outcome.stdout.contains("Keep"));
        assert_eq!(store.list().unwrap()[0].id, keep);
    }

    #[test]
    fn test_list_json() {
        let mut store = plain_store();
        store.add("Task A", "2025-09-01").unwrap();
        store.add("Task B", "2025-08-01").unwrap();

        let outcome = run(Commands::List { json: true }, &mut store).unwrap();

        let tasks: Vec<Task> = serde_json::from_str(&outcome.stdout).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].description, "Task B");
    }
}
