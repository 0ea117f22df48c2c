use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use colored::{ColoredString, Colorize};
use eyre::{Result, WrapErr, eyre};
use std::path::PathBuf;
use todostore::{
    Backend, Controller, KvStore, NewTask, Priority, PriorityFilter, SortBy, SortDirection, Status, StatusFilter,
    StoreConfig, Task, TaskId, TaskUpdate, ViewQuery,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "todostore")]
#[command(about = "todostore CLI - Ordered task list with filtering, sorting and persistence")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Base directory of the store (default: the platform data directory)
    #[arg(short, long)]
    store_path: Option<PathBuf>,

    /// Entry key the task list is saved under
    #[arg(short, long, default_value = "todos")]
    key: String,

    /// Storage backend: file or sqlite
    #[arg(short, long, default_value = "file")]
    backend: Backend,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Copy)]
struct Selection {
    /// Only show tasks with this status (all, pending, inProgress, completed)
    #[arg(long, default_value = "all")]
    status: StatusFilter,

    /// Only show tasks with this priority (all, high, medium, low)
    #[arg(long, default_value = "all")]
    priority: PriorityFilter,

    /// Sort key (createdAt, dueDate, priority, status)
    #[arg(long, default_value = "dueDate")]
    sort: SortBy,

    /// Sort direction (asc, desc)
    #[arg(long, default_value = "asc")]
    direction: SortDirection,
}

impl From<Selection> for ViewQuery {
    fn from(s: Selection) -> Self {
        ViewQuery::new(s.status, s.priority, s.sort, s.direction)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Add a task
    Add {
        content: String,
        #[arg(short, long, default_value = "medium")]
        priority: Priority,
        #[arg(long, default_value = "pending")]
        status: Status,
        /// Due date as YYYY-MM-DD
        #[arg(short, long)]
        due: Option<NaiveDate>,
    },

    /// List tasks
    List {
        #[command(flatten)]
        selection: Selection,
    },

    /// Toggle a task between done and pending
    Toggle { id: TaskId },

    /// Replace a task's content; omitted fields keep their current value
    Edit {
        id: TaskId,
        content: String,
        #[arg(short, long)]
        priority: Option<Priority>,
        #[arg(long)]
        status: Option<Status>,
        /// Due date as YYYY-MM-DD
        #[arg(short, long, conflicts_with = "clear_due")]
        due: Option<NaiveDate>,
        /// Remove the due date
        #[arg(long)]
        clear_due: bool,
    },

    /// Delete a task
    Delete { id: TaskId },

    /// Move a task between two positions of the listed view
    Move {
        from: usize,
        to: usize,
        #[command(flatten)]
        selection: Selection,
    },

    /// Delete every task
    Clear,
}

fn main() -> Result<()> {
    // Setup tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let base = cli.store_path.clone().unwrap_or_else(StoreConfig::default_base);
    let config = StoreConfig::new(base).with_key(cli.key.clone()).with_backend(cli.backend);

    match config.backend {
        Backend::File => {
            let store = config
                .open_file()
                .wrap_err_with(|| format!("Failed to open store at {}", config.dir.display()))?;
            run(Controller::new(store), cli.command)
        }
        Backend::Sqlite => {
            let store = config
                .open_sqlite()
                .wrap_err_with(|| format!("Failed to open store at {}", config.dir.display()))?;
            run(Controller::new(store), cli.command)
        }
    }
}

fn run<K: KvStore>(mut controller: Controller<K>, command: Commands) -> Result<()> {
    match command {
        Commands::Add {
            content,
            priority,
            status,
            due,
        } => {
            let payload = NewTask::new(content.clone())
                .with_priority(priority)
                .with_status(status)
                .with_due_date(due);
            match controller.add_task(payload).wrap_err("Failed to save task")? {
                Some(id) => println!("Added task {}", id),
                None if content.is_empty() => println!("Task content cannot be empty, nothing added"),
                None if controller.store().snapshot().iter().any(|t| t.content == content) => {
                    println!("A task with content {:?} already exists, nothing added", content)
                }
                None => println!("No task ids left, nothing added"),
            }
        }
        Commands::List { selection } => {
            controller.select(selection.into());
            print_view(&controller);
        }
        Commands::Toggle { id } => {
            if controller.toggle_task(&id).wrap_err("Failed to save task")? {
                let task = controller.store().get(&id).ok_or_else(|| eyre!("Task {} vanished", id))?;
                println!("Task {} is now {}", id, task.status.label());
            } else {
                println!("No task with id {}", id);
            }
        }
        Commands::Edit {
            id,
            content,
            priority,
            status,
            due,
            clear_due,
        } => {
            let Some(current) = controller.store().get(&id) else {
                println!("No task with id {}", id);
                return Ok(());
            };
            let fields = TaskUpdate {
                content,
                priority: priority.unwrap_or(current.priority),
                status: status.unwrap_or(current.status),
                due_date: if clear_due { None } else { due.or(current.due_date) },
            };
            if controller.update_task(&id, fields).wrap_err("Failed to save task")? {
                println!("Updated task {}", id);
            } else {
                println!("Task content cannot be empty, nothing changed");
            }
        }
        Commands::Delete { id } => {
            if controller.delete_task(&id).wrap_err("Failed to save tasks")? {
                println!("Deleted task {}", id);
            } else {
                println!("No task with id {}", id);
            }
        }
        Commands::Move { from, to, selection } => {
            controller.select(selection.into());
            if controller.reorder_task(from, to).wrap_err("Failed to save tasks")? {
                print_view(&controller);
            } else {
                println!("Nothing to move");
            }
        }
        Commands::Clear => {
            let count = controller.store().len();
            controller.clear_all().wrap_err("Failed to save tasks")?;
            println!("Removed {} task{}", count, if count == 1 { "" } else { "s" });
        }
    }

    Ok(())
}

fn print_view<K: KvStore>(controller: &Controller<K>) {
    let state = controller.refresh();
    println!("{}", state.summary.bold());

    if state.tasks.is_empty() {
        println!("No tasks found matching your filters");
        return;
    }

    let today = Local::now().date_naive();
    for (index, task) in state.tasks.iter().enumerate() {
        println!("{:>3}. {}", index, format_task(task, today));
    }
}

fn format_task(task: &Task, today: NaiveDate) -> String {
    let check = if task.checked { "[x]" } else { "[ ]" };
    let content = if task.checked {
        task.content.strikethrough().dimmed()
    } else {
        task.content.normal()
    };

    let mut line = format!(
        "{} {} {}  {}  {}",
        check,
        task.id.to_string().dimmed(),
        content,
        priority_label(task.priority),
        task.status.label().cyan()
    );

    if let Some(due) = task.due_date {
        let due_text = format!("due {}", due);
        let due_text = if task.is_overdue(today) {
            due_text.red().bold()
        } else {
            due_text.normal()
        };
        line.push_str(&format!("  {}", due_text));
    }

    line
}

fn priority_label(priority: Priority) -> ColoredString {
    match priority {
        Priority::High => priority.label().red(),
        Priority::Medium => priority.label().yellow(),
        Priority::Low => priority.label().green(),
    }
}
