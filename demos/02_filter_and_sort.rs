//! Demo 02: Filtering and Sorting
//!
//! Builds a small task list and prints views for several filter and sort
//! selections, along with the summary line the controller produces.
//!
//! Run with: cargo run --example 02_filter_and_sort

use chrono::NaiveDate;
use eyre::Result;
use todostore::{
    Controller, Filter, MemoryKv, NewTask, Persistence, Priority, SortBy, SortDirection, Status, TaskStore, ViewQuery,
};

fn print_view(controller: &Controller<MemoryKv>) {
    let state = controller.refresh();
    println!("   {}", state.summary);
    for task in &state.tasks {
        let due = task.due_date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string());
        println!(
            "   - {:<22} priority={:<6} status={:<10} due={}",
            task.content, task.priority, task.status, due
        );
    }
    println!();
}

fn main() -> Result<()> {
    println!("todostore Filter and Sort Demo");
    println!("==============================\n");

    let store = TaskStore::open(Persistence::new(MemoryKv::new()));
    let mut controller = Controller::new(store);

    let samples = [
        ("Fix login bug", Priority::High, Status::InProgress, Some((2024, 6, 3))),
        ("Update changelog", Priority::Low, Status::Pending, None),
        ("Review pull request", Priority::Medium, Status::Pending, Some((2024, 6, 1))),
        ("Plan sprint", Priority::High, Status::Pending, None),
        ("Archive old tickets", Priority::Low, Status::Completed, Some((2024, 5, 20))),
    ];
    for (content, priority, status, due) in samples {
        controller.add_task(
            NewTask::new(content)
                .with_priority(priority)
                .with_status(status)
                .with_due_date(due.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))),
        )?;
    }

    println!("1. Default view (due date ascending, undated last):");
    print_view(&controller);

    println!("2. Due date descending (undated still last):");
    controller.set_sort_direction(SortDirection::Desc);
    print_view(&controller);

    println!("3. Priority ascending (highest first):");
    controller.select(ViewQuery::new(Filter::All, Filter::All, SortBy::Priority, SortDirection::Asc));
    print_view(&controller);

    println!("4. Pending tasks only, by status:");
    controller.set_filter_status(Filter::Only(Status::Pending));
    controller.set_sort_by(SortBy::Status);
    print_view(&controller);

    println!("5. Pending + high priority:");
    controller.set_filter_priority(Filter::Only(Priority::High));
    print_view(&controller);

    println!("Demo complete!");
    Ok(())
}
