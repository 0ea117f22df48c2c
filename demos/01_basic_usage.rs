//! Demo 01: Basic Usage
//!
//! Adds, edits, toggles, reorders and deletes tasks in a file-backed store,
//! then reopens the store to show that every change was persisted.
//!
//! Run with: cargo run --example 01_basic_usage

use chrono::NaiveDate;
use eyre::{Result, eyre};
use todostore::{NewTask, Priority, Status, StoreConfig, TaskUpdate};

fn main() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let config = StoreConfig::new(temp_dir.path());

    println!("todostore Basic Usage Demo");
    println!("==========================\n");
    println!("Store dir: {}\n", config.dir.display());

    let mut store = config.open_file()?;

    // ADD
    println!("1. ADD - Creating three tasks...");
    let report = store
        .add(
            NewTask::new("Write quarterly report")
                .with_priority(Priority::High)
                .with_due_date(NaiveDate::from_ymd_opt(2024, 7, 1)),
        )?
        .ok_or_else(|| eyre!("report was not added"))?;
    store.add(NewTask::new("Book dentist"))?;
    store.add(NewTask::new("Clean garage").with_priority(Priority::Low))?;
    for task in store.snapshot() {
        println!("   - {} : {} ({})", task.id, task.content, task.priority);
    }
    println!();

    // Rejected adds are silent no-ops
    println!("2. ADD - Duplicate and empty content are ignored...");
    let dup = store.add(NewTask::new("Book dentist"))?;
    let empty = store.add(NewTask::new(""))?;
    println!("   duplicate added: {}, empty added: {}", dup.is_some(), empty.is_some());
    println!("   Total tasks: {}\n", store.len());

    // UPDATE
    println!("3. UPDATE - Marking the report as in progress...");
    let mut fields = TaskUpdate::from(store.get(&report).ok_or_else(|| eyre!("report missing"))?);
    fields.status = Status::InProgress;
    store.update(&report, fields)?;
    println!("   status is now {}\n", store.get(&report).map(|t| t.status.label()).unwrap_or("?"));

    // TOGGLE
    println!("4. TOGGLE - Completing the report...");
    store.toggle_checked(&report)?;
    if let Some(task) = store.get(&report) {
        println!("   checked={}, status={}\n", task.checked, task.status.label());
    }

    // REORDER
    println!("5. REORDER - Moving the last task to the top...");
    store.reorder(2, 0)?;
    for (i, task) in store.snapshot().iter().enumerate() {
        println!("   {}. {}", i, task.content);
    }
    println!();

    // DELETE
    println!("6. DELETE - Removing the report...");
    store.delete(&report)?;
    println!("   Total tasks: {}\n", store.len());

    // Reopen from disk
    drop(store);
    let store = config.open_file()?;
    println!("7. REOPEN - Tasks loaded from disk:");
    for task in store.snapshot() {
        println!("   - {}", task.content);
    }
    println!();

    println!("Demo complete!");
    Ok(())
}
