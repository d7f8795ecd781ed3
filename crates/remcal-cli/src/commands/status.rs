//! Sync status: live mapping count and recent run history.

use remcal_core::MappingDb;

pub fn run(limit: usize) -> Result<(), Box<dyn std::error::Error>> {
    let db = MappingDb::open()?;

    println!("Tracked reminders: {}", db.mapping_count()?);

    let runs = db.recent_runs(limit)?;
    if runs.is_empty() {
        println!("No sync runs recorded yet.");
        return Ok(());
    }

    println!("Recent runs:");
    for run in runs {
        println!(
            "  {}  {} total, {} created, {} updated, {} deleted, {} skipped, {} errors",
            run.sync_time.format("%Y-%m-%d %H:%M:%S"),
            run.total_tasks,
            run.created,
            run.updated,
            run.deleted,
            run.skipped,
            run.errors,
        );
    }
    Ok(())
}
