//! The sync subcommand: one full reconciliation run.

use remcal_core::integrations::{AppleRemindersReader, GoogleCalendarWriter};
use remcal_core::{lock, Config, MappingDb, SyncEngine, SyncError};

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Held until this function returns; a second concurrent run fails fast.
    let _lock = lock::acquire()?;

    if !GoogleCalendarWriter::is_authenticated() {
        return Err(SyncError::NotAuthenticated.into());
    }

    let config = Config::load()?;
    let db = MappingDb::open()?;
    let reader = AppleRemindersReader::new();
    let writer =
        GoogleCalendarWriter::new(&config.calendar.calendar_id, &config.calendar.time_zone)?;

    let engine = SyncEngine::new(&reader, &writer, &db, config.sync_options());
    let stats = engine.run()?;

    println!("Sync complete: {stats}");

    if stats.errors > 0 {
        return Err(format!("sync finished with {} errors", stats.errors).into());
    }
    Ok(())
}
