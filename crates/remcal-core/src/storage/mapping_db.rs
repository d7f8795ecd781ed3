//! SQLite-based mapping store and run history.
//!
//! Provides persistent storage for:
//! - Reminder-to-event mappings (at most one live row per reminder id)
//! - One sync history row per reconciliation run
//!
//! Every operation is a single statement, so each call is atomic on its own;
//! no multi-statement transaction ever spans more than one reminder.

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::DatabaseError;
use crate::sync::SyncStats;

/// One persisted run summary from the `sync_history` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub sync_time: DateTime<Utc>,
    pub total_tasks: u64,
    pub created: u64,
    pub updated: u64,
    pub deleted: u64,
    pub skipped: u64,
    pub errors: u64,
}

/// SQLite database tracking which calendar event belongs to which reminder.
pub struct MappingDb {
    conn: Connection,
}

impl MappingDb {
    /// Open the database at `~/.config/remcal/remcal.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, DatabaseError> {
        let path = data_dir()
            .map_err(|e| DatabaseError::OpenFailed {
                path: Path::new("~/.config/remcal").to_path_buf(),
                source: rusqlite::Error::InvalidPath(e.to_string().into()),
            })?
            .join("remcal.db");
        let conn = Connection::open(&path).map_err(|source| DatabaseError::OpenFailed {
            path: path.clone(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        let db = Self { conn };
        db.migrate()
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS mappings (
                task_id       TEXT PRIMARY KEY,
                event_id      TEXT NOT NULL,
                last_synced   TEXT NOT NULL,
                last_modified TEXT,
                checksum      TEXT
            );

            CREATE TABLE IF NOT EXISTS sync_history (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                sync_time   TEXT NOT NULL,
                total_tasks INTEGER NOT NULL,
                created     INTEGER NOT NULL,
                updated     INTEGER NOT NULL,
                deleted     INTEGER NOT NULL,
                skipped     INTEGER NOT NULL,
                errors      INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sync_history_time ON sync_history(sync_time);",
        )?;
        Ok(())
    }

    /// Calendar event id mapped to a reminder, if any.
    pub fn event_id_for(&self, task_id: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self
            .conn
            .prepare("SELECT event_id FROM mappings WHERE task_id = ?1")?;
        stmt.query_row(params![task_id], |row| row.get::<_, String>(0))
            .optional()
    }

    /// Save or replace the mapping for a reminder. Idempotent: the primary
    /// key guarantees at most one live row per reminder id.
    pub fn upsert(
        &self,
        task_id: &str,
        event_id: &str,
        last_modified: Option<DateTime<Utc>>,
        checksum: Option<&str>,
    ) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO mappings (task_id, event_id, last_synced, last_modified, checksum)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                task_id,
                event_id,
                Utc::now().to_rfc3339(),
                last_modified.map(|t| t.to_rfc3339()),
                checksum,
            ],
        )?;
        Ok(())
    }

    /// Delete the mapping for a reminder. No-op if absent.
    pub fn remove(&self, task_id: &str) -> Result<(), rusqlite::Error> {
        self.conn
            .execute("DELETE FROM mappings WHERE task_id = ?1", params![task_id])?;
        Ok(())
    }

    /// All reminder ids currently mapped. Used for orphan detection.
    pub fn all_task_ids(&self) -> Result<HashSet<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT task_id FROM mappings")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        rows.collect()
    }

    /// The reminder's `modified_at` as of the last successful write.
    pub fn last_modified_for(
        &self,
        task_id: &str,
    ) -> Result<Option<DateTime<Utc>>, rusqlite::Error> {
        let mut stmt = self
            .conn
            .prepare("SELECT last_modified FROM mappings WHERE task_id = ?1")?;
        let stored: Option<Option<String>> = stmt
            .query_row(params![task_id], |row| row.get(0))
            .optional()?;

        Ok(stored.flatten().and_then(|s| {
            DateTime::parse_from_rfc3339(&s)
                .ok()
                .map(|t| t.with_timezone(&Utc))
        }))
    }

    /// Append one run summary to the history. Rows are never mutated.
    pub fn record_run(&self, stats: &SyncStats, at: DateTime<Utc>) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO sync_history (sync_time, total_tasks, created, updated, deleted, skipped, errors)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                at.to_rfc3339(),
                stats.total_tasks,
                stats.created,
                stats.updated,
                stats.deleted,
                stats.skipped,
                stats.errors,
            ],
        )?;
        Ok(())
    }

    /// Number of live mappings. Read path for the status display.
    pub fn mapping_count(&self) -> Result<u64, rusqlite::Error> {
        self.conn
            .query_row("SELECT COUNT(*) FROM mappings", [], |row| row.get(0))
    }

    /// The most recent run summaries, newest first.
    pub fn recent_runs(&self, limit: usize) -> Result<Vec<RunRecord>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT sync_time, total_tasks, created, updated, deleted, skipped, errors
             FROM sync_history ORDER BY sync_time DESC, id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            let time_str: String = row.get(0)?;
            let sync_time = DateTime::parse_from_rfc3339(&time_str)
                .map(|t| t.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now());
            Ok(RunRecord {
                sync_time,
                total_tasks: row.get(1)?,
                created: row.get(2)?,
                updated: row.get(3)?,
                deleted: row.get(4)?,
                skipped: row.get(5)?,
                errors: row.get(6)?,
            })
        })?;
        rows.collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn upsert_and_lookup() {
        let db = MappingDb::open_memory().unwrap();
        assert!(db.event_id_for("rem-1").unwrap().is_none());

        db.upsert("rem-1", "ev-1", None, None).unwrap();
        assert_eq!(db.event_id_for("rem-1").unwrap().unwrap(), "ev-1");
    }

    #[test]
    fn upsert_replaces_never_appends() {
        let db = MappingDb::open_memory().unwrap();
        db.upsert("rem-1", "ev-1", None, None).unwrap();
        db.upsert("rem-1", "ev-2", None, Some("abc")).unwrap();

        assert_eq!(db.event_id_for("rem-1").unwrap().unwrap(), "ev-2");
        assert_eq!(db.mapping_count().unwrap(), 1);
    }

    #[test]
    fn remove_is_noop_when_absent() {
        let db = MappingDb::open_memory().unwrap();
        db.remove("missing").unwrap();

        db.upsert("rem-1", "ev-1", None, None).unwrap();
        db.remove("rem-1").unwrap();
        assert!(db.event_id_for("rem-1").unwrap().is_none());
    }

    #[test]
    fn all_task_ids_returns_full_key_set() {
        let db = MappingDb::open_memory().unwrap();
        db.upsert("a", "ev-a", None, None).unwrap();
        db.upsert("b", "ev-b", None, None).unwrap();

        let ids = db.all_task_ids().unwrap();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains("a"));
        assert!(ids.contains("b"));
    }

    #[test]
    fn last_modified_roundtrip() {
        let db = MappingDb::open_memory().unwrap();
        let t0 = Utc::now() - Duration::hours(3);

        db.upsert("rem-1", "ev-1", Some(t0), None).unwrap();
        let stored = db.last_modified_for("rem-1").unwrap().unwrap();
        assert_eq!(stored.timestamp(), t0.timestamp());

        db.upsert("rem-2", "ev-2", None, None).unwrap();
        assert!(db.last_modified_for("rem-2").unwrap().is_none());
        assert!(db.last_modified_for("missing").unwrap().is_none());
    }

    #[test]
    fn record_run_appends_history() {
        let db = MappingDb::open_memory().unwrap();
        let older = SyncStats {
            total_tasks: 3,
            created: 1,
            ..Default::default()
        };
        let newer = SyncStats {
            total_tasks: 5,
            updated: 2,
            ..Default::default()
        };

        db.record_run(&older, Utc::now() - Duration::minutes(10))
            .unwrap();
        db.record_run(&newer, Utc::now()).unwrap();

        let runs = db.recent_runs(10).unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].total_tasks, 5);
        assert_eq!(runs[0].updated, 2);
        assert_eq!(runs[1].total_tasks, 3);
        assert_eq!(runs[1].created, 1);

        let limited = db.recent_runs(1).unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].total_tasks, 5);
    }

    #[test]
    fn open_on_disk_creates_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("remcal.db");
        let conn = Connection::open(&path).unwrap();
        let db = MappingDb { conn };
        db.migrate().unwrap();

        db.upsert("rem-1", "ev-1", None, None).unwrap();
        drop(db);

        let conn = Connection::open(&path).unwrap();
        let db = MappingDb { conn };
        assert_eq!(db.event_id_for("rem-1").unwrap().unwrap(), "ev-1");
    }
}
