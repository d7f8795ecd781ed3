//! The reconciliation engine.
//!
//! For every reminder in the snapshot the engine decides whether to create,
//! update, skip, or delete the corresponding calendar event, then deletes
//! events whose reminder has vanished from the snapshot. A failure on one
//! reminder never aborts the run; a mapping store failure always does.

use std::collections::HashSet;

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};

use crate::error::{CoreError, DatabaseError};
use crate::source::SourceReader;
use crate::storage::{CompletedAction, MappingDb};
use crate::sync::fingerprint::fingerprint;
use crate::sync::types::{SyncError, SyncOptions, SyncStats, TaskOutcome};
use crate::target::{EventPayload, TargetWriter};
use crate::task::Task;

/// Synchronizes reminders to the remote calendar.
pub struct SyncEngine<'a> {
    reader: &'a dyn SourceReader,
    writer: &'a dyn TargetWriter,
    db: &'a MappingDb,
    options: SyncOptions,
}

impl<'a> SyncEngine<'a> {
    pub fn new(
        reader: &'a dyn SourceReader,
        writer: &'a dyn TargetWriter,
        db: &'a MappingDb,
        options: SyncOptions,
    ) -> Self {
        Self {
            reader,
            writer,
            db,
            options,
        }
    }

    /// Perform one full reconciliation run.
    ///
    /// # Errors
    /// Returns an error only for fatal conditions: the source snapshot cannot
    /// be fetched, or the mapping store fails. Per-reminder calendar failures
    /// are counted in the returned stats instead.
    pub fn run(&self) -> Result<SyncStats, CoreError> {
        let tasks = self.reader.fetch(&self.options.scope)?;

        let mut stats = SyncStats {
            total_tasks: tasks.len() as u64,
            ..Default::default()
        };
        info!(total = tasks.len(), "fetched reminders");

        // Membership for the cleanup pass is fixed here, before any writes.
        let snapshot_ids: HashSet<String> = tasks.iter().map(|t| t.id.clone()).collect();

        for task in &tasks {
            match self.sync_task(task) {
                Ok(TaskOutcome::Created) => stats.created += 1,
                Ok(TaskOutcome::Updated) => stats.updated += 1,
                Ok(TaskOutcome::Deleted) => stats.deleted += 1,
                Ok(TaskOutcome::Skipped) => stats.skipped += 1,
                Err(SyncError::Database(e)) => return Err(DatabaseError::from(e).into()),
                Err(e) => {
                    warn!(id = %task.id, title = %task.title, error = %e, "failed to sync reminder");
                    stats.errors += 1;
                }
            }
        }

        self.cleanup_orphans(&snapshot_ids, &mut stats)?;

        self.db
            .record_run(&stats, Utc::now())
            .map_err(DatabaseError::from)?;

        info!(%stats, "sync complete");
        Ok(stats)
    }

    /// Classify and process a single reminder. First match wins:
    /// completed, retention skip, update-or-skip, create.
    fn sync_task(&self, task: &Task) -> Result<TaskOutcome, SyncError> {
        if task.completed {
            return self.sync_completed(task);
        }

        match self.db.event_id_for(&task.id)? {
            Some(event_id) => self.update_or_skip(task, &event_id),
            None => self.create(task),
        }
    }

    /// Completed reminders are never created or updated. Under the delete
    /// policy the mapped event is removed; otherwise the reminder is skipped.
    fn sync_completed(&self, task: &Task) -> Result<TaskOutcome, SyncError> {
        if self.retention_skip(task) {
            debug!(id = %task.id, title = %task.title, "skipping old completed reminder");
            return Ok(TaskOutcome::Skipped);
        }

        let event_id = self.db.event_id_for(&task.id)?;
        match (event_id, self.options.completed_action) {
            (Some(event_id), CompletedAction::Delete) => {
                self.writer.delete(&event_id)?;
                self.db.remove(&task.id)?;
                debug!(id = %task.id, %event_id, "deleted event for completed reminder");
                Ok(TaskOutcome::Deleted)
            }
            _ => Ok(TaskOutcome::Skipped),
        }
    }

    /// A reminder completed more than the retention window ago is skipped
    /// outright, so deletes are not retried forever for events the remote
    /// side may already have purged.
    fn retention_skip(&self, task: &Task) -> bool {
        let days = self.options.skip_completed_older_than_days;
        if days <= 0 {
            return false;
        }
        match task.completed_at {
            Some(done) => done < Utc::now() - Duration::days(days),
            None => false,
        }
    }

    /// Mapping exists and the reminder is not completed: update unless the
    /// stored `last_modified` shows the reminder is unchanged.
    fn update_or_skip(&self, task: &Task, event_id: &str) -> Result<TaskOutcome, SyncError> {
        if let (Some(modified), Some(last_synced)) =
            (task.modified_at, self.db.last_modified_for(&task.id)?)
        {
            if modified <= last_synced {
                return Ok(TaskOutcome::Skipped);
            }
        }

        debug!(id = %task.id, title = %task.title, "updating event");
        self.writer.update(event_id, &self.payload_for(task))?;
        self.db
            .upsert(&task.id, event_id, task.modified_at, Some(&fingerprint(task)))?;
        Ok(TaskOutcome::Updated)
    }

    fn create(&self, task: &Task) -> Result<TaskOutcome, SyncError> {
        debug!(id = %task.id, title = %task.title, "creating event");
        let event_id = self.writer.create(&self.payload_for(task))?;
        self.db
            .upsert(&task.id, &event_id, task.modified_at, Some(&fingerprint(task)))?;
        Ok(TaskOutcome::Created)
    }

    /// Delete events whose reminder is gone from the snapshot. A failed
    /// delete leaves the mapping intact so the next run retries it.
    fn cleanup_orphans(
        &self,
        snapshot_ids: &HashSet<String>,
        stats: &mut SyncStats,
    ) -> Result<(), CoreError> {
        let known = self.db.all_task_ids().map_err(DatabaseError::from)?;

        for task_id in known.difference(snapshot_ids) {
            let Some(event_id) = self
                .db
                .event_id_for(task_id)
                .map_err(DatabaseError::from)?
            else {
                continue;
            };

            debug!(id = %task_id, %event_id, "deleting event for removed reminder");
            match self.writer.delete(&event_id) {
                Ok(()) => {
                    self.db.remove(task_id).map_err(DatabaseError::from)?;
                    stats.deleted += 1;
                }
                Err(e) => {
                    warn!(id = %task_id, %event_id, error = %e, "orphan cleanup failed");
                    stats.errors += 1;
                }
            }
        }
        Ok(())
    }

    fn payload_for(&self, task: &Task) -> EventPayload {
        EventPayload {
            title: task.title.clone(),
            notes: task.notes.clone(),
            due: task.due,
            all_day: task.all_day(),
            color_id: self
                .options
                .colors
                .color_for(task.priority_band())
                .to_string(),
            location: task.location.clone(),
            task_id: task.id.clone(),
        }
    }
}
