//! Core types for reminder-to-calendar reconciliation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::{CompletedAction, PriorityColors};

/// Counters for one reconciliation run. Reset at the start of each run,
/// persisted to `sync_history` at the end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStats {
    pub total_tasks: u64,
    pub created: u64,
    pub updated: u64,
    pub deleted: u64,
    pub skipped: u64,
    pub errors: u64,
}

impl std::fmt::Display for SyncStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} total, {} created, {} updated, {} deleted, {} skipped, {} errors",
            self.total_tasks, self.created, self.updated, self.deleted, self.skipped, self.errors
        )
    }
}

/// How one reminder was classified during the main pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Created,
    Updated,
    Deleted,
    Skipped,
}

/// Policy values consumed by the engine. Passed in explicitly at
/// construction, never read from ambient global state.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub completed_action: CompletedAction,
    /// 0 disables the retention rule.
    pub skip_completed_older_than_days: i64,
    /// Reminder lists in scope. Empty means all lists.
    pub scope: Vec<String>,
    pub colors: PriorityColors,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            completed_action: CompletedAction::Delete,
            skip_completed_older_than_days: 30,
            scope: Vec::new(),
            colors: PriorityColors::default(),
        }
    }
}

/// Errors raised by source, target, or store calls during a run.
///
/// `Database` variants are fatal to the run; everything else is caught at
/// the per-reminder boundary and counted.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Calendar API error: {0}")]
    CalendarApi(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Reminders source error: {0}")]
    Source(String),

    #[error("Access denied: {0}")]
    PermissionDenied(String),

    #[error("Not authenticated with Google. Run `remcal auth login` first")]
    NotAuthenticated,

    #[error("OAuth error: {0}")]
    OAuth(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_display_lists_all_six_counters() {
        let stats = SyncStats {
            total_tasks: 7,
            created: 2,
            updated: 1,
            deleted: 1,
            skipped: 2,
            errors: 1,
        };
        assert_eq!(
            stats.to_string(),
            "7 total, 2 created, 1 updated, 1 deleted, 2 skipped, 1 errors"
        );
    }

    #[test]
    fn stats_default_is_all_zero() {
        let stats = SyncStats::default();
        assert_eq!(stats.created + stats.updated + stats.deleted, 0);
        assert_eq!(stats.skipped + stats.errors + stats.total_tasks, 0);
    }
}
