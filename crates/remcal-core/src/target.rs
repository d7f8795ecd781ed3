//! Seam between the engine and the remote calendar.

use chrono::{DateTime, Utc};

use crate::sync::SyncError;

/// Field values for one calendar event, derived from a [`crate::task::Task`].
///
/// `color_id` and `all_day` are pure presentation fields; they are not part
/// of any reconciliation decision.
#[derive(Debug, Clone, PartialEq)]
pub struct EventPayload {
    pub title: String,
    pub notes: String,
    pub due: Option<DateTime<Utc>>,
    pub all_day: bool,
    pub color_id: String,
    pub location: Option<String>,
    /// Source reminder id, stored on the remote event so it can be found
    /// again even if the local mapping store is lost.
    pub task_id: String,
}

/// Performs create/update/delete/find calls against the remote calendar.
pub trait TargetWriter {
    /// Create a new event, returning its remote id.
    fn create(&self, payload: &EventPayload) -> Result<String, SyncError>;

    /// Update an existing event. Unspecified remote fields stay unchanged.
    fn update(&self, event_id: &str, payload: &EventPayload) -> Result<(), SyncError>;

    /// Delete an event. Deleting an already-absent id is success.
    fn delete(&self, event_id: &str) -> Result<(), SyncError>;

    /// Recovery lookup by the tagged source id. Not used in steady state.
    fn find_by_task_id(&self, task_id: &str) -> Result<Option<String>, SyncError>;
}
