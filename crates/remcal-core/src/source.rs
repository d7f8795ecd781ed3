//! Seam between the engine and the local task list.

use crate::sync::SyncError;
use crate::task::Task;

/// Produces a snapshot of the current reminders on demand.
///
/// The engine depends only on this contract, never on a concrete adapter.
/// Implementations must return both completed and incomplete reminders.
pub trait SourceReader {
    /// Fetch reminders from the named lists. An empty scope means all lists.
    fn fetch(&self, scope: &[String]) -> Result<Vec<Task>, SyncError>;

    /// Names of all available reminder lists. Diagnostic use only.
    fn list_names(&self) -> Result<Vec<String>, SyncError>;
}
