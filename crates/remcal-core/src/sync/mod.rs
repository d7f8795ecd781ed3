//! Reconciliation layer.
//!
//! One `run()` makes the remote calendar reflect the current reminder
//! snapshot: a classification pass over every reminder, then a cleanup pass
//! over mappings whose reminder has vanished, then one persisted stats row.

pub mod engine;
pub mod fingerprint;
pub mod types;


pub use engine::SyncEngine;
pub use fingerprint::fingerprint;
pub use types::{SyncError, SyncOptions, SyncStats, TaskOutcome};
