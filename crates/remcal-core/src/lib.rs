//! # Remcal Core Library
//!
//! This library provides the core business logic for remcal, a one-way
//! synchronizer from Apple Reminders to Google Calendar. All operations are
//! available through a standalone CLI binary; the core carries the decision
//! logic, the CLI is a thin layer over it.
//!
//! ## Architecture
//!
//! - **Reconciliation engine**: classifies every reminder against the durable
//!   mapping store and issues the minimal create/update/delete calls needed
//!   to make the calendar reflect the reminder list
//! - **Storage**: SQLite-based mapping store and run history, TOML-based
//!   configuration
//! - **Integrations**: Apple Reminders reader (osascript subprocess) and
//!   Google Calendar writer (REST + OAuth2)
//!
//! ## Key Components
//!
//! - [`SyncEngine`]: per-run classification and orphan cleanup
//! - [`MappingDb`]: reminder-to-event mapping persistence
//! - [`SourceReader`] / [`TargetWriter`]: the seams the engine depends on
//! - [`Config`]: application configuration management

pub mod error;
pub mod integrations;
pub mod lock;
pub mod source;
pub mod storage;
pub mod sync;
pub mod target;
pub mod task;

pub use error::{ConfigError, CoreError, DatabaseError};
pub use source::SourceReader;
pub use storage::{Config, MappingDb};
pub use sync::{SyncEngine, SyncError, SyncOptions, SyncStats};
pub use target::{EventPayload, TargetWriter};
pub use task::{PriorityBand, Task};
