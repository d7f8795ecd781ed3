//! Apple Reminders reader.
//!
//! Shells out to `osascript` running a JavaScript-for-Automation program
//! that emits the reminders as one JSON array. Scripting access to
//! Reminders is gated by macOS privacy consent; a denial maps to a
//! permission error so the operator knows to fix authorization, not
//! configuration.

use std::process::Command;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::source::SourceReader;
use crate::sync::SyncError;
use crate::task::Task;

const FETCH_SCRIPT: &str = r#"
function run(argv) {
  const app = Application('Reminders');
  const scope = argv;
  const out = [];
  for (const list of app.lists()) {
    const name = list.name();
    if (scope.length > 0 && scope.indexOf(name) === -1) continue;
    for (const r of list.reminders()) {
      out.push({
        id: r.id(),
        title: r.name() || 'Untitled',
        notes: r.body() || '',
        due: r.dueDate() ? r.dueDate().toISOString() : null,
        completed: r.completed(),
        completedAt: r.completionDate() ? r.completionDate().toISOString() : null,
        modifiedAt: r.modificationDate() ? r.modificationDate().toISOString() : null,
        priority: r.priority(),
        list: name,
      });
    }
  }
  return JSON.stringify(out);
}
"#;

const LISTS_SCRIPT: &str = r#"
function run() {
  const app = Application('Reminders');
  return JSON.stringify(app.lists().map(function (l) { return l.name(); }));
}
"#;

/// One reminder as emitted by the JXA program.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReminder {
    id: String,
    title: String,
    #[serde(default)]
    notes: String,
    due: Option<DateTime<Utc>>,
    completed: bool,
    completed_at: Option<DateTime<Utc>>,
    modified_at: Option<DateTime<Utc>>,
    #[serde(default)]
    priority: u8,
    #[serde(default)]
    list: String,
}

impl From<RawReminder> for Task {
    fn from(raw: RawReminder) -> Self {
        Task {
            id: raw.id,
            title: raw.title,
            notes: raw.notes,
            due: raw.due,
            completed: raw.completed,
            completed_at: raw.completed_at,
            modified_at: raw.modified_at,
            priority: raw.priority.min(9),
            // Reminders exposes location alarms to EventKit only, not to
            // scripting; the field stays empty through this adapter.
            location: None,
            list: raw.list,
        }
    }
}

/// Reads reminders from the Apple Reminders app.
#[derive(Debug, Default)]
pub struct AppleRemindersReader;

impl AppleRemindersReader {
    pub fn new() -> Self {
        Self
    }

    fn run_script(script: &str, args: &[String]) -> Result<String, SyncError> {
        let output = Command::new("osascript")
            .args(["-l", "JavaScript", "-e", script])
            .args(args)
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("-1743") || stderr.contains("Not authorized") {
                return Err(SyncError::PermissionDenied(
                    "access to Reminders denied; enable it under System Settings > \
                     Privacy & Security > Automation"
                        .to_string(),
                ));
            }
            return Err(SyncError::Source(stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn parse_fetch_output(json: &str) -> Result<Vec<Task>, SyncError> {
    let raw: Vec<RawReminder> = serde_json::from_str(json.trim())?;
    Ok(raw.into_iter().map(Task::from).collect())
}

impl SourceReader for AppleRemindersReader {
    fn fetch(&self, scope: &[String]) -> Result<Vec<Task>, SyncError> {
        let output = Self::run_script(FETCH_SCRIPT, scope)?;
        parse_fetch_output(&output)
    }

    fn list_names(&self) -> Result<Vec<String>, SyncError> {
        let output = Self::run_script(LISTS_SCRIPT, &[])?;
        Ok(serde_json::from_str(output.trim())?)
    }
}
