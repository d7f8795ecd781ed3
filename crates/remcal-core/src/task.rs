//! Reminder data model.
//!
//! A [`Task`] is a read-only snapshot of one Apple Reminders entry as seen by
//! the reconciliation engine. The engine never mutates the source side.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// One reminder from the local task list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Stable, globally unique identifier from the source.
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub notes: String,
    /// Due timestamp. Presence and time-of-day determine all-day vs timed.
    pub due: Option<DateTime<Utc>>,
    pub completed: bool,
    /// Set only when `completed` is true.
    pub completed_at: Option<DateTime<Utc>>,
    /// Increases on every content change of the reminder.
    pub modified_at: Option<DateTime<Utc>>,
    /// Ordinal priority: 0 = none, 1-4 = high, 5 = medium, 6-9 = low.
    pub priority: u8,
    pub location: Option<String>,
    /// Name of the list the reminder belongs to. Diagnostic only.
    #[serde(default)]
    pub list: String,
}

impl Task {
    /// A due date at midnight renders as an all-day calendar event.
    pub fn all_day(&self) -> bool {
        matches!(self.due, Some(d) if d.hour() == 0 && d.minute() == 0)
    }

    pub fn priority_band(&self) -> PriorityBand {
        PriorityBand::from_priority(self.priority)
    }
}

/// Priority band used for color mapping. Pure presentation, carries no state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityBand {
    None,
    High,
    Medium,
    Low,
}

impl PriorityBand {
    pub fn from_priority(priority: u8) -> Self {
        match priority {
            0 => PriorityBand::None,
            1..=4 => PriorityBand::High,
            5 => PriorityBand::Medium,
            _ => PriorityBand::Low,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn task_with_due(due: Option<DateTime<Utc>>) -> Task {
        Task {
            id: "t-1".to_string(),
            title: "Test".to_string(),
            notes: String::new(),
            due,
            completed: false,
            completed_at: None,
            modified_at: None,
            priority: 0,
            location: None,
            list: "Inbox".to_string(),
        }
    }

    #[test]
    fn midnight_due_is_all_day() {
        let due = Utc.with_ymd_and_hms(2026, 3, 14, 0, 0, 0).unwrap();
        assert!(task_with_due(Some(due)).all_day());
    }

    #[test]
    fn timed_due_is_not_all_day() {
        let due = Utc.with_ymd_and_hms(2026, 3, 14, 15, 30, 0).unwrap();
        assert!(!task_with_due(Some(due)).all_day());
    }

    #[test]
    fn missing_due_is_not_all_day() {
        assert!(!task_with_due(None).all_day());
    }

    #[test]
    fn priority_bands() {
        assert_eq!(PriorityBand::from_priority(0), PriorityBand::None);
        assert_eq!(PriorityBand::from_priority(1), PriorityBand::High);
        assert_eq!(PriorityBand::from_priority(4), PriorityBand::High);
        assert_eq!(PriorityBand::from_priority(5), PriorityBand::Medium);
        assert_eq!(PriorityBand::from_priority(6), PriorityBand::Low);
        assert_eq!(PriorityBand::from_priority(9), PriorityBand::Low);
    }
}
