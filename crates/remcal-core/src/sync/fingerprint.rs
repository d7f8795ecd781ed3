//! Content fingerprint for change detection.
//!
//! The digest is persisted alongside each mapping on every successful write.
//! It is not consulted when deciding whether to update; the authoritative
//! change signal is the `modified_at` comparison in the engine.

use sha2::{Digest, Sha256};

use crate::task::Task;

/// Deterministic digest over the six semantically relevant fields:
/// title, notes, due, priority, completed, location.
pub fn fingerprint(task: &Task) -> String {
    let due = task.due.map(|d| d.to_rfc3339()).unwrap_or_default();
    let location = task.location.as_deref().unwrap_or_default();
    let data = format!(
        "{}|{}|{}|{}|{}|{}",
        task.title, task.notes, due, task.priority, task.completed, location
    );

    let mut hasher = Sha256::new();
    hasher.update(data.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn base_task() -> Task {
        Task {
            id: "rem-1".to_string(),
            title: "Buy milk".to_string(),
            notes: "2 liters".to_string(),
            due: Some(Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap()),
            completed: false,
            completed_at: None,
            modified_at: None,
            priority: 5,
            location: Some("Market".to_string()),
            list: "Groceries".to_string(),
        }
    }

    #[test]
    fn equal_fields_yield_equal_fingerprints() {
        assert_eq!(fingerprint(&base_task()), fingerprint(&base_task()));
    }

    #[test]
    fn each_field_changes_the_fingerprint() {
        let base = fingerprint(&base_task());

        let mut t = base_task();
        t.title = "Buy bread".to_string();
        assert_ne!(fingerprint(&t), base);

        let mut t = base_task();
        t.notes = "3 liters".to_string();
        assert_ne!(fingerprint(&t), base);

        let mut t = base_task();
        t.due = None;
        assert_ne!(fingerprint(&t), base);

        let mut t = base_task();
        t.priority = 1;
        assert_ne!(fingerprint(&t), base);

        let mut t = base_task();
        t.completed = true;
        assert_ne!(fingerprint(&t), base);

        let mut t = base_task();
        t.location = None;
        assert_ne!(fingerprint(&t), base);
    }

    #[test]
    fn non_content_fields_do_not_affect_fingerprint() {
        let base = fingerprint(&base_task());

        let mut t = base_task();
        t.id = "other".to_string();
        t.list = "Elsewhere".to_string();
        t.modified_at = Some(Utc::now());
        assert_eq!(fingerprint(&t), base);
    }
}
