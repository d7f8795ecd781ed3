//! TOML-based application configuration.
//!
//! Stores the sync policy and presentation settings:
//! - What happens to calendar events when a reminder is completed
//! - Which reminder lists are in scope
//! - Retention window for old completed reminders
//! - Priority-to-color mapping for the calendar side
//!
//! Configuration is stored at `~/.config/remcal/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;
use crate::sync::SyncOptions;
use crate::task::PriorityBand;

/// What to do with the calendar event when its reminder is completed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletedAction {
    /// Delete the event and forget the mapping.
    #[default]
    Delete,
    /// Leave the event in place.
    Keep,
}

/// Sync policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub completed_action: CompletedAction,
}

/// Source-side configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemindersConfig {
    /// Reminder lists to sync. Empty means all lists.
    #[serde(default)]
    pub lists: Vec<String>,
    /// Completed reminders older than this many days are skipped outright.
    /// 0 disables the rule.
    #[serde(default = "default_skip_days")]
    pub skip_completed_older_than_days: i64,
}

/// Google Calendar color ids per priority band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorityColors {
    #[serde(default = "default_color_none")]
    pub none: String,
    #[serde(default = "default_color_high")]
    pub high: String,
    #[serde(default = "default_color_medium")]
    pub medium: String,
    #[serde(default = "default_color_low")]
    pub low: String,
}

impl PriorityColors {
    pub fn color_for(&self, band: PriorityBand) -> &str {
        match band {
            PriorityBand::None => &self.none,
            PriorityBand::High => &self.high,
            PriorityBand::Medium => &self.medium,
            PriorityBand::Low => &self.low,
        }
    }
}

/// Target-side configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
    /// IANA time zone attached to timed events.
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    #[serde(default)]
    pub priority_colors: PriorityColors,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/remcal/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub reminders: RemindersConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
}

// Default functions
fn default_skip_days() -> i64 {
    30
}
fn default_calendar_id() -> String {
    "primary".into()
}
fn default_time_zone() -> String {
    "UTC".into()
}
fn default_color_none() -> String {
    "1".into()
}
fn default_color_high() -> String {
    "11".into()
}
fn default_color_medium() -> String {
    "5".into()
}
fn default_color_low() -> String {
    "7".into()
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            completed_action: CompletedAction::Delete,
        }
    }
}

impl Default for RemindersConfig {
    fn default() -> Self {
        Self {
            lists: Vec::new(),
            skip_completed_older_than_days: default_skip_days(),
        }
    }
}

impl Default for PriorityColors {
    fn default() -> Self {
        Self {
            none: default_color_none(),
            high: default_color_high(),
            medium: default_color_medium(),
            low: default_color_low(),
        }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            calendar_id: default_calendar_id(),
            time_zone: default_time_zone(),
            priority_colors: PriorityColors::default(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()
            .map_err(|e| ConfigError::LoadFailed {
                path: PathBuf::from("~/.config/remcal"),
                message: e.to_string(),
            })?
            .join("config.toml"))
    }

    /// Load from disk or write and return the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// The policy values the reconciliation engine consumes.
    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            completed_action: self.sync.completed_action,
            skip_completed_older_than_days: self.reminders.skip_completed_older_than_days,
            scope: self.reminders.lists.clone(),
            colors: self.calendar.priority_colors.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.sync.completed_action, CompletedAction::Delete);
        assert_eq!(parsed.reminders.skip_completed_older_than_days, 30);
        assert_eq!(parsed.calendar.calendar_id, "primary");
    }

    #[test]
    fn completed_action_parses_lowercase() {
        let cfg: Config = toml::from_str("[sync]\ncompleted_action = \"keep\"\n").unwrap();
        assert_eq!(cfg.sync.completed_action, CompletedAction::Keep);
    }

    #[test]
    fn missing_sections_use_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.calendar.priority_colors.high, "11");
        assert_eq!(cfg.calendar.priority_colors.none, "1");
        assert!(cfg.reminders.lists.is_empty());
    }

    #[test]
    fn priority_color_lookup() {
        let colors = PriorityColors::default();
        assert_eq!(colors.color_for(PriorityBand::None), "1");
        assert_eq!(colors.color_for(PriorityBand::High), "11");
        assert_eq!(colors.color_for(PriorityBand::Medium), "5");
        assert_eq!(colors.color_for(PriorityBand::Low), "7");
    }

    #[test]
    fn sync_options_reflect_config() {
        let mut cfg = Config::default();
        cfg.sync.completed_action = CompletedAction::Keep;
        cfg.reminders.lists = vec!["Work".to_string()];
        cfg.reminders.skip_completed_older_than_days = 0;

        let options = cfg.sync_options();
        assert_eq!(options.completed_action, CompletedAction::Keep);
        assert_eq!(options.scope, vec!["Work".to_string()]);
        assert_eq!(options.skip_completed_older_than_days, 0);
    }
}
