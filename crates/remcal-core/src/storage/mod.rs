mod config;
pub mod mapping_db;

pub use config::{CompletedAction, Config, PriorityColors};
pub use mapping_db::{MappingDb, RunRecord};

use std::path::PathBuf;

/// Returns `~/.config/remcal[-dev]/` based on REMCAL_ENV.
///
/// Set REMCAL_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("REMCAL_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("remcal-dev")
    } else {
        base_dir.join("remcal")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
