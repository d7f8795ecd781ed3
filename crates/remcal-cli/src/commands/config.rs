//! Configuration management.

use clap::Subcommand;
use remcal_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Write the default configuration if none exists yet
    Init,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let config = Config::load_or_default();
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Init => {
            let config = Config::load()?;
            println!(
                "Configuration ready ({} list(s) in scope).",
                if config.reminders.lists.is_empty() {
                    "all".to_string()
                } else {
                    config.reminders.lists.len().to_string()
                }
            );
        }
    }
    Ok(())
}
