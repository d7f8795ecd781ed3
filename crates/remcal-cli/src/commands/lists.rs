//! List available Reminders lists.

use remcal_core::integrations::AppleRemindersReader;
use remcal_core::SourceReader;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let reader = AppleRemindersReader::new();
    let names = reader.list_names()?;

    println!("Available Reminders lists:");
    for name in &names {
        println!("  - {name}");
    }
    println!("Total: {} list(s)", names.len());
    Ok(())
}
