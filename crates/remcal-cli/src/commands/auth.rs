//! Google authentication management.

use clap::Subcommand;
use remcal_core::integrations::gcal::GoogleCalendarWriter;
use remcal_core::integrations::oauth;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Run the OAuth flow (opens a browser)
    Login {
        /// Google OAuth client id; stored in the OS keyring
        #[arg(long)]
        client_id: Option<String>,
        /// Google OAuth client secret; stored in the OS keyring
        #[arg(long)]
        client_secret: Option<String>,
    },
    /// Show whether tokens are stored
    Status,
    /// Remove stored tokens
    Logout,
}

pub fn run(action: AuthAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        AuthAction::Login {
            client_id,
            client_secret,
        } => {
            if let (Some(id), Some(secret)) = (client_id, client_secret) {
                GoogleCalendarWriter::set_credentials(&id, &secret)?;
            }
            let config = GoogleCalendarWriter::oauth_config()?;
            oauth::authorize(&config)?;
            println!("Authenticated with Google Calendar.");
        }
        AuthAction::Status => {
            if GoogleCalendarWriter::is_authenticated() {
                println!("google: authenticated");
            } else {
                println!("google: not authenticated");
            }
        }
        AuthAction::Logout => {
            GoogleCalendarWriter::logout()?;
            println!("Removed stored Google tokens.");
        }
    }
    Ok(())
}
