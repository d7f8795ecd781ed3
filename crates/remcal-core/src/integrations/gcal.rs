//! Google Calendar writer.
//!
//! REST adapter over the Calendar v3 events API. Every call is bounded by a
//! client-side timeout; retries are the caller's concern, not this adapter's.

use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use reqwest::blocking::Client;
use serde_json::{json, Value};

use super::{keyring_store, oauth};
use crate::sync::SyncError;
use crate::target::{EventPayload, TargetWriter};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";
const CALL_TIMEOUT_SECS: u64 = 30;

/// Private extended property carrying the source reminder id. This is the
/// recovery anchor if the local mapping store is ever lost.
pub const TASK_ID_PROPERTY: &str = "remcalTaskId";

/// Keyring entry holding the OAuth tokens.
const TOKEN_ENTRY: &str = "google";

/// Writes events to one Google Calendar.
pub struct GoogleCalendarWriter {
    client: Client,
    base_url: String,
    calendar_id: String,
    time_zone: String,
    /// Fixed token for tests; production resolves tokens via the keyring.
    token_override: Option<String>,
}

impl GoogleCalendarWriter {
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(calendar_id: &str, time_zone: &str) -> Result<Self, SyncError> {
        Ok(Self {
            client: Client::builder()
                .timeout(StdDuration::from_secs(CALL_TIMEOUT_SECS))
                .build()?,
            base_url: DEFAULT_BASE_URL.to_string(),
            calendar_id: calendar_id.to_string(),
            time_zone: time_zone.to_string(),
            token_override: None,
        })
    }

    #[cfg(test)]
    fn with_base_url(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.to_string(),
            calendar_id: "primary".to_string(),
            time_zone: "UTC".to_string(),
            token_override: Some("test-token".to_string()),
        }
    }

    /// Persist Google OAuth client credentials to the OS keyring.
    pub fn set_credentials(client_id: &str, client_secret: &str) -> Result<(), SyncError> {
        keyring_store::set("google_client_id", client_id)
            .and_then(|()| keyring_store::set("google_client_secret", client_secret))
            .map_err(|e| SyncError::OAuth(format!("failed to store credentials: {e}")))
    }

    /// Whether OAuth tokens are stored for Google.
    pub fn is_authenticated() -> bool {
        oauth::load_tokens(TOKEN_ENTRY).is_some()
    }

    /// Remove stored tokens.
    pub fn logout() -> Result<(), SyncError> {
        keyring_store::delete(TOKEN_ENTRY)
            .map_err(|e| SyncError::OAuth(format!("failed to remove tokens: {e}")))
    }

    /// OAuth parameters for the Google Calendar scope.
    ///
    /// # Errors
    /// Returns an error if client credentials were never stored.
    pub fn oauth_config() -> Result<oauth::OAuthConfig, SyncError> {
        let client_id = keyring_store::get("google_client_id")
            .ok()
            .flatten()
            .unwrap_or_default();
        let client_secret = keyring_store::get("google_client_secret")
            .ok()
            .flatten()
            .unwrap_or_default();

        if client_id.is_empty() || client_secret.is_empty() {
            return Err(SyncError::OAuth(
                "Google client_id / client_secret not configured. \
                 Run `remcal auth login --client-id ... --client-secret ...` first"
                    .to_string(),
            ));
        }

        Ok(oauth::OAuthConfig {
            service_name: TOKEN_ENTRY.to_string(),
            client_id,
            client_secret,
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            scopes: vec!["https://www.googleapis.com/auth/calendar.events".to_string()],
            redirect_port: 19821,
        })
    }

    /// Return a valid access token, refreshing if expired.
    fn token(&self) -> Result<String, SyncError> {
        if let Some(token) = &self.token_override {
            return Ok(token.clone());
        }

        let tokens = oauth::load_tokens(TOKEN_ENTRY).ok_or(SyncError::NotAuthenticated)?;
        if !oauth::is_expired(&tokens) {
            return Ok(tokens.access_token);
        }

        let refresh = tokens
            .refresh_token
            .as_deref()
            .ok_or_else(|| SyncError::OAuth("no refresh token available".to_string()))?;
        let refreshed = oauth::refresh(&Self::oauth_config()?, refresh)?;
        Ok(refreshed.access_token)
    }

    fn events_url(&self) -> String {
        format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(&self.calendar_id)
        )
    }

    fn event_url(&self, event_id: &str) -> String {
        format!("{}/{}", self.events_url(), urlencoding::encode(event_id))
    }

    /// Build the event body for the API. All-day events use date start/end
    /// with an exclusive end date; timed events run one hour from the due
    /// time. A reminder without a due date lands at 09:00 today.
    fn event_body(&self, payload: &EventPayload) -> Value {
        let start = payload.due.unwrap_or_else(default_start);

        let mut event = json!({
            "summary": payload.title,
            "description": payload.notes,
        });

        if let Some(location) = &payload.location {
            event["location"] = json!(location);
        }

        if payload.all_day {
            let end = start + Duration::days(1);
            event["start"] = json!({ "date": start.format("%Y-%m-%d").to_string() });
            event["end"] = json!({ "date": end.format("%Y-%m-%d").to_string() });
        } else {
            let end = start + Duration::hours(1);
            event["start"] = json!({
                "dateTime": start.to_rfc3339(),
                "timeZone": self.time_zone,
            });
            event["end"] = json!({
                "dateTime": end.to_rfc3339(),
                "timeZone": self.time_zone,
            });
        }

        if !payload.color_id.is_empty() {
            event["colorId"] = json!(payload.color_id);
        }

        event["extendedProperties"] = json!({
            "private": { TASK_ID_PROPERTY: payload.task_id }
        });

        event
    }

    fn read_json(resp: reqwest::blocking::Response) -> Result<Value, SyncError> {
        let status = resp.status();
        let text = resp.text()?;
        if !status.is_success() {
            return Err(SyncError::CalendarApi(format!(
                "HTTP {status}: {}",
                text.trim()
            )));
        }
        Ok(serde_json::from_str(&text)?)
    }
}

fn default_start() -> DateTime<Utc> {
    Utc::now()
        .date_naive()
        .and_hms_opt(9, 0, 0)
        .map(|t| t.and_utc())
        .unwrap_or_else(Utc::now)
}

impl TargetWriter for GoogleCalendarWriter {
    fn create(&self, payload: &EventPayload) -> Result<String, SyncError> {
        let resp = self
            .client
            .post(self.events_url())
            .bearer_auth(self.token()?)
            .json(&self.event_body(payload))
            .send()?;

        let body = Self::read_json(resp)?;
        body["id"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| SyncError::CalendarApi("missing event id in response".to_string()))
    }

    fn update(&self, event_id: &str, payload: &EventPayload) -> Result<(), SyncError> {
        // PATCH: unspecified remote fields stay unchanged.
        let resp = self
            .client
            .patch(self.event_url(event_id))
            .bearer_auth(self.token()?)
            .json(&self.event_body(payload))
            .send()?;

        Self::read_json(resp).map(|_| ())
    }

    fn delete(&self, event_id: &str) -> Result<(), SyncError> {
        let resp = self
            .client
            .delete(self.event_url(event_id))
            .bearer_auth(self.token()?)
            .send()?;

        let status = resp.status();
        // An already-absent event is a successful delete.
        if status.is_success() || status.as_u16() == 404 || status.as_u16() == 410 {
            return Ok(());
        }
        Err(SyncError::CalendarApi(format!(
            "HTTP {status}: {}",
            resp.text().unwrap_or_default().trim()
        )))
    }

    fn find_by_task_id(&self, task_id: &str) -> Result<Option<String>, SyncError> {
        let url = format!(
            "{}?privateExtendedProperty={}&maxResults=1",
            self.events_url(),
            urlencoding::encode(&format!("{TASK_ID_PROPERTY}={task_id}")),
        );

        let resp = self
            .client
            .get(url)
            .bearer_auth(self.token()?)
            .send()?;

        let body = Self::read_json(resp)?;
        Ok(body["items"]
            .as_array()
            .and_then(|items| items.first())
            .and_then(|item| item["id"].as_str())
            .map(String::from))
    }
}
