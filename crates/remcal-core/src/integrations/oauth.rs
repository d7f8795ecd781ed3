//! OAuth2 Authorization Code flow for a desktop app.
//!
//! 1. Opens the browser to the authorization URL
//! 2. Starts a tiny localhost HTTP server to receive the callback
//! 3. Exchanges the code for an access token (+ refresh token)
//! 4. Stores tokens in the OS keyring

use std::io::{Read, Write};
use std::net::TcpListener;

use serde::{Deserialize, Serialize};

use super::keyring_store;
use crate::sync::SyncError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Unix timestamp of expiry.
    pub expires_at: Option<i64>,
    pub token_type: String,
}

#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// Keyring entry the tokens are stored under.
    pub service_name: String,
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub scopes: Vec<String>,
    pub redirect_port: u16,
}

impl OAuthConfig {
    pub fn redirect_uri(&self) -> String {
        format!("http://localhost:{}/callback", self.redirect_port)
    }

    pub fn auth_url_full(&self) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
            self.auth_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri()),
            urlencoding::encode(&self.scopes.join(" ")),
        )
    }
}

/// Run the full flow: open browser, wait for the callback, exchange the code.
///
/// # Errors
/// Returns an error if the browser cannot be opened, the callback carries no
/// code, or the token endpoint rejects the exchange.
pub fn authorize(config: &OAuthConfig) -> Result<OAuthTokens, SyncError> {
    open::that(config.auth_url_full())
        .map_err(|e| SyncError::OAuth(format!("failed to open browser: {e}")))?;

    let code = wait_for_callback(config.redirect_port)?;

    let tokens = token_request(
        config,
        &[
            ("code", code.as_str()),
            ("grant_type", "authorization_code"),
            ("redirect_uri", &config.redirect_uri()),
        ],
        None,
    )?;

    store_tokens(&config.service_name, &tokens)?;
    Ok(tokens)
}

/// Refresh an access token using a refresh token, persisting the result.
///
/// # Errors
/// Returns an error if the token endpoint rejects the refresh.
pub fn refresh(config: &OAuthConfig, refresh_token: &str) -> Result<OAuthTokens, SyncError> {
    let tokens = token_request(
        config,
        &[
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ],
        // Google may omit the refresh token on refresh; keep the old one.
        Some(refresh_token),
    )?;

    store_tokens(&config.service_name, &tokens)?;
    Ok(tokens)
}

/// Load stored tokens from the keyring.
pub fn load_tokens(service_name: &str) -> Option<OAuthTokens> {
    keyring_store::get(service_name)
        .ok()
        .flatten()
        .and_then(|json| serde_json::from_str(&json).ok())
}

/// Whether stored tokens are expired (with a 60s buffer).
pub fn is_expired(tokens: &OAuthTokens) -> bool {
    match tokens.expires_at {
        Some(exp) => chrono::Utc::now().timestamp() > exp - 60,
        None => false,
    }
}

fn store_tokens(service_name: &str, tokens: &OAuthTokens) -> Result<(), SyncError> {
    let json = serde_json::to_string(tokens)?;
    keyring_store::set(service_name, &json)
        .map_err(|e| SyncError::OAuth(format!("failed to store tokens: {e}")))
}

/// Block until the browser redirects to localhost, then pull out the code.
fn wait_for_callback(port: u16) -> Result<String, SyncError> {
    let listener = TcpListener::bind(("127.0.0.1", port))?;
    let (mut stream, _) = listener.accept()?;

    let mut buf = [0u8; 4096];
    let n = stream.read(&mut buf)?;
    let request = String::from_utf8_lossy(&buf[..n]).into_owned();

    let code = extract_code(&request)
        .ok_or_else(|| SyncError::OAuth("no authorization code in callback".to_string()))?;

    let response = "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n\
        <html><body><h2>Authentication successful!</h2>\
        <p>You can close this tab.</p></body></html>";
    stream.write_all(response.as_bytes())?;

    Ok(code)
}

/// POST to the token endpoint with shared client parameters.
fn token_request(
    config: &OAuthConfig,
    extra_params: &[(&str, &str)],
    fallback_refresh: Option<&str>,
) -> Result<OAuthTokens, SyncError> {
    let mut params = vec![
        ("client_id", config.client_id.as_str()),
        ("client_secret", config.client_secret.as_str()),
    ];
    params.extend_from_slice(extra_params);

    let body: serde_json::Value = reqwest::blocking::Client::new()
        .post(&config.token_url)
        .form(&params)
        .send()?
        .json()?;

    if let Some(error) = body.get("error") {
        return Err(SyncError::OAuth(format!("token endpoint rejected: {error}")));
    }

    let expires_at = body
        .get("expires_in")
        .and_then(|v| v.as_i64())
        .map(|ei| chrono::Utc::now().timestamp() + ei);

    Ok(OAuthTokens {
        access_token: body["access_token"].as_str().unwrap_or_default().to_string(),
        refresh_token: body
            .get("refresh_token")
            .and_then(|v| v.as_str())
            .map(String::from)
            .or_else(|| fallback_refresh.map(String::from)),
        expires_at,
        token_type: body["token_type"].as_str().unwrap_or("Bearer").to_string(),
    })
}

fn extract_code(request: &str) -> Option<String> {
    let first_line = request.lines().next()?;
    let path = first_line.split_whitespace().nth(1)?;
    let url = url::Url::parse(&format!("http://localhost{path}")).ok()?;
    url.query_pairs()
        .find(|(k, _)| k == "code")
        .map(|(_, v)| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> OAuthConfig {
        OAuthConfig {
            service_name: "test".to_string(),
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            auth_url: "https://accounts.example.com/auth".to_string(),
            token_url: "https://accounts.example.com/token".to_string(),
            scopes: vec!["calendar.events".to_string()],
            redirect_port: 19821,
        }
    }

    #[test]
    fn auth_url_carries_client_and_scope() {
        let url = config().auth_url_full();
        assert!(url.starts_with("https://accounts.example.com/auth?client_id=id"));
        assert!(url.contains("calendar.events"));
        assert!(url.contains("access_type=offline"));
    }

    #[test]
    fn extract_code_from_callback_request() {
        let request = "GET /callback?code=abc123&scope=x HTTP/1.1\r\nHost: localhost\r\n\r\n";
        assert_eq!(extract_code(request).as_deref(), Some("abc123"));
    }

    #[test]
    fn extract_code_missing_returns_none() {
        let request = "GET /callback?error=access_denied HTTP/1.1\r\n\r\n";
        assert!(extract_code(request).is_none());
    }

    #[test]
    fn expiry_check_honors_buffer() {
        let mut tokens = OAuthTokens {
            access_token: "t".to_string(),
            refresh_token: None,
            expires_at: Some(chrono::Utc::now().timestamp() + 3600),
            token_type: "Bearer".to_string(),
        };
        assert!(!is_expired(&tokens));

        tokens.expires_at = Some(chrono::Utc::now().timestamp() + 30);
        assert!(is_expired(&tokens));

        tokens.expires_at = None;
        assert!(!is_expired(&tokens));
    }
}
