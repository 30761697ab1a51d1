//! Session bootstrap: trades the signed JWT credential for a bearer token.

use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::config::Credentials;
use crate::error::{ReportError, Result};

/// Token endpoint path, relative to the server URL.
pub const TOKEN_ENDPOINT: &str = "/restapi/oauth/token";

/// OAuth grant type for JWT assertions (RFC 7523).
pub const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Authenticated session handle
#[derive(Clone)]
pub struct Session {
    server_url: String,
    access_token: String,
}

impl Session {
    /// Build a session from an already issued token.
    pub fn new(server_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            access_token: access_token.into(),
        }
    }

    /// Provider base URL without a trailing slash
    #[must_use]
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Bearer token for the `Authorization` header
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("server_url", &self.server_url)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Log in with the JWT bearer grant.
///
/// Any transport failure or non-success answer is reported as
/// [`ReportError::Auth`].
#[instrument(skip_all, fields(server_url = %credentials.server_url))]
pub async fn login(http: &reqwest::Client, credentials: &Credentials) -> Result<Session> {
    let url = format!("{}{}", credentials.server_url, TOKEN_ENDPOINT);
    debug!("Requesting access token");

    let response = http
        .post(&url)
        .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
        .header("Accept", "application/json")
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", credentials.jwt_token.as_str())])
        .send()
        .await
        .map_err(|e| ReportError::Auth(format!("token request failed: {e}")))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ReportError::Auth(format!("token response unreadable: {e}")))?;

    if !status.is_success() {
        let detail: TokenErrorResponse = serde_json::from_str(&body).unwrap_or_default();
        let message = detail
            .error_description
            .or(detail.error)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());
        return Err(ReportError::Auth(format!("HTTP {}: {message}", status.as_u16())));
    }

    let token: TokenResponse =
        serde_json::from_str(&body).map_err(|e| ReportError::Auth(format!("malformed token response: {e}")))?;
    if token.access_token.is_empty() {
        return Err(ReportError::Auth("provider returned an empty access token".to_string()));
    }

    info!(
        token_type = token.token_type.as_deref().unwrap_or("bearer"),
        expires_in = token.expires_in.unwrap_or_default(),
        "Authentication successful"
    );
    Ok(Session::new(credentials.server_url.clone(), token.access_token))
}
