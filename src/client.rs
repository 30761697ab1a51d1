//! Provider REST access.
//!
//! [`ProviderApi`] is the seam between the pipeline and the network; tests
//! substitute fixture implementations for [`RestClient`].

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::auth::Session;
use crate::config::AppConfig;
use crate::error::{ReportError, Result};
use crate::models::{Account, Extension, ExtensionList, MessagePage, MessageQuery};

/// Extension list endpoint
pub const EXTENSIONS_ENDPOINT: &str = "/restapi/v1.0/account/~/extension";
/// Account info endpoint
pub const ACCOUNT_ENDPOINT: &str = "/restapi/v1.0/account/~";

/// Message-store endpoint for one extension
#[must_use]
pub fn message_store_endpoint(extension_id: &str) -> String {
    format!("{EXTENSIONS_ENDPOINT}/{extension_id}/message-store")
}

/// Read-only provider operations used by the report
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProviderApi {
    /// List the account's extensions (single, unpaged call)
    async fn list_extensions(&self) -> Result<Vec<Extension>>;
    /// Fetch account info
    async fn get_account(&self) -> Result<Account>;
    /// Fetch one page of the message store
    async fn list_messages(&self, query: &MessageQuery) -> Result<MessagePage>;
}

/// `reqwest`-backed implementation of [`ProviderApi`]
pub struct RestClient {
    http: reqwest::Client,
    session: Session,
}

impl RestClient {
    /// Wrap an HTTP client and an authenticated session.
    #[must_use]
    pub const fn new(http: reqwest::Client, session: Session) -> Self {
        Self { http, session }
    }

    /// Build the HTTP client with the configured timeouts.
    pub fn http_client(config: &AppConfig) -> Result<reqwest::Client> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(client)
    }

    #[instrument(skip(self, params))]
    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str, params: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.session.server_url(), endpoint);
        debug!(?params, "GET");

        let response = self
            .http
            .get(url)
            .bearer_auth(self.session.access_token())
            .header("Accept", "application/json")
            .query(params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ReportError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                message: error_message(&body).unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string()),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Pull `message` (or `error_description`) out of a provider error body.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .or_else(|| value.get("error_description"))
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
}

#[async_trait]
impl ProviderApi for RestClient {
    async fn list_extensions(&self) -> Result<Vec<Extension>> {
        let list: ExtensionList = self.get_json(EXTENSIONS_ENDPOINT, &[]).await?;
        Ok(list.records)
    }

    async fn get_account(&self) -> Result<Account> {
        self.get_json(ACCOUNT_ENDPOINT, &[]).await
    }

    async fn list_messages(&self, query: &MessageQuery) -> Result<MessagePage> {
        let endpoint = message_store_endpoint(&query.extension_id);
        self.get_json(&endpoint, &query.params()).await
    }
}
