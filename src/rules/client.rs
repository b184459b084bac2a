//! HTTP client for the rules endpoint.

use async_trait::async_trait;

use super::storage::LocalStorage;
use super::{RulesResponse, RulesSource};
use crate::error::Result;

const RULES_PATH: &str = "/api/ai/rules/";

/// Authenticated client for `GET {base}/api/ai/rules/`.
#[derive(Clone, Debug)]
pub struct RulesClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl RulesClient {
    /// Creates a client sending `token` as a bearer token.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            token: token.into(),
        }
    }

    /// Replaces the underlying HTTP client, e.g. to configure proxies or timeouts.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Creates a client using the token saved in `storage`.
    pub fn from_storage(base_url: impl Into<String>, storage: &LocalStorage) -> Result<Self> {
        Ok(Self::new(base_url, storage.token()?))
    }

    /// Endpoint URL without query string.
    pub fn rules_url(&self) -> String {
        format!("{}{}", self.base_url, RULES_PATH)
    }

    /// Fetches all rules, or those of `category`.  No retries.
    pub async fn fetch_rules(&self, category: Option<&str>) -> Result<RulesResponse> {
        let mut request = self.http.get(self.rules_url()).bearer_auth(&self.token);
        if let Some(category) = category.filter(|c| !c.is_empty()) {
            request = request.query(&[("category", category)]);
        }

        let response = request.send().await?.error_for_status()?;
        let body: RulesResponse = response.json().await?;
        log::debug!(
            "fetched {} rules in {} categories",
            body.rules.len(),
            body.categories.len()
        );
        Ok(body)
    }
}

#[async_trait]
impl RulesSource for RulesClient {
    async fn fetch_rules(&self, category: Option<&str>) -> Result<RulesResponse> {
        RulesClient::fetch_rules(self, category).await
    }
}
