//! WakaTime HTTP client
//!
//! Issues authenticated GET requests against the hosted WakaTime API or a
//! self-hosted compatibility API (e.g. Wakapi).

use super::*;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as Base64, Engine as _};
use chrono::{Duration, Local, NaiveDate};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use serde_json::{Map, Value};

/// Root of the hosted WakaTime API
pub const CANONICAL_BASE_URL: &str = "https://wakatime.com/api/v1";

/// Path suffix of the WakaTime-compatible API on self-hosted servers
pub const COMPAT_SEGMENT: &str = "/compat/wakatime/v1";

/// WakaTime API client
pub struct WakatimeClient {
    http: Client,
    base_url: String,
    auth_header: String,
}

impl WakatimeClient {
    /// Create a client against the given endpoint root.
    ///
    /// Any root other than [`CANONICAL_BASE_URL`] is treated as a
    /// self-hosted server: the key is base64-encoded and the root is moved
    /// under [`COMPAT_SEGMENT`].
    pub fn new(api_key: &str, http: Client, base_url: &str) -> Self {
        let (credential, base_url) = resolve_endpoint(api_key, base_url);

        Self {
            http,
            base_url,
            auth_header: format!("Basic {}", credential),
        }
    }

    /// Create a client against the hosted WakaTime API
    pub fn hosted(api_key: &str, http: Client) -> Self {
        Self::new(api_key, http, CANONICAL_BASE_URL)
    }

    /// The effective endpoint root after rewriting
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether requests go to a self-hosted compatibility API
    pub fn is_compat(&self) -> bool {
        self.base_url != CANONICAL_BASE_URL
    }

    /// Fetch one resource, degrading non-200 responses to an empty object
    async fn fetch(&self, endpoint: &str) -> Result<Value, ClientError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, &self.auth_header)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            tracing::error!(
                status = response.status().as_u16(),
                url = %url,
                "Error fetching data from WakaTime API"
            );
            return Ok(Value::Object(Map::new()));
        }

        response
            .json::<Value>()
            .await
            .map_err(|source| ClientError::Decode { url, source })
    }

    /// Get category information
    pub async fn categories(&self) -> Result<Value, ClientError> {
        self.fetch("users/current/categories").await
    }

    /// Check the key by fetching the current user.
    ///
    /// The key is accepted only if the profile carries an email address.
    pub async fn validate_credentials(&self) -> Result<AccountInfo, ClientError> {
        let body = self.user_info().await?;
        AccountInfo::from_user_info(&body).ok_or(ClientError::InvalidAuth)
    }
}

#[async_trait]
impl TimeTrackingApi for WakatimeClient {
    async fn user_info(&self) -> Result<Value, ClientError> {
        self.fetch("users/current").await
    }

    async fn summary(&self) -> Result<Value, ClientError> {
        let today = Local::now().date_naive();
        self.fetch(&summaries_path(today - Duration::days(1), today))
            .await
    }

    async fn stats(&self) -> Result<Value, ClientError> {
        self.fetch("users/current/stats").await
    }

    async fn last_7_days(&self) -> Result<Value, ClientError> {
        let today = Local::now().date_naive();
        self.fetch(&summaries_path(today - Duration::days(7), today))
            .await
    }

    async fn all_time_since_today(&self) -> Result<Value, ClientError> {
        self.fetch("users/current/all_time_since_today").await
    }
}

/// Work out the credential and endpoint root actually used on the wire
fn resolve_endpoint(api_key: &str, base_url: &str) -> (String, String) {
    let root = base_url.trim_end_matches('/');

    if root == CANONICAL_BASE_URL {
        return (api_key.to_string(), root.to_string());
    }

    let credential = Base64.encode(api_key);
    let root = if root.ends_with(COMPAT_SEGMENT) {
        root.to_string()
    } else {
        format!("{}{}", root, COMPAT_SEGMENT)
    };

    (credential, root)
}

fn summaries_path(start: NaiveDate, end: NaiveDate) -> String {
    format!(
        "users/current/summaries?start={}&end={}",
        start.format("%Y-%m-%d"),
        end.format("%Y-%m-%d")
    )
}
