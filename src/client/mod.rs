//! WakaTime API Client
//!
//! Translates the logical queries the coordinator needs into authenticated
//! HTTP GET calls:
//! - Current user profile
//! - Today's summary (yesterday → today)
//! - All-time stats
//! - Last 7 days summary
//! - All time since today
//!
//! Non-200 responses degrade to an empty JSON object. Only transport faults
//! and undecodable bodies surface as [`ClientError`].

mod wakatime;

pub use wakatime::{WakatimeClient, CANONICAL_BASE_URL, COMPAT_SEGMENT};

use async_trait::async_trait;
use serde_json::Value;

/// The queries a refresh cycle issues against the remote API
#[async_trait]
pub trait TimeTrackingApi: Send + Sync {
    /// Current user profile (`users/current`)
    async fn user_info(&self) -> Result<Value, ClientError>;

    /// Summaries from yesterday through today
    async fn summary(&self) -> Result<Value, ClientError>;

    /// Stats for the current user
    async fn stats(&self) -> Result<Value, ClientError>;

    /// Summaries for the last seven days
    async fn last_7_days(&self) -> Result<Value, ClientError>;

    /// All-time totals since today
    async fn all_time_since_today(&self) -> Result<Value, ClientError>;
}

/// Account details returned by a successful credential check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
}

impl AccountInfo {
    /// Extract account details from a `users/current` body.
    ///
    /// Returns `None` unless `data.email` is present.
    pub fn from_user_info(body: &Value) -> Option<Self> {
        let data = body.get("data")?;
        let email = data.get("email")?.as_str()?.to_string();

        Some(Self {
            id: data
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            email,
            display_name: data
                .get("display_name")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }
}

/// Errors raised by the API client
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid API key")]
    InvalidAuth,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_account_info_from_user_info() {
        let body = json!({
            "data": {
                "id": "abc-123",
                "email": "dev@example.com",
                "display_name": "Dev"
            }
        });

        let account = AccountInfo::from_user_info(&body).unwrap();
        assert_eq!(account.id, "abc-123");
        assert_eq!(account.email, "dev@example.com");
        assert_eq!(account.display_name.as_deref(), Some("Dev"));
    }

    #[test]
    fn test_account_info_requires_email() {
        let body = json!({ "data": { "id": "abc-123" } });
        assert!(AccountInfo::from_user_info(&body).is_none());

        assert!(AccountInfo::from_user_info(&json!({})).is_none());
    }
}
