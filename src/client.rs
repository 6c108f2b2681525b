#![doc = "BrickLink store API client: OAuth-signed GETs that back the core `InventoryApi` trait."]
//
//! # Store API client
//!
//! [`BricklinkClient`] wires the [`InventoryApi`] trait from
//! `bricklink-backup-core` to the real store API:
//!
//! - every request is signed with [`crate::oauth::authorization_header`]
//! - every request carries the configured timeout
//! - responses are unwrapped from the `{"meta": ..., "data": ...}` envelope
//!
//! A non-success HTTP status and a non-success `meta.code` both become a
//! [`FetchError`], so a run never continues with a partial payload.

use async_trait::async_trait;
use bricklink_backup_core::category::Category;
use bricklink_backup_core::contract::InventoryApi;
use bricklink_backup_core::error::FetchError;
use serde::Deserialize;
use serde_json::Value;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::oauth::{authorization_header, Credentials};

pub const DEFAULT_BASE_URL: &str = "https://api.bricklink.com/api/store/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest response body excerpt kept in an error.
const BODY_EXCERPT: usize = 512;

#[derive(Debug, Deserialize)]
struct Meta {
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    meta: Option<Meta>,
    data: Option<Value>,
}

pub struct BricklinkClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl BricklinkClient {
    pub fn new(
        credentials: Credentials,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("bricklink-backup/", env!("CARGO_PKG_VERSION")))
            .build()?;
        tracing::info!(
            base_url,
            timeout_secs = timeout.as_secs(),
            "Initialized BricklinkClient"
        );
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            credentials,
        })
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/{}", self.base_url, resource)
    }

    /// Signed GET of `resource`, returning the envelope's `data`.
    async fn get_data(&self, resource: &str) -> Result<Value, FetchError> {
        let url = self.url(resource);
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let nonce = uuid::Uuid::new_v4().simple().to_string();
        let authorization =
            authorization_header("GET", &url, &self.credentials, &nonce, timestamp);

        tracing::info!(url = %url, "Getting data from the BrickLink API");
        let response = self
            .http
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, url = %url, "Request failed");
                FetchError::Transport {
                    url: url.clone(),
                    message: e.to_string(),
                }
            })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| {
            tracing::error!(error = ?e, url = %url, "Failed to read response body");
            FetchError::Transport {
                url: url.clone(),
                message: e.to_string(),
            }
        })?;
        // Invalid UTF-8 is replaced rather than rejected.
        let text = String::from_utf8_lossy(&bytes);

        if !status.is_success() {
            tracing::error!(status = %status, url = %url, "API returned error status");
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
                body: excerpt(&text),
            });
        }

        parse_envelope(&url, &text)
    }
}

fn excerpt(text: &str) -> String {
    match text.char_indices().nth(BODY_EXCERPT) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_owned(),
    }
}

/// Unwraps `data` from an API response body, checking `meta.code`.
pub fn parse_envelope(url: &str, body: &str) -> Result<Value, FetchError> {
    let envelope: Envelope = serde_json::from_str(body).map_err(|e| {
        tracing::error!(error = ?e, url, "Response body is not a JSON envelope");
        FetchError::Malformed {
            url: url.to_owned(),
            reason: e.to_string(),
        }
    })?;

    if let Some(meta) = envelope.meta {
        if !(200..300).contains(&meta.code) {
            tracing::error!(
                code = meta.code,
                message = %meta.message,
                url,
                "API reported an error"
            );
            let message = if meta.description.is_empty() {
                meta.message
            } else {
                format!("{}: {}", meta.message, meta.description)
            };
            return Err(FetchError::Api {
                url: url.to_owned(),
                code: meta.code,
                message,
            });
        }
    }

    envelope.data.ok_or_else(|| {
        tracing::error!(url, "Response has no data field");
        FetchError::Malformed {
            url: url.to_owned(),
            reason: "missing `data` field".to_owned(),
        }
    })
}

fn malformed(url: String, reason: impl Into<String>) -> FetchError {
    FetchError::Malformed {
        url,
        reason: reason.into(),
    }
}

#[async_trait]
impl InventoryApi for BricklinkClient {
    async fn fetch_inventories(&self) -> Result<Vec<Value>, FetchError> {
        match self.get_data("inventories").await? {
            Value::Array(items) => {
                tracing::info!(count = items.len(), "Fetched inventories");
                Ok(items)
            }
            _ => Err(malformed(self.url("inventories"), "`data` is not an array")),
        }
    }

    async fn fetch_inventory(&self, inventory_id: i64) -> Result<Value, FetchError> {
        let resource = format!("inventories/{inventory_id}");
        match self.get_data(&resource).await? {
            item @ Value::Object(_) => {
                tracing::info!(inventory_id, "Fetched inventory");
                Ok(item)
            }
            _ => Err(malformed(self.url(&resource), "`data` is not an object")),
        }
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, FetchError> {
        let data = self.get_data("categories").await?;
        let categories: Vec<Category> = serde_json::from_value(data)
            .map_err(|e| malformed(self.url("categories"), e.to_string()))?;
        tracing::info!(count = categories.len(), "Fetched categories");
        Ok(categories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://api.bricklink.com/api/store/v1/inventories";

    #[test]
    fn test_parse_envelope_returns_data() {
        let data = parse_envelope(
            URL,
            r#"{"meta": {"code": 200, "message": "OK", "description": "OK"}, "data": [{"inventory_id": 1}]}"#,
        )
        .unwrap();

        assert_eq!(data, serde_json::json!([{"inventory_id": 1}]));
    }

    #[test]
    fn test_parse_envelope_rejects_error_meta_code() {
        let err = parse_envelope(
            URL,
            r#"{"meta": {"code": 401, "message": "INVALID_URI", "description": "signature mismatch"}}"#,
        )
        .unwrap_err();

        match err {
            FetchError::Api { code, message, .. } => {
                assert_eq!(code, 401);
                assert_eq!(message, "INVALID_URI: signature mismatch");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_envelope_requires_data_and_json() {
        assert!(matches!(
            parse_envelope(URL, r#"{"meta": {"code": 200}}"#),
            Err(FetchError::Malformed { .. })
        ));
        assert!(matches!(
            parse_envelope(URL, "<html>Bad Gateway</html>"),
            Err(FetchError::Malformed { .. })
        ));
    }

    #[test]
    fn test_excerpt_truncates_long_bodies_on_char_boundary() {
        let long = "é".repeat(BODY_EXCERPT + 10);

        let cut = excerpt(&long);

        assert_eq!(cut.chars().count(), BODY_EXCERPT + 3);
        assert!(cut.ends_with("..."));
        assert_eq!(excerpt("short"), "short");
    }

    #[test]
    fn test_client_trims_trailing_slash_from_base_url() {
        let client = BricklinkClient::new(
            Credentials {
                consumer_key: "a".into(),
                consumer_secret: "b".into(),
                token_value: "c".into(),
                token_secret: "d".into(),
            },
            "https://example.test/api/",
            DEFAULT_TIMEOUT,
        )
        .unwrap();

        assert_eq!(client.url("categories"), "https://example.test/api/categories");
    }
}
