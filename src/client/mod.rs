//! Wardrobe REST API Client
//!
//! HTTP client for the wardrobe API, used by the CLI. Failed calls are
//! sorted into [`ErrorBucket`]s so callers can show one consistent message
//! per kind of failure.

use chrono::{DateTime, Utc};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

use crate::analytics::Dashboard;
use crate::api::dto::{ItemListResponse, SubscriptionResponse};
use crate::api::ErrorResponse;
use crate::gamification::GlobalWardrobeScore;

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API (e.g., "http://localhost:8090")
    pub base_url: String,
    /// Sent as `X-User-Id`
    pub user_id: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8090".to_string(),
            user_id: "local-user".to_string(),
            request_timeout_ms: 10_000,
        }
    }
}

/// How a failed call should be presented to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorBucket {
    /// Identity missing or expired
    Reauthenticate,
    /// Authenticated but not allowed (other user's data, tier gate)
    AccessDenied,
    /// Server-side or transport failure
    TryLater,
    /// The request itself was refused; the server's message applies
    Rejected,
}

impl ErrorBucket {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => ErrorBucket::Reauthenticate,
            403 => ErrorBucket::AccessDenied,
            s if s >= 500 => ErrorBucket::TryLater,
            _ => ErrorBucket::Rejected,
        }
    }
}

/// Client errors
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("API error {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn bucket(&self) -> ErrorBucket {
        match self {
            ClientError::Api { status, .. } => ErrorBucket::from_status(*status),
            ClientError::Transport(_) | ClientError::Decode(_) => ErrorBucket::TryLater,
        }
    }

    /// Toast text for this error
    pub fn user_message(&self) -> String {
        match self.bucket() {
            ErrorBucket::Reauthenticate => "Your session has expired. Please sign in again.".to_string(),
            ErrorBucket::AccessDenied => "You don't have access to this.".to_string(),
            ErrorBucket::TryLater => {
                "Something went wrong on our end. Please try again later.".to_string()
            }
            ErrorBucket::Rejected => match self {
                ClientError::Api { message, .. } => message.clone(),
                other => other.to_string(),
            },
        }
    }

    /// Build an API error from a non-success status and its body
    pub fn from_response_body(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorResponse>(body) {
            Ok(parsed) => ClientError::Api {
                status,
                code: parsed.error.code,
                message: parsed.error.message,
            },
            Err(_) => ClientError::Api {
                status,
                code: "HTTP_ERROR".to_string(),
                message: if body.trim().is_empty() {
                    format!("Request failed with status {}", status)
                } else {
                    body.trim().to_string()
                },
            },
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Wardrobe API client
pub struct WardrobeClient {
    client: Client,
    config: ClientConfig,
}

impl WardrobeClient {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        self.client
            .request(method, url)
            .header("X-User-Id", &self.config.user_id)
    }

    async fn check(response: Response) -> ClientResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let err = ClientError::from_response_body(status.as_u16(), &body);
        tracing::debug!(status = status.as_u16(), error = %err, "API call failed");
        Err(err)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        let response = Self::check(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> ClientResult<T> {
        let response = self.request(Method::GET, path).query(query).send().await?;
        Self::decode(response).await
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let response = self.request(method, path).json(body).send().await?;
        Self::decode(response).await
    }

    /// Server health; does not require identity
    pub async fn health(&self) -> ClientResult<Value> {
        self.get("/health", &[]).await
    }

    pub async fn profile(&self) -> ClientResult<Value> {
        self.get("/api/v1/profile", &[]).await
    }

    pub async fn update_profile(&self, patch: &Value) -> ClientResult<Value> {
        self.send_json(Method::PUT, "/api/v1/profile", patch).await
    }

    pub async fn subscription(&self) -> ClientResult<SubscriptionResponse> {
        self.get("/api/v1/subscription", &[]).await
    }

    /// List items; `query` takes the item list filters (`category`, `sort`, ...)
    pub async fn items(&self, query: &[(&str, String)]) -> ClientResult<ItemListResponse> {
        self.get("/api/v1/items", query).await
    }

    pub async fn add_item(&self, item: &Value) -> ClientResult<Value> {
        self.send_json(Method::POST, "/api/v1/items", item).await
    }

    pub async fn update_item(&self, id: &str, patch: &Value) -> ClientResult<Value> {
        self.send_json(Method::PATCH, &format!("/api/v1/items/{}", id), patch)
            .await
    }

    pub async fn delete_item(&self, id: &str) -> ClientResult<()> {
        let response = self
            .request(Method::DELETE, &format!("/api/v1/items/{}", id))
            .send()
            .await?;
        Self::check(response).await.map(|_| ())
    }

    pub async fn log_wear(&self, id: &str, worn_at: Option<DateTime<Utc>>) -> ClientResult<Value> {
        let body = json!({ "worn_at": worn_at });
        self.send_json(Method::POST, &format!("/api/v1/items/{}/wear", id), &body)
            .await
    }

    /// Upload a CSV document of items
    pub async fn import_items(&self, csv: String) -> ClientResult<Value> {
        let response = self
            .request(Method::POST, "/api/v1/items/import")
            .header("Content-Type", "text/csv")
            .body(csv)
            .send()
            .await?;
        Self::decode(response).await
    }

    pub async fn outfits(&self, limit: Option<usize>) -> ClientResult<Value> {
        let query: Vec<(&str, String)> = limit.map(|l| ("limit", l.to_string())).into_iter().collect();
        self.get("/api/v1/outfits", &query).await
    }

    pub async fn log_outfit(&self, outfit: &Value) -> ClientResult<Value> {
        self.send_json(Method::POST, "/api/v1/outfits", outfit).await
    }

    pub async fn dashboard(&self) -> ClientResult<Dashboard> {
        self.get("/api/v1/analytics", &[]).await
    }

    pub async fn gamification(&self) -> ClientResult<Value> {
        self.get("/api/v1/gamification", &[]).await
    }

    pub async fn score(&self) -> ClientResult<GlobalWardrobeScore> {
        self.get("/api/v1/gamification/score", &[]).await
    }

    pub async fn challenges(&self) -> ClientResult<Value> {
        self.get("/api/v1/challenges", &[]).await
    }

    pub async fn join_challenge(&self, id: &str) -> ClientResult<Value> {
        self.send_json(Method::POST, &format!("/api/v1/challenges/{}/join", id), &json!({}))
            .await
    }

    /// Raw export body in `format` ("json" or "csv")
    pub async fn export(&self, format: &str) -> ClientResult<String> {
        let response = self
            .request(Method::GET, "/api/v1/export")
            .query(&[("format", format)])
            .send()
            .await?;
        let response = Self::check(response).await?;
        response
            .text()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_from_status() {
        assert_eq!(ErrorBucket::from_status(401), ErrorBucket::Reauthenticate);
        assert_eq!(ErrorBucket::from_status(403), ErrorBucket::AccessDenied);
        assert_eq!(ErrorBucket::from_status(500), ErrorBucket::TryLater);
        assert_eq!(ErrorBucket::from_status(503), ErrorBucket::TryLater);
        assert_eq!(ErrorBucket::from_status(400), ErrorBucket::Rejected);
        assert_eq!(ErrorBucket::from_status(404), ErrorBucket::Rejected);
        assert_eq!(ErrorBucket::from_status(409), ErrorBucket::Rejected);
    }

    #[test]
    fn test_user_messages() {
        let expired = ClientError::from_response_body(401, "");
        assert_eq!(
            expired.user_message(),
            "Your session has expired. Please sign in again."
        );

        let denied = ClientError::from_response_body(403, "");
        assert_eq!(denied.user_message(), "You don't have access to this.");

        let down = ClientError::from_response_body(502, "<html>bad gateway</html>");
        assert_eq!(
            down.user_message(),
            "Something went wrong on our end. Please try again later."
        );
    }

    #[test]
    fn test_rejected_uses_server_message() {
        let body = r#"{"error":{"code":"VALIDATION_ERROR","message":"name: Item name cannot be empty"},"request_id":"abc"}"#;
        let err = ClientError::from_response_body(400, body);

        match &err {
            ClientError::Api { code, .. } => assert_eq!(code, "VALIDATION_ERROR"),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(err.user_message(), "name: Item name cannot be empty");
    }

    #[test]
    fn test_plain_text_body() {
        let err = ClientError::from_response_body(422, "  bad input \n");
        assert_eq!(err.user_message(), "bad input");

        let err = ClientError::from_response_body(404, "");
        assert_eq!(err.user_message(), "Request failed with status 404");
    }

    #[test]
    fn test_decode_errors_try_later() {
        let err = ClientError::Decode("missing field".into());
        assert_eq!(err.bucket(), ErrorBucket::TryLater);
    }

    #[tokio::test]
    async fn test_transport_failure_is_try_later() {
        let client = WardrobeClient::new(ClientConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            request_timeout_ms: 2000,
            ..Default::default()
        })
        .unwrap();

        let err = client.health().await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
        assert_eq!(err.bucket(), ErrorBucket::TryLater);
    }
}
