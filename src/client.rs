//! Gateway trait and error types.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while talking to the remote platform.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Non-success status from a management call. The body is kept verbatim.
    #[error("n8n API error: {status} {status_text} - {body}")]
    Api {
        status: u16,
        status_text: String,
        body: String,
    },

    /// Non-success status from a webhook trigger. Only the status is kept.
    #[error("Webhook execution failed: {status}")]
    Webhook { status: u16 },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// One management API call, relative to the versioned API base.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path below `/api/v1`, starting with `/`.
    pub path: String,
    pub body: Option<Value>,
    /// Pre-stringified query parameters in insertion order.
    pub query: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            query: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Set the JSON request body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Set the JSON request body only when one is given.
    pub fn with_optional_body(mut self, body: Option<Value>) -> Self {
        self.body = body;
        self
    }

    /// Append a query parameter when a non-empty value is present.
    ///
    /// Absent and empty values never reach the query string.
    pub fn with_query<V: ToString>(mut self, key: &str, value: Option<V>) -> Self {
        if let Some(value) = value {
            let value = value.to_string();
            if !value.is_empty() {
                self.query.push((key.to_string(), value));
            }
        }
        self
    }
}

/// Build `/{collection}/{id}{suffix}` with the identifier percent-encoded.
pub fn resource_path(collection: &str, id: &str, suffix: &str) -> String {
    format!("/{}/{}{}", collection, urlencoding::encode(id), suffix)
}

/// The only component allowed to perform network I/O against the platform.
///
/// Each call is exactly one round trip: no retries, no timeout, no caching.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Send one authenticated management API request.
    ///
    /// A success status without a body yields an empty object.
    async fn send(&self, request: ApiRequest) -> Result<Value, ClientError>;

    /// Trigger a workflow through its webhook. No API key is attached.
    async fn trigger_webhook(&self, id: &str, payload: Option<Value>)
        -> Result<Value, ClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_query_values_are_skipped_when_absent_or_empty() {
        let request = ApiRequest::get("/workflows")
            .with_query("active", Some(false))
            .with_query::<String>("tags", None)
            .with_query("cursor", Some(""))
            .with_query("limit", Some(10));

        assert_eq!(
            request.query,
            vec![
                ("active".to_string(), "false".to_string()),
                ("limit".to_string(), "10".to_string()),
            ]
        );
    }

    #[test]
    fn resource_path_encodes_identifier() {
        assert_eq!(resource_path("workflows", "abc", ""), "/workflows/abc");
        assert_eq!(
            resource_path("workflows", "../users", "/tags"),
            "/workflows/..%2Fusers/tags"
        );
    }

    #[test]
    fn error_messages_keep_status_and_body() {
        let api = ClientError::Api {
            status: 404,
            status_text: "Not Found".to_string(),
            body: "not found".to_string(),
        };
        assert_eq!(api.to_string(), "n8n API error: 404 Not Found - not found");

        let webhook = ClientError::Webhook { status: 500 };
        assert_eq!(webhook.to_string(), "Webhook execution failed: 500");
    }
}
