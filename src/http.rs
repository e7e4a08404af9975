//! HTTP client utilities for talking to the n8n REST API.

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};

use crate::client::ClientError;

/// Header carrying the management API key.
pub const API_KEY_HEADER: &str = "x-n8n-api-key";

/// Build the shared HTTP client.
///
/// No request timeout is configured: a remote call that never answers keeps
/// the invocation waiting until the caller cancels it.
pub fn build_http_client() -> Result<Client, ClientError> {
    Ok(Client::builder().build()?)
}

/// Headers sent on every management call.
pub fn management_headers(api_key: &str) -> Result<HeaderMap, ClientError> {
    let mut headers = webhook_headers();
    let key = HeaderValue::from_str(api_key)
        .map_err(|_| ClientError::Config("Invalid API key".to_string()))?;
    headers.insert(API_KEY_HEADER, key);
    Ok(headers)
}

/// Headers sent on webhook triggers. Deliberately carries no credentials.
pub fn webhook_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

/// Extension trait for RequestBuilder that logs request body.
pub trait RequestBuilderExt {
    /// Set JSON request body and log it. Returns the RequestBuilder for chaining.
    fn json_logged<T: serde::Serialize + ?Sized>(self, json: &T) -> Self;
}

impl RequestBuilderExt for RequestBuilder {
    fn json_logged<T: serde::Serialize + ?Sized>(self, json: &T) -> Self {
        if let Ok(req_body) = serde_json::to_string_pretty(json) {
            tracing::debug!("n8n request body ({} bytes):\n{}", req_body.len(), req_body);
        }

        self.json(json)
    }
}

/// Extension trait for Response that logs response body.
#[async_trait::async_trait]
pub trait ResponseExt {
    /// Get response text and log it. Consumes the response.
    async fn text_logged(self) -> Result<String, reqwest::Error>;

    /// Get the raw response body and log it. Consumes the response.
    async fn bytes_logged(self) -> Result<Bytes, reqwest::Error>;
}

#[async_trait::async_trait]
impl ResponseExt for reqwest::Response {
    async fn text_logged(self) -> Result<String, reqwest::Error> {
        let text = self.text().await?;
        tracing::debug!("n8n response ({} bytes):\n{}", text.len(), text);
        Ok(text)
    }

    async fn bytes_logged(self) -> Result<Bytes, reqwest::Error> {
        let bytes = self.bytes().await?;

        if let Ok(text) = std::str::from_utf8(&bytes) {
            tracing::debug!("n8n response ({} bytes):\n{}", text.len(), text);
        }

        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn management_headers_carry_key_and_content_type() {
        let headers = management_headers("secret").unwrap();
        assert_eq!(headers.get(API_KEY_HEADER).unwrap(), "secret");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn webhook_headers_have_no_api_key() {
        let headers = webhook_headers();
        assert!(headers.get(API_KEY_HEADER).is_none());
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn api_key_with_newline_is_rejected() {
        let err = management_headers("bad\nkey").unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }
}
