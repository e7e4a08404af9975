//! reqwest-backed gateway to the n8n REST API.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{StatusCode, Url};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::client::{ApiClient, ApiRequest, ClientError};
use crate::config::ConnectionConfig;
use crate::http::{
    build_http_client, management_headers, webhook_headers, RequestBuilderExt, ResponseExt,
};

const API_PREFIX: &str = "/api/v1";
const WEBHOOK_PREFIX: &str = "/webhook";

/// Gateway to one n8n instance.
///
/// Owns the normalized base URLs and the authentication header for its whole
/// lifetime. Cloning is cheap and shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct N8nApi {
    http: reqwest::Client,
    api_base: String,
    webhook_base: String,
    headers: HeaderMap,
}

impl N8nApi {
    pub fn new(config: ConnectionConfig) -> Result<Self, ClientError> {
        let root = config.root();
        Url::parse(root)
            .map_err(|e| ClientError::Config(format!("Invalid endpoint {root:?}: {e}")))?;

        Ok(Self {
            http: build_http_client()?,
            api_base: format!("{root}{API_PREFIX}"),
            webhook_base: format!("{root}{WEBHOOK_PREFIX}"),
            headers: management_headers(&config.api_key)?,
        })
    }

    /// Base URL for management calls, e.g. `http://localhost:5678/api/v1`.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn api_url(&self, path: &str, query: &[(String, String)]) -> Result<Url, ClientError> {
        let mut url = Url::parse(&format!("{}{}", self.api_base, path))
            .map_err(|e| ClientError::Config(format!("Invalid request path {path:?}: {e}")))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Webhook paths may span several segments; each one is encoded on its
    /// own and the separators are kept.
    fn webhook_url(&self, id: &str) -> Result<Url, ClientError> {
        let mut url = Url::parse(&self.webhook_base)
            .map_err(|e| ClientError::Config(format!("Invalid webhook base: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::Config(format!("Invalid webhook id {id:?}")))?
            .extend(id.split('/'));
        Ok(url)
    }
}

#[async_trait]
impl ApiClient for N8nApi {
    async fn send(&self, request: ApiRequest) -> Result<Value, ClientError> {
        let url = self.api_url(&request.path, &request.query)?;
        debug!(method = %request.method, %url, "n8n API request");

        let mut req = self
            .http
            .request(request.method, url)
            .headers(self.headers.clone());
        if let Some(body) = &request.body {
            req = req.json_logged(body);
        }

        let response = req.send().await?;
        let status = response.status();

        if !status.is_success() {
            warn!(status = status.as_u16(), "n8n API call failed");
            let body = response.text_logged().await?;
            return Err(ClientError::Api {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                body,
            });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Object(Map::new()));
        }

        let bytes = response.bytes_logged().await?;
        if bytes.is_empty() {
            return Ok(Value::Object(Map::new()));
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn trigger_webhook(
        &self,
        id: &str,
        payload: Option<Value>,
    ) -> Result<Value, ClientError> {
        let url = self.webhook_url(id)?;
        debug!(%url, "n8n webhook trigger");

        let mut req = self.http.post(url).headers(webhook_headers());
        if let Some(payload) = &payload {
            req = req.json_logged(payload);
        }

        let response = req.send().await?;
        let status = response.status();

        if !status.is_success() {
            warn!(status = status.as_u16(), "n8n webhook trigger failed");
            return Err(ClientError::Webhook {
                status: status.as_u16(),
            });
        }

        let text = response.text_logged().await?;
        if text.trim().is_empty() {
            return Ok(Value::Object(Map::new()));
        }
        // Webhook responses are whatever the workflow chose to answer with.
        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }
}
