//! Connection configuration for the remote n8n instance.

use std::env;

use crate::client::ClientError;

/// Environment variable holding the n8n base URL.
pub const API_URL_VAR: &str = "N8N_API_URL";

/// Environment variable holding the n8n API key.
pub const API_KEY_VAR: &str = "N8N_API_KEY";

/// Process-wide connection settings.
///
/// Immutable once built; the gateway takes ownership of it for its entire
/// lifetime and derives the management and webhook base URLs from `endpoint`.
#[derive(Clone)]
pub struct ConnectionConfig {
    /// Base URL of the n8n instance (e.g. `http://localhost:5678`).
    pub endpoint: String,

    /// API key sent in the `X-N8N-API-KEY` header on management calls.
    pub api_key: String,
}

impl ConnectionConfig {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    /// Read both connection secrets from the environment.
    ///
    /// A missing or empty variable is reported by name.
    pub fn from_env() -> Result<Self, ClientError> {
        Ok(Self::new(required_var(API_URL_VAR)?, required_var(API_KEY_VAR)?))
    }

    /// Endpoint with any trailing `/` removed.
    pub fn root(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

fn required_var(name: &'static str) -> Result<String, ClientError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ClientError::Config(format!(
            "missing required environment variable {name}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_strips_every_trailing_slash() {
        let config = ConnectionConfig::new("http://localhost:5678///", "key");
        assert_eq!(config.root(), "http://localhost:5678");
    }

    #[test]
    fn debug_output_hides_api_key() {
        let config = ConnectionConfig::new("http://localhost:5678", "super-secret");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("localhost:5678"));
    }
}
