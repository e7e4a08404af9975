//! Shared test doubles for the tool integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use n8n_mcp::shape::{FieldKind, Format};
use n8n_mcp::{ApiClient, ApiRequest, ClientError, JsonObject, Operation, ToolRouter};
use serde_json::{json, Value};

/// One outbound call seen by [`RecordingApi`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Api(ApiRequest),
    Webhook { id: String, payload: Option<Value> },
}

/// `ApiClient` that records every call and replays queued responses.
///
/// With the queue empty every call answers `{}`, which is what n8n sends for
/// a 204.
#[derive(Clone, Default)]
pub struct RecordingApi {
    calls: Arc<Mutex<Vec<Call>>>,
    responses: Arc<Mutex<Vec<Result<Value, ClientError>>>>,
}

impl RecordingApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_with(&self, response: Result<Value, ClientError>) {
        self.responses.lock().unwrap().push(response);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// The single management request made so far.
    pub fn only_request(&self) -> ApiRequest {
        let calls = self.calls();
        assert_eq!(calls.len(), 1, "expected exactly one call, got {calls:?}");
        match &calls[0] {
            Call::Api(request) => request.clone(),
            other => panic!("expected a management call, got {other:?}"),
        }
    }

    pub fn router(&self) -> ToolRouter {
        ToolRouter::new(Arc::new(self.clone())).unwrap()
    }

    fn next_response(&self) -> Result<Value, ClientError> {
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(json!({}))
        } else {
            responses.remove(0)
        }
    }
}

#[async_trait]
impl ApiClient for RecordingApi {
    async fn send(&self, request: ApiRequest) -> Result<Value, ClientError> {
        self.calls.lock().unwrap().push(Call::Api(request));
        self.next_response()
    }

    async fn trigger_webhook(
        &self,
        id: &str,
        payload: Option<Value>,
    ) -> Result<Value, ClientError> {
        self.calls.lock().unwrap().push(Call::Webhook {
            id: id.to_string(),
            payload,
        });
        self.next_response()
    }
}

/// Build an argument object holding only the required fields of `operation`.
pub fn minimal_args(operation: &Operation) -> JsonObject {
    operation
        .shape
        .fields()
        .iter()
        .filter(|field| field.required)
        .map(|field| {
            let value = match (field.kind, field.format) {
                (FieldKind::String, Some(Format::Email)) => json!("ada@example.com"),
                (FieldKind::String, _) => json!("x1"),
                (FieldKind::Number, _) => json!(1),
                (FieldKind::Boolean, _) => json!(true),
                (FieldKind::Object, _) => json!({}),
                (FieldKind::StringArray, _) => json!(["x1"]),
                (FieldKind::ObjectArray, _) => json!([{}]),
            };
            (field.name.to_string(), value)
        })
        .collect()
}

/// Convert a `json!` object literal into an argument bag.
pub fn args(value: Value) -> JsonObject {
    match value {
        Value::Object(map) => map,
        other => panic!("arguments must be an object, got {other}"),
    }
}
