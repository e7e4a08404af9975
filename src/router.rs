//! Exact-name dispatch from tool names to their owning handler.

use std::collections::HashMap;
use std::future::Future;
use std::pin::pin;
use std::sync::Arc;

use futures::future::{select, Either};
use itertools::Itertools;
use serde_json::Value;
use tracing::{debug, warn};

use crate::client::ApiClient;
use crate::shape::JsonObject;
use crate::tools::{
    AuditTools, CredentialTools, ExecutionTools, Operation, ProjectTools, TagTools, ToolError,
    ToolHandler, UserTools, VariableTools, WorkflowTools,
};

/// Immutable catalog of every operation plus the lookup table built from it.
pub struct ToolRouter {
    handlers: Vec<Box<dyn ToolHandler>>,
    catalog: Vec<Operation>,
    index: HashMap<&'static str, usize>,
}

impl ToolRouter {
    /// Register every domain handler against the same client.
    pub fn new(client: Arc<dyn ApiClient>) -> Result<Self, ToolError> {
        Self::from_handlers(vec![
            Box::new(WorkflowTools::new(client.clone())?),
            Box::new(ExecutionTools::new(client.clone())?),
            Box::new(CredentialTools::new(client.clone())?),
            Box::new(UserTools::new(client.clone())?),
            Box::new(TagTools::new(client.clone())?),
            Box::new(VariableTools::new(client.clone())?),
            Box::new(ProjectTools::new(client.clone())?),
            Box::new(AuditTools::new(client)?),
        ])
    }

    /// Build the catalog and the name table in one pass. A name claimed twice
    /// is rejected with [`ToolError::DuplicateName`].
    pub fn from_handlers(handlers: Vec<Box<dyn ToolHandler>>) -> Result<Self, ToolError> {
        let mut catalog = Vec::new();
        let mut index = HashMap::new();

        for (slot, handler) in handlers.iter().enumerate() {
            for operation in handler.operations() {
                if index.insert(operation.name, slot).is_some() {
                    return Err(ToolError::DuplicateName(operation.name.to_string()));
                }
                catalog.push(operation.clone());
            }
        }

        debug!(
            tools = catalog.len(),
            domains = %handlers.iter().map(|h| h.domain()).join(","),
            "tool catalog registered"
        );

        Ok(Self {
            handlers,
            catalog,
            index,
        })
    }

    /// Every registered operation, in registration order.
    pub fn catalog(&self) -> &[Operation] {
        &self.catalog
    }

    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.catalog.iter().find(|op| op.name == name)
    }

    /// Forward a call to the handler that owns `name`.
    pub async fn route(&self, name: &str, args: &JsonObject) -> Result<Value, ToolError> {
        let Some(&slot) = self.index.get(name) else {
            warn!(tool = name, "unknown tool");
            return Err(ToolError::UnknownTool(name.to_string()));
        };

        let handler = &self.handlers[slot];
        debug!(tool = name, domain = %handler.domain(), "routing tool call");
        handler.handle(name, args).await
    }

    /// Like [`route`](Self::route), but gives up as soon as `cancel` resolves.
    ///
    /// The in-flight call is dropped on cancellation, which aborts any pending
    /// HTTP request.
    pub async fn route_until<F>(
        &self,
        name: &str,
        args: &JsonObject,
        cancel: F,
    ) -> Result<Value, ToolError>
    where
        F: Future<Output = ()>,
    {
        let call = pin!(self.route(name, args));
        let cancel = pin!(cancel);

        match select(call, cancel).await {
            Either::Left((result, _)) => result,
            Either::Right(((), _)) => {
                debug!(tool = name, "tool call cancelled");
                Err(ToolError::Cancelled)
            }
        }
    }
}
