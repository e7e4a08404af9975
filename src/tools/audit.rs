//! Security audit tool.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::client::{ApiClient, ApiRequest};
use crate::shape::{Field, JsonObject, SchemaError, ShapeContract};
use crate::tools::{Domain, Operation, OperationSet, ToolError, ToolHandler};

pub const GENERATE_AUDIT: &str = "n8n_generate_audit";

#[derive(Debug, Deserialize)]
struct GenerateAuditArgs {
    categories: Option<Vec<String>>,
}

fn operations() -> Result<Vec<Operation>, SchemaError> {
    Ok(vec![Operation::new(
        GENERATE_AUDIT,
        Domain::Audit,
        "Generate a security audit report for the n8n instance",
        ShapeContract::new().field(
            Field::string_array("categories")
                .optional()
                .describe("Categories to audit (credentials, database, filesystem, nodes, instance)"),
        ),
    )?])
}

pub struct AuditTools {
    client: Arc<dyn ApiClient>,
    operations: OperationSet,
}

impl AuditTools {
    pub fn new(client: Arc<dyn ApiClient>) -> Result<Self, ToolError> {
        Ok(Self {
            client,
            operations: OperationSet::new(Domain::Audit, operations()?),
        })
    }
}

#[async_trait]
impl ToolHandler for AuditTools {
    fn domain(&self) -> Domain {
        Domain::Audit
    }

    fn operations(&self) -> &[Operation] {
        self.operations.as_slice()
    }

    async fn handle(&self, name: &str, args: &JsonObject) -> Result<Value, ToolError> {
        match name {
            GENERATE_AUDIT => {
                let args: GenerateAuditArgs = self.operations.parse(name, args)?;
                // Without categories the request carries no body at all.
                let body = args
                    .categories
                    .map(|categories| json!({ "additionalOptions": { "categories": categories } }));
                let request = ApiRequest::post("/audit").with_optional_body(body);
                Ok(self.client.send(request).await?)
            }
            _ => Err(self.operations.unknown(name)),
        }
    }
}
