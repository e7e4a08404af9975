//! Execution tools.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::client::{resource_path, ApiClient, ApiRequest};
use crate::shape::{Field, JsonObject, SchemaError, ShapeContract};
use crate::tools::{
    deleted, id_contract, Domain, IdArgs, Operation, OperationSet, PageArgs, ToolError,
    ToolHandler,
};

pub const LIST_EXECUTIONS: &str = "n8n_list_executions";
pub const GET_EXECUTION: &str = "n8n_get_execution";
pub const DELETE_EXECUTION: &str = "n8n_delete_execution";
pub const RETRY_EXECUTION: &str = "n8n_retry_execution";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListExecutionsArgs {
    workflow_id: Option<String>,
    status: Option<String>,
    #[serde(flatten)]
    page: PageArgs,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetExecutionArgs {
    id: String,
    include_data: Option<bool>,
}

fn operations() -> Result<Vec<Operation>, SchemaError> {
    [
        Operation::new(
            LIST_EXECUTIONS,
            Domain::Execution,
            "List workflow executions, one page at a time",
            PageArgs::fields(
                ShapeContract::new()
                    .field(
                        Field::string("workflowId")
                            .optional()
                            .describe("Only executions of this workflow"),
                    )
                    .field(
                        Field::string("status")
                            .optional()
                            .describe("Filter by status (waiting, running, success, error)"),
                    ),
            ),
        ),
        Operation::new(
            GET_EXECUTION,
            Domain::Execution,
            "Get the details of an execution",
            id_contract("Execution ID").field(
                Field::boolean("includeData")
                    .optional()
                    .describe("Include the execution's node data"),
            ),
        ),
        Operation::new(
            DELETE_EXECUTION,
            Domain::Execution,
            "Delete an execution record",
            id_contract("ID of the execution to delete"),
        ),
        Operation::new(
            RETRY_EXECUTION,
            Domain::Execution,
            "Retry a failed execution",
            id_contract("ID of the execution to retry"),
        ),
    ]
    .into_iter()
    .collect()
}

pub struct ExecutionTools {
    client: Arc<dyn ApiClient>,
    operations: OperationSet,
}

impl ExecutionTools {
    pub fn new(client: Arc<dyn ApiClient>) -> Result<Self, ToolError> {
        Ok(Self {
            client,
            operations: OperationSet::new(Domain::Execution, operations()?),
        })
    }
}

#[async_trait]
impl ToolHandler for ExecutionTools {
    fn domain(&self) -> Domain {
        Domain::Execution
    }

    fn operations(&self) -> &[Operation] {
        self.operations.as_slice()
    }

    async fn handle(&self, name: &str, args: &JsonObject) -> Result<Value, ToolError> {
        let request = match name {
            LIST_EXECUTIONS => {
                let args: ListExecutionsArgs = self.operations.parse(name, args)?;
                let request = ApiRequest::get("/executions")
                    .with_query("workflowId", args.workflow_id)
                    .with_query("status", args.status);
                args.page.apply(request)
            }
            GET_EXECUTION => {
                let args: GetExecutionArgs = self.operations.parse(name, args)?;
                ApiRequest::get(resource_path("executions", &args.id, ""))
                    .with_query("includeData", args.include_data)
            }
            DELETE_EXECUTION => {
                let IdArgs { id } = self.operations.parse(name, args)?;
                self.client
                    .send(ApiRequest::delete(resource_path("executions", &id, "")))
                    .await?;
                return Ok(deleted("Execution", &id));
            }
            RETRY_EXECUTION => {
                let IdArgs { id } = self.operations.parse(name, args)?;
                ApiRequest::post(resource_path("executions", &id, "/retry"))
            }
            _ => return Err(self.operations.unknown(name)),
        };

        Ok(self.client.send(request).await?)
    }
}
