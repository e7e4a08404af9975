//! Variable tools.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::{resource_path, ApiClient, ApiRequest};
use crate::shape::{Field, JsonObject, SchemaError, ShapeContract};
use crate::tools::{
    deleted, id_contract, to_body, Domain, IdArgs, Operation, OperationSet, PageArgs, ToolError,
    ToolHandler,
};

pub const LIST_VARIABLES: &str = "n8n_list_variables";
pub const CREATE_VARIABLE: &str = "n8n_create_variable";
pub const UPDATE_VARIABLE: &str = "n8n_update_variable";
pub const DELETE_VARIABLE: &str = "n8n_delete_variable";

#[derive(Debug, Serialize, Deserialize)]
struct VariableBody {
    key: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct UpdateVariableArgs {
    id: String,
    #[serde(flatten)]
    body: VariableBody,
}

fn key_value(contract: ShapeContract) -> ShapeContract {
    contract
        .field(Field::string("key").describe("Variable name"))
        .field(Field::string("value").describe("Variable value"))
}

fn operations() -> Result<Vec<Operation>, SchemaError> {
    [
        Operation::new(
            LIST_VARIABLES,
            Domain::Variable,
            "List variables",
            PageArgs::fields(ShapeContract::new()),
        ),
        Operation::new(
            CREATE_VARIABLE,
            Domain::Variable,
            "Create a new variable",
            key_value(ShapeContract::new()),
        ),
        Operation::new(
            UPDATE_VARIABLE,
            Domain::Variable,
            "Update a variable",
            key_value(id_contract("Variable ID")),
        ),
        Operation::new(
            DELETE_VARIABLE,
            Domain::Variable,
            "Delete a variable",
            id_contract("ID of the variable to delete"),
        ),
    ]
    .into_iter()
    .collect()
}

pub struct VariableTools {
    client: Arc<dyn ApiClient>,
    operations: OperationSet,
}

impl VariableTools {
    pub fn new(client: Arc<dyn ApiClient>) -> Result<Self, ToolError> {
        Ok(Self {
            client,
            operations: OperationSet::new(Domain::Variable, operations()?),
        })
    }
}

#[async_trait]
impl ToolHandler for VariableTools {
    fn domain(&self) -> Domain {
        Domain::Variable
    }

    fn operations(&self) -> &[Operation] {
        self.operations.as_slice()
    }

    async fn handle(&self, name: &str, args: &JsonObject) -> Result<Value, ToolError> {
        let request = match name {
            LIST_VARIABLES => {
                let page: PageArgs = self.operations.parse(name, args)?;
                page.apply(ApiRequest::get("/variables"))
            }
            CREATE_VARIABLE => {
                let body: VariableBody = self.operations.parse(name, args)?;
                ApiRequest::post("/variables").with_body(to_body(&body)?)
            }
            UPDATE_VARIABLE => {
                let UpdateVariableArgs { id, body } = self.operations.parse(name, args)?;
                ApiRequest::put(resource_path("variables", &id, "")).with_body(to_body(&body)?)
            }
            DELETE_VARIABLE => {
                let IdArgs { id } = self.operations.parse(name, args)?;
                self.client
                    .send(ApiRequest::delete(resource_path("variables", &id, "")))
                    .await?;
                return Ok(deleted("Variable", &id));
            }
            _ => return Err(self.operations.unknown(name)),
        };

        Ok(self.client.send(request).await?)
    }
}
