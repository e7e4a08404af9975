//! Workflow tools.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use serde_with::skip_serializing_none;

use crate::client::{resource_path, ApiClient, ApiRequest};
use crate::shape::{Field, JsonObject, SchemaError, ShapeContract};
use crate::tools::{
    deleted, id_contract, to_body, Domain, IdArgs, Operation, OperationSet, PageArgs, ToolError,
    ToolHandler,
};

pub const LIST_WORKFLOWS: &str = "n8n_list_workflows";
pub const GET_WORKFLOW: &str = "n8n_get_workflow";
pub const CREATE_WORKFLOW: &str = "n8n_create_workflow";
pub const UPDATE_WORKFLOW: &str = "n8n_update_workflow";
pub const DELETE_WORKFLOW: &str = "n8n_delete_workflow";
pub const ACTIVATE_WORKFLOW: &str = "n8n_activate_workflow";
pub const DEACTIVATE_WORKFLOW: &str = "n8n_deactivate_workflow";
pub const EXECUTE_WORKFLOW: &str = "n8n_execute_workflow";
pub const GET_WORKFLOW_TAGS: &str = "n8n_get_workflow_tags";
pub const UPDATE_WORKFLOW_TAGS: &str = "n8n_update_workflow_tags";

#[derive(Debug, Deserialize)]
struct ListWorkflowsArgs {
    active: Option<bool>,
    tags: Option<String>,
    #[serde(flatten)]
    page: PageArgs,
}

/// Editable workflow fields. Absent fields are left out of the body.
#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize)]
struct WorkflowFields {
    name: Option<String>,
    nodes: Option<Vec<Value>>,
    connections: Option<JsonObject>,
    settings: Option<JsonObject>,
}

#[derive(Debug, Deserialize)]
struct UpdateWorkflowArgs {
    id: String,
    #[serde(flatten)]
    fields: WorkflowFields,
}

#[derive(Debug, Deserialize)]
struct ExecuteWorkflowArgs {
    id: String,
    data: Option<JsonObject>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateWorkflowTagsArgs {
    id: String,
    tag_ids: Vec<String>,
}

fn workflow_fields(contract: ShapeContract, name: Field) -> ShapeContract {
    contract
        .field(name)
        .field(
            Field::object_array("nodes")
                .optional()
                .describe("Node definitions"),
        )
        .field(
            Field::object("connections")
                .optional()
                .describe("Connections between nodes, keyed by source node name"),
        )
        .field(
            Field::object("settings")
                .optional()
                .describe("Workflow settings"),
        )
}

fn operations() -> Result<Vec<Operation>, SchemaError> {
    [
        Operation::new(
            LIST_WORKFLOWS,
            Domain::Workflow,
            "List n8n workflows, one page at a time",
            PageArgs::fields(
                ShapeContract::new()
                    .field(
                        Field::boolean("active")
                            .optional()
                            .describe("Filter by activation state"),
                    )
                    .field(
                        Field::string("tags")
                            .optional()
                            .describe("Filter by tag names (comma separated)"),
                    ),
            ),
        ),
        Operation::new(
            GET_WORKFLOW,
            Domain::Workflow,
            "Get the full definition of a workflow",
            id_contract("Workflow ID"),
        ),
        Operation::new(
            CREATE_WORKFLOW,
            Domain::Workflow,
            "Create a new n8n workflow",
            workflow_fields(
                ShapeContract::new(),
                Field::string("name").describe("Workflow name"),
            ),
        ),
        Operation::new(
            UPDATE_WORKFLOW,
            Domain::Workflow,
            "Update an existing n8n workflow",
            workflow_fields(
                id_contract("Workflow ID"),
                Field::string("name")
                    .optional()
                    .describe("New workflow name"),
            ),
        ),
        Operation::new(
            DELETE_WORKFLOW,
            Domain::Workflow,
            "Delete an n8n workflow",
            id_contract("ID of the workflow to delete"),
        ),
        Operation::new(
            ACTIVATE_WORKFLOW,
            Domain::Workflow,
            "Activate an n8n workflow",
            id_contract("ID of the workflow to activate"),
        ),
        Operation::new(
            DEACTIVATE_WORKFLOW,
            Domain::Workflow,
            "Deactivate an n8n workflow",
            id_contract("ID of the workflow to deactivate"),
        ),
        Operation::new(
            EXECUTE_WORKFLOW,
            Domain::Workflow,
            "Execute a workflow through its webhook trigger (requires a Webhook node)",
            id_contract("Webhook path of the workflow to execute").field(
                Field::object("data")
                    .optional()
                    .describe("Payload passed to the workflow"),
            ),
        ),
        Operation::new(
            GET_WORKFLOW_TAGS,
            Domain::Workflow,
            "Get the tags attached to a workflow",
            id_contract("Workflow ID"),
        ),
        Operation::new(
            UPDATE_WORKFLOW_TAGS,
            Domain::Workflow,
            "Replace the tags attached to a workflow",
            id_contract("Workflow ID")
                .field(Field::string_array("tagIds").describe("Tag IDs to attach")),
        ),
    ]
    .into_iter()
    .collect()
}

fn path(id: &str, suffix: &str) -> String {
    resource_path("workflows", id, suffix)
}

pub struct WorkflowTools {
    client: Arc<dyn ApiClient>,
    operations: OperationSet,
}

impl WorkflowTools {
    pub fn new(client: Arc<dyn ApiClient>) -> Result<Self, ToolError> {
        Ok(Self {
            client,
            operations: OperationSet::new(Domain::Workflow, operations()?),
        })
    }
}

#[async_trait]
impl ToolHandler for WorkflowTools {
    fn domain(&self) -> Domain {
        Domain::Workflow
    }

    fn operations(&self) -> &[Operation] {
        self.operations.as_slice()
    }

    async fn handle(&self, name: &str, args: &JsonObject) -> Result<Value, ToolError> {
        let request = match name {
            LIST_WORKFLOWS => {
                let args: ListWorkflowsArgs = self.operations.parse(name, args)?;
                let request = ApiRequest::get("/workflows")
                    .with_query("active", args.active)
                    .with_query("tags", args.tags);
                args.page.apply(request)
            }
            GET_WORKFLOW => {
                let IdArgs { id } = self.operations.parse(name, args)?;
                ApiRequest::get(path(&id, ""))
            }
            CREATE_WORKFLOW => {
                let fields: WorkflowFields = self.operations.parse(name, args)?;
                ApiRequest::post("/workflows").with_body(to_body(&fields)?)
            }
            UPDATE_WORKFLOW => {
                // The ID only addresses the workflow; it never goes into the body.
                let UpdateWorkflowArgs { id, fields } = self.operations.parse(name, args)?;
                ApiRequest::put(path(&id, "")).with_body(to_body(&fields)?)
            }
            DELETE_WORKFLOW => {
                let IdArgs { id } = self.operations.parse(name, args)?;
                self.client.send(ApiRequest::delete(path(&id, ""))).await?;
                return Ok(deleted("Workflow", &id));
            }
            ACTIVATE_WORKFLOW => {
                let IdArgs { id } = self.operations.parse(name, args)?;
                ApiRequest::post(path(&id, "/activate"))
            }
            DEACTIVATE_WORKFLOW => {
                let IdArgs { id } = self.operations.parse(name, args)?;
                ApiRequest::post(path(&id, "/deactivate"))
            }
            EXECUTE_WORKFLOW => {
                let args: ExecuteWorkflowArgs = self.operations.parse(name, args)?;
                let payload = args.data.map(Value::Object);
                return Ok(self.client.trigger_webhook(&args.id, payload).await?);
            }
            GET_WORKFLOW_TAGS => {
                let IdArgs { id } = self.operations.parse(name, args)?;
                ApiRequest::get(path(&id, "/tags"))
            }
            UPDATE_WORKFLOW_TAGS => {
                let args: UpdateWorkflowTagsArgs = self.operations.parse(name, args)?;
                // The endpoint takes tag references, not bare IDs.
                let tags = args
                    .tag_ids
                    .into_iter()
                    .map(|id| json!({ "id": id }))
                    .collect();
                ApiRequest::put(path(&args.id, "/tags")).with_body(Value::Array(tags))
            }
            _ => return Err(self.operations.unknown(name)),
        };

        Ok(self.client.send(request).await?)
    }
}
