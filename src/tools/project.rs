//! Project tools. Projects require an enterprise license on the n8n instance.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::client::{resource_path, ApiClient, ApiRequest};
use crate::shape::{Field, JsonObject, SchemaError, ShapeContract};
use crate::tools::{
    deleted, id_contract, Domain, IdArgs, Operation, OperationSet, PageArgs, ToolError,
    ToolHandler,
};

pub const LIST_PROJECTS: &str = "n8n_list_projects";
pub const CREATE_PROJECT: &str = "n8n_create_project";
pub const UPDATE_PROJECT: &str = "n8n_update_project";
pub const DELETE_PROJECT: &str = "n8n_delete_project";

#[derive(Debug, Deserialize)]
struct CreateProjectArgs {
    name: String,
}

#[derive(Debug, Deserialize)]
struct UpdateProjectArgs {
    id: String,
    name: String,
}

fn operations() -> Result<Vec<Operation>, SchemaError> {
    [
        Operation::new(
            LIST_PROJECTS,
            Domain::Project,
            "List projects (enterprise license required)",
            PageArgs::fields(ShapeContract::new()),
        ),
        Operation::new(
            CREATE_PROJECT,
            Domain::Project,
            "Create a new project (enterprise license required)",
            ShapeContract::new().field(Field::string("name").describe("Project name")),
        ),
        Operation::new(
            UPDATE_PROJECT,
            Domain::Project,
            "Rename a project (enterprise license required)",
            id_contract("Project ID").field(Field::string("name").describe("New project name")),
        ),
        Operation::new(
            DELETE_PROJECT,
            Domain::Project,
            "Delete a project (enterprise license required)",
            id_contract("ID of the project to delete"),
        ),
    ]
    .into_iter()
    .collect()
}

pub struct ProjectTools {
    client: Arc<dyn ApiClient>,
    operations: OperationSet,
}

impl ProjectTools {
    pub fn new(client: Arc<dyn ApiClient>) -> Result<Self, ToolError> {
        Ok(Self {
            client,
            operations: OperationSet::new(Domain::Project, operations()?),
        })
    }
}

#[async_trait]
impl ToolHandler for ProjectTools {
    fn domain(&self) -> Domain {
        Domain::Project
    }

    fn operations(&self) -> &[Operation] {
        self.operations.as_slice()
    }

    async fn handle(&self, name: &str, args: &JsonObject) -> Result<Value, ToolError> {
        let request = match name {
            LIST_PROJECTS => {
                let page: PageArgs = self.operations.parse(name, args)?;
                page.apply(ApiRequest::get("/projects"))
            }
            CREATE_PROJECT => {
                let args: CreateProjectArgs = self.operations.parse(name, args)?;
                ApiRequest::post("/projects").with_body(json!({ "name": args.name }))
            }
            UPDATE_PROJECT => {
                let args: UpdateProjectArgs = self.operations.parse(name, args)?;
                ApiRequest::put(resource_path("projects", &args.id, ""))
                    .with_body(json!({ "name": args.name }))
            }
            DELETE_PROJECT => {
                let IdArgs { id } = self.operations.parse(name, args)?;
                self.client
                    .send(ApiRequest::delete(resource_path("projects", &id, "")))
                    .await?;
                return Ok(deleted("Project", &id));
            }
            _ => return Err(self.operations.unknown(name)),
        };

        Ok(self.client.send(request).await?)
    }
}
