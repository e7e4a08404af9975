//! Tag tools.

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

pub const LIST_TAGS: &str = "n8n_list_tags";
pub const GET_TAG: &str = "n8n_get_tag";
pub const CREATE_TAG: &str = "n8n_create_tag";
pub const UPDATE_TAG: &str = "n8n_update_tag";
pub const DELETE_TAG: &str = "n8n_delete_tag";

#[derive(Debug, Deserialize)]
struct NameArgs {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RenameArgs {
    id: String,
    name: String,
}

fn operations() -> Result<Vec<Operation>, SchemaError> {
    [
        Operation::new(
            LIST_TAGS,
            Domain::Tag,
            "List tags",
            PageArgs::fields(ShapeContract::new()),
        ),
        Operation::new(GET_TAG, Domain::Tag, "Get a tag", id_contract("Tag ID")),
        Operation::new(
            CREATE_TAG,
            Domain::Tag,
            "Create a new tag",
            ShapeContract::new().field(Field::string("name").describe("Tag name")),
        ),
        Operation::new(
            UPDATE_TAG,
            Domain::Tag,
            "Rename a tag",
            id_contract("Tag ID").field(Field::string("name").describe("New tag name")),
        ),
        Operation::new(
            DELETE_TAG,
            Domain::Tag,
            "Delete a tag",
            id_contract("ID of the tag to delete"),
        ),
    ]
    .into_iter()
    .collect()
}

pub struct TagTools {
    client: Arc<dyn ApiClient>,
    operations: OperationSet,
}

impl TagTools {
    pub fn new(client: Arc<dyn ApiClient>) -> Result<Self, ToolError> {
        Ok(Self {
            client,
            operations: OperationSet::new(Domain::Tag, operations()?),
        })
    }
}

#[async_trait]
impl ToolHandler for TagTools {
    fn domain(&self) -> Domain {
        Domain::Tag
    }

    fn operations(&self) -> &[Operation] {
        self.operations.as_slice()
    }

    async fn handle(&self, name: &str, args: &JsonObject) -> Result<Value, ToolError> {
        let request = match name {
            LIST_TAGS => {
                let page: PageArgs = self.operations.parse(name, args)?;
                page.apply(ApiRequest::get("/tags"))
            }
            GET_TAG => {
                let IdArgs { id } = self.operations.parse(name, args)?;
                ApiRequest::get(resource_path("tags", &id, ""))
            }
            CREATE_TAG => {
                let NameArgs { name: tag_name } = self.operations.parse(name, args)?;
                ApiRequest::post("/tags").with_body(json!({ "name": tag_name }))
            }
            UPDATE_TAG => {
                let RenameArgs { id, name: tag_name } = self.operations.parse(name, args)?;
                ApiRequest::put(resource_path("tags", &id, ""))
                    .with_body(json!({ "name": tag_name }))
            }
            DELETE_TAG => {
                let IdArgs { id } = self.operations.parse(name, args)?;
                self.client
                    .send(ApiRequest::delete(resource_path("tags", &id, "")))
                    .await?;
                return Ok(deleted("Tag", &id));
            }
            _ => return Err(self.operations.unknown(name)),
        };

        Ok(self.client.send(request).await?)
    }
}
