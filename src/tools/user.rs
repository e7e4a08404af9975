//! User tools.

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

pub const LIST_USERS: &str = "n8n_list_users";
pub const GET_USER: &str = "n8n_get_user";
pub const CREATE_USER: &str = "n8n_create_user";
pub const DELETE_USER: &str = "n8n_delete_user";
pub const UPDATE_USER_ROLE: &str = "n8n_update_user_role";

#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewUser {
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
    role: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpdateRoleArgs {
    id: String,
    role: String,
}

fn operations() -> Result<Vec<Operation>, SchemaError> {
    [
        Operation::new(
            LIST_USERS,
            Domain::User,
            "List users",
            PageArgs::fields(ShapeContract::new()),
        ),
        Operation::new(
            GET_USER,
            Domain::User,
            "Get a user by ID or email",
            id_contract("User ID or email address"),
        ),
        Operation::new(
            CREATE_USER,
            Domain::User,
            "Invite a new user",
            ShapeContract::new()
                .field(Field::string("email").email().describe("User email address"))
                .field(Field::string("firstName").optional().describe("First name"))
                .field(Field::string("lastName").optional().describe("Last name"))
                .field(
                    Field::string("role")
                        .optional()
                        .describe("Global role, e.g. global:member"),
                ),
        ),
        Operation::new(
            DELETE_USER,
            Domain::User,
            "Delete a user",
            id_contract("ID of the user to delete"),
        ),
        Operation::new(
            UPDATE_USER_ROLE,
            Domain::User,
            "Change a user's global role",
            id_contract("User ID")
                .field(Field::string("role").describe("New global role, e.g. global:admin")),
        ),
    ]
    .into_iter()
    .collect()
}

pub struct UserTools {
    client: Arc<dyn ApiClient>,
    operations: OperationSet,
}

impl UserTools {
    pub fn new(client: Arc<dyn ApiClient>) -> Result<Self, ToolError> {
        Ok(Self {
            client,
            operations: OperationSet::new(Domain::User, operations()?),
        })
    }
}

#[async_trait]
impl ToolHandler for UserTools {
    fn domain(&self) -> Domain {
        Domain::User
    }

    fn operations(&self) -> &[Operation] {
        self.operations.as_slice()
    }

    async fn handle(&self, name: &str, args: &JsonObject) -> Result<Value, ToolError> {
        let request = match name {
            LIST_USERS => {
                let page: PageArgs = self.operations.parse(name, args)?;
                page.apply(ApiRequest::get("/users"))
            }
            GET_USER => {
                let IdArgs { id } = self.operations.parse(name, args)?;
                ApiRequest::get(resource_path("users", &id, ""))
            }
            CREATE_USER => {
                let user: NewUser = self.operations.parse(name, args)?;
                ApiRequest::post("/users").with_body(to_body(&user)?)
            }
            DELETE_USER => {
                let IdArgs { id } = self.operations.parse(name, args)?;
                self.client
                    .send(ApiRequest::delete(resource_path("users", &id, "")))
                    .await?;
                return Ok(deleted("User", &id));
            }
            UPDATE_USER_ROLE => {
                let UpdateRoleArgs { id, role } = self.operations.parse(name, args)?;
                // The remote field is newRoleName, not role.
                ApiRequest::patch(resource_path("users", &id, "/role"))
                    .with_body(json!({ "newRoleName": role }))
            }
            _ => return Err(self.operations.unknown(name)),
        };

        Ok(self.client.send(request).await?)
    }
}
