//! Credential tools.
//!
//! Credential secrets are write-only on the remote side: listing never
//! returns the `data` that was supplied at creation.

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

pub const LIST_CREDENTIALS: &str = "n8n_list_credentials";
pub const CREATE_CREDENTIAL: &str = "n8n_create_credential";
pub const DELETE_CREDENTIAL: &str = "n8n_delete_credential";

#[derive(Debug, Serialize, Deserialize)]
struct NewCredential {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    data: JsonObject,
}

fn operations() -> Result<Vec<Operation>, SchemaError> {
    [
        Operation::new(
            LIST_CREDENTIALS,
            Domain::Credential,
            "List credentials (secret data is never included)",
            PageArgs::fields(ShapeContract::new()),
        ),
        Operation::new(
            CREATE_CREDENTIAL,
            Domain::Credential,
            "Create a new credential",
            ShapeContract::new()
                .field(Field::string("name").describe("Credential name"))
                .field(Field::string("type").describe("Credential type, e.g. githubApi"))
                .field(Field::object("data").describe("Credential data for the given type")),
        ),
        Operation::new(
            DELETE_CREDENTIAL,
            Domain::Credential,
            "Delete a credential",
            id_contract("ID of the credential to delete"),
        ),
    ]
    .into_iter()
    .collect()
}

pub struct CredentialTools {
    client: Arc<dyn ApiClient>,
    operations: OperationSet,
}

impl CredentialTools {
    pub fn new(client: Arc<dyn ApiClient>) -> Result<Self, ToolError> {
        Ok(Self {
            client,
            operations: OperationSet::new(Domain::Credential, operations()?),
        })
    }
}

#[async_trait]
impl ToolHandler for CredentialTools {
    fn domain(&self) -> Domain {
        Domain::Credential
    }

    fn operations(&self) -> &[Operation] {
        self.operations.as_slice()
    }

    async fn handle(&self, name: &str, args: &JsonObject) -> Result<Value, ToolError> {
        let request = match name {
            LIST_CREDENTIALS => {
                let page: PageArgs = self.operations.parse(name, args)?;
                page.apply(ApiRequest::get("/credentials"))
            }
            CREATE_CREDENTIAL => {
                let credential: NewCredential = self.operations.parse(name, args)?;
                ApiRequest::post("/credentials").with_body(to_body(&credential)?)
            }
            DELETE_CREDENTIAL => {
                let IdArgs { id } = self.operations.parse(name, args)?;
                self.client
                    .send(ApiRequest::delete(resource_path("credentials", &id, "")))
                    .await?;
                return Ok(deleted("Credential", &id));
            }
            _ => return Err(self.operations.unknown(name)),
        };

        Ok(self.client.send(request).await?)
    }
}
