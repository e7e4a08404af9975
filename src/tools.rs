//! Tool descriptors, the per-domain handler trait, and tool errors.

use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Number, Value};
use thiserror::Error;

use crate::client::{ApiRequest, ClientError};
use crate::shape::{CompiledShape, Field, JsonObject, SchemaError, ShapeContract, ValidationError};

/// Errors surfaced by a tool invocation.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A handler was asked for a name outside its own list.
    #[error("Unknown {domain} tool: {name}")]
    UnknownOperation { domain: Domain, name: String },

    /// No handler owns the name.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error(transparent)]
    Client(#[from] ClientError),

    /// A contract could not be compiled. Only raised while building the catalog.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Tool call cancelled")]
    Cancelled,

    /// Two descriptors share a name. Only raised while building the catalog.
    #[error("Duplicate tool name: {0}")]
    DuplicateName(String),
}

/// Resource domain owning a group of operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Workflow,
    Execution,
    Credential,
    User,
    Tag,
    Variable,
    Project,
    Audit,
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Domain::Workflow => "workflow",
            Domain::Execution => "execution",
            Domain::Credential => "credential",
            Domain::User => "user",
            Domain::Tag => "tag",
            Domain::Variable => "variable",
            Domain::Project => "project",
            Domain::Audit => "audit",
        };
        f.write_str(name)
    }
}

/// Static description of one callable tool.
#[derive(Debug, Clone)]
pub struct Operation {
    /// Globally unique tool name.
    pub name: &'static str,
    pub domain: Domain,
    pub description: &'static str,
    pub shape: CompiledShape,
}

impl Operation {
    /// Describe a tool, compiling its contract into a validator.
    pub fn new(
        name: &'static str,
        domain: Domain,
        description: &'static str,
        contract: ShapeContract,
    ) -> Result<Self, SchemaError> {
        Ok(Self {
            name,
            domain,
            description,
            shape: contract.compile()?,
        })
    }
}

/// The operations owned by one handler, with their contracts.
#[derive(Debug, Clone)]
pub struct OperationSet {
    domain: Domain,
    operations: Vec<Operation>,
}

impl OperationSet {
    pub fn new(domain: Domain, operations: Vec<Operation>) -> Self {
        Self { domain, operations }
    }

    pub fn as_slice(&self) -> &[Operation] {
        &self.operations
    }

    /// Validate `args` against the contract of `name` and deserialize them.
    pub fn parse<T: DeserializeOwned>(&self, name: &str, args: &JsonObject) -> Result<T, ToolError> {
        let operation = self
            .operations
            .iter()
            .find(|op| op.name == name)
            .ok_or_else(|| self.unknown(name))?;
        Ok(operation.shape.parse(args)?)
    }

    pub fn unknown(&self, name: &str) -> ToolError {
        ToolError::UnknownOperation {
            domain: self.domain,
            name: name.to_string(),
        }
    }
}

/// Handler for all operations of one domain.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn domain(&self) -> Domain;

    /// Descriptors of every operation this handler accepts.
    fn operations(&self) -> &[Operation];

    /// Validate `args` for `name`, perform the remote call(s) and shape the result.
    ///
    /// Names are matched exactly; anything else is [`ToolError::UnknownOperation`].
    async fn handle(&self, name: &str, args: &JsonObject) -> Result<Value, ToolError>;
}

/// Arguments of operations that address a single resource.
#[derive(Debug, Deserialize)]
pub struct IdArgs {
    pub id: String,
}

/// Contract with a single required `id`.
pub fn id_contract(description: &'static str) -> ShapeContract {
    ShapeContract::new().field(Field::string("id").describe(description))
}

/// Optional paging arguments shared by list operations.
#[derive(Debug, Deserialize)]
pub struct PageArgs {
    pub cursor: Option<String>,
    pub limit: Option<Number>,
}

impl PageArgs {
    /// Add the `cursor` and `limit` fields to a list contract.
    pub fn fields(contract: ShapeContract) -> ShapeContract {
        contract
            .field(
                Field::string("cursor")
                    .optional()
                    .describe("Pagination cursor returned as nextCursor by the previous page"),
            )
            .field(
                Field::number("limit")
                    .optional()
                    .describe("Maximum number of items to return"),
            )
    }

    /// Forward whichever paging values were given as query parameters.
    pub fn apply(self, request: ApiRequest) -> ApiRequest {
        request
            .with_query("cursor", self.cursor)
            .with_query("limit", self.limit.as_ref().map(integral_text))
    }
}

/// `10.0` and `10` both mean ten items; the API only accepts the latter.
fn integral_text(number: &Number) -> String {
    if number.is_f64() {
        if let Some(value) = number.as_f64().filter(|v| v.fract() == 0.0 && v.abs() < 1e15) {
            return format!("{value:.0}");
        }
    }
    number.to_string()
}

/// Serialize a typed request body.
pub fn to_body<T: Serialize>(value: &T) -> Result<Value, ToolError> {
    serde_json::to_value(value).map_err(|e| ToolError::Client(ClientError::Parse(e)))
}

/// Confirmation returned by delete operations, whose remote call has no body.
pub fn deleted(what: &str, id: &str) -> Value {
    json!({
        "success": true,
        "message": format!("{what} {id} deleted"),
    })
}

pub mod audit;
pub mod credential;
pub mod execution;
pub mod project;
pub mod tag;
pub mod user;
pub mod variable;
pub mod workflow;

pub use audit::AuditTools;
pub use credential::CredentialTools;
pub use execution::ExecutionTools;
pub use project::ProjectTools;
pub use tag::TagTools;
pub use user::UserTools;
pub use variable::VariableTools;
pub use workflow::WorkflowTools;
