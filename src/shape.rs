//! Declarative argument shapes for tool calls.
//!
//! A [`ShapeContract`] lists the fields a tool accepts and emits the JSON
//! schema advertised in the catalog. [`ShapeContract::compile`] turns that
//! schema into a [`CompiledShape`], which validates raw argument bags with
//! `jsonschema` and maps every schema violation back onto the field it
//! concerns.
//!
//! Rules applied by every contract:
//! - Unknown fields are ignored and dropped from the normalized output.
//! - Missing required fields fail; missing optional fields stay absent.
//! - Types are never coerced, and `null` is not a substitute for absence.
//! - Formats are checked only where declared.

use std::fmt;
use std::sync::Arc;

use itertools::Itertools;
use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, Validator};
use nonempty::NonEmpty;
use schemars::schema::{
    ArrayValidation, InstanceType, Metadata, ObjectValidation, Schema, SchemaObject, SingleOrVec,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// JSON object as received from, and sent to, callers.
pub type JsonObject = Map<String, Value>;

/// Primitive kind of a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    /// Free-form JSON object.
    Object,
    StringArray,
    /// Array whose items are free-form JSON objects.
    ObjectArray,
}

impl FieldKind {
    fn schema(self) -> SchemaObject {
        let item = |instance: InstanceType| {
            Some(SingleOrVec::Single(Box::new(Schema::Object(SchemaObject {
                instance_type: Some(SingleOrVec::Single(Box::new(instance))),
                ..Default::default()
            }))))
        };

        let (instance, items) = match self {
            FieldKind::String => (InstanceType::String, None),
            FieldKind::Number => (InstanceType::Number, None),
            FieldKind::Boolean => (InstanceType::Boolean, None),
            FieldKind::Object => (InstanceType::Object, None),
            FieldKind::StringArray => (InstanceType::Array, item(InstanceType::String)),
            FieldKind::ObjectArray => (InstanceType::Array, item(InstanceType::Object)),
        };

        SchemaObject {
            instance_type: Some(SingleOrVec::Single(Box::new(instance))),
            array: items.map(|items| {
                Box::new(ArrayValidation {
                    items: Some(items),
                    ..Default::default()
                })
            }),
            ..Default::default()
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Object => "object",
            FieldKind::StringArray => "array of strings",
            FieldKind::ObjectArray => "array of objects",
        };
        f.write_str(name)
    }
}

/// Extra constraint on a string field, emitted as the schema `format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    Email,
}

impl Format {
    fn as_str(self) -> &'static str {
        match self {
            Format::Email => "email",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared field of a contract.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub format: Option<Format>,
    pub description: &'static str,
}

impl Field {
    /// A required field of the given kind.
    pub fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            format: None,
            description: "",
        }
    }

    pub fn string(name: &'static str) -> Self {
        Self::new(name, FieldKind::String)
    }

    pub fn number(name: &'static str) -> Self {
        Self::new(name, FieldKind::Number)
    }

    pub fn boolean(name: &'static str) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    pub fn object(name: &'static str) -> Self {
        Self::new(name, FieldKind::Object)
    }

    pub fn string_array(name: &'static str) -> Self {
        Self::new(name, FieldKind::StringArray)
    }

    pub fn object_array(name: &'static str) -> Self {
        Self::new(name, FieldKind::ObjectArray)
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Require the string to be an email address.
    pub fn email(mut self) -> Self {
        self.format = Some(Format::Email);
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    fn schema(&self) -> Schema {
        let mut schema = self.kind.schema();
        schema.format = self.format.map(|f| f.as_str().to_string());
        if !self.description.is_empty() {
            schema.metadata = Some(Box::new(Metadata {
                description: Some(self.description.to_string()),
                ..Default::default()
            }));
        }
        Schema::Object(schema)
    }

    /// Translate one schema violation located at this field.
    fn problem(&self, error: &jsonschema::ValidationError<'_>) -> Problem {
        match &error.kind {
            ValidationErrorKind::Required { .. } => Problem::Missing {
                expected: self.kind,
            },
            ValidationErrorKind::Type { .. } => Problem::WrongType {
                expected: self.kind,
                found: json_type(&error.instance),
            },
            ValidationErrorKind::Format { .. } => match self.format {
                Some(format) => Problem::BadFormat { format },
                None => Problem::Malformed {
                    message: error.to_string(),
                },
            },
            _ => Problem::Malformed {
                message: error.to_string(),
            },
        }
    }
}

/// What went wrong with a single field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "problem", rename_all = "snake_case")]
pub enum Problem {
    Missing { expected: FieldKind },
    WrongType { expected: FieldKind, found: &'static str },
    BadFormat { format: Format },
    Malformed { message: String },
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Problem::Missing { expected } => write!(f, "required {expected} is missing"),
            Problem::WrongType { expected, found } => {
                write!(f, "expected {expected}, got {found}")
            }
            Problem::BadFormat { format } => write!(f, "must be a valid {format}"),
            Problem::Malformed { message } => f.write_str(message),
        }
    }
}

/// A problem attached to the field it concerns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldIssue {
    pub field: String,
    #[serde(flatten)]
    pub problem: Problem,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.problem)
    }
}

/// Raw arguments did not satisfy a contract. Always carries at least one issue.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Invalid arguments: {}", .issues.iter().join("; "))]
pub struct ValidationError {
    pub issues: NonEmpty<FieldIssue>,
}

impl ValidationError {
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.issues.iter().map(|issue| issue.field.as_str())
    }
}

/// A contract whose schema could not be turned into a validator.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Failed to serialize input schema: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Input schema is not a JSON object")]
    NotAnObject,

    #[error("Invalid input schema: {0}")]
    Compile(String),
}

/// Declared argument structure of one operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeContract {
    fields: Vec<Field>,
}

impl ShapeContract {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// JSON schema advertised in the tool catalog.
    pub fn input_schema(&self) -> Result<JsonObject, SchemaError> {
        let object = ObjectValidation {
            properties: self
                .fields
                .iter()
                .map(|field| (field.name.to_string(), field.schema()))
                .collect(),
            required: self
                .fields
                .iter()
                .filter(|field| field.required)
                .map(|field| field.name.to_string())
                .collect(),
            ..Default::default()
        };
        let schema = SchemaObject {
            instance_type: Some(SingleOrVec::Single(Box::new(InstanceType::Object))),
            object: Some(Box::new(object)),
            ..Default::default()
        };

        match serde_json::to_value(schema)? {
            Value::Object(map) => Ok(map),
            _ => Err(SchemaError::NotAnObject),
        }
    }

    /// Emit the schema once and compile it into a validator.
    pub fn compile(self) -> Result<CompiledShape, SchemaError> {
        let schema = self.input_schema()?;
        let validator = jsonschema::options()
            .with_draft(Draft::Draft202012)
            .should_validate_formats(true)
            .build(&Value::Object(schema.clone()))
            .map_err(|e| SchemaError::Compile(e.to_string()))?;

        Ok(CompiledShape {
            contract: self,
            schema: Arc::new(schema),
            validator: Arc::new(validator),
        })
    }

    fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    fn position(&self, name: &str) -> usize {
        self.fields
            .iter()
            .position(|field| field.name == name)
            .unwrap_or(usize::MAX)
    }
}

/// A contract together with its emitted schema and compiled validator.
#[derive(Clone)]
pub struct CompiledShape {
    contract: ShapeContract,
    schema: Arc<JsonObject>,
    validator: Arc<Validator>,
}

impl fmt::Debug for CompiledShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledShape")
            .field("contract", &self.contract)
            .finish_non_exhaustive()
    }
}

impl CompiledShape {
    pub fn contract(&self) -> &ShapeContract {
        &self.contract
    }

    pub fn fields(&self) -> &[Field] {
        self.contract.fields()
    }

    /// The schema the validator was compiled from.
    pub fn schema(&self) -> Arc<JsonObject> {
        self.schema.clone()
    }

    /// Check `args` against the compiled schema.
    ///
    /// On success returns only the declared fields that were present. On
    /// failure reports one issue per offending field, in declaration order.
    pub fn validate(&self, args: &JsonObject) -> Result<JsonObject, ValidationError> {
        let instance = Value::Object(args.clone());
        let mut issues: Vec<FieldIssue> = Vec::new();

        for error in self.validator.iter_errors(&instance) {
            let Some(field) = self.field_of(&error) else {
                continue;
            };
            if issues.iter().any(|issue| issue.field == field.name) {
                continue;
            }
            issues.push(FieldIssue {
                field: field.name.to_string(),
                problem: field.problem(&error),
            });
        }
        issues.sort_by_key(|issue| self.contract.position(&issue.field));

        if let Some(issues) = NonEmpty::from_vec(issues) {
            return Err(ValidationError { issues });
        }

        Ok(self
            .contract
            .fields
            .iter()
            .filter_map(|field| {
                args.get(field.name)
                    .map(|value| (field.name.to_string(), value.clone()))
            })
            .collect())
    }

    /// Validate, then deserialize the normalized fields into `T`.
    pub fn parse<T: DeserializeOwned>(&self, args: &JsonObject) -> Result<T, ValidationError> {
        let normalized = self.validate(args)?;
        serde_json::from_value(Value::Object(normalized)).map_err(|e| ValidationError {
            issues: NonEmpty::new(FieldIssue {
                field: "arguments".to_string(),
                problem: Problem::Malformed {
                    message: e.to_string(),
                },
            }),
        })
    }

    /// The declared field a violation belongs to.
    ///
    /// `required` violations sit at the root and name the property; all
    /// others carry the field as the first segment of the instance path.
    fn field_of(&self, error: &jsonschema::ValidationError<'_>) -> Option<&Field> {
        if let ValidationErrorKind::Required { property } = &error.kind {
            return property.as_str().and_then(|name| self.contract.get(name));
        }
        let path = error.instance_path.to_string();
        let name = path.trim_start_matches('/').split('/').next()?;
        self.contract.get(name)
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
