//! Task request validation.
//!
//! The body is checked structurally before anything is extracted from it so
//! each kind of malformed input maps to its own error variant.

use serde_json::Value;
use thiserror::Error;

/// Key holding the encoder arguments.
pub const COMMAND_KEY: &str = "command";

/// A validated task request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRequest {
    /// Argument string passed to the encoder
    pub command: String,
}

/// Ways a task request body can be malformed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskRequestError {
    #[error("body is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("body must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("missing key 'command'")]
    MissingCommand,

    #[error("'command' must be a string, got {0}")]
    CommandNotString(&'static str),

    #[error("'command' cannot be split into arguments: {0}")]
    InvalidArguments(String),
}

impl TaskRequestError {
    /// Short tag naming the violated constraint.
    pub fn kind(&self) -> &'static str {
        match self {
            TaskRequestError::InvalidJson(_) => "InvalidJson",
            TaskRequestError::NotAnObject(_) | TaskRequestError::CommandNotString(_) => {
                "TypeMismatch"
            }
            TaskRequestError::MissingCommand => "MissingKey",
            TaskRequestError::InvalidArguments(_) => "InvalidArguments",
        }
    }
}

impl TaskRequest {
    /// Decode and validate a raw request body.
    pub fn from_body(body: &[u8]) -> Result<Self, TaskRequestError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| TaskRequestError::InvalidJson(e.to_string()))?;

        let mut fields = match value {
            Value::Object(fields) => fields,
            other => return Err(TaskRequestError::NotAnObject(json_type(&other))),
        };

        match fields.remove(COMMAND_KEY) {
            None => Err(TaskRequestError::MissingCommand),
            Some(Value::String(command)) => Ok(Self { command }),
            Some(other) => Err(TaskRequestError::CommandNotString(json_type(&other))),
        }
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
