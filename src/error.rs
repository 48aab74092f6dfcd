use serde_json::{json, Value};

use crate::protocol::JsonRpcError;

/// JSON-RPC 2.0 codes the server emits, plus its resource code.
pub mod codes {
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
    pub const RESOURCE_NOT_FOUND: i32 = -32002;
}

/// Failure raised while binding or running a tool.
///
/// `Protocol` errors carry their own code and reach the caller unchanged.
/// Anything else is an unexpected failure and is reported as an internal
/// error with only its message text.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ToolError {
    #[error("{message}")]
    Protocol {
        code: i32,
        message: String,
        data: Option<Value>,
    },
    #[error("{0}")]
    Failed(String),
}

impl ToolError {
    pub fn protocol(code: i32, message: impl Into<String>) -> Self {
        Self::Protocol {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(self, data: Value) -> Self {
        match self {
            Self::Protocol { code, message, .. } => Self::Protocol {
                code,
                message,
                data: Some(data),
            },
            other => other,
        }
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::protocol(codes::INVALID_PARAMS, message)
    }

    pub fn method_not_found(message: impl Into<String>) -> Self {
        Self::protocol(codes::METHOD_NOT_FOUND, message)
    }

    pub fn resource_not_found(uri: &str) -> Self {
        Self::protocol(codes::RESOURCE_NOT_FOUND, format!("Resource not found: {uri}"))
            .with_data(json!({ "uri": uri }))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// A required parameter had neither an argument, a default, nor a nullable type.
    pub fn missing_parameter(name: &str) -> Self {
        Self::invalid_params(format!("Missing required parameter '{name}'"))
            .with_data(json!({ "parameter": name }))
    }

    /// An argument was present but could not be decoded into the declared type.
    pub fn invalid_argument(name: &str, err: &serde_json::Error) -> Self {
        Self::invalid_params(format!("Invalid value for parameter '{name}': {err}"))
            .with_data(json!({ "parameter": name, "error": err.to_string() }))
    }

    /// JSON-RPC code this failure maps to.
    pub fn code(&self) -> i32 {
        match self {
            Self::Protocol { code, .. } => *code,
            Self::Failed(_) => codes::INTERNAL_ERROR,
        }
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        Self::Failed(err.to_string())
    }
}

impl From<std::io::Error> for ToolError {
    fn from(err: std::io::Error) -> Self {
        Self::Failed(err.to_string())
    }
}

impl From<String> for ToolError {
    fn from(message: String) -> Self {
        Self::Failed(message)
    }
}

impl From<&str> for ToolError {
    fn from(message: &str) -> Self {
        Self::Failed(message.to_string())
    }
}

impl From<ToolError> for JsonRpcError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::Protocol {
                code,
                message,
                data,
            } => Self {
                code,
                message,
                data,
            },
            ToolError::Failed(message) => Self::internal_error(message),
        }
    }
}

/// Problems detected while building the tool table at startup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("tool '{tool}' declares {declared} parameters but its function takes {expected}")]
    ArityMismatch {
        tool: String,
        declared: usize,
        expected: usize,
    },
    #[error("tool '{tool}' declares parameter '{parameter}' more than once")]
    DuplicateParameter { tool: String, parameter: String },
}

/// Fatal session errors. Everything request-scoped is turned into a response instead.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to write response: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Invalid environment configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got '{value}'")]
    NotPositiveInteger { var: &'static str, value: String },
    #[error("{var} must not be empty")]
    Empty { var: &'static str },
}
