use serde::Serialize;
use serde_json::Value;

use super::to_result;
use crate::error::ToolError;
use crate::protocol::{JsonRpcError, ToolCallParams, ToolInfo, ToolResult};
use crate::server::ServerState;

#[derive(Debug, Serialize)]
struct ListToolsResponse {
    tools: Vec<ToolInfo>,
}

/// Handle `tools/list`.
pub fn list(state: &ServerState) -> Result<Value, JsonRpcError> {
    to_result(&ListToolsResponse {
        tools: state.registry.list_all(),
    })
}

/// Handle `tools/call`.
///
/// `name` and `arguments` are both required and checked before the tool is
/// looked up, so a call without arguments is invalid params even when the
/// tool does not exist.
pub async fn call(params: Option<&Value>, state: &ServerState) -> Result<Value, JsonRpcError> {
    let params: ToolCallParams = match params {
        Some(v) => serde_json::from_value(v.clone())
            .map_err(|e| JsonRpcError::invalid_params(format!("Invalid tools/call params: {e}")))?,
        None => return Err(JsonRpcError::invalid_params("Missing params for tools/call")),
    };

    let name = match params.name {
        Some(Value::String(name)) => name,
        Some(_) => return Err(JsonRpcError::invalid_params("Tool name must be a string")),
        None => return Err(JsonRpcError::invalid_params("Missing tool name for tools/call")),
    };

    let arguments = match params.arguments {
        Some(Value::Object(arguments)) => arguments,
        Some(_) => {
            return Err(JsonRpcError::invalid_params(format!(
                "Arguments for {name} must be an object"
            )))
        }
        None => {
            return Err(JsonRpcError::invalid_params(format!(
                "Missing arguments for {name}"
            )))
        }
    };

    let tool = state
        .registry
        .lookup(&name)
        .ok_or_else(|| JsonRpcError::from(ToolError::method_not_found(format!("Unknown tool: {name}"))))?;

    tracing::debug!(tool = %name, "invoking tool");

    let outcome = match state.config.tool_timeout {
        Some(limit) => match tokio::time::timeout(limit, tool.invoke(arguments)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ToolError::internal(format!(
                "Tool {name} timed out after {limit:?}"
            ))),
        },
        None => tool.invoke(arguments).await,
    };

    let output = outcome.map_err(JsonRpcError::from)?;
    to_result(&ToolResult::text(output))
}
