pub mod resources;
pub mod tools;

use serde::Serialize;

use crate::error::codes;
use crate::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, NOTIFICATION_PREFIX, PROTOCOL_VERSION};
use crate::server::ServerState;

/// Dispatch a JSON-RPC request to the appropriate handler.
///
/// Returns `None` when there is nothing to send back: the `initialized`
/// notification and unknown `notifications/*` methods. Every other
/// message gets a response, even when it carried no `id`.
pub async fn dispatch(req: &JsonRpcRequest, state: &ServerState) -> Option<JsonRpcResponse> {
    tracing::debug!(
        method = %req.method,
        id = ?req.id,
        notification = req.is_notification(),
        "dispatching request"
    );

    let outcome = match req.method.as_str() {
        "initialize" => Ok(initialize_result(state)),

        "initialized" | "notifications/initialized" => return None,

        "ping" => Ok(serde_json::json!({})),

        "tools/list" => tools::list(state),

        "tools/call" => tools::call(req.params.as_ref(), state).await,

        "resources/list" => resources::list(state).await,

        "resources/read" => resources::read(req.params.as_ref(), state).await,

        method if method.starts_with(NOTIFICATION_PREFIX) => {
            tracing::debug!(method, "ignoring unknown notification");
            return None;
        }

        method => Err(JsonRpcError::method_not_found(method)),
    };

    if let Err(err) = &outcome {
        if err.code == codes::INTERNAL_ERROR {
            tracing::error!(method = %req.method, id = ?req.id, "request failed: {}", err.message);
        } else {
            tracing::debug!(method = %req.method, code = err.code, "request rejected: {}", err.message);
        }
    }

    Some(JsonRpcResponse::from_outcome(req.id.clone(), outcome))
}

fn initialize_result(state: &ServerState) -> serde_json::Value {
    let mut capabilities = serde_json::json!({
        "tools": { "listChanged": true }
    });
    if state.resources.is_some() {
        capabilities["resources"] = serde_json::json!({ "listChanged": true, "read": true });
    }

    serde_json::json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": capabilities,
        "serverInfo": {
            "name": state.config.server_name,
            "version": state.config.server_version
        }
    })
}

/// Serializes a handler result, reporting failure as an internal error.
pub(crate) fn to_result<T: Serialize>(value: &T) -> Result<serde_json::Value, JsonRpcError> {
    serde_json::to_value(value)
        .map_err(|e| JsonRpcError::internal_error(format!("Failed to encode result: {e}")))
}
