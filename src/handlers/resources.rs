use serde::Serialize;
use serde_json::Value;

use super::to_result;
use crate::binder::join_failure;
use crate::error::ToolError;
use crate::protocol::{JsonRpcError, ReadResourceParams};
use crate::resources::{Resource, ResourceContents};
use crate::server::ServerState;

#[derive(Debug, Serialize)]
struct ListResourcesResponse {
    resources: Vec<Resource>,
}

#[derive(Debug, Serialize)]
struct ReadResourceResponse {
    contents: Vec<ResourceContents>,
}

/// Handle `resources/list`. Without a provider the list is empty.
///
/// Provider callbacks run on the blocking pool so a panic becomes an
/// internal error instead of ending the session.
pub async fn list(state: &ServerState) -> Result<Value, JsonRpcError> {
    let resources = match &state.resources {
        Some(provider) => {
            let provider = provider.clone();
            tokio::task::spawn_blocking(move || provider.list())
                .await
                .unwrap_or_else(|err| Err(join_failure(err)))
                .map_err(JsonRpcError::from)?
        }
        None => Vec::new(),
    };
    to_result(&ListResourcesResponse { resources })
}

/// Handle `resources/read`.
///
/// An unknown URI, or no provider at all, is reported as resource-not-found.
pub async fn read(params: Option<&Value>, state: &ServerState) -> Result<Value, JsonRpcError> {
    let params: ReadResourceParams = match params {
        Some(v) => serde_json::from_value(v.clone())
            .map_err(|e| JsonRpcError::invalid_params(format!("Invalid resources/read params: {e}")))?,
        None => return Err(JsonRpcError::invalid_params("Missing params for resources/read")),
    };

    let uri = params
        .uri
        .ok_or_else(|| JsonRpcError::invalid_params("Missing uri for resources/read"))?;

    let Some(provider) = state.resources.clone() else {
        return Err(ToolError::resource_not_found(&uri).into());
    };

    let lookup = uri.clone();
    let contents = tokio::task::spawn_blocking(move || provider.read(&lookup))
        .await
        .unwrap_or_else(|err| Err(join_failure(err)))
        .map_err(JsonRpcError::from)?;

    match contents {
        Some(contents) => to_result(&ReadResourceResponse {
            contents: vec![contents],
        }),
        None => Err(ToolError::resource_not_found(&uri).into()),
    }
}
