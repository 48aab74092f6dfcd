use serde::{Deserialize, Serialize};

/// JSON-RPC 2.0 ID. Opaque to the server and echoed back verbatim,
/// including an explicit `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcId {
    Number(serde_json::Number),
    Str(String),
    Bool(bool),
    Null,
}

impl From<i64> for RpcId {
    fn from(id: i64) -> Self {
        Self::Number(id.into())
    }
}

impl From<&str> for RpcId {
    fn from(id: &str) -> Self {
        Self::Str(id.to_string())
    }
}

/// JSON-RPC 2.0 request envelope.
///
/// `jsonrpc` is accepted but not enforced; callers that omit it are served.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    /// `None` only when the member is absent; `"id": null` is `Some(RpcId::Null)`.
    #[serde(default, deserialize_with = "present_id")]
    pub id: Option<RpcId>,
    pub method: String,
    #[serde(default)]
    pub params: Option<serde_json::Value>,
}

impl JsonRpcRequest {
    pub fn new(method: impl Into<String>, params: Option<serde_json::Value>, id: impl Into<RpcId>) -> Self {
        Self {
            jsonrpc: Some("2.0".into()),
            id: Some(id.into()),
            method: method.into(),
            params,
        }
    }

    pub fn notification(method: impl Into<String>, params: Option<serde_json::Value>) -> Self {
        Self {
            jsonrpc: Some("2.0".into()),
            id: None,
            method: method.into(),
            params,
        }
    }

    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

fn present_id<'de, D>(deserializer: D) -> Result<Option<RpcId>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    RpcId::deserialize(deserializer).map(Some)
}

/// Parameters for `tools/call`.
///
/// Both fields are optional at the wire level so the dispatcher can report
/// which one is missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolCallParams {
    #[serde(default)]
    pub name: Option<serde_json::Value>,
    #[serde(default)]
    pub arguments: Option<serde_json::Value>,
}

/// Parameters for `resources/read`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReadResourceParams {
    #[serde(default)]
    pub uri: Option<String>,
}
