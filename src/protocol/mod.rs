pub mod request;
pub mod response;

pub use request::{JsonRpcRequest, ReadResourceParams, RpcId, ToolCallParams};
pub use response::{JsonRpcError, JsonRpcResponse, ToolInfo, ToolResult, ToolResultContent};

/// MCP protocol revision advertised during `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Methods with this prefix are notifications; unknown ones are ignored.
pub const NOTIFICATION_PREFIX: &str = "notifications/";
