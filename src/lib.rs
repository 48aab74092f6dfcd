//! Embeddable MCP tool server.
//!
//! Exposes ordinary Rust functions as tools over JSON-RPC 2.0 stdio
//! transport, compatible with any MCP-aware AI agent. Tool input schemas
//! are derived from the functions' argument types, and incoming arguments
//! are bound back into those types before the call.

pub mod binder;
pub mod catalog;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod protocol;
pub mod registry;
pub mod resources;
pub mod schema;
pub mod server;

pub use binder::{Json, Param};
pub use error::ToolError;
pub use registry::{ToolDescriptor, ToolRegistry};
pub use server::McpServer;
