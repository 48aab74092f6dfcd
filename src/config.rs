use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Default maximum bytes per JSON-RPC line (1 MiB).
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 1024 * 1024;

/// Default log filter directive.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub server_name: String,
    pub server_version: String,
    /// `None` means tool calls may run forever.
    pub tool_timeout: Option<Duration>,
    pub max_message_bytes: usize,
    pub log_filter: String,
    /// Debug log destination; logs go to stderr when unset.
    pub log_file: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_name: env!("CARGO_PKG_NAME").to_string(),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
            tool_timeout: None,
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            log_file: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment.
    ///
    /// - `MCP_SERVER_NAME` (optional) — name reported in `serverInfo`
    /// - `MCP_SERVER_VERSION` (optional) — version reported in `serverInfo`
    /// - `MCP_TOOL_TIMEOUT_SECS` (optional, default none) — max seconds per tool call
    /// - `MCP_MAX_MESSAGE_BYTES` (optional, default 1 MiB) — longest accepted line
    /// - `MCP_LOG` (optional, default `info`) — log filter directive
    /// - `MCP_LOG_FILE` (optional) — write logs to this file instead of stderr
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let server_name = match lookup("MCP_SERVER_NAME") {
            Some(val) => non_empty("MCP_SERVER_NAME", val)?,
            None => defaults.server_name,
        };

        let server_version = match lookup("MCP_SERVER_VERSION") {
            Some(val) => non_empty("MCP_SERVER_VERSION", val)?,
            None => defaults.server_version,
        };

        let tool_timeout = lookup("MCP_TOOL_TIMEOUT_SECS")
            .map(|val| positive_integer("MCP_TOOL_TIMEOUT_SECS", val))
            .transpose()?
            .map(Duration::from_secs);

        let max_message_bytes = match lookup("MCP_MAX_MESSAGE_BYTES") {
            Some(val) => positive_integer("MCP_MAX_MESSAGE_BYTES", val)? as usize,
            None => defaults.max_message_bytes,
        };

        let log_filter = match lookup("MCP_LOG") {
            Some(val) => non_empty("MCP_LOG", val)?,
            None => defaults.log_filter,
        };

        let log_file = lookup("MCP_LOG_FILE")
            .filter(|val| !val.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            server_name,
            server_version,
            tool_timeout,
            max_message_bytes,
            log_filter,
            log_file,
        })
    }
}

fn non_empty(var: &'static str, value: String) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Empty { var });
    }
    Ok(trimmed.to_string())
}

fn positive_integer(var: &'static str, value: String) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::NotPositiveInteger { var, value }),
    }
}
