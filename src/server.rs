use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::handlers;
use crate::protocol::{JsonRpcRequest, JsonRpcResponse};
use crate::registry::ToolRegistry;
use crate::resources::ResourceProvider;

/// Everything a request handler may read. Immutable once serving starts.
#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub registry: Arc<ToolRegistry>,
    pub resources: Option<Arc<dyn ResourceProvider>>,
}

impl ServerState {
    pub fn new(config: ServerConfig, registry: impl Into<Arc<ToolRegistry>>) -> Self {
        Self {
            config,
            registry: registry.into(),
            resources: None,
        }
    }
}

/// MCP server that communicates over stdio using newline-delimited JSON-RPC 2.0.
///
/// Requests are handled strictly one at a time: a line is decoded, routed,
/// handled and answered before the next line is read.
pub struct McpServer {
    state: ServerState,
}

impl McpServer {
    pub fn new(config: ServerConfig, registry: impl Into<Arc<ToolRegistry>>) -> Self {
        Self {
            state: ServerState::new(config, registry),
        }
    }

    /// Installs the provider behind `resources/list` and `resources/read`.
    pub fn with_resources(mut self, provider: impl ResourceProvider + 'static) -> Self {
        self.state.resources = Some(Arc::new(provider));
        self
    }

    pub fn state(&self) -> &ServerState {
        &self.state
    }

    /// Serves stdin/stdout until stdin closes.
    pub async fn run(&self) -> Result<(), ServerError> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serves one session over an arbitrary line stream.
    ///
    /// Ends cleanly on end-of-stream or when reading fails. Only a failure
    /// to write a response is returned as an error.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<(), ServerError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let max_bytes = self.state.config.max_message_bytes;
        let mut raw = Vec::new();

        tracing::info!(
            tools = self.state.registry.len(),
            resources = self.state.resources.is_some(),
            "serving session"
        );

        loop {
            raw.clear();
            let n = match reader.read_until(b'\n', &mut raw).await {
                Ok(n) => n,
                Err(e) => {
                    tracing::warn!("input stream failed, ending session: {e}");
                    break;
                }
            };
            if n == 0 {
                break;
            }

            if n > max_bytes {
                tracing::warn!("dropping oversized message: {n} bytes (limit {max_bytes})");
                continue;
            }

            let trimmed = match std::str::from_utf8(&raw) {
                Ok(s) => s.trim(),
                Err(e) => {
                    tracing::warn!("dropping message that is not valid UTF-8: {e}");
                    continue;
                }
            };

            if trimmed.is_empty() {
                continue;
            }

            // A line that does not decode has no trustworthy id to answer.
            let req: JsonRpcRequest = match serde_json::from_str(trimmed) {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!("dropping malformed message: {e}");
                    continue;
                }
            };

            if let Some(resp) = handlers::dispatch(&req, &self.state).await {
                write_response(&mut writer, &resp).await?;
            }
        }

        tracing::info!("input closed, session ended");
        writer.flush().await?;
        Ok(())
    }
}

async fn write_response<W>(writer: &mut W, resp: &JsonRpcResponse) -> Result<(), ServerError>
where
    W: AsyncWrite + Unpin,
{
    let mut out = serde_json::to_vec(resp)?;
    out.push(b'\n');
    writer.write_all(&out).await?;
    writer.flush().await?;
    Ok(())
}
