use mcp_tool_server::catalog;
use mcp_tool_server::config::ServerConfig;
use mcp_tool_server::logging::init_tracing;
use mcp_tool_server::registry::ToolRegistry;
use mcp_tool_server::server::McpServer;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let config = match ServerConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("mcp-tool-server: configuration error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = init_tracing(&config) {
        eprintln!("mcp-tool-server: logging error: {e}");
        std::process::exit(1);
    }

    let registry = match catalog::descriptors() {
        Ok(table) => ToolRegistry::from_descriptors(table),
        Err(e) => {
            tracing::error!("tool registration failed: {e}");
            eprintln!("mcp-tool-server: registration error: {e}");
            std::process::exit(1);
        }
    };
    let names: Vec<&str> = registry.names().collect();
    let resources = catalog::resources(&names);

    let server = McpServer::new(config, registry).with_resources(resources);
    if let Err(e) = server.run().await {
        tracing::error!("fatal error: {e}");
        eprintln!("mcp-tool-server: fatal error: {e}");
        std::process::exit(1);
    }
}
