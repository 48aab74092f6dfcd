//! End-to-end session tests over in-memory streams.
//!
//! Each test feeds raw newline-delimited input to `McpServer::serve` and
//! decodes whatever the server wrote back, one JSON value per line.

use mcp_tool_server::catalog;
use mcp_tool_server::config::ServerConfig;
use mcp_tool_server::error::ToolError;
use mcp_tool_server::registry::ToolRegistry;
use mcp_tool_server::server::McpServer;
use serde_json::{json, Value};

fn test_server(config: ServerConfig) -> McpServer {
    let registry = ToolRegistry::from_descriptors(catalog::descriptors().unwrap());
    let names: Vec<&str> = registry.names().collect();
    let resources = catalog::resources(&names);
    McpServer::new(config, registry).with_resources(resources)
}

async fn run_session_with(config: ServerConfig, input: &[u8]) -> Vec<Value> {
    let server = test_server(config);
    let mut output = Vec::new();
    server.serve(input, &mut output).await.unwrap();

    let text = String::from_utf8(output).unwrap();
    assert!(text.is_empty() || text.ends_with('\n'), "every response ends with a newline");
    text.lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

async fn run_session(input: &str) -> Vec<Value> {
    run_session_with(ServerConfig::default(), input.as_bytes()).await
}

// ---------------------------------------------------------------------------
// Basic exchanges
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_call_round_trip() {
    let responses = run_session(
        r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"add","arguments":{"a":2,"b":3}}}
"#,
    )
    .await;

    assert_eq!(
        responses,
        vec![json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": { "content": [{ "type": "text", "text": "5" }] }
        })]
    );
}

#[tokio::test]
async fn missing_arguments_is_invalid_params() {
    let responses = run_session(
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"add"}}
"#,
    )
    .await;

    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["id"], 2);
    assert_eq!(responses[0]["error"]["code"], -32602);
    assert!(responses[0].get("result").is_none());
}

#[tokio::test]
async fn response_line_is_compact_json() {
    let server = test_server(ServerConfig::default());
    let mut output = Vec::new();
    server
        .serve(&b"{\"jsonrpc\":\"2.0\",\"id\":3,\"method\":\"ping\"}\n"[..], &mut output)
        .await
        .unwrap();

    assert_eq!(
        String::from_utf8(output).unwrap(),
        "{\"jsonrpc\":\"2.0\",\"id\":3,\"result\":{}}\n"
    );
}

#[tokio::test]
async fn full_handshake() {
    let input = [
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"t","version":"0"}}}"#,
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
        r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"greet","arguments":{"name":"Ada"}}}"#,
        r#"{"jsonrpc":"2.0","id":4,"method":"resources/list"}"#,
    ]
    .join("\n");

    let responses = run_session(&input).await;

    let ids: Vec<&Value> = responses.iter().map(|r| &r["id"]).collect();
    assert_eq!(ids, vec![&json!(1), &json!(2), &json!(3), &json!(4)]);
    assert_eq!(responses[0]["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(responses[1]["result"]["tools"].as_array().unwrap().len(), 9);
    assert_eq!(responses[2]["result"]["content"][0]["text"], "Hello, Ada!");
    assert_eq!(responses[3]["result"]["resources"][0]["uri"], "info://server/tools");
}

// ---------------------------------------------------------------------------
// Ids
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ids_are_echoed_verbatim() {
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":"req-7","method":"ping"}"#,
        "\n",
        r#"{"jsonrpc":"2.0","id":1.5,"method":"ping"}"#,
        "\n",
        r#"{"jsonrpc":"2.0","id":-3,"method":"ping"}"#,
        "\n",
    );
    let responses = run_session(input).await;

    assert_eq!(responses.len(), 3);
    assert_eq!(responses[0]["id"], "req-7");
    assert_eq!(responses[1]["id"], 1.5);
    assert_eq!(responses[2]["id"], -3);
}

#[tokio::test]
async fn request_without_id_is_still_answered() {
    let responses = run_session(
        r#"{"jsonrpc":"2.0","method":"tools/call","params":{"name":"add","arguments":{"a":1,"b":1}}}
{"jsonrpc":"2.0","method":"no/such/method"}
"#,
    )
    .await;

    assert_eq!(responses.len(), 2);
    assert!(responses[0].get("id").is_none());
    assert_eq!(responses[0]["result"]["content"][0]["text"], "2");
    assert!(responses[1].get("id").is_none());
    assert_eq!(responses[1]["error"]["code"], -32601);
}

// ---------------------------------------------------------------------------
// Lines that get no response
// ---------------------------------------------------------------------------

#[tokio::test]
async fn malformed_line_is_dropped_and_session_continues() {
    let responses = run_session(
        r#"{"jsonrpc":"2.0","id":1,"method":
this is not json
{"jsonrpc":"2.0","id":2}
[1,2,3]
{"jsonrpc":"2.0","id":3,"method":"ping"}
"#,
    )
    .await;

    assert_eq!(responses, vec![json!({ "jsonrpc": "2.0", "id": 3, "result": {} })]);
}

#[tokio::test]
async fn blank_lines_and_notifications_are_silent() {
    let responses = run_session(
        "\n   \n\r\n{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n{\"jsonrpc\":\"2.0\",\"method\":\"notifications/progress\",\"params\":{}}\n",
    )
    .await;

    assert!(responses.is_empty());
}

#[tokio::test]
async fn crlf_line_endings_are_accepted() {
    let responses = run_session("{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\r\n").await;
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["result"], json!({}));
}

#[tokio::test]
async fn oversized_line_is_dropped() {
    let config = ServerConfig {
        max_message_bytes: 64,
        ..ServerConfig::default()
    };
    let long = format!(
        "{{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"tools/call\",\"params\":{{\"name\":\"echo\",\"arguments\":{{\"message\":\"{}\"}}}}}}\n",
        "x".repeat(100)
    );
    let short = "{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"ping\"}\n";
    let input = format!("{long}{short}");

    let responses = run_session_with(config, input.as_bytes()).await;

    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["id"], 2);
}

#[tokio::test]
async fn invalid_utf8_line_is_dropped() {
    let mut input = b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"\xff\xfe\"}\n".to_vec();
    input.extend_from_slice(b"{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"ping\"}\n");

    let responses = run_session_with(ServerConfig::default(), &input).await;

    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["id"], 2);
}

// ---------------------------------------------------------------------------
// End of stream
// ---------------------------------------------------------------------------

#[tokio::test]
async fn final_line_without_newline_is_processed() {
    let responses = run_session(r#"{"jsonrpc":"2.0","id":9,"method":"ping"}"#).await;
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["id"], 9);
}

#[tokio::test]
async fn empty_input_ends_cleanly() {
    assert!(run_session("").await.is_empty());
}

#[tokio::test]
async fn requests_are_answered_in_order() {
    let input = (1..=5)
        .map(|i| {
            let millis = (5 - i) * 10;
            format!(
                r#"{{"jsonrpc":"2.0","id":{i},"method":"tools/call","params":{{"name":"wait","arguments":{{"millis":{millis}}}}}}}"#
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let responses = run_session(&input).await;

    let ids: Vec<i64> = responses.iter().map(|r| r["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    assert!(responses
        .iter()
        .all(|r| r["result"]["content"][0]["text"] == "success"));
}

// ---------------------------------------------------------------------------
// Failures inside tools
// ---------------------------------------------------------------------------

#[tokio::test]
async fn panic_before_deferred_future_keeps_session_alive() {
    let mut registry = ToolRegistry::new();
    registry.register_async(
        "strict",
        "Needs n before it starts",
        json!({ "type": "object", "properties": { "n": { "type": "integer" } }, "required": ["n"] }),
        |args| {
            let n = args.get("n").and_then(Value::as_i64).expect("n required");
            async move { Ok::<_, ToolError>(n.to_string()) }
        },
    );
    let server = McpServer::new(ServerConfig::default(), registry);

    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"strict","arguments":{}}}"#,
        "\n",
        r#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#,
        "\n",
    );
    let mut output = Vec::new();
    server.serve(input.as_bytes(), &mut output).await.unwrap();

    let responses: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[0]["error"]["code"], -32603);
    assert_eq!(responses[0]["error"]["message"], "n required");
    assert_eq!(responses[1], json!({ "jsonrpc": "2.0", "id": 2, "result": {} }));
}

#[tokio::test]
async fn null_id_is_echoed_as_null() {
    let server = test_server(ServerConfig::default());
    let mut output = Vec::new();
    server
        .serve(&b"{\"jsonrpc\":\"2.0\",\"id\":null,\"method\":\"ping\"}\n"[..], &mut output)
        .await
        .unwrap();

    assert_eq!(
        String::from_utf8(output).unwrap(),
        "{\"jsonrpc\":\"2.0\",\"id\":null,\"result\":{}}\n"
    );
}
