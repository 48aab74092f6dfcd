use std::fs;
use std::path::PathBuf;

use jsonschema::validator_for;
use mcp_tool_server::catalog;
use mcp_tool_server::config::ServerConfig;
use mcp_tool_server::registry::ToolRegistry;
use mcp_tool_server::server::McpServer;
use serde_json::{json, Value};

fn expected_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/golden/expected")
        .join(name)
}

fn read_expected(name: &str) -> String {
    fs::read_to_string(expected_path(name))
        .expect("expected file missing")
        .trim_end()
        .to_string()
}

async fn session_output(input: &str) -> String {
    let registry = ToolRegistry::from_descriptors(catalog::descriptors().unwrap());
    let names: Vec<&str> = registry.names().collect();
    let resources = catalog::resources(&names);
    let server = McpServer::new(ServerConfig::default(), registry).with_resources(resources);

    let mut output = Vec::new();
    server.serve(input.as_bytes(), &mut output).await.unwrap();
    String::from_utf8(output).unwrap()
}

async fn tools_list() -> Value {
    let out = session_output("{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"tools/list\"}\n").await;
    let resp: Value = serde_json::from_str(out.trim_end()).unwrap();
    resp["result"].clone()
}

#[tokio::test]
async fn golden_tools_list_snapshot() {
    let result = tools_list().await;
    let actual = serde_json::to_string_pretty(&result).unwrap();

    assert_eq!(
        actual,
        read_expected("tools_list.json"),
        "tools/list output drifted from tests/golden/expected/tools_list.json"
    );
}

#[tokio::test]
async fn golden_session_is_byte_stable() {
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
        "\n",
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
        "\n",
        r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"describe_shape","arguments":{"shape":{"label":"tri","fillColor":"Blue","vertices":[{"x":0,"y":0},{"x":3,"y":0},{"x":3,"y":4}]}}}}"#,
        "\n",
        r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"add","arguments":{"a":1}}}"#,
        "\n",
    );

    let first = session_output(input).await;
    let second = session_output(input).await;
    assert_eq!(first, second, "identical sessions must produce identical bytes");

    let lines: Vec<&str> = first.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[2],
        r#"{"jsonrpc":"2.0","id":3,"result":{"content":[{"type":"text","text":"{\"label\":\"tri\",\"fillColor\":\"Blue\",\"vertexCount\":3,\"perimeter\":12.0}"}]}}"#
    );
}

#[tokio::test]
async fn golden_input_schemas_are_valid_json_schema() {
    let result = tools_list().await;
    let tools = result["tools"].as_array().unwrap();

    let schema_of = |name: &str| -> Value {
        tools
            .iter()
            .find(|t| t["name"] == name)
            .map(|t| t["inputSchema"].clone())
            .unwrap()
    };

    for tool in tools {
        let name = tool["name"].as_str().unwrap();
        assert!(
            validator_for(&tool["inputSchema"]).is_ok(),
            "inputSchema of {name} must compile as JSON Schema"
        );
    }

    let add = validator_for(&schema_of("add")).unwrap();
    assert!(add.is_valid(&json!({ "a": 2, "b": 3 })));
    assert!(!add.is_valid(&json!({ "a": 2 })));
    assert!(!add.is_valid(&json!({ "a": 2, "b": "3" })));

    let paint = validator_for(&schema_of("paint")).unwrap();
    assert!(paint.is_valid(&json!({ "color": "Red" })));
    assert!(!paint.is_valid(&json!({ "color": "Purple" })));

    let shape = validator_for(&schema_of("describe_shape")).unwrap();
    assert!(shape.is_valid(&json!({
        "shape": { "label": "dot", "fillColor": "Green", "vertices": [{ "x": 1, "y": 2 }] }
    })));
    assert!(!shape.is_valid(&json!({
        "shape": { "label": "dot", "fillColor": "Green", "vertices": [{ "x": "one" }] }
    })));

    let wait = validator_for(&schema_of("wait")).unwrap();
    assert!(wait.is_valid(&json!({})));
}

#[tokio::test]
async fn golden_error_response_schema() {
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"add","arguments":{"a":1}}}"#,
        "\n",
        r#"{"jsonrpc":"2.0","id":"two","method":"tools/call","params":{"name":"missing","arguments":{}}}"#,
        "\n",
        r#"{"jsonrpc":"2.0","method":"no/such/method"}"#,
        "\n",
        r#"{"jsonrpc":"2.0","id":4,"method":"resources/read","params":{"uri":"info://absent"}}"#,
        "\n",
        r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"divide","arguments":{"dividend":1,"divisor":0}}}"#,
        "\n",
    );

    // Frozen envelope for every failure the server emits.
    let schema_str = r#"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "title": "JSON-RPC 2.0 error response",
  "type": "object",
  "required": ["jsonrpc", "error"],
  "additionalProperties": false,
  "properties": {
    "jsonrpc": { "const": "2.0" },
    "id": { "type": ["string", "number", "boolean"] },
    "error": {
      "type": "object",
      "required": ["code", "message"],
      "additionalProperties": false,
      "properties": {
        "code": { "enum": [-32601, -32602, -32603, -32002] },
        "message": { "type": "string", "minLength": 1 },
        "data": {}
      }
    }
  }
}"#;
    let schema: Value = serde_json::from_str(schema_str).unwrap();
    let validator = validator_for(&schema).unwrap();

    let out = session_output(input).await;
    let responses: Vec<Value> = out.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
    assert_eq!(responses.len(), 5);

    for resp in &responses {
        assert!(validator.is_valid(resp), "error response must satisfy the envelope schema: {resp}");
    }

    let codes: Vec<i64> = responses
        .iter()
        .map(|r| r["error"]["code"].as_i64().unwrap())
        .collect();
    assert_eq!(codes, vec![-32602, -32601, -32601, -32002, -32602]);
}
