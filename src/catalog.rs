//! Built-in tool table served by the `mcp-tool-server` binary.
//!
//! Each row pairs a plain Rust function with the names and defaults of its
//! parameters; the argument types supply the schema.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::binder::{Json, Param};
use crate::error::{RegistryError, ToolError};
use crate::registry::ToolDescriptor;
use crate::resources::{Resource, StaticResources};
use crate::{schema_enum, schema_object};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Color {
    Red,
    Green,
    Blue,
}

schema_enum!(Color { Red, Green, Blue });

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

schema_object!(Point { x: f64, y: f64 });

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    pub label: String,
    pub fill_color: Color,
    pub vertices: Vec<Point>,
    pub stroke_width: Option<f64>,
}

schema_object!(Shape {
    label: String,
    fill_color: Color,
    vertices: Vec<Point>,
    stroke_width: Option<f64>,
});

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeSummary {
    pub label: String,
    pub fill_color: Color,
    pub vertex_count: usize,
    pub perimeter: f64,
}

pub fn add(a: i64, b: i64) -> i64 {
    a + b
}

pub fn echo(message: String) -> String {
    message
}

pub fn greet(name: String, greeting: String) -> String {
    format!("{greeting}, {name}!")
}

pub fn sum(values: Vec<f64>) -> f64 {
    values.iter().sum()
}

pub fn divide(dividend: f64, divisor: f64) -> Result<f64, ToolError> {
    if divisor == 0.0 {
        return Err(ToolError::invalid_params("divisor must not be zero")
            .with_data(json!({ "parameter": "divisor" })));
    }
    Ok(dividend / divisor)
}

pub fn paint(color: Color, note: Option<String>) -> String {
    match note {
        Some(note) => format!("painted {color:?} ({note})"),
        None => format!("painted {color:?}"),
    }
}

pub fn describe_shape(shape: Shape) -> Json<ShapeSummary> {
    let perimeter: f64 = shape
        .vertices
        .iter()
        .zip(shape.vertices.iter().cycle().skip(1))
        .map(|(a, b)| ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt())
        .sum();

    Json(ShapeSummary {
        label: shape.label,
        fill_color: shape.fill_color,
        vertex_count: shape.vertices.len(),
        perimeter,
    })
}

pub fn inspect(payload: Value) -> Map<String, Value> {
    let kind = match &payload {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    let mut out = Map::new();
    out.insert("kind".into(), json!(kind));
    out.insert("payload".into(), payload);
    out
}

pub async fn wait(millis: u64) {
    tokio::time::sleep(Duration::from_millis(millis)).await;
}

/// The registration table, in listing order.
pub fn descriptors() -> Result<Vec<ToolDescriptor>, RegistryError> {
    Ok(vec![
        ToolDescriptor::sync(
            "add",
            "Add two integers",
            vec![
                Param::new("a").describe("First addend"),
                Param::new("b").describe("Second addend"),
            ],
            add,
        )?,
        ToolDescriptor::sync(
            "echo",
            "Return the message unchanged",
            vec![Param::new("message").describe("Text to echo")],
            echo,
        )?,
        ToolDescriptor::sync(
            "greet",
            "Greet someone by name",
            vec![
                Param::new("name").describe("Who to greet"),
                Param::new("greeting")
                    .describe("Salutation to use")
                    .default_value("Hello"),
            ],
            greet,
        )?,
        ToolDescriptor::sync(
            "sum",
            "Sum a list of numbers",
            vec![Param::new("values").describe("Numbers to add up")],
            sum,
        )?,
        ToolDescriptor::sync(
            "divide",
            "Divide one number by another",
            vec![Param::new("dividend"), Param::new("divisor")],
            divide,
        )?,
        ToolDescriptor::sync(
            "paint",
            "Paint with one of the supported colors",
            vec![
                Param::new("color").describe("Paint color"),
                Param::new("note").describe("Optional remark").optional(),
            ],
            paint,
        )?,
        ToolDescriptor::sync(
            "describe_shape",
            "Summarize a polygon",
            vec![Param::new("shape").describe("Polygon to summarize")],
            describe_shape,
        )?,
        ToolDescriptor::sync(
            "inspect",
            "Report the JSON kind of an arbitrary payload",
            vec![Param::new("payload").describe("Any JSON value")],
            inspect,
        )?,
        ToolDescriptor::deferred(
            "wait",
            "Sleep for the given number of milliseconds",
            vec![Param::new("millis").default_value(0)],
            wait,
        )?,
    ])
}

/// Documents exposed through `resources/*`.
pub fn resources(tool_names: &[&str]) -> StaticResources {
    let listing = tool_names.join("\n");
    StaticResources::new().with_document(
        Resource::new("info://server/tools", "tools")
            .with_mime_type("text/plain")
            .with_description("Names of the registered tools, one per line"),
        listing,
    )
}
