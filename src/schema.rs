//! Type-to-schema mapping.
//!
//! Every bindable Rust type describes itself with a [`TypeKind`] through the
//! [`SchemaType`] trait. The descriptor drives both the advertised JSON
//! schema and the binder's nullability rule, so no runtime reflection is
//! needed.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::binder::ParamSpec;

/// Tagged description of a parameter or field type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    Integer,
    Number,
    Boolean,
    String,
    /// Symbolic variant names, rendered as a string enum.
    Enum(Vec<String>),
    Array(Box<TypeKind>),
    /// Raw, unvalidated JSON, including `null`.
    Any,
    /// A free-form string-keyed map. Advertised like `Any` but never `null`.
    Map,
    /// A record with named fields.
    Object(Vec<FieldKind>),
    Optional(Box<TypeKind>),
}

impl TypeKind {
    /// Whether a missing argument of this type may be bound to `null`.
    pub fn is_nullable(&self) -> bool {
        matches!(self, Self::Optional(_) | Self::Any)
    }
}

/// A record field. `name` is already in the wire's lowerCamelCase form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldKind {
    pub name: String,
    pub kind: TypeKind,
    pub description: Option<String>,
}

impl FieldKind {
    /// Builds a field from its Rust identifier, converting it to lowerCamelCase.
    pub fn new(rust_name: &str, kind: TypeKind) -> Self {
        Self {
            name: to_lower_camel(rust_name),
            kind,
            description: None,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Types that can appear as tool parameters or inside them.
pub trait SchemaType {
    fn type_kind() -> TypeKind;
}

macro_rules! impl_schema_type {
    ($kind:expr => $($ty:ty),+ $(,)?) => {
        $(
            impl SchemaType for $ty {
                fn type_kind() -> TypeKind {
                    $kind
                }
            }
        )+
    };
}

impl_schema_type!(TypeKind::Integer => i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
impl_schema_type!(TypeKind::Number => f32, f64);
impl_schema_type!(TypeKind::Boolean => bool);
impl_schema_type!(TypeKind::String => String, char, Cow<'static, str>);
impl_schema_type!(TypeKind::Any => serde_json::Value);
impl_schema_type!(TypeKind::Map => serde_json::Map<String, serde_json::Value>);

impl<T: SchemaType> SchemaType for Option<T> {
    fn type_kind() -> TypeKind {
        TypeKind::Optional(Box::new(T::type_kind()))
    }
}

impl<T: SchemaType + ?Sized> SchemaType for Box<T> {
    fn type_kind() -> TypeKind {
        T::type_kind()
    }
}

impl<T: SchemaType> SchemaType for [T] {
    fn type_kind() -> TypeKind {
        TypeKind::Array(Box::new(T::type_kind()))
    }
}

impl<T: SchemaType, const N: usize> SchemaType for [T; N] {
    fn type_kind() -> TypeKind {
        TypeKind::Array(Box::new(T::type_kind()))
    }
}

macro_rules! impl_schema_sequence {
    ($($seq:ident),+) => {
        $(
            impl<T: SchemaType> SchemaType for $seq<T> {
                fn type_kind() -> TypeKind {
                    TypeKind::Array(Box::new(T::type_kind()))
                }
            }
        )+
    };
}

impl_schema_sequence!(Vec, VecDeque, HashSet, BTreeSet);

impl<V> SchemaType for HashMap<String, V> {
    fn type_kind() -> TypeKind {
        TypeKind::Map
    }
}

impl<V> SchemaType for BTreeMap<String, V> {
    fn type_kind() -> TypeKind {
        TypeKind::Map
    }
}

/// Implements [`SchemaType`] for a record type by listing its fields.
///
/// Field identifiers are advertised in lowerCamelCase. The record **must**
/// deserialize with `#[serde(rename_all = "camelCase")]`; without it any
/// multi-word field is reported as an invalid argument when bound.
///
/// ```
/// use mcp_tool_server::schema_object;
///
/// #[derive(serde::Deserialize)]
/// #[serde(rename_all = "camelCase")]
/// struct Span { start_line: u32, end_line: u32 }
/// schema_object!(Span { start_line: u32, end_line: u32 });
/// ```
#[macro_export]
macro_rules! schema_object {
    ($ty:ty { $($field:ident : $fty:ty),* $(,)? }) => {
        impl $crate::schema::SchemaType for $ty {
            fn type_kind() -> $crate::schema::TypeKind {
                $crate::schema::TypeKind::Object(vec![
                    $(
                        $crate::schema::FieldKind::new(
                            stringify!($field),
                            <$fty as $crate::schema::SchemaType>::type_kind(),
                        ),
                    )*
                ])
            }
        }
    };
}

/// Implements [`SchemaType`] for a fieldless enum by listing its variants.
///
/// ```
/// use mcp_tool_server::schema_enum;
///
/// enum Color { Red, Green }
/// schema_enum!(Color { Red, Green });
/// ```
#[macro_export]
macro_rules! schema_enum {
    ($ty:ty { $($variant:ident),* $(,)? }) => {
        impl $crate::schema::SchemaType for $ty {
            fn type_kind() -> $crate::schema::TypeKind {
                $crate::schema::TypeKind::Enum(vec![$(stringify!($variant).to_string()),*])
            }
        }
    };
}

/// A JSON-Schema-like node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaNode {
    #[serde(rename = "type")]
    pub schema_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_properties"
    )]
    pub properties: Option<Vec<(String, SchemaNode)>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

impl SchemaNode {
    fn bare(schema_type: &'static str, description: Option<&str>) -> Self {
        Self {
            schema_type,
            description: description.map(str::to_string),
            enum_values: None,
            items: None,
            properties: None,
            required: None,
        }
    }

    /// Looks up a property by name.
    pub fn property(&self, name: &str) -> Option<&SchemaNode> {
        self.properties
            .as_ref()?
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, node)| node)
    }

    pub fn to_value(&self) -> serde_json::Value {
        // Serializing a tree of strings and vectors cannot fail.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

// Properties are emitted in declaration order.
fn serialize_properties<S: Serializer>(
    properties: &Option<Vec<(String, SchemaNode)>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let entries = properties.as_deref().unwrap_or_default();
    let mut map = serializer.serialize_map(Some(entries.len()))?;
    for (name, node) in entries {
        map.serialize_entry(name, node)?;
    }
    map.end()
}

/// Maps a type descriptor to its schema node.
///
/// Nested records get `properties` but never a `required` list; only the
/// top-level tool schema tracks required-ness.
pub fn schema_for(kind: &TypeKind, description: Option<&str>) -> SchemaNode {
    match kind {
        TypeKind::Optional(inner) => schema_for(inner, description),
        TypeKind::Integer => SchemaNode::bare("integer", description),
        TypeKind::Number => SchemaNode::bare("number", description),
        TypeKind::Boolean => SchemaNode::bare("boolean", description),
        TypeKind::String => SchemaNode::bare("string", description),
        TypeKind::Enum(names) => SchemaNode {
            enum_values: Some(names.clone()),
            ..SchemaNode::bare("string", description)
        },
        TypeKind::Array(element) => SchemaNode {
            items: Some(Box::new(schema_for(element, None))),
            ..SchemaNode::bare("array", description)
        },
        TypeKind::Any | TypeKind::Map => SchemaNode::bare("object", description),
        TypeKind::Object(fields) => SchemaNode {
            properties: Some(
                fields
                    .iter()
                    .map(|field| {
                        (
                            field.name.clone(),
                            schema_for(&field.kind, field.description.as_deref()),
                        )
                    })
                    .collect(),
            ),
            ..SchemaNode::bare("object", description)
        },
    }
}

/// Builds a tool's top-level input schema from its ordered parameters.
pub fn input_schema(params: &[ParamSpec]) -> SchemaNode {
    let properties = params
        .iter()
        .map(|p| (p.name.clone(), schema_for(&p.kind, p.description.as_deref())))
        .collect();
    let required = params
        .iter()
        .filter(|p| p.is_required())
        .map(|p| p.name.clone())
        .collect();

    SchemaNode {
        properties: Some(properties),
        required: Some(required),
        ..SchemaNode::bare("object", None)
    }
}

/// Converts a snake_case (or already camelCase) identifier to lowerCamelCase.
pub fn to_lower_camel(name: &str) -> String {
    let trimmed = name.trim_start_matches("r#");
    let mut out = String::with_capacity(trimmed.len());
    let mut upper_next = false;

    for ch in trimmed.chars() {
        if ch == '_' {
            upper_next = !out.is_empty();
            continue;
        }
        if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else if out.is_empty() {
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }

    out
}
