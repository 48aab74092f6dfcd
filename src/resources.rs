//! Read-only resources extension (`resources/list`, `resources/read`).

use serde::{Deserialize, Serialize};

use crate::error::ToolError;

/// Entry in a `resources/list` result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub uri: String,
    pub name: String,
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Resource {
    pub fn new(uri: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            name: name.into(),
            mime_type: None,
            description: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Entry in a `resources/read` result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceContents {
    pub uri: String,
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    pub text: String,
}

/// Source of resources. `read` returns `Ok(None)` for an unknown URI.
pub trait ResourceProvider: Send + Sync {
    fn list(&self) -> Result<Vec<Resource>, ToolError>;

    fn read(&self, uri: &str) -> Result<Option<ResourceContents>, ToolError>;
}

/// Adapts a pair of list/read callbacks into a [`ResourceProvider`].
pub struct ResourceCallbacks<L, R> {
    list: L,
    read: R,
}

impl<L, R> ResourceCallbacks<L, R>
where
    L: Fn() -> Result<Vec<Resource>, ToolError> + Send + Sync,
    R: Fn(&str) -> Result<Option<ResourceContents>, ToolError> + Send + Sync,
{
    pub fn new(list: L, read: R) -> Self {
        Self { list, read }
    }
}

impl<L, R> ResourceProvider for ResourceCallbacks<L, R>
where
    L: Fn() -> Result<Vec<Resource>, ToolError> + Send + Sync,
    R: Fn(&str) -> Result<Option<ResourceContents>, ToolError> + Send + Sync,
{
    fn list(&self) -> Result<Vec<Resource>, ToolError> {
        (self.list)()
    }

    fn read(&self, uri: &str) -> Result<Option<ResourceContents>, ToolError> {
        (self.read)(uri)
    }
}

/// Fixed set of text documents held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticResources {
    documents: Vec<(Resource, String)>,
}

impl StaticResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, resource: Resource, text: impl Into<String>) -> Self {
        self.documents.push((resource, text.into()));
        self
    }
}

impl ResourceProvider for StaticResources {
    fn list(&self) -> Result<Vec<Resource>, ToolError> {
        Ok(self.documents.iter().map(|(r, _)| r.clone()).collect())
    }

    fn read(&self, uri: &str) -> Result<Option<ResourceContents>, ToolError> {
        Ok(self
            .documents
            .iter()
            .find(|(r, _)| r.uri == uri)
            .map(|(r, text)| ResourceContents {
                uri: r.uri.clone(),
                mime_type: r.mime_type.clone(),
                text: text.clone(),
            }))
    }
}
