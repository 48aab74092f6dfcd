//! Tool registry.
//!
//! Entries are keyed by name and listed in insertion order. Registering a
//! name twice replaces the earlier entry in place (last registration wins).

use std::collections::{HashMap, HashSet};
use std::future::Future;

use serde_json::{Map, Value};

use crate::binder::{
    self, DeferredToolFn, Invoker, Param, ParamSpec, ToolFn, ToolOutcome,
};
use crate::error::RegistryError;
use crate::protocol::ToolInfo;
use crate::schema;

/// A registered tool.
#[derive(Clone)]
pub struct ToolEntry {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    invoke: Invoker,
}

impl ToolEntry {
    /// Binds `arguments` and runs the tool.
    pub async fn invoke(&self, arguments: Map<String, Value>) -> ToolOutcome {
        (self.invoke)(arguments).await
    }

    pub fn info(&self) -> ToolInfo {
        ToolInfo {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: self.input_schema.clone(),
        }
    }
}

impl std::fmt::Debug for ToolEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolEntry")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("input_schema", &self.input_schema)
            .finish_non_exhaustive()
    }
}

/// One row of the static registration table: a typed function plus the
/// metadata needed to advertise and bind it.
#[derive(Clone)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub params: Vec<ParamSpec>,
    invoke: Invoker,
}

impl ToolDescriptor {
    /// Describes a synchronous tool.
    ///
    /// `params` names the function's arguments in order; their types come
    /// from the function signature.
    pub fn sync<H, Args>(
        name: impl Into<String>,
        description: impl Into<String>,
        params: Vec<Param>,
        handler: H,
    ) -> Result<Self, RegistryError>
    where
        H: ToolFn<Args>,
        Args: 'static,
    {
        let name = name.into();
        let specs = join_params(&name, params, <H as ToolFn<Args>>::param_kinds())?;
        let invoke = binder::typed_invoker(handler, specs.clone().into());
        Ok(Self {
            name,
            description: description.into(),
            params: specs,
            invoke,
        })
    }

    /// Describes a tool whose function returns a future.
    pub fn deferred<H, Args>(
        name: impl Into<String>,
        description: impl Into<String>,
        params: Vec<Param>,
        handler: H,
    ) -> Result<Self, RegistryError>
    where
        H: DeferredToolFn<Args>,
        Args: 'static,
    {
        let name = name.into();
        let specs = join_params(&name, params, <H as DeferredToolFn<Args>>::param_kinds())?;
        let invoke = binder::typed_deferred_invoker(handler, specs.clone().into());
        Ok(Self {
            name,
            description: description.into(),
            params: specs,
            invoke,
        })
    }

    pub fn input_schema(&self) -> Value {
        schema::input_schema(&self.params).to_value()
    }
}

impl std::fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

fn join_params(
    tool: &str,
    params: Vec<Param>,
    kinds: Vec<schema::TypeKind>,
) -> Result<Vec<ParamSpec>, RegistryError> {
    if params.len() != kinds.len() {
        return Err(RegistryError::ArityMismatch {
            tool: tool.to_string(),
            declared: params.len(),
            expected: kinds.len(),
        });
    }

    let mut seen = HashSet::new();
    if let Some(dup) = params.iter().find(|p| !seen.insert(p.name().to_string())) {
        return Err(RegistryError::DuplicateParameter {
            tool: tool.to_string(),
            parameter: dup.name().to_string(),
        });
    }

    Ok(params
        .into_iter()
        .zip(kinds)
        .map(|(param, kind)| param.into_spec(kind))
        .collect())
}

/// Name-keyed tool table, built once at startup and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    entries: Vec<ToolEntry>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from a registration table.
    pub fn from_descriptors(descriptors: impl IntoIterator<Item = ToolDescriptor>) -> Self {
        let mut registry = Self::new();
        registry.register_all(descriptors);
        registry
    }

    /// Registers a tool with a hand-written schema and an untyped thunk.
    pub fn register<F>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
        invoke: F,
    ) where
        F: Fn(Map<String, Value>) -> ToolOutcome + Send + Sync + 'static,
    {
        self.insert(ToolEntry {
            name: name.into(),
            description: description.into(),
            input_schema,
            invoke: binder::raw_invoker(invoke),
        });
    }

    /// Like [`ToolRegistry::register`], for thunks that return a future.
    pub fn register_async<F, Fut>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
        invoke: F,
    ) where
        F: Fn(Map<String, Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ToolOutcome> + Send + 'static,
    {
        self.insert(ToolEntry {
            name: name.into(),
            description: description.into(),
            input_schema,
            invoke: binder::raw_deferred_invoker(invoke),
        });
    }

    /// Registers one row of a registration table, deriving its input schema
    /// from the declared parameters.
    pub fn register_descriptor(&mut self, descriptor: ToolDescriptor) {
        let input_schema = descriptor.input_schema();
        self.insert(ToolEntry {
            name: descriptor.name,
            description: descriptor.description,
            input_schema,
            invoke: descriptor.invoke,
        });
    }

    /// Registers a whole table in order. Later rows win on name collisions.
    pub fn register_all(&mut self, descriptors: impl IntoIterator<Item = ToolDescriptor>) {
        for descriptor in descriptors {
            self.register_descriptor(descriptor);
        }
    }

    pub fn list_all(&self) -> Vec<ToolInfo> {
        self.entries.iter().map(ToolEntry::info).collect()
    }

    pub fn lookup(&self, name: &str) -> Option<&ToolEntry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    fn insert(&mut self, entry: ToolEntry) {
        match self.index.get(&entry.name) {
            Some(&i) => {
                tracing::debug!(tool = %entry.name, "replacing previously registered tool");
                self.entries[i] = entry;
            }
            None => {
                self.index.insert(entry.name.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }
}
