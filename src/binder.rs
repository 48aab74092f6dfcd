//! Parameter binding and invocation thunks.
//!
//! A tool is an ordinary Rust function (or closure) whose argument types
//! implement [`SchemaType`] and `DeserializeOwned`. [`ToolFn`] and
//! [`DeferredToolFn`] are implemented for functions of up to eight
//! arguments; each argument is bound from the incoming JSON object by
//! [`bind`] and the return value is rendered to text by [`IntoToolOutput`].

use std::borrow::Cow;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ToolError;
use crate::schema::{SchemaType, TypeKind};

/// A boxed future for tool invocations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Text output of a tool, or the failure it raised.
pub type ToolOutcome = Result<String, ToolError>;

/// Type-erased invocation thunk stored in the registry.
pub type Invoker = Arc<dyn Fn(Map<String, Value>) -> BoxFuture<'static, ToolOutcome> + Send + Sync>;

/// Declared metadata for one tool parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    name: String,
    description: Option<String>,
    required: Option<bool>,
    default: Option<Value>,
}

impl Param {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            required: None,
            default: None,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Value bound when the caller omits the argument. Makes the parameter
    /// optional unless [`Param::required`] overrides it.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Explicit required flag; wins over default-value inference.
    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn optional(self) -> Self {
        self.required(false)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn into_spec(self, kind: TypeKind) -> ParamSpec {
        ParamSpec {
            name: self.name,
            kind,
            description: self.description,
            required: self.required,
            default: self.default,
        }
    }
}

/// A declared parameter joined with the Rust type it binds to.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub kind: TypeKind,
    pub description: Option<String>,
    pub required: Option<bool>,
    pub default: Option<Value>,
}

impl ParamSpec {
    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(self.default.is_none())
    }
}

/// Binds one argument.
///
/// Precedence: the caller's value, then the declared default, then `null`
/// for nullable types. Anything else is a missing required parameter.
pub fn bind<T: DeserializeOwned>(args: &Map<String, Value>, spec: &ParamSpec) -> Result<T, ToolError> {
    let decode = |value: &Value| T::deserialize(value).map_err(|e| ToolError::invalid_argument(&spec.name, &e));

    if let Some(value) = args.get(&spec.name) {
        return decode(value);
    }
    if let Some(default) = &spec.default {
        return decode(default);
    }
    if spec.kind.is_nullable() {
        return decode(&Value::Null);
    }
    Err(ToolError::missing_parameter(&spec.name))
}

fn next_param<'a>(params: &mut std::slice::Iter<'a, ParamSpec>) -> Result<&'a ParamSpec, ToolError> {
    params
        .next()
        .ok_or_else(|| ToolError::internal("tool parameter table is shorter than its function"))
}

/// Conversion of a tool's return value into its text output.
pub trait IntoToolOutput {
    fn into_tool_output(self) -> ToolOutcome;
}

impl IntoToolOutput for () {
    fn into_tool_output(self) -> ToolOutcome {
        Ok("success".to_string())
    }
}

impl IntoToolOutput for String {
    fn into_tool_output(self) -> ToolOutcome {
        Ok(self)
    }
}

impl IntoToolOutput for &'static str {
    fn into_tool_output(self) -> ToolOutcome {
        Ok(self.to_string())
    }
}

impl IntoToolOutput for Cow<'static, str> {
    fn into_tool_output(self) -> ToolOutcome {
        Ok(self.into_owned())
    }
}

impl<T: IntoToolOutput> IntoToolOutput for Option<T> {
    fn into_tool_output(self) -> ToolOutcome {
        match self {
            Some(value) => value.into_tool_output(),
            None => Ok("null".to_string()),
        }
    }
}

impl<T, E> IntoToolOutput for Result<T, E>
where
    T: IntoToolOutput,
    E: Into<ToolError>,
{
    fn into_tool_output(self) -> ToolOutcome {
        self.map_err(Into::<ToolError>::into)?.into_tool_output()
    }
}

/// Renders any serializable value as canonical JSON text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoToolOutput for Json<T> {
    fn into_tool_output(self) -> ToolOutcome {
        Ok(serde_json::to_string(&self.0)?)
    }
}

impl<T: Serialize> IntoToolOutput for Vec<T> {
    fn into_tool_output(self) -> ToolOutcome {
        Json(self).into_tool_output()
    }
}

macro_rules! impl_json_output {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl IntoToolOutput for $ty {
                fn into_tool_output(self) -> ToolOutcome {
                    Json(self).into_tool_output()
                }
            }
        )+
    };
}

impl_json_output!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char,
    Value, Map<String, Value>,
);

/// A synchronous tool function.
pub trait ToolFn<Args>: Send + Sync + 'static {
    /// Type descriptors of the function's arguments, in order.
    fn param_kinds() -> Vec<TypeKind>;

    /// Binds `args` against `params` and runs the function to completion.
    fn call(&self, args: &Map<String, Value>, params: &[ParamSpec]) -> ToolOutcome;
}

/// A tool function returning a future.
pub trait DeferredToolFn<Args>: Send + Sync + 'static {
    fn param_kinds() -> Vec<TypeKind>;

    /// Binds `args` and starts the computation. Binding failures are
    /// reported before any future exists.
    fn start(&self, args: &Map<String, Value>, params: &[ParamSpec]) -> Result<BoxFuture<'static, ToolOutcome>, ToolError>;
}

macro_rules! impl_tool_fn {
    ($($arg:ident),*) => {
        impl<F, R, $($arg,)*> ToolFn<($($arg,)*)> for F
        where
            F: Fn($($arg),*) -> R + Send + Sync + 'static,
            R: IntoToolOutput,
            $($arg: SchemaType + DeserializeOwned,)*
        {
            fn param_kinds() -> Vec<TypeKind> {
                vec![$(<$arg as SchemaType>::type_kind()),*]
            }

            #[allow(non_snake_case, unused_variables, unused_mut)]
            fn call(&self, args: &Map<String, Value>, params: &[ParamSpec]) -> ToolOutcome {
                let mut params = params.iter();
                $(let $arg: $arg = bind(args, next_param(&mut params)?)?;)*
                (self)($($arg),*).into_tool_output()
            }
        }

        impl<F, Fut, R, $($arg,)*> DeferredToolFn<($($arg,)*)> for F
        where
            F: Fn($($arg),*) -> Fut + Send + Sync + 'static,
            Fut: Future<Output = R> + Send + 'static,
            R: IntoToolOutput,
            $($arg: SchemaType + DeserializeOwned,)*
        {
            fn param_kinds() -> Vec<TypeKind> {
                vec![$(<$arg as SchemaType>::type_kind()),*]
            }

            #[allow(non_snake_case, unused_variables, unused_mut)]
            fn start(
                &self,
                args: &Map<String, Value>,
                params: &[ParamSpec],
            ) -> Result<BoxFuture<'static, ToolOutcome>, ToolError> {
                let mut params = params.iter();
                $(let $arg: $arg = bind(args, next_param(&mut params)?)?;)*
                let pending = (self)($($arg),*);
                Ok(Box::pin(async move { pending.await.into_tool_output() }))
            }
        }
    };
}

impl_tool_fn!();
impl_tool_fn!(A1);
impl_tool_fn!(A1, A2);
impl_tool_fn!(A1, A2, A3);
impl_tool_fn!(A1, A2, A3, A4);
impl_tool_fn!(A1, A2, A3, A4, A5);
impl_tool_fn!(A1, A2, A3, A4, A5, A6);
impl_tool_fn!(A1, A2, A3, A4, A5, A6, A7);
impl_tool_fn!(A1, A2, A3, A4, A5, A6, A7, A8);

/// Wraps a typed synchronous tool. The call runs on the blocking pool and
/// is awaited before the session reads its next line.
pub(crate) fn typed_invoker<H, Args>(handler: H, params: Arc<[ParamSpec]>) -> Invoker
where
    H: ToolFn<Args>,
    Args: 'static,
{
    let handler = Arc::new(handler);
    Arc::new(move |args: Map<String, Value>| -> BoxFuture<'static, ToolOutcome> {
        let handler = Arc::clone(&handler);
        let params = Arc::clone(&params);
        Box::pin(async move {
            tokio::task::spawn_blocking(move || handler.call(&args, &params))
                .await
                .unwrap_or_else(|err| Err(join_failure(err)))
        })
    })
}

/// Wraps a typed deferred tool. Binding, the synchronous part of the call
/// and the returned future all run inside one spawned task, so a panic at
/// any point is contained.
pub(crate) fn typed_deferred_invoker<H, Args>(handler: H, params: Arc<[ParamSpec]>) -> Invoker
where
    H: DeferredToolFn<Args>,
    Args: 'static,
{
    let handler = Arc::new(handler);
    Arc::new(move |args: Map<String, Value>| -> BoxFuture<'static, ToolOutcome> {
        let handler = Arc::clone(&handler);
        let params = Arc::clone(&params);
        Box::pin(async move {
            let task = tokio::spawn(async move {
                match handler.start(&args, &params) {
                    Ok(pending) => pending.await,
                    Err(err) => Err(err),
                }
            });
            task.await.unwrap_or_else(|err| Err(join_failure(err)))
        })
    })
}

/// Wraps an untyped synchronous thunk.
pub(crate) fn raw_invoker<F>(invoke: F) -> Invoker
where
    F: Fn(Map<String, Value>) -> ToolOutcome + Send + Sync + 'static,
{
    let invoke = Arc::new(invoke);
    Arc::new(move |args: Map<String, Value>| -> BoxFuture<'static, ToolOutcome> {
        let invoke = Arc::clone(&invoke);
        Box::pin(async move {
            tokio::task::spawn_blocking(move || invoke(args))
                .await
                .unwrap_or_else(|err| Err(join_failure(err)))
        })
    })
}

/// Wraps an untyped thunk returning a future.
pub(crate) fn raw_deferred_invoker<F, Fut>(invoke: F) -> Invoker
where
    F: Fn(Map<String, Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ToolOutcome> + Send + 'static,
{
    let invoke = Arc::new(invoke);
    Arc::new(move |args: Map<String, Value>| -> BoxFuture<'static, ToolOutcome> {
        let invoke = Arc::clone(&invoke);
        Box::pin(async move {
            tokio::spawn(async move { invoke(args).await })
                .await
                .unwrap_or_else(|err| Err(join_failure(err)))
        })
    })
}

/// Maps a failed tool or provider task to an internal error carrying the
/// panic message.
pub(crate) fn join_failure(err: tokio::task::JoinError) -> ToolError {
    if !err.is_panic() {
        return ToolError::internal("task was cancelled");
    }
    let payload = err.into_panic();
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "task panicked".to_string());
    ToolError::internal(message)
}
