//! Tool traits, per-call construction, and tool return values.

use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::arguments::ToolArguments;
use super::types::ToolParameters;
use super::validation::validate_arguments;
use crate::error::ParleyError;
use crate::narration::NarrationEvent;

/// Context available during tool execution, beyond the declared arguments.
#[derive(Debug, Clone, Default)]
pub struct ToolContext {
    /// Name of the responder that requested the call.
    pub caller: String,
    /// Name of the party the responder is talking to.
    pub initiator: String,
    /// Remote conversation the call belongs to.
    pub conversation_id: Option<String>,
    pub tool_call_id: String,
    pub tool_name: String,
    /// Fires when the surrounding `converse` call is cancelled.
    pub cancel: CancellationToken,
}

/// Final value of a tool run.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolValue {
    /// Sent to the remote run and shown locally.
    Single(Value),
    /// `primary` goes to the remote run; `secondary` is for local display only.
    Pair { primary: Value, secondary: Value },
}

impl ToolValue {
    pub fn pair(primary: impl Into<Value>, secondary: impl Into<Value>) -> Self {
        Self::Pair {
            primary: primary.into(),
            secondary: secondary.into(),
        }
    }
}

impl From<Value> for ToolValue {
    fn from(value: Value) -> Self {
        Self::Single(value)
    }
}

impl From<String> for ToolValue {
    fn from(value: String) -> Self {
        Self::Single(Value::String(value))
    }
}

impl From<&str> for ToolValue {
    fn from(value: &str) -> Self {
        Self::Single(Value::String(value.to_string()))
    }
}

/// One item produced by a self-narrating tool.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolProgress {
    /// A sub-step to forward to observers.
    Event(NarrationEvent),
    /// The tool's result. Nothing after this is read.
    Finished(ToolValue),
}

/// Stream produced by a self-narrating tool.
pub type ToolProgressStream = BoxStream<'static, Result<ToolProgress, ParleyError>>;

/// What a tool run hands back.
pub enum ToolReturn {
    Value(ToolValue),
    /// A long-running tool narrating its own sub-steps before finishing.
    Narrated(ToolProgressStream),
}

impl ToolReturn {
    pub fn single(value: impl Into<Value>) -> Self {
        Self::Value(ToolValue::Single(value.into()))
    }

    pub fn pair(primary: impl Into<Value>, secondary: impl Into<Value>) -> Self {
        Self::Value(ToolValue::pair(primary, secondary))
    }

    pub fn narrated(stream: ToolProgressStream) -> Self {
        Self::Narrated(stream)
    }
}

impl From<ToolValue> for ToolReturn {
    fn from(value: ToolValue) -> Self {
        Self::Value(value)
    }
}

impl std::fmt::Debug for ToolReturn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Narrated(_) => f.write_str("Narrated(..)"),
        }
    }
}

/// A tool instance bound to one call's arguments.
#[async_trait]
pub trait Tool: Send + Sync {
    async fn run(&self, ctx: &ToolContext) -> Result<ToolReturn, ParleyError>;
}

/// Catalog entry that builds a fresh [`Tool`] for every call.
pub trait ToolFactory: Send + Sync {
    /// Name the remote assistant uses to request the tool.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn parameters(&self) -> &ToolParameters;

    /// Validate `args` and build an instance. Never reuses an instance.
    fn build(&self, args: ToolArguments) -> Result<Box<dyn Tool>, ParleyError>;
}

/// A tool defined as a struct deserialized from its arguments.
///
/// ```
/// use parley::tools::{Tool, ToolContext, ToolParameters, ToolReturn, TypedTool};
/// use parley::error::ParleyError;
///
/// #[derive(serde::Deserialize)]
/// #[serde(deny_unknown_fields)]
/// struct Add {
///     a: i64,
///     b: i64,
/// }
///
/// #[async_trait::async_trait]
/// impl Tool for Add {
///     async fn run(&self, _ctx: &ToolContext) -> Result<ToolReturn, ParleyError> {
///         Ok(ToolReturn::single(self.a + self.b))
///     }
/// }
///
/// impl TypedTool for Add {
///     const NAME: &'static str = "Add";
///
///     fn description() -> &'static str {
///         "Add two integers"
///     }
///
///     fn parameters() -> ToolParameters {
///         ToolParameters::object()
///             .integer("a", "Left operand", true)
///             .integer("b", "Right operand", true)
///             .strict()
///             .build()
///     }
/// }
/// ```
pub trait TypedTool: Tool + DeserializeOwned + 'static {
    const NAME: &'static str;

    fn description() -> &'static str;

    fn parameters() -> ToolParameters;

    /// Catalog entry for this tool.
    fn factory() -> Arc<dyn ToolFactory>
    where
        Self: Sized,
    {
        Arc::new(TypedToolFactory::<Self>::new())
    }
}

/// [`ToolFactory`] for a [`TypedTool`].
pub struct TypedToolFactory<T> {
    parameters: ToolParameters,
    _tool: PhantomData<fn() -> T>,
}

impl<T: TypedTool> TypedToolFactory<T> {
    pub fn new() -> Self {
        Self {
            parameters: T::parameters(),
            _tool: PhantomData,
        }
    }
}

impl<T: TypedTool> Default for TypedToolFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TypedTool> ToolFactory for TypedToolFactory<T> {
    fn name(&self) -> &str {
        T::NAME
    }

    fn description(&self) -> &str {
        T::description()
    }

    fn parameters(&self) -> &ToolParameters {
        &self.parameters
    }

    fn build(&self, args: ToolArguments) -> Result<Box<dyn Tool>, ParleyError> {
        validate_arguments(args.raw(), &self.parameters.schema)
            .map_err(|v| ParleyError::InvalidArgument(v.to_string()))?;
        let tool: T = args.deserialize()?;
        Ok(Box::new(tool))
    }
}

type ToolHandler = dyn Fn(ToolArguments, ToolContext) -> Pin<Box<dyn Future<Output = Result<ToolReturn, ParleyError>> + Send>>
    + Send
    + Sync;

/// Closure-based tool for quick tool creation.
pub struct FnTool {
    name: String,
    description: String,
    parameters: ToolParameters,
    handler: Arc<ToolHandler>,
}

impl FnTool {
    pub fn new<F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: ToolParameters,
        handler: F,
    ) -> Self
    where
        F: Fn(ToolArguments, ToolContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ToolReturn, ParleyError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            handler: Arc::new(move |args, ctx| Box::pin(handler(args, ctx))),
        }
    }
}

impl ToolFactory for FnTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> &ToolParameters {
        &self.parameters
    }

    fn build(&self, args: ToolArguments) -> Result<Box<dyn Tool>, ParleyError> {
        validate_arguments(args.raw(), &self.parameters.schema)
            .map_err(|v| ParleyError::InvalidArgument(v.to_string()))?;
        Ok(Box::new(BoundFnTool {
            args,
            handler: Arc::clone(&self.handler),
        }))
    }
}

impl std::fmt::Debug for FnTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

struct BoundFnTool {
    args: ToolArguments,
    handler: Arc<ToolHandler>,
}

#[async_trait]
impl Tool for BoundFnTool {
    async fn run(&self, ctx: &ToolContext) -> Result<ToolReturn, ParleyError> {
        (self.handler)(self.args.clone(), ctx.clone()).await
    }
}
