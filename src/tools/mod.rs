//! Local tools the responder may request during a run.

pub mod arguments;
pub mod invoker;
pub mod registry;
pub mod tool;
pub mod types;
pub mod validation;

pub use arguments::ToolArguments;
pub use invoker::{NarratedInvocation, ToolInvocation, ToolInvoker, ToolOutcome};
pub use registry::{StaticCatalog, ToolCatalog, ToolDefinition, ToolRegistry};
pub use tool::{
    FnTool, Tool, ToolContext, ToolFactory, ToolProgress, ToolProgressStream, ToolReturn,
    ToolValue, TypedTool, TypedToolFactory,
};
pub use types::ToolParameters;
