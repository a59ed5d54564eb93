//! Executes requested tool calls and normalizes their results.
//!
//! Tool failures never escape the invoker: a missing tool, bad arguments, or a
//! faulting run all become a textual `Error: ...` output that is sent back to
//! the remote run so it can adapt. Panics inside a tool count as faults.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::{FutureExt, StreamExt};
use serde_json::Value;
use tracing::{debug, warn};

use super::arguments::ToolArguments;
use super::registry::ToolRegistry;
use super::tool::{ToolContext, ToolProgress, ToolProgressStream, ToolReturn, ToolValue};
use crate::error::ParleyError;
use crate::narration::NarrationEvent;
use crate::types::ToolCallRequest;

/// Boilerplate that validation libraries append to error messages.
const DOCS_MARKER: &str = "For further information visit";

/// Result of executing one tool call.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutcome {
    /// Sent to the remote run in text form.
    pub primary: Value,
    /// Local-only richer output.
    pub secondary: Option<Value>,
}

impl ToolOutcome {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            primary: Value::String(message.into()),
            secondary: None,
        }
    }

    /// Text resubmitted to the remote run.
    pub fn primary_text(&self) -> String {
        value_to_text(&self.primary)
    }

    /// Text shown to local observers: the secondary output when present.
    pub fn display_text(&self) -> String {
        value_to_text(self.secondary.as_ref().unwrap_or(&self.primary))
    }
}

impl From<ToolValue> for ToolOutcome {
    fn from(value: ToolValue) -> Self {
        match value {
            ToolValue::Single(primary) => Self {
                primary,
                secondary: None,
            },
            ToolValue::Pair { primary, secondary } => Self {
                primary,
                secondary: Some(secondary),
            },
        }
    }
}

/// Strings render bare; everything else renders as JSON.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// How an invocation finished.
pub enum ToolInvocation {
    Completed(ToolOutcome),
    /// The tool narrates its own sub-steps; drain it for the outcome.
    Narrated(NarratedInvocation),
}

impl std::fmt::Debug for ToolInvocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed(outcome) => f.debug_tuple("Completed").field(outcome).finish(),
            Self::Narrated(n) => f.debug_tuple("Narrated").field(&n.tool_name).finish(),
        }
    }
}

/// A running self-narrating tool.
pub struct NarratedInvocation {
    tool_name: String,
    stream: Option<ToolProgressStream>,
    outcome: Option<ToolOutcome>,
}

impl NarratedInvocation {
    fn new(tool_name: String, stream: ToolProgressStream) -> Self {
        Self {
            tool_name,
            stream: Some(stream),
            outcome: None,
        }
    }

    /// Next sub-step to forward, or `None` once the tool has finished.
    pub async fn next_event(&mut self) -> Option<NarrationEvent> {
        let stream = self.stream.as_mut()?;
        let next = match AssertUnwindSafe(stream.next()).catch_unwind().await {
            Ok(next) => next,
            Err(payload) => Some(Err(panicked(&self.tool_name, payload))),
        };
        match next {
            Some(Ok(ToolProgress::Event(event))) => Some(event),
            Some(Ok(ToolProgress::Finished(value))) => {
                self.outcome = Some(value.into());
                self.stream = None;
                None
            }
            Some(Err(err)) => {
                self.outcome = Some(failure_outcome(&self.tool_name, &err));
                self.stream = None;
                None
            }
            None => {
                self.stream = None;
                None
            }
        }
    }

    /// Final outcome. A tool that ended without a value yields an empty output.
    pub fn finish(self) -> ToolOutcome {
        self.outcome
            .unwrap_or_else(|| ToolOutcome::from(ToolValue::Single(Value::String(String::new()))))
    }
}

/// Resolves, builds, and runs tools for a responder.
#[derive(Debug, Clone, Default)]
pub struct ToolInvoker {
    registry: ToolRegistry,
}

impl ToolInvoker {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Execute `request`. Never fails; problems become error outcomes.
    pub async fn invoke(&self, request: &ToolCallRequest, ctx: ToolContext) -> ToolInvocation {
        let factory = match self.registry.resolve(&request.name) {
            Ok(factory) => factory,
            Err(err) => {
                warn!(tool = %request.name, call_id = %request.id, "requested tool is not registered");
                return ToolInvocation::Completed(ToolOutcome::error(format!("Error: {err}")));
            }
        };

        let built = ToolArguments::parse(&request.arguments).and_then(|args| factory.build(args));
        let tool = match built {
            Ok(tool) => tool,
            Err(err) => return ToolInvocation::Completed(failure_outcome(&request.name, &err)),
        };

        debug!(tool = %request.name, call_id = %request.id, "running tool");
        let result = AssertUnwindSafe(tool.run(&ctx))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(panicked(&request.name, payload)));
        match result {
            Ok(ToolReturn::Value(value)) => ToolInvocation::Completed(value.into()),
            Ok(ToolReturn::Narrated(stream)) => {
                ToolInvocation::Narrated(NarratedInvocation::new(request.name.clone(), stream))
            }
            Err(err) => ToolInvocation::Completed(failure_outcome(&request.name, &err)),
        }
    }

    /// Execute `request` and drain any narration, keeping only the outcome.
    pub async fn invoke_to_outcome(&self, request: &ToolCallRequest, ctx: ToolContext) -> ToolOutcome {
        match self.invoke(request, ctx).await {
            ToolInvocation::Completed(outcome) => outcome,
            ToolInvocation::Narrated(mut narrated) => {
                while narrated.next_event().await.is_some() {}
                narrated.finish()
            }
        }
    }
}

fn panicked(tool_name: &str, payload: Box<dyn Any + Send>) -> ParleyError {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    ParleyError::ToolExecution {
        tool_name: tool_name.to_string(),
        message: format!("tool panicked: {detail}"),
    }
}

fn failure_outcome(tool_name: &str, err: &ParleyError) -> ToolOutcome {
    let message = match err {
        ParleyError::ToolExecution { message, .. } => message.clone(),
        ParleyError::InvalidArgument(message) => message.clone(),
        other => other.to_string(),
    };
    warn!(tool = %tool_name, error = %message, "tool execution failed");
    ToolOutcome::error(format!("Error: {}", strip_docs_suffix(&message)))
}

fn strip_docs_suffix(message: &str) -> &str {
    match message.find(DOCS_MARKER) {
        Some(idx) => message[..idx].trim_end(),
        None => message,
    }
}
