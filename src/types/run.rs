//! Remote run snapshot types.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Latest known snapshot of a remote run.
///
/// Snapshots are replaced wholesale on every poll or submission; nothing
/// mutates one in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Run {
    pub id: String,
    pub conversation_id: String,
    #[serde(default)]
    pub assistant_id: String,
    pub status: RunStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pending_tool_calls: Vec<ToolCallRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<RunError>,
}

impl Run {
    /// Human-readable failure reason as reported by the remote service.
    pub fn failure_reason(&self) -> String {
        self.last_error
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "no error details reported".to_string())
    }
}

/// Run lifecycle status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    /// The run is still working and must be polled again.
    pub fn is_transient(self) -> bool {
        matches!(self, Self::Queued | Self::InProgress | Self::Cancelling)
    }

    /// The run is paused waiting for tool outputs.
    pub fn is_actionable(self) -> bool {
        matches!(self, Self::RequiresAction)
    }

    /// The run still holds the conversation: no message or run may be added.
    pub fn is_active(self) -> bool {
        self.is_transient() || self.is_actionable()
    }

    /// The run will not change status again.
    pub fn is_terminal(self) -> bool {
        !self.is_transient() && !self.is_actionable()
    }
}

/// A tool invocation requested by a paused run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolCallRequest {
    /// Call identifier; its output must be submitted under this key.
    pub id: String,
    pub name: String,
    /// Raw JSON text of the arguments object.
    pub arguments: String,
}

impl std::fmt::Display for ToolCallRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Function(name='{}', arguments='{}')", self.name, self.arguments)
    }
}

/// Output for one tool call, resubmitted to the paused run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolOutputSubmission {
    pub tool_call_id: String,
    pub output: String,
}

/// Error details attached to a failed run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunError {
    pub code: String,
    pub message: String,
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}
